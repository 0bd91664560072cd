//! Running a training session: assets, image order, trials and the interactive loop

/// Asset directory layout and scanning
pub mod assets;
/// Working set construction and image ordering
pub mod provider;
/// Interactive session loop
pub mod runner;
/// Trial, session and label types
pub mod trial;
