//! Asset directory taxonomy and image discovery
//!
//! An image's category and true direction come only from which of the four
//! `<root>/<category>/<direction>` directories holds it.

use crate::io::error::{GmiError, Result, asset_layout, file_system};
use crate::session::trial::{Category, Direction, ImageId};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// One of the four image directories and the labels it assigns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetDirectory {
    /// What images in this directory show
    pub category: Category,
    /// Ground-truth side of images in this directory
    pub direction: Direction,
    /// Directory path
    pub path: PathBuf,
}

/// A usable image and its labels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// Image file
    pub path: PathBuf,
    /// Category from the containing directory
    pub category: Category,
    /// True direction from the containing directory
    pub direction: Direction,
    /// Content hash of the file
    pub image_id: ImageId,
}

/// Result of scanning the asset directories
#[derive(Debug, Default)]
pub struct AssetScan {
    /// Images found, sorted by path within each directory
    pub assets: Vec<Asset>,
    /// Entries that were skipped, each as an [`GmiError::AssetLayout`]
    pub warnings: Vec<GmiError>,
}

impl AssetScan {
    /// Number of assets in one category/direction bucket
    pub fn count(&self, category: Category, direction: Direction) -> usize {
        self.assets
            .iter()
            .filter(|a| a.category == category && a.direction == direction)
            .count()
    }
}

/// Explicit mapping of directories to (category, direction) pairs
#[derive(Debug, Clone)]
pub struct AssetLayout {
    root: PathBuf,
    directories: Vec<AssetDirectory>,
}

impl AssetLayout {
    /// Layout with all four directories under `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let directories = Category::ALL
            .into_iter()
            .flat_map(|category| {
                let root = root.clone();
                Direction::ALL.into_iter().map(move |direction| AssetDirectory {
                    category,
                    direction,
                    path: root.join(category.as_str()).join(direction.as_str()),
                })
            })
            .collect();

        Self { root, directories }
    }

    /// Keep only the directories of one category, or all when `None`
    #[must_use]
    pub fn limited_to(mut self, category: Option<Category>) -> Self {
        if let Some(category) = category {
            self.directories.retain(|d| d.category == category);
        }
        self
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directories in use
    pub fn directories(&self) -> &[AssetDirectory] {
        &self.directories
    }

    /// Categories covered by the directories in use
    pub fn categories(&self) -> Vec<Category> {
        let mut categories: Vec<Category> = self.directories.iter().map(|d| d.category).collect();
        categories.dedup();
        categories
    }

    /// Create every directory in use that does not exist yet
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be created
    pub fn ensure_directories(&self) -> Result<()> {
        for directory in &self.directories {
            if !directory.path.is_dir() {
                tracing::info!("Creating asset directory {}", directory.path.display());
                std::fs::create_dir_all(&directory.path)
                    .map_err(file_system(&directory.path, "create directory"))?;
            }
        }
        Ok(())
    }

    /// Labels of a file, decided by the directory that directly contains it
    ///
    /// # Errors
    ///
    /// Returns [`GmiError::AssetLayout`] if the file is not inside one of the directories in use
    pub fn classify(&self, path: &Path) -> Result<(Category, Direction)> {
        let parent = path
            .parent()
            .ok_or_else(|| asset_layout(path, &"file has no parent directory"))?;

        self.directories
            .iter()
            .find(|d| same_directory(&d.path, parent))
            .map(|d| (d.category, d.direction))
            .ok_or_else(|| {
                asset_layout(
                    path,
                    &"not inside an <category>/<direction> asset directory",
                )
            })
    }

    /// Find every usable image
    ///
    /// Files that are not images, nested directories, files placed outside the four
    /// directories and duplicate images are reported in [`AssetScan::warnings`].
    ///
    /// # Errors
    ///
    /// Returns an error if an asset directory exists but cannot be read
    pub fn scan(&self) -> Result<AssetScan> {
        let mut scan = AssetScan::default();
        let mut seen: HashMap<ImageId, PathBuf> = HashMap::new();

        self.check_stray_entries(&mut scan.warnings)?;

        for directory in &self.directories {
            if !directory.path.is_dir() {
                scan.warnings.push(asset_layout(
                    &directory.path,
                    &"asset directory is missing",
                ));
                continue;
            }

            let mut found = 0_usize;
            for path in sorted_entries(&directory.path)? {
                if path.is_dir() {
                    scan.warnings
                        .push(asset_layout(&path, &"nested directories are not scanned"));
                    continue;
                }

                if !is_image(&path) {
                    scan.warnings.push(asset_layout(&path, &"not a recognized image"));
                    continue;
                }

                let (category, direction) = self.classify(&path)?;
                let bytes = std::fs::read(&path).map_err(file_system(&path, "read image"))?;
                let image_id = ImageId::of_contents(&bytes);

                if let Some(original) = seen.get(&image_id) {
                    scan.warnings.push(asset_layout(
                        &path,
                        &format!("duplicates {}", original.display()),
                    ));
                } else {
                    seen.insert(image_id.clone(), path.clone());
                }

                tracing::debug!("Image {} hash {image_id}", path.display());
                scan.assets.push(Asset {
                    path,
                    category,
                    direction,
                    image_id,
                });
                found += 1;
            }

            tracing::info!(
                "Found {found} image{} in {}",
                if found == 1 { "" } else { "s" },
                directory.path.display()
            );
        }

        for warning in &scan.warnings {
            tracing::warn!("{warning}");
        }

        Ok(scan)
    }

    // Anything at the root or category level that is not part of the taxonomy
    fn check_stray_entries(&self, warnings: &mut Vec<GmiError>) -> Result<()> {
        if !self.root.is_dir() {
            return Ok(());
        }

        for path in sorted_entries(&self.root)? {
            let known = path.is_dir()
                && file_token(&path).is_some_and(|name| Category::from_token(name).is_some());
            if !known {
                warnings.push(asset_layout(&path, &"outside the hands/feet directories"));
            }
        }

        for category in self.categories() {
            let category_dir = self.root.join(category.as_str());
            if !category_dir.is_dir() {
                continue;
            }
            for path in sorted_entries(&category_dir)? {
                let known = path.is_dir()
                    && file_token(&path).is_some_and(|name| Direction::from_token(name).is_some());
                if !known {
                    warnings.push(asset_layout(&path, &"outside the left/right directories"));
                }
            }
        }

        Ok(())
    }
}

fn file_token(path: &Path) -> Option<&str> {
    path.file_name().and_then(|name| name.to_str())
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(file_system(dir, "read directory"))? {
        let entry = entry.map_err(file_system(dir, "read directory entry"))?;
        paths.push(entry.path());
    }
    paths.sort();
    Ok(paths)
}

fn same_directory(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Whether the file's contents are in a format the image decoder recognizes
pub fn is_image(path: &Path) -> bool {
    File::open(path)
        .map(|file| image::ImageReader::new(BufReader::new(file)))
        .and_then(image::ImageReader::with_guessed_format)
        .is_ok_and(|reader| reader.format().is_some())
}
