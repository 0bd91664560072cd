//! Tests for the interactive session loop with scripted input

#[cfg(test)]
mod tests {
    use gmi::GmiError;
    use gmi::analysis::parser::{ParsePolicy, read_log_file};
    use gmi::io::log::SessionLog;
    use gmi::session::assets::Asset;
    use gmi::session::provider::{ImageProvider, ProviderConfig};
    use gmi::session::runner::{
        Input, PainPrompt, Presenter, ResponseSource, SessionRunner, feedback,
    };
    use gmi::session::trial::{Category, Direction, ImageId, PainLevel, Trial};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::VecDeque;
    use std::path::{Path, PathBuf};
    use std::time::Duration;
    use tempfile::TempDir;

    #[derive(Default)]
    struct Recorder {
        fail_on: Option<usize>,
    }

    impl Presenter for Recorder {
        fn show_message(&mut self, _text: &str) -> gmi::Result<()> {
            Ok(())
        }

        fn show_image(&mut self, asset: &Asset, index: usize, _total: usize) -> gmi::Result<()> {
            if self.fail_on == Some(index) {
                return Err(GmiError::NoImages {
                    root: asset.path.clone(),
                });
            }
            Ok(())
        }
    }

    struct Script(VecDeque<String>);

    impl Script {
        fn new(lines: &[&str]) -> Self {
            Self(lines.iter().map(|line| format!("{line}\n")).collect())
        }
    }

    impl ResponseSource for Script {
        fn read_line(&mut self) -> gmi::Result<Option<String>> {
            Ok(self.0.pop_front())
        }
    }

    fn provider(count: usize) -> ImageProvider {
        let assets = [
            (Category::Hands, Direction::Left),
            (Category::Hands, Direction::Right),
        ]
        .into_iter()
        .map(|(category, direction)| Asset {
            path: PathBuf::from(format!("{category}/{direction}.png")),
            category,
            direction,
            image_id: ImageId::of_contents(direction.as_str().as_bytes()),
        })
        .collect();

        let config = ProviderConfig {
            count,
            repeats: false,
            balance: true,
        };
        ImageProvider::new(assets, config, StdRng::seed_from_u64(42)).expect("provider built")
    }

    fn log_in(dir: &Path) -> (SessionLog, PathBuf) {
        let path = dir.join("log.csv");
        (SessionLog::open(&path).expect("log opened"), path)
    }

    // Tests answer parsing accepts keys and words
    // Verified by treating "l" as right
    #[test]
    fn test_input_parse() {
        assert_eq!(Input::parse("a\n"), Input::Response(Direction::Left));
        assert_eq!(Input::parse(" L "), Input::Response(Direction::Left));
        assert_eq!(Input::parse("right"), Input::Response(Direction::Right));
        assert_eq!(Input::parse("d"), Input::Response(Direction::Right));
        assert_eq!(Input::parse("q"), Input::Quit);
        assert_eq!(Input::parse("maybe"), Input::Other);
    }

    // Tests a complete session records every trial and logs it
    // Verified by logging only after the session ends
    #[test]
    fn test_full_session() {
        let temp_dir = TempDir::new().expect("temp dir");
        let (mut log, path) = log_in(temp_dir.path());
        let mut provider = provider(4);
        let mut runner = SessionRunner::new(
            Recorder::default(),
            Script::new(&["3", "", "a", "d", "a", "d"]),
            PainPrompt::Ask,
        );

        let outcome = runner
            .run(&mut provider, &mut log, vec![Category::Hands])
            .expect("session runs");

        assert!(outcome.completed);
        assert_eq!(outcome.trials.len(), 4);
        assert_eq!(outcome.header.pain_level, PainLevel::new(3));
        assert!(outcome.trials.iter().all(|t| t.image_id.is_some()));
        assert!(outcome.trials.iter().all(|t| t.timestamp.is_some()));

        let parsed = read_log_file(&path, ParsePolicy::Strict).expect("log parses");
        assert_eq!(parsed.sessions.len(), 1);
        assert_eq!(parsed.trial_count(), 4);
        assert_eq!(
            parsed.sessions[0].header.as_ref().map(|h| h.pain_level),
            Some(PainLevel::new(3))
        );
    }

    // Tests invalid pain levels are asked again and other input is ignored
    // Verified by accepting the first numeric line
    #[test]
    fn test_pain_prompt_and_noise() {
        let temp_dir = TempDir::new().expect("temp dir");
        let (mut log, _) = log_in(temp_dir.path());
        let mut provider = provider(2);
        let mut runner = SessionRunner::new(
            Recorder::default(),
            Script::new(&["eleven", "12", "0", "", "x", "left", "right"]),
            PainPrompt::Ask,
        );

        let outcome = runner
            .run(&mut provider, &mut log, vec![Category::Hands])
            .expect("session runs");

        assert_eq!(outcome.header.pain_level, PainLevel::new(0));
        assert_eq!(outcome.trials.len(), 2);
        assert_eq!(outcome.trials[0].response, Direction::Left);
        assert_eq!(outcome.trials[1].response, Direction::Right);
    }

    // Tests quitting keeps the trials answered so far
    // Verified by discarding partial sessions
    #[test]
    fn test_quit_mid_session() {
        let temp_dir = TempDir::new().expect("temp dir");
        let (mut log, path) = log_in(temp_dir.path());
        let mut provider = provider(4);
        let mut runner = SessionRunner::new(
            Recorder::default(),
            Script::new(&["", "a", "q"]),
            PainPrompt::Skip,
        );

        let outcome = runner
            .run(&mut provider, &mut log, vec![Category::Hands])
            .expect("session runs");

        assert!(!outcome.completed);
        assert_eq!(outcome.trials.len(), 1);
        assert!(outcome.header.pain_level.is_none());
        let parsed = read_log_file(&path, ParsePolicy::Strict).expect("log parses");
        assert_eq!(parsed.trial_count(), 1);
    }

    // Tests quitting at the pain prompt writes nothing
    // Verified by writing the session row before the prompt
    #[test]
    fn test_quit_before_start() {
        let temp_dir = TempDir::new().expect("temp dir");
        let (mut log, path) = log_in(temp_dir.path());
        let mut provider = provider(2);
        let mut runner =
            SessionRunner::new(Recorder::default(), Script::new(&["q"]), PainPrompt::Ask);

        let outcome = runner
            .run(&mut provider, &mut log, vec![Category::Hands])
            .expect("session runs");

        assert!(!outcome.completed);
        assert!(outcome.trials.is_empty());
        assert_eq!(std::fs::read_to_string(&path).expect("log readable"), "");
    }

    // Tests a fixed pain level skips the prompt
    // Verified by always prompting
    #[test]
    fn test_fixed_pain_level() {
        let temp_dir = TempDir::new().expect("temp dir");
        let (mut log, _) = log_in(temp_dir.path());
        let mut provider = provider(1);
        let level = PainLevel::new(7).expect("valid level");
        let mut runner = SessionRunner::new(
            Recorder::default(),
            Script::new(&["", "d"]),
            PainPrompt::Fixed(level),
        );

        let outcome = runner
            .run(&mut provider, &mut log, vec![Category::Hands])
            .expect("session runs");

        assert_eq!(outcome.header.pain_level, Some(level));
        assert_eq!(outcome.trials.len(), 1);
    }

    // Tests images that fail to display are skipped without a trial and mark the
    // session as incomplete
    // Verified by leaving the session complete after a skipped image
    #[test]
    fn test_display_failure_skips_image() {
        let temp_dir = TempDir::new().expect("temp dir");
        let (mut log, _) = log_in(temp_dir.path());
        let mut provider = provider(3);
        let recorder = Recorder { fail_on: Some(2) };
        let mut runner =
            SessionRunner::new(recorder, Script::new(&["", "a", "a"]), PainPrompt::Skip);

        let outcome = runner
            .run(&mut provider, &mut log, vec![Category::Hands])
            .expect("session runs");

        assert!(!outcome.completed);
        assert_eq!(outcome.trials.len(), 2);
        assert_eq!(provider.shown(), 3);
    }

    // Tests feedback names the true side on a miss
    // Verified by naming the response instead
    #[test]
    fn test_feedback_messages() {
        let hit = Trial::new(
            Category::Feet,
            Direction::Right,
            Direction::Right,
            Duration::from_millis(400),
        );
        let miss = Trial::new(
            Category::Feet,
            Direction::Right,
            Direction::Left,
            Duration::from_millis(400),
        );

        assert_eq!(feedback(&hit), "Correct!");
        assert_eq!(feedback(&miss), "Wrong! It's a right image");
    }
}
