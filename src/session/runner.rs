//! Interactive session loop: show an image, wait for a side, log the trial

use crate::io::configuration::MAX_PAIN_LEVEL;
use crate::io::error::Result;
use crate::io::log::SessionLog;
use crate::session::assets::Asset;
use crate::session::provider::ImageProvider;
use crate::session::trial::{Category, Direction, PainLevel, SessionHeader, Trial};
use chrono::Local;
use std::time::Instant;

/// Displays prompts, images and feedback to the user
pub trait Presenter {
    /// Show a block of text
    ///
    /// # Errors
    ///
    /// Returns an error if the display cannot be written
    fn show_message(&mut self, text: &str) -> Result<()>;

    /// Show image `index` (1-based) of `total`
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be decoded or drawn
    fn show_image(&mut self, asset: &Asset, index: usize, total: usize) -> Result<()>;
}

/// Supplies raw user input, one line per response
pub trait ResponseSource {
    /// Block until the next line; `None` once input is exhausted
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be read
    fn read_line(&mut self) -> Result<Option<String>>;
}

/// A line of user input interpreted during a trial
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// The user judged the image to show this side
    Response(Direction),
    /// The user ended the session
    Quit,
    /// Anything else; ignored
    Other,
}

impl Input {
    /// Interpret a line: `a`/`l`/`left`, `d`/`r`/`right`, `q`/`quit`
    pub fn parse(line: &str) -> Self {
        match line.trim().to_ascii_lowercase().as_str() {
            "a" | "l" | "left" => Self::Response(Direction::Left),
            "d" | "r" | "right" => Self::Response(Direction::Right),
            "q" | "quit" | "exit" => Self::Quit,
            _ => Self::Other,
        }
    }
}

/// Where the session's pain level comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PainPrompt {
    /// Ask the user before the first image
    #[default]
    Ask,
    /// Use a level given up front
    Fixed(PainLevel),
    /// Do not record a pain level
    Skip,
}

/// What a finished session produced
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    /// Header written to the log
    pub header: SessionHeader,
    /// Trials recorded, in order
    pub trials: Vec<Trial>,
    /// False when some image was left unanswered
    pub completed: bool,
}

/// Drives one session against a presenter and an input source
pub struct SessionRunner<P, R> {
    presenter: P,
    input: R,
    pain_prompt: PainPrompt,
}

impl<P: Presenter, R: ResponseSource> SessionRunner<P, R> {
    /// Create a runner
    pub const fn new(presenter: P, input: R, pain_prompt: PainPrompt) -> Self {
        Self {
            presenter,
            input,
            pain_prompt,
        }
    }

    /// Run a full session, appending every trial to `log` as soon as it is answered
    ///
    /// # Errors
    ///
    /// Returns an error if input cannot be read, the display fails on text, or the log
    /// cannot be written. Images that fail to display are skipped with a warning.
    pub fn run(
        &mut self,
        provider: &mut ImageProvider,
        log: &mut SessionLog,
        items: Vec<Category>,
    ) -> Result<SessionOutcome> {
        let Some(pain_level) = self.ask_pain_level()? else {
            return Ok(Self::abandoned(items));
        };

        let intro = format!(
            "{}If the image is of a left hand or foot, type a (or left) and press Enter\n\
             If the image is of a right hand or foot, type d (or right) and press Enter\n\
             Type q to stop early. Press Enter to start.",
            pain_level.map_or_else(String::new, |p| format!("Your pain level is {p}\n")),
        );
        self.presenter.show_message(&intro)?;

        let header = SessionHeader {
            started: Local::now().fixed_offset(),
            pain_level,
            items,
        };

        if self.input.read_line()?.is_none() {
            return Ok(SessionOutcome {
                header,
                trials: Vec::new(),
                completed: false,
            });
        }

        log.start_session(&header)?;

        let total = provider.total();
        let mut trials = Vec::with_capacity(total);
        let mut completed = true;

        for (index, asset) in provider.by_ref().enumerate() {
            let shown_at = Local::now().fixed_offset();
            if let Err(e) = self.presenter.show_image(&asset, index + 1, total) {
                tracing::warn!("{e}");
                completed = false;
                continue;
            }
            let clock = Instant::now();

            let Some(response) = self.await_response()? else {
                completed = false;
                break;
            };

            let trial = Trial {
                category: asset.category,
                direction: asset.direction,
                response,
                latency: clock.elapsed(),
                timestamp: Some(shown_at),
                image_id: Some(asset.image_id.clone()),
            };

            log.record(&trial)?;
            self.presenter.show_message(&feedback(&trial))?;
            tracing::info!(
                "Image {} {} in {:.3} seconds",
                asset.path.display(),
                if trial.correct() { "correct" } else { "incorrect" },
                trial.latency_secs()
            );
            trials.push(trial);
        }

        Ok(SessionOutcome {
            header,
            trials,
            completed,
        })
    }

    // Ok(None) means the user quit or input ended before a level was given
    fn ask_pain_level(&mut self) -> Result<Option<Option<PainLevel>>> {
        match self.pain_prompt {
            PainPrompt::Fixed(level) => return Ok(Some(Some(level))),
            PainPrompt::Skip => return Ok(Some(None)),
            PainPrompt::Ask => {}
        }

        self.presenter.show_message(&format!(
            "What is your current pain level (0-{MAX_PAIN_LEVEL})? Press Enter when done"
        ))?;

        loop {
            let Some(line) = self.input.read_line()? else {
                return Ok(None);
            };
            if Input::parse(&line) == Input::Quit {
                return Ok(None);
            }
            if let Some(level) = line.trim().parse::<u8>().ok().and_then(PainLevel::new) {
                return Ok(Some(Some(level)));
            }
            self.presenter.show_message(&format!(
                "Please enter a number between 0 and {MAX_PAIN_LEVEL} and press Enter"
            ))?;
        }
    }

    // None once the user quits or input runs out
    fn await_response(&mut self) -> Result<Option<Direction>> {
        while let Some(line) = self.input.read_line()? {
            match Input::parse(&line) {
                Input::Response(direction) => return Ok(Some(direction)),
                Input::Quit => return Ok(None),
                Input::Other => {}
            }
        }
        Ok(None)
    }

    fn abandoned(items: Vec<Category>) -> SessionOutcome {
        SessionOutcome {
            header: SessionHeader {
                started: Local::now().fixed_offset(),
                pain_level: None,
                items,
            },
            trials: Vec::new(),
            completed: false,
        }
    }
}

/// Message shown after a response
pub fn feedback(trial: &Trial) -> String {
    if trial.correct() {
        "Correct!".to_string()
    } else {
        format!("Wrong! It's a {} image", trial.direction)
    }
}
