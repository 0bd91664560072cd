//! Trial records, the left/right and hands/feet taxonomy, and session headers

use crate::io::configuration::{IMAGE_ID_LEN, MAX_PAIN_LEVEL};
use chrono::{DateTime, FixedOffset};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fmt::Write as _;
use std::str::FromStr;
use std::time::Duration;

/// What an image shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// Images of hands
    Hands,
    /// Images of feet
    Feet,
}

impl Category {
    /// Both categories in report order
    pub const ALL: [Self; 2] = [Self::Hands, Self::Feet];

    /// Token used in directory names and log rows
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hands => "hands",
            Self::Feet => "feet",
        }
    }

    /// Match an exact lowercase token
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "hands" => Some(Self::Hands),
            "feet" => Some(Self::Feet),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = crate::io::error::ParseErrorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_token(s).ok_or_else(|| crate::io::error::ParseErrorKind::UnknownToken {
            field: "category",
            token: s.to_string(),
        })
    }
}

/// Laterality: the side an image shows, or the side the user chose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    /// Left hand or foot
    Left,
    /// Right hand or foot
    Right,
}

impl Direction {
    /// Both directions in report order
    pub const ALL: [Self; 2] = [Self::Left, Self::Right];

    /// Token used in directory names and log rows
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    /// Match an exact lowercase token
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = crate::io::error::ParseErrorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_token(s).ok_or_else(|| crate::io::error::ParseErrorKind::UnknownToken {
            field: "direction",
            token: s.to_string(),
        })
    }
}

/// Short content hash identifying an image across sessions
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageId(String);

impl ImageId {
    /// Hash raw image bytes
    pub fn of_contents(bytes: &[u8]) -> Self {
        let digest = Sha256::digest(bytes);
        let mut hex = String::with_capacity(IMAGE_ID_LEN);
        for byte in digest.iter().take(IMAGE_ID_LEN / 2) {
            let _ = write!(hex, "{byte:02x}");
        }
        Self(hex)
    }

    /// Accept an id read back from a log; must be exactly eight hex digits
    pub fn parse(value: &str) -> Option<Self> {
        (value.len() == IMAGE_ID_LEN && value.chars().all(|c| c.is_ascii_hexdigit()))
            .then(|| Self(value.to_ascii_lowercase()))
    }

    /// Hex representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Self-reported pain level, 0 to 10
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PainLevel(u8);

impl PainLevel {
    /// Validate a pain level
    pub const fn new(level: u8) -> Option<Self> {
        if level <= MAX_PAIN_LEVEL {
            Some(Self(level))
        } else {
            None
        }
    }

    /// Numeric value
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for PainLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One presented image and the user's judgement of it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trial {
    /// What the image shows
    pub category: Category,
    /// Ground-truth side, taken from the image's directory
    pub direction: Direction,
    /// Side the user chose
    pub response: Direction,
    /// Time from the image appearing to the response
    pub latency: Duration,
    /// When the image was shown
    pub timestamp: Option<DateTime<FixedOffset>>,
    /// Which image was shown
    pub image_id: Option<ImageId>,
}

impl Trial {
    /// Create a trial without timestamp or image id
    pub const fn new(
        category: Category,
        direction: Direction,
        response: Direction,
        latency: Duration,
    ) -> Self {
        Self {
            category,
            direction,
            response,
            latency,
            timestamp: None,
            image_id: None,
        }
    }

    /// Whether the response matches the image's side
    pub fn correct(&self) -> bool {
        self.response == self.direction
    }

    /// Latency in seconds
    pub const fn latency_secs(&self) -> f64 {
        self.latency.as_secs_f64()
    }
}

/// Metadata written at the start of each session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionHeader {
    /// When the session started
    pub started: DateTime<FixedOffset>,
    /// Pain level reported before the first image
    pub pain_level: Option<PainLevel>,
    /// Categories the session drew images from
    pub items: Vec<Category>,
}

impl SessionHeader {
    /// Space separated category list, as written to the log
    pub fn items_label(&self) -> String {
        self.items
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// One row of a session log
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEntry {
    /// Start of a new session
    Session(SessionHeader),
    /// A recorded response
    Trial(Trial),
}

/// A session header and the trials recorded under it, in file order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// `None` for trials that precede any session row
    pub header: Option<SessionHeader>,
    /// Trials in the order they were recorded
    pub trials: Vec<Trial>,
}

impl Session {
    /// Sum of all response latencies
    pub fn duration(&self) -> Duration {
        self.trials.iter().map(|t| t.latency).sum()
    }
}
