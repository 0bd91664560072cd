//! Tests for the hands/feet, left/right taxonomy and trial records

#[cfg(test)]
mod tests {
    use chrono::DateTime;
    use gmi::session::trial::{
        Category, Direction, ImageId, PainLevel, Session, SessionHeader, Trial,
    };
    use std::time::Duration;

    // Tests tokens are matched exactly and case-sensitively
    // Verified by lowercasing tokens before matching
    #[test]
    fn test_category_tokens() {
        assert_eq!(Category::from_token("hands"), Some(Category::Hands));
        assert_eq!(Category::from_token("feet"), Some(Category::Feet));
        assert_eq!(Category::from_token("Hands"), None);
        assert_eq!(Category::from_token("hand"), None);
        assert_eq!("feet".parse::<Category>(), Ok(Category::Feet));
        assert!("toes".parse::<Category>().is_err());
    }

    // Tests direction tokens round-trip through display
    // Verified by swapping the display strings
    #[test]
    fn test_direction_tokens() {
        for direction in Direction::ALL {
            assert_eq!(Direction::from_token(direction.as_str()), Some(direction));
            assert_eq!(direction.to_string(), direction.as_str());
        }
        assert_eq!(Direction::from_token("LEFT"), None);
    }

    // Tests correctness is response equal to direction
    // Verified by comparing response with category
    #[test]
    fn test_trial_correct() {
        let hit = Trial::new(
            Category::Hands,
            Direction::Left,
            Direction::Left,
            Duration::from_millis(800),
        );
        let miss = Trial::new(
            Category::Hands,
            Direction::Left,
            Direction::Right,
            Duration::from_millis(800),
        );

        assert!(hit.correct());
        assert!(!miss.correct());
        assert!((hit.latency_secs() - 0.8).abs() < 1e-9);
    }

    // Tests image ids are short, stable content hashes
    // Verified by hashing the file name instead of contents
    #[test]
    fn test_image_id_of_contents() {
        let a = ImageId::of_contents(b"left hand");
        let b = ImageId::of_contents(b"left hand");
        let c = ImageId::of_contents(b"right hand");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.as_str().len(), 8);
        assert!(a.as_str().chars().all(|ch| ch.is_ascii_hexdigit()));
        assert_eq!(ImageId::of_contents(b"").as_str(), "e3b0c442");
    }

    // Tests image id parsing rejects anything but eight hex digits
    // Verified by accepting any length
    #[test]
    fn test_image_id_parse() {
        assert!(ImageId::parse("0123abcd").is_some());
        assert_eq!(
            ImageId::parse("0123ABCD").map(|id| id.to_string()),
            Some("0123abcd".to_string())
        );
        assert!(ImageId::parse("0123abc").is_none());
        assert!(ImageId::parse("0123abcg").is_none());
    }

    // Tests pain level bounds
    // Verified by allowing level 11
    #[test]
    fn test_pain_level_bounds() {
        assert_eq!(PainLevel::new(0).map(PainLevel::value), Some(0));
        assert_eq!(PainLevel::new(10).map(PainLevel::value), Some(10));
        assert!(PainLevel::new(11).is_none());
    }

    // Tests session duration sums latencies and header lists items
    // Verified by using the last latency only
    #[test]
    fn test_session_duration_and_items() {
        let started = DateTime::parse_from_rfc3339("2024-03-01T10:00:00+01:00")
            .expect("valid timestamp");
        let session = Session {
            header: Some(SessionHeader {
                started,
                pain_level: PainLevel::new(4),
                items: vec![Category::Hands, Category::Feet],
            }),
            trials: vec![
                Trial::new(
                    Category::Hands,
                    Direction::Left,
                    Direction::Left,
                    Duration::from_millis(500),
                ),
                Trial::new(
                    Category::Feet,
                    Direction::Right,
                    Direction::Left,
                    Duration::from_millis(1500),
                ),
            ],
        };

        assert_eq!(session.duration(), Duration::from_secs(2));
        assert_eq!(
            session.header.as_ref().map(SessionHeader::items_label),
            Some("hands feet".to_string())
        );
        assert_eq!(Session::default().duration(), Duration::ZERO);
    }
}
