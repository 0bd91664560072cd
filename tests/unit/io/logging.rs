//! Tests for diagnostic level selection

#[cfg(test)]
mod tests {
    use gmi::io::logging::{init, level_for};
    use tracing::Level;

    // Tests warnings are the default and each -v adds detail
    // Verified by defaulting to info
    #[test]
    fn test_level_for_verbosity() {
        assert_eq!(level_for(0, false), Level::WARN);
        assert_eq!(level_for(1, false), Level::INFO);
        assert_eq!(level_for(2, false), Level::DEBUG);
        assert_eq!(level_for(9, false), Level::DEBUG);
    }

    // Tests quiet wins over verbose
    // Verified by checking verbosity before quiet
    #[test]
    fn test_quiet_overrides_verbose() {
        assert_eq!(level_for(0, true), Level::ERROR);
        assert_eq!(level_for(3, true), Level::ERROR);
    }

    // Tests installing the subscriber twice does not panic
    // Verified by using init instead of try_init
    #[test]
    fn test_init_is_repeatable() {
        init(1, false);
        init(0, true);
        tracing::info!("logging initialized");
    }
}
