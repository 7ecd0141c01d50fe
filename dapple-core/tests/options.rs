#[cfg(test)]
mod tests {
    use dapple_core::ConnectionOptions;
    use std::time::Duration;

    #[test]
    fn parse_simple() {
        let options = ConnectionOptions::parse("sqlite://data/app.db").unwrap();
        assert_eq!(options.driver, "sqlite");
        assert_eq!(options.database, "data/app.db");
        assert_eq!(options.timeout, ConnectionOptions::DEFAULT_TIMEOUT);
        assert!(options.parameters.is_empty());
    }

    #[test]
    fn parse_parameters() {
        let options =
            ConnectionOptions::parse("sqlite:///tmp/my%20db.sqlite?mode=ro&timeout=30&cache=shared")
                .unwrap();
        assert_eq!(options.database, "/tmp/my db.sqlite");
        assert_eq!(options.timeout, Duration::from_secs(30));
        assert_eq!(options.parameter("mode"), Some("ro"));
        assert_eq!(options.parameter("cache"), Some("shared"));
        assert_eq!(options.parameter("timeout"), None);
    }

    #[test]
    fn parse_memory() {
        let options = ConnectionOptions::parse("sqlite://:memory:").unwrap();
        assert_eq!(options.database, ":memory:");
        let options = ConnectionOptions::parse("fake://").unwrap();
        assert_eq!(options.driver, "fake");
        assert_eq!(options.database, "");
    }

    #[test]
    fn parse_errors() {
        assert!(ConnectionOptions::parse("data/app.db").is_err());
        assert!(ConnectionOptions::parse("://data/app.db").is_err());
        assert!(ConnectionOptions::parse("sq lite://data/app.db").is_err());
        assert!(ConnectionOptions::parse("sqlite://app.db?timeout=soon").is_err());
        assert!(ConnectionOptions::parse("sqlite://app.db?timeout=-1").is_err());
    }

    #[test]
    fn render() {
        let options = ConnectionOptions::new("sqlite", "app.db");
        assert_eq!(options.to_string(), "sqlite://app.db");
        let options = ConnectionOptions::new("sqlite", "what?#100%.db")
            .with_timeout(Duration::from_secs(5))
            .with_parameter("mode", "rwc");
        let rendered = options.to_string();
        assert_eq!(rendered, "sqlite://what%3F%23100%25.db?timeout=5&mode=rwc");
        assert_eq!(ConnectionOptions::parse(&rendered).unwrap(), options);
    }

    #[test]
    fn render_fractional_timeout() {
        let options =
            ConnectionOptions::new("sqlite", "app.db").with_timeout(Duration::from_millis(2500));
        assert_eq!(options.timeout, Duration::from_secs(2));
        let rendered = options.to_string();
        assert_eq!(rendered, "sqlite://app.db?timeout=2");
        assert_eq!(ConnectionOptions::parse(&rendered).unwrap(), options);
        let options =
            ConnectionOptions::new("sqlite", "app.db").with_timeout(Duration::from_millis(300));
        assert_eq!(options.timeout, Duration::ZERO);
        assert_eq!(ConnectionOptions::parse(&options.to_string()).unwrap(), options);
    }
}
