    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = Config::default();
        let result = ConfigValidator::validate(&config).unwrap();
        assert!(result.is_valid());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_validate_zero_default_step() {
        let mut config = Config::default();
        config.playback.default_step_ms = 0;

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.path == "playback.default_step_ms"));
    }

    #[test]
    fn test_validate_inverted_recommended_range() {
        let mut config = Config::default();
        config.playback.recommended_min_step_ms = 20000;

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(!result.is_valid());
    }

    #[test]
    fn test_validate_slow_settle_warning() {
        let mut config = Config::default();
        config.playback.settle_delay_ms = 5000;

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.path == "playback.settle_delay_ms"));
    }

    #[test]
    fn test_validate_unknown_backend() {
        let mut config = Config::default();
        config.storage.backend = "redis".to_string();

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.path == "storage.backend"));
    }

    #[test]
    fn test_validate_file_backend_without_path_warns() {
        let mut config = Config::default();
        config.storage.backend = "file".to_string();

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.path == "storage.path"));
    }

    #[test]
    fn test_validate_identical_keys() {
        let mut config = Config::default();
        config.storage.step_key = config.storage.mode_key.clone();

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(!result.is_valid());
    }

    #[test]
    fn test_validate_project_with_bad_api_base() {
        let mut config = Config::default();
        config.source.project_id = Some("shop".to_string());
        config.source.api_base = "ftp://example.com".to_string();

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(result.errors.iter().any(|e| e.path == "source.api_base"));
    }

    #[test]
    fn test_validate_blank_project_id() {
        let mut config = Config::default();
        config.source.project_id = Some("  ".to_string());

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(result.errors.iter().any(|e| e.path == "source.project_id"));
    }

    #[test]
    fn test_validate_rate_out_of_range() {
        let mut config = Config::default();
        config.narration.rate = 0.0;
        let result = ConfigValidator::validate(&config).unwrap();
        assert!(result.errors.iter().any(|e| e.path == "narration.rate"));

        config.narration.rate = 10.0;
        let result = ConfigValidator::validate(&config).unwrap();
        assert!(result.is_valid());
    }

    #[test]
    fn test_validate_bad_cdp_endpoint() {
        let mut config = Config::default();
        config.driver.cdp_endpoint = "localhost:9222".to_string();

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(result.errors.iter().any(|e| e.path == "driver.cdp_endpoint"));
    }

    #[test]
    fn test_validation_result_accumulates() {
        let mut result = ValidationResult::default();
        assert!(result.is_valid());

        result.add_warning(ValidationWarning::new("a", "warn"));
        assert!(result.is_valid());

        result.add_error(ValidationError::new("b", "err"));
        assert!(!result.is_valid());
        assert_eq!(result.errors[0].path, "b");
        assert_eq!(result.warnings[0].message, "warn");
    }
