    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = Config::default();
        let result = ConfigValidator::validate(&config).unwrap();
        assert!(result.is_valid());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_validate_empty_level() {
        let mut config = Config::default();
        config.logging.level = "  ".to_string();

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.path == "logging.level"));
    }

    #[test]
    fn test_validate_unknown_level() {
        let mut config = Config::default();
        config.logging.level = "loud".to_string();

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(!result.is_valid());
        let err = result.into_error().unwrap();
        assert!(err.to_string().contains("loud"));
    }

    #[test]
    fn test_validate_level_case_insensitive() {
        let mut config = Config::default();
        config.logging.level = "DEBUG".to_string();
        assert!(ConfigValidator::validate(&config).unwrap().is_valid());
    }

    #[test]
    fn test_validate_filter_directive() {
        let mut config = Config::default();
        config.logging.level = "info,trellis_core=debug".to_string();
        assert!(ConfigValidator::validate(&config).unwrap().is_valid());
    }

    #[test]
    fn test_validate_empty_directory() {
        let mut config = Config::default();
        config.logging.directory = Some(String::new());

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(result.errors.iter().any(|e| e.path == "logging.directory"));
    }

    #[test]
    fn test_validate_directory_without_file_warning() {
        let mut config = Config::default();
        config.logging.file = false;
        config.logging.directory = Some("/tmp/trellis".to_string());

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.path == "logging.directory"));
    }

    #[test]
    fn test_validate_override_warning() {
        let mut config = Config::default();
        config.container.override_required_modules = true;

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(result.is_valid());
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_into_error_when_valid() {
        let result = ConfigValidator::validate(&Config::default()).unwrap();
        assert!(result.into_error().is_none());
    }
