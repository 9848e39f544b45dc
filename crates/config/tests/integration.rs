//! Integration tests for config

#[cfg(test)]
mod tests {
    use esmc_config::constants::*;
    use esmc_config::*;
    use esmc_types::{ColorChoice, SignaturePayload};
    use std::io::Write;
    use std::path::Path;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Mutex to ensure env var tests don't run concurrently
    static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

    fn clear_env() {
        for var in [
            ENV_VERBOSE,
            ENV_SIGNING_SECRET,
            ENV_ROOT,
            ENV_IO_TIMEOUT,
            ENV_COLOR,
        ] {
            std::env::remove_var(var);
        }
    }

    #[tokio::test]
    async fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[general]
verbose = true
color = "never"

[paths]
marker_dir = ".claude"
max_root_hops = 4

[integrity]
key_prefix = "custom:"
signature_payload = "compact"
io_timeout_secs = 5
max_concurrency = 2
        "#
        )
        .unwrap();

        let config = Config::load_from_file(temp_file.path()).await.unwrap();
        assert!(config.general.verbose);
        assert_eq!(config.general.color, ColorChoice::Never);
        assert_eq!(config.paths.marker_dir, ".claude");
        assert_eq!(config.paths.max_root_hops, 4);
        assert_eq!(config.integrity.key_prefix, "custom:");
        assert_eq!(config.integrity.signature_payload, SignaturePayload::Compact);
        assert_eq!(config.integrity.io_timeout().as_secs(), 5);
        assert_eq!(config.integrity.max_concurrency, 2);
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let result = Config::load_from_file(Path::new("/nonexistent/esmc.toml")).await;
        assert!(matches!(
            result,
            Err(esmc_errors::Error::Config(esmc_errors::ConfigError::NotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn test_zero_concurrency_rejected() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[integrity]\nmax_concurrency = 0").unwrap();
        assert!(Config::load_from_file(temp_file.path()).await.is_err());
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(!config.general.verbose);
        assert_eq!(config.paths.marker_dir, DEFAULT_MARKER_DIR);
        assert!(config.integrity.secret.is_none());
        assert_eq!(config.integrity.signature_payload, SignaturePayload::Raw);
    }

    #[test]
    fn test_merge_env() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        clear_env();

        std::env::set_var(ENV_VERBOSE, "1");
        std::env::set_var(ENV_SIGNING_SECRET, "hunter2");
        std::env::set_var(ENV_ROOT, "/srv/pkg");
        std::env::set_var(ENV_IO_TIMEOUT, "7");

        let mut config = Config::default();
        config.merge_env().unwrap();

        assert!(config.general.verbose);
        assert_eq!(config.integrity.secret.as_deref(), Some("hunter2"));
        assert_eq!(config.paths.root.as_deref(), Some(Path::new("/srv/pkg")));
        assert_eq!(config.integrity.io_timeout_secs, 7);

        clear_env();
    }

    #[test]
    fn test_empty_secret_is_ignored() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        clear_env();

        std::env::set_var(ENV_SIGNING_SECRET, "");
        let mut config = Config::default();
        config.merge_env().unwrap();
        assert!(config.integrity.secret.is_none());

        clear_env();
    }

    #[test]
    fn test_invalid_env_value() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        clear_env();

        std::env::set_var(ENV_VERBOSE, "sometimes");
        let mut config = Config::default();
        assert!(config.merge_env().is_err());

        clear_env();
    }

    #[test]
    fn test_secret_redacted_in_debug() {
        let mut config = Config::default();
        config.integrity.secret = Some("hunter2".into());
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_explicit_root_skips_discovery() {
        let mut config = Config::default();
        config.paths.root = Some("/srv/pkg".into());
        assert_eq!(config.resolve_root(Path::new("/tmp")), Path::new("/srv/pkg"));
    }
}
