use std::sync::Once;

static INIT: Once = Once::new();

const DEFAULT_FILTER: &str = "info";

/// Installs a test-mode env_logger once per process.
///
/// Honours `RUST_LOG`; defaults to `info`.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(DEFAULT_FILTER))
            .is_test(true)
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_is_info() {
        assert_eq!(DEFAULT_FILTER, "info");
        init_test_logging();
        init_test_logging();
        assert!(log::log_enabled!(log::Level::Info) || std::env::var("RUST_LOG").is_ok());
    }
}
