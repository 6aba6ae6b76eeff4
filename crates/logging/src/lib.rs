//! helpers for logging.
//!
//! Every line looks like `LEVEL message time=... target=...`.  The filter comes from `RUST_LOG` when it's set, and
//! from [LogConfig::default_filter] otherwise.

#[derive(Clone, Debug)]
pub struct LogConfig {
    /// An `env_logger` filter string, e.g. `info` or `ammo_docstore=debug`.
    pub default_filter: String,

    /// Write through the test harness's capture rather than straight to stderr.
    pub is_test: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            default_filter: "info".into(),
            is_test: false,
        }
    }
}

fn build_logger(config: &LogConfig) -> env_logger::Builder {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.default_filter));
    builder
        .format(|buf, record| {
            use std::io::Write;

            let now = time::OffsetDateTime::now_utc();

            writeln!(
                buf,
                "{} {} time={} target={}",
                record.level(),
                record.args(),
                now,
                record.target()
            )
        })
        .is_test(config.is_test);
    builder
}

/// Install the logger described by `config`.
///
/// If called multiple times in the same process, only the first call applies.
pub fn init(config: &LogConfig) {
    static ONCE: std::sync::Once = std::sync::Once::new();

    ONCE.call_once(|| {
        // Something else may have installed a logger already, e.g. another harness.  Theirs wins.
        let _ = build_logger(config).try_init();
    });
}

/// Log to stderr.
pub fn log_to_stderr() {
    init(&Default::default());
}

/// Log at debug level through the test harness, so output only shows up for failing tests.
pub fn log_for_tests() {
    init(&LogConfig {
        default_filter: "debug".into(),
        is_test: true,
    });
}
