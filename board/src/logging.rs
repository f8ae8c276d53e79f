use env_logger::{Builder, Env};

pub const DEFAULT_FILTER: &str = "info";

/// Logs go to stderr so they never interleave with the board on stdout.
pub fn init() {
    let mut builder = Builder::from_env(Env::default().default_filter_or(DEFAULT_FILTER));
    builder.target(env_logger::Target::Stderr).format_timestamp_millis();

    // A second init (tests, embedding) keeps the first logger.
    if builder.try_init().is_err() {
        log::debug!("Logger already initialised");
    }
}
