//! Logger bootstrap.
//!
//! Library crates only speak to the `log` facade. Hosts and test binaries call
//! [`init_logger`] once to route records to the console and, optionally, to a
//! rolling log file.

pub mod consts;

#[cfg(not(target_arch = "wasm32"))]
mod appender;
#[cfg(not(target_arch = "wasm32"))]
mod logger;

use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LogError {
    #[error("Logger spec parsing error: {0}")]
    ParseLoggerSpecError(String),

    #[error("Log appender error: {0}")]
    Appender(String),

    #[error("Logger configuration error: {0}")]
    Config(String),

    #[error("A global logger is already installed")]
    AlreadyInitialized,
}

#[cfg(not(target_arch = "wasm32"))]
pub fn try_init_logger(log_dir: Option<&str>, filters: &str) -> Result<(), LogError> {
    use appender::AppenderSpec;
    use consts::{DEFAULT_LOGGER_ENV, ERR_LOG_FILE_NAME, LOG_FILE_NAME};
    use log::LevelFilter;
    use log4rs::{Config, config::Root};

    const CONSOLE_APPENDER: &str = "stdout";
    const LOG_FILE_APPENDER: &str = "log_file";
    const ERR_LOG_FILE_APPENDER: &str = "err_log_file";

    let loggers = logger::Builder::new().root_level(LevelFilter::Info).parse_env(DEFAULT_LOGGER_ENV).parse_expression(filters).build();

    let mut specs = vec![AppenderSpec::console(CONSOLE_APPENDER, None)];
    if let Some(log_dir) = log_dir {
        specs.push(AppenderSpec::roller(LOG_FILE_APPENDER, None, log_dir, LOG_FILE_NAME)?);
        specs.push(AppenderSpec::roller(ERR_LOG_FILE_APPENDER, Some(LevelFilter::Warn), log_dir, ERR_LOG_FILE_NAME)?);
    }
    let names = specs.iter().map(|x| x.name).collect::<Vec<_>>();

    let config = Config::builder()
        .appenders(specs.iter_mut().filter_map(|x| x.appender()))
        .loggers(loggers.items())
        .build(Root::builder().appenders(names).build(loggers.root_level()))
        .map_err(|err| LogError::Config(err.to_string()))?;

    log4rs::init_config(config).map_err(|_| LogError::AlreadyInitialized)?;
    log::set_max_level(loggers.max_level());

    for rejected in loggers.rejected() {
        log::warn!("Ignoring invalid logging spec: {}", rejected);
    }
    Ok(())
}

/// Installs the global logger. Repeated calls (e.g. from several tests) are ignored.
#[cfg(not(target_arch = "wasm32"))]
pub fn init_logger(log_dir: Option<&str>, filters: &str) {
    match try_init_logger(log_dir, filters) {
        Ok(()) | Err(LogError::AlreadyInitialized) => {}
        Err(err) => eprintln!("Failed to initialize the logger: {}", err),
    }
}

#[cfg(target_arch = "wasm32")]
pub fn init_logger(_log_dir: Option<&str>, _filters: &str) {}

/// Tries to init the global logger, but does not panic if it was already setup.
/// Should be used for tests.
pub fn try_init_test_logger() {
    init_logger(None, "info");
}
