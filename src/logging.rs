use flexi_logger::{
    Cleanup, Criterion, FileSpec, FlexiLoggerError, Logger, LoggerHandle, Naming, opt_format,
};
use std::path::Path;

/// Starts the global logger.
///
/// `RUST_LOG` wins over `level`. With a `log_dir`, output goes to rotated files
/// there instead of stderr. Keep the returned handle alive for the whole run.
pub fn setup_logging(level: &str, log_dir: Option<&Path>) -> Result<LoggerHandle, FlexiLoggerError> {
    let logger = Logger::try_with_env_or_str(level)?;

    match log_dir {
        Some(dir) => logger
            .log_to_file(FileSpec::default().directory(dir).basename("shut_the_box"))
            .format(opt_format)
            .rotate(
                Criterion::Size(10 * 1024 * 1024), // Rotate logs after they reach 10 MB
                Naming::Numbers,
                Cleanup::KeepLogFiles(3),
            )
            .start(),
        None => logger.format(flexi_logger::colored_default_format).start(),
    }
}
