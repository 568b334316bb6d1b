use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Initialise logging. Without `debug` the level is forced to `info`; with it
/// `RUST_LOG` may override the default `debug` level.
///
/// When `log_file` is given, output goes to that file instead of stderr.
pub fn init(debug: bool, log_file: Option<PathBuf>) {
    let level = if debug { "debug" } else { "info" };

    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."));
            let Some(name) = path.file_name() else {
                let _ = builder.try_init();
                return;
            };
            let appender = tracing_appender::rolling::never(dir, name);
            let _ = builder.with_ansi(false).with_writer(appender).try_init();
        }
        None => {
            let _ = builder.try_init();
        }
    }
}
