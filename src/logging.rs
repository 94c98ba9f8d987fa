use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

/// Initialise logging. In debug mode the default level is `debug` and the
/// `RUST_LOG` environment variable may override it; otherwise the level is
/// forced to `info` so a stray `RUST_LOG` cannot make the tool verbose.
/// When `log_file` is given, output goes to that file instead of stderr.
pub fn init(debug: bool, log_file: Option<PathBuf>) {
    let level = if debug { "debug" } else { "info" };

    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    };

    if let Some(path) = log_file {
        let dir = path.parent().map(PathBuf::from).unwrap_or_else(|| ".".into());
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "translator_bubble.log".into());
        let appender = tracing_appender::rolling::never(dir, name);
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(appender)
            .with_ansi(false)
            .try_init();
    } else {
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    }
}
