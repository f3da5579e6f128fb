//! tracing subscriber setup: stderr, compact, filtered by ZETTELDEV_LOG (default `warn`).
use once_cell::sync::OnceCell;
use tracing_subscriber::EnvFilter;

static INIT: OnceCell<()> = OnceCell::new();

pub const LOG_ENV: &str = "ZETTELDEV_LOG";

/// Install the global subscriber once. `verbose` raises the default level to `debug`;
/// an explicit ZETTELDEV_LOG always wins.
pub fn init_logging(verbose: bool, use_color: bool) {
    INIT.get_or_init(|| {
        let default = if verbose { "debug" } else { "warn" };
        let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
        let res = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_ansi(use_color)
            .with_target(false)
            .without_time()
            .compact()
            .try_init();
        if let Err(e) = res {
            eprintln!("zetteldev-experiment: logging: {e}");
        }
    });
}
