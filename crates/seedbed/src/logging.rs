//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

/// Maps a command verbosity level to a log level directive.
pub fn level_for(verbosity: u8) -> &'static str {
	match verbosity {
		0 => "warn",
		1 => "info",
		2 => "debug",
		_ => "trace",
	}
}

/// Installs a global `fmt` subscriber for seeding output.
///
/// `RUST_LOG` takes precedence when set; otherwise the level follows
/// `verbosity`. Returns `false` if a global subscriber was already set,
/// in which case nothing changes.
pub fn init_tracing(verbosity: u8) -> bool {
	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(format!("seedbed={}", level_for(verbosity))));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_target(false)
		.try_init()
		.is_ok()
}
