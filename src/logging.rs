use tracing_subscriber::EnvFilter;

/// Crate targets that receive log output. The library and the binary share
/// the `temporal_picker` crate name.
const CRATE_TARGETS: &[&str] = &["temporal_picker"];

/// Initialize tracing from the `-v` count: none -> warn, `-v` -> info,
/// `-vv` -> debug, more -> trace. `RUST_LOG` overrides the flag.
pub fn init(verbosity: u8) {
	let level = match verbosity {
		0 => "warn",
		1 => "info",
		2 => "debug",
		_ => "trace",
	};

	let default_filter: String = CRATE_TARGETS
		.iter()
		.map(|target| format!("{target}={level}"))
		.collect::<Vec<_>>()
		.join(",");

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.init();
}
