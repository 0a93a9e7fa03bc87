use std::io::Write as _;

use anyhow::Context as _;

pub const DEBUG_ENV: &str = "DEBUG";

const DEBUG_BANNER: &str = "DEBUG enabled - Showing stacktrace";
const TRUTHY: &[&str] = &["true", "1", "yes", "on"];
const TEST_HARNESS_PREFIXES: &[&str] = &["NEXTEST", "RUST_TEST_THREADS", "DOCS2PDF_TEST"];

pub fn init() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new("info"))
        .context("build log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("initialize tracing subscriber: {err}"))?;

    Ok(())
}

/// Whether caught errors should be dumped with their full chain and backtrace.
pub fn debug_traces_enabled() -> bool {
    debug_traces_enabled_in(std::env::vars_os().map(|(key, value)| {
        (
            key.to_string_lossy().into_owned(),
            value.to_string_lossy().into_owned(),
        )
    }))
}

/// `DEBUG` must hold a truthy value, and no test-harness variable may be set.
pub fn debug_traces_enabled_in<I>(vars: I) -> bool
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut debug = false;
    for (key, value) in vars {
        if TEST_HARNESS_PREFIXES
            .iter()
            .any(|prefix| key.starts_with(prefix))
        {
            return false;
        }
        if key == DEBUG_ENV {
            let value = value.trim().to_ascii_lowercase();
            debug = TRUTHY.contains(&value.as_str());
        }
    }
    debug
}

/// Dumps `err` to stderr when debug traces are on; otherwise does nothing.
pub fn dump_error(err: &anyhow::Error) {
    if !debug_traces_enabled() {
        return;
    }
    let mut stderr = std::io::stderr().lock();
    let _ = writeln!(stderr, "{DEBUG_BANNER}");
    let _ = writeln!(stderr, "{err:?}");
    let _ = writeln!(stderr, "{DEBUG_BANNER}");
}
