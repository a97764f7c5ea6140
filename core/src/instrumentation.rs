use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

const DEFAULT_DIRECTIVE: &str = "warn";
const VERBOSE_DIRECTIVE: &str = "debug";

/// Picks the filter directive: `--verbose` always wins, then `RUST_LOG`, then `warn`.
fn filter_directive(verbose: bool, env_directive: Option<String>) -> String {
    if verbose {
        return VERBOSE_DIRECTIVE.to_string();
    }

    env_directive
        .filter(|directive| !directive.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_DIRECTIVE.to_string())
}

/// Sets up tracing for a single command invocation.
///
/// Everything goes to stderr so that stdout only carries command output.
pub fn init_instrumentation(verbose: bool) {
    INIT.call_once(|| {
        let directive = filter_directive(verbose, std::env::var(EnvFilter::DEFAULT_ENV).ok());
        let filter =
            EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_level(true)
            .with_writer(std::io::stderr)
            .finish();

        if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
            eprintln!("Failed to set tracing subscriber: {err}");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(true, None, "debug")]
    #[case(true, Some("trace"), "debug")]
    #[case(false, None, "warn")]
    #[case(false, Some(""), "warn")]
    #[case(false, Some("kctl=trace"), "kctl=trace")]
    fn test_filter_directive(
        #[case] verbose: bool,
        #[case] env_directive: Option<&str>,
        #[case] expected: &str,
    ) {
        let directive = filter_directive(verbose, env_directive.map(str::to_string));
        assert_eq!(directive, expected);
    }
}
