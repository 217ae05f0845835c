use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

/// Console verbosity picked on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

impl Verbosity {
    pub fn from_flags(quiet: bool, verbose: bool) -> Self {
        match (quiet, verbose) {
            (true, _) => Verbosity::Quiet,
            (false, true) => Verbosity::Verbose,
            (false, false) => Verbosity::Normal,
        }
    }

    /// Default filter directive when `RUST_LOG` is not set.
    pub fn directive(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "warn",
            Verbosity::Normal => "info",
            Verbosity::Verbose => "supplier_ingest=debug,info",
        }
    }
}

/// Installs the global subscriber on stderr. `RUST_LOG` wins over the flags.
/// Safe to call more than once; later calls are ignored.
pub fn init(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.directive()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(verbosity == Verbosity::Verbose)
        .without_time()
        .compact()
        .try_init();
}
