use std::fmt;

use modwalk_static::EnvVars;
use thiserror::Error;
use tracing_subscriber::{
    EnvFilter,
    filter::{LevelFilter, ParseError},
    fmt::{format::Writer, time::FormatTime},
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Default)]
pub enum VerbosityLevel {
    /// Only shows modwalk events up to [`ERROR`](tracing::Level::ERROR).
    /// Corresponds to `-q`.
    Quiet,

    /// Default output level. Only shows modwalk events up to the [`WARN`](tracing::Level::WARN).
    #[default]
    Default,

    /// Enables verbose output. Emits modwalk events up to the [`INFO`](tracing::Level::INFO).
    /// Corresponds to `-v`.
    Verbose,

    /// Enables a more verbose tracing format and emits modwalk events up to [`DEBUG`](tracing::Level::DEBUG).
    /// Corresponds to `-vv`
    ExtraVerbose,

    /// Enables all tracing events and uses a tree-like output format. Corresponds to `-vvv`.
    Trace,
}

impl VerbosityLevel {
    #[must_use]
    pub const fn level_filter(self) -> LevelFilter {
        match self {
            Self::Quiet => LevelFilter::ERROR,
            Self::Default => LevelFilter::WARN,
            Self::Verbose => LevelFilter::INFO,
            Self::ExtraVerbose => LevelFilter::DEBUG,
            Self::Trace => LevelFilter::TRACE,
        }
    }
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct Verbosity {
    #[arg(
        long,
        short = 'v',
        help = "Use verbose output (or `-vv` and `-vvv` for more verbose output)",
        action = clap::ArgAction::Count,
        global = true
    )]
    verbose: u8,

    #[arg(long, short = 'q', help = "Only report errors", global = true)]
    quiet: bool,
}

impl Verbosity {
    /// Returns the verbosity level based on the number of `-v` flags.
    ///
    /// `-q` wins over any number of `-v` flags.
    pub const fn level(&self) -> VerbosityLevel {
        if self.quiet {
            return VerbosityLevel::Quiet;
        }

        match self.verbose {
            0 => VerbosityLevel::Default,
            1 => VerbosityLevel::Verbose,
            2 => VerbosityLevel::ExtraVerbose,
            _ => VerbosityLevel::Trace,
        }
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ColorChoice {
    /// Enables colored output only when the output is going to a terminal or TTY with support.
    #[default]
    Auto,

    /// Enables colored output regardless of the detected environment.
    Always,

    /// Disables colored output.
    Never,
}

/// Forces `colored` on or off unless `choice` is [`ColorChoice::Auto`].
pub fn set_colored_override(choice: Option<ColorChoice>) {
    match choice.unwrap_or_default() {
        ColorChoice::Auto => {}
        ColorChoice::Always => colored::control::set_override(true),
        ColorChoice::Never => colored::control::set_override(false),
    }
}

#[derive(Debug, Error)]
pub enum TracingSetupError {
    #[error("invalid `{var}` filter: {source}")]
    InvalidFilter {
        var: &'static str,
        #[source]
        source: ParseError,
    },

    #[error(transparent)]
    Init(#[from] TryInitError),
}

/// Builds the event filter for `level`.
///
/// `MODWALK_LOG`, when set, replaces the verbosity-derived filter entirely.
pub fn env_filter(level: VerbosityLevel) -> Result<EnvFilter, TracingSetupError> {
    match std::env::var(EnvVars::MODWALK_LOG) {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::builder()
            .parse(directives)
            .map_err(|source| TracingSetupError::InvalidFilter {
                var: EnvVars::MODWALK_LOG,
                source,
            }),
        _ => Ok(EnvFilter::default().add_directive(level.level_filter().into())),
    }
}

/// Installs the global `tracing` subscriber. All output goes to stderr.
pub fn setup_tracing(level: VerbosityLevel) -> Result<(), TracingSetupError> {
    let filter = env_filter(level)?;
    let registry = tracing_subscriber::registry().with(filter);

    match level {
        VerbosityLevel::Trace => registry
            .with(
                tracing_tree::HierarchicalLayer::new(2)
                    .with_indent_lines(true)
                    .with_bracketed_fields(true)
                    .with_targets(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()?,
        VerbosityLevel::ExtraVerbose => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_timer(LocalTime)
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()?,
        VerbosityLevel::Quiet | VerbosityLevel::Default | VerbosityLevel::Verbose => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .without_time()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()?,
    }

    Ok(())
}

struct LocalTime;

impl FormatTime for LocalTime {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%H:%M:%S%.3f"))
    }
}
