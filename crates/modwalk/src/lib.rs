use std::ffi::OsString;
use std::io::{self, BufWriter, Write};
use std::process::{ExitCode, Termination};

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::CommandFactory;
use colored::Colorize;
use modwalk_cli::{Args, Invocation};
use modwalk_core::{
    CallbackRegistry, FileResolver, ModuleCache, TracingSink, modwalk, resolve_callbacks,
    resolve_roots,
};
use modwalk_logging::{set_colored_override, setup_tracing};
use modwalk_metadata::{ProjectMetadata, ProjectOptionsOverrides};
use modwalk_system::{OsSystem, System, path::absolute};

pub fn modwalk_main(f: impl FnOnce(Vec<OsString>) -> Vec<OsString>) -> ExitStatus {
    run(f).unwrap_or_else(|error| {
        // A closed stdout, such as `modwalk -M pkg | head`, ends the walk quietly.
        if is_broken_pipe(&error) {
            return ExitStatus::Success;
        }

        let mut stderr = io::stderr().lock();

        writeln!(stderr, "{}", "modwalk failed".red().bold()).ok();
        for cause in error.chain() {
            writeln!(stderr, "  {} {cause}", "Cause:".bold()).ok();
        }

        ExitStatus::Error
    })
}

fn is_broken_pipe(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| {
        cause
            .downcast_ref::<io::Error>()
            .is_some_and(|error| error.kind() == io::ErrorKind::BrokenPipe)
    })
}

fn run(f: impl FnOnce(Vec<OsString>) -> Vec<OsString>) -> anyhow::Result<ExitStatus> {
    let args = wild::args_os();

    let args = f(
        argfile::expand_args_from(args, argfile::parse_fromfile, argfile::PREFIX)
            .context("Failed to read CLI arguments from file")?,
    );

    let invocation = Invocation::try_parse_from(args).unwrap_or_else(|error| error.exit());

    set_colored_override(invocation.args.color);

    let verbosity = invocation.verbosity().level();
    setup_tracing(verbosity).context("Failed to set up logging")?;

    if invocation.modules.is_empty() {
        let mut stdout = io::stdout().lock();
        write!(stdout, "{}", Args::command().render_help())?;
        return Ok(ExitStatus::Success);
    }

    walk(&invocation)
}

fn walk(invocation: &Invocation) -> anyhow::Result<ExitStatus> {
    let cwd = {
        let cwd = std::env::current_dir().context("Failed to get the current working directory")?;
        Utf8PathBuf::from_path_buf(cwd).map_err(|path| {
            anyhow::anyhow!(
                "The current working directory `{}` contains non-Unicode characters. modwalk only supports Unicode paths.",
                path.display()
            )
        })?
    };

    tracing::debug!(cwd = %cwd, "Working directory");

    let system = OsSystem::new(&cwd);

    let config_file = invocation
        .args
        .config_file
        .as_ref()
        .map(|path| absolute(path, &cwd));

    let mut project_metadata = if let Some(config_file) = &config_file {
        ProjectMetadata::from_config_file(config_file.clone(), &system)?
    } else {
        ProjectMetadata::discover(system.current_directory(), &system)?
    };

    let overrides = ProjectOptionsOverrides::new(config_file, invocation.to_options(&cwd));
    project_metadata.apply_overrides(&overrides);

    let settings = project_metadata
        .to_settings(&system)
        .context("Invalid configuration")?;

    tracing::debug!("Search paths: {:?}", settings.search_paths());

    let sink = TracingSink::new(settings.import_levels());
    let resolver = FileResolver::new(
        &system,
        settings.search_paths().to_vec(),
        ModuleCache::new(),
    );

    let specs = resolve_roots(
        &invocation.modules,
        &resolver,
        settings.ignore_import_errors(),
        &sink,
    )
    .context("Failed to load a requested module")?;

    let chain = resolve_callbacks(
        &invocation.callback_requests(settings.callbacks()),
        &CallbackRegistry::builtin(),
        settings.ignore_import_errors(),
        &sink,
    )
    .context("Failed to load a requested callback")?;

    let mut stdout = BufWriter::new(io::stdout().lock());
    modwalk(specs, &chain, &resolver, &system, &sink, &mut stdout)?;
    stdout.flush()?;

    Ok(ExitStatus::Success)
}

#[derive(Copy, Clone)]
pub enum ExitStatus {
    /// Every requested module was walked.
    Success = 0,

    /// The walk was aborted.
    Error = 2,
}

impl Termination for ExitStatus {
    fn report(self) -> ExitCode {
        ExitCode::from(self as u8)
    }
}
