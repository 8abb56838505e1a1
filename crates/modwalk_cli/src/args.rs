use camino::{Utf8Path, Utf8PathBuf};
use clap::{ArgAction, ArgMatches, CommandFactory, FromArgMatches, Parser};
use modwalk_core::{CallbackRequest, RootRequest};
use modwalk_logging::{ColorChoice, Verbosity};
use modwalk_metadata::Options;
use modwalk_static::EnvVars;
use modwalk_system::path::absolute;

const MODULES_HELP: &str = "\
MODULE is a fully qualified module name suitable for use in an import statement.
CALLBACK is the name of a built-in callback: doc, json, members, modules_only, \
packages_only, path, print or skip_private.
-i and -I apply to the MODULEs and CALLBACKs given after them.
Import errors are always ignored when discovering sub-modules and sub-packages.
If a filtering CALLBACK skips a MODULE, no later CALLBACK is called for that MODULE.";

#[derive(Debug, Parser)]
#[command(
    author,
    name = "modwalk",
    about = "Load each given module and invoke each given callback for each loaded module.",
    after_help = MODULES_HELP
)]
#[command(version)]
pub struct Args {
    /// Load each MODULE and discover and load any sub-modules or sub-packages
    #[arg(
        short = 'M',
        value_name = "MODULE",
        num_args = 1..,
        action = ArgAction::Append,
        help_heading = "Modules and callbacks"
    )]
    pub recursive_modules: Vec<String>,

    /// Load each MODULE
    #[arg(
        short = 'm',
        value_name = "MODULE",
        num_args = 1..,
        action = ArgAction::Append,
        help_heading = "Modules and callbacks"
    )]
    pub modules: Vec<String>,

    /// Call each CALLBACK for each loaded MODULE
    #[arg(
        short = 'c',
        value_name = "CALLBACK",
        num_args = 1..,
        action = ArgAction::Append,
        help_heading = "Modules and callbacks"
    )]
    pub callbacks: Vec<String>,

    /// Clear all CALLBACKs previously given on the command line
    #[arg(
        short = 'C',
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        action = ArgAction::Append,
        help_heading = "Modules and callbacks"
    )]
    pub clear_callbacks: Vec<bool>,

    /// Ignore import errors for CALLBACKs and explicitly named MODULEs
    #[arg(
        short = 'i',
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        action = ArgAction::Append,
        help_heading = "Modules and callbacks"
    )]
    pub ignore_import_errors: Vec<bool>,

    /// Do not ignore import errors for CALLBACKs and explicitly named MODULEs (default)
    #[arg(
        short = 'I',
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        action = ArgAction::Append,
        help_heading = "Modules and callbacks"
    )]
    pub no_ignore_import_errors: Vec<bool>,

    /// Directory to search for top-level modules. May be repeated [default: the working directory]
    #[arg(short = 'p', long = "search-path", value_name = "PATH")]
    pub search_paths: Vec<Utf8PathBuf>,

    /// The path to a `modwalk.toml` file to use for configuration.
    ///
    /// Configuration discovery is skipped when given.
    #[arg(long, env = EnvVars::MODWALK_CONFIG_FILE, value_name = "PATH")]
    pub config_file: Option<Utf8PathBuf>,

    /// Control when colored output is used.
    #[arg(long, value_name = "WHEN")]
    pub color: Option<ColorChoice>,

    #[clap(flatten)]
    pub verbosity: Verbosity,
}

/// Parsed arguments, with the order of module, callback and import error flags restored.
#[derive(Debug)]
pub struct Invocation {
    pub args: Args,

    /// `-M` and `-m` modules in command-line order, each with the `-i`/`-I` seen before it.
    pub modules: Vec<RootRequest>,

    /// The callbacks left after applying every `-c` and `-C` in order, or `None` when
    /// neither was given.
    pub callbacks: Option<Vec<CallbackRequest>>,

    /// The last `-i`/`-I`, if any. Applies to callbacks taken from the configuration.
    pub ignore_import_errors: Option<bool>,
}

impl Invocation {
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let matches = Args::command().try_get_matches_from(itr)?;
        let args = Args::from_arg_matches(&matches)?;

        let mut invocation = Self {
            args,
            modules: Vec::new(),
            callbacks: None,
            ignore_import_errors: None,
        };

        for event in events(&matches) {
            match event {
                Event::Module { name, recurse } => invocation.modules.push(
                    RootRequest::new(name.as_str(), recurse)
                        .with_ignore_errors(invocation.ignore_import_errors),
                ),
                Event::Callback(name) => invocation.callbacks.get_or_insert_default().push(
                    CallbackRequest::new(name.as_str())
                        .with_ignore_errors(invocation.ignore_import_errors),
                ),
                Event::ClearCallbacks => invocation.callbacks.get_or_insert_default().clear(),
                Event::IgnoreImportErrors(ignore) => invocation.ignore_import_errors = Some(ignore),
            }
        }

        Ok(invocation)
    }

    pub fn verbosity(&self) -> &Verbosity {
        &self.args.verbosity
    }

    /// Command-line values that override the configuration file.
    ///
    /// Relative search paths are resolved against `cwd`. Callbacks and the import error
    /// policy are positional, so they are carried by [`Invocation::modules`] and
    /// [`Invocation::callbacks`] instead.
    pub fn to_options(&self, cwd: &Utf8Path) -> Options {
        let search_paths = (!self.args.search_paths.is_empty()).then(|| {
            self.args
                .search_paths
                .iter()
                .map(|path| absolute(path, cwd).into_string())
                .collect()
        });

        Options {
            search_paths,
            ..Options::default()
        }
    }

    /// The callback chain to build: the command-line callbacks if any were given,
    /// otherwise `configured`.
    pub fn callback_requests(&self, configured: &[String]) -> Vec<CallbackRequest> {
        self.callbacks.clone().unwrap_or_else(|| {
            configured
                .iter()
                .map(|name| {
                    CallbackRequest::new(name.as_str())
                        .with_ignore_errors(self.ignore_import_errors)
                })
                .collect()
        })
    }
}

/// A flag whose effect depends on where it appears on the command line.
enum Event<'a> {
    Module { name: &'a String, recurse: bool },
    Callback(&'a String),
    ClearCallbacks,
    IgnoreImportErrors(bool),
}

/// Values of `id` paired with their position on the command line.
fn indexed<'a, T>(matches: &'a ArgMatches, id: &str) -> Vec<(usize, &'a T)>
where
    T: Clone + Send + Sync + 'static,
{
    let indices = matches.indices_of(id).into_iter().flatten();
    let values = matches.get_many::<T>(id).into_iter().flatten();
    indices.zip(values).collect()
}

/// Occurrences of `id` that were not switched off with `=false`.
fn switches(matches: &ArgMatches, id: &str) -> impl Iterator<Item = usize> {
    indexed::<bool>(matches, id)
        .into_iter()
        .filter_map(|(index, enabled)| (*enabled).then_some(index))
}

fn events(matches: &ArgMatches) -> Vec<Event<'_>> {
    let mut events: Vec<(usize, Event)> = Vec::new();

    events.extend(
        indexed::<String>(matches, "recursive_modules")
            .into_iter()
            .map(|(index, name)| (index, Event::Module { name, recurse: true })),
    );
    events.extend(
        indexed::<String>(matches, "modules")
            .into_iter()
            .map(|(index, name)| (index, Event::Module { name, recurse: false })),
    );
    events.extend(
        indexed::<String>(matches, "callbacks")
            .into_iter()
            .map(|(index, name)| (index, Event::Callback(name))),
    );
    events.extend(
        switches(matches, "clear_callbacks").map(|index| (index, Event::ClearCallbacks)),
    );
    events.extend(
        switches(matches, "ignore_import_errors")
            .map(|index| (index, Event::IgnoreImportErrors(true))),
    );
    events.extend(
        switches(matches, "no_ignore_import_errors")
            .map(|index| (index, Event::IgnoreImportErrors(false))),
    );

    events.sort_by_key(|(index, _)| *index);
    events.into_iter().map(|(_, event)| event).collect()
}
