pub struct EnvVars;

impl EnvVars {
    /// Overrides the `tracing` filter used by `modwalk`, in `EnvFilter` syntax.
    ///
    /// Takes precedence over the verbosity flags.
    pub const MODWALK_LOG: &'static str = "MODWALK_LOG";

    /// Path to a `modwalk.toml` that replaces configuration discovery.
    pub const MODWALK_CONFIG_FILE: &'static str = "MODWALK_CONFIG_FILE";
}

/// Basename (without extension) of a package initializer.
pub const PACKAGE_INITIALIZER: &str = "__init__";

/// File extensions that denote an importable module, in resolution order.
pub const MODULE_EXTENSIONS: [&str; 5] = ["py", "pyc", "pyo", "pyd", "so"];

/// Name of the project configuration file.
pub const MODWALK_CONFIG_FILE_NAME: &str = "modwalk.toml";
