use std::path::{Path, PathBuf};
use std::time::Duration;

use facet::Facet;

use crate::command::ShellRunner;
use crate::error::VexError;
use crate::machine_readable::{DEFAULT_COMMA_TOKEN, DEFAULT_NEWLINE_TOKEN, Escapes};

pub const CONFIG_FILE_NAME: &str = "vex.toml";

#[derive(Debug, Clone, Default, Facet)]
#[facet(default)]
pub struct Config {
    #[facet(default)]
    pub vagrant: VagrantConfig,
    #[facet(default)]
    pub machine_readable: MachineReadableConfig,
    #[facet(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Facet)]
#[facet(default)]
pub struct VagrantConfig {
    #[facet(default = "vagrant")]
    pub binary: String,
    /// Directory containing the Vagrantfile; defaults to the current directory.
    pub working_dir: Option<String>,
    pub timeout_s: Option<u64>,
}

impl Default for VagrantConfig {
    fn default() -> Self {
        Self {
            binary: "vagrant".into(),
            working_dir: None,
            timeout_s: None,
        }
    }
}

#[derive(Debug, Clone, Facet)]
#[facet(default)]
pub struct MachineReadableConfig {
    #[facet(default = "%!(VAGRANT_COMMA)")]
    pub comma_token: String,
    #[facet(default = "\\n")]
    pub newline_token: String,
}

impl Default for MachineReadableConfig {
    fn default() -> Self {
        Self {
            comma_token: DEFAULT_COMMA_TOKEN.into(),
            newline_token: DEFAULT_NEWLINE_TOKEN.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Facet)]
#[facet(default)]
pub struct LoggingConfig {
    /// Append debug logs to this file.
    pub log_file: Option<String>,
}

impl Config {
    pub fn escapes(&self) -> Escapes {
        Escapes {
            comma: self.machine_readable.comma_token.clone(),
            newline: self.machine_readable.newline_token.clone(),
        }
    }

    pub fn runner(&self) -> ShellRunner {
        let mut runner = ShellRunner::new();
        if let Some(ref dir) = self.vagrant.working_dir {
            runner = runner.with_working_dir(dir);
        }
        if let Some(secs) = self.vagrant.timeout_s {
            runner = runner.with_timeout(Duration::from_secs(secs));
        }
        runner
    }

    pub fn log_file(&self) -> Option<&Path> {
        self.logging.log_file.as_deref().map(Path::new)
    }
}

fn validate_config(config: &Config) -> Result<(), VexError> {
    if config.vagrant.binary.trim().is_empty() {
        return Err(VexError::Validation {
            message: "vagrant.binary must not be empty".into(),
        });
    }

    if config.vagrant.timeout_s == Some(0) {
        return Err(VexError::Validation {
            message: "vagrant.timeout_s must be greater than zero".into(),
        });
    }

    let mr = &config.machine_readable;
    for (field, token) in [
        ("comma_token", &mr.comma_token),
        ("newline_token", &mr.newline_token),
    ] {
        if token.is_empty() {
            return Err(VexError::Validation {
                message: format!("machine_readable.{field} must not be empty"),
            });
        }
        if token.contains(',') {
            return Err(VexError::Validation {
                message: format!("machine_readable.{field} must not contain a comma"),
            });
        }
    }
    if mr.comma_token == mr.newline_token {
        return Err(VexError::Validation {
            message: "machine_readable tokens must differ".into(),
        });
    }

    Ok(())
}

fn parse_config(contents: &str, path: &Path) -> Result<Config, VexError> {
    let config: Config = facet_toml::from_str(contents).map_err(|e| VexError::ConfigParse {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    validate_config(&config)?;
    Ok(config)
}

/// Candidate locations when no explicit path is given: `./vex.toml`, then
/// `~/.config/vex/vex.toml`.
fn default_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("vex").join(CONFIG_FILE_NAME));
    }
    paths
}

// ── public API ────────────────────────────────────────────

pub fn load_config(path: &Path) -> Result<Config, VexError> {
    let contents = std::fs::read_to_string(path).map_err(|source| VexError::ConfigLoad {
        path: path.display().to_string(),
        source,
    })?;
    parse_config(&contents, path)
}

/// Load the explicit config if given, else the first default location that
/// exists, else built-in defaults.
pub fn resolve_config(explicit: Option<&Path>) -> Result<Config, VexError> {
    if let Some(path) = explicit {
        return load_config(path);
    }

    match default_paths().into_iter().find(|p| p.is_file()) {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            load_config(&path)
        }
        None => Ok(Config::default()),
    }
}
