//! Typed operations on top of the `vagrant` binary.
//!
//! Every operation issues exactly one command through the [`Runner`] and,
//! for the machine-readable ones, decodes its output before returning.

use tracing::Instrument;

use crate::command::{Runner, ShellRunner};
use crate::error::VexError;
use crate::machine_readable::{self, Escapes};
use crate::plugin::{self, Plugin};
use crate::status::{self, MachineStatus};

pub const DEFAULT_BINARY: &str = "vagrant";

pub struct Vagrant<R = ShellRunner> {
    executable: String,
    runner: R,
    escapes: Escapes,
    span: tracing::Span,
}

impl Vagrant<ShellRunner> {
    /// Wrapper around `vagrant` on PATH, run in the current directory.
    pub fn new() -> Self {
        Self::with_runner(DEFAULT_BINARY, ShellRunner::new())
    }
}

impl Default for Vagrant<ShellRunner> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Runner> Vagrant<R> {
    pub fn with_runner(executable: impl Into<String>, runner: R) -> Self {
        let executable = executable.into();
        let span = tracing::info_span!("vagrant", bin = %executable);
        Self {
            executable,
            runner,
            escapes: Escapes::default(),
            span,
        }
    }

    /// Override the placeholder tokens used to decode machine-readable output.
    pub fn with_escapes(mut self, escapes: Escapes) -> Self {
        self.escapes = escapes;
        self
    }

    /// Log under `span` instead of the default `vagrant` span.
    pub fn with_span(mut self, span: tracing::Span) -> Self {
        self.span = span;
        self
    }

    /// Create and configure guest machines according to the Vagrantfile.
    pub async fn up(&self) -> Result<(), VexError> {
        let out = self.exec(&["up"]).await?;
        self.info(&out);
        Ok(())
    }

    /// Gracefully shut down the guest machines.
    pub async fn halt(&self) -> Result<(), VexError> {
        let out = self.exec(&["halt"]).await?;
        self.info(&out);
        Ok(())
    }

    /// Stop the guest machines and remove every resource created for them.
    pub async fn destroy(&self) -> Result<(), VexError> {
        let out = self.exec(&["destroy", "--force"]).await?;
        self.info(&out);
        Ok(())
    }

    /// Status of every machine Vagrant manages, sorted by name.
    pub async fn status(&self) -> Result<Vec<MachineStatus>, VexError> {
        let out = self.exec(&["status", "--machine-readable"]).await?;
        let records = machine_readable::parse(&out, &self.escapes)?;
        Ok(status::build_statuses(&records))
    }

    /// Installed Vagrant version.
    pub async fn version(&self) -> Result<String, VexError> {
        const KIND: &str = "version-installed";

        let out = self.exec(&["version", "--machine-readable"]).await?;
        let records = machine_readable::parse(&out, &self.escapes)?;
        let data = machine_readable::pluck_entry_data(&records, KIND)?;
        data.first().cloned().ok_or_else(|| VexError::MissingField {
            kind: KIND.into(),
            index: 0,
        })
    }

    /// Run `command` on the machine over SSH and return its combined output.
    pub async fn ssh(&self, command: &str) -> Result<String, VexError> {
        let out = self.exec(&["ssh", "--no-tty", "--command", command]).await?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    /// Installed plugins with their versions and install locations.
    pub async fn plugin_list(&self) -> Result<Vec<Plugin>, VexError> {
        let out = self.exec(&["plugin", "list", "--machine-readable"]).await?;
        let records = machine_readable::parse(&out, &self.escapes)?;
        Ok(plugin::extract_plugins(&records, &self.escapes))
    }

    /// Install a plugin by name or file path, optionally pinned to a version.
    pub async fn plugin_install(&self, plugin: &Plugin) -> Result<(), VexError> {
        let args = plugin.install_args()?;
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let out = self.exec(&args).await?;
        self.info(&out);
        Ok(())
    }

    async fn exec(&self, args: &[&str]) -> Result<Vec<u8>, VexError> {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        let full_cmd = format!("{} {}", self.executable, args.join(" "));

        async {
            tracing::info!(command = %full_cmd, "running command");
            let result = self.runner.run(&self.executable, &args).await;
            match &result {
                Ok(out) => tracing::debug!(
                    command = %full_cmd,
                    output = %String::from_utf8_lossy(out),
                    "command output"
                ),
                Err(e) => tracing::debug!(command = %full_cmd, error = %e, "command failed"),
            }
            result
        }
        .instrument(self.span.clone())
        .await
    }

    fn info(&self, out: &[u8]) {
        if !out.is_empty() {
            let _guard = self.span.enter();
            tracing::info!("{}", String::from_utf8_lossy(out).trim_end());
        }
    }
}
