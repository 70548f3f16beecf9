//! Plugin metadata from `vagrant plugin list --machine-readable`.
//!
//! Plugins arrive as `ui` records whose second field is a rendered
//! description like `vagrant-libvirt (0.12.2, global)`. Vagrant escapes the
//! comma in that string with its own placeholder, so the separator may show
//! up either decoded or as the raw token.

use regex::Regex;

use crate::error::VexError;
use crate::machine_readable::{Escapes, Record};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Plugin {
    pub name: String,
    pub version: String,
    /// Install scope reported by Vagrant, e.g. `global` or `local`.
    pub location: String,
}

impl Plugin {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Parse a `NAME (VERSION, LOCATION)` description.
    pub fn from_description(description: &str, escapes: &Escapes) -> Result<Self, VexError> {
        DescriptionMatcher::new(escapes).parse(description)
    }

    /// Arguments for `vagrant plugin install`.
    pub fn install_args(&self) -> Result<Vec<String>, VexError> {
        if self.name.trim().is_empty() {
            return Err(VexError::Validation {
                message: "plugin must have a name".into(),
            });
        }

        let mut args = vec!["plugin".to_string(), "install".into(), self.name.clone()];
        if !self.version.is_empty() {
            args.push("--plugin-version".into());
            args.push(self.version.clone());
        }
        if self.location == "local" {
            args.push("--local".into());
        }
        Ok(args)
    }
}

struct DescriptionMatcher {
    pattern: Regex,
}

impl DescriptionMatcher {
    fn new(escapes: &Escapes) -> Self {
        let pattern = format!(
            r"^([\w.-]+)\s\((.*?)(?:,|{})\s*([a-z]+)\)$",
            regex::escape(&escapes.comma)
        );
        // Only the token is dynamic and it is passed through regex::escape.
        let pattern = Regex::new(&pattern).expect("plugin description pattern is valid");
        Self { pattern }
    }

    fn parse(&self, description: &str) -> Result<Plugin, VexError> {
        let caps = self
            .pattern
            .captures(description.trim())
            .ok_or_else(|| VexError::PluginDescription {
                description: description.to_string(),
            })?;

        Ok(Plugin {
            name: caps[1].to_string(),
            version: caps[2].trim().to_string(),
            location: caps[3].to_string(),
        })
    }
}

/// Collect plugins from `ui` records, skipping lines that don't describe one.
pub fn extract_plugins(records: &[Record], escapes: &Escapes) -> Vec<Plugin> {
    let matcher = DescriptionMatcher::new(escapes);

    records
        .iter()
        .filter(|r| r.kind == "ui")
        .filter_map(|r| {
            let description = r.data.get(1)?;
            match matcher.parse(description) {
                Ok(plugin) => Some(plugin),
                Err(e) => {
                    tracing::debug!(error = %e, "skipping ui record");
                    None
                }
            }
        })
        .collect()
}
