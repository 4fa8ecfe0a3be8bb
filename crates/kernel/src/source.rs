//! Action source declarations and per-source menu options.
//!
//! Sources are injected as an explicit list assembled by the host (from a
//! service registry, static configuration, or anything else); the kernel
//! never inspects other modules to find them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{MenuError, MenuResult};

/// Marker inside `exclude` that drops the whole source from the menu.
pub const EXCLUDE_ALL: &str = "*";

/// Per-source menu configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceOptions {
    /// Action names to drop in addition to the configured global
    /// exclusions. Compared case-insensitively. `"*"` excludes the whole
    /// source.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Action name to display-title overrides.
    #[serde(default)]
    pub alias: HashMap<String, String>,

    /// Default parent id for this source's entries.
    #[serde(default)]
    pub parent: Option<String>,

    /// Emit a synthetic group entry representing the whole source; child
    /// entries then parent to the group instead of `parent` (default: true).
    #[serde(default = "default_true")]
    pub group_entry: bool,
}

fn default_true() -> bool {
    true
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            exclude: Vec::new(),
            alias: HashMap::new(),
            parent: None,
            group_entry: true,
        }
    }
}

impl SourceOptions {
    /// Whether the wildcard marker excludes this source entirely.
    pub fn excludes_all(&self) -> bool {
        self.exclude.iter().any(|a| a == EXCLUDE_ALL)
    }
}

/// A declared action source: a named group of callable actions plus its
/// menu options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionSource {
    /// Source name as declared (e.g. "Reports").
    pub name: String,

    /// Callable action names.
    pub actions: Vec<String>,

    /// Menu options for this source.
    #[serde(default)]
    pub options: SourceOptions,
}

impl ActionSource {
    /// Declare a source with default options.
    pub fn new(name: impl Into<String>, actions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            actions: actions.into_iter().map(Into::into).collect(),
            options: SourceOptions::default(),
        }
    }

    /// Set the menu options.
    #[must_use]
    pub fn with_options(mut self, options: SourceOptions) -> Self {
        self.options = options;
        self
    }

    /// Declare a source whose options arrive as a JSON payload, e.g. from a
    /// plugin manifest.
    ///
    /// A malformed payload is a contract violation and is surfaced to the
    /// caller, never silently coerced into defaults.
    pub fn from_json(
        name: impl Into<String>,
        actions: impl IntoIterator<Item = impl Into<String>>,
        options_json: &str,
    ) -> MenuResult<Self> {
        let name = name.into();
        let options: SourceOptions =
            serde_json::from_str(options_json).map_err(|e| MenuError::InvalidSource {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            name,
            actions: actions.into_iter().map(Into::into).collect(),
            options,
        })
    }
}
