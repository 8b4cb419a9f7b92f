//! Ordered collection of reader plugins.

use std::collections::HashSet;

use crate::config::ViewerConfig;
use crate::data::LayerDataTuple;
use crate::io::ReadError;
use crate::plugins::{BuiltinReader, ReadRequest, ReaderChain};

/// Errors a reader plugin can report. The manager logs them and moves on.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    #[error(transparent)]
    Read(#[from] ReadError),

    #[error("{plugin}: {message}")]
    Failed { plugin: String, message: String },
}

/// A reader that may be able to turn a request into layer data.
pub trait ReaderPlugin {
    /// Unique name, used by the disable list.
    fn name(&self) -> &str;

    /// Cheap check whether this plugin wants to try the request.
    fn claims(&self, request: &ReadRequest<'_>) -> bool;

    fn read(&self, request: &ReadRequest<'_>) -> Result<Vec<LayerDataTuple>, PluginError>;

    /// Higher values are tried first.
    fn priority(&self) -> i32 {
        0
    }
}

/// The default [`ReaderChain`]: the first enabled plugin that claims a request
/// and returns data wins.
pub struct PluginManager {
    plugins: Vec<Box<dyn ReaderPlugin>>,
    disabled: HashSet<String>,
}

impl PluginManager {
    /// Create a manager with the built-in reader registered.
    pub fn new() -> Self {
        let mut manager = Self::empty();
        manager.register(Box::new(BuiltinReader::new()));
        manager
    }

    pub fn empty() -> Self {
        Self {
            plugins: Vec::new(),
            disabled: HashSet::new(),
        }
    }

    /// Built-in reader plus the disable list of `config`.
    pub fn from_config(config: &ViewerConfig) -> Self {
        let mut manager = Self::new();
        for name in &config.disabled_plugins {
            manager.disable(name);
        }
        manager
    }

    /// Register a plugin, replacing one with the same name.
    pub fn register(&mut self, plugin: Box<dyn ReaderPlugin>) {
        self.plugins.retain(|p| p.name() != plugin.name());
        self.plugins.push(plugin);
        // Stable sort keeps registration order among equal priorities
        self.plugins.sort_by(|a, b| b.priority().cmp(&a.priority()));
    }

    pub fn disable(&mut self, name: &str) {
        self.disabled.insert(name.to_string());
    }

    pub fn enable(&mut self, name: &str) {
        self.disabled.remove(name);
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        !self.disabled.contains(name)
    }

    /// Plugin names in the order they are tried.
    pub fn names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }
}

impl Default for PluginManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PluginManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginManager")
            .field("plugins", &self.names())
            .field("disabled", &self.disabled)
            .finish()
    }
}

impl ReaderChain for PluginManager {
    fn read(&self, request: &ReadRequest<'_>) -> Vec<LayerDataTuple> {
        for plugin in &self.plugins {
            let name = plugin.name();
            if !self.is_enabled(name) || !plugin.claims(request) {
                continue;
            }
            match plugin.read(request) {
                Ok(data) if !data.is_empty() => {
                    log::debug!("Plugin {} read {} ({} layers)", name, request, data.len());
                    return data;
                }
                Ok(_) => log::debug!("Plugin {} returned no data for {}", name, request),
                Err(e) => log::warn!("Plugin {} failed to read {}: {}", name, request, e),
            }
        }
        Vec::new()
    }
}
