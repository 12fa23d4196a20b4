use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

pub mod runner;

// Mode used when no mode token is given
pub const DEFAULT_MODE: &str = "status";

// Printed when the requested mode is not registered
pub const FALLBACK_NOTICE: &str = "Unknown mode, falling back to status.";

// Prefix carried by every line the runner prints
pub const BANNER_PREFIX: &str = "[OmniWeave]";

// Requested run mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Status,
    Demo,
    Unknown(String),
}

impl Mode {
    // Build a mode from its literal token
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        match token {
            "status" => Mode::Status,
            "demo" => Mode::Demo,
            other => Mode::Unknown(other.to_string()),
        }
    }

    // Literal token, unknown modes keep what the user typed
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Mode::Status => "status",
            Mode::Demo => "demo",
            Mode::Unknown(token) => token.as_str(),
        }
    }
}

impl Default for Mode {
    fn default() -> Self {
        Mode::from_token(DEFAULT_MODE)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve the requested mode from the positional tokens.
///
/// Only the first token matters. An empty sequence or an empty first token
/// yields [`DEFAULT_MODE`]. Membership in the registry is not checked here.
#[must_use]
pub fn resolve_mode<S: AsRef<str>>(tokens: &[S]) -> Mode {
    match tokens.first().map(AsRef::as_ref) {
        Some(token) if !token.is_empty() => Mode::from_token(token),
        _ => Mode::default(),
    }
}

// Placeholder action bound to a registered mode
pub type ModeAction = fn() -> Result<String>;

fn status_action() -> Result<String> {
    Ok("runtime reachable".to_string())
}

fn demo_action() -> Result<String> {
    Ok("demo run complete".to_string())
}

#[derive(Serialize, Debug, Clone)]
pub struct ModeEntry {
    pub name: String,
    pub desc: String,
    #[serde(skip)]
    pub action: ModeAction,
}

impl ModeEntry {
    #[must_use]
    pub fn new(name: &str, desc: &str, action: ModeAction) -> Self {
        Self {
            name: name.to_string(),
            desc: desc.to_string(),
            action,
        }
    }

    /// Run the placeholder action bound to this mode
    ///
    /// # Errors
    ///
    /// Returns whatever error the action reports.
    pub fn invoke(&self) -> Result<String> {
        (self.action)()
    }
}

// Closed set of modes the runner recognizes
#[derive(Serialize, Debug, Clone)]
pub struct ModeRegistry {
    modes: Vec<ModeEntry>,
    #[serde(skip)]
    mode_map: Option<HashMap<String, usize>>, // name -> index in modes vector
}

impl ModeRegistry {
    #[must_use]
    pub fn new(modes: Vec<ModeEntry>) -> Self {
        Self {
            modes,
            mode_map: None,
        }
    }

    // Registry holding exactly the built-in modes
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::new(vec![
            ModeEntry::new("status", "Report that the runtime is reachable", status_action),
            ModeEntry::new("demo", "Run the demonstration placeholder", demo_action),
        ]);
        registry.init_lookup();
        registry
    }

    pub fn init_lookup(&mut self) {
        let map = self
            .modes
            .iter()
            .enumerate()
            .map(|(index, entry)| (entry.name.clone(), index))
            .collect();
        self.mode_map = Some(map);
    }

    // Find a registered mode by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ModeEntry> {
        match &self.mode_map {
            Some(map) => map.get(name).and_then(|index| self.modes.get(*index)),
            // Linear search until the lookup map is built
            None => self.modes.iter().find(|entry| entry.name == name),
        }
    }

    #[must_use]
    pub fn is_known(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.modes.iter().map(|entry| entry.name.as_str()).collect()
    }

    #[must_use]
    pub fn entries(&self) -> &[ModeEntry] {
        &self.modes
    }

    // Method for checking if the lookup map is initialized (for testing)
    #[must_use]
    pub fn has_lookup_map(&self) -> bool {
        self.mode_map.is_some()
    }
}
