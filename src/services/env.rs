use std::collections::HashMap;

/// Read-only source of variable values for the substitution engine.
///
/// Implementations return the raw value; an empty string is treated as unset
/// by the engine, not here.
#[cfg_attr(test, mockall::automock)]
pub trait EnvLookup: Send + Sync {
    fn lookup(&self, name: &str) -> Option<String>;
}

/// The process environment, captured once at start-up.
#[derive(Debug, Clone, Default)]
pub struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    /// Capture the current process environment. Variables whose name or
    /// value is not valid Unicode are left out.
    pub fn capture() -> Self {
        let vars: HashMap<String, String> = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        tracing::debug!("Captured {} environment variables", vars.len());
        Self { vars }
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl From<HashMap<String, String>> for EnvSnapshot {
    fn from(vars: HashMap<String, String>) -> Self {
        Self { vars }
    }
}

impl EnvLookup for EnvSnapshot {
    fn lookup(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

impl EnvLookup for HashMap<String, String> {
    fn lookup(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}
