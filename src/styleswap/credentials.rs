//! Credential selection.
//!
//! The controller never reads API keys from ambient state. It is handed a
//! [`CredentialSelector`] that answers "is a credential selected?", can prompt the user to pick
//! one, and hands the current key to the transport right before each request.

use async_trait::async_trait;
use std::error::Error;
use std::fmt;

/// Errors raised while prompting for a credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    /// The environment offers no way to select a key right now.
    Unavailable(String),
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialError::Unavailable(msg) => write!(f, "Credential selection unavailable: {}", msg),
        }
    }
}

impl Error for CredentialError {}

/// Environment-provided API credential capability.
#[async_trait]
pub trait CredentialSelector: Send + Sync {
    /// Whether a credential is currently selected.
    async fn has_selected_credential(&self) -> bool;

    /// Ask the user to select (or re-select) a credential.
    async fn prompt_selection(&self) -> Result<(), CredentialError>;

    /// The key to attach to the next request.
    fn api_key(&self) -> Option<String>;
}

/// Reads the key from environment variables on every call, so a key exported after startup
/// is picked up by the next request.
pub struct EnvCredentialSelector {
    vars: Vec<String>,
}

impl EnvCredentialSelector {
    /// Looks at `GEMINI_API_KEY`, then `API_KEY`.
    pub fn new() -> Self {
        Self::with_vars(["GEMINI_API_KEY", "API_KEY"])
    }

    pub fn with_vars<I, S>(vars: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            vars: vars.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for EnvCredentialSelector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialSelector for EnvCredentialSelector {
    async fn has_selected_credential(&self) -> bool {
        self.api_key().is_some()
    }

    async fn prompt_selection(&self) -> Result<(), CredentialError> {
        if self.api_key().is_some() {
            return Ok(());
        }
        log::warn!(
            "No API key found. Export one of {} and retry.",
            self.vars.join(", ")
        );
        Err(CredentialError::Unavailable(format!(
            "set one of {}",
            self.vars.join(", ")
        )))
    }

    fn api_key(&self) -> Option<String> {
        self.vars
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .map(|value| value.trim().to_string())
            .find(|value| !value.is_empty())
    }
}

/// A fixed key, for embedding applications that manage keys themselves.
pub struct StaticCredentialSelector {
    key: String,
}

impl StaticCredentialSelector {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

#[async_trait]
impl CredentialSelector for StaticCredentialSelector {
    async fn has_selected_credential(&self) -> bool {
        !self.key.is_empty()
    }

    async fn prompt_selection(&self) -> Result<(), CredentialError> {
        Ok(())
    }

    fn api_key(&self) -> Option<String> {
        Some(self.key.clone()).filter(|k| !k.is_empty())
    }
}
