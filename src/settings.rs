//! # Settings surface
//!
//! The two Last.fm settings are edited through a small form. The host offers
//! several ways to expose that form (menu APIs differ between versions); they
//! are tried in order and, when all of them fail, the form is exposed through
//! a global entry point instead.

use crate::types::Credentials;
use crate::Result;

/// Label of the settings entry in the host menu.
pub const SETTINGS_LABEL: &str = "Song stats";

/// Contents of the settings form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsForm {
    pub api_key: String,
    pub username: String,
}

impl SettingsForm {
    pub fn new(api_key: &str, username: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            username: username.to_string(),
        }
    }

    /// Prefill the form from stored credentials.
    pub fn from_credentials(credentials: &Credentials) -> Self {
        Self::new(
            credentials.api_key.as_deref().unwrap_or_default(),
            credentials.username.as_deref().unwrap_or_default(),
        )
    }

    /// The credentials to store; blank fields become absent.
    pub fn credentials(&self) -> Credentials {
        let field = |value: &str| {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        };
        Credentials::new(field(&self.api_key), field(&self.username))
    }
}

/// One way of adding the settings entry to the host UI.
pub trait MenuRegistrar {
    /// Short name for logging
    fn name(&self) -> &str;

    fn register(&self, label: &str) -> Result<()>;
}

/// Where the settings entry ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsEntry {
    /// Registered through the named registrar
    Menu(String),
    /// No registrar worked; the form is only reachable through the global entry point
    GlobalFunction,
}

/// Register the settings entry with the first registrar that accepts it.
pub fn register_settings_entry(registrars: &[Box<dyn MenuRegistrar>], label: &str) -> SettingsEntry {
    for registrar in registrars {
        match registrar.register(label) {
            Ok(()) => {
                log::debug!("Settings entry registered via {}", registrar.name());
                return SettingsEntry::Menu(registrar.name().to_string());
            }
            Err(e) => {
                log::debug!("Could not register settings entry via {}: {e}", registrar.name());
            }
        }
    }

    log::warn!("Could not register menu item, settings only reachable through the global entry point");
    SettingsEntry::GlobalFunction
}
