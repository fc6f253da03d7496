use song_stats::{
    CredentialStore, Credentials, FileCredentialStore, HttpGateway, StatsPipeline,
};
use std::env;
use std::path::PathBuf;

/// Environment variable overriding the stored Last.fm API key.
pub const API_KEY_ENV: &str = "SONG_STATS_LASTFM_API_KEY";

/// Environment variable overriding the stored Last.fm username.
pub const USERNAME_ENV: &str = "SONG_STATS_LASTFM_USERNAME";

/// Credential file store whose values can be overridden from the environment.
///
/// Overrides only apply to reads; `set` always writes the file.
pub struct EnvCredentialStore {
    file: FileCredentialStore,
}

impl EnvCredentialStore {
    pub fn path(&self) -> &std::path::Path {
        self.file.path()
    }
}

fn env_value(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl CredentialStore for EnvCredentialStore {
    fn get(&self) -> Credentials {
        let stored = self.file.get();
        Credentials::new(
            env_value(API_KEY_ENV).or(stored.api_key),
            env_value(USERNAME_ENV).or(stored.username),
        )
    }

    fn set(&self, credentials: &Credentials) -> song_stats::Result<()> {
        self.file.set(credentials)
    }
}

/// Open the credential store at `path`, or at the default XDG location.
pub fn credential_store(path: Option<PathBuf>) -> song_stats::Result<EnvCredentialStore> {
    let file = match path {
        Some(path) => FileCredentialStore::new(path),
        None => FileCredentialStore::default_location()?,
    };
    Ok(EnvCredentialStore { file })
}

/// Pipeline using the native HTTP client and the standard data sources.
pub fn standard_pipeline() -> StatsPipeline {
    let gateway = HttpGateway::new(Box::new(http_client::native::NativeClient::new()));
    StatsPipeline::standard(gateway)
}

/// Show only the last four characters of a secret.
pub fn mask_secret(secret: &str) -> String {
    let visible: String = secret
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("{}{visible}", "*".repeat(secret.chars().count().saturating_sub(4)))
}
