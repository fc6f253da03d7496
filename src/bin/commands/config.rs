use super::utils::{mask_secret, EnvCredentialStore};
use song_stats::{CredentialStore, SettingsForm};

/// Store the given settings, then print what is stored
pub fn handle_config_command(
    store: &EnvCredentialStore,
    api_key: Option<&str>,
    username: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    if api_key.is_some() || username.is_some() {
        let form = SettingsForm::new(api_key.unwrap_or_default(), username.unwrap_or_default());
        store.set(&form.credentials())?;
        println!("✅ Settings saved to {}", store.path().display());
    }

    let credentials = store.get();
    println!(
        "Last.fm API key:  {}",
        credentials
            .api_key()
            .map(mask_secret)
            .unwrap_or_else(|| "(not set)".to_string())
    );
    println!(
        "Last.fm username: {}",
        credentials.username().unwrap_or("(not set)")
    );

    Ok(())
}
