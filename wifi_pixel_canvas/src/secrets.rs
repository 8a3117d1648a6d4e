use pixel_canvas::Secrets;

// Read secrets directly from file at compile time
const SECRETS_TOML: &str = include_str!("../../secrets.toml");

/// Loads the Wi-Fi credentials and server port that were embedded at compile time.
pub fn load() -> anyhow::Result<Secrets> {
    Secrets::from_toml(SECRETS_TOML)
}
