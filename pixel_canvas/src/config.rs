use serde::Deserialize;

/// Port the control panel is served on unless configured otherwise.
pub const DEFAULT_HTTP_PORT: u16 = 80;

/// Defines the structure for the secrets.
#[derive(Deserialize, Debug, Clone)]
pub struct Secrets {
    /// Wi-Fi configuration.
    pub wifi: WiFiConfig,
    /// HTTP server configuration, optional.
    #[serde(default)]
    pub server: ServerConfig,
}

/// Defines the structure for the Wi-Fi configuration.
#[derive(Deserialize, Debug, Clone)]
pub struct WiFiConfig {
    /// The SSID of the Wi-Fi network.
    pub ssid: String,
    /// The password of the Wi-Fi network. Empty for open networks.
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: DEFAULT_HTTP_PORT,
        }
    }
}

fn default_http_port() -> u16 {
    DEFAULT_HTTP_PORT
}

impl Secrets {
    /// Parses the contents of `secrets.toml`.
    pub fn from_toml(source: &str) -> anyhow::Result<Self> {
        let secrets: Secrets = toml::from_str(source)
            .map_err(|e| anyhow::anyhow!("Error parsing secrets.toml: {}", e))?;
        if secrets.wifi.ssid.is_empty() {
            anyhow::bail!("Error parsing secrets.toml: wifi.ssid is empty");
        }
        Ok(secrets)
    }
}
