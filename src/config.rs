use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub correction: CorrectionConfig,
    pub viewer: ViewerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub bind: String,
    pub port: u16,
    /// Directory of static viewer assets
    pub assets_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorrectionConfig {
    /// When false, viewers issue no correction requests
    pub enabled: bool,
    #[serde(default)]
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ViewerConfig {
    /// How many recent finalized sentences a viewer renders per kind
    pub display_window: usize,
    /// Fixed delay between reconnect attempts
    pub reconnect_secs: u64,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("service.name", "caption-relay")?
            .set_default("service.bind", "0.0.0.0")?
            .set_default("service.port", 8765)?
            .set_default("service.assets_path", "public")?
            .set_default("correction.enabled", true)?
            .set_default("correction.model", "gemini-2.5-flash")?
            .set_default(
                "correction.base_url",
                "https://generativelanguage.googleapis.com",
            )?
            .set_default("correction.temperature", 0.3)?
            .set_default("correction.timeout_secs", 30)?
            .set_default("viewer.display_window", 10)?
            .set_default("viewer.reconnect_secs", 3)?
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("CAPTION_RELAY").separator("__"))
            .build()?;

        let mut cfg: Self = settings.try_deserialize()?;
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    /// Deployment knobs carried over from the original stack:
    /// PORT, GEMINI_API_KEY and GEMINI_MODEL win over the config file.
    fn apply_env_overrides(&mut self) {
        if let Ok(port) = std::env::var("PORT") {
            if let Ok(port) = port.parse() {
                self.service.port = port;
            }
        }
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            if !key.is_empty() {
                self.correction.api_key = Some(key);
            }
        }
        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            if !model.is_empty() {
                self.correction.model = model;
            }
        }
    }
}
