use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub feed: FeedConfig,
    pub catalog: CatalogConfig,
    pub import: ImportConfig,
}

/// Credentials and endpoint for the Kevro stock feed. The HTTP pair
/// covers transport-level basic auth; the token/username/password triple
/// is what the login RPC itself expects.
#[derive(Debug, Deserialize, Clone)]
pub struct FeedConfig {
    pub endpoint: String,
    pub http_user: String,
    pub http_password: String,
    pub token_key: String,
    pub username: String,
    pub password: String,
    pub entity_name: String,
    pub entity_id: String,
    #[serde(default = "default_return_type")]
    pub return_type: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    pub base_url: String,
    pub consumer_key: String,
    pub consumer_secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ImportConfig {
    /// Directory holding per-run snapshot and ledger files.
    pub cache_dir: String,
    /// Maximum catalog writes per orchestration run; further eligible
    /// records are left for a later run.
    #[serde(default = "default_max_writes")]
    pub max_writes_per_run: usize,
}

fn default_return_type() -> String {
    "JSON".to_string()
}

fn default_max_writes() -> usize {
    100
}

impl Settings {
    pub fn new() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}
