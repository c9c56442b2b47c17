use secrecy::Secret;
use serde::Deserialize;
use std::path::Path;

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub gate: GateSettings,
    pub admin: AdminSettings,
    pub catalog: CatalogSettings,
    pub storage: StorageSettings,
    #[serde(default)]
    pub observability: ObservabilitySettings,
}

#[derive(Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Idle time after which a visitor's session (and any unlocked gate) expires.
    #[serde(default = "default_session_idle_hours")]
    pub session_idle_hours: i64,
}

fn default_session_idle_hours() -> i64 {
    8
}

#[derive(Deserialize, Clone)]
pub struct GateSettings {
    /// Base URL of gate-service (e.g. http://gate-service:8080).
    pub url: String,
    #[serde(default = "default_gate_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_gate_timeout_secs() -> u64 {
    10
}

#[derive(Deserialize, Clone)]
pub struct AdminSettings {
    /// Shared admin passphrase. Compared in-process; see `AdminGate`.
    pub passphrase: Secret<String>,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum CatalogBackend {
    Memory,
    Mongodb,
}

#[derive(Deserialize, Clone)]
pub struct CatalogSettings {
    pub backend: CatalogBackend,
    #[serde(default)]
    pub mongodb_uri: Option<String>,
    #[serde(default = "default_database")]
    pub database: String,
    /// JSON file loaded into the in-memory backend at startup.
    #[serde(default)]
    pub seed_path: Option<String>,
}

fn default_database() -> String {
    "document_portal".to_string()
}

#[derive(Deserialize, Clone)]
pub struct StorageSettings {
    pub local_path: String,
    /// Prefix of the public URLs handed out for uploaded files.
    pub public_base_url: String,
}

#[derive(Deserialize, Clone)]
pub struct ObservabilitySettings {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilitySettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            otlp_endpoint: None,
        }
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir()
        .map_err(|e| config::ConfigError::Message(format!("No current directory: {}", e)))?;

    // Works from the workspace root and from inside the crate directory.
    let crate_directory = if base_path.ends_with("document-portal") {
        base_path
    } else {
        base_path.join("document-portal")
    };
    let configuration_directory = crate_directory.join("config");

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")).required(true))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    let mut settings = settings.try_deserialize::<Settings>()?;
    settings.resolve_paths(&crate_directory);
    Ok(settings)
}

impl Settings {
    /// Relative file paths in the configuration are relative to the crate
    /// directory, wherever the process was started from.
    pub fn resolve_paths(&mut self, crate_directory: &Path) {
        self.storage.local_path = resolve(crate_directory, &self.storage.local_path);
        if let Some(seed_path) = &self.catalog.seed_path {
            self.catalog.seed_path = Some(resolve(crate_directory, seed_path));
        }
    }
}

fn resolve(base: &Path, path: &str) -> String {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_string_lossy().into_owned()
    } else {
        base.join(path).to_string_lossy().into_owned()
    }
}
