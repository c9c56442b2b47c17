use secrecy::Secret;
use service_core::config::{self as core_config, get_env};
use service_core::error::AppError;

#[derive(Debug, Clone)]
pub struct GateConfig {
    pub common: core_config::Config,
    pub internal_password: Secret<String>,
}

impl GateConfig {
    /// Loads the common settings plus `INTERNAL_PASSWORD`, which is required
    /// in every environment: an unset secret must never unlock anything.
    pub fn load() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;
        let internal_password = get_env("INTERNAL_PASSWORD", None)?;

        if internal_password.is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "INTERNAL_PASSWORD must not be empty"
            )));
        }

        Ok(Self {
            common,
            internal_password: Secret::new(internal_password),
        })
    }
}
