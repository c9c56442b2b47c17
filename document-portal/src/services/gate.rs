use crate::config::GateSettings;
use crate::error::PortalError;
use crate::models::SessionState;
use async_trait::async_trait;
use metrics::counter;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use service_core::observability::TracedClientExt;
use service_core::utils::secrets_match;
use std::time::Duration;

const DEFAULT_DENIAL: &str = "Password salah";

/// Proof that the Internal section was unlocked for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unlocked;

/// Something that can judge a candidate internal secret.
#[async_trait]
pub trait SecretVerifier: Send + Sync {
    /// `Ok` on a match, `Denied` on a mismatch, `Transport` when no verdict
    /// could be obtained.
    async fn verify(&self, candidate: &str, request_id: Option<&str>) -> Result<(), PortalError>;
}

#[derive(Serialize)]
struct CheckPasswordRequest<'a> {
    password: &'a str,
}

#[derive(Deserialize)]
struct CheckPasswordResponse {
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

/// HTTP client for gate-service's `/api/check-password`.
pub struct GateClient {
    client: Client,
    endpoint: String,
}

impl GateClient {
    pub fn new(settings: &GateSettings) -> Result<Self, PortalError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| PortalError::Transport(anyhow::Error::new(e)))?;

        Ok(Self {
            client,
            endpoint: format!("{}/api/check-password", settings.url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl SecretVerifier for GateClient {
    async fn verify(&self, candidate: &str, request_id: Option<&str>) -> Result<(), PortalError> {
        let response = self
            .client
            .traced_post(&self.endpoint)
            .json(&CheckPasswordRequest {
                password: candidate,
            })
            .request_id(request_id)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to reach gate service at {}: {}", self.endpoint, e);
                PortalError::Transport(anyhow::Error::new(e))
            })?;

        let status = response.status();
        let body: Option<CheckPasswordResponse> = response.json().await.ok();

        match (status, body) {
            (StatusCode::OK, Some(body)) if body.success => Ok(()),
            (StatusCode::UNAUTHORIZED, body) => Err(PortalError::Denied(
                body.and_then(|b| b.message)
                    .unwrap_or_else(|| DEFAULT_DENIAL.to_string()),
            )),
            (status, _) => {
                tracing::error!(%status, "Unexpected response from gate service");
                Err(PortalError::Transport(anyhow::anyhow!(
                    "gate service answered {}",
                    status
                )))
            }
        }
    }
}

/// Two-state gate over the Internal section.
pub struct AccessGate {
    verifier: Box<dyn SecretVerifier>,
}

impl AccessGate {
    pub fn new(verifier: Box<dyn SecretVerifier>) -> Self {
        Self { verifier }
    }

    /// Flips `internal_unlocked` on a match. On any error the flag is left
    /// as it was.
    pub async fn submit_internal_secret(
        &self,
        session: &mut SessionState,
        candidate: &str,
        request_id: Option<&str>,
    ) -> Result<Unlocked, PortalError> {
        match self.verifier.verify(candidate, request_id).await {
            Ok(()) => {
                counter!("portal_gate_attempts_total", "outcome" => "unlocked").increment(1);
                session.unlock_internal();
                Ok(Unlocked)
            }
            Err(e @ PortalError::Denied(_)) => {
                counter!("portal_gate_attempts_total", "outcome" => "denied").increment(1);
                Err(e)
            }
            Err(e) => {
                counter!("portal_gate_attempts_total", "outcome" => "error").increment(1);
                Err(e)
            }
        }
    }
}

/// Admin sign-in against a fixed configured passphrase, compared in-process
/// with no network call.
///
/// This is NOT a security boundary: anyone who can read the portal's
/// configuration knows the passphrase, there is no per-user identity and no
/// attempt limit. Treat the admin panel as reachable by any insider.
pub struct AdminGate {
    passphrase: Secret<String>,
}

impl AdminGate {
    pub fn new(passphrase: Secret<String>) -> Self {
        Self { passphrase }
    }

    pub fn sign_in(&self, session: &mut SessionState, candidate: &str) -> Result<(), PortalError> {
        if secrets_match(self.passphrase.expose_secret(), candidate) {
            session.sign_in_admin();
            Ok(())
        } else {
            Err(PortalError::Unauthorized("Password admin salah".to_string()))
        }
    }
}
