use document_portal::config::{
    AdminSettings, CatalogBackend, CatalogSettings, GateSettings, ObservabilitySettings,
    ServerSettings, Settings, StorageSettings,
};
use document_portal::startup::Application;
use gate_service::config::GateConfig;
use secrecy::Secret;
use service_core::config::Config as CoreConfig;
use uuid::Uuid;

pub const INTERNAL_PASSWORD: &str = "rahasia-internal";
pub const ADMIN_PASSPHRASE: &str = "admin123";

pub struct TestApp {
    pub address: String,
    pub gate_address: String,
    pub storage_path: String,
    /// Keeps the session cookie between requests, like a browser.
    pub client: reqwest::Client,
}

impl TestApp {
    /// Portal plus a real gate-service, both on random ports.
    pub async fn spawn() -> Self {
        let gate_port = spawn_gate().await;
        Self::spawn_with_gate_url(format!("http://127.0.0.1:{}", gate_port)).await
    }

    /// Portal whose gate-service never answers.
    pub async fn spawn_without_gate() -> Self {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        Self::spawn_with_gate_url(format!("http://127.0.0.1:{}", port)).await
    }

    async fn spawn_with_gate_url(gate_address: String) -> Self {
        let storage_path = format!("target/test-storage-{}", Uuid::new_v4());

        let settings = Settings {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 0,
                session_idle_hours: 8,
            },
            gate: GateSettings {
                url: gate_address.clone(),
                timeout_secs: 2,
            },
            admin: AdminSettings {
                passphrase: Secret::new(ADMIN_PASSPHRASE.to_string()),
            },
            catalog: CatalogSettings {
                backend: CatalogBackend::Memory,
                mongodb_uri: None,
                database: "document_portal_test".to_string(),
                seed_path: Some(format!(
                    "{}/seed/documents.json",
                    env!("CARGO_MANIFEST_DIR")
                )),
            },
            storage: StorageSettings {
                local_path: storage_path.clone(),
                public_base_url: "http://localhost/files".to_string(),
            },
            observability: ObservabilitySettings::default(),
        };

        let app = Application::build(settings)
            .await
            .expect("Failed to build test application");
        let address = format!("http://127.0.0.1:{}", app.port());

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap();

        wait_until_healthy(&client, &address).await;

        TestApp {
            address,
            gate_address,
            storage_path,
            client,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn patch_session(&self, body: serde_json::Value) -> reqwest::Response {
        self.client
            .patch(self.url("/api/session"))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn catalog(&self) -> serde_json::Value {
        self.client
            .get(self.url("/api/catalog"))
            .send()
            .await
            .expect("Failed to execute request")
            .json()
            .await
            .unwrap()
    }

    pub async fn unlock(&self, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/gate/internal"))
            .json(&serde_json::json!({ "password": password }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn admin_login(&self) {
        let response = self
            .client
            .post(self.url("/api/admin/login"))
            .json(&serde_json::json!({ "password": ADMIN_PASSPHRASE }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), 200);
    }

    pub async fn cleanup(&self) {
        let _ = tokio::fs::remove_dir_all(&self.storage_path).await;
    }
}

async fn spawn_gate() -> u16 {
    let config = GateConfig {
        common: CoreConfig {
            port: 0,
            log_level: "info".to_string(),
            otlp_endpoint: None,
        },
        internal_password: Secret::new(INTERNAL_PASSWORD.to_string()),
    };

    let app = gate_service::startup::Application::build(config)
        .await
        .expect("Failed to build gate-service");
    let port = app.port();

    tokio::spawn(async move {
        app.run_until_stopped().await.ok();
    });

    let client = reqwest::Client::new();
    wait_until_healthy(&client, &format!("http://127.0.0.1:{}", port)).await;
    port
}

async fn wait_until_healthy(client: &reqwest::Client, address: &str) {
    let health_url = format!("{}/health", address);
    for _ in 0..50 {
        if client.get(&health_url).send().await.is_ok() {
            break;
        }
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
    }
}

/// Titles of the documents in a catalog response, in order.
pub fn titles(catalog: &serde_json::Value) -> Vec<String> {
    catalog["documents"]
        .as_array()
        .map(|docs| {
            docs.iter()
                .filter_map(|doc| doc["title"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
