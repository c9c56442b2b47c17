use crate::error::PortalError;
use crate::models::{Category, DocumentFields, DocumentRecord, FileType, Section};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use futures::stream::TryStreamExt;
use mongodb::{
    bson::doc,
    options::{FindOptions, IndexOptions},
    Client as MongoClient, Collection, Database, IndexModel,
};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Persistence for catalog records.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// All records, most recently created first.
    async fn list_newest_first(&self) -> Result<Vec<DocumentRecord>, PortalError>;
    async fn get(&self, id: &str) -> Result<Option<DocumentRecord>, PortalError>;
    async fn insert(&self, record: &DocumentRecord) -> Result<(), PortalError>;
    /// Fails with `NotFound` when no record has `record.id`.
    async fn replace(&self, record: &DocumentRecord) -> Result<(), PortalError>;
    /// Fails with `NotFound` when no record has `id`.
    async fn delete(&self, id: &str) -> Result<(), PortalError>;
}

#[derive(Clone)]
pub struct MongoCatalog {
    client: MongoClient,
    db: Database,
}

impl MongoCatalog {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, PortalError> {
        tracing::info!(database = %database, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB: {}", e);
            PortalError::from(e)
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, db })
    }

    pub async fn initialize_indexes(&self) -> Result<(), PortalError> {
        let newest_first = IndexModel::builder()
            .keys(doc! { "created_at": -1 })
            .options(
                IndexOptions::builder()
                    .name("created_at_desc".to_string())
                    .build(),
            )
            .build();

        self.documents()
            .create_index(newest_first, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create created_at index on documents: {}", e);
                PortalError::from(e)
            })?;
        tracing::info!("Created index on documents.created_at");

        Ok(())
    }

    pub async fn health_check(&self) -> Result<(), PortalError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                PortalError::from(e)
            })?;
        Ok(())
    }

    pub fn documents(&self) -> Collection<DocumentRecord> {
        self.db.collection("documents")
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl CatalogRepository for MongoCatalog {
    async fn list_newest_first(&self) -> Result<Vec<DocumentRecord>, PortalError> {
        let find_options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .build();

        let mut cursor = self.documents().find(doc! {}, find_options).await?;

        let mut records = Vec::new();
        while let Some(record) = cursor.try_next().await? {
            records.push(record);
        }
        Ok(records)
    }

    async fn get(&self, id: &str) -> Result<Option<DocumentRecord>, PortalError> {
        Ok(self.documents().find_one(doc! { "_id": id }, None).await?)
    }

    async fn insert(&self, record: &DocumentRecord) -> Result<(), PortalError> {
        self.documents().insert_one(record, None).await?;
        Ok(())
    }

    async fn replace(&self, record: &DocumentRecord) -> Result<(), PortalError> {
        let result = self
            .documents()
            .replace_one(doc! { "_id": &record.id }, record, None)
            .await?;

        if result.matched_count == 0 {
            return Err(PortalError::NotFound(record.id.clone()));
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), PortalError> {
        let result = self.documents().delete_one(doc! { "_id": id }, None).await?;

        if result.deleted_count == 0 {
            return Err(PortalError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

/// Process-local repository for development and tests.
#[derive(Default)]
pub struct InMemoryCatalog {
    records: RwLock<Vec<DocumentRecord>>,
}

/// Entry of a seed file; field names follow the portal's JSON API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedDocument {
    title: String,
    description: String,
    category: Category,
    #[serde(alias = "type")]
    file_type: FileType,
    #[serde(default)]
    section: Section,
    #[serde(default, alias = "thumbnail")]
    thumbnail_url: Option<String>,
    download_url: String,
}

impl InMemoryCatalog {
    pub fn new(records: Vec<DocumentRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    /// Loads a JSON array of documents. The file lists newest first; creation
    /// times are assigned one second apart to keep that order.
    pub async fn from_seed_file(path: impl AsRef<Path>) -> Result<Self, PortalError> {
        let path = path.as_ref();
        let raw = tokio::fs::read(path).await.map_err(|e| {
            PortalError::Catalog(anyhow::anyhow!(
                "Failed to read seed file {}: {}",
                path.display(),
                e
            ))
        })?;
        let seeds: Vec<SeedDocument> = serde_json::from_slice(&raw).map_err(|e| {
            PortalError::Catalog(anyhow::anyhow!(
                "Invalid seed file {}: {}",
                path.display(),
                e
            ))
        })?;

        let now = Utc::now();
        let records = seeds
            .into_iter()
            .enumerate()
            .map(|(i, seed)| {
                let fields = DocumentFields {
                    title: seed.title,
                    description: seed.description,
                    category: seed.category,
                    file_type: seed.file_type,
                    section: seed.section,
                    thumbnail_url: seed.thumbnail_url,
                    download_url: seed.download_url,
                };
                let mut record = DocumentRecord::new(fields);
                record.created_at = now - Duration::seconds(i as i64);
                record
            })
            .collect::<Vec<_>>();

        tracing::info!(count = records.len(), path = %path.display(), "Seeded in-memory catalog");
        Ok(Self::new(records))
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalog {
    async fn list_newest_first(&self) -> Result<Vec<DocumentRecord>, PortalError> {
        let mut records = self.records.read().await.clone();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn get(&self, id: &str) -> Result<Option<DocumentRecord>, PortalError> {
        Ok(self.records.read().await.iter().find(|r| r.id == id).cloned())
    }

    async fn insert(&self, record: &DocumentRecord) -> Result<(), PortalError> {
        let mut records = self.records.write().await;
        if records.iter().any(|r| r.id == record.id) {
            return Err(PortalError::Catalog(anyhow::anyhow!(
                "Duplicate document id {}",
                record.id
            )));
        }
        records.push(record.clone());
        Ok(())
    }

    async fn replace(&self, record: &DocumentRecord) -> Result<(), PortalError> {
        let mut records = self.records.write().await;
        let existing = records
            .iter_mut()
            .find(|r| r.id == record.id)
            .ok_or_else(|| PortalError::NotFound(record.id.clone()))?;
        *existing = record.clone();
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), PortalError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            return Err(PortalError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

/// Read-through cache of the whole catalog. Never patched in place: after a
/// mutation the cache is dropped and the next read reloads everything.
pub struct CatalogStore {
    repository: Arc<dyn CatalogRepository>,
    cache: RwLock<Option<Vec<DocumentRecord>>>,
}

impl CatalogStore {
    pub fn new(repository: Arc<dyn CatalogRepository>) -> Self {
        Self {
            repository,
            cache: RwLock::new(None),
        }
    }

    pub fn repository(&self) -> &Arc<dyn CatalogRepository> {
        &self.repository
    }

    /// Cached records, newest first; loads from the repository when empty.
    pub async fn documents(&self) -> Result<Vec<DocumentRecord>, PortalError> {
        if let Some(records) = self.cache.read().await.as_ref() {
            return Ok(records.clone());
        }
        self.reload().await
    }

    /// Replaces the cache with a fresh copy from the repository.
    pub async fn reload(&self) -> Result<Vec<DocumentRecord>, PortalError> {
        let mut cache = self.cache.write().await;
        let records = self.repository.list_newest_first().await.map_err(|e| {
            tracing::error!("Failed to load catalog: {}", e);
            e
        })?;
        tracing::debug!(count = records.len(), "Catalog reloaded");
        *cache = Some(records.clone());
        Ok(records)
    }

    pub async fn invalidate(&self) {
        *self.cache.write().await = None;
    }

    pub async fn find(&self, id: &str) -> Result<Option<DocumentRecord>, PortalError> {
        Ok(self.documents().await?.into_iter().find(|r| r.id == id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(title: &str) -> DocumentFields {
        DocumentFields {
            title: title.to_string(),
            description: "desc".to_string(),
            category: Category::Memo,
            file_type: FileType::Ppt,
            section: Section::Eksternal,
            thumbnail_url: None,
            download_url: "https://files.example/x".to_string(),
        }
    }

    #[tokio::test]
    async fn in_memory_lists_newest_first() {
        let mut older = DocumentRecord::new(fields("older"));
        older.created_at = Utc::now() - Duration::hours(1);
        let newer = DocumentRecord::new(fields("newer"));
        let repo = InMemoryCatalog::new(vec![older, newer]);

        let titles: Vec<_> = repo
            .list_newest_first()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(titles, vec!["newer", "older"]);
    }

    #[tokio::test]
    async fn replace_and_delete_unknown_id_is_not_found() {
        let repo = InMemoryCatalog::default();
        let record = DocumentRecord::new(fields("ghost"));

        assert!(matches!(repo.replace(&record).await, Err(PortalError::NotFound(_))));
        assert!(matches!(repo.delete(&record.id).await, Err(PortalError::NotFound(_))));
    }

    #[tokio::test]
    async fn store_serves_cache_until_invalidated() {
        let repo = Arc::new(InMemoryCatalog::default());
        let store = CatalogStore::new(repo.clone());
        assert!(store.documents().await.unwrap().is_empty());

        repo.insert(&DocumentRecord::new(fields("late"))).await.unwrap();
        assert!(store.documents().await.unwrap().is_empty());

        store.invalidate().await;
        assert_eq!(store.documents().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn seed_file_keeps_listed_order() {
        let path = format!("target/seed-{}.json", uuid::Uuid::new_v4());
        tokio::fs::create_dir_all("target").await.unwrap();
        tokio::fs::write(
            &path,
            r#"[
                {"title":"First","description":"a","category":"Panduan","type":"pdf","section":"Internal","downloadUrl":"https://x/1"},
                {"title":"Second","description":"b","category":"Data","fileType":"excel","thumbnail":"/img/2.png","downloadUrl":"https://x/2"}
            ]"#,
        )
        .await
        .unwrap();

        let repo = InMemoryCatalog::from_seed_file(&path).await.unwrap();
        let records = repo.list_newest_first().await.unwrap();

        assert_eq!(records[0].title, "First");
        assert_eq!(records[0].section, Section::Internal);
        assert_eq!(records[1].section, Section::Eksternal);
        assert_eq!(records[1].thumbnail_url.as_deref(), Some("/img/2.png"));

        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn seed_with_unknown_category_is_rejected() {
        let path = format!("target/seed-{}.json", uuid::Uuid::new_v4());
        tokio::fs::create_dir_all("target").await.unwrap();
        tokio::fs::write(
            &path,
            r##"[{"title":"X","description":"y","category":"Laporan","type":"pdf","downloadUrl":"#"}]"##,
        )
        .await
        .unwrap();

        assert!(InMemoryCatalog::from_seed_file(&path).await.is_err());
        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB on localhost:27017
    async fn mongo_catalog_round_trips_records() {
        let db_name = format!("portal_test_{}", uuid::Uuid::new_v4());
        let repo = MongoCatalog::connect("mongodb://localhost:27017", &db_name)
            .await
            .unwrap();
        repo.initialize_indexes().await.unwrap();

        let record = DocumentRecord::new(fields("stored"));
        repo.insert(&record).await.unwrap();
        assert_eq!(repo.get(&record.id).await.unwrap().unwrap().title, "stored");

        repo.delete(&record.id).await.unwrap();
        assert!(repo.get(&record.id).await.unwrap().is_none());

        let _ = repo.database().drop(None).await;
    }
}
