use crate::error::PortalError;
use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

const MIB: u64 = 1024 * 1024;

/// Logical bucket inside the object store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Thumbnails,
    Documents,
}

impl Bucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::Thumbnails => "thumbnails",
            Bucket::Documents => "documents",
        }
    }
}

/// What an uploaded file is for; decides bucket and size limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadClass {
    Thumbnail,
    Document,
}

impl UploadClass {
    pub fn bucket(&self) -> Bucket {
        match self {
            UploadClass::Thumbnail => Bucket::Thumbnails,
            UploadClass::Document => Bucket::Documents,
        }
    }

    pub fn limit_mib(&self) -> u64 {
        match self {
            UploadClass::Thumbnail => 10,
            UploadClass::Document => 40,
        }
    }

    pub fn max_bytes(&self) -> u64 {
        self.limit_mib() * MIB
    }
}

impl fmt::Display for UploadClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadClass::Thumbnail => f.write_str("thumbnail"),
            UploadClass::Document => f.write_str("document"),
        }
    }
}

impl std::str::FromStr for UploadClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "thumbnail" => Ok(UploadClass::Thumbnail),
            "document" => Ok(UploadClass::Document),
            _ => Err(format!("Invalid upload class: {}", s)),
        }
    }
}

/// A file chosen for upload.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub data: Vec<u8>,
}

impl FileUpload {
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Randomized object name that keeps the original extension, so two
    /// uploads of `laporan.pdf` never collide.
    pub fn object_name(&self) -> String {
        let extension = Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_else(|| "bin".to_string());

        format!("{}.{}", Uuid::new_v4(), extension)
    }
}

/// URL under which a stored object is publicly reachable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicUrl(pub String);

impl fmt::Display for PublicUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, bucket: Bucket, name: &str, data: Vec<u8>) -> Result<PublicUrl, PortalError>;
    async fn delete(&self, bucket: Bucket, name: &str) -> Result<(), PortalError>;
}

fn check_object_name(name: &str) -> Result<(), PortalError> {
    if name.is_empty() || name.contains('/') || name.contains('\\') || name.contains("..") {
        return Err(PortalError::Validation(format!("Invalid object name: {}", name)));
    }
    Ok(())
}

/// Filesystem-backed store. Objects land in `{base_path}/{bucket}/{name}` and
/// are served by the portal under `{public_base_url}/{bucket}/{name}`.
pub struct LocalObjectStore {
    base_path: PathBuf,
    public_base_url: String,
}

impl LocalObjectStore {
    pub async fn new(
        base_path: impl Into<PathBuf>,
        public_base_url: impl Into<String>,
    ) -> Result<Self, PortalError> {
        let base_path = base_path.into();
        if !base_path.exists() {
            fs::create_dir_all(&base_path).await?;
        }
        Ok(Self {
            base_path,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(&self, bucket: Bucket, name: &str, data: Vec<u8>) -> Result<PublicUrl, PortalError> {
        check_object_name(name)?;

        let dir = self.base_path.join(bucket.as_str());
        fs::create_dir_all(&dir).await?;
        fs::write(dir.join(name), data).await.map_err(|e| {
            tracing::error!(bucket = bucket.as_str(), name = %name, "Failed to write object: {}", e);
            PortalError::from(e)
        })?;

        Ok(PublicUrl(format!(
            "{}/{}/{}",
            self.public_base_url,
            bucket.as_str(),
            name
        )))
    }

    async fn delete(&self, bucket: Bucket, name: &str) -> Result<(), PortalError> {
        check_object_name(name)?;

        let path = self.base_path.join(bucket.as_str()).join(name);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        PathBuf::from(format!("target/test-storage-{}", Uuid::new_v4()))
    }

    #[test]
    fn limits_follow_upload_class() {
        assert_eq!(UploadClass::Thumbnail.max_bytes(), 10 * 1024 * 1024);
        assert_eq!(UploadClass::Document.max_bytes(), 40 * 1024 * 1024);
        assert_eq!(UploadClass::Thumbnail.bucket(), Bucket::Thumbnails);
        assert_eq!(UploadClass::Document.bucket(), Bucket::Documents);
    }

    #[test]
    fn object_names_are_random_and_keep_extension() {
        let upload = FileUpload {
            file_name: "Laporan Akhir.PDF".to_string(),
            data: vec![],
        };
        let first = upload.object_name();
        let second = upload.object_name();

        assert!(first.ends_with(".pdf"));
        assert_ne!(first, second);
    }

    #[test]
    fn odd_extensions_fall_back_to_bin() {
        let upload = FileUpload {
            file_name: "noext".to_string(),
            data: vec![],
        };
        assert!(upload.object_name().ends_with(".bin"));
    }

    #[tokio::test]
    async fn local_store_writes_and_returns_public_url() {
        let dir = temp_dir();
        let store = LocalObjectStore::new(&dir, "http://localhost:8080/files/")
            .await
            .unwrap();

        let url = store.put(Bucket::Documents, "abc.pdf", vec![1, 2, 3]).await.unwrap();

        assert_eq!(url.0, "http://localhost:8080/files/documents/abc.pdf");
        let written = tokio::fs::read(dir.join("documents").join("abc.pdf")).await.unwrap();
        assert_eq!(written, vec![1, 2, 3]);

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn local_store_deletes_objects() {
        let dir = temp_dir();
        let store = LocalObjectStore::new(&dir, "http://localhost/files").await.unwrap();
        store.put(Bucket::Thumbnails, "cover.png", vec![9]).await.unwrap();

        store.delete(Bucket::Thumbnails, "cover.png").await.unwrap();

        assert!(!dir.join("thumbnails").join("cover.png").exists());
        // Already gone is not an error.
        store.delete(Bucket::Thumbnails, "cover.png").await.unwrap();

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn local_store_rejects_path_traversal() {
        let dir = temp_dir();
        let store = LocalObjectStore::new(&dir, "http://localhost/files").await.unwrap();

        let result = store.put(Bucket::Thumbnails, "../escape.png", vec![0]).await;
        assert!(matches!(result, Err(PortalError::Validation(_))));

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
