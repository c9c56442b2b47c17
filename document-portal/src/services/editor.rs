use crate::error::PortalError;
use crate::models::{Category, DocumentFields, DocumentRecord, FileType, Section};
use crate::services::catalog::CatalogStore;
use crate::services::storage::{Bucket, FileUpload, ObjectStore, PublicUrl, UploadClass};
use metrics::counter;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use validator::Validate;

/// Contents of the admin document form. Passed by reference so a failed
/// submission leaves it untouched for a retry.
#[derive(Debug, Clone, Validate)]
pub struct DocumentForm {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    pub category: Category,
    pub file_type: FileType,
    pub section: Section,
    pub thumbnail_url: Option<String>,
    pub download_url: Option<String>,
    pub thumbnail_file: Option<FileUpload>,
    pub document_file: Option<FileUpload>,
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl DocumentForm {
    /// Everything that can be checked without touching the network.
    pub fn check(&self) -> Result<(), PortalError> {
        self.validate()?;

        if self.title.trim().is_empty() || self.description.trim().is_empty() {
            return Err(PortalError::Validation(
                "Title and description must not be blank".to_string(),
            ));
        }

        if self.document_file.is_none() && non_empty(&self.download_url).is_none() {
            return Err(PortalError::Validation(
                "Upload a file or provide a download link".to_string(),
            ));
        }

        if let Some(file) = &self.thumbnail_file {
            check_size(file, UploadClass::Thumbnail)?;
        }
        if let Some(file) = &self.document_file {
            check_size(file, UploadClass::Document)?;
        }
        Ok(())
    }
}

fn check_size(file: &FileUpload, class: UploadClass) -> Result<(), PortalError> {
    if file.data.is_empty() {
        return Err(PortalError::Validation(format!(
            "{} file {} is empty",
            class, file.file_name
        )));
    }
    if file.size() > class.max_bytes() {
        return Err(PortalError::FileTooLarge {
            class,
            limit_mib: class.limit_mib(),
        });
    }
    Ok(())
}

/// Resets the in-flight flag when an operation ends, however it ends.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, PortalError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| PortalError::Busy)?;
        Ok(Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// An object written during the current operation.
struct StoredObject {
    bucket: Bucket,
    name: String,
}

/// CRUD over the catalog plus file upload. One operation at a time; every
/// mutation ends with a full catalog reload.
pub struct AdminEditor {
    catalog: Arc<CatalogStore>,
    storage: Arc<dyn ObjectStore>,
    in_flight: AtomicBool,
}

impl AdminEditor {
    pub fn new(catalog: Arc<CatalogStore>, storage: Arc<dyn ObjectStore>) -> Self {
        Self {
            catalog,
            storage,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// A failed reload after a successful insert is reported as
    /// `ReloadFailed`, which names the stored record.
    pub async fn create(&self, form: &DocumentForm) -> Result<DocumentRecord, PortalError> {
        let _guard = InFlight::acquire(&self.in_flight)?;
        form.check()?;

        let mut stored = Vec::new();
        let record = match self.insert_new(form, &mut stored).await {
            Ok(record) => record,
            Err(e) => {
                self.discard(stored).await;
                return Err(e);
            }
        };
        tracing::info!(document_id = %record.id, title = %record.title, "Document created");
        counter!("portal_editor_operations_total", "operation" => "create").increment(1);

        self.refresh(&record.id).await?;
        Ok(record)
    }

    pub async fn update(&self, id: &str, form: &DocumentForm) -> Result<DocumentRecord, PortalError> {
        let _guard = InFlight::acquire(&self.in_flight)?;
        form.check()?;

        let mut stored = Vec::new();
        let record = match self.replace_existing(id, form, &mut stored).await {
            Ok(record) => record,
            Err(e) => {
                self.discard(stored).await;
                return Err(e);
            }
        };
        tracing::info!(document_id = %id, "Document updated");
        counter!("portal_editor_operations_total", "operation" => "update").increment(1);

        self.refresh(id).await?;
        Ok(record)
    }

    /// Irreversible; refused unless the caller has confirmed it.
    pub async fn delete(&self, id: &str, confirmed: bool) -> Result<(), PortalError> {
        if !confirmed {
            return Err(PortalError::Validation(
                "Deletion must be confirmed".to_string(),
            ));
        }
        let _guard = InFlight::acquire(&self.in_flight)?;

        self.catalog.repository().delete(id).await.map_err(|e| {
            tracing::error!(document_id = %id, "Failed to delete document: {}", e);
            e
        })?;
        tracing::info!(document_id = %id, "Document deleted");
        counter!("portal_editor_operations_total", "operation" => "delete").increment(1);

        self.refresh(id).await
    }

    /// Stores one file and returns its public URL. Oversize files are
    /// rejected before the object store is called.
    pub async fn upload_binary(
        &self,
        file: &FileUpload,
        class: UploadClass,
    ) -> Result<PublicUrl, PortalError> {
        let _guard = InFlight::acquire(&self.in_flight)?;
        let (_, url) = self.upload(file, class).await?;
        Ok(url)
    }

    async fn upload(
        &self,
        file: &FileUpload,
        class: UploadClass,
    ) -> Result<(StoredObject, PublicUrl), PortalError> {
        check_size(file, class)?;

        let bucket = class.bucket();
        let name = file.object_name();
        let url = self
            .storage
            .put(bucket, &name, file.data.clone())
            .await
            .map_err(|e| {
                tracing::error!(file_name = %file.file_name, %class, "Upload failed: {}", e);
                e
            })?;

        tracing::info!(file_name = %file.file_name, size = file.size(), %class, url = %url, "File uploaded");
        counter!("portal_uploads_total", "class" => class.to_string()).increment(1);
        Ok((StoredObject { bucket, name }, url))
    }

    async fn insert_new(
        &self,
        form: &DocumentForm,
        stored: &mut Vec<StoredObject>,
    ) -> Result<DocumentRecord, PortalError> {
        let fields = self.resolve_fields(form, stored).await?;
        let record = DocumentRecord::new(fields);

        self.catalog.repository().insert(&record).await.map_err(|e| {
            tracing::error!(document_id = %record.id, "Failed to create document: {}", e);
            e
        })?;
        Ok(record)
    }

    async fn replace_existing(
        &self,
        id: &str,
        form: &DocumentForm,
        stored: &mut Vec<StoredObject>,
    ) -> Result<DocumentRecord, PortalError> {
        let mut record = self
            .catalog
            .repository()
            .get(id)
            .await?
            .ok_or_else(|| PortalError::NotFound(id.to_string()))?;

        let fields = self.resolve_fields(form, stored).await?;
        record.replace_fields(fields);

        self.catalog.repository().replace(&record).await.map_err(|e| {
            tracing::error!(document_id = %id, "Failed to update document: {}", e);
            e
        })?;
        Ok(record)
    }

    /// Uploads attached files and substitutes their URLs for the typed links.
    /// Every object written is pushed to `stored`.
    async fn resolve_fields(
        &self,
        form: &DocumentForm,
        stored: &mut Vec<StoredObject>,
    ) -> Result<DocumentFields, PortalError> {
        let thumbnail_url = match &form.thumbnail_file {
            Some(file) => {
                let (object, url) = self.upload(file, UploadClass::Thumbnail).await?;
                stored.push(object);
                Some(url.0)
            }
            None => non_empty(&form.thumbnail_url),
        };
        let download_url = match &form.document_file {
            Some(file) => {
                let (object, url) = self.upload(file, UploadClass::Document).await?;
                stored.push(object);
                url.0
            }
            None => non_empty(&form.download_url).ok_or_else(|| {
                PortalError::Validation("Upload a file or provide a download link".to_string())
            })?,
        };

        Ok(DocumentFields {
            title: form.title.trim().to_string(),
            description: form.description.trim().to_string(),
            category: form.category,
            file_type: form.file_type,
            section: form.section,
            thumbnail_url,
            download_url,
        })
    }

    /// Removes objects no record will point to after a failed write.
    async fn discard(&self, stored: Vec<StoredObject>) {
        for object in stored {
            if let Err(e) = self.storage.delete(object.bucket, &object.name).await {
                tracing::warn!(
                    bucket = object.bucket.as_str(),
                    name = %object.name,
                    "Failed to remove orphaned upload: {}",
                    e
                );
            }
        }
    }

    async fn refresh(&self, id: &str) -> Result<(), PortalError> {
        self.catalog.invalidate().await;
        self.catalog.reload().await.map(|_| ()).map_err(|e| {
            tracing::error!(document_id = %id, "Catalog reload after mutation failed: {}", e);
            PortalError::ReloadFailed {
                id: id.to_string(),
                source: Box::new(e),
            }
        })
    }
}
