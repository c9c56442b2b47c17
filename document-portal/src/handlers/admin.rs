use crate::dtos::{AdminLoginRequest, DeleteParams, DocumentResponse, SessionResponse, UploadResponse};
use crate::error::PortalError;
use crate::models::{AdminSession, PortalSession};
use crate::services::{DocumentForm, FileUpload, UploadClass};
use crate::startup::AppState;
use axum::{
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;
use std::collections::HashMap;

pub async fn admin_login(
    State(state): State<AppState>,
    mut session: PortalSession,
    Json(request): Json<AdminLoginRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    if let Err(e) = state.admin_gate.sign_in(&mut session.state, &request.password) {
        tracing::warn!("Admin sign-in rejected");
        return Err(e.into());
    }
    session.save().await?;
    tracing::info!("Admin signed in");

    Ok(Json(SessionResponse::from(&session.state)))
}

pub async fn admin_logout(mut session: PortalSession) -> Result<Json<SessionResponse>, AppError> {
    session.state.sign_out_admin();
    session.save().await?;

    Ok(Json(SessionResponse::from(&session.state)))
}

pub async fn create_document(
    State(state): State<AppState>,
    _admin: AdminSession,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let form = read_document_form(multipart).await?;
    let record = state.editor.create(&form).await?;

    Ok((StatusCode::CREATED, Json(DocumentResponse::from(record))))
}

pub async fn update_document(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<DocumentResponse>, AppError> {
    let form = read_document_form(multipart).await?;
    let record = state.editor.update(&id, &form).await?;

    Ok(Json(DocumentResponse::from(record)))
}

pub async fn delete_document(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(id): Path<String>,
    Query(params): Query<DeleteParams>,
) -> Result<StatusCode, AppError> {
    state.editor.delete(&id, params.confirm).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Stores a single file (multipart field `file`) and answers its public URL.
pub async fn upload_file(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(class): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let class: UploadClass = class
        .parse()
        .map_err(|e: String| AppError::NotFound(anyhow::anyhow!(e)))?;

    let mut file = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() == Some("file") {
            let file_name = field.file_name().unwrap_or("unnamed").to_string();
            let data = field.bytes().await.map_err(multipart_error)?;
            file = Some(FileUpload {
                file_name,
                data: data.to_vec(),
            });
        }
    }

    let file = file.ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Missing file field")))?;
    let url = state.editor.upload_binary(&file, class).await?;

    Ok(Json(UploadResponse { url: url.0 }))
}

/// Collects the admin form. Browsers send an empty, unnamed part for a file
/// input left blank; that counts as no file.
async fn read_document_form(mut multipart: Multipart) -> Result<DocumentForm, AppError> {
    let mut text: HashMap<String, String> = HashMap::new();
    let mut thumbnail_file = None;
    let mut document_file = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "thumbnailFile" | "documentFile" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(multipart_error)?;
                if file_name.is_empty() && data.is_empty() {
                    continue;
                }
                let upload = FileUpload {
                    file_name,
                    data: data.to_vec(),
                };
                if name == "thumbnailFile" {
                    thumbnail_file = Some(upload);
                } else {
                    document_file = Some(upload);
                }
            }
            _ => {
                let value = field.text().await.map_err(multipart_error)?;
                text.insert(name, value);
            }
        }
    }

    Ok(DocumentForm {
        title: text.remove("title").unwrap_or_default(),
        description: text.remove("description").unwrap_or_default(),
        category: parse_field(&text, "category")?,
        file_type: parse_field(&text, "fileType")?,
        section: match text.get("section").filter(|v| !v.trim().is_empty()) {
            Some(value) => value.trim().parse().map_err(bad_field)?,
            None => Default::default(),
        },
        thumbnail_url: text.remove("thumbnailUrl"),
        download_url: text.remove("downloadUrl"),
        thumbnail_file,
        document_file,
    })
}

fn parse_field<T>(text: &HashMap<String, String>, name: &str) -> Result<T, AppError>
where
    T: std::str::FromStr<Err = String>,
{
    let value = text
        .get(name)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| bad_field(format!("{} is required", name)))?;
    value.parse().map_err(bad_field)
}

fn bad_field(message: String) -> AppError {
    PortalError::Validation(message).into()
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(anyhow::anyhow!(err.body_text()))
    } else {
        AppError::BadRequest(anyhow::anyhow!("Invalid multipart body: {}", err.body_text()))
    }
}
