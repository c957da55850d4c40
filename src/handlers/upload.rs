// src/handlers/upload.rs

use axum::{Json, extract::Multipart, response::IntoResponse};

use crate::{error::AppError, extract::parse_extracted};

/// Accepts an uploaded extraction document and returns the drafts it
/// contains, normalized and ready to merge into the caller's batch.
///
/// The `file` field is preferred; failing that, the first field wins.
pub async fn upload_file(mut multipart: Multipart) -> Result<impl IntoResponse, AppError> {
    let mut document: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::BadRequest(err.to_string()))?
    {
        let is_file_field = field.name() == Some("file");
        if is_file_field || document.is_none() {
            let text = field
                .text()
                .await
                .map_err(|err| AppError::BadRequest(err.to_string()))?;
            document = Some(text);
        }
        if is_file_field {
            break;
        }
    }

    let Some(document) = document else {
        return Err(AppError::BadRequest(
            "Upload contained no file field".to_string(),
        ));
    };

    let drafts = parse_extracted(&document)?;
    Ok(Json(
        serde_json::json!({"total": drafts.len(), "drafts": drafts}),
    ))
}
