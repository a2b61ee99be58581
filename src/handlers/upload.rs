use axum::{
    extract::{Multipart, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use tracing::{debug, info, instrument, trace};

use crate::error::AppError;
use crate::schemas::AppState;

const FILE_FIELD: &str = "file";

/// Upload form
#[instrument(skip(state))]
pub async fn upload_form(State(state): State<AppState>) -> Response {
    match state.views.index_page() {
        Ok(html) => Html(html).into_response(),
        Err(e) => state.views.error_page(&AppError::from(e)).into_response(),
    }
}

/// Stores the uploaded CSV and sends the browser on to the column picker.
#[instrument(skip(state, multipart))]
pub async fn upload_dataset(State(state): State<AppState>, multipart: Multipart) -> Response {
    match store_upload(&state, multipart).await {
        Ok(filename) => {
            info!("Stored upload '{}'", filename);
            Redirect::to(&format!("/forecast/{}", urlencoding::encode(&filename))).into_response()
        }
        Err(e) => state.views.error_page(&e).into_response(),
    }
}

async fn store_upload(state: &AppState, mut multipart: Multipart) -> Result<String, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        trace!("Multipart field {:?}", field.name());
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = match field.file_name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => break,
        };
        let bytes = field.bytes().await.map_err(malformed)?;
        debug!("Received '{}' ({} bytes)", filename, bytes.len());

        state.store.save(&filename, &bytes).await?;
        return Ok(filename);
    }
    Err(AppError::BadRequest("No file selected!".to_string()))
}

fn malformed(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::BadRequest(format!("Malformed upload: {}", e.body_text()))
}
