//! User provisioning endpoints

use crate::domain::ImportSummary;
use crate::error::Result;
use crate::server::AppState;
use axum::{extract::State, Json};

/// `POST /users/bulk-create`: import every configured person.
///
/// Responds with the import summary, or with the first error that aborted
/// the batch.
pub async fn bulk_create(State(state): State<AppState>) -> Result<Json<ImportSummary>> {
    let summary = state
        .bulk_import_service
        .import_all(state.person_repo.as_ref(), &state.shutdown)
        .await?;

    Ok(Json(summary))
}
