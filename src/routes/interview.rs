use crate::error::Result;
use crate::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::json;

/// Confirms one proposed interview time. The path parameter is the signed
/// token from the invitation email; no account or session is involved.
pub async fn confirm_interview(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<impl axum::response::IntoResponse> {
    let booking = state
        .confirmations
        .confirm(&token, crate::utils::time::now())
        .await?;

    Ok(Json(json!({
        "status": "success",
        "message": "Interview scheduled successfully",
        "event_id": booking.event_id,
        "time": booking.time.to_rfc3339(),
    })))
}
