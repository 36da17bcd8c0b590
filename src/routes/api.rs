use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use std::sync::Arc;
use tracing::{error, warn};

use crate::db::{get_scan_history, save_scan_result, ScanRecord};
use crate::error::ApiError;
use crate::quota::{MemberQuotaGate, QuotaGate};
use crate::scanner::{extract_verdict, mock_verdict, GeminiAgent, ScanRequest, ScanVerdict};
use crate::state::AppState;
use crate::storage::generate_scan_id;

pub async fn health(State(_state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// `POST /api/scan` — multipart form with a `file` field plus an optional
/// identity (`user_id` for signed-in callers, `guest_id` for anonymous ones).
///
/// Always answers 200 with a verdict once the input is valid: an upstream
/// inference failure is downgraded to a flagged mock verdict, never surfaced
/// as an error to the caller.
pub async fn scan_handler(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ScanVerdict>, ApiError> {
    let mut file_bytes: Option<Vec<u8>> = None;
    let mut filename = String::new();
    let mut content_type: Option<String> = None;
    let mut user_id: Option<String> = None;
    let mut guest_id: Option<String> = None;

    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                filename = field.file_name().unwrap_or("upload").to_string();
                content_type = field.content_type().map(|c| c.to_string());
                if let Ok(data) = field.bytes().await {
                    file_bytes = Some(data.to_vec());
                }
            }
            "user_id" => {
                if let Ok(text) = field.text().await {
                    if !text.trim().is_empty() {
                        user_id = Some(text.trim().to_string());
                    }
                }
            }
            "guest_id" => {
                if let Ok(text) = field.text().await {
                    if !text.trim().is_empty() {
                        guest_id = Some(text.trim().to_string());
                    }
                }
            }
            _ => {}
        }
    }

    let request = ScanRequest::from_upload(
        &filename,
        content_type.as_deref(),
        file_bytes.unwrap_or_default(),
    )?;

    // Quota gate, picked by identity. Gate lookup failures fail open: a scan
    // is cheaper than a false denial.
    if let Some(ref uid) = user_id {
        let gate = MemberQuotaGate::new(state.pool.clone(), state.config.member_monthly_scans);
        if !gate.allow(uid).await.unwrap_or(true) {
            return Err(ApiError::QuotaExceeded);
        }
    } else if let Some(ref gid) = guest_id {
        if !state.guest_quota.allow(gid).await.unwrap_or(true) {
            return Err(ApiError::QuotaExceeded);
        }
    }

    let scan_id = generate_scan_id();
    let stored_name = format!("{}.{}", scan_id, request.extension());
    let upload_path = state.config.upload_folder.join(&stored_name);
    std::fs::write(&upload_path, &request.bytes)
        .map_err(|e| ApiError::Internal(format!("Failed to store upload: {}", e)))?;

    let mut agent = GeminiAgent::new(&state.config);
    let verdict = match agent.analyze_image(&request).await {
        Ok(report) => extract_verdict(&report),
        Err(e) => {
            warn!("Inference failed, answering with mock verdict: {}", e);
            mock_verdict(&e)
        }
    };

    if let Some(ref uid) = user_id {
        let image_url = format!("/uploads/{}", stored_name);
        if let Err(e) = save_scan_result(
            state.pool.as_ref(),
            uid,
            &image_url,
            verdict.is_ai,
            verdict.confidence,
            &verdict.raw,
        )
        .await
        {
            // History is best effort; the verdict still goes out.
            error!("Failed to save scan result for {}: {}", uid, e);
        }
    }

    if let Some(ref gid) = guest_id {
        if let Err(e) = state.guest_quota.record(gid).await {
            error!("Failed to record guest scan usage: {}", e);
        }
    }

    Ok(Json(verdict))
}

/// `GET /api/history/:user_id` — persisted scans, newest first.
pub async fn scan_history(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<ScanRecord>>, ApiError> {
    let records = get_scan_history(state.pool.as_ref(), &user_id)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to load scan history: {}", e)))?;
    Ok(Json(records))
}
