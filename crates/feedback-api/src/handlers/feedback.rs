// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Feedback handlers.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use feedback_core::{parse_page_request, Feedback, FeedbackId, FeedbackInput, FeedbackService};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};

/// Header carrying the URL of the next page.
pub const CURSOR_NEXT: HeaderName = HeaderName::from_static("url-cursor-next");

// =============================================================================
// Types
// =============================================================================

/// Body of a successful create.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedResponse {
    /// Identifier of the new record.
    pub id: FeedbackId,
}

/// Query parameters for `GET /p-feedbacks`.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    /// Page size.
    pub limit: Option<String>,
    /// Cursor: identifier of the last record already seen.
    pub next: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// POST /feedback
pub async fn create_feedback(
    State(service): State<FeedbackService>,
    payload: Result<Json<FeedbackInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    let Json(input) = payload?;
    let id = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// GET /feedback/{id}
pub async fn get_feedback(
    State(service): State<FeedbackService>,
    id: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<Feedback>> {
    let Path(id) = id?;
    let record = service.get_by_id(&id).await?;
    Ok(Json(record))
}

/// GET /feedbacks
pub async fn list_feedbacks(
    State(service): State<FeedbackService>,
) -> ApiResult<Json<Vec<Feedback>>> {
    let records = service.get_all().await?;
    Ok(Json(records))
}

/// GET /p-feedbacks?limit=<int>&next=<id>
///
/// An empty page is reported as a client error: the caller has run past the
/// end of the collection.
pub async fn page_feedbacks(
    State(service): State<FeedbackService>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> ApiResult<Response> {
    let Query(params) = params?;
    let request = parse_page_request(params.limit.as_deref(), params.next.as_deref())?;
    let page = service.get_page(request).await?;

    let Some(cursor) = page.next_cursor else {
        return Err(ApiError::invalid_parameter("no more feedbacks"));
    };

    let next_url = format!("/p-feedbacks?limit={}&next={}", request.limit, cursor);
    let next_url = HeaderValue::from_str(&next_url)
        .map_err(|e| ApiError::internal(format!("invalid cursor header: {}", e)))?;

    Ok(([(CURSOR_NEXT, next_url)], Json(page.items)).into_response())
}
