use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{
    map_db_error, normalize_limit, normalize_skip, ApiError, ApiResponse, AppState, ResponseMeta,
};

#[derive(Debug, Serialize)]
pub(super) struct SourceItem {
    pub id: i64,
    pub public_id: Uuid,
    pub name: String,
    pub base_url: String,
    pub feed_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ListQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

pub(super) async fn list_sources(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<SourceItem>>>, ApiError> {
    let rows = perspectiva_db::list_sources(
        &state.pool,
        normalize_skip(query.skip),
        normalize_limit(query.limit),
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| SourceItem {
            id: row.id,
            public_id: row.public_id,
            name: row.name,
            base_url: row.base_url,
            feed_url: row.feed_url,
            created_at: row.created_at,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
