use axum::{
    extract::{Path, Query, State},
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
pub(super) struct ArticleItem {
    pub id: i64,
    pub public_id: Uuid,
    pub source_id: i64,
    pub title: String,
    pub url: String,
    pub published_at: Option<DateTime<Utc>>,
    pub full_text: Option<String>,
    pub summary: Option<String>,
    pub sentiment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<perspectiva_db::ArticleRow> for ArticleItem {
    fn from(row: perspectiva_db::ArticleRow) -> Self {
        Self {
            id: row.id,
            public_id: row.public_id,
            source_id: row.source_id,
            title: row.title,
            url: row.url,
            published_at: row.published_at,
            full_text: row.full_text,
            summary: row.summary,
            sentiment: row.sentiment,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ListQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

pub(super) async fn list_articles(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<ArticleItem>>>, ApiError> {
    let rows = perspectiva_db::list_articles(
        &state.pool,
        normalize_skip(query.skip),
        normalize_limit(query.limit),
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(ArticleItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn get_article(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(article_id): Path<i64>,
) -> Result<Json<ApiResponse<ArticleItem>>, ApiError> {
    let row = perspectiva_db::get_article(&state.pool, article_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| ApiError::new(req_id.0.clone(), "not_found", "article not found"))?;

    Ok(Json(ApiResponse {
        data: ArticleItem::from(row),
        meta: ResponseMeta::new(req_id.0),
    }))
}
