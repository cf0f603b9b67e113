use axum::{extract::State, Extension, Json};

use perspectiva_ingest::{run_cycle, CycleStats};

use crate::middleware::RequestId;

use super::{ApiResponse, AppState, ResponseMeta};

/// Admin trigger: run a single ingestion cycle and return its counters.
///
/// Useful for manual runs in dev/test; the background loop is the normal
/// driver. Cycle-internal failures are absorbed per feed/entry, so this
/// handler itself cannot fail.
pub(super) async fn run_once(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<CycleStats>> {
    let stats = run_cycle(&state.pool, &state.config, &state.fetcher).await;
    Json(ApiResponse {
        data: stats,
        meta: ResponseMeta::new(req_id.0),
    })
}
