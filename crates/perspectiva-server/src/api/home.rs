use axum::extract::State;
use axum::response::Html;
use axum::Extension;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, AppState};

const RECENT_LIMIT: i64 = 30;

/// Minimal HTML homepage: a table of the most recent articles.
pub(super) async fn home(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Html<String>, ApiError> {
    let rows = perspectiva_db::list_recent_articles_with_source(&state.pool, RECENT_LIMIT)
        .await
        .map_err(|e| map_db_error(req_id.0, &e))?;

    let mut html = String::from(
        "<html><head><title>Perspectiva</title></head><body>\
         <h1>Recent Articles</h1>\
         <table border='1' cellpadding='6'>\
         <tr><th>Title</th><th>Source</th><th>Published</th><th>Sentiment</th></tr>",
    );
    for row in rows {
        let published = row
            .published_at
            .map(|t| t.to_rfc3339())
            .unwrap_or_default();
        html.push_str(&format!(
            "<tr><td><a href='{url}' target='_blank'>{title}</a></td>\
             <td>{source}</td><td>{published}</td><td>{sentiment}</td></tr>",
            url = html_escape::encode_quoted_attribute(&row.url),
            title = html_escape::encode_text(&row.title),
            source = html_escape::encode_text(&row.source_name),
            sentiment = row.sentiment.as_deref().unwrap_or(""),
        ));
    }
    html.push_str("</table></body></html>");

    Ok(Html(html))
}
