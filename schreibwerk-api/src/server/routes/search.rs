use crate::server::{Result, ServerError, ServerRouter, json::Json};
use axum::{
    Router,
    extract::{Query, State, rejection::QueryRejection},
};
use axum_extra::routing::{RouterExt, TypedPath};
use schreibwerk_common::model::post::{PostSortField, PostSummary, SortOrder};
use schreibwerk_db::client::DbClient;
use serde::Deserialize;
use std::sync::Arc;

const DEFAULT_PAGE_SIZE: i64 = 10;
const MAX_PAGE_SIZE: i64 = 100;

pub fn routes() -> ServerRouter {
    Router::new().typed_post(search)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/search")]
struct SearchPath;

#[derive(Clone, Eq, PartialEq, Debug, Default, Deserialize)]
struct SearchParams {
    filter: Option<String>,
    sort_field: Option<PostSortField>,
    sort_order: Option<SortOrder>,
    page: Option<i64>,
    page_size: Option<i64>,
}

async fn search(
    _: SearchPath,
    State(db): State<Arc<DbClient>>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Vec<PostSummary>>> {
    let Query(params) = params.map_err(ServerError::QueryRejection)?;

    let (limit, offset) = page_window(params.page, params.page_size);
    let category = params.filter.as_deref().filter(|filter| !filter.is_empty());

    let summaries = db
        .search_posts(
            category,
            params.sort_field.unwrap_or_default(),
            params.sort_order.unwrap_or_default(),
            limit,
            offset,
        )
        .await?;

    Ok(Json(summaries))
}

/// Clamps page/page-size inputs and turns them into limit and offset.
fn page_window(page: Option<i64>, page_size: Option<i64>) -> (i64, i64) {
    let page = page.unwrap_or(1).max(1);
    let limit = page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);

    (limit, (page - 1) * limit)
}

#[cfg(test)]
mod tests {
    use crate::server::routes::search::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, page_window};

    #[test]
    fn page_window_defaults() {
        assert_eq!(page_window(None, None), (DEFAULT_PAGE_SIZE, 0));
        assert_eq!(page_window(Some(1), Some(5)), (5, 0));
        assert_eq!(page_window(Some(2), Some(5)), (5, 5));
        assert_eq!(page_window(Some(3), Some(10)), (10, 20));
    }

    #[test]
    fn page_window_out_of_range_input() {
        assert_eq!(page_window(Some(0), None), (DEFAULT_PAGE_SIZE, 0));
        assert_eq!(page_window(Some(-4), Some(0)), (1, 0));
        assert_eq!(page_window(None, Some(100_000)), (MAX_PAGE_SIZE, 0));
    }
}
