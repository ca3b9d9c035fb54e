use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};

use crate::query_types::ImageBatchQuery;
use crate::AppState;

pub async fn emcee_image_batch(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ImageBatchQuery>,
) -> Json<HashMap<String, String>> {
    let names = query.names();
    if names.is_empty() {
        return Json(HashMap::new());
    }
    Json(state.images.lookup_batch(&names).await)
}
