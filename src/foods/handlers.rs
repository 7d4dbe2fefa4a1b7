use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::services::AuthUser,
    foods::{
        dto::{FoodItem, RecentSearchItem, RecentSearchParams, ScanRequest, ScanResponse, SearchParams},
        local, search,
    },
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/foods/search", get(search_foods))
        .route("/foods/scan-barcode", post(scan_barcode))
        .route("/foods/categories", get(list_categories))
        .route("/foods/recent-searches", get(recent_searches))
        .route("/foods/favorites", get(favorites))
}

#[instrument(skip(state))]
async fn search_foods(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<FoodItem>>, (StatusCode, String)> {
    let query = params.q.trim();
    if query.is_empty() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            "Le terme de recherche ne peut pas être vide".into(),
        ));
    }
    let limit = params.limit.clamp(1, 50);

    let mut records = search::search_foods(&state, user_id, query, limit).await;
    if let Some(category) = params.category.as_deref() {
        let wanted = category.to_lowercase();
        records.retain(|r| {
            r.categories
                .iter()
                .any(|c| c.to_lowercase().contains(&wanted))
        });
    }

    Ok(Json(records.into_iter().map(FoodItem::from).collect()))
}

/// Always 200; a miss is reported through `found: false`.
#[instrument(skip(state))]
async fn scan_barcode(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Json(body): Json<ScanRequest>,
) -> Result<Json<ScanResponse>, (StatusCode, String)> {
    let barcode = body.barcode.trim().to_string();
    if barcode.is_empty() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            "Le code-barres ne peut pas être vide".into(),
        ));
    }
    let found = search::barcode_lookup(&state, &barcode).await;
    Ok(Json(ScanResponse {
        barcode,
        found: found.is_some(),
        food_data: found.map(FoodItem::from),
    }))
}

/// Public: the category listing carries no user data.
async fn list_categories() -> Json<Vec<String>> {
    Json(local::categories())
}

#[instrument(skip(state))]
async fn recent_searches(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<RecentSearchParams>,
) -> Json<Vec<RecentSearchItem>> {
    let limit = params.limit.clamp(1, 20);
    let rows = search::recent_searches(&state, user_id, limit).await;
    Json(
        rows.into_iter()
            .map(|r| RecentSearchItem {
                query: r.query,
                searched_at: r.searched_at,
            })
            .collect(),
    )
}

/// Favorites are not persisted yet; serve the keto-friendly curated items so
/// the client screen has content.
#[instrument]
async fn favorites(AuthUser(_user_id): AuthUser) -> Json<Vec<FoodItem>> {
    Json(
        local::LOCAL_FOODS
            .iter()
            .filter(|r| r.is_keto_friendly())
            .cloned()
            .map(FoodItem::from)
            .collect(),
    )
}
