use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::menu::{CategoryList, MenuView},
    error::AppResult,
    response::ApiResponse,
    routes::params::{CategoryQuery, MenuQuery},
    services::menu_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_menu))
        .route("/categories", get(list_categories))
}

#[utoipa::path(
    get,
    path = "/api/menu",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("q" = Option<String>, Query, description = "Search in name and description"),
        ("restaurant_id" = Option<uuid::Uuid>, Query, description = "Only this restaurant"),
        ("category_id" = Option<uuid::Uuid>, Query, description = "Only this category"),
        ("vegetarian" = Option<bool>, Query, description = "Filter on the vegetarian flag")
    ),
    responses(
        (status = 200, description = "Available menu items with categories", body = ApiResponse<MenuView>)
    ),
    tag = "Menu"
)]
pub async fn list_menu(
    State(state): State<AppState>,
    Query(query): Query<MenuQuery>,
) -> AppResult<Json<ApiResponse<MenuView>>> {
    let resp = menu_service::list_menu(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/menu/categories",
    params(
        ("restaurant_id" = Option<uuid::Uuid>, Query, description = "Only this restaurant")
    ),
    responses(
        (status = 200, description = "Menu categories", body = ApiResponse<CategoryList>)
    ),
    tag = "Menu"
)]
pub async fn list_categories(
    State(state): State<AppState>,
    Query(query): Query<CategoryQuery>,
) -> AppResult<Json<ApiResponse<CategoryList>>> {
    let resp = menu_service::list_categories(&state, query).await?;
    Ok(Json(resp))
}
