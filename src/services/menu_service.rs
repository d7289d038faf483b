use sea_orm::sea_query::{Expr, LikeExpr};
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};

use crate::{
    dto::menu::{CategoryList, MenuView},
    entity::{
        categories::{Column as CategoryCol, Entity as Categories},
        menu_items::{Column as MenuCol, Entity as MenuItems},
    },
    error::AppResult,
    models::{Category, MenuItem},
    response::{ApiResponse, Meta},
    routes::params::{CategoryQuery, MenuQuery},
    state::AppState,
};

/// Available items, optionally narrowed to a restaurant, category, diet or name match.
pub async fn list_menu(state: &AppState, query: MenuQuery) -> AppResult<ApiResponse<MenuView>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all().add(MenuCol::IsAvailable.eq(true));

    if let Some(search) = query.q.as_ref().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", escape_like(search));
        let like = || LikeExpr::new(pattern.clone()).escape('\\');
        condition = condition.add(
            Condition::any()
                .add(Expr::col(MenuCol::Name).ilike(like()))
                .add(Expr::col(MenuCol::Description).ilike(like())),
        );
    }
    if let Some(restaurant_id) = query.restaurant_id {
        condition = condition.add(MenuCol::RestaurantId.eq(restaurant_id));
    }
    if let Some(category_id) = query.category_id {
        condition = condition.add(MenuCol::CategoryId.eq(category_id));
    }
    if let Some(vegetarian) = query.vegetarian {
        condition = condition.add(MenuCol::IsVegetarian.eq(vegetarian));
    }

    let finder = MenuItems::find()
        .filter(condition)
        .order_by_asc(MenuCol::Name);
    let total = finder.clone().count(&state.orm).await? as i64;

    let items: Vec<MenuItem> = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(MenuItem::from)
        .collect();

    let categories = categories_for(state, query.restaurant_id).await?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Menu",
        MenuView { categories, items },
        Some(meta),
    ))
}

pub async fn list_categories(
    state: &AppState,
    query: CategoryQuery,
) -> AppResult<ApiResponse<CategoryList>> {
    let items = categories_for(state, query.restaurant_id).await?;
    let meta = Meta::total(items.len());
    Ok(ApiResponse::success(
        "Categories",
        CategoryList { items },
        Some(meta),
    ))
}

async fn categories_for(
    state: &AppState,
    restaurant_id: Option<uuid::Uuid>,
) -> AppResult<Vec<Category>> {
    let mut finder = Categories::find().order_by_asc(CategoryCol::Name);
    if let Some(restaurant_id) = restaurant_id {
        finder = finder.filter(CategoryCol::RestaurantId.eq(restaurant_id));
    }
    let categories = finder
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Category::from)
        .collect();
    Ok(categories)
}

/// Match user text literally inside a LIKE pattern.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_wildcards_are_escaped() {
        assert_eq!(escape_like("pizza"), "pizza");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("c:\\x"), "c:\\\\x");
    }
}
