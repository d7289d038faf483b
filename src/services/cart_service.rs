use std::collections::HashMap;

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::{
    cart_store::CartEntries,
    dto::cart::{AddToCartRequest, CartEntryDto, CartLine, CartView, UpdateCartRequest},
    entity::menu_items::{Column as MenuCol, Entity as MenuItems},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::MenuItem,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn view_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartView>> {
    let entries = state.carts.snapshot(user.session_id);
    let cart = materialize(&state.orm, &entries).await?;
    let meta = Meta::total(cart.items.len());
    Ok(ApiResponse::success("OK", cart, Some(meta)))
}

pub async fn add_to_cart(
    state: &AppState,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartEntryDto>> {
    let quantity = payload.quantity.unwrap_or(1);
    if quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }

    let item = MenuItems::find_by_id(payload.menu_item_id)
        .one(&state.orm)
        .await?;
    match item {
        Some(item) if item.is_available => {}
        Some(_) => return Err(AppError::BadRequest("menu item is not available".to_string())),
        None => return Err(AppError::BadRequest("menu item not found".to_string())),
    }

    let quantity = state
        .carts
        .add(user.session_id, payload.menu_item_id, quantity)?;
    tracing::debug!(
        session_id = %user.session_id,
        menu_item_id = %payload.menu_item_id,
        quantity,
        "cart item added"
    );

    Ok(ApiResponse::success(
        "Item added to cart",
        CartEntryDto {
            menu_item_id: payload.menu_item_id,
            quantity,
        },
        None,
    ))
}

pub async fn update_cart(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateCartRequest,
) -> AppResult<ApiResponse<CartView>> {
    state
        .carts
        .set(user.session_id, payload.menu_item_id, payload.quantity)?;
    tracing::debug!(
        session_id = %user.session_id,
        menu_item_id = %payload.menu_item_id,
        quantity = payload.quantity,
        "cart updated"
    );

    let entries = state.carts.snapshot(user.session_id);
    let cart = materialize(&state.orm, &entries).await?;
    Ok(ApiResponse::success("Cart updated", cart, Some(Meta::empty())))
}

pub fn clear_cart(state: &AppState, user: &AuthUser) -> ApiResponse<serde_json::Value> {
    state.carts.clear(user.session_id);
    ApiResponse::success("Cart cleared", serde_json::json!({}), Some(Meta::empty()))
}

/// Load the current rows for every item referenced by the cart.
pub async fn load_cart_items<C: ConnectionTrait>(
    conn: &C,
    entries: &CartEntries,
) -> AppResult<HashMap<Uuid, MenuItem>> {
    if entries.is_empty() {
        return Ok(HashMap::new());
    }
    let ids: Vec<Uuid> = entries.keys().copied().collect();
    let items = MenuItems::find()
        .filter(MenuCol::Id.is_in(ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|model| (model.id, MenuItem::from(model)))
        .collect();
    Ok(items)
}

pub async fn materialize<C: ConnectionTrait>(
    conn: &C,
    entries: &CartEntries,
) -> AppResult<CartView> {
    let items = load_cart_items(conn, entries).await?;
    price_cart(entries, &items)
}

/// Price a cart against current menu data. Entries whose item no longer exists are skipped.
pub fn price_cart(entries: &CartEntries, items: &HashMap<Uuid, MenuItem>) -> AppResult<CartView> {
    let mut lines = Vec::with_capacity(entries.len());
    let mut total: i64 = 0;
    for (item_id, &quantity) in entries {
        let Some(item) = items.get(item_id) else {
            continue;
        };
        let subtotal = line_total(item.price, quantity)?;
        total = total.checked_add(subtotal).ok_or_else(amount_too_large)?;
        lines.push(CartLine {
            item: item.clone(),
            quantity,
            subtotal,
        });
    }
    Ok(CartView {
        items: lines,
        total,
    })
}

/// `price × quantity` in cents, rejecting amounts that do not fit.
pub fn line_total(price: i64, quantity: i32) -> AppResult<i64> {
    price
        .checked_mul(i64::from(quantity))
        .ok_or_else(amount_too_large)
}

pub(crate) fn amount_too_large() -> AppError {
    AppError::BadRequest("Order amount is too large".to_string())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Utc;

    pub(crate) fn menu_item(price: i64, restaurant_id: Uuid) -> MenuItem {
        MenuItem {
            id: Uuid::new_v4(),
            name: format!("item-{price}"),
            description: String::new(),
            price,
            image: None,
            is_available: true,
            is_vegetarian: false,
            category_id: Uuid::new_v4(),
            restaurant_id,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn totals_match_line_subtotals() {
        let restaurant = Uuid::new_v4();
        let margherita = menu_item(1299, restaurant);
        let salad = menu_item(899, restaurant);

        let mut entries = CartEntries::new();
        entries.insert(margherita.id, 2);
        entries.insert(salad.id, 1);
        let items = HashMap::from([
            (margherita.id, margherita.clone()),
            (salad.id, salad.clone()),
        ]);

        let cart = price_cart(&entries, &items).unwrap();
        assert_eq!(cart.total, 3497);
        assert_eq!(cart.items.len(), 2);
        assert_eq!(
            cart.total,
            cart.items.iter().map(|l| l.subtotal).sum::<i64>()
        );
        let line = cart
            .items
            .iter()
            .find(|l| l.item.id == margherita.id)
            .unwrap();
        assert_eq!(line.subtotal, 2598);
    }

    #[test]
    fn deleted_items_are_skipped() {
        let restaurant = Uuid::new_v4();
        let kept = menu_item(500, restaurant);

        let mut entries = CartEntries::new();
        entries.insert(kept.id, 3);
        entries.insert(Uuid::new_v4(), 10);
        let items = HashMap::from([(kept.id, kept.clone())]);

        let cart = price_cart(&entries, &items).unwrap();
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.total, 1500);
    }

    #[test]
    fn empty_cart_prices_to_zero() {
        let cart = price_cart(&CartEntries::new(), &HashMap::new()).unwrap();
        assert!(cart.items.is_empty());
        assert_eq!(cart.total, 0);
    }

    #[test]
    fn oversized_amounts_are_rejected() {
        let restaurant = Uuid::new_v4();
        let item = menu_item(i64::MAX / 2 + 1, restaurant);
        let mut entries = CartEntries::new();
        entries.insert(item.id, 2);
        let items = HashMap::from([(item.id, item.clone())]);
        assert!(matches!(
            price_cart(&entries, &items),
            Err(AppError::BadRequest(_))
        ));

        let a = menu_item(i64::MAX - 1, restaurant);
        let b = menu_item(i64::MAX - 1, restaurant);
        let mut entries = CartEntries::new();
        entries.insert(a.id, 1);
        entries.insert(b.id, 1);
        let items = HashMap::from([(a.id, a.clone()), (b.id, b.clone())]);
        assert!(matches!(
            price_cart(&entries, &items),
            Err(AppError::BadRequest(_))
        ));
    }
}
