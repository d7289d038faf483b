use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    dto::{
        dashboard::RestaurantDashboard,
        menu::{CreateMenuItemRequest, SetAvailabilityRequest},
        orders::{OrderWithItems, UpdateOrderStatusRequest},
    },
    entity::{
        categories::{Column as CategoryCol, Entity as Categories},
        menu_items::{ActiveModel as MenuItemActive, Column as MenuCol, Entity as MenuItems},
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
        restaurants::{Column as RestaurantCol, Entity as Restaurants, Model as RestaurantModel},
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_restaurant},
    models::{Category, MenuItem, Order, Restaurant},
    order_status::OrderStatus,
    response::{ApiResponse, Meta},
    services::order_service::load_order_items,
    state::AppState,
};

const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "webp"];

/// Highest accepted menu price, in cents.
pub const MAX_PRICE: i64 = 10_000_000;

pub async fn dashboard(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<RestaurantDashboard>> {
    ensure_restaurant(user)?;
    let restaurant = owned_restaurant(&state.orm, user).await?;

    let categories = Categories::find()
        .filter(CategoryCol::RestaurantId.eq(restaurant.id))
        .order_by_asc(CategoryCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Category::from)
        .collect();

    let menu_items = MenuItems::find()
        .filter(MenuCol::RestaurantId.eq(restaurant.id))
        .order_by_asc(MenuCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(MenuItem::from)
        .collect();

    let orders = Orders::find()
        .filter(OrderCol::RestaurantId.eq(restaurant.id))
        .order_by_desc(OrderCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Order::from)
        .collect();

    Ok(ApiResponse::success(
        "Restaurant dashboard",
        RestaurantDashboard {
            restaurant: Restaurant::from(restaurant),
            categories,
            menu_items,
            orders,
        },
        Some(Meta::empty()),
    ))
}

pub async fn add_menu_item(
    state: &AppState,
    user: &AuthUser,
    payload: CreateMenuItemRequest,
) -> AppResult<ApiResponse<MenuItem>> {
    ensure_restaurant(user)?;
    let restaurant = owned_restaurant(&state.orm, user).await?;

    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::BadRequest("name is required".into()));
    }
    check_price(payload.price)?;

    let category = Categories::find_by_id(payload.category_id)
        .one(&state.orm)
        .await?;
    match category {
        Some(c) if c.restaurant_id == restaurant.id => {}
        _ => {
            return Err(AppError::BadRequest(
                "category does not belong to this restaurant".into(),
            ));
        }
    }

    let item = MenuItemActive {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        description: Set(payload.description),
        price: Set(payload.price),
        image: Set(image_reference(payload.image)),
        is_available: Set(true),
        is_vegetarian: Set(payload.is_vegetarian),
        category_id: Set(payload.category_id),
        restaurant_id: Set(restaurant.id),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(menu_item_id = %item.id, restaurant_id = %restaurant.id, "menu item added");
    Ok(ApiResponse::success(
        "Menu item added",
        MenuItem::from(item),
        Some(Meta::empty()),
    ))
}

pub async fn set_item_availability(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: SetAvailabilityRequest,
) -> AppResult<ApiResponse<MenuItem>> {
    ensure_restaurant(user)?;
    let restaurant = owned_restaurant(&state.orm, user).await?;

    let item = MenuItems::find()
        .filter(
            Condition::all()
                .add(MenuCol::Id.eq(id))
                .add(MenuCol::RestaurantId.eq(restaurant.id)),
        )
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: MenuItemActive = item.into();
    active.is_available = Set(payload.is_available);
    let item = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Menu item updated",
        MenuItem::from(item),
        Some(Meta::empty()),
    ))
}

/// Items already on an order stay in the database; owners mark them unavailable instead.
pub async fn delete_menu_item(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_restaurant(user)?;
    let restaurant = owned_restaurant(&state.orm, user).await?;

    let owned = MenuItems::find()
        .filter(
            Condition::all()
                .add(MenuCol::Id.eq(id))
                .add(MenuCol::RestaurantId.eq(restaurant.id)),
        )
        .count(&state.orm)
        .await?;
    if owned == 0 {
        return Err(AppError::NotFound);
    }

    let ordered = OrderItems::find()
        .filter(OrderItemCol::MenuItemId.eq(id))
        .count(&state.orm)
        .await?;
    if ordered > 0 {
        return Err(AppError::BadRequest(
            "menu item has order history; mark it unavailable instead".into(),
        ));
    }

    MenuItems::delete_by_id(id).exec(&state.orm).await?;

    tracing::info!(menu_item_id = %id, restaurant_id = %restaurant.id, "menu item deleted");
    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Move an order of the caller's restaurant to a new status.
///
/// The status is parsed before anything is read, so an unknown value never touches the
/// database. Orders of other restaurants report `NotFound`.
pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    ensure_restaurant(user)?;
    let next: OrderStatus = payload.status.parse()?;
    let restaurant = owned_restaurant(&state.orm, user).await?;

    let txn = state.orm.begin().await?;
    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::Id.eq(id))
                .add(OrderCol::RestaurantId.eq(restaurant.id)),
        )
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let previous = order.status;
    let next = previous.transition_to(next)?;

    let customer_email = Users::find_by_id(order.user_id)
        .one(&txn)
        .await?
        .map(|u| u.email);

    let mut active: OrderActive = order.into();
    active.status = Set(next);
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&txn).await?;
    let items = load_order_items(&txn, order.id).await?;

    txn.commit().await?;

    tracing::info!(
        order_id = %order.id,
        from = %previous,
        to = %next,
        "order status updated"
    );

    match customer_email {
        Some(email) => state.mailer.status_changed(&email, order.id, next),
        None => tracing::warn!(order_id = %order.id, "order has no customer email"),
    }

    Ok(ApiResponse::success(
        "Order status updated",
        OrderWithItems {
            order: Order::from(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

async fn owned_restaurant<C: ConnectionTrait>(
    conn: &C,
    user: &AuthUser,
) -> AppResult<RestaurantModel> {
    Restaurants::find()
        .filter(RestaurantCol::UserId.eq(user.user_id))
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)
}

pub fn check_price(price: i64) -> AppResult<()> {
    if price <= 0 {
        return Err(AppError::BadRequest("price must be greater than 0".into()));
    }
    if price > MAX_PRICE {
        return Err(AppError::BadRequest(format!(
            "price must be at most {MAX_PRICE}"
        )));
    }
    Ok(())
}

/// Keep an image path only if it is relative and has an allowed extension.
pub fn image_reference(raw: Option<String>) -> Option<String> {
    let path = raw?.trim().to_string();
    if path.is_empty() || path.starts_with('/') || path.split('/').any(|part| part == "..") {
        return None;
    }
    let (_, ext) = path.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    IMAGE_EXTENSIONS
        .contains(&ext.as_str())
        .then_some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prices_are_bounded() {
        assert!(check_price(1299).is_ok());
        assert!(check_price(MAX_PRICE).is_ok());
        assert!(matches!(check_price(0), Err(AppError::BadRequest(_))));
        assert!(matches!(check_price(-5), Err(AppError::BadRequest(_))));
        assert!(matches!(check_price(MAX_PRICE + 1), Err(AppError::BadRequest(_))));
        assert!(matches!(check_price(i64::MAX), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn keeps_allowed_image_paths() {
        assert_eq!(
            image_reference(Some("uploads/margherita.JPG".into())),
            Some("uploads/margherita.JPG".into())
        );
        assert_eq!(
            image_reference(Some(" uploads/a.webp ".into())),
            Some("uploads/a.webp".into())
        );
    }

    #[test]
    fn drops_disallowed_image_paths() {
        assert_eq!(image_reference(None), None);
        assert_eq!(image_reference(Some("".into())), None);
        assert_eq!(image_reference(Some("uploads/menu.pdf".into())), None);
        assert_eq!(image_reference(Some("uploads/noext".into())), None);
        assert_eq!(image_reference(Some("/etc/passwd.png".into())), None);
        assert_eq!(image_reference(Some("../secret.png".into())), None);
    }
}
