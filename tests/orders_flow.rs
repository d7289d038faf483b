mod common;

use restaurant_ordering_api::{
    dto::{
        cart::{AddToCartRequest, UpdateCartRequest},
        menu::CreateMenuItemRequest,
        orders::{CheckoutRequest, UpdateOrderStatusRequest},
    },
    entity::{
        categories::{Column as CategoryCol, Entity as Categories},
        menu_items::Entity as MenuItems,
        orders::Entity as Orders,
    },
    error::AppError,
    order_status::OrderStatus,
    routes::params::OrderListQuery,
    services::{cart_service, order_service, restaurant_service},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, Set};
use uuid::Uuid;

// Integration flow: owner builds a menu -> customer fills a cart and checks out -> owner moves the order along.
#[tokio::test]
async fn checkout_snapshots_prices_and_status_moves_forward() -> anyhow::Result<()> {
    let Some(database_url) = common::database_url() else {
        return Ok(());
    };
    let _serial = common::serial();
    let state = common::setup_state(&database_url).await?;

    let owner = common::register(&state, "Mario", "mario@example.com", "restaurant").await?;
    let customer = common::register(&state, "Jo", "jo@example.com", "customer").await?;

    let dashboard = restaurant_service::dashboard(&state, &owner).await?;
    let restaurant_id = dashboard.data.expect("dashboard").restaurant.id;
    let category = Categories::find()
        .filter(CategoryCol::RestaurantId.eq(restaurant_id))
        .filter(CategoryCol::Name.eq("Pizza"))
        .one(&state.orm)
        .await?
        .expect("default category");

    let pizza = add_item(&state, &owner, "Margherita", 1299, category.id).await?;
    let salad = add_item(&state, &owner, "Caesar Salad", 899, category.id).await?;
    let too_expensive = add_item(
        &state,
        &owner,
        "Gold Leaf Pizza",
        restaurant_service::MAX_PRICE + 1,
        category.id,
    )
    .await;
    assert!(too_expensive.is_err());

    // Quantities merge on repeated adds
    for menu_item_id in [pizza, pizza, salad] {
        cart_service::add_to_cart(
            &state,
            &customer,
            AddToCartRequest {
                menu_item_id,
                quantity: None,
            },
        )
        .await?;
    }
    let cart = cart_service::view_cart(&state, &customer).await?.data.expect("cart");
    assert_eq!(cart.total, 3497);
    assert_eq!(cart.items.len(), 2);

    let placed = order_service::checkout(
        &state,
        &customer,
        CheckoutRequest {
            delivery_address: "42 Main St".into(),
        },
    )
    .await?
    .data
    .expect("placed order");
    assert_eq!(placed.order.total_amount, 3497);
    assert_eq!(placed.order.status, OrderStatus::Pending);
    assert_eq!(placed.order.restaurant_id, restaurant_id);
    let mut lines: Vec<(Uuid, i32, i64)> = placed
        .items
        .iter()
        .map(|i| (i.menu_item_id, i.quantity, i.price))
        .collect();
    lines.sort_by_key(|l| l.2);
    assert_eq!(lines, vec![(salad, 1, 899), (pizza, 2, 1299)]);

    let cart = cart_service::view_cart(&state, &customer).await?.data.expect("cart");
    assert!(cart.items.is_empty());
    assert_eq!(cart.total, 0);

    // Empty cart cannot be checked out again
    let again = order_service::checkout(
        &state,
        &customer,
        CheckoutRequest {
            delivery_address: "42 Main St".into(),
        },
    )
    .await;
    assert!(matches!(again, Err(AppError::BadRequest(_))));

    // Later price changes leave the order untouched
    let mut active = MenuItems::find_by_id(pizza)
        .one(&state.orm)
        .await?
        .expect("pizza")
        .into_active_model();
    active.price = Set(1599);
    active.update(&state.orm).await?;

    let details = order_service::get_order(&state, &customer, placed.order.id)
        .await?
        .data
        .expect("order details");
    assert_eq!(details.total_amount, 3497);
    let pizza_line = details
        .items
        .iter()
        .find(|i| i.menu_item_id == pizza)
        .expect("pizza line");
    assert_eq!(pizza_line.price, 1299);
    assert_eq!(pizza_line.total, 2598);
    assert_eq!(pizza_line.name, "Margherita");

    // Unknown status is rejected before anything changes
    let bad = restaurant_service::update_order_status(
        &state,
        &owner,
        placed.order.id,
        status("foo"),
    )
    .await;
    assert!(matches!(bad, Err(AppError::BadRequest(ref msg)) if msg == "Invalid order status"));
    let stored = Orders::find_by_id(placed.order.id)
        .one(&state.orm)
        .await?
        .expect("order");
    assert_eq!(stored.status, OrderStatus::Pending);

    let missing =
        restaurant_service::update_order_status(&state, &owner, Uuid::new_v4(), status("confirmed"))
            .await;
    assert!(matches!(missing, Err(AppError::NotFound)));

    let forbidden =
        restaurant_service::update_order_status(&state, &customer, placed.order.id, status("confirmed"))
            .await;
    assert!(matches!(forbidden, Err(AppError::Forbidden)));

    let confirmed =
        restaurant_service::update_order_status(&state, &owner, placed.order.id, status("confirmed"))
            .await?
            .data
            .expect("confirmed");
    assert_eq!(confirmed.order.status, OrderStatus::Confirmed);
    assert_eq!(confirmed.items.len(), 2);

    let backwards =
        restaurant_service::update_order_status(&state, &owner, placed.order.id, status("pending"))
            .await;
    assert!(matches!(backwards, Err(AppError::Conflict(_))));

    restaurant_service::update_order_status(&state, &owner, placed.order.id, status("dispatched"))
        .await?;
    let cancel_late =
        restaurant_service::update_order_status(&state, &owner, placed.order.id, status("cancelled"))
            .await;
    assert!(matches!(cancel_late, Err(AppError::Conflict(_))));

    let delivered =
        restaurant_service::update_order_status(&state, &owner, placed.order.id, status("Delivered"))
            .await?
            .data
            .expect("delivered");
    assert_eq!(delivered.order.status, OrderStatus::Delivered);

    // Items with order history cannot be removed
    let delete = restaurant_service::delete_menu_item(&state, &owner, pizza).await;
    assert!(matches!(delete, Err(AppError::BadRequest(_))));

    Ok(())
}

#[tokio::test]
async fn checkout_rejects_unavailable_items_and_keeps_the_cart() -> anyhow::Result<()> {
    let Some(database_url) = common::database_url() else {
        return Ok(());
    };
    let _serial = common::serial();
    let state = common::setup_state(&database_url).await?;

    let owner = common::register(&state, "Rosa", "rosa@example.com", "restaurant").await?;
    let customer = common::register(&state, "Sam", "sam@example.com", "customer").await?;

    let dashboard = restaurant_service::dashboard(&state, &owner).await?.data.expect("dashboard");
    let category = dashboard.categories.first().expect("category").id;
    let soup = add_item(&state, &owner, "Tomato Soup", 650, category).await?;

    cart_service::update_cart(
        &state,
        &customer,
        UpdateCartRequest {
            menu_item_id: soup,
            quantity: 3,
        },
    )
    .await?;

    let mut active = MenuItems::find_by_id(soup)
        .one(&state.orm)
        .await?
        .expect("soup")
        .into_active_model();
    active.is_available = Set(false);
    active.update(&state.orm).await?;

    let result = order_service::checkout(
        &state,
        &customer,
        CheckoutRequest {
            delivery_address: "7 Side Rd".into(),
        },
    )
    .await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));

    let orders = order_service::list_orders(&state, &customer, OrderListQuery::default()).await?;
    assert!(orders.data.expect("orders").items.is_empty());
    assert_eq!(state.carts.snapshot(customer.session_id).len(), 1);

    Ok(())
}

fn status(value: &str) -> UpdateOrderStatusRequest {
    UpdateOrderStatusRequest {
        status: value.into(),
    }
}

async fn add_item(
    state: &restaurant_ordering_api::state::AppState,
    owner: &restaurant_ordering_api::middleware::auth::AuthUser,
    name: &str,
    price: i64,
    category_id: Uuid,
) -> anyhow::Result<Uuid> {
    let item = restaurant_service::add_menu_item(
        state,
        owner,
        CreateMenuItemRequest {
            name: name.into(),
            description: format!("{name} for testing"),
            price,
            category_id,
            is_vegetarian: false,
            image: None,
        },
    )
    .await?
    .data
    .expect("menu item");
    Ok(item.id)
}
