use std::collections::HashMap;

use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    cart_store::CartEntries,
    dto::orders::{CheckoutRequest, OrderDetails, OrderDetailsItem, OrderList, OrderWithItems},
    entity::{
        menu_items::Entity as MenuItems,
        order_items::{ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
        restaurants::Entity as Restaurants,
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{MenuItem, Order, OrderItem},
    order_status::OrderStatus,
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::cart_service::{amount_too_large, line_total, load_cart_items},
    state::AppState,
};

/// Priced, validated contents of a cart, ready to be written as an order.
#[derive(Debug, PartialEq)]
pub struct OrderPlan {
    pub restaurant_id: Uuid,
    pub total_amount: i64,
    pub lines: Vec<PlannedLine>,
}

#[derive(Debug, PartialEq)]
pub struct PlannedLine {
    pub menu_item_id: Uuid,
    pub quantity: i32,
    pub price: i64,
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all().add(OrderCol::UserId.eq(user.user_id));
    if let Some(status) = query.status_filter()? {
        condition = condition.add(OrderCol::Status.eq(status));
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);

    let mut finder = Orders::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Order::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Ok",
        OrderList { items: orders },
        Some(meta),
    ))
}

pub async fn checkout(
    state: &AppState,
    user: &AuthUser,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let delivery_address = payload.delivery_address.trim().to_string();
    if delivery_address.is_empty() {
        return Err(AppError::BadRequest("delivery_address is required".into()));
    }

    let entries = state.carts.snapshot(user.session_id);
    if entries.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }

    let txn = state.orm.begin().await?;

    let customer = Users::find_by_id(user.user_id)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let items = load_cart_items(&txn, &entries).await?;
    let plan = plan_order(&entries, &items)?;

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        restaurant_id: Set(plan.restaurant_id),
        total_amount: Set(plan.total_amount),
        status: Set(OrderStatus::Pending),
        delivery_address: Set(delivery_address),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut order_items: Vec<OrderItem> = Vec::with_capacity(plan.lines.len());
    for line in &plan.lines {
        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            menu_item_id: Set(line.menu_item_id),
            quantity: Set(line.quantity),
            price: Set(line.price),
        }
        .insert(&txn)
        .await?;
        order_items.push(OrderItem::from(item));
    }

    txn.commit().await?;

    state.carts.clear(user.session_id);
    tracing::info!(
        order_id = %order.id,
        user_id = %user.user_id,
        restaurant_id = %order.restaurant_id,
        total_amount = order.total_amount,
        lines = order_items.len(),
        "order placed"
    );

    state.mailer.order_placed(&customer.email, order.id);

    Ok(ApiResponse::success(
        "Order placed successfully",
        OrderWithItems {
            order: Order::from(order),
            items: order_items,
        },
        Some(Meta::empty()),
    ))
}

/// Validate a cart against current menu rows and snapshot each line's price.
///
/// Entries for deleted menu items are skipped. Unavailable items and carts that span more
/// than one restaurant are rejected.
pub fn plan_order(
    entries: &CartEntries,
    items: &HashMap<Uuid, MenuItem>,
) -> AppResult<OrderPlan> {
    let mut restaurant_id: Option<Uuid> = None;
    let mut total_amount: i64 = 0;
    let mut lines = Vec::with_capacity(entries.len());

    for (item_id, &quantity) in entries {
        let Some(item) = items.get(item_id) else {
            continue;
        };
        if quantity <= 0 {
            return Err(AppError::BadRequest("Cart has invalid quantity".into()));
        }
        if !item.is_available {
            return Err(AppError::BadRequest(format!(
                "{} is no longer available",
                item.name
            )));
        }
        match restaurant_id {
            None => restaurant_id = Some(item.restaurant_id),
            Some(id) if id != item.restaurant_id => {
                return Err(AppError::BadRequest(
                    "Cart contains items from more than one restaurant".into(),
                ));
            }
            Some(_) => {}
        }

        total_amount = line_total(item.price, quantity)?
            .checked_add(total_amount)
            .ok_or_else(amount_too_large)?;
        lines.push(PlannedLine {
            menu_item_id: item.id,
            quantity,
            price: item.price,
        });
    }

    let restaurant_id = restaurant_id.ok_or_else(|| AppError::BadRequest("Cart is empty".into()))?;
    Ok(OrderPlan {
        restaurant_id,
        total_amount,
        lines,
    })
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderDetails>> {
    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user.user_id))
                .add(OrderCol::Id.eq(id)),
        )
        .one(&state.orm)
        .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let restaurant_name = Restaurants::find_by_id(order.restaurant_id)
        .one(&state.orm)
        .await?
        .map(|r| r.name)
        .unwrap_or_default();

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .find_also_related(MenuItems)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|(line, menu_item)| OrderDetailsItem {
            menu_item_id: line.menu_item_id,
            name: menu_item.map(|m| m.name).unwrap_or_default(),
            quantity: line.quantity,
            price: line.price,
            total: line.price * i64::from(line.quantity),
        })
        .collect();

    Ok(ApiResponse::success(
        "OK",
        OrderDetails {
            id: order.id,
            created_at: order.created_at.with_timezone(&chrono::Utc),
            status: order.status,
            total_amount: order.total_amount,
            delivery_address: order.delivery_address,
            restaurant_name,
            items,
        },
        Some(Meta::empty()),
    ))
}

/// Lines of one order.
pub async fn load_order_items<C: sea_orm::ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
) -> AppResult<Vec<OrderItem>> {
    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order_id))
        .all(conn)
        .await?
        .into_iter()
        .map(OrderItem::from)
        .collect();
    Ok(items)
}
