use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        cart::{AddToCartRequest, CartEntryDto, CartLine, CartView, UpdateCartRequest},
        dashboard::{AdminDashboard, RestaurantDashboard},
        menu::{CategoryList, CreateMenuItemRequest, MenuView, SetAvailabilityRequest},
        orders::{
            CheckoutRequest, OrderDetails, OrderDetailsItem, OrderList, OrderWithItems,
            UpdateOrderStatusRequest,
        },
    },
    models::{Category, MenuItem, Order, OrderItem, Restaurant, User},
    order_status::OrderStatus,
    response::{ApiResponse, Meta},
    routes::{admin, auth, cart, health, menu, orders, params, restaurant},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        health::readiness,
        auth::login,
        auth::register,
        menu::list_menu,
        menu::list_categories,
        cart::view_cart,
        cart::add_to_cart,
        cart::update_cart,
        cart::clear_cart,
        orders::list_orders,
        orders::checkout,
        orders::get_order,
        restaurant::dashboard,
        restaurant::add_menu_item,
        restaurant::set_item_availability,
        restaurant::delete_menu_item,
        restaurant::update_order_status,
        admin::dashboard,
        admin::list_all_orders,
        admin::get_order_admin
    ),
    components(
        schemas(
            User,
            Restaurant,
            Category,
            MenuItem,
            Order,
            OrderItem,
            OrderStatus,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            AddToCartRequest,
            UpdateCartRequest,
            CartEntryDto,
            CartLine,
            CartView,
            CheckoutRequest,
            UpdateOrderStatusRequest,
            OrderWithItems,
            OrderList,
            OrderDetails,
            OrderDetailsItem,
            CreateMenuItemRequest,
            SetAvailabilityRequest,
            MenuView,
            CategoryList,
            RestaurantDashboard,
            AdminDashboard,
            params::Pagination,
            params::MenuQuery,
            params::OrderListQuery,
            Meta,
            ApiResponse<MenuItem>,
            ApiResponse<CartView>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<OrderDetails>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Auth", description = "Registration and login"),
        (name = "Menu", description = "Public menu browsing"),
        (name = "Cart", description = "Session cart"),
        (name = "Orders", description = "Checkout and order history"),
        (name = "Restaurant", description = "Restaurant owner endpoints"),
        (name = "Admin", description = "Admin endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
