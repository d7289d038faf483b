use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{Category, MenuItem, Order, Restaurant, User};

#[derive(Debug, Serialize, ToSchema)]
pub struct RestaurantDashboard {
    pub restaurant: Restaurant,
    pub categories: Vec<Category>,
    pub menu_items: Vec<MenuItem>,
    pub orders: Vec<Order>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminDashboard {
    pub users: Vec<User>,
    pub restaurants: Vec<Restaurant>,
    pub orders: Vec<Order>,
}
