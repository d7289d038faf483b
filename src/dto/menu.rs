use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Category, MenuItem};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateMenuItemRequest {
    pub name: String,
    pub description: String,
    pub price: i64,
    pub category_id: Uuid,
    #[serde(default)]
    pub is_vegetarian: bool,
    /// Relative path of an already stored image, e.g. `uploads/margherita.jpg`.
    pub image: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetAvailabilityRequest {
    pub is_available: bool,
}

#[derive(Serialize, ToSchema)]
pub struct MenuView {
    pub categories: Vec<Category>,
    pub items: Vec<MenuItem>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct CategoryList {
    #[schema(value_type = Vec<Category>)]
    pub items: Vec<Category>,
}
