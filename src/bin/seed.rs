use restaurant_ordering_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    entity::{
        categories::{ActiveModel as CategoryActive, Model as CategoryModel},
        menu_items::ActiveModel as MenuItemActive,
        restaurants::{ActiveModel as RestaurantActive, Column as RestaurantCol, Entity as Restaurants},
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    },
    models::{ROLE_ADMIN, ROLE_CUSTOMER, ROLE_RESTAURANT},
    services::auth_service::{DEFAULT_CATEGORIES, hash_password},
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

// (category, name, description, price in cents, vegetarian)
const MENU: [(&str, &str, &str, i64, bool); 16] = [
    ("Pizza", "Margherita Pizza", "Tomato sauce, mozzarella and fresh basil", 1299, true),
    ("Pizza", "Pepperoni Pizza", "Pepperoni, mozzarella and tomato sauce", 1499, false),
    ("Pizza", "Vegetarian Pizza", "Bell peppers, mushrooms and onions", 1399, true),
    ("Pizza", "BBQ Chicken Pizza", "Grilled chicken, BBQ sauce and red onions", 1699, false),
    ("Pasta", "Spaghetti Carbonara", "Eggs, pancetta and parmesan", 1199, false),
    ("Pasta", "Fettuccine Alfredo", "Cream and parmesan sauce", 1099, true),
    ("Pasta", "Penne Arrabbiata", "Spicy tomato and garlic sauce", 999, true),
    ("Salads", "Caesar Salad", "Romaine, croutons, parmesan and Caesar dressing", 899, false),
    ("Salads", "Greek Salad", "Tomatoes, cucumber, olives and feta", 999, true),
    ("Salads", "Garden Salad", "Mixed greens with house vinaigrette", 799, true),
    ("Beverages", "Soft Drinks", "Coke, Sprite or Fanta", 299, true),
    ("Beverages", "Fresh Lemonade", "Squeezed to order", 399, true),
    ("Beverages", "Iced Tea", "Lemon iced tea", 299, true),
    ("Desserts", "Tiramisu", "Coffee-soaked ladyfingers and mascarpone", 699, true),
    ("Desserts", "Chocolate Lava Cake", "Warm cake with a molten centre", 799, true),
    ("Desserts", "Cheesecake", "New York style", 599, true),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    // Ensure migrations are applied.
    run_migrations(&orm).await?;

    let admin_id = ensure_user(&orm, "Admin User", "admin@restaurant.com", "admin123", ROLE_ADMIN).await?;
    let owner_id = ensure_user(
        &orm,
        "Pizza Palace Owner",
        "owner@pizzapalace.com",
        "owner123",
        ROLE_RESTAURANT,
    )
    .await?;
    ensure_user(&orm, "John Customer", "john@example.com", "customer123", ROLE_CUSTOMER).await?;
    ensure_user(&orm, "Jane Customer", "jane@example.com", "customer123", ROLE_CUSTOMER).await?;

    seed_restaurant(&orm, owner_id).await?;

    println!("Seed completed. Admin ID: {admin_id}, Owner ID: {owner_id}");
    Ok(())
}

async fn ensure_user(
    orm: &DatabaseConnection,
    name: &str,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    if let Some(existing) = Users::find()
        .filter(UserCol::Email.eq(email))
        .one(orm)
        .await?
    {
        println!("User {email} already present");
        return Ok(existing.id);
    }

    let password_hash = hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        phone: Set("555-0000".to_string()),
        address: Set("123 Sample Street, City".to_string()),
        password_hash: Set(password_hash),
        role: Set(role.to_string()),
        created_at: NotSet,
    }
    .insert(orm)
    .await?;

    println!("Ensured user {email} (role={role})");
    Ok(user.id)
}

async fn seed_restaurant(orm: &DatabaseConnection, owner_id: Uuid) -> anyhow::Result<()> {
    let existing = Restaurants::find()
        .filter(RestaurantCol::UserId.eq(owner_id))
        .one(orm)
        .await?;
    if existing.is_some() {
        println!("Restaurant already seeded");
        return Ok(());
    }

    let restaurant = RestaurantActive {
        id: Set(Uuid::new_v4()),
        name: Set("Pizza Palace".to_string()),
        contact: Set("555-0005".to_string()),
        location: Set("123 Pizza Street, City".to_string()),
        user_id: Set(owner_id),
        created_at: NotSet,
    }
    .insert(orm)
    .await?;

    let mut categories: Vec<CategoryModel> = Vec::new();
    for name in DEFAULT_CATEGORIES {
        let category = CategoryActive {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            restaurant_id: Set(restaurant.id),
        }
        .insert(orm)
        .await?;
        categories.push(category);
    }

    for (category_name, name, description, price, vegetarian) in MENU {
        let category = categories
            .iter()
            .find(|c| c.name == category_name)
            .ok_or_else(|| anyhow::anyhow!("unknown category {category_name}"))?;
        MenuItemActive {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            description: Set(description.to_string()),
            price: Set(price),
            image: Set(None),
            is_available: Set(true),
            is_vegetarian: Set(vegetarian),
            category_id: Set(category.id),
            restaurant_id: Set(restaurant.id),
            created_at: NotSet,
        }
        .insert(orm)
        .await?;
    }

    println!("Seeded Pizza Palace with {} menu items", MENU.len());
    Ok(())
}
