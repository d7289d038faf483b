mod common;

use restaurant_ordering_api::{
    entity::{
        categories::{Column as CategoryCol, Entity as Categories},
        restaurants::{Column as RestaurantCol, Entity as Restaurants},
    },
    services::auth_service::DEFAULT_CATEGORIES,
};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

#[tokio::test]
async fn restaurant_signup_creates_profile_and_default_categories() -> anyhow::Result<()> {
    let Some(database_url) = common::database_url() else {
        return Ok(());
    };
    let _serial = common::serial();
    let state = common::setup_state(&database_url).await?;

    let owner = common::register(&state, "Luigi", "luigi@example.com", "restaurant").await?;
    assert_eq!(owner.role, "restaurant");

    let restaurants = Restaurants::find()
        .filter(RestaurantCol::UserId.eq(owner.user_id))
        .all(&state.orm)
        .await?;
    assert_eq!(restaurants.len(), 1);
    let restaurant = &restaurants[0];
    assert_eq!(restaurant.name, "Luigi's Restaurant");
    assert_eq!(restaurant.contact, "555-0100");

    let mut names: Vec<String> = Categories::find()
        .filter(CategoryCol::RestaurantId.eq(restaurant.id))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|c| c.name)
        .collect();
    names.sort();
    let mut expected: Vec<String> = DEFAULT_CATEGORIES.iter().map(|s| s.to_string()).collect();
    expected.sort();
    assert_eq!(names, expected);

    // customers get no restaurant
    let customer = common::register(&state, "Ann", "ann@example.com", "customer").await?;
    let count = Restaurants::find()
        .filter(RestaurantCol::UserId.eq(customer.user_id))
        .count(&state.orm)
        .await?;
    assert_eq!(count, 0);

    // duplicate email is rejected
    assert!(
        common::register(&state, "Ann Again", "ann@example.com", "customer")
            .await
            .is_err()
    );

    Ok(())
}
