pub mod auth;
pub mod cart;
pub mod dashboard;
pub mod menu;
pub mod orders;
