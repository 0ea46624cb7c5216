pub mod auth;
pub mod health;
pub mod instagram;
pub mod user;
