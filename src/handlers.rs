pub mod api;
pub mod forecast;
pub mod health;
pub mod upload;
