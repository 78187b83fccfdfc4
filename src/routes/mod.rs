pub mod application_routes;
pub mod health;
pub mod interview;
