pub mod config;
pub mod domain;
pub mod forms;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod schema;
pub mod services;

/// Role granting restaurant administration inside a tenant.
pub const ADMIN_ROLE: &str = "admin";
pub const WAITER_ROLE: &str = "waiter";
pub const KITCHEN_ROLE: &str = "kitchen";
pub const BAR_ROLE: &str = "bar";
/// Role granting access to tenant onboarding across the platform.
pub const PLATFORM_ADMIN_ROLE: &str = "platform_admin";
