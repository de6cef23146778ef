//! Domain models for the storefront.
//!
//! These mirror the records the backend hands out. The backend owns them;
//! the storefront only caches snapshots (a product inside a cart line, the
//! signed-in user inside the session).

pub mod dashboard;
pub mod order;
pub mod product;
pub mod user;

pub use dashboard::DashboardStats;
pub use order::{Order, OrderLine, PricedLine, PricedOrder};
pub use product::{Product, Rating};
pub use user::User;
