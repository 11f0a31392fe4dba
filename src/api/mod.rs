//! Smart Traffic HTTP Module
//! Form page, JSON route endpoint, and `/v1` status endpoints

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod types;

pub use handlers::AppState;
pub use middleware::start_cleanup_task;
pub use routes::create_router;
pub use types::*;
