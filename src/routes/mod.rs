pub mod anpr_routes;

pub use anpr_routes::{create_anpr_router, create_health_router};
