pub mod dto;
pub mod handlers;
pub mod local;
pub mod openfoodfacts;
pub mod repo;
pub mod search;

pub use handlers::router;
