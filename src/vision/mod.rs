pub mod dto;
pub mod estimator;
pub mod handlers;
pub mod llm;

pub use handlers::router;
