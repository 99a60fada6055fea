mod routes;
mod server;
pub mod types;

pub use server::{build_router, ApiServer};
pub use types::{ApiError, ErrorResponse, GenerateRequest, GenerateResponse, HealthResponse};
