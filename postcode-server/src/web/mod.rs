//! Web layer for the postcode lookup service.
//!
//! A single endpoint takes a JSON list of postcodes and returns their
//! coordinates, split into results and errors.

mod dto;
mod routes;
mod state;


pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
