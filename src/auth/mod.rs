use crate::state::AppState;
use axum::Router;

mod dto;
pub mod error;
mod generate;
pub mod handlers;
mod password;
pub mod repo;
pub mod repo_types;
pub mod services;
pub(crate) mod session;

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
