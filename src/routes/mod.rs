use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod functions;
pub mod home;
pub mod storage;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(home::routes())
        .merge(auth::routes())
        .merge(functions::routes())
        .merge(storage::routes())
        .with_state(state)
}
