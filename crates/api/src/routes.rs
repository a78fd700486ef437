use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Builds the `/api`-nested router; mutation routes exist only when the
/// push-API provider does.
pub fn create_api_routes(state: AppState) -> Router {
    handlers::records::routes(state.provider.is_some()).with_state(state)
}
