mod app_specific;
mod calendar;

use salvo::Router;

use crate::middleware::auth::AuthMiddleware;

pub use coursecal_core::constants::{API_ROUTE_COMPONENT, API_ROUTE_PREFIX};

/// ## Summary
/// Constructs the API router.
///
/// ## Errors
/// Returns an error if any child route fails to initialize.
pub fn routes() -> anyhow::Result<Router> {
    Ok(Router::with_path(API_ROUTE_COMPONENT)
        .hoop(AuthMiddleware)
        .push(app_specific::routes())
        .push(calendar::routes()))
}
