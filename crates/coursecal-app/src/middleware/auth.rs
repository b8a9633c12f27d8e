use salvo::Depot;
use tracing::error;

use crate::{config::get_config_from_depot, db_handler::get_db_from_depot};
use coursecal_service::auth::authenticate::authenticate;
use coursecal_service::auth::depot::{DepotUser, depot_keys};
use coursecal_service::error::ServiceError;

/// ## Summary
/// Middleware handler for authentication.
///
/// Requests without a resolvable identity are marked public; handlers that
/// need a user answer 401 themselves.
pub struct AuthMiddleware;

/// ## Summary
/// Authenticates the request and stores the resulting identity in the depot.
///
/// ## Side Effects
/// Inserts a `DepotUser` under `depot_keys::AUTHENTICATED_PRINCIPAL`.
///
/// ## Errors
/// Responds 500 (or 503 when no connection is available) and skips the rest
/// of the chain if authentication fails for any reason other than a missing
/// identity.
#[salvo::async_trait]
impl salvo::Handler for AuthMiddleware {
    #[tracing::instrument(skip(self, req, depot, res, ctrl), fields(
        method = %req.method(),
        path = %req.uri().path()
    ))]
    async fn handle(
        &self,
        req: &mut salvo::Request,
        depot: &mut Depot,
        res: &mut salvo::Response,
        ctrl: &mut salvo::FlowCtrl,
    ) {
        tracing::trace!("Authenticating request");

        let config = match get_config_from_depot(depot) {
            Ok(cfg) => cfg,
            Err(e) => {
                error!(error = ?e, "Failed to get config from depot");
                res.status_code(salvo::http::StatusCode::INTERNAL_SERVER_ERROR);
                ctrl.skip_rest();
                return;
            }
        };

        let provider = match get_db_from_depot(depot) {
            Ok(p) => p,
            Err(e) => {
                error!(error = ?e, "Failed to get database provider from depot");
                res.status_code(salvo::http::StatusCode::INTERNAL_SERVER_ERROR);
                ctrl.skip_rest();
                return;
            }
        };

        let mut conn = match provider.get_connection().await {
            Ok(c) => c,
            Err(e) => {
                error!(error = ?e, "Failed to get database connection");
                res.status_code(salvo::http::StatusCode::SERVICE_UNAVAILABLE);
                ctrl.skip_rest();
                return;
            }
        };

        match authenticate(req, &mut conn, &config).await {
            Ok(user) => {
                tracing::debug!(user_id = %user.id, "User authenticated");
                depot.insert(depot_keys::AUTHENTICATED_PRINCIPAL, DepotUser::User(user));
            }
            Err(ServiceError::NotAuthenticated) => {
                tracing::debug!("No identity on request, treating as public");
                depot.insert(depot_keys::AUTHENTICATED_PRINCIPAL, DepotUser::Public);
            }
            Err(service_err) => {
                error!(error = ?service_err, "Authentication failed with error");
                res.status_code(salvo::http::StatusCode::INTERNAL_SERVER_ERROR);
                res.body("Internal Server Error");
                ctrl.skip_rest();
            }
        }
    }
}
