use salvo::http::StatusCode;
use salvo::writing::Json;
use salvo::{Depot, Response, handler};
use serde::Serialize;
use tracing::error;

use coursecal_core::constants::public_feed_path;
use coursecal_service::auth::get_user_from_depot;
use coursecal_service::calendar::token;

use super::ErrorResponse;
use crate::db_handler::get_db_from_depot;

/// ## Summary
/// Token response payload
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    token: String,
    url_path: String,
}

impl TokenResponse {
    fn new(token: String) -> Self {
        let url_path = public_feed_path(&token);
        Self { token, url_path }
    }
}

#[derive(Debug, Clone, Copy)]
enum TokenAction {
    GetOrCreate,
    Rotate,
}

/// ## Summary
/// `GET /api/calendar/token`: the user's feed token, created on first request.
///
/// ## Errors
/// Returns HTTP 401 without an identity and 500 if the store fails.
#[handler]
pub async fn get_token(depot: &mut Depot, res: &mut Response) {
    handle_token(depot, res, TokenAction::GetOrCreate).await;
}

/// ## Summary
/// `POST /api/calendar/token/rotate`: replaces the user's feed token.
///
/// ## Side Effects
/// The previous token stops resolving immediately.
///
/// ## Errors
/// Returns HTTP 401 without an identity and 500 if the store fails.
#[handler]
pub async fn rotate_token(depot: &mut Depot, res: &mut Response) {
    handle_token(depot, res, TokenAction::Rotate).await;
}

async fn handle_token(depot: &Depot, res: &mut Response, action: TokenAction) {
    let Ok(user) = get_user_from_depot(depot) else {
        res.status_code(StatusCode::UNAUTHORIZED);
        res.render(Json(ErrorResponse {
            error: "Not authenticated".to_string(),
        }));
        return;
    };
    let user_id = user.id;

    let provider = match get_db_from_depot(depot) {
        Ok(p) => p,
        Err(e) => {
            error!(error = %e, "Failed to get database provider");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            return;
        }
    };
    let mut conn = match provider.get_connection().await {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "Failed to get database connection");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            return;
        }
    };

    let result = match action {
        TokenAction::GetOrCreate => token::get_or_create(&mut conn, user_id).await,
        TokenAction::Rotate => token::rotate(&mut conn, user_id).await,
    };

    match result {
        Ok(value) => {
            res.status_code(StatusCode::OK);
            res.render(Json(TokenResponse::new(value)));
        }
        Err(e) => {
            error!(error = %e, ?action, "Calendar token operation failed");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse {
                error: "Internal server error".to_string(),
            }));
        }
    }
}
