use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::gateway::{
    state::AppState,
    types::{ApiResponse, error_codes},
};

pub async fn jwt_auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, (StatusCode, Json<ApiResponse<()>>)> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or((
            StatusCode::FORBIDDEN,
            Json(ApiResponse::<()>::error(
                error_codes::MISSING_AUTH,
                "please set the Authorization header with a valid JWT",
            )),
        ))?;

    // Accept both a bare token and the conventional Bearer prefix.
    let token = auth_header.strip_prefix("Bearer ").unwrap_or(auth_header);

    let user_auth = state.user_auth.as_ref().ok_or((
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ApiResponse::<()>::error(
            error_codes::SERVICE_UNAVAILABLE,
            "Auth service unavailable",
        )),
    ))?;

    match user_auth.verify_token(token) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            Ok(next.run(request).await)
        }
        Err(_) => Err((
            StatusCode::FORBIDDEN,
            Json(ApiResponse::<()>::error(
                error_codes::AUTH_FAILED,
                "Invalid token",
            )),
        )),
    }
}
