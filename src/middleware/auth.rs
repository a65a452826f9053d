//! Middleware de autenticación JWT
//!
//! Protege los endpoints de sincronización con un bearer token HS256
//! firmado con `JWT_SECRET`. No hay tabla de usuarios: la firma y la
//! expiración válidas son suficientes.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::{
    state::AppState,
    utils::{
        errors::AppError,
        jwt::{extract_token_from_header, verify_token},
    },
};

/// Middleware de autenticación JWT
///
/// Inyecta los `JwtClaims` como extensión de la request.
pub async fn require_bearer(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("authorization token required".to_string()))?;

    let token = extract_token_from_header(auth_header)?;
    let claims = verify_token(token, &state.config.jwt_secret).map_err(|e| {
        warn!(path = %request.uri().path(), "🔒 rejected bearer token");
        e
    })?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
