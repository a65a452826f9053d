//! Utilidades JWT Simplificadas
//!
//! Este módulo contiene funciones helper para el token bearer que protege
//! los endpoints de sincronización. No hay usuarios en base de datos: basta
//! con que la firma sea válida con el secreto configurado.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::utils::errors::AppError;

/// Claims del JWT token simplificado
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String, // integración que sincroniza (p.ej. "crm")
    pub exp: usize,
    pub iat: usize,
}

/// Generar JWT token para una integración
pub fn generate_token(subject: &str, secret: &str, expiration_secs: i64) -> Result<String, AppError> {
    let now = chrono::Utc::now();
    let expires_at = now + chrono::Duration::seconds(expiration_secs);

    let claims = JwtClaims {
        sub: subject.to_string(),
        exp: expires_at.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_ref()))
        .map_err(|e| AppError::Internal(format!("Error generando token: {}", e)))
}

/// Verificar y decodificar JWT token
pub fn verify_token(token: &str, secret: &str) -> Result<JwtClaims, AppError> {
    decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("invalid token: {}", e)))
}

/// Extraer token del header Authorization
pub fn extract_token_from_header(auth_header: &str) -> Result<&str, AppError> {
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("authorization header must start with 'Bearer '".to_string()))?
        .trim();

    if token.is_empty() {
        return Err(AppError::Unauthorized("empty bearer token".to_string()));
    }

    Ok(token)
}
