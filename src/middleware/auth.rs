use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub role: Option<String>,
}

impl Claims {
    pub fn has_role(&self, role: &str) -> bool {
        self.role
            .as_deref()
            .map(|r| r.eq_ignore_ascii_case(role))
            .unwrap_or(false)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role("admin")
    }
}

/// The verified caller, placed in request extensions.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub claims: Claims,
    /// Raw token, forwarded to the backend on the caller's behalf.
    pub token: String,
}

impl AuthContext {
    pub fn user_id(&self) -> &str {
        &self.claims.sub
    }

    /// Admins always pass.
    pub fn ensure_role(&self, roles: &[&str]) -> Result<()> {
        if self.claims.is_admin() || roles.iter().any(|r| self.claims.has_role(r)) {
            Ok(())
        } else {
            Err(Error::Forbidden("forbidden".to_string()))
        }
    }

    /// The caller is `user_id` or an admin.
    pub fn ensure_self_or_admin(&self, user_id: &str) -> Result<()> {
        if self.claims.sub == user_id || self.claims.is_admin() {
            Ok(())
        } else {
            Err(Error::Forbidden(
                "You can only access your own resources".to_string(),
            ))
        }
    }
}

pub fn decode_claims(token: &str, secret: &str) -> Result<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| Error::Unauthorized(format!("invalid_token: {}", e)))
}

fn bearer_token(req: &Request) -> Result<String> {
    let header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| Error::Unauthorized("missing_authorization".to_string()))?;
    let value = header
        .to_str()
        .map_err(|_| Error::Unauthorized("bad_authorization".to_string()))?;
    value
        .strip_prefix("Bearer ")
        .map(|t| t.trim().to_string())
        .ok_or_else(|| Error::Unauthorized("unsupported_scheme".to_string()))
}

pub async fn require_bearer_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let auth = match bearer_token(&req)
        .and_then(|token| decode_claims(&token, &state.config.jwt_secret).map(|c| (c, token)))
    {
        Ok((claims, token)) => AuthContext { claims, token },
        Err(e) => return e.into_response(),
    };
    req.extensions_mut().insert(auth);
    next.run(req).await
}

/// Must run after [`require_bearer_auth`].
pub async fn require_admin(req: Request, next: Next) -> Response {
    match req.extensions().get::<AuthContext>() {
        Some(auth) if auth.claims.is_admin() => next.run(req).await,
        Some(_) => Error::Forbidden("forbidden".to_string()).into_response(),
        None => Error::Unauthorized("missing_authorization".to_string()).into_response(),
    }
}
