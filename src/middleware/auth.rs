use axum::{extract::FromRequestParts, http::header};
use jsonwebtoken::{DecodingKey, Validation, decode};
use uuid::Uuid;

use crate::{
    dto::auth::Claims,
    error::AppError,
    models::{ROLE_ADMIN, ROLE_RESTAURANT},
};

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: String,
    pub session_id: Uuid,
}

pub fn ensure_role(user: &AuthUser, role: &str) -> Result<(), AppError> {
    if user.role != role {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, ROLE_ADMIN)
}

pub fn ensure_restaurant(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, ROLE_RESTAURANT)
}

pub(crate) fn jwt_secret() -> Result<String, AppError> {
    std::env::var("JWT_SECRET")
        .map_err(|_| AppError::Internal(anyhow::anyhow!("JWT_SECRET is not set")))
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;
    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::BadRequest("Missing Authorization header".into()))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::BadRequest("Invalid Authorization header".into()))?;

        let token = auth_str
            .strip_prefix("Bearer ")
            .map(str::trim)
            .ok_or_else(|| AppError::BadRequest("Invalid Authorization scheme".into()))?;

        let secret = jwt_secret()?;

        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AppError::BadRequest("Invalid or expired token".into()))?;

        let user_id = Uuid::parse_str(&decoded.claims.sub)
            .map_err(|_| AppError::BadRequest("Invalid user id in token".into()))?;
        let session_id = Uuid::parse_str(&decoded.claims.sid)
            .map_err(|_| AppError::BadRequest("Invalid session in token".into()))?;

        Ok(AuthUser {
            user_id,
            role: decoded.claims.role,
            session_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ROLE_CUSTOMER;

    fn user(role: &str) -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            role: role.into(),
            session_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn role_guards() {
        assert!(ensure_admin(&user(ROLE_ADMIN)).is_ok());
        assert!(matches!(ensure_admin(&user(ROLE_CUSTOMER)), Err(AppError::Forbidden)));
        assert!(ensure_restaurant(&user(ROLE_RESTAURANT)).is_ok());
        assert!(matches!(ensure_restaurant(&user(ROLE_ADMIN)), Err(AppError::Forbidden)));
    }
}
