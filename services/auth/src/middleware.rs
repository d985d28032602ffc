//! Bearer-token middleware and role guard

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::error::AuthError;
use crate::jwt::Claims;
use crate::models::Role;
use crate::AppState;

/// Extract and validate the bearer token, making the verified claims
/// available to handlers via request extensions
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or(AuthError::Unauthenticated)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::Unauthenticated)?;

    let claims = state.jwt_service.verify(token).map_err(|e| {
        warn!(error = %e, "bearer token rejected");
        AuthError::Unauthenticated
    })?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Check the authenticated role against an allow-list
///
/// Runs after [`auth_middleware`] has inserted the claims.
pub fn require_role(claims: &Claims, allowed: &[Role]) -> Result<(), AuthError> {
    if allowed.contains(&claims.role) {
        Ok(())
    } else {
        Err(AuthError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn claims(role: Role) -> Claims {
        Claims {
            sub: Uuid::new_v4(),
            email: "jane@x.com".to_string(),
            role,
            iat: 0,
            exp: 0,
        }
    }

    #[test]
    fn role_guard_enforces_the_allow_list() {
        assert!(require_role(&claims(Role::User), &[Role::User, Role::Admin]).is_ok());
        assert!(require_role(&claims(Role::Admin), &[Role::Admin]).is_ok());
        assert!(matches!(
            require_role(&claims(Role::User), &[Role::Admin]),
            Err(AuthError::Forbidden)
        ));
    }
}
