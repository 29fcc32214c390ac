//! Access-token verification.
//!
//! Tokens are issued elsewhere (the store's identity service); this server only verifies them. A token is an
//! HS256 JWT whose claims carry the user id and role claims. Role claims get a client a foot in the door, but
//! privileged handlers re-check them against the live `roles` table before acting, so revoking a role takes
//! effect immediately rather than at token expiry.

use std::future::{ready, Ready};

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use log::*;
use retail_payment_engine::{db_types::Role, traits::AuthManagement};
use rpg_common::Secret;
use serde::{Deserialize, Serialize};

use crate::errors::{AuthError, ServerError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// User id. Doubles as the customer id for storefront users.
    pub sub: String,
    pub name: String,
    pub roles: Vec<Role>,
    /// Expiry, seconds since the epoch. Checked by the decoder.
    pub exp: u64,
}

impl JwtClaims {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

/// Decodes and validates bearer tokens. Shared across workers via `web::Data`.
#[derive(Clone)]
pub struct JwtDecoder {
    secret: Secret<String>,
}

impl JwtDecoder {
    pub fn new(secret: Secret<String>) -> Self {
        Self { secret }
    }

    pub fn decode(&self, token: &str) -> Result<JwtClaims, AuthError> {
        let key = DecodingKey::from_secret(self.secret.reveal().as_bytes());
        let validation = Validation::new(Algorithm::HS256);
        jsonwebtoken::decode::<JwtClaims>(token, &key, &validation)
            .map(|data| data.claims)
            .map_err(|e| AuthError::ValidationError(e.to_string()))
    }
}

impl FromRequest for JwtClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(claims_from_request(req))
    }
}

fn claims_from_request(req: &HttpRequest) -> Result<JwtClaims, ServerError> {
    let Some(decoder) = req.app_data::<web::Data<JwtDecoder>>() else {
        error!("🔑️ No JwtDecoder registered on the app. This is a server bug.");
        return Err(ServerError::InitializeError("Token decoder is not configured".to_string()));
    };
    let header = req.headers().get("Authorization").ok_or(AuthError::MissingToken)?;
    let token = header
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| AuthError::PoorlyFormattedToken("Expected 'Bearer <token>'".to_string()))?;
    let claims = decoder.decode(token.trim())?;
    Ok(claims)
}

/// Confirms that the caller both claims the role and still holds it. The claim alone is not enough: tokens
/// outlive role revocations.
pub async fn require_role<B: AuthManagement>(
    claims: &JwtClaims,
    role: Role,
    db: &B,
) -> Result<(), ServerError> {
    if !claims.has_role(role) {
        return Err(ServerError::InsufficientPermissions(format!("This endpoint requires the {role} role")));
    }
    let live_roles = db.fetch_roles_for_user(&claims.sub).await?;
    if !live_roles.contains(&role) {
        warn!("🔑️ {} presented a valid token for the {role} role, but no longer holds it", claims.sub);
        return Err(ServerError::AuthenticationError(AuthError::RoleRevoked));
    }
    Ok(())
}

#[cfg(test)]
pub fn issue_token(claims: &JwtClaims, secret: &str) -> String {
    use jsonwebtoken::{encode, EncodingKey, Header};
    encode(&Header::new(Algorithm::HS256), claims, &EncodingKey::from_secret(secret.as_bytes()))
        .expect("Could not sign test token")
}
