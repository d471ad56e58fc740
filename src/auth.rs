//! Bearer-token authentication. Tokens are HS256 JWTs minted by the identity
//! provider that owns the `users` table; this service only verifies them and
//! turns the claims into a [`RequestContext`].

use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, FromRequest, HttpRequest};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::context::{RequestContext, Role};
use crate::errors::AppError;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: i64,
}

/// Signing material shared with the identity provider.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtKeys {
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    /// Mints a token for `user_id` valid for `ttl`.
    pub fn issue_token(
        &self,
        user_id: i32,
        role: Role,
        ttl: Duration,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            sub: user_id.to_string(),
            role: role.as_str().to_string(),
            exp: (Utc::now() + ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
    }

    pub fn verify(&self, token: &str) -> Result<RequestContext, AppError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default()).map_err(|e| {
            log::debug!("rejected bearer token: {e}");
            AppError::Unauthorized
        })?;
        let user_id = data
            .claims
            .sub
            .parse()
            .map_err(|_| AppError::Unauthorized)?;
        let role = data
            .claims
            .role
            .parse()
            .map_err(|_| AppError::Unauthorized)?;
        Ok(RequestContext { user_id, role })
    }
}

fn context_from_request(req: &HttpRequest) -> Result<RequestContext, AppError> {
    let keys = req
        .app_data::<web::Data<JwtKeys>>()
        .ok_or_else(|| AppError::Internal("JWT keys are not registered".to_string()))?;
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AppError::Unauthorized)?;
    keys.verify(token)
}

impl FromRequest for RequestContext {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(context_from_request(req))
    }
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;

    use super::*;

    fn keys() -> JwtKeys {
        JwtKeys::from_secret(b"unit-test-secret")
    }

    #[test]
    fn issued_token_verifies_to_same_context() {
        let keys = keys();
        let token = keys.issue_token(42, Role::Admin, Duration::minutes(5)).unwrap();
        let ctx = keys.verify(&token).unwrap();
        assert_eq!(ctx, RequestContext::admin(42));
    }

    #[test]
    fn expired_or_foreign_tokens_are_rejected() {
        let keys = keys();
        let expired = keys.issue_token(1, Role::Customer, Duration::hours(-2)).unwrap();
        assert!(matches!(keys.verify(&expired), Err(AppError::Unauthorized)));

        let foreign = JwtKeys::from_secret(b"someone-else")
            .issue_token(1, Role::Customer, Duration::minutes(5))
            .unwrap();
        assert!(matches!(keys.verify(&foreign), Err(AppError::Unauthorized)));
    }

    #[test]
    fn request_without_bearer_header_is_unauthorized() {
        let req = TestRequest::default()
            .app_data(web::Data::new(keys()))
            .to_http_request();
        assert!(matches!(context_from_request(&req), Err(AppError::Unauthorized)));

        let req = TestRequest::default()
            .app_data(web::Data::new(keys()))
            .insert_header((AUTHORIZATION, "Basic dXNlcjpwdw=="))
            .to_http_request();
        assert!(matches!(context_from_request(&req), Err(AppError::Unauthorized)));
    }

    #[test]
    fn request_with_valid_token_yields_context() {
        let keys = keys();
        let token = keys.issue_token(9, Role::Customer, Duration::minutes(5)).unwrap();
        let req = TestRequest::default()
            .app_data(web::Data::new(keys))
            .insert_header((AUTHORIZATION, format!("Bearer {token}")))
            .to_http_request();
        assert_eq!(context_from_request(&req).unwrap(), RequestContext::customer(9));
    }
}
