//! Session tokens for staff and portal users.
//!
//! Both sign-in flows store a signed JWT in the identity cookie. Staff
//! tokens carry [`AuthenticatedUser`] claims, portal tokens carry
//! [`PortalUser`] claims, and each extractor only accepts its own kind.

use std::future::{Ready, ready};

use actix_identity::Identity;
use actix_web::dev::Payload;
use actix_web::error::ErrorUnauthorized;
use actix_web::{Error, FromRequest, HttpRequest, web};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::PORTAL_ROLE;
use crate::domain::auth::{AuthenticatedUser, PortalUser};
use crate::domain::customer::Customer;
use crate::domain::user::User;
use crate::models::config::ServerConfig;

/// Builds staff claims for a signed-in user.
pub fn staff_claims(user: &User, ttl_days: i64) -> AuthenticatedUser {
    AuthenticatedUser {
        sub: user.id.to_string(),
        email: user.email.clone(),
        branch_id: user.branch_id,
        name: user.name.clone(),
        roles: user.roles.clone(),
        exp: session_deadline(ttl_days),
    }
}

/// Builds portal claims for a customer who presented a valid access code.
pub fn portal_claims(customer: &Customer, ttl_days: i64) -> PortalUser {
    PortalUser {
        sub: customer.id.to_string(),
        email: customer.email.clone().unwrap_or_default(),
        branch_id: customer.branch_id,
        name: customer.name.clone(),
        role: PORTAL_ROLE.to_string(),
        exp: session_deadline(ttl_days),
    }
}

fn session_deadline(ttl_days: i64) -> usize {
    (Utc::now() + Duration::days(ttl_days)).timestamp() as usize
}

/// Signs claims into the token stored in the identity cookie.
pub fn create_token<T: Serialize>(
    claims: &T,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

fn decode_token<T: DeserializeOwned>(
    token: &str,
    secret: &str,
) -> Result<T, jsonwebtoken::errors::Error> {
    decode::<T>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let result = match (
            Identity::from_request(req, payload).into_inner(),
            req.app_data::<web::Data<ServerConfig>>(),
        ) {
            (Ok(identity), Some(config)) => identity
                .id()
                .map_err(|_| ErrorUnauthorized("no session"))
                .and_then(|token| {
                    decode_token::<AuthenticatedUser>(&token, &config.secret)
                        .map_err(|_| ErrorUnauthorized("invalid session token"))
                }),
            _ => Err(ErrorUnauthorized("no session")),
        };
        ready(result)
    }
}

impl FromRequest for PortalUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let result = match (
            Identity::from_request(req, payload).into_inner(),
            req.app_data::<web::Data<ServerConfig>>(),
        ) {
            (Ok(identity), Some(config)) => identity
                .id()
                .map_err(|_| ErrorUnauthorized("no session"))
                .and_then(|token| {
                    decode_token::<PortalUser>(&token, &config.secret)
                        .map_err(|_| ErrorUnauthorized("invalid session token"))
                })
                .and_then(|claims| {
                    if claims.role == PORTAL_ROLE {
                        Ok(claims)
                    } else {
                        Err(ErrorUnauthorized("not a portal session"))
                    }
                }),
            _ => Err(ErrorUnauthorized("no session")),
        };
        ready(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn staff_user() -> User {
        User {
            id: 7,
            branch_id: 1,
            name: "Kenji".to_string(),
            email: "kenji@branch.jp".to_string(),
            password_hash: "$2b$hash".to_string(),
            roles: vec!["crm".to_string()],
            created_at: NaiveDate::from_ymd_opt(2026, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        }
    }

    fn portal_customer() -> Customer {
        Customer {
            id: 3,
            branch_id: 1,
            name: "Sato Trading".to_string(),
            email: Some("info@sato.jp".to_string()),
            phone: None,
            address: None,
            country: Some("JP".to_string()),
            portal_code: "A1B2C3D4".to_string(),
            created_at: NaiveDate::from_ymd_opt(2026, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            updated_at: NaiveDate::from_ymd_opt(2026, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn staff_token_round_trips() {
        let claims = staff_claims(&staff_user(), 7);
        let token = create_token(&claims, "secret").unwrap();
        let decoded: AuthenticatedUser = decode_token(&token, "secret").unwrap();
        assert_eq!(decoded.sub, "7");
        assert_eq!(decoded.roles, vec!["crm"]);
    }

    #[test]
    fn portal_token_round_trips() {
        let claims = portal_claims(&portal_customer(), 7);
        let token = create_token(&claims, "secret").unwrap();
        let decoded: PortalUser = decode_token(&token, "secret").unwrap();
        assert_eq!(decoded.sub, "3");
        assert_eq!(decoded.role, PORTAL_ROLE);
    }

    #[test]
    fn tokens_do_not_cross_decode() {
        let staff = create_token(&staff_claims(&staff_user(), 7), "secret").unwrap();
        let portal = create_token(&portal_claims(&portal_customer(), 7), "secret").unwrap();
        assert!(decode_token::<PortalUser>(&staff, "secret").is_err());
        assert!(decode_token::<AuthenticatedUser>(&portal, "secret").is_err());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = create_token(&staff_claims(&staff_user(), 7), "secret").unwrap();
        assert!(decode_token::<AuthenticatedUser>(&token, "other").is_err());
    }
}
