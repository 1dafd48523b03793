use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;

/// Session claims carried by the `student_session` cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: Uuid,
    pub email: String,
    pub is_admin: bool,
    pub iat: i64,
    pub exp: i64,
}

pub fn issue_session(
    secret: &str,
    student_id: Uuid,
    email: &str,
    is_admin: bool,
    ttl_hours: i64,
) -> Result<String> {
    let now = Utc::now();
    let claims = SessionClaims {
        sub: student_id,
        email: email.to_string(),
        is_admin,
        iat: now.timestamp(),
        exp: (now + Duration::hours(ttl_hours)).timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}

pub fn decode_session(secret: &str, token: &str) -> Result<SessionClaims> {
    let data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_then_decode() {
        let id = Uuid::new_v4();
        let token = issue_session("secret", id, "a@campus.edu", false, 24).unwrap();
        let claims = decode_session("secret", &token).unwrap();
        assert_eq!(claims.sub, id);
        assert_eq!(claims.email, "a@campus.edu");
        assert!(!claims.is_admin);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_session("secret", Uuid::new_v4(), "a@campus.edu", false, 24).unwrap();
        assert!(decode_session("other-secret", &token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = issue_session("secret", Uuid::new_v4(), "a@campus.edu", false, -1).unwrap();
        assert!(decode_session("secret", &token).is_err());
    }
}
