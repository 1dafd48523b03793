use dotenvy::dotenv;
use std::env;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct StripeConfig {
    pub secret_key: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Public base URL the gateway redirects back to after checkout.
    pub app_url: String,
    pub jwt_secret: String,
    pub session_ttl_hours: i64,
    /// Absent when STRIPE_SECRET_KEY is unset; card purchases then fail
    /// with GatewayUnavailable instead of a business rejection.
    pub stripe: Option<StripeConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| AppError::Internal("DATABASE_URL missing".into()))?;
        let port = env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);
        let app_url = env::var("APP_URL").unwrap_or_else(|_| "http://localhost:3000".into());
        let jwt_secret = env::var("AUTH_JWT_SECRET")
            .map_err(|_| AppError::Internal("AUTH_JWT_SECRET missing".into()))?;
        let session_ttl_hours = env::var("SESSION_TTL_HOURS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(24 * 7);

        let stripe = match env::var("STRIPE_SECRET_KEY") {
            Ok(secret_key) if !secret_key.trim().is_empty() => Some(StripeConfig {
                secret_key: secret_key.trim().to_string(),
            }),
            _ => None,
        };

        Ok(Self {
            database_url,
            port,
            app_url,
            jwt_secret,
            session_ttl_hours,
            stripe,
        })
    }

    #[cfg(test)]
    pub fn test_defaults() -> Self {
        Self {
            database_url: "postgres://localhost/test".into(),
            port: 3000,
            app_url: "http://localhost:3000".into(),
            jwt_secret: "test-secret".into(),
            session_ttl_hours: 24 * 7,
            stripe: None,
        }
    }
}
