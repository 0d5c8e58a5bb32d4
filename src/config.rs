use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Staging,
    Prod,
}

impl Environment {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "prod" | "production" => Self::Prod,
            "staging" => Self::Staging,
            _ => Self::Dev,
        }
    }

    pub fn is_dev(&self) -> bool {
        matches!(self, Self::Dev)
    }

    #[allow(dead_code)]
    pub fn is_prod(&self) -> bool {
        matches!(self, Self::Prod)
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub env: Environment,
    pub server_addr: String,

    // Database
    pub database_url: String,
    pub database_max_connections: u32,

    // Redis
    pub redis_url: String,
    pub redis_cache_ttl_seconds: u64,

    // CORS
    pub cors_allow_origins: Vec<String>,

    // Auth tokens
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub jwt_ttl_seconds: u64,

    // Gemini API
    pub gemini_api_key: Option<String>,
    pub gemini_api_base: String,
    pub gemini_model: String,
    pub gemini_timeout_seconds: u64,

    // Media uploads
    pub media_root: String,
    pub upload_max_bytes: usize,

    // Bootstrap admin account (optional)
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let env = Environment::from_str(&env::var("ENV").unwrap_or_else(|_| "dev".to_string()));
        let server_addr = env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        // Database
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10);

        // Redis
        let redis_url =
            env::var("REDIS_URL").unwrap_or_else(|_| "redis://redis:6379/0".to_string());
        let redis_cache_ttl_seconds = env::var("REDIS_CACHE_TTL_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3600); // 1 hour default

        // CORS
        let cors_allow_origins = env::var("CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        // Auth tokens
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        let jwt_issuer = env::var("JWT_ISSUER").unwrap_or_else(|_| "heavenknows".to_string());
        let jwt_audience =
            env::var("JWT_AUDIENCE").unwrap_or_else(|_| "heavenknows-api".to_string());
        let jwt_ttl_seconds = env::var("JWT_TTL_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(86400); // 24 hours default

        // Gemini API. The key is optional so the rest of the API can run
        // without it; the generate-itinerary endpoint errors when absent.
        let gemini_api_key = env::var("GEMINI_API_KEY").ok().filter(|s| !s.is_empty());
        let gemini_api_base = env::var("GEMINI_API_BASE")
            .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string());
        let gemini_model =
            env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.5-flash".to_string());
        let gemini_timeout_seconds = env::var("GEMINI_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(120); // 2 minutes default for LLM calls

        // Media uploads
        let media_root = env::var("MEDIA_ROOT").unwrap_or_else(|_| "media".to_string());
        let upload_max_bytes = env::var("UPLOAD_MAX_BYTES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10 * 1024 * 1024);

        // Bootstrap admin account
        let admin_email = env::var("ADMIN_EMAIL").ok().filter(|s| !s.is_empty());
        let admin_password = env::var("ADMIN_PASSWORD").ok().filter(|s| !s.is_empty());

        Ok(Settings {
            env,
            server_addr,
            database_url,
            database_max_connections,
            redis_url,
            redis_cache_ttl_seconds,
            cors_allow_origins,
            jwt_secret,
            jwt_issuer,
            jwt_audience,
            jwt_ttl_seconds,
            gemini_api_key,
            gemini_api_base,
            gemini_model,
            gemini_timeout_seconds,
            media_root,
            upload_max_bytes,
            admin_email,
            admin_password,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_parsing_defaults_to_dev() {
        assert_eq!(Environment::from_str("production"), Environment::Prod);
        assert_eq!(Environment::from_str("PROD"), Environment::Prod);
        assert_eq!(Environment::from_str("staging"), Environment::Staging);
        assert_eq!(Environment::from_str("local"), Environment::Dev);
        assert_eq!(Environment::from_str(""), Environment::Dev);
    }
}
