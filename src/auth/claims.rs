use serde::{Deserialize, Serialize};

use crate::domain::accounts::UserRole;

/// JWT claims for locally-issued access tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,

    /// Audience
    pub aud: String,

    /// Issuer
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// User email
    pub email: String,

    /// User role
    pub role: UserRole,
}
