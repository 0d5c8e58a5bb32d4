//! Account domain types: users keyed by email and typed by role.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User role. Business roles require an admin-verified business profile
/// before the account can manage listings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Tourist,
    TravelBusiness,
    LocalBusiness,
    Manufacturer,
    Admin,
}

impl Default for UserRole {
    fn default() -> Self {
        Self::Tourist
    }
}

impl UserRole {
    pub fn is_business(self) -> bool {
        matches!(
            self,
            Self::TravelBusiness | Self::LocalBusiness | Self::Manufacturer
        )
    }
}

/// User entity
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub contact: Option<String>,
    pub role: UserRole,
    pub profile_picture: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request DTO for tourist registration
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub contact: Option<String>,
}

/// Request DTO for login
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request DTO for profile updates
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub profile_picture: Option<String>,
}

/// Public user representation (never exposes the password hash)
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub contact: Option<String>,
    pub role: UserRole,
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            first_name: u.first_name,
            last_name: u.last_name,
            contact: u.contact,
            role: u.role,
            profile_picture: u.profile_picture,
            created_at: u.created_at,
        }
    }
}

/// Response for successful login/registration
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub expires_at: i64,
    pub user: UserResponse,
    /// True for business accounts whose profile has not been verified yet.
    pub verification_pending: bool,
}

/// Lowercase and trim an email address before storing or comparing.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_like_the_stored_choices() {
        assert_eq!(
            serde_json::to_value(UserRole::TravelBusiness).unwrap(),
            serde_json::json!("TRAVEL_BUSINESS")
        );
        let role: UserRole = serde_json::from_value(serde_json::json!("TOURIST")).unwrap();
        assert_eq!(role, UserRole::Tourist);
    }

    #[test]
    fn business_roles() {
        assert!(UserRole::TravelBusiness.is_business());
        assert!(UserRole::LocalBusiness.is_business());
        assert!(UserRole::Manufacturer.is_business());
        assert!(!UserRole::Tourist.is_business());
        assert!(!UserRole::Admin.is_business());
    }

    #[test]
    fn email_normalization() {
        assert_eq!(normalize_email("  Trek@Example.COM "), "trek@example.com");
    }
}
