use uuid::Uuid;

use super::Claims;
use crate::domain::accounts::UserRole;
use crate::error::ApiError;

/// Authenticated user context extracted from a verified token.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// User ID (from the `sub` claim)
    pub user_id: Uuid,

    /// User email
    pub email: String,

    /// User role
    pub role: UserRole,
}

impl AuthContext {
    pub fn from_claims(claims: &Claims) -> Result<Self, &'static str> {
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| "Invalid user ID in token")?;

        Ok(Self {
            user_id,
            email: claims.email.clone(),
            role: claims.role,
        })
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Any of the business roles (travel agency, local business, manufacturer).
    pub fn is_business(&self) -> bool {
        self.role.is_business()
    }

    /// Guard for admin-only endpoints.
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::forbidden("Admin access required"))
        }
    }

    /// Guard for business-only endpoints.
    pub fn require_business(&self) -> Result<(), ApiError> {
        if self.is_business() {
            Ok(())
        } else {
            Err(ApiError::forbidden("Business account required"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: UserRole) -> Claims {
        Claims {
            sub: Uuid::new_v4().to_string(),
            aud: "heavenknows-api".to_string(),
            iss: "heavenknows".to_string(),
            iat: 0,
            exp: i64::MAX,
            email: "user@example.com".to_string(),
            role,
        }
    }

    #[test]
    fn role_guards() {
        let admin = AuthContext::from_claims(&claims(UserRole::Admin)).unwrap();
        assert!(admin.require_admin().is_ok());
        assert!(admin.require_business().is_err());

        let agency = AuthContext::from_claims(&claims(UserRole::TravelBusiness)).unwrap();
        assert!(agency.require_admin().is_err());
        assert!(agency.require_business().is_ok());

        let tourist = AuthContext::from_claims(&claims(UserRole::Tourist)).unwrap();
        assert!(tourist.require_admin().is_err());
        assert!(tourist.require_business().is_err());
    }

    #[test]
    fn bad_subject_is_rejected() {
        let mut c = claims(UserRole::Tourist);
        c.sub = "not-a-uuid".to_string();
        assert!(AuthContext::from_claims(&c).is_err());
    }
}
