//! Business domain types: profiles, verification, role-specific details and
//! the image gallery.

use chrono::{DateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::accounts::UserRole;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "business_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BusinessType {
    TravelAgency,
    Hotel,
    Homestay,
    Restaurant,
    Manufacturer,
}

impl BusinessType {
    /// The account role a business of this type registers under.
    pub fn user_role(self) -> UserRole {
        match self {
            Self::TravelAgency => UserRole::TravelBusiness,
            Self::Hotel | Self::Homestay | Self::Restaurant => UserRole::LocalBusiness,
            Self::Manufacturer => UserRole::Manufacturer,
        }
    }

    /// Hotels and homestays carry accommodation details.
    pub fn is_accommodation(self) -> bool {
        matches!(self, Self::Hotel | Self::Homestay)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "product_category", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductCategory {
    Textiles,
    Food,
    Handicrafts,
    Jewelry,
    Other,
}

/// Business profile entity
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct BusinessProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub business_name: String,
    pub business_type: BusinessType,
    pub pan_or_vat: String,
    pub logo: Option<String>,
    pub registration_document: String,
    pub request_letter: String,
    pub address: String,
    pub district: String,
    pub province: String,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub description: String,
    pub phone: String,
    pub website: Option<String>,
    pub is_verified: bool,
    pub verified_at: Option<DateTime<Utc>>,
    pub verified_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AccommodationDetails {
    pub business_id: Uuid,
    pub total_rooms: i32,
    pub price_range_min: Decimal,
    pub price_range_max: Decimal,
    pub has_wifi: bool,
    pub has_parking: bool,
    pub has_restaurant: bool,
    pub check_in_time: Option<NaiveTime>,
    pub check_out_time: Option<NaiveTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ManufacturerDetails {
    pub business_id: Uuid,
    pub product_category: ProductCategory,
    pub product_description: String,
    pub minimum_order_quantity: Option<i32>,
    pub ships_internationally: bool,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct BusinessImage {
    pub id: Uuid,
    pub business_id: Uuid,
    pub image_path: String,
    pub caption: String,
    pub is_primary: bool,
    pub uploaded_at: DateTime<Utc>,
}

/// Request DTO for business registration: the user account and the profile
/// are created together.
#[derive(Debug, Clone, Deserialize)]
pub struct BusinessRegistrationRequest {
    // Account fields
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub contact: String,

    // Profile fields
    pub business_name: String,
    pub business_type: BusinessType,
    pub pan_or_vat: String,
    pub registration_document: String,
    pub request_letter: String,
    pub address: String,
    pub district: String,
    pub province: String,
    #[serde(default)]
    pub latitude: Option<Decimal>,
    #[serde(default)]
    pub longitude: Option<Decimal>,
    pub phone: String,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub description: String,
}

/// Request DTO for accommodation details upsert
#[derive(Debug, Clone, Deserialize)]
pub struct AccommodationUpsertRequest {
    pub total_rooms: i32,
    pub price_range_min: Decimal,
    pub price_range_max: Decimal,
    #[serde(default)]
    pub has_wifi: bool,
    #[serde(default)]
    pub has_parking: bool,
    #[serde(default)]
    pub has_restaurant: bool,
    #[serde(default)]
    pub check_in_time: Option<NaiveTime>,
    #[serde(default)]
    pub check_out_time: Option<NaiveTime>,
}

/// Request DTO for manufacturer details upsert
#[derive(Debug, Clone, Deserialize)]
pub struct ManufacturerUpsertRequest {
    pub product_category: ProductCategory,
    pub product_description: String,
    #[serde(default)]
    pub minimum_order_quantity: Option<i32>,
    #[serde(default)]
    pub ships_internationally: bool,
}

/// Dashboard aggregates for the owner view
#[derive(Debug, Clone, Serialize)]
pub struct DashboardResponse {
    pub profile: BusinessProfile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accommodation: Option<AccommodationDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<ManufacturerDetails>,
    pub images: Vec<BusinessImage>,
    pub stats: DashboardStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub package_count: i64,
    pub published_package_count: i64,
    pub total_package_views: i64,
    pub booking_count: i64,
    pub image_count: i64,
}

/// Public card for verified-business listings (nearby businesses,
/// local-to-global directory).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct BusinessCard {
    pub id: Uuid,
    pub business_name: String,
    pub business_type: BusinessType,
    pub district: String,
    pub province: String,
    pub description: String,
    pub phone: String,
    pub website: Option<String>,
    pub logo: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_type_maps_to_user_role() {
        assert_eq!(BusinessType::TravelAgency.user_role(), UserRole::TravelBusiness);
        assert_eq!(BusinessType::Hotel.user_role(), UserRole::LocalBusiness);
        assert_eq!(BusinessType::Homestay.user_role(), UserRole::LocalBusiness);
        assert_eq!(BusinessType::Restaurant.user_role(), UserRole::LocalBusiness);
        assert_eq!(BusinessType::Manufacturer.user_role(), UserRole::Manufacturer);
    }

    #[test]
    fn only_hotels_and_homestays_are_accommodation() {
        assert!(BusinessType::Hotel.is_accommodation());
        assert!(BusinessType::Homestay.is_accommodation());
        assert!(!BusinessType::Restaurant.is_accommodation());
        assert!(!BusinessType::TravelAgency.is_accommodation());
        assert!(!BusinessType::Manufacturer.is_accommodation());
    }

    #[test]
    fn business_type_wire_format() {
        assert_eq!(
            serde_json::to_value(BusinessType::TravelAgency).unwrap(),
            serde_json::json!("TRAVEL_AGENCY")
        );
        let t: BusinessType = serde_json::from_value(serde_json::json!("HOMESTAY")).unwrap();
        assert_eq!(t, BusinessType::Homestay);
    }
}
