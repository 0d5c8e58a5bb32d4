//! Booking domain types: reservation requests against published packages.

use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "booking_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

/// Booking entity
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PackageBooking {
    pub id: Uuid,
    pub package_id: Uuid,
    pub user_id: Uuid,
    pub booking_reference: String,
    pub travel_date: NaiveDate,
    pub num_people: i32,
    pub total_price: Decimal,
    pub contact_name: String,
    pub contact_phone: String,
    pub note: String,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Booking joined with its package title for list views.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct BookingListRow {
    pub id: Uuid,
    pub booking_reference: String,
    pub package_title: String,
    pub package_slug: String,
    pub travel_date: NaiveDate,
    pub num_people: i32,
    pub total_price: Decimal,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

/// Request DTO for booking creation
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBookingRequest {
    pub travel_date: NaiveDate,
    pub num_people: i32,
    pub contact_name: String,
    pub contact_phone: String,
    #[serde(default)]
    pub note: String,
}

/// Request DTO for the business updating a booking's status
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateBookingStatusRequest {
    pub status: BookingStatus,
}

/// Prefix + charset for human-readable booking references. Ambiguous
/// characters (0/O, 1/I) are excluded.
const REFERENCE_PREFIX: &str = "HK-";
const REFERENCE_CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const REFERENCE_LEN: usize = 8;

/// Generate a booking reference like `HK-7KQ2MX9A`. Uniqueness is enforced
/// by the database; collisions are retried by the caller.
pub fn generate_booking_reference() -> String {
    let mut rng = rand::thread_rng();
    let mut reference = String::with_capacity(REFERENCE_PREFIX.len() + REFERENCE_LEN);
    reference.push_str(REFERENCE_PREFIX);
    for _ in 0..REFERENCE_LEN {
        let idx = rng.gen_range(0..REFERENCE_CHARSET.len());
        reference.push(REFERENCE_CHARSET[idx] as char);
    }
    reference
}

/// Booking total: price per person times head count, computed server-side.
pub fn booking_total(price_per_person: Decimal, num_people: i32) -> Decimal {
    price_per_person * Decimal::from(num_people)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_format() {
        let r = generate_booking_reference();
        assert!(r.starts_with("HK-"));
        assert_eq!(r.len(), 11);
        assert!(r[3..]
            .bytes()
            .all(|b| REFERENCE_CHARSET.contains(&b)));
    }

    #[test]
    fn references_are_not_repeating() {
        let a = generate_booking_reference();
        let b = generate_booking_reference();
        // 32^8 combinations; equal values would indicate a broken RNG setup
        assert_ne!(a, b);
    }

    #[test]
    fn total_is_price_times_people() {
        let total = booking_total(Decimal::new(2_550_50, 2), 4);
        assert_eq!(total, Decimal::new(10_202_00, 2));
    }

    #[test]
    fn status_wire_format() {
        assert_eq!(
            serde_json::to_value(BookingStatus::Pending).unwrap(),
            serde_json::json!("PENDING")
        );
        let s: BookingStatus = serde_json::from_value(serde_json::json!("CANCELLED")).unwrap();
        assert_eq!(s, BookingStatus::Cancelled);
    }
}
