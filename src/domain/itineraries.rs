//! Itinerary domain types: admin-authored, AI-generated and user plans.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "itinerary_source", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItinerarySource {
    Admin,
    Ai,
    User,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Itinerary {
    pub id: Uuid,
    pub destination_id: Uuid,
    pub title: String,
    pub duration_days: i32,
    pub source: ItinerarySource,
    pub created_by: Option<Uuid>,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ItineraryDay {
    pub id: Uuid,
    pub itinerary_id: Uuid,
    pub day_number: i32,
    pub title: String,
    pub description: String,
    pub location_name: String,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub distance_km: Option<Decimal>,
    pub estimated_hours: Option<Decimal>,
    pub meals_included: String,
    pub accommodation_type: String,
    pub estimated_cost: Option<Decimal>,
}

/// Itinerary with its day-by-day breakdown
#[derive(Debug, Clone, Serialize)]
pub struct ItineraryWithDays {
    #[serde(flatten)]
    pub itinerary: Itinerary,
    pub days: Vec<ItineraryDay>,
}

/// Request DTO for admin itinerary creation
#[derive(Debug, Clone, Deserialize)]
pub struct CreateItineraryRequest {
    pub title: String,
    pub duration_days: i32,
    #[serde(default)]
    pub is_default: bool,
    pub days: Vec<CreateItineraryDayRequest>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateItineraryDayRequest {
    pub day_number: i32,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub location_name: String,
    #[serde(default)]
    pub latitude: Option<Decimal>,
    #[serde(default)]
    pub longitude: Option<Decimal>,
    #[serde(default)]
    pub distance_km: Option<Decimal>,
    #[serde(default)]
    pub estimated_hours: Option<Decimal>,
    #[serde(default)]
    pub meals_included: String,
    #[serde(default)]
    pub accommodation_type: String,
    #[serde(default)]
    pub estimated_cost: Option<Decimal>,
}

impl CreateItineraryRequest {
    /// Day numbers must be exactly 1..=duration_days with no gaps or
    /// duplicates.
    pub fn validate(&self) -> Result<(), String> {
        if self.duration_days < 1 {
            return Err("duration_days must be at least 1".to_string());
        }
        if self.days.len() != self.duration_days as usize {
            return Err(format!(
                "expected {} itinerary days, got {}",
                self.duration_days,
                self.days.len()
            ));
        }

        let mut seen = vec![false; self.duration_days as usize];
        for day in &self.days {
            if day.day_number < 1 || day.day_number > self.duration_days {
                return Err(format!("day_number {} out of range", day.day_number));
            }
            let idx = (day.day_number - 1) as usize;
            if seen[idx] {
                return Err(format!("duplicate day_number {}", day.day_number));
            }
            seen[idx] = true;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(n: i32) -> CreateItineraryDayRequest {
        CreateItineraryDayRequest {
            day_number: n,
            title: format!("Day {n}"),
            description: "walk".to_string(),
            location_name: String::new(),
            latitude: None,
            longitude: None,
            distance_km: None,
            estimated_hours: None,
            meals_included: String::new(),
            accommodation_type: String::new(),
            estimated_cost: None,
        }
    }

    #[test]
    fn complete_day_sequence_is_valid() {
        let req = CreateItineraryRequest {
            title: "Short trek".to_string(),
            duration_days: 3,
            is_default: false,
            days: vec![day(2), day(1), day(3)],
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn missing_and_duplicate_days_are_rejected() {
        let mut req = CreateItineraryRequest {
            title: "Short trek".to_string(),
            duration_days: 3,
            is_default: false,
            days: vec![day(1), day(2)],
        };
        assert!(req.validate().is_err());

        req.days = vec![day(1), day(2), day(2)];
        assert!(req.validate().is_err());

        req.days = vec![day(1), day(2), day(4)];
        assert!(req.validate().is_err());
    }
}
