//! Tour package domain types: packages, itinerary days and reviews.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "package_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PackageStatus {
    Draft,
    Published,
    Archived,
}

impl Default for PackageStatus {
    fn default() -> Self {
        Self::Draft
    }
}

/// Tour package entity
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TourPackage {
    pub id: Uuid,
    pub business_id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub duration_days: i32,
    pub duration_nights: i32,
    pub price_per_person: Decimal,
    pub group_size_min: i32,
    pub group_size_max: i32,
    pub inclusions: String,
    pub exclusions: String,
    pub available_from: Option<NaiveDate>,
    pub available_to: Option<NaiveDate>,
    pub cover_image: String,
    pub status: PackageStatus,
    pub is_featured: bool,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PackageItineraryDay {
    pub id: Uuid,
    pub package_id: Uuid,
    pub day_number: i32,
    pub title: String,
    pub description: String,
    pub destination_id: Option<Uuid>,
}

/// Duration filter buckets from the package list view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationBucket {
    pub min_days: i32,
    pub max_days: Option<i32>,
}

impl DurationBucket {
    /// Parse the `duration` query value: `1-3`, `4-7`, `8-14` or `15+`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "1-3" => Some(Self {
                min_days: 1,
                max_days: Some(3),
            }),
            "4-7" => Some(Self {
                min_days: 4,
                max_days: Some(7),
            }),
            "8-14" => Some(Self {
                min_days: 8,
                max_days: Some(14),
            }),
            "15+" => Some(Self {
                min_days: 15,
                max_days: None,
            }),
            _ => None,
        }
    }
}

/// Price filter buckets (NPR per person) from the package list view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceBucket {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl PriceBucket {
    /// Parse the `price` query value: budget, moderate, premium or luxury.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "budget" => Some(Self {
                min: None,
                max: Some(20_000),
            }),
            "moderate" => Some(Self {
                min: Some(20_000),
                max: Some(50_000),
            }),
            "premium" => Some(Self {
                min: Some(50_000),
                max: Some(100_000),
            }),
            "luxury" => Some(Self {
                min: Some(100_000),
                max: None,
            }),
            _ => None,
        }
    }
}

/// Sort orders for the package list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PackageSort {
    PriceLow,
    PriceHigh,
    DurationShort,
    DurationLong,
    Popular,
    #[default]
    Newest,
}

impl PackageSort {
    pub fn parse(s: &str) -> Self {
        match s {
            "price_low" => Self::PriceLow,
            "price_high" => Self::PriceHigh,
            "duration_short" => Self::DurationShort,
            "duration_long" => Self::DurationLong,
            "popular" => Self::Popular,
            _ => Self::Newest,
        }
    }

    /// ORDER BY clause fragment (column references only, no user input).
    pub fn order_by(self) -> &'static str {
        match self {
            Self::PriceLow => "p.price_per_person ASC",
            Self::PriceHigh => "p.price_per_person DESC",
            Self::DurationShort => "p.duration_days ASC",
            Self::DurationLong => "p.duration_days DESC",
            Self::Popular => "p.view_count DESC",
            Self::Newest => "p.is_featured DESC, p.created_at DESC",
        }
    }
}

/// Query parameters for the package list view
#[derive(Debug, Clone, Deserialize, Default)]
pub struct PackageListQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub destination: Option<Uuid>,
    #[serde(default)]
    pub sort: Option<String>,
}

/// Row for the package list: package columns plus the business name.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PackageListRow {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub duration_days: i32,
    pub duration_nights: i32,
    pub price_per_person: Decimal,
    pub group_size_min: i32,
    pub group_size_max: i32,
    pub cover_image: String,
    pub is_featured: bool,
    pub view_count: i64,
    pub business_name: String,
}

/// Card shown in list views and "related packages".
#[derive(Debug, Clone, Serialize)]
pub struct PackageCard {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub duration_days: i32,
    pub duration_nights: i32,
    pub price_per_person: Decimal,
    pub group_size_min: i32,
    pub group_size_max: i32,
    pub cover_image: String,
    pub is_featured: bool,
    pub business_name: String,
    pub destinations: Vec<PackageDestinationRef>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PackageDestinationRef {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

impl PackageListRow {
    pub fn into_card(self, destinations: Vec<PackageDestinationRef>) -> PackageCard {
        PackageCard {
            id: self.id,
            title: self.title,
            slug: self.slug,
            description: self.description,
            duration_days: self.duration_days,
            duration_nights: self.duration_nights,
            price_per_person: self.price_per_person,
            group_size_min: self.group_size_min,
            group_size_max: self.group_size_max,
            cover_image: self.cover_image,
            is_featured: self.is_featured,
            business_name: self.business_name,
            destinations,
        }
    }
}

/// Request DTO for package creation
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePackageRequest {
    pub title: String,
    pub description: String,
    pub destination_ids: Vec<Uuid>,
    pub duration_days: i32,
    pub duration_nights: i32,
    pub price_per_person: Decimal,
    #[serde(default = "default_group_min")]
    pub group_size_min: i32,
    pub group_size_max: i32,
    pub inclusions: String,
    pub exclusions: String,
    #[serde(default)]
    pub available_from: Option<NaiveDate>,
    #[serde(default)]
    pub available_to: Option<NaiveDate>,
    pub cover_image: String,
    #[serde(default)]
    pub status: PackageStatus,
    #[serde(default)]
    pub itinerary: Vec<CreatePackageDayRequest>,
}

fn default_group_min() -> i32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePackageDayRequest {
    pub day_number: i32,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub destination_id: Option<Uuid>,
}

impl CreatePackageRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title must not be empty".to_string());
        }
        if self.destination_ids.is_empty() {
            return Err("at least one destination is required".to_string());
        }
        if self.duration_days < 1 {
            return Err("duration_days must be at least 1".to_string());
        }
        if self.duration_nights < 0 {
            return Err("duration_nights must not be negative".to_string());
        }
        if self.price_per_person <= Decimal::ZERO {
            return Err("price_per_person must be positive".to_string());
        }
        if self.group_size_min < 1 || self.group_size_max < self.group_size_min {
            return Err("invalid group size range".to_string());
        }
        if let (Some(from), Some(to)) = (self.available_from, self.available_to) {
            if to < from {
                return Err("available_to must not precede available_from".to_string());
            }
        }

        let mut seen = std::collections::HashSet::new();
        for day in &self.itinerary {
            if day.day_number < 1 || day.day_number > self.duration_days {
                return Err(format!("day_number {} out of range", day.day_number));
            }
            if !seen.insert(day.day_number) {
                return Err(format!("duplicate day_number {}", day.day_number));
            }
        }

        Ok(())
    }
}

/// Request DTO for package updates (all fields optional)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdatePackageRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price_per_person: Option<Decimal>,
    #[serde(default)]
    pub group_size_min: Option<i32>,
    #[serde(default)]
    pub group_size_max: Option<i32>,
    #[serde(default)]
    pub inclusions: Option<String>,
    #[serde(default)]
    pub exclusions: Option<String>,
    #[serde(default)]
    pub available_from: Option<NaiveDate>,
    #[serde(default)]
    pub available_to: Option<NaiveDate>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub status: Option<PackageStatus>,
    #[serde(default)]
    pub is_featured: Option<bool>,
}

/// Package detail response
#[derive(Debug, Clone, Serialize)]
pub struct PackageDetailResponse {
    #[serde(flatten)]
    pub package: TourPackage,
    pub business_name: String,
    pub destinations: Vec<PackageDestinationRef>,
    pub itinerary: Vec<PackageItineraryDay>,
    pub review_count: i64,
    pub average_rating: Option<f64>,
}

/// Review entity
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PackageReview {
    pub id: Uuid,
    pub package_id: Uuid,
    pub user_id: Uuid,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Request DTO for review creation
#[derive(Debug, Clone, Deserialize)]
pub struct CreateReviewRequest {
    pub rating: i32,
    #[serde(default)]
    pub comment: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_buckets_match_the_list_filters() {
        assert_eq!(
            DurationBucket::parse("1-3"),
            Some(DurationBucket {
                min_days: 1,
                max_days: Some(3)
            })
        );
        assert_eq!(
            DurationBucket::parse("15+"),
            Some(DurationBucket {
                min_days: 15,
                max_days: None
            })
        );
        assert_eq!(DurationBucket::parse("2-5"), None);
    }

    #[test]
    fn price_buckets_match_the_list_filters() {
        assert_eq!(
            PriceBucket::parse("budget"),
            Some(PriceBucket {
                min: None,
                max: Some(20_000)
            })
        );
        assert_eq!(
            PriceBucket::parse("luxury"),
            Some(PriceBucket {
                min: Some(100_000),
                max: None
            })
        );
        assert_eq!(PriceBucket::parse("cheap"), None);
    }

    #[test]
    fn sort_falls_back_to_newest() {
        assert_eq!(PackageSort::parse("price_low"), PackageSort::PriceLow);
        assert_eq!(PackageSort::parse("popular"), PackageSort::Popular);
        assert_eq!(PackageSort::parse("-created_at"), PackageSort::Newest);
        assert_eq!(PackageSort::parse(""), PackageSort::Newest);
    }

    fn base_request() -> CreatePackageRequest {
        CreatePackageRequest {
            title: "Everest Base Camp Trek".to_string(),
            description: "Classic EBC route".to_string(),
            destination_ids: vec![Uuid::new_v4()],
            duration_days: 14,
            duration_nights: 13,
            price_per_person: Decimal::from(95_000),
            group_size_min: 2,
            group_size_max: 12,
            inclusions: "Guide, permits".to_string(),
            exclusions: "Flights".to_string(),
            available_from: None,
            available_to: None,
            cover_image: "packages/ebc.jpg".to_string(),
            status: PackageStatus::Draft,
            itinerary: vec![CreatePackageDayRequest {
                day_number: 1,
                title: "Fly to Lukla".to_string(),
                description: "Short flight, trek to Phakding".to_string(),
                destination_id: None,
            }],
        }
    }

    #[test]
    fn valid_request_passes() {
        assert!(base_request().validate().is_ok());
    }

    #[test]
    fn invalid_requests_are_rejected() {
        let mut req = base_request();
        req.destination_ids.clear();
        assert!(req.validate().is_err());

        let mut req = base_request();
        req.group_size_max = 1;
        assert!(req.validate().is_err());

        let mut req = base_request();
        req.price_per_person = Decimal::ZERO;
        assert!(req.validate().is_err());

        let mut req = base_request();
        req.itinerary.push(CreatePackageDayRequest {
            day_number: 1,
            title: "dup".to_string(),
            description: String::new(),
            destination_id: None,
        });
        assert!(req.validate().is_err());

        let mut req = base_request();
        req.itinerary[0].day_number = 20;
        assert!(req.validate().is_err());
    }
}
