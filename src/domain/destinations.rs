//! Destination catalog domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "difficulty", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    Easy,
    Moderate,
    Hard,
    Extreme,
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::Moderate
    }
}

impl Difficulty {
    pub const CHOICES: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Moderate,
        Difficulty::Hard,
        Difficulty::Extreme,
    ];

    /// Human-readable label, used in the AI prompt.
    pub fn display(self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Moderate => "Moderate",
            Self::Hard => "Hard",
            Self::Extreme => "Extreme",
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub icon: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

/// Destination entity
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Destination {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub category_id: Uuid,
    pub short_description: String,
    pub full_description: String,
    pub district: String,
    pub province: String,
    pub latitude: Decimal,
    pub longitude: Decimal,
    pub elevation: Option<i32>,
    pub min_days: i32,
    pub max_days: Option<i32>,
    pub expected_cost_min: Decimal,
    pub expected_cost_max: Option<Decimal>,
    pub difficulty: Difficulty,
    pub best_season: String,
    pub cover_image: String,
    pub video_url: Option<String>,
    pub has_360_view: bool,
    pub meta_description: String,
    pub view_count: i64,
    pub is_featured: bool,
    pub is_active: bool,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DestinationImage {
    pub id: Uuid,
    pub destination_id: Uuid,
    pub image_path: String,
    pub caption: String,
    pub is_360: bool,
    pub sort_order: i32,
    pub uploaded_at: DateTime<Utc>,
}

/// Query parameters for the destination list view
#[derive(Debug, Clone, Deserialize, Default)]
pub struct DestinationListQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub district: Option<String>,
}

/// Row for the destination list: destination columns plus the joined
/// category name/slug.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DestinationListRow {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub short_description: String,
    pub district: String,
    pub province: String,
    pub difficulty: Difficulty,
    pub min_days: i32,
    pub max_days: Option<i32>,
    pub expected_cost_min: Decimal,
    pub expected_cost_max: Option<Decimal>,
    pub cover_image: String,
    pub is_featured: bool,
    pub view_count: i64,
    pub category_name: String,
    pub category_slug: String,
}

/// Card shown in list views and "nearby destinations".
#[derive(Debug, Clone, Serialize)]
pub struct DestinationCard {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub short_description: String,
    pub district: String,
    pub province: String,
    pub difficulty: Difficulty,
    pub min_days: i32,
    pub max_days: Option<i32>,
    pub expected_cost_min: Decimal,
    pub expected_cost_max: Option<Decimal>,
    pub cover_image: String,
    pub is_featured: bool,
    pub category_name: String,
    pub category_slug: String,
    pub tags: Vec<Tag>,
}

impl DestinationListRow {
    pub fn into_card(self, tags: Vec<Tag>) -> DestinationCard {
        DestinationCard {
            id: self.id,
            name: self.name,
            slug: self.slug,
            short_description: self.short_description,
            district: self.district,
            province: self.province,
            difficulty: self.difficulty,
            min_days: self.min_days,
            max_days: self.max_days,
            expected_cost_min: self.expected_cost_min,
            expected_cost_max: self.expected_cost_max,
            cover_image: self.cover_image,
            is_featured: self.is_featured,
            category_name: self.category_name,
            category_slug: self.category_slug,
            tags,
        }
    }
}

/// Filter metadata for the list view (category chips, tags, districts,
/// difficulty choices).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationFilters {
    pub categories: Vec<FilterOption>,
    pub tags: Vec<FilterOption>,
    pub districts: Vec<String>,
    pub difficulties: Vec<Difficulty>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct FilterOption {
    pub name: String,
    pub slug: String,
}

/// Request DTO for admin destination creation
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDestinationRequest {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    pub category_slug: String,
    #[serde(default)]
    pub tag_slugs: Vec<String>,
    pub short_description: String,
    pub full_description: String,
    pub district: String,
    pub province: String,
    pub latitude: Decimal,
    pub longitude: Decimal,
    #[serde(default)]
    pub elevation: Option<i32>,
    pub min_days: i32,
    #[serde(default)]
    pub max_days: Option<i32>,
    pub expected_cost_min: Decimal,
    #[serde(default)]
    pub expected_cost_max: Option<Decimal>,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub best_season: String,
    pub cover_image: String,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub has_360_view: bool,
    #[serde(default)]
    pub meta_description: String,
    #[serde(default)]
    pub is_featured: bool,
}

/// Request DTO for admin destination updates (all fields optional)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateDestinationRequest {
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub full_description: Option<String>,
    #[serde(default)]
    pub elevation: Option<i32>,
    #[serde(default)]
    pub min_days: Option<i32>,
    #[serde(default)]
    pub max_days: Option<i32>,
    #[serde(default)]
    pub expected_cost_min: Option<Decimal>,
    #[serde(default)]
    pub expected_cost_max: Option<Decimal>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub best_season: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub is_featured: Option<bool>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Request DTO for admin category creation
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// Request DTO for admin tag creation
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTagRequest {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
}

/// Request DTO for admin destination image registration
#[derive(Debug, Clone, Deserialize)]
pub struct AddDestinationImageRequest {
    pub image_path: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub is_360: bool,
    #[serde(default)]
    pub sort_order: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_wire_format() {
        assert_eq!(
            serde_json::to_value(Difficulty::Extreme).unwrap(),
            serde_json::json!("EXTREME")
        );
        let d: Difficulty = serde_json::from_value(serde_json::json!("MODERATE")).unwrap();
        assert_eq!(d, Difficulty::Moderate);
    }

    #[test]
    fn list_query_deserializes_from_url_params() {
        let q: DestinationListQuery =
            serde_urlencoded_like(r#"{"search":"everest","difficulty":"HARD"}"#);
        assert_eq!(q.search.as_deref(), Some("everest"));
        assert_eq!(q.difficulty, Some(Difficulty::Hard));
        assert!(q.category.is_none());
    }

    fn serde_urlencoded_like(json: &str) -> DestinationListQuery {
        serde_json::from_str(json).unwrap()
    }
}
