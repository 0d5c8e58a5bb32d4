//! AI itinerary domain types and prompt construction.
//!
//! The generated plan mirrors the JSON structure the model is instructed to
//! return, so parsing is a plain serde deserialization.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::destinations::Destination;

/// Budget level for AI itinerary generation. Unknown values fall back to
/// `Moderate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetLevel {
    Low,
    Moderate,
    High,
}

impl BudgetLevel {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "low" => Self::Low,
            "high" => Self::High,
            _ => Self::Moderate,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
        }
    }
}

/// Request DTO for itinerary generation
#[derive(Debug, Clone, Deserialize, Default)]
pub struct GenerateItineraryRequest {
    #[serde(default)]
    pub days: Option<i32>,
    #[serde(default)]
    pub budget: Option<String>,
}

/// Cap on requested days, to keep prompts (and generated plans) bounded.
pub const MAX_ITINERARY_DAYS: i32 = 30;

impl GenerateItineraryRequest {
    /// Resolve the requested day count against the destination's minimum.
    pub fn resolve_days(&self, min_days: i32) -> i32 {
        self.days.unwrap_or(min_days).clamp(1, MAX_ITINERARY_DAYS)
    }

    pub fn resolve_budget(&self) -> BudgetLevel {
        self.budget
            .as_deref()
            .map(BudgetLevel::parse)
            .unwrap_or(BudgetLevel::Moderate)
    }
}

/// The plan structure the model is asked to produce.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedItinerary {
    pub total_estimated_cost: Decimal,
    pub cost_breakdown: CostBreakdown,
    pub daily_itinerary: Vec<GeneratedDay>,
    #[serde(default)]
    pub best_time_to_visit: String,
    #[serde(default)]
    pub what_to_pack: Vec<String>,
    #[serde(default)]
    pub important_notes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostBreakdown {
    #[serde(default)]
    pub accommodation: Decimal,
    #[serde(default)]
    pub food: Decimal,
    #[serde(default)]
    pub transportation: Decimal,
    #[serde(default)]
    pub activities: Decimal,
    #[serde(default)]
    pub miscellaneous: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedDay {
    pub day: i32,
    pub title: String,
    #[serde(default)]
    pub activities: Vec<String>,
    #[serde(default)]
    pub accommodation: String,
    #[serde(default)]
    pub meals: String,
    #[serde(default)]
    pub estimated_cost: Option<Decimal>,
    #[serde(default)]
    pub tips: String,
}

/// Response DTO for the generation endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedItineraryResponse {
    pub destination_slug: String,
    pub days: i32,
    pub budget: BudgetLevel,
    pub itinerary: GeneratedItinerary,
    pub cached: bool,
}

/// Build the generation prompt from destination fields and the requested
/// trip shape. The model is instructed to answer with bare JSON in the
/// `GeneratedItinerary` structure.
pub fn build_itinerary_prompt(
    destination: &Destination,
    category_name: &str,
    days: i32,
    budget: BudgetLevel,
) -> String {
    let elevation = destination
        .elevation
        .map(|e| format!("{e}m"))
        .unwrap_or_else(|| "not specified".to_string());

    format!(
        r#"You are a professional travel planner for Nepal. Create a detailed {days}-day itinerary for {name} in {district}, Nepal.

Destination Details:
- Location: {district}, {province}
- Difficulty: {difficulty}
- Elevation: {elevation}
- Category: {category}
- Description: {short_description}

Budget Level: {budget} (low = budget, moderate = standard, high = luxury)

Return **only valid JSON** (no markdown, no ```json blocks) in this exact structure:

{{
    "total_estimated_cost": 25000,
    "cost_breakdown": {{
        "accommodation": 8000,
        "food": 5000,
        "transportation": 6000,
        "activities": 4000,
        "miscellaneous": 2000
    }},
    "daily_itinerary": [
        {{
            "day": 1,
            "title": "Arrival and Local Exploration",
            "activities": ["Arrive in Kathmandu", "Visit local market"],
            "accommodation": "Standard hotel in city center",
            "meals": "Lunch: Momos, Dinner: Dal Bhat",
            "estimated_cost": 3500,
            "tips": "Exchange currency at airport"
        }}
    ],
    "best_time_to_visit": "March-May, September-November",
    "what_to_pack": ["Warm jacket", "Trekking shoes", "Sunscreen"],
    "important_notes": ["Carry water purifier", "Respect local customs"]
}}"#,
        days = days,
        name = destination.name,
        district = destination.district,
        province = destination.province,
        difficulty = destination.difficulty.display(),
        elevation = elevation,
        category = category_name,
        short_description = destination.short_description,
        budget = budget.as_str(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::destinations::Difficulty;
    use chrono::Utc;
    use uuid::Uuid;

    fn destination() -> Destination {
        Destination {
            id: Uuid::new_v4(),
            name: "Langtang Valley".to_string(),
            slug: "langtang-valley".to_string(),
            category_id: Uuid::new_v4(),
            short_description: "A quiet valley trek north of Kathmandu.".to_string(),
            full_description: String::new(),
            district: "Rasuwa".to_string(),
            province: "Bagmati".to_string(),
            latitude: Decimal::new(282_000, 4),
            longitude: Decimal::new(855_000, 4),
            elevation: Some(3870),
            min_days: 7,
            max_days: Some(10),
            expected_cost_min: Decimal::from(25_000),
            expected_cost_max: Some(Decimal::from(60_000)),
            difficulty: Difficulty::Hard,
            best_season: "March-May".to_string(),
            cover_image: "destinations/langtang.jpg".to_string(),
            video_url: None,
            has_360_view: false,
            meta_description: String::new(),
            view_count: 0,
            is_featured: false,
            is_active: true,
            created_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn budget_parsing_falls_back_to_moderate() {
        assert_eq!(BudgetLevel::parse("LOW"), BudgetLevel::Low);
        assert_eq!(BudgetLevel::parse("high"), BudgetLevel::High);
        assert_eq!(BudgetLevel::parse("luxurious"), BudgetLevel::Moderate);
        assert_eq!(BudgetLevel::parse(""), BudgetLevel::Moderate);
    }

    #[test]
    fn days_default_to_destination_minimum_and_are_clamped() {
        let req = GenerateItineraryRequest::default();
        assert_eq!(req.resolve_days(7), 7);

        let req = GenerateItineraryRequest {
            days: Some(120),
            budget: None,
        };
        assert_eq!(req.resolve_days(7), MAX_ITINERARY_DAYS);

        let req = GenerateItineraryRequest {
            days: Some(0),
            budget: None,
        };
        assert_eq!(req.resolve_days(7), 1);
    }

    #[test]
    fn prompt_carries_destination_facts() {
        let d = destination();
        let prompt = build_itinerary_prompt(&d, "Trekking", 7, BudgetLevel::Low);
        assert!(prompt.contains("7-day itinerary for Langtang Valley"));
        assert!(prompt.contains("Rasuwa, Bagmati"));
        assert!(prompt.contains("Difficulty: Hard"));
        assert!(prompt.contains("Elevation: 3870m"));
        assert!(prompt.contains("Category: Trekking"));
        assert!(prompt.contains("Budget Level: low"));
        assert!(prompt.contains("only valid JSON"));
    }

    #[test]
    fn generated_plan_parses_from_model_json() {
        let raw = r#"{
            "total_estimated_cost": 25000,
            "cost_breakdown": {
                "accommodation": 8000, "food": 5000, "transportation": 6000,
                "activities": 4000, "miscellaneous": 2000
            },
            "daily_itinerary": [
                {"day": 1, "title": "Drive to Syabrubesi",
                 "activities": ["Scenic drive"], "accommodation": "Teahouse",
                 "meals": "Dinner: Dal Bhat", "estimated_cost": 3000,
                 "tips": "Start early"}
            ],
            "best_time_to_visit": "March-May",
            "what_to_pack": ["Warm jacket"],
            "important_notes": ["Permits required"]
        }"#;
        let plan: GeneratedItinerary = serde_json::from_str(raw).unwrap();
        assert_eq!(plan.daily_itinerary.len(), 1);
        assert_eq!(plan.daily_itinerary[0].day, 1);
        assert_eq!(plan.total_estimated_cost, Decimal::from(25_000));
    }
}
