//! AI itinerary generation endpoint.
//!
//! A synchronous wrapper around the Gemini API: build a prompt from the
//! destination, make one call, parse the JSON reply, return it. For
//! authenticated callers the generated plan is also persisted, best-effort.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::response::DataResponse;
use crate::app::AppState;
use crate::auth::MaybeAuth;
use crate::domain::ai::{
    build_itinerary_prompt, GeneratedItinerary, GenerateItineraryRequest,
    GeneratedItineraryResponse,
};
use crate::domain::destinations::Destination;
use crate::domain::itineraries::ItinerarySource;
use crate::error::{ApiError, ApiResult};
use crate::services::cache::keys;

/// POST /destinations/:slug/generate-itinerary
pub async fn generate_itinerary(
    auth: MaybeAuth,
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Json(req): Json<GenerateItineraryRequest>,
) -> ApiResult<impl IntoResponse> {
    let destination = sqlx::query_as::<_, Destination>(
        "SELECT * FROM destinations WHERE slug = $1 AND is_active",
    )
    .bind(&slug)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::not_found("Destination not found"))?;

    let days = req.resolve_days(destination.min_days);
    let budget = req.resolve_budget();

    // Identical requests are served from cache; the upstream call is slow
    // and not free.
    let cache_key = keys::ai_itinerary(&destination.slug, days, budget);
    if let Some(cached) = state.cache.get::<GeneratedItinerary>(&cache_key).await {
        tracing::debug!(slug = %destination.slug, days, "Returning cached AI itinerary");
        return Ok(Json(DataResponse::new(GeneratedItineraryResponse {
            destination_slug: destination.slug,
            days,
            budget,
            itinerary: cached,
            cached: true,
        })));
    }

    let category_name: String = sqlx::query_scalar("SELECT name FROM categories WHERE id = $1")
        .bind(destination.category_id)
        .fetch_one(&state.db)
        .await?;

    let prompt = build_itinerary_prompt(&destination, &category_name, days, budget);

    tracing::info!(
        slug = %destination.slug,
        days,
        budget = budget.as_str(),
        "Generating AI itinerary"
    );

    let itinerary = state.ai_client.generate_itinerary(&prompt).await?;

    // Persist for signed-in users. Failure here is logged, never surfaced:
    // the response is the generated plan either way.
    if let MaybeAuth(Some(ctx)) = &auth {
        if let Err(e) =
            persist_itinerary(&state.db, &destination, ctx.user_id, days, &itinerary).await
        {
            tracing::warn!(error = %e, slug = %destination.slug, "Failed to save AI itinerary");
        }
    }

    if let Err(e) = state.cache.set(&cache_key, &itinerary).await {
        tracing::warn!(error = %e, "Failed to cache AI itinerary");
    }

    Ok(Json(DataResponse::new(GeneratedItineraryResponse {
        destination_slug: destination.slug,
        days,
        budget,
        itinerary,
        cached: false,
    })))
}

/// Store the generated plan as an AI-sourced itinerary with its days.
async fn persist_itinerary(
    db: &PgPool,
    destination: &Destination,
    user_id: Uuid,
    days: i32,
    plan: &GeneratedItinerary,
) -> Result<(), sqlx::Error> {
    let mut tx = db.begin().await?;

    let itinerary_id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO itineraries (destination_id, title, duration_days, source, created_by)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(destination.id)
    .bind(format!("{}-Day AI Itinerary for {}", days, destination.name))
    .bind(days)
    .bind(ItinerarySource::Ai)
    .bind(user_id)
    .fetch_one(&mut *tx)
    .await?;

    for day in &plan.daily_itinerary {
        sqlx::query(
            r#"
            INSERT INTO itinerary_days (
                itinerary_id, day_number, title, description,
                meals_included, accommodation_type, estimated_cost
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (itinerary_id, day_number) DO NOTHING
            "#,
        )
        .bind(itinerary_id)
        .bind(day.day)
        .bind(&day.title)
        .bind(day.activities.join("\n"))
        .bind(&day.meals)
        .bind(&day.accommodation)
        .bind(day.estimated_cost)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::info!(
        itinerary_id = %itinerary_id,
        destination_id = %destination.id,
        "AI itinerary saved"
    );

    Ok(())
}
