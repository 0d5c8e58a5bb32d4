//! Admin routes: business verification and catalog curation.
//!
//! All handlers require an admin token.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::response::DataResponse;
use crate::api::{Paginated, PaginationParams};
use crate::app::AppState;
use crate::auth::RequireAuth;
use crate::domain::destinations::{
    AddDestinationImageRequest, Category, CreateCategoryRequest, CreateDestinationRequest,
    CreateTagRequest, Destination, DestinationImage, Tag, UpdateDestinationRequest,
};
use crate::domain::itineraries::{
    CreateItineraryRequest, Itinerary, ItineraryDay, ItinerarySource, ItineraryWithDays,
};
use crate::domain::businesses::BusinessProfile;
use crate::domain::slug::{slugify, with_suffix};
use crate::error::{ApiError, ApiResult};
use crate::services::cache::keys;

#[derive(Debug, Deserialize, Default)]
pub struct BusinessListQuery {
    #[serde(default)]
    pub verified: Option<bool>,
}

/// GET /admin/businesses
///
/// List business profiles, optionally filtered by verification state.
pub async fn list_businesses(
    auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Query(query): Query<BusinessListQuery>,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<impl IntoResponse> {
    auth.require_admin()?;

    let total: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM business_profiles WHERE ($1::bool IS NULL OR is_verified = $1)",
    )
    .bind(query.verified)
    .fetch_one(&state.db)
    .await?;

    let profiles = sqlx::query_as::<_, BusinessProfile>(
        r#"
        SELECT * FROM business_profiles
        WHERE ($1::bool IS NULL OR is_verified = $1)
        ORDER BY created_at
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(query.verified)
    .bind(pagination.limit())
    .bind(pagination.offset())
    .fetch_all(&state.db)
    .await?;

    Ok(Paginated::new(profiles, &pagination, total as u64))
}

/// POST /admin/businesses/:business_id/verify
pub async fn verify_business(
    auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(business_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    auth.require_admin()?;

    let profile = sqlx::query_as::<_, BusinessProfile>(
        "SELECT * FROM business_profiles WHERE id = $1",
    )
    .bind(business_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::not_found("Business profile not found"))?;

    if profile.is_verified {
        return Err(ApiError::conflict("Business is already verified"));
    }

    let profile = sqlx::query_as::<_, BusinessProfile>(
        r#"
        UPDATE business_profiles
        SET is_verified = TRUE, verified_at = now(), verified_by = $2, updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(business_id)
    .bind(auth.user_id)
    .fetch_one(&state.db)
    .await?;

    tracing::info!(
        business_id = %business_id,
        admin_id = %auth.user_id,
        "Business verified"
    );

    Ok(Json(DataResponse::new(profile)))
}

/// POST /admin/categories
pub async fn create_category(
    auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateCategoryRequest>,
) -> ApiResult<impl IntoResponse> {
    auth.require_admin()?;

    if req.name.trim().is_empty() {
        return Err(ApiError::bad_request("Category name is required"));
    }
    let slug = req.slug.unwrap_or_else(|| slugify(&req.name));

    let category = sqlx::query_as::<_, Category>(
        r#"
        INSERT INTO categories (name, slug, description, icon, image)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(req.name.trim())
    .bind(&slug)
    .bind(&req.description)
    .bind(&req.icon)
    .bind(&req.image)
    .fetch_one(&state.db)
    .await
    .map_err(|e| {
        if ApiError::is_unique_violation(&e, "") {
            ApiError::conflict("A category with this name or slug already exists")
        } else {
            ApiError::Database(e)
        }
    })?;

    invalidate_filter_cache(&state).await;

    Ok((StatusCode::CREATED, Json(DataResponse::new(category))))
}

/// POST /admin/tags
pub async fn create_tag(
    auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTagRequest>,
) -> ApiResult<impl IntoResponse> {
    auth.require_admin()?;

    if req.name.trim().is_empty() {
        return Err(ApiError::bad_request("Tag name is required"));
    }
    let slug = req.slug.unwrap_or_else(|| slugify(&req.name));

    let tag = sqlx::query_as::<_, Tag>(
        "INSERT INTO tags (name, slug) VALUES ($1, $2) RETURNING *",
    )
    .bind(req.name.trim())
    .bind(&slug)
    .fetch_one(&state.db)
    .await
    .map_err(|e| {
        if ApiError::is_unique_violation(&e, "") {
            ApiError::conflict("A tag with this name or slug already exists")
        } else {
            ApiError::Database(e)
        }
    })?;

    invalidate_filter_cache(&state).await;

    Ok((StatusCode::CREATED, Json(DataResponse::new(tag))))
}

/// POST /admin/destinations
pub async fn create_destination(
    auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateDestinationRequest>,
) -> ApiResult<impl IntoResponse> {
    auth.require_admin()?;

    if req.name.trim().is_empty() {
        return Err(ApiError::bad_request("Destination name is required"));
    }
    if req.min_days < 1 {
        return Err(ApiError::bad_request("min_days must be at least 1"));
    }
    if let Some(max_days) = req.max_days {
        if max_days < req.min_days {
            return Err(ApiError::bad_request("max_days must not be below min_days"));
        }
    }
    if let Some(max) = req.expected_cost_max {
        if max < req.expected_cost_min {
            return Err(ApiError::bad_request(
                "expected_cost_max must not be below expected_cost_min",
            ));
        }
    }

    let category_id: Option<Uuid> = sqlx::query_scalar("SELECT id FROM categories WHERE slug = $1")
        .bind(&req.category_slug)
        .fetch_optional(&state.db)
        .await?;
    let category_id = category_id.ok_or_else(|| ApiError::bad_request("Unknown category"))?;

    let tag_ids: Vec<Uuid> = if req.tag_slugs.is_empty() {
        Vec::new()
    } else {
        let ids: Vec<Uuid> = sqlx::query_scalar("SELECT id FROM tags WHERE slug = ANY($1)")
            .bind(&req.tag_slugs)
            .fetch_all(&state.db)
            .await?;
        if ids.len() != req.tag_slugs.len() {
            return Err(ApiError::bad_request("One or more tags are unknown"));
        }
        ids
    };

    // Allocate the slug before the transaction; a lost race on the unique
    // constraint maps to a conflict below.
    let base_slug = req.slug.clone().unwrap_or_else(|| slugify(&req.name));
    let slug_taken: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM destinations WHERE slug = $1)")
            .bind(&base_slug)
            .fetch_one(&state.db)
            .await?;
    let slug = if slug_taken {
        with_suffix(&base_slug)
    } else {
        base_slug
    };

    let mut tx = state.db.begin().await?;

    let destination = sqlx::query_as::<_, Destination>(
        r#"
        INSERT INTO destinations (
            name, slug, category_id, short_description, full_description,
            district, province, latitude, longitude, elevation,
            min_days, max_days, expected_cost_min, expected_cost_max,
            difficulty, best_season, cover_image, video_url, has_360_view,
            meta_description, is_featured, created_by
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                $14, $15, $16, $17, $18, $19, $20, $21, $22)
        RETURNING *
        "#,
    )
    .bind(req.name.trim())
    .bind(&slug)
    .bind(category_id)
    .bind(&req.short_description)
    .bind(&req.full_description)
    .bind(&req.district)
    .bind(&req.province)
    .bind(req.latitude)
    .bind(req.longitude)
    .bind(req.elevation)
    .bind(req.min_days)
    .bind(req.max_days)
    .bind(req.expected_cost_min)
    .bind(req.expected_cost_max)
    .bind(req.difficulty)
    .bind(&req.best_season)
    .bind(&req.cover_image)
    .bind(&req.video_url)
    .bind(req.has_360_view)
    .bind(&req.meta_description)
    .bind(req.is_featured)
    .bind(auth.user_id)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        if ApiError::is_unique_violation(&e, "destinations_slug_key") {
            ApiError::conflict("A destination with this slug already exists")
        } else {
            ApiError::Database(e)
        }
    })?;

    for tag_id in &tag_ids {
        sqlx::query("INSERT INTO destination_tags (destination_id, tag_id) VALUES ($1, $2)")
            .bind(destination.id)
            .bind(tag_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    tracing::info!(destination_id = %destination.id, slug = %destination.slug, "Destination created");

    invalidate_filter_cache(&state).await;

    Ok((StatusCode::CREATED, Json(DataResponse::new(destination))))
}

/// PUT /admin/destinations/:slug
///
/// Partial update. Destination facts feed the itinerary prompt, so cached
/// AI plans for the destination are invalidated along with the filter
/// metadata.
pub async fn update_destination(
    auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Json(req): Json<UpdateDestinationRequest>,
) -> ApiResult<impl IntoResponse> {
    auth.require_admin()?;

    let destination = sqlx::query_as::<_, Destination>(
        r#"
        UPDATE destinations
        SET short_description = COALESCE($2, short_description),
            full_description = COALESCE($3, full_description),
            elevation = COALESCE($4, elevation),
            min_days = COALESCE($5, min_days),
            max_days = COALESCE($6, max_days),
            expected_cost_min = COALESCE($7, expected_cost_min),
            expected_cost_max = COALESCE($8, expected_cost_max),
            difficulty = COALESCE($9, difficulty),
            best_season = COALESCE($10, best_season),
            cover_image = COALESCE($11, cover_image),
            is_featured = COALESCE($12, is_featured),
            is_active = COALESCE($13, is_active),
            updated_at = now()
        WHERE slug = $1
        RETURNING *
        "#,
    )
    .bind(&slug)
    .bind(&req.short_description)
    .bind(&req.full_description)
    .bind(req.elevation)
    .bind(req.min_days)
    .bind(req.max_days)
    .bind(req.expected_cost_min)
    .bind(req.expected_cost_max)
    .bind(req.difficulty)
    .bind(&req.best_season)
    .bind(&req.cover_image)
    .bind(req.is_featured)
    .bind(req.is_active)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::not_found("Destination not found"))?;

    if let Err(e) = state
        .cache
        .delete_pattern(&keys::ai_itinerary_pattern(&destination.slug))
        .await
    {
        tracing::warn!(error = %e, "Failed to invalidate AI itinerary cache");
    }
    invalidate_filter_cache(&state).await;

    Ok(Json(DataResponse::new(destination)))
}

/// POST /admin/destinations/:slug/images
pub async fn add_destination_image(
    auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Json(req): Json<AddDestinationImageRequest>,
) -> ApiResult<impl IntoResponse> {
    auth.require_admin()?;

    let destination_id: Option<Uuid> =
        sqlx::query_scalar("SELECT id FROM destinations WHERE slug = $1")
            .bind(&slug)
            .fetch_optional(&state.db)
            .await?;
    let destination_id =
        destination_id.ok_or_else(|| ApiError::not_found("Destination not found"))?;

    let image = sqlx::query_as::<_, DestinationImage>(
        r#"
        INSERT INTO destination_images (destination_id, image_path, caption, is_360, sort_order)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(destination_id)
    .bind(&req.image_path)
    .bind(&req.caption)
    .bind(req.is_360)
    .bind(req.sort_order)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(DataResponse::new(image))))
}

/// POST /admin/destinations/:slug/itineraries
///
/// Create an admin-authored itinerary with its days. Marking it default
/// demotes the previous default for the destination.
pub async fn create_itinerary(
    auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Json(req): Json<CreateItineraryRequest>,
) -> ApiResult<impl IntoResponse> {
    auth.require_admin()?;

    req.validate().map_err(ApiError::BadRequest)?;

    let destination_id: Option<Uuid> =
        sqlx::query_scalar("SELECT id FROM destinations WHERE slug = $1")
            .bind(&slug)
            .fetch_optional(&state.db)
            .await?;
    let destination_id =
        destination_id.ok_or_else(|| ApiError::not_found("Destination not found"))?;

    let mut tx = state.db.begin().await?;

    if req.is_default {
        sqlx::query(
            "UPDATE itineraries SET is_default = FALSE WHERE destination_id = $1 AND is_default",
        )
        .bind(destination_id)
        .execute(&mut *tx)
        .await?;
    }

    let itinerary = sqlx::query_as::<_, Itinerary>(
        r#"
        INSERT INTO itineraries (destination_id, title, duration_days, source, created_by, is_default)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(destination_id)
    .bind(req.title.trim())
    .bind(req.duration_days)
    .bind(ItinerarySource::Admin)
    .bind(auth.user_id)
    .bind(req.is_default)
    .fetch_one(&mut *tx)
    .await?;

    let mut days = Vec::with_capacity(req.days.len());
    for day in &req.days {
        let row = sqlx::query_as::<_, ItineraryDay>(
            r#"
            INSERT INTO itinerary_days (
                itinerary_id, day_number, title, description, location_name,
                latitude, longitude, distance_km, estimated_hours,
                meals_included, accommodation_type, estimated_cost
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(itinerary.id)
        .bind(day.day_number)
        .bind(&day.title)
        .bind(&day.description)
        .bind(&day.location_name)
        .bind(day.latitude)
        .bind(day.longitude)
        .bind(day.distance_km)
        .bind(day.estimated_hours)
        .bind(&day.meals_included)
        .bind(&day.accommodation_type)
        .bind(day.estimated_cost)
        .fetch_one(&mut *tx)
        .await?;
        days.push(row);
    }

    tx.commit().await?;

    days.sort_by_key(|d| d.day_number);

    tracing::info!(
        itinerary_id = %itinerary.id,
        destination_id = %destination_id,
        "Admin itinerary created"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(ItineraryWithDays { itinerary, days })),
    ))
}

async fn invalidate_filter_cache(state: &AppState) {
    if let Err(e) = state.cache.delete(&keys::destination_filters()).await {
        tracing::warn!(error = %e, "Failed to invalidate filter cache");
    }
}
