//! Public destination catalog routes: list with search and filters, filter
//! metadata, detail aggregation and itineraries.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::response::DataResponse;
use crate::api::{Paginated, PaginationParams};
use crate::app::AppState;
use crate::domain::businesses::BusinessCard;
use crate::domain::destinations::{
    Destination, DestinationCard, DestinationFilters, DestinationImage, DestinationListQuery,
    DestinationListRow, Difficulty, FilterOption, Tag,
};
use crate::domain::itineraries::{Itinerary, ItineraryDay, ItinerarySource, ItineraryWithDays};
use crate::domain::packages::{PackageCard, PackageDestinationRef, PackageListRow};
use crate::error::{ApiError, ApiResult};
use crate::services::cache::keys;

/// Push the list view's WHERE clauses. Shared by the count and page queries.
fn push_destination_filters(qb: &mut QueryBuilder<'_, Postgres>, q: &DestinationListQuery) {
    qb.push(" WHERE d.is_active");

    if let Some(search) = q.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = format!("%{}%", search.trim());
        qb.push(" AND (d.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR d.short_description ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR d.full_description ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR d.district ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR d.province ILIKE ")
            .push_bind(pattern)
            .push(")");
    }

    if let Some(category) = q.category.as_deref().filter(|s| !s.is_empty()) {
        qb.push(" AND c.slug = ").push_bind(category.to_string());
    }

    if let Some(tag) = q.tag.as_deref().filter(|s| !s.is_empty()) {
        qb.push(
            " AND EXISTS (SELECT 1 FROM destination_tags dt \
             JOIN tags t ON t.id = dt.tag_id \
             WHERE dt.destination_id = d.id AND t.slug = ",
        )
        .push_bind(tag.to_string())
        .push(")");
    }

    if let Some(difficulty) = q.difficulty {
        qb.push(" AND d.difficulty = ").push_bind(difficulty);
    }

    if let Some(district) = q.district.as_deref().filter(|s| !s.is_empty()) {
        qb.push(" AND d.district ILIKE ")
            .push_bind(format!("%{district}%"));
    }
}

/// Load tags for a set of destinations in one query, grouped by destination.
async fn tags_by_destination(
    db: &PgPool,
    destination_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<Tag>>, sqlx::Error> {
    #[derive(sqlx::FromRow)]
    struct TagRow {
        destination_id: Uuid,
        id: Uuid,
        name: String,
        slug: String,
    }

    if destination_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = sqlx::query_as::<_, TagRow>(
        r#"
        SELECT dt.destination_id, t.id, t.name, t.slug
        FROM destination_tags dt
        JOIN tags t ON t.id = dt.tag_id
        WHERE dt.destination_id = ANY($1)
        ORDER BY t.name
        "#,
    )
    .bind(destination_ids)
    .fetch_all(db)
    .await?;

    let mut grouped: HashMap<Uuid, Vec<Tag>> = HashMap::new();
    for row in rows {
        grouped.entry(row.destination_id).or_default().push(Tag {
            id: row.id,
            name: row.name,
            slug: row.slug,
        });
    }
    Ok(grouped)
}

/// GET /destinations
///
/// Active destinations with free-text search and category/tag/difficulty/
/// district filters, ordered featured-first then newest.
pub async fn list_destinations(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DestinationListQuery>,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<impl IntoResponse> {
    let mut count_qb = QueryBuilder::new(
        "SELECT COUNT(*) FROM destinations d JOIN categories c ON c.id = d.category_id",
    );
    push_destination_filters(&mut count_qb, &query);
    let total: i64 = count_qb.build_query_scalar().fetch_one(&state.db).await?;

    let mut qb = QueryBuilder::new(
        "SELECT d.id, d.name, d.slug, d.short_description, d.district, d.province, \
         d.difficulty, d.min_days, d.max_days, d.expected_cost_min, d.expected_cost_max, \
         d.cover_image, d.is_featured, d.view_count, \
         c.name AS category_name, c.slug AS category_slug \
         FROM destinations d JOIN categories c ON c.id = d.category_id",
    );
    push_destination_filters(&mut qb, &query);
    qb.push(" ORDER BY d.is_featured DESC, d.created_at DESC LIMIT ")
        .push_bind(pagination.limit())
        .push(" OFFSET ")
        .push_bind(pagination.offset());

    let rows: Vec<DestinationListRow> = qb.build_query_as().fetch_all(&state.db).await?;

    let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
    let mut tags = tags_by_destination(&state.db, &ids).await?;

    let cards: Vec<DestinationCard> = rows
        .into_iter()
        .map(|row| {
            let row_tags = tags.remove(&row.id).unwrap_or_default();
            row.into_card(row_tags)
        })
        .collect();

    Ok(Paginated::new(cards, &pagination, total as u64))
}

/// GET /destinations/filters
///
/// Categories, tags, districts and difficulty choices for the list view's
/// filter chips. Cached.
pub async fn destination_filters(
    State(state): State<Arc<AppState>>,
) -> ApiResult<impl IntoResponse> {
    let cache_key = keys::destination_filters();
    if let Some(cached) = state.cache.get::<DestinationFilters>(&cache_key).await {
        return Ok(Json(DataResponse::new(cached)));
    }

    let categories = sqlx::query_as::<_, FilterOption>(
        "SELECT name, slug FROM categories ORDER BY name",
    )
    .fetch_all(&state.db)
    .await?;

    let tags = sqlx::query_as::<_, FilterOption>("SELECT name, slug FROM tags ORDER BY name")
        .fetch_all(&state.db)
        .await?;

    let districts: Vec<String> = sqlx::query_scalar(
        "SELECT DISTINCT district FROM destinations WHERE is_active ORDER BY district",
    )
    .fetch_all(&state.db)
    .await?;

    let filters = DestinationFilters {
        categories,
        tags,
        districts,
        difficulties: Difficulty::CHOICES.to_vec(),
    };

    if let Err(e) = state.cache.set(&cache_key, &filters).await {
        tracing::warn!(error = %e, "Failed to cache destination filters");
    }

    Ok(Json(DataResponse::new(filters)))
}

/// Destination detail aggregation: images split by kind, the default
/// itinerary, duration options, and nearby/related entities.
#[derive(Debug, serde::Serialize)]
pub struct DestinationDetailResponse {
    #[serde(flatten)]
    pub destination: Destination,
    pub category_name: String,
    pub tags: Vec<Tag>,
    pub images: Vec<DestinationImage>,
    pub images_360: Vec<DestinationImage>,
    pub default_itinerary: Option<ItineraryWithDays>,
    pub itinerary_durations: Vec<i32>,
    pub nearby_destinations: Vec<DestinationCard>,
    pub nearby_businesses: Vec<BusinessCard>,
    pub related_packages: Vec<PackageCard>,
}

/// GET /destinations/:slug
pub async fn destination_detail(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let destination = sqlx::query_as::<_, Destination>(
        "SELECT * FROM destinations WHERE slug = $1 AND is_active",
    )
    .bind(&slug)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::not_found("Destination not found"))?;

    let category_name: String = sqlx::query_scalar("SELECT name FROM categories WHERE id = $1")
        .bind(destination.category_id)
        .fetch_one(&state.db)
        .await?;

    let tags = tags_by_destination(&state.db, &[destination.id])
        .await?
        .remove(&destination.id)
        .unwrap_or_default();

    let all_images = sqlx::query_as::<_, DestinationImage>(
        r#"
        SELECT * FROM destination_images
        WHERE destination_id = $1
        ORDER BY sort_order, uploaded_at DESC
        "#,
    )
    .bind(destination.id)
    .fetch_all(&state.db)
    .await?;
    let (images_360, images): (Vec<_>, Vec<_>) =
        all_images.into_iter().partition(|i| i.is_360);

    // Default admin itinerary with its days
    let default_itinerary = sqlx::query_as::<_, Itinerary>(
        r#"
        SELECT * FROM itineraries
        WHERE destination_id = $1 AND source = $2 AND is_default
        ORDER BY duration_days
        LIMIT 1
        "#,
    )
    .bind(destination.id)
    .bind(ItinerarySource::Admin)
    .fetch_optional(&state.db)
    .await?;

    let default_itinerary = match default_itinerary {
        Some(itinerary) => {
            let days = sqlx::query_as::<_, ItineraryDay>(
                "SELECT * FROM itinerary_days WHERE itinerary_id = $1 ORDER BY day_number",
            )
            .bind(itinerary.id)
            .fetch_all(&state.db)
            .await?;
            Some(ItineraryWithDays { itinerary, days })
        }
        None => None,
    };

    // Distinct admin itinerary durations, for the duration picker
    let itinerary_durations: Vec<i32> = sqlx::query_scalar(
        r#"
        SELECT DISTINCT duration_days FROM itineraries
        WHERE destination_id = $1 AND source = $2
        ORDER BY duration_days
        "#,
    )
    .bind(destination.id)
    .bind(ItinerarySource::Admin)
    .fetch_all(&state.db)
    .await?;

    // Nearby destinations: same district, excluding this one
    let nearby_rows = sqlx::query_as::<_, DestinationListRow>(
        r#"
        SELECT d.id, d.name, d.slug, d.short_description, d.district, d.province,
               d.difficulty, d.min_days, d.max_days, d.expected_cost_min,
               d.expected_cost_max, d.cover_image, d.is_featured, d.view_count,
               c.name AS category_name, c.slug AS category_slug
        FROM destinations d
        JOIN categories c ON c.id = d.category_id
        WHERE d.district = $1 AND d.is_active AND d.id <> $2
        ORDER BY d.is_featured DESC, d.created_at DESC
        LIMIT 4
        "#,
    )
    .bind(&destination.district)
    .bind(destination.id)
    .fetch_all(&state.db)
    .await?;

    let nearby_ids: Vec<Uuid> = nearby_rows.iter().map(|r| r.id).collect();
    let mut nearby_tags = tags_by_destination(&state.db, &nearby_ids).await?;
    let nearby_destinations: Vec<DestinationCard> = nearby_rows
        .into_iter()
        .map(|row| {
            let row_tags = nearby_tags.remove(&row.id).unwrap_or_default();
            row.into_card(row_tags)
        })
        .collect();

    // Nearby verified businesses in the same district
    let nearby_businesses = sqlx::query_as::<_, BusinessCard>(
        r#"
        SELECT id, business_name, business_type, district, province,
               description, phone, website, logo
        FROM business_profiles
        WHERE district = $1 AND is_verified
        ORDER BY created_at DESC
        LIMIT 6
        "#,
    )
    .bind(&destination.district)
    .fetch_all(&state.db)
    .await?;

    // Published packages that include this destination
    let package_rows = sqlx::query_as::<_, PackageListRow>(
        r#"
        SELECT p.id, p.title, p.slug, p.description, p.duration_days,
               p.duration_nights, p.price_per_person, p.group_size_min,
               p.group_size_max, p.cover_image, p.is_featured, p.view_count,
               bp.business_name
        FROM tour_packages p
        JOIN business_profiles bp ON bp.id = p.business_id
        JOIN package_destinations pd ON pd.package_id = p.id
        WHERE pd.destination_id = $1 AND p.status = 'PUBLISHED'
        ORDER BY p.is_featured DESC, p.created_at DESC
        LIMIT 4
        "#,
    )
    .bind(destination.id)
    .fetch_all(&state.db)
    .await?;

    let related_packages = attach_package_destinations(&state.db, package_rows).await?;

    // View counting is best-effort and not tied to the response
    if let Err(e) = sqlx::query("UPDATE destinations SET view_count = view_count + 1 WHERE id = $1")
        .bind(destination.id)
        .execute(&state.db)
        .await
    {
        tracing::warn!(error = %e, "Failed to increment destination view count");
    }

    Ok(Json(DataResponse::new(DestinationDetailResponse {
        destination,
        category_name,
        tags,
        images,
        images_360,
        default_itinerary,
        itinerary_durations,
        nearby_destinations,
        nearby_businesses,
        related_packages,
    })))
}

/// GET /destinations/:slug/itineraries
///
/// Admin-authored itineraries with their days, default first.
pub async fn list_itineraries(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let destination_id: Option<Uuid> = sqlx::query_scalar(
        "SELECT id FROM destinations WHERE slug = $1 AND is_active",
    )
    .bind(&slug)
    .fetch_optional(&state.db)
    .await?;
    let destination_id =
        destination_id.ok_or_else(|| ApiError::not_found("Destination not found"))?;

    let itineraries = sqlx::query_as::<_, Itinerary>(
        r#"
        SELECT * FROM itineraries
        WHERE destination_id = $1 AND source = $2
        ORDER BY is_default DESC, duration_days
        "#,
    )
    .bind(destination_id)
    .bind(ItinerarySource::Admin)
    .fetch_all(&state.db)
    .await?;

    let ids: Vec<Uuid> = itineraries.iter().map(|i| i.id).collect();
    let all_days = sqlx::query_as::<_, ItineraryDay>(
        "SELECT * FROM itinerary_days WHERE itinerary_id = ANY($1) ORDER BY day_number",
    )
    .bind(&ids)
    .fetch_all(&state.db)
    .await?;

    let mut days_by_itinerary: HashMap<Uuid, Vec<ItineraryDay>> = HashMap::new();
    for day in all_days {
        days_by_itinerary
            .entry(day.itinerary_id)
            .or_default()
            .push(day);
    }

    let result: Vec<ItineraryWithDays> = itineraries
        .into_iter()
        .map(|itinerary| {
            let days = days_by_itinerary.remove(&itinerary.id).unwrap_or_default();
            ItineraryWithDays { itinerary, days }
        })
        .collect();

    Ok(Json(DataResponse::new(result)))
}

/// Load destination references for a page of packages and attach them.
pub(crate) async fn attach_package_destinations(
    db: &PgPool,
    rows: Vec<PackageListRow>,
) -> Result<Vec<PackageCard>, sqlx::Error> {
    #[derive(sqlx::FromRow)]
    struct RefRow {
        package_id: Uuid,
        id: Uuid,
        name: String,
        slug: String,
    }

    let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
    let mut refs: HashMap<Uuid, Vec<PackageDestinationRef>> = HashMap::new();

    if !ids.is_empty() {
        let ref_rows = sqlx::query_as::<_, RefRow>(
            r#"
            SELECT pd.package_id, d.id, d.name, d.slug
            FROM package_destinations pd
            JOIN destinations d ON d.id = pd.destination_id
            WHERE pd.package_id = ANY($1)
            ORDER BY d.name
            "#,
        )
        .bind(&ids)
        .fetch_all(db)
        .await?;

        for row in ref_rows {
            refs.entry(row.package_id)
                .or_default()
                .push(PackageDestinationRef {
                    id: row.id,
                    name: row.name,
                    slug: row.slug,
                });
        }
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let destinations = refs.remove(&row.id).unwrap_or_default();
            row.into_card(destinations)
        })
        .collect())
}
