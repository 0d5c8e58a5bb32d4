//! Tour package routes: public listing and detail, creation and updates by
//! verified travel businesses, and reviews.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use sqlx::{Postgres, QueryBuilder};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::response::DataResponse;
use crate::api::{Paginated, PaginationParams};
use crate::app::AppState;
use crate::auth::RequireAuth;
use crate::domain::accounts::UserRole;
use crate::domain::packages::{
    CreatePackageRequest, CreateReviewRequest, DurationBucket, PackageDetailResponse,
    PackageItineraryDay, PackageListQuery, PackageListRow, PackageReview, PackageSort,
    PriceBucket, TourPackage, UpdatePackageRequest,
};
use crate::domain::slug::{slugify, with_suffix};
use crate::error::{ApiError, ApiResult};
use crate::routes::businesses::profile_for_user;
use crate::routes::destinations::attach_package_destinations;

/// Push the list view's WHERE clauses. Shared by the count, page and price
/// stats queries.
fn push_package_filters(qb: &mut QueryBuilder<'_, Postgres>, q: &PackageListQuery) {
    qb.push(" WHERE p.status = 'PUBLISHED'");

    if let Some(search) = q.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = format!("%{}%", search.trim());
        qb.push(" AND (p.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR p.description ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR bp.business_name ILIKE ")
            .push_bind(pattern.clone())
            .push(
                " OR EXISTS (SELECT 1 FROM package_destinations pd \
                 JOIN destinations d ON d.id = pd.destination_id \
                 WHERE pd.package_id = p.id AND d.name ILIKE ",
            )
            .push_bind(pattern)
            .push("))");
    }

    if let Some(bucket) = q.duration.as_deref().and_then(DurationBucket::parse) {
        qb.push(" AND p.duration_days >= ").push_bind(bucket.min_days);
        if let Some(max) = bucket.max_days {
            qb.push(" AND p.duration_days <= ").push_bind(max);
        }
    }

    if let Some(bucket) = q.price.as_deref().and_then(PriceBucket::parse) {
        if let Some(min) = bucket.min {
            qb.push(" AND p.price_per_person >= ")
                .push_bind(Decimal::from(min));
        }
        if let Some(max) = bucket.max {
            qb.push(" AND p.price_per_person < ")
                .push_bind(Decimal::from(max));
        }
    }

    if let Some(destination_id) = q.destination {
        qb.push(
            " AND EXISTS (SELECT 1 FROM package_destinations pd \
             WHERE pd.package_id = p.id AND pd.destination_id = ",
        )
        .push_bind(destination_id)
        .push(")");
    }
}

/// GET /packages
///
/// Published packages with search, duration/price buckets, destination
/// filter and sort options. The meta carries the published price range.
pub async fn list_packages(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PackageListQuery>,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<impl IntoResponse> {
    let sort = query
        .sort
        .as_deref()
        .map(PackageSort::parse)
        .unwrap_or_default();

    let mut count_qb = QueryBuilder::new(
        "SELECT COUNT(*) FROM tour_packages p \
         JOIN business_profiles bp ON bp.id = p.business_id",
    );
    push_package_filters(&mut count_qb, &query);
    let total: i64 = count_qb.build_query_scalar().fetch_one(&state.db).await?;

    let mut qb = QueryBuilder::new(
        "SELECT p.id, p.title, p.slug, p.description, p.duration_days, \
         p.duration_nights, p.price_per_person, p.group_size_min, \
         p.group_size_max, p.cover_image, p.is_featured, p.view_count, \
         bp.business_name \
         FROM tour_packages p \
         JOIN business_profiles bp ON bp.id = p.business_id",
    );
    push_package_filters(&mut qb, &query);
    qb.push(" ORDER BY ")
        .push(sort.order_by())
        .push(" LIMIT ")
        .push_bind(pagination.limit())
        .push(" OFFSET ")
        .push_bind(pagination.offset());

    let rows: Vec<PackageListRow> = qb.build_query_as().fetch_all(&state.db).await?;
    let cards = attach_package_destinations(&state.db, rows).await?;

    // Published price range for the filter sliders
    #[derive(sqlx::FromRow)]
    struct PriceStats {
        min_price: Option<Decimal>,
        max_price: Option<Decimal>,
    }
    let stats = sqlx::query_as::<_, PriceStats>(
        "SELECT MIN(price_per_person) AS min_price, MAX(price_per_person) AS max_price \
         FROM tour_packages WHERE status = 'PUBLISHED'",
    )
    .fetch_one(&state.db)
    .await?;

    Ok(Paginated::new(cards, &pagination, total as u64).with_meta(serde_json::json!({
        "min_price": stats.min_price.unwrap_or_default(),
        "max_price": stats.max_price.unwrap_or_default(),
    })))
}

/// GET /packages/:slug
///
/// Published package detail with destinations, itinerary days and a review
/// summary. Increments the view count.
pub async fn package_detail(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let package = sqlx::query_as::<_, TourPackage>(
        "SELECT * FROM tour_packages WHERE slug = $1 AND status = 'PUBLISHED'",
    )
    .bind(&slug)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::not_found("Package not found"))?;

    let business_name: String =
        sqlx::query_scalar("SELECT business_name FROM business_profiles WHERE id = $1")
            .bind(package.business_id)
            .fetch_one(&state.db)
            .await?;

    let destinations = sqlx::query_as::<_, crate::domain::packages::PackageDestinationRef>(
        r#"
        SELECT d.id, d.name, d.slug
        FROM package_destinations pd
        JOIN destinations d ON d.id = pd.destination_id
        WHERE pd.package_id = $1
        ORDER BY d.name
        "#,
    )
    .bind(package.id)
    .fetch_all(&state.db)
    .await?;

    let itinerary = sqlx::query_as::<_, PackageItineraryDay>(
        "SELECT * FROM package_itinerary_days WHERE package_id = $1 ORDER BY day_number",
    )
    .bind(package.id)
    .fetch_all(&state.db)
    .await?;

    #[derive(sqlx::FromRow)]
    struct ReviewStats {
        review_count: i64,
        average_rating: Option<f64>,
    }
    let stats = sqlx::query_as::<_, ReviewStats>(
        "SELECT COUNT(*) AS review_count, AVG(rating)::float8 AS average_rating \
         FROM package_reviews WHERE package_id = $1",
    )
    .bind(package.id)
    .fetch_one(&state.db)
    .await?;

    if let Err(e) =
        sqlx::query("UPDATE tour_packages SET view_count = view_count + 1 WHERE id = $1")
            .bind(package.id)
            .execute(&state.db)
            .await
    {
        tracing::warn!(error = %e, "Failed to increment package view count");
    }

    Ok(Json(DataResponse::new(PackageDetailResponse {
        package,
        business_name,
        destinations,
        itinerary,
        review_count: stats.review_count,
        average_rating: stats.average_rating,
    })))
}

/// POST /packages
///
/// Create a package; verified travel businesses only. The package, its
/// destination links and itinerary days are written in one transaction.
pub async fn create_package(
    auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreatePackageRequest>,
) -> ApiResult<impl IntoResponse> {
    if auth.role != UserRole::TravelBusiness {
        return Err(ApiError::forbidden(
            "Only travel businesses can create packages.",
        ));
    }

    let profile = profile_for_user(&state.db, &auth).await?;
    if !profile.is_verified {
        return Err(ApiError::forbidden(
            "Your business account is under verification.",
        ));
    }

    req.validate().map_err(ApiError::BadRequest)?;

    // All referenced destinations must exist and be active
    let active_count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM destinations WHERE id = ANY($1) AND is_active",
    )
    .bind(&req.destination_ids)
    .fetch_one(&state.db)
    .await?;
    if active_count != req.destination_ids.len() as i64 {
        return Err(ApiError::bad_request(
            "One or more destinations are unknown or inactive",
        ));
    }

    // Allocate the slug before the transaction; a lost race on the unique
    // constraint maps to a conflict below.
    let base_slug = slugify(&req.title);
    let slug_taken: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM tour_packages WHERE slug = $1)")
            .bind(&base_slug)
            .fetch_one(&state.db)
            .await?;
    let slug = if slug_taken {
        with_suffix(&base_slug)
    } else {
        base_slug
    };

    let mut tx = state.db.begin().await?;

    let package = sqlx::query_as::<_, TourPackage>(
        r#"
        INSERT INTO tour_packages (
            business_id, title, slug, description, duration_days,
            duration_nights, price_per_person, group_size_min,
            group_size_max, inclusions, exclusions, available_from,
            available_to, cover_image, status
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        RETURNING *
        "#,
    )
    .bind(profile.id)
    .bind(req.title.trim())
    .bind(&slug)
    .bind(&req.description)
    .bind(req.duration_days)
    .bind(req.duration_nights)
    .bind(req.price_per_person)
    .bind(req.group_size_min)
    .bind(req.group_size_max)
    .bind(&req.inclusions)
    .bind(&req.exclusions)
    .bind(req.available_from)
    .bind(req.available_to)
    .bind(&req.cover_image)
    .bind(req.status)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        if ApiError::is_unique_violation(&e, "tour_packages_slug_key") {
            ApiError::conflict("A package with this slug already exists")
        } else {
            ApiError::Database(e)
        }
    })?;

    for destination_id in &req.destination_ids {
        sqlx::query(
            "INSERT INTO package_destinations (package_id, destination_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(package.id)
        .bind(destination_id)
        .execute(&mut *tx)
        .await?;
    }

    for day in &req.itinerary {
        sqlx::query(
            r#"
            INSERT INTO package_itinerary_days (package_id, day_number, title, description, destination_id)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(package.id)
        .bind(day.day_number)
        .bind(&day.title)
        .bind(&day.description)
        .bind(day.destination_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::info!(
        package_id = %package.id,
        business_id = %profile.id,
        slug = %package.slug,
        "Package created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse::new(package))))
}

/// PUT /packages/:slug
///
/// Partial update by the owning business, including status moves.
pub async fn update_package(
    auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Json(req): Json<UpdatePackageRequest>,
) -> ApiResult<impl IntoResponse> {
    let profile = profile_for_user(&state.db, &auth).await?;

    if let (Some(min), Some(max)) = (req.group_size_min, req.group_size_max) {
        if min < 1 || max < min {
            return Err(ApiError::bad_request("invalid group size range"));
        }
    }
    if let Some(price) = req.price_per_person {
        if price <= Decimal::ZERO {
            return Err(ApiError::bad_request("price_per_person must be positive"));
        }
    }

    let package = sqlx::query_as::<_, TourPackage>(
        r#"
        UPDATE tour_packages
        SET title = COALESCE($3, title),
            description = COALESCE($4, description),
            price_per_person = COALESCE($5, price_per_person),
            group_size_min = COALESCE($6, group_size_min),
            group_size_max = COALESCE($7, group_size_max),
            inclusions = COALESCE($8, inclusions),
            exclusions = COALESCE($9, exclusions),
            available_from = COALESCE($10, available_from),
            available_to = COALESCE($11, available_to),
            cover_image = COALESCE($12, cover_image),
            status = COALESCE($13, status),
            is_featured = COALESCE($14, is_featured),
            updated_at = now()
        WHERE slug = $1 AND business_id = $2
        RETURNING *
        "#,
    )
    .bind(&slug)
    .bind(profile.id)
    .bind(&req.title)
    .bind(&req.description)
    .bind(req.price_per_person)
    .bind(req.group_size_min)
    .bind(req.group_size_max)
    .bind(&req.inclusions)
    .bind(&req.exclusions)
    .bind(req.available_from)
    .bind(req.available_to)
    .bind(&req.cover_image)
    .bind(req.status)
    .bind(req.is_featured)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::not_found("Package not found"))?;

    Ok(Json(DataResponse::new(package)))
}

/// POST /packages/:slug/reviews
///
/// One review per user per package.
pub async fn create_review(
    auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Json(req): Json<CreateReviewRequest>,
) -> ApiResult<impl IntoResponse> {
    if !(1..=5).contains(&req.rating) {
        return Err(ApiError::bad_request("rating must be between 1 and 5"));
    }

    let package_id: Option<Uuid> = sqlx::query_scalar(
        "SELECT id FROM tour_packages WHERE slug = $1 AND status = 'PUBLISHED'",
    )
    .bind(&slug)
    .fetch_optional(&state.db)
    .await?;
    let package_id = package_id.ok_or_else(|| ApiError::not_found("Package not found"))?;

    let review = sqlx::query_as::<_, PackageReview>(
        r#"
        INSERT INTO package_reviews (package_id, user_id, rating, comment)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(package_id)
    .bind(auth.user_id)
    .bind(req.rating)
    .bind(req.comment.trim())
    .fetch_one(&state.db)
    .await
    .map_err(|e| {
        if ApiError::is_unique_violation(&e, "package_reviews_package_id_user_id_key") {
            ApiError::conflict("You have already reviewed this package")
        } else {
            ApiError::Database(e)
        }
    })?;

    Ok((StatusCode::CREATED, Json(DataResponse::new(review))))
}

/// GET /packages/:slug/reviews
pub async fn list_reviews(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<impl IntoResponse> {
    let package_id: Option<Uuid> = sqlx::query_scalar(
        "SELECT id FROM tour_packages WHERE slug = $1 AND status = 'PUBLISHED'",
    )
    .bind(&slug)
    .fetch_optional(&state.db)
    .await?;
    let package_id = package_id.ok_or_else(|| ApiError::not_found("Package not found"))?;

    let total: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM package_reviews WHERE package_id = $1")
            .bind(package_id)
            .fetch_one(&state.db)
            .await?;

    let reviews = sqlx::query_as::<_, PackageReview>(
        r#"
        SELECT * FROM package_reviews
        WHERE package_id = $1
        ORDER BY created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(package_id)
    .bind(pagination.limit())
    .bind(pagination.offset())
    .fetch_all(&state.db)
    .await?;

    Ok(Paginated::new(reviews, &pagination, total as u64))
}
