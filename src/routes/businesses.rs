//! Business routes: registration, dashboard, role-specific details, the
//! image gallery and booking management.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::response::{DataResponse, NoContent};
use crate::api::{Paginated, PaginationParams};
use crate::app::AppState;
use crate::auth::{password, AuthContext, RequireAuth};
use crate::domain::accounts::{normalize_email, AuthResponse, User, UserRole};
use crate::domain::bookings::{BookingListRow, BookingStatus, UpdateBookingStatusRequest};
use crate::domain::businesses::{
    AccommodationDetails, AccommodationUpsertRequest, BusinessCard, BusinessImage,
    BusinessProfile, BusinessRegistrationRequest, DashboardResponse, DashboardStats,
    ManufacturerDetails, ManufacturerUpsertRequest,
};
use crate::error::{ApiError, ApiResult};
use crate::services::media;

/// Load the business profile owned by the authenticated user.
pub(crate) async fn profile_for_user(
    db: &sqlx::PgPool,
    auth: &AuthContext,
) -> Result<BusinessProfile, ApiError> {
    auth.require_business()?;

    sqlx::query_as::<_, BusinessProfile>("SELECT * FROM business_profiles WHERE user_id = $1")
        .bind(auth.user_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| ApiError::not_found("Business profile not found"))
}

/// POST /business/register
///
/// Create the user account and the business profile in one transaction.
/// The account role is derived from the business type; the profile starts
/// unverified.
pub async fn register_business(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BusinessRegistrationRequest>,
) -> ApiResult<impl IntoResponse> {
    let email = normalize_email(&req.email);
    if !email.contains('@') {
        return Err(ApiError::bad_request("Invalid email address"));
    }
    if req.password.len() < password::MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request(
            "Password must be at least 8 characters long",
        ));
    }
    if req.password != req.password_confirm {
        return Err(ApiError::bad_request("Passwords do not match."));
    }
    if req.business_name.trim().is_empty() || req.pan_or_vat.trim().is_empty() {
        return Err(ApiError::bad_request(
            "Business name and PAN/VAT number are required",
        ));
    }
    if let Some(website) = req.website.as_deref() {
        url::Url::parse(website).map_err(|_| ApiError::bad_request("Invalid website URL"))?;
    }

    let role = req.business_type.user_role();
    let hash = password::hash_password(&req.password)?;

    let mut tx = state.db.begin().await?;

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (email, password_hash, contact, role)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(&email)
    .bind(&hash)
    .bind(&req.contact)
    .bind(role)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        if ApiError::is_unique_violation(&e, "users_email_key") {
            ApiError::conflict("This email is already registered.")
        } else {
            ApiError::Database(e)
        }
    })?;

    let profile = sqlx::query_as::<_, BusinessProfile>(
        r#"
        INSERT INTO business_profiles (
            user_id, business_name, business_type, pan_or_vat,
            registration_document, request_letter, address, district, province,
            latitude, longitude, description, phone, website
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        RETURNING *
        "#,
    )
    .bind(user.id)
    .bind(req.business_name.trim())
    .bind(req.business_type)
    .bind(req.pan_or_vat.trim())
    .bind(&req.registration_document)
    .bind(&req.request_letter)
    .bind(&req.address)
    .bind(&req.district)
    .bind(&req.province)
    .bind(req.latitude)
    .bind(req.longitude)
    .bind(&req.description)
    .bind(&req.phone)
    .bind(&req.website)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        if ApiError::is_unique_violation(&e, "business_profiles_pan_or_vat_key") {
            ApiError::conflict("This PAN/VAT number is already registered.")
        } else {
            ApiError::Database(e)
        }
    })?;

    tx.commit().await?;

    tracing::info!(
        user_id = %user.id,
        business_id = %profile.id,
        business_type = ?profile.business_type,
        "Business registered, pending verification"
    );

    let (token, expires_at) = state.tokens.issue(user.id, &user.email, user.role)?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::with_meta(
            AuthResponse {
                access_token: token,
                expires_at,
                user: user.into(),
                verification_pending: true,
            },
            serde_json::json!({
                "message": "Registration successful! Your account is pending admin verification.",
                "business_id": profile.id,
            }),
        )),
    ))
}

/// GET /business/dashboard
///
/// The owner's profile with role-specific details, gallery and aggregates.
pub async fn dashboard(
    auth: RequireAuth,
    State(state): State<Arc<AppState>>,
) -> ApiResult<impl IntoResponse> {
    let profile = profile_for_user(&state.db, &auth).await?;

    let accommodation = if profile.business_type.is_accommodation() {
        sqlx::query_as::<_, AccommodationDetails>(
            "SELECT * FROM accommodation_details WHERE business_id = $1",
        )
        .bind(profile.id)
        .fetch_optional(&state.db)
        .await?
    } else {
        None
    };

    let manufacturer = if auth.role == UserRole::Manufacturer {
        sqlx::query_as::<_, ManufacturerDetails>(
            "SELECT * FROM manufacturer_details WHERE business_id = $1",
        )
        .bind(profile.id)
        .fetch_optional(&state.db)
        .await?
    } else {
        None
    };

    let images = sqlx::query_as::<_, BusinessImage>(
        r#"
        SELECT * FROM business_images
        WHERE business_id = $1
        ORDER BY is_primary DESC, uploaded_at DESC
        "#,
    )
    .bind(profile.id)
    .fetch_all(&state.db)
    .await?;

    #[derive(sqlx::FromRow)]
    struct StatsRow {
        package_count: i64,
        published_package_count: i64,
        total_package_views: i64,
        booking_count: i64,
    }

    let stats = sqlx::query_as::<_, StatsRow>(
        r#"
        SELECT
            COUNT(p.id) AS package_count,
            COUNT(p.id) FILTER (WHERE p.status = 'PUBLISHED') AS published_package_count,
            COALESCE(SUM(p.view_count), 0)::bigint AS total_package_views,
            (SELECT COUNT(*) FROM package_bookings b
             JOIN tour_packages tp ON tp.id = b.package_id
             WHERE tp.business_id = $1) AS booking_count
        FROM tour_packages p
        WHERE p.business_id = $1
        "#,
    )
    .bind(profile.id)
    .fetch_one(&state.db)
    .await?;

    let image_count = images.len() as i64;

    Ok(Json(DataResponse::new(DashboardResponse {
        profile,
        accommodation,
        manufacturer,
        images,
        stats: DashboardStats {
            package_count: stats.package_count,
            published_package_count: stats.published_package_count,
            total_package_views: stats.total_package_views,
            booking_count: stats.booking_count,
            image_count,
        },
    })))
}

/// PUT /business/accommodation
///
/// Upsert accommodation details; hotels and homestays only.
pub async fn upsert_accommodation(
    auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Json(req): Json<AccommodationUpsertRequest>,
) -> ApiResult<impl IntoResponse> {
    let profile = profile_for_user(&state.db, &auth).await?;

    if !profile.business_type.is_accommodation() {
        return Err(ApiError::forbidden(
            "Accommodation details are only available for hotels and homestays",
        ));
    }
    if req.total_rooms < 1 {
        return Err(ApiError::bad_request("total_rooms must be at least 1"));
    }
    if req.price_range_min > req.price_range_max {
        return Err(ApiError::bad_request(
            "price_range_min must not exceed price_range_max",
        ));
    }

    let details = sqlx::query_as::<_, AccommodationDetails>(
        r#"
        INSERT INTO accommodation_details (
            business_id, total_rooms, price_range_min, price_range_max,
            has_wifi, has_parking, has_restaurant, check_in_time, check_out_time
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ON CONFLICT (business_id) DO UPDATE SET
            total_rooms = EXCLUDED.total_rooms,
            price_range_min = EXCLUDED.price_range_min,
            price_range_max = EXCLUDED.price_range_max,
            has_wifi = EXCLUDED.has_wifi,
            has_parking = EXCLUDED.has_parking,
            has_restaurant = EXCLUDED.has_restaurant,
            check_in_time = EXCLUDED.check_in_time,
            check_out_time = EXCLUDED.check_out_time
        RETURNING *
        "#,
    )
    .bind(profile.id)
    .bind(req.total_rooms)
    .bind(req.price_range_min)
    .bind(req.price_range_max)
    .bind(req.has_wifi)
    .bind(req.has_parking)
    .bind(req.has_restaurant)
    .bind(req.check_in_time)
    .bind(req.check_out_time)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(DataResponse::new(details)))
}

/// PUT /business/manufacturer
///
/// Upsert manufacturer details; manufacturer accounts only.
pub async fn upsert_manufacturer(
    auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Json(req): Json<ManufacturerUpsertRequest>,
) -> ApiResult<impl IntoResponse> {
    let profile = profile_for_user(&state.db, &auth).await?;

    if auth.role != UserRole::Manufacturer {
        return Err(ApiError::forbidden(
            "Manufacturer details are only available for manufacturer accounts",
        ));
    }
    if req.product_description.trim().is_empty() {
        return Err(ApiError::bad_request("product_description is required"));
    }

    let details = sqlx::query_as::<_, ManufacturerDetails>(
        r#"
        INSERT INTO manufacturer_details (
            business_id, product_category, product_description,
            minimum_order_quantity, ships_internationally
        )
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (business_id) DO UPDATE SET
            product_category = EXCLUDED.product_category,
            product_description = EXCLUDED.product_description,
            minimum_order_quantity = EXCLUDED.minimum_order_quantity,
            ships_internationally = EXCLUDED.ships_internationally
        RETURNING *
        "#,
    )
    .bind(profile.id)
    .bind(req.product_category)
    .bind(&req.product_description)
    .bind(req.minimum_order_quantity)
    .bind(req.ships_internationally)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(DataResponse::new(details)))
}

/// POST /business/images
///
/// Multipart gallery upload: an `image` file plus optional `caption` and
/// `is_primary` fields. Marking a new primary demotes the previous one.
pub async fn upload_image(
    auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let profile = profile_for_user(&state.db, &auth).await?;

    let mut caption = String::new();
    let mut is_primary = false;
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart request: {e}")))?
    {
        match field.name().unwrap_or_default() {
            "caption" => {
                caption = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Invalid caption field: {e}")))?;
            }
            "is_primary" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Invalid is_primary field: {e}")))?;
                is_primary = matches!(value.as_str(), "true" | "1" | "on");
            }
            "image" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                if media::image_extension(&file_name).is_none() {
                    return Err(ApiError::bad_request(
                        "Only jpg, jpeg, png and webp images are accepted",
                    ));
                }
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {e}")))?;
                if bytes.len() > state.settings.upload_max_bytes {
                    return Err(ApiError::bad_request("Uploaded image is too large"));
                }
                upload = Some((file_name, bytes.to_vec()));
            }
            other => {
                tracing::debug!(field = other, "Ignoring unknown multipart field");
            }
        }
    }

    let (file_name, bytes) = upload.ok_or_else(|| ApiError::bad_request("Missing image file"))?;

    let image_path = state
        .media
        .store_image("business_images", &file_name, &bytes)
        .await
        .map_err(ApiError::Internal)?;

    let mut tx = state.db.begin().await?;

    if is_primary {
        sqlx::query("UPDATE business_images SET is_primary = FALSE WHERE business_id = $1")
            .bind(profile.id)
            .execute(&mut *tx)
            .await?;
    }

    let image = sqlx::query_as::<_, BusinessImage>(
        r#"
        INSERT INTO business_images (business_id, image_path, caption, is_primary)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(profile.id)
    .bind(&image_path)
    .bind(&caption)
    .bind(is_primary)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(business_id = %profile.id, image_id = %image.id, "Gallery image uploaded");

    Ok((StatusCode::CREATED, Json(DataResponse::new(image))))
}

/// DELETE /business/images/:image_id
pub async fn delete_image(
    auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(image_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let profile = profile_for_user(&state.db, &auth).await?;

    let image = sqlx::query_as::<_, BusinessImage>(
        "DELETE FROM business_images WHERE id = $1 AND business_id = $2 RETURNING *",
    )
    .bind(image_id)
    .bind(profile.id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::not_found("Image not found"))?;

    // Row is gone; file removal is best-effort.
    state.media.remove(&image.image_path).await;

    Ok(NoContent)
}

/// GET /businesses/local-to-global
///
/// Public directory of verified manufacturers that ship internationally.
pub async fn local_to_global(
    State(state): State<Arc<AppState>>,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<impl IntoResponse> {
    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM business_profiles bp
        JOIN manufacturer_details md ON md.business_id = bp.id
        WHERE bp.is_verified AND md.ships_internationally
        "#,
    )
    .fetch_one(&state.db)
    .await?;

    let cards = sqlx::query_as::<_, BusinessCard>(
        r#"
        SELECT bp.id, bp.business_name, bp.business_type, bp.district,
               bp.province, bp.description, bp.phone, bp.website, bp.logo
        FROM business_profiles bp
        JOIN manufacturer_details md ON md.business_id = bp.id
        WHERE bp.is_verified AND md.ships_internationally
        ORDER BY bp.business_name
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(pagination.limit())
    .bind(pagination.offset())
    .fetch_all(&state.db)
    .await?;

    Ok(Paginated::new(cards, &pagination, total as u64))
}

/// GET /business/bookings
///
/// Bookings placed against the business's packages.
pub async fn business_bookings(
    auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<impl IntoResponse> {
    let profile = profile_for_user(&state.db, &auth).await?;

    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM package_bookings b
        JOIN tour_packages p ON p.id = b.package_id
        WHERE p.business_id = $1
        "#,
    )
    .bind(profile.id)
    .fetch_one(&state.db)
    .await?;

    let bookings = sqlx::query_as::<_, BookingListRow>(
        r#"
        SELECT b.id, b.booking_reference, p.title AS package_title,
               p.slug AS package_slug, b.travel_date, b.num_people,
               b.total_price, b.status, b.created_at
        FROM package_bookings b
        JOIN tour_packages p ON p.id = b.package_id
        WHERE p.business_id = $1
        ORDER BY b.created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(profile.id)
    .bind(pagination.limit())
    .bind(pagination.offset())
    .fetch_all(&state.db)
    .await?;

    Ok(Paginated::new(bookings, &pagination, total as u64))
}

/// POST /business/bookings/:reference/status
///
/// Confirm or cancel a booking against one of the business's packages.
/// Cancelled bookings stay cancelled.
pub async fn set_booking_status(
    auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(reference): Path<String>,
    Json(req): Json<UpdateBookingStatusRequest>,
) -> ApiResult<impl IntoResponse> {
    let profile = profile_for_user(&state.db, &auth).await?;

    if req.status == BookingStatus::Pending {
        return Err(ApiError::bad_request(
            "Bookings can only be moved to CONFIRMED or CANCELLED",
        ));
    }

    let current: Option<BookingStatus> = sqlx::query_scalar(
        r#"
        SELECT b.status
        FROM package_bookings b
        JOIN tour_packages p ON p.id = b.package_id
        WHERE b.booking_reference = $1 AND p.business_id = $2
        "#,
    )
    .bind(&reference)
    .bind(profile.id)
    .fetch_optional(&state.db)
    .await?;

    let current = current.ok_or_else(|| ApiError::not_found("Booking not found"))?;
    if current == BookingStatus::Cancelled {
        return Err(ApiError::conflict("Cancelled bookings cannot be changed"));
    }

    let updated = sqlx::query_as::<_, crate::domain::bookings::PackageBooking>(
        r#"
        UPDATE package_bookings
        SET status = $2, updated_at = now()
        WHERE booking_reference = $1
        RETURNING *
        "#,
    )
    .bind(&reference)
    .bind(req.status)
    .fetch_one(&state.db)
    .await?;

    tracing::info!(
        booking_reference = %reference,
        status = ?req.status,
        "Booking status updated"
    );

    Ok(Json(DataResponse::new(updated)))
}
