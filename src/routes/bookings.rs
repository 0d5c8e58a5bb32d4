//! Booking creation against published packages.
//!
//! The server computes the total and generates the human-readable
//! reference; clients never supply either.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::api::response::DataResponse;
use crate::app::AppState;
use crate::auth::RequireAuth;
use crate::domain::bookings::{
    booking_total, generate_booking_reference, CreateBookingRequest, PackageBooking,
};
use crate::domain::packages::TourPackage;
use crate::error::{ApiError, ApiResult};

/// POST /packages/:slug/bookings
pub async fn create_booking(
    auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Json(req): Json<CreateBookingRequest>,
) -> ApiResult<impl IntoResponse> {
    // Draft and archived packages are invisible to booking
    let package = sqlx::query_as::<_, TourPackage>(
        "SELECT * FROM tour_packages WHERE slug = $1 AND status = 'PUBLISHED'",
    )
    .bind(&slug)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::not_found("Package not found"))?;

    if req.num_people < package.group_size_min || req.num_people > package.group_size_max {
        return Err(ApiError::bad_request(format!(
            "Group size must be between {} and {} people",
            package.group_size_min, package.group_size_max
        )));
    }
    if req.contact_name.trim().is_empty() || req.contact_phone.trim().is_empty() {
        return Err(ApiError::bad_request(
            "Contact name and phone are required",
        ));
    }
    if let Some(from) = package.available_from {
        if req.travel_date < from {
            return Err(ApiError::bad_request(
                "Travel date is before the package availability window",
            ));
        }
    }
    if let Some(to) = package.available_to {
        if req.travel_date > to {
            return Err(ApiError::bad_request(
                "Travel date is after the package availability window",
            ));
        }
    }

    let total_price = booking_total(package.price_per_person, req.num_people);

    // The reference carries a unique constraint; retry on the unlikely
    // collision.
    let mut booking = None;
    for _ in 0..3 {
        let reference = generate_booking_reference();
        let result = sqlx::query_as::<_, PackageBooking>(
            r#"
            INSERT INTO package_bookings (
                package_id, user_id, booking_reference, travel_date,
                num_people, total_price, contact_name, contact_phone, note
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(package.id)
        .bind(auth.user_id)
        .bind(&reference)
        .bind(req.travel_date)
        .bind(req.num_people)
        .bind(total_price)
        .bind(req.contact_name.trim())
        .bind(req.contact_phone.trim())
        .bind(req.note.trim())
        .fetch_one(&state.db)
        .await;

        match result {
            Ok(b) => {
                booking = Some(b);
                break;
            }
            Err(e)
                if ApiError::is_unique_violation(
                    &e,
                    "package_bookings_booking_reference_key",
                ) =>
            {
                continue
            }
            Err(e) => return Err(ApiError::Database(e)),
        }
    }
    let booking = booking
        .ok_or_else(|| ApiError::internal("Could not allocate a booking reference"))?;

    tracing::info!(
        booking_id = %booking.id,
        booking_reference = %booking.booking_reference,
        package_id = %package.id,
        user_id = %auth.user_id,
        "Booking created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse::new(booking))))
}
