//! Current-user routes: profile and booking history.

use axum::{extract::Query, extract::State, response::IntoResponse, Json};
use std::sync::Arc;

use crate::api::{Paginated, PaginationParams};
use crate::api::response::DataResponse;
use crate::app::AppState;
use crate::auth::RequireAuth;
use crate::domain::accounts::{UpdateProfileRequest, User, UserResponse};
use crate::domain::bookings::BookingListRow;
use crate::error::{ApiError, ApiResult};

/// GET /me
pub async fn get_me(
    auth: RequireAuth,
    State(state): State<Arc<AppState>>,
) -> ApiResult<impl IntoResponse> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(auth.user_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(DataResponse::new(UserResponse::from(user))))
}

/// PUT /me
pub async fn update_me(
    auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET first_name = COALESCE($2, first_name),
            last_name = COALESCE($3, last_name),
            contact = COALESCE($4, contact),
            profile_picture = COALESCE($5, profile_picture),
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(auth.user_id)
    .bind(&req.first_name)
    .bind(&req.last_name)
    .bind(&req.contact)
    .bind(&req.profile_picture)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(DataResponse::new(UserResponse::from(user))))
}

/// GET /me/bookings
pub async fn my_bookings(
    auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<impl IntoResponse> {
    let total: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM package_bookings WHERE user_id = $1")
            .bind(auth.user_id)
            .fetch_one(&state.db)
            .await?;

    let bookings = sqlx::query_as::<_, BookingListRow>(
        r#"
        SELECT b.id, b.booking_reference, p.title AS package_title,
               p.slug AS package_slug, b.travel_date, b.num_people,
               b.total_price, b.status, b.created_at
        FROM package_bookings b
        JOIN tour_packages p ON p.id = b.package_id
        WHERE b.user_id = $1
        ORDER BY b.created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(auth.user_id)
    .bind(pagination.limit())
    .bind(pagination.offset())
    .fetch_all(&state.db)
    .await?;

    Ok(Paginated::new(bookings, &pagination, total as u64))
}
