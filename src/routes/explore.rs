//! Explore feed routes: approved posts, likes and comments.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use sqlx::{Postgres, QueryBuilder};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::response::DataResponse;
use crate::api::{Paginated, PaginationParams};
use crate::app::AppState;
use crate::auth::RequireAuth;
use crate::domain::explore::{
    CreateCommentRequest, CreatePostRequest, ExplorePost, FeedQuery, FeedRow, LikeResponse,
    PostComment, PostDetailResponse,
};
use crate::error::{ApiError, ApiResult};

fn push_feed_filters(qb: &mut QueryBuilder<'_, Postgres>, q: &FeedQuery) {
    qb.push(" WHERE ep.is_approved");

    if let Some(post_type) = q.post_type {
        qb.push(" AND ep.post_type = ").push_bind(post_type);
    }
    if let Some(destination) = q.destination {
        qb.push(" AND ep.destination_id = ").push_bind(destination);
    }
}

/// GET /explore
///
/// Approved posts, newest first.
pub async fn feed(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FeedQuery>,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<impl IntoResponse> {
    let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM explore_posts ep");
    push_feed_filters(&mut count_qb, &query);
    let total: i64 = count_qb.build_query_scalar().fetch_one(&state.db).await?;

    let mut qb = QueryBuilder::new(
        "SELECT ep.id, ep.post_type, ep.title, ep.caption, ep.image_path, \
         ep.video_url, ep.thumbnail_path, ep.destination_id, ep.view_count, \
         ep.like_count, ep.is_featured, ep.created_at, u.email AS author_email \
         FROM explore_posts ep JOIN users u ON u.id = ep.author_id",
    );
    push_feed_filters(&mut qb, &query);
    qb.push(" ORDER BY ep.created_at DESC LIMIT ")
        .push_bind(pagination.limit())
        .push(" OFFSET ")
        .push_bind(pagination.offset());

    let rows: Vec<FeedRow> = qb.build_query_as().fetch_all(&state.db).await?;

    Ok(Paginated::new(rows, &pagination, total as u64))
}

/// GET /explore/posts/:post_id
pub async fn post_detail(
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let post = sqlx::query_as::<_, ExplorePost>(
        "SELECT * FROM explore_posts WHERE id = $1 AND is_approved",
    )
    .bind(post_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::not_found("Post not found"))?;

    let comments = sqlx::query_as::<_, PostComment>(
        "SELECT * FROM post_comments WHERE post_id = $1 ORDER BY created_at",
    )
    .bind(post_id)
    .fetch_all(&state.db)
    .await?;

    if let Err(e) =
        sqlx::query("UPDATE explore_posts SET view_count = view_count + 1 WHERE id = $1")
            .bind(post_id)
            .execute(&state.db)
            .await
    {
        tracing::warn!(error = %e, "Failed to increment post view count");
    }

    Ok(Json(DataResponse::new(PostDetailResponse { post, comments })))
}

/// POST /explore/posts
pub async fn create_post(
    auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreatePostRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate().map_err(ApiError::BadRequest)?;

    let post = sqlx::query_as::<_, ExplorePost>(
        r#"
        INSERT INTO explore_posts (
            author_id, post_type, title, caption, image_path, video_path,
            video_url, thumbnail_path, content, destination_id
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING *
        "#,
    )
    .bind(auth.user_id)
    .bind(req.post_type)
    .bind(req.title.trim())
    .bind(&req.caption)
    .bind(&req.image_path)
    .bind(&req.video_path)
    .bind(&req.video_url)
    .bind(&req.thumbnail_path)
    .bind(&req.content)
    .bind(req.destination_id)
    .fetch_one(&state.db)
    .await?;

    tracing::info!(post_id = %post.id, post_type = ?post.post_type, "Explore post created");

    Ok((StatusCode::CREATED, Json(DataResponse::new(post))))
}

/// POST /explore/posts/:post_id/like
///
/// Toggle the caller's like. The like row and the denormalized counter
/// move in the same transaction.
pub async fn toggle_like(
    auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let exists: Option<Uuid> =
        sqlx::query_scalar("SELECT id FROM explore_posts WHERE id = $1 AND is_approved")
            .bind(post_id)
            .fetch_optional(&state.db)
            .await?;
    if exists.is_none() {
        return Err(ApiError::not_found("Post not found"));
    }

    let mut tx = state.db.begin().await?;

    let deleted = sqlx::query("DELETE FROM post_likes WHERE post_id = $1 AND user_id = $2")
        .bind(post_id)
        .bind(auth.user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let liked = if deleted == 0 {
        sqlx::query("INSERT INTO post_likes (post_id, user_id) VALUES ($1, $2)")
            .bind(post_id)
            .bind(auth.user_id)
            .execute(&mut *tx)
            .await?;
        true
    } else {
        false
    };

    let delta: i64 = if liked { 1 } else { -1 };
    let like_count: i64 = sqlx::query_scalar(
        r#"
        UPDATE explore_posts
        SET like_count = GREATEST(like_count + $2, 0), updated_at = now()
        WHERE id = $1
        RETURNING like_count
        "#,
    )
    .bind(post_id)
    .bind(delta)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(Json(DataResponse::new(LikeResponse { liked, like_count })))
}

/// POST /explore/posts/:post_id/comments
pub async fn create_comment(
    auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<Uuid>,
    Json(req): Json<CreateCommentRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.content.trim().is_empty() {
        return Err(ApiError::bad_request("Comment content must not be empty"));
    }

    let exists: Option<Uuid> =
        sqlx::query_scalar("SELECT id FROM explore_posts WHERE id = $1 AND is_approved")
            .bind(post_id)
            .fetch_optional(&state.db)
            .await?;
    if exists.is_none() {
        return Err(ApiError::not_found("Post not found"));
    }

    let comment = sqlx::query_as::<_, PostComment>(
        r#"
        INSERT INTO post_comments (post_id, author_id, content)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(post_id)
    .bind(auth.user_id)
    .bind(req.content.trim())
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(DataResponse::new(comment))))
}
