pub mod admin;
pub mod ai;
pub mod auth;
pub mod bookings;
pub mod businesses;
pub mod destinations;
pub mod explore;
pub mod health;
pub mod me;
pub mod packages;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use crate::app::AppState;

/// Build the API router with all routes
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        // Public routes
        .route("/health", get(health::health_check))
        // Accounts
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/me", get(me::get_me))
        .route("/me", put(me::update_me))
        .route("/me/bookings", get(me::my_bookings))
        // Businesses
        .route("/business/register", post(businesses::register_business))
        .route("/business/dashboard", get(businesses::dashboard))
        .route(
            "/business/accommodation",
            put(businesses::upsert_accommodation),
        )
        .route(
            "/business/manufacturer",
            put(businesses::upsert_manufacturer),
        )
        .route("/business/images", post(businesses::upload_image))
        .route(
            "/business/images/:image_id",
            delete(businesses::delete_image),
        )
        .route("/business/bookings", get(businesses::business_bookings))
        .route(
            "/business/bookings/:reference/status",
            post(businesses::set_booking_status),
        )
        .route(
            "/businesses/local-to-global",
            get(businesses::local_to_global),
        )
        // Destination catalog
        .route("/destinations", get(destinations::list_destinations))
        .route(
            "/destinations/filters",
            get(destinations::destination_filters),
        )
        .route("/destinations/:slug", get(destinations::destination_detail))
        .route(
            "/destinations/:slug/itineraries",
            get(destinations::list_itineraries),
        )
        .route(
            "/destinations/:slug/generate-itinerary",
            post(ai::generate_itinerary),
        )
        // Packages
        .route("/packages", get(packages::list_packages))
        .route("/packages", post(packages::create_package))
        .route("/packages/:slug", get(packages::package_detail))
        .route("/packages/:slug", put(packages::update_package))
        .route("/packages/:slug/reviews", get(packages::list_reviews))
        .route("/packages/:slug/reviews", post(packages::create_review))
        .route("/packages/:slug/bookings", post(bookings::create_booking))
        // Explore feed
        .route("/explore", get(explore::feed))
        .route("/explore/posts", post(explore::create_post))
        .route("/explore/posts/:post_id", get(explore::post_detail))
        .route("/explore/posts/:post_id/like", post(explore::toggle_like))
        .route(
            "/explore/posts/:post_id/comments",
            post(explore::create_comment),
        )
        // Admin
        .route("/admin/businesses", get(admin::list_businesses))
        .route(
            "/admin/businesses/:business_id/verify",
            post(admin::verify_business),
        )
        .route("/admin/categories", post(admin::create_category))
        .route("/admin/tags", post(admin::create_tag))
        .route("/admin/destinations", post(admin::create_destination))
        .route(
            "/admin/destinations/:slug",
            put(admin::update_destination),
        )
        .route(
            "/admin/destinations/:slug/images",
            post(admin::add_destination_image),
        )
        .route(
            "/admin/destinations/:slug/itineraries",
            post(admin::create_itinerary),
        )
}
