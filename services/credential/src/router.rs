use axum::{
    Router,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::request_id::PropagateRequestIdLayer;
use tower_http::trace::TraceLayer;

use otpgate_core::health::{healthz, readyz};
use otpgate_core::middleware::request_id_layer;

use crate::handlers::{
    otp::{list_otps, verify_otp},
    password::get_password,
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // One-time codes
        .route("/", get(list_otps))
        .route("/verify-otp", post(verify_otp))
        // Rotating password
        .route("/password", get(get_password))
        .layer(
            ServiceBuilder::new()
                .layer(request_id_layer())
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                // The code entry page is served from another origin.
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
