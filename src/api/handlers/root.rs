use axum::{http::StatusCode, Json, response::IntoResponse};
use serde_json::json;

pub async fn root() -> impl IntoResponse {
    Json(json!({
        "name": "MJBEA Registration API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Membership registration for the Slimi Brahim youth center, Bir El Ater",
        "status": "operational",
        "endpoints": {
            "health": "/health",
            "activities": "/api/activities",
            "registrations": "/api/registrations",
            "members": "/api/members",
            "statistics": "/api/statistics",
            "admin": "/admin"
        }
    }))
}

pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}
