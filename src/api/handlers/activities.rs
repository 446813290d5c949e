use axum::Json;

use crate::domain::{all_activities, Activity};

pub async fn list() -> Json<&'static [Activity]> {
    Json(all_activities())
}
