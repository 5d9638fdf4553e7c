//! Simple Health Check Module
//!
//! Liveness endpoint reporting the service name, version and current time.

use crate::{SERVICE_NAME, VERSION};
use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SimpleStatus {
    Healthy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleHealthResponse {
    pub service_status: SimpleStatus,
    pub service: String,
    pub version: String,
    pub timestamp: String,
}

/// Liveness handler
pub async fn simple_health() -> HttpResponse {
    HttpResponse::Ok().json(SimpleHealthResponse {
        service_status: SimpleStatus::Healthy,
        service: SERVICE_NAME.to_string(),
        version: VERSION.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
