use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, Responder};
use log::info;
use serde_json::json;

use crate::error::ErrorKind;
use crate::web::models::{GatewayResponse, HistoryResponse, InfoResponse, Status};
use crate::AppState;

// Health check endpoint
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

// Chat endpoint. Takes the raw body so malformed JSON is answered by the
// gateway's own error contract rather than actix's extractor errors.
pub async fn chat(data: web::Data<AppState>, body: web::Bytes) -> impl Responder {
    info!("Chat request received ({} bytes)", body.len());
    let response = data.gateway.handle_raw(&body).await;
    info!("Chat request finished with status {:?}", response.status());
    HttpResponse::build(status_code(&response)).json(response)
}

// Read-only view of the conversation
pub async fn history(data: web::Data<AppState>) -> impl Responder {
    let messages = data.gateway.history().await;
    HttpResponse::Ok().json(HistoryResponse {
        messages,
        status: Status::Success,
    })
}

// Version and deployment information
pub async fn info(data: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(InfoResponse {
        info: data.gateway.info().clone(),
        status: Status::Success,
    })
}

fn status_code(response: &GatewayResponse) -> StatusCode {
    match response.error_kind() {
        None => StatusCode::OK,
        Some(ErrorKind::Validation) => StatusCode::BAD_REQUEST,
        Some(ErrorKind::Provider) => StatusCode::BAD_GATEWAY,
        Some(ErrorKind::Configuration) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
