//! Probe endpoints. Neither touches the database or the bus: a process that
//! answers HTTP is considered live and ready.

use axum::http::StatusCode;

pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

pub async fn readyz() -> StatusCode {
    StatusCode::OK
}
