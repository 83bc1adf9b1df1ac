//! Backend service error types.

use skinme_core::error::ReqwestErrorExt;
use skinme_core::{AppError, NetworkError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{operation} failed ({status}){}", detail_suffix(.detail))]
    BadResponse {
        operation: &'static str,
        status: u16,
        detail: Option<String>,
    },

    #[error("Invalid response: {0}")]
    Parse(String),

    #[error("Invalid backend URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

fn detail_suffix(detail: &Option<String>) -> String {
    match detail {
        Some(d) if !d.is_empty() => format!(": {}", d),
        _ => String::new(),
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Network(e) => AppError::Network(e.into_network_error()),
            ServiceError::BadResponse {
                operation,
                status,
                detail,
            } => AppError::Network(NetworkError::ServerError {
                status,
                message: format!("{} failed{}", operation, detail_suffix(&detail)),
            }),
            ServiceError::Parse(msg) => AppError::Network(NetworkError::InvalidResponse(msg)),
            ServiceError::InvalidUrl(e) => AppError::Service(e.to_string()),
        }
    }
}
