use crate::api::v1::handler::ApiResponse;
use crate::application_port::{AuthError, TokenError};
use serde::Serialize;
use std::convert::Infallible;
use thiserror::Error;
use tracing::{error, warn};
use warp::http::StatusCode;
use warp::{Rejection, reject};

pub async fn recover_error(err: Rejection) -> Result<impl warp::Reply, Infallible> {
    if let Some(err) = err.find::<ApiErrorCode>() {
        let json = warp::reply::json(&ApiResponse::<()>::err(err.clone(), err.to_string()));
        Ok(warp::reply::with_status(json, err.status()))
    } else {
        let json = warp::reply::json(&ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(ApiError {
                code: ApiErrorCode::InternalError,
                message: format!("Unhandled error: {:?}", err),
            }),
        });
        Ok(warp::reply::with_status(
            json,
            StatusCode::INTERNAL_SERVER_ERROR,
        ))
    }
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
}

/// The messages here are the entire vocabulary a client ever sees. Which
/// precise check failed stays in the logs.
#[derive(Debug, Clone, Error, Serialize)]
pub enum ApiErrorCode {
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Account is inactive")]
    InactiveAccount,
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Email is not registered")]
    UnknownEmail,
    #[error("Account is inactive")]
    InactiveRecipient,
    #[error("Invalid or expired code")]
    InvalidCode,
    #[error("Invalid or expired reset token")]
    InvalidResetToken,
    #[error("New password and confirmation do not match")]
    PasswordMismatch,
    #[error("No tokens provided")]
    MissingTokens,
    #[error("Token is already invalidated")]
    AlreadyInvalidated,
    #[error("Failed to deliver code")]
    DeliveryFailed,
    #[error("Internal error")]
    InternalError,
}

impl ApiErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiErrorCode::InvalidCredentials
            | ApiErrorCode::InactiveAccount
            | ApiErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiErrorCode::UnknownEmail
            | ApiErrorCode::InactiveRecipient
            | ApiErrorCode::InvalidCode
            | ApiErrorCode::InvalidResetToken
            | ApiErrorCode::PasswordMismatch
            | ApiErrorCode::MissingTokens
            | ApiErrorCode::AlreadyInvalidated => StatusCode::BAD_REQUEST,
            ApiErrorCode::DeliveryFailed | ApiErrorCode::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn internal<E: std::fmt::Display>(error: E) -> ApiErrorCode {
        warn!("Internal error: {}", error);
        ApiErrorCode::InternalError
    }

    /// Collapse a verification failure into the one unauthorized answer,
    /// keeping the real reason for the logs.
    pub fn unauthorized(error: TokenError) -> ApiErrorCode {
        warn!("token verification failed: {}", error);
        ApiErrorCode::Unauthorized
    }
}

impl reject::Reject for ApiErrorCode {}

impl From<AuthError> for ApiErrorCode {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::InvalidCredentials => ApiErrorCode::InvalidCredentials,
            AuthError::InactiveAccount => ApiErrorCode::InactiveAccount,
            AuthError::Token(e) => match e {
                TokenError::Internal(msg) => ApiErrorCode::internal(msg),
                // A store outage during verification is fail-closed.
                other => ApiErrorCode::unauthorized(other),
            },
            AuthError::UnknownEmail => ApiErrorCode::UnknownEmail,
            AuthError::InvalidCode => ApiErrorCode::InvalidCode,
            AuthError::InvalidResetToken => ApiErrorCode::InvalidResetToken,
            AuthError::PasswordMismatch => ApiErrorCode::PasswordMismatch,
            AuthError::MissingTokens => ApiErrorCode::MissingTokens,
            AuthError::AlreadyInvalidated => ApiErrorCode::AlreadyInvalidated,
            AuthError::Delivery(e) => {
                error!("otp delivery failed: {}", e);
                ApiErrorCode::DeliveryFailed
            }
            AuthError::StoreUnavailable(e) => ApiErrorCode::internal(e),
            AuthError::Internal(e) => ApiErrorCode::internal(e),
        }
    }
}
