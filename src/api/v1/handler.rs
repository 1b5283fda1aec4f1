use super::error::*;
use crate::application_port::{
    AuthService, LoginInput, ResetPasswordInput, SessionOutput,
};
use crate::domain_model::{Identity, UserId, UserRole};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::{self, reject};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(code: ApiErrorCode, message: impl Into<String>) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(ApiError {
                code,
                message: message.into(),
            }),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub access_token: String,
    pub access_token_expires_at: DateTime<Utc>,
    pub refresh_token: String,
    pub refresh_token_expires_at: DateTime<Utc>,
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    pub role: UserRole,
}

impl From<SessionOutput> for SessionResponse {
    fn from(session: SessionOutput) -> Self {
        SessionResponse {
            access_token: session.tokens.access_token.token,
            access_token_expires_at: session.tokens.access_token.expires_at,
            refresh_token: session.tokens.refresh_token.token,
            refresh_token_expires_at: session.tokens.refresh_token.expires_at,
            user_id: session.user.user_id,
            username: session.user.username,
            email: session.user.email,
            role: session.user.role,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

pub async fn login(
    body: LoginRequest,
    auth_service: Arc<dyn AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let session = auth_service
        .login(LoginInput {
            username: body.username,
            password: body.password,
        })
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(SessionResponse::from(
        session,
    ))))
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

pub async fn refresh(
    body: RefreshRequest,
    auth_service: Arc<dyn AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let session = auth_service
        .refresh(&body.refresh_token)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(SessionResponse::from(
        session,
    ))))
}

#[derive(Debug, Deserialize)]
pub struct SendOtpRequest {
    pub to: String,
}

#[derive(Debug, Serialize)]
pub struct SendOtpResponse;

pub async fn send_otp(
    body: SendOtpRequest,
    auth_service: Arc<dyn AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    auth_service
        .send_otp(&body.to)
        .await
        .map_err(|e| match e {
            // For recovery the inactive answer is a bad request, not an
            // authentication failure.
            crate::application_port::AuthError::InactiveAccount => ApiErrorCode::InactiveRecipient,
            other => ApiErrorCode::from(other),
        })
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(SendOtpResponse)))
}

#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyOtpResponse {
    pub reset_token: String,
}

pub async fn verify_otp(
    body: VerifyOtpRequest,
    auth_service: Arc<dyn AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let reset_token = auth_service
        .verify_otp(&body.email, &body.otp)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(VerifyOtpResponse {
        reset_token,
    })))
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub reset_token: String,
    pub new_password: String,
    pub confirm_password: String,
}

#[derive(Debug, Serialize)]
pub struct ResetPasswordResponse;

pub async fn reset_password(
    body: ResetPasswordRequest,
    auth_service: Arc<dyn AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    auth_service
        .reset_password(ResetPasswordInput {
            email: body.email,
            reset_token: body.reset_token,
            new_password: body.new_password,
            confirm_password: body.confirm_password,
        })
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(ResetPasswordResponse)))
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse;

pub async fn logout(
    authorization: Option<String>,
    refresh_header: Option<String>,
    auth_service: Arc<dyn AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let access_token = authorization
        .as_deref()
        .and_then(|h| h.strip_prefix("Bearer "));

    auth_service
        .logout(access_token, refresh_header.as_deref())
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(LogoutResponse)))
}

pub async fn me(identity: Identity) -> Result<impl warp::Reply, warp::Rejection> {
    Ok(warp::reply::json(&ApiResponse::ok(identity)))
}
