use super::error::*;
use super::handler;
use crate::application_port::TokenService;
use crate::domain_model::{Identity, TokenKind};
use crate::server::Server;
use std::convert::Infallible;
use std::sync::Arc;
use warp::{Filter, reject};

pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let login = warp::post()
        .and(warp::path("login"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with(server.auth_service.clone()))
        .and_then(handler::login);

    let refresh = warp::post()
        .and(warp::path("refresh"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with(server.auth_service.clone()))
        .and_then(handler::refresh);

    let send_otp = warp::post()
        .and(warp::path("send-otp"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with(server.auth_service.clone()))
        .and_then(handler::send_otp);

    let verify_otp = warp::post()
        .and(warp::path("verify-otp"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with(server.auth_service.clone()))
        .and_then(handler::verify_otp);

    let reset_password = warp::post()
        .and(warp::path("reset-password"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with(server.auth_service.clone()))
        .and_then(handler::reset_password);

    let logout = warp::post()
        .and(warp::path("logout"))
        .and(warp::path::end())
        .and(warp::header::optional::<String>("authorization"))
        .and(warp::header::optional::<String>("refresh-token"))
        .and(with(server.auth_service.clone()))
        .and_then(handler::logout);

    let me = warp::get()
        .and(warp::path("me"))
        .and(warp::path::end())
        .and(with_verification(server.token_service.clone()))
        .and_then(handler::me);

    login
        .or(refresh)
        .or(send_otp)
        .or(verify_otp)
        .or(reset_password)
        .or(logout)
        .or(me)
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}

fn with_verification(
    token_service: Arc<dyn TokenService>,
) -> impl Filter<Extract = (Identity,), Error = warp::Rejection> + Clone {
    warp::header::<String>("authorization").and_then(move |header: String| {
        let token_service = token_service.clone();
        async move {
            if let Some(token) = header.strip_prefix("Bearer ") {
                let identity = token_service
                    .verify(token, TokenKind::Access)
                    .await
                    .map_err(ApiErrorCode::unauthorized)
                    .map_err(reject::custom)?;
                Ok(identity)
            } else {
                Err(reject::custom(ApiErrorCode::Unauthorized))
            }
        }
    })
}
