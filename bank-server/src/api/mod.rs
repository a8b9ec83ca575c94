use axum::{
    handler::Handler,
    http::{StatusCode, Uri},
    middleware,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Extension, Router,
};
use miette::Diagnostic;
use thiserror::Error;

use crate::{
    auth::{self, Authenticator},
    repository::{Repository, RepositoryError},
    session::{self, SessionError, SessionStore},
};

pub mod banking;
pub mod login;
pub mod views;

use views::Page;

pub const HEALTH_URI: &str = "/health";

#[derive(Error, Diagnostic, Debug)]
pub enum ApiError {
    #[error("repository error")]
    #[diagnostic(code(bank::error::repository))]
    Repository(#[from] RepositoryError),
    #[error("session error")]
    #[diagnostic(code(bank::error::session))]
    Session(#[from] SessionError),
    #[error("'{0}' is not a valid account number")]
    #[diagnostic(code(bank::error::not_found))]
    UnknownAccount(String),
    #[error("'{0}' is not a valid amount")]
    #[diagnostic(code(bank::error::bad_argument))]
    InvalidAmount(String),
}

pub fn build(
    repository: Repository,
    authenticator: Authenticator,
    sessions: SessionStore,
) -> Router {
    Router::new()
        .route("/banking", get(banking::landing).post(banking::dispatch))
        .route("/balance/:account", get(banking::balance))
        .route("/deposit/:account", get(banking::deposit_form))
        .route("/deposit", post(banking::deposit))
        .route(
            "/account",
            get(banking::open_account_form).post(banking::open_account),
        )
        .route("/withdrawal/:account", get(banking::withdrawal_form))
        .route("/withdrawal", post(banking::withdraw))
        .route_layer(middleware::from_fn(auth::require_user))
        .route("/", get(index_handler))
        .route("/login", get(login::login_form).post(login::login))
        .route("/logout", post(login::logout))
        .route("/cancel", post(banking::cancel))
        .route(HEALTH_URI, get(health_handler))
        .fallback(not_found_handler.into_service())
        .layer(middleware::from_fn(session::session_middleware))
        .layer(Extension(repository))
        .layer(Extension(authenticator))
        .layer(Extension(sessions))
}

async fn index_handler() -> Redirect {
    Redirect::to("/login")
}

async fn health_handler() -> &'static str {
    "UP"
}

async fn not_found_handler(uri: Uri) -> impl IntoResponse {
    tracing::trace!(uri = %uri, "no route");
    (
        StatusCode::NOT_FOUND,
        Page::Error {
            message: format!("{} was not found", uri.path()),
        },
    )
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Repository(RepositoryError::NotFound { account_no }) => (
                StatusCode::NOT_FOUND,
                format!("Account {} does not exist", account_no),
            ),
            ApiError::UnknownAccount(account) => (
                StatusCode::NOT_FOUND,
                format!("Account {} does not exist", account),
            ),
            ApiError::InvalidAmount(amount)
            | ApiError::Repository(RepositoryError::InvalidAmount { amount }) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("'{}' is not a valid amount", amount),
            ),
            e => {
                tracing::error!(err = format!("{:?}", e), "request failed");
                return (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
                    .into_response();
            }
        };

        (status, Page::Error { message }).into_response()
    }
}
