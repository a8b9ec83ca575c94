use axum::extract::Form;
use axum::http::header;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Extension;
use serde::{Deserialize, Serialize};

use crate::api::banking::BANKING_URI;
use crate::api::views::Page;
use crate::api::ApiError;
use crate::auth::Authenticator;
use crate::mask;
use crate::session::{self, Session};

pub const LOGIN_URI: &str = "/login";

/// Handler for `GET /login`
pub async fn login_form() -> Page {
    Page::Login { error: None }
}

/// Handler for `POST /login`
pub async fn login(
    session: Session,
    Extension(authenticator): Extension<Authenticator>,
    Form(request): Form<LoginRequest>,
) -> Response {
    if let Err(e) = authenticator.verify(&request.username, &request.password) {
        tracing::debug!(
            username = mask::username(&request.username).as_str(),
            reason = %e,
            "login refused"
        );
        return Page::Login {
            error: Some(e.to_string()),
        }
        .into_response();
    }

    tracing::debug!(
        username = mask::username(&request.username).as_str(),
        "user logged in"
    );

    let username = request.username;
    session.save(|state| state.username = Some(username)).await;

    Redirect::to(BANKING_URI).into_response()
}

/// Handler for `POST /logout`
pub async fn logout(session: Session) -> Result<Response, ApiError> {
    let username = session.state().await.username.unwrap_or_default();

    session.destroy().await?;

    tracing::debug!(username = mask::username(&username).as_str(), "user logged out");

    Ok((
        [(header::SET_COOKIE, session::expired_session_cookie())],
        Redirect::to(LOGIN_URI),
    )
        .into_response())
}

/// Body for `POST /login`
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}
