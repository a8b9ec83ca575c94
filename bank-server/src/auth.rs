use std::sync::Arc;

use axum::{
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use bank_core::{Credentials, LoginError, PasswordCheck};

use crate::session::Session;

/// Checks login attempts against the credentials loaded at startup.
#[derive(Clone)]
pub struct Authenticator {
    credentials: Arc<Credentials>,
    check: PasswordCheck,
}

impl Authenticator {
    pub fn new(credentials: Credentials, check: PasswordCheck) -> Self {
        Self {
            credentials: Arc::new(credentials),
            check,
        }
    }

    pub fn verify(&self, username: &str, password: &str) -> Result<(), LoginError> {
        self.credentials.verify(username, password, self.check)
    }
}

/// Rejects requests whose session has no logged in user with
/// `403 Forbidden`.
pub async fn require_user<B>(req: Request<B>, next: Next<B>) -> Result<Response, StatusCode> {
    let session = req
        .extensions()
        .get::<Session>()
        .cloned()
        .ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;

    if !session.state().await.is_authenticated() {
        tracing::trace!(uri = %req.uri(), "rejecting unauthenticated request");
        return Err(StatusCode::FORBIDDEN);
    }

    Ok(next.run(req).await)
}
