use std::net::SocketAddr;
use std::time::Duration;

use argh::FromArgs;
use bank_core::{
    Credentials, LedgerStore, PasswordCheck, CREDENTIALS_FILE_ENV, LEDGER_FILE_ENV,
};
use camino::Utf8PathBuf;
use dotenv::dotenv;
use miette::{Diagnostic, IntoDiagnostic, Result};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::{api, auth::Authenticator, jobs, repository::Repository, session::SessionStore};

pub struct App {
    args: Args,
}

#[derive(Error, Diagnostic, Debug)]
pub enum AppError {
    #[error("failed to load credentials from {path}")]
    #[diagnostic(
        code(bank::error::credentials),
        help("the credentials file is a JSON object mapping usernames to passwords")
    )]
    CredentialsError {
        path: Utf8PathBuf,
        #[source]
        source: bank_core::Error,
    },
}

impl App {
    pub fn new() -> Self {
        Self::with_args(argh::from_env())
    }

    pub fn with_args(args: Args) -> Self {
        Self { args }
    }

    pub async fn run(&self) -> Result<()> {
        dotenv().ok();

        miette::set_panic_hook();

        if std::env::var_os("RUST_BACKTRACE").is_none() {
            std::env::set_var("RUST_BACKTRACE", "1")
        }

        if std::env::var_os("RUST_LOG").is_none() {
            std::env::set_var("RUST_LOG", "bank_server=debug,bank_core=debug,tower_http=debug")
        }

        if self.args.json {
            tracing_subscriber::fmt::fmt()
                .json()
                .with_env_filter(EnvFilter::from_default_env())
                .try_init()
                .ok();
        } else {
            tracing_subscriber::fmt::fmt()
                .with_env_filter(EnvFilter::from_default_env())
                .try_init()
                .ok();
        }

        let credentials = Credentials::load(&self.args.credentials_file)
            .await
            .map_err(|source| AppError::CredentialsError {
                path: self.args.credentials_file.clone(),
                source,
            })?;

        let password_check = if self.args.strict_passwords {
            PasswordCheck::SameUser
        } else {
            tracing::debug!("any registered password is accepted for any username");
            PasswordCheck::AnyUser
        };
        let authenticator = Authenticator::new(credentials, password_check);

        let store = LedgerStore::new(self.args.ledger_file.clone());
        match store.load().await {
            Ok(ledger) => tracing::debug!(
                path = store.path().as_str(),
                accounts = ledger.len(),
                last_id = %ledger.last_id(),
                "using ledger"
            ),
            Err(e) => tracing::warn!(
                path = store.path().as_str(),
                err = %e,
                "ledger is not readable, account operations will fail until it is"
            ),
        }
        let repository = Repository::new(store);

        let sessions = SessionStore::new(Duration::from_secs(self.args.session_ttl_secs));

        let mut sweep_sessions_job: Option<jobs::SweepSessions> = None;

        if !self.args.disable_background_jobs {
            sweep_sessions_job = Some(jobs::SweepSessions::with_store(
                sessions.clone(),
                Duration::from_secs(self.args.session_sweep_secs.max(1)),
            ));
        } else {
            tracing::debug!("background jobs disabled, expired sessions will not be swept");
        }

        let router = api::build(repository, authenticator, sessions);

        tracing::debug!(
            ip = self.args.listen_address.ip().to_string().as_str(),
            port = self.args.listen_address.port(),
            url = format!(
                "http://{}:{}/login",
                self.args.listen_address.ip(),
                self.args.listen_address.port()
            ),
            "server started"
        );

        if let Some(job) = sweep_sessions_job.as_mut() {
            job.spawn().await;
        }

        let server = axum::Server::bind(&self.args.listen_address)
            .serve(router.into_make_service_with_connect_info::<SocketAddr>());

        let graceful = server.with_graceful_shutdown(shutdown_signal(sweep_sessions_job.as_mut()));
        graceful.await.into_diagnostic()?;

        tracing::debug!("server terminated");

        Ok(())
    }
}

async fn shutdown_signal(sweep_sessions_job: Option<&mut jobs::SweepSessions>) {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to handle Ctrl-C signal");
    tracing::info!("ctrl-c received");

    if let Some(sweep_sessions_job) = sweep_sessions_job {
        sweep_sessions_job.stop().await;
    }
}

#[derive(FromArgs)]
/// The bank server.
pub struct Args {
    /// server address:port to listen on (default: 0.0.0.0:3000, PORT environment variable can override default port 3000)
    #[argh(
        option,
        default = "SocketAddr::from(([0, 0, 0, 0], default_listen_port()))"
    )]
    pub listen_address: SocketAddr,
    /// path to the JSON ledger file (default: accounts.json, or LEDGER_FILE environment variable)
    #[argh(option, default = "default_ledger_file()")]
    pub ledger_file: Utf8PathBuf,
    /// path to the JSON credentials file (default: user.json, or CREDENTIALS_FILE environment variable)
    #[argh(option, default = "default_credentials_file()")]
    pub credentials_file: Utf8PathBuf,
    /// seconds of inactivity after which a session expires (default: 86400, or SESSION_TTL_SECS environment variable)
    #[argh(option, default = "default_secs(SESSION_TTL_ENV)")]
    pub session_ttl_secs: u64,
    /// seconds between sweeps for expired sessions (default: 86400, or SESSION_SWEEP_SECS environment variable)
    #[argh(option, default = "default_secs(SESSION_SWEEP_ENV)")]
    pub session_sweep_secs: u64,
    /// only accept the password registered for the given username
    #[argh(switch)]
    pub strict_passwords: bool,
    /// use JSON for log messages
    #[argh(switch)]
    pub json: bool,
    /// disable background jobs
    #[argh(switch)]
    pub disable_background_jobs: bool,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            listen_address: SocketAddr::from(([127, 0, 0, 1], default_listen_port())),
            ledger_file: default_ledger_file(),
            credentials_file: default_credentials_file(),
            session_ttl_secs: default_secs(SESSION_TTL_ENV),
            session_sweep_secs: default_secs(SESSION_SWEEP_ENV),
            strict_passwords: false,
            json: false,
            disable_background_jobs: false,
        }
    }
}

const DEFAULT_LISTEN_PORT: u16 = 3000;

fn default_listen_port() -> u16 {
    if let Ok(port_str) = std::env::var("PORT") {
        if let Ok(port) = port_str.parse() {
            tracing::debug!("using port from PORT environment variable");
            port
        } else {
            DEFAULT_LISTEN_PORT
        }
    } else {
        DEFAULT_LISTEN_PORT
    }
}

const DEFAULT_LEDGER_FILE: &str = "accounts.json";

fn default_ledger_file() -> Utf8PathBuf {
    if let Ok(value) = std::env::var(LEDGER_FILE_ENV) {
        value.into()
    } else {
        DEFAULT_LEDGER_FILE.into()
    }
}

const DEFAULT_CREDENTIALS_FILE: &str = "user.json";

fn default_credentials_file() -> Utf8PathBuf {
    if let Ok(value) = std::env::var(CREDENTIALS_FILE_ENV) {
        value.into()
    } else {
        DEFAULT_CREDENTIALS_FILE.into()
    }
}

const SESSION_TTL_ENV: &str = "SESSION_TTL_SECS";
const SESSION_SWEEP_ENV: &str = "SESSION_SWEEP_SECS";
const DEFAULT_SESSION_SECS: u64 = 86400;

fn default_secs(name: &str) -> u64 {
    if let Ok(value) = std::env::var(name) {
        value.parse().ok().unwrap_or(DEFAULT_SESSION_SECS)
    } else {
        DEFAULT_SESSION_SECS
    }
}
