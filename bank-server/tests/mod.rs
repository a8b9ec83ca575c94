use std::{
    net::{Ipv4Addr, SocketAddr, SocketAddrV4, TcpListener},
    path::PathBuf,
    time::Duration,
};

use camino::Utf8PathBuf;
use reqwest::{header, redirect, StatusCode};
use serde_json::Value;
use tempfile::TempDir;
use thiserror::Error;
use url::Url;

use bank_server::app::{App, Args};
use bank_server::session::SESSION_COOKIE;

pub mod api;

pub const CREDENTIALS_JSON: &str = r#"{
  "alice": "wonderland",
  "bob": "builder"
}"#;

pub const LEDGER_JSON: &str = r#"{
  "0000001": {
    "accountType": "savings",
    "accountBalance": 100
  },
  "lastID": "0000001"
}"#;

pub struct TestApp {
    _dir: TempDir,
    ledger_path: PathBuf,
    url: Url,
}

#[derive(Error, Debug)]
pub enum TestError {
    #[error("failed to connect to test server: {0}")]
    ConnectError(#[source] reqwest::Error),
    #[error("failed to check test server health")]
    HealthCheckError,
    #[error("failed to parse URL: {0}")]
    UrlError(#[from] url::ParseError),
    #[error("failed to execute request: {0}")]
    RequestError(#[from] reqwest::Error),
}

impl TestApp {
    pub async fn start_and_connect() -> (Self, TestClient) {
        let app = Self::start().await;
        let client = app.connect().await.unwrap();
        (app, client)
    }

    pub async fn start() -> Self {
        let dir = tempfile::tempdir().expect("failed to create test directory");
        let ledger_path = dir.path().join("accounts.json");
        let credentials_path = dir.path().join("user.json");
        std::fs::write(&ledger_path, LEDGER_JSON).expect("failed to write test ledger");
        std::fs::write(&credentials_path, CREDENTIALS_JSON)
            .expect("failed to write test credentials");

        let port = next_available_port();
        let listen_address = SocketAddr::from(([127, 0, 0, 1], port));

        let app = App::with_args(Args {
            listen_address,
            ledger_file: Utf8PathBuf::from_path_buf(ledger_path.clone()).unwrap(),
            credentials_file: Utf8PathBuf::from_path_buf(credentials_path).unwrap(),
            disable_background_jobs: true,
            ..Args::default()
        });

        let _ = tokio::spawn(async move { app.run().await });

        let url =
            Url::parse(&format!("http://127.0.0.1:{}", port)).expect("failed to generate URL");

        Self {
            _dir: dir,
            ledger_path,
            url,
        }
    }

    pub async fn connect(&self) -> Result<TestClient, TestError> {
        let mut remaining_tries = 50;
        let client = reqwest::Client::builder()
            .redirect(redirect::Policy::none())
            .build()?;

        while remaining_tries > 0 {
            let result = client
                .request(reqwest::Method::GET, self.url.join("/health")?)
                .send()
                .await;
            match result {
                Ok(res) => {
                    if res.text().await?.trim() == "UP" {
                        break;
                    } else {
                        return Err(TestError::HealthCheckError);
                    }
                }
                Err(e) if e.is_connect() => {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    remaining_tries -= 1;
                }
                Err(e) => return Err(TestError::ConnectError(e)),
            }
        }

        Ok(TestClient(client, self.url.clone(), None))
    }

    /// Current contents of the ledger file.
    pub fn ledger(&self) -> Value {
        let raw = std::fs::read_to_string(&self.ledger_path).expect("failed to read ledger");
        serde_json::from_str(&raw).expect("ledger is not valid JSON")
    }

    pub fn ledger_text(&self) -> String {
        std::fs::read_to_string(&self.ledger_path).expect("failed to read ledger")
    }

    pub fn remove_ledger(&self) {
        std::fs::remove_file(&self.ledger_path).expect("failed to remove ledger");
    }
}

/// HTTP client carrying the session cookie between requests, like a browser.
pub struct TestClient(reqwest::Client, Url, Option<String>);

pub type TestResult<T> = Result<T, TestError>;

pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

impl TestResponse {
    pub fn is_redirect_to(&self, path: &str) -> bool {
        self.status == StatusCode::SEE_OTHER && self.location.as_deref() == Some(path)
    }
}

impl TestClient {
    pub async fn get(&mut self, path: &str) -> TestResult<TestResponse> {
        let req = self.0.request(reqwest::Method::GET, self.1.join(path)?);
        self.execute(req).await
    }

    pub async fn post_form(&mut self, path: &str, form: &[(&str, &str)]) -> TestResult<TestResponse> {
        let req = self
            .0
            .request(reqwest::Method::POST, self.1.join(path)?)
            .form(form);
        self.execute(req).await
    }

    pub async fn login(&mut self, username: &str, password: &str) -> TestResult<TestResponse> {
        self.post_form("/login", &[("username", username), ("password", password)])
            .await
    }

    pub fn has_session(&self) -> bool {
        self.2.is_some()
    }

    async fn execute(&mut self, mut req: reqwest::RequestBuilder) -> TestResult<TestResponse> {
        if let Some(cookie) = &self.2 {
            req = req.header(header::COOKIE, cookie.as_str());
        }
        let response = req.send().await?;

        for value in response.headers().get_all(header::SET_COOKIE) {
            if let Ok(value) = value.to_str() {
                self.remember_cookie(value);
            }
        }

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());
        let body = response.text().await?;

        tracing::debug!(status = status.as_u16(), location = ?location, "received response");

        Ok(TestResponse {
            status,
            location,
            body,
        })
    }

    fn remember_cookie(&mut self, set_cookie: &str) {
        let pair = set_cookie.split(';').next().unwrap_or_default().trim();
        if let Some((name, value)) = pair.split_once('=') {
            if name == SESSION_COOKIE {
                self.2 = if value.is_empty() {
                    None
                } else {
                    Some(pair.to_string())
                };
            }
        }
    }
}

fn next_available_port() -> u16 {
    for _ in 0..10 {
        if let Some(port) = bind_os_available_port() {
            return port;
        }
    }

    panic!("no port available")
}

fn bind_os_available_port() -> Option<u16> {
    TcpListener::bind(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0))
        .and_then(|l| l.local_addr())
        .map(|a| a.port())
        .ok()
}
