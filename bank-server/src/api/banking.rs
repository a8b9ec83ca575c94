use axum::extract::{Form, Path};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Extension;
use bank_core::{amount, AccountNo, Withdrawal};
use serde::{Deserialize, Serialize};

use crate::api::views::{Page, UNKNOWN_ACCOUNT};
use crate::api::ApiError;
use crate::repository::Repository;
use crate::session::{OpenedAccount, Session};

pub const BANKING_URI: &str = "/banking";

/// Handler for `GET /banking`
///
/// Shows (and clears) any pending notice from the previous action.
pub async fn landing(session: Session) -> Result<Page, ApiError> {
    let (username, notice) = session
        .update(|state| (state.username.clone().unwrap_or_default(), state.take_notice()))
        .await?;

    Ok(Page::Banking {
        username,
        notice,
        error: None,
    })
}

/// Handler for `POST /banking`
///
/// Sends the user to the page for the chosen option, after checking the
/// account exists for every option except opening a new account.
pub async fn dispatch(
    session: Session,
    Extension(repository): Extension<Repository>,
    Form(request): Form<DispatchRequest>,
) -> Result<Response, ApiError> {
    let option = match request.option.as_str() {
        "account" => return Ok(Redirect::to("/account").into_response()),
        option @ ("balance" | "deposit" | "withdrawal") => option,
        option => {
            tracing::debug!(option = option, "unsupported banking option");
            return Ok(banking_error(&session, "Choose a valid option").await);
        }
    };

    let exists = match request.account.parse::<AccountNo>() {
        Ok(account_no) => repository.account_exists(&account_no).await?,
        Err(_) => false,
    };

    if !exists {
        return Ok(banking_error(&session, UNKNOWN_ACCOUNT).await);
    }

    Ok(Redirect::to(&format!("/{}/{}", option, request.account)).into_response())
}

async fn banking_error(session: &Session, message: &str) -> Response {
    Page::Banking {
        username: session.state().await.username.unwrap_or_default(),
        notice: None,
        error: Some(message.to_string()),
    }
    .into_response()
}

/// Handler for `GET /balance/:account`
///
/// An unknown account renders the page with nothing to show.
pub async fn balance(
    Path(account): Path<String>,
    Extension(repository): Extension<Repository>,
) -> Result<Page, ApiError> {
    let record = match account.parse::<AccountNo>() {
        Ok(account_no) => repository.read_account(&account_no).await?,
        Err(_) => None,
    };

    Ok(Page::Balance {
        account_no: account,
        account: record,
    })
}

/// Handler for `GET /deposit/:account`
pub async fn deposit_form(Path(account): Path<String>) -> Page {
    Page::Deposit {
        account_no: account,
    }
}

/// Handler for `GET /withdrawal/:account`
pub async fn withdrawal_form(Path(account): Path<String>) -> Page {
    Page::Withdrawal {
        account_no: account,
    }
}

/// Handler for `GET /account`
pub async fn open_account_form() -> Page {
    Page::OpenAccount
}

/// Handler for `POST /deposit`
pub async fn deposit(
    Extension(repository): Extension<Repository>,
    Form(request): Form<DepositRequest>,
) -> Result<Redirect, ApiError> {
    let account_no = parse_account_no(&request.account)?;
    let amount = amount::parse_amount(&request.deposit_amount)
        .map_err(|_| ApiError::InvalidAmount(request.deposit_amount.clone()))?;

    repository.deposit(&account_no, amount).await?;

    Ok(Redirect::to(BANKING_URI))
}

/// Handler for `POST /withdrawal`
///
/// A withdrawal that would not leave a positive balance is refused and the
/// banking page warns about insufficient funds.
pub async fn withdraw(
    session: Session,
    Extension(repository): Extension<Repository>,
    Form(request): Form<WithdrawalRequest>,
) -> Result<Redirect, ApiError> {
    let account_no = parse_account_no(&request.account)?;
    let amount = amount::parse_amount(&request.withdrawal_amount)
        .map_err(|_| ApiError::InvalidAmount(request.withdrawal_amount.clone()))?;

    let withdrawal = repository.withdraw(&account_no, amount).await?;
    let limit_fund = matches!(withdrawal, Withdrawal::InsufficientFunds { .. });

    session.save(|state| state.limit_fund = limit_fund).await;

    Ok(Redirect::to(BANKING_URI))
}

/// Handler for `POST /account`
pub async fn open_account(
    session: Session,
    Extension(repository): Extension<Repository>,
    Form(request): Form<OpenAccountRequest>,
) -> Result<Redirect, ApiError> {
    let account_no = repository.open_account(&request.option).await?;

    tracing::debug!(
        account_no = %account_no,
        account_type = request.option.as_str(),
        "account opened"
    );

    session
        .save(|state| {
            state.account = Some(OpenedAccount {
                account_type: request.option,
                account_no,
            })
        })
        .await;

    Ok(Redirect::to(BANKING_URI))
}

/// Handler for `POST /cancel`
pub async fn cancel() -> Redirect {
    Redirect::to(BANKING_URI)
}

fn parse_account_no(account: &str) -> Result<AccountNo, ApiError> {
    account
        .parse()
        .map_err(|_| ApiError::UnknownAccount(account.to_string()))
}

/// Body for `POST /banking`
#[derive(Debug, Serialize, Deserialize)]
pub struct DispatchRequest {
    #[serde(default)]
    pub option: String,
    #[serde(default)]
    pub account: String,
}

/// Body for `POST /deposit`
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositRequest {
    #[serde(default)]
    pub deposit_amount: String,
    #[serde(default)]
    pub account: String,
}

/// Body for `POST /withdrawal`
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalRequest {
    #[serde(default)]
    pub withdrawal_amount: String,
    #[serde(default)]
    pub account: String,
}

/// Body for `POST /account`
#[derive(Debug, Serialize, Deserialize)]
pub struct OpenAccountRequest {
    #[serde(default)]
    pub option: String,
}
