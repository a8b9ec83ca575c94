use std::fmt::Write;

use axum::response::{Html, IntoResponse, Response};
use bank_core::Account;

use crate::session::Notice;

pub const INSUFFICIENT_FUNDS: &str = "Insufficient Funds";
pub const UNKNOWN_ACCOUNT: &str = "This account does not exist. Enter a valid account number";

/// Server-rendered pages. Every page shares one layout; text from users or
/// the ledger is escaped before it is written out.
#[derive(Debug, Clone)]
pub enum Page {
    Login {
        error: Option<String>,
    },
    Banking {
        username: String,
        notice: Option<Notice>,
        error: Option<String>,
    },
    Balance {
        account_no: String,
        account: Option<Account>,
    },
    Deposit {
        account_no: String,
    },
    OpenAccount,
    Withdrawal {
        account_no: String,
    },
    Error {
        message: String,
    },
}

impl Page {
    pub fn title(&self) -> &'static str {
        match self {
            Page::Login { .. } => "Login",
            Page::Banking { .. } => "Banking",
            Page::Balance { .. } => "Balance",
            Page::Deposit { .. } => "Deposit",
            Page::OpenAccount => "Open Account",
            Page::Withdrawal { .. } => "Withdrawal",
            Page::Error { .. } => "Error",
        }
    }

    pub fn render(&self) -> String {
        let mut body = String::new();
        match self {
            Page::Login { error } => {
                error_banner(&mut body, error.as_deref());
                body.push_str(concat!(
                    r#"<form method="post" action="/login">"#,
                    r#"<label>Username <input type="text" name="username"></label>"#,
                    r#"<label>Password <input type="password" name="password"></label>"#,
                    r#"<button type="submit">Login</button>"#,
                    "</form>"
                ));
            }
            Page::Banking {
                username,
                notice,
                error,
            } => {
                let _ = write!(body, "<h2>Welcome, {}</h2>", escape(username));
                match notice {
                    Some(Notice::AccountOpened(account)) => {
                        let _ = write!(
                            body,
                            r#"<p class="notice">Your new {} account number is <strong>{}</strong></p>"#,
                            escape(&account.account_type),
                            account.account_no
                        );
                    }
                    Some(Notice::InsufficientFunds) => {
                        error_banner(&mut body, Some(INSUFFICIENT_FUNDS));
                    }
                    None => {}
                }
                error_banner(&mut body, error.as_deref());
                body.push_str(concat!(
                    r#"<form method="post" action="/banking">"#,
                    r#"<label>Account number <input type="text" name="account"></label>"#,
                    r#"<select name="option">"#,
                    r#"<option value="balance">Balance</option>"#,
                    r#"<option value="deposit">Deposit</option>"#,
                    r#"<option value="withdrawal">Withdrawal</option>"#,
                    r#"<option value="account">Open an account</option>"#,
                    "</select>",
                    r#"<button type="submit">Submit</button>"#,
                    "</form>",
                    r#"<form method="post" action="/logout">"#,
                    r#"<button type="submit">Logout</button>"#,
                    "</form>"
                ));
            }
            Page::Balance {
                account_no,
                account,
            } => {
                let (account_type, balance) = match account {
                    Some(account) => (
                        escape(&account.account_type),
                        account.account_balance.to_string(),
                    ),
                    None => (String::new(), String::new()),
                };
                let _ = write!(
                    body,
                    concat!(
                        "<dl>",
                        "<dt>Account number</dt><dd>{}</dd>",
                        "<dt>Account type</dt><dd>{}</dd>",
                        r#"<dt>Balance</dt><dd class="balance">{}</dd>"#,
                        "</dl>"
                    ),
                    escape(account_no),
                    account_type,
                    balance
                );
                cancel_form(&mut body, "Back");
            }
            Page::Deposit { account_no } => {
                amount_form(&mut body, "/deposit", "depositAmount", account_no, "Deposit");
            }
            Page::OpenAccount => {
                body.push_str(concat!(
                    r#"<form method="post" action="/account">"#,
                    r#"<label><input type="radio" name="option" value="savings" checked> Savings</label>"#,
                    r#"<label><input type="radio" name="option" value="checking"> Checking</label>"#,
                    r#"<button type="submit">Open</button>"#,
                    "</form>"
                ));
                cancel_form(&mut body, "Cancel");
            }
            Page::Withdrawal { account_no } => {
                amount_form(
                    &mut body,
                    "/withdrawal",
                    "withdrawalAmount",
                    account_no,
                    "Withdraw",
                );
            }
            Page::Error { message } => {
                error_banner(&mut body, Some(message.as_str()));
                cancel_form(&mut body, "Back");
            }
        }
        layout(self.title(), &body)
    }
}

impl IntoResponse for Page {
    fn into_response(self) -> Response {
        Html(self.render()).into_response()
    }
}

fn layout(title: &str, body: &str) -> String {
    format!(
        concat!(
            "<!DOCTYPE html>\n",
            "<html lang=\"en\">\n",
            "<head><meta charset=\"utf-8\"><title>{title} | Bank</title></head>\n",
            "<body>\n<h1>{title}</h1>\n{body}\n</body>\n",
            "</html>\n"
        ),
        title = title,
        body = body
    )
}

fn error_banner(body: &mut String, message: Option<&str>) {
    if let Some(message) = message {
        let _ = write!(body, r#"<p class="error">{}</p>"#, escape(message));
    }
}

fn amount_form(body: &mut String, action: &str, field: &str, account_no: &str, label: &str) {
    let _ = write!(
        body,
        concat!(
            r#"<form method="post" action="{action}">"#,
            r#"<p>Account number {account_no}</p>"#,
            r#"<input type="hidden" name="account" value="{account_no}">"#,
            r#"<label>Amount <input type="number" step="0.01" min="0" name="{field}"></label>"#,
            r#"<button type="submit">{label}</button>"#,
            "</form>"
        ),
        action = action,
        account_no = escape(account_no),
        field = field,
        label = label
    );
    cancel_form(body, "Cancel");
}

fn cancel_form(body: &mut String, label: &str) {
    let _ = write!(
        body,
        r#"<form method="post" action="/cancel"><button type="submit">{}</button></form>"#,
        label
    );
}

/// Escapes text for use in HTML element content and attribute values.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}
