use serde_json::json;

use crate::{TestApp, TestClient, LEDGER_JSON};

async fn logged_in() -> (TestApp, TestClient) {
    let (app, mut client) = TestApp::start_and_connect().await;
    let response = client.login("alice", "wonderland").await.unwrap();
    assert!(response.is_redirect_to("/banking"));
    (app, client)
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
pub async fn withdrawing_entire_balance_is_refused() {
    let (app, mut client) = logged_in().await;

    let response = client
        .post_form(
            "/withdrawal",
            &[("account", "0000001"), ("withdrawalAmount", "100")],
        )
        .await
        .unwrap();

    assert!(response.is_redirect_to("/banking"));
    assert_eq!(LEDGER_JSON, app.ledger_text());

    let banking = client.get("/banking").await.unwrap();
    assert!(banking.body.contains("Insufficient Funds"));

    let banking = client.get("/banking").await.unwrap();
    assert!(!banking.body.contains("Insufficient Funds"));
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
pub async fn withdrawal_leaving_positive_balance_is_stored() {
    let (app, mut client) = logged_in().await;

    let response = client
        .post_form(
            "/withdrawal",
            &[("account", "0000001"), ("withdrawalAmount", "40")],
        )
        .await
        .unwrap();

    assert!(response.is_redirect_to("/banking"));
    assert_eq!(json!(60), app.ledger()["0000001"]["accountBalance"]);

    let banking = client.get("/banking").await.unwrap();
    assert!(!banking.body.contains("Insufficient Funds"));
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
pub async fn deposit_increases_balance() {
    let (app, mut client) = logged_in().await;

    let response = client
        .post_form(
            "/deposit",
            &[("account", "0000001"), ("depositAmount", "50")],
        )
        .await
        .unwrap();

    assert!(response.is_redirect_to("/banking"));
    assert_eq!(
        json!({
            "0000001": { "accountType": "savings", "accountBalance": 150 },
            "lastID": "0000001"
        }),
        app.ledger()
    );
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
pub async fn opening_account_issues_next_id() {
    let (app, mut client) = logged_in().await;

    let response = client
        .post_form("/account", &[("option", "checking")])
        .await
        .unwrap();

    assert!(response.is_redirect_to("/banking"));
    assert_eq!(
        json!({
            "0000001": { "accountType": "savings", "accountBalance": 100 },
            "0000002": { "accountType": "checking", "accountBalance": 0 },
            "lastID": "0000002"
        }),
        app.ledger()
    );

    let banking = client.get("/banking").await.unwrap();
    assert!(banking
        .body
        .contains("checking account number is <strong>0000002</strong>"));

    let banking = client.get("/banking").await.unwrap();
    assert!(!banking.body.contains("0000002"));
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
pub async fn balance_page_shows_account() {
    let (_app, mut client) = logged_in().await;

    let known = client.get("/balance/0000001").await.unwrap();
    assert_eq!(200, known.status.as_u16());
    assert!(known.body.contains("<dd>savings</dd>"));
    assert!(known.body.contains(r#"<dd class="balance">100</dd>"#));

    let unknown = client.get("/balance/0000042").await.unwrap();
    assert_eq!(200, unknown.status.as_u16());
    assert!(unknown.body.contains(r#"<dd class="balance"></dd>"#));
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
pub async fn dispatch_redirects_to_chosen_option() {
    let (_app, mut client) = logged_in().await;

    for (option, target) in [
        ("balance", "/balance/0000001"),
        ("deposit", "/deposit/0000001"),
        ("withdrawal", "/withdrawal/0000001"),
    ] {
        let response = client
            .post_form("/banking", &[("option", option), ("account", "0000001")])
            .await
            .unwrap();
        assert!(response.is_redirect_to(target), "option {}", option);
    }

    let response = client
        .post_form("/banking", &[("option", "account"), ("account", "")])
        .await
        .unwrap();
    assert!(response.is_redirect_to("/account"));
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
pub async fn dispatch_rejects_unknown_account() {
    let (_app, mut client) = logged_in().await;

    for account in ["0000042", "42", ""] {
        let response = client
            .post_form("/banking", &[("option", "deposit"), ("account", account)])
            .await
            .unwrap();
        assert_eq!(200, response.status.as_u16());
        assert!(response
            .body
            .contains("This account does not exist. Enter a valid account number"));
    }
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
pub async fn deposit_to_unknown_account_is_not_found() {
    let (app, mut client) = logged_in().await;

    let response = client
        .post_form(
            "/deposit",
            &[("account", "0000042"), ("depositAmount", "50")],
        )
        .await
        .unwrap();

    assert_eq!(404, response.status.as_u16());
    assert_eq!(LEDGER_JSON, app.ledger_text());
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
pub async fn non_numeric_amount_is_rejected() {
    let (app, mut client) = logged_in().await;

    let response = client
        .post_form(
            "/withdrawal",
            &[("account", "0000001"), ("withdrawalAmount", "lots")],
        )
        .await
        .unwrap();

    assert_eq!(422, response.status.as_u16());
    assert_eq!(LEDGER_JSON, app.ledger_text());
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
pub async fn deposit_overflowing_balance_is_rejected() {
    let (app, mut client) = logged_in().await;

    let deposit = [("account", "0000001"), ("depositAmount", "1e308")];
    let response = client.post_form("/deposit", &deposit).await.unwrap();
    assert!(response.is_redirect_to("/banking"));
    let saved = app.ledger_text();

    let response = client.post_form("/deposit", &deposit).await.unwrap();
    assert_eq!(422, response.status.as_u16());
    assert_eq!(saved, app.ledger_text());
    assert_eq!(
        Some(1e308),
        app.ledger()["0000001"]["accountBalance"].as_f64()
    );

    let response = client.get("/balance/0000001").await.unwrap();
    assert_eq!(200, response.status.as_u16());
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
pub async fn cancel_returns_to_banking() {
    let (_app, mut client) = logged_in().await;

    let response = client.post_form("/cancel", &[]).await.unwrap();

    assert!(response.is_redirect_to("/banking"));
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
pub async fn unreadable_ledger_is_internal_error() {
    let (app, mut client) = logged_in().await;
    app.remove_ledger();

    let response = client.get("/balance/0000001").await.unwrap();
    assert_eq!(500, response.status.as_u16());

    let response = client
        .post_form("/account", &[("option", "savings")])
        .await
        .unwrap();
    assert_eq!(500, response.status.as_u16());
}
