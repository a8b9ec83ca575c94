use crate::TestApp;

#[test_log::test(tokio::test(flavor = "multi_thread"))]
pub async fn login_page_renders_form() {
    let (_app, mut client) = TestApp::start_and_connect().await;

    let response = client.get("/login").await.unwrap();

    assert_eq!(200, response.status.as_u16());
    assert!(response.body.contains(r#"action="/login""#));
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
pub async fn registered_users_log_in() {
    for (username, password) in [("alice", "wonderland"), ("bob", "builder")] {
        let (_app, mut client) = TestApp::start_and_connect().await;

        let response = client.login(username, password).await.unwrap();
        assert!(response.is_redirect_to("/banking"));

        let banking = client.get("/banking").await.unwrap();
        assert_eq!(200, banking.status.as_u16());
        assert!(banking.body.contains(&format!("Welcome, {}", username)));
    }
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
pub async fn unknown_username_is_refused() {
    let (_app, mut client) = TestApp::start_and_connect().await;

    let response = client.login("mallory", "wonderland").await.unwrap();

    assert_eq!(200, response.status.as_u16());
    assert!(response.body.contains("Not a registered username"));
    assert_eq!(403, client.get("/banking").await.unwrap().status.as_u16());
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
pub async fn password_outside_password_set_is_refused() {
    let (_app, mut client) = TestApp::start_and_connect().await;

    let response = client.login("alice", "looking-glass").await.unwrap();

    assert!(response.body.contains("Invalid password"));
    assert_eq!(403, client.get("/banking").await.unwrap().status.as_u16());
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
pub async fn blank_fields_are_refused() {
    let (_app, mut client) = TestApp::start_and_connect().await;

    let response = client.login("alice", "").await.unwrap();
    assert!(response.body.contains("Enter both username and password"));

    let response = client.post_form("/login", &[]).await.unwrap();
    assert!(response.body.contains("Enter both username and password"));
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
pub async fn any_registered_password_is_accepted() {
    let (_app, mut client) = TestApp::start_and_connect().await;

    let response = client.login("alice", "builder").await.unwrap();

    assert!(response.is_redirect_to("/banking"));
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
pub async fn logout_ends_the_session() {
    let (_app, mut client) = TestApp::start_and_connect().await;
    client.login("alice", "wonderland").await.unwrap();

    let response = client.post_form("/logout", &[]).await.unwrap();

    assert!(response.is_redirect_to("/login"));
    assert!(!client.has_session());
    assert_eq!(403, client.get("/banking").await.unwrap().status.as_u16());
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
pub async fn protected_pages_are_forbidden_without_login() {
    let (app, mut client) = TestApp::start_and_connect().await;

    for path in [
        "/banking",
        "/balance/0000001",
        "/deposit/0000001",
        "/account",
        "/withdrawal/0000001",
    ] {
        let response = client.get(path).await.unwrap();
        assert_eq!(403, response.status.as_u16(), "GET {}", path);
    }

    let forms: [(&str, &[(&str, &str)]); 4] = [
        ("/banking", &[("option", "balance"), ("account", "0000001")]),
        ("/deposit", &[("account", "0000001"), ("depositAmount", "50")]),
        ("/account", &[("option", "checking")]),
        (
            "/withdrawal",
            &[("account", "0000001"), ("withdrawalAmount", "40")],
        ),
    ];
    for (path, form) in forms {
        let response = client.post_form(path, form).await.unwrap();
        assert_eq!(403, response.status.as_u16(), "POST {}", path);
    }

    assert_eq!(crate::LEDGER_JSON, app.ledger_text());
}
