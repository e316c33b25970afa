//! End-to-end tests over the full router: session gate, CRUD flows, PDF
//! export. Backed by an in-memory SQLite database.

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::json;

use fakturist::config::Config;
use fakturist::routes;
use fakturist::state::AppState;

fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".into(),
        bind_addr: "127.0.0.1:0".into(),
        admin_username: "admin".into(),
        admin_password: "geheim".into(),
        reset_sequence_each_year: true,
        invoice_city: "Wien".into(),
        session_ttl_minutes: 60,
    }
}

async fn server() -> TestServer {
    let state = AppState::new(test_config()).await.unwrap();
    TestServer::builder()
        .save_cookies()
        .build(routes::router(state))
}

async fn login(server: &TestServer) {
    let response = server
        .post("/login")
        .form(&json!({"username": "admin", "password": "geheim"}))
        .await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/");
}

#[tokio::test]
async fn unauthenticated_requests_are_redirected_to_login() {
    let server = server().await;

    let response = server.get("/").await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/login");

    let response = server.get("/invoices/1").await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/login");
}

#[tokio::test]
async fn wrong_credentials_re_render_the_form_without_a_session() {
    let server = server().await;

    let response = server
        .post("/login")
        .form(&json!({"username": "admin", "password": "wrong"}))
        .await;
    response.assert_status_ok();
    assert!(response.text().contains("Invalid username or password"));

    // still locked out
    let response = server.get("/").await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/login");
}

#[tokio::test]
async fn login_then_dashboard() {
    let server = server().await;
    login(&server).await;

    let response = server.get("/").await;
    response.assert_status_ok();
    assert!(response.text().contains("Rechnungen"));
}

#[tokio::test]
async fn logout_invalidates_the_session() {
    let server = server().await;
    login(&server).await;

    let response = server.get("/logout").await;
    response.assert_status(StatusCode::SEE_OTHER);

    let response = server.get("/").await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/login");
}

#[tokio::test]
async fn missing_entities_return_404() {
    let server = server().await;
    login(&server).await;

    server.get("/invoices/9999").await.assert_status_not_found();
    server.get("/invoices/9999/pdf").await.assert_status_not_found();
    server.get("/clients/9999/edit").await.assert_status_not_found();
    server.post("/invoices/9999/delete").await.assert_status_not_found();
}

#[tokio::test]
async fn full_invoice_lifecycle() {
    let server = server().await;
    login(&server).await;

    // create a client
    let response = server
        .post("/clients/create")
        .form(&json!({
            "company_name": "Bau GmbH",
            "address": "Lange Gasse 5\n1080 Wien",
            "uid": "",
        }))
        .await;
    response.assert_status(StatusCode::SEE_OTHER);

    // create an invoice with two items: 3 x 10 derived, 50 explicit
    let body = "client_id=1&date=2025-03-02&service_period=Februar&city=Wien&reverse_charge=on\
                &item_title=Regiearbeiten&item_quantity=3&item_unit_price=10&item_net=\
                &item_title=Pauschale&item_quantity=&item_unit_price=&item_net=50";
    let response = server
        .post("/invoices/create")
        .bytes(body.as_bytes().to_vec().into())
        .content_type("application/x-www-form-urlencoded")
        .await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/invoices/1");

    // detail view shows the assigned number and the derived total
    let response = server.get("/invoices/1").await;
    response.assert_status_ok();
    let text = response.text();
    assert!(text.contains("20250001"));
    assert!(text.contains("80,00"));

    // PDF export
    let response = server.get("/invoices/1/pdf").await;
    response.assert_status_ok();
    assert_eq!(response.header("content-type"), "application/pdf");
    assert!(
        response
            .header("content-disposition")
            .to_str()
            .unwrap()
            .contains("invoice_20250001.pdf")
    );
    assert!(response.as_bytes().starts_with(b"%PDF"));

    // edit: replace the items wholesale
    let body = "service_period=M%C3%A4rz&item_title=Endabrechnung&item_quantity=2&item_unit_price=7,5&item_net=";
    let response = server
        .post("/invoices/1/update")
        .bytes(body.as_bytes().to_vec().into())
        .content_type("application/x-www-form-urlencoded")
        .await;
    response.assert_status(StatusCode::SEE_OTHER);

    let response = server.get("/invoices/1").await;
    let text = response.text();
    assert!(text.contains("März"));
    assert!(text.contains("15,00"));

    // delete, then the invoice is gone
    server.post("/invoices/1/delete").await.assert_status(StatusCode::SEE_OTHER);
    server.get("/invoices/1").await.assert_status_not_found();
}

#[tokio::test]
async fn sequences_increment_within_a_year() {
    let server = server().await;
    login(&server).await;

    server
        .post("/clients/create")
        .form(&json!({"company_name": "A", "address": "Wien", "uid": ""}))
        .await
        .assert_status(StatusCode::SEE_OTHER);

    for expected in 1..=3 {
        let body = format!("client_id=1&date=2025-0{expected}-15");
        let response = server
            .post("/invoices/create")
            .bytes(body.into_bytes().into())
            .content_type("application/x-www-form-urlencoded")
            .await;
        response.assert_status(StatusCode::SEE_OTHER);

        let location = response.header("location");
        let response = server.get(location.to_str().unwrap()).await;
        assert!(response.text().contains(&format!("2025000{expected}")));
    }
}
