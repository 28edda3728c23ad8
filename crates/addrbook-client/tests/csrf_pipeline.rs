//! CSRF token interception against a live HTTP server.

use addrbook_client::csrf::TokenSource;
use addrbook_client::{ApiClient, ClientConfig};
use addrbook_testing::fixtures::{self, paths};
use addrbook_testing::{MockResponse, MockServer, RequestMatcher};
use http::{Method, StatusCode};
use serde_json::json;

fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(ClientConfig::new().base_url(server.api_url())).unwrap()
}

fn csrf_header(server: &MockServer, path: &str) -> Vec<Option<String>> {
    server
        .requests_to(path)
        .iter()
        .map(|r| r.header("x-csrf-token").map(str::to_string))
        .collect()
}

#[tokio::test]
async fn test_body_token_wins_over_set_cookie_in_same_response() {
    let server = MockServer::start().await;
    server
        .expect(RequestMatcher::new().route(Method::POST, paths::LOGIN))
        .respond_with(
            MockResponse::new()
                .set_cookie("csrf_token=from-cookie; Path=/")
                .json(fixtures::csrf_body("from-body")),
        );
    server
        .expect(RequestMatcher::new().route(Method::GET, paths::ADDRESSES))
        .respond_with(MockResponse::new().json(json!([])));

    let client = client_for(&server);
    client.post("/login", &json!({})).await.unwrap();
    client.get("/v1/users/addresses").await.unwrap();

    assert_eq!(
        csrf_header(&server, paths::ADDRESSES),
        vec![Some("from-body".to_string())]
    );
}

#[tokio::test]
async fn test_public_routes_never_carry_header() {
    let server = MockServer::start().await;
    server
        .expect(RequestMatcher::new().route(Method::POST, paths::LOGIN))
        .respond_with(MockResponse::new().json(fixtures::csrf_body("tok")));
    server
        .expect(RequestMatcher::new().route(Method::POST, paths::REGISTER))
        .respond_with(MockResponse::new().status(StatusCode::CREATED));
    server
        .expect(RequestMatcher::new().route(Method::GET, paths::PROFILE))
        .respond_with(MockResponse::new().json(fixtures::profile(1, "ada", "a@b.co")));

    let client = client_for(&server);
    client.post("/login", &json!({})).await.unwrap();
    client.post("/register", &json!({})).await.unwrap();
    client.get("/api/profile").await.unwrap();
    client.post("/login", &json!({})).await.unwrap();

    for request in server.received_requests() {
        assert!(
            request.header("x-csrf-token").is_none(),
            "{} carried a token",
            request.path
        );
    }
}

#[tokio::test]
async fn test_protected_request_without_token_is_sent_bare() {
    let server = MockServer::start().await;
    server
        .expect(
            RequestMatcher::new()
                .route(Method::DELETE, paths::address(4))
                .header_absent("x-csrf-token"),
        )
        .respond_with(MockResponse::new().status(StatusCode::NO_CONTENT))
        .once();

    let client = client_for(&server);
    let resp = client.delete("/v1/users/address/4").await.unwrap();

    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    server.verify();
}

#[tokio::test]
async fn test_http_only_set_cookie_token_is_replayed() {
    let server = MockServer::start().await;
    server
        .expect(RequestMatcher::new().route(Method::POST, paths::LOGIN))
        .respond_with(MockResponse::new().set_cookie("csrf_token=abc123; Path=/; HttpOnly"));
    server
        .expect(
            RequestMatcher::new()
                .route(Method::POST, paths::ADDRESS_ADD)
                .header("x-csrf-token", "abc123"),
        )
        .respond_with(MockResponse::new().json(fixtures::address(1, "1 Main St", "Berlin")))
        .once();

    let client = client_for(&server);
    client.post("/login", &json!({})).await.unwrap();

    // Not readable from the jar, so the header slot supplies it.
    let url = client.config().resolve("/v1/users/address/add").unwrap();
    assert_eq!(
        client.token_store().resolve(&url).map(|(_, source)| source),
        Some(TokenSource::SetCookieHeader)
    );

    let resp = client
        .post("/v1/users/address/add", &json!({"addr_1": "1 Main St"}))
        .await
        .unwrap();
    assert!(resp.is_success());
    server.verify();
}

#[tokio::test]
async fn test_later_body_token_replaces_cookie_token() {
    let server = MockServer::start().await;
    server
        .expect(RequestMatcher::new().route(Method::POST, paths::LOGIN))
        .respond_with(MockResponse::new().set_cookie("csrf_token=abc123; Path=/"));
    server
        .expect(RequestMatcher::new().route(Method::GET, paths::PROFILE))
        .respond_with(MockResponse::new().json(json!({
            "user": {"id": 1, "username": "ada", "email": "a@b.co"},
            "csrfToken": "xyz789"
        })));
    server
        .expect(RequestMatcher::new().route(Method::PATCH, paths::address(2)))
        .respond_with(MockResponse::new().json(fixtures::address(2, "2 Side St", "Berlin")));

    let client = client_for(&server);
    client.post("/login", &json!({})).await.unwrap();
    client.get("/api/profile").await.unwrap();
    client
        .patch("/v1/users/address/2", &json!({"city": "Berlin"}))
        .await
        .unwrap();

    assert_eq!(
        csrf_header(&server, &paths::address(2)),
        vec![Some("xyz789".to_string())]
    );
}

#[tokio::test]
async fn test_readable_cookie_is_used_and_sent_back() {
    let server = MockServer::start().await;
    server
        .expect(RequestMatcher::new().route(Method::POST, paths::LOGIN))
        .respond_with(MockResponse::new().set_cookie("csrf_token=c00k1e; Path=/"));
    server
        .expect(RequestMatcher::new().route(Method::POST, paths::LOGOUT))
        .respond_with(MockResponse::new());

    let client = client_for(&server);
    client.post("/login", &json!({})).await.unwrap();

    let url = client.config().resolve("/v1/logout").unwrap();
    assert_eq!(
        client.token_store().resolve(&url).map(|(_, source)| source),
        Some(TokenSource::CookieStore)
    );

    client.send(Method::POST, "/v1/logout").await.unwrap();

    let logout = &server.requests_to(paths::LOGOUT)[0];
    assert_eq!(logout.header("x-csrf-token"), Some("c00k1e"));
    assert!(logout.header("cookie").unwrap().contains("csrf_token=c00k1e"));
}

#[tokio::test]
async fn test_tokens_harvested_from_error_responses() {
    let server = MockServer::start().await;
    server
        .expect(RequestMatcher::new().route(Method::POST, paths::LOGIN))
        .respond_with(
            MockResponse::error(StatusCode::UNAUTHORIZED, "invalid credentials")
                .set_cookie("csrf_token=e1; Path=/; HttpOnly"),
        );
    server
        .expect(RequestMatcher::new().route(Method::GET, paths::ADDRESSES))
        .respond_with(MockResponse::new().json(json!([])));

    let client = client_for(&server);
    let resp = client.post("/login", &json!({})).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    client.get("/v1/users/addresses").await.unwrap();
    assert_eq!(
        csrf_header(&server, paths::ADDRESSES),
        vec![Some("e1".to_string())]
    );
}

#[tokio::test]
async fn test_clients_share_nothing_unless_cloned() {
    let server = MockServer::start().await;
    server
        .expect(RequestMatcher::new().route(Method::POST, paths::LOGIN))
        .respond_with(MockResponse::new().json(fixtures::csrf_body("only-mine")));
    server
        .expect(RequestMatcher::new().route(Method::GET, paths::ADDRESSES))
        .respond_with(MockResponse::new().json(json!([])));

    let first = client_for(&server);
    let clone = first.clone();
    let other = client_for(&server);

    first.post("/login", &json!({})).await.unwrap();
    clone.get("/v1/users/addresses").await.unwrap();
    other.get("/v1/users/addresses").await.unwrap();

    assert_eq!(
        csrf_header(&server, paths::ADDRESSES),
        vec![Some("only-mine".to_string()), None]
    );
}
