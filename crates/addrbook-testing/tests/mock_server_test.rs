use addrbook_testing::fixtures::{self, paths};
use addrbook_testing::{MockResponse, MockServer, RequestMatcher};
use http::{Method, StatusCode};
use serde_json::json;

#[tokio::test]
async fn test_mock_server_basics() {
    let server = MockServer::start().await;

    server
        .expect(RequestMatcher::new().route(Method::GET, paths::PROFILE))
        .respond_with(MockResponse::new().json(fixtures::profile(1, "ada", "ada@example.com")))
        .once();

    let client = reqwest::Client::new();
    let resp = client
        .get(format!("{}api/profile", server.api_url()))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["user"]["username"], "ada");

    server.verify();
}

#[tokio::test]
async fn test_multiple_set_cookie_headers_delivered() {
    let server = MockServer::start().await;

    server
        .expect(RequestMatcher::new().route(Method::POST, paths::LOGIN))
        .respond_with(
            MockResponse::new()
                .set_cookie("session=s1; Path=/; HttpOnly")
                .set_cookie("csrf_token=abc123; Path=/"),
        );

    let resp = reqwest::Client::new()
        .post(format!("{}login", server.api_url()))
        .json(&json!({"email": "a@b.co", "password": "x"}))
        .send()
        .await
        .unwrap();

    let cookies: Vec<_> = resp
        .headers()
        .get_all(http::header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect();
    assert_eq!(cookies.len(), 2);
    assert!(cookies.iter().any(|c| c.starts_with("csrf_token=abc123")));
}

#[tokio::test]
async fn test_scripted_sequence_and_recording() {
    let server = MockServer::start().await;

    server
        .expect(RequestMatcher::new().path(paths::ADDRESSES))
        .respond_with(MockResponse::new().json(json!([])));
    // Registered last, consulted first, used once.
    server
        .expect(RequestMatcher::new().path(paths::ADDRESSES))
        .respond_with(MockResponse::new().json(json!([fixtures::address(1, "1 Main St", "Berlin")])))
        .once();

    let client = reqwest::Client::new();
    let url = format!("{}v1/users/addresses", server.api_url());

    let first: serde_json::Value = client.get(&url).send().await.unwrap().json().await.unwrap();
    let second: serde_json::Value = client.get(&url).send().await.unwrap().json().await.unwrap();

    assert_eq!(first.as_array().unwrap().len(), 1);
    assert_eq!(second.as_array().unwrap().len(), 0);
    assert_eq!(server.requests_to(paths::ADDRESSES).len(), 2);
    server.verify();
}

#[tokio::test]
async fn test_unmatched_requests_get_json_404() {
    let server = MockServer::start().await;

    let resp = reqwest::Client::new()
        .delete(format!("{}v1/users/address/7", server.api_url()))
        .header("X-CSRF-Token", "tok")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let unmatched = server.unmatched_requests();
    assert_eq!(unmatched.len(), 1);
    assert_eq!(unmatched[0].path, paths::address(7));
    assert_eq!(unmatched[0].header("x-csrf-token"), Some("tok"));
}

#[tokio::test]
async fn test_error_response_shape() {
    let server = MockServer::start().await;

    server
        .expect(RequestMatcher::new().route(Method::POST, paths::ADDRESS_ADD))
        .respond_with(MockResponse::error(StatusCode::BAD_REQUEST, "zip is required"));

    let resp = reqwest::Client::new()
        .post(format!("{}v1/users/address/add", server.api_url()))
        .json(&json!({}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "zip is required");
}

#[tokio::test]
#[should_panic]
async fn test_verification_failure() {
    let server = MockServer::start().await;

    server
        .expect(RequestMatcher::new().path(paths::LOGOUT))
        .once();

    server.verify();
}
