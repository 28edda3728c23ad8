//! Response bodies shaped like the address-book server's.

use serde_json::{json, Value};

/// Route paths as seen by the server, i.e. under the `/api` mount.
pub mod paths {
    /// Login
    pub const LOGIN: &str = "/api/login";
    /// Registration
    pub const REGISTER: &str = "/api/register";
    /// Logout
    pub const LOGOUT: &str = "/api/v1/logout";
    /// Current user
    pub const PROFILE: &str = "/api/api/profile";
    /// Address listing
    pub const ADDRESSES: &str = "/api/v1/users/addresses";
    /// Address creation
    pub const ADDRESS_ADD: &str = "/api/v1/users/address/add";

    /// Single address
    pub fn address(id: i64) -> String {
        format!("/api/v1/users/address/{}", id)
    }
}

/// `{"user": {...}}` as returned by the profile endpoint
pub fn profile(id: i64, username: &str, email: &str) -> Value {
    json!({ "user": { "id": id, "username": username, "email": email } })
}

/// A stored address
pub fn address(id: i64, addr_1: &str, city: &str) -> Value {
    json!({
        "id": id,
        "u_id": 1,
        "addr_1": addr_1,
        "addr_2": "",
        "zip": "10115",
        "city": city,
        "country": "DE",
        "is_default": false,
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-01-01T00:00:00Z"
    })
}

/// A body carrying a CSRF token, as issued on login
pub fn csrf_body(token: &str) -> Value {
    json!({ "message": "ok", "csrfToken": token })
}
