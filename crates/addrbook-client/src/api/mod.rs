//! Typed wrappers over the server's endpoints.

mod address;
mod auth;

pub use address::{
    address_path, Address, AddressApi, AddressCreateRequest, AddressUpdate, CREATE_PATH,
    LIST_PATH,
};
pub use auth::{
    AuthApi, LoginRequest, SignupRequest, User, LOGIN_PATH, LOGOUT_PATH, PROFILE_PATH,
    REGISTER_PATH,
};

use crate::client::ApiClient;

impl ApiClient {
    /// Authentication endpoints over this client.
    pub fn auth(&self) -> AuthApi {
        AuthApi::new(self.clone())
    }

    /// Address endpoints over this client.
    pub fn addresses(&self) -> AddressApi {
        AddressApi::new(self.clone())
    }
}
