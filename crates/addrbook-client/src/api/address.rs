//! Address CRUD for the signed-in user. All routes are protected.

use crate::client::ApiClient;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// List the user's addresses.
pub const LIST_PATH: &str = "/v1/users/addresses";
/// Create an address.
pub const CREATE_PATH: &str = "/v1/users/address/add";

/// Path of a single address, used for update and delete.
pub fn address_path(id: i64) -> String {
    format!("/v1/users/address/{}", id)
}

/// A stored address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Server-assigned id
    pub id: i64,
    /// Owning user
    pub u_id: i64,
    /// First address line
    pub addr_1: String,
    /// Second address line
    #[serde(default)]
    pub addr_2: Option<String>,
    /// Postal code
    pub zip: String,
    /// City
    pub city: String,
    /// Country
    pub country: String,
    /// The user's default address
    #[serde(default)]
    pub is_default: bool,
    /// Creation timestamp as sent by the server
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl Address {
    /// One-line rendering, `addr_1, addr_2, zip city, country`.
    pub fn one_line(&self) -> String {
        let mut line = self.addr_1.clone();
        if let Some(extra) = self.addr_2.as_deref().filter(|s| !s.trim().is_empty()) {
            line.push_str(", ");
            line.push_str(extra);
        }
        format!("{}, {} {}, {}", line, self.zip, self.city, self.country)
    }
}

/// Payload for [`AddressApi::create`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Validate)]
pub struct AddressCreateRequest {
    /// First address line
    #[validate(custom(function = "not_blank"))]
    pub addr_1: String,
    /// Second address line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addr_2: Option<String>,
    /// Postal code
    #[validate(custom(function = "not_blank"))]
    pub zip: String,
    /// City
    #[validate(custom(function = "not_blank"))]
    pub city: String,
    /// Country
    #[validate(custom(function = "not_blank"))]
    pub country: String,
    /// Mark as the default address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isdefault: Option<bool>,
}

/// Partial update for [`AddressApi::update`]. Fields left `None` are not
/// sent and stay unchanged on the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Validate)]
pub struct AddressUpdate {
    /// First address line
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "not_blank"))]
    pub addr_1: Option<String>,
    /// Second address line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addr_2: Option<String>,
    /// Postal code
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "not_blank"))]
    pub zip: Option<String>,
    /// City
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "not_blank"))]
    pub city: Option<String>,
    /// Country
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "not_blank"))]
    pub country: Option<String>,
    /// Mark as the default address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isdefault: Option<bool>,
}

impl AddressUpdate {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn not_blank(value: &str) -> std::result::Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some("this field is required".into());
        return Err(err);
    }
    Ok(())
}

/// Address endpoints.
#[derive(Debug, Clone)]
pub struct AddressApi {
    client: ApiClient,
}

impl AddressApi {
    /// Wrap a client.
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// All addresses of the current user.
    pub async fn list(&self) -> Result<Vec<Address>> {
        self.client.get(LIST_PATH).await?.error_for_status()?.json()
    }

    /// Create an address and return it as stored.
    pub async fn create(&self, req: &AddressCreateRequest) -> Result<Address> {
        req.validate()?;
        self.client
            .post(CREATE_PATH, req)
            .await?
            .error_for_status()?
            .json()
    }

    /// Apply a partial update and return the updated address.
    pub async fn update(&self, id: i64, patch: &AddressUpdate) -> Result<Address> {
        patch.validate()?;
        self.client
            .patch(&address_path(id), patch)
            .await?
            .error_for_status()?
            .json()
    }

    /// Delete an address.
    pub async fn delete(&self, id: i64) -> Result<()> {
        self.client
            .delete(&address_path(id))
            .await?
            .error_for_status()?;
        Ok(())
    }
}
