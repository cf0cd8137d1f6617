//! Portal API Client
//!
//! Everything that talks to the portal backend:
//!
//! - [`Transport`]: sends one request, `HttpTransport` uses reqwest
//! - [`ApiClient`]: base URL plus `get_json`/`post_json`/`put_json`/`delete_json`
//! - [`PortalApi`]: one typed method per backend route
//! - [`ApiError`]: transport, status and decode failures

mod client;
mod endpoints;
mod error;
mod transport;

#[cfg(test)]
pub(crate) mod mock;

pub use client::ApiClient;
pub use endpoints::{
    LoginRequest, LoginResponse, LoginUser, PortalApi, UploadResponse, ERP_KEY_HEADER,
};
pub use error::{ApiError, ApiResult};
pub use transport::{
    ApiRequest, ApiResponse, FilePart, HttpTransport, Method, RequestBody, Transport,
};

use std::sync::Arc;
use std::time::Duration;

/// Build a [`PortalApi`] over HTTP
pub fn connect(base_url: &str, timeout: Duration) -> ApiResult<PortalApi> {
    let transport = HttpTransport::new(base_url, timeout)?;
    Ok(PortalApi::new(ApiClient::new(Arc::new(transport), base_url)))
}
