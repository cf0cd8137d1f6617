//! API Client Wrapper
//!
//! Thin typed call layer over a [`Transport`]: every call returns the parsed
//! body or an [`ApiError`]. No retry, no auth header, no cancellation.

use super::error::{ApiError, ApiResult};
use super::transport::{ApiRequest, ApiResponse, FilePart, Method, Transport};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// Shared handle to the portal backend
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    base_url: String,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, base_url: &str) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Base URL, used for rendering upload links
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let response = self.execute(ApiRequest::new(Method::Get, path)).await?;
        decode(&response)
    }

    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let request = ApiRequest::new(Method::Post, path).json(encode(body)?);
        let response = self.execute(request).await?;
        decode(&response)
    }

    /// POST with extra request headers (ERP key)
    pub async fn post_json_with_headers<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        headers: &[(&str, &str)],
    ) -> ApiResult<T> {
        let mut request = ApiRequest::new(Method::Post, path).json(encode(body)?);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        let response = self.execute(request).await?;
        decode(&response)
    }

    pub async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let request = ApiRequest::new(Method::Put, path).json(encode(body)?);
        let response = self.execute(request).await?;
        decode(&response)
    }

    /// PUT whose reply is plain text
    pub async fn put_text<B: Serialize>(&self, path: &str, body: &B) -> ApiResult<String> {
        let request = ApiRequest::new(Method::Put, path).json(encode(body)?);
        Ok(self.execute(request).await?.body)
    }

    /// PUT without a body; the reply text is returned as is
    pub async fn put_empty(&self, path: &str) -> ApiResult<String> {
        Ok(self.execute(ApiRequest::new(Method::Put, path)).await?.body)
    }

    pub async fn delete_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let response = self.execute(ApiRequest::new(Method::Delete, path)).await?;
        decode(&response)
    }

    /// POST whose reply is plain text
    pub async fn post_text<B: Serialize>(&self, path: &str, body: &B) -> ApiResult<String> {
        let request = ApiRequest::new(Method::Post, path).json(encode(body)?);
        Ok(self.execute(request).await?.body)
    }

    /// DELETE whose reply is plain text
    pub async fn delete_text(&self, path: &str) -> ApiResult<String> {
        Ok(self.execute(ApiRequest::new(Method::Delete, path)).await?.body)
    }

    /// Multipart upload of a single file
    pub async fn upload<T: DeserializeOwned>(&self, path: &str, part: FilePart) -> ApiResult<T> {
        let request = ApiRequest::new(Method::Post, path).multipart(part);
        let response = self.execute(request).await?;
        decode(&response)
    }

    async fn execute(&self, request: ApiRequest) -> ApiResult<ApiResponse> {
        let method = request.method;
        let path = request.path.clone();
        let response = self.transport.send(request).await?;

        if response.is_success() {
            Ok(response)
        } else {
            tracing::debug!(%method, %path, status = response.status, "Portal call rejected");
            Err(ApiError::from_status(response.status, &response.body))
        }
    }
}

fn encode<B: Serialize>(body: &B) -> ApiResult<serde_json::Value> {
    serde_json::to_value(body).map_err(|e| ApiError::Encode(e.to_string()))
}

/// Empty bodies decode as JSON `null`, so `()` and `Option<T>` accept them
fn decode<T: DeserializeOwned>(response: &ApiResponse) -> ApiResult<T> {
    let text = response.body.trim();
    let text = if text.is_empty() { "null" } else { text };
    serde_json::from_str(text).map_err(|e| ApiError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockTransport;
    use serde_json::json;

    fn client(mock: &Arc<MockTransport>) -> ApiClient {
        ApiClient::new(mock.clone(), "http://portal.test/api/")
    }

    #[tokio::test]
    async fn test_get_json_parses_body() {
        let mock = Arc::new(MockTransport::new());
        mock.reply_json(Method::Get, "/solicitudes", 200, json!([{"id": 1}]));

        let value: serde_json::Value = client(&mock).get_json("/solicitudes").await.unwrap();
        assert_eq!(value[0]["id"], 1);
        assert_eq!(client(&mock).base_url(), "http://portal.test/api");
    }

    #[tokio::test]
    async fn test_error_status_carries_server_text() {
        let mock = Arc::new(MockTransport::new());
        mock.reply_text(Method::Post, "/login", 401, "Invalid credentials");

        let err = client(&mock)
            .post_json::<_, serde_json::Value>("/login", &json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.server_message(), Some("Invalid credentials"));
    }

    #[tokio::test]
    async fn test_empty_body_decodes_as_unit() {
        let mock = Arc::new(MockTransport::new());
        mock.reply_text(Method::Delete, "/admin/reject/3", 200, "");

        client(&mock).delete_json::<()>("/admin/reject/3").await.unwrap();
        assert_eq!(mock.count(Method::Delete, "/admin/reject/3"), 1);
    }

    #[tokio::test]
    async fn test_put_empty_returns_text() {
        let mock = Arc::new(MockTransport::new());
        mock.reply_text(Method::Put, "/admin/approve/3", 200, "Supplier approved");

        let text = client(&mock).put_empty("/admin/approve/3").await.unwrap();
        assert_eq!(text, "Supplier approved");
        assert_eq!(mock.calls()[0].body, crate::api::transport::RequestBody::Empty);
    }

    #[tokio::test]
    async fn test_put_json_round_trip() {
        let mock = Arc::new(MockTransport::new());
        mock.reply_json(Method::Put, "/suppliers/2/docs", 200, json!({"saved": true}));

        let reply: serde_json::Value = client(&mock)
            .put_json("/suppliers/2/docs", &json!({"documents": "a.pdf"}))
            .await
            .unwrap();
        assert_eq!(reply["saved"], true);
        assert_eq!(
            mock.calls()[0].json_body(),
            Some(&json!({"documents": "a.pdf"}))
        );
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let mock = Arc::new(MockTransport::new());
        mock.reply_text(Method::Get, "/suppliers/1", 200, "<html>");

        let err = client(&mock)
            .get_json::<crate::models::Supplier>("/suppliers/1")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn test_headers_are_forwarded() {
        let mock = Arc::new(MockTransport::new());
        mock.reply_json(Method::Post, "/erp/import", 200, json!({"ok": true}));

        let _: serde_json::Value = client(&mock)
            .post_json_with_headers("/erp/import", &json!([]), &[("X-API-KEY", "k")])
            .await
            .unwrap();

        let calls = mock.calls();
        assert_eq!(calls[0].headers, vec![("X-API-KEY".to_string(), "k".to_string())]);
    }
}
