//! Mock HTTP client for testing.
//!
//! Provides a configurable mock HTTP client that can return predefined
//! responses or errors for testing purposes.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use crate::traits::{Headers, HttpClient, HttpError, MultipartField, Response};

/// A recorded HTTP request for verification in tests.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// HTTP method (GET, POST or DELETE)
    pub method: String,
    /// Request URL
    pub url: String,
    /// Request headers
    pub headers: Headers,
    /// Request body (for POST requests)
    pub body: Option<String>,
    /// Form fields (for multipart POST requests)
    pub multipart: Option<Vec<MultipartField>>,
}

impl RecordedRequest {
    /// Parse the recorded body as JSON.
    pub fn json(&self) -> Option<serde_json::Value> {
        self.body
            .as_deref()
            .and_then(|body| serde_json::from_str(body).ok())
    }

    /// Text value of a recorded multipart field.
    pub fn form_text(&self, name: &str) -> Option<String> {
        self.multipart.as_ref()?.iter().find_map(|field| match &field.value {
            crate::traits::MultipartValue::Text(value) if field.name == name => {
                Some(value.clone())
            }
            _ => None,
        })
    }
}

/// Configuration for a mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return a successful response
    Success(Response),
    /// Return an error
    Error(HttpError),
}

impl MockResponse {
    /// `200` with a JSON body.
    pub fn json(value: serde_json::Value) -> Self {
        MockResponse::Success(Response::json_ok(&value))
    }

    /// Given status with a JSON body.
    pub fn status_json(status: u16, value: serde_json::Value) -> Self {
        let mut response = Response::json_ok(&value);
        response.status = status;
        MockResponse::Success(response)
    }

    /// Given status with an empty body.
    pub fn status(status: u16) -> Self {
        MockResponse::Success(Response::new(status, Bytes::new()))
    }

    /// Connection failure.
    pub fn offline() -> Self {
        MockResponse::Error(HttpError::ConnectionFailed("connection refused".to_string()))
    }
}

type RouteKey = (Option<String>, String);

/// Mock HTTP client for testing.
///
/// Responses are keyed by URL, optionally restricted to one method. Lookup
/// order: queued one-shot responses, exact match, longest prefix match,
/// default. Method-specific routes win over any-method routes.
///
/// # Example
///
/// ```ignore
/// use zapdesk::adapters::mock::{MockHttpClient, MockResponse};
/// use zapdesk::traits::{Headers, HttpClient};
///
/// let client = MockHttpClient::new();
/// client.set_response("http://backend/status", MockResponse::json(json!({"status": "conectado"})));
///
/// let response = client.get("http://backend/status", &Headers::new()).await?;
/// assert_eq!(response.status, 200);
/// assert_eq!(client.get_requests().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockHttpClient {
    /// Configured responses by (method, URL pattern)
    responses: Arc<Mutex<HashMap<RouteKey, MockResponse>>>,
    /// One-shot responses consumed before the configured ones
    queued: Arc<Mutex<HashMap<RouteKey, VecDeque<MockResponse>>>>,
    /// Default response when no specific match
    default_response: Arc<Mutex<Option<MockResponse>>>,
    /// Recorded requests for verification
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockHttpClient {
    /// Create a new mock HTTP client.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            queued: Arc::new(Mutex::new(HashMap::new())),
            default_response: Arc::new(Mutex::new(None)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set a response for a URL (or URL prefix), any method.
    pub fn set_response(&self, url: &str, response: MockResponse) {
        self.responses
            .lock()
            .unwrap()
            .insert((None, url.to_string()), response);
    }

    /// Set a response for a URL (or URL prefix) and one method.
    pub fn set_method_response(&self, method: &str, url: &str, response: MockResponse) {
        self.responses
            .lock()
            .unwrap()
            .insert((Some(method.to_string()), url.to_string()), response);
    }

    /// Queue a one-shot response for an exact method and URL.
    pub fn enqueue_response(&self, method: &str, url: &str, response: MockResponse) {
        self.queued
            .lock()
            .unwrap()
            .entry((Some(method.to_string()), url.to_string()))
            .or_default()
            .push_back(response);
    }

    /// Set a default response for URLs without specific matches.
    pub fn set_default_response(&self, response: MockResponse) {
        *self.default_response.lock().unwrap() = Some(response);
    }

    /// Get all recorded requests.
    pub fn get_requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Recorded requests whose URL ends with `suffix`.
    pub fn requests_to(&self, method: &str, suffix: &str) -> Vec<RecordedRequest> {
        self.get_requests()
            .into_iter()
            .filter(|r| r.method == method && r.url.ends_with(suffix))
            .collect()
    }

    /// Clear all recorded requests.
    pub fn clear_requests(&self) {
        self.requests.lock().unwrap().clear();
    }

    /// Clear all configured responses.
    pub fn clear_responses(&self) {
        self.responses.lock().unwrap().clear();
        self.queued.lock().unwrap().clear();
    }

    fn record_request(&self, request: RecordedRequest) {
        self.requests.lock().unwrap().push(request);
    }

    /// Get the response for a method and URL.
    fn get_response(&self, method: &str, url: &str) -> Option<MockResponse> {
        let key = (Some(method.to_string()), url.to_string());
        if let Some(queue) = self.queued.lock().unwrap().get_mut(&key) {
            if let Some(response) = queue.pop_front() {
                return Some(response);
            }
        }

        let responses = self.responses.lock().unwrap();
        let matches_method = |m: &Option<String>| m.as_deref().map_or(true, |m| m == method);

        // Exact match, method-specific first
        if let Some(response) = responses.get(&key) {
            return Some(response.clone());
        }
        if let Some(response) = responses.get(&(None, url.to_string())) {
            return Some(response.clone());
        }

        // Longest prefix match
        let best = responses
            .iter()
            .filter(|((m, pattern), _)| matches_method(m) && url.starts_with(pattern.as_str()))
            .max_by_key(|((m, pattern), _)| (pattern.len(), m.is_some()));
        if let Some((_, response)) = best {
            return Some(response.clone());
        }

        self.default_response.lock().unwrap().clone()
    }

    fn respond(&self, method: &str, url: &str) -> Result<Response, HttpError> {
        match self.get_response(method, url) {
            Some(MockResponse::Success(response)) => Ok(response),
            Some(MockResponse::Error(err)) => Err(err),
            None => Err(HttpError::Other(format!("No mock response for URL: {}", url))),
        }
    }
}

impl Default for MockHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn get(&self, url: &str, headers: &Headers) -> Result<Response, HttpError> {
        self.record_request(RecordedRequest {
            method: "GET".to_string(),
            url: url.to_string(),
            headers: headers.clone(),
            body: None,
            multipart: None,
        });
        self.respond("GET", url)
    }

    async fn post(&self, url: &str, body: &str, headers: &Headers) -> Result<Response, HttpError> {
        self.record_request(RecordedRequest {
            method: "POST".to_string(),
            url: url.to_string(),
            headers: headers.clone(),
            body: Some(body.to_string()),
            multipart: None,
        });
        self.respond("POST", url)
    }

    async fn delete(&self, url: &str, headers: &Headers) -> Result<Response, HttpError> {
        self.record_request(RecordedRequest {
            method: "DELETE".to_string(),
            url: url.to_string(),
            headers: headers.clone(),
            body: None,
            multipart: None,
        });
        self.respond("DELETE", url)
    }

    async fn post_multipart(
        &self,
        url: &str,
        fields: Vec<MultipartField>,
        headers: &Headers,
    ) -> Result<Response, HttpError> {
        self.record_request(RecordedRequest {
            method: "POST".to_string(),
            url: url.to_string(),
            headers: headers.clone(),
            body: None,
            multipart: Some(fields),
        });
        self.respond("POST", url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_get_with_response() {
        let client = MockHttpClient::new();
        client.set_response(
            "https://example.com/test",
            MockResponse::Success(Response::new(200, Bytes::from("Hello"))),
        );

        let response = client
            .get("https://example.com/test", &Headers::new())
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body, Bytes::from("Hello"));

        let requests = client.get_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "GET");
    }

    #[tokio::test]
    async fn test_longest_prefix_wins() {
        let client = MockHttpClient::new();
        client.set_response("http://b/conversations", MockResponse::json(json!([])));
        client.set_response(
            "http://b/conversations/a%40s.whatsapp.net",
            MockResponse::json(json!({"jid": "a@s.whatsapp.net"})),
        );

        let response = client
            .get("http://b/conversations/a%40s.whatsapp.net/extra", &Headers::new())
            .await
            .unwrap();
        let value: serde_json::Value = response.json().unwrap();
        assert_eq!(value["jid"], "a@s.whatsapp.net");
    }

    #[tokio::test]
    async fn test_method_specific_route() {
        let client = MockHttpClient::new();
        client.set_method_response("DELETE", "http://b/conversations/1", MockResponse::status(204));
        client.set_response("http://b/conversations", MockResponse::json(json!([])));

        let deleted = client
            .delete("http://b/conversations/1", &Headers::new())
            .await
            .unwrap();
        assert_eq!(deleted.status, 204);

        let listed = client
            .get("http://b/conversations/1", &Headers::new())
            .await
            .unwrap();
        assert_eq!(listed.status, 200);
    }

    #[tokio::test]
    async fn test_queued_responses_are_consumed_in_order() {
        let client = MockHttpClient::new();
        client.enqueue_response("POST", "http://b/send", MockResponse::json(json!({"n": 1})));
        client.enqueue_response("POST", "http://b/send", MockResponse::json(json!({"n": 2})));
        client.set_response("http://b/send", MockResponse::offline());

        let first: serde_json::Value = client
            .post("http://b/send", "{}", &Headers::new())
            .await
            .unwrap()
            .json()
            .unwrap();
        let second: serde_json::Value = client
            .post("http://b/send", "{}", &Headers::new())
            .await
            .unwrap()
            .json()
            .unwrap();
        assert_eq!(first["n"], 1);
        assert_eq!(second["n"], 2);
        assert!(client
            .post("http://b/send", "{}", &Headers::new())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_multipart_recorded() {
        let client = MockHttpClient::new();
        client.set_response("http://b/save-sticker", MockResponse::status(200));
        client
            .post_multipart(
                "http://b/save-sticker",
                vec![MultipartField::text("messageId", "ABC")],
                &Headers::new(),
            )
            .await
            .unwrap();

        let request = &client.requests_to("POST", "/save-sticker")[0];
        assert_eq!(request.form_text("messageId").as_deref(), Some("ABC"));
    }

    #[tokio::test]
    async fn test_no_response_configured() {
        let client = MockHttpClient::new();
        let result = client
            .get("https://example.com/missing", &Headers::new())
            .await;
        assert!(matches!(result, Err(HttpError::Other(_))));
    }

    #[tokio::test]
    async fn test_clone_shares_state() {
        let client = MockHttpClient::new();
        client.set_default_response(MockResponse::status(404));
        let cloned = client.clone();

        let response = cloned.get("https://example.com", &Headers::new()).await.unwrap();
        assert_eq!(response.status, 404);
        assert_eq!(client.get_requests().len(), 1);
    }
}
