//! [`HttpClient`] over reqwest.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

use crate::traits::{Headers, HttpClient, HttpError, MultipartField, MultipartValue, Response};

#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// `main` passes a client with the request timeout set.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn convert_error(err: reqwest::Error) -> HttpError {
        if err.is_timeout() {
            HttpError::Timeout(err.to_string())
        } else if err.is_connect() {
            HttpError::ConnectionFailed(err.to_string())
        } else if err.is_builder() {
            HttpError::InvalidUrl(err.to_string())
        } else {
            HttpError::Other(err.to_string())
        }
    }

    /// Non-UTF-8 header values are dropped.
    fn convert_headers(headers: &reqwest::header::HeaderMap) -> Headers {
        headers
            .iter()
            .filter_map(|(name, value)| Some((name.to_string(), value.to_str().ok()?.to_string())))
            .collect()
    }

    fn apply_headers(builder: reqwest::RequestBuilder, headers: &Headers) -> reqwest::RequestBuilder {
        headers
            .iter()
            .fold(builder, |builder, (key, value)| builder.header(key, value))
    }

    fn build_form(fields: Vec<MultipartField>) -> Result<Form, HttpError> {
        let mut form = Form::new();
        for field in fields {
            form = match field.value {
                MultipartValue::Text(value) => form.text(field.name, value),
                MultipartValue::File {
                    filename,
                    mime,
                    data,
                } => {
                    let part = Part::bytes(data.to_vec())
                        .file_name(filename)
                        .mime_str(&mime)
                        .map_err(|e| HttpError::Other(format!("invalid mime {}: {}", mime, e)))?;
                    form.part(field.name, part)
                }
            };
        }
        Ok(form)
    }

    async fn execute(&self, builder: reqwest::RequestBuilder) -> Result<Response, HttpError> {
        let response = builder.send().await.map_err(Self::convert_error)?;

        let status = response.status().as_u16();
        let headers = Self::convert_headers(response.headers());
        let body = response.bytes().await.map_err(Self::convert_error)?;
        Ok(Response::with_headers(status, headers, body))
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str, headers: &Headers) -> Result<Response, HttpError> {
        let builder = Self::apply_headers(self.client.get(url), headers);
        self.execute(builder).await
    }

    async fn post(&self, url: &str, body: &str, headers: &Headers) -> Result<Response, HttpError> {
        let builder = Self::apply_headers(self.client.post(url).body(body.to_string()), headers);
        self.execute(builder).await
    }

    async fn delete(&self, url: &str, headers: &Headers) -> Result<Response, HttpError> {
        let builder = Self::apply_headers(self.client.delete(url), headers);
        self.execute(builder).await
    }

    async fn post_multipart(
        &self,
        url: &str,
        fields: Vec<MultipartField>,
        headers: &Headers,
    ) -> Result<Response, HttpError> {
        let form = Self::build_form(fields)?;
        let builder = Self::apply_headers(self.client.post(url).multipart(form), headers);
        self.execute(builder).await
    }
}
