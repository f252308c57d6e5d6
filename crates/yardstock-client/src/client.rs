//! HTTP client for the catalog's bulk product endpoint.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};

use yardstock_core::AppConfig;

use crate::error::ClientError;
use crate::retry::retry_with_backoff;
use crate::types::{BulkCreateResponse, ImageUpload, ProductPayload};

const BULK_PATH: &str = "/api/products/bulk";

/// Client for `POST {base}/api/products/bulk`.
///
/// Rate limiting (429) and rejected credentials (401/403) come back as typed
/// errors. 429 and connection failures are retried with back-off up to
/// `max_retries` additional attempts.
pub struct CatalogClient {
    client: Client,
    bulk_url: String,
    auth_token: Option<String>,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl CatalogClient {
    /// # Errors
    ///
    /// - [`ClientError::InvalidBaseUrl`] if `base_url` does not parse.
    /// - [`ClientError::Http`] if the underlying `reqwest::Client` cannot be built.
    pub fn new(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
        auth_token: Option<String>,
    ) -> Result<Self, ClientError> {
        let bulk_url = Self::bulk_url(base_url)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            bulk_url,
            auth_token,
            max_retries,
            backoff_base_secs,
        })
    }

    /// # Errors
    ///
    /// See [`CatalogClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, ClientError> {
        Self::new(
            &config.api_base_url,
            config.request_timeout_secs,
            &config.user_agent,
            config.max_retries,
            config.retry_backoff_base_secs,
            config.api_token.clone(),
        )
    }

    /// Sends one batch as `multipart/form-data`: the `products` field holds
    /// the JSON payload array and each image is a file part named
    /// `images[<product index>]`.
    ///
    /// A non-2xx response whose body still carries per-item errors is
    /// returned as a normal response so callers can report each failure.
    ///
    /// # Errors
    ///
    /// - [`ClientError::RateLimited`]: HTTP 429 after all retries.
    /// - [`ClientError::Unauthorized`]: HTTP 401 or 403.
    /// - [`ClientError::UnexpectedStatus`]: any other non-2xx status without an item report.
    /// - [`ClientError::Http`]: network or TLS failure.
    /// - [`ClientError::Deserialize`]: a 2xx body that is not a bulk-create response.
    pub async fn bulk_create(
        &self,
        products: &[ProductPayload],
        images: &[ImageUpload],
    ) -> Result<BulkCreateResponse, ClientError> {
        let products_json =
            serde_json::to_string(products).map_err(|e| ClientError::Serialize {
                context: "bulk product payload".to_owned(),
                source: e,
            })?;

        tracing::info!(
            products = products.len(),
            images = images.len(),
            url = %self.bulk_url,
            "sending bulk create request"
        );

        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let products_json = products_json.clone();
            async move {
                let form = Self::build_form(products_json, images)?;
                let mut request = self.client.post(&self.bulk_url).multipart(form);
                if let Some(token) = &self.auth_token {
                    request = request.bearer_auth(token);
                }

                let response = request.send().await?;
                let status = response.status();

                if status == StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(60);
                    return Err(ClientError::RateLimited { retry_after_secs });
                }

                if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                    return Err(ClientError::Unauthorized {
                        status: status.as_u16(),
                    });
                }

                let body = response.text().await?;

                if !status.is_success() {
                    return match serde_json::from_str::<BulkCreateResponse>(&body) {
                        Ok(parsed) if !parsed.errors.is_empty() => {
                            tracing::debug!(
                                status = status.as_u16(),
                                errors = parsed.errors.len(),
                                "bulk create rejected with item report"
                            );
                            Ok(parsed)
                        }
                        _ => Err(ClientError::UnexpectedStatus {
                            status: status.as_u16(),
                            url: self.bulk_url.clone(),
                            body,
                        }),
                    };
                }

                serde_json::from_str::<BulkCreateResponse>(&body).map_err(|e| {
                    ClientError::Deserialize {
                        context: "bulk create response".to_owned(),
                        source: e,
                    }
                })
            }
        })
        .await
    }

    fn build_form(products_json: String, images: &[ImageUpload]) -> Result<Form, ClientError> {
        let mut form = Form::new().text("products", products_json);
        for image in images {
            let part = Part::bytes(image.file.bytes.clone())
                .file_name(image.file_name.clone())
                .mime_str(&image.file.mime_type)?;
            form = form.part(image.field_name(), part);
        }
        Ok(form)
    }

    fn bulk_url(base_url: &str) -> Result<String, ClientError> {
        let url = format!("{}{BULK_PATH}", base_url.trim_end_matches('/'));
        reqwest::Url::parse(&url).map_err(|e| ClientError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        Ok(url)
    }
}
