use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};

use super::{
    CallOptions, ClientError, FraudCheckResponse, FraudClient, NotificationClient,
    NotificationRequest,
};
use crate::utils::{retry_on_transient, retry_when};

// ============================================================================
// HTTP Clients (reqwest)
// ============================================================================

fn normalize_base_url(base_url: impl Into<String>) -> String {
    base_url.into().trim_end_matches('/').to_string()
}

fn apply_options(request: RequestBuilder, options: &CallOptions) -> RequestBuilder {
    match options.timeout {
        Some(timeout) => request.timeout(timeout),
        None => request,
    }
}

fn transport_error(url: &str, source: reqwest::Error) -> ClientError {
    if source.is_connect() {
        ClientError::Connect {
            url: url.to_string(),
            source,
        }
    } else if source.is_timeout() {
        ClientError::Timeout { url: url.to_string() }
    } else {
        ClientError::Transport {
            url: url.to_string(),
            source,
        }
    }
}

/// Send the request and turn non-2xx statuses into errors
async fn dispatch(request: RequestBuilder, url: &str) -> Result<Response, ClientError> {
    let response = request
        .send()
        .await
        .map_err(|source| transport_error(url, source))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ClientError::Status {
            url: url.to_string(),
            status: status.as_u16(),
            body,
        });
    }

    Ok(response)
}

pub struct HttpFraudClient {
    http: Client,
    base_url: String,
}

impl HttpFraudClient {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: normalize_base_url(base_url),
        }
    }

    fn check_url(&self, customer_id: i64) -> String {
        format!("{}/api/v1/fraud-check/{}", self.base_url, customer_id)
    }
}

#[async_trait]
impl FraudClient for HttpFraudClient {
    async fn is_fraudster(
        &self,
        customer_id: i64,
        options: &CallOptions,
    ) -> Result<FraudCheckResponse, ClientError> {
        let check_url = self.check_url(customer_id);
        let url = check_url.as_str();

        retry_on_transient(&options.retry, |attempt| {
            let request = apply_options(self.http.get(url), options);
            async move {
                tracing::debug!(customer_id = customer_id, attempt = attempt, url = %url, "Calling fraud check");

                let response = dispatch(request, url).await?;
                response
                    .json::<FraudCheckResponse>()
                    .await
                    .map_err(|source| ClientError::Decode {
                        url: url.to_string(),
                        source,
                    })
            }
        })
        .await
    }
}

pub struct HttpNotificationClient {
    http: Client,
    base_url: String,
}

impl HttpNotificationClient {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: normalize_base_url(base_url),
        }
    }

    fn send_url(&self) -> String {
        format!("{}/api/v1/notifications", self.base_url)
    }
}

#[async_trait]
impl NotificationClient for HttpNotificationClient {
    async fn send(
        &self,
        request: &NotificationRequest,
        options: &CallOptions,
    ) -> Result<(), ClientError> {
        let send_url = self.send_url();
        let url = send_url.as_str();

        // The POST is not idempotent: resend only when the server never saw it
        // or answered with a server error.
        retry_when(&options.retry, ClientError::is_safe_to_resend, |attempt| {
            let builder = apply_options(self.http.post(url).json(request), options);
            async move {
                tracing::debug!(
                    customer_id = request.to_customer_id,
                    attempt = attempt,
                    url = %url,
                    "Calling notification service"
                );

                dispatch(builder, url).await.map(|_| ())
            }
        })
        .await
    }
}
