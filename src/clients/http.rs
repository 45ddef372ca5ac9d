use http::StatusCode;
use reqwest::{Client, RequestBuilder, Response};
use tracing::{debug, error};

use crate::error::{Error, Result};

/// Thin wrapper around a shared `reqwest::Client` that applies optional
/// basic-auth credentials to every request and maps failure statuses
/// onto the crate error taxonomy.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    credentials: Option<(String, String)>,
}

impl HttpClient {
    pub fn new(credentials: Option<(String, String)>) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            credentials,
        })
    }

    pub fn get(&self, url: &str) -> RequestBuilder {
        self.with_auth(self.client.get(url))
    }

    pub fn post(&self, url: &str) -> RequestBuilder {
        self.with_auth(self.client.post(url))
    }

    pub fn put(&self, url: &str) -> RequestBuilder {
        self.with_auth(self.client.put(url))
    }

    fn with_auth(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Some((user, password)) => request.basic_auth(user, Some(password)),
            None => request,
        }
    }

    pub async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;

        debug!(
            status = response.status().as_u16(),
            url = %response.url(),
            "Response received"
        );

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                error!(url = %response.url(), "Request rejected by remote auth");
                Err(Error::Auth)
            }
            status if status.is_client_error() || status.is_server_error() => {
                Err(Error::Remote(format!(
                    "{} returned status {}",
                    response.url(),
                    status
                )))
            }
            _ => Ok(response),
        }
    }
}
