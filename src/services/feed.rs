use async_trait::async_trait;
use tracing::{debug, error, info};

use crate::clients::HttpClient;
use crate::config::FeedConfig;
use crate::error::{Error, Result};
use crate::models::FeedRecord;
use crate::services::soap;

/// Source of feed snapshots. The orchestrator only ever talks to this
/// trait; production wires in [`KevroFeedClient`], tests a stub.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch the full catalog feed, with every record stamped with
    /// `run_id`.
    async fn fetch_feed(&self, run_id: &str) -> Result<Vec<FeedRecord>>;
}

/// Client for the Kevro stock feed: a two-step SOAP exchange, `login`
/// followed by `GetFeedByEntityID`, which hands back the catalog as a
/// JSON payload inside the SOAP response.
pub struct KevroFeedClient {
    http: HttpClient,
    config: FeedConfig,
}

impl KevroFeedClient {
    pub fn new(config: FeedConfig) -> Result<Self> {
        let http = HttpClient::new(Some((
            config.http_user.clone(),
            config.http_password.clone(),
        )))?;
        Ok(Self { http, config })
    }

    async fn call(&self, operation: &str, params: &[(&str, &str)]) -> Result<String> {
        let envelope = soap::request_envelope(operation, params);

        debug!(operation, url = %self.config.endpoint, "Calling feed service");

        let request = self
            .http
            .post(&self.config.endpoint)
            .header("Content-Type", "text/xml; charset=utf-8")
            .header("SOAPAction", soap::soap_action(operation))
            .body(envelope);

        let response = self.http.send(request).await?;
        Ok(response.text().await?)
    }

    async fn login(&self) -> Result<()> {
        let body = self
            .call(
                "login",
                &[
                    ("TokenKey", &self.config.token_key),
                    ("username", &self.config.username),
                    ("psw", &self.config.password),
                    ("EntityName", &self.config.entity_name),
                    ("entityID", &self.config.entity_id),
                ],
            )
            .await?;

        let result = soap::require_element(&body, "loginResult")?;
        if !soap::element_is_true(&result) {
            error!("Feed login reported failure");
            return Err(Error::Auth);
        }
        Ok(())
    }

    async fn retrieve_feed(&self) -> Result<String> {
        let body = self
            .call(
                "GetFeedByEntityID",
                &[
                    ("entityID", &self.config.entity_id),
                    ("username", &self.config.username),
                    ("psw", &self.config.password),
                    ("ReturnType", &self.config.return_type),
                ],
            )
            .await?;

        let call_result = soap::require_element(&body, "Callresult")?;
        if !soap::element_is_true(&call_result) {
            let message = soap::extract_element(&body, "ErrorMsg")
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "feed call reported failure".to_string());
            error!(error = %message, "Feed retrieval rejected");
            return Err(Error::Remote(message));
        }

        soap::require_element(&body, "ResponseData")
    }
}

#[async_trait]
impl FeedSource for KevroFeedClient {
    async fn fetch_feed(&self, run_id: &str) -> Result<Vec<FeedRecord>> {
        self.login().await?;

        let payload = self.retrieve_feed().await?;
        let mut records: Vec<FeedRecord> = serde_json::from_str(&payload).map_err(|e| {
            error!(error = %e, "Feed payload is not valid JSON");
            Error::Json(e)
        })?;

        for record in &mut records {
            record.import_run_id = Some(run_id.to_string());
        }

        info!(run_id, records = records.len(), "Fetched feed snapshot");
        Ok(records)
    }
}
