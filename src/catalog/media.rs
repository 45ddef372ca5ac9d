use async_trait::async_trait;
use tracing::debug;

use crate::clients::HttpClient;
use crate::error::Result;

/// Fetches product image bytes from the supplier's image host.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

pub struct HttpImageFetcher {
    http: HttpClient,
}

impl HttpImageFetcher {
    pub fn new() -> Result<Self> {
        Ok(Self {
            http: HttpClient::new(None)?,
        })
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.http.send(self.http.get(url)).await?;
        let bytes = response.bytes().await?;
        debug!(url, bytes = bytes.len(), "Fetched image");
        Ok(bytes.to_vec())
    }
}

/// File name for a media asset, taken from the last path segment of
/// the image URL. Falls back to a fixed name when the URL has no
/// usable path.
pub fn file_name_from_url(image_url: &str) -> String {
    url::Url::parse(image_url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|mut s| s.next_back().map(|n| n.to_string()))
        })
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "image".to_string())
}
