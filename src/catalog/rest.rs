use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::catalog::{Catalog, EntryDraft, EntryId, MediaId, StockUpdate, TermId};
use crate::clients::HttpClient;
use crate::config::CatalogConfig;
use crate::error::{Error, Result};

const GALLERY_META_KEY: &str = "_product_image_gallery";

#[derive(Debug, Deserialize)]
struct IdResponse {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct TermResponse {
    id: i64,
    name: String,
}

/// WooCommerce-style REST implementation of the catalog interface.
/// Products live under `/wp-json/wc/v3`, media under `/wp-json/wp/v2`.
pub struct RestCatalog {
    http: HttpClient,
    config: CatalogConfig,
}

impl RestCatalog {
    pub fn new(config: CatalogConfig) -> Result<Self> {
        let http = HttpClient::new(Some((
            config.consumer_key.clone(),
            config.consumer_secret.clone(),
        )))?;
        Ok(Self { http, config })
    }

    fn products_url(&self, path: &str) -> String {
        format!("{}/wp-json/wc/v3/products{path}", self.config.base_url)
    }

    fn media_url(&self) -> String {
        format!("{}/wp-json/wp/v2/media", self.config.base_url)
    }

    async fn update_product(&self, entry: EntryId, body: serde_json::Value) -> Result<()> {
        let url = self.products_url(&format!("/{entry}"));
        let request = self.http.put(&url).json(&body);
        self.http
            .send(request)
            .await
            .map_err(write_error)?
            .json::<IdResponse>()
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Catalog for RestCatalog {
    async fn create_entry(&self, draft: &EntryDraft) -> Result<EntryId> {
        let body = json!({
            "name": draft.title,
            "type": "simple",
            "status": "publish",
            "description": draft.content,
            "short_description": draft.excerpt,
            "sku": draft.sku,
        });

        let request = self.http.post(&self.products_url("")).json(&body);
        let created: IdResponse = self
            .http
            .send(request)
            .await
            .map_err(write_error)?
            .json()
            .await?;

        debug!(entry_id = created.id, sku = %draft.sku, "Created catalog entry");
        Ok(created.id)
    }

    async fn set_visibility(&self, entry: EntryId, visible: bool) -> Result<()> {
        let visibility = if visible { "visible" } else { "hidden" };
        self.update_product(entry, json!({ "catalog_visibility": visibility }))
            .await
    }

    async fn set_stock(&self, entry: EntryId, stock: StockUpdate) -> Result<()> {
        self.update_product(
            entry,
            json!({
                "manage_stock": true,
                "stock_quantity": stock.quantity,
                "stock_status": if stock.in_stock { "instock" } else { "outofstock" },
            }),
        )
        .await
    }

    async fn set_prices(&self, entry: EntryId, regular: Decimal, sale: Decimal) -> Result<()> {
        self.update_product(
            entry,
            json!({
                "regular_price": regular.to_string(),
                "price": sale.to_string(),
            }),
        )
        .await
    }

    async fn find_category_term(&self, name: &str) -> Result<Option<TermId>> {
        let url = format!(
            "{}?search={}",
            self.products_url("/categories"),
            urlencode(name)
        );
        let terms: Vec<TermResponse> = self.http.send(self.http.get(&url)).await?.json().await?;

        // The search endpoint does substring matching; require an
        // exact name hit.
        Ok(terms.into_iter().find(|t| t.name == name).map(|t| t.id))
    }

    async fn assign_category(&self, entry: EntryId, term: TermId) -> Result<()> {
        self.update_product(entry, json!({ "categories": [{ "id": term }] }))
            .await
    }

    async fn create_media(&self, file_name: &str, bytes: Vec<u8>) -> Result<MediaId> {
        let request = self
            .http
            .post(&self.media_url())
            .header(
                "Content-Disposition",
                format!("attachment; filename=\"{file_name}\""),
            )
            .header("Content-Type", media_mime_type(file_name))
            .body(bytes);

        let created: IdResponse = self
            .http
            .send(request)
            .await
            .map_err(write_error)?
            .json()
            .await?;
        Ok(created.id)
    }

    async fn set_featured_image(&self, entry: EntryId, media: MediaId) -> Result<()> {
        self.update_product(entry, json!({ "images": [{ "id": media }] }))
            .await
    }

    async fn append_gallery_image(&self, entry: EntryId, media: MediaId) -> Result<()> {
        // The gallery lives in a comma-joined meta field; appending is
        // a read-modify-write of that one value.
        let url = self.products_url(&format!("/{entry}"));
        let product: serde_json::Value = self.http.send(self.http.get(&url)).await?.json().await?;

        let existing = product["meta_data"]
            .as_array()
            .into_iter()
            .flatten()
            .find(|m| m["key"] == GALLERY_META_KEY)
            .and_then(|m| m["value"].as_str())
            .unwrap_or("")
            .to_string();

        let joined = if existing.is_empty() {
            media.to_string()
        } else {
            format!("{existing},{media}")
        };

        self.update_product(
            entry,
            json!({
                "meta_data": [{ "key": GALLERY_META_KEY, "value": joined }],
            }),
        )
        .await
    }
}

fn write_error(err: Error) -> Error {
    match err {
        Error::Remote(message) => Error::Write(message),
        other => other,
    }
}

fn urlencode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

fn media_mime_type(file_name: &str) -> &'static str {
    match file_name.rsplit('.').next() {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    }
}
