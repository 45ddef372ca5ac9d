use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Categories the importer is allowed to bring into the catalog. Records
/// in any other category never reach the catalog writer.
pub const IMPORTABLE_CATEGORIES: [&str; 7] = [
    "Apparel",
    "Bags",
    "Chef Wear",
    "Gifts",
    "Head Wear",
    "Sports Wear",
    "Work Wear",
];

/// One SKU/variant row of the Kevro stock feed. Field names follow the
/// supplier's PascalCase wire schema; the snapshot file round-trips the
/// full record even though the import path only consumes part of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedRecord {
    #[serde(rename = "StockCode")]
    pub stock_code: String,
    #[serde(rename = "StockHeaderID")]
    pub stock_header_id: i64,
    /// Unique identity within a feed snapshot; becomes the catalog sku.
    #[serde(rename = "StockID")]
    pub stock_id: i64,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Colour")]
    pub colour: String,
    #[serde(rename = "Size")]
    pub size: String,
    #[serde(rename = "ColorStatus")]
    pub color_status: String,
    #[serde(rename = "BasePrice")]
    pub base_price: Decimal,
    #[serde(rename = "DiscountBasePrice")]
    pub discount_base_price: Decimal,
    #[serde(rename = "RoyaltyFactor")]
    pub royalty_factor: Decimal,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Type")]
    pub product_type: String,
    #[serde(rename = "Brand")]
    pub brand: String,
    #[serde(rename = "Image")]
    pub image_url: String,
    #[serde(rename = "QtyAvailable")]
    pub qty_available: i64,
    /// Run id stamped at fetch time; absent on the wire from the supplier.
    #[serde(rename = "ImportID", default, skip_serializing_if = "Option::is_none")]
    pub import_run_id: Option<String>,
    /// Per-warehouse quantity columns ("WH2(LBO)" etc.).
    #[serde(flatten)]
    pub warehouse_quantities: HashMap<String, i64>,
}

impl FeedRecord {
    /// Whether this record may be imported at all.
    pub fn is_eligible(&self) -> bool {
        IMPORTABLE_CATEGORIES.contains(&self.category.as_str())
    }
}
