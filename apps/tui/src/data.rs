//! Dataset store: shop records and category aggregates, loaded once and
//! shared read-only with every chart.

use std::path::{Path, PathBuf};

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, StoryError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawShopRecord")]
pub struct ShopRecord {
    #[serde(rename = "Category_cleaned")]
    pub category: String,
    #[serde(rename = "Unit_Price")]
    pub unit_price: f64,
    #[serde(rename = "Total_GMV_cleaned")]
    pub total_gmv: f64,
    #[serde(rename = "Related creator")]
    pub related_creators: f64,
    #[serde(rename = "Related_video_cleaned")]
    pub related_videos: f64,
    #[serde(rename = "Selling products")]
    pub selling_products: f64,
    #[serde(rename = "Shop Name")]
    pub shop_name: String,
}

/// Row as it appears in the file. Older exports carry only the uncleaned
/// `Related_video` column; newer ones carry both.
#[derive(Deserialize)]
struct RawShopRecord {
    #[serde(rename = "Category_cleaned")]
    category: String,
    #[serde(rename = "Unit_Price", deserialize_with = "lenient_f64", default = "nan")]
    unit_price: f64,
    #[serde(
        rename = "Total_GMV_cleaned",
        deserialize_with = "lenient_f64",
        default = "nan"
    )]
    total_gmv: f64,
    #[serde(
        rename = "Related creator",
        deserialize_with = "lenient_f64",
        default = "nan"
    )]
    related_creators: f64,
    #[serde(
        rename = "Related_video_cleaned",
        deserialize_with = "lenient_f64",
        default = "nan"
    )]
    related_videos_cleaned: f64,
    #[serde(rename = "Related_video", deserialize_with = "lenient_f64", default = "nan")]
    related_videos_raw: f64,
    #[serde(
        rename = "Selling products",
        deserialize_with = "lenient_f64",
        default = "nan"
    )]
    selling_products: f64,
    #[serde(rename = "Shop Name", default)]
    shop_name: String,
}

impl From<RawShopRecord> for ShopRecord {
    fn from(raw: RawShopRecord) -> Self {
        let related_videos = if raw.related_videos_cleaned.is_nan() {
            raw.related_videos_raw
        } else {
            raw.related_videos_cleaned
        };
        Self {
            category: raw.category,
            unit_price: raw.unit_price,
            total_gmv: raw.total_gmv,
            related_creators: raw.related_creators,
            related_videos,
            selling_products: raw.selling_products,
            shop_name: raw.shop_name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAggregate {
    #[serde(rename = "Category_cleaned")]
    pub category: String,
    #[serde(rename = "AVG_GMV_USD", deserialize_with = "lenient_f64", default = "nan")]
    pub avg_gmv: f64,
    #[serde(
        rename = "AVG_Related_video",
        deserialize_with = "lenient_f64",
        default = "nan"
    )]
    pub avg_videos: f64,
}

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub shops: Vec<ShopRecord>,
    pub categories: Vec<CategoryAggregate>,
}

impl Dataset {
    pub const fn new(shops: Vec<ShopRecord>, categories: Vec<CategoryAggregate>) -> Self {
        Self { shops, categories }
    }

    /// Loads both files concurrently; neither is usable until both resolve.
    pub async fn load(shops_path: &Path, categories_path: &Path) -> Result<Self> {
        let (shops, categories) = tokio::try_join!(
            read_json::<Vec<ShopRecord>>(shops_path),
            read_json::<Vec<CategoryAggregate>>(categories_path),
        )?;

        info!(
            shops = shops.len(),
            categories = categories.len(),
            "dataset loaded"
        );

        Ok(Self { shops, categories })
    }

    /// Distinct shop categories in first-appearance order.
    pub fn category_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for shop in &self.shops {
            if !names.iter().any(|name| *name == shop.category) {
                names.push(shop.category.clone());
            }
        }
        names
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    debug!(path = %path.display(), "reading json");
    let bytes = tokio::fs::read(path).await.map_err(|source| StoryError::Io {
        path: PathBuf::from(path),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| StoryError::Json {
        path: PathBuf::from(path),
        source,
    })
}

const fn nan() -> f64 {
    f64::NAN
}

/// Accepts JSON numbers, numeric strings and null. Anything that does not
/// parse becomes NaN so statistics can skip it.
fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
        Missing(Option<()>),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Number(value) => value,
        Raw::Text(text) => text.trim().replace(',', "").parse().unwrap_or(f64::NAN),
        Raw::Missing(_) => f64::NAN,
    })
}
