use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::nutrition::record::{NutrientRecord, Source};

/// Wire shape of one food item, nutrients per 100 g.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodItem {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub calories_per_100g: Option<f64>,
    pub proteins_per_100g: Option<f64>,
    pub carbs_per_100g: Option<f64>,
    pub fats_per_100g: Option<f64>,
    pub fiber_per_100g: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    pub source: Source,
    pub keto_score: Option<u8>,
    pub is_keto_friendly: bool,
    pub data_quality: f64,
}

impl From<NutrientRecord> for FoodItem {
    fn from(r: NutrientRecord) -> Self {
        Self {
            id: r.external_id.clone(),
            name: r.name.clone(),
            brand: r.brand.clone(),
            category: r.primary_category().map(str::to_string),
            calories_per_100g: r.calories,
            proteins_per_100g: r.protein,
            carbs_per_100g: r.carbohydrates,
            fats_per_100g: r.fat,
            fiber_per_100g: r.fiber,
            image_url: r.image_url.clone(),
            barcode: r.barcode.clone(),
            source: r.source,
            keto_score: r.keto_score,
            is_keto_friendly: r.is_keto_friendly(),
            data_quality: r.data_quality,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_search_limit")]
    pub limit: usize,
    pub category: Option<String>,
}

fn default_search_limit() -> usize {
    20
}

#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    pub barcode: String,
}

#[derive(Debug, Serialize)]
pub struct ScanResponse {
    pub barcode: String,
    pub food_data: Option<FoodItem>,
    pub found: bool,
}

#[derive(Debug, Deserialize)]
pub struct RecentSearchParams {
    #[serde(default = "default_recent_limit")]
    pub limit: i64,
}

fn default_recent_limit() -> i64 {
    10
}

#[derive(Debug, Serialize)]
pub struct RecentSearchItem {
    pub query: String,
    #[serde(with = "time::serde::rfc3339")]
    pub searched_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foods::local::LOCAL_FOODS;

    #[test]
    fn wire_shape_roundtrips() {
        let item = FoodItem::from(LOCAL_FOODS[0].clone());
        let json = serde_json::to_string(&item).unwrap();
        let back: FoodItem = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, item.id);
        assert_eq!(back.name, item.name);
        assert_eq!(back.calories_per_100g, item.calories_per_100g);
        assert_eq!(back.keto_score, item.keto_score);
        assert_eq!(back.is_keto_friendly, item.is_keto_friendly);
    }

    #[test]
    fn absent_optionals_are_omitted() {
        let mut record = LOCAL_FOODS[0].clone();
        record.brand = None;
        record.barcode = None;
        record.image_url = None;
        let json = serde_json::to_string(&FoodItem::from(record)).unwrap();
        assert!(!json.contains("\"brand\""));
        assert!(!json.contains("\"barcode\""));
        assert!(!json.contains("\"image_url\""));
    }
}
