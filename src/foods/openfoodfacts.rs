use std::time::Duration;

use serde_json::Value;
use tracing::warn;

use crate::config::CatalogConfig;
use crate::nutrition::record::{NutrientRecord, Source};

const USER_AGENT: &str = concat!("KetoTrack/", env!("CARGO_PKG_VERSION"), " (backend)");
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const MAX_CATEGORIES: usize = 10;
const MAX_LABELS: usize = 15;
const MAX_ALLERGENS: usize = 10;

/// Client for the public open-food catalog. One long-lived connection pool,
/// read-only after construction. Every failure degrades to an empty result;
/// nothing from here ever reaches an HTTP caller as an error.
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: String,
    country: String,
    language: String,
}

impl CatalogClient {
    pub fn new(config: &CatalogConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            country: config.country.clone(),
            language: config.language.clone(),
        })
    }

    /// Free-text product search. Network, decode or schema trouble yields an
    /// empty list and a warning in the log.
    pub async fn search(&self, query: &str, limit: usize) -> Vec<NutrientRecord> {
        match self.search_inner(query, limit).await {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, %query, "catalog search failed, returning no remote results");
                Vec::new()
            }
        }
    }

    async fn search_inner(&self, query: &str, limit: usize) -> anyhow::Result<Vec<NutrientRecord>> {
        let url = format!("{}/cgi/search.pl", self.base_url);
        let body: Value = self
            .http
            .get(&url)
            .query(&[
                ("search_terms", query),
                ("search_simple", "1"),
                ("action", "process"),
                ("json", "1"),
                ("page_size", &limit.to_string()),
                ("cc", &self.country),
                ("lc", &self.language),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(parse_search_response(&body, limit))
    }

    /// Barcode lookup. `None` for not-found, unparseable and transport
    /// failures alike.
    pub async fn product_by_barcode(&self, code: &str) -> Option<NutrientRecord> {
        match self.barcode_inner(code).await {
            Ok(found) => found,
            Err(e) => {
                warn!(error = %e, barcode = %code, "catalog barcode lookup failed");
                None
            }
        }
    }

    async fn barcode_inner(&self, code: &str) -> anyhow::Result<Option<NutrientRecord>> {
        let url = format!("{}/api/v2/product/{}.json", self.base_url, code);
        let body: Value = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(parse_barcode_response(&body))
    }
}

pub(crate) fn parse_search_response(body: &Value, limit: usize) -> Vec<NutrientRecord> {
    body["products"]
        .as_array()
        .map(|products| {
            products
                .iter()
                .filter_map(normalize_product)
                .take(limit)
                .collect()
        })
        .unwrap_or_default()
}

/// A barcode response only counts when the status flag says the product was
/// found; an attached product object alone is not enough.
pub(crate) fn parse_barcode_response(body: &Value) -> Option<NutrientRecord> {
    if body["status"].as_i64() != Some(1) {
        return None;
    }
    normalize_product(&body["product"])
}

/// Maps one heterogeneous catalog product onto the closed nutrient record.
/// Every field is read defensively; a product without a usable name is
/// dropped.
fn normalize_product(product: &Value) -> Option<NutrientRecord> {
    let name = string_field(product, "product_name")
        .or_else(|| string_field(product, "product_name_fr"))
        .or_else(|| string_field(product, "generic_name"))?;
    let code = string_field(product, "code").or_else(|| string_field(product, "_id"))?;

    let nutriments = &product["nutriments"];
    let mut r = NutrientRecord::new(Source::Remote, code.clone(), name);
    r.barcode = Some(code);
    r.brand = string_field(product, "brands");
    r.categories = split_listing(&product["categories"], MAX_CATEGORIES);
    r.labels = split_listing(&product["labels"], MAX_LABELS);
    r.allergens = split_listing(&product["allergens"], MAX_ALLERGENS);
    r.calories = coerce_number(&nutriments["energy-kcal_100g"]);
    r.protein = coerce_number(&nutriments["proteins_100g"]);
    r.carbohydrates = coerce_number(&nutriments["carbohydrates_100g"]);
    r.fat = coerce_number(&nutriments["fat_100g"]);
    r.fiber = coerce_number(&nutriments["fiber_100g"]);
    r.sugar = coerce_number(&nutriments["sugars_100g"]);
    r.sodium = coerce_number(&nutriments["sodium_100g"]);
    r.image_url = string_field(product, "image_front_url")
        .or_else(|| string_field(product, "image_url"));
    Some(r.finalize())
}

/// Numeric coercion for catalog values: numbers pass through, numeric
/// strings are parsed, everything else (absent, empty, junk) is `None`.
fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite() && *v >= 0.0),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v >= 0.0),
        _ => None,
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value[key]
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Comma-separated listing fields: split, trim, drop empties, dedupe
/// preserving first occurrence, cap.
fn split_listing(value: &Value, cap: usize) -> Vec<String> {
    let Some(raw) = value.as_str() else {
        return Vec::new();
    };
    let mut out: Vec<String> = Vec::new();
    for item in raw.split(',') {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }
        if out.iter().any(|seen| seen.eq_ignore_ascii_case(item)) {
            continue;
        }
        out.push(item.to_string());
        if out.len() == cap {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn product_fixture() -> Value {
        json!({
            "code": "3017620422003",
            "product_name": "Pâte à tartiner",
            "brands": "Ferrero",
            "categories": "Petit-déjeuners, Pâtes à tartiner, Petit-déjeuners",
            "labels": "Sans gluten",
            "allergens": "en:milk, en:nuts",
            "image_front_url": "https://images.example.org/3017620422003.jpg",
            "nutriments": {
                "energy-kcal_100g": 539,
                "proteins_100g": "6.3",
                "carbohydrates_100g": 57.5,
                "fat_100g": 30.9,
                "fiber_100g": "",
                "sugars_100g": 56.3
            }
        })
    }

    #[test]
    fn normalizes_whitelisted_fields() {
        let r = normalize_product(&product_fixture()).unwrap();
        assert_eq!(r.source, Source::Remote);
        assert_eq!(r.barcode.as_deref(), Some("3017620422003"));
        assert_eq!(r.brand.as_deref(), Some("Ferrero"));
        assert_eq!(r.calories, Some(539.0));
        // numeric string coerces
        assert_eq!(r.protein, Some(6.3));
        // empty string does not
        assert_eq!(r.fiber, None);
        assert_eq!(r.sodium, None);
        // dedup preserved order
        assert_eq!(r.categories, vec!["Petit-déjeuners", "Pâtes à tartiner"]);
        assert_eq!(r.allergens, vec!["en:milk", "en:nuts"]);
        // derived fields are populated
        assert!(r.keto_score.is_some());
        assert!(r.data_quality > 0.5);
    }

    #[test]
    fn product_without_name_is_dropped() {
        let v = json!({"code": "123", "nutriments": {}});
        assert!(normalize_product(&v).is_none());
    }

    #[test]
    fn coercion_never_panics_on_junk() {
        assert_eq!(coerce_number(&json!(12.5)), Some(12.5));
        assert_eq!(coerce_number(&json!("12.5")), Some(12.5));
        assert_eq!(coerce_number(&json!(" 7 ")), Some(7.0));
        assert_eq!(coerce_number(&json!("")), None);
        assert_eq!(coerce_number(&json!("beaucoup")), None);
        assert_eq!(coerce_number(&json!(null)), None);
        assert_eq!(coerce_number(&json!({"v": 1})), None);
        assert_eq!(coerce_number(&json!(-4.0)), None);
    }

    #[test]
    fn listings_are_capped() {
        let many = (0..30).map(|i| format!("cat{i}")).collect::<Vec<_>>().join(",");
        let v = json!(many);
        assert_eq!(split_listing(&v, MAX_CATEGORIES).len(), MAX_CATEGORIES);
        assert_eq!(split_listing(&v, MAX_LABELS).len(), MAX_LABELS);
    }

    #[test]
    fn barcode_status_gate_wins_over_attached_product() {
        let mut body = json!({
            "status": 0,
            "status_verbose": "product not found",
            "product": product_fixture(),
        });
        assert!(parse_barcode_response(&body).is_none());

        body["status"] = json!(1);
        let r = parse_barcode_response(&body).unwrap();
        assert_eq!(r.barcode.as_deref(), Some("3017620422003"));
    }

    #[test]
    fn search_response_without_products_is_empty() {
        assert!(parse_search_response(&json!({}), 10).is_empty());
        assert!(parse_search_response(&json!({"products": "oops"}), 10).is_empty());
    }

    #[test]
    fn search_response_respects_limit_and_skips_nameless() {
        let body = json!({
            "products": [
                product_fixture(),
                {"code": "1", "nutriments": {}},
                {"code": "2", "product_name": "Fromage blanc", "nutriments": {}},
                {"code": "3", "product_name": "Yaourt nature", "nutriments": {}},
            ]
        });
        let records = parse_search_response(&body, 2);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Pâte à tartiner");
        assert_eq!(records[1].name, "Fromage blanc");
    }
}
