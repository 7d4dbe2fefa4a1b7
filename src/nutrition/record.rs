use serde::{Deserialize, Serialize};

/// Where a nutrient record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Local,
    Remote,
    Vision,
    Fallback,
}

/// Canonical per-100 g nutrient tuple. All masses are grams per 100 g of
/// product, calories are kcal per 100 g. Every nutrient is independently
/// optional: remote catalog data is full of holes and we never invent values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NutrientRecord {
    pub source: Source,
    pub external_id: String,
    pub barcode: Option<String>,
    pub name: String,
    pub brand: Option<String>,
    pub categories: Vec<String>,
    pub labels: Vec<String>,
    pub allergens: Vec<String>,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbohydrates: Option<f64>,
    pub fat: Option<f64>,
    pub fiber: Option<f64>,
    pub sugar: Option<f64>,
    pub sodium: Option<f64>,
    pub image_url: Option<String>,
    pub keto_score: Option<u8>,
    pub data_quality: f64,
}

impl NutrientRecord {
    /// Empty record for a given source; callers fill the fields they have
    /// and then call [`NutrientRecord::finalize`].
    pub fn new(source: Source, external_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            source,
            external_id: external_id.into(),
            barcode: None,
            name: name.into(),
            brand: None,
            categories: Vec::new(),
            labels: Vec::new(),
            allergens: Vec::new(),
            calories: None,
            protein: None,
            carbohydrates: None,
            fat: None,
            fiber: None,
            sugar: None,
            sodium: None,
            image_url: None,
            keto_score: None,
            data_quality: 0.0,
        }
    }

    /// Computes the derived fields (keto score, data quality) from whatever
    /// nutrients are present.
    pub fn finalize(mut self) -> Self {
        self.keto_score = keto_score(self.calories, self.carbohydrates, self.fat, self.fiber);
        self.data_quality = data_quality(&self);
        self
    }

    /// `max(0, carbs − fiber)`, only when carbohydrates are known.
    pub fn net_carbs(&self) -> Option<f64> {
        self.carbohydrates
            .map(|c| (c - self.fiber.unwrap_or(0.0)).max(0.0))
    }

    pub fn is_keto_friendly(&self) -> bool {
        self.keto_score.map_or(false, |s| s >= 7)
    }

    pub fn primary_category(&self) -> Option<&str> {
        self.categories.first().map(String::as_str)
    }
}

/// Keto compatibility score on a 1..=10 scale, per 100 g.
///
/// A band matches when the net-carb energy share is low enough *or* the fat
/// energy share is high enough; the first matching band wins. Returns `None`
/// when calories are absent or non-positive, or carbohydrates are unknown.
pub fn keto_score(
    calories: Option<f64>,
    carbohydrates: Option<f64>,
    fat: Option<f64>,
    fiber: Option<f64>,
) -> Option<u8> {
    let calories = calories.filter(|c| *c > 0.0)?;
    let net_carbs = (carbohydrates? - fiber.unwrap_or(0.0)).max(0.0);

    let carbs_share = net_carbs * 4.0 / calories * 100.0;
    let fat_share = fat.unwrap_or(0.0) * 9.0 / calories * 100.0;

    const BANDS: [(f64, f64, u8); 6] = [
        (2.0, 80.0, 10),
        (5.0, 70.0, 9),
        (8.0, 60.0, 8),
        (12.0, 50.0, 7),
        (15.0, 40.0, 6),
        (20.0, 30.0, 5),
    ];
    for (max_carbs, min_fat, score) in BANDS {
        if carbs_share <= max_carbs || fat_share >= min_fat {
            return Some(score);
        }
    }
    Some(match carbs_share {
        s if s <= 30.0 => 4,
        s if s <= 40.0 => 3,
        s if s <= 50.0 => 2,
        _ => 1,
    })
}

/// Weighted count of populated essential fields, normalized to [0, 1].
pub fn data_quality(record: &NutrientRecord) -> f64 {
    let mut points = 0u32;
    if !record.name.trim().is_empty() {
        points += 2;
    }
    if record.brand.is_some() {
        points += 1;
    }
    if record.calories.is_some() {
        points += 2;
    }
    if record.protein.is_some() {
        points += 1;
    }
    if record.carbohydrates.is_some() {
        points += 1;
    }
    if record.fat.is_some() {
        points += 1;
    }
    if record.fiber.is_some() {
        points += 1;
    }
    if record.image_url.is_some() {
        points += 1;
    }
    f64::from(points) / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(calories: f64, carbs: f64, fiber: f64, fat: f64) -> Option<u8> {
        keto_score(Some(calories), Some(carbs), Some(fat), Some(fiber))
    }

    #[test]
    fn canonical_high_fat_scores_ten() {
        // net_carbs 1, carbs_share 4, fat_share 81
        assert_eq!(score(100.0, 1.0, 0.0, 9.0), Some(10));
    }

    #[test]
    fn canonical_high_carb_scores_two() {
        // net_carbs 25, carbs_share 50, fat_share 22.5
        assert_eq!(score(200.0, 30.0, 5.0, 5.0), Some(2));
    }

    #[test]
    fn pure_fat_scores_ten() {
        assert_eq!(score(884.0, 0.0, 0.0, 100.0), Some(10));
    }

    #[test]
    fn sugar_heavy_scores_one() {
        // carbs_share well above 50, no fat rescue
        assert_eq!(score(400.0, 90.0, 0.0, 2.0), Some(1));
    }

    #[test]
    fn zero_calories_has_no_score() {
        assert_eq!(score(0.0, 5.0, 0.0, 1.0), None);
        assert_eq!(keto_score(None, Some(5.0), Some(1.0), None), None);
    }

    #[test]
    fn missing_carbs_has_no_score() {
        assert_eq!(keto_score(Some(100.0), None, Some(10.0), None), None);
    }

    #[test]
    fn fiber_exceeding_carbs_clamps_net_to_zero() {
        // net_carbs clamps at 0 -> carbs_share 0 -> band 1
        assert_eq!(score(50.0, 2.0, 5.0, 1.0), Some(10));
    }

    #[test]
    fn net_carbs_and_friendliness() {
        let mut r = NutrientRecord::new(Source::Local, "local-test", "Avocat");
        r.calories = Some(160.0);
        r.carbohydrates = Some(8.5);
        r.fiber = Some(6.7);
        r.fat = Some(14.7);
        let r = r.finalize();
        let net = r.net_carbs().unwrap();
        assert!((net - 1.8).abs() < 1e-9);
        // carbs_share 4.5, fat_share ~82.7 -> 10
        assert_eq!(r.keto_score, Some(10));
        assert!(r.is_keto_friendly());
    }

    #[test]
    fn keto_friendly_threshold_is_seven() {
        let mut r = NutrientRecord::new(Source::Local, "x", "x");
        r.keto_score = Some(7);
        assert!(r.is_keto_friendly());
        r.keto_score = Some(6);
        assert!(!r.is_keto_friendly());
        r.keto_score = None;
        assert!(!r.is_keto_friendly());
    }

    #[test]
    fn data_quality_counts_populated_fields() {
        let r = NutrientRecord::new(Source::Remote, "1", "Saumon");
        // name only
        assert!((data_quality(&r) - 0.2).abs() < 1e-9);

        let mut full = r.clone();
        full.brand = Some("Marque".into());
        full.calories = Some(208.0);
        full.protein = Some(20.0);
        full.carbohydrates = Some(0.0);
        full.fat = Some(13.0);
        full.fiber = Some(0.0);
        full.image_url = Some("https://example.org/p.jpg".into());
        assert!((data_quality(&full) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn wire_roundtrip_preserves_fields() {
        let mut r = NutrientRecord::new(Source::Remote, "3017620422003", "Pâte à tartiner");
        r.barcode = Some("3017620422003".into());
        r.brand = Some("Ferrero".into());
        r.calories = Some(539.0);
        r.carbohydrates = Some(57.5);
        r.fat = Some(30.9);
        r.fiber = Some(0.0);
        let r = r.finalize();

        let json = serde_json::to_string(&r).unwrap();
        let back: NutrientRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name, r.name);
        assert_eq!(back.barcode, r.barcode);
        assert_eq!(back.keto_score, r.keto_score);
        assert_eq!(back.calories, r.calories);
        assert_eq!(back.source, Source::Remote);
    }
}
