use serde::{Deserialize, Serialize};

use crate::meals::dto::MealType;
use crate::vision::estimator::NutritionEstimate;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub image_base64: String,
    pub meal_type: MealType,
}

/// Per-serving totals of the analyzed plate (not per 100 g).
#[derive(Debug, Serialize)]
pub struct TotalNutrition {
    pub calories: f64,
    pub protein: f64,
    pub carbohydrates: f64,
    pub fat: f64,
    pub fiber: f64,
    pub net_carbs: f64,
    pub keto_score: u8,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub foods_detected: Vec<String>,
    pub total_nutrition: TotalNutrition,
    pub analysis_confidence: f64,
    pub processing_time_ms: u64,
    pub suggestions: Vec<String>,
}

impl AnalyzeResponse {
    pub fn from_estimate(estimate: NutritionEstimate, processing_time_ms: u64) -> Self {
        let suggestions = suggestions_for(&estimate);
        Self {
            foods_detected: estimate.foods_detected,
            total_nutrition: TotalNutrition {
                calories: estimate.calories,
                protein: estimate.protein,
                carbohydrates: estimate.carbohydrates,
                fat: estimate.fat,
                fiber: estimate.fiber,
                net_carbs: estimate.net_carbs,
                keto_score: estimate.keto_score,
            },
            analysis_confidence: estimate.confidence,
            processing_time_ms,
            suggestions,
        }
    }
}

fn suggestions_for(estimate: &NutritionEstimate) -> Vec<String> {
    let mut out = Vec::new();
    if estimate.is_fallback() {
        out.push("L'analyse automatique n'a pas abouti, estimation générique affichée.".to_string());
    }
    match estimate.keto_score {
        7..=10 => out.push("Ce repas est compatible avec votre objectif cétogène.".to_string()),
        4..=6 => out.push(
            "Repas modérément cétogène : privilégiez davantage de lipides au prochain repas."
                .to_string(),
        ),
        _ => out.push("Ce repas est riche en glucides, attention à votre seuil quotidien.".to_string()),
    }
    if estimate.net_carbs > 10.0 {
        out.push(format!(
            "Environ {:.0} g de glucides nets : pensez à compenser sur le reste de la journée.",
            estimate.net_carbs
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_estimate_is_flagged_in_suggestions() {
        let response = AnalyzeResponse::from_estimate(NutritionEstimate::fallback(), 12);
        assert_eq!(response.analysis_confidence, 0.5);
        assert_eq!(response.foods_detected, vec!["unidentified"]);
        assert!(response.suggestions[0].contains("estimation générique"));
    }

    #[test]
    fn keto_friendly_estimate_gets_positive_suggestion() {
        let mut e = NutritionEstimate::fallback();
        e.confidence = 0.9;
        e.foods_detected = vec!["saumon".into()];
        e.keto_score = 9;
        e.net_carbs = 3.0;
        let response = AnalyzeResponse::from_estimate(e, 40);
        assert_eq!(response.suggestions.len(), 1);
        assert!(response.suggestions[0].contains("compatible"));
    }
}
