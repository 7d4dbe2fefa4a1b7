use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::meals::dto::MealType;
use crate::vision::llm::LlmClient;

const SYSTEM_PROMPT: &str = "Tu es un expert en nutrition cétogène. Tu analyses des photos de \
repas et tu estimes leur composition nutritionnelle. Tu réponds toujours en français et \
uniquement avec l'objet JSON demandé.";

/// Typed per-meal estimate salvaged from the model's free-text answer.
/// Values are totals for the photographed serving, not per 100 g.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionEstimate {
    pub calories: f64,
    pub protein: f64,
    pub carbohydrates: f64,
    pub fat: f64,
    pub fiber: f64,
    pub net_carbs: f64,
    pub foods_detected: Vec<String>,
    pub portions: Vec<String>,
    pub keto_score: u8,
    pub confidence: f64,
}

impl NutritionEstimate {
    /// Product-fixed record served whenever the vision step cannot produce a
    /// parseable answer. Callers recognize it by `confidence == 0.5` and the
    /// sentinel food name. Do not change these values unilaterally.
    pub fn fallback() -> Self {
        Self {
            calories: 250.0,
            protein: 12.0,
            carbohydrates: 8.0,
            fat: 18.0,
            fiber: 3.0,
            net_carbs: 5.0,
            foods_detected: vec!["unidentified".to_string()],
            portions: vec!["standard".to_string()],
            keto_score: 6,
            confidence: 0.5,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.confidence == 0.5 && self.foods_detected == ["unidentified"]
    }

    /// Clamps out-of-range model output and realigns `portions` with
    /// `foods_detected`.
    fn sanitized(mut self) -> Self {
        self.keto_score = self.keto_score.clamp(1, 10);
        self.confidence = self.confidence.clamp(0.0, 1.0);
        self.portions.resize(self.foods_detected.len(), "standard".to_string());
        self
    }
}

pub struct VisionEstimator {
    llm: Arc<dyn LlmClient>,
}

impl VisionEstimator {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    /// Analyzes one meal photo. Never fails: transport errors and junk
    /// answers both resolve to the fallback estimate.
    pub async fn analyze(&self, image_base64: &str, meal_type: MealType) -> NutritionEstimate {
        let session_id = Uuid::new_v4();
        let prompt = build_prompt(meal_type);

        let text = match self
            .llm
            .complete(session_id, SYSTEM_PROMPT, &prompt, image_base64)
            .await
        {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, %session_id, "vision call failed, using fallback estimate");
                return NutritionEstimate::fallback();
            }
        };

        match parse_estimate(&text) {
            Some(estimate) => estimate,
            None => {
                warn!(%session_id, "vision answer not parseable, using fallback estimate");
                NutritionEstimate::fallback()
            }
        }
    }
}

fn build_prompt(meal_type: MealType) -> String {
    format!(
        "Analyse la photo de ce repas ({}) et estime sa composition. Réponds UNIQUEMENT avec un \
objet JSON de la forme: {{\"calories\": nombre, \"protein\": grammes, \"carbohydrates\": \
grammes, \"fat\": grammes, \"fiber\": grammes, \"net_carbs\": grammes, \"foods_detected\": \
[noms des aliments], \"portions\": [portions estimées, même longueur], \"keto_score\": entier \
de 1 à 10 (10 = idéal cétogène, 1 = incompatible), \"confidence\": nombre entre 0 et 1}}. Les \
valeurs sont les totaux du repas photographié.",
        meal_type.as_str()
    )
}

/// Takes the substring between the first `{` and the last `}` of the answer.
/// Models love to wrap JSON in prose or code fences.
pub(crate) fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

pub(crate) fn parse_estimate(text: &str) -> Option<NutritionEstimate> {
    let json = extract_json(text)?;
    let estimate: NutritionEstimate = serde_json::from_str(json).ok()?;
    Some(estimate.sanitized())
}
