use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use crate::nutrition::targets::{ActivityLevel, Gender, Goal};
use crate::users::repo::ProfileRow;

/// Onboarding payload: body metrics plus the dieting goal. Targets are
/// derived server-side, never accepted from the client.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub birth_date: Option<String>,
    pub gender: Gender,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub activity_level: ActivityLevel,
    pub goal: Goal,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user_id: Uuid,
    pub birth_date: Option<Date>,
    pub gender: Option<String>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub activity_level: Option<String>,
    pub goal: Option<String>,
    pub target_calories: Option<i32>,
    pub target_protein_g: Option<i32>,
    pub target_carbs_g: Option<i32>,
    pub target_fat_g: Option<i32>,
}

impl From<ProfileRow> for ProfileResponse {
    fn from(p: ProfileRow) -> Self {
        Self {
            user_id: p.user_id,
            birth_date: p.birth_date,
            gender: p.gender,
            height_cm: p.height_cm,
            weight_kg: p.weight_kg,
            activity_level: p.activity_level,
            goal: p.goal,
            target_calories: p.target_calories,
            target_protein_g: p.target_protein_g,
            target_carbs_g: p.target_carbs_g,
            target_fat_g: p.target_fat_g,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
