use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Intense,
    Extreme,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    Loss,
    Maintain,
    Gain,
    Muscle,
    FatLoss,
}

/// Derived daily targets, rounded to whole kcal / grams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroTargets {
    pub calories: i32,
    pub protein_g: i32,
    pub carbs_g: i32,
    pub fat_g: i32,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

impl FromStr for Gender {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            other => anyhow::bail!("unknown gender: {other}"),
        }
    }
}

impl ActivityLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::Light => "light",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::Intense => "intense",
            ActivityLevel::Extreme => "extreme",
        }
    }

    fn multiplier(self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Intense => 1.725,
            ActivityLevel::Extreme => 1.9,
        }
    }
}

impl FromStr for ActivityLevel {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sedentary" => Ok(ActivityLevel::Sedentary),
            "light" => Ok(ActivityLevel::Light),
            "moderate" => Ok(ActivityLevel::Moderate),
            "intense" => Ok(ActivityLevel::Intense),
            "extreme" => Ok(ActivityLevel::Extreme),
            other => anyhow::bail!("unknown activity level: {other}"),
        }
    }
}

impl Goal {
    pub fn as_str(self) -> &'static str {
        match self {
            Goal::Loss => "loss",
            Goal::Maintain => "maintain",
            Goal::Gain => "gain",
            Goal::Muscle => "muscle",
            Goal::FatLoss => "fat_loss",
        }
    }
}

impl FromStr for Goal {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "loss" => Ok(Goal::Loss),
            "maintain" => Ok(Goal::Maintain),
            "gain" => Ok(Goal::Gain),
            "muscle" => Ok(Goal::Muscle),
            "fat_loss" => Ok(Goal::FatLoss),
            other => anyhow::bail!("unknown goal: {other}"),
        }
    }
}

// Ketogenic macro split: 5% carbs / 20% protein / 75% fat of daily energy.
const CARBS_ENERGY_SHARE: f64 = 0.05;
const PROTEIN_ENERGY_SHARE: f64 = 0.20;
const FAT_ENERGY_SHARE: f64 = 0.75;

/// Derives daily calorie and macro targets from body metrics.
///
/// Body fat is a coarse height-adjusted estimate, lean mass feeds the
/// Katch-McArdle BMR, and the goal shifts the activity-adjusted expenditure.
pub fn calculate_targets(
    weight_kg: f64,
    height_cm: f64,
    gender: Gender,
    activity: ActivityLevel,
    goal: Goal,
) -> MacroTargets {
    let (calories, protein_g, carbs_g, fat_g) =
        unrounded_targets(weight_kg, height_cm, gender, activity, goal);
    MacroTargets {
        calories: calories.round() as i32,
        protein_g: protein_g.round() as i32,
        carbs_g: carbs_g.round() as i32,
        fat_g: fat_g.round() as i32,
    }
}

fn unrounded_targets(
    weight_kg: f64,
    height_cm: f64,
    gender: Gender,
    activity: ActivityLevel,
    goal: Goal,
) -> (f64, f64, f64, f64) {
    let body_fat = estimate_body_fat(gender, height_cm);
    let lean_mass = weight_kg * (1.0 - body_fat);
    let bmr = 370.0 + 21.6 * lean_mass;
    let tdee = bmr * activity.multiplier();

    // TODO: give Muscle and FatLoss their own calorie offsets instead of
    // inheriting the Loss deficit.
    let calories = match goal {
        Goal::Loss | Goal::Muscle | Goal::FatLoss => tdee - 500.0,
        Goal::Gain => tdee + 300.0,
        Goal::Maintain => tdee,
    };

    let carbs_g = calories * CARBS_ENERGY_SHARE / 4.0;
    let protein_g = calories * PROTEIN_ENERGY_SHARE / 4.0;
    let fat_g = calories * FAT_ENERGY_SHARE / 9.0;
    (calories, protein_g, carbs_g, fat_g)
}

/// Height-adjusted body-fat fraction. Gender `other` follows the female
/// curve by convention.
fn estimate_body_fat(gender: Gender, height_cm: f64) -> f64 {
    let percent = match gender {
        Gender::Male => (20.0 - (height_cm - 175.0) * 0.1).clamp(10.0, 25.0),
        Gender::Female | Gender::Other => (25.0 - (height_cm - 165.0) * 0.1).clamp(16.0, 35.0),
    };
    percent / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_female_loss_targets() {
        let t = calculate_targets(
            70.0,
            170.0,
            Gender::Female,
            ActivityLevel::Moderate,
            Goal::Loss,
        );
        assert_eq!(t.calories, 1843);
        assert_eq!(t.carbs_g, 23);
        assert_eq!(t.protein_g, 92);
        assert_eq!(t.fat_g, 154);
    }

    #[test]
    fn energy_split_sums_to_calories() {
        for (gender, activity, goal) in [
            (Gender::Male, ActivityLevel::Sedentary, Goal::Maintain),
            (Gender::Female, ActivityLevel::Extreme, Goal::Gain),
            (Gender::Other, ActivityLevel::Light, Goal::FatLoss),
        ] {
            let (calories, protein, carbs, fat) =
                unrounded_targets(82.5, 178.0, gender, activity, goal);
            let from_macros = protein * 4.0 + carbs * 4.0 + fat * 9.0;
            assert!(
                (from_macros - calories).abs() < 1.0,
                "split drifted: {from_macros} vs {calories}"
            );
        }
    }

    #[test]
    fn body_fat_clamps_at_curve_bounds() {
        // Very tall male hits the 10% floor, very short female the 35% cap.
        assert!((estimate_body_fat(Gender::Male, 300.0) - 0.10).abs() < 1e-9);
        assert!((estimate_body_fat(Gender::Female, 60.0) - 0.35).abs() < 1e-9);
    }

    #[test]
    fn other_gender_follows_female_curve() {
        assert_eq!(
            estimate_body_fat(Gender::Other, 170.0),
            estimate_body_fat(Gender::Female, 170.0)
        );
    }

    #[test]
    fn muscle_and_fat_loss_inherit_loss_offset() {
        let loss = calculate_targets(70.0, 170.0, Gender::Male, ActivityLevel::Moderate, Goal::Loss);
        let muscle =
            calculate_targets(70.0, 170.0, Gender::Male, ActivityLevel::Moderate, Goal::Muscle);
        let fat_loss = calculate_targets(
            70.0,
            170.0,
            Gender::Male,
            ActivityLevel::Moderate,
            Goal::FatLoss,
        );
        assert_eq!(loss, muscle);
        assert_eq!(loss, fat_loss);
    }

    #[test]
    fn gain_adds_surplus_over_maintain() {
        let maintain =
            calculate_targets(70.0, 170.0, Gender::Male, ActivityLevel::Moderate, Goal::Maintain);
        let gain = calculate_targets(70.0, 170.0, Gender::Male, ActivityLevel::Moderate, Goal::Gain);
        assert_eq!(gain.calories - maintain.calories, 300);
    }

    #[test]
    fn enum_string_roundtrips() {
        for goal in [Goal::Loss, Goal::Maintain, Goal::Gain, Goal::Muscle, Goal::FatLoss] {
            assert_eq!(goal.as_str().parse::<Goal>().unwrap(), goal);
        }
        for level in [
            ActivityLevel::Sedentary,
            ActivityLevel::Light,
            ActivityLevel::Moderate,
            ActivityLevel::Intense,
            ActivityLevel::Extreme,
        ] {
            assert_eq!(level.as_str().parse::<ActivityLevel>().unwrap(), level);
        }
    }
}
