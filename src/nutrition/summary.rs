use serde::Serialize;
use time::Date;

use crate::nutrition::targets::MacroTargets;

/// Per-serving nutrient contribution of one logged meal. Values are what was
/// captured at log time; `quantity` scales every field.
#[derive(Debug, Clone, Copy)]
pub struct MealContribution {
    pub quantity: f64,
    pub calories: f64,
    pub protein: f64,
    pub carbohydrates: f64,
    pub fat: f64,
    pub fiber: f64,
}

/// Daily aggregate over one calendar day of meals. Computed on demand and
/// never persisted. The day window is naive UTC.
#[derive(Debug, Clone, Serialize)]
pub struct DailySummary {
    pub date: Date,
    pub total_calories: f64,
    pub total_protein: f64,
    pub total_carbs: f64,
    pub total_fat: f64,
    pub total_fiber: f64,
    pub net_carbs: f64,
    pub calories_goal_percent: f64,
    pub protein_goal_percent: f64,
    pub carbs_goal_percent: f64,
    pub fat_goal_percent: f64,
    pub protein_energy_percent: f64,
    pub carbs_energy_percent: f64,
    pub fat_energy_percent: f64,
    pub meals_logged: usize,
    pub is_ketogenic_day: bool,
}

/// Sums the day's meal contributions against the user's targets.
///
/// Addition is commutative, so the result does not depend on entry order.
pub fn aggregate(date: Date, entries: &[MealContribution], targets: &MacroTargets) -> DailySummary {
    let mut calories = 0.0;
    let mut protein = 0.0;
    let mut carbs = 0.0;
    let mut fat = 0.0;
    let mut fiber = 0.0;

    for e in entries {
        calories += e.calories * e.quantity;
        protein += e.protein * e.quantity;
        carbs += e.carbohydrates * e.quantity;
        fat += e.fat * e.quantity;
        fiber += e.fiber * e.quantity;
    }

    let net_carbs = carbs - fiber;
    let carbs_energy_percent = energy_percent(carbs * 4.0, calories);
    let protein_energy_percent = energy_percent(protein * 4.0, calories);
    let fat_energy_percent = energy_percent(fat * 9.0, calories);

    DailySummary {
        date,
        total_calories: calories,
        total_protein: protein,
        total_carbs: carbs,
        total_fat: fat,
        total_fiber: fiber,
        net_carbs,
        calories_goal_percent: goal_percent(calories, f64::from(targets.calories)),
        protein_goal_percent: goal_percent(protein, f64::from(targets.protein_g)),
        carbs_goal_percent: goal_percent(carbs, f64::from(targets.carbs_g)),
        fat_goal_percent: goal_percent(fat, f64::from(targets.fat_g)),
        protein_energy_percent,
        carbs_energy_percent,
        fat_energy_percent,
        meals_logged: entries.len(),
        is_ketogenic_day: net_carbs <= 20.0 && carbs_energy_percent <= 10.0,
    }
}

fn energy_percent(kcal: f64, total_kcal: f64) -> f64 {
    if total_kcal <= 0.0 {
        0.0
    } else {
        kcal / total_kcal * 100.0
    }
}

fn goal_percent(actual: f64, target: f64) -> f64 {
    if target <= 0.0 {
        0.0
    } else {
        actual / target * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn meal(calories: f64, protein: f64, carbs: f64, fat: f64, fiber: f64) -> MealContribution {
        MealContribution {
            quantity: 1.0,
            calories,
            protein,
            carbohydrates: carbs,
            fat,
            fiber,
        }
    }

    fn sample_targets() -> MacroTargets {
        MacroTargets {
            calories: 1843,
            protein_g: 92,
            carbs_g: 23,
            fat_g: 154,
        }
    }

    #[test]
    fn three_meal_keto_day_composes() {
        let meals = [
            meal(420.0, 18.0, 6.0, 38.0, 5.0),
            meal(580.0, 35.0, 4.0, 47.0, 3.0),
            meal(520.0, 42.0, 8.0, 36.0, 4.0),
        ];
        let s = aggregate(date!(2025 - 03 - 10), &meals, &sample_targets());

        assert_eq!(s.total_calories, 1520.0);
        assert_eq!(s.total_protein, 95.0);
        assert_eq!(s.total_carbs, 18.0);
        assert_eq!(s.total_fat, 121.0);
        assert_eq!(s.total_fiber, 12.0);
        assert_eq!(s.net_carbs, 6.0);
        assert_eq!(s.meals_logged, 3);
        // carbs energy share ~4.7% and net carbs 6 g
        assert!(s.is_ketogenic_day);
        assert!((s.carbs_energy_percent - 4.736842).abs() < 1e-3);
    }

    #[test]
    fn aggregation_is_order_independent() {
        let mut meals = vec![
            meal(420.0, 18.0, 6.0, 38.0, 5.0),
            meal(580.0, 35.0, 4.0, 47.0, 3.0),
            meal(520.0, 42.0, 8.0, 36.0, 4.0),
        ];
        let a = aggregate(date!(2025 - 03 - 10), &meals, &sample_targets());
        meals.reverse();
        let b = aggregate(date!(2025 - 03 - 10), &meals, &sample_targets());
        assert_eq!(a.total_calories, b.total_calories);
        assert_eq!(a.net_carbs, b.net_carbs);
        assert_eq!(a.is_ketogenic_day, b.is_ketogenic_day);
    }

    #[test]
    fn quantity_scales_contributions() {
        let mut m = meal(100.0, 10.0, 5.0, 6.0, 2.0);
        m.quantity = 2.5;
        let s = aggregate(date!(2025 - 03 - 10), &[m], &sample_targets());
        assert_eq!(s.total_calories, 250.0);
        assert_eq!(s.total_protein, 25.0);
        assert_eq!(s.total_fiber, 5.0);
    }

    #[test]
    fn empty_day_is_all_zero_and_counts_as_keto() {
        // No meals means no carb energy at all; the flag still holds at the
        // boundary definition (0 <= 20 and 0 <= 10).
        let s = aggregate(date!(2025 - 03 - 10), &[], &sample_targets());
        assert_eq!(s.total_calories, 0.0);
        assert_eq!(s.protein_energy_percent, 0.0);
        assert_eq!(s.carbs_energy_percent, 0.0);
        assert_eq!(s.fat_energy_percent, 0.0);
        assert_eq!(s.meals_logged, 0);
        assert!(s.is_ketogenic_day);
    }

    #[test]
    fn zero_targets_yield_zero_goal_percentages() {
        let zero = MacroTargets {
            calories: 0,
            protein_g: 0,
            carbs_g: 0,
            fat_g: 0,
        };
        let s = aggregate(date!(2025 - 03 - 10), &[meal(400.0, 20.0, 5.0, 30.0, 2.0)], &zero);
        assert_eq!(s.calories_goal_percent, 0.0);
        assert_eq!(s.protein_goal_percent, 0.0);
        assert_eq!(s.carbs_goal_percent, 0.0);
        assert_eq!(s.fat_goal_percent, 0.0);
    }

    #[test]
    fn keto_day_boundary_is_inclusive() {
        // Exactly net_carbs = 20 and carbs energy share = 10%.
        let m = meal(800.0, 0.0, 20.0, 0.0, 0.0);
        let s = aggregate(date!(2025 - 03 - 10), &[m], &sample_targets());
        assert_eq!(s.net_carbs, 20.0);
        assert_eq!(s.carbs_energy_percent, 10.0);
        assert!(s.is_ketogenic_day);

        // One gram over tips it.
        let m = meal(800.0, 0.0, 21.0, 0.0, 0.0);
        let s = aggregate(date!(2025 - 03 - 10), &[m], &sample_targets());
        assert!(!s.is_ketogenic_day);
    }

    #[test]
    fn energy_shares_sum_to_hundred_when_consistent() {
        // 4/4/9 composition accounts for every calorie.
        let m = meal(4.0 * 30.0 + 4.0 * 20.0 + 9.0 * 40.0, 30.0, 20.0, 40.0, 0.0);
        let s = aggregate(date!(2025 - 03 - 10), &[m], &sample_targets());
        let sum = s.protein_energy_percent + s.carbs_energy_percent + s.fat_energy_percent;
        assert!((sum - 100.0).abs() < 0.5);
    }
}
