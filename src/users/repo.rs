use sqlx::{FromRow, PgPool};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::nutrition::targets::MacroTargets;

/// One profile row per user. Created empty at registration and completed on
/// onboarding; only visible to its owner through the repo filters.
#[derive(Debug, Clone, FromRow)]
pub struct ProfileRow {
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
    pub updated_at: OffsetDateTime,
}

impl ProfileRow {
    /// Derived targets, present once onboarding has run.
    pub fn targets(&self) -> Option<MacroTargets> {
        Some(MacroTargets {
            calories: self.target_calories?,
            protein_g: self.target_protein_g?,
            carbs_g: self.target_carbs_g?,
            fat_g: self.target_fat_g?,
        })
    }
}

const COLUMNS: &str = "user_id, birth_date, gender, height_cm, weight_kg, activity_level, \
goal, target_calories, target_protein_g, target_carbs_g, target_fat_g, updated_at";

/// Creates the empty profile row at registration; a second call is a no-op.
pub async fn ensure_profile(db: &PgPool, user_id: Uuid) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO profiles (user_id)
        VALUES ($1)
        ON CONFLICT (user_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn get_profile(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<ProfileRow>> {
    let row = sqlx::query_as::<_, ProfileRow>(&format!(
        r#"
        SELECT {COLUMNS}
        FROM profiles
        WHERE user_id = $1
        "#
    ))
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub struct ProfileUpdate<'a> {
    pub birth_date: Option<Date>,
    pub gender: &'a str,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub activity_level: &'a str,
    pub goal: &'a str,
    pub targets: MacroTargets,
}

pub async fn upsert_profile(
    db: &PgPool,
    user_id: Uuid,
    update: ProfileUpdate<'_>,
) -> anyhow::Result<ProfileRow> {
    let row = sqlx::query_as::<_, ProfileRow>(&format!(
        r#"
        INSERT INTO profiles
            (user_id, birth_date, gender, height_cm, weight_kg, activity_level, goal,
             target_calories, target_protein_g, target_carbs_g, target_fat_g, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, now())
        ON CONFLICT (user_id) DO UPDATE SET
            birth_date = EXCLUDED.birth_date,
            gender = EXCLUDED.gender,
            height_cm = EXCLUDED.height_cm,
            weight_kg = EXCLUDED.weight_kg,
            activity_level = EXCLUDED.activity_level,
            goal = EXCLUDED.goal,
            target_calories = EXCLUDED.target_calories,
            target_protein_g = EXCLUDED.target_protein_g,
            target_carbs_g = EXCLUDED.target_carbs_g,
            target_fat_g = EXCLUDED.target_fat_g,
            updated_at = now()
        RETURNING {COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(update.birth_date)
    .bind(update.gender)
    .bind(update.height_cm)
    .bind(update.weight_kg)
    .bind(update.activity_level)
    .bind(update.goal)
    .bind(update.targets.calories)
    .bind(update.targets.protein_g)
    .bind(update.targets.carbs_g)
    .bind(update.targets.fat_g)
    .fetch_one(db)
    .await?;
    Ok(row)
}
