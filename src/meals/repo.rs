use sqlx::{FromRow, PgPool};
use time::{Date, Duration, OffsetDateTime};
use uuid::Uuid;

use crate::nutrition::summary::MealContribution;

#[derive(Debug, Clone, FromRow)]
pub struct MealEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub meal_type: String,
    pub food_name: String,
    pub brand: Option<String>,
    pub quantity: f64,
    pub unit: String,
    pub calories: f64,
    pub protein: f64,
    pub carbohydrates: f64,
    pub fat: f64,
    pub fiber: f64,
    pub consumed_at: OffsetDateTime,
    pub created_at: OffsetDateTime,
}

impl MealEntry {
    pub fn net_carbs(&self) -> f64 {
        (self.carbohydrates - self.fiber).max(0.0)
    }

    pub fn contribution(&self) -> MealContribution {
        MealContribution {
            quantity: self.quantity,
            calories: self.calories,
            protein: self.protein,
            carbohydrates: self.carbohydrates,
            fat: self.fat,
            fiber: self.fiber,
        }
    }
}

pub struct NewMeal<'a> {
    pub meal_type: &'a str,
    pub food_name: &'a str,
    pub brand: Option<&'a str>,
    pub quantity: f64,
    pub unit: &'a str,
    pub calories: f64,
    pub protein: f64,
    pub carbohydrates: f64,
    pub fat: f64,
    pub fiber: f64,
    pub consumed_at: OffsetDateTime,
}

const COLUMNS: &str = "id, user_id, meal_type, food_name, brand, quantity, unit, \
calories, protein, carbohydrates, fat, fiber, consumed_at, created_at";

pub async fn insert(db: &PgPool, user_id: Uuid, meal: NewMeal<'_>) -> anyhow::Result<MealEntry> {
    let row = sqlx::query_as::<_, MealEntry>(&format!(
        r#"
        INSERT INTO meal_entries
            (user_id, meal_type, food_name, brand, quantity, unit,
             calories, protein, carbohydrates, fat, fiber, consumed_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(meal.meal_type)
    .bind(meal.food_name)
    .bind(meal.brand)
    .bind(meal.quantity)
    .bind(meal.unit)
    .bind(meal.calories)
    .bind(meal.protein)
    .bind(meal.carbohydrates)
    .bind(meal.fat)
    .bind(meal.fiber)
    .bind(meal.consumed_at)
    .fetch_one(db)
    .await?;
    Ok(row)
}

pub async fn list(
    db: &PgPool,
    user_id: Uuid,
    from: Option<OffsetDateTime>,
    to: Option<OffsetDateTime>,
    meal_type: Option<&str>,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<MealEntry>> {
    let rows = sqlx::query_as::<_, MealEntry>(&format!(
        r#"
        SELECT {COLUMNS}
        FROM meal_entries
        WHERE user_id = $1
          AND ($2::timestamptz IS NULL OR consumed_at >= $2)
          AND ($3::timestamptz IS NULL OR consumed_at < $3)
          AND ($4::text IS NULL OR meal_type = $4)
        ORDER BY consumed_at DESC
        LIMIT $5 OFFSET $6
        "#
    ))
    .bind(user_id)
    .bind(from)
    .bind(to)
    .bind(meal_type)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// All meals whose `consumed_at` falls inside the given calendar day,
/// interpreted as naive UTC (`[00:00, 24:00)` of that date).
pub async fn list_for_day(db: &PgPool, user_id: Uuid, day: Date) -> anyhow::Result<Vec<MealEntry>> {
    let start = day.midnight().assume_utc();
    let end = start + Duration::days(1);
    let rows = sqlx::query_as::<_, MealEntry>(&format!(
        r#"
        SELECT {COLUMNS}
        FROM meal_entries
        WHERE user_id = $1 AND consumed_at >= $2 AND consumed_at < $3
        ORDER BY consumed_at ASC
        "#
    ))
    .bind(user_id)
    .bind(start)
    .bind(end)
    .fetch_all(db)
    .await?;
    Ok(rows)
}
