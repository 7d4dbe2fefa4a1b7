use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use time::{format_description::FormatItem, macros::format_description, Date, OffsetDateTime};
use tracing::{error, instrument};
use uuid::Uuid;

use crate::{
    auth::services::AuthUser,
    meals::{
        dto::{CreateMealRequest, ListMealsParams, MealResponse, SummaryParams},
        repo::{self, MealEntry, NewMeal},
    },
    nutrition::{
        summary::{self, DailySummary},
        targets::MacroTargets,
    },
    state::AppState,
    users,
};

const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/meals", post(create_meal).get(list_meals))
        .route("/meals/today", get(todays_meals))
        .route("/meals/daily-summary/:user_id", get(daily_summary))
}

impl From<MealEntry> for MealResponse {
    fn from(m: MealEntry) -> Self {
        let net_carbs = m.net_carbs();
        Self {
            id: m.id,
            meal_type: m.meal_type,
            food_name: m.food_name,
            brand: m.brand,
            quantity: m.quantity,
            unit: m.unit,
            calories: m.calories,
            protein: m.protein,
            carbohydrates: m.carbohydrates,
            fat: m.fat,
            fiber: m.fiber,
            net_carbs,
            consumed_at: m.consumed_at,
        }
    }
}

#[instrument(skip(state, body))]
async fn create_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<CreateMealRequest>,
) -> Result<(StatusCode, Json<MealResponse>), (StatusCode, String)> {
    if body.food_name.trim().is_empty() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            "Le nom de l'aliment est obligatoire".into(),
        ));
    }
    if !(body.quantity > 0.0) {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            "La quantité doit être strictement positive".into(),
        ));
    }
    for value in [body.calories, body.protein, body.carbohydrates, body.fat, body.fiber] {
        if value < 0.0 || !value.is_finite() {
            return Err((
                StatusCode::UNPROCESSABLE_ENTITY,
                "Les valeurs nutritionnelles doivent être positives".into(),
            ));
        }
    }

    let meal = repo::insert(
        &state.db,
        user_id,
        NewMeal {
            meal_type: body.meal_type.as_str(),
            food_name: body.food_name.trim(),
            brand: body.brand.as_deref(),
            quantity: body.quantity,
            unit: &body.unit,
            calories: body.calories,
            protein: body.protein,
            carbohydrates: body.carbohydrates,
            fat: body.fat,
            fiber: body.fiber,
            consumed_at: body.consumed_at.unwrap_or_else(OffsetDateTime::now_utc),
        },
    )
    .await
    .map_err(|e| {
        error!(error = %e, %user_id, "create meal failed");
        internal()
    })?;

    Ok((StatusCode::CREATED, Json(MealResponse::from(meal))))
}

#[instrument(skip(state))]
async fn list_meals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<ListMealsParams>,
) -> Result<Json<Vec<MealResponse>>, (StatusCode, String)> {
    let from = parse_day_bound(params.date_from.as_deref(), false)?;
    let to = parse_day_bound(params.date_to.as_deref(), true)?;
    let limit = params.limit.clamp(1, 200);
    let offset = params.offset.max(0);

    let meals = repo::list(
        &state.db,
        user_id,
        from,
        to,
        params.meal_type.map(|t| t.as_str()),
        limit,
        offset,
    )
    .await
    .map_err(|e| {
        error!(error = %e, %user_id, "list meals failed");
        internal()
    })?;

    Ok(Json(meals.into_iter().map(MealResponse::from).collect()))
}

#[instrument(skip(state))]
async fn todays_meals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<MealResponse>>, (StatusCode, String)> {
    let today = OffsetDateTime::now_utc().date();
    let meals = repo::list_for_day(&state.db, user_id, today)
        .await
        .map_err(|e| {
            error!(error = %e, %user_id, "today's meals failed");
            internal()
        })?;
    Ok(Json(meals.into_iter().map(MealResponse::from).collect()))
}

/// Daily aggregate for one calendar day (naive UTC window). The path user
/// must match the bearer; everything else is someone else's data.
#[instrument(skip(state))]
async fn daily_summary(
    State(state): State<AppState>,
    AuthUser(auth_user): AuthUser,
    Path(user_id): Path<Uuid>,
    Query(params): Query<SummaryParams>,
) -> Result<Json<DailySummary>, (StatusCode, String)> {
    if user_id != auth_user {
        return Err((StatusCode::FORBIDDEN, "Accès refusé".into()));
    }

    let date = match params.target_date.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => OffsetDateTime::now_utc().date(),
    };

    let meals = repo::list_for_day(&state.db, user_id, date)
        .await
        .map_err(|e| {
            error!(error = %e, %user_id, "daily summary meals fetch failed");
            internal()
        })?;

    let targets = users::repo::get_profile(&state.db, user_id)
        .await
        .map_err(|e| {
            error!(error = %e, %user_id, "daily summary profile fetch failed");
            internal()
        })?
        .and_then(|p| p.targets())
        .unwrap_or(MacroTargets {
            calories: 0,
            protein_g: 0,
            carbs_g: 0,
            fat_g: 0,
        });

    let contributions: Vec<_> = meals.iter().map(MealEntry::contribution).collect();
    Ok(Json(summary::aggregate(date, &contributions, &targets)))
}

fn parse_date(raw: &str) -> Result<Date, (StatusCode, String)> {
    Date::parse(raw, DATE_FORMAT).map_err(|_| {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("Date invalide: {raw} (format attendu AAAA-MM-JJ)"),
        )
    })
}

/// Date filters come in as calendar days; `exclusive_end` turns a `date_to`
/// into the midnight after it.
fn parse_day_bound(
    raw: Option<&str>,
    exclusive_end: bool,
) -> Result<Option<OffsetDateTime>, (StatusCode, String)> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let date = parse_date(raw)?;
    let midnight = date.midnight().assume_utc();
    Ok(Some(if exclusive_end {
        midnight + time::Duration::days(1)
    } else {
        midnight
    }))
}

fn internal() -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Erreur interne, veuillez réessayer".to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_dates() {
        assert!(parse_date("2025-03-10").is_ok());
        assert!(parse_date("10/03/2025").is_err());
        assert!(parse_date("pas-une-date").is_err());
    }

    #[test]
    fn day_bounds_are_half_open() {
        let from = parse_day_bound(Some("2025-03-10"), false).unwrap().unwrap();
        let to = parse_day_bound(Some("2025-03-10"), true).unwrap().unwrap();
        assert_eq!(to - from, time::Duration::days(1));
        assert!(parse_day_bound(None, false).unwrap().is_none());
    }
}
