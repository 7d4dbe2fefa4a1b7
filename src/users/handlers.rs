use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use time::{format_description::FormatItem, macros::format_description, Date};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{repo::User, services::AuthUser},
    nutrition::targets,
    state::AppState,
    users::{
        dto::{MessageResponse, ProfileResponse, UpdateProfileRequest},
        repo::{self, ProfileUpdate},
    },
};

const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/profile", get(get_profile).post(update_profile))
        .route("/users/delete-request", post(request_account_deletion))
}

#[instrument(skip(state))]
async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ProfileResponse>, (StatusCode, String)> {
    let profile = repo::get_profile(&state.db, user_id)
        .await
        .map_err(|e| {
            error!(error = %e, %user_id, "profile fetch failed");
            internal()
        })?
        .ok_or((StatusCode::NOT_FOUND, "Profil introuvable".to_string()))?;
    Ok(Json(ProfileResponse::from(profile)))
}

/// Onboarding: stores the body metrics and derives the daily macro targets
/// from them in the same write.
#[instrument(skip(state, body))]
async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, (StatusCode, String)> {
    if !(50.0..=280.0).contains(&body.height_cm) {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            "Taille invalide (attendu entre 50 et 280 cm)".into(),
        ));
    }
    if !(20.0..=500.0).contains(&body.weight_kg) {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            "Poids invalide (attendu entre 20 et 500 kg)".into(),
        ));
    }
    let birth_date = body
        .birth_date
        .as_deref()
        .map(|raw| {
            Date::parse(raw, DATE_FORMAT).map_err(|_| {
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "Date de naissance invalide (format attendu AAAA-MM-JJ)".to_string(),
                )
            })
        })
        .transpose()?;

    let derived = targets::calculate_targets(
        body.weight_kg,
        body.height_cm,
        body.gender,
        body.activity_level,
        body.goal,
    );

    let profile = repo::upsert_profile(
        &state.db,
        user_id,
        ProfileUpdate {
            birth_date,
            gender: body.gender.as_str(),
            height_cm: body.height_cm,
            weight_kg: body.weight_kg,
            activity_level: body.activity_level.as_str(),
            goal: body.goal.as_str(),
            targets: derived,
        },
    )
    .await
    .map_err(|e| {
        error!(error = %e, %user_id, "profile upsert failed");
        internal()
    })?;

    info!(%user_id, calories = derived.calories, "macro targets derived");
    Ok(Json(ProfileResponse::from(profile)))
}

/// Starts the email-confirmed deletion flow. The response shape never leaks
/// whether the mail went out; delivery itself is an external concern behind
/// the `Mailer`.
#[instrument(skip(state))]
async fn request_account_deletion(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Json<MessageResponse> {
    match User::find_by_id(&state.db, user_id).await {
        Ok(Some(user)) => {
            let outcome = state
                .mailer
                .send(
                    &user.email,
                    "Confirmation de suppression de compte",
                    "Confirmez la suppression définitive de votre compte KetoTrack en suivant \
                     le lien envoyé dans cet e-mail.",
                )
                .await;
            if let Err(e) = outcome {
                warn!(error = %e, %user_id, "deletion confirmation mail failed");
            }
        }
        Ok(None) => warn!(%user_id, "deletion requested for unknown user"),
        Err(e) => warn!(error = %e, %user_id, "deletion request user lookup failed"),
    }

    Json(MessageResponse {
        message: "Si un compte existe, un e-mail de confirmation a été envoyé.".to_string(),
    })
}

fn internal() -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Erreur interne, veuillez réessayer".to_string(),
    )
}
