use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, EmailRequest, LoginRequest, PublicUser, RefreshRequest, RegisterRequest},
        repo::User,
        services::{hash_password, is_valid_email, verify_password, JwtKeys},
    },
    state::AppState,
    users::{self, dto::MessageResponse},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/resend-confirmation", post(resend_confirmation))
        .route("/auth/forgot-password", post(forgot_password))
}

#[instrument(skip(state, payload))]
async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err((StatusCode::BAD_REQUEST, "Adresse e-mail invalide".into()));
    }

    if payload.password.len() < 8 {
        warn!("password too short");
        return Err((
            StatusCode::BAD_REQUEST,
            "Mot de passe trop court (8 caractères minimum)".into(),
        ));
    }

    // Ensure email is not taken
    if let Ok(Some(_)) = User::find_by_email(&state.db, &payload.email).await {
        warn!(email = %payload.email, "email already registered");
        return Err((StatusCode::CONFLICT, "Adresse e-mail déjà utilisée".into()));
    }

    let hash = match hash_password(&payload.password) {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, "hash_password failed");
            return Err(internal());
        }
    };

    let user = match User::create(&state.db, &payload.email, &hash).await {
        Ok(u) => u,
        Err(e) => {
            error!(error = %e, "create user failed");
            return Err(internal());
        }
    };

    // Partial profile row; onboarding completes it later.
    if let Err(e) = users::repo::ensure_profile(&state.db, user.id).await {
        warn!(error = %e, user_id = %user.id, "profile bootstrap failed");
    }

    let tokens = issue_tokens(&state, user)?;
    Ok(Json(tokens))
}

#[instrument(skip(state, payload))]
async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err((StatusCode::BAD_REQUEST, "Adresse e-mail invalide".into()));
    }

    let user = match User::find_by_email(&state.db, &payload.email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            warn!(email = %payload.email, "login unknown email");
            return Err((StatusCode::UNAUTHORIZED, "Identifiants invalides".into()));
        }
        Err(e) => {
            error!(error = %e, "find_by_email failed");
            return Err(internal());
        }
    };

    let ok = match verify_password(&payload.password, &user.password_hash) {
        Ok(v) => v,
        Err(e) => {
            error!(error = %e, "verify_password failed");
            return Err(internal());
        }
    };

    if !ok {
        warn!(email = %payload.email, user_id = %user.id, "login invalid password");
        return Err((StatusCode::UNAUTHORIZED, "Identifiants invalides".into()));
    }

    info!(user_id = %user.id, "user logged in");
    let tokens = issue_tokens(&state, user)?;
    Ok(Json(tokens))
}

#[instrument(skip(state, payload))]
async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&payload.refresh_token)
        .map_err(|_| (StatusCode::UNAUTHORIZED, "Jeton de rafraîchissement invalide".to_string()))?;

    let user = match User::find_by_id(&state.db, claims.sub).await {
        Ok(Some(u)) => u,
        _ => return Err((StatusCode::UNAUTHORIZED, "Utilisateur introuvable".into())),
    };

    let tokens = issue_tokens(&state, user)?;
    Ok(Json(tokens))
}

/// Same success body whether or not the account exists, so the endpoint
/// cannot be used to enumerate registered addresses.
#[instrument(skip(state, payload))]
async fn resend_confirmation(
    State(state): State<AppState>,
    Json(payload): Json<EmailRequest>,
) -> Json<MessageResponse> {
    email_flow(
        &state,
        &payload.email,
        "Confirmation de votre compte",
        "Suivez le lien de cet e-mail pour confirmer votre compte KetoTrack.",
    )
    .await
}

/// Same enumeration-resistant contract as `resend_confirmation`.
#[instrument(skip(state, payload))]
async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<EmailRequest>,
) -> Json<MessageResponse> {
    email_flow(
        &state,
        &payload.email,
        "Réinitialisation de votre mot de passe",
        "Suivez le lien de cet e-mail pour choisir un nouveau mot de passe.",
    )
    .await
}

async fn email_flow(
    state: &AppState,
    email: &str,
    subject: &str,
    body: &str,
) -> Json<MessageResponse> {
    let email = email.trim().to_lowercase();
    match User::find_by_email(&state.db, &email).await {
        Ok(Some(user)) => {
            if let Err(e) = state.mailer.send(&user.email, subject, body).await {
                warn!(error = %e, user_id = %user.id, "mail send failed");
            }
        }
        Ok(None) => {
            // Deliberately indistinguishable from the happy path.
        }
        Err(e) => warn!(error = %e, "mail flow user lookup failed"),
    }
    Json(MessageResponse {
        message: "Si un compte existe pour cette adresse, un e-mail a été envoyé.".to_string(),
    })
}

fn issue_tokens(state: &AppState, user: User) -> Result<AuthResponse, (StatusCode, String)> {
    let keys = JwtKeys::from_ref(state);
    let access_token = keys.sign_access(user.id).map_err(|e| {
        error!(error = %e, "jwt sign access failed");
        internal()
    })?;
    let refresh_token = keys.sign_refresh(user.id).map_err(|e| {
        error!(error = %e, "jwt sign refresh failed");
        internal()
    })?;
    Ok(AuthResponse {
        access_token,
        refresh_token,
        user: PublicUser {
            id: user.id,
            email: user.email,
        },
    })
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
    fn auth_response_serialization_hides_nothing_public() {
        let response = PublicUser {
            id: uuid::Uuid::new_v4(),
            email: "test@example.com".to_string(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("test@example.com"));
        assert!(json.contains("id"));
    }

    #[test]
    fn enumeration_resistant_message_is_account_agnostic() {
        let msg = MessageResponse {
            message: "Si un compte existe pour cette adresse, un e-mail a été envoyé.".to_string(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(!json.to_lowercase().contains("introuvable"));
    }
}
