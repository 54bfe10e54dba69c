use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::{ActivationRequest, LoginRequest, RegisterRequest, TokenResponse},
        extractors::AuthUser,
        hasher::CredentialHasher,
        jwt::JwtKeys,
        repo_types::User,
    },
    response::{ApiError, Envelope},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/activation", post(activation))
        .route("/auth/user", get(user_profile))
}

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn validate_register(payload: &RegisterRequest) -> Result<(), ApiError> {
    lazy_static! {
        static ref UPPERCASE_RE: Regex = Regex::new(r"[A-Z]").unwrap();
        static ref DIGIT_RE: Regex = Regex::new(r"\d").unwrap();
    }

    if payload.full_name.is_empty() {
        return Err(ApiError::Validation("Full name is required".into()));
    }
    if payload.username.is_empty() {
        return Err(ApiError::Validation("Username is required".into()));
    }
    if !is_valid_email(&payload.email) {
        return Err(ApiError::Validation("Invalid email".into()));
    }
    if payload.password.len() < 6 {
        return Err(ApiError::Validation(
            "Password must be at least 6 characters".into(),
        ));
    }
    if !UPPERCASE_RE.is_match(&payload.password) {
        return Err(ApiError::Validation(
            "Contains at least one uppercase letter".into(),
        ));
    }
    if !DIGIT_RE.is_match(&payload.password) {
        return Err(ApiError::Validation("Contains at least one number".into()));
    }
    if payload.confirm_password != payload.password {
        return Err(ApiError::Validation("Password not match".into()));
    }
    Ok(())
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<Json<Envelope<User>>, ApiError> {
    payload.full_name = payload.full_name.trim().to_string();
    payload.username = payload.username.trim().to_string();
    payload.email = payload.email.trim().to_lowercase();

    validate_register(&payload)?;

    // Checked here for a readable message; the unique indexes still enforce it.
    if User::find_by_username(&state.db, &payload.username).await?.is_some() {
        warn!(username = %payload.username, "username already taken");
        return Err(ApiError::Validation("Username has already taken".into()));
    }
    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already taken");
        return Err(ApiError::Validation("Email has already taken".into()));
    }

    // Explicit steps: hash, persist, then notify. A failed mail send must
    // not roll the record back.
    let hasher = CredentialHasher::from_ref(&state);
    let id = Uuid::new_v4();
    let password_hash = hasher.hash(&payload.password);
    let activation_code = hasher.hash(&id.to_string());

    let user = User::create(
        &state.db,
        id,
        &payload.full_name,
        &payload.username,
        &payload.email,
        &password_hash,
        &activation_code,
    )
    .await?;

    if let Err(e) = state
        .mailer
        .send_activation(&user.email, &user.full_name, &user.activation_code)
        .await
    {
        warn!(error = %e, user_id = %user.id, "activation mail failed, user stays registered");
    }

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok(Envelope::ok("Success registration!", user))
}

/// Login decision over the lookup result. Unknown identifier, inactive
/// account and wrong password all collapse into the same rejection, so
/// none of them is distinguishable from outside.
fn login_outcome(
    found: Option<User>,
    password: &str,
    hasher: &CredentialHasher,
) -> Result<User, ApiError> {
    let user = found.ok_or(ApiError::InvalidCredentials)?;
    if !user.is_active {
        return Err(ApiError::InvalidCredentials);
    }
    if !hasher.matches(password, &user.password_hash) {
        return Err(ApiError::InvalidCredentials);
    }
    Ok(user)
}

/// Activation decision. An unknown code fails; a code whose record is
/// already active succeeds again, so re-submitting is idempotent.
fn activation_outcome(found: Option<User>) -> Result<User, ApiError> {
    found.ok_or(ApiError::ActivationFailed)
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Envelope<TokenResponse>>, ApiError> {
    let identifier = payload.identifier.trim();

    let found = User::find_by_identifier(&state.db, identifier).await?;
    let hasher = CredentialHasher::from_ref(&state);
    let user = login_outcome(found, &payload.password, &hasher).map_err(|e| {
        warn!(identifier = %identifier, "login rejected");
        e
    })?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id, &user.role)?;

    info!(user_id = %user.id, "user logged in");
    Ok(Envelope::ok("Login success", TokenResponse { token }))
}

#[instrument(skip(state, payload))]
pub async fn activation(
    State(state): State<AppState>,
    Json(payload): Json<ActivationRequest>,
) -> Result<Json<Envelope<User>>, ApiError> {
    let code = payload.code.trim();
    if code.is_empty() {
        return Err(ApiError::ActivationFailed);
    }

    let found = User::find_by_activation_code(&state.db, code).await?;
    let user = activation_outcome(found).map_err(|e| {
        warn!("activation with unknown code");
        e
    })?;

    // Already-active records pass through untouched.
    let user = if user.is_active {
        user
    } else {
        User::activate(&state.db, user.id).await?
    };

    info!(user_id = %user.id, "user activated");
    Ok(Envelope::ok("User activation success!", user))
}

#[instrument(skip(state))]
pub async fn user_profile(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<Envelope<User>>, ApiError> {
    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    Ok(Envelope::ok("Success get user profile", user))
}
