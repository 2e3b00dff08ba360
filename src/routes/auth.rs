use axum::extract::{Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use oauth2::{AuthorizationCode, CsrfToken, Scope, TokenResponse};
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, TransactionTrait};
use serde::{Deserialize, Serialize};

use crate::auth::jwt::{self, OAuthStateClaims};
use crate::auth::middleware::AuthUser;
use crate::auth::oauth::{self, ConfiguredClient};
use crate::entities::{auth_provider, user};
use crate::error::AppError;
use crate::state::AppState;

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

/// Build the auth route group: `/auth/...`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/google", post(signin_google))
        .route("/facebook", post(signin_facebook))
        .route("/oauth/google", get(oauth_google_initiate))
        .route("/oauth/google/callback", get(oauth_google_callback))
        .route("/oauth/facebook", get(oauth_facebook_initiate))
        .route("/oauth/facebook/callback", get(oauth_facebook_callback))
        .route("/me", get(me))
}

// ─────────────────────────────────────────────────────────────────────────────
// DTOs
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleSigninRequest {
    pub token_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacebookSigninRequest {
    pub access_token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: UserResponse,
    pub token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i32,
    pub email: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: String,
    pub last_login_at: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthInitiateQuery {
    pub redirect_uri: Option<String>,
}

#[derive(Deserialize)]
pub struct OAuthCallbackQuery {
    pub code: String,
    pub state: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn user_response(u: &user::Model) -> UserResponse {
    UserResponse {
        id: u.id,
        email: u.email.clone(),
        display_name: u.display_name.clone(),
        avatar_url: u.avatar_url.clone(),
        created_at: u.created_at.to_rfc3339(),
        last_login_at: u.last_login_at.map(|t| t.to_rfc3339()),
    }
}

/// Identity reported by an external provider.
struct OAuthUserParams {
    provider_name: &'static str,
    provider_id: String,
    email: Option<String>,
    display_name: Option<String>,
    avatar_url: Option<String>,
}

/// Find the user linked to this provider identity, or link it to the user with the same
/// email, or create a new user. Records the login time.
async fn oauth_find_or_create_user(
    state: &AppState,
    params: OAuthUserParams,
) -> Result<user::Model, AppError> {
    let now = Utc::now().fixed_offset();
    let txn = state.db.begin().await?;

    let linked = auth_provider::Entity::find()
        .filter(auth_provider::Column::Provider.eq(params.provider_name))
        .filter(auth_provider::Column::ProviderId.eq(&params.provider_id))
        .one(&txn)
        .await?;

    let user_model = if let Some(link) = linked {
        user::Entity::find_by_id(link.user_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("User not found for provider")))?
    } else {
        let email = params.email.clone().ok_or_else(|| {
            AppError::BadRequest(format!(
                "Your {} account did not share an email address.",
                params.provider_name
            ))
        })?;

        let existing = user::Entity::find()
            .filter(user::Column::Email.eq(&email))
            .one(&txn)
            .await?;
        let user_model = match existing {
            Some(u) => u,
            None => {
                let created = user::ActiveModel {
                    email: Set(email.clone()),
                    display_name: Set(params.display_name.clone()),
                    avatar_url: Set(params.avatar_url.clone()),
                    created_at: Set(now),
                    last_login_at: Set(None),
                    ..Default::default()
                }
                .insert(&txn)
                .await?;
                tracing::info!(user_id = created.id, provider = params.provider_name, "User created");
                created
            }
        };

        auth_provider::ActiveModel {
            user_id: Set(user_model.id),
            provider: Set(params.provider_name.to_string()),
            provider_id: Set(params.provider_id.clone()),
            provider_email: Set(Some(email)),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        tracing::info!(user_id = user_model.id, provider = params.provider_name, "Provider linked");
        user_model
    };

    let mut active_user: user::ActiveModel = user_model.into();
    active_user.last_login_at = Set(Some(now));
    let user_model = active_user.update(&txn).await?;

    txn.commit().await?;
    Ok(user_model)
}

fn auth_response(state: &AppState, user_model: &user::Model) -> Result<AuthResponse, AppError> {
    let token = jwt::generate_access_token(user_model.id, &state.config)?;
    tracing::info!(user_id = user_model.id, "User signed in");
    Ok(AuthResponse {
        user: user_response(user_model),
        token,
    })
}

/// Redirect the browser to the provider's consent screen with a signed state token.
fn oauth_initiate(
    state: &AppState,
    client: &ConfiguredClient,
    redirect_uri: Option<&str>,
    scopes: &[&str],
) -> Result<Response, AppError> {
    let state_token = jwt::generate_oauth_state(&state.config.jwt_secret, redirect_uri)?;

    let (auth_url, _csrf) = client
        .authorize_url(|| CsrfToken::new(state_token))
        .add_scopes(scopes.iter().map(|s| Scope::new((*s).to_string())))
        .url();

    Ok(Redirect::to(auth_url.as_str()).into_response())
}

/// Exchange the authorization code for a provider access token.
async fn oauth_exchange(client: &ConfiguredClient, code: String) -> Result<String, AppError> {
    let token_result = client
        .exchange_code(AuthorizationCode::new(code))
        .request_async(&reqwest::Client::new())
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to exchange authorization code: {e}")))?;
    Ok(token_result.access_token().secret().clone())
}

fn validate_state(state: &AppState, token: &str) -> Result<OAuthStateClaims, AppError> {
    jwt::validate_oauth_state(token, &state.config.jwt_secret)
        .map_err(|_| AppError::BadRequest("Invalid or expired OAuth state.".to_string()))
}

/// Finish an OAuth callback: redirect to the frontend with the session, or answer JSON.
fn oauth_complete(
    provider: &str,
    claims: OAuthStateClaims,
    auth: AuthResponse,
) -> Response {
    if let Some(redirect_uri) = claims.redirect_uri {
        let user_json = serde_json::to_string(&auth.user).unwrap_or_else(|_| "{}".to_string());
        let redirect_url = format!(
            "{}?provider={}&token={}&user={}",
            redirect_uri,
            provider,
            urlencoding::encode(&auth.token),
            urlencoding::encode(&user_json)
        );
        return Redirect::to(&redirect_url).into_response();
    }

    Json(auth).into_response()
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// `POST /api/v1/auth/google`: sign in with a Google Sign-In ID token.
async fn signin_google(
    State(state): State<AppState>,
    Json(body): Json<GoogleSigninRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    if state.config.google_client_id.is_empty() {
        return Err(AppError::UnprocessableEntity(
            "Google sign-in is not configured.".to_string(),
        ));
    }

    let id_token = oauth::verify_google_id_token(&body.token_id, &state.config.google_client_id)
        .await
        .map_err(|e| {
            tracing::info!("Google ID token rejected: {e:#}");
            AppError::Unauthorized("Invalid Google ID token.".to_string())
        })?;

    let user_model = oauth_find_or_create_user(
        &state,
        OAuthUserParams {
            provider_name: "google",
            provider_id: id_token.sub,
            email: id_token.email,
            display_name: id_token.name,
            avatar_url: id_token.picture,
        },
    )
    .await?;

    Ok(Json(auth_response(&state, &user_model)?))
}

/// `POST /api/v1/auth/facebook`: sign in with a Facebook access token.
async fn signin_facebook(
    State(state): State<AppState>,
    Json(body): Json<FacebookSigninRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let fb_user = oauth::fetch_facebook_userinfo(&body.access_token)
        .await
        .map_err(|e| {
            tracing::info!("Facebook access token rejected: {e:#}");
            AppError::Unauthorized("Invalid Facebook access token.".to_string())
        })?;

    let user_model = oauth_find_or_create_user(
        &state,
        OAuthUserParams {
            provider_name: "facebook",
            provider_id: fb_user.id,
            email: fb_user.email,
            display_name: fb_user.name,
            avatar_url: None,
        },
    )
    .await?;

    Ok(Json(auth_response(&state, &user_model)?))
}

/// `GET /api/v1/auth/oauth/google`
async fn oauth_google_initiate(
    State(state): State<AppState>,
    Query(query): Query<OAuthInitiateQuery>,
) -> Result<Response, AppError> {
    if state.config.google_client_id.is_empty() {
        return Err(AppError::UnprocessableEntity(
            "Google OAuth is not configured.".to_string(),
        ));
    }

    let client = oauth::google_client(&state.config)?;
    oauth_initiate(
        &state,
        &client,
        query.redirect_uri.as_deref(),
        &["openid", "email", "profile"],
    )
}

/// `GET /api/v1/auth/oauth/google/callback`
async fn oauth_google_callback(
    State(state): State<AppState>,
    Query(query): Query<OAuthCallbackQuery>,
) -> Result<Response, AppError> {
    let claims = validate_state(&state, &query.state)?;
    let client = oauth::google_client(&state.config)?;
    let access_token = oauth_exchange(&client, query.code).await?;
    let google_user = oauth::fetch_google_userinfo(&access_token).await?;

    let user_model = oauth_find_or_create_user(
        &state,
        OAuthUserParams {
            provider_name: "google",
            provider_id: google_user.sub,
            email: google_user.email,
            display_name: google_user.name,
            avatar_url: google_user.picture,
        },
    )
    .await?;

    Ok(oauth_complete("google", claims, auth_response(&state, &user_model)?))
}

/// `GET /api/v1/auth/oauth/facebook`
async fn oauth_facebook_initiate(
    State(state): State<AppState>,
    Query(query): Query<OAuthInitiateQuery>,
) -> Result<Response, AppError> {
    if state.config.facebook_client_id.is_empty() {
        return Err(AppError::UnprocessableEntity(
            "Facebook OAuth is not configured.".to_string(),
        ));
    }

    let client = oauth::facebook_client(&state.config)?;
    oauth_initiate(
        &state,
        &client,
        query.redirect_uri.as_deref(),
        &["email", "public_profile"],
    )
}

/// `GET /api/v1/auth/oauth/facebook/callback`
async fn oauth_facebook_callback(
    State(state): State<AppState>,
    Query(query): Query<OAuthCallbackQuery>,
) -> Result<Response, AppError> {
    let claims = validate_state(&state, &query.state)?;
    let client = oauth::facebook_client(&state.config)?;
    let access_token = oauth_exchange(&client, query.code).await?;
    let fb_user = oauth::fetch_facebook_userinfo(&access_token).await?;

    let user_model = oauth_find_or_create_user(
        &state,
        OAuthUserParams {
            provider_name: "facebook",
            provider_id: fb_user.id,
            email: fb_user.email,
            display_name: fb_user.name,
            avatar_url: None,
        },
    )
    .await?;

    Ok(oauth_complete("facebook", claims, auth_response(&state, &user_model)?))
}

/// `GET /api/v1/auth/me`
async fn me(AuthUser(user_model): AuthUser) -> Json<UserResponse> {
    Json(user_response(&user_model))
}
