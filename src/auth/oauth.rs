use oauth2::basic::{BasicErrorResponseType, BasicTokenType};
use oauth2::{
    AuthUrl, Client, ClientId, ClientSecret, EmptyExtraTokenFields, EndpointNotSet, EndpointSet,
    RedirectUrl, RevocationErrorResponseType, StandardErrorResponse, StandardRevocableToken,
    StandardTokenIntrospectionResponse, StandardTokenResponse, TokenUrl,
};
use serde::Deserialize;

use crate::config::Config;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";
const GOOGLE_TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

const FACEBOOK_AUTH_URL: &str = "https://www.facebook.com/v19.0/dialog/oauth";
const FACEBOOK_TOKEN_URL: &str = "https://graph.facebook.com/v19.0/oauth/access_token";
const FACEBOOK_ME_URL: &str = "https://graph.facebook.com/me";

/// Fully configured `OAuth2` client type (auth URI, token URI, and redirect URI all set).
pub type ConfiguredClient = Client<
    StandardErrorResponse<BasicErrorResponseType>,
    StandardTokenResponse<EmptyExtraTokenFields, BasicTokenType>,
    StandardTokenIntrospectionResponse<EmptyExtraTokenFields, BasicTokenType>,
    StandardRevocableToken,
    StandardErrorResponse<RevocationErrorResponseType>,
    EndpointSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointSet,
>;

/// Build an `OAuth2` client for Google.
///
/// # Errors
///
/// Returns an error if the OAuth URLs are malformed.
pub fn google_client(config: &Config) -> anyhow::Result<ConfiguredClient> {
    let client = Client::new(ClientId::new(config.google_client_id.clone()))
        .set_client_secret(ClientSecret::new(config.google_client_secret.clone()))
        .set_auth_uri(AuthUrl::new(GOOGLE_AUTH_URL.to_string())?)
        .set_token_uri(TokenUrl::new(GOOGLE_TOKEN_URL.to_string())?)
        .set_redirect_uri(RedirectUrl::new(config.google_redirect_uri.clone())?);
    Ok(client)
}

/// Build an `OAuth2` client for Facebook.
///
/// # Errors
///
/// Returns an error if the OAuth URLs are malformed.
pub fn facebook_client(config: &Config) -> anyhow::Result<ConfiguredClient> {
    let client = Client::new(ClientId::new(config.facebook_client_id.clone()))
        .set_client_secret(ClientSecret::new(config.facebook_client_secret.clone()))
        .set_auth_uri(AuthUrl::new(FACEBOOK_AUTH_URL.to_string())?)
        .set_token_uri(TokenUrl::new(FACEBOOK_TOKEN_URL.to_string())?)
        .set_redirect_uri(RedirectUrl::new(config.facebook_redirect_uri.clone())?);
    Ok(client)
}

/// Google user info returned from the userinfo endpoint.
#[derive(Debug, Deserialize)]
pub struct GoogleUserInfo {
    pub sub: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

/// Fetch user info from Google's userinfo endpoint.
///
/// # Errors
///
/// Returns an error if the HTTP request fails or the response is malformed.
pub async fn fetch_google_userinfo(access_token: &str) -> anyhow::Result<GoogleUserInfo> {
    let resp = reqwest::Client::new()
        .get(GOOGLE_USERINFO_URL)
        .bearer_auth(access_token)
        .send()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to fetch Google userinfo: {e}"))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(anyhow::anyhow!(
            "Google userinfo request failed ({status}): {body}"
        ));
    }

    resp.json::<GoogleUserInfo>()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to parse Google userinfo: {e}"))
}

/// Claims of a verified Google ID token, as reported by the token-info endpoint.
#[derive(Debug, Deserialize)]
pub struct GoogleIdToken {
    pub aud: String,
    pub sub: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

/// Verify a Google Sign-In ID token and check it was issued for `client_id`.
///
/// # Errors
///
/// Returns an error if Google rejects the token, the response is malformed, or the
/// audience does not match.
pub async fn verify_google_id_token(id_token: &str, client_id: &str) -> anyhow::Result<GoogleIdToken> {
    let resp = reqwest::Client::new()
        .get(GOOGLE_TOKENINFO_URL)
        .query(&[("id_token", id_token)])
        .send()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to verify Google ID token: {e}"))?;

    if !resp.status().is_success() {
        let status = resp.status();
        return Err(anyhow::anyhow!("Google rejected the ID token ({status})"));
    }

    let token = resp
        .json::<GoogleIdToken>()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to parse Google token info: {e}"))?;

    if token.aud != client_id {
        return Err(anyhow::anyhow!("Google ID token was issued for another client"));
    }
    Ok(token)
}

/// Facebook user returned from the Graph API `/me` endpoint.
#[derive(Debug, Deserialize)]
pub struct FacebookUserInfo {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

/// Fetch the current Facebook user for an access token.
///
/// # Errors
///
/// Returns an error if the HTTP request fails or the response is malformed.
pub async fn fetch_facebook_userinfo(access_token: &str) -> anyhow::Result<FacebookUserInfo> {
    let resp = reqwest::Client::new()
        .get(FACEBOOK_ME_URL)
        .query(&[("fields", "id,email,name"), ("access_token", access_token)])
        .send()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to fetch Facebook user: {e}"))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(anyhow::anyhow!(
            "Facebook user request failed ({status}): {body}"
        ));
    }

    resp.json::<FacebookUserInfo>()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to parse Facebook user: {e}"))
}
