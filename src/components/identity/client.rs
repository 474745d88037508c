use super::models::{AccessToken, TokenResponse, UserProfile};
use super::pkce::PkceChallenge;
use crate::config::Config;
use crate::error::{auth_error, DashResult};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::Client;
use url::Url;

/// Scopes requested at login: read-only calendar plus the basic profile
pub const SCOPES: &str = "https://www.googleapis.com/auth/calendar.readonly openid email profile";

/// The identity provider as the dashboard sees it
#[async_trait]
pub trait IdentityProvider: Send + Sync + 'static {
    /// Where to send the browser to start a login
    fn authorization_url(&self, state: &str, challenge: &PkceChallenge) -> DashResult<Url>;

    /// Trade an authorization code for an access token
    async fn exchange_code(&self, code: &str, code_verifier: &str) -> DashResult<AccessToken>;

    /// Fetch the profile of the token's owner
    async fn user_info(&self, access_token: &AccessToken) -> DashResult<UserProfile>;
}

/// Google OAuth2 client
#[derive(Debug, Clone)]
pub struct GoogleIdentityClient {
    client: Client,
    client_id: String,
    client_secret: Option<String>,
    redirect_url: String,
    auth_url: String,
    token_url: String,
    userinfo_url: String,
}

impl GoogleIdentityClient {
    pub fn from_config(config: &Config) -> Self {
        Self {
            client: Client::new(),
            client_id: config.google_client_id.clone(),
            client_secret: config.google_client_secret.clone(),
            redirect_url: config.google_redirect_url.clone(),
            auth_url: config.endpoints.auth_url.clone(),
            token_url: config.endpoints.token_url.clone(),
            userinfo_url: config.endpoints.userinfo_url.clone(),
        }
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentityClient {
    fn authorization_url(&self, state: &str, challenge: &PkceChallenge) -> DashResult<Url> {
        let mut url = Url::parse(&self.auth_url)
            .map_err(|e| auth_error(&format!("Failed to parse authorization URL: {}", e)))?;

        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_url)
            .append_pair("response_type", "code")
            .append_pair("scope", SCOPES)
            .append_pair("state", state)
            .append_pair("code_challenge", &challenge.code_challenge)
            .append_pair("code_challenge_method", "S256")
            .append_pair("prompt", "select_account");

        Ok(url)
    }

    async fn exchange_code(&self, code: &str, code_verifier: &str) -> DashResult<AccessToken> {
        let mut params = vec![
            ("client_id", self.client_id.clone()),
            ("code", code.to_string()),
            ("code_verifier", code_verifier.to_string()),
            ("redirect_uri", self.redirect_url.clone()),
            ("grant_type", "authorization_code".to_string()),
        ];
        if let Some(secret) = &self.client_secret {
            params.push(("client_secret", secret.clone()));
        }

        let response = self
            .client
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| auth_error(&format!("Failed to get token: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(auth_error(&format!("Failed to get token: HTTP {} - {}", status, error_body)));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| auth_error(&format!("Failed to parse token response: {}", e)))?;

        if token.access_token.trim().is_empty() {
            return Err(auth_error("Token response contained an empty access token"));
        }

        let expires_at = token.expires_in.map(|secs| Utc::now() + Duration::seconds(secs));
        Ok(AccessToken::new(token.access_token, expires_at))
    }

    async fn user_info(&self, access_token: &AccessToken) -> DashResult<UserProfile> {
        let response = self
            .client
            .get(&self.userinfo_url)
            .bearer_auth(access_token.secret())
            .send()
            .await
            .map_err(|e| auth_error(&format!("Failed to fetch user info: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(auth_error(&format!("Failed to fetch user info: HTTP {}", status)));
        }

        response
            .json()
            .await
            .map_err(|e| auth_error(&format!("Failed to parse user info: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FileConfig;

    #[test]
    fn test_authorization_url() {
        let config = Config::from_sources(
            |key| match key {
                "GOOGLE_CLIENT_ID" => Some("client-123".to_string()),
                _ => None,
            },
            FileConfig::default(),
        )
        .unwrap();
        let client = GoogleIdentityClient::from_config(&config);
        let challenge = PkceChallenge::generate();

        let url = client.authorization_url("state-abc", &challenge).unwrap();
        let pairs: std::collections::HashMap<String, String> = url.query_pairs().into_owned().collect();

        assert_eq!(url.host_str(), Some("accounts.google.com"));
        assert_eq!(pairs["client_id"], "client-123");
        assert_eq!(pairs["redirect_uri"], "http://localhost:3000/auth/callback");
        assert_eq!(pairs["response_type"], "code");
        assert_eq!(pairs["state"], "state-abc");
        assert_eq!(pairs["code_challenge"], challenge.code_challenge);
        assert_eq!(pairs["code_challenge_method"], "S256");
        assert!(pairs["scope"].contains("calendar.readonly"));
    }
}
