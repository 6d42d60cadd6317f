//! Authentication against the registry token endpoint

use crate::config::AuthConfig;
use crate::error::handlers::describe_transport;
use crate::logging::Logger;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Auth {
    client: Client,
    token_url: String,
    credentials: AuthConfig,
    output: Logger,
}

impl Auth {
    pub fn new(client: Client, base_url: &str, credentials: AuthConfig, output: Logger) -> Self {
        Self {
            client,
            token_url: format!("{}/token", base_url),
            credentials,
            output,
        }
    }

    /// Exchange the credentials for a bearer token.
    ///
    /// Any failure is logged and reported as `None`; nothing is raised.
    pub async fn authenticate(&self) -> Option<String> {
        self.output.verbose(&format!(
            "Requesting token for user: {}",
            self.credentials.username
        ));

        let form = [
            ("username", self.credentials.username.as_str()),
            ("password", self.credentials.password.as_str()),
        ];

        let response = match self.client.post(&self.token_url).form(&form).send().await {
            Ok(response) => response,
            Err(e) => {
                self.output.error(&format!(
                    "Exception during token acquisition: {}",
                    describe_transport(&e, "token request")
                ));
                return None;
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error response".to_string());
            self.output.error(&format!(
                "Error acquiring token (status {}): {}",
                status, error_text
            ));
            return None;
        }

        match response.json::<TokenResponse>().await {
            Ok(TokenResponse {
                access_token: Some(token),
            }) => {
                self.output.success("Token acquired successfully.");
                self.output
                    .detail(&format!("Token obtained (length: {} chars)", token.len()));
                Some(token)
            }
            Ok(_) => {
                self.output
                    .error("Token response did not contain an access_token");
                None
            }
            Err(e) => {
                self.output
                    .error(&format!("Failed to parse token response: {}", e));
                None
            }
        }
    }
}
