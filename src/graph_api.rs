//! Microsoft Graph API client.
//!
//! Acquires an application token with the OAuth2 client-credentials grant and
//! issues the handful of GET requests the exporters need. The returned
//! [`GraphClient`] is the session object: it is constructed once per run and
//! passed explicitly to every pipeline.

use crate::audit::roles::DirectoryLookup;
use crate::audit::types::{
    DirectoryAudit, GraphCollection, RoleAssignment, RoleDefinition, ServicePrincipal, User,
};
use crate::config::{Credentials, GraphEndpoints, GRAPH_DEFAULT_SCOPE};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Invalid Graph URL '{0}'")]
    InvalidUrl(String),

    #[error("Failed to send request to {url}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Authentication failed with status {status}: {body}")]
    Authentication { status: StatusCode, body: String },

    #[error("Not authorized for {url} (status {status}): {body}")]
    Unauthorized {
        url: String,
        status: StatusCode,
        body: String,
    },

    #[error("Resource not found: {url}")]
    NotFound { url: String },

    #[error("Graph API request to {url} failed with status {status}: {body}")]
    Status {
        url: String,
        status: StatusCode,
        body: String,
    },

    #[error("Failed to parse JSON response from {url}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl GraphError {
    /// True when an id-keyed lookup found nothing
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

fn http_client(timeout_secs: u64) -> Result<Client, GraphError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(concat!("entra-audit/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|source| GraphError::Transport {
            url: String::new(),
            source,
        })
}

/// Exchange client credentials for a Graph access token.
///
/// Any failure here is fatal: nothing is queried without a token.
pub async fn authenticate(
    credentials: &Credentials,
    endpoints: &GraphEndpoints,
) -> Result<GraphClient, GraphError> {
    let client = http_client(endpoints.timeout_secs)?;
    let url = format!(
        "{}/{}/oauth2/v2.0/token",
        endpoints.authority_url.trim_end_matches('/'),
        credentials.tenant_id
    );

    tracing::debug!(tenant = %credentials.tenant_id, client = %credentials.client_id, "requesting access token");

    let response = client
        .post(&url)
        .form(&[
            ("grant_type", "client_credentials"),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            ("scope", GRAPH_DEFAULT_SCOPE),
        ])
        .send()
        .await
        .map_err(|source| GraphError::Transport {
            url: url.clone(),
            source,
        })?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|source| GraphError::Transport {
            url: url.clone(),
            source,
        })?;

    if !status.is_success() {
        return Err(GraphError::Authentication { status, body });
    }

    let token: TokenResponse =
        serde_json::from_str(&body).map_err(|source| GraphError::Decode { url, source })?;
    tracing::debug!(expires_in = ?token.expires_in, "access token acquired");

    GraphClient::with_client(&endpoints.graph_url, token.access_token, client)
}

/// Authenticated Graph session
#[derive(Clone)]
pub struct GraphClient {
    base_url: Url,
    token: String,
    client: Client,
}

impl std::fmt::Debug for GraphClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl GraphClient {
    /// Create a client from a base URL and an already-acquired bearer token
    pub fn new(base_url: &str, token: String, timeout_secs: u64) -> Result<Self, GraphError> {
        Self::with_client(base_url, token, http_client(timeout_secs)?)
    }

    fn with_client(base_url: &str, token: String, client: Client) -> Result<Self, GraphError> {
        let trimmed = base_url.trim_end_matches('/');
        let base_url =
            Url::parse(trimmed).map_err(|_| GraphError::InvalidUrl(base_url.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(GraphError::InvalidUrl(trimmed.to_string()));
        }

        Ok(Self {
            base_url,
            token,
            client,
        })
    }

    /// Get the Graph base URL
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Build an endpoint URL from path segments, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> Result<Url, GraphError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GraphError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Make a GET request to a Graph endpoint and decode the JSON body
    pub async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> Result<T, GraphError> {
        let mut url = self.endpoint(segments)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        let url_str = url.to_string();

        tracing::debug!(url = %url_str, "GET");

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|source| GraphError::Transport {
                url: url_str.clone(),
                source,
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| GraphError::Transport {
                url: url_str.clone(),
                source,
            })?;

        match status {
            s if s.is_success() => {}
            StatusCode::NOT_FOUND => return Err(GraphError::NotFound { url: url_str }),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(GraphError::Unauthorized {
                    url: url_str,
                    status,
                    body,
                })
            }
            _ => {
                return Err(GraphError::Status {
                    url: url_str,
                    status,
                    body,
                })
            }
        }

        serde_json::from_str(&body).map_err(|source| GraphError::Decode {
            url: url_str,
            source,
        })
    }

    /// List directory audit events matching an OData `$filter`.
    ///
    /// Returns the first page only; callers inspect `next_link` to detect
    /// truncation.
    pub async fn list_directory_audits(
        &self,
        filter: &str,
    ) -> Result<GraphCollection<DirectoryAudit>, GraphError> {
        self.get(&["auditLogs", "directoryAudits"], &[("$filter", filter)])
            .await
    }

    /// List directory role assignments with the principal object expanded
    pub async fn list_role_assignments(
        &self,
    ) -> Result<GraphCollection<RoleAssignment>, GraphError> {
        self.get(
            &["roleManagement", "directory", "roleAssignments"],
            &[("$expand", "principal")],
        )
        .await
    }
}

impl DirectoryLookup for GraphClient {
    async fn get_user(&self, id: &str) -> Result<User, GraphError> {
        self.get(
            &["users", id],
            &[("$select", "id,displayName,mail,userPrincipalName")],
        )
        .await
    }

    async fn get_service_principal(&self, id: &str) -> Result<ServicePrincipal, GraphError> {
        self.get(
            &["servicePrincipals", id],
            &[("$select", "id,displayName,appId")],
        )
        .await
    }

    async fn get_role_definition(&self, id: &str) -> Result<RoleDefinition, GraphError> {
        self.get(
            &["roleManagement", "directory", "roleDefinitions", id],
            &[],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = GraphClient::new("https://graph.microsoft.com/v1.0", "token".to_string(), 30);
        assert!(client.is_ok());
    }

    #[test]
    fn test_base_url_trimming() {
        let client =
            GraphClient::new("https://graph.microsoft.com/v1.0/", "token".to_string(), 30).unwrap();
        assert_eq!(client.base_url(), "https://graph.microsoft.com/v1.0");
    }

    #[test]
    fn test_invalid_base_url() {
        let err = GraphClient::new("not a url", "token".to_string(), 30).unwrap_err();
        assert!(matches!(err, GraphError::InvalidUrl(_)));
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let client =
            GraphClient::new("https://graph.microsoft.com/v1.0", "token".to_string(), 30).unwrap();
        let url = client.endpoint(&["users", "a b/c"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://graph.microsoft.com/v1.0/users/a%20b%2Fc"
        );
    }

    #[test]
    fn test_not_found_classification() {
        let err = GraphError::NotFound {
            url: "https://graph/users/x".to_string(),
        };
        assert!(err.is_not_found());
        let err = GraphError::Status {
            url: String::new(),
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: String::new(),
        };
        assert!(!err.is_not_found());
    }
}
