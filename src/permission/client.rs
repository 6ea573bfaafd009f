//! HTTP permission client / HTTP 权限客户端
//!
//! Talks to `POST {base_url}/authorize` with the batch envelope the permission
//! backend expects, one item per call.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{PermissionClient, PermissionError};
use crate::models::{AuthorizeDecision, AuthorizeRequest, Token};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthorizeItem<'a> {
    id: String,
    permission: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    resource_ref: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct AuthorizeEnvelope<'a> {
    items: Vec<AuthorizeItem<'a>>,
}

#[derive(Debug, Deserialize)]
struct DecisionItem {
    id: String,
    result: AuthorizeDecision,
}

#[derive(Debug, Deserialize)]
struct DecisionEnvelope {
    items: Vec<DecisionItem>,
}

pub struct HttpPermissionClient {
    client: reqwest::Client,
    authorize_url: String,
    timeout: Duration,
}

impl HttpPermissionClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, timeout)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str, timeout: Duration) -> Self {
        Self {
            client,
            authorize_url: format!("{}/authorize", base_url.trim_end_matches('/')),
            timeout,
        }
    }

    pub fn authorize_url(&self) -> &str {
        &self.authorize_url
    }
}

#[async_trait]
impl PermissionClient for HttpPermissionClient {
    async fn authorize(
        &self,
        request: &AuthorizeRequest,
        token: Option<&Token>,
    ) -> Result<AuthorizeDecision, PermissionError> {
        let id = uuid::Uuid::new_v4().to_string();
        let body = AuthorizeEnvelope {
            items: vec![AuthorizeItem {
                id: id.clone(),
                permission: &request.permission,
                resource_ref: request.resource_ref.as_deref(),
            }],
        };

        let mut req = self
            .client
            .post(&self.authorize_url)
            .timeout(self.timeout)
            .json(&body);
        if let Some(token) = token {
            req = req.bearer_auth(token.as_str());
        }

        let response = req.send().await?;
        if !response.status().is_success() {
            return Err(PermissionError::Status {
                status: response.status().as_u16(),
            });
        }

        let envelope: DecisionEnvelope = response.json().await?;
        envelope
            .items
            .into_iter()
            .find(|item| item.id == id)
            .map(|item| item.result)
            .ok_or(PermissionError::MissingDecision { id })
    }
}
