//! Permission collaborator / 权限服务
//!
//! The pipeline only asks "may this identity see this resource"; policy
//! evaluation lives in the remote permission service.

pub mod client;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{AuthorizeDecision, AuthorizeRequest, Token};

pub use client::HttpPermissionClient;

#[derive(Debug, Error)]
pub enum PermissionError {
    /// Request never completed (connect error, timeout, bad body) / 请求失败
    #[error("permission request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Service answered with a non-success status / 服务返回错误状态
    #[error("permission service returned {status}")]
    Status { status: u16 },

    /// Response did not contain a decision for our request / 响应缺少结果
    #[error("no decision returned for request {id}")]
    MissingDecision { id: String },
}

/// Decision service used by the authorization filter / 权限决策接口
#[async_trait]
pub trait PermissionClient: Send + Sync {
    async fn authorize(
        &self,
        request: &AuthorizeRequest,
        token: Option<&Token>,
    ) -> Result<AuthorizeDecision, PermissionError>;
}

/// Allows everything; used when filtering is off and no service is configured / 全部允许
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAllPermissionClient;

#[async_trait]
impl PermissionClient for AllowAllPermissionClient {
    async fn authorize(
        &self,
        _request: &AuthorizeRequest,
        _token: Option<&Token>,
    ) -> Result<AuthorizeDecision, PermissionError> {
        Ok(AuthorizeDecision::Allow)
    }
}
