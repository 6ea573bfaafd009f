//! Search data model / 搜索数据模型
//!
//! Wire types shared by the query pipeline, the engine and the permission client.
//! All JSON is camelCase to match the search frontend.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

/// Structured search query / 搜索查询
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    /// Search term, may be empty / 搜索关键词
    #[serde(default)]
    pub term: String,
    /// Field filters / 字段过滤
    #[serde(default)]
    pub filters: HashMap<String, Value>,
    /// Restrict to these result types / 限定结果类型
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<String>>,
    /// Opaque engine page cursor / 分页游标
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_cursor: Option<String>,
}

impl SearchQuery {
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            ..Default::default()
        }
    }

    pub fn with_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types = Some(types.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    pub fn with_page_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.page_cursor = Some(cursor.into());
        self
    }
}

/// Authorization input carried by an indexed document / 文档的授权信息
///
/// Only the pipeline reads this; it is stripped before a result leaves the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentAuthorization {
    pub permission: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_ref: Option<String>,
}

/// Indexed document / 索引文档
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchDocument {
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization: Option<DocumentAuthorization>,
    /// Engine-specific fields (kind, owner, lifecycle, ...) / 其他字段
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SearchDocument {
    pub fn new(title: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: String::new(),
            location: location.into(),
            authorization: None,
            extra: Map::new(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_authorization(
        mut self,
        permission: impl Into<String>,
        resource_ref: Option<String>,
    ) -> Self {
        self.authorization = Some(DocumentAuthorization {
            permission: permission.into(),
            resource_ref,
        });
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Look up a field by name for filter matching / 按字段名取值
    pub fn field(&self, name: &str) -> Option<Value> {
        match name {
            "title" => Some(Value::String(self.title.clone())),
            "text" => Some(Value::String(self.text.clone())),
            "location" => Some(Value::String(self.location.clone())),
            _ => self.extra.get(name).cloned(),
        }
    }
}

/// Single ranked hit / 搜索结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    #[serde(rename = "type")]
    pub result_type: String,
    pub document: SearchDocument,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<usize>,
}

impl SearchResult {
    pub fn new(result_type: impl Into<String>, document: SearchDocument) -> Self {
        Self {
            result_type: result_type.into(),
            document,
            score: None,
            rank: None,
        }
    }
}

/// Ordered result page / 结果集
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultSet {
    pub results: Vec<SearchResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_cursor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_page_cursor: Option<String>,
}

impl SearchResultSet {
    pub fn new(results: Vec<SearchResult>) -> Self {
        Self {
            results,
            next_page_cursor: None,
            previous_page_cursor: None,
        }
    }
}

/// A single question for the permission service / 权限检查请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizeRequest {
    pub permission: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_ref: Option<String>,
}

impl From<&DocumentAuthorization> for AuthorizeRequest {
    fn from(auth: &DocumentAuthorization) -> Self {
        Self {
            permission: auth.permission.clone(),
            resource_ref: auth.resource_ref.clone(),
        }
    }
}

/// Permission service answer / 权限检查结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthorizeDecision {
    Allow,
    Deny,
    /// Policy needs resource-level conditions the caller must apply / 条件授权
    Conditional,
}

/// Caller identity credential / 身份令牌
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(***)")
    }
}
