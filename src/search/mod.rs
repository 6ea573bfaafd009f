//! Search query pipeline / 搜索查询流程
//!
//! Architecture principles / 架构原则：
//! - The engine and the permission service are collaborators behind traits
//! - This module only orchestrates: guard, query, filter, sanitize
//! - Everything is request-scoped, nothing is cached between queries
//!
//! Flow / 流程：
//! pagination::check -> SearchEngine::query -> filter_unauthorized (optional) -> sanitize

pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod filter;
pub mod pagination;
pub mod sanitize;
pub mod tokenizer;

pub use dispatcher::QueryDispatcher;
pub use engine::{InMemorySearchEngine, IndexableEntry, SearchEngine};
pub use error::ServiceError;
pub use filter::filter_unauthorized;
pub use sanitize::sanitize;
