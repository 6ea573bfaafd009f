//! Query dispatcher / 查询调度
//!
//! guard -> engine -> permission filter (optional) -> sanitize

use std::sync::Arc;

use super::engine::SearchEngine;
use super::error::{Result, ServiceError};
use super::filter::filter_unauthorized;
use super::pagination;
use super::sanitize::sanitize;
use crate::models::{AuthorizeRequest, SearchQuery, SearchResult, SearchResultSet, Token};
use crate::permission::PermissionClient;

pub struct QueryDispatcher {
    engine: Arc<dyn SearchEngine>,
    permissions: Arc<dyn PermissionClient>,
    max_concurrent_checks: usize,
}

impl QueryDispatcher {
    pub fn new(
        engine: Arc<dyn SearchEngine>,
        permissions: Arc<dyn PermissionClient>,
        max_concurrent_checks: usize,
    ) -> Self {
        Self {
            engine,
            permissions,
            max_concurrent_checks,
        }
    }

    /// Run one query for one caller / 执行一次查询
    pub async fn execute(
        &self,
        query: &SearchQuery,
        token: Option<&Token>,
        filtering_enabled: bool,
    ) -> Result<SearchResultSet> {
        pagination::check(query.page_cursor.as_deref(), filtering_enabled)?;

        let result_set = self.engine.query(query).await.map_err(|e| {
            tracing::error!("Search engine query failed: {:#}", e);
            ServiceError::EngineQueryFailed { source: e }
        })?;

        let result_set = if filtering_enabled {
            let results = filter_unauthorized(
                result_set.results,
                authorize_request_for,
                token,
                self.permissions.as_ref(),
                self.max_concurrent_checks,
            )
            .await;
            // engine cursors point into the unfiltered set
            SearchResultSet::new(results)
        } else {
            result_set
        };

        Ok(SearchResultSet {
            results: sanitize(result_set.results),
            ..result_set
        })
    }
}

fn authorize_request_for(result: &SearchResult) -> Option<AuthorizeRequest> {
    result.document.authorization.as_ref().map(AuthorizeRequest::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AuthorizeDecision, SearchDocument};
    use crate::permission::PermissionError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns a canned result set and counts calls / 固定结果的测试引擎
    struct StubEngine {
        result: Option<SearchResultSet>,
        calls: AtomicUsize,
    }

    impl StubEngine {
        fn returning(result: SearchResultSet) -> Arc<Self> {
            Arc::new(Self {
                result: Some(result),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                result: None,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl SearchEngine for StubEngine {
        async fn query(&self, _query: &SearchQuery) -> anyhow::Result<SearchResultSet> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result
                .clone()
                .ok_or_else(|| anyhow::anyhow!("index shard 3 unavailable"))
        }
    }

    /// resource ref -> decision, `None` means the service errors / 测试权限服务
    struct MapPermissions {
        decisions: HashMap<String, Option<AuthorizeDecision>>,
        expected_token: Option<String>,
    }

    #[async_trait]
    impl PermissionClient for MapPermissions {
        async fn authorize(
            &self,
            request: &AuthorizeRequest,
            token: Option<&Token>,
        ) -> std::result::Result<AuthorizeDecision, PermissionError> {
            if token.map(|t| t.as_str().to_string()) != self.expected_token {
                return Ok(AuthorizeDecision::Deny);
            }
            let key = request.resource_ref.clone().unwrap_or_default();
            match self.decisions.get(&key) {
                Some(Some(decision)) => Ok(*decision),
                Some(None) => Err(PermissionError::Status { status: 502 }),
                None => Ok(AuthorizeDecision::Deny),
            }
        }
    }

    fn result(name: &str) -> SearchResult {
        SearchResult {
            score: Some(1.0),
            rank: None,
            ..SearchResult::new(
                "software-catalog",
                SearchDocument::new(name, format!("/catalog/{}", name))
                    .with_text(format!("{} catalog entry", name))
                    .with_authorization("catalog.entity.read", Some(name.to_string())),
            )
        }
    }

    fn engine_output() -> SearchResultSet {
        SearchResultSet {
            results: ["R1", "R2", "R3", "R4", "R5"].iter().map(|n| result(n)).collect(),
            next_page_cursor: Some("MQ==".to_string()),
            previous_page_cursor: Some("MA==".to_string()),
        }
    }

    fn catalog_permissions() -> Arc<MapPermissions> {
        let decisions = HashMap::from([
            ("R1".to_string(), Some(AuthorizeDecision::Allow)),
            ("R2".to_string(), Some(AuthorizeDecision::Deny)),
            ("R3".to_string(), Some(AuthorizeDecision::Allow)),
            ("R4".to_string(), None),
            ("R5".to_string(), Some(AuthorizeDecision::Allow)),
        ]);
        Arc::new(MapPermissions {
            decisions,
            expected_token: Some("user-token".to_string()),
        })
    }

    fn titles(set: &SearchResultSet) -> Vec<&str> {
        set.results.iter().map(|r| r.document.title.as_str()).collect()
    }

    #[tokio::test]
    async fn test_unfiltered_passes_results_through_sanitized() {
        let engine = StubEngine::returning(engine_output());
        let dispatcher = QueryDispatcher::new(engine.clone(), catalog_permissions(), 4);

        let out = dispatcher
            .execute(&SearchQuery::new("catalog"), None, false)
            .await
            .unwrap();

        assert_eq!(titles(&out), vec!["R1", "R2", "R3", "R4", "R5"]);
        assert_eq!(out.next_page_cursor.as_deref(), Some("MQ=="));
        assert_eq!(out.previous_page_cursor.as_deref(), Some("MA=="));
        let expected = sanitize(engine_output().results);
        assert_eq!(out.results, expected);
        assert!(out.results.iter().all(|r| r.document.authorization.is_none()));
    }

    #[tokio::test]
    async fn test_unfiltered_cursor_is_forwarded() {
        let engine = StubEngine::returning(engine_output());
        let dispatcher = QueryDispatcher::new(engine.clone(), catalog_permissions(), 4);

        let query = SearchQuery::new("catalog").with_page_cursor("MQ==");
        assert!(dispatcher.execute(&query, None, false).await.is_ok());
        assert_eq!(engine.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cursor_with_filtering_skips_engine() {
        let engine = StubEngine::returning(engine_output());
        let dispatcher = QueryDispatcher::new(engine.clone(), catalog_permissions(), 4);

        let query = SearchQuery::new("catalog").with_page_cursor("MQ==");
        let token = Token::new("user-token");
        let err = dispatcher.execute(&query, Some(&token), true).await.unwrap_err();

        assert!(matches!(err, ServiceError::InvalidPaginationRequest));
        assert_eq!(engine.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_filtered_catalog_scenario() {
        let engine = StubEngine::returning(engine_output());
        let dispatcher = QueryDispatcher::new(engine.clone(), catalog_permissions(), 2);
        let token = Token::new("user-token");

        let out = dispatcher
            .execute(&SearchQuery::new("catalog"), Some(&token), true)
            .await
            .unwrap();

        assert_eq!(titles(&out), vec!["R1", "R3", "R5"]);
        assert!(out.next_page_cursor.is_none());
        assert!(out.previous_page_cursor.is_none());
        assert!(out.results.iter().all(|r| r.document.authorization.is_none()));
        assert!(out.results.iter().all(|r| r.score == Some(1.0)));
    }

    #[tokio::test]
    async fn test_filtering_uses_caller_token() {
        let engine = StubEngine::returning(engine_output());
        let dispatcher = QueryDispatcher::new(engine, catalog_permissions(), 4);

        let out = dispatcher
            .execute(&SearchQuery::new("catalog"), None, true)
            .await
            .unwrap();

        assert!(out.results.is_empty());
    }

    #[tokio::test]
    async fn test_filtering_drops_documents_without_authorization_input() {
        let bare = SearchResult::new(
            "techdocs",
            SearchDocument::new("Guide", "/docs/guide").with_text("catalog guide"),
        );
        let engine = StubEngine::returning(SearchResultSet::new(vec![bare.clone()]));
        let permissions = Arc::new(MapPermissions {
            decisions: HashMap::new(),
            expected_token: None,
        });
        let dispatcher = QueryDispatcher::new(engine, permissions, 4);

        let filtered = dispatcher
            .execute(&SearchQuery::new("catalog"), None, true)
            .await
            .unwrap();
        assert!(filtered.results.is_empty());

        let unfiltered = dispatcher
            .execute(&SearchQuery::new("catalog"), None, false)
            .await
            .unwrap();
        assert_eq!(unfiltered.results, vec![bare]);
    }

    #[tokio::test]
    async fn test_engine_failure_is_wrapped() {
        let engine = StubEngine::failing();
        let dispatcher = QueryDispatcher::new(engine.clone(), catalog_permissions(), 4);

        let err = dispatcher
            .execute(&SearchQuery::new("catalog"), None, true)
            .await
            .unwrap_err();

        match &err {
            ServiceError::EngineQueryFailed { source } => {
                assert!(source.to_string().contains("shard 3"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(err.public_message(), super::super::error::QUERY_FAILED);
        assert_eq!(engine.calls.load(Ordering::SeqCst), 1);
    }
}
