//! Result sanitizer / 结果清理

use crate::models::SearchResult;

const AUTHORIZATION_FIELD: &str = "authorization";

/// Drop authorization input from every document / 移除所有文档的授权信息
///
/// Applied to every response regardless of whether permission filtering ran.
/// An `authorization` key carried among the extra fields is removed too.
pub fn sanitize(results: Vec<SearchResult>) -> Vec<SearchResult> {
    results
        .into_iter()
        .map(|mut result| {
            result.document.authorization = None;
            result.document.extra.remove(AUTHORIZATION_FIELD);
            result
        })
        .collect()
}
