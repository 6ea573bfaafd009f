//! Pagination guard / 分页检查
//!
//! Engine cursors are computed against the unfiltered candidate set, so they are
//! meaningless once permission filtering removes entries.

use super::error::{Result, ServiceError};

/// Reject a page cursor when results are filtered per identity / 过滤开启时拒绝分页请求
pub fn check(page_cursor: Option<&str>, filtering_enabled: bool) -> Result<()> {
    let has_cursor = page_cursor.is_some_and(|cursor| !cursor.is_empty());
    if filtering_enabled && has_cursor {
        return Err(ServiceError::InvalidPaginationRequest);
    }
    Ok(())
}
