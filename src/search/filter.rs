//! Authorization filter / 权限过滤
//!
//! Checks every entry against the permission service with bounded concurrency.
//! Output order always equals input order; `buffered` yields in submission order,
//! not completion order.
//!
//! Failed or non-definitive checks exclude the entry (fail-closed), and so does
//! an entry with no authorization input.

use futures::stream::{self, StreamExt};

use crate::models::{AuthorizeDecision, AuthorizeRequest, Token};
use crate::permission::PermissionClient;

/// Keep only entries the identity may see / 仅保留有权限的条目
///
/// `to_authorize_request` returning `None` means the entry carries no
/// authorization input; it is excluded without a check.
pub async fn filter_unauthorized<E, F>(
    entries: Vec<E>,
    to_authorize_request: F,
    token: Option<&Token>,
    permissions: &dyn PermissionClient,
    max_concurrency: usize,
) -> Vec<E>
where
    F: Fn(&E) -> Option<AuthorizeRequest>,
{
    let total = entries.len();
    let checks = entries.into_iter().enumerate().map(|(index, entry)| {
        let request = to_authorize_request(&entry);
        async move {
            let allowed = match request {
                None => {
                    tracing::debug!("Result {} has no authorization input, excluding", index);
                    false
                }
                Some(request) => is_allowed(index, &request, token, permissions).await,
            };
            allowed.then_some(entry)
        }
    });

    let kept: Vec<E> = stream::iter(checks)
        .buffered(max_concurrency.max(1))
        .filter_map(|entry| async move { entry })
        .collect()
        .await;

    tracing::debug!("Authorization filter kept {}/{} results", kept.len(), total);
    kept
}

async fn is_allowed(
    index: usize,
    request: &AuthorizeRequest,
    token: Option<&Token>,
    permissions: &dyn PermissionClient,
) -> bool {
    match permissions.authorize(request, token).await {
        Ok(AuthorizeDecision::Allow) => true,
        Ok(AuthorizeDecision::Deny) => false,
        Ok(AuthorizeDecision::Conditional) => {
            tracing::debug!(
                "Conditional decision for result {} ({}), excluding",
                index,
                request.permission
            );
            false
        }
        Err(e) => {
            tracing::warn!(
                "Permission check failed for result {} ({}): {}, excluding",
                index,
                request.permission,
                e
            );
            false
        }
    }
}
