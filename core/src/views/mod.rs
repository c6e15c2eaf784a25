//! View-models for the list and form screens.
//!
//! # Design
//! Views never perform I/O. Every operation that needs the network returns
//! an `Effect::Send` carrying a fresh `RequestToken`; the host executes the
//! request and hands the outcome back through `View::on_response` together
//! with that token. A view only applies outcomes for tokens it issued and
//! still waits on, and none at all once it has been unmounted, so a late
//! response can never update a screen the user already left.

pub mod form;
pub mod list;

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use uuid::Uuid;

use crate::error::ApiError;
use crate::http::{HttpOutcome, HttpRequest};
use crate::route::Route;

/// Identifies one outstanding request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestToken(Uuid);

impl RequestToken {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Work a view asks its host to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Execute `request` and report back with `token`.
    Send { token: RequestToken, request: HttpRequest },
    /// Switch to `route` once `delay` has passed.
    Navigate { route: Route, delay: Duration },
}

impl Effect {
    pub fn navigate(route: Route) -> Self {
        Effect::Navigate {
            route,
            delay: Duration::ZERO,
        }
    }
}

/// What hosts need from any mounted view.
pub trait View {
    /// Apply the outcome of a request this view issued. Returns follow-up
    /// effects, typically a navigation.
    fn on_response(&mut self, token: RequestToken, outcome: HttpOutcome) -> Vec<Effect>;

    /// Tear the view down. Later responses are ignored.
    fn unmount(&mut self);

    fn is_mounted(&self) -> bool;
}

/// Tracks which requests a view is still waiting for.
#[derive(Debug)]
pub(crate) struct RequestGuard<K> {
    mounted: bool,
    pending: HashMap<RequestToken, K>,
}

impl<K: fmt::Debug> RequestGuard<K> {
    pub(crate) fn new() -> Self {
        Self {
            mounted: true,
            pending: HashMap::new(),
        }
    }

    pub(crate) fn issue(&mut self, kind: K, request: HttpRequest) -> Effect {
        let token = RequestToken::new();
        tracing::debug!(
            %token,
            ?kind,
            method = request.method.as_str(),
            path = %request.path,
            "issuing request"
        );
        self.pending.insert(token, kind);
        Effect::Send { token, request }
    }

    /// Claim a response. `None` means it must not touch view state.
    pub(crate) fn accept(&mut self, token: RequestToken) -> Option<K> {
        if !self.mounted {
            tracing::debug!(%token, "view unmounted, dropping response");
            return None;
        }
        let kind = self.pending.remove(&token);
        if kind.is_none() {
            tracing::debug!(%token, "unknown request token, dropping response");
        }
        kind
    }

    pub(crate) fn unmount(&mut self) {
        self.mounted = false;
        self.pending.clear();
    }

    pub(crate) fn is_mounted(&self) -> bool {
        self.mounted
    }
}

/// User-facing text for a failed request.
///
/// A message the server attached always wins. Otherwise a well-formed
/// rejection gets `rejected` and anything else (no response, unreadable
/// response, bare error status) gets `unreachable`.
pub(crate) fn failure_message(err: &ApiError, rejected: &str, unreachable: &str) -> String {
    match err.server_message() {
        Some(message) => message.to_string(),
        None if err.is_rejection() => rejected.to_string(),
        None => unreachable.to_string(),
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{HttpMethod, TransportError};

    fn request() -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: "/x".to_string(),
            headers: Vec::new(),
            body: None,
        }
    }

    #[test]
    fn guard_accepts_each_token_once() {
        let mut guard = RequestGuard::new();
        let Effect::Send { token, .. } = guard.issue("fetch", request()) else {
            panic!("expected send");
        };
        assert_eq!(guard.accept(token), Some("fetch"));
        assert_eq!(guard.accept(token), None);
    }

    #[test]
    fn tokens_are_distinct() {
        let first = RequestToken::new();
        assert_ne!(first, RequestToken::new());
        assert_eq!(first, first);
    }

    #[test]
    fn guard_drops_everything_after_unmount() {
        let mut guard = RequestGuard::new();
        let Effect::Send { token, .. } = guard.issue("fetch", request()) else {
            panic!("expected send");
        };
        guard.unmount();
        assert!(!guard.is_mounted());
        assert_eq!(guard.accept(token), None);
    }

    #[test]
    fn failure_message_prefers_server_text() {
        let rejected = ApiError::Rejected { message: None };
        assert_eq!(
            failure_message(&rejected, "Operation failed", "Try later"),
            "Operation failed"
        );

        let with_message = ApiError::HttpError {
            status: 400,
            message: Some("Price must be a valid number".to_string()),
            body: String::new(),
        };
        assert_eq!(
            failure_message(&with_message, "Operation failed", "Try later"),
            "Price must be a valid number"
        );

        let transport = ApiError::from(TransportError("refused".to_string()));
        assert_eq!(
            failure_message(&transport, "Operation failed", "Try later"),
            "Try later"
        );
    }
}
