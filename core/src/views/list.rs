//! Collection screen with delete confirmation.
//!
//! `Loading → Ready | Failed`. While ready, a delete goes through
//! `DeletePrompt::Confirming` and `DeletePrompt::Deleting`; the item leaves
//! the local collection only after the server confirms. No re-fetch follows
//! a delete, so the list may drift from the server until the next mount or
//! retry.

use std::marker::PhantomData;

use crate::client::ConsoleClient;
use crate::http::HttpOutcome;
use crate::resource::Resource;
use crate::route::Route;
use crate::types::EntityId;

use super::{failure_message, Effect, RequestGuard, RequestToken, View};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListPhase {
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePrompt {
    Closed,
    Confirming { id: EntityId },
    Deleting { id: EntityId },
}

#[derive(Debug, Clone, Copy)]
enum ListRequest {
    Fetch,
    Delete(EntityId),
}

pub struct EntityListView<R: Resource> {
    client: ConsoleClient,
    phase: ListPhase,
    items: Vec<R::Entity>,
    prompt: DeletePrompt,
    notice: Option<String>,
    guard: RequestGuard<ListRequest>,
    _resource: PhantomData<R>,
}

impl<R: Resource> EntityListView<R> {
    /// Mount the view and start loading the collection.
    pub fn mount(client: ConsoleClient) -> (Self, Effect) {
        let mut view = Self {
            client,
            phase: ListPhase::Loading,
            items: Vec::new(),
            prompt: DeletePrompt::Closed,
            notice: None,
            guard: RequestGuard::new(),
            _resource: PhantomData,
        };
        let effect = view.fetch();
        (view, effect)
    }

    pub fn phase(&self) -> &ListPhase {
        &self.phase
    }

    pub fn items(&self) -> &[R::Entity] {
        &self.items
    }

    pub fn prompt(&self) -> DeletePrompt {
        self.prompt
    }

    /// Message from the last failed delete, shown above the table.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.phase == ListPhase::Loading
    }

    /// Re-issue the list request. Ignored while a fetch is already running.
    pub fn retry(&mut self) -> Option<Effect> {
        if self.is_loading() || !self.guard.is_mounted() {
            return None;
        }
        Some(self.fetch())
    }

    /// Open the confirmation prompt for `id`. Returns false when the list is
    /// not ready, a delete is already underway, or `id` is not listed.
    pub fn request_delete(&mut self, id: EntityId) -> bool {
        if self.phase != ListPhase::Ready || matches!(self.prompt, DeletePrompt::Deleting { .. }) {
            return false;
        }
        if !self.items.iter().any(|item| R::entity_id(item) == id) {
            tracing::warn!(id, "{} not in list, cannot delete", R::SINGULAR);
            return false;
        }
        self.notice = None;
        self.prompt = DeletePrompt::Confirming { id };
        true
    }

    /// Discard the candidate. No request is made.
    pub fn cancel_delete(&mut self) {
        if let DeletePrompt::Confirming { .. } = self.prompt {
            self.prompt = DeletePrompt::Closed;
        }
    }

    /// Issue the delete for the candidate held by the prompt.
    pub fn confirm_delete(&mut self) -> Option<Effect> {
        let DeletePrompt::Confirming { id } = self.prompt else {
            return None;
        };
        self.prompt = DeletePrompt::Deleting { id };
        let request = R::build_delete(&self.client, id);
        Some(self.guard.issue(ListRequest::Delete(id), request))
    }

    pub fn add(&self) -> Effect {
        Effect::navigate(Route::Add(R::KIND))
    }

    pub fn edit(&self, id: EntityId) -> Effect {
        Effect::navigate(Route::Edit(R::KIND, id))
    }

    fn fetch(&mut self) -> Effect {
        self.phase = ListPhase::Loading;
        let request = R::build_list(&self.client);
        self.guard.issue(ListRequest::Fetch, request)
    }

    fn finish_fetch(&mut self, outcome: HttpOutcome) {
        let result = outcome
            .map_err(Into::into)
            .and_then(|response| R::parse_list(&self.client, response));
        match result {
            Ok(items) => {
                tracing::debug!(count = items.len(), "{} loaded", R::plural());
                self.items = items;
                self.phase = ListPhase::Ready;
            }
            Err(err) => {
                tracing::error!(error = %err, "error fetching {}", R::plural());
                self.phase = ListPhase::Failed(failure_message(
                    &err,
                    &format!("Failed to load {}", R::plural()),
                    &format!("Error loading {}. Please try again later.", R::plural()),
                ));
            }
        }
    }

    fn finish_delete(&mut self, id: EntityId, outcome: HttpOutcome) {
        self.prompt = DeletePrompt::Closed;
        let result = outcome
            .map_err(Into::into)
            .and_then(|response| R::parse_delete(&self.client, response));
        match result {
            Ok(_) => {
                tracing::info!(id, "{} deleted", R::SINGULAR);
                self.items.retain(|item| R::entity_id(item) != id);
            }
            Err(err) => {
                tracing::error!(id, error = %err, "error deleting {}", R::SINGULAR);
                self.notice = Some(failure_message(
                    &err,
                    &format!("Failed to delete {}", R::SINGULAR),
                    &format!("Error deleting {}. Please try again later.", R::SINGULAR),
                ));
            }
        }
    }
}

impl<R: Resource> View for EntityListView<R> {
    fn on_response(&mut self, token: RequestToken, outcome: HttpOutcome) -> Vec<Effect> {
        match self.guard.accept(token) {
            Some(ListRequest::Fetch) => self.finish_fetch(outcome),
            Some(ListRequest::Delete(id)) => self.finish_delete(id, outcome),
            None => {}
        }
        Vec::new()
    }

    fn unmount(&mut self) {
        self.guard.unmount();
    }

    fn is_mounted(&self) -> bool {
        self.guard.is_mounted()
    }
}
