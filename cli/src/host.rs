//! Runs views against the live API and follows their navigation.

use std::collections::VecDeque;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use console_core::{
    ConsoleClient, Customers, Effect, EntityFormView, EntityId, EntityListView, FormMode,
    FormOptions, ListPhase, Products, ResourceKind, Route, View,
};

use crate::render::{self, Screen};
use crate::transport::Transport;

/// How the last screen ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Failed,
}

impl From<Status> for ExitCode {
    fn from(status: Status) -> Self {
        match status {
            Status::Ok => ExitCode::SUCCESS,
            Status::Failed => ExitCode::FAILURE,
        }
    }
}

pub struct Host {
    client: ConsoleClient,
    transport: Transport,
    options: FormOptions,
}

impl Host {
    pub fn new(client: ConsoleClient, transport: Transport, options: FormOptions) -> Self {
        Self {
            client,
            transport,
            options,
        }
    }

    /// Execute request effects, feeding each outcome back into `view`,
    /// until none are left. Returns the navigation the view asked for.
    pub fn drive<V: View>(
        &self,
        view: &mut V,
        effects: impl IntoIterator<Item = Effect>,
    ) -> Option<(Route, Duration)> {
        let mut queue: VecDeque<Effect> = effects.into_iter().collect();
        let mut navigation = None;
        while let Some(effect) = queue.pop_front() {
            match effect {
                Effect::Send { token, request } => {
                    let outcome = self.transport.execute(request);
                    queue.extend(view.on_response(token, outcome));
                }
                Effect::Navigate { route, delay } => {
                    tracing::debug!(%route, ?delay, "navigation requested");
                    navigation = Some((route, delay));
                }
            }
        }
        navigation
    }

    /// Show the page behind `route`. Forms are displayed, not submitted.
    pub fn open(&self, route: Route) -> Status {
        match route {
            Route::Dashboard => {
                print!("{}", render::dashboard());
                Status::Ok
            }
            Route::List(ResourceKind::Customers) => self.list::<Customers>(),
            Route::List(ResourceKind::Products) => self.list::<Products>(),
            Route::Add(kind) => self.open_form(kind, None),
            Route::Edit(kind, id) => self.open_form(kind, Some(id)),
        }
    }

    fn open_form(&self, kind: ResourceKind, id: Option<EntityId>) -> Status {
        let mode = FormMode::from_route_id(id);
        match kind {
            ResourceKind::Customers => self.show_form::<Customers>(mode),
            ResourceKind::Products => self.show_form::<Products>(mode),
        }
    }

    pub fn list<R: Screen>(&self) -> Status {
        let (mut view, effect) = EntityListView::<R>::mount(self.client.clone());
        self.drive(&mut view, [effect]);
        print!("{}", render::list(&view));
        list_status(&view)
    }

    /// Load the list, ask `confirm` and delete `id` when it agrees.
    pub fn delete<R: Screen>(&self, id: EntityId, confirm: impl FnOnce(&str) -> bool) -> Status {
        let (mut view, effect) = EntityListView::<R>::mount(self.client.clone());
        self.drive(&mut view, [effect]);
        if let ListPhase::Failed(_) = view.phase() {
            print!("{}", render::list(&view));
            return Status::Failed;
        }
        if !view.request_delete(id) {
            eprintln!("{} {id} not found", R::TITLE);
            return Status::Failed;
        }

        let question = format!(
            "Are you sure you want to delete this {}? This action cannot be undone.",
            R::SINGULAR
        );
        if confirm(&question) {
            if let Some(effect) = view.confirm_delete() {
                self.drive(&mut view, [effect]);
            }
        } else {
            view.cancel_delete();
        }
        print!("{}", render::list(&view));
        list_status(&view)
    }

    pub fn show_form<R: Screen>(&self, mode: FormMode) -> Status {
        let (mut view, effect) =
            EntityFormView::<R>::mount(self.client.clone(), mode, self.options);
        self.drive(&mut view, effect);
        print!("{}", render::form(&view));
        if view.error().is_some() {
            Status::Failed
        } else {
            Status::Ok
        }
    }

    /// Mount the form, let `fill` enter values and submit. A successful save
    /// shows the confirmation, waits out the redirect delay and then shows
    /// the list.
    pub fn submit_form<R: Screen>(
        &self,
        mode: FormMode,
        fill: impl FnOnce(&mut EntityFormView<R>) -> bool,
    ) -> Status {
        let (mut view, effect) =
            EntityFormView::<R>::mount(self.client.clone(), mode, self.options);
        self.drive(&mut view, effect);
        if view.error().is_some() || !fill(&mut view) {
            print!("{}", render::form(&view));
            return Status::Failed;
        }

        let Some(effect) = view.submit() else {
            print!("{}", render::form(&view));
            return Status::Failed;
        };
        let navigation = self.drive(&mut view, [effect]);
        print!("{}", render::form(&view));

        match navigation {
            Some((route, delay)) => {
                view.unmount();
                if !delay.is_zero() {
                    thread::sleep(delay);
                }
                println!();
                self.open(route)
            }
            None => Status::Failed,
        }
    }

    pub fn health(&self) -> Status {
        let outcome = self
            .transport
            .execute(self.client.build_health())
            .map_err(Into::into)
            .and_then(|response| self.client.parse_health(response));
        match outcome {
            Ok(health) => {
                println!("{}: {}", health.status, health.message);
                Status::Ok
            }
            Err(err) => {
                tracing::error!(error = %err, "health check failed");
                println!("API unavailable: {err}");
                Status::Failed
            }
        }
    }
}

fn list_status<R: Screen>(view: &EntityListView<R>) -> Status {
    match view.phase() {
        ListPhase::Ready if view.notice().is_none() => Status::Ok,
        _ => Status::Failed,
    }
}
