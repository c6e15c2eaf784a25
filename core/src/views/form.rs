//! Create/edit screen.
//!
//! # Design
//! The mode is fixed at mount: `FormMode::Edit(id)` fetches the entity
//! first, `FormMode::Create` starts from empty fields. Validation only runs
//! on submit. While a save is in flight the submit control is disabled;
//! success schedules a navigation back to the list after
//! `FormOptions::redirect_delay` so the confirmation can be read.

use std::marker::PhantomData;
use std::time::Duration;

use uuid::Uuid;

use crate::client::ConsoleClient;
use crate::http::HttpOutcome;
use crate::resource::{FormResource, Products};
use crate::route::Route;
use crate::types::{EntityId, ImageFile};
use crate::validation::{self, empty_fields, FieldErrors, FieldMap, ImageError, IMAGE};

use super::{failure_message, Effect, RequestGuard, RequestToken, View};

/// How long the success message stays up before returning to the list.
pub const DEFAULT_REDIRECT_DELAY: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(EntityId),
}

impl FormMode {
    pub fn from_route_id(id: Option<EntityId>) -> Self {
        match id {
            Some(id) => FormMode::Edit(id),
            None => FormMode::Create,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    /// Edit mode only: waiting for the entity.
    Loading,
    Editing,
    Saving,
    /// Saved; navigation back to the list is pending.
    Saved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormOptions {
    pub redirect_delay: Duration,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            redirect_delay: DEFAULT_REDIRECT_DELAY,
        }
    }
}

/// What the image area of the product form shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImagePreview {
    /// A file picked in this session, not yet uploaded.
    Selected { reference: String, file_name: String },
    /// The image the server already stores for the entity.
    Stored { path: String },
}

impl ImagePreview {
    pub fn caption(&self) -> &'static str {
        match self {
            ImagePreview::Selected { .. } => "New image preview",
            ImagePreview::Stored { .. } => "Current image",
        }
    }
}

#[derive(Debug, Default)]
struct ImageState {
    selected: Option<(ImageFile, String)>,
    stored: Option<String>,
}

#[derive(Debug, Clone, Copy)]
enum FormRequest {
    Fetch,
    Save,
}

pub struct EntityFormView<R: FormResource> {
    client: ConsoleClient,
    mode: FormMode,
    options: FormOptions,
    phase: FormPhase,
    fields: FieldMap,
    errors: FieldErrors,
    error: Option<String>,
    success: Option<String>,
    image: ImageState,
    guard: RequestGuard<FormRequest>,
    _resource: PhantomData<R>,
}

impl<R: FormResource> EntityFormView<R> {
    /// Mount the form. In edit mode the returned effect fetches the entity.
    pub fn mount(
        client: ConsoleClient,
        mode: FormMode,
        options: FormOptions,
    ) -> (Self, Option<Effect>) {
        let mut view = Self {
            client,
            mode,
            options,
            phase: FormPhase::Editing,
            fields: empty_fields(R::FIELDS),
            errors: FieldErrors::new(),
            error: None,
            success: None,
            image: ImageState::default(),
            guard: RequestGuard::new(),
            _resource: PhantomData,
        };
        let effect = match mode {
            FormMode::Create => None,
            FormMode::Edit(id) => {
                view.phase = FormPhase::Loading;
                let request = R::build_get(&view.client, id);
                Some(view.guard.issue(FormRequest::Fetch, request))
            }
        };
        (view, effect)
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn title(&self) -> String {
        match self.mode {
            FormMode::Create => format!("Add {}", R::TITLE),
            FormMode::Edit(_) => format!("Edit {}", R::TITLE),
        }
    }

    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    pub fn field(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn field_error(&self, name: &str) -> Option<&str> {
        self.errors.get(name).map(String::as_str)
    }

    /// Banner for a failed fetch or save.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn success(&self) -> Option<&str> {
        self.success.as_deref()
    }

    pub fn is_submit_enabled(&self) -> bool {
        self.phase == FormPhase::Editing && self.guard.is_mounted()
    }

    /// Update one field and clear its validation error. Unknown field names
    /// are refused.
    pub fn set_field(&mut self, name: &str, value: impl Into<String>) -> bool {
        let Some(key) = R::FIELDS.iter().copied().find(|field| *field == name) else {
            tracing::warn!(field = name, "no such {} field", R::SINGULAR);
            return false;
        };
        self.fields.insert(key, value.into());
        self.errors.remove(key);
        true
    }

    /// Validate and, when clean, issue the create or update request.
    pub fn submit(&mut self) -> Option<Effect> {
        if !self.is_submit_enabled() {
            return None;
        }
        let errors = R::validate(&self.fields);
        if !errors.is_empty() {
            tracing::debug!(count = errors.len(), "{} form has validation errors", R::SINGULAR);
            self.errors = errors;
            return None;
        }
        self.errors.clear();
        self.error = None;
        self.success = None;

        let image = self.image.selected.as_ref().map(|(file, _)| file);
        match R::build_save(&self.client, self.mode, &self.fields, image) {
            Ok(request) => {
                self.phase = FormPhase::Saving;
                Some(self.guard.issue(FormRequest::Save, request))
            }
            Err(err) => {
                tracing::error!(error = %err, "could not encode {}", R::SINGULAR);
                self.error = Some(failure_message(
                    &err,
                    "Operation failed",
                    "An error occurred. Please try again.",
                ));
                None
            }
        }
    }

    /// Leave without saving. In-progress edits are dropped.
    pub fn cancel(&mut self) -> Effect {
        self.unmount();
        Effect::navigate(Route::List(R::KIND))
    }

    fn finish_fetch(&mut self, outcome: HttpOutcome) {
        self.phase = FormPhase::Editing;
        let FormMode::Edit(id) = self.mode else {
            return;
        };
        let result = outcome
            .map_err(Into::into)
            .and_then(|response| R::parse_get(&self.client, response));
        match result {
            Ok(entity) if R::entity_id(&entity) == id => {
                self.fields = empty_fields(R::FIELDS);
                self.fields.extend(R::to_fields(&entity));
                self.image.stored = R::stored_image(&entity);
            }
            Ok(entity) => {
                tracing::error!(
                    expected = id,
                    got = R::entity_id(&entity),
                    "fetched the wrong {}",
                    R::SINGULAR
                );
                self.error = Some(format!("Failed to load {} data", R::SINGULAR));
            }
            Err(err) => {
                tracing::error!(id, error = %err, "error fetching {}", R::SINGULAR);
                self.error = Some(failure_message(
                    &err,
                    &format!("Failed to load {} data", R::SINGULAR),
                    &format!("Error loading {} data. Please try again later.", R::SINGULAR),
                ));
            }
        }
    }

    fn finish_save(&mut self, outcome: HttpOutcome) -> Vec<Effect> {
        let result = outcome
            .map_err(Into::into)
            .and_then(|response| R::parse_save(&self.client, self.mode, response));
        match result {
            Ok(_) => {
                let verb = match self.mode {
                    FormMode::Create => "created",
                    FormMode::Edit(_) => "updated",
                };
                tracing::info!(mode = ?self.mode, "{} {verb}", R::SINGULAR);
                self.phase = FormPhase::Saved;
                self.success = Some(format!("{} {verb} successfully!", R::TITLE));
                vec![Effect::Navigate {
                    route: Route::List(R::KIND),
                    delay: self.options.redirect_delay,
                }]
            }
            Err(err) => {
                tracing::error!(error = %err, "error saving {}", R::SINGULAR);
                self.phase = FormPhase::Editing;
                self.error = Some(failure_message(
                    &err,
                    "Operation failed",
                    "An error occurred. Please try again.",
                ));
                Vec::new()
            }
        }
    }
}

impl EntityFormView<Products> {
    /// Accept an image for upload. A rejected file sets the `image` field
    /// error and leaves the current selection untouched.
    pub fn select_image(&mut self, file: ImageFile) -> Result<(), ImageError> {
        if let Err(err) = validation::validate_image(&file) {
            tracing::debug!(file = ?file, error = %err, "image rejected");
            self.errors.insert(IMAGE, err.to_string());
            return Err(err);
        }
        let reference = format!("blob:{}", Uuid::new_v4());
        self.image.selected = Some((file, reference));
        self.errors.remove(IMAGE);
        Ok(())
    }

    pub fn selected_image(&self) -> Option<&ImageFile> {
        self.image.selected.as_ref().map(|(file, _)| file)
    }

    /// The new selection wins over the stored image; the stored one is not
    /// deleted unless the save replaces it server-side.
    pub fn preview(&self) -> Option<ImagePreview> {
        match (&self.image.selected, &self.image.stored) {
            (Some((file, reference)), _) => Some(ImagePreview::Selected {
                reference: reference.clone(),
                file_name: file.file_name.clone(),
            }),
            (None, Some(path)) => Some(ImagePreview::Stored { path: path.clone() }),
            (None, None) => None,
        }
    }
}

impl<R: FormResource> View for EntityFormView<R> {
    fn on_response(&mut self, token: RequestToken, outcome: HttpOutcome) -> Vec<Effect> {
        match self.guard.accept(token) {
            Some(FormRequest::Fetch) => {
                self.finish_fetch(outcome);
                Vec::new()
            }
            Some(FormRequest::Save) => self.finish_save(outcome),
            None => Vec::new(),
        }
    }

    fn unmount(&mut self) {
        self.guard.unmount();
    }

    fn is_mounted(&self) -> bool {
        self.guard.is_mounted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{HttpMethod, TransportError};
    use crate::resource::Customers;
    use crate::route::ResourceKind;
    use crate::validation::{COMPANY_NAME, MAX_IMAGE_BYTES, PRICE, PRODUCT_NAME, PRODUCT_TYPE};
    use crate::views::testing::{client, ok, sent};

    fn fill_acme(view: &mut EntityFormView<Customers>) {
        assert!(view.set_field("company_name", "Acme"));
        assert!(view.set_field("address", "1 Rd"));
        assert!(view.set_field("city", "Metropolis"));
        assert!(view.set_field("mobile_number", "555-0100"));
    }

    fn product_form_for(id: EntityId, body: &str) -> EntityFormView<Products> {
        let (mut view, effect) =
            EntityFormView::<Products>::mount(client(), FormMode::Edit(id), FormOptions::default());
        let effect = effect.expect("edit mode fetches");
        let (token, _) = sent(&effect);
        view.on_response(token, ok(200, body));
        view
    }

    const LAMP: &str = r#"{"success":true,"product":{"id":3,"product_name":"Lamp","price":12.5,
        "product_type":"Home","image_path":"/static/uploads/products/original/lamp_1.png"}}"#;

    #[test]
    fn create_mode_starts_empty_and_editable() {
        let (view, effect) =
            EntityFormView::<Customers>::mount(client(), FormMode::Create, FormOptions::default());
        assert!(effect.is_none());
        assert_eq!(view.phase(), FormPhase::Editing);
        assert_eq!(view.title(), "Add Customer");
        assert_eq!(view.fields().len(), 4);
        assert!(view.fields().values().all(String::is_empty));
    }

    #[test]
    fn valid_create_posts_once_and_redirects_after_delay() {
        let options = FormOptions {
            redirect_delay: Duration::from_millis(10),
        };
        let (mut view, _) = EntityFormView::<Customers>::mount(client(), FormMode::Create, options);
        fill_acme(&mut view);

        let effect = view.submit().expect("valid form submits");
        let (token, request) = sent(&effect);
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.path, "http://api.test/api/customers/");
        let body: serde_json::Value =
            serde_json::from_slice(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["company_name"], "Acme");
        assert_eq!(body["city"], "Metropolis");

        assert_eq!(view.phase(), FormPhase::Saving);
        assert!(!view.is_submit_enabled());
        assert!(view.submit().is_none());

        let effects = view.on_response(
            token,
            ok(201, r#"{"success":true,"message":"Customer created successfully"}"#),
        );
        assert_eq!(view.success(), Some("Customer created successfully!"));
        assert_eq!(view.phase(), FormPhase::Saved);
        assert_eq!(
            effects,
            vec![Effect::Navigate {
                route: Route::List(ResourceKind::Customers),
                delay: Duration::from_millis(10),
            }]
        );
    }

    #[test]
    fn invalid_submit_blocks_and_records_errors() {
        let (mut view, _) =
            EntityFormView::<Customers>::mount(client(), FormMode::Create, FormOptions::default());
        fill_acme(&mut view);
        view.set_field("company_name", "  ");

        assert!(view.submit().is_none());
        assert_eq!(view.errors().len(), 1);
        assert_eq!(view.field_error(COMPANY_NAME), Some("Company name is required"));
        assert!(view.is_submit_enabled());

        view.set_field("company_name", "Acme");
        assert!(view.field_error(COMPANY_NAME).is_none());
    }

    #[test]
    fn unknown_fields_are_refused() {
        let (mut view, _) =
            EntityFormView::<Customers>::mount(client(), FormMode::Create, FormOptions::default());
        assert!(!view.set_field("price", "3"));
        assert!(!view.fields().contains_key("price"));
    }

    #[test]
    fn save_failure_keeps_form_populated() {
        let (mut view, _) =
            EntityFormView::<Customers>::mount(client(), FormMode::Create, FormOptions::default());
        fill_acme(&mut view);
        let effect = view.submit().unwrap();
        let (token, _) = sent(&effect);

        let effects = view.on_response(
            token,
            ok(400, r#"{"success":false,"message":"Missing required field: city"}"#),
        );
        assert!(effects.is_empty());
        assert_eq!(view.error(), Some("Missing required field: city"));
        assert_eq!(view.field("company_name"), "Acme");
        assert!(view.is_submit_enabled());
    }

    #[test]
    fn save_fallback_messages() {
        let (mut view, _) =
            EntityFormView::<Customers>::mount(client(), FormMode::Create, FormOptions::default());
        fill_acme(&mut view);

        let effect = view.submit().unwrap();
        let (token, _) = sent(&effect);
        view.on_response(token, ok(200, r#"{"success":false}"#));
        assert_eq!(view.error(), Some("Operation failed"));

        let effect = view.submit().unwrap();
        assert!(view.error().is_none());
        let (token, _) = sent(&effect);
        view.on_response(token, Err(TransportError("refused".to_string())));
        assert_eq!(view.error(), Some("An error occurred. Please try again."));
    }

    #[test]
    fn edit_mode_populates_fields_from_fetch() {
        let view = product_form_for(3, LAMP);
        assert_eq!(view.phase(), FormPhase::Editing);
        assert_eq!(view.title(), "Edit Product");
        assert_eq!(view.field(PRODUCT_NAME), "Lamp");
        assert_eq!(view.field(PRICE), "12.5");
        assert_eq!(view.field(PRODUCT_TYPE), "Home");
        assert_eq!(
            view.preview(),
            Some(ImagePreview::Stored {
                path: "/static/uploads/products/original/lamp_1.png".to_string()
            })
        );
    }

    #[test]
    fn edit_fetch_failure_leaves_empty_defaults() {
        let (mut view, effect) =
            EntityFormView::<Products>::mount(client(), FormMode::Edit(3), FormOptions::default());
        let effect = effect.unwrap();
        let (token, request) = sent(&effect);
        assert_eq!(request.path, "http://api.test/api/products/3");
        assert_eq!(view.phase(), FormPhase::Loading);
        assert!(view.submit().is_none());

        view.on_response(token, Err(TransportError("refused".to_string())));
        assert_eq!(view.error(), Some("Error loading product data. Please try again later."));
        assert_eq!(view.phase(), FormPhase::Editing);
        assert!(view.fields().values().all(String::is_empty));
        assert!(view.preview().is_none());
    }

    #[test]
    fn edit_fetch_of_another_id_is_discarded() {
        let view = product_form_for(4, LAMP);
        assert_eq!(view.error(), Some("Failed to load product data"));
        assert_eq!(view.field(PRODUCT_NAME), "");
    }

    #[test]
    fn edit_submit_updates_by_id_with_multipart() {
        let mut view = product_form_for(3, LAMP);
        view.set_field(PRICE, "14.00");
        let effect = view.submit().unwrap();
        let (token, request) = sent(&effect);
        assert_eq!(request.method, HttpMethod::Put);
        assert_eq!(request.path, "http://api.test/api/products/3");
        assert!(request.header("content-type").unwrap().starts_with("multipart/form-data"));
        let body = String::from_utf8_lossy(request.body.as_deref().unwrap()).into_owned();
        assert!(body.contains("14.00"));
        assert!(!body.contains("filename="));

        view.on_response(token, ok(200, r#"{"success":true}"#));
        assert_eq!(view.success(), Some("Product updated successfully!"));
    }

    #[test]
    fn image_selection_rules() {
        let (mut view, _) =
            EntityFormView::<Products>::mount(client(), FormMode::Create, FormOptions::default());

        let bmp = ImageFile::new("a.bmp", "image/bmp", vec![0; 8]);
        assert!(view.select_image(bmp).is_err());
        assert_eq!(
            view.field_error(IMAGE),
            Some("Please select a valid image file (JPG, PNG, or GIF)")
        );
        assert!(view.selected_image().is_none());

        let big = ImageFile::new("a.png", "image/png", vec![0; MAX_IMAGE_BYTES + 1]);
        assert!(matches!(view.select_image(big), Err(ImageError::TooLarge(_))));
        assert_eq!(view.field_error(IMAGE), Some("Image size must be less than 5MB"));

        let exact = ImageFile::new("b.png", "image/png", vec![0; MAX_IMAGE_BYTES]);
        assert!(view.select_image(exact).is_ok());
        assert!(view.field_error(IMAGE).is_none());
        assert_eq!(view.selected_image().map(|f| f.file_name.as_str()), Some("b.png"));
    }

    #[test]
    fn rejected_image_keeps_previous_selection() {
        let (mut view, _) =
            EntityFormView::<Products>::mount(client(), FormMode::Create, FormOptions::default());
        view.select_image(ImageFile::new("ok.gif", "image/gif", vec![1])).unwrap();
        let _ = view.select_image(ImageFile::new("no.tiff", "image/tiff", vec![1]));
        assert_eq!(view.selected_image().map(|f| f.file_name.as_str()), Some("ok.gif"));
    }

    #[test]
    fn new_image_supersedes_stored_preview() {
        let mut view = product_form_for(3, LAMP);
        view.select_image(ImageFile::new("new.jpg", "image/jpeg", vec![1, 2])).unwrap();
        let preview = view.preview().unwrap();
        assert_eq!(preview.caption(), "New image preview");
        assert!(matches!(
            preview,
            ImagePreview::Selected { ref file_name, .. } if file_name == "new.jpg"
        ));

        let effect = view.submit().unwrap();
        let (_, request) = sent(&effect);
        let body = String::from_utf8_lossy(request.body.as_deref().unwrap()).into_owned();
        assert!(body.contains("filename=\"new.jpg\"\r\nContent-Type: image/jpeg"));
    }

    #[test]
    fn cancel_navigates_back_and_ignores_late_save() {
        let (mut view, _) =
            EntityFormView::<Customers>::mount(client(), FormMode::Create, FormOptions::default());
        fill_acme(&mut view);
        let effect = view.submit().unwrap();
        let (token, _) = sent(&effect);

        assert_eq!(view.cancel(), Effect::navigate(Route::List(ResourceKind::Customers)));
        assert!(!view.is_mounted());

        let effects = view.on_response(token, ok(201, r#"{"success":true}"#));
        assert!(effects.is_empty());
        assert!(view.success().is_none());
    }

    #[test]
    fn mode_from_route_id() {
        assert_eq!(FormMode::from_route_id(None), FormMode::Create);
        assert_eq!(FormMode::from_route_id(Some(3)), FormMode::Edit(3));
    }
}
