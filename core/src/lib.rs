//! Client core for the customer/product console.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern), and drives the list and
//! form screens as view-models that hand request and navigation effects to
//! their host.
//!
//! # Design
//! - `ConsoleClient` is stateless: it holds only the base URL resolved into
//!   an `ApiConfig` at start-up.
//! - Each CRUD operation is split into `build_*` (produces request) and
//!   `parse_*` (consumes response), so the I/O boundary is explicit.
//! - Views are generic over a `Resource`; validation is a pure function per
//!   entity so it can be tested without a view.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod multipart;
pub mod resource;
pub mod route;
pub mod types;
pub mod validation;
pub mod views;

pub use client::ConsoleClient;
pub use config::{ApiConfig, DeploymentMode};
pub use error::ApiError;
pub use http::{HttpMethod, HttpOutcome, HttpRequest, HttpResponse, TransportError};
pub use resource::{Customers, FormResource, Products, Resource};
pub use route::{ResourceKind, Route};
pub use types::{
    Ack, Customer, CustomerInput, EntityId, Envelope, Health, ImageFile, Product, ProductInput,
};
pub use validation::{
    validate_customer, validate_image, validate_product, FieldErrors, FieldMap, ImageError,
};
pub use views::form::{
    EntityFormView, FormMode, FormOptions, FormPhase, ImagePreview, DEFAULT_REDIRECT_DELAY,
};
pub use views::list::{DeletePrompt, EntityListView, ListPhase};
pub use views::{Effect, RequestToken, View};
