//! Per-resource glue between the generic views and `ConsoleClient`.
//!
//! # Design
//! List and form views are written once and parameterised by a marker type.
//! The marker picks the client operations, the field names, the validator
//! and the wording of user-facing messages. `Customers` and `Products` are
//! the only implementations.

use std::fmt::Debug;

use crate::client::ConsoleClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::route::ResourceKind;
use crate::types::{Ack, Customer, CustomerInput, EntityId, ImageFile, Product, ProductInput};
use crate::validation::{
    self, FieldErrors, FieldMap, ADDRESS, CITY, COMPANY_NAME, MOBILE_NUMBER, PRICE, PRODUCT_NAME,
    PRODUCT_TYPE,
};
use crate::views::form::FormMode;

/// Operations every list view needs.
pub trait Resource {
    type Entity: Clone + Debug;

    const KIND: ResourceKind;
    /// Lower-case singular noun used in messages ("customer").
    const SINGULAR: &'static str;
    /// Capitalised singular noun used in titles ("Customer").
    const TITLE: &'static str;

    fn entity_id(entity: &Self::Entity) -> EntityId;

    fn build_list(client: &ConsoleClient) -> HttpRequest;
    fn parse_list(
        client: &ConsoleClient,
        response: HttpResponse,
    ) -> Result<Vec<Self::Entity>, ApiError>;
    fn build_delete(client: &ConsoleClient, id: EntityId) -> HttpRequest;
    fn parse_delete(client: &ConsoleClient, response: HttpResponse) -> Result<Ack, ApiError>;

    fn plural() -> &'static str {
        Self::KIND.segment()
    }
}

/// Operations a form view needs on top of listing.
pub trait FormResource: Resource {
    const FIELDS: &'static [&'static str];

    fn validate(fields: &FieldMap) -> FieldErrors;

    /// Form values for editing an existing entity.
    fn to_fields(entity: &Self::Entity) -> FieldMap;

    /// Server-stored image reference, for resources that have one.
    fn stored_image(_entity: &Self::Entity) -> Option<String> {
        None
    }

    fn build_get(client: &ConsoleClient, id: EntityId) -> HttpRequest;
    fn parse_get(client: &ConsoleClient, response: HttpResponse) -> Result<Self::Entity, ApiError>;

    fn build_save(
        client: &ConsoleClient,
        mode: FormMode,
        fields: &FieldMap,
        image: Option<&ImageFile>,
    ) -> Result<HttpRequest, ApiError>;
    fn parse_save(
        client: &ConsoleClient,
        mode: FormMode,
        response: HttpResponse,
    ) -> Result<Ack, ApiError>;
}

fn field(fields: &FieldMap, name: &str) -> String {
    fields.get(name).cloned().unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Customers;

impl Resource for Customers {
    type Entity = Customer;

    const KIND: ResourceKind = ResourceKind::Customers;
    const SINGULAR: &'static str = "customer";
    const TITLE: &'static str = "Customer";

    fn entity_id(entity: &Customer) -> EntityId {
        entity.id
    }

    fn build_list(client: &ConsoleClient) -> HttpRequest {
        client.build_list_customers()
    }

    fn parse_list(
        client: &ConsoleClient,
        response: HttpResponse,
    ) -> Result<Vec<Customer>, ApiError> {
        client.parse_list_customers(response)
    }

    fn build_delete(client: &ConsoleClient, id: EntityId) -> HttpRequest {
        client.build_delete_customer(id)
    }

    fn parse_delete(client: &ConsoleClient, response: HttpResponse) -> Result<Ack, ApiError> {
        client.parse_delete_customer(response)
    }
}

impl FormResource for Customers {
    const FIELDS: &'static [&'static str] = validation::CUSTOMER_FIELDS;

    fn validate(fields: &FieldMap) -> FieldErrors {
        validation::validate_customer(fields)
    }

    fn to_fields(entity: &Customer) -> FieldMap {
        FieldMap::from([
            (COMPANY_NAME, entity.company_name.clone()),
            (ADDRESS, entity.address.clone()),
            (CITY, entity.city.clone()),
            (MOBILE_NUMBER, entity.mobile_number.clone()),
        ])
    }

    fn build_get(client: &ConsoleClient, id: EntityId) -> HttpRequest {
        client.build_get_customer(id)
    }

    fn parse_get(client: &ConsoleClient, response: HttpResponse) -> Result<Customer, ApiError> {
        client.parse_get_customer(response)
    }

    fn build_save(
        client: &ConsoleClient,
        mode: FormMode,
        fields: &FieldMap,
        _image: Option<&ImageFile>,
    ) -> Result<HttpRequest, ApiError> {
        let input = CustomerInput {
            company_name: field(fields, COMPANY_NAME),
            address: field(fields, ADDRESS),
            city: field(fields, CITY),
            mobile_number: field(fields, MOBILE_NUMBER),
        };
        match mode {
            FormMode::Create => client.build_create_customer(&input),
            FormMode::Edit(id) => client.build_update_customer(id, &input),
        }
    }

    fn parse_save(
        client: &ConsoleClient,
        mode: FormMode,
        response: HttpResponse,
    ) -> Result<Ack, ApiError> {
        match mode {
            FormMode::Create => client.parse_create_customer(response),
            FormMode::Edit(_) => client.parse_update_customer(response),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Products;

impl Resource for Products {
    type Entity = Product;

    const KIND: ResourceKind = ResourceKind::Products;
    const SINGULAR: &'static str = "product";
    const TITLE: &'static str = "Product";

    fn entity_id(entity: &Product) -> EntityId {
        entity.id
    }

    fn build_list(client: &ConsoleClient) -> HttpRequest {
        client.build_list_products()
    }

    fn parse_list(
        client: &ConsoleClient,
        response: HttpResponse,
    ) -> Result<Vec<Product>, ApiError> {
        client.parse_list_products(response)
    }

    fn build_delete(client: &ConsoleClient, id: EntityId) -> HttpRequest {
        client.build_delete_product(id)
    }

    fn parse_delete(client: &ConsoleClient, response: HttpResponse) -> Result<Ack, ApiError> {
        client.parse_delete_product(response)
    }
}

impl FormResource for Products {
    const FIELDS: &'static [&'static str] = validation::PRODUCT_FIELDS;

    fn validate(fields: &FieldMap) -> FieldErrors {
        validation::validate_product(fields)
    }

    fn to_fields(entity: &Product) -> FieldMap {
        FieldMap::from([
            (PRODUCT_NAME, entity.product_name.clone()),
            (PRICE, entity.price.to_string()),
            (PRODUCT_TYPE, entity.product_type.clone()),
        ])
    }

    fn stored_image(entity: &Product) -> Option<String> {
        entity.image_path.clone()
    }

    fn build_get(client: &ConsoleClient, id: EntityId) -> HttpRequest {
        client.build_get_product(id)
    }

    fn parse_get(client: &ConsoleClient, response: HttpResponse) -> Result<Product, ApiError> {
        client.parse_get_product(response)
    }

    fn build_save(
        client: &ConsoleClient,
        mode: FormMode,
        fields: &FieldMap,
        image: Option<&ImageFile>,
    ) -> Result<HttpRequest, ApiError> {
        let input = ProductInput {
            product_name: field(fields, PRODUCT_NAME),
            price: field(fields, PRICE),
            product_type: field(fields, PRODUCT_TYPE),
            image: image.cloned(),
        };
        Ok(match mode {
            FormMode::Create => client.build_create_product(&input),
            FormMode::Edit(id) => client.build_update_product(id, &input),
        })
    }

    fn parse_save(
        client: &ConsoleClient,
        mode: FormMode,
        response: HttpResponse,
    ) -> Result<Ack, ApiError> {
        match mode {
            FormMode::Create => client.parse_create_product(response),
            FormMode::Edit(_) => client.parse_update_product(response),
        }
    }
}
