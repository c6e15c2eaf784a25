//! Stateless HTTP request builder and response parser for the console API.
//!
//! # Design
//! `ConsoleClient` holds only a `base_url` and carries no mutable state between
//! calls. Each CRUD operation is split into a `build_*` method that produces
//! an `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! The host executes the actual HTTP round-trip.
//!
//! Every endpoint answers with an envelope. `parse_*` methods unwrap it:
//! the payload is read from the resource key (`customers`, `product`, ...)
//! and `success: false` becomes `ApiError::Rejected`.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::multipart::MultipartForm;
use crate::types::{
    Ack, Customer, CustomerInput, EntityId, Envelope, Health, Product, ProductInput,
};

const CUSTOMERS: &str = "/customers/";
const PRODUCTS: &str = "/products/";

/// Synchronous, stateless client for the console API.
#[derive(Debug, Clone)]
pub struct ConsoleClient {
    base_url: String,
}

impl ConsoleClient {
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            base_url: config.base_url().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -- customers ----------------------------------------------------------

    pub fn build_list_customers(&self) -> HttpRequest {
        self.bare(HttpMethod::Get, CUSTOMERS.to_string())
    }

    pub fn build_get_customer(&self, id: EntityId) -> HttpRequest {
        self.bare(HttpMethod::Get, format!("{CUSTOMERS}{id}"))
    }

    pub fn build_create_customer(&self, input: &CustomerInput) -> Result<HttpRequest, ApiError> {
        self.json(HttpMethod::Post, CUSTOMERS.to_string(), input)
    }

    pub fn build_update_customer(
        &self,
        id: EntityId,
        input: &CustomerInput,
    ) -> Result<HttpRequest, ApiError> {
        self.json(HttpMethod::Put, format!("{CUSTOMERS}{id}"), input)
    }

    pub fn build_delete_customer(&self, id: EntityId) -> HttpRequest {
        self.bare(HttpMethod::Delete, format!("{CUSTOMERS}{id}"))
    }

    pub fn parse_list_customers(&self, response: HttpResponse) -> Result<Vec<Customer>, ApiError> {
        parse_payload(response, "customers")
    }

    pub fn parse_get_customer(&self, response: HttpResponse) -> Result<Customer, ApiError> {
        parse_payload(response, "customer")
    }

    pub fn parse_create_customer(&self, response: HttpResponse) -> Result<Ack, ApiError> {
        parse_ack(response)
    }

    pub fn parse_update_customer(&self, response: HttpResponse) -> Result<Ack, ApiError> {
        parse_ack(response)
    }

    pub fn parse_delete_customer(&self, response: HttpResponse) -> Result<Ack, ApiError> {
        parse_ack(response)
    }

    // -- products -----------------------------------------------------------

    pub fn build_list_products(&self) -> HttpRequest {
        self.bare(HttpMethod::Get, PRODUCTS.to_string())
    }

    pub fn build_get_product(&self, id: EntityId) -> HttpRequest {
        self.bare(HttpMethod::Get, format!("{PRODUCTS}{id}"))
    }

    pub fn build_create_product(&self, input: &ProductInput) -> HttpRequest {
        self.multipart(HttpMethod::Post, PRODUCTS.to_string(), product_form(input))
    }

    pub fn build_update_product(&self, id: EntityId, input: &ProductInput) -> HttpRequest {
        self.multipart(HttpMethod::Put, format!("{PRODUCTS}{id}"), product_form(input))
    }

    pub fn build_delete_product(&self, id: EntityId) -> HttpRequest {
        self.bare(HttpMethod::Delete, format!("{PRODUCTS}{id}"))
    }

    pub fn parse_list_products(&self, response: HttpResponse) -> Result<Vec<Product>, ApiError> {
        parse_payload(response, "products")
    }

    pub fn parse_get_product(&self, response: HttpResponse) -> Result<Product, ApiError> {
        parse_payload(response, "product")
    }

    pub fn parse_create_product(&self, response: HttpResponse) -> Result<Ack, ApiError> {
        parse_ack(response)
    }

    pub fn parse_update_product(&self, response: HttpResponse) -> Result<Ack, ApiError> {
        parse_ack(response)
    }

    pub fn parse_delete_product(&self, response: HttpResponse) -> Result<Ack, ApiError> {
        parse_ack(response)
    }

    // -- health -------------------------------------------------------------

    pub fn build_health(&self) -> HttpRequest {
        self.bare(HttpMethod::Get, "/health".to_string())
    }

    /// The health endpoint is the one response without an envelope.
    pub fn parse_health(&self, response: HttpResponse) -> Result<Health, ApiError> {
        check_status(&response)?;
        serde_json::from_str(&response.body)
            .map_err(|e| ApiError::DeserializationError(e.to_string()))
    }

    // -- request shapes -----------------------------------------------------

    fn bare(&self, method: HttpMethod, path: String) -> HttpRequest {
        HttpRequest {
            method,
            path: format!("{}{path}", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    fn json<T: serde::Serialize>(
        &self,
        method: HttpMethod,
        path: String,
        input: &T,
    ) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_vec(input).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
            ..self.bare(method, path)
        })
    }

    fn multipart(&self, method: HttpMethod, path: String, form: MultipartForm) -> HttpRequest {
        HttpRequest {
            headers: vec![("content-type".to_string(), form.content_type())],
            body: Some(form.into_body()),
            ..self.bare(method, path)
        }
    }
}

fn product_form(input: &ProductInput) -> MultipartForm {
    let form = MultipartForm::new()
        .text("product_name", &input.product_name)
        .text("price", &input.price)
        .text("product_type", &input.product_type);
    match &input.image {
        Some(image) => form.file("image", &image.file_name, &image.mime_type, &image.bytes),
        None => form,
    }
}

/// Wire form of an envelope before the payload key is picked out.
#[derive(Deserialize)]
struct RawEnvelope {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(flatten)]
    rest: serde_json::Map<String, serde_json::Value>,
}

/// Map non-2xx status codes to the appropriate `ApiError` variant, keeping
/// the envelope message when the body has one.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if (200..300).contains(&response.status) {
        return Ok(());
    }
    let message = serde_json::from_str::<RawEnvelope>(&response.body)
        .ok()
        .and_then(|envelope| envelope.message);
    if response.status == 404 {
        return Err(ApiError::NotFound { message });
    }
    Err(ApiError::HttpError {
        status: response.status,
        message,
        body: response.body.clone(),
    })
}

/// Decode the envelope of a 2xx response. `key` names the payload field;
/// `None` means the operation carries no payload.
pub fn decode_envelope<T: DeserializeOwned>(
    response: &HttpResponse,
    key: Option<&str>,
) -> Result<Envelope<T>, ApiError> {
    check_status(response)?;
    let mut raw: RawEnvelope = serde_json::from_str(&response.body)
        .map_err(|e| ApiError::DeserializationError(e.to_string()))?;
    let payload = match key.and_then(|key| raw.rest.remove(key)) {
        Some(serde_json::Value::Null) | None => None,
        Some(value) => Some(
            serde_json::from_value(value)
                .map_err(|e| ApiError::DeserializationError(e.to_string()))?,
        ),
    };
    Ok(Envelope {
        success: raw.success,
        message: raw.message,
        payload,
    })
}

fn parse_payload<T: DeserializeOwned>(response: HttpResponse, key: &str) -> Result<T, ApiError> {
    let envelope = decode_envelope::<T>(&response, Some(key))?;
    if !envelope.success {
        return Err(ApiError::Rejected {
            message: envelope.message,
        });
    }
    envelope
        .payload
        .ok_or_else(|| ApiError::DeserializationError(format!("missing `{key}` in response")))
}

fn parse_ack(response: HttpResponse) -> Result<Ack, ApiError> {
    let envelope = decode_envelope::<serde_json::Value>(&response, None)?;
    if !envelope.success {
        return Err(ApiError::Rejected {
            message: envelope.message,
        });
    }
    Ok(Ack {
        message: envelope.message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeploymentMode;
    use crate::types::ImageFile;

    fn client() -> ConsoleClient {
        ConsoleClient::new(&ApiConfig::development("http://localhost:5000/api"))
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    fn acme() -> CustomerInput {
        CustomerInput {
            company_name: "Acme".to_string(),
            address: "1 Rd".to_string(),
            city: "Metropolis".to_string(),
            mobile_number: "555-0100".to_string(),
        }
    }

    #[test]
    fn build_list_customers_produces_correct_request() {
        let req = client().build_list_customers();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:5000/api/customers/");
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn production_paths_are_origin_relative() {
        let client = ConsoleClient::new(&ApiConfig::for_mode(DeploymentMode::Production));
        assert_eq!(client.build_get_product(4).path, "/api/products/4");
    }

    #[test]
    fn build_create_customer_sends_json() {
        let req = client().build_create_customer(&acme()).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:5000/api/customers/");
        assert_eq!(req.header("Content-Type"), Some("application/json"));
        let body: serde_json::Value = serde_json::from_slice(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["company_name"], "Acme");
        assert_eq!(body["mobile_number"], "555-0100");
        assert!(body.get("id").is_none());
    }

    #[test]
    fn build_update_and_delete_customer_target_the_id() {
        let update = client().build_update_customer(7, &acme()).unwrap();
        assert_eq!(update.method, HttpMethod::Put);
        assert_eq!(update.path, "http://localhost:5000/api/customers/7");

        let delete = client().build_delete_customer(7);
        assert_eq!(delete.method, HttpMethod::Delete);
        assert_eq!(delete.path, "http://localhost:5000/api/customers/7");
        assert!(delete.body.is_none());
    }

    #[test]
    fn build_create_product_is_multipart() {
        let input = ProductInput {
            product_name: "Lamp".to_string(),
            price: "19.99".to_string(),
            product_type: "Home".to_string(),
            image: Some(ImageFile::new("lamp.png", "image/png", vec![9, 9])),
        };
        let req = client().build_create_product(&input);
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:5000/api/products/");
        let content_type = req.header("content-type").unwrap();
        assert!(content_type.starts_with("multipart/form-data; boundary="));

        let body = String::from_utf8_lossy(req.body.as_deref().unwrap()).into_owned();
        assert!(body.contains("name=\"product_name\"\r\n\r\nLamp\r\n"));
        assert!(body.contains("name=\"price\"\r\n\r\n19.99\r\n"));
        assert!(body.contains("filename=\"lamp.png\"\r\nContent-Type: image/png"));
    }

    #[test]
    fn build_update_product_without_image_has_no_file_part() {
        let input = ProductInput {
            product_name: "Lamp".to_string(),
            price: "5".to_string(),
            product_type: "Home".to_string(),
            image: None,
        };
        let req = client().build_update_product(3, &input);
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.path, "http://localhost:5000/api/products/3");
        let body = String::from_utf8_lossy(req.body.as_deref().unwrap()).into_owned();
        assert!(!body.contains("filename="));
    }

    #[test]
    fn parse_list_customers_success() {
        let resp = response(
            200,
            r#"{"success":true,"customers":[{"id":1,"company_name":"Acme","address":"1 Rd",
                "city":"Metropolis","mobile_number":"555-0100"}]}"#,
        );
        let customers = client().parse_list_customers(resp).unwrap();
        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0].company_name, "Acme");
    }

    #[test]
    fn parse_get_product_success() {
        let resp = response(
            200,
            r#"{"success":true,"product":{"id":3,"product_name":"Lamp","price":12.5,
                "product_type":"Home","image_path":"/static/a.png",
                "thumbnail_path":"/static/t.png"}}"#,
        );
        let product = client().parse_get_product(resp).unwrap();
        assert_eq!(product.id, 3);
        assert_eq!(product.price.to_string(), "12.5");
        assert_eq!(product.image_path.as_deref(), Some("/static/a.png"));
    }

    #[test]
    fn success_false_is_rejected_with_message() {
        let resp = response(200, r#"{"success":false,"message":"Database busy"}"#);
        let err = client().parse_list_products(resp).unwrap_err();
        assert!(matches!(err, ApiError::Rejected { .. }));
        assert_eq!(err.server_message(), Some("Database busy"));
    }

    #[test]
    fn not_found_keeps_envelope_message() {
        let resp = response(404, r#"{"success":false,"message":"Customer not found"}"#);
        let err = client().parse_get_customer(resp).unwrap_err();
        assert!(matches!(err, ApiError::NotFound { .. }));
        assert_eq!(err.server_message(), Some("Customer not found"));
    }

    #[test]
    fn bad_request_without_envelope() {
        let resp = response(500, "internal error");
        let err = client().parse_create_customer(resp).unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 500, message: None, .. }));
    }

    #[test]
    fn parse_create_customer_accepts_201() {
        let resp = response(
            201,
            r#"{"success":true,"message":"Customer created successfully","customer":{}}"#,
        );
        let ack = client().parse_create_customer(resp).unwrap();
        assert_eq!(ack.message.as_deref(), Some("Customer created successfully"));
    }

    #[test]
    fn parse_delete_product_success() {
        let resp = response(200, r#"{"success":true,"message":"Product deleted successfully"}"#);
        assert!(client().parse_delete_product(resp).is_ok());
    }

    #[test]
    fn missing_payload_is_a_decode_error() {
        let resp = response(200, r#"{"success":true}"#);
        let err = client().parse_list_customers(resp).unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn parse_list_bad_json() {
        let err = client().parse_list_customers(response(200, "not json")).unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = ConsoleClient::new(&ApiConfig::development("http://localhost:5000/api/"));
        assert_eq!(client.build_list_products().path, "http://localhost:5000/api/products/");
    }

    #[test]
    fn parse_health_reads_plain_body() {
        let req = client().build_health();
        assert_eq!(req.path, "http://localhost:5000/api/health");
        let health = client()
            .parse_health(response(200, r#"{"status":"ok","message":"API is running"}"#))
            .unwrap();
        assert_eq!(health.status, "ok");
    }
}
