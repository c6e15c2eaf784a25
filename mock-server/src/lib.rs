use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{NaiveDateTime, Utc};
use rust_decimal::{prelude::FromPrimitive, Decimal};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// Uploads up to the client ceiling fit comfortably.
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];
const ORIGINAL_DIR: &str = "/static/uploads/products/original";
const THUMBNAIL_DIR: &str = "/static/uploads/products/thumbnails";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub company_name: String,
    pub address: String,
    pub city: String,
    pub mobile_number: String,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub product_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub product_type: String,
    pub image_filename: Option<String>,
    pub image_path: Option<String>,
    pub thumbnail_path: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Deserialize, Default)]
pub struct CustomerPayload {
    pub company_name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub mobile_number: Option<String>,
}

#[derive(Default)]
pub struct Store {
    next_customer_id: i64,
    next_product_id: i64,
    customers: BTreeMap<i64, Customer>,
    products: BTreeMap<i64, Product>,
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    let api = Router::new()
        .route("/health", get(health))
        .route("/customers/", get(list_customers).post(create_customer))
        .route(
            "/customers/{id}",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
        .route("/products/", get(list_products).post(create_product))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(db);
    Router::new().nest("/api", api)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// `{success: false, message}` with a status code.
#[derive(Debug)]
pub struct ApiFailure {
    status: StatusCode,
    message: String,
}

impl ApiFailure {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    fn not_found(message: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl From<MultipartError> for ApiFailure {
    fn from(err: MultipartError) -> Self {
        Self::new(err.status(), err.body_text())
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        tracing::warn!(status = %self.status, message = %self.message, "request failed");
        (self.status, Json(json!({ "success": false, "message": self.message }))).into_response()
    }
}

type ApiResult = Result<(StatusCode, Json<Value>), ApiFailure>;

fn now() -> Option<NaiveDateTime> {
    Some(Utc::now().naive_utc())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "message": "API is running" }))
}

// --- customers ---

const CUSTOMER_LIMITS: &[(&str, &str, usize)] = &[
    ("company_name", "Company name", 100),
    ("address", "Address", 200),
    ("city", "City", 50),
    ("mobile_number", "Mobile number", 20),
];

impl CustomerPayload {
    fn value(&self, field: &str) -> Option<&str> {
        let value = match field {
            "company_name" => &self.company_name,
            "address" => &self.address,
            "city" => &self.city,
            "mobile_number" => &self.mobile_number,
            _ => &None,
        };
        value.as_deref().filter(|v| !v.is_empty())
    }
}

fn check_length(value: &str, label: &str, max: usize) -> Result<(), ApiFailure> {
    if value.chars().count() > max {
        return Err(ApiFailure::bad_request(format!(
            "{label} must be {max} characters or less"
        )));
    }
    Ok(())
}

async fn list_customers(State(db): State<Db>) -> Json<Value> {
    let store = db.read().await;
    let customers: Vec<&Customer> = store.customers.values().collect();
    Json(json!({ "success": true, "customers": customers }))
}

async fn get_customer(State(db): State<Db>, Path(id): Path<i64>) -> ApiResult {
    let store = db.read().await;
    let customer = store
        .customers
        .get(&id)
        .ok_or_else(|| ApiFailure::not_found("Customer not found"))?;
    Ok((StatusCode::OK, Json(json!({ "success": true, "customer": customer }))))
}

async fn create_customer(State(db): State<Db>, Json(input): Json<CustomerPayload>) -> ApiResult {
    for (field, _, _) in CUSTOMER_LIMITS {
        if input.value(field).is_none() {
            return Err(ApiFailure::bad_request(format!("Missing required field: {field}")));
        }
    }
    for (field, label, max) in CUSTOMER_LIMITS {
        check_length(input.value(field).unwrap_or_default(), label, *max)?;
    }

    let mut store = db.write().await;
    store.next_customer_id += 1;
    let customer = Customer {
        id: store.next_customer_id,
        company_name: input.company_name.unwrap_or_default(),
        address: input.address.unwrap_or_default(),
        city: input.city.unwrap_or_default(),
        mobile_number: input.mobile_number.unwrap_or_default(),
        created_at: now(),
        updated_at: now(),
    };
    store.customers.insert(customer.id, customer.clone());
    tracing::info!(id = customer.id, "customer created");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Customer created successfully",
            "customer": customer,
        })),
    ))
}

/// Only provided, non-empty fields are applied.
async fn update_customer(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<CustomerPayload>,
) -> ApiResult {
    let mut store = db.write().await;
    let customer = store
        .customers
        .get_mut(&id)
        .ok_or_else(|| ApiFailure::not_found("Customer not found"))?;

    for (field, label, max) in CUSTOMER_LIMITS {
        if let Some(value) = input.value(field) {
            check_length(value, label, *max)?;
        }
    }
    if let Some(v) = input.value("company_name") {
        customer.company_name = v.to_string();
    }
    if let Some(v) = input.value("address") {
        customer.address = v.to_string();
    }
    if let Some(v) = input.value("city") {
        customer.city = v.to_string();
    }
    if let Some(v) = input.value("mobile_number") {
        customer.mobile_number = v.to_string();
    }
    customer.updated_at = now();
    tracing::info!(id, "customer updated");
    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "message": "Customer updated successfully",
            "customer": customer,
        })),
    ))
}

async fn delete_customer(State(db): State<Db>, Path(id): Path<i64>) -> ApiResult {
    let mut store = db.write().await;
    store
        .customers
        .remove(&id)
        .ok_or_else(|| ApiFailure::not_found("Customer not found"))?;
    tracing::info!(id, "customer deleted");
    Ok((
        StatusCode::OK,
        Json(json!({ "success": true, "message": "Customer deleted successfully" })),
    ))
}

// --- products ---

#[derive(Default)]
struct ProductForm {
    product_name: Option<String>,
    price: Option<String>,
    product_type: Option<String>,
    image: Option<Upload>,
}

struct Upload {
    file_name: String,
    size: usize,
}

/// Where an accepted upload is recorded.
struct StoredImage {
    filename: String,
    image_path: String,
    thumbnail_path: String,
}

async fn read_product_form(mut multipart: Multipart) -> Result<ProductForm, ApiFailure> {
    let mut form = ProductForm::default();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "product_name" => form.product_name = Some(field.text().await?),
            "price" => form.price = Some(field.text().await?),
            "product_type" => form.product_type = Some(field.text().await?),
            "image" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                form.image = Some(Upload {
                    file_name,
                    size: bytes.len(),
                });
            }
            _ => {}
        }
    }
    Ok(form)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Read a submitted price as a plain float. Digit separators are not numbers.
fn parse_price(raw: &str) -> Result<Decimal, ApiFailure> {
    let price = raw
        .trim()
        .parse::<f64>()
        .ok()
        .and_then(Decimal::from_f64)
        .ok_or_else(|| ApiFailure::bad_request("Price must be a valid number"))?;
    if price <= Decimal::ZERO {
        return Err(ApiFailure::bad_request("Price must be a positive number"));
    }
    Ok(price)
}

/// Keep the characters that are safe in a path segment.
fn secure_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    base.chars()
        .filter_map(|c| match c {
            c if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') => Some(c),
            c if c.is_whitespace() => Some('_'),
            _ => None,
        })
        .collect::<String>()
        .trim_start_matches('.')
        .to_string()
}

/// Accept the upload when its extension is allowed; anything else is
/// silently ignored, as if no image had been sent.
fn store_image(upload: &Upload) -> Option<StoredImage> {
    let filename = secure_filename(&upload.file_name);
    let (stem, ext) = filename.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    if stem.is_empty() || !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        tracing::debug!(file = %upload.file_name, "ignoring upload with unsupported extension");
        return None;
    }
    let unique = format!("{stem}_{}.{ext}", Uuid::new_v4().simple());
    tracing::info!(file = %filename, size = upload.size, "image stored");
    Some(StoredImage {
        image_path: format!("{ORIGINAL_DIR}/{unique}"),
        thumbnail_path: format!("{THUMBNAIL_DIR}/thumb_{unique}"),
        filename,
    })
}

async fn list_products(State(db): State<Db>) -> Json<Value> {
    let store = db.read().await;
    let products: Vec<&Product> = store.products.values().collect();
    Json(json!({ "success": true, "products": products }))
}

async fn get_product(State(db): State<Db>, Path(id): Path<i64>) -> ApiResult {
    let store = db.read().await;
    let product = store
        .products
        .get(&id)
        .ok_or_else(|| ApiFailure::not_found("Product not found"))?;
    Ok((StatusCode::OK, Json(json!({ "success": true, "product": product }))))
}

async fn create_product(State(db): State<Db>, multipart: Multipart) -> ApiResult {
    let form = read_product_form(multipart).await?;

    let product_name = non_empty(&form.product_name)
        .ok_or_else(|| ApiFailure::bad_request("Product name is required"))?;
    let price = non_empty(&form.price).ok_or_else(|| ApiFailure::bad_request("Price is required"))?;
    let product_type = non_empty(&form.product_type)
        .ok_or_else(|| ApiFailure::bad_request("Product type is required"))?;
    check_length(product_name, "Product name", 100)?;
    check_length(product_type, "Product type", 50)?;
    let price = parse_price(price)?;

    let image = form.image.as_ref().and_then(store_image);

    let mut store = db.write().await;
    store.next_product_id += 1;
    let product = Product {
        id: store.next_product_id,
        product_name: product_name.to_string(),
        price,
        product_type: product_type.to_string(),
        image_filename: image.as_ref().map(|i| i.filename.clone()),
        image_path: image.as_ref().map(|i| i.image_path.clone()),
        thumbnail_path: image.map(|i| i.thumbnail_path),
        created_at: now(),
        updated_at: now(),
    };
    store.products.insert(product.id, product.clone());
    tracing::info!(id = product.id, "product created");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Product created successfully",
            "product": product,
        })),
    ))
}

async fn update_product(
    State(db): State<Db>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> ApiResult {
    let form = read_product_form(multipart).await?;

    let mut store = db.write().await;
    let product = store
        .products
        .get_mut(&id)
        .ok_or_else(|| ApiFailure::not_found("Product not found"))?;

    if let Some(name) = non_empty(&form.product_name) {
        check_length(name, "Product name", 100)?;
    }
    let price = non_empty(&form.price).map(parse_price).transpose()?;
    if let Some(kind) = non_empty(&form.product_type) {
        check_length(kind, "Product type", 50)?;
    }

    if let Some(name) = non_empty(&form.product_name) {
        product.product_name = name.to_string();
    }
    if let Some(price) = price {
        product.price = price;
    }
    if let Some(kind) = non_empty(&form.product_type) {
        product.product_type = kind.to_string();
    }
    // A new upload replaces the previous references.
    if let Some(image) = form.image.as_ref().and_then(store_image) {
        product.image_filename = Some(image.filename);
        product.image_path = Some(image.image_path);
        product.thumbnail_path = Some(image.thumbnail_path);
    }
    product.updated_at = now();
    tracing::info!(id, "product updated");
    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "message": "Product updated successfully",
            "product": product,
        })),
    ))
}

async fn delete_product(State(db): State<Db>, Path(id): Path<i64>) -> ApiResult {
    let mut store = db.write().await;
    store
        .products
        .remove(&id)
        .ok_or_else(|| ApiFailure::not_found("Product not found"))?;
    tracing::info!(id, "product deleted");
    Ok((
        StatusCode::OK,
        Json(json!({ "success": true, "message": "Product deleted successfully" })),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_price_serializes_as_number() {
        let product = Product {
            id: 1,
            product_name: "Lamp".to_string(),
            price: "19.99".parse().unwrap(),
            product_type: "Home".to_string(),
            image_filename: None,
            image_path: None,
            thumbnail_path: None,
            created_at: None,
            updated_at: None,
        };
        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["price"], 19.99);
        assert!(json["image_path"].is_null());
    }

    #[test]
    fn customer_payload_fields_are_optional() {
        let input: CustomerPayload = serde_json::from_str(r#"{"city":"Metropolis"}"#).unwrap();
        assert_eq!(input.value("city"), Some("Metropolis"));
        assert_eq!(input.value("company_name"), None);
    }

    #[test]
    fn empty_strings_count_as_missing() {
        let input: CustomerPayload = serde_json::from_str(r#"{"address":""}"#).unwrap();
        assert_eq!(input.value("address"), None);
    }

    #[test]
    fn price_parsing() {
        assert!(parse_price("0.01").is_ok());
        assert_eq!(parse_price("0").unwrap_err().message, "Price must be a positive number");
        assert_eq!(parse_price("abc").unwrap_err().message, "Price must be a valid number");
    }

    #[test]
    fn price_parsing_matches_plain_floats() {
        assert_eq!(parse_price("1e3").unwrap(), Decimal::from(1000));
        assert_eq!(parse_price(" 19.99 ").unwrap().to_string(), "19.99");
        for raw in ["1__0", "1_000", "inf", "NaN"] {
            assert_eq!(
                parse_price(raw).unwrap_err().message,
                "Price must be a valid number",
                "{raw}"
            );
        }
    }

    #[test]
    fn secure_filename_strips_paths_and_symbols() {
        assert_eq!(secure_filename("../../etc/pass wd.png"), "pass_wd.png");
        assert_eq!(secure_filename("C:\\photos\\lamp$.JPG"), "lamp.JPG");
    }

    #[test]
    fn store_image_checks_extension() {
        let png = Upload {
            file_name: "lamp.PNG".to_string(),
            size: 3,
        };
        let stored = store_image(&png).unwrap();
        assert_eq!(stored.filename, "lamp.PNG");
        assert!(stored.image_path.starts_with("/static/uploads/products/original/lamp_"));
        assert!(stored.image_path.ends_with(".png"));
        assert!(stored
            .thumbnail_path
            .starts_with("/static/uploads/products/thumbnails/thumb_lamp_"));

        let bmp = Upload {
            file_name: "lamp.bmp".to_string(),
            size: 3,
        };
        assert!(store_image(&bmp).is_none());
    }
}
