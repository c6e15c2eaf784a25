//! Domain DTOs for the console API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently;
//! integration tests catch any schema drift between the two crates. Entities
//! are read-only snapshots of server state: ids, image references and
//! timestamps are server-assigned and never computed here.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Server-assigned identifier shared by both resources.
pub type EntityId = i64;

/// A customer record as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Customer {
    pub id: EntityId,
    pub company_name: String,
    pub address: String,
    pub city: String,
    pub mobile_number: String,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

/// JSON body for creating or updating a customer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct CustomerInput {
    pub company_name: String,
    pub address: String,
    pub city: String,
    pub mobile_number: String,
}

/// A product record as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Product {
    pub id: EntityId,
    pub product_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub product_type: String,
    /// Original name of the uploaded file.
    #[serde(default)]
    pub image_filename: Option<String>,
    #[serde(default)]
    pub image_path: Option<String>,
    #[serde(default)]
    pub thumbnail_path: Option<String>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

/// Fields of a product write. Encoded as multipart, not JSON.
///
/// `price` is sent exactly as the user typed it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductInput {
    pub product_name: String,
    pub price: String,
    pub product_type: String,
    pub image: Option<ImageFile>,
}

/// An image picked by the user, held in memory until submission.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

// Image bytes are noise in logs and assertion failures.
impl std::fmt::Debug for ImageFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageFile")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// The uniform response shape `{success, message?, <payload key>?}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope<T> {
    pub success: bool,
    pub message: Option<String>,
    pub payload: Option<T>,
}

/// Successful write or delete. The message is informational.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Ack {
    pub message: Option<String>,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Health {
    pub status: String,
    pub message: String,
}

impl From<&Customer> for CustomerInput {
    fn from(customer: &Customer) -> Self {
        Self {
            company_name: customer.company_name.clone(),
            address: customer.address.clone(),
            city: customer.city.clone(),
            mobile_number: customer.mobile_number.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_price_reads_json_number() {
        let product: Product = serde_json::from_str(
            r#"{"id":3,"product_name":"Lamp","price":19.99,"product_type":"Home"}"#,
        )
        .unwrap();
        assert_eq!(product.price.to_string(), "19.99");
        assert!(product.image_path.is_none());
    }

    #[test]
    fn customer_reads_server_timestamps() {
        let customer: Customer = serde_json::from_str(
            r#"{"id":1,"company_name":"Acme","address":"1 Rd","city":"Metropolis",
                "mobile_number":"555-0100","created_at":"2024-05-01T10:20:30.123456",
                "updated_at":null}"#,
        )
        .unwrap();
        assert!(customer.created_at.is_some());
        assert!(customer.updated_at.is_none());
    }

    #[test]
    fn image_debug_omits_bytes() {
        let image = ImageFile::new("a.png", "image/png", vec![0; 4]);
        let debug = format!("{image:?}");
        assert!(debug.contains("size: 4"));
        assert!(!debug.contains("bytes"));
    }
}
