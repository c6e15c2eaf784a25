//! Client-side form validation.
//!
//! Validators are pure functions from the current field values to a map of
//! field name to message. They never touch view state, so the same input
//! always yields the same errors.

use std::collections::BTreeMap;

use crate::types::ImageFile;

pub const COMPANY_NAME: &str = "company_name";
pub const ADDRESS: &str = "address";
pub const CITY: &str = "city";
pub const MOBILE_NUMBER: &str = "mobile_number";
pub const PRODUCT_NAME: &str = "product_name";
pub const PRICE: &str = "price";
pub const PRODUCT_TYPE: &str = "product_type";
/// Error key for the product image picker.
pub const IMAGE: &str = "image";

pub const CUSTOMER_FIELDS: &[&str] = &[COMPANY_NAME, ADDRESS, CITY, MOBILE_NUMBER];
pub const PRODUCT_FIELDS: &[&str] = &[PRODUCT_NAME, PRICE, PRODUCT_TYPE];

/// Largest accepted image upload, inclusive.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
pub const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif"];

/// Current form values keyed by field name.
pub type FieldMap = BTreeMap<&'static str, String>;

/// Validation failures keyed by field name. Empty means valid.
pub type FieldErrors = BTreeMap<&'static str, String>;

/// A required text field with a length ceiling.
struct TextRule {
    field: &'static str,
    label: &'static str,
    max_chars: usize,
}

const CUSTOMER_RULES: &[TextRule] = &[
    TextRule {
        field: COMPANY_NAME,
        label: "Company name",
        max_chars: 100,
    },
    TextRule {
        field: ADDRESS,
        label: "Address",
        max_chars: 200,
    },
    TextRule {
        field: CITY,
        label: "City",
        max_chars: 50,
    },
    TextRule {
        field: MOBILE_NUMBER,
        label: "Mobile number",
        max_chars: 20,
    },
];

const PRODUCT_NAME_RULE: TextRule = TextRule {
    field: PRODUCT_NAME,
    label: "Product name",
    max_chars: 100,
};
const PRODUCT_TYPE_RULE: TextRule = TextRule {
    field: PRODUCT_TYPE,
    label: "Product type",
    max_chars: 50,
};

impl TextRule {
    fn check(&self, fields: &FieldMap, errors: &mut FieldErrors) {
        let value = value_of(fields, self.field);
        if value.trim().is_empty() {
            errors.insert(self.field, format!("{} is required", self.label));
        } else if value.chars().count() > self.max_chars {
            errors.insert(
                self.field,
                format!("{} must be {} characters or less", self.label, self.max_chars),
            );
        }
    }
}

fn value_of<'a>(fields: &'a FieldMap, field: &str) -> &'a str {
    fields.get(field).map(String::as_str).unwrap_or("")
}

/// A form map with every listed field present and empty.
pub fn empty_fields(names: &[&'static str]) -> FieldMap {
    names.iter().map(|name| (*name, String::new())).collect()
}

pub fn validate_customer(fields: &FieldMap) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for rule in CUSTOMER_RULES {
        rule.check(fields, &mut errors);
    }
    errors
}

pub fn validate_product(fields: &FieldMap) -> FieldErrors {
    let mut errors = FieldErrors::new();
    PRODUCT_NAME_RULE.check(fields, &mut errors);

    let price = value_of(fields, PRICE).trim();
    if price.is_empty() {
        errors.insert(PRICE, "Price is required".to_string());
    } else if parse_price(price).is_none() {
        errors.insert(PRICE, "Price must be a positive number".to_string());
    }

    PRODUCT_TYPE_RULE.check(fields, &mut errors);
    errors
}

/// Parse a typed price as a plain floating-point number, accepting only
/// finite values strictly above zero. Digit separators such as `1_000` are
/// not numbers.
pub fn parse_price(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|price| price.is_finite() && *price > 0.0)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageError {
    #[error("Please select a valid image file (JPG, PNG, or GIF)")]
    UnsupportedType(String),
    #[error("Image size must be less than 5MB")]
    TooLarge(usize),
}

/// Type is checked before size, so a BMP is rejected whatever its size.
pub fn validate_image(image: &ImageFile) -> Result<(), ImageError> {
    if !ALLOWED_IMAGE_TYPES.contains(&image.mime_type.as_str()) {
        return Err(ImageError::UnsupportedType(image.mime_type.clone()));
    }
    if image.size() > MAX_IMAGE_BYTES {
        return Err(ImageError::TooLarge(image.size()));
    }
    Ok(())
}
