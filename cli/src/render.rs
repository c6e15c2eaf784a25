//! Plain-text rendering of the console screens.

use std::fmt::Write;

use console_core::validation::{
    ADDRESS, CITY, COMPANY_NAME, IMAGE, MOBILE_NUMBER, PRICE, PRODUCT_NAME, PRODUCT_TYPE,
};
use console_core::{
    Customer, Customers, EntityFormView, EntityListView, FormPhase, FormResource, ListPhase,
    Product, Products,
};

/// How a resource is shown as a table and a form.
pub trait Screen: FormResource + Sized {
    const HEADERS: &'static [&'static str];

    fn row(entity: &Self::Entity) -> Vec<String>;

    fn image_line(_view: &EntityFormView<Self>) -> Option<String> {
        None
    }
}

impl Screen for Customers {
    const HEADERS: &'static [&'static str] =
        &["ID", "Company Name", "Address", "City", "Mobile Number"];

    fn row(customer: &Customer) -> Vec<String> {
        vec![
            customer.id.to_string(),
            customer.company_name.clone(),
            customer.address.clone(),
            customer.city.clone(),
            customer.mobile_number.clone(),
        ]
    }
}

impl Screen for Products {
    const HEADERS: &'static [&'static str] =
        &["ID", "Image", "Product Name", "Price", "Product Type"];

    fn row(product: &Product) -> Vec<String> {
        vec![
            product.id.to_string(),
            product.thumbnail_path.clone().unwrap_or_else(|| "-".to_string()),
            product.product_name.clone(),
            format!("${:.2}", product.price),
            product.product_type.clone(),
        ]
    }

    fn image_line(view: &EntityFormView<Products>) -> Option<String> {
        use console_core::ImagePreview;

        view.preview().map(|preview| match &preview {
            ImagePreview::Selected { file_name, .. } => {
                format!("{}: {file_name}", preview.caption())
            }
            ImagePreview::Stored { path } => format!("{}: {path}", preview.caption()),
        })
    }
}

pub fn dashboard() -> String {
    [
        "Dashboard",
        "",
        "  Manage Customers  /customers",
        "    Add, edit, and delete customer information",
        "  Manage Products   /products",
        "    Add, edit, and delete products with image uploads",
        "",
    ]
    .join("\n")
}

pub fn list<R: Screen>(view: &EntityListView<R>) -> String {
    let mut out = format!("{}s\n\n", R::TITLE);
    match view.phase() {
        ListPhase::Loading => out.push_str("Loading...\n"),
        ListPhase::Failed(message) => {
            let _ = writeln!(out, "{message}");
        }
        ListPhase::Ready => {
            if let Some(notice) = view.notice() {
                let _ = writeln!(out, "! {notice}\n");
            }
            if view.items().is_empty() {
                let _ = writeln!(out, "No {} found", R::plural());
            } else {
                let rows: Vec<Vec<String>> = view.items().iter().map(R::row).collect();
                out.push_str(&table(R::HEADERS, &rows));
            }
        }
    }
    out
}

pub fn form<R: Screen>(view: &EntityFormView<R>) -> String {
    let mut out = format!("{}\n\n", view.title());
    if view.phase() == FormPhase::Loading {
        out.push_str("Loading...\n");
        return out;
    }
    if let Some(error) = view.error() {
        let _ = writeln!(out, "! {error}\n");
    }
    if let Some(success) = view.success() {
        let _ = writeln!(out, "{success}\n");
    }
    for name in R::FIELDS {
        let _ = writeln!(out, "  {}: {}", label(name), view.field(name));
        if let Some(error) = view.field_error(name) {
            let _ = writeln!(out, "    ! {error}");
        }
    }
    if let Some(line) = R::image_line(view) {
        let _ = writeln!(out, "  {line}");
    }
    if let Some(error) = view.field_error(IMAGE) {
        let _ = writeln!(out, "    ! {error}");
    }
    out
}

fn label(field: &str) -> &str {
    match field {
        COMPANY_NAME => "Company Name",
        ADDRESS => "Address",
        CITY => "City",
        MOBILE_NUMBER => "Mobile Number",
        PRODUCT_NAME => "Product Name",
        PRICE => "Price",
        PRODUCT_TYPE => "Product Type",
        other => other,
    }
}

fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, headers.iter().copied(), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(&mut out, rule.iter().map(String::as_str), &widths);
    for row in rows {
        push_row(&mut out, row.iter().map(String::as_str), &widths);
    }
    out
}

fn push_row<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let line = cells
        .zip(widths.iter().copied())
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}
