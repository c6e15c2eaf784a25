use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use console_core::validation::{
    ADDRESS, CITY, COMPANY_NAME, MOBILE_NUMBER, PRICE, PRODUCT_NAME, PRODUCT_TYPE,
};
use console_core::{DeploymentMode, EntityId};

pub const DEFAULT_ORIGIN: &str = "http://localhost:5000";

#[derive(Parser, Debug)]
#[command(name = "console", version, about = "Manage customers and products")]
pub struct Cli {
    /// Deployment mode: production talks to `/api` on the origin,
    /// development to a separate API host.
    #[arg(long = "env", env = "CONSOLE_ENV", global = true)]
    pub mode: Option<DeploymentMode>,

    /// Development API address, e.g. http://localhost:5000/api
    #[arg(long, env = "CONSOLE_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Origin that relative API paths are resolved against.
    #[arg(long, env = "CONSOLE_ORIGIN", default_value = DEFAULT_ORIGIN, global = true)]
    pub origin: String,

    /// Pause after a successful save before the list is shown.
    #[arg(long, default_value_t = 1500, global = true)]
    pub redirect_delay_ms: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show a console page by path, e.g. `/products/edit/3`.
    Open {
        #[arg(default_value = "/")]
        path: String,
    },
    Customers {
        #[command(subcommand)]
        action: CustomerAction,
    },
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Check that the API answers.
    Health,
}

#[derive(Subcommand, Debug)]
pub enum CustomerAction {
    List,
    Add(CustomerFields),
    Edit {
        id: EntityId,
        #[command(flatten)]
        fields: CustomerFields,
    },
    Delete {
        id: EntityId,
        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProductAction {
    List,
    Add(ProductFields),
    Edit {
        id: EntityId,
        #[command(flatten)]
        fields: ProductFields,
    },
    Delete {
        id: EntityId,
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Args, Debug, Default)]
pub struct CustomerFields {
    #[arg(long)]
    pub company_name: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub mobile_number: Option<String>,
}

impl CustomerFields {
    /// The fields given on the command line, keyed by form field name.
    pub fn values(&self) -> Vec<(&'static str, &str)> {
        provided([
            (COMPANY_NAME, &self.company_name),
            (ADDRESS, &self.address),
            (CITY, &self.city),
            (MOBILE_NUMBER, &self.mobile_number),
        ])
    }
}

#[derive(Args, Debug, Default)]
pub struct ProductFields {
    #[arg(long)]
    pub product_name: Option<String>,
    #[arg(long)]
    pub price: Option<String>,
    #[arg(long)]
    pub product_type: Option<String>,
    /// JPG, PNG or GIF file to upload.
    #[arg(long)]
    pub image: Option<PathBuf>,
}

impl ProductFields {
    pub fn values(&self) -> Vec<(&'static str, &str)> {
        provided([
            (PRODUCT_NAME, &self.product_name),
            (PRICE, &self.price),
            (PRODUCT_TYPE, &self.product_type),
        ])
    }
}

fn provided<'a, const N: usize>(
    fields: [(&'static str, &'a Option<String>); N],
) -> Vec<(&'static str, &'a str)> {
    fields
        .into_iter()
        .filter_map(|(name, value)| value.as_deref().map(|value| (name, value)))
        .collect()
}
