mod args;
mod host;
mod render;
mod transport;

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use console_core::{
    ApiConfig, ConsoleClient, Customers, EntityFormView, FormMode, FormOptions, FormResource,
    ImageFile, Products, Route,
};
use tracing_subscriber::EnvFilter;

use crate::args::{Cli, Command, CustomerAction, ProductAction};
use crate::host::{Host, Status};
use crate::transport::Transport;

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = ApiConfig::resolve(cli.mode.unwrap_or_default(), cli.api_url.as_deref());
    tracing::debug!(
        mode = %config.mode(),
        base_url = config.base_url(),
        "configuration resolved"
    );

    let host = Host::new(
        ConsoleClient::new(&config),
        Transport::for_config(&config, &cli.origin),
        FormOptions {
            redirect_delay: Duration::from_millis(cli.redirect_delay_ms),
        },
    );

    let status = match cli.command {
        Command::Open { path } => match Route::parse(&path) {
            Some(route) => host.open(route),
            None => {
                println!("Page not found: {path}");
                Status::Failed
            }
        },
        Command::Health => host.health(),
        Command::Customers { action } => match action {
            CustomerAction::List => host.list::<Customers>(),
            CustomerAction::Add(fields) => {
                host.submit_form::<Customers>(FormMode::Create, |view| {
                    fill(view, &fields.values());
                    true
                })
            }
            CustomerAction::Edit { id, fields } => {
                host.submit_form::<Customers>(FormMode::Edit(id), |view| {
                    fill(view, &fields.values());
                    true
                })
            }
            CustomerAction::Delete { id, yes } => {
                host.delete::<Customers>(id, |question| yes || confirm(question))
            }
        },
        Command::Products { action } => match action {
            ProductAction::List => host.list::<Products>(),
            ProductAction::Add(fields) => {
                let image = fields.image.as_deref().map(load_image).transpose()?;
                host.submit_form::<Products>(FormMode::Create, |view| {
                    fill(view, &fields.values());
                    select(view, image)
                })
            }
            ProductAction::Edit { id, fields } => {
                let image = fields.image.as_deref().map(load_image).transpose()?;
                host.submit_form::<Products>(FormMode::Edit(id), |view| {
                    fill(view, &fields.values());
                    select(view, image)
                })
            }
            ProductAction::Delete { id, yes } => {
                host.delete::<Products>(id, |question| yes || confirm(question))
            }
        },
    };
    Ok(status.into())
}

fn fill<R: FormResource>(view: &mut EntityFormView<R>, values: &[(&'static str, &str)]) {
    for (name, value) in values {
        view.set_field(name, *value);
    }
}

fn select(view: &mut EntityFormView<Products>, image: Option<ImageFile>) -> bool {
    match image {
        Some(file) => view.select_image(file).is_ok(),
        None => true,
    }
}

fn load_image(path: &Path) -> anyhow::Result<ImageFile> {
    let bytes =
        std::fs::read(path).with_context(|| format!("reading image {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(ImageFile::new(file_name, mime_type(path), bytes))
}

fn mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
}

fn confirm(question: &str) -> bool {
    confirm_with(question, &mut io::stdout(), &mut io::stdin().lock())
}

/// Ask on `out` and read one line from `input`. Any I/O failure is a no.
fn confirm_with(question: &str, out: &mut impl Write, input: &mut impl BufRead) -> bool {
    if write!(out, "{question} [y/N] ").and_then(|()| out.flush()).is_err() {
        return false;
    }
    let mut answer = String::new();
    if input.read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
