//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `cms_core` linkage with a deterministic probe.
//! - Render a stored document JSON file to HTML for quick inspection.

use cms_core::{is_content_empty, to_html, Document};
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        None => {
            println!("cms_core ping={}", cms_core::ping());
            println!("cms_core version={}", cms_core::core_version());
            ExitCode::SUCCESS
        }
        Some("render") => match args.get(1) {
            Some(path) => render(path),
            None => usage(),
        },
        Some(_) => usage(),
    }
}

fn render(path: &str) -> ExitCode {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) => {
            eprintln!("failed to read `{path}`: {err}");
            return ExitCode::FAILURE;
        }
    };
    let document = Document::load_or_default(serde_json::from_str(&raw).ok());
    println!("{}", to_html(&document));
    if is_content_empty(&document) {
        eprintln!("note: document has no text content");
    }
    ExitCode::SUCCESS
}

fn usage() -> ExitCode {
    eprintln!("usage: cms_cli [render <document.json>]");
    ExitCode::from(2)
}
