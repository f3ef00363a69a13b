//! Page templates, embedded at compile time.

use axum::response::Html;
use minijinja::{Environment, Value};
use serde::Serialize;
use tracing::error;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("nav.html", include_str!("../templates/nav.html")),
    ("query.html", include_str!("../templates/query.html")),
    ("graph.html", include_str!("../templates/graph.html")),
    ("settings.html", include_str!("../templates/settings.html")),
];

/// Status message rendered above page content.
#[derive(Debug, Clone, Serialize)]
pub struct Banner {
    pub level: &'static str,
    pub message: String,
}

impl Banner {
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: "success", message: message.into() }
    }
    pub fn error(message: impl Into<String>) -> Self {
        Self { level: "error", message: message.into() }
    }
    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: "warning", message: message.into() }
    }
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: "info", message: message.into() }
    }
}

pub fn build_environment() -> Result<Environment<'static>, minijinja::Error> {
    let mut env = Environment::new();
    for &(name, source) in TEMPLATES {
        env.add_template(name, source)?;
    }
    Ok(env)
}

/// Render a template, falling back to a plain error page.
pub fn render(env: &Environment<'static>, name: &str, ctx: Value) -> Html<String> {
    match env.get_template(name).and_then(|t| t.render(ctx)) {
        Ok(html) => Html(html),
        Err(e) => {
            error!("Template {} failed to render: {:#}", name, e);
            Html(format!(
                "<!DOCTYPE html><html><body><h1>Rendering error</h1><pre>{}</pre></body></html>",
                escape_html(&e.to_string())
            ))
        }
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// JSON safe to embed in a `<script>` block.
pub fn script_json<T: Serialize>(value: &T) -> ragview_common::Result<String> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}
