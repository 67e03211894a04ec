//! Server-side HTML for the admin pages.

mod pages;

pub use pages::{index_page, listing_page, operation_page, OperationView};

use crate::model::model_from_endpoint;
use crate::state::AppState;
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

/// Alert colours, named after their CSS classes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    Success,
    Danger,
    Warning,
    Primary,
}

impl Category {
    fn class(self) -> &'static str {
        match self {
            Category::Success => "success",
            Category::Danger => "danger",
            Category::Warning => "warning",
            Category::Primary => "primary",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Alert {
    pub category: Category,
    pub message: String,
}

impl Alert {
    pub fn new(category: Category, message: impl Into<String>) -> Self {
        Alert {
            category,
            message: message.into(),
        }
    }
}

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// `[text]` badge, optionally coloured.
pub(crate) fn badge(text: &str, category: Option<Category>) -> String {
    match category {
        Some(c) => format!("<span class=\"text-{}\">[{}]</span>", c.class(), escape(text)),
        None => format!("<span>[{}]</span>", escape(text)),
    }
}

/// Wrap `body` in the page shell with the model navigation.
/// `endpoint` (e.g. `user_read`) marks the active model.
pub(crate) fn layout(state: &AppState, title: &str, endpoint: Option<&str>, alerts: &[Alert], body: &str) -> String {
    let settings = &state.settings;
    let active = endpoint.map(model_from_endpoint);
    let mut nav = String::new();
    for model in state.registry.models() {
        let class = if active == Some(model.name()) { " class=\"active\"" } else { "" };
        nav.push_str(&format!(
            "<li{}><a href=\"{}\">{}</a></li>",
            class,
            escape(&settings.url(&format!("/{}/", model.name()))),
            escape(model.name())
        ));
    }
    let mut flashes = String::new();
    for alert in alerts {
        flashes.push_str(&format!(
            "<div class=\"alert alert-{}\" role=\"alert\">{}</div>",
            alert.category.class(),
            escape(&alert.message)
        ));
    }
    format!(
        "<!doctype html><html><head><meta charset=\"utf-8\"><title>{title} - {name}</title>\
<style>.active{{font-weight:bold}}.alert-success{{color:#155724}}.alert-danger,.text-danger{{color:#721c24}}\
.text-primary{{color:#004085}}table{{border-collapse:collapse}}td,th{{border:1px solid #ccc;padding:2px 6px}}</style>\
</head><body data-admin=\"{name}\">\
<nav><a href=\"{home}\">{name}</a><ul>{nav}</ul></nav>\
<main><h1>{title}</h1>{flashes}{body}</main>\
</body></html>",
        title = escape(title),
        name = escape(&settings.name),
        home = escape(&settings.url("/")),
        nav = nav,
        flashes = flashes,
        body = body,
    )
}

/// HTML response with the given status.
pub fn html(status: StatusCode, page: String) -> Response {
    let mut resp = page.into_response();
    *resp.status_mut() = status;
    resp.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    resp
}
