use axum::{debug_handler, http::header, response::{Html, IntoResponse}};

#[macro_export]
macro_rules! include_res {
    (bytes, $p:expr) => {
        include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/res", $p))
    };
    (str, $p:expr) => {
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/res", $p))
    };
}

/// Wraps a view in the shell: navbar, flash message and footer.
///
/// The meeting view is the only page that skips this.
pub fn page(title: &str, signed_in: bool, flash: Option<&str>, body: &str) -> Html<String> {
    let nav = if signed_in {
        include_res!(str, "/pages/nav_signed_in.html")
    } else {
        include_res!(str, "/pages/nav_signed_out.html")
    };
    let flash = flash
        .map(|message| format!(r#"<div class="flash">{}</div>"#, escape(message)))
        .unwrap_or_default();

    Html(
        include_res!(str, "/pages/layout.html")
            .replace("{nav}", nav)
            .replace("{body}", body)
            .replace("{title}", &escape(title))
            .replace("{flash}", &flash)
    )
}

/// HTML-escapes user text. Braces are escaped too so the text can never be
/// mistaken for a template placeholder by a later `.replace`.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '{' => out.push_str("&#123;"),
            '}' => out.push_str("&#125;"),
            c => out.push(c),
        }
    }
    out
}

#[debug_handler]
pub async fn stylesheet() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/css")],
        include_res!(str, "/style.css"),
    )
}
