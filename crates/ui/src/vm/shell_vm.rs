use services::{ApiConfig, AuthToken};

pub const APP_TITLE: &str = "Sentence Practice";

#[must_use]
pub fn sign_in_label(token: &AuthToken) -> &'static str {
    if token.is_missing() {
        "Not signed in"
    } else {
        "Signed in"
    }
}

/// `host[:port]` of the practice backend, for the sidebar footer.
#[must_use]
pub fn backend_label(config: &ApiConfig) -> String {
    let url = &config.base_url;
    let host = url.host_str().unwrap_or("unknown host");
    match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    }
}

#[must_use]
pub fn not_found_label(segments: &[String]) -> String {
    format!("No page at /{}", segments.join("/"))
}
