//! Template environment and page locals.
//!
//! Templates are compiled into the binary and registered once at startup.
//! Every render merges three layers into one context, later layers winning:
//!
//! 1. [`SiteLocals`] -- fixed for the life of the process
//! 2. [`PageContext`] -- derived from the request (`is_home_page`, `host`)
//! 3. the handler's view model

use core::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderMap, Uri, header};
use axum::response::Html;
use chrono::Datelike;
use minijinja::Environment;
use serde::Serialize;

use crate::config::DashboardConfig;
use crate::error::DashboardError;

/// Templates as `(name, source)` pairs.
const TEMPLATES: &[(&str, &str)] = &[
    ("layout.html", include_str!("../templates/layout.html")),
    ("index.html", include_str!("../templates/index.html")),
    ("task.html", include_str!("../templates/task.html")),
    ("result.html", include_str!("../templates/result.html")),
    ("new.html", include_str!("../templates/new.html")),
    ("edit.html", include_str!("../templates/edit.html")),
    ("task-fields.html", include_str!("../templates/task-fields.html")),
    ("delete.html", include_str!("../templates/delete.html")),
    ("404.html", include_str!("../templates/404.html")),
    ("500.html", include_str!("../templates/500.html")),
];

/// Locals shared by every page.
#[derive(Debug, Clone, Serialize)]
pub struct SiteLocals {
    /// Document language tag.
    pub lang: &'static str,
    /// Current year, for the footer.
    pub year: i32,
    /// Dashboard version.
    pub version: &'static str,
    /// Project home page.
    pub repo: &'static str,
    /// Issue tracker link.
    pub bugtracker: String,
    /// Emit a `noindex` robots meta tag.
    pub noindex: bool,
    /// Hide links to mutating pages.
    pub readonly: bool,
    /// Banner text, if any.
    pub site_message: Option<String>,
}

impl SiteLocals {
    /// Locals for the given configuration.
    pub fn from_config(config: &DashboardConfig) -> Self {
        let repo = env!("CARGO_PKG_HOMEPAGE");
        Self {
            lang: "en",
            year: chrono::Utc::now().year(),
            version: env!("CARGO_PKG_VERSION"),
            repo,
            bugtracker: format!("{repo}/issues"),
            noindex: config.noindex,
            readonly: config.readonly,
            site_message: config.site_message.clone(),
        }
    }
}

/// Per-request locals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageContext {
    /// Whether the request is for `/`.
    pub is_home_page: bool,
    /// Host name the request was addressed to, without the port.
    pub host: String,
}

impl PageContext {
    /// Derive the locals from a request's URI and headers.
    pub fn from_parts(uri: &Uri, headers: &HeaderMap) -> Self {
        let authority = headers
            .get(header::HOST)
            .and_then(|value| value.to_str().ok())
            .or_else(|| uri.host())
            .unwrap_or_default();
        Self {
            is_home_page: uri.path() == "/",
            host: strip_port(authority).to_owned(),
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for PageContext {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(&parts.uri, &parts.headers))
    }
}

/// `example.com:4000` -> `example.com`, `[::1]:4000` -> `[::1]`.
fn strip_port(authority: &str) -> &str {
    if authority.starts_with('[') {
        return authority
            .find(']')
            .and_then(|end| authority.get(..=end))
            .unwrap_or(authority);
    }
    authority
        .rsplit_once(':')
        .map_or(authority, |(host, _)| host)
}

/// The template environment plus site locals.
#[derive(Debug)]
pub struct Views {
    env: Environment<'static>,
    site: SiteLocals,
}

impl Views {
    /// Register every template.
    pub fn new(site: SiteLocals) -> Result<Self, DashboardError> {
        let mut env = Environment::new();
        for &(name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        Ok(Self { env, site })
    }

    /// The site-wide locals.
    pub const fn site(&self) -> &SiteLocals {
        &self.site
    }

    /// Render `name` (without extension) with the merged locals.
    pub fn render<V: Serialize>(
        &self,
        name: &str,
        page: &PageContext,
        view: &V,
    ) -> Result<Html<String>, DashboardError> {
        let mut context = serde_json::Map::new();
        for layer in [
            serde_json::to_value(&self.site)?,
            serde_json::to_value(page)?,
            serde_json::to_value(view)?,
        ] {
            if let serde_json::Value::Object(fields) = layer {
                context.extend(fields);
            }
        }

        let template = self.env.get_template(&format!("{name}.html"))?;
        Ok(Html(template.render(context)?))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn views(config: &DashboardConfig) -> Views {
        Views::new(SiteLocals::from_config(config)).unwrap()
    }

    #[test]
    fn every_template_compiles() {
        let views = views(&DashboardConfig::default());
        for &(name, _) in TEMPLATES {
            assert!(views.env.get_template(name).is_ok(), "{name}");
        }
    }

    #[test]
    fn site_locals_follow_config() {
        let config = DashboardConfig {
            readonly: true,
            site_message: Some("Planned outage".to_owned()),
            ..DashboardConfig::default()
        };
        let site = SiteLocals::from_config(&config);
        assert!(site.readonly);
        assert!(site.noindex);
        assert_eq!(site.lang, "en");
        assert!(site.bugtracker.ends_with("/issues"));
    }

    #[test]
    fn page_context_reads_host_without_port() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, "dashboard.example:4000".parse().unwrap());
        let page = PageContext::from_parts(&Uri::from_static("/"), &headers);
        assert!(page.is_home_page);
        assert_eq!(page.host, "dashboard.example");

        headers.insert(header::HOST, "[::1]:4000".parse().unwrap());
        let page = PageContext::from_parts(&Uri::from_static("/abc"), &headers);
        assert!(!page.is_home_page);
        assert_eq!(page.host, "[::1]");
    }

    #[test]
    fn layout_shows_banner_and_hides_noindex_when_disabled() {
        let config = DashboardConfig {
            noindex: false,
            site_message: Some("Planned outage".to_owned()),
            ..DashboardConfig::default()
        };
        let html = views(&config)
            .render("404", &PageContext::default(), &json!({}))
            .unwrap()
            .0;
        assert!(html.contains("Planned outage"));
        assert!(!html.contains("noindex"));
    }

    #[test]
    fn view_values_override_page_values() {
        let html = views(&DashboardConfig::default())
            .render(
                "index",
                &PageContext::default(),
                &json!({ "tasks": [], "is_home_page": true, "client": "abc" }),
            )
            .unwrap()
            .0;
        assert!(html.contains("abc"));
    }
}
