//! HTML templates.
//!
//! Templates are compiled into the binary and rendered with minijinja.
//! Every template name ends in `.html`, which turns on HTML auto-escaping.

use std::sync::Arc;

use axum::response::Html;
use minijinja::Environment;
use serde::Serialize;
use warbler_common::{AppError, AppResult};

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("macros.html", include_str!("../templates/macros.html")),
    ("home.html", include_str!("../templates/home.html")),
    ("home-anon.html", include_str!("../templates/home-anon.html")),
    ("404.html", include_str!("../templates/404.html")),
    ("users/signup.html", include_str!("../templates/users/signup.html")),
    ("users/login.html", include_str!("../templates/users/login.html")),
    ("users/index.html", include_str!("../templates/users/index.html")),
    ("users/detail.html", include_str!("../templates/users/detail.html")),
    ("users/show.html", include_str!("../templates/users/show.html")),
    ("users/following.html", include_str!("../templates/users/following.html")),
    ("users/followers.html", include_str!("../templates/users/followers.html")),
    ("users/edit.html", include_str!("../templates/users/edit.html")),
    ("messages/new.html", include_str!("../templates/messages/new.html")),
    ("messages/show.html", include_str!("../templates/messages/show.html")),
];

/// Compiled template set.
#[derive(Clone)]
pub struct Templates {
    env: Arc<Environment<'static>>,
}

impl Templates {
    /// Load and compile all templates.
    pub fn new() -> AppResult<Self> {
        let mut env = Environment::new();
        for &(name, source) in TEMPLATES {
            env.add_template(name, source)
                .map_err(|e| AppError::Internal(format!("Invalid template {name}: {e}")))?;
        }
        Ok(Self { env: Arc::new(env) })
    }

    /// Render a template with the given context.
    pub fn render<S: Serialize>(&self, name: &str, ctx: S) -> AppResult<Html<String>> {
        self.env
            .get_template(name)
            .and_then(|t| t.render(ctx))
            .map(Html)
            .map_err(|e| AppError::Internal(format!("Failed to render {name}: {e}")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use minijinja::context;

    #[test]
    fn test_all_templates_compile() {
        assert!(Templates::new().is_ok());
    }

    #[test]
    fn test_html_is_escaped() {
        let templates = Templates::new().unwrap();
        let Html(page) = templates
            .render(
                "messages/new.html",
                context! { error => "<script>alert(1)</script>" },
            )
            .unwrap();

        assert!(page.contains("&lt;script&gt;"));
        assert!(!page.contains("<script>alert(1)</script>"));
    }

    #[test]
    fn test_missing_template_is_internal_error() {
        let templates = Templates::new().unwrap();
        let result = templates.render("nope.html", context! {});
        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
