//! Pages compiled into the binary and filled in per server.
//!
//! Placeholders are `__UPPER_SNAKE__` tokens; [`fill`] replaces each one
//! everywhere it appears.

/// Replace every `(placeholder, value)` pair in `template`, in order.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    values
        .iter()
        .fold(template.to_string(), |page, &(placeholder, value)| {
            page.replace(placeholder, value)
        })
}

pub mod serve {
    use super::fill;

    const TEST_HTML: &str = include_str!("serve/test.html");

    /// Launcher page behind the `TEST` route: loads the library and starts
    /// the UI against this server's save route.
    pub struct TestPage<'a> {
        /// Absolute URL path of the library asset.
        pub library_path: &'a str,
        /// URL the UI posts saved audio to.
        pub save_url: &'a str,
    }

    impl TestPage<'_> {
        pub fn render(&self) -> String {
            fill(
                TEST_HTML,
                &[
                    ("__LIBRARY_PATH__", self.library_path),
                    ("__SAVE_URL__", self.save_url),
                ],
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fill;
    use super::serve::TestPage;

    #[test]
    fn test_fill_replaces_every_occurrence() {
        assert_eq!(
            fill("__A__ and __A__, __B__", &[("__A__", "x"), ("__B__", "y")]),
            "x and x, y"
        );
        assert_eq!(fill("no placeholders", &[("__A__", "x")]), "no placeholders");
    }

    #[test]
    fn test_render_test_page() {
        let html = TestPage {
            library_path: "/AuO.js",
            save_url: "http://localhost:9000/TEST-SAVE",
        }
        .render();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"<script src="/AuO.js"></script>"#));
        assert!(html.contains(r#""http://localhost:9000/TEST-SAVE""#));
        assert!(!html.contains("__LIBRARY_PATH__"));
        assert!(!html.contains("__SAVE_URL__"));
    }
}
