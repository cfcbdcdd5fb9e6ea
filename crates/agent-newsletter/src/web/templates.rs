//! HTML page of the research form

use minijinja::{Environment, context};

const PAGE: &str = "index.html";

const PAGE_SOURCE: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Stock Newsletter Research</title>
  <style>
    body { margin: 0; font-family: sans-serif; display: flex; min-height: 100vh; }
    aside { width: 18rem; padding: 1.5rem; background: #f0f2f6; }
    main { flex: 1; padding: 1.5rem 3rem; max-width: 52rem; }
    label, input, button { display: block; width: 100%; margin-top: .5rem; }
    .error { color: #b00020; background: #fde7e9; padding: .75rem; border-radius: .25rem; }
  </style>
</head>
<body>
  <aside>
    <h2>Enter the Stock to Research</h2>
    <form id="research_form" method="post" action="/research">
      <label for="ticker">Select the ticket</label>
      <input id="ticker" name="ticker" type="text" value="{{ ticker }}">
      <button type="submit">Run Research</button>
    </form>
  </aside>
  <main>
    {% if error %}<p class="error">{{ error }}</p>{% endif %}
    {% if result %}
    <h3>Results of your research:</h3>
    <article>{{ result|safe }}</article>
    {% endif %}
  </main>
</body>
</html>
"#;

/// Compiled page templates
pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template(PAGE, PAGE_SOURCE)?;
        Ok(Self { env })
    }

    /// The form page, optionally with an inline error or rendered results
    pub fn page(
        &self,
        ticker: &str,
        error: Option<&str>,
        result_html: Option<&str>,
    ) -> Result<String, minijinja::Error> {
        self.env.get_template(PAGE)?.render(context! {
            ticker => ticker,
            error => error,
            result => result_html,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_page() {
        let html = Templates::new().unwrap().page("", None, None).unwrap();
        assert!(html.contains("Enter the Stock to Research"));
        assert!(html.contains(r#"id="research_form""#));
        assert!(html.contains("Select the ticket"));
        assert!(html.contains("Run Research"));
        assert!(!html.contains("Results of your research:"));
        assert!(!html.contains(r#"class="error""#));
    }

    #[test]
    fn test_error_and_input_are_escaped() {
        let html = Templates::new()
            .unwrap()
            .page("<b>", Some("bad <input>"), None)
            .unwrap();
        assert!(html.contains(r#"value="&lt;b&gt;""#));
        assert!(html.contains("bad &lt;input&gt;"));
    }

    #[test]
    fn test_result_inserted_as_html() {
        let html = Templates::new()
            .unwrap()
            .page("AAPL", None, Some("<h2>Summary</h2>"))
            .unwrap();
        assert!(html.contains("Results of your research:"));
        assert!(html.contains("<article><h2>Summary</h2></article>"));
    }
}
