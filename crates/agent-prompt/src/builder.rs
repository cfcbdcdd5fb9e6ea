//! Fluent prompt builder
//!
//! Agents assemble their system prompt and task prompts from role text,
//! task descriptions and context pieces. [`PromptBuilder`] keeps that
//! assembly readable.

/// A fluent builder for constructing prompts
///
/// ```
/// use agent_prompt::PromptBuilder;
///
/// let prompt = PromptBuilder::new()
///     .text("You are Senior Stock Price Analyst.")
///     .section("Your personal goal")
///     .text("Find the AAPL stock price and analyze trends")
///     .when(false, "\nNever shown")
///     .build_trimmed();
///
/// assert!(prompt.contains("## Your personal goal"));
/// assert!(!prompt.contains("Never shown"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    parts: Vec<String>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw text
    pub fn text(mut self, content: impl Into<String>) -> Self {
        self.parts.push(content.into());
        self
    }

    pub fn newline(self) -> Self {
        self.text("\n")
    }

    /// Two newlines
    pub fn blank_line(self) -> Self {
        self.text("\n\n")
    }

    /// Markdown h2 on its own line
    pub fn section(self, title: impl Into<String>) -> Self {
        self.text(format!("\n\n## {}\n", title.into()))
    }

    /// `- item` line
    pub fn bullet(self, content: impl Into<String>) -> Self {
        self.text(format!("- {}\n", content.into()))
    }

    pub fn bullets<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for item in items {
            self = self.bullet(item);
        }
        self
    }

    /// `key: value` line
    pub fn field(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.text(format!("{}: {}\n", key.into(), value.into()))
    }

    /// Append only when `condition` holds
    pub fn when(self, condition: bool, content: impl Into<String>) -> Self {
        if condition { self.text(content) } else { self }
    }

    /// Run `f` on the builder only when `value` is present
    pub fn when_some<T>(self, value: Option<T>, f: impl FnOnce(Self, T) -> Self) -> Self {
        match value {
            Some(v) => f(self, v),
            None => self,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn build(self) -> String {
        self.parts.concat()
    }

    /// Build with surrounding whitespace removed
    pub fn build_trimmed(self) -> String {
        self.build().trim().to_string()
    }
}
