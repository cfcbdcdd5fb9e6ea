//! Finished newsletter and its section check

use agent_llm::TokenUsage;
use agent_workflow::{CrewOutput, TaskOutput};
use serde::Serialize;
use std::fmt;

use crate::ticker::Ticker;

/// Parts the writer is asked for, in reading order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    ExecutiveSummary,
    Introduction,
    Body,
    Summary,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::ExecutiveSummary,
        Section::Introduction,
        Section::Body,
        Section::Summary,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ExecutiveSummary => "executive summary",
            Self::Introduction => "introduction",
            Self::Body => "body",
            Self::Summary => "summary",
        })
    }
}

/// Line numbers of the section headings found in a newsletter
///
/// A heading is a markdown `#` heading, a line that is entirely bold, or a
/// short line ending in `:`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewsletterSections {
    positions: [Option<usize>; 4],
}

impl NewsletterSections {
    pub fn detect(markdown: &str) -> Self {
        let headings: Vec<(usize, String)> = markdown
            .lines()
            .enumerate()
            .filter_map(|(line, text)| heading_text(text).map(|h| (line, h)))
            .collect();

        let mut positions = [None; 4];
        let mut unclassified = Vec::new();
        let last = headings.len().saturating_sub(1);
        for (i, (line, heading)) in headings.iter().enumerate() {
            match classify(heading, i == last) {
                Some(Section::Summary) => positions[Section::Summary.index()] = Some(*line),
                Some(section) => {
                    let slot = &mut positions[section.index()];
                    if slot.is_none() {
                        *slot = Some(*line);
                    }
                }
                None => unclassified.push(*line),
            }
        }

        // An untitled-by-keyword heading between introduction and summary
        // still marks the body.
        if positions[Section::Body.index()].is_none() {
            if let (Some(intro), Some(summary)) = (
                positions[Section::Introduction.index()],
                positions[Section::Summary.index()],
            ) {
                positions[Section::Body.index()] = unclassified
                    .into_iter()
                    .find(|line| *line > intro && *line < summary);
            }
        }

        Self { positions }
    }

    pub fn position(&self, section: Section) -> Option<usize> {
        self.positions[section.index()]
    }

    pub fn missing(&self) -> Vec<Section> {
        Section::ALL
            .into_iter()
            .filter(|s| self.position(*s).is_none())
            .collect()
    }

    /// Every section present, in reading order
    pub fn in_order(&self) -> bool {
        let found: Vec<usize> = self.positions.iter().flatten().copied().collect();
        found.len() == Section::ALL.len() && found.windows(2).all(|w| w[0] < w[1])
    }

    pub fn is_complete(&self) -> bool {
        self.in_order()
    }
}

fn heading_text(line: &str) -> Option<String> {
    let line = line.trim();
    let text = if line.starts_with('#') {
        line.trim_start_matches('#')
    } else if line.len() > 4 && line.starts_with("**") && line.ends_with("**") {
        &line[2..line.len() - 2]
    } else if line.ends_with(':') && line.split_whitespace().count() <= 5 {
        line
    } else {
        return None;
    };

    let text = text
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, '*' | '_' | ':' | '-'))
        .trim_start_matches(|c: char| c.is_ascii_digit() || c == '.' || c == ' ')
        .to_lowercase();
    (!text.is_empty()).then_some(text)
}

/// `last` marks the closing heading, where a mixed heading reads as the summary
fn classify(heading: &str, last: bool) -> Option<Section> {
    const SUMMARY: &[&str] = &["summary", "conclusion", "key takeaways", "outlook", "final thoughts"];
    const BODY: &[&str] = &["main", "body", "analysis", "news", "deep dive", "market"];

    if heading.contains("executive summary") {
        Some(Section::ExecutiveSummary)
    } else if heading.contains("introduction") || heading.starts_with("intro") {
        Some(Section::Introduction)
    } else {
        let summary = SUMMARY.iter().any(|w| heading.contains(w));
        let body = BODY.iter().any(|w| heading.contains(w));
        match (summary, body) {
            (true, false) => Some(Section::Summary),
            (false, true) => Some(Section::Body),
            // "News Summary" is body, "Conclusion: market view" is summary
            (true, true) if last || SUMMARY.iter().any(|w| heading.starts_with(w)) => {
                Some(Section::Summary)
            }
            (true, true) => Some(Section::Body),
            (false, false) => None,
        }
    }
}

/// Markdown newsletter produced by one crew run
#[derive(Debug, Clone, Serialize)]
pub struct Newsletter {
    pub ticker: Ticker,
    pub markdown: String,
    pub sections: NewsletterSections,
    pub token_usage: TokenUsage,
    pub tasks: Vec<TaskOutput>,
}

impl Newsletter {
    pub fn from_crew_output(ticker: Ticker, output: CrewOutput) -> Self {
        let markdown = output.final_output.trim().to_string();
        Self {
            ticker,
            sections: NewsletterSections::detect(&markdown),
            markdown,
            token_usage: output.token_usage,
            tasks: output.tasks_output,
        }
    }
}

impl fmt::Display for Newsletter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.markdown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMPLETE: &str = "# AAPL Weekly

## Executive Summary
- Price is trending up
- News flow is positive
- Fear/greed score: 68

## Introduction
Apple closed the year higher.

## Market Analysis
Headlines focused on buybacks.

## Summary
Expect the uptrend to continue.";

    #[test]
    fn test_complete_newsletter() {
        let sections = NewsletterSections::detect(COMPLETE);
        assert!(sections.missing().is_empty());
        assert!(sections.in_order());
        assert!(sections.is_complete());
        assert_eq!(sections.position(Section::ExecutiveSummary), Some(2));
        assert_eq!(sections.position(Section::Summary), Some(13));
    }

    #[test]
    fn test_bold_and_colon_headings() {
        let markdown = "**Executive Summary**\n- a\n- b\n- c\n\n**Introduction**\ntext\n\n\
                        **The Numbers**\nmore\n\nConclusion:\nup";
        let sections = NewsletterSections::detect(markdown);
        assert!(sections.is_complete(), "{sections:?}");
    }

    #[test]
    fn test_missing_sections() {
        let sections = NewsletterSections::detect("## Introduction\ntext\n\n## Summary\nend");
        assert_eq!(sections.missing(), vec![Section::ExecutiveSummary, Section::Body]);
        assert!(!sections.in_order());
    }

    #[test]
    fn test_out_of_order() {
        let markdown = "## Introduction\n\n## Executive Summary\n\n## Analysis\n\n## Conclusion";
        let sections = NewsletterSections::detect(markdown);
        assert!(sections.missing().is_empty());
        assert!(!sections.in_order());
    }

    #[test]
    fn test_news_summary_is_body() {
        let markdown = "## Executive Summary\n\n## Introduction\n\n## News Summary\n\n## Summary";
        let sections = NewsletterSections::detect(markdown);
        assert_eq!(sections.position(Section::Body), Some(4));
        assert_eq!(sections.position(Section::Summary), Some(6));
        assert!(sections.is_complete());
    }

    #[test]
    fn test_closing_market_outlook_is_summary() {
        let markdown = "## Executive Summary\n\n## Introduction\n\n## Price Analysis\n\n## Market Outlook";
        let sections = NewsletterSections::detect(markdown);
        assert_eq!(sections.position(Section::Body), Some(4));
        assert_eq!(sections.position(Section::Summary), Some(6));
        assert!(sections.is_complete());
    }

    #[test]
    fn test_plain_text_has_no_sections() {
        let sections = NewsletterSections::detect("Apple went up. The summary is that it went up.");
        assert_eq!(sections.missing().len(), 4);
    }

    #[test]
    fn test_from_crew_output() {
        let output = CrewOutput {
            final_output: format!("\n{COMPLETE}\n"),
            tasks_output: Vec::new(),
            token_usage: TokenUsage::single(100, 50),
        };
        let newsletter = Newsletter::from_crew_output(Ticker::parse("aapl").unwrap(), output);

        assert_eq!(newsletter.ticker.as_str(), "AAPL");
        assert!(newsletter.markdown.starts_with("# AAPL Weekly"));
        assert!(newsletter.sections.is_complete());
        assert_eq!(newsletter.to_string(), newsletter.markdown);
    }
}
