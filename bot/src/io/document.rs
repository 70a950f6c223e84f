//! Weekly document generation.
//!
//! The rollover only knows where a document goes; what goes into it is the
//! [`DocumentGenerator`]'s business.

use anyhow::Result;
use chrono::{DateTime, FixedOffset};
use tracing::debug;

use crate::core::types::{Issue, RepoSlug};
use crate::core::weekly::{DocumentPath, Period};
use crate::io::templates::Templates;

/// Everything a generator may use to produce one weekly document.
#[derive(Debug, Clone)]
pub struct DocumentRequest<'a> {
    pub repo: &'a RepoSlug,
    /// The issue being closed out.
    pub issue: &'a Issue,
    pub period: Period,
    pub date: DateTime<FixedOffset>,
    pub path: &'a DocumentPath,
    /// Content already at `path` on the base branch, if any.
    pub existing: Option<&'a str>,
}

pub trait DocumentGenerator {
    fn generate(&self, request: &DocumentRequest<'_>) -> Result<String>;
}

/// Renders the closed issue's body into the embedded Markdown template.
#[derive(Default)]
pub struct TemplateGenerator {
    templates: Templates,
}

impl TemplateGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentGenerator for TemplateGenerator {
    fn generate(&self, request: &DocumentRequest<'_>) -> Result<String> {
        let date = request.date.format("%Y-%m-%d").to_string();
        let content = self.templates.render_weekly(
            request.period,
            &date,
            request.issue.number,
            &request.repo.to_string(),
            &request.issue.body,
        )?;
        debug!(
            path = %request.path,
            bytes = content.len(),
            unchanged = request.existing == Some(content.as_str()),
            "weekly document rendered"
        );
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::weekly::{date_for_period, path_for_period};
    use crate::test_support::weekly_issue;

    #[test]
    fn renders_issue_body_with_period_and_date() {
        let repo = RepoSlug::new("dyweb", "weekly");
        let mut issue = weekly_issue("Weekly-12", 500);
        issue.body = "- [Rust 2018](https://blog.rust-lang.org)\n".to_string();
        let period = Period::new(12).expect("period");
        let path = path_for_period(period);

        let doc = TemplateGenerator::new()
            .generate(&DocumentRequest {
                repo: &repo,
                issue: &issue,
                period,
                date: date_for_period(period),
                path: &path,
                existing: None,
            })
            .expect("generate");

        assert!(doc.contains("title: \"Weekly-12\""));
        assert!(doc.contains("date: 2019-06-24"));
        assert!(doc.contains("https://github.com/dyweb/weekly/issues/500"));
        assert!(doc.contains("- [Rust 2018](https://blog.rust-lang.org)"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let repo = RepoSlug::new("dyweb", "weekly");
        let issue = weekly_issue("Weekly-3", 10);
        let period = Period::new(3).expect("period");
        let path = path_for_period(period);
        let request = DocumentRequest {
            repo: &repo,
            issue: &issue,
            period,
            date: date_for_period(period),
            path: &path,
            existing: None,
        };
        let generator = TemplateGenerator::new();
        assert_eq!(
            generator.generate(&request).expect("first"),
            generator.generate(&request).expect("second")
        );
    }
}
