//! Embedded minijinja templates for issue, pull request and document text.

use anyhow::Result;
use minijinja::{Environment, context};

use crate::core::weekly::{DocumentPath, Period};

const WEEKLY_TEMPLATE: &str = include_str!("templates/weekly.md");
const ISSUE_BODY_TEMPLATE: &str = include_str!("templates/issue_body.md");
const PR_BODY_TEMPLATE: &str = include_str!("templates/pr_body.md");

/// Template engine wrapper around minijinja.
pub struct Templates {
    env: Environment<'static>,
}

impl Default for Templates {
    fn default() -> Self {
        Self::new()
    }
}

impl Templates {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.add_template("weekly", WEEKLY_TEMPLATE)
            .expect("weekly template should be valid");
        env.add_template("issue_body", ISSUE_BODY_TEMPLATE)
            .expect("issue body template should be valid");
        env.add_template("pr_body", PR_BODY_TEMPLATE)
            .expect("pr body template should be valid");
        Self { env }
    }

    pub fn render_issue_body(&self, period: Period) -> Result<String> {
        let rendered = self
            .env
            .get_template("issue_body")?
            .render(context! { period => period.number() })?;
        Ok(rendered.trim().to_string())
    }

    pub fn render_pr_body(
        &self,
        issue_number: u64,
        path: &DocumentPath,
        next_period: Period,
    ) -> Result<String> {
        let rendered = self.env.get_template("pr_body")?.render(context! {
            issue_number => issue_number,
            path => path.as_str(),
            next_period => next_period.number(),
        })?;
        Ok(rendered.trim().to_string())
    }

    pub fn render_weekly(
        &self,
        period: Period,
        date: &str,
        issue_number: u64,
        repo: &str,
        body: &str,
    ) -> Result<String> {
        let body = body.trim();
        let mut rendered = self.env.get_template("weekly")?.render(context! {
            period => period.number(),
            date => date,
            issue_number => issue_number,
            repo => repo,
            body => (!body.is_empty()).then_some(body),
        })?;
        if !rendered.ends_with('\n') {
            rendered.push('\n');
        }
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period(n: u32) -> Period {
        Period::new(n).expect("period")
    }

    #[test]
    fn issue_body_names_the_period() {
        let body = Templates::new().render_issue_body(period(13)).expect("render");
        assert_eq!(body, "工作周报第 13 期开始 :tada:");
    }

    #[test]
    fn pr_body_references_issue_path_and_next_period() {
        let path = crate::core::weekly::path_for_period(period(12));
        let body = Templates::new()
            .render_pr_body(500, &path, period(13))
            .expect("render");
        assert!(body.contains("#500"));
        assert!(body.contains("2019/2019-06-24-weekly.md"));
        assert!(body.contains("Weekly-13"));
    }

    #[test]
    fn weekly_falls_back_when_body_is_blank() {
        let doc = Templates::new()
            .render_weekly(period(1), "2019-04-08", 7, "dyweb/weekly", "  \n")
            .expect("render");
        assert!(doc.contains("_No entries this week._"));
        assert!(doc.ends_with('\n'));
    }
}
