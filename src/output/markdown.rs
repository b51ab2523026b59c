//! Markdown report generation
//!
//! A report is a template with `{{name}}` placeholders. The scalar fields of
//! [`ReportData`] are substituted verbatim; each analysis section is rendered
//! to markdown first.

use crate::analysis::{
    PerformanceReport, SeoReport, StructureReport, MAX_DESCRIPTION_LENGTH, MAX_TITLE_LENGTH,
};
use crate::output::traits::{ReportData, ReportError, ReportResult};
use std::fs;
use std::path::Path;

/// Placeholders a template may use
pub const PLACEHOLDERS: &[&str] = &[
    "site_url",
    "date",
    "pages_count",
    "config_hash",
    "structure",
    "seo",
    "performance",
];

/// Text rendered in place of a section whose analyzer did not run
pub const SECTION_UNAVAILABLE: &str = "_Not available in this run._";

const DEFAULT_TEMPLATE: &str = "# Site Audit Report: {{site_url}}

- **Date**: {{date}}
- **Pages analyzed**: {{pages_count}}
- **Config hash**: `{{config_hash}}`

## Site Structure

{{structure}}

## SEO

{{seo}}

## Performance

{{performance}}
";

/// Renders [`ReportData`] through a template
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    template: String,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ReportGenerator {
    /// Creates a generator; `None` selects the built-in template
    pub fn new(template: Option<String>) -> Self {
        Self {
            template: template.unwrap_or_else(|| DEFAULT_TEMPLATE.to_string()),
        }
    }

    /// Loads a custom template, rejecting unknown or unterminated placeholders
    pub fn from_file(path: &Path) -> ReportResult<Self> {
        let template = fs::read_to_string(path)?;
        check_placeholders(&template).map_err(|message| ReportError::Template {
            path: path.to_path_buf(),
            message,
        })?;

        tracing::debug!("Loaded report template {}", path.display());
        Ok(Self::new(Some(template)))
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Substitutes every placeholder of the template
    pub fn render(&self, data: &ReportData) -> String {
        let section = |rendered: Option<String>| {
            rendered.unwrap_or_else(|| SECTION_UNAVAILABLE.to_string())
        };

        self.template
            .replace("{{site_url}}", &data.site_url)
            .replace("{{date}}", &data.date)
            .replace("{{pages_count}}", &data.pages_count.to_string())
            .replace("{{config_hash}}", &data.config_hash)
            .replace("{{structure}}", &section(data.structure.as_ref().map(format_structure)))
            .replace("{{seo}}", &section(data.seo.as_ref().map(format_seo)))
            .replace(
                "{{performance}}",
                &section(data.performance.as_ref().map(format_performance)),
            )
    }

    /// Renders the report and writes it to `output_path`
    ///
    /// Parent directories are created when missing.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Successfully wrote the report
    /// * `Err(ReportError)` - Failed to write the report
    pub fn generate(&self, data: &ReportData, output_path: &Path) -> ReportResult<()> {
        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        fs::write(output_path, self.render(data))?;
        Ok(())
    }
}

fn check_placeholders(template: &str) -> Result<(), String> {
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        let after = &rest[start + 2..];
        let end = after
            .find("}}")
            .ok_or_else(|| "unterminated placeholder".to_string())?;
        let name = &after[..end];
        if !PLACEHOLDERS.contains(&name) {
            return Err(format!("unknown placeholder '{{{{{}}}}}'", name));
        }
        rest = &after[end + 2..];
    }
    Ok(())
}

fn push_url_list(md: &mut String, heading: &str, urls: &[String]) {
    if urls.is_empty() {
        return;
    }
    md.push_str(&format!("**{}** ({})\n\n", heading, urls.len()));
    for url in urls {
        md.push_str(&format!("- {}\n", url));
    }
    md.push('\n');
}

/// Formats the structure section
pub fn format_structure(report: &StructureReport) -> String {
    let mut md = String::new();

    md.push_str(&format!("- **Total Pages**: {}\n", report.total_pages));
    md.push_str(&format!("- **Internal Links**: {}\n", report.internal_links));
    md.push_str(&format!("- **External Links**: {}\n\n", report.external_links));

    if !report.status_codes.is_empty() {
        md.push_str("| Status | Pages |\n");
        md.push_str("|--------|-------|\n");
        for (status, count) in &report.status_codes {
            md.push_str(&format!("| {} | {} |\n", status, count));
        }
        md.push('\n');
    }

    if !report.depth_distribution.is_empty() {
        md.push_str("| Depth | Pages |\n");
        md.push_str("|-------|-------|\n");
        for (depth, count) in &report.depth_distribution {
            md.push_str(&format!("| {} | {} |\n", depth, count));
        }
        md.push('\n');
    }

    if !report.top_linked_pages.is_empty() {
        md.push_str("**Most Linked Pages**\n\n");
        md.push_str("| URL | Linking Pages |\n");
        md.push_str("|-----|---------------|\n");
        for (url, count) in &report.top_linked_pages {
            md.push_str(&format!("| {} | {} |\n", url, count));
        }
        md.push('\n');
    }

    push_url_list(&mut md, "Pages Without Inbound Links", &report.orphan_pages);

    md.trim_end().to_string()
}

/// Formats the SEO section
pub fn format_seo(report: &SeoReport) -> String {
    let mut md = String::new();

    if !report.keywords.is_empty() {
        md.push_str("| Keyword | Pages | Titles | Descriptions | Headings | Occurrences |\n");
        md.push_str("|---------|-------|--------|--------------|----------|-------------|\n");
        for kw in &report.keywords {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} |\n",
                kw.keyword,
                kw.pages_with_keyword,
                kw.in_titles,
                kw.in_descriptions,
                kw.in_headings,
                kw.total_occurrences
            ));
        }
        md.push('\n');
    }

    md.push_str(&format!(
        "- **Pages With Metadata Issues**: {}\n\n",
        report.pages_with_issues()
    ));

    push_url_list(&mut md, "Missing Title", &report.missing_title);
    push_url_list(&mut md, "Missing Meta Description", &report.missing_description);
    push_url_list(&mut md, "Missing H1", &report.missing_h1);

    if !report.long_titles.is_empty() {
        md.push_str(&format!("**Titles Over {} Characters**\n\n", MAX_TITLE_LENGTH));
        for (url, length) in &report.long_titles {
            md.push_str(&format!("- {} ({})\n", url, length));
        }
        md.push('\n');
    }

    if !report.long_descriptions.is_empty() {
        md.push_str(&format!(
            "**Descriptions Over {} Characters**\n\n",
            MAX_DESCRIPTION_LENGTH
        ));
        for (url, length) in &report.long_descriptions {
            md.push_str(&format!("- {} ({})\n", url, length));
        }
        md.push('\n');
    }

    if !report.duplicate_titles.is_empty() {
        md.push_str("**Duplicate Titles**\n\n");
        for (title, urls) in &report.duplicate_titles {
            md.push_str(&format!("- \"{}\": {}\n", title, urls.join(", ")));
        }
        md.push('\n');
    }

    md.trim_end().to_string()
}

/// Formats the performance section
pub fn format_performance(report: &PerformanceReport) -> String {
    let mut md = String::new();

    md.push_str(&format!(
        "- **Average Response Time**: {:.0} ms\n",
        report.avg_response_time_ms
    ));
    md.push_str(&format!(
        "- **Slowest Response**: {} ms\n",
        report.max_response_time_ms
    ));
    md.push_str(&format!(
        "- **Average Page Size**: {:.1} KB\n",
        report.avg_page_size / 1024.0
    ));
    md.push_str(&format!(
        "- **Largest Page**: {:.1} KB\n",
        report.max_page_size as f64 / 1024.0
    ));
    md.push_str(&format!(
        "- **Average Resource Requests**: {:.1}\n",
        report.avg_resource_requests
    ));
    md.push_str(&format!(
        "- **Mobile-Friendly Pages**: {}\n\n",
        report.mobile_friendly_pages
    ));

    if !report.slowest_pages.is_empty() {
        md.push_str("| URL | Response Time (ms) |\n");
        md.push_str("|-----|--------------------|\n");
        for (url, ms) in &report.slowest_pages {
            md.push_str(&format!("| {} | {} |\n", url, ms));
        }
        md.push('\n');
    }

    push_url_list(&mut md, "Pages Without Viewport Meta", &report.pages_without_viewport);

    md.trim_end().to_string()
}
