use crate::research::ResearchRecord;

/// Renders a record as a Markdown report.
pub(super) fn render(record: &ResearchRecord) -> String {
    let mut md = String::new();

    md.push_str(&format!("# {}\n\n", record.query.trim()));
    md.push_str(&format!(
        "*Generated: {}*\n\n",
        record.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    md.push_str("## Metadata\n\n");
    md.push_str(&format!("- **ID**: {}\n", record.id));
    md.push_str(&format!("- **Language**: {}\n", record.language));
    if let Some(provider) = &record.provider {
        md.push_str(&format!("- **Provider**: {}\n", provider));
    }
    if let Some(model) = &record.model {
        md.push_str(&format!("- **Model**: {}\n", model));
    }
    md.push_str("\n---\n\n");

    md.push_str(record.response.trim());
    md.push_str("\n");

    if !record.sources.is_empty() {
        md.push_str("\n## Sources\n\n");
        for (i, source) in record.sources.iter().enumerate() {
            md.push_str(&format!("{}. [{}]({})\n", i + 1, source.display_title(), source.url));
        }
    }

    md
}
