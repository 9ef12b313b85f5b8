//! HTML report rendering.
//!
//! The page layout lives in `templates/report.html` and is embedded at
//! compile time. Placeholders are substituted in a single pass, so text
//! coming from the record can never inject another placeholder.

use crate::research::ResearchRecord;

const REPORT_TEMPLATE: &str = include_str!("templates/report.html");

/// Renders a record as a standalone HTML page.
///
/// Template placeholders:
/// - `{{LANG}}` - record language tag
/// - `{{TITLE}}` - the query
/// - `{{GENERATED}}` - creation timestamp
/// - `{{METADATA}}` - `<li>` items for id, language, provider and model
/// - `{{CONTENT}}` - the response converted from Markdown
/// - `{{SOURCES}}` - sources block, empty when there are none
pub(super) fn render(record: &ResearchRecord) -> String {
    fill_template(REPORT_TEMPLATE, |key| match key {
        "LANG" => Some(html_escape(&record.language)),
        "TITLE" => Some(html_escape(record.query.trim())),
        "GENERATED" => Some(record.created_at.format("%Y-%m-%d %H:%M:%S UTC").to_string()),
        "METADATA" => Some(metadata_items(record)),
        "CONTENT" => Some(markdown_to_html(&record.response)),
        "SOURCES" => Some(sources_block(record)),
        _ => None,
    })
}

fn metadata_items(record: &ResearchRecord) -> String {
    let mut items = vec![
        ("ID", record.id.as_str()),
        ("Language", record.language.as_str()),
    ];
    if let Some(provider) = &record.provider {
        items.push(("Provider", provider.as_str()));
    }
    if let Some(model) = &record.model {
        items.push(("Model", model.as_str()));
    }

    items
        .into_iter()
        .map(|(key, value)| {
            format!(
                "                <li><strong>{}:</strong> {}</li>",
                key,
                html_escape(value)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn sources_block(record: &ResearchRecord) -> String {
    if record.sources.is_empty() {
        return String::new();
    }

    let mut block = String::from("        <div class=\"sources\">\n            <h2>Sources</h2>\n            <ol>\n");
    for source in &record.sources {
        block.push_str(&format!(
            "                <li><a href=\"{}\">{}</a></li>\n",
            html_escape(&source.url),
            html_escape(source.display_title())
        ));
    }
    block.push_str("            </ol>\n        </div>");
    block
}

/// Replaces `{{KEY}}` placeholders; unknown keys are left as-is.
fn fill_template<F>(template: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };

        let key = &after[..end];
        match lookup(key) {
            Some(value) => out.push_str(&value),
            None => {
                out.push_str("{{");
                out.push_str(key);
                out.push_str("}}");
            }
        }
        rest = &after[end + 2..];
    }

    out.push_str(rest);
    out
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Unordered,
    Ordered,
}

impl ListKind {
    fn tag(self) -> &'static str {
        match self {
            ListKind::Unordered => "ul",
            ListKind::Ordered => "ol",
        }
    }
}

/// Accumulates block-level HTML while walking Markdown lines.
#[derive(Default)]
struct BlockWriter {
    out: Vec<String>,
    paragraph: Vec<String>,
    list: Option<(ListKind, Vec<String>)>,
}

impl BlockWriter {
    fn flush_paragraph(&mut self) {
        if !self.paragraph.is_empty() {
            self.out.push(format!("<p>{}</p>", self.paragraph.join("<br>\n")));
            self.paragraph.clear();
        }
    }

    fn flush_list(&mut self) {
        if let Some((kind, items)) = self.list.take() {
            self.out.push(format!("<{}>", kind.tag()));
            for item in items {
                self.out.push(format!("<li>{item}</li>"));
            }
            self.out.push(format!("</{}>", kind.tag()));
        }
    }

    fn flush(&mut self) {
        self.flush_paragraph();
        self.flush_list();
    }

    fn list_item(&mut self, kind: ListKind, item: String) {
        self.flush_paragraph();
        if matches!(&self.list, Some((current, _)) if *current != kind) {
            self.flush_list();
        }
        self.list.get_or_insert_with(|| (kind, Vec::new())).1.push(item);
    }
}

/// Converts the small Markdown subset LLM reports use into HTML.
///
/// Handles ATX headings, `-`/`*` and numbered lists, paragraphs,
/// `**bold**` and `` `code` ``. Everything is escaped first.
fn markdown_to_html(text: &str) -> String {
    let mut writer = BlockWriter::default();

    for line in text.lines() {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            writer.flush();
            continue;
        }

        if let Some((level, heading)) = heading(trimmed) {
            writer.flush();
            writer
                .out
                .push(format!("<h{level}>{}</h{level}>", inline(heading)));
            continue;
        }

        if let Some(item) = trimmed.strip_prefix("- ").or_else(|| trimmed.strip_prefix("* ")) {
            writer.list_item(ListKind::Unordered, inline(item));
            continue;
        }

        if let Some(item) = ordered_item(trimmed) {
            writer.list_item(ListKind::Ordered, inline(item));
            continue;
        }

        writer.flush_list();
        writer.paragraph.push(inline(trimmed));
    }

    writer.flush();
    writer.out.join("\n")
}

fn heading(line: &str) -> Option<(usize, &str)> {
    let level = line.chars().take_while(|c| *c == '#').count();
    if !(1..=6).contains(&level) {
        return None;
    }
    line[level..].strip_prefix(' ').map(|rest| (level, rest.trim()))
}

fn ordered_item(line: &str) -> Option<&str> {
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    line[digits..].strip_prefix(". ")
}

fn inline(text: &str) -> String {
    let escaped = html_escape(text);
    let with_code = replace_pairs(&escaped, "`", "<code>", "</code>");
    replace_pairs(&with_code, "**", "<strong>", "</strong>")
}

/// Wraps text between paired markers; an unpaired trailing marker is kept.
fn replace_pairs(text: &str, marker: &str, open: &str, close: &str) -> String {
    let parts: Vec<&str> = text.split(marker).collect();
    let paired = if parts.len() % 2 == 1 {
        parts.len()
    } else {
        parts.len() - 1
    };

    let mut out = String::with_capacity(text.len());
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            if i < paired {
                out.push_str(if i % 2 == 1 { open } else { close });
            } else {
                out.push_str(marker);
            }
        }
        out.push_str(part);
    }
    out
}

/// Escape HTML special characters.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
