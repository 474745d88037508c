use crate::components::google_calendar::time::{format_date, format_time};
use crate::components::google_calendar::CalendarEvent;
use chrono_tz::Tz;

/// Shown when an event has no description
pub const NO_DESCRIPTION: &str = "No description available.";

/// Tags whose text content is dropped entirely
const DROPPED_ELEMENTS: [&str; 2] = ["script", "style"];

/// Tags that end a line of text
const LINE_BREAK_TAGS: [&str; 8] = ["br", "/p", "/div", "/li", "/h1", "/h2", "/h3", "/tr"];

/// Read-only projection of one event for the detail overlay.
///
/// `description` is plain text. Markup from the provider has already been
/// reduced to text here and must still be escaped when rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDetail {
    pub id: String,
    pub title: String,
    pub date: String,
    pub time: String,
    pub category: &'static str,
    pub description: String,
}

impl EventDetail {
    pub fn from_event(event: &CalendarEvent, tz: &Tz) -> Self {
        let description = event
            .description
            .as_deref()
            .map(sanitize_description)
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| NO_DESCRIPTION.to_string());

        Self {
            id: event.id.clone(),
            title: event.title.clone(),
            date: format_date(&event.start, tz),
            time: format_time(&event.start, tz),
            category: event.category.as_str(),
            description,
        }
    }
}

/// Reduce an untrusted HTML fragment to plain text
pub fn sanitize_description(raw: &str) -> String {
    let mut text = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(open) = rest.find('<') {
        text.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        // A '<' not followed by a tag name is plain text
        if !after.starts_with(|c: char| c.is_ascii_alphabetic() || c == '/' || c == '!') {
            text.push('<');
            rest = after;
            continue;
        }

        let Some(close) = after.find('>') else {
            // Unterminated tag: drop the remainder
            rest = "";
            break;
        };

        let name = tag_name(&after[..close]);
        rest = &after[close + 1..];

        if let Some(element) = DROPPED_ELEMENTS.iter().find(|e| **e == name) {
            rest = skip_past_closing(rest, element);
            continue;
        }
        if LINE_BREAK_TAGS.contains(&name.as_str()) {
            text.push('\n');
        }
    }
    text.push_str(rest);

    collapse_blank_lines(&decode_entities(&text))
}

/// Lowercase tag name, keeping a leading `/` for closing tags
fn tag_name(inner: &str) -> String {
    let inner = inner.trim_start();
    let (prefix, body) = match inner.strip_prefix('/') {
        Some(body) => ("/", body.trim_start()),
        None => ("", inner),
    };
    let name: String = body
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect();
    format!("{}{}", prefix, name.to_ascii_lowercase())
}

fn skip_past_closing<'a>(rest: &'a str, element: &str) -> &'a str {
    let closing = format!("</{}", element);
    let lower = rest.to_ascii_lowercase();
    match lower.find(&closing) {
        Some(pos) => match rest[pos..].find('>') {
            Some(end) => &rest[pos + end + 1..],
            None => "",
        },
        None => "",
    }
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}

fn collapse_blank_lines(text: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    let mut blank_run = 0;

    for line in text.lines().map(str::trim_end) {
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        lines.push(line);
    }

    lines.join("\n").trim().to_string()
}
