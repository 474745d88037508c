use crate::components::google_calendar::CalendarEvent;

/// Suggested name for the downloaded file
pub const EXPORT_FILE_NAME: &str = "events.csv";

const HEADER: [&str; 3] = ["title", "start", "description"];

/// Serialize events as CSV: a header line, then one record per event in the given order
pub fn to_csv<'a, I>(events: I) -> String
where
    I: IntoIterator<Item = &'a CalendarEvent>,
{
    let mut out = String::new();
    push_record(&mut out, &HEADER);

    for event in events {
        let start = event.start.to_string();
        let description = event.description.as_deref().unwrap_or("");
        push_record(&mut out, &[event.title.as_str(), start.as_str(), description]);
    }

    out
}

fn push_record(out: &mut String, fields: &[&str]) {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        push_field(out, field);
    }
    out.push('\n');
}

/// Quote a field when it holds a delimiter, a quote or a line break (RFC 4180)
fn push_field(out: &mut String, field: &str) {
    if field.contains([',', '"', '\n', '\r']) {
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(field);
    }
}
