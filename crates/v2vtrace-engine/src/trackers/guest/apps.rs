//! Installed-application records.
//!
//! Records look like `[0] = {app2_name: firefox, app2_version: 115.3.1, ...}`. Values are free
//! text and may contain commas, so fields are delimited by the positions of the `app2_` names.

use regex::Regex;
use std::sync::LazyLock;
use v2vtrace_types::Application;

static RECORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[(\d+)\]\s*=\s*\{").unwrap());

static FIELD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"app2_([a-z_0-9]+):\s?").unwrap());

pub fn parse_apps(text: &str) -> Vec<Application> {
    let starts: Vec<_> = RECORD.find_iter(text).map(|m| (m.start(), m.end())).collect();

    starts
        .iter()
        .enumerate()
        .filter_map(|(i, &(_, body_start))| {
            let body_end = starts.get(i + 1).map_or(text.len(), |&(next, _)| next);
            parse_record(&text[body_start..body_end])
        })
        .collect()
}

fn parse_record(body: &str) -> Option<Application> {
    let fields: Vec<_> = FIELD.captures_iter(body).collect();
    let mut app = Application::default();

    for (i, caps) in fields.iter().enumerate() {
        let (Some(whole), Some(key)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let value_end = fields
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map_or(body.len(), |m| m.start());
        let value = trim_value(&body[whole.end()..value_end]);
        if value.is_empty() {
            continue;
        }

        let value = value.to_string();
        match key.as_str() {
            "name" => app.name = value,
            "display_name" => app.display_name = Some(value),
            "version" => app.version = Some(value),
            "release" => app.release = Some(value),
            "arch" => app.arch = Some(value),
            "publisher" => app.publisher = Some(value),
            "install_path" => app.install_path = Some(value),
            other => {
                app.extra.insert(other.to_string(), value);
            }
        }
    }

    (!app.name.is_empty()).then_some(app)
}

/// Strip separators and the closing brackets of the enclosing record, keeping balanced ones
/// that belong to the value (`{90150000-008C}`).
fn trim_value(raw: &str) -> &str {
    let mut value = raw.trim().trim_end_matches(',').trim_end();
    loop {
        let unbalanced = |open: char, close: char| {
            value.ends_with(close) && value.matches(close).count() > value.matches(open).count()
        };
        if unbalanced('{', '}') || unbalanced('[', ']') {
            value = value[..value.len() - 1].trim_end().trim_end_matches(',').trim_end();
        } else {
            return value;
        }
    }
}
