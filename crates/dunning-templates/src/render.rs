//! Placeholder rendering.
//!
//! Placeholders are `{{name}}` where `name` contains no braces. Rendering
//! locates every placeholder in the input first and substitutes in one pass,
//! so a value that itself looks like `{{other}}` is emitted verbatim rather
//! than expanded again.

use crate::model::{RenderedMessage, Template, STANDARD_VARIABLES};
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::OnceLock;

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER_REGEX.get_or_init(|| Regex::new(r"\{\{([^{}]*)\}\}").expect("valid regex"))
}

/// Substitutes `{{name}}` placeholders in `body` with values from `variables`.
///
/// Every occurrence of a known name is replaced. Unknown names are left as
/// literal `{{name}}`. No escaping is applied to values.
#[must_use]
pub fn render_template(body: &str, variables: &HashMap<String, String>) -> String {
    if variables.is_empty() {
        return body.to_string();
    }

    placeholder_regex()
        .replace_all(body, |caps: &Captures<'_>| match variables.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Renders subject and body of `template` against `variables`.
#[must_use]
pub fn render_message(template: &Template, variables: &HashMap<String, String>) -> RenderedMessage {
    RenderedMessage {
        channel: template.channel,
        subject: template
            .subject
            .as_deref()
            .map(|subject| render_template(subject, variables)),
        body: render_template(&template.body, variables),
    }
}

/// Distinct placeholder names in `text`, in order of first appearance.
#[must_use]
pub fn placeholders(text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in placeholder_regex().captures_iter(text) {
        let name = &caps[1];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Placeholders used in the subject or body that are neither declared by the
/// template nor part of the standard set.
#[must_use]
pub fn undeclared_placeholders(template: &Template) -> Vec<String> {
    let mut used = template
        .subject
        .as_deref()
        .map(placeholders)
        .unwrap_or_default();
    for name in placeholders(&template.body) {
        if !used.contains(&name) {
            used.push(name);
        }
    }

    used.into_iter()
        .filter(|name| {
            !STANDARD_VARIABLES.contains(&name.as_str()) && !template.variables.contains(name)
        })
        .collect()
}
