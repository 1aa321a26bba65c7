//! Variable suggestions for the message editor.

use crate::model::{Template, STANDARD_VARIABLES};

/// Names that can be inserted into `template`: the standard set in its fixed
/// order, then the template's declared variables, first occurrence wins.
#[must_use]
pub fn available_variables(template: &Template) -> Vec<String> {
    available_variables_for(Some(template))
}

/// Like [`available_variables`], but tolerates a missing template (stale
/// reference), in which case only the standard set is offered.
#[must_use]
pub fn available_variables_for(template: Option<&Template>) -> Vec<String> {
    let declared = template.map(|t| t.variables.as_slice()).unwrap_or_default();

    let mut names: Vec<String> = Vec::with_capacity(STANDARD_VARIABLES.len() + declared.len());
    for name in STANDARD_VARIABLES
        .iter()
        .copied()
        .chain(declared.iter().map(String::as_str))
    {
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Case-insensitive substring search over `available`, order preserved.
#[must_use]
pub fn search_variables<'a>(available: &'a [String], term: &str) -> Vec<&'a str> {
    let needle = term.to_lowercase();
    available
        .iter()
        .filter(|name| name.to_lowercase().contains(&needle))
        .map(String::as_str)
        .collect()
}
