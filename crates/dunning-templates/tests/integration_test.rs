//! Integration tests for the built-in template catalogue
//!
//! Renders every seeded template and checks the variable lists an editor
//! would be offered.

use dunning_core::{Channel, TemplateId};
use dunning_templates::{
    available_variables, available_variables_for, placeholders, render_message, search_variables,
    undeclared_placeholders, TemplateLookup, TemplateStore, STANDARD_VARIABLES,
};
use std::collections::HashMap;

fn values() -> HashMap<String, String> {
    HashMap::from([
        ("name".to_string(), "John Doe".to_string()),
        ("amount".to_string(), "$100".to_string()),
        ("dueDate".to_string(), "2023-01-30".to_string()),
    ])
}

#[test]
fn test_every_default_template_renders_completely() {
    let store = TemplateStore::with_defaults();
    for template in store.list(None) {
        let message = render_message(&template, &values());
        assert!(
            placeholders(&message.body).is_empty(),
            "template {} left placeholders in {:?}",
            template.id,
            message.body
        );
        assert!(message.body.contains("John Doe"));
        assert_eq!(message.channel, template.channel);
        assert_eq!(message.subject.is_some(), template.channel == Channel::Email);
    }
}

#[test]
fn test_default_templates_declare_their_placeholders() {
    let store = TemplateStore::with_defaults();
    for template in store.list(None) {
        assert!(
            undeclared_placeholders(&template).is_empty(),
            "template {} uses undeclared placeholders",
            template.id
        );
    }
}

#[test]
fn test_variable_menu_for_reminder() {
    let store = TemplateStore::with_defaults();
    let reminder = store
        .lookup(&TemplateId::new("1").unwrap())
        .expect("template 1 seeded");

    let available = available_variables(&reminder);
    assert_eq!(&available[..4], &STANDARD_VARIABLES.map(String::from)[..]);
    assert_eq!(&available[4..], &["name", "amount", "dueDate"]);

    assert_eq!(search_variables(&available, "DUE"), vec!["amount_due", "due_date", "dueDate"]);
    assert_eq!(available_variables_for(None).len(), 4);
}

#[test]
fn test_partial_values_leave_placeholders() {
    let store = TemplateStore::with_defaults();
    let sms = store.get(&TemplateId::new("4").unwrap()).unwrap();
    let mut vars = values();
    vars.remove("dueDate");

    let message = render_message(&sms, &vars);
    assert_eq!(
        message.body,
        "Hi John Doe, reminder: payment of $100 due on {{dueDate}}."
    );
}
