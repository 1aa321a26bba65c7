//! Command handlers.

use crate::cli::Commands;
use crate::state::AppState;
use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use dunning_core::{Channel, NotificationId, Priority, TemplateId, Timestamp, TriggerType};
use dunning_delivery::{format_recipient, to_mailto_url, OutboundMessage};
use dunning_queue::{
    compose, group_sent_by_day, group_sent_by_day_local, resolve_channel, ChannelFilter,
    ComposeOptions, DayGroup, Notification, StatusFilter,
};
use dunning_templates::{available_variables, render_message, search_variables, Template};
use std::collections::HashMap;
use tracing::{debug, info};

/// Output style for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Plain,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Self {
        if s == "json" {
            Self::Json
        } else {
            Self::Plain
        }
    }
}

pub async fn run(state: &AppState, command: Commands, format: OutputFormat) -> Result<()> {
    match command {
        Commands::Templates { channel } => {
            let channel = channel.map(|c| c.parse::<Channel>()).transpose()?;
            list_templates(state, channel, format)
        }
        Commands::Variables {
            template_id,
            search,
        } => show_variables(state, &template_id, search.as_deref(), format),
        Commands::Render { template_id, vars } => render(state, &template_id, &vars, format),
        Commands::Queue { status, channel } => {
            let status: StatusFilter = status.parse()?;
            let channel: ChannelFilter = channel.parse()?;
            show_queue(state, status, channel, format)
        }
        Commands::History { channel } => {
            let channel: ChannelFilter = channel.parse()?;
            show_history(state, channel, format)
        }
        Commands::Compose {
            template_id,
            recipients,
            priority,
            schedule,
            vars,
            send,
        } => {
            let options = ComposeOptions {
                priority: priority.parse::<Priority>()?,
                trigger_type: TriggerType::Manual,
                scheduled_at: schedule
                    .as_deref()
                    .map(Timestamp::from_rfc3339)
                    .transpose()?,
                variables: parse_vars(&vars)?,
            };
            compose_notifications(state, &template_id, &recipients, &options, send, format).await
        }
        Commands::Preview { notification_id } => {
            let id = NotificationId::new(notification_id)?;
            show_preview(state, &id, format)
        }
        Commands::Send { notification_id } => {
            let id = NotificationId::new(notification_id)?;
            let sent = state.outbox.send_now(&id).await?;
            print_notifications(state, &[sent], format)
        }
        Commands::Delete { notification_id } => {
            let id = NotificationId::new(notification_id)?;
            state
                .notifications
                .remove(&id)
                .ok_or_else(|| anyhow!("notification not found: {id}"))?;
            info!(notification_id = %id, "notification deleted");
            println!("Deleted {id}");
            Ok(())
        }
        Commands::Settings => show_settings(state, format),
    }
}

/// Parse repeated `NAME=VALUE` arguments into a variable map.
///
/// A later binding for the same name wins.
pub fn parse_vars(pairs: &[String]) -> Result<HashMap<String, String>> {
    let mut vars = HashMap::with_capacity(pairs.len());
    for pair in pairs {
        let (name, value) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("expected NAME=VALUE, got '{pair}'"))?;
        let name = name.trim();
        if name.is_empty() {
            bail!("variable name is empty in '{pair}'");
        }
        vars.insert(name.to_string(), value.to_string());
    }
    Ok(vars)
}

fn find_template(state: &AppState, template_id: &str) -> Result<Template> {
    let id = TemplateId::new(template_id)?;
    state
        .templates
        .get(&id)
        .ok_or_else(|| anyhow!("template not found: {id}"))
}

fn list_templates(state: &AppState, channel: Option<Channel>, format: OutputFormat) -> Result<()> {
    let templates = state.templates.list(channel);
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&templates)?);
        return Ok(());
    }

    for template in &templates {
        println!(
            "{:<4} {:<6} {}",
            template.id.as_str(),
            template.channel.display_name(),
            template.name
        );
    }
    Ok(())
}

fn show_variables(
    state: &AppState,
    template_id: &str,
    search: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let template = find_template(state, template_id)?;
    let available = available_variables(&template);
    let names: Vec<&str> = match search {
        Some(term) => search_variables(&available, term),
        None => available.iter().map(String::as_str).collect(),
    };

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&names)?);
    } else {
        for name in names {
            println!("{{{{{name}}}}}");
        }
    }
    Ok(())
}

fn render(state: &AppState, template_id: &str, vars: &[String], format: OutputFormat) -> Result<()> {
    let template = find_template(state, template_id)?;
    let variables = parse_vars(vars)?;
    let message = render_message(&template, &variables);

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&message)?);
        return Ok(());
    }

    if let Some(subject) = &message.subject {
        println!("Subject: {subject}");
        println!();
    }
    println!("{}", message.body);
    Ok(())
}

fn show_queue(
    state: &AppState,
    status: StatusFilter,
    channel: ChannelFilter,
    format: OutputFormat,
) -> Result<()> {
    let notifications = state
        .notifications
        .filtered(status, channel, &state.templates);
    debug!(%status, %channel, shown = notifications.len(), "queue filtered");
    print_notifications(state, &notifications, format)
}

fn show_history(state: &AppState, channel: ChannelFilter, format: OutputFormat) -> Result<()> {
    let sent = state
        .notifications
        .filtered(StatusFilter::All, channel, &state.templates);
    let groups: Vec<DayGroup> = match state.config.general.history_timezone.as_str() {
        "utc" => group_sent_by_day(&sent, &Utc),
        _ => group_sent_by_day_local(&sent),
    };

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&groups)?);
        return Ok(());
    }

    if groups.is_empty() {
        println!("No sent notifications");
        return Ok(());
    }
    for group in &groups {
        println!("{}", group.date.format("%A, %B %-d, %Y"));
        for notification in &group.notifications {
            println!("  {}", summary_line(state, notification));
        }
    }
    Ok(())
}

/// The outbound message for `id`, and its `mailto:` link when it is an email.
pub fn preview(state: &AppState, id: &NotificationId) -> Result<(OutboundMessage, Option<String>)> {
    let notification = state
        .notifications
        .get(id)
        .ok_or_else(|| anyhow!("notification not found: {id}"))?;
    let message = state.outbox.prepare(&notification).ok_or_else(|| {
        anyhow!(
            "template {} for notification {id} no longer exists",
            notification.template_id
        )
    })?;
    let mailto = (message.channel == Channel::Email).then(|| to_mailto_url(&message));
    Ok((message, mailto))
}

fn show_preview(state: &AppState, id: &NotificationId, format: OutputFormat) -> Result<()> {
    let (message, mailto) = preview(state, id)?;
    if format == OutputFormat::Json {
        let value = serde_json::json!({
            "message": message,
            "mailto": mailto,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("To: {}", format_recipient(&message.to, message.channel));
    if let Some(subject) = &message.subject {
        println!("Subject: {subject}");
    }
    println!();
    println!("{}", message.body);
    if let Some(url) = mailto {
        println!();
        println!("{url}");
    }
    Ok(())
}

async fn compose_notifications(
    state: &AppState,
    template_id: &str,
    recipient_ids: &[String],
    options: &ComposeOptions,
    send: bool,
    format: OutputFormat,
) -> Result<()> {
    let template = find_template(state, template_id)?;
    let recipients = recipient_ids
        .iter()
        .map(|id| {
            state
                .recipient(id)
                .cloned()
                .ok_or_else(|| anyhow!("unknown recipient: {id}"))
        })
        .collect::<Result<Vec<_>>>()?;

    let composed = compose(&template, &recipients, options)?;
    let ids: Vec<NotificationId> = composed.iter().map(|n| n.id.clone()).collect();
    state
        .notifications
        .insert_all(composed)
        .context("failed to queue notifications")?;
    info!(template_id = %template.id, count = ids.len(), "notifications composed");

    if send {
        for result in state.outbox.send_all(&ids).await {
            if let Err(e) = result {
                eprintln!("Send failed: {e}");
            }
        }
    }

    let queued: Vec<Notification> = ids
        .iter()
        .filter_map(|id| state.notifications.get(id))
        .collect();
    print_notifications(state, &queued, format)
}

fn show_settings(state: &AppState, format: OutputFormat) -> Result<()> {
    let config = &state.config;
    if format == OutputFormat::Json {
        let value = serde_json::json!({
            "config": config,
            "email_configured": config.email.is_configured(),
            "sms_configured": config.sms.is_configured(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let configured = |yes: bool| if yes { "configured" } else { "not configured" };
    println!(
        "Email: {} ({})",
        config.email.service_provider,
        configured(config.email.is_configured())
    );
    println!(
        "  from: {} <{}>",
        config.email.from_name, config.email.from_email
    );
    println!(
        "SMS:   {} ({})",
        config.sms.service_provider,
        configured(config.sms.is_configured())
    );
    println!("  from: {}", config.sms.from_number);
    println!(
        "Delivery: simulated, {} ms delay{}",
        config.delivery.simulated_delay_ms,
        if config.delivery.simulate_failure {
            ", always failing"
        } else {
            ""
        }
    );
    println!("History days: {}", config.general.history_timezone);
    Ok(())
}

fn print_notifications(
    state: &AppState,
    notifications: &[Notification],
    format: OutputFormat,
) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(notifications)?);
        return Ok(());
    }

    if notifications.is_empty() {
        println!("No notifications found");
    }
    for notification in notifications {
        println!("{}", summary_line(state, notification));
    }
    Ok(())
}

fn summary_line(state: &AppState, notification: &Notification) -> String {
    let channel = resolve_channel(notification, &state.templates);
    let when = notification
        .sent_at
        .or(notification.scheduled_at)
        .map_or_else(
            || "-".to_string(),
            |t| t.as_datetime().format("%Y-%m-%d %H:%M").to_string(),
        );

    format!(
        "{:<10} {:<9} {:<5} {:<6} {:<16} {:<28} {}",
        truncate_id(&notification.id),
        notification.status.as_str(),
        channel.display_name(),
        notification.priority.as_str(),
        when,
        notification.template_label(&state.templates),
        format_recipient(&notification.recipient, channel)
    )
}

fn truncate_id(id: &NotificationId) -> &str {
    let s = id.as_str();
    s.get(..8).unwrap_or(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vars() {
        let vars = parse_vars(&[
            "borrower_name=Jane Smith".to_string(),
            "amount_due=$200".to_string(),
            "note=a=b".to_string(),
        ])
        .unwrap();
        assert_eq!(vars["borrower_name"], "Jane Smith");
        assert_eq!(vars["amount_due"], "$200");
        assert_eq!(vars["note"], "a=b");
    }

    #[test]
    fn test_parse_vars_rejects_malformed() {
        assert!(parse_vars(&["borrower_name".to_string()]).is_err());
        assert!(parse_vars(&["=value".to_string()]).is_err());
    }

    #[test]
    fn test_parse_vars_last_wins() {
        let vars = parse_vars(&["a=1".to_string(), "a=2".to_string()]).unwrap();
        assert_eq!(vars["a"], "2");
    }

    fn state() -> AppState {
        AppState::new(dunning_core::AppConfig::default())
    }

    #[test]
    fn test_preview_email_has_mailto() {
        let state = state();
        let (message, mailto) = preview(&state, &NotificationId::new("1").unwrap()).unwrap();
        assert_eq!(message.channel, Channel::Email);
        assert_eq!(message.subject.as_deref(), Some("Your payment is due soon"));
        let url = mailto.unwrap();
        assert!(url.starts_with("mailto:user@example.com?subject=Your%20payment%20is%20due%20soon"));
        assert!(url.contains("John%20Doe"));
    }

    #[test]
    fn test_preview_sms_has_no_mailto() {
        let state = state();
        let (message, mailto) = preview(&state, &NotificationId::new("2").unwrap()).unwrap();
        assert_eq!(message.channel, Channel::Sms);
        assert!(message.subject.is_none());
        assert!(mailto.is_none());
    }

    #[test]
    fn test_preview_missing_template_or_notification() {
        let state = state();
        assert!(state.templates.remove(&TemplateId::new("4").unwrap()).is_some());
        assert!(preview(&state, &NotificationId::new("2").unwrap()).is_err());
        assert!(preview(&state, &NotificationId::new("404").unwrap()).is_err());
    }

    #[test]
    fn test_output_format() {
        assert_eq!(OutputFormat::parse("json"), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("plain"), OutputFormat::Plain);
    }

    #[test]
    fn test_truncate_id() {
        let short = NotificationId::new("2").unwrap();
        assert_eq!(truncate_id(&short), "2");
        let long = NotificationId::new("abcdef0123456789").unwrap();
        assert_eq!(truncate_id(&long), "abcdef01");
    }
}
