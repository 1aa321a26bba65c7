use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dunning")]
#[command(about = "Compose, queue and review email/SMS collection notices", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to the XDG config path)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, value_parser = ["plain", "json"], default_value = "plain", global = true)]
    pub format: String,

    /// Log verbosity (overridden by `RUST_LOG`)
    #[arg(long, value_parser = ["error", "warn", "info", "debug", "trace"], global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List message templates
    Templates {
        #[arg(long, value_parser = ["email", "sms"])]
        channel: Option<String>,
    },

    /// Show the variables that can be inserted into a template
    Variables {
        template_id: String,

        /// Only names containing this text (case-insensitive)
        #[arg(long)]
        search: Option<String>,
    },

    /// Render a template with the given variable values
    Render {
        template_id: String,

        /// Variable binding, repeatable: --var borrower_name=Jane
        #[arg(long = "var", value_name = "NAME=VALUE")]
        vars: Vec<String>,
    },

    /// Show the notification queue
    Queue {
        #[arg(long, default_value = "all")]
        status: String,

        #[arg(long, default_value = "all")]
        channel: String,
    },

    /// Show sent notifications grouped by day
    History {
        #[arg(long, default_value = "all")]
        channel: String,
    },

    /// Create notifications from a template for one or more recipients
    Compose {
        template_id: String,

        /// Recipient ID from the borrower directory, repeatable
        #[arg(long = "to", required = true)]
        recipients: Vec<String>,

        #[arg(long, value_parser = ["low", "medium", "high"], default_value = "medium")]
        priority: String,

        /// RFC3339 time to schedule for instead of leaving as a draft
        #[arg(long)]
        schedule: Option<String>,

        #[arg(long = "var", value_name = "NAME=VALUE")]
        vars: Vec<String>,

        /// Send immediately after composing
        #[arg(long)]
        send: bool,
    },

    /// Show the message a notification would be sent as, with a mailto link for email
    Preview { notification_id: String },

    /// Send a queued notification now
    Send { notification_id: String },

    /// Remove a notification from the queue
    Delete { notification_id: String },

    /// Show delivery service settings
    Settings,
}
