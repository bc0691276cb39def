//! Message templates.
//!
//! HTML bodies are rendered with `maud`, which escapes every interpolated
//! value. Plain-text bodies are assembled alongside so each message carries
//! both alternatives.

use chrono::{DateTime, SecondsFormat, Utc};
use maud::{Markup, html};

use crate::brief::IntakeBrief;

const FONT: &str = "font-family:Inter,system-ui,Segoe UI,Arial,sans-serif";

/// Subject and bodies of a message before addressing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMail {
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Owner notification for a new inquiry.
#[must_use]
pub fn inquiry_notification(inquirer: &str, received_at: DateTime<Utc>) -> RenderedMail {
    let time = received_at.to_rfc3339_opts(SecondsFormat::Millis, true);

    let markup: Markup = html! {
        h2 style={ "margin:0 0 10px;" (FONT) } { "New inquiry" }
        p style="margin:0 0 8px" { "Email: " b { (inquirer) } }
        p style="margin:0;color:#666" { "Time: " (time) }
    };

    RenderedMail {
        subject: format!("New inquiry — {inquirer}"),
        text: format!("A new inquiry was received.\n\nEmail: {inquirer}\nTime: {time}"),
        html: markup.into_string(),
    }
}

/// Auto-reply to the inquirer carrying the intake link.
#[must_use]
pub fn auto_reply(brand: &str, brief_url: &str) -> RenderedMail {
    let markup: Markup = html! {
        div style={ (FONT) ";line-height:1.5" } {
            p { "Thanks for reaching out to " b { (brand) } "!" }
            p { "Please complete a short brief so we can respond quickly:" }
            p {
                a href=(brief_url)
                    style="display:inline-block;background:#111;color:#fff;padding:10px 14px;border-radius:10px;text-decoration:none"
                    { "Open project brief" }
            }
            p style="color:#666;margin-top:10px" {
                "If the button doesn't open, copy/paste this URL:" br;
                a href=(brief_url) { (brief_url) }
            }
            p { "— " (brand) }
        }
    };

    RenderedMail {
        subject: "Thanks — tell us a bit about your project".to_owned(),
        text: format!(
            "Thanks for reaching out to {brand}!\n\n\
             Please complete a short brief so we can respond quickly:\n{brief_url}\n\n\
             If the link doesn't open, copy/paste it into your browser.\n\n— {brand}"
        ),
        html: markup.into_string(),
    }
}

/// Owner digest of a submitted intake brief, one table row per field.
#[must_use]
pub fn intake_digest(brief: &IntakeBrief) -> RenderedMail {
    let fields = brief.fields();

    let markup: Markup = html! {
        h2 style={ "margin:0 0 12px;" (FONT) } { "New brief" }
        table cellpadding="0" cellspacing="0"
            style={ (FONT) ";border-collapse:collapse;border:1px solid #eee;" } {
            @for (name, value) in &fields {
                tr {
                    td style="padding:6px 10px;" { b { (name) } }
                    td style="padding:6px 10px;" { (value.unwrap_or_default()) }
                }
            }
        }
    };

    let text = fields
        .iter()
        .map(|(name, value)| format!("{name}: {}", value.unwrap_or_default()))
        .collect::<Vec<_>>()
        .join("\n");

    RenderedMail {
        subject: brief.subject(),
        text,
        html: markup.into_string(),
    }
}
