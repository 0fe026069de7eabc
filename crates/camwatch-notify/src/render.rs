//! HTML rendering for alert emails and webhooks.
//!
//! Pure functions of the history they are given; nothing here touches the
//! tracker or the network.

use std::fmt::Write;

use chrono::{DateTime, Local, Utc};

use camwatch_state::{HealthState, TransitionEvent};

/// Timestamp layout used in every alert, e.g. `16-10-2026 02:05:09PM`.
const TIMESTAMP_FORMAT: &str = "%d-%m-%Y %I:%M:%S%p";

const STYLE: &str = "table { border-collapse: collapse; width: 90%; } \
th, td { border: 1px solid black; padding: 8px; text-align: center; } \
th { background-color: #f2f2f2; }";

/// A rendered alert, ready for a notification channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertPayload {
    pub subject: String,
    pub html: String,
}

/// Render the alert for `event`, restating all of `history`.
pub fn render_alert(subject: &str, event: &TransitionEvent, history: &[TransitionEvent]) -> AlertPayload {
    let mut html = String::with_capacity(1024 + history.len() * 256);
    html.push_str("<html>\n<head>\n<style>");
    html.push_str(STYLE);
    html.push_str("</style>\n</head>\n<body>\n");
    let _ = writeln!(html, "<h2>{}</h2>", escape(subject));
    let _ = writeln!(
        html,
        "<p>#{} {}: {} &rarr; {}</p>",
        event.seq,
        escape(&event.camera),
        event.previous,
        event.current,
    );
    html.push_str(&render_table(history));
    html.push_str("</body>\n</html>\n");

    AlertPayload {
        subject: subject.to_string(),
        html,
    }
}

/// Render the change-history table, one row per event, oldest first.
pub fn render_table(history: &[TransitionEvent]) -> String {
    let mut table = String::from(
        "<table>\n<tr><th>S.No</th><th>Name</th><th>Status Change</th><th>Current Status</th></tr>\n",
    );
    for event in history {
        let _ = writeln!(
            table,
            "<tr><td>{seq}</td><td>{name}</td><td>{prev} ({prev_at}) &rarr; {cur} ({at})</td>\
             <td style=\"color:{color}; font-weight:bold;\">{cur}</td></tr>",
            seq = event.seq,
            name = escape(&event.camera),
            prev = event.previous,
            prev_at = format_timestamp(event.previous_since),
            cur = event.current,
            at = format_timestamp(event.at),
            color = state_color(event.current),
        );
    }
    table.push_str("</table>\n");
    table
}

/// Format a timestamp in the monitor's local time zone.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format(TIMESTAMP_FORMAT).to_string()
}

fn state_color(state: HealthState) -> &'static str {
    match state {
        HealthState::Online => "green",
        HealthState::Offline => "red",
        HealthState::Unknown => "gray",
    }
}

/// Minimal HTML escaping for text nodes.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
