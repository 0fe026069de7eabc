//! Server-rendered status page.

use axum::extract::State;
use axum::response::Html;

use camwatch_notify::render::{escape, format_timestamp};
use camwatch_state::{CameraStatus, HealthState};

use crate::ApiState;

/// GET /
pub async fn status_page(State(state): State<ApiState>) -> Html<String> {
    let statuses = state.scheduler.tracker().statuses().await;
    Html(render_status_page(&statuses))
}

fn render_status_page(statuses: &[CameraStatus]) -> String {
    let rows: String = statuses
        .iter()
        .map(|s| {
            format!(
                "<tr><td>{}</td><td class=\"{}\">{}</td><td>{}</td></tr>\n",
                escape(&s.camera),
                s.state.as_str(),
                s.state,
                since_label(s),
            )
        })
        .collect();

    format!(
        "<!doctype html>\n<html>\n<head>\n<title>Camera Health</title>\n<style>\
         table {{ border-collapse: collapse; }} \
         th, td {{ border: 1px solid #999; padding: 6px 12px; }} \
         .online {{ color: green; font-weight: bold; }} \
         .offline {{ color: red; font-weight: bold; }} \
         .unknown {{ color: gray; }}\
         </style>\n</head>\n<body>\n<h1>Camera Health</h1>\n\
         <form method=\"post\" action=\"/api/v1/check\"><button>Run check now</button></form>\n\
         <table>\n<tr><th>Camera</th><th>Status</th><th>Since</th></tr>\n{rows}</table>\n</body>\n</html>\n"
    )
}

fn since_label(status: &CameraStatus) -> String {
    match status.state {
        HealthState::Unknown => "-".to_string(),
        _ => format_timestamp(status.since),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camwatch_state::StatusTracker;

    #[tokio::test]
    async fn page_lists_every_camera() {
        let tracker = StatusTracker::new(["a"]);
        tracker.record("b<x>", false).await;
        let page = render_status_page(&tracker.statuses().await);

        assert!(page.contains("<td>a</td><td class=\"unknown\">unknown</td><td>-</td>"));
        assert!(page.contains("b&lt;x&gt;"));
        assert!(page.contains("class=\"offline\""));
        assert!(page.contains("Run check now"));
    }
}
