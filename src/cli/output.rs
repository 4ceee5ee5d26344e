//! Output formatting helpers for CLI commands

use crate::engine::ScalingDecision;
use chrono::{DateTime, Utc};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};

/// View model for `scaleit status`
#[derive(Debug, Clone, serde::Serialize)]
pub struct StatusView {
    pub status_url: String,
    /// Present when the status endpoint answered with a usable sample
    pub cpu_utilization: Option<f64>,
    pub replicas: Option<u32>,
    /// Why no sample could be taken
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_error: Option<String>,
    pub target_scale_out: f64,
    pub target_scale_in: f64,
    pub min_replicas: u32,
    pub max_replicas: u32,
    pub cooldown_seconds: u64,
    pub last_action_at: Option<DateTime<Utc>>,
    /// Seconds left in the cooldown window, None when scaling is allowed
    pub cooldown_remaining_seconds: Option<u64>,
    pub decision: ScalingDecision,
    pub dry_run: bool,
}

fn format_decision(decision: &ScalingDecision) -> String {
    match decision {
        ScalingDecision::ScaleOut(_) => decision.to_string().green().to_string(),
        ScalingDecision::ScaleIn(_) => decision.to_string().cyan().to_string(),
        ScalingDecision::NoOp => decision.to_string().dimmed().to_string(),
    }
}

/// Format status as a two-column table
pub fn format_status_table(view: &StatusView) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Field", "Value"]);

    let cpu = match (view.cpu_utilization, &view.sample_error) {
        (Some(cpu), _) => format!("{:.2}", cpu),
        (None, Some(error)) => error.red().to_string(),
        (None, None) => "-".to_string(),
    };
    let replicas = view
        .replicas
        .map(|n| n.to_string())
        .unwrap_or_else(|| "-".to_string());
    let cooldown = match view.cooldown_remaining_seconds {
        Some(remaining) => format!("{}s left of {}s", remaining, view.cooldown_seconds)
            .yellow()
            .to_string(),
        None => "Ready".green().to_string(),
    };

    let rows = [
        ("Status URL", view.status_url.clone()),
        ("CPU utilization", cpu),
        ("Replicas", replicas),
        (
            "Target CPU",
            format!("{:.2} - {:.2}", view.target_scale_in, view.target_scale_out),
        ),
        (
            "Replica bounds",
            format!("{} - {}", view.min_replicas, view.max_replicas),
        ),
        (
            "Last action",
            view.last_action_at
                .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                .unwrap_or_else(|| "never".to_string()),
        ),
        ("Cooldown", cooldown),
        ("Decision", format_decision(&view.decision)),
        ("Dry run", view.dry_run.to_string()),
    ];
    for (field, value) in rows {
        table.add_row(vec![Cell::new(field), Cell::new(value)]);
    }

    table.to_string()
}

/// Format status as JSON
pub fn format_status_json(view: &StatusView) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(view)
}
