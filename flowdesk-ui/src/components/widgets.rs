use flowdesk_core::models::{RiskLevel, TaskPriority, TaskStatus};
use leptos::*;

#[component]
pub fn StatCard(title: &'static str, #[prop(into)] value: String, color: &'static str) -> impl IntoView {
    view! {
      <div class="stat-card" style=format!("border-color: {color}")>
        <p class="meta">{title}</p>
        <h2>{value}</h2>
      </div>
    }
}

#[component]
pub fn WorkloadBar(#[prop(into)] name: String, load: u32, capacity: u32) -> impl IntoView {
    let percent = utilization(load, capacity);
    let class = if percent > 80.0 {
        "bar-fill high"
    } else if percent > 50.0 {
        "bar-fill medium"
    } else {
        "bar-fill low"
    };
    view! {
      <div class="workload-bar">
        <div class="row spread">
          <span>{name}</span>
          <span>{format!("{load}/{capacity} pts")}</span>
        </div>
        <div class="bar">
          <div class=class style=format!("width: {:.0}%", percent.min(100.0))></div>
        </div>
      </div>
    }
}

#[component]
pub fn Loading(#[prop(optional)] label: Option<&'static str>) -> impl IntoView {
    view! { <p class="loading">{label.unwrap_or("Loading...")}</p> }
}

pub fn utilization(load: u32, capacity: u32) -> f64 {
    if capacity == 0 {
        return 0.0;
    }
    f64::from(load) / f64::from(capacity) * 100.0
}

pub fn status_class(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Todo => "pill gray",
        TaskStatus::InProgress => "pill blue",
        TaskStatus::InReview => "pill yellow",
        TaskStatus::Done => "pill green",
    }
}

pub fn priority_class(priority: TaskPriority) -> &'static str {
    match priority {
        TaskPriority::Low => "pill gray",
        TaskPriority::Medium => "pill blue",
        TaskPriority::High => "pill orange",
        TaskPriority::Critical => "pill red",
    }
}

pub fn risk_class(risk: Option<RiskLevel>) -> &'static str {
    match risk {
        Some(RiskLevel::High) => "pill red",
        Some(RiskLevel::Medium) => "pill yellow",
        Some(RiskLevel::Low) => "pill green",
        _ => "pill gray",
    }
}

/// `2024-05-01T09:30:12.123` renders as `2024-05-01 09:30`.
pub fn format_timestamp(raw: &str) -> String {
    let trimmed: String = raw.chars().take(16).collect();
    trimmed.replacen('T', " ", 1)
}

pub fn or_dash(value: Option<impl ToString>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".into())
}
