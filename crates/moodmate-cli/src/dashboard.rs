//! Plain-text rendering of the mood dashboard. Colour is applied by the caller.

use moodmate_core::config::Helpline;
use moodmate_core::model::Suggestion;
use moodmate_core::report::MoodReport;

const BAR_WIDTH: usize = 20;

pub fn bar(proportion: f64) -> String {
    let filled = (proportion.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

pub fn distribution_lines(report: &MoodReport) -> Vec<String> {
    report
        .distribution
        .iter()
        .map(|(label, count)| {
            let share = report.distribution.proportion(label);
            format!(
                "{:<9} {} {:>5.1}% ({count})",
                label.to_string(),
                bar(share),
                share * 100.0
            )
        })
        .collect()
}

pub fn timeline_lines(report: &MoodReport) -> Vec<String> {
    report
        .timeline
        .iter()
        .map(|p| {
            format!(
                "{}  {:+.2}  {}",
                p.timestamp
                    .with_timezone(&chrono::Local)
                    .format("%Y-%m-%d %H:%M:%S"),
                p.score,
                p.mood
            )
        })
        .collect()
}

pub fn daily_lines(report: &MoodReport) -> Vec<String> {
    report
        .daily_averages
        .iter()
        .map(|d| format!("{}  {:+.2}  ({} entries)", d.date, d.average, d.entries))
        .collect()
}

pub fn suggestion_lines(report: &MoodReport) -> Vec<String> {
    report
        .recent_suggestions
        .iter()
        .map(|r| {
            let shown = match &r.suggestion {
                Suggestion::None => "no suggestion".to_string(),
                other => other.to_string(),
            };
            format!("\"{}\" -> {shown}", truncate(&r.entry, 40))
        })
        .collect()
}

pub fn helpline_lines(helplines: &[Helpline]) -> Vec<String> {
    helplines
        .iter()
        .map(|h| format!("{}: {}", h.region, h.number))
        .collect()
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}
