use std::fmt::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::dashboard::DashboardView;
use crate::models::{StudentInsight, SubjectInsight, SuccessLevel};

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: DateTime<Utc>,
    #[serde(flatten)]
    view: &'a DashboardView,
}

pub fn build_json(view: &DashboardView, generated_at: DateTime<Utc>) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&JsonReport { generated_at, view })?)
}

pub fn build_report(view: &DashboardView, generated_at: DateTime<Utc>) -> String {
    let mut output = String::new();
    let summary = &view.summary;

    let _ = writeln!(output, "# Class Results Dashboard");
    let _ = writeln!(output, "Generated {}", generated_at.format("%Y-%m-%d %H:%M UTC"));
    let _ = writeln!(output);

    if summary.student_count == 0 {
        let _ = writeln!(output, "No students loaded.");
        return output;
    }

    let _ = writeln!(output, "## Overview");
    let _ = writeln!(output, "- Students: {}", summary.student_count);
    let _ = writeln!(output, "- Subjects: {}", summary.subject_count);
    let _ = writeln!(output, "- Class average: {:.1}/20", summary.class_average);
    let _ = writeln!(
        output,
        "- Success rate: {:.1}% of grades >= 10/20 ({})",
        summary.success_rate * 100.0,
        level_label(summary.success_level)
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Subject Averages");
    for subject in &view.subjects {
        let _ = writeln!(
            output,
            "- {}: {:.1}/20",
            subject.stat.subject, subject.stat.average
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Class Ranking");
    for (position, insight) in view.ranking.iter().enumerate() {
        let _ = writeln!(
            output,
            "{}. {} {:.1}/20",
            position + 1,
            first_name(&insight.record.name),
            insight.average()
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Grade Distribution");
    let total: usize = view.distribution.iter().map(|c| c.count).sum();
    for band in &view.distribution {
        let share = if total == 0 {
            0.0
        } else {
            band.count as f64 * 100.0 / total as f64
        };
        let _ = writeln!(
            output,
            "- {}: {} grades ({:.0}%)",
            band.band.label(),
            band.count,
            share
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Top Students");
    for (position, insight) in view.top_performers.iter().enumerate() {
        let _ = writeln!(
            output,
            "{}. {} {:.1}/20, strongest in {}",
            position + 1,
            insight.record.name,
            insight.average(),
            extreme_label(insight, true)
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Students Needing Support");
    if view.struggling.is_empty() {
        let _ = writeln!(output, "Every student has a satisfactory average.");
    } else {
        for insight in &view.struggling {
            let _ = writeln!(
                output,
                "- {} {:.1}/20, to improve: {}",
                insight.record.name,
                insight.average(),
                extreme_label(insight, false)
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Strong Subjects");
    write_subjects(&mut output, &view.strong_subjects);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Subjects Needing Attention");
    write_subjects(&mut output, &view.attention_subjects);

    output
}

fn write_subjects(output: &mut String, subjects: &[SubjectInsight]) {
    if subjects.is_empty() {
        let _ = writeln!(output, "None.");
        return;
    }
    for subject in subjects {
        let _ = writeln!(
            output,
            "- {}: {:.1}/20, {:.0}% pass",
            subject.stat.subject,
            subject.stat.average,
            subject.stat.success_rate * 100.0
        );
    }
}

fn extreme_label(insight: &StudentInsight, best: bool) -> String {
    let extreme = if best { &insight.best } else { &insight.worst };
    match extreme {
        Some(extreme) => format!("{} ({}/20)", extreme.subject, extreme.grade),
        None => "no grades".to_string(),
    }
}

fn first_name(name: &str) -> &str {
    name.split(' ').next().unwrap_or(name)
}

fn level_label(level: SuccessLevel) -> &'static str {
    match level {
        SuccessLevel::Success => "good",
        SuccessLevel::Warning => "fair",
        SuccessLevel::Critical => "critical",
    }
}
