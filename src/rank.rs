use std::cmp::Ordering;

use crate::config::Thresholds;
use crate::models::{StudentInsight, SubjectInsight, SubjectStat};

/// Every student by average, best first. Equal averages keep roster order.
pub fn rank_students(insights: &[StudentInsight]) -> Vec<StudentInsight> {
    let mut ranked = insights.to_vec();
    ranked.sort_by(|a, b| descending(a.average(), b.average()));
    ranked
}

pub fn top_performers(insights: &[StudentInsight], k: usize) -> Vec<StudentInsight> {
    let mut ranked = rank_students(insights);
    ranked.truncate(k);
    ranked
}

/// The `k` weakest students among those flagged as needing improvement,
/// listed in ranking order.
pub fn struggling_performers(insights: &[StudentInsight], k: usize) -> Vec<StudentInsight> {
    let flagged: Vec<StudentInsight> = rank_students(insights)
        .into_iter()
        .filter(|insight| insight.needs_improvement)
        .collect();
    let skip = flagged.len().saturating_sub(k);
    flagged.into_iter().skip(skip).collect()
}

pub fn classify_subjects(stats: &[SubjectStat], thresholds: &Thresholds) -> Vec<SubjectInsight> {
    stats
        .iter()
        .map(|stat| SubjectInsight {
            stat: stat.clone(),
            is_strong: stat.average >= thresholds.strong_from,
            needs_attention: stat.average < thresholds.improvement_below
                || stat.success_rate < thresholds.min_success_rate,
        })
        .collect()
}

pub fn strong_subjects(subjects: &[SubjectInsight]) -> Vec<SubjectInsight> {
    subjects.iter().filter(|s| s.is_strong).cloned().collect()
}

pub fn subjects_needing_attention(subjects: &[SubjectInsight]) -> Vec<SubjectInsight> {
    subjects.iter().filter(|s| s.needs_attention).cloned().collect()
}

fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}
