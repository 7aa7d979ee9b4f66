use crate::config::Thresholds;
use crate::models::{
    ClassSummary, GradeExtreme, StudentInsight, StudentRecord, SubjectStat, SuccessLevel,
};

/// Per-subject average and success rate, in the order subjects are first met
/// scanning the roster top to bottom.
pub fn aggregate_subjects(roster: &[StudentRecord], thresholds: &Thresholds) -> Vec<SubjectStat> {
    let mut index: std::collections::HashMap<&str, usize> = std::collections::HashMap::new();
    let mut totals: Vec<(&str, f64, usize, usize)> = Vec::new();

    for student in roster {
        for (subject, grade) in &student.subjects {
            let slot = *index.entry(subject.as_str()).or_insert_with(|| {
                totals.push((subject.as_str(), 0.0, 0, 0));
                totals.len() - 1
            });
            let entry = &mut totals[slot];
            entry.1 += grade;
            entry.2 += 1;
            if *grade >= thresholds.pass_mark {
                entry.3 += 1;
            }
        }
    }

    totals
        .into_iter()
        .map(|(subject, total, count, passed)| SubjectStat {
            subject: subject.to_string(),
            average: ratio(total, count),
            success_rate: ratio(passed as f64, count),
            grade_count: count,
        })
        .collect()
}

pub fn compute_student_insights(
    roster: &[StudentRecord],
    thresholds: &Thresholds,
) -> Vec<StudentInsight> {
    roster
        .iter()
        .map(|student| StudentInsight {
            record: student.clone(),
            best: extreme(student, |candidate, current| candidate > current),
            worst: extreme(student, |candidate, current| candidate < current),
            needs_improvement: student.average_or_zero() < thresholds.improvement_below,
        })
        .collect()
}

/// Earlier subjects win ties since only a strict improvement replaces the
/// running pick.
fn extreme(student: &StudentRecord, better: impl Fn(f64, f64) -> bool) -> Option<GradeExtreme> {
    let mut iter = student.subjects.iter();
    let (first_subject, first_grade) = iter.next()?;
    let mut pick = (first_subject, *first_grade);
    for (subject, grade) in iter {
        if better(*grade, pick.1) {
            pick = (subject, *grade);
        }
    }
    Some(GradeExtreme {
        subject: pick.0.clone(),
        grade: pick.1,
    })
}

/// Class-wide figures over every individual grade, not over student averages.
pub fn class_summary(roster: &[StudentRecord], thresholds: &Thresholds) -> ClassSummary {
    let mut subjects: std::collections::HashSet<&str> = std::collections::HashSet::new();
    let mut total = 0.0;
    let mut count = 0usize;
    let mut passed = 0usize;

    for student in roster {
        for (subject, grade) in &student.subjects {
            subjects.insert(subject.as_str());
            total += grade;
            count += 1;
            if *grade >= thresholds.pass_mark {
                passed += 1;
            }
        }
    }

    let success_rate = ratio(passed as f64, count);
    ClassSummary {
        student_count: roster.len(),
        subject_count: subjects.len(),
        grade_count: count,
        class_average: ratio(total, count),
        success_rate,
        success_level: SuccessLevel::from_rate(success_rate),
    }
}

fn ratio(total: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}
