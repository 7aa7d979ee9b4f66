use crate::models::{BandCount, GradeBand, StudentRecord};

/// Counts every individual grade in the roster per band, in `GradeBand::ALL` order.
pub fn bucket_grades(roster: &[StudentRecord]) -> [BandCount; 5] {
    let mut counts = GradeBand::ALL.map(|band| BandCount { band, count: 0 });
    for grade in roster.iter().flat_map(|student| student.grades()) {
        counts[GradeBand::classify(grade).index()].count += 1;
    }
    counts
}
