use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crate::aggregate;
use crate::config::Thresholds;
use crate::distribution;
use crate::error::ImportError;
use crate::import::{self, ImportSource};
use crate::models::{
    BandCount, ClassSummary, Roster, StudentInsight, StudentRecord, SubjectInsight,
};
use crate::parser;
use crate::rank;

/// Outcome of the latest import, shown to the user as a single message.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportStatus {
    Idle,
    Success(String),
    Error(String),
}

impl ImportStatus {
    pub fn message(&self) -> &str {
        match self {
            ImportStatus::Idle => "",
            ImportStatus::Success(message) | ImportStatus::Error(message) => message,
        }
    }
}

/// Everything the view layer renders, derived from one roster.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub summary: ClassSummary,
    pub subjects: Vec<SubjectInsight>,
    pub ranking: Vec<StudentInsight>,
    pub distribution: [BandCount; 5],
    pub top_performers: Vec<StudentInsight>,
    pub struggling: Vec<StudentInsight>,
    pub strong_subjects: Vec<SubjectInsight>,
    pub attention_subjects: Vec<SubjectInsight>,
}

/// Owns the roster currently on display.
///
/// Every import replaces the roster wholesale. A failed import leaves the
/// previous roster in place.
#[derive(Debug)]
pub struct Dashboard {
    roster: Roster,
    thresholds: Thresholds,
    status: ImportStatus,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new(Thresholds::default())
    }
}

impl Dashboard {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            roster: Roster::new(),
            thresholds,
            status: ImportStatus::Idle,
        }
    }

    pub fn roster(&self) -> &[StudentRecord] {
        &self.roster
    }

    pub fn is_empty(&self) -> bool {
        self.roster.is_empty()
    }

    pub fn status(&self) -> &ImportStatus {
        &self.status
    }

    pub fn load_roster(&mut self, roster: Roster) {
        info!(students = roster.len(), "roster loaded");
        self.roster = roster;
    }

    pub fn clear_roster(&mut self) {
        info!(students = self.roster.len(), "roster cleared");
        self.roster.clear();
        self.status = ImportStatus::Idle;
    }

    pub fn load_sample(&mut self) {
        self.load_roster(sample_roster());
        self.status = ImportStatus::Success("sample data loaded".to_string());
    }

    /// Imports an in-memory source, recording the outcome as the current status.
    pub fn import(&mut self, source: &ImportSource) -> &ImportStatus {
        let outcome = self.try_import(source);
        self.record(outcome)
    }

    pub async fn import_file(&mut self, path: &Path) -> &ImportStatus {
        match import::read_csv_file(path).await {
            Ok(source) => self.import(&source),
            Err(err) => self.record(Err(err)),
        }
    }

    fn try_import(&mut self, source: &ImportSource) -> Result<usize, ImportError> {
        source.ensure_csv()?;
        let roster = parser::parse(&source.text)?;
        if roster.is_empty() {
            return Err(ImportError::EmptyDataset);
        }
        let count = roster.len();
        self.load_roster(roster);
        Ok(count)
    }

    fn record(&mut self, outcome: Result<usize, ImportError>) -> &ImportStatus {
        self.status = match outcome {
            Ok(count) => ImportStatus::Success(format!("{count} students imported")),
            Err(err) => {
                warn!(error = %err, "import rejected");
                ImportStatus::Error(err.to_string())
            }
        };
        &self.status
    }

    /// Recomputes every derived view from the current roster.
    pub fn view(&self) -> DashboardView {
        let thresholds = &self.thresholds;
        let insights = aggregate::compute_student_insights(&self.roster, thresholds);
        let stats = aggregate::aggregate_subjects(&self.roster, thresholds);
        let subjects = rank::classify_subjects(&stats, thresholds);

        DashboardView {
            summary: aggregate::class_summary(&self.roster, thresholds),
            ranking: rank::rank_students(&insights),
            distribution: distribution::bucket_grades(&self.roster),
            top_performers: rank::top_performers(&insights, thresholds.top_k),
            struggling: rank::struggling_performers(&insights, thresholds.top_k),
            strong_subjects: rank::strong_subjects(&subjects),
            attention_subjects: rank::subjects_needing_attention(&subjects),
            subjects,
        }
    }
}

/// Five students with four subjects each, usable without any file.
pub fn sample_roster() -> Roster {
    const SUBJECTS: [&str; 4] = ["Mathématiques", "Physique", "Français", "Histoire"];
    let rows: [(&str, [f64; 4]); 5] = [
        ("Alice Martin", [18.0, 16.0, 15.0, 17.0]),
        ("Bob Dupont", [12.0, 14.0, 18.0, 13.0]),
        ("Claire Bernard", [15.0, 17.0, 16.0, 19.0]),
        ("David Rousseau", [9.0, 11.0, 14.0, 12.0]),
        ("Emma Leroy", [19.0, 18.0, 17.0, 16.0]),
    ];

    rows.into_iter()
        .map(|(name, grades)| StudentRecord::with_grades(name, SUBJECTS.into_iter().zip(grades)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GradeBand;

    fn csv(text: &str) -> ImportSource {
        ImportSource::new("grades.csv", text)
    }

    #[test]
    fn starts_empty_and_idle() {
        let dashboard = Dashboard::default();
        assert!(dashboard.is_empty());
        assert_eq!(dashboard.status(), &ImportStatus::Idle);
    }

    #[test]
    fn import_replaces_roster_wholesale() {
        let mut dashboard = Dashboard::default();
        dashboard.import(&csv("Name,Math\nAlice,12\nBob,14"));
        assert_eq!(dashboard.roster().len(), 2);

        let status = dashboard.import(&csv("Name,Math\nCara,9")).clone();
        assert_eq!(status, ImportStatus::Success("1 students imported".to_string()));
        assert_eq!(dashboard.roster().len(), 1);
        assert_eq!(dashboard.roster()[0].name, "Cara");
    }

    #[test]
    fn failed_imports_keep_previous_roster() {
        let mut dashboard = Dashboard::default();
        dashboard.load_sample();

        let cases = [
            (csv("Name,Math"), ImportError::Format.to_string()),
            (csv("Name,Math,Physics\nAlice,12"), ImportError::EmptyDataset.to_string()),
            (
                ImportSource::new("grades.pdf", "Name,Math\nAlice,12"),
                "please select a CSV file (grades.pdf is not one)".to_string(),
            ),
        ];
        for (source, message) in cases {
            let status = dashboard.import(&source).clone();
            assert_eq!(status, ImportStatus::Error(message));
            assert_eq!(dashboard.roster().len(), 5);
        }
    }

    #[test]
    fn mime_type_alone_allows_import() {
        let mut dashboard = Dashboard::default();
        let source = ImportSource {
            mime_type: Some("text/csv".to_string()),
            ..ImportSource::new("upload", "Name,Math\nAlice,12")
        };
        assert!(matches!(dashboard.import(&source), ImportStatus::Success(_)));
    }

    #[test]
    fn clear_resets_to_empty() {
        let mut dashboard = Dashboard::default();
        dashboard.load_sample();
        dashboard.clear_roster();
        assert!(dashboard.is_empty());
        assert_eq!(dashboard.status().message(), "");
        assert_eq!(dashboard.view().summary.student_count, 0);
    }

    #[test]
    fn sample_roster_matches_published_averages() {
        let roster = sample_roster();
        let averages: Vec<f64> = roster.iter().map(|s| s.average_or_zero()).collect();
        assert_eq!(averages, vec![16.5, 14.25, 16.75, 11.5, 17.5]);
        assert!(roster.iter().all(|s| s.subjects.len() == 4));
    }

    #[test]
    fn sample_view() {
        let mut dashboard = Dashboard::default();
        dashboard.load_sample();
        let view = dashboard.view();

        assert_eq!(view.summary.student_count, 5);
        assert_eq!(view.summary.subject_count, 4);
        assert!((view.summary.class_average - 15.3).abs() < 1e-9);
        assert!((view.summary.success_rate - 0.95).abs() < 1e-9);

        let top: Vec<&str> = view.top_performers.iter().map(|i| i.record.name.as_str()).collect();
        assert_eq!(top, vec!["Emma Leroy", "Claire Bernard", "Alice Martin"]);
        assert_eq!(view.struggling.len(), 1);
        assert_eq!(view.struggling[0].record.name, "David Rousseau");
        assert_eq!(view.struggling[0].worst.as_ref().unwrap().subject, "Mathématiques");

        assert_eq!(view.ranking.len(), 5);
        let total: usize = view.distribution.iter().map(|c| c.count).sum();
        assert_eq!(total, 20);
        assert_eq!(view.distribution[GradeBand::Excellent.index()].count, 11);

        let strong: Vec<&str> = view.strong_subjects.iter().map(|s| s.stat.subject.as_str()).collect();
        assert_eq!(strong, vec!["Mathématiques", "Physique", "Français", "Histoire"]);
        assert!(view.attention_subjects.is_empty());
    }

    #[tokio::test]
    async fn import_file_reports_read_failures() {
        let mut dashboard = Dashboard::default();
        dashboard.load_sample();
        let dir = tempfile::tempdir().unwrap();

        let status = dashboard.import_file(&dir.path().join("absent.csv")).await.clone();
        assert!(matches!(status, ImportStatus::Error(_)));
        assert_eq!(dashboard.roster().len(), 5);

        let path = dir.path().join("class.csv");
        std::fs::write(&path, "Name,Math,Physics\nAlice,18,16\nBob,12,14").unwrap();
        let status = dashboard.import_file(&path).await.clone();
        assert_eq!(status.message(), "2 students imported");
        assert_eq!(dashboard.roster()[1].average, Some(13.0));
    }
}
