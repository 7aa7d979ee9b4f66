use serde::Serialize;

/// One row of an imported grade sheet.
///
/// `subjects` keeps the header column order. A repeated subject column
/// overwrites the earlier value in place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentRecord {
    pub name: String,
    pub subjects: Vec<(String, f64)>,
    pub average: Option<f64>,
}

impl StudentRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            subjects: Vec::new(),
            average: None,
        }
    }

    pub fn with_grades<S: Into<String>>(
        name: impl Into<String>,
        grades: impl IntoIterator<Item = (S, f64)>,
    ) -> Self {
        let mut record = Self::new(name);
        for (subject, grade) in grades {
            record.set_grade(subject, grade);
        }
        record.average = Some(record.mean_grade());
        record
    }

    pub fn set_grade(&mut self, subject: impl Into<String>, grade: f64) {
        let subject = subject.into();
        match self.subjects.iter_mut().find(|(name, _)| *name == subject) {
            Some(entry) => entry.1 = grade,
            None => self.subjects.push((subject, grade)),
        }
    }

    pub fn grades(&self) -> impl Iterator<Item = f64> + '_ {
        self.subjects.iter().map(|(_, grade)| *grade)
    }

    /// Arithmetic mean of the recorded grades, 0 when there are none.
    pub fn mean_grade(&self) -> f64 {
        if self.subjects.is_empty() {
            0.0
        } else {
            self.grades().sum::<f64>() / self.subjects.len() as f64
        }
    }

    /// The stored average, treating a missing one as 0.
    pub fn average_or_zero(&self) -> f64 {
        self.average.unwrap_or(0.0)
    }
}

pub type Roster = Vec<StudentRecord>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectStat {
    pub subject: String,
    pub average: f64,
    pub success_rate: f64,
    pub grade_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeExtreme {
    pub subject: String,
    pub grade: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentInsight {
    pub record: StudentRecord,
    /// `None` when the student has no recorded grade.
    pub best: Option<GradeExtreme>,
    pub worst: Option<GradeExtreme>,
    pub needs_improvement: bool,
}

impl StudentInsight {
    pub fn average(&self) -> f64 {
        self.record.average_or_zero()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuccessLevel {
    Success,
    Warning,
    Critical,
}

impl SuccessLevel {
    pub fn from_rate(rate: f64) -> Self {
        if rate >= 0.7 {
            Self::Success
        } else if rate >= 0.5 {
            Self::Warning
        } else {
            Self::Critical
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassSummary {
    pub student_count: usize,
    pub subject_count: usize,
    pub grade_count: usize,
    pub class_average: f64,
    pub success_rate: f64,
    pub success_level: SuccessLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GradeBand {
    Excellent,
    Bien,
    AssezBien,
    Passable,
    Insuffisant,
}

impl GradeBand {
    pub const ALL: [GradeBand; 5] = [
        GradeBand::Excellent,
        GradeBand::Bien,
        GradeBand::AssezBien,
        GradeBand::Passable,
        GradeBand::Insuffisant,
    ];

    /// Values above 20 land in `Excellent`, values below 0 in `Insuffisant`.
    pub fn classify(grade: f64) -> Self {
        if grade >= 16.0 {
            GradeBand::Excellent
        } else if grade >= 14.0 {
            GradeBand::Bien
        } else if grade >= 12.0 {
            GradeBand::AssezBien
        } else if grade >= 10.0 {
            GradeBand::Passable
        } else {
            GradeBand::Insuffisant
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GradeBand::Excellent => "Excellent (16-20)",
            GradeBand::Bien => "Bien (14-16)",
            GradeBand::AssezBien => "Assez bien (12-14)",
            GradeBand::Passable => "Passable (10-12)",
            GradeBand::Insuffisant => "Insuffisant (<10)",
        }
    }

    pub fn index(self) -> usize {
        match self {
            GradeBand::Excellent => 0,
            GradeBand::Bien => 1,
            GradeBand::AssezBien => 2,
            GradeBand::Passable => 3,
            GradeBand::Insuffisant => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BandCount {
    pub band: GradeBand,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectInsight {
    pub stat: SubjectStat,
    pub is_strong: bool,
    pub needs_attention: bool,
}
