//! Response schemas for the EduVision API.
//!
//! Every payload is validated against these types at the client boundary.
//! Collections default to empty when absent; scalars the pages can render a
//! placeholder for are optional.

use serde::{Deserialize, Deserializer, Serialize};

/// Treat an explicit `null` like an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Student identity shown in the page header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Student {
    /// Student PRN.
    #[serde(default)]
    pub prn: String,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
}

/// A scored subject in a semester.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectGrade {
    /// Subject display name.
    pub subject: String,
    /// Score out of 100.
    pub score: f64,
    /// Letter grade.
    #[serde(default)]
    pub grade: String,
}

/// SGPA for one semester.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemesterPoint {
    /// Semester label.
    pub semester: String,
    /// SGPA, absent when not yet published.
    #[serde(default)]
    pub sgpa: Option<f64>,
}

// === Dashboard ===

/// `GET /student/{prn}/dashboard`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardPayload {
    /// Student identity.
    #[serde(default)]
    pub student: Option<Student>,
    /// Headline metrics.
    #[serde(default)]
    pub metrics: Option<Metrics>,
    /// Latest-semester grades, best first.
    #[serde(default, deserialize_with = "null_as_default")]
    pub recent_grades: Vec<SubjectGrade>,
    /// Skill labels.
    #[serde(default, deserialize_with = "null_as_default")]
    pub skills: Vec<String>,
    /// Free-text insights.
    #[serde(default, deserialize_with = "null_as_default")]
    pub insights: Vec<String>,
    /// SGPA per semester.
    #[serde(default, deserialize_with = "null_as_default")]
    pub progress: Vec<SemesterPoint>,
}

/// Headline metrics snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metrics {
    /// Latest SGPA.
    pub current_sgpa: Option<f64>,
    /// Difference to the previous semester's SGPA.
    pub sgpa_change: Option<f64>,
    /// 12th standard percentage.
    pub twelfth_percentage: Option<f64>,
    /// Mean latest-semester subject score.
    pub average_subject_score: Option<f64>,
    /// Rank in class by latest SGPA.
    pub class_rank: Option<u32>,
    /// Number of students ranked.
    pub class_size: Option<u32>,
    /// Number of recorded skills.
    pub skills_count: Option<u32>,
}

// === Progress ===

/// `GET /student/{prn}/progress`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressPayload {
    /// Student identity.
    #[serde(default)]
    pub student: Option<Student>,
    /// Latest semester label.
    #[serde(default)]
    pub current_semester: Option<String>,
    /// Latest-semester subjects with targets.
    #[serde(default, deserialize_with = "null_as_default")]
    pub subjects: Vec<SubjectProgress>,
    /// 12th standard marks per subject.
    #[serde(default)]
    pub twelfth_radar: Option<RadarSeries>,
    /// SGPA per semester.
    #[serde(default, deserialize_with = "null_as_default")]
    pub sgpa_trend: Vec<SemesterPoint>,
    /// Skill labels.
    #[serde(default, deserialize_with = "null_as_default")]
    pub skills: Vec<String>,
    /// Improvement goals.
    #[serde(default, deserialize_with = "null_as_default")]
    pub goals: Vec<Goal>,
}

/// A subject with its improvement target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectProgress {
    /// Subject display name.
    pub subject: String,
    /// Current score.
    pub score: f64,
    /// Letter grade.
    #[serde(default)]
    pub grade: Option<String>,
    /// Target score.
    pub target_score: f64,
    /// `strong`, `stable` or `needs_focus`.
    pub status: String,
    /// Points between score and target.
    #[serde(default)]
    pub delta_to_target: Option<f64>,
}

/// Parallel label/score series for a radar chart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadarSeries {
    /// Axis labels.
    pub labels: Vec<String>,
    /// Scores per label.
    pub scores: Vec<f64>,
}

/// An improvement goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    /// Goal title.
    pub title: String,
    /// `on_track` or `needs_focus`.
    pub status: String,
    /// Current score.
    pub current_score: f64,
    /// Target score.
    pub target_score: f64,
}

// === Improvement ===

/// `GET /student/{prn}/improvement`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImprovementPayload {
    /// Student identity.
    #[serde(default)]
    pub student: Option<Student>,
    /// Plan summary.
    #[serde(default)]
    pub summary: Option<String>,
    /// `gemini` for AI-generated plans, anything else for the fallback.
    #[serde(default)]
    pub source: Option<String>,
    /// `gemini_success` or `gemini_fallback`.
    #[serde(default)]
    pub ai_status: Option<String>,
    /// Why the AI plan was not used.
    #[serde(default)]
    pub ai_error: Option<String>,
    /// Subjects to focus on.
    #[serde(default, deserialize_with = "null_as_default")]
    pub focus_areas: Vec<FocusArea>,
    /// Recommended actions.
    #[serde(default, deserialize_with = "null_as_default")]
    pub recommendations: Vec<Recommendation>,
    /// Six-week plan stages.
    #[serde(default, deserialize_with = "null_as_default")]
    pub six_week_plan: Vec<PlanStage>,
    /// Number of recommendations started.
    #[serde(default)]
    pub recommendations_started: Option<u32>,
    /// Number of recorded skills.
    #[serde(default)]
    pub skills_count: Option<u32>,
}

/// A subject flagged for improvement.
///
/// Improvement payloads may be AI-generated and are display-only, so every
/// scalar tolerates `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FocusArea {
    /// Subject display name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub subject: String,
    /// `high`, `medium` or `low`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub priority: String,
    /// Why the subject was flagged.
    #[serde(default, deserialize_with = "null_as_default")]
    pub reason: String,
    /// Current score.
    #[serde(default)]
    pub current_score: Option<f64>,
    /// Target score.
    #[serde(default)]
    pub target_score: Option<f64>,
    /// Points to target.
    #[serde(default)]
    pub gap: Option<f64>,
}

/// A recommended action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Title.
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    /// What to do.
    #[serde(default, deserialize_with = "null_as_default")]
    pub action: String,
    /// `high`, `medium` or `low`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub priority: String,
    /// Time commitment.
    #[serde(default, deserialize_with = "null_as_default")]
    pub duration: String,
    /// `easy`, `medium` or `hard`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub difficulty: String,
}

/// One stage of the six-week plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanStage {
    /// Week range label, e.g. `Week 1-2`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub week_range: String,
    /// Stage goal.
    #[serde(default, deserialize_with = "null_as_default")]
    pub goal: String,
    /// Tasks for the stage.
    #[serde(default, deserialize_with = "null_as_default")]
    pub tasks: Vec<String>,
}

// === Reports ===

/// `GET /student/{prn}/reports`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportsPayload {
    /// Student identity.
    #[serde(default)]
    pub student: Option<Student>,
    /// Academic summary.
    #[serde(default)]
    pub summary: Option<ReportSummary>,
    /// Per-semester reports.
    #[serde(default, deserialize_with = "null_as_default")]
    pub reports: Vec<SemesterReport>,
}

/// Academic summary across semesters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSummary {
    /// Latest SGPA.
    pub current_sgpa: Option<f64>,
    /// Mean SGPA across semesters.
    pub overall_cgpa: Option<f64>,
    /// 12th standard percentage.
    pub twelfth_percentage: Option<f64>,
    /// Number of semesters with records.
    pub semesters_completed: Option<u32>,
    /// Rank in class by latest SGPA.
    pub class_rank: Option<u32>,
    /// Number of students ranked.
    pub class_size: Option<u32>,
}

/// One semester's report card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemesterReport {
    /// Semester label.
    pub semester: String,
    /// SGPA.
    #[serde(default)]
    pub sgpa: Option<f64>,
    /// Subject grades.
    #[serde(default, deserialize_with = "null_as_default")]
    pub subjects: Vec<SubjectGrade>,
}

// === Service ===

/// `GET /health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Whether the service considers itself healthy.
    pub ok: bool,
    /// Service name.
    #[serde(default)]
    pub service: Option<String>,
    /// Database connectivity: `connected`, `error`, ...
    #[serde(default)]
    pub database: Option<String>,
    /// Database name.
    #[serde(default)]
    pub db_name: Option<String>,
    /// Whether an AI key is configured on the server.
    #[serde(default)]
    pub gemini_configured: bool,
    /// Failure details.
    #[serde(default)]
    pub details: Option<String>,
}

/// A student directory entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentEntry {
    /// Student PRN.
    pub prn: String,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
}

/// `GET /students`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentDirectory {
    /// Students, ordered by PRN.
    #[serde(default, deserialize_with = "null_as_default")]
    pub students: Vec<StudentEntry>,
    /// Number of students returned.
    #[serde(default)]
    pub count: usize,
}

// === Errors ===

/// Error body returned with non-success statuses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorEnvelope {
    /// Server error message.
    pub error: Option<String>,
    /// Extra details.
    pub details: Option<String>,
    /// Close matches for an unknown PRN.
    pub suggestions: Vec<StudentEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dashboard_defaults_missing_collections() {
        let payload: DashboardPayload =
            serde_json::from_str(r#"{"student": {"prn": "P1", "name": "Riya"}}"#).unwrap();
        assert!(payload.recent_grades.is_empty());
        assert!(payload.skills.is_empty());
        assert!(payload.metrics.is_none());
    }

    #[test]
    fn test_null_collections_read_as_empty() {
        let payload: ProgressPayload =
            serde_json::from_str(r#"{"subjects": null, "goals": null, "skills": []}"#).unwrap();
        assert!(payload.subjects.is_empty());
        assert!(payload.goals.is_empty());
    }

    #[test]
    fn test_metrics_accept_nulls() {
        let metrics: Metrics = serde_json::from_str(
            r#"{"current_sgpa": null, "class_rank": 3, "class_size": null, "sgpa_change": -0.2}"#,
        )
        .unwrap();
        assert_eq!(metrics.current_sgpa, None);
        assert_eq!(metrics.class_rank, Some(3));
        assert_eq!(metrics.sgpa_change, Some(-0.2));
    }

    #[test]
    fn test_subject_grade_requires_score() {
        let result: Result<SubjectGrade, _> = serde_json::from_str(r#"{"subject": "Statistics"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_wrong_shape_rejected() {
        let result: Result<DashboardPayload, _> = serde_json::from_str(r#"{"skills": "rust"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_error_envelope_with_suggestions() {
        let envelope: ErrorEnvelope = serde_json::from_str(
            r#"{"error": "Student not found", "prn": "X", "suggestions": [{"prn": "X1", "name": "A"}, {"prn": "X2"}]}"#,
        )
        .unwrap();
        assert_eq!(envelope.error.as_deref(), Some("Student not found"));
        assert_eq!(envelope.suggestions.len(), 2);
        assert_eq!(envelope.suggestions[1].prn, "X2");
    }

    #[test]
    fn test_improvement_items_accept_nulls() {
        let payload: ImprovementPayload = serde_json::from_str(
            r#"{
                "focus_areas": [{"subject": "Maths", "priority": null, "reason": null,
                                 "current_score": 62, "target_score": null, "gap": null}],
                "recommendations": [{"title": "Drills", "priority": null, "duration": null}],
                "six_week_plan": [{"week_range": null, "goal": "Basics", "tasks": null}]
            }"#,
        )
        .unwrap();
        let focus = &payload.focus_areas[0];
        assert_eq!(focus.priority, "");
        assert_eq!(focus.current_score, Some(62.0));
        assert_eq!(focus.gap, None);
        assert_eq!(payload.recommendations[0].priority, "");
        assert_eq!(payload.six_week_plan[0].week_range, "");
    }

    #[test]
    fn test_improvement_items_reject_wrong_types() {
        let result: Result<ImprovementPayload, _> =
            serde_json::from_str(r#"{"focus_areas": [{"subject": "Maths", "gap": "lots"}]}"#);
        assert!(result.is_err());

        let result: Result<ImprovementPayload, _> =
            serde_json::from_str(r#"{"recommendations": ["Drills"]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_improvement_plan_tasks_default() {
        let payload: ImprovementPayload = serde_json::from_str(
            r#"{"six_week_plan": [{"week_range": "Week 1-2", "goal": "Routine"}]}"#,
        )
        .unwrap();
        assert!(payload.six_week_plan[0].tasks.is_empty());
    }
}
