use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Wire version of [`EvaluationReport`].
pub const REPORT_SCHEMA_VERSION: i32 = 1;

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

/// Outcome of comparing a candidate model against the deployed baseline.
///
/// Immutable once constructed; build it through [`EvaluationResult::decide`]
/// so the accept/delta invariants live in exactly one place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Held-out F1 of the candidate.
    pub candidate_f1: f64,
    /// Held-out F1 of the deployed baseline; `None` when no usable
    /// production model exists.
    pub production_f1: Option<f64>,
    /// True when the candidate beats the baseline.
    pub accepted: bool,
    /// `candidate_f1 - baseline`, where a missing baseline counts as 0.
    pub delta: f64,
}

impl EvaluationResult {
    /// Apply the fixed decision rule: the baseline defaults to 0 when no
    /// production model exists, so any functioning candidate is accepted on
    /// first deployment; otherwise the candidate must strictly beat it.
    pub fn decide(candidate_f1: f64, production_f1: Option<f64>) -> Self {
        let baseline = production_f1.unwrap_or(0.0);
        Self {
            candidate_f1,
            production_f1,
            accepted: candidate_f1 > baseline,
            delta: candidate_f1 - baseline,
        }
    }
}

// ---------------------------------------------------------------------------
// Downstream artifacts
// ---------------------------------------------------------------------------

/// Record handed to downstream orchestration after evaluation. Field names
/// are a stable contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEvaluationArtifact {
    pub is_accepted: bool,
    pub metric_delta: f64,
    /// Store key of the baseline slot, when one was configured.
    pub production_model_path: Option<String>,
    /// Store key of the evaluated candidate.
    pub trained_model_path: String,
}

impl ModelEvaluationArtifact {
    pub fn from_result(
        result: &EvaluationResult,
        trained_model_path: impl Into<String>,
        production_model_path: Option<String>,
    ) -> Self {
        Self {
            is_accepted: result.accepted,
            metric_delta: result.delta,
            production_model_path,
            trained_model_path: trained_model_path.into(),
        }
    }
}

/// Durable outcome of a promotion: where the artifact now lives and where it
/// was copied from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionRecord {
    pub stored_path: String,
    pub source_path: String,
}

/// Record handed to downstream orchestration after a successful push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelPusherArtifact {
    pub saved_model_path: String,
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Full evaluation/promotion report (serializable to JSON).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub schema_version: i32,
    pub run_id: Uuid,
    pub created_at_utc: DateTime<Utc>,
    /// Canonical hash of the config that drove this cycle.
    pub config_hash: String,
    pub result: EvaluationResult,
    pub artifact: ModelEvaluationArtifact,
    /// Present only when the cycle went on to promote.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pushed: Option<ModelPusherArtifact>,
}

/// Write the report as pretty-printed JSON to `out_dir/evaluation_report.json`.
/// Returns the path written.
pub fn write_evaluation_report_json(
    out_dir: &Path,
    report: &EvaluationReport,
) -> io::Result<PathBuf> {
    std::fs::create_dir_all(out_dir)?;
    let path = out_dir.join("evaluation_report.json");
    let json = serde_json::to_string_pretty(report).map_err(io::Error::other)?;
    std::fs::write(&path, format!("{json}\n"))?;
    Ok(path)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decide_holds_invariants_across_metric_pairs() {
        let pairs: &[(f64, Option<f64>)] = &[
            (0.82, None),
            (0.70, Some(0.75)),
            (0.90, Some(0.90)),
            (0.0, None),
            (1.0, Some(0.0)),
        ];
        for &(candidate, production) in pairs {
            let r = EvaluationResult::decide(candidate, production);
            let baseline = production.unwrap_or(0.0);
            assert_eq!(r.accepted, candidate > baseline, "pair {candidate}/{production:?}");
            assert!(
                (r.delta - (candidate - baseline)).abs() < 1e-12,
                "pair {candidate}/{production:?}"
            );
        }
    }

    #[test]
    fn equal_scores_are_rejected() {
        // Strict improvement required; a tie keeps the incumbent.
        let r = EvaluationResult::decide(0.75, Some(0.75));
        assert!(!r.accepted);
        assert_eq!(r.delta, 0.0);
    }

    #[test]
    fn zero_candidate_with_no_baseline_is_rejected() {
        let r = EvaluationResult::decide(0.0, None);
        assert!(!r.accepted, "0 is not strictly greater than the default baseline");
    }

    #[test]
    fn report_json_omits_pushed_when_absent() {
        let result = EvaluationResult::decide(0.82, None);
        let report = EvaluationReport {
            schema_version: REPORT_SCHEMA_VERSION,
            run_id: Uuid::nil(),
            created_at_utc: Utc::now(),
            config_hash: "deadbeef".to_string(),
            artifact: ModelEvaluationArtifact::from_result(&result, "candidate.json", None),
            result,
            pushed: None,
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(!json.contains("pushed"), "{json}");
    }

    #[test]
    fn report_writer_creates_out_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("reports/cycle-1");

        let result = EvaluationResult::decide(0.9, Some(0.8));
        let report = EvaluationReport {
            schema_version: REPORT_SCHEMA_VERSION,
            run_id: Uuid::nil(),
            created_at_utc: Utc::now(),
            config_hash: String::new(),
            artifact: ModelEvaluationArtifact::from_result(
                &result,
                "candidate.json",
                Some("production.json".to_string()),
            ),
            result,
            pushed: Some(ModelPusherArtifact {
                saved_model_path: "production.json".to_string(),
            }),
        };

        let path = write_evaluation_report_json(&out, &report).unwrap();
        assert_eq!(path, out.join("evaluation_report.json"));
        let back: EvaluationReport =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, report);
    }
}
