mod evaluator;
mod metrics;
mod pusher;
mod types;

pub use evaluator::{
    DataIngestionArtifact, EvalError, ModelEvaluation, ModelEvaluationConfig,
    ModelTrainerArtifact,
};
pub use metrics::f1_score;
pub use pusher::{ModelPusher, ModelPusherConfig, PushError};
pub use types::{
    write_evaluation_report_json, EvaluationReport, EvaluationResult, ModelEvaluationArtifact,
    ModelPusherArtifact, PromotionRecord, REPORT_SCHEMA_VERSION,
};
