//! Inference Pipeline - RawRecord → FeatureVector → Classifier → Verdict
//!
//! `InferencePipeline` là snapshot bất biến; `ArtifactRegistry` giữ snapshot
//! hiện tại và swap nguyên khối khi reload.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::logic::error::{PipelineError, PipelineResult};
use crate::logic::features::assembler::FeatureAssembler;
use crate::logic::features::layout::FeatureSchema;
use crate::logic::features::record::{RawInput, RawRecord};
use crate::logic::features::vector::FeatureVector;
use crate::logic::model::artifacts::{ArtifactConfig, ArtifactInfo, ArtifactSet};
use crate::logic::model::classifier::{self, ClassProbabilities, ProbabilisticClassifier};
use crate::logic::model::encoder::CategoricalTransformer;
use crate::logic::model::scaler::NumericTransformer;
use crate::logic::model::threshold::{decide, Verdict};

// ============================================================================
// STATS
// ============================================================================

static PREDICTION_COUNT: AtomicU64 = AtomicU64::new(0);
static ABNORMAL_COUNT: AtomicU64 = AtomicU64::new(0);
static REJECTED_COUNT: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStats {
    pub predictions: u64,
    pub abnormal: u64,
    pub rejected: u64,
}

pub fn get_stats() -> PipelineStats {
    PipelineStats {
        predictions: PREDICTION_COUNT.load(Ordering::Relaxed),
        abnormal: ABNORMAL_COUNT.load(Ordering::Relaxed),
        rejected: REJECTED_COUNT.load(Ordering::Relaxed),
    }
}

fn track<T>(result: &PipelineResult<T>) {
    if let Err(e) = result {
        if e.is_rejection() {
            REJECTED_COUNT.fetch_add(1, Ordering::Relaxed);
            log::warn!("Request rejected: {}", e);
        } else {
            log::error!("Inference failed: {}", e);
        }
    }
}

// ============================================================================
// PIPELINE
// ============================================================================

pub struct InferencePipeline {
    assembler: FeatureAssembler,
    classifier: Arc<dyn ProbabilisticClassifier>,
    info: Option<ArtifactInfo>,
}

impl InferencePipeline {
    /// Compose from capabilities; validates the column contract up front
    pub fn new(
        numeric: Arc<dyn NumericTransformer>,
        categorical: Arc<dyn CategoricalTransformer>,
        classifier: Arc<dyn ProbabilisticClassifier>,
    ) -> PipelineResult<Self> {
        let assembler = FeatureAssembler::new(numeric, categorical)?;
        Self::compose(assembler, classifier, None)
    }

    pub fn from_artifacts(set: ArtifactSet) -> PipelineResult<Self> {
        Self::compose(set.assembler, set.classifier, Some(set.info))
    }

    fn compose(
        assembler: FeatureAssembler,
        classifier: Arc<dyn ProbabilisticClassifier>,
        info: Option<ArtifactInfo>,
    ) -> PipelineResult<Self> {
        check_classifier(assembler.schema(), classifier.as_ref())?;

        Ok(Self {
            assembler,
            classifier,
            info,
        })
    }

    /// Load artifacts from disk and build the pipeline
    pub fn load(config: &ArtifactConfig) -> PipelineResult<Self> {
        Self::from_artifacts(ArtifactSet::load(config)?)
    }

    pub fn schema(&self) -> &FeatureSchema {
        self.assembler.schema()
    }

    pub fn info(&self) -> Option<&ArtifactInfo> {
        self.info.as_ref()
    }

    pub fn assemble(&self, record: &RawRecord) -> PipelineResult<FeatureVector> {
        self.assembler.assemble(record)
    }

    pub fn predict_probabilities(&self, record: &RawRecord) -> PipelineResult<ClassProbabilities> {
        let features = self.assemble(record)?;
        self.predict_vector(&features)
    }

    /// Classify an already assembled vector; it must carry this schema's layout
    pub fn predict_vector(&self, features: &FeatureVector) -> PipelineResult<ClassProbabilities> {
        if !features.matches(self.schema()) {
            return Err(PipelineError::Inference(format!(
                "feature vector layout {:08x} ({} values) does not match schema {:08x} ({} columns)",
                features.layout_hash,
                features.len(),
                self.schema().layout_hash(),
                self.schema().len()
            )));
        }
        self.classifier.predict_probabilities(features)
    }

    /// Full classification, structured
    pub fn classify(&self, record: &RawRecord) -> PipelineResult<Verdict> {
        let result = self.predict_probabilities(record).map(decide);
        track(&result);

        if let Ok(verdict) = &result {
            PREDICTION_COUNT.fetch_add(1, Ordering::Relaxed);
            if verdict.is_abnormal() {
                ABNORMAL_COUNT.fetch_add(1, Ordering::Relaxed);
            }
            log::debug!("Verdict: {:?} ({})", verdict.label, verdict.percentage());
        }

        result
    }

    /// The caller-facing entry point: record → verdict string
    pub fn predict(&self, record: &RawRecord) -> PipelineResult<String> {
        self.classify(record).map(|v| v.to_string())
    }

    /// Same as `classify`, starting from loosely-typed input
    pub fn classify_input(&self, input: RawInput) -> PipelineResult<Verdict> {
        let record = RawRecord::try_from(input);
        track(&record);
        self.classify(&record?)
    }

    pub fn predict_input(&self, input: RawInput) -> PipelineResult<String> {
        self.classify_input(input).map(|v| v.to_string())
    }
}

/// Column contract between the assembled schema and the classifier
fn check_classifier(schema: &FeatureSchema, classifier: &dyn ProbabilisticClassifier) -> PipelineResult<()> {
    let names = classifier.feature_names();
    let width = classifier.input_width();

    if let Some(expected) = names {
        schema.validate_against(classifier::ARTIFACT_NAME, expected)?;
    }
    if let Some(width) = width {
        schema.validate_width(classifier::ARTIFACT_NAME, width)?;
    }
    if names.is_none() && width.is_none() {
        log::warn!(
            "Classifier '{}' declares neither columns nor input width; contract unchecked",
            classifier.backend()
        );
    }

    Ok(())
}

// ============================================================================
// REGISTRY
// ============================================================================

/// Process-wide holder of the current pipeline snapshot
#[derive(Default)]
pub struct ArtifactRegistry {
    current: RwLock<Option<Arc<InferencePipeline>>>,
}

impl ArtifactRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pipeline(pipeline: InferencePipeline) -> Self {
        let registry = Self::new();
        registry.install(pipeline);
        registry
    }

    /// Replace the snapshot; callers holding the old Arc keep using it
    pub fn install(&self, pipeline: InferencePipeline) {
        *self.current.write() = Some(Arc::new(pipeline));
    }

    pub fn current(&self) -> PipelineResult<Arc<InferencePipeline>> {
        self.current
            .read()
            .clone()
            .ok_or_else(|| PipelineError::artifact("pipeline", "artifacts not loaded"))
    }

    pub fn is_loaded(&self) -> bool {
        self.current.read().is_some()
    }

    /// Build a complete new snapshot, then swap. On failure the old one stays.
    pub fn reload(&self, config: &ArtifactConfig) -> PipelineResult<Arc<InferencePipeline>> {
        match InferencePipeline::load(config) {
            Ok(pipeline) => {
                let pipeline = Arc::new(pipeline);
                *self.current.write() = Some(pipeline.clone());
                log::info!("Artifacts reloaded");
                Ok(pipeline)
            }
            Err(e) => {
                log::warn!("Reload failed, keeping previous artifacts: {}", e);
                Err(e)
            }
        }
    }

    pub fn unload(&self) {
        *self.current.write() = None;
        log::info!("Artifacts unloaded");
    }
}

// ============================================================================
// TESTS
// ============================================================================
