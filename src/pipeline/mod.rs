pub mod prompt;
pub mod schema;

pub use prompt::{build_analysis_prompt, AnalysisBudget};
pub use schema::{merge_tags, validate_analysis, AiAnalysis, SchemaError};

use crate::classifier::HeuristicClassifier;
use crate::gateway::{json, CompletionParams, CompletionProvider, GatewayError};
use crate::models::{Analysis, ParsedFile};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Default sampling temperature for analysis requests
pub const ANALYSIS_TEMPERATURE: f32 = 0.3;

/// Why an AI enrichment attempt was dropped
#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("AI analysis failed validation: {0}")]
    Schema(#[from] SchemaError),
}

/// What happened to the AI step of an analysis
#[derive(Debug)]
pub enum Enrichment {
    /// AI was not requested, no gateway is configured, or the gateway is offline
    Skipped,
    Applied,
    /// The heuristic result was kept
    Failed(EnrichmentError),
}

impl Enrichment {
    pub fn is_applied(&self) -> bool {
        matches!(self, Enrichment::Applied)
    }
}

#[derive(Debug)]
pub struct AnalysisReport {
    pub analysis: Analysis,
    pub enrichment: Enrichment,
}

/// Heuristic classification with optional AI enrichment.
///
/// The AI step is best-effort: any gateway or validation failure is logged
/// and the heuristic analysis is returned unchanged.
pub struct ClassificationPipeline {
    classifier: HeuristicClassifier,
    gateway: Option<Arc<dyn CompletionProvider>>,
    temperature: f32,
}

impl ClassificationPipeline {
    /// Heuristics only
    pub fn new(classifier: HeuristicClassifier) -> Self {
        Self {
            classifier,
            gateway: None,
            temperature: ANALYSIS_TEMPERATURE,
        }
    }

    pub fn with_gateway(mut self, gateway: Arc<dyn CompletionProvider>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn classifier(&self) -> &HeuristicClassifier {
        &self.classifier
    }

    pub async fn analyze(&self, parsed: &ParsedFile, use_ai: bool, deep: bool) -> Analysis {
        self.analyze_with_report(parsed, use_ai, deep).await.analysis
    }

    /// Like [`analyze`](Self::analyze), also reporting the outcome of the AI step
    pub async fn analyze_with_report(&self, parsed: &ParsedFile, use_ai: bool, deep: bool) -> AnalysisReport {
        let glyphs = self.classifier.classify_quick(parsed);
        let mut analysis = Analysis::from_parsed(parsed, glyphs);

        let gateway = match &self.gateway {
            Some(gateway) if use_ai && gateway.is_online() => gateway,
            _ => {
                return AnalysisReport {
                    analysis,
                    enrichment: Enrichment::Skipped,
                }
            }
        };

        let enrichment = match self.request_analysis(gateway.as_ref(), parsed, deep).await {
            Ok(ai) => {
                analysis.description = ai.description;
                analysis.energy = ai.energy;
                analysis.tags = merge_tags(&analysis.tags, &ai.tags);
                analysis.best_for = ai.best_for;
                debug!("AI analysis applied to {}", parsed.filename);
                Enrichment::Applied
            }
            Err(e) => {
                warn!("AI analysis failed for {}, using quick detection: {}", parsed.filename, e);
                Enrichment::Failed(e)
            }
        };

        AnalysisReport { analysis, enrichment }
    }

    async fn request_analysis(
        &self,
        gateway: &dyn CompletionProvider,
        parsed: &ParsedFile,
        deep: bool,
    ) -> Result<AiAnalysis, EnrichmentError> {
        let budget = AnalysisBudget::for_depth(deep);
        let prompt = build_analysis_prompt(parsed, budget);
        let text = gateway
            .complete(&prompt, CompletionParams::new(budget.max_tokens, self.temperature))
            .await?;
        let value = json::extract_object(&text)?;
        Ok(validate_analysis(&value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Energy;
    use crate::parser::ContentParser;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Scripted provider returning canned responses
    struct FakeProvider {
        online: bool,
        response: Result<String, u16>,
        calls: AtomicUsize,
        last_params: Mutex<Option<CompletionParams>>,
    }

    impl FakeProvider {
        fn new(online: bool, response: Result<&str, u16>) -> Self {
            Self {
                online,
                response: response.map(str::to_string),
                calls: AtomicUsize::new(0),
                last_params: Mutex::new(None),
            }
        }
    }

    #[async_trait::async_trait]
    impl CompletionProvider for FakeProvider {
        async fn check_status(&self) -> bool {
            self.online
        }

        fn is_online(&self) -> bool {
            self.online
        }

        async fn complete(&self, _prompt: &str, params: CompletionParams) -> Result<String, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_params.lock().unwrap() = Some(params);
            match &self.response {
                Ok(text) => Ok(text.clone()),
                Err(status) => Err(GatewayError::Http {
                    status: *status,
                    body: String::new(),
                }),
            }
        }
    }

    fn game_file() -> ParsedFile {
        ContentParser::new().parse(
            "arcade.html",
            "<title>Arcade</title><script>// game with a timer, function loop() {}</script>",
        )
    }

    fn pipeline(provider: Arc<FakeProvider>) -> ClassificationPipeline {
        ClassificationPipeline::new(HeuristicClassifier::new()).with_gateway(provider)
    }

    #[tokio::test]
    async fn test_analyze_without_ai() {
        let provider = Arc::new(FakeProvider::new(true, Ok("{}")));
        let report = pipeline(provider.clone())
            .analyze_with_report(&game_file(), false, false)
            .await;

        assert!(matches!(report.enrichment, Enrichment::Skipped));
        assert_eq!(report.analysis.energy, Energy::Energetic);
        assert_eq!(report.analysis.tags, vec!["game", "timer"]);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_analyze_applies_ai() {
        let response = r#"Here you go: {"description": "An arcade game.", "energy": "calm", "tags": ["game", "arcade", " "], "bestFor": "kids"}"#;
        let provider = Arc::new(FakeProvider::new(true, Ok(response)));
        let report = pipeline(provider.clone())
            .analyze_with_report(&game_file(), true, false)
            .await;

        assert!(report.enrichment.is_applied());
        let analysis = report.analysis;
        assert_eq!(analysis.description, "An arcade game.");
        assert_eq!(analysis.energy, Energy::Calm);
        // The heuristic signature is never overwritten
        assert_eq!(analysis.glyphs.energy, Energy::Energetic);
        assert_eq!(analysis.tags, vec!["game", "timer", "arcade"]);
        assert_eq!(analysis.best_for, "kids");
    }

    #[tokio::test]
    async fn test_deep_analysis_budget() {
        let provider = Arc::new(FakeProvider::new(true, Ok("{\"energy\": \"spiral\"}")));
        pipeline(provider.clone()).analyze(&game_file(), true, true).await;

        let params = provider.last_params.lock().unwrap().unwrap();
        assert_eq!(params.max_tokens, 400);
        assert_eq!(params.temperature, ANALYSIS_TEMPERATURE);
    }

    #[tokio::test]
    async fn test_gateway_failure_matches_quick_result() {
        let failing = Arc::new(FakeProvider::new(true, Err(500)));
        let quick = ClassificationPipeline::new(HeuristicClassifier::new())
            .analyze(&game_file(), false, false)
            .await;
        let report = pipeline(failing).analyze_with_report(&game_file(), true, false).await;

        assert!(matches!(
            report.enrichment,
            Enrichment::Failed(EnrichmentError::Gateway(GatewayError::Http { status: 500, .. }))
        ));
        assert_eq!(report.analysis, quick);
    }

    #[tokio::test]
    async fn test_malformed_response_keeps_heuristics() {
        let provider = Arc::new(FakeProvider::new(true, Ok("I cannot answer that.")));
        let quick = ClassificationPipeline::new(HeuristicClassifier::new())
            .analyze(&game_file(), false, false)
            .await;
        let report = pipeline(provider).analyze_with_report(&game_file(), true, false).await;

        assert!(matches!(report.enrichment, Enrichment::Failed(_)));
        assert_eq!(report.analysis, quick);
    }

    #[tokio::test]
    async fn test_offline_gateway_is_skipped() {
        let provider = Arc::new(FakeProvider::new(false, Ok("{}")));
        let report = pipeline(provider.clone())
            .analyze_with_report(&game_file(), true, false)
            .await;

        assert!(matches!(report.enrichment, Enrichment::Skipped));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }
}
