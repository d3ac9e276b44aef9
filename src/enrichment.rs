use crate::error::{RecetarioError, Result};
use crate::model::{RecipeId, RecipeRecord};
use crate::providers::{build_enrichment_prompt, LlmProvider};
use log::debug;
use std::sync::Arc;

/// The prompt sent for one enrichment call, along with the ids it covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentRequest {
    pub ids: Vec<RecipeId>,
    pub prompt: String,
}

impl EnrichmentRequest {
    pub fn new(records: &[RecipeRecord]) -> Self {
        EnrichmentRequest {
            ids: records.iter().map(|r| r.id.clone()).collect(),
            prompt: build_enrichment_prompt(records),
        }
    }
}

/// Asks a text-generation provider for nutrition, difficulty and time
/// estimates. The provider is injected at construction and may be shared
/// with other features.
pub struct EnrichmentClient {
    provider: Arc<dyn LlmProvider>,
}

impl EnrichmentClient {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.provider_name()
    }

    /// Issue exactly one completion call covering every record and return the
    /// raw model text. Provider failures are returned, not swallowed.
    pub async fn enrich(&self, records: &[RecipeRecord]) -> Result<String> {
        let request = EnrichmentRequest::new(records);
        debug!(
            "Requesting enrichment from {} for ids {:?}",
            self.provider_name(),
            request.ids
        );

        self.provider
            .complete(&request.prompt)
            .await
            .map_err(|e| RecetarioError::Enrichment(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ProviderError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingProvider {
        prompts: Arc<Mutex<Vec<String>>>,
        answer: std::result::Result<String, String>,
    }

    #[async_trait]
    impl LlmProvider for RecordingProvider {
        fn provider_name(&self) -> &str {
            "recording"
        }

        async fn complete(&self, prompt: &str) -> std::result::Result<String, ProviderError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.answer.clone().map_err(|e| e.into())
        }
    }

    #[tokio::test]
    async fn test_enrich_makes_one_call_for_all_records() {
        let prompts = Arc::new(Mutex::new(Vec::new()));
        let client = EnrichmentClient::new(Arc::new(RecordingProvider {
            prompts: prompts.clone(),
            answer: Ok("[]".to_string()),
        }));

        let records = vec![RecipeRecord::new("1", "Locro"), RecipeRecord::new("2", "Chipá")];
        let raw = client.enrich(&records).await.unwrap();

        assert_eq!(raw, "[]");
        let prompts = prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains(r#""id":"1""#));
        assert!(prompts[0].contains(r#""id":"2""#));
    }

    #[tokio::test]
    async fn test_enrich_propagates_provider_failure() {
        let client = EnrichmentClient::new(Arc::new(RecordingProvider {
            prompts: Arc::new(Mutex::new(Vec::new())),
            answer: Err("quota exceeded".to_string()),
        }));

        let result = client.enrich(&[RecipeRecord::new("1", "Locro")]).await;
        match result {
            Err(RecetarioError::Enrichment(message)) => assert!(message.contains("quota")),
            other => panic!("expected enrichment error, got {:?}", other),
        }
    }

    #[test]
    fn test_request_lists_ids_in_order() {
        let request = EnrichmentRequest::new(&[
            RecipeRecord::new("9", "Pastelitos"),
            RecipeRecord::new(3i64, "Humita"),
        ]);
        assert_eq!(request.ids, vec![RecipeId::new("9"), RecipeId::new("3")]);
        assert!(request.prompt.contains("Humita"));
    }
}
