//! The capability every translation backend provides

use async_trait::async_trait;
use futures::future::try_join_all;

use crate::core::errors::Result;
use crate::core::models::{BatchTranslationRequest, TranslationRequest};

/// Remote translation capability: `Translate` and `BatchTranslate`.
///
/// Implemented by the HTTP transport on the client side and by translation
/// engines on the server side. Implementations must be safe to call from many
/// tasks at once.
#[async_trait]
pub trait TranslationService: Send + Sync {
    /// Translate one text
    async fn translate(&self, request: &TranslationRequest) -> Result<String>;

    /// Translate a list of texts, returning translations in input order.
    ///
    /// The default issues every item concurrently through [`translate`] and
    /// fails as a whole if any item fails.
    ///
    /// [`translate`]: TranslationService::translate
    async fn batch_translate(&self, request: &BatchTranslationRequest) -> Result<Vec<String>> {
        let items: Vec<TranslationRequest> = request
            .texts
            .iter()
            .map(|text| TranslationRequest {
                text: text.clone(),
                source_lang: request.source_lang.clone(),
                target_lang: request.target_lang.clone(),
            })
            .collect();

        try_join_all(items.iter().map(|item| self.translate(item))).await
    }

    /// Release any resources held by the backend. Called once by the channel.
    fn release(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::TranslationError;
    use crate::core::models::LanguagePair;

    struct Upper;

    #[async_trait]
    impl TranslationService for Upper {
        async fn translate(&self, request: &TranslationRequest) -> Result<String> {
            if request.text == "boom" {
                return Err(TranslationError::TimeoutError);
            }
            Ok(request.text.to_uppercase())
        }
    }

    #[tokio::test]
    async fn test_default_batch_preserves_order() {
        let request = BatchTranslationRequest::new(
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
            &LanguagePair::default(),
        );
        let result = Upper.batch_translate(&request).await.unwrap();
        assert_eq!(result, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_default_batch_fails_as_a_whole() {
        let request = BatchTranslationRequest::new(
            vec!["a".to_string(), "boom".to_string()],
            &LanguagePair::default(),
        );
        assert!(Upper.batch_translate(&request).await.is_err());
    }
}
