//! AnchorResolutionPipeline: chunk -> Anchor.
//!
//! Pick the document for the chunk's language, range-check the page, match the
//! quote on that page's text layer, reduce the matched tokens to a rect, stamp
//! id/hash/time. A quote that can't be located still gets an anchor with the
//! placeholder rect; only malformed input and embedding failures are errors.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::dataset::LanguageChunk;
use crate::embeddings::EmbeddingResource;
use crate::error::{AnchorError, DatasetError, ModelError};
use crate::layer::{BoundingBoxResolver, NormalizedRect, TextLayer, TextToken};
use crate::matcher::{
    CancellationToken, EmbeddingMatcher, MatchKind, MatchOutcome, NotFoundReason, SequenceMatcher,
};

use super::config::{AnchorConfig, MatchStrategy};
use super::source::{DocumentSet, PageSource};
use super::types::Anchor;

/// What to locate, and where
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorRequest {
    pub text: String,
    pub language: String,
    /// 1-based; out-of-range pages resolve to a placeholder
    pub page: u32,
    #[serde(default)]
    pub row_number: Option<u64>,
}

impl AnchorRequest {
    pub fn new(text: impl Into<String>, language: impl Into<String>, page: u32) -> Self {
        Self {
            text: text.into(),
            language: language.into(),
            page,
            row_number: None,
        }
    }
}

impl TryFrom<&LanguageChunk> for AnchorRequest {
    type Error = DatasetError;

    fn try_from(chunk: &LanguageChunk) -> Result<Self, Self::Error> {
        Ok(Self {
            text: chunk.text.clone(),
            language: chunk.language.clone(),
            page: chunk.page_number()?,
            row_number: Some(chunk.chunk_id),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResolutionOutcome {
    Located { strategy: MatchKind, score: f64 },
    Placeholder { reason: NotFoundReason },
}

/// The anchor plus how it was obtained, for caller-side reporting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorResolution {
    pub anchor: Anchor,
    pub outcome: ResolutionOutcome,
}

impl AnchorResolution {
    pub fn is_placeholder(&self) -> bool {
        matches!(self.outcome, ResolutionOutcome::Placeholder { .. })
    }
}

/// Page-level preparation shared by the sync and async paths
enum Prepared {
    OutOfRange { document: Arc<dyn PageSource>, reason: NotFoundReason },
    Ready { document: Arc<dyn PageSource>, layer: TextLayer },
}

pub struct AnchorResolutionPipeline {
    config: AnchorConfig,
    sequence: SequenceMatcher,
    semantic: Option<EmbeddingMatcher>,
}

impl Default for AnchorResolutionPipeline {
    fn default() -> Self {
        Self::new(AnchorConfig::default())
    }
}

impl AnchorResolutionPipeline {
    pub fn new(config: AnchorConfig) -> Self {
        let sequence = SequenceMatcher::new(config.sequence.clone());
        Self {
            config,
            sequence,
            semantic: None,
        }
    }

    /// Attach the shared embedding model used by semantic strategies
    pub fn with_embeddings(mut self, resource: Arc<EmbeddingResource>) -> Self {
        self.semantic = Some(EmbeddingMatcher::new(self.config.semantic.clone(), resource));
        self
    }

    pub fn config(&self) -> &AnchorConfig {
        &self.config
    }

    /// Literal-only resolution, whatever the configured strategy
    pub fn resolve_literal(
        &self,
        request: &AnchorRequest,
        documents: &DocumentSet,
    ) -> Result<AnchorResolution, AnchorError> {
        match self.prepare(request, documents)? {
            Prepared::OutOfRange { document, reason } => Ok(self.placeholder(request, document.as_ref(), reason)),
            Prepared::Ready { document, layer } => {
                let outcome = self.sequence.find(&request.text, &layer.tokens);
                self.finish(request, document.as_ref(), &layer, outcome)
            }
        }
    }

    /// Resolve with the configured strategy
    pub async fn resolve(
        &self,
        request: &AnchorRequest,
        documents: &DocumentSet,
    ) -> Result<AnchorResolution, AnchorError> {
        self.resolve_with_cancel(request, documents, None).await
    }

    pub async fn resolve_with_cancel(
        &self,
        request: &AnchorRequest,
        documents: &DocumentSet,
        cancel: Option<&CancellationToken>,
    ) -> Result<AnchorResolution, AnchorError> {
        let (document, layer) = match self.prepare(request, documents)? {
            Prepared::OutOfRange { document, reason } => {
                return Ok(self.placeholder(request, document.as_ref(), reason));
            }
            Prepared::Ready { document, layer } => (document, layer),
        };

        let outcome = match self.config.strategy {
            MatchStrategy::Sequence => self.sequence.find(&request.text, &layer.tokens),
            MatchStrategy::Semantic => self.semantic()?.find(&request.text, &layer.tokens, cancel).await?,
            MatchStrategy::SequenceThenSemantic => {
                let literal = self.sequence.find(&request.text, &layer.tokens);
                if literal.is_found() {
                    literal
                } else {
                    self.semantic()?.find(&request.text, &layer.tokens, cancel).await?
                }
            }
        };

        self.finish(request, document.as_ref(), &layer, outcome)
    }

    /// Literal match against tokens the caller already holds
    pub fn locate(&self, quote: &str, tokens: &[TextToken]) -> MatchOutcome {
        self.sequence.find(quote, tokens)
    }

    fn semantic(&self) -> Result<&EmbeddingMatcher, ModelError> {
        self.semantic
            .as_ref()
            .ok_or_else(|| ModelError::Unavailable("no embedding resource attached to the pipeline".to_string()))
    }

    fn prepare(&self, request: &AnchorRequest, documents: &DocumentSet) -> Result<Prepared, AnchorError> {
        let document = Arc::clone(documents.get(&request.language)?);
        let num_pages = document.num_pages();

        if request.page < 1 || request.page > num_pages {
            log::warn!(
                "{} chunk {:?}: page {} outside 1..={}, using placeholder",
                request.language,
                request.row_number,
                request.page,
                num_pages
            );
            return Ok(Prepared::OutOfRange {
                document,
                reason: NotFoundReason::PageOutOfRange {
                    page: request.page,
                    num_pages,
                },
            });
        }

        let layer = document.text_layer(request.page)?;
        layer.validate()?;
        Ok(Prepared::Ready { document, layer })
    }

    fn finish(
        &self,
        request: &AnchorRequest,
        document: &dyn PageSource,
        layer: &TextLayer,
        outcome: MatchOutcome,
    ) -> Result<AnchorResolution, AnchorError> {
        let result = match outcome {
            MatchOutcome::Matched(result) => result,
            MatchOutcome::NotFound(reason) => return Ok(self.placeholder(request, document, reason)),
        };

        let tokens = result.token_indices.iter().filter_map(|&i| layer.tokens.get(i));
        let rect = BoundingBoxResolver::resolve(tokens, layer.viewport.scaled_width(), layer.viewport.scaled_height())
            .map_err(|e| match e {
                AnchorError::MalformedTextLayer { reason, .. } => AnchorError::MalformedTextLayer {
                    page: layer.page,
                    reason,
                },
                other => other,
            })?;

        let anchor = self.stamp(request, document, request.page, rect);
        Ok(AnchorResolution {
            anchor,
            outcome: ResolutionOutcome::Located {
                strategy: result.kind,
                score: result.score,
            },
        })
    }

    fn placeholder(&self, request: &AnchorRequest, document: &dyn PageSource, reason: NotFoundReason) -> AnchorResolution {
        log::debug!(
            "{} chunk {:?} page {}: placeholder anchor ({:?})",
            request.language,
            request.row_number,
            request.page,
            reason
        );
        let page = request.page.clamp(1, document.num_pages().max(1));
        AnchorResolution {
            anchor: self.stamp(request, document, page, NormalizedRect::placeholder()),
            outcome: ResolutionOutcome::Placeholder { reason },
        }
    }

    fn stamp(&self, request: &AnchorRequest, document: &dyn PageSource, page: u32, rect: NormalizedRect) -> Anchor {
        let anchor = Anchor::new(document.document_id(), page, rect, request.text.clone());
        match request.row_number {
            Some(row) => anchor.with_row_number(row),
            None => anchor,
        }
    }
}
