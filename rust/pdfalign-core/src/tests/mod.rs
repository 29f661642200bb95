//! Contract tests per component. Module-local behaviour is tested next to the
//! code; these exercise the public surface end to end.

mod dataset_tests;
mod sync_tests;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::embeddings::{EmbeddingResource, TextEmbedder};
use crate::error::ModelError;
use crate::layer::TextToken;

/// Two-dimensional "embedding": (#words starting with `topic`, #other words).
/// Texts about the topic point one way, filler the other.
pub(crate) struct TopicEmbedder {
    pub calls: AtomicUsize,
}

impl TopicEmbedder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextEmbedder for TopicEmbedder {
    fn dimensions(&self) -> usize {
        2
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts
            .iter()
            .map(|text| {
                let (topic, other) = text
                    .split_whitespace()
                    .fold((0.0, 0.0), |(t, o), w| if w.starts_with("topic") { (t + 1.0, o) } else { (t, o + 1.0) });
                vec![topic, other]
            })
            .collect())
    }
}

pub(crate) fn topic_resource(embedder: &Arc<TopicEmbedder>) -> Arc<EmbeddingResource> {
    Arc::new(EmbeddingResource::ready(Arc::clone(embedder) as Arc<dyn TextEmbedder>))
}

pub(crate) fn broken_resource() -> Arc<EmbeddingResource> {
    Arc::new(EmbeddingResource::lazy(|| Err(ModelError::LoadFailed("weights missing".to_string()))))
}

/// One token per word laid out left to right, 10 per line
pub(crate) fn line_tokens(words: &[&str]) -> Vec<TextToken> {
    words
        .iter()
        .enumerate()
        .map(|(i, w)| {
            let col = (i % 10) as f64;
            let row = (i / 10) as f64;
            TextToken::new(*w, 10.0 + col * 50.0, 20.0 + row * 15.0, 45.0, 12.0)
        })
        .collect()
}

/// `n` filler words followed by `m` topic words
pub(crate) fn filler_then_topic(n: usize, m: usize) -> Vec<TextToken> {
    let words: Vec<String> = (0..n)
        .map(|i| format!("filler{}", i))
        .chain((0..m).map(|i| format!("topic{}", i)))
        .collect();
    let refs: Vec<&str> = words.iter().map(String::as_str).collect();
    line_tokens(&refs)
}
