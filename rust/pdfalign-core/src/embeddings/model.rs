// pdfalign-core/src/embeddings/model.rs
//
// ONNX sentence-encoder inference via tract

use std::sync::Arc;

use async_trait::async_trait;
use ndarray::{Array2, Array3, Axis};
use tokenizers::Tokenizer;
use tract_onnx::prelude::*;

use super::config::{EmbedConfig, PoolingStrategy};
use super::TextEmbedder;
use crate::error::ModelError;

type TractModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Token ids for one padded batch, row-major `[batch, seq_len]`
struct EncodedBatch {
    input_ids: Vec<i64>,
    attention_mask: Vec<i64>,
    token_type_ids: Vec<i64>,
    batch: usize,
    seq_len: usize,
}

/// Loaded encoder ready for inference
pub struct EmbedModel {
    plan: Arc<TractModel>,
    tokenizer: Arc<Tokenizer>,
    config: EmbedConfig,
    /// BERT exports take token_type_ids as a third input, XLM-R exports don't
    wants_token_types: bool,
}

impl EmbedModel {
    /// Load model from ONNX bytes and tokenizer JSON
    pub fn from_bytes(model_bytes: &[u8], tokenizer_json: &str, config: EmbedConfig) -> Result<Self, ModelError> {
        let plan = tract_onnx::onnx()
            .model_for_read(&mut std::io::Cursor::new(model_bytes))
            .map_err(|e| ModelError::LoadFailed(e.to_string()))?
            .into_optimized()
            .map_err(|e| ModelError::LoadFailed(e.to_string()))?
            .into_runnable()
            .map_err(|e| ModelError::LoadFailed(e.to_string()))?;

        let tokenizer =
            Tokenizer::from_bytes(tokenizer_json.as_bytes()).map_err(|e| ModelError::Tokenizer(e.to_string()))?;

        let wants_token_types = plan.model().inputs.len() >= 3;
        log::info!(
            "loaded {} ({} dims, {} model inputs)",
            config.model,
            config.model.dimensions(),
            plan.model().inputs.len()
        );

        Ok(Self {
            plan: Arc::new(plan),
            tokenizer: Arc::new(tokenizer),
            config,
            wants_token_types,
        })
    }

    pub fn config(&self) -> &EmbedConfig {
        &self.config
    }

    /// Embed texts, chunked by the configured batch size
    pub fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ModelError> {
        let mut out = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(self.config.batch_size.max(1)) {
            out.extend(self.run_batch(chunk)?);
        }
        Ok(out)
    }

    fn run_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ModelError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let encoded = self.encode(texts)?;
        let shape = [encoded.batch, encoded.seq_len];

        let input_ids =
            Tensor::from_shape(&shape, &encoded.input_ids).map_err(|e| ModelError::Shape(e.to_string()))?;
        let mask_tensor =
            Tensor::from_shape(&shape, &encoded.attention_mask).map_err(|e| ModelError::Shape(e.to_string()))?;

        let mut inputs: TVec<TValue> = tvec![input_ids.into(), mask_tensor.into()];
        if self.wants_token_types {
            let token_types =
                Tensor::from_shape(&shape, &encoded.token_type_ids).map_err(|e| ModelError::Shape(e.to_string()))?;
            inputs.push(token_types.into());
        }

        let outputs = self
            .plan
            .run(inputs)
            .map_err(|e| ModelError::InferenceFailed(e.to_string()))?;

        let first = outputs
            .first()
            .ok_or_else(|| ModelError::InferenceFailed("model produced no outputs".to_string()))?;
        let view = first.to_array_view::<f32>().map_err(|e| ModelError::Shape(e.to_string()))?;

        // tract links its own ndarray; copy through a flat buffer
        let dims = view.shape().to_vec();
        if dims.len() != 3 {
            return Err(ModelError::Shape(format!("expected [batch, seq, hidden], got {:?}", dims)));
        }
        let data: Vec<f32> = view.iter().copied().collect();
        let hidden = Array3::from_shape_vec((dims[0], dims[1], dims[2]), data)
            .map_err(|e| ModelError::Shape(e.to_string()))?;

        let mask = Array2::from_shape_vec((encoded.batch, encoded.seq_len), encoded.attention_mask)
            .map_err(|e| ModelError::Shape(e.to_string()))?;

        let mut embeddings = pool(&hidden, &mask, self.config.effective_pooling());
        if self.config.normalize {
            embeddings.iter_mut().for_each(|e| l2_normalize(e));
        }
        Ok(embeddings)
    }

    fn encode(&self, texts: &[String]) -> Result<EncodedBatch, ModelError> {
        let max_length = self.config.model.max_length();
        let mut rows = Vec::with_capacity(texts.len());

        for text in texts {
            let encoding = self
                .tokenizer
                .encode(text.as_str(), true)
                .map_err(|e| ModelError::Tokenizer(e.to_string()))?;
            let take = encoding.get_ids().len().min(max_length);
            let ids: Vec<i64> = encoding.get_ids()[..take].iter().map(|&v| v as i64).collect();
            let mask: Vec<i64> = encoding.get_attention_mask()[..take].iter().map(|&v| v as i64).collect();
            let types: Vec<i64> = encoding.get_type_ids()[..take].iter().map(|&v| v as i64).collect();
            rows.push((ids, mask, types));
        }

        let seq_len = rows.iter().map(|(ids, _, _)| ids.len()).max().unwrap_or(0);
        let mut batch = EncodedBatch {
            input_ids: Vec::with_capacity(rows.len() * seq_len),
            attention_mask: Vec::with_capacity(rows.len() * seq_len),
            token_type_ids: Vec::with_capacity(rows.len() * seq_len),
            batch: rows.len(),
            seq_len,
        };

        for (ids, mask, types) in rows {
            let pad = seq_len - ids.len();
            batch.input_ids.extend(ids.into_iter().chain(std::iter::repeat(0).take(pad)));
            batch.attention_mask.extend(mask.into_iter().chain(std::iter::repeat(0).take(pad)));
            batch.token_type_ids.extend(types.into_iter().chain(std::iter::repeat(0).take(pad)));
        }

        Ok(batch)
    }
}

#[async_trait]
impl TextEmbedder for EmbedModel {
    fn dimensions(&self) -> usize {
        self.config.model.dimensions()
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ModelError> {
        self.embed_batch(texts)
    }
}

/// Token embeddings `[batch, seq, hidden]` -> one vector per row
fn pool(hidden: &Array3<f32>, mask: &Array2<i64>, strategy: PoolingStrategy) -> Vec<Vec<f32>> {
    hidden
        .axis_iter(Axis(0))
        .zip(mask.axis_iter(Axis(0)))
        .map(|(tokens, row_mask)| match strategy {
            PoolingStrategy::Cls => tokens.row(0).to_vec(),
            PoolingStrategy::Mean => {
                let mut sum = vec![0.0f32; tokens.shape()[1]];
                let mut count = 0.0f32;
                for (j, &m) in row_mask.iter().enumerate() {
                    if m > 0 {
                        for (acc, v) in sum.iter_mut().zip(tokens.row(j).iter()) {
                            *acc += v;
                        }
                        count += 1.0;
                    }
                }
                if count > 0.0 {
                    sum.iter_mut().for_each(|v| *v /= count);
                }
                sum
            }
        })
        .collect()
}

fn l2_normalize(v: &mut [f32]) {
    let norm = super::distance::magnitude(v);
    if norm > 0.0 {
        v.iter_mut().for_each(|x| *x /= norm);
    }
}
