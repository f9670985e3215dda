use std::fmt;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use candle_core::{DType, Device, IndexOp, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use hf_hub::api::sync::Api;
use hf_hub::{Repo, RepoType};
use ragkit_core::{Embedding, EmbeddingError};
use serde::Deserialize;
use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};

use crate::{DeviceTarget, EmbeddingProviderError, HardwareProbe, SystemProbe, DEFAULT_MODEL_ID};

/// How token states are reduced to one vector per text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pooling {
    /// Hidden state of the leading `[CLS]` token, as BGE models expect.
    Cls,
    /// Attention-masked mean over all tokens.
    Mean,
}

#[derive(Deserialize)]
struct HiddenSize {
    hidden_size: usize,
}

#[derive(Clone, Debug)]
pub struct CandleEmbeddingBuilder {
    model_id: String,
    revision: String,
    target: Option<DeviceTarget>,
    pooling: Pooling,
    normalize: bool,
    max_length: usize,
}

impl Default for CandleEmbeddingBuilder {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL_ID.to_string(),
            revision: "main".to_string(),
            target: None,
            pooling: Pooling::Cls,
            normalize: true,
            max_length: 512,
        }
    }
}

impl CandleEmbeddingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model_id(mut self, value: impl Into<String>) -> Self {
        self.model_id = value.into();
        self
    }

    pub fn revision(mut self, value: impl Into<String>) -> Self {
        self.revision = value.into();
        self
    }

    /// Pins the device instead of probing the machine at build time.
    pub fn target(mut self, value: DeviceTarget) -> Self {
        self.target = Some(value);
        self
    }

    pub fn pooling(mut self, value: Pooling) -> Self {
        self.pooling = value;
        self
    }

    pub fn normalize(mut self, value: bool) -> Self {
        self.normalize = value;
        self
    }

    pub fn max_length(mut self, value: usize) -> Self {
        self.max_length = value;
        self
    }

    /// Whether built models return unit-length vectors.
    pub fn is_normalized(&self) -> bool {
        self.normalize
    }

    /// Downloads (or reuses the hf-hub cache of) the model files and loads
    /// the weights onto the selected device.
    pub fn build(self) -> Result<CandleEmbedding, EmbeddingProviderError> {
        self.build_with_probe(&SystemProbe)
    }

    pub fn build_with_probe(
        self,
        probe: &dyn HardwareProbe,
    ) -> Result<CandleEmbedding, EmbeddingProviderError> {
        if self.model_id.trim().is_empty() {
            return Err(EmbeddingProviderError::ModelLoad(
                "model id must not be empty".to_string(),
            ));
        }
        if self.max_length == 0 {
            return Err(EmbeddingProviderError::ModelLoad(
                "max_length must be greater than zero".to_string(),
            ));
        }

        let target = self.target.unwrap_or_else(|| DeviceTarget::detect(probe));
        let device = target.device()?;
        tracing::info!(model_id = %self.model_id, ?target, "loading embedding model");

        let api = Api::new().map_err(|e| {
            EmbeddingProviderError::ModelLoad(format!("failed to create HuggingFace API client: {e}"))
        })?;
        let repo = api.repo(Repo::with_revision(
            self.model_id.clone(),
            RepoType::Model,
            self.revision.clone(),
        ));
        let fetch = |file: &str| {
            repo.get(file).map_err(|e| {
                EmbeddingProviderError::ModelLoad(format!(
                    "failed to download {file} from {}: {e}",
                    self.model_id
                ))
            })
        };

        let config_path = fetch("config.json")?;
        let tokenizer_path = fetch("tokenizer.json")?;

        let config_str = std::fs::read_to_string(&config_path).map_err(|e| {
            EmbeddingProviderError::ModelLoad(format!("failed to read BERT config: {e}"))
        })?;
        let config: BertConfig = serde_json::from_str(&config_str)
            .map_err(|e| EmbeddingProviderError::ModelLoad(format!("invalid BERT config: {e}")))?;
        let dimension = serde_json::from_str::<HiddenSize>(&config_str)
            .map_err(|e| EmbeddingProviderError::ModelLoad(format!("invalid BERT config: {e}")))?
            .hidden_size;

        let vb = match fetch("model.safetensors") {
            // SAFETY: the file comes from the hf-hub cache and is not modified
            // while the VarBuilder is alive.
            Ok(weights) => unsafe {
                VarBuilder::from_mmaped_safetensors(&[weights], DType::F32, &device)
            },
            Err(err) => {
                tracing::debug!(error = %err, "no safetensors weights, trying pytorch_model.bin");
                VarBuilder::from_pth(fetch("pytorch_model.bin")?, DType::F32, &device)
            }
        }
        .map_err(|e| EmbeddingProviderError::ModelLoad(format!("failed to map weights: {e}")))?;

        let model = BertModel::load(vb, &config)
            .map_err(|e| EmbeddingProviderError::ModelLoad(format!("failed to build BERT: {e}")))?;
        let tokenizer = load_tokenizer(&tokenizer_path, self.max_length)?;

        Ok(CandleEmbedding {
            model: Arc::new(model),
            tokenizer: Arc::new(tokenizer),
            device,
            target,
            model_id: self.model_id,
            pooling: self.pooling,
            normalize: self.normalize,
            dimension,
        })
    }
}

fn load_tokenizer(path: &Path, max_length: usize) -> Result<Tokenizer, EmbeddingProviderError> {
    let mut tokenizer = Tokenizer::from_file(path).map_err(|e| {
        EmbeddingProviderError::ModelLoad(format!(
            "failed to load tokenizer from {}: {e}",
            path.display()
        ))
    })?;
    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length,
            ..Default::default()
        }))
        .map_err(|e| EmbeddingProviderError::ModelLoad(format!("invalid truncation: {e}")))?;
    tokenizer.with_padding(Some(PaddingParams {
        strategy: PaddingStrategy::BatchLongest,
        ..Default::default()
    }));
    Ok(tokenizer)
}

/// A BERT sentence-embedding model running on candle.
#[derive(Clone)]
pub struct CandleEmbedding {
    model: Arc<BertModel>,
    tokenizer: Arc<Tokenizer>,
    device: Device,
    target: DeviceTarget,
    model_id: String,
    pooling: Pooling,
    normalize: bool,
    dimension: usize,
}

impl fmt::Debug for CandleEmbedding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CandleEmbedding")
            .field("model_id", &self.model_id)
            .field("target", &self.target)
            .field("dimension", &self.dimension)
            .finish_non_exhaustive()
    }
}

impl CandleEmbedding {
    pub fn builder() -> CandleEmbeddingBuilder {
        CandleEmbeddingBuilder::default()
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn target(&self) -> DeviceTarget {
        self.target
    }

    pub fn is_normalized(&self) -> bool {
        self.normalize
    }

    pub fn embed_sync(&self, text: &str) -> Result<Vec<f32>, EmbeddingProviderError> {
        self.embed_batch_sync(&[text.to_string()])?
            .pop()
            .ok_or_else(|| EmbeddingProviderError::Inference("empty model output".to_string()))
    }

    pub fn embed_batch_sync(
        &self,
        texts: &[String],
    ) -> Result<Vec<Vec<f32>>, EmbeddingProviderError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| EmbeddingProviderError::Inference(format!("tokenizer encode failed: {e}")))?;

        let mut ids = Vec::with_capacity(encodings.len());
        let mut masks = Vec::with_capacity(encodings.len());
        for encoding in &encodings {
            ids.push(Tensor::new(encoding.get_ids(), &self.device)?);
            masks.push(Tensor::new(encoding.get_attention_mask(), &self.device)?);
        }
        let input_ids = Tensor::stack(&ids, 0)?;
        let attention_mask = Tensor::stack(&masks, 0)?;
        let token_type_ids = input_ids.zeros_like()?;

        let hidden = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;

        let pooled = match self.pooling {
            Pooling::Cls => hidden.i((.., 0))?,
            Pooling::Mean => {
                let mask = attention_mask.to_dtype(DType::F32)?.unsqueeze(2)?;
                let summed = hidden.broadcast_mul(&mask)?.sum(1)?;
                let counts = mask.sum(1)?;
                summed.broadcast_div(&counts)?
            }
        };

        let pooled = if self.normalize {
            let norm = pooled.sqr()?.sum_keepdim(1)?.sqrt()?;
            pooled.broadcast_div(&norm)?
        } else {
            pooled
        };

        Ok(pooled.to_vec2::<f32>()?)
    }
}

fn join_error(err: tokio::task::JoinError) -> EmbeddingProviderError {
    EmbeddingProviderError::Inference(format!("embedding task failed: {err}"))
}

#[async_trait]
impl Embedding for CandleEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let model = self.clone();
        let text = text.to_string();
        Ok(tokio::task::spawn_blocking(move || model.embed_sync(&text))
            .await
            .map_err(join_error)??)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let model = self.clone();
        let texts = texts.to_vec();
        Ok(tokio::task::spawn_blocking(move || model.embed_batch_sync(&texts))
            .await
            .map_err(join_error)??)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
