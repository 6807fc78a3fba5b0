//! Model file download from the Hugging Face Hub.

use std::path::PathBuf;

use candle_core::{DType, Device};
use candle_nn::VarBuilder;
use hf_hub::api::sync::{Api, ApiBuilder};
use hf_hub::{Repo, RepoType};
use tracing::{debug, warn};

use crate::error::{DocExpandError, Result};
use crate::expansion::config::tokenizer_for_model;

/// Local paths of the files needed to run one model.
#[derive(Debug, Clone)]
pub struct ModelFiles {
    pub config: PathBuf,
    pub weights: Weights,
    pub tokenizer: PathBuf,
}

/// Model weights in one of the supported serializations.
#[derive(Debug, Clone)]
pub enum Weights {
    SafeTensors(PathBuf),
    PyTorch(PathBuf),
}

impl Weights {
    /// Build a variable builder over the weights.
    pub fn var_builder(&self, device: &Device) -> Result<VarBuilder<'static>> {
        match self {
            Weights::SafeTensors(path) => {
                let vb = unsafe {
                    VarBuilder::from_mmaped_safetensors(&[path], DType::F32, device).map_err(
                        |e| DocExpandError::model(format!("VarBuilder creation failed: {e}")),
                    )?
                };
                Ok(vb)
            }
            Weights::PyTorch(path) => VarBuilder::from_pth(path, DType::F32, device)
                .map_err(|e| DocExpandError::model(format!("VarBuilder creation failed: {e}"))),
        }
    }
}

fn cache_dir() -> PathBuf {
    std::env::var("HF_HOME")
        .map(PathBuf::from)
        .or_else(|_| {
            std::env::var("HOME").map(|home| PathBuf::from(home).join(".cache").join("huggingface"))
        })
        .unwrap_or_else(|_| PathBuf::from("/tmp/huggingface"))
}

fn api() -> Result<Api> {
    ApiBuilder::new()
        .with_cache_dir(cache_dir())
        .build()
        .map_err(|e| DocExpandError::model(format!("HF API initialization failed: {e}")))
}

fn repo(model: &str, revision: Option<&str>) -> Repo {
    match revision {
        Some(revision) => Repo::with_revision(model.to_string(), RepoType::Model, revision.to_string()),
        None => Repo::model(model.to_string()),
    }
}

impl ModelFiles {
    /// Fetch the config, weights and tokenizer of `model`.
    ///
    /// The tokenizer comes from `tokenizer_repo` when given. Otherwise the
    /// model repository is tried first, then the known tokenizer for the
    /// model.
    pub fn fetch(model: &str, revision: Option<&str>, tokenizer_repo: Option<&str>) -> Result<Self> {
        let api = api()?;
        let model_repo = api.repo(repo(model, revision));

        let config = model_repo
            .get("config.json")
            .map_err(|e| DocExpandError::model(format!("Config download failed for {model}: {e}")))?;

        let weights = match model_repo.get("model.safetensors") {
            Ok(path) => Weights::SafeTensors(path),
            Err(e) => {
                debug!(model, error = %e, "no safetensors weights, trying pytorch_model.bin");
                let path = model_repo.get("pytorch_model.bin").map_err(|e| {
                    DocExpandError::model(format!("Weights download failed for {model}: {e}"))
                })?;
                Weights::PyTorch(path)
            }
        };

        let tokenizer = match tokenizer_repo {
            Some(name) => api
                .model(name.to_string())
                .get("tokenizer.json")
                .map_err(|e| DocExpandError::tokenization(format!("Tokenizer download failed for {name}: {e}")))?,
            None => match model_repo.get("tokenizer.json") {
                Ok(path) => path,
                Err(e) => {
                    let fallback = tokenizer_for_model(model).ok_or_else(|| {
                        DocExpandError::tokenization(format!("Tokenizer download failed for {model}: {e}"))
                    })?;
                    warn!(model, fallback, "model repository has no tokenizer.json");
                    api.model(fallback.to_string()).get("tokenizer.json").map_err(|e| {
                        DocExpandError::tokenization(format!(
                            "Tokenizer download failed for {fallback}: {e}"
                        ))
                    })?
                }
            },
        };

        Ok(Self {
            config,
            weights,
            tokenizer,
        })
    }

    /// Parse the model's `config.json`.
    pub fn read_config<C: serde::de::DeserializeOwned>(&self) -> Result<C> {
        let config_str = std::fs::read_to_string(&self.config)?;
        serde_json::from_str(&config_str)
            .map_err(|e| DocExpandError::model(format!("Config parse failed: {e}")))
    }
}
