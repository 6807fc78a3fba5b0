//! BERT masked-LM backends.

use candle_core::{DType, Device, Tensor, D};
use candle_transformers::models::bert::{BertForMaskedLM, Config};

use crate::candle::hub::ModelFiles;
use crate::candle::tokenizer::HfTokenizer;
use crate::error::Result;
use crate::model::{MaskedLanguageModel, SparseEncoder, SparseVector};
use crate::tokenization::{BatchEncoding, TextTokenizer};

fn load_masked_lm(files: &ModelFiles, device: &Device) -> Result<BertForMaskedLM> {
    let config: Config = files.read_config()?;
    let vb = files.weights.var_builder(device)?;
    Ok(BertForMaskedLM::load(vb, &config)?)
}

fn to_tensor(rows: &[Vec<u32>], device: &Device) -> Result<Tensor> {
    let seq_len = rows.first().map_or(0, Vec::len);
    let flat: Vec<u32> = rows.iter().flatten().copied().collect();
    Ok(Tensor::from_vec(flat, (rows.len(), seq_len), device)?)
}

/// Vocabulary logits for every position of every row: `[batch, seq, vocab]`.
fn forward(model: &BertForMaskedLM, batch: &BatchEncoding, device: &Device) -> Result<(Tensor, Tensor)> {
    let input_ids = to_tensor(&batch.input_ids, device)?;
    let token_type_ids = to_tensor(&batch.token_type_ids, device)?;
    let attention_mask = to_tensor(&batch.attention_mask, device)?;

    let logits = model.forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
    Ok((logits, attention_mask))
}

/// BERT masked-LM scored at the leading position.
pub struct CandleMaskedLm {
    model: BertForMaskedLM,
    device: Device,
}

impl CandleMaskedLm {
    pub fn load(files: &ModelFiles, device: &Device) -> Result<Self> {
        Ok(Self {
            model: load_masked_lm(files, device)?,
            device: device.clone(),
        })
    }
}

impl MaskedLanguageModel for CandleMaskedLm {
    fn leading_logits(&self, batch: &BatchEncoding) -> Result<Vec<Vec<f32>>> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        let (logits, _) = forward(&self.model, batch, &self.device)?;
        let leading = logits.narrow(1, 0, 1)?.squeeze(1)?.to_dtype(DType::F32)?;
        Ok(leading.to_vec2::<f32>()?)
    }
}

/// SPLADE document encoder over a BERT masked-LM head.
///
/// Term weights are `max over positions of log(1 + relu(logit))`, with padded
/// positions masked out.
pub struct CandleSplade {
    model: BertForMaskedLM,
    tokenizer: HfTokenizer,
    device: Device,
}

impl CandleSplade {
    pub fn load(files: &ModelFiles, tokenizer: HfTokenizer, device: &Device) -> Result<Self> {
        Ok(Self {
            model: load_masked_lm(files, device)?,
            tokenizer,
            device: device.clone(),
        })
    }
}

impl SparseEncoder for CandleSplade {
    fn encode(&self, documents: &[&str]) -> Result<Vec<SparseVector>> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        let batch = self.tokenizer.encode_batch(documents, true)?;
        let (logits, attention_mask) = forward(&self.model, &batch, &self.device)?;

        let mask = attention_mask.to_dtype(DType::F32)?.unsqueeze(D::Minus1)?;
        let weights = logits
            .to_dtype(DType::F32)?
            .relu()?
            .affine(1.0, 1.0)?
            .log()?
            .broadcast_mul(&mask)?
            .max(1)?;

        Ok(weights
            .to_vec2::<f32>()?
            .iter()
            .map(|row| SparseVector::from_dense(row, 0.0))
            .collect())
    }
}
