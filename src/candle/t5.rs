//! T5 sequence-to-sequence backend.

use candle_core::{DType, Device, Tensor};
use candle_transformers::models::t5::{Config, T5ForConditionalGeneration};
use parking_lot::Mutex;

use crate::candle::hub::ModelFiles;
use crate::error::Result;
use crate::model::Seq2SeqModel;

/// T5 encoder-decoder run with candle.
///
/// The decoder is re-run over the full prefix at every step, so no key/value
/// cache is carried between calls.
pub struct CandleT5 {
    model: Mutex<T5ForConditionalGeneration>,
    device: Device,
    decoder_start_token_id: u32,
    eos_token_id: u32,
}

impl CandleT5 {
    pub fn load(files: &ModelFiles, device: &Device) -> Result<Self> {
        let mut config: Config = files.read_config()?;
        config.use_cache = false;

        let vb = files.weights.var_builder(device)?;
        let model = T5ForConditionalGeneration::load(vb, &config)?;

        let decoder_start_token_id = config
            .decoder_start_token_id
            .unwrap_or(config.pad_token_id) as u32;

        Ok(Self {
            model: Mutex::new(model),
            device: device.clone(),
            decoder_start_token_id,
            eos_token_id: config.eos_token_id as u32,
        })
    }
}

impl Seq2SeqModel for CandleT5 {
    type EncoderState = Tensor;

    fn encode(&self, input_ids: &[u32]) -> Result<Tensor> {
        let input = Tensor::new(input_ids, &self.device)?.unsqueeze(0)?;
        Ok(self.model.lock().encode(&input)?)
    }

    fn next_token_logits(&self, state: &Tensor, decoder_ids: &[u32]) -> Result<Vec<f32>> {
        let decoder_input = Tensor::new(decoder_ids, &self.device)?.unsqueeze(0)?;
        let logits = self.model.lock().decode(&decoder_input, state)?;
        Ok(logits.squeeze(0)?.to_dtype(DType::F32)?.to_vec1::<f32>()?)
    }

    fn decoder_start_token_id(&self) -> u32 {
        self.decoder_start_token_id
    }

    fn eos_token_id(&self) -> u32 {
        self.eos_token_id
    }
}
