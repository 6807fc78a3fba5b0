//! Common types for document expansion.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DocExpandError, Result};

/// Ordered expansion terms produced for one document.
///
/// Sparse and masked-LM strategies order terms by descending score; the
/// generative strategy keeps decode order.
pub type Expansion = Vec<String>;

/// Types of document expansion.
///
/// The serialized identifiers (`t5doc2query`, `splade`, `tilde`) are stable and
/// used as keys in aggregated results.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum ExpansionType {
    /// Queries decoded from a sequence-to-sequence model.
    #[serde(rename = "t5doc2query", alias = "generative")]
    Generative,
    /// Top-weighted terms of a sparse vocabulary encoding.
    #[serde(rename = "splade", alias = "sparse")]
    Sparse,
    /// Top-scoring vocabulary terms of a masked language model.
    #[serde(rename = "tilde", alias = "masked_lm")]
    MaskedLm,
}

impl ExpansionType {
    /// Every expansion type, in identifier order.
    pub const ALL: [ExpansionType; 3] = [
        ExpansionType::Sparse,
        ExpansionType::Generative,
        ExpansionType::MaskedLm,
    ];

    /// The stable identifier of this expansion type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpansionType::Generative => "t5doc2query",
            ExpansionType::Sparse => "splade",
            ExpansionType::MaskedLm => "tilde",
        }
    }

    /// Short human-readable description.
    pub fn description(&self) -> &'static str {
        match self {
            ExpansionType::Generative => "queries sampled from a doc2query sequence-to-sequence model",
            ExpansionType::Sparse => "top-weighted terms of a SPLADE sparse encoding",
            ExpansionType::MaskedLm => "top-scoring vocabulary terms of a TILDE masked language model",
        }
    }
}

impl fmt::Display for ExpansionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExpansionType {
    type Err = DocExpandError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "t5doc2query" | "doc2query" | "generative" => Ok(ExpansionType::Generative),
            "splade" | "sparse" => Ok(ExpansionType::Sparse),
            "tilde" | "masked_lm" | "maskedlm" | "mlm" => Ok(ExpansionType::MaskedLm),
            other => Err(DocExpandError::invalid_identifier(format!(
                "unknown expansion type '{other}'"
            ))),
        }
    }
}

/// Device a model should be placed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DeviceSpec {
    #[default]
    Cpu,
    /// CUDA device by ordinal.
    Cuda(usize),
    /// Metal (Apple silicon) device by ordinal.
    Metal(usize),
}

impl fmt::Display for DeviceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceSpec::Cpu => f.write_str("cpu"),
            DeviceSpec::Cuda(ordinal) => write!(f, "cuda:{ordinal}"),
            DeviceSpec::Metal(ordinal) => write!(f, "metal:{ordinal}"),
        }
    }
}

impl FromStr for DeviceSpec {
    type Err = DocExpandError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase();
        let (kind, ordinal) = match normalized.split_once(':') {
            Some((kind, ordinal)) => {
                let ordinal = ordinal.parse::<usize>().map_err(|_| {
                    DocExpandError::invalid_identifier(format!("invalid device ordinal in '{s}'"))
                })?;
                (kind, ordinal)
            }
            None => (normalized.as_str(), 0),
        };

        match kind {
            "cpu" if ordinal == 0 => Ok(DeviceSpec::Cpu),
            "cuda" | "gpu" => Ok(DeviceSpec::Cuda(ordinal)),
            "metal" | "mps" => Ok(DeviceSpec::Metal(ordinal)),
            _ => Err(DocExpandError::invalid_identifier(format!(
                "unknown device '{s}'"
            ))),
        }
    }
}

impl TryFrom<String> for DeviceSpec {
    type Error = DocExpandError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<DeviceSpec> for String {
    fn from(value: DeviceSpec) -> Self {
        value.to_string()
    }
}
