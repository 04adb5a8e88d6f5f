//! Pipeline configuration: defaults, JSON file loading and validation.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::audio::SplitConfig;
use crate::chunking::{ChunkingConfig, ParagraphConfig};
use crate::error::PipelineError;
use crate::transcript::GroupingConfig;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PipelineConfig {
    pub split: SplitConfig,
    pub grouping: GroupingConfig,
    pub paragraphs: ParagraphSettings,
    pub chunking: ChunkingConfig,
    pub asr: EndpointConfig,
    pub embedding: EndpointConfig,
    pub index: IndexConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParagraphSettings {
    /// Paragraph grouping is an optional stage; chunks are windowed over raw
    /// segments when disabled.
    pub enabled: bool,
    #[serde(flatten)]
    pub config: ParagraphConfig,
}

impl Default for ParagraphSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            config: ParagraphConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            model: String::new(),
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub base_url: String,
    pub collection: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            collection: "audio_chunks".to_string(),
        }
    }
}

impl PipelineConfig {
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let data = std::fs::read_to_string(path)?;
        let config: PipelineConfig = serde_json::from_str(&data)
            .map_err(|e| PipelineError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Structural validation; bad chunk geometry or split budgets are fatal
    /// before any work starts.
    pub fn validate(&self) -> Result<(), PipelineError> {
        self.chunking
            .validate()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        if self.split.part_budget.0 <= 0 {
            return Err(PipelineError::Config(
                "split.part_budget must be positive".to_string(),
            ));
        }
        if self.split.lookback.0 < 0 || self.split.min_silence.0 <= 0 {
            return Err(PipelineError::Config(
                "split.lookback must be non-negative and split.min_silence positive".to_string(),
            ));
        }
        if self.grouping.max_words_per_segment == 0 {
            return Err(PipelineError::Config(
                "grouping.max_words_per_segment must be positive".to_string(),
            ));
        }
        if self.paragraphs.enabled && self.paragraphs.config.max_units == 0 {
            return Err(PipelineError::Config(
                "paragraphs.max_units must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
