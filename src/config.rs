//! Synthesizer settings, read from an optional JSON file.
//!
//! Every field has a default, so `{}` is a valid config. CLI flags are
//! applied on top of whatever the file provides.
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::strgen::{DEFAULT_PLACEHOLDER, FieldNameFaker, Placeholder, StringGenerator};
use crate::synth::{DEFAULT_BOOLEAN, DEFAULT_MAX_DEPTH, DEFAULT_NUMBER, Synthesizer, UnionPolicy};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SynthConfig {
    pub max_depth: usize,
    pub union_policy: UnionPolicy,
    pub number: Number,
    pub boolean: bool,
    pub strings: StringsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StringsConfig {
    pub policy: StringPolicy,
    /// used by `placeholder`
    pub placeholder: String,
    /// used by `faker`
    pub seed: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum StringPolicy {
    /// Same fixed text for every string slot.
    #[default]
    Placeholder,
    /// Field-name keyed fake data (names, emails, dates, ...).
    Faker,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            union_policy: UnionPolicy::default(),
            number: Number::from(DEFAULT_NUMBER),
            boolean: DEFAULT_BOOLEAN,
            strings: StringsConfig::default(),
        }
    }
}

impl Default for StringsConfig {
    fn default() -> Self {
        Self {
            policy: StringPolicy::default(),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            seed: 0,
        }
    }
}

impl SynthConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_json(&source).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_json(source: &str) -> Result<Self> {
        Ok(crate::path_de::from_str_with_path(source)?)
    }

    pub fn string_generator(&self) -> Box<dyn StringGenerator> {
        match self.strings.policy {
            StringPolicy::Placeholder => Box::new(Placeholder::new(self.strings.placeholder.clone())),
            StringPolicy::Faker => Box::new(FieldNameFaker::new(self.strings.seed)),
        }
    }

    pub fn build(&self) -> Synthesizer {
        Synthesizer::new(self.string_generator())
            .with_union_policy(self.union_policy)
            .with_max_depth(self.max_depth)
            .with_number(self.number.clone())
            .with_boolean(self.boolean)
    }
}
