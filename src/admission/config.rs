// Copyright 2024 The Kubernetes Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Configuration for admission metrics.

use serde::Deserialize;
use std::io::Read;
use thiserror::Error;

/// Default metric name prefix, matching the API server subsystem.
pub const DEFAULT_METRICS_PREFIX: &str = "apiserver";

/// Default latency buckets, in seconds.
pub const DEFAULT_LATENCY_BUCKETS: &[f64] = &[0.005, 0.025, 0.1, 0.5, 1.0, 2.5];

/// Errors raised while reading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse admission metrics config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid latency buckets: {0}")]
    InvalidBuckets(String),

    #[error("invalid metrics prefix {0:?}: must match [a-zA-Z_][a-zA-Z0-9_]*")]
    InvalidPrefix(String),
}

/// MetricsConfig controls how admission latencies are exported.
///
/// ```json
/// { "prefix": "apiserver", "buckets": [0.005, 0.025, 0.1, 0.5, 1.0, 2.5] }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetricsConfig {
    /// Prepended to every metric name with an underscore. Empty for no prefix.
    pub prefix: String,
    /// Histogram bucket upper bounds in seconds, strictly increasing.
    pub buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_METRICS_PREFIX.to_string(),
            buckets: DEFAULT_LATENCY_BUCKETS.to_vec(),
        }
    }
}

impl MetricsConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_reader(reader: &mut dyn Read) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_valid_prefix(&self.prefix) {
            return Err(ConfigError::InvalidPrefix(self.prefix.clone()));
        }
        if self.buckets.is_empty() {
            return Err(ConfigError::InvalidBuckets("no buckets".into()));
        }
        if let Some(bad) = self.buckets.iter().find(|b| !b.is_finite()) {
            let reason = format!("{} is not finite", bad);
            return Err(ConfigError::InvalidBuckets(reason));
        }
        if let Some(pair) = self.buckets.windows(2).find(|w| w[0] >= w[1]) {
            let reason = format!("{} is not greater than {}", pair[1], pair[0]);
            return Err(ConfigError::InvalidBuckets(reason));
        }
        Ok(())
    }
}

fn is_valid_prefix(prefix: &str) -> bool {
    let mut chars = prefix.chars();
    match chars.next() {
        None => true,
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        Some(_) => false,
    }
}
