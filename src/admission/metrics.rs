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

//! Latency histograms for admission chains.
//!
//! Two families are exported:
//!
//! - `admission_step_latencies{rejected, is_system_ns, type}`: one observation per
//!   full pass over a chain.
//! - `admission_controller_latencies{handler, rejected, is_system_ns, type}`: one
//!   observation per plugin that was actually invoked.
//!
//! Both are prefixed with [`MetricsConfig::prefix`] and observed in seconds.

use super::config::{ConfigError, MetricsConfig};
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::family::{Family, MetricConstructor};
use prometheus_client::metrics::histogram::Histogram;
use prometheus_client::registry::Registry;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

const STEP_LATENCIES: &str = "admission_step_latencies";
const CONTROLLER_LATENCIES: &str = "admission_controller_latencies";

/// PassType distinguishes the mutating (admit) pass from the validating pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassType {
    Mutating,
    Validating,
}

impl PassType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PassType::Mutating => "mutating",
            PassType::Validating => "validating",
        }
    }
}

impl fmt::Display for PassType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Labels for end-to-end chain observations.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct StepLabels {
    pub rejected: String,
    pub is_system_ns: String,
    pub r#type: String,
}

/// Labels for individual plugin observations.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct ControllerLabels {
    pub handler: String,
    pub rejected: String,
    pub is_system_ns: String,
    pub r#type: String,
}

/// Builds histograms with the configured buckets for each new label set.
#[derive(Clone, Debug)]
pub struct LatencyBuckets(Arc<[f64]>);

impl MetricConstructor<Histogram> for LatencyBuckets {
    fn new_metric(&self) -> Histogram {
        Histogram::new(self.0.iter().copied())
    }
}

/// AdmissionMetrics records admission latencies.
///
/// One instance is created at startup and shared by every chain through an `Arc`.
/// Recording is safe from any number of threads.
#[derive(Debug)]
pub struct AdmissionMetrics {
    step: Family<StepLabels, Histogram, LatencyBuckets>,
    controller: Family<ControllerLabels, Histogram, LatencyBuckets>,
}

impl AdmissionMetrics {
    /// Register the admission histograms with the default configuration.
    pub fn new(registry: &mut Registry) -> Self {
        Self::register(registry, &MetricsConfig::default())
    }

    /// Register the admission histograms in `registry`, after validating `config`.
    ///
    /// Nothing is registered when the config is rejected.
    pub fn with_config(
        registry: &mut Registry,
        config: &MetricsConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::register(registry, config))
    }

    fn register(registry: &mut Registry, config: &MetricsConfig) -> Self {
        let buckets = LatencyBuckets(config.buckets.clone().into());
        let step = Family::new_with_constructor(buckets.clone());
        let controller = Family::new_with_constructor(buckets);

        let registry = if config.prefix.is_empty() {
            registry
        } else {
            registry.sub_registry_with_prefix(&config.prefix)
        };
        registry.register(
            STEP_LATENCIES,
            "Admission sub-step latency in seconds, by operation type and rejection",
            step.clone(),
        );
        registry.register(
            CONTROLLER_LATENCIES,
            "Admission controller latency in seconds, by handler, operation type and rejection",
            controller.clone(),
        );

        Self { step, controller }
    }

    /// Record one full pass over a chain.
    pub fn observe_step(
        &self,
        pass: PassType,
        is_system_ns: bool,
        rejected: bool,
        elapsed: Duration,
    ) {
        let labels = StepLabels {
            rejected: rejected.to_string(),
            is_system_ns: is_system_ns.to_string(),
            r#type: pass.to_string(),
        };
        let histogram = self.step.get_or_create(&labels);
        histogram.observe(elapsed.as_secs_f64());
    }

    /// Record one invocation of the named plugin.
    pub fn observe_controller(
        &self,
        handler: &str,
        pass: PassType,
        is_system_ns: bool,
        rejected: bool,
        elapsed: Duration,
    ) {
        let labels = ControllerLabels {
            handler: handler.to_string(),
            rejected: rejected.to_string(),
            is_system_ns: is_system_ns.to_string(),
            r#type: pass.to_string(),
        };
        let histogram = self.controller.get_or_create(&labels);
        histogram.observe(elapsed.as_secs_f64());
    }

    /// Drop every recorded series. Intended for test harnesses.
    pub fn reset(&self) {
        self.step.clear();
        self.controller.clear();
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use prometheus_client::encoding::text::encode;
    use prometheus_client::registry::Registry;

    /// Sum of `<name>_count` over every series whose labels include all of `filter`.
    pub(crate) fn histogram_count_total(
        registry: &Registry,
        name: &str,
        filter: &[(&str, &str)],
    ) -> u64 {
        let mut buffer = String::new();
        encode(&mut buffer, registry).unwrap();

        let series = format!("{}_count", name);
        buffer
            .lines()
            .filter_map(|line| {
                let rest = line.strip_prefix(&series)?;
                let (labels, value) = match rest.strip_prefix('{') {
                    Some(rest) => rest.split_once("} ")?,
                    None => ("", rest.strip_prefix(' ')?),
                };
                let labels: Vec<(&str, &str)> = labels
                    .split(',')
                    .filter_map(|pair| pair.split_once('='))
                    .map(|(k, v)| (k, v.trim_matches('"')))
                    .collect();
                let matches = filter.iter().all(|want| labels.contains(want));
                matches.then(|| value.trim().parse::<u64>().unwrap())
            })
            .sum()
    }
}
