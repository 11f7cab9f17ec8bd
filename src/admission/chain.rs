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

//! The admission chain.
//!
//! A chain runs an ordered list of named plugins over one request, once for the
//! mutating pass ([`MutationInterface::admit`]) and once for the validating pass
//! ([`ValidationInterface::validate`]). Both passes share one evaluation model:
//!
//! 1. plugins are visited strictly in declared order;
//! 2. a plugin that does not handle the request's operation, or lacks the capability
//!    for the current pass, is skipped and leaves no trace in the metrics;
//! 3. every invoked plugin gets one `admission_controller_latencies` observation;
//! 4. the first error stops the pass and is returned to the caller unchanged;
//! 5. every pass ends with exactly one `admission_step_latencies` observation.
//!
//! A chain with no matching plugins accepts the request.

use super::attributes::Attributes;
use super::errors::{AdmissionError, AdmissionResult};
use super::interfaces::{Interface, MutationInterface, Operation, ValidationInterface};
use super::metrics::{AdmissionMetrics, PassType};
use super::named::NamedHandler;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

/// ChainAdmissionHandler is an ordered, immutable sequence of admission plugins.
///
/// It holds no per-request state and can be shared between any number of
/// concurrent callers.
#[derive(Debug, Clone)]
pub struct ChainAdmissionHandler {
    handlers: Vec<NamedHandler>,
    metrics: Arc<AdmissionMetrics>,
}

impl ChainAdmissionHandler {
    /// Create a chain. An empty handler list is valid and admits everything.
    ///
    /// Handler names must be unique within the chain, since they label the
    /// per-plugin metrics. Use [`ChainAdmissionHandler::try_new`] when the names
    /// come from outside the program.
    pub fn new(handlers: Vec<NamedHandler>, metrics: Arc<AdmissionMetrics>) -> Self {
        debug_assert!(
            duplicate_name(&handlers).is_none(),
            "admission handler names must be unique within a chain"
        );
        Self { handlers, metrics }
    }

    /// Create a chain, rejecting handler lists that repeat a name.
    pub fn try_new(
        handlers: Vec<NamedHandler>,
        metrics: Arc<AdmissionMetrics>,
    ) -> AdmissionResult<Self> {
        if let Some(name) = duplicate_name(&handlers) {
            let msg = format!("admission plugin {} listed more than once", name);
            return Err(AdmissionError::internal_error(msg));
        }
        Ok(Self { handlers, metrics })
    }

    /// The plugins in evaluation order.
    pub fn handlers(&self) -> &[NamedHandler] {
        &self.handlers
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Run one pass. `invoke` returns `None` when the plugin lacks the capability.
    fn evaluate<F>(
        &self,
        pass: PassType,
        operation: Operation,
        is_system_ns: bool,
        mut invoke: F,
    ) -> AdmissionResult<()>
    where
        F: FnMut(&dyn Interface) -> Option<AdmissionResult<()>>,
    {
        let start = Instant::now();

        for handler in &self.handlers {
            if !handler.handles(operation) {
                tracing::trace!(
                    handler = handler.name(),
                    %pass,
                    %operation,
                    "admission plugin not interested"
                );
                continue;
            }

            let began = Instant::now();
            let Some(result) = invoke(handler.plugin()) else {
                tracing::trace!(
                    handler = handler.name(),
                    %pass,
                    "admission plugin has no capability for pass"
                );
                continue;
            };
            let rejected = result.is_err();
            self.metrics.observe_controller(
                handler.name(),
                pass,
                is_system_ns,
                rejected,
                began.elapsed(),
            );

            if let Err(err) = result {
                tracing::debug!(
                    handler = handler.name(),
                    %pass,
                    %operation,
                    error = %err,
                    "admission plugin rejected request"
                );
                self.metrics.observe_step(pass, is_system_ns, true, start.elapsed());
                return Err(err);
            }
            tracing::trace!(
                handler = handler.name(),
                %pass,
                %operation,
                "admission plugin accepted request"
            );
        }

        self.metrics.observe_step(pass, is_system_ns, false, start.elapsed());
        Ok(())
    }
}

fn duplicate_name(handlers: &[NamedHandler]) -> Option<&str> {
    let mut seen = HashSet::new();
    handlers
        .iter()
        .map(|h| h.name())
        .find(|name| !seen.insert(*name))
}

impl Interface for ChainAdmissionHandler {
    /// True if at least one plugin in the chain handles `operation`.
    fn handles(&self, operation: Operation) -> bool {
        self.handlers.iter().any(|h| h.handles(operation))
    }

    fn as_mutating(&self) -> Option<&dyn MutationInterface> {
        Some(self)
    }

    fn as_validating(&self) -> Option<&dyn ValidationInterface> {
        Some(self)
    }
}

impl MutationInterface for ChainAdmissionHandler {
    /// Run the mutating pass. Plugins may rewrite the object in place.
    fn admit(&self, attributes: &mut dyn Attributes) -> AdmissionResult<()> {
        let operation = attributes.get_operation();
        let is_system_ns = attributes.is_system_namespace();
        self.evaluate(PassType::Mutating, operation, is_system_ns, |plugin| {
            plugin.as_mutating().map(|m| m.admit(&mut *attributes))
        })
    }
}

impl ValidationInterface for ChainAdmissionHandler {
    /// Run the validating pass.
    fn validate(&self, attributes: &dyn Attributes) -> AdmissionResult<()> {
        let operation = attributes.get_operation();
        let is_system_ns = attributes.is_system_namespace();
        self.evaluate(PassType::Validating, operation, is_system_ns, |plugin| {
            plugin.as_validating().map(|v| v.validate(attributes))
        })
    }
}
