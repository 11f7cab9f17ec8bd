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

//! AlwaysDeny admission controller.
//!
//! DEPRECATED: This admission controller always denies all requests.
//! It has no real use and should be removed from configuration.

use crate::admission::errors::FieldError;
use crate::admission::{
    AdmissionError, AdmissionResult, Attributes, Handler, Interface, MutationInterface, Operation,
    Plugins, ValidationInterface,
};
use std::io::Read;
use std::sync::Arc;

/// Plugin name for the AlwaysDeny admission controller.
pub const PLUGIN_NAME: &str = "AlwaysDeny";

/// Register the AlwaysDeny plugin with the plugin registry.
pub fn register(plugins: &Plugins) {
    plugins.register(PLUGIN_NAME, |_config: Option<&mut dyn Read>| {
        Ok(Arc::new(AlwaysDeny::new()) as Arc<dyn Interface>)
    });
}

/// AlwaysDeny says no to every request, in both passes.
pub struct AlwaysDeny {
    handler: Handler,
}

impl AlwaysDeny {
    /// Create a new AlwaysDeny admission controller.
    pub fn new() -> Self {
        tracing::warn!(
            plugin = PLUGIN_NAME,
            "admission controller is deprecated, remove it from your configuration"
        );
        Self {
            handler: Handler::new_all(),
        }
    }

    fn deny_error(&self, attributes: &dyn Attributes) -> AdmissionError {
        let resource = attributes.get_resource().resource.as_str();
        AdmissionError::forbidden(
            attributes.get_name(),
            attributes.get_namespace(),
            if resource.is_empty() { "all" } else { resource },
            FieldError::detail("admission control is denying all modifications"),
        )
    }
}

impl Default for AlwaysDeny {
    fn default() -> Self {
        Self::new()
    }
}

impl Interface for AlwaysDeny {
    fn handles(&self, operation: Operation) -> bool {
        self.handler.handles(operation)
    }

    fn as_mutating(&self) -> Option<&dyn MutationInterface> {
        Some(self)
    }

    fn as_validating(&self) -> Option<&dyn ValidationInterface> {
        Some(self)
    }
}

impl MutationInterface for AlwaysDeny {
    fn admit(&self, attributes: &mut dyn Attributes) -> AdmissionResult<()> {
        Err(self.deny_error(attributes))
    }
}

impl ValidationInterface for AlwaysDeny {
    fn validate(&self, attributes: &dyn Attributes) -> AdmissionResult<()> {
        Err(self.deny_error(attributes))
    }
}
