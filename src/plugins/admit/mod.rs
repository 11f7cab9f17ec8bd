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

//! AlwaysAdmit admission controller.
//!
//! DEPRECATED: This admission controller always admits all requests.
//! It has no real use and should be removed from configuration.

use crate::admission::{
    AdmissionResult, Attributes, Handler, Interface, MutationInterface, Operation, Plugins,
    ValidationInterface,
};
use std::io::Read;
use std::sync::Arc;

/// Plugin name for the AlwaysAdmit admission controller.
pub const PLUGIN_NAME: &str = "AlwaysAdmit";

/// Register the AlwaysAdmit plugin with the plugin registry.
pub fn register(plugins: &Plugins) {
    plugins.register(PLUGIN_NAME, |_config: Option<&mut dyn Read>| {
        Ok(Arc::new(AlwaysAdmit::new()) as Arc<dyn Interface>)
    });
}

/// AlwaysAdmit says yes to every request, in both passes.
pub struct AlwaysAdmit {
    handler: Handler,
}

impl AlwaysAdmit {
    /// Create a new AlwaysAdmit admission controller.
    pub fn new() -> Self {
        tracing::warn!(
            plugin = PLUGIN_NAME,
            "admission controller is deprecated, remove it from your configuration"
        );
        Self {
            handler: Handler::new_all(),
        }
    }
}

impl Default for AlwaysAdmit {
    fn default() -> Self {
        Self::new()
    }
}

impl Interface for AlwaysAdmit {
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

impl MutationInterface for AlwaysAdmit {
    fn admit(&self, _attributes: &mut dyn Attributes) -> AdmissionResult<()> {
        Ok(())
    }
}

impl ValidationInterface for AlwaysAdmit {
    fn validate(&self, _attributes: &dyn Attributes) -> AdmissionResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admission::AttributesRecord;

    #[test]
    fn test_admission_non_nil_attribute() {
        let handler = AlwaysAdmit::new();
        let mut attrs = AttributesRecord::for_operation("namespace", Operation::Create);

        let result = handler.admit(&mut attrs);
        assert!(
            result.is_ok(),
            "Unexpected error returned from admission handler"
        );
        assert!(handler.validate(&attrs).is_ok());
    }

    #[test]
    fn test_handles() {
        let handler = AlwaysAdmit::new();
        for op in Operation::ALL {
            assert!(
                handler.handles(op),
                "Expected handling all operations, including: {:?}",
                op
            );
        }
        assert!(handler.as_mutating().is_some());
        assert!(handler.as_validating().is_some());
    }

    #[test]
    fn test_plugin_registration() {
        let plugins = Plugins::new();
        register(&plugins);

        assert!(plugins.is_registered(PLUGIN_NAME));

        let plugin = plugins.new_plugin(PLUGIN_NAME, None).unwrap();
        for op in Operation::ALL {
            assert!(plugin.handles(op));
        }
    }
}
