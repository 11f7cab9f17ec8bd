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

//! A plugin paired with the name it was configured under.

use super::handler::Handler;
use super::interfaces::{Interface, Operation};
use std::fmt;
use std::sync::Arc;

/// NamedHandler wraps one admission plugin together with its configured name.
///
/// The name is only used for metric labels and diagnostics. The operations the
/// plugin handles are captured once, when the NamedHandler is built.
#[derive(Clone)]
pub struct NamedHandler {
    name: String,
    interest: Handler,
    plugin: Arc<dyn Interface>,
}

impl NamedHandler {
    pub fn new(name: impl Into<String>, plugin: Arc<dyn Interface>) -> Self {
        let interest = Handler::from_interface(plugin.as_ref());
        Self {
            name: name.into(),
            interest,
            plugin,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The wrapped plugin. Only compiled for tests and the `testing` feature,
    /// so callers outside a test harness cannot reach around the chain.
    #[cfg(any(test, feature = "testing"))]
    pub fn interface(&self) -> &Arc<dyn Interface> {
        &self.plugin
    }

    /// Whether the wrapped plugin declared interest in `operation`.
    pub fn handles(&self, operation: Operation) -> bool {
        self.interest.handles(operation)
    }

    pub(crate) fn plugin(&self) -> &dyn Interface {
        self.plugin.as_ref()
    }
}

impl fmt::Debug for NamedHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedHandler")
            .field("name", &self.name)
            .field("operations", &self.interest.operations())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts how often it is asked about its interests.
    struct Counting {
        handler: Handler,
        queries: AtomicUsize,
    }

    impl Interface for Counting {
        fn handles(&self, operation: Operation) -> bool {
            self.queries.fetch_add(1, Ordering::SeqCst);
            self.handler.handles(operation)
        }
    }

    #[test]
    fn test_named_handler_handles() {
        let handler = Handler::new(&[Operation::Delete, Operation::Create]);
        let named = NamedHandler::new("a", Arc::new(handler));
        assert_eq!(named.name(), "a");
        assert!(named.handles(Operation::Create));
        assert!(named.handles(Operation::Delete));
        assert!(!named.handles(Operation::Update));
        assert!(!named.handles(Operation::Connect));
    }

    #[test]
    fn test_interest_is_captured_once() {
        let plugin = Arc::new(Counting {
            handler: Handler::new_create_update(),
            queries: AtomicUsize::new(0),
        });
        let named = NamedHandler::new("counting", plugin.clone());
        let after_construction = plugin.queries.load(Ordering::SeqCst);
        assert_eq!(after_construction, Operation::ALL.len());

        for _ in 0..10 {
            assert!(named.handles(Operation::Update));
            assert!(!named.handles(Operation::Connect));
        }
        assert_eq!(plugin.queries.load(Ordering::SeqCst), after_construction);
    }

    #[test]
    fn test_interface_exposes_wrapped_plugin() {
        let plugin = Arc::new(Handler::new_all());
        let named = NamedHandler::new("all", plugin.clone());
        assert_eq!(
            Arc::as_ptr(named.interface()) as *const (),
            Arc::as_ptr(&plugin) as *const ()
        );
    }

    #[test]
    fn test_debug_lists_operations() {
        let named = NamedHandler::new("c", Arc::new(Handler::new(&[Operation::Create])));
        let rendered = format!("{:?}", named);
        assert!(rendered.contains("\"c\""));
        assert!(rendered.contains("Create"));
    }
}
