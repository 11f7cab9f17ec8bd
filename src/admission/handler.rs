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

//! Declared operation sets for admission plugins.

use super::interfaces::{Interface, Operation};
use std::collections::HashSet;

/// Handler records the operations a plugin has declared interest in.
///
/// Plugins embed one and forward [`Interface::handles`] to it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Handler {
    operations: HashSet<Operation>,
}

impl Handler {
    /// Create a new Handler that handles the given operations.
    pub fn new(operations: &[Operation]) -> Self {
        Self {
            operations: operations.iter().copied().collect(),
        }
    }

    /// Create a new Handler that handles Create and Update operations.
    pub fn new_create_update() -> Self {
        Self::new(&[Operation::Create, Operation::Update])
    }

    /// Create a new Handler that handles all operations.
    pub fn new_all() -> Self {
        Self::new(&Operation::ALL)
    }

    /// Snapshot the interest set of any plugin by asking about every operation once.
    pub fn from_interface(plugin: &dyn Interface) -> Self {
        Self {
            operations: Operation::ALL
                .into_iter()
                .filter(|op| plugin.handles(*op))
                .collect(),
        }
    }

    /// The declared operations, in [`Operation::ALL`] order.
    pub fn operations(&self) -> Vec<Operation> {
        Operation::ALL
            .into_iter()
            .filter(|op| self.operations.contains(op))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

impl Interface for Handler {
    fn handles(&self, operation: Operation) -> bool {
        self.operations.contains(&operation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct DeletesOnly;

    impl Interface for DeletesOnly {
        fn handles(&self, operation: Operation) -> bool {
            operation == Operation::Delete
        }
    }

    #[test]
    fn test_handler_new() {
        let handler = Handler::new(&[Operation::Create, Operation::Update]);
        assert!(handler.handles(Operation::Create));
        assert!(handler.handles(Operation::Update));
        assert!(!handler.handles(Operation::Delete));
        assert!(!handler.handles(Operation::Connect));
    }

    #[test]
    fn test_handler_new_create_update() {
        let handler = Handler::new_create_update();
        assert_eq!(
            handler.operations(),
            vec![Operation::Create, Operation::Update]
        );
    }

    #[test]
    fn test_handler_new_all() {
        let handler = Handler::new_all();
        for op in Operation::ALL {
            assert!(handler.handles(op), "expected {} to be handled", op);
        }
    }

    #[test]
    fn test_handler_empty() {
        let handler = Handler::new(&[]);
        assert!(handler.is_empty());
        assert!(Operation::ALL.iter().all(|op| !handler.handles(*op)));
    }

    #[test]
    fn test_handler_from_interface() {
        let handler = Handler::from_interface(&DeletesOnly);
        assert_eq!(handler.operations(), vec![Operation::Delete]);
    }
}
