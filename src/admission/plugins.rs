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

//! Plugin registry for admission controllers.

use super::chain::ChainAdmissionHandler;
use super::errors::{AdmissionError, AdmissionResult};
use super::interfaces::Interface;
use super::metrics::AdmissionMetrics;
use super::named::NamedHandler;
use std::collections::HashMap;
use std::io::Read;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Factory is a function that creates an admission plugin instance.
pub type Factory = fn(config: Option<&mut dyn Read>) -> AdmissionResult<Arc<dyn Interface>>;

/// Plugins is a registry of admission plugins.
#[derive(Default)]
pub struct Plugins {
    registry: RwLock<HashMap<String, Factory>>,
}

impl Plugins {
    /// Create a new empty plugin registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new admission plugin with the given name and factory.
    ///
    /// Registering the same name twice replaces the earlier factory.
    pub fn register(&self, name: &str, factory: Factory) {
        let mut registry = self.write();
        if registry.insert(name.to_string(), factory).is_some() {
            tracing::warn!(
                plugin = name,
                "admission plugin registered twice, keeping the latest factory"
            );
        }
    }

    /// Get a factory for the given plugin name.
    pub fn get_factory(&self, name: &str) -> Option<Factory> {
        self.read().get(name).copied()
    }

    /// All registered plugin names, sorted.
    pub fn registered_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if a plugin is registered.
    pub fn is_registered(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    // No writer leaves the map half-updated, so poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Factory>> {
        match self.registry.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Factory>> {
        match self.registry.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Create a new instance of the named plugin.
    pub fn new_plugin(
        &self,
        name: &str,
        config: Option<&mut dyn Read>,
    ) -> AdmissionResult<Arc<dyn Interface>> {
        let Some(factory) = self.get_factory(name) else {
            let msg = format!("unknown admission plugin: {}", name);
            return Err(AdmissionError::internal_error(msg));
        };
        factory(config)
    }

    /// Instantiate the named plugins, in order, and chain them.
    ///
    /// Plugins are created without configuration. Each name may appear only once.
    pub fn new_from_plugins(
        &self,
        names: &[&str],
        metrics: Arc<AdmissionMetrics>,
    ) -> AdmissionResult<ChainAdmissionHandler> {
        let mut handlers = Vec::with_capacity(names.len());

        for name in names {
            let plugin = self.new_plugin(name, None)?;
            tracing::info!(plugin = *name, "loaded admission plugin");
            handlers.push(NamedHandler::new(*name, plugin));
        }

        ChainAdmissionHandler::try_new(handlers, metrics)
    }
}
