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

//! Kubernetes admission chain in Rust.
//!
//! Every write request to the API server passes through an ordered chain of
//! admission plugins before it is persisted: first a mutating pass, then a
//! validating pass. This crate provides that chain, the plugin interfaces it
//! drives, and the latency histograms it records for each pass and each plugin.

pub mod admission;
pub mod api;
pub mod plugins;

// Re-export commonly used types
pub use admission::{
    AdmissionError, AdmissionMetrics, AdmissionResult, Attributes, AttributesRecord,
    ChainAdmissionHandler, Handler, Interface, MutationInterface, NamedHandler, Operation,
    ValidationInterface,
};
pub use api::{ApiObject, Unstructured};
