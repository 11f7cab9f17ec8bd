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

//! Built-in admission plugins.

pub mod admit;
pub mod deny;

use crate::admission::Plugins;

/// All built-in plugins in execution order. The deny plugin must go at the end.
pub const ALL_ORDERED_PLUGINS: &[&str] = &[admit::PLUGIN_NAME, deny::PLUGIN_NAME];

/// Register all built-in admission plugins.
pub fn register_all_admission_plugins(plugins: &Plugins) {
    admit::register(plugins);
    deny::register(plugins);
}
