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

//! API objects carried through admission.

use serde_json::{Map, Value};
use std::any::Any;

/// ApiObject is a trait for Kubernetes API objects that can be used in admission.
pub trait ApiObject: Send + Sync {
    /// Returns the object as Any for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Returns the object as mutable Any for downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Returns the kind of this object.
    fn kind(&self) -> &str;
}

/// Unstructured is a generic object backed by its JSON representation.
#[derive(Debug, Clone, PartialEq)]
pub struct Unstructured {
    kind: String,
    content: Value,
}

impl Unstructured {
    /// Wrap a JSON value. The kind is read from the top-level `kind` field.
    pub fn new(content: Value) -> Self {
        let kind = content
            .get("kind")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Self { kind, content }
    }

    pub fn content(&self) -> &Value {
        &self.content
    }

    pub fn content_mut(&mut self) -> &mut Value {
        &mut self.content
    }

    /// Returns `metadata.labels`, if present.
    pub fn labels(&self) -> Option<&Map<String, Value>> {
        let metadata = self.content.get("metadata")?;
        metadata.get("labels")?.as_object()
    }

    /// Sets a label, creating `metadata` and `metadata.labels` as needed.
    pub fn set_label(&mut self, key: &str, value: &str) {
        if !self.content.is_object() {
            self.content = Value::Object(Map::new());
        }
        let root = self.content.as_object_mut();
        let metadata = root.and_then(|root| child_object(root, "metadata"));
        if let Some(labels) = metadata.and_then(|m| child_object(m, "labels")) {
            labels.insert(key.to_string(), Value::String(value.to_string()));
        }
    }
}

/// The object stored under `key`, replacing any non-object value there.
fn child_object<'a>(
    parent: &'a mut Map<String, Value>,
    key: &str,
) -> Option<&'a mut Map<String, Value>> {
    let entry = parent.entry(key).or_insert(Value::Null);
    if !entry.is_object() {
        *entry = Value::Object(Map::new());
    }
    entry.as_object_mut()
}

impl ApiObject for Unstructured {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn kind(&self) -> &str {
        &self.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unstructured_kind() {
        let obj = Unstructured::new(json!({"apiVersion": "v1", "kind": "ConfigMap"}));
        assert_eq!(obj.kind(), "ConfigMap");

        let obj = Unstructured::new(json!({"apiVersion": "v1"}));
        assert_eq!(obj.kind(), "");
    }

    #[test]
    fn test_set_label_creates_metadata() {
        let mut obj = Unstructured::new(json!({"kind": "Pod"}));
        assert!(obj.labels().is_none());

        obj.set_label("team", "storage");
        obj.set_label("tier", "backend");

        let labels = obj.labels().unwrap();
        assert_eq!(labels.get("team"), Some(&json!("storage")));
        assert_eq!(labels.get("tier"), Some(&json!("backend")));
    }

    #[test]
    fn test_set_label_replaces_malformed_metadata() {
        let mut obj = Unstructured::new(json!({"kind": "Pod", "metadata": "oops"}));
        obj.set_label("team", "storage");
        assert_eq!(obj.content()["metadata"]["labels"]["team"], "storage");
        assert_eq!(obj.kind(), "Pod");
    }

    #[test]
    fn test_downcast_through_api_object() {
        let secret = Unstructured::new(json!({"kind": "Secret"}));
        let mut boxed: Box<dyn ApiObject> = Box::new(secret);
        assert!(boxed.as_any().downcast_ref::<Unstructured>().is_some());

        boxed
            .as_any_mut()
            .downcast_mut::<Unstructured>()
            .unwrap()
            .set_label("a", "b");
        let obj = boxed.as_any().downcast_ref::<Unstructured>().unwrap();
        assert_eq!(obj.labels().unwrap().get("a"), Some(&json!("b")));
    }
}
