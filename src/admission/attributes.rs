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

//! Admission attributes that describe an admission request.

use super::interfaces::Operation;
use crate::api::ApiObject;
use std::collections::BTreeMap;

/// The namespace reserved for cluster system components.
pub const NAMESPACE_SYSTEM: &str = "kube-system";

/// GroupVersionResource identifies a resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct GroupVersionResource {
    pub group: String,
    pub version: String,
    pub resource: String,
}

impl GroupVersionResource {
    pub fn new(group: &str, version: &str, resource: &str) -> Self {
        Self {
            group: group.to_string(),
            version: version.to_string(),
            resource: resource.to_string(),
        }
    }

    /// Returns just the group and resource portion.
    pub fn group_resource(&self) -> GroupResource {
        GroupResource {
            group: self.group.clone(),
            resource: self.resource.clone(),
        }
    }
}

/// GroupResource identifies a resource without version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct GroupResource {
    pub group: String,
    pub resource: String,
}

/// GroupVersionKind identifies a kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct GroupVersionKind {
    pub group: String,
    pub version: String,
    pub kind: String,
}

impl GroupVersionKind {
    pub fn new(group: &str, version: &str, kind: &str) -> Self {
        Self {
            group: group.to_string(),
            version: version.to_string(),
            kind: kind.to_string(),
        }
    }
}

/// UserInfo describes the user on whose behalf the request is made.
///
/// The chain passes it through untouched; only plugins interpret it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserInfo {
    pub name: String,
    pub uid: String,
    pub groups: Vec<String>,
    pub extra: BTreeMap<String, Vec<String>>,
}

impl UserInfo {
    pub fn new(name: &str, groups: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            uid: String::new(),
            groups: groups.iter().map(|g| g.to_string()).collect(),
            extra: BTreeMap::new(),
        }
    }
}

/// Attributes is an interface used by admission controllers to get information about a
/// request that is used to make an admission decision.
pub trait Attributes {
    /// Returns the name of the object as presented in the request.
    fn get_name(&self) -> &str;

    /// Returns the namespace associated with the request. Empty for cluster-scoped resources.
    fn get_namespace(&self) -> &str;

    /// Returns the resource being requested.
    fn get_resource(&self) -> &GroupVersionResource;

    /// Returns the name of the subresource being requested.
    fn get_subresource(&self) -> &str;

    /// Returns the operation being performed.
    fn get_operation(&self) -> Operation;

    /// Returns the object from the incoming request.
    fn get_object(&self) -> Option<&dyn ApiObject>;

    /// Returns the object as a mutable reference.
    fn get_object_mut(&mut self) -> Option<&mut (dyn ApiObject + 'static)>;

    /// Returns the existing object (only populated for UPDATE and DELETE requests).
    fn get_old_object(&self) -> Option<&dyn ApiObject>;

    /// Returns the kind of object being manipulated.
    fn get_kind(&self) -> &GroupVersionKind;

    /// Returns the user who made the request.
    fn get_user_info(&self) -> &UserInfo;

    /// Check if this request is a dry run.
    fn is_dry_run(&self) -> bool;

    /// Whether the request targets the system namespace.
    ///
    /// Cluster-scoped requests are never considered system requests.
    fn is_system_namespace(&self) -> bool {
        self.get_namespace() == NAMESPACE_SYSTEM
    }
}

/// AttributesRecord is a concrete implementation of Attributes.
pub struct AttributesRecord {
    pub name: String,
    pub namespace: String,
    pub resource: GroupVersionResource,
    pub subresource: String,
    pub operation: Operation,
    pub object: Option<Box<dyn ApiObject>>,
    pub old_object: Option<Box<dyn ApiObject>>,
    pub kind: GroupVersionKind,
    pub user_info: UserInfo,
    pub dry_run: bool,
}

impl AttributesRecord {
    /// Create a new AttributesRecord. No semantic validation is done here.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        object: Option<Box<dyn ApiObject>>,
        old_object: Option<Box<dyn ApiObject>>,
        kind: GroupVersionKind,
        namespace: &str,
        name: &str,
        resource: GroupVersionResource,
        subresource: &str,
        operation: Operation,
        user_info: UserInfo,
        dry_run: bool,
    ) -> Self {
        Self {
            name: name.to_string(),
            namespace: namespace.to_string(),
            resource,
            subresource: subresource.to_string(),
            operation,
            object,
            old_object,
            kind,
            user_info,
            dry_run,
        }
    }

    /// A record with no objects and empty type descriptors, for the given namespace and operation.
    pub fn for_operation(namespace: &str, operation: Operation) -> Self {
        Self::new(
            None,
            None,
            GroupVersionKind::default(),
            namespace,
            "",
            GroupVersionResource::default(),
            "",
            operation,
            UserInfo::default(),
            false,
        )
    }
}

impl Attributes for AttributesRecord {
    fn get_name(&self) -> &str {
        &self.name
    }

    fn get_namespace(&self) -> &str {
        &self.namespace
    }

    fn get_resource(&self) -> &GroupVersionResource {
        &self.resource
    }

    fn get_subresource(&self) -> &str {
        &self.subresource
    }

    fn get_operation(&self) -> Operation {
        self.operation
    }

    fn get_object(&self) -> Option<&dyn ApiObject> {
        self.object.as_deref()
    }

    fn get_object_mut(&mut self) -> Option<&mut (dyn ApiObject + 'static)> {
        self.object.as_mut().map(|o| &mut **o)
    }

    fn get_old_object(&self) -> Option<&dyn ApiObject> {
        self.old_object.as_deref()
    }

    fn get_kind(&self) -> &GroupVersionKind {
        &self.kind
    }

    fn get_user_info(&self) -> &UserInfo {
        &self.user_info
    }

    fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Unstructured;
    use serde_json::json;

    #[test]
    fn test_attributes_record_new() {
        let cm = Unstructured::new(json!({"kind": "ConfigMap"}));
        let old = Unstructured::new(json!({"kind": "ConfigMap"}));
        let attrs = AttributesRecord::new(
            Some(Box::new(cm)),
            Some(Box::new(old)),
            GroupVersionKind::new("", "v1", "ConfigMap"),
            "default",
            "settings",
            GroupVersionResource::new("", "v1", "configmaps"),
            "",
            Operation::Update,
            UserInfo::new("alice", &["system:authenticated"]),
            true,
        );

        assert_eq!(attrs.get_name(), "settings");
        assert_eq!(attrs.get_namespace(), "default");
        assert_eq!(attrs.get_operation(), Operation::Update);
        assert_eq!(attrs.get_resource().resource, "configmaps");
        assert_eq!(attrs.get_kind().kind, "ConfigMap");
        assert_eq!(attrs.get_object().map(|o| o.kind()), Some("ConfigMap"));
        assert!(attrs.get_old_object().is_some());
        let user = attrs.get_user_info();
        assert_eq!(user.name, "alice");
        assert_eq!(user.groups, vec!["system:authenticated"]);
        assert!(attrs.is_dry_run());
    }

    #[test]
    fn test_is_system_namespace() {
        let in_namespace = |ns: &str| AttributesRecord::for_operation(ns, Operation::Create);
        assert!(in_namespace(NAMESPACE_SYSTEM).is_system_namespace());
        assert!(!in_namespace("default").is_system_namespace());
        // Cluster-scoped requests count as non-system.
        assert!(!in_namespace("").is_system_namespace());
    }

    #[test]
    fn test_get_object_mut() {
        let mut attrs = AttributesRecord::for_operation("default", Operation::Create);
        assert!(attrs.get_object_mut().is_none());

        let pod = Unstructured::new(json!({"kind": "Pod"}));
        attrs.object = Some(Box::new(pod));
        let obj = attrs
            .get_object_mut()
            .and_then(|o| o.as_any_mut().downcast_mut::<Unstructured>())
            .unwrap();
        obj.set_label("mutated", "true");

        let obj = attrs
            .get_object()
            .and_then(|o| o.as_any().downcast_ref::<Unstructured>())
            .unwrap();
        let labels = obj.labels().unwrap();
        assert_eq!(labels.get("mutated"), Some(&json!("true")));
    }

    #[test]
    fn test_group_version_resource() {
        let gvr = GroupVersionResource::new("apps", "v1", "deployments");
        assert_eq!(gvr.group, "apps");
        assert_eq!(gvr.version, "v1");
        assert_eq!(gvr.resource, "deployments");

        let gr = gvr.group_resource();
        assert_eq!(gr.group, "apps");
        assert_eq!(gr.resource, "deployments");
    }
}
