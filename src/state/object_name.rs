//! # Object Names
//!
//! Namespace-qualified identifiers for declared resources.

use k8s_openapi::api::core::v1::SecretReference;
use kube::{Resource, ResourceExt};
use kube_runtime::reflector::ObjectRef;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a namespaced resource (issuer, certificate or secret).
///
/// Equality, ordering and hashing are structural. Cluster-scoped resources
/// use an empty namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectName {
    pub namespace: String,
    pub name: String,
}

impl ObjectName {
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Name of an object as observed by a watch.
    #[must_use]
    pub fn from_resource<K: Resource>(obj: &K) -> Self {
        Self {
            namespace: obj.namespace().unwrap_or_default(),
            name: obj.name_any(),
        }
    }

    /// Identity of the secret a `SecretReference` points at.
    ///
    /// References without a namespace resolve against `default_namespace`
    /// (the namespace of the referencing issuer). Returns `None` when the
    /// reference carries no name.
    #[must_use]
    pub fn from_secret_ref(secret_ref: &SecretReference, default_namespace: &str) -> Option<Self> {
        let name = secret_ref.name.as_deref().filter(|n| !n.is_empty())?;
        let namespace = secret_ref
            .namespace
            .as_deref()
            .filter(|ns| !ns.is_empty())
            .unwrap_or(default_namespace);
        Some(Self::new(namespace, name))
    }

    /// Reference usable for requeueing the named object on a kube-runtime controller.
    #[must_use]
    pub fn object_ref<K>(&self) -> ObjectRef<K>
    where
        K: Resource<DynamicType = ()>,
    {
        let obj_ref = ObjectRef::new(&self.name);
        if self.namespace.is_empty() {
            obj_ref
        } else {
            obj_ref.within(&self.namespace)
        }
    }
}

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}/{}", self.namespace, self.name)
        }
    }
}

impl<K: Resource> From<&ObjectRef<K>> for ObjectName {
    fn from(obj_ref: &ObjectRef<K>) -> Self {
        Self {
            namespace: obj_ref.namespace.clone().unwrap_or_default(),
            name: obj_ref.name.clone(),
        }
    }
}
