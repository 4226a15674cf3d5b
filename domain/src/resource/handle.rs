//! Resource handles
//!
//! A [`ResourceHandle`] pins down exactly one cloud object. The `id` is the
//! ARN where one is known, otherwise the bare name; `display_name` is the
//! short human-readable name used for matching and output.

use super::kind::ResourceKind;
use serde::{Deserialize, Serialize};

/// Reference to exactly one cloud object, immutable once resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceHandle {
    pub kind: ResourceKind,
    /// ARN or name; unique within `kind` and scope
    pub id: String,
    /// Short name suitable for matching and display
    pub display_name: String,
}

impl ResourceHandle {
    pub fn new(
        kind: ResourceKind,
        id: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            id: id.into(),
            display_name: display_name.into(),
        }
    }

    /// Build a handle from an ARN, deriving the display name from the
    /// final path segment (`.../service/my-cluster/web` -> `web`).
    pub fn from_arn(kind: ResourceKind, arn: impl Into<String>) -> Self {
        let arn = arn.into();
        let display_name = arn_final_segment(&arn).to_string();
        Self {
            kind,
            id: arn,
            display_name,
        }
    }

    /// For a service handle whose id is a new-format service ARN
    /// (`arn:aws:ecs:region:acct:service/<cluster>/<service>`), the name
    /// of the owning cluster. `None` for old-format ARNs or bare names.
    pub fn service_cluster(&self) -> Option<&str> {
        if self.kind != ResourceKind::Service {
            return None;
        }
        let path = self.id.split(':').next_back()?;
        let mut segments = path.split('/');
        match (segments.next(), segments.next(), segments.next()) {
            (Some("service"), Some(cluster), Some(_service)) => Some(cluster),
            _ => None,
        }
    }
}

impl std::fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.kind, self.display_name)
    }
}

/// Final `/`-separated segment of an ARN (or the input itself when it has
/// no path).
pub fn arn_final_segment(arn: &str) -> &str {
    arn.rsplit('/').next().unwrap_or(arn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_arn_derives_display_name() {
        let h = ResourceHandle::from_arn(
            ResourceKind::Service,
            "arn:aws:ecs:us-east-1:123456789012:service/prod/web-api",
        );
        assert_eq!(h.display_name, "web-api");
        assert_eq!(h.id, "arn:aws:ecs:us-east-1:123456789012:service/prod/web-api");
    }

    #[test]
    fn service_cluster_from_new_format_arn() {
        let h = ResourceHandle::from_arn(
            ResourceKind::Service,
            "arn:aws:ecs:us-east-1:123456789012:service/prod/web-api",
        );
        assert_eq!(h.service_cluster(), Some("prod"));
    }

    #[test]
    fn service_cluster_missing_for_old_format_arn() {
        let h = ResourceHandle::from_arn(
            ResourceKind::Service,
            "arn:aws:ecs:us-east-1:123456789012:service/web-api",
        );
        assert_eq!(h.service_cluster(), None);
    }

    #[test]
    fn service_cluster_none_for_other_kinds() {
        let h = ResourceHandle::from_arn(
            ResourceKind::Cluster,
            "arn:aws:ecs:us-east-1:123456789012:cluster/prod",
        );
        assert_eq!(h.service_cluster(), None);
    }

    #[test]
    fn final_segment_of_plain_name() {
        assert_eq!(arn_final_segment("web-api"), "web-api");
    }
}
