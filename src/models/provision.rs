use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::namespace::{Namespace, NamespaceError, SANDBOX_PREFIX};
use crate::db::template::ApplyReport;
use crate::models::tenant::TenantKind;
use crate::seed::SeedSummary;

#[derive(Debug, Default, Deserialize)]
pub struct SandboxRequest {
    /// Sales inquiry or other request that led to this sandbox.
    pub origin_request_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct SandboxResponse {
    pub success: bool,
    pub token: String,
    pub namespace: String,
    pub redirect: &'static str,
}

/// Result of a successful provisioning call.
#[derive(Debug, Clone)]
pub struct ProvisionedTenant {
    pub namespace: String,
    pub identity_id: Uuid,
    pub token: String,
    pub template: ApplyReport,
    pub seed: SeedSummary,
}

/// What to provision: the namespace is chosen by the caller so clinic
/// onboarding and sandbox signup share one path.
#[derive(Debug, Clone)]
pub struct ProvisionRequest {
    pub namespace: Namespace,
    pub kind: TenantKind,
    pub display_name: String,
    pub origin_request_id: Option<Uuid>,
}

impl ProvisionRequest {
    pub fn sandbox(origin_request_id: Option<Uuid>) -> Self {
        let namespace = Namespace::generate_sandbox();
        let suffix = &namespace.as_str()[SANDBOX_PREFIX.len()..SANDBOX_PREFIX.len() + 8];
        Self {
            display_name: format!("Sandbox {suffix}"),
            namespace,
            kind: TenantKind::Sandbox,
            origin_request_id,
        }
    }

    pub fn clinic(slug: &str, display_name: &str) -> Result<Self, NamespaceError> {
        Ok(Self {
            namespace: Namespace::for_clinic(slug)?,
            kind: TenantKind::Clinic,
            display_name: display_name.trim().to_string(),
            origin_request_id: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sandbox_request_names_itself_after_namespace() {
        let req = ProvisionRequest::sandbox(None);
        assert!(req.namespace.is_sandbox());
        assert_eq!(req.kind, TenantKind::Sandbox);
        assert!(req.namespace.as_str().contains(req.display_name.trim_start_matches("Sandbox ")));
    }

    #[test]
    fn test_clinic_request_validates_slug() {
        let req = ProvisionRequest::clinic("north-side", " North Side Clinic ").unwrap();
        assert_eq!(req.namespace.as_str(), "tenant_north_side");
        assert_eq!(req.display_name, "North Side Clinic");
        assert!(ProvisionRequest::clinic(&"x".repeat(80), "Too long").is_err());
    }
}
