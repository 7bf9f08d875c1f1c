use serde::{Deserialize, Serialize};

/// Identity class of a platform account.
///
/// This is a closed set: every role has exactly one canonical landing route
/// (see [`crate::route`]), and protected areas constrain access to a subset
/// of these roles. Wire names match the profile store column values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Operator of the platform itself.
    PlatformOwner,
    /// Self-service transport manager.
    Tm,
    /// Administrator of a company (tenant) account.
    CompanyAdmin,
    /// Read-only member of a company account.
    CompanyViewer,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::PlatformOwner,
        Role::Tm,
        Role::CompanyAdmin,
        Role::CompanyViewer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::PlatformOwner => "platform_owner",
            Role::Tm => "tm",
            Role::CompanyAdmin => "company_admin",
            Role::CompanyViewer => "company_viewer",
        }
    }

    /// Company roles are scoped to a tenant and only granted via invitation.
    pub fn is_company_role(&self) -> bool {
        matches!(self, Role::CompanyAdmin | Role::CompanyViewer)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
