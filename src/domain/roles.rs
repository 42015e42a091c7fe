//! Role and commission-tier vocabulary.
//!
//! Legacy user rows carry free-text profile labels alongside a structured
//! category column. The mapping from either representation into
//! [`RoleCategory`] is total and happens once, at the directory-store
//! boundary; everything downstream works with the enum.

use serde::{Deserialize, Serialize};

/// A user's role category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoleCategory {
    SuperAdmin,
    /// ISO portal administrator ("Admin").
    PortalAdmin,
    Executivo,
    Core,
    /// A user belonging to the ISO itself, paid from granular MDR margins.
    IsoOwn,
}

impl RoleCategory {
    /// Total mapping from a stored category value or legacy profile label.
    ///
    /// Case-insensitive substring checks, matching how historical rows were
    /// labeled. Unrecognized labels resolve to `IsoOwn`, the least
    /// privileged tier.
    pub fn from_label(raw: &str) -> Self {
        let label = raw.to_lowercase();
        if label.contains("super") {
            Self::SuperAdmin
        } else if label.contains("admin") {
            Self::PortalAdmin
        } else if label.contains("executivo") || label.contains("executive") {
            Self::Executivo
        } else if label.contains("core") {
            Self::Core
        } else {
            Self::IsoOwn
        }
    }

    pub fn is_super_admin(&self) -> bool {
        matches!(self, Self::SuperAdmin)
    }

    /// The margin class this role resolves margins with on read paths.
    pub fn margin_class(&self) -> MarginClass {
        match self {
            Self::SuperAdmin => MarginClass::Outbank,
            Self::Executivo => MarginClass::Executivo,
            Self::Core => MarginClass::Core,
            Self::PortalAdmin | Self::IsoOwn => MarginClass::IsoOwn,
        }
    }
}

/// Commission tier tagged on a user↔customer link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommissionType {
    Executivo,
    Core,
}

impl CommissionType {
    pub fn from_label(raw: &str) -> Option<Self> {
        match raw.trim().to_uppercase().as_str() {
            "EXECUTIVO" => Some(Self::Executivo),
            "CORE" => Some(Self::Core),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Executivo => "EXECUTIVO",
            Self::Core => "CORE",
        }
    }

    pub fn margin_class(&self) -> MarginClass {
        match self {
            Self::Executivo => MarginClass::Executivo,
            Self::Core => MarginClass::Core,
        }
    }
}

/// Strategy selector for margin resolution.
///
/// The three flat tiers read a single percentage off the customer's margin
/// configuration; `IsoOwn` stacks granular MDR margins instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarginClass {
    Outbank,
    Executivo,
    Core,
    IsoOwn,
}

/// Where a resolved percentage came from, for observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarginSource {
    /// A configured row supplied the value.
    Config,
    /// No configuration matched; the resolver degraded to 0%.
    Default,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_label_structured_values() {
        assert_eq!(RoleCategory::from_label("SUPER_ADMIN"), RoleCategory::SuperAdmin);
        assert_eq!(RoleCategory::from_label("ISO_PORTAL_ADMIN"), RoleCategory::PortalAdmin);
        assert_eq!(RoleCategory::from_label("EXECUTIVO"), RoleCategory::Executivo);
        assert_eq!(RoleCategory::from_label("CORE"), RoleCategory::Core);
    }

    #[test]
    fn test_role_from_label_legacy_profiles() {
        assert_eq!(RoleCategory::from_label("Perfil Executivo Sul"), RoleCategory::Executivo);
        assert_eq!(RoleCategory::from_label("admin do portal"), RoleCategory::PortalAdmin);
        assert_eq!(RoleCategory::from_label("Superadmin"), RoleCategory::SuperAdmin);
        // Unknown profile labels are ISO-own users.
        assert_eq!(RoleCategory::from_label("Vendedor"), RoleCategory::IsoOwn);
    }

    #[test]
    fn test_margin_class_per_role() {
        assert_eq!(RoleCategory::SuperAdmin.margin_class(), MarginClass::Outbank);
        assert_eq!(RoleCategory::Executivo.margin_class(), MarginClass::Executivo);
        assert_eq!(RoleCategory::Core.margin_class(), MarginClass::Core);
        assert_eq!(RoleCategory::IsoOwn.margin_class(), MarginClass::IsoOwn);
        assert_eq!(RoleCategory::PortalAdmin.margin_class(), MarginClass::IsoOwn);
    }

    #[test]
    fn test_commission_type_parsing() {
        assert_eq!(CommissionType::from_label("EXECUTIVO"), Some(CommissionType::Executivo));
        assert_eq!(CommissionType::from_label("core"), Some(CommissionType::Core));
        assert_eq!(CommissionType::from_label(""), None);
        assert_eq!(CommissionType::from_label("OUTRO"), None);
    }
}
