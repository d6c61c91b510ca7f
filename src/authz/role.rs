use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Authority tier of a principal.
///
/// Variants are declared from highest to lowest authority. Every role has a
/// distinct [`level`](Role::level); a lower level means more authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    SuperAdmin,
    Admin,
    Manager,
    User,
    Viewer,
}

impl Role {
    /// All roles, highest authority first.
    pub const ALL: [Role; 5] = [
        Role::SuperAdmin,
        Role::Admin,
        Role::Manager,
        Role::User,
        Role::Viewer,
    ];

    pub const fn level(self) -> u8 {
        match self {
            Role::SuperAdmin => 1,
            Role::Admin => 2,
            Role::Manager => 3,
            Role::User => 4,
            Role::Viewer => 5,
        }
    }

    /// Stable identifier used on the wire and in config files.
    pub const fn id(self) -> &'static str {
        match self {
            Role::SuperAdmin => "super-admin",
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::User => "user",
            Role::Viewer => "viewer",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Role::SuperAdmin => "Super Admin",
            Role::Admin => "Admin",
            Role::Manager => "Manager",
            Role::User => "User",
            Role::Viewer => "Viewer",
        }
    }

    /// The role with the most authority in the registry.
    pub const fn highest() -> Role {
        Role::SuperAdmin
    }

    /// True when `self` holds strictly more authority than `other`.
    pub fn outranks(self, other: Role) -> bool {
        self.level() < other.level()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(pub String);

impl FromStr for Role {
    type Err = ParseRoleError;

    /// Accepts either the identifier (`super-admin`) or the display label
    /// (`Super Admin`), ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Role::ALL
            .into_iter()
            .find(|role| {
                role.id().eq_ignore_ascii_case(needle) || role.label().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| ParseRoleError(s.to_string()))
    }
}
