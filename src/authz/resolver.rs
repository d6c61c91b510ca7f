use std::collections::HashMap;
use std::path::Path;

use crate::errors::AppError;

use super::role::Role;

/// Reference accounts with a fixed original role.
pub const REFERENCE_ACCOUNTS: &[(&str, Role)] = &[
    ("owner@example.com", Role::SuperAdmin),
    ("john.doe@example.com", Role::Admin),
    ("jane.smith@example.com", Role::Admin),
    ("mike.johnson@example.com", Role::Admin),
    ("sarah.wilson@example.com", Role::Admin),
    ("david.brown@example.com", Role::Admin),
    ("test@example.com", Role::Manager),
];

/// Maps an identifier (email) to its original role.
///
/// Lookups are exact and case-sensitive. Unregistered identifiers fall back to
/// the default role, which can never be the highest-authority role.
#[derive(Debug, Clone)]
pub struct RoleResolver {
    accounts: HashMap<String, Role>,
    default_role: Role,
}

impl RoleResolver {
    pub fn new(
        accounts: impl IntoIterator<Item = (String, Role)>,
        default_role: Role,
    ) -> Result<Self, AppError> {
        if default_role == Role::highest() {
            return Err(AppError::configuration(format!(
                "default role cannot be {}",
                default_role
            )));
        }

        Ok(Self {
            accounts: accounts.into_iter().collect(),
            default_role,
        })
    }

    /// The reference account table with `user` as the fallback.
    pub fn reference() -> Self {
        Self {
            accounts: reference_accounts(),
            default_role: Role::User,
        }
    }

    pub fn resolve_original_role(&self, identifier: &str) -> Role {
        match self.accounts.get(identifier) {
            Some(role) => *role,
            None => {
                tracing::debug!(identifier = %identifier, role = %self.default_role, "unregistered identity, using default role");
                self.default_role
            }
        }
    }

    pub fn default_role(&self) -> Role {
        self.default_role
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

pub fn reference_accounts() -> HashMap<String, Role> {
    REFERENCE_ACCOUNTS
        .iter()
        .map(|(email, role)| (email.to_string(), *role))
        .collect()
}

/// Reads a JSON object of `{ "email": "role" }` pairs.
pub fn load_accounts_file(path: &Path) -> Result<HashMap<String, Role>, AppError> {
    let raw = std::fs::read_to_string(path).map_err(|err| {
        AppError::configuration(format!("failed to read {}: {err}", path.display()))
    })?;
    let entries: HashMap<String, String> = serde_json::from_str(&raw).map_err(|err| {
        AppError::configuration(format!("invalid accounts file {}: {err}", path.display()))
    })?;

    entries
        .into_iter()
        .map(|(email, role)| {
            let role = role
                .parse::<Role>()
                .map_err(|err| AppError::configuration(format!("{email}: {err}")))?;
            Ok((email, role))
        })
        .collect()
}
