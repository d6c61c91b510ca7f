use std::path::PathBuf;

use crate::authz::{load_accounts_file, reference_accounts, Role, RoleResolver};
use crate::errors::AppError;
use crate::jwt::JwtConfig;

/// Runtime configuration read from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub jwt: JwtConfig,
    pub resolver: ResolverConfig,
}

impl AppConfig {
    pub fn new(jwt: JwtConfig) -> Self {
        Self {
            port: 8000,
            jwt,
            resolver: ResolverConfig::default(),
        }
    }

    pub fn from_env() -> Result<Self, AppError> {
        let jwt = JwtConfig::from_env()?;

        let port = match non_blank_var("APP_PORT") {
            Some(value) => value
                .parse::<u16>()
                .map_err(|_| AppError::configuration("APP_PORT must be a valid port"))?,
            None => 8000,
        };

        Ok(Self {
            port,
            jwt,
            resolver: ResolverConfig::from_env()?,
        })
    }
}

/// Reads a variable, treating blank values as unset.
pub(crate) fn non_blank_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Where original roles come from.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    pub default_role: Role,
    /// Optional JSON file of `{ "email": "role" }` entries merged over the
    /// reference accounts.
    pub accounts_file: Option<PathBuf>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            default_role: Role::User,
            accounts_file: None,
        }
    }
}

impl ResolverConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let default_role = match non_blank_var("AUTHZ_DEFAULT_ROLE") {
            Some(value) => value
                .parse::<Role>()
                .map_err(|err| AppError::configuration(format!("AUTHZ_DEFAULT_ROLE: {err}")))?,
            None => Role::User,
        };
        if default_role == Role::highest() {
            return Err(AppError::configuration(format!(
                "AUTHZ_DEFAULT_ROLE cannot be {default_role}"
            )));
        }

        let accounts_file = non_blank_var("AUTHZ_ACCOUNTS_FILE").map(PathBuf::from);

        Ok(Self {
            default_role,
            accounts_file,
        })
    }

    pub fn with_default_role(mut self, role: Role) -> Self {
        self.default_role = role;
        self
    }

    pub fn with_accounts_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.accounts_file = Some(path.into());
        self
    }

    /// Reference accounts first, then file entries on top.
    pub fn build(&self) -> Result<RoleResolver, AppError> {
        let mut accounts = reference_accounts();
        if let Some(path) = &self.accounts_file {
            let extra = load_accounts_file(path)?;
            tracing::info!(path = %path.display(), count = extra.len(), "loaded account roles");
            accounts.extend(extra);
        }
        RoleResolver::new(accounts, self.default_role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_uses_reference_accounts() {
        let resolver = ResolverConfig::default().build().unwrap();
        assert_eq!(resolver.resolve_original_role("owner@example.com"), Role::SuperAdmin);
        assert_eq!(resolver.resolve_original_role("stranger@example.com"), Role::User);
    }

    #[test]
    fn accounts_file_overrides_reference_entries() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"test@example.com": "viewer", "new@example.com": "admin"}}"#).unwrap();

        let resolver = ResolverConfig::default()
            .with_accounts_file(file.path())
            .build()
            .unwrap();
        assert_eq!(resolver.resolve_original_role("test@example.com"), Role::Viewer);
        assert_eq!(resolver.resolve_original_role("new@example.com"), Role::Admin);
        assert_eq!(resolver.resolve_original_role("john.doe@example.com"), Role::Admin);
    }

    #[test]
    fn missing_accounts_file_is_a_configuration_error() {
        let err = ResolverConfig::default()
            .with_accounts_file("/definitely/not/here.json")
            .build()
            .unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[test]
    fn privileged_default_role_is_refused() {
        let err = ResolverConfig::default()
            .with_default_role(Role::SuperAdmin)
            .build()
            .unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[test]
    fn app_config_defaults() {
        let config = AppConfig::new(JwtConfig::new("secret", 1));
        assert_eq!(config.port, 8000);
        assert_eq!(config.resolver.default_role, Role::User);
        assert!(config.resolver.accounts_file.is_none());
    }
}
