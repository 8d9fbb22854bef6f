//! HR API settings

use ::config::{Config, ConfigError, Environment};
use serde::Deserialize;

/// Startup behaviour of the HR API
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiConfig {
    /// Upsert the built-in role catalogue on startup (`HRMS_SEED_ROLES`)
    pub seed_roles: bool,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("seed_roles", true)?
            .add_source(Environment::with_prefix("HRMS").try_parsing(true))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_roles_are_seeded_by_default() {
        unsafe {
            std::env::remove_var("HRMS_SEED_ROLES");
        }

        assert!(ApiConfig::from_env().expect("defaults load").seed_roles);
    }

    #[test]
    #[serial]
    fn test_seeding_can_be_disabled() {
        unsafe {
            std::env::set_var("HRMS_SEED_ROLES", "false");
        }

        assert!(!ApiConfig::from_env().expect("env loads").seed_roles);

        unsafe {
            std::env::remove_var("HRMS_SEED_ROLES");
        }
    }
}
