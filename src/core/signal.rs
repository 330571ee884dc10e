use std::env;

/// Environment variable names consumed by the test subsetter and the cloud
/// dispatch. Read once at startup into an [`EnvSignal`]; nothing else in the
/// crate touches the process environment.
pub mod vars {
    /// Subset selector: unset runs every eligible subset, a subset name
    /// restricts the run to that subset.
    pub const TEST_SUBSET: &str = "BRANDKIT_TEST";
    /// HTML validation override: only the literal "0" disables.
    pub const DO_VALIDATOR: &str = "BRANDKIT_DO_VALIDATOR";
    /// Cross-browser override: only the literal "0" disables.
    pub const DO_SAUCE: &str = "BRANDKIT_DO_SAUCE";
    /// Credential gating cross-browser eligibility.
    pub const SAUCE_ACCESS_KEY: &str = "SAUCE_ACCESS_KEY";
    pub const SAUCE_USERNAME: &str = "SAUCE_USERNAME";
    /// CI build identifier, passed through opaquely to the cloud dispatch.
    pub const CI_BUILD_ID: &str = "CI_BUILD_ID";
}

/// One snapshot of the environment variables that influence orchestration,
/// taken at startup. Subset selection is a pure function of this value.
#[derive(Debug, Clone, Default)]
pub struct EnvSignal {
    pub subset: Option<String>,
    pub do_validator: Option<String>,
    pub do_sauce: Option<String>,
    pub sauce_access_key: Option<String>,
    pub sauce_username: Option<String>,
    pub build_id: Option<String>,
}

impl EnvSignal {
    pub fn capture() -> Self {
        Self {
            subset: env::var(vars::TEST_SUBSET).ok(),
            do_validator: env::var(vars::DO_VALIDATOR).ok(),
            do_sauce: env::var(vars::DO_SAUCE).ok(),
            sauce_access_key: env::var(vars::SAUCE_ACCESS_KEY).ok(),
            sauce_username: env::var(vars::SAUCE_USERNAME).ok(),
            build_id: env::var(vars::CI_BUILD_ID).ok(),
        }
    }

    /// Build a snapshot from explicit pairs; unnamed variables stay unset.
    pub fn from_vars(pairs: &[(&str, &str)]) -> Self {
        let get = |name: &str| {
            pairs
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        };
        Self {
            subset: get(vars::TEST_SUBSET),
            do_validator: get(vars::DO_VALIDATOR),
            do_sauce: get(vars::DO_SAUCE),
            sauce_access_key: get(vars::SAUCE_ACCESS_KEY),
            sauce_username: get(vars::SAUCE_USERNAME),
            build_id: get(vars::CI_BUILD_ID),
        }
    }

    /// The cross-browser subset is only eligible when the credential is set
    /// and non-empty.
    pub fn has_sauce_credential(&self) -> bool {
        self.sauce_access_key
            .as_deref()
            .is_some_and(|v| !v.is_empty())
    }
}
