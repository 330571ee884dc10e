use crate::signal::EnvSignal;

/// Subset names accepted by the `BRANDKIT_TEST` selector.
pub const CORE: &str = "core";
pub const VALIDATE_HTML: &str = "validate-html";
pub const SAUCE_JS_UNIT: &str = "sauce-js-unit";

/// Member tasks of the core build/lint/unit subset.
const CORE_MEMBERS: [&str; 6] = [
    "dist-css",
    "csslint",
    "jshint",
    "jscs",
    "qunit",
    "build-customizer",
];

fn run_subset(signal: &EnvSignal, name: &str) -> bool {
    signal.subset.as_deref().is_none_or(|s| s == name)
}

/// Override convention: only the literal "0" disables; unset or any other
/// value keeps the subsystem enabled. The polarity is load-bearing and is
/// pinned by the truth-table tests below.
fn undef_or_nonzero(value: Option<&str>) -> bool {
    value.is_none_or(|v| v != "0")
}

/// Build the ordered member list for the top-level `test` composite from one
/// environment snapshot. The three predicates are independent and
/// non-exclusive; a selector naming no known subset yields an empty list,
/// which is a legal do-nothing test run.
pub fn test_members(signal: &EnvSignal) -> Vec<String> {
    let mut members: Vec<String> = Vec::new();

    if run_subset(signal, CORE) {
        members.extend(CORE_MEMBERS.iter().map(|s| s.to_string()));
    }

    if run_subset(signal, VALIDATE_HTML) && undef_or_nonzero(signal.do_validator.as_deref()) {
        members.push(VALIDATE_HTML.to_string());
    }

    if signal.has_sauce_credential()
        && run_subset(signal, SAUCE_JS_UNIT)
        && undef_or_nonzero(signal.do_sauce.as_deref())
    {
        members.push("connect".to_string());
        members.push("saucelabs".to_string());
    }

    members
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::vars;

    fn included(signal: &EnvSignal) -> (bool, bool, bool) {
        let members = test_members(signal);
        (
            members.iter().any(|m| m == "dist-css"),
            members.iter().any(|m| m == VALIDATE_HTML),
            members.iter().any(|m| m == "saucelabs"),
        )
    }

    #[test]
    fn no_signal_runs_core_and_validation_only() {
        let signal = EnvSignal::default();
        assert_eq!(included(&signal), (true, true, false));
    }

    #[test]
    fn selector_core_excludes_other_subsets_even_with_credential() {
        let signal = EnvSignal::from_vars(&[
            (vars::TEST_SUBSET, "core"),
            (vars::SAUCE_ACCESS_KEY, "secret"),
        ]);
        assert_eq!(included(&signal), (true, false, false));
    }

    #[test]
    fn validator_disabled_with_zero_while_sauce_runs() {
        let signal = EnvSignal::from_vars(&[
            (vars::DO_VALIDATOR, "0"),
            (vars::SAUCE_ACCESS_KEY, "secret"),
        ]);
        assert_eq!(included(&signal), (true, false, true));
    }

    #[test]
    fn validator_override_any_other_value_keeps_it_enabled() {
        let signal = EnvSignal::from_vars(&[(vars::DO_VALIDATOR, "1")]);
        assert_eq!(included(&signal), (true, true, false));
        let signal = EnvSignal::from_vars(&[(vars::DO_VALIDATOR, "false")]);
        assert_eq!(included(&signal), (true, true, false));
    }

    #[test]
    fn sauce_requires_credential() {
        let signal = EnvSignal::from_vars(&[(vars::TEST_SUBSET, SAUCE_JS_UNIT)]);
        assert_eq!(included(&signal), (false, false, false));
    }

    #[test]
    fn sauce_selector_with_credential_runs_sauce_only() {
        let signal = EnvSignal::from_vars(&[
            (vars::TEST_SUBSET, SAUCE_JS_UNIT),
            (vars::SAUCE_ACCESS_KEY, "secret"),
        ]);
        assert_eq!(included(&signal), (false, false, true));
        // The server task precedes the dispatch task.
        let members = test_members(&signal);
        assert_eq!(members, vec!["connect", "saucelabs"]);
    }

    #[test]
    fn sauce_disabled_with_zero_despite_credential() {
        let signal = EnvSignal::from_vars(&[
            (vars::SAUCE_ACCESS_KEY, "secret"),
            (vars::DO_SAUCE, "0"),
        ]);
        assert_eq!(included(&signal), (true, true, false));
    }

    #[test]
    fn unknown_selector_yields_empty_member_list() {
        let signal = EnvSignal::from_vars(&[(vars::TEST_SUBSET, "nightly")]);
        assert!(test_members(&signal).is_empty());
    }

    #[test]
    fn core_members_preserve_declared_order() {
        let members = test_members(&EnvSignal::default());
        assert_eq!(
            &members[..6],
            &["dist-css", "csslint", "jshint", "jscs", "qunit", "build-customizer"]
        );
    }
}
