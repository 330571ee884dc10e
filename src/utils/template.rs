//! String template rendering utilities.

/// Placeholder names recognized in path and banner templates.
pub mod vars {
    pub const BRAND: &str = "brand";
    pub const NAME: &str = "name";
    pub const VERSION: &str = "version";
    pub const HOMEPAGE: &str = "homepage";
    pub const AUTHOR: &str = "author";
    pub const LICENSE: &str = "license";
    pub const YEAR: &str = "year";
}

pub fn render(template: &str, variables: &[(&str, &str)]) -> String {
    let mut result = template.to_string();

    for (key, value) in variables {
        let placeholder = format!("{{{{{}}}}}", key);
        result = result.replace(&placeholder, value);
    }

    result
}

pub fn is_present(template: &str, key: &str) -> bool {
    let placeholder = format!("{{{{{}}}}}", key);
    template.contains(&placeholder)
}
