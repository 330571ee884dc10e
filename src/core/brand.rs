use serde::{Deserialize, Serialize};

use crate::task::TaskDefinition;

/// One independently deployed visual variant built from the shared source
/// tree. Declared once, in a fixed order, in `brandkit.json`; every
/// brand-specific pipeline stage is instantiated per brand from a single
/// template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brand {
    pub id: String,
    /// Stylesheet entry point; defaults to `less/<id>.less`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub less_entry: Option<String>,
    /// Subdirectory under `dist/css/`; defaults to the brand id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dist_subdir: Option<String>,
    /// Per-brand deployment copy target; defaults to
    /// `<deploy_root>/css/<subdir>/`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deploy_target: Option<String>,
}

impl Brand {
    pub fn named(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            less_entry: None,
            dist_subdir: None,
            deploy_target: None,
        }
    }

    pub fn less_entry(&self) -> String {
        self.less_entry
            .clone()
            .unwrap_or_else(|| format!("less/{}.less", self.id))
    }

    pub fn dist_subdir(&self) -> &str {
        self.dist_subdir.as_deref().unwrap_or(&self.id)
    }

    pub fn css_dir(&self, dist_root: &str) -> String {
        format!("{}/css/{}", dist_root, self.dist_subdir())
    }

    pub fn deploy_target(&self, deploy_root: &str) -> String {
        self.deploy_target
            .clone()
            .unwrap_or_else(|| format!("{}/css/{}", deploy_root, self.dist_subdir()))
    }
}

/// Generated task name for a brand-parameterized stage instance.
pub fn task_name(stage: &str, brand_id: &str) -> String {
    format!("{}:{}", stage, brand_id)
}

/// Member list of a stage's fan-out composite, in declared brand order.
pub fn member_names(stage: &str, brands: &[Brand]) -> Vec<String> {
    brands.iter().map(|b| task_name(stage, &b.id)).collect()
}

/// Instantiate one atomic task per brand from a stage template. The closure
/// receives the brand and the generated `stage:brand` name and returns the
/// brand's definition; ordering follows the declared brand set.
pub fn fan_out<F>(stage: &str, brands: &[Brand], mut make: F) -> Vec<TaskDefinition>
where
    F: FnMut(&Brand, String) -> TaskDefinition,
{
    brands
        .iter()
        .map(|brand| make(brand, task_name(stage, &brand.id)))
        .collect()
}
