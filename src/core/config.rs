use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::brand::Brand;
use crate::error::{Error, Result};
use crate::utils::template;

/// Root configuration structure for brandkit.json.
///
/// Every field has a built-in default reproducing the reference brand setup,
/// so a checkout with no brandkit.json builds out of the box.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandkitConfig {
    #[serde(default)]
    pub pkg: PackageMeta,

    #[serde(default = "default_brands")]
    pub brands: Vec<Brand>,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default = "default_banner")]
    pub banner: String,

    #[serde(default = "default_scripts")]
    pub scripts: Vec<String>,

    #[serde(default = "default_autoprefixer_browsers")]
    pub autoprefixer_browsers: Vec<String>,

    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub sauce: SauceConfig,

    #[serde(default)]
    pub validator: ValidatorConfig,
}

impl Default for BrandkitConfig {
    fn default() -> Self {
        Self {
            pkg: PackageMeta::default(),
            brands: default_brands(),
            paths: PathsConfig::default(),
            banner: default_banner(),
            scripts: default_scripts(),
            autoprefixer_browsers: default_autoprefixer_browsers(),
            tools: ToolsConfig::default(),
            sauce: SauceConfig::default(),
            validator: ValidatorConfig::default(),
        }
    }
}

/// Package metadata rendered into the distribution banner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageMeta {
    pub name: String,
    pub version: String,
    pub homepage: String,
    pub author: String,
    pub license: String,
}

impl Default for PackageMeta {
    fn default() -> Self {
        Self {
            name: "bootstrap".to_string(),
            version: "3.2.0".to_string(),
            homepage: "http://getbootstrap.com".to_string(),
            author: "Twitter, Inc.".to_string(),
            license: "MIT".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Distribution output root.
    #[serde(default = "default_dist")]
    pub dist: String,
    /// Documentation mirror of the distribution.
    #[serde(default = "default_docs_dist")]
    pub docs_dist: String,
    /// Static root the per-brand deployments are copied into. May use `~`.
    #[serde(default = "default_deploy_root")]
    pub deploy_root: String,
    /// Generated documentation site (input to HTML validation).
    #[serde(default = "default_site_output")]
    pub site_output: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            dist: default_dist(),
            docs_dist: default_docs_dist(),
            deploy_root: default_deploy_root(),
            site_output: default_site_output(),
        }
    }
}

/// External tool invocations. Each entry is the argv prefix the transform
/// runs; options from the task definition are appended as flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default = "default_lessc")]
    pub lessc: String,
    #[serde(default = "default_postcss")]
    pub postcss: String,
    #[serde(default = "default_cleancss")]
    pub cleancss: String,
    #[serde(default = "default_uglifyjs")]
    pub uglifyjs: String,
    #[serde(default = "default_csslint")]
    pub csslint: String,
    #[serde(default = "default_csscomb")]
    pub csscomb: String,
    #[serde(default = "default_jshint")]
    pub jshint: String,
    #[serde(default = "default_jscs")]
    pub jscs: String,
    #[serde(default = "default_jekyll")]
    pub jekyll: String,
    #[serde(default = "default_jade")]
    pub jade: String,
    #[serde(default = "default_validator_cmd")]
    pub validator: Vec<String>,
    #[serde(default = "default_qunit_cmd")]
    pub qunit: Vec<String>,
    #[serde(default = "default_serve_cmd")]
    pub serve: Vec<String>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            lessc: default_lessc(),
            postcss: default_postcss(),
            cleancss: default_cleancss(),
            uglifyjs: default_uglifyjs(),
            csslint: default_csslint(),
            csscomb: default_csscomb(),
            jshint: default_jshint(),
            jscs: default_jscs(),
            jekyll: default_jekyll(),
            jade: default_jade(),
            validator: default_validator_cmd(),
            qunit: default_qunit_cmd(),
            serve: default_serve_cmd(),
        }
    }
}

/// Cloud cross-browser test grid settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SauceConfig {
    #[serde(default = "default_sauce_urls")]
    pub urls: Vec<String>,
    #[serde(default = "default_sauce_concurrency")]
    pub concurrency: u32,
    #[serde(default = "default_sauce_retries")]
    pub max_retries: u32,
    /// YAML file declaring the target browser matrix.
    #[serde(default = "default_browsers_file")]
    pub browsers_file: String,
}

impl Default for SauceConfig {
    fn default() -> Self {
        Self {
            urls: default_sauce_urls(),
            concurrency: default_sauce_concurrency(),
            max_retries: default_sauce_retries(),
            browsers_file: default_browsers_file(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Warning messages tolerated by the HTML validator; regex patterns.
    #[serde(default = "default_relaxerror")]
    pub relaxerror: Vec<String>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            relaxerror: default_relaxerror(),
        }
    }
}

// =============================================================================
// Default value functions (match the reference brand setup)
// =============================================================================

fn default_brands() -> Vec<Brand> {
    ["ksp", "fks", "trojsten", "kms", "susi"]
        .into_iter()
        .map(Brand::named)
        .collect()
}

fn default_banner() -> String {
    "/*!\n * {{name}} v{{version}} ({{homepage}})\n * Copyright 2011-{{year}} {{author}}\n * Licensed under {{license}}\n */\n".to_string()
}

fn default_scripts() -> Vec<String> {
    [
        "js/transition.js",
        "js/alert.js",
        "js/button.js",
        "js/carousel.js",
        "js/collapse.js",
        "js/dropdown.js",
        "js/modal.js",
        "js/tooltip.js",
        "js/popover.js",
        "js/scrollspy.js",
        "js/tab.js",
        "js/affix.js",
        "js/offcanvas.js",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_autoprefixer_browsers() -> Vec<String> {
    [
        "Android 2.3",
        "Android >= 4",
        "Chrome >= 20",
        "Firefox >= 24",
        "Explorer >= 8",
        "iOS >= 6",
        "Opera >= 12",
        "Safari >= 6",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_dist() -> String {
    "dist".to_string()
}

fn default_docs_dist() -> String {
    "docs/dist".to_string()
}

fn default_deploy_root() -> String {
    "../../trojsten/static".to_string()
}

fn default_site_output() -> String {
    "_gh_pages".to_string()
}

fn default_lessc() -> String {
    "lessc".to_string()
}

fn default_postcss() -> String {
    "postcss".to_string()
}

fn default_cleancss() -> String {
    "cleancss".to_string()
}

fn default_uglifyjs() -> String {
    "uglifyjs".to_string()
}

fn default_csslint() -> String {
    "csslint".to_string()
}

fn default_csscomb() -> String {
    "csscomb".to_string()
}

fn default_jshint() -> String {
    "jshint".to_string()
}

fn default_jscs() -> String {
    "jscs".to_string()
}

fn default_jekyll() -> String {
    "jekyll".to_string()
}

fn default_jade() -> String {
    "jade".to_string()
}

fn default_validator_cmd() -> Vec<String> {
    vec!["vnu".to_string()]
}

fn default_qunit_cmd() -> Vec<String> {
    vec![
        "phantomjs".to_string(),
        "js/tests/phantom-runner.js".to_string(),
        "js/tests/index.html".to_string(),
    ]
}

fn default_serve_cmd() -> Vec<String> {
    vec![
        "python3".to_string(),
        "-m".to_string(),
        "http.server".to_string(),
        "3000".to_string(),
    ]
}

fn default_sauce_urls() -> Vec<String> {
    vec!["http://127.0.0.1:3000/js/tests/index.html".to_string()]
}

fn default_sauce_concurrency() -> u32 {
    10
}

fn default_sauce_retries() -> u32 {
    3
}

fn default_browsers_file() -> String {
    "test-infra/sauce_browsers.yml".to_string()
}

fn default_relaxerror() -> Vec<String> {
    vec![
        "Bad value X-UA-Compatible for attribute http-equiv on element meta\\.".to_string(),
        "Element img is missing required attribute src\\.".to_string(),
    ]
}

// =============================================================================
// Loading
// =============================================================================

pub const CONFIG_FILE: &str = "brandkit.json";

impl BrandkitConfig {
    /// Load configuration from `brandkit.json` under `dir`. A missing file
    /// yields the built-in defaults; a present but malformed file is an
    /// error, never silently ignored.
    pub fn load(dir: &Path) -> Result<Self> {
        Self::load_file(&dir.join(CONFIG_FILE), true)
    }

    /// Load configuration from an explicit path (`--config`). The file must
    /// exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        Self::load_file(path, false)
    }

    fn load_file(path: &Path, missing_ok: bool) -> Result<Self> {
        if !path.exists() {
            if missing_ok {
                return Ok(Self::default());
            }
            return Err(Error::internal_io(
                format!("Config file not found: {}", path.display()),
                Some("load config".to_string()),
            ));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            Error::internal_io(e.to_string(), Some(format!("read {}", path.display())))
        })?;

        let config: BrandkitConfig = serde_json::from_str(&content)
            .map_err(|e| Error::config_invalid_json(path.display().to_string(), e))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.brands.is_empty() {
            return Err(Error::config_invalid_value(
                "brands",
                None,
                "At least one brand must be declared",
            ));
        }
        let mut seen = std::collections::HashSet::new();
        for brand in &self.brands {
            if brand.id.is_empty() {
                return Err(Error::config_invalid_value(
                    "brands",
                    None,
                    "Brand ids must be non-empty",
                ));
            }
            if !seen.insert(brand.id.clone()) {
                return Err(Error::config_invalid_value(
                    "brands",
                    Some(brand.id.clone()),
                    "Brand ids must be unique",
                ));
            }
        }
        Ok(())
    }

    /// Deployment static root with `~` and environment references expanded.
    pub fn deploy_root(&self) -> String {
        shellexpand::tilde(&self.paths.deploy_root).into_owned()
    }

    /// The distribution banner with package metadata and the current year
    /// substituted in.
    pub fn banner_text(&self) -> String {
        use chrono::Datelike;

        let year = chrono::Utc::now().year().to_string();
        template::render(
            &self.banner,
            &[
                (template::vars::NAME, &self.pkg.name),
                (template::vars::VERSION, &self.pkg.version),
                (template::vars::HOMEPAGE, &self.pkg.homepage),
                (template::vars::AUTHOR, &self.pkg.author),
                (template::vars::LICENSE, &self.pkg.license),
                (template::vars::YEAR, &year),
            ],
        )
    }

    /// Path of the browser-matrix YAML file relative to `root`.
    pub fn browsers_file(&self, root: &Path) -> PathBuf {
        root.join(&self.sauce.browsers_file)
    }
}
