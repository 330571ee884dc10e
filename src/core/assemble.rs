//! Distribution assembler: builds the full task registry from configuration.
//!
//! Every brand-specific stage is instantiated once per declared brand via
//! `brand::fan_out`; composites wire the stages into the distribution,
//! documentation and test pipelines. The `test` composite is the only place
//! the environment snapshot participates.

use crate::brand;
use crate::config::BrandkitConfig;
use crate::error::Result;
use crate::registry::TaskRegistry;
use crate::signal::EnvSignal;
use crate::subset;
use crate::task::{TaskDefinition, TaskKind};

pub const DEFAULT_TASK: &str = "default";

pub fn build_registry(config: &BrandkitConfig, signal: &EnvSignal) -> Result<TaskRegistry> {
    let mut registry = TaskRegistry::new();

    let dist = config.paths.dist.as_str();
    let name = config.pkg.name.as_str();
    let banner = config.banner_text();
    let deploy_root = config.deploy_root();

    registry.register(
        TaskDefinition::new("clean:dist", TaskKind::Clean)
            .src([dist.to_string(), config.paths.docs_dist.clone()]),
    )?;

    // === Brand-parameterized stages ===

    for task in brand::fan_out("less", &config.brands, |b, task_name| {
        let css = format!("{}/{}.css", b.css_dir(dist), name);
        TaskDefinition::new(task_name, TaskKind::Less)
            .src([b.less_entry()])
            .dest(css.clone())
            .option("strictMath", true)
            .option("sourceMap", true)
            .option("outputSourceFiles", true)
            .option("sourceMapURL", format!("{}.css.map", name))
            .option("sourceMapFilename", format!("{}.map", css))
    }) {
        registry.register(task)?;
    }

    for task in brand::fan_out("autoprefixer", &config.brands, |b, task_name| {
        TaskDefinition::new(task_name, TaskKind::Autoprefixer)
            .src([format!("{}/{}.css", b.css_dir(dist), name)])
            .option("map", true)
    }) {
        registry.register(task)?;
    }

    for task in brand::fan_out("cssmin", &config.brands, |b, task_name| {
        TaskDefinition::new(task_name, TaskKind::Cssmin)
            .src([format!("{}/{}.css", b.css_dir(dist), name)])
            .dest(format!("{}/{}.min.css", b.css_dir(dist), name))
            .option("compatibility", "ie8")
            .option("keepSpecialComments", "*")
            .option("noAdvanced", true)
    }) {
        registry.register(task)?;
    }

    for task in brand::fan_out("copy", &config.brands, |b, task_name| {
        TaskDefinition::new(task_name, TaskKind::Copy)
            .src(["**".to_string()])
            .dest(b.deploy_target(&deploy_root))
            .option("cwd", b.css_dir(dist))
    }) {
        registry.register(task)?;
    }

    // === Shared style stages ===

    registry.register(
        TaskDefinition::new("usebanner", TaskKind::Usebanner)
            .src([format!("{}/css/**/*.css", dist)])
            .option("banner", banner.clone()),
    )?;

    registry.register(
        TaskDefinition::new("csscomb:dist", TaskKind::Csscomb)
            .src(["**/*.css".to_string(), "!**/*.min.css".to_string()])
            .option("cwd", format!("{}/css", dist))
            .option("config", "less/.csscomb.json"),
    )?;

    registry.register(
        TaskDefinition::new("csslint", TaskKind::Csslint)
            .src([
                format!("{}/css/**/*.css", dist),
                format!("!{}/css/**/*.min.css", dist),
            ])
            .option("csslintrc", "less/.csslintrc"),
    )?;

    // === Script stages ===

    registry.register(
        TaskDefinition::new("concat:scripts", TaskKind::Concat)
            .src(config.scripts.clone())
            .dest(format!("{}/js/{}.js", dist, name))
            .option("banner", banner),
    )?;

    registry.register(
        TaskDefinition::new("uglify:scripts", TaskKind::Uglify)
            .src([format!("{}/js/{}.js", dist, name)])
            .dest(format!("{}/js/{}.min.js", dist, name))
            .option("preserveComments", "some"),
    )?;

    registry.register(
        TaskDefinition::new("jshint", TaskKind::Jshint)
            .src(["js/*.js".to_string()])
            .option("jshintrc", "js/.jshintrc"),
    )?;

    registry.register(
        TaskDefinition::new("jscs", TaskKind::Jscs)
            .src(["js/*.js".to_string()])
            .option("jscsrc", "js/.jscsrc"),
    )?;

    registry.register(TaskDefinition::new("qunit", TaskKind::Qunit))?;

    // === Copies into dist and the deployment static root ===

    registry.register(
        TaskDefinition::new("copy:fonts", TaskKind::Copy)
            .src(["fonts/*".to_string()])
            .dest(dist),
    )?;

    registry.register(
        TaskDefinition::new("copy:docs", TaskKind::Copy)
            .src([
                "css/**/*.min.*".to_string(),
                "css/**/*.map".to_string(),
                "js/*.min.*".to_string(),
                "fonts/*".to_string(),
            ])
            .dest(config.paths.docs_dist.clone())
            .option("cwd", dist),
    )?;

    registry.register(
        TaskDefinition::new("copy:js", TaskKind::Copy)
            .src(["**".to_string()])
            .dest(format!("{}/js", deploy_root))
            .option("cwd", format!("{}/js", dist)),
    )?;

    registry.register(
        TaskDefinition::new("copy:font", TaskKind::Copy)
            .src(["**".to_string()])
            .dest(format!("{}/fonts", deploy_root))
            .option("cwd", format!("{}/fonts", dist)),
    )?;

    // === Documentation and test-only tasks ===

    registry.register(TaskDefinition::new("jekyll:docs", TaskKind::Jekyll))?;

    registry.register(
        TaskDefinition::new("jade:customizer", TaskKind::Jade)
            .src(["docs/_jade/*.jade".to_string()])
            .dest("docs/_includes")
            .option("pretty", true),
    )?;

    registry.register(
        TaskDefinition::new("validation:docs", TaskKind::Validation)
            .src([format!("{}/**/*.html", config.paths.site_output)])
            .option(
                "relaxerror",
                serde_json::json!(config.validator.relaxerror),
            ),
    )?;

    registry.register(TaskDefinition::new("connect", TaskKind::Connect))?;

    registry.register(
        TaskDefinition::new("saucelabs", TaskKind::Saucelabs)
            .option("urls", serde_json::json!(config.sauce.urls))
            .option("concurrency", config.sauce.concurrency)
            .option("maxRetries", config.sauce.max_retries),
    )?;

    // === Composites ===

    registry.define_composite("less-compile", brand::member_names("less", &config.brands))?;

    let mut dist_css = vec!["less-compile".to_string()];
    dist_css.extend(brand::member_names("autoprefixer", &config.brands));
    dist_css.push("usebanner".to_string());
    dist_css.push("csscomb:dist".to_string());
    dist_css.extend(brand::member_names("cssmin", &config.brands));
    registry.define_composite("dist-css", dist_css)?;

    registry.define_composite("dist-js", ["concat:scripts", "uglify:scripts"])?;
    registry.define_composite("dist-docs", ["copy:docs"])?;
    registry.define_composite("validate-html", ["jekyll:docs", "validation:docs"])?;
    registry.define_composite("build-customizer", ["jade:customizer"])?;

    let mut dist_members = vec![
        "clean:dist".to_string(),
        "dist-css".to_string(),
        "copy:fonts".to_string(),
        "dist-js".to_string(),
        "dist-docs".to_string(),
        "copy:js".to_string(),
        "copy:font".to_string(),
    ];
    dist_members.extend(brand::member_names("copy", &config.brands));
    registry.define_composite("dist", dist_members)?;

    registry.define_composite("test", subset::test_members(signal))?;
    registry.define_composite(DEFAULT_TASK, ["test", "dist", "build-customizer"])?;

    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::vars;

    fn registry() -> TaskRegistry {
        build_registry(&BrandkitConfig::default(), &EnvSignal::default()).unwrap()
    }

    #[test]
    fn every_brand_stage_is_instantiated_per_brand() {
        let reg = registry();
        for stage in ["less", "autoprefixer", "cssmin", "copy"] {
            for brand in ["ksp", "fks", "trojsten", "kms", "susi"] {
                let task_name = format!("{}:{}", stage, brand);
                assert!(reg.contains(&task_name), "missing {}", task_name);
            }
        }
    }

    #[test]
    fn brand_task_paths_never_reference_another_brand() {
        let reg = registry();
        let others = ["fks", "trojsten", "kms", "susi"];
        let task = reg.get("less:ksp").unwrap();
        let paths = format!("{:?}{:?}", task.src, task.dest);
        assert!(paths.contains("ksp"));
        for other in others {
            assert!(!paths.contains(other), "{} leaked into less:ksp", other);
        }
    }

    #[test]
    fn dist_resolves_in_pipeline_order() {
        let reg = registry();
        let plan = reg.resolve("dist").unwrap();

        let position = |task: &str| plan.iter().position(|n| n == task).unwrap();
        assert_eq!(position("clean:dist"), 0);
        assert!(position("less:ksp") < position("autoprefixer:ksp"));
        assert!(position("autoprefixer:ksp") < position("cssmin:ksp"));
        assert!(position("cssmin:ksp") < position("copy:ksp"));
        assert!(position("concat:scripts") < position("uglify:scripts"));
    }

    #[test]
    fn default_composite_flattens_without_duplicates() {
        let reg = registry();
        let plan = reg.resolve(DEFAULT_TASK).unwrap();
        let mut unique = plan.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(plan.len(), unique.len());
    }

    #[test]
    fn test_composite_honors_environment_snapshot() {
        let signal = EnvSignal::from_vars(&[(vars::TEST_SUBSET, "validate-html")]);
        let reg = build_registry(&BrandkitConfig::default(), &signal).unwrap();
        let plan = reg.resolve("test").unwrap();
        assert_eq!(plan, vec!["jekyll:docs", "validation:docs"]);
    }

    #[test]
    fn unknown_selector_makes_test_a_no_op() {
        let signal = EnvSignal::from_vars(&[(vars::TEST_SUBSET, "nightly")]);
        let reg = build_registry(&BrandkitConfig::default(), &signal).unwrap();
        assert!(reg.resolve("test").unwrap().is_empty());
    }

    #[test]
    fn saucelabs_task_carries_grid_configuration() {
        let reg = registry();
        let task = reg.get("saucelabs").unwrap();
        assert_eq!(task.option_u64("concurrency"), Some(10));
        assert_eq!(task.option_u64("maxRetries"), Some(3));
        assert!(!task.option_str_list("urls").is_empty());
    }
}
