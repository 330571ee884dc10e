use std::fs;
use std::path::Path;
use std::sync::Mutex;

use brandkit::assemble::{self, DEFAULT_TASK};
use brandkit::brand::Brand;
use brandkit::config::BrandkitConfig;
use brandkit::error::Result;
use brandkit::registry::TaskRegistry;
use brandkit::runner::Runner;
use brandkit::signal::{vars, EnvSignal};
use brandkit::task::{TaskDefinition, TaskKind};
use brandkit::transform::{TaskExecutor, ToolExecutor};

fn two_brand_config(dir: &Path) -> BrandkitConfig {
    fs::write(
        dir.join("brandkit.json"),
        r#"{"brands": [{"id": "ksp"}, {"id": "fks"}]}"#,
    )
    .unwrap();
    BrandkitConfig::load(dir).unwrap()
}

/// Stand-in for the external stylesheet compiler: records execution order
/// and writes each task's destination from its source and options, so brand
/// isolation is observable on disk.
struct StubCompiler<'a> {
    root: &'a Path,
    log: Mutex<Vec<String>>,
}

impl<'a> StubCompiler<'a> {
    fn new(root: &'a Path) -> Self {
        Self {
            root,
            log: Mutex::new(Vec::new()),
        }
    }

    fn executed(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

impl TaskExecutor for StubCompiler<'_> {
    fn execute(&self, task: &TaskDefinition) -> Result<()> {
        self.log.lock().unwrap().push(task.name.clone());
        if let (Some(src), Some(dest)) = (task.src.first(), task.dest.as_deref()) {
            let source = fs::read_to_string(self.root.join(src)).unwrap_or_default();
            let dest = self.root.join(dest);
            fs::create_dir_all(dest.parent().unwrap()).unwrap();
            fs::write(dest, format!("compiled[{}] from {}", source.trim(), src)).unwrap();
        }
        Ok(())
    }
}

#[test]
fn compiling_all_brands_produces_one_output_per_brand_in_declared_order() {
    let dir = tempfile::tempdir().unwrap();
    let config = two_brand_config(dir.path());
    fs::create_dir_all(dir.path().join("less")).unwrap();
    fs::write(dir.path().join("less/ksp.less"), "ksp-vars").unwrap();
    fs::write(dir.path().join("less/fks.less"), "fks-vars").unwrap();

    let registry = assemble::build_registry(&config, &EnvSignal::default()).unwrap();
    let compiler = StubCompiler::new(dir.path());
    let report = Runner::new(&registry, &compiler).run("less-compile").unwrap();

    assert_eq!(compiler.executed(), vec!["less:ksp", "less:fks"]);
    assert_eq!(report.executed.len(), 2);

    let ksp = fs::read_to_string(dir.path().join("dist/css/ksp/bootstrap.css")).unwrap();
    let fks = fs::read_to_string(dir.path().join("dist/css/fks/bootstrap.css")).unwrap();
    assert_eq!(ksp, "compiled[ksp-vars] from less/ksp.less");
    assert_eq!(fks, "compiled[fks-vars] from less/fks.less");
}

#[test]
fn brand_fan_out_registers_exactly_one_instance_per_brand() {
    let dir = tempfile::tempdir().unwrap();
    let config = two_brand_config(dir.path());
    let registry = assemble::build_registry(&config, &EnvSignal::default()).unwrap();

    let brand_tasks: Vec<String> = registry
        .task_names()
        .into_iter()
        .filter(|n| n.starts_with("less:"))
        .collect();
    assert_eq!(brand_tasks, vec!["less:fks", "less:ksp"]);

    // Each instance carries only its own brand's paths.
    let fks = registry.get("less:fks").unwrap();
    assert_eq!(fks.src, vec!["less/fks.less"]);
    assert_eq!(fks.dest.as_deref(), Some("dist/css/fks/bootstrap.css"));
    assert!(!format!("{:?}", fks).contains("ksp"));
}

#[test]
fn test_composite_membership_follows_the_environment_snapshot() {
    let config = BrandkitConfig::default();

    let cases: [(&[(&str, &str)], &[&str]); 4] = [
        // No signal: core and validation, no credential means no sauce.
        (&[], &["dist-css", "validate-html"]),
        // Selector restricts to core even though the credential is present.
        (
            &[(vars::TEST_SUBSET, "core"), (vars::SAUCE_ACCESS_KEY, "k")],
            &["dist-css"],
        ),
        // Validator explicitly disabled; sauce eligible and unrestricted.
        (
            &[(vars::DO_VALIDATOR, "0"), (vars::SAUCE_ACCESS_KEY, "k")],
            &["dist-css", "saucelabs"],
        ),
        // Unknown selector: a legal, vacuous test run.
        (&[(vars::TEST_SUBSET, "nightly")], &[]),
    ];

    for (env, expected_markers) in cases {
        let signal = EnvSignal::from_vars(env);
        let registry = assemble::build_registry(&config, &signal).unwrap();
        let members = registry.composite_members("test").unwrap();

        for marker in ["dist-css", "validate-html", "saucelabs"] {
            let expected = expected_markers.contains(&marker);
            assert_eq!(
                members.iter().any(|m| m == marker),
                expected,
                "marker {} with env {:?}",
                marker,
                env
            );
        }
    }
}

#[test]
fn failing_step_halts_the_run_and_leaves_prior_outputs_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("one.txt"), "1").unwrap();
    fs::write(dir.path().join("two.txt"), "2").unwrap();

    let mut registry = TaskRegistry::new();
    for step in ["one", "two"] {
        registry
            .register(
                TaskDefinition::new(format!("copy:{}", step), TaskKind::Copy)
                    .src([format!("{}.txt", step)])
                    .dest("out"),
            )
            .unwrap();
    }
    // Step 3 reads a source that does not exist.
    registry
        .register(
            TaskDefinition::new("concat:broken", TaskKind::Concat)
                .src(["missing.js"])
                .dest("out/bundle.js"),
        )
        .unwrap();
    registry
        .register(
            TaskDefinition::new("copy:late", TaskKind::Copy)
                .src(["one.txt"])
                .dest("late"),
        )
        .unwrap();
    registry
        .define_composite(
            "deliver",
            ["copy:one", "copy:two", "concat:broken", "copy:late"],
        )
        .unwrap();

    let executor = ToolExecutor::new(
        BrandkitConfig::default(),
        dir.path().to_path_buf(),
        EnvSignal::default(),
    );
    let err = Runner::new(&registry, &executor).run("deliver").unwrap_err();

    assert_eq!(err.details["task"], "concat:broken");
    assert_eq!(err.details["position"], 3);
    assert_eq!(err.details["sequenceLength"], 4);
    // Steps 1-2 left their outputs; step 4 never ran.
    assert!(dir.path().join("out/one.txt").exists());
    assert!(dir.path().join("out/two.txt").exists());
    assert!(!dir.path().join("late").exists());
}

#[test]
fn rerunning_a_pipeline_overwrites_outputs_byte_identically() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("js")).unwrap();
    fs::write(dir.path().join("js/alert.js"), "alert();\n").unwrap();
    fs::write(dir.path().join("js/modal.js"), "modal();\n").unwrap();

    let mut registry = TaskRegistry::new();
    registry
        .register(
            TaskDefinition::new("concat:scripts", TaskKind::Concat)
                .src(["js/alert.js", "js/modal.js"])
                .dest("dist/js/bundle.js")
                .option("banner", "/*! bundle */\n"),
        )
        .unwrap();
    registry
        .register(
            TaskDefinition::new("usebanner", TaskKind::Usebanner)
                .src(["dist/js/*.js"])
                .option("banner", "/*! bundle */\n"),
        )
        .unwrap();
    registry
        .define_composite("bundle", ["concat:scripts", "usebanner"])
        .unwrap();

    let executor = ToolExecutor::new(
        BrandkitConfig::default(),
        dir.path().to_path_buf(),
        EnvSignal::default(),
    );
    let runner = Runner::new(&registry, &executor);

    runner.run("bundle").unwrap();
    let first = fs::read(dir.path().join("dist/js/bundle.js")).unwrap();
    runner.run("bundle").unwrap();
    let second = fs::read(dir.path().join("dist/js/bundle.js")).unwrap();
    assert_eq!(first, second);
}

#[test]
fn dist_plan_sequences_each_brand_chain_and_deploy_copies() {
    let dir = tempfile::tempdir().unwrap();
    let config = two_brand_config(dir.path());
    let registry = assemble::build_registry(&config, &EnvSignal::default()).unwrap();

    let plan = registry.resolve("dist").unwrap();
    let position = |name: &str| {
        plan.iter()
            .position(|n| n == name)
            .unwrap_or_else(|| panic!("{} missing from dist plan", name))
    };

    for brand in ["ksp", "fks"] {
        assert!(position(&format!("less:{}", brand)) < position(&format!("autoprefixer:{}", brand)));
        assert!(
            position(&format!("autoprefixer:{}", brand)) < position(&format!("cssmin:{}", brand))
        );
        assert!(position(&format!("cssmin:{}", brand)) < position(&format!("copy:{}", brand)));
    }
    assert_eq!(position("clean:dist"), 0);
}

#[test]
fn default_task_exists_and_resolves() {
    let dir = tempfile::tempdir().unwrap();
    let config = two_brand_config(dir.path());
    let registry = assemble::build_registry(&config, &EnvSignal::default()).unwrap();

    let plan = registry.resolve(DEFAULT_TASK).unwrap();
    assert!(plan.iter().any(|n| n == "clean:dist"));
    assert!(plan.iter().any(|n| n == "jade:customizer"));
}

#[test]
fn custom_brand_paths_flow_into_the_generated_tasks() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("brandkit.json"),
        r#"{
            "brands": [
                {"id": "ksp", "less_entry": "themes/ksp/main.less", "deploy_target": "/srv/static/ksp"}
            ]
        }"#,
    )
    .unwrap();
    let config = BrandkitConfig::load(dir.path()).unwrap();
    let registry = assemble::build_registry(&config, &EnvSignal::default()).unwrap();

    let less = registry.get("less:ksp").unwrap();
    assert_eq!(less.src, vec!["themes/ksp/main.less"]);

    let copy = registry.get("copy:ksp").unwrap();
    assert_eq!(copy.dest.as_deref(), Some("/srv/static/ksp"));
}

#[test]
fn fan_out_helper_matches_registry_contents() {
    let brands = vec![Brand::named("ksp"), Brand::named("fks")];
    let names = brandkit::brand::member_names("cssmin", &brands);
    assert_eq!(names, vec!["cssmin:ksp", "cssmin:fks"]);
}
