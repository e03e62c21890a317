//! End-to-end runs of the build pipeline against scripted tools.

use root_build::{
    BuildFailurePolicy, BuildOptions, DryRunRunner, Error, Pipeline, ProcessRunner, ProcessStatus,
    RunReport, Stage, Step, ToolCommand, ToolConfig,
};
use std::collections::HashMap;
use tempfile::TempDir;

/// Records every command and answers with a preset status per step.
#[derive(Default)]
struct ScriptedRunner {
    statuses: HashMap<Step, i32>,
    missing: Vec<Step>,
    calls: Vec<(Step, ToolCommand)>,
}

impl ScriptedRunner {
    fn exit(mut self, step: Step, code: i32) -> Self {
        self.statuses.insert(step, code);
        self
    }

    fn missing(mut self, step: Step) -> Self {
        self.missing.push(step);
        self
    }

    fn steps(&self) -> Vec<Step> {
        self.calls.iter().map(|(step, _)| *step).collect()
    }
}

impl ProcessRunner for ScriptedRunner {
    fn run(&mut self, step: Step, cmd: &ToolCommand) -> root_build::Result<ProcessStatus> {
        self.calls.push((step, cmd.clone()));
        if self.missing.contains(&step) {
            return Err(Error::Spawn {
                program: cmd.program_name(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            });
        }
        Ok(ProcessStatus::from_code(
            self.statuses.get(&step).copied().unwrap_or(0),
        ))
    }
}

fn run(
    tokens: &[&str],
    config: &ToolConfig,
    runner: &mut ScriptedRunner,
) -> (TempDir, root_build::Result<RunReport>) {
    let root = TempDir::new().unwrap();
    let options = BuildOptions::parse(tokens).unwrap();
    let report = Pipeline::new(config, &options).run(root.path(), runner);
    (root, report)
}

fn ignore_failures() -> ToolConfig {
    let mut config = ToolConfig::default();
    config.policy.build_failure = BuildFailurePolicy::Ignore;
    config
}

#[test]
fn test_no_arguments() {
    let mut runner = ScriptedRunner::default();
    let (root, report) = run(&[], &ToolConfig::default(), &mut runner);
    let report = report.unwrap();

    let obj = root.path().join("obj").canonicalize().unwrap();
    assert!(obj.is_dir());
    assert_eq!(report.exit_code, 0);
    assert_eq!(report.reached, Stage::Built);
    assert_eq!(runner.steps(), [Step::Configure, Step::Build]);

    let (_, configure) = &runner.calls[0];
    assert_eq!(configure.working_dir(), obj);
    assert_eq!(
        configure.args(),
        ["..", "-DROOT_USE_SIMD=1", "-DCMAKE_BUILD_TYPE=Default", "-DEXTRA_FLAGS="]
    );
    let (_, build) = &runner.calls[1];
    assert!(build.args().is_empty());
    assert_eq!(build.working_dir(), obj);
}

#[test]
fn test_configure_failure_stops_run() {
    let mut runner = ScriptedRunner::default().exit(Step::Configure, 1);
    let (_root, report) = run(&["testing"], &ToolConfig::default(), &mut runner);
    let report = report.unwrap();

    assert_eq!(report.exit_code, 1);
    assert_eq!(report.reached, Stage::DirReady);
    assert_eq!(runner.steps(), [Step::Configure]);
}

#[test]
fn test_configure_failure_with_any_code_exits_one() {
    let mut runner = ScriptedRunner::default().exit(Step::Configure, 77);
    let (_root, report) = run(&[], &ignore_failures(), &mut runner);

    assert_eq!(report.unwrap().exit_code, 1);
}

#[test]
fn test_build_failure_propagated() {
    let mut runner = ScriptedRunner::default().exit(Step::Build, 2);
    let (_root, report) = run(&["testing"], &ToolConfig::default(), &mut runner);
    let report = report.unwrap();

    assert_eq!(report.exit_code, 2);
    assert_eq!(report.build, Some(ProcessStatus::from_code(2)));
    assert_eq!(runner.steps(), [Step::Configure, Step::Build]);
}

#[test]
fn test_build_failure_ignored() {
    let mut runner = ScriptedRunner::default().exit(Step::Build, 2);
    let (_root, report) = run(&["testing"], &ignore_failures(), &mut runner);
    let report = report.unwrap();

    assert_eq!(report.exit_code, 0);
    assert_eq!(report.reached, Stage::Built);
    // Tests still need a successful build.
    assert_eq!(runner.steps(), [Step::Configure, Step::Build]);
}

#[test]
fn test_missing_build_tool() {
    let mut runner = ScriptedRunner::default().missing(Step::Build);
    let (_root, report) = run(&[], &ToolConfig::default(), &mut runner);
    assert!(matches!(report, Err(Error::Spawn { .. })));

    let mut runner = ScriptedRunner::default().missing(Step::Build);
    let (_root, report) = run(&[], &ignore_failures(), &mut runner);
    assert_eq!(report.unwrap().exit_code, 0);
}

#[test]
fn test_missing_configure_tool() {
    let mut runner = ScriptedRunner::default().missing(Step::Configure);
    let (_root, report) = run(&[], &ignore_failures(), &mut runner);

    let err = report.unwrap_err();
    assert!(!err.is_usage());
    assert_eq!(runner.steps(), [Step::Configure]);
}

#[test]
fn test_testing_runs_test_binary() {
    let mut runner = ScriptedRunner::default();
    let (root, report) = run(&["testing"], &ToolConfig::default(), &mut runner);
    let report = report.unwrap();

    assert_eq!(report.reached, Stage::Tested);
    assert_eq!(runner.steps(), [Step::Configure, Step::Build, Step::Test]);

    let (_, configure) = &runner.calls[0];
    assert!(configure
        .args()
        .iter()
        .any(|a| a == "-DCMAKE_BUILD_TYPE=Testing"));

    let (_, test) = &runner.calls[2];
    let obj = root.path().join("obj").canonicalize().unwrap();
    assert_eq!(test.program(), obj.join("bin/UnitTests"));
    assert!(test.args().is_empty());
}

#[test]
fn test_test_status_not_propagated() {
    let mut runner = ScriptedRunner::default().exit(Step::Test, 5);
    let (_root, report) = run(&["testing"], &ToolConfig::default(), &mut runner);
    let report = report.unwrap();

    assert_eq!(report.exit_code, 0);
    assert_eq!(report.test, Some(ProcessStatus::from_code(5)));
}

#[test]
fn test_missing_test_binary_is_not_fatal() {
    let mut runner = ScriptedRunner::default().missing(Step::Test);
    let (_root, report) = run(&["testing"], &ToolConfig::default(), &mut runner);
    let report = report.unwrap();

    assert_eq!(report.exit_code, 0);
    assert_eq!(report.test, None);
    assert_eq!(report.reached, Stage::Built);
}

#[test]
fn test_verbose_and_custom_tools() {
    let config = ToolConfig::from_toml(
        r#"
[tools]
configure = "cmake3"
build = "gmake"

[layout]
build_dir = "build"
"#,
    )
    .unwrap();

    let mut runner = ScriptedRunner::default();
    let (root, report) = run(&["verbose", "withdemos"], &config, &mut runner);
    report.unwrap();

    assert!(root.path().join("build").is_dir());
    assert!(!root.path().join("obj").exists());

    let (_, configure) = &runner.calls[0];
    assert_eq!(configure.program_name(), "cmake3");
    assert!(configure.args().iter().any(|a| a == "-DROOT_COMPILE_DEMOS=1"));

    let (_, build) = &runner.calls[1];
    assert_eq!(build.to_string(), "gmake VERBOSE=1");
}

#[test]
fn test_file_in_place_of_build_dir() {
    let root = TempDir::new().unwrap();
    std::fs::write(root.path().join("obj"), "").unwrap();

    let options = BuildOptions::default();
    let config = ToolConfig::default();
    let mut runner = ScriptedRunner::default();
    let err = Pipeline::new(&config, &options)
        .run(root.path(), &mut runner)
        .unwrap_err();

    assert!(err.is_usage());
    assert!(runner.calls.is_empty());
}

#[test]
fn test_dry_run_executes_nothing() {
    let root = TempDir::new().unwrap();
    let options = BuildOptions::parse(&["testing", "nosimd"]).unwrap();
    let config = ToolConfig::default();
    let mut runner = DryRunRunner::new(Vec::new());

    let report = Pipeline::new(&config, &options)
        .run(root.path(), &mut runner)
        .unwrap();

    assert_eq!(report.exit_code, 0);
    assert!(root.path().join("obj").is_dir());

    let listing = String::from_utf8(runner.into_inner()).unwrap();
    let lines: Vec<_> = listing.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("(configure) cd "));
    assert!(lines[0].ends_with("cmake .. -DCMAKE_BUILD_TYPE=Testing -DEXTRA_FLAGS="));
    assert!(lines[1].ends_with("&& make"));
    assert!(lines[2].starts_with("(test) "));
}

#[cfg(unix)]
#[test]
fn test_relative_root_runs_test_binary() {
    use root_build::SystemRunner;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    // Created under the current directory so the root can be given relative,
    // the way `rootbuild` is invoked with its default `-C .`.
    let dir = tempfile::Builder::new()
        .prefix("relative-root-")
        .tempdir_in(".")
        .unwrap();
    let root = Path::new(".").join(dir.path().file_name().unwrap());

    let bin = root.join("obj/bin");
    std::fs::create_dir_all(&bin).unwrap();
    let script = bin.join("UnitTests");
    std::fs::write(&script, "#!/bin/sh\ntouch ran_marker\n").unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

    let config = ToolConfig::from_toml("[tools]\nconfigure = \"true\"\nbuild = \"true\"\n").unwrap();
    let options = BuildOptions::parse(&["testing"]).unwrap();

    let report = Pipeline::new(&config, &options)
        .run(&root, &mut SystemRunner)
        .unwrap();

    assert_eq!(report.exit_code, 0);
    assert_eq!(report.test, Some(ProcessStatus::SUCCESS));
    assert_eq!(report.reached, Stage::Tested);
    // The script runs inside the build directory.
    assert!(root.join("obj/ran_marker").exists());
}
