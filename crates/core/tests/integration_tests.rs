//! Integration tests for pcpt-core
//!
//! These tests verify that the core functionality works together correctly
//! by testing complete workflows end-to-end.

use pcpt_core::{
    config::PcptHome,
    error::Error,
    execution::Backend,
    file_handling::{builtin_tables, get_translation_tables},
    invocation::{Translator, OUTPUT_ROOT_VARIABLE, SOURCE_ROOT_VARIABLE},
    resolver::HostFileSystem,
};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

fn strings(raw: &[&str]) -> Vec<String> {
    raw.iter().map(ToString::to_string).collect()
}

/// Test a custom table document driving the whole translation
#[test]
fn test_custom_tables_workflow() {
    let yaml_content = r#"
mounts:
  source: /src
  target: /dst
  output: /results
switches:
  --out: { kind: path, role: output }
  --level: { kind: value, allowed: [low, high] }
  --dry: { kind: boolean }
commands:
  convert:
    - { slot: second-last, role: source }
    - { slot: last, role: target }
"#;

    let mut temp_file = NamedTempFile::new().unwrap();
    write!(temp_file, "{yaml_content}").unwrap();
    let tables = get_translation_tables(temp_file.path().to_str().unwrap()).unwrap();

    let temp_dir = tempfile::tempdir().unwrap();
    let work = temp_dir.path().join("work");
    fs::create_dir_all(work.join("legacy")).unwrap();
    fs::create_dir_all(work.join("modern")).unwrap();

    let file_system = HostFileSystem::new(&work);
    let home = PcptHome::new(temp_dir.path().join("home"));

    let invocation = Translator::new(&tables, &file_system, &home)
        .translate(&strings(&[
            "convert",
            "--level=high",
            "--dry",
            "legacy",
            "modern/java",
            "--out",
            "report.md",
        ]))
        .unwrap();

    assert_eq!(
        invocation.arguments,
        vec![
            "convert",
            "--level",
            "high",
            "--dry",
            "/src",
            "/dst/java",
            "--out",
            "/results/report.md",
        ]
    );

    let containers: Vec<&str> = invocation
        .bindings
        .iter()
        .map(|binding| binding.container_directory.as_str())
        .collect();
    assert_eq!(containers, vec!["/config", "/log", "/src", "/dst", "/results"]);

    assert_eq!(
        invocation.environment.get(OUTPUT_ROOT_VARIABLE),
        Some(&work.join("report.md").display().to_string())
    );
    // The source slot here is second-last, so no source root is exported.
    assert!(invocation.environment.get(SOURCE_ROOT_VARIABLE).is_none());
}

/// Test the runtime command line built from a translated invocation
#[test]
fn test_translation_to_runtime_arguments() {
    let temp_dir = tempfile::tempdir().unwrap();
    let work = temp_dir.path().join("work");
    fs::create_dir_all(work.join("samples/as400-sample")).unwrap();

    let home = PcptHome::new(temp_dir.path().join("home"));
    fs::create_dir_all(home.root().join("hints")).unwrap();
    fs::write(home.root().join("hints/as400.hints"), "RPG hints").unwrap();

    let tables = builtin_tables().unwrap();
    let file_system = HostFileSystem::new(&work);

    let invocation = Translator::new(&tables, &file_system, &home)
        .translate(&strings(&[
            "analyze",
            "samples/as400-sample",
            "--domain-hints",
            "as400.hints",
            "-o",
            "docs",
        ]))
        .unwrap();

    let backend = Backend {
        runtime: "docker".to_string(),
        image: "pcpt:test".to_string(),
        tty: false,
    };
    let arguments = backend.runtime_arguments(&invocation);

    let image_index = arguments.iter().position(|a| a == "pcpt:test").unwrap();
    assert_eq!(
        &arguments[image_index..],
        &[
            "pcpt:test",
            "pcpt",
            "analyze",
            "/source",
            "--domain-hints",
            "/hints/as400.hints",
            "-o",
            "/output/docs",
        ]
    );

    let volume_count = arguments.iter().filter(|a| *a == "-v").count();
    assert_eq!(volume_count, invocation.bindings.len());

    let hints_binding = format!("{}:/hints", home.root().join("hints").display());
    assert!(arguments.contains(&hints_binding));
    assert!(arguments.contains(&format!(
        "{SOURCE_ROOT_VARIABLE}={}",
        work.join("samples/as400-sample").display()
    )));
}

/// Test that every translation error surfaces before anything is launched
#[test]
fn test_translation_errors() {
    let temp_dir = tempfile::tempdir().unwrap();
    let tables = builtin_tables().unwrap();
    let file_system = HostFileSystem::new(temp_dir.path());
    let home = PcptHome::new(temp_dir.path().join("home"));
    let translator = Translator::new(&tables, &file_system, &home);

    let result = translator.translate(&strings(&["sequence", "--mode", "bogus"]));
    assert!(matches!(result, Err(Error::InvalidEnumValue { .. })));

    let result = translator.translate(&strings(&["sequence", "--visualize"]));
    assert!(matches!(result, Err(Error::MissingArgument { .. })));

    let result = translator.translate(&strings(&["analyze", "missing"]));
    assert!(matches!(result, Err(Error::PathNotFound { .. })));

    let result = translator.translate(&strings(&["sequence", "--output", "a/b/c"]));
    assert!(matches!(result, Err(Error::PathNotFound { .. })));
}

/// Test that two different directories cannot share a container mount
#[test]
fn test_conflicting_inputs() {
    let temp_dir = tempfile::tempdir().unwrap();
    let work = temp_dir.path();
    fs::create_dir_all(work.join("a")).unwrap();
    fs::create_dir_all(work.join("b")).unwrap();
    fs::write(work.join("a/rules.json"), "{}").unwrap();
    fs::write(work.join("b/categories.json"), "{}").unwrap();

    let tables = builtin_tables().unwrap();
    let file_system = HostFileSystem::new(work);
    let home = PcptHome::new(work.join("home"));
    let translator = Translator::new(&tables, &file_system, &home);

    let result = translator.translate(&strings(&[
        "run-custom-prompt",
        "--input-file",
        "a/rules.json",
        "--input-file",
        "b/categories.json",
    ]));
    assert!(matches!(result, Err(Error::ConflictingBinding { .. })));

    // Separate flags with separate mounts can point at separate directories.
    let invocation = translator
        .translate(&strings(&[
            "run-custom-prompt",
            "--input-file",
            "a/rules.json",
            "--input-file2",
            "b/categories.json",
        ]))
        .unwrap();
    assert_eq!(
        &invocation.arguments[1..],
        &[
            "--input-file",
            "/input/rules.json",
            "--input-file2",
            "/input2/categories.json",
        ]
    );
    assert!(invocation
        .bindings
        .iter()
        .any(|binding| Path::new(&binding.host_directory) == work.join("b")));
}
