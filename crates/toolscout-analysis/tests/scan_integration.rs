//! Integration tests for directory scans and code excerpts.

use anyhow::Result;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use toolscout_analysis::{scan_directory, ScanOptions, SkipKind, ToolRegistry};

fn write(root: &Path, relative: &str, content: &str) -> Result<()> {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

fn tool_class(class_name: &str, tool_name: &str, execute_body: &str) -> String {
    format!(
        r#"class {class_name}:
    def get_name(self):
        return "{tool_name}"

    def get_description(self):
        return "{tool_name} description"

    def execute(self):
        {execute_body}
"#
    )
}

fn sequential() -> ScanOptions {
    ScanOptions {
        parallel: false,
        ..ScanOptions::default()
    }
}

// ============================================================================
// Classification
// ============================================================================

#[test]
fn test_literal_tool_produces_one_record() -> Result<()> {
    let temp = TempDir::new()?;
    write(temp.path(), "x.py", &tool_class("X", "x", "return 1"))?;

    let report = scan_directory(temp.path(), &ScanOptions::default())?;
    assert_eq!(report.table.len(), 1);

    let record = report.table.get("x").unwrap();
    assert_eq!(record.description, "x description");
    assert_eq!(record.class_name, "X");
    assert_eq!(record.file_path, temp.path().join("x.py"));
    Ok(())
}

#[test]
fn test_missing_method_or_computed_name_produces_nothing() -> Result<()> {
    let temp = TempDir::new()?;
    write(
        temp.path(),
        "partial.py",
        r#"
class NoExecute:
    def get_name(self):
        return "no_execute"

    def get_description(self):
        return "missing execute"

class Computed:
    def get_name(self):
        return NAME_PREFIX + "computed"

    def get_description(self):
        return "computed name"

    def execute(self):
        pass
"#,
    )?;

    let report = scan_directory(temp.path(), &ScanOptions::default())?;
    assert!(report.table.is_empty());
    assert!(report.skipped.is_empty());
    Ok(())
}

#[test]
fn test_inherited_methods_do_not_count() -> Result<()> {
    let temp = TempDir::new()?;
    write(
        temp.path(),
        "inherit.py",
        &format!(
            "{}\nclass Child(Base):\n    def execute(self):\n        pass\n",
            tool_class("Base", "base", "pass")
        ),
    )?;

    let report = scan_directory(temp.path(), &ScanOptions::default())?;
    let names: Vec<_> = report.table.names().collect();
    assert_eq!(names, vec!["base"]);
    Ok(())
}

#[test]
fn test_async_execute_or_empty_name_produces_nothing() -> Result<()> {
    let temp = TempDir::new()?;
    write(
        temp.path(),
        "async_tool.py",
        &tool_class("Alpha", "alpha", "pass").replace("def execute", "async def execute"),
    )?;
    write(temp.path(), "empty_name.py", &tool_class("Blank", "", "pass"))?;

    let report = scan_directory(temp.path(), &ScanOptions::default())?;
    assert_eq!(report.files_scanned, 2);
    assert!(report.table.is_empty());
    Ok(())
}

#[test]
fn test_tools_in_hidden_files_are_found_by_default() -> Result<()> {
    let temp = TempDir::new()?;
    write(temp.path(), "pkg/.private_tool.py", &tool_class("Private", "private", "pass"))?;

    let report = scan_directory(temp.path(), &ScanOptions::default())?;
    assert!(report.table.contains("private"));

    let skipping = ScanOptions {
        skip_hidden: true,
        ..ScanOptions::default()
    };
    let report = scan_directory(temp.path(), &skipping)?;
    assert!(report.table.is_empty());
    Ok(())
}

// ============================================================================
// Closure selection
// ============================================================================

#[test]
fn test_excerpt_includes_imports_and_referenced_helper_only() -> Result<()> {
    let temp = TempDir::new()?;
    let source = format!(
        "import os\nfrom typing import Any\n\nclass Helper:\n    pass\n\nclass Beta:\n    pass\n\n\n{}",
        tool_class("Alpha", "alpha", "return Helper()")
    );
    write(temp.path(), "alpha.py", &source)?;

    let report = scan_directory(temp.path(), &ScanOptions::default())?;
    let code = &report.table.get("alpha").unwrap().code;

    assert_eq!(
        code,
        &format!(
            "import os\n\nfrom typing import Any\n\nclass Helper:\n    pass\n\n{}",
            tool_class("Alpha", "alpha", "return Helper()").trim_end_matches('\n')
        )
    );
    assert!(!code.contains("class Beta"));
    Ok(())
}

#[test]
fn test_closure_is_single_hop() -> Result<()> {
    let temp = TempDir::new()?;
    let source = format!(
        "class Deep:\n    pass\n\nclass Helper:\n    def run(self):\n        return Deep()\n\n{}",
        tool_class("Alpha", "alpha", "return Helper().run()")
    );
    write(temp.path(), "alpha.py", &source)?;

    let report = scan_directory(temp.path(), &ScanOptions::default())?;
    let code = &report.table.get("alpha").unwrap().code;

    assert!(code.contains("class Helper:"));
    assert!(!code.contains("class Deep:"));
    Ok(())
}

#[test]
fn test_module_level_functions_and_assignments() -> Result<()> {
    let temp = TempDir::new()?;
    let source = format!(
        "API_URL = \"https://example.com\"\nRETRIES = 3\n\ndef fetch(url):\n    return url\n\ndef unused():\n    pass\n\n{}",
        tool_class("Fetcher", "fetcher", "return fetch(API_URL)")
    );
    write(temp.path(), "fetch.py", &source)?;

    let report = scan_directory(temp.path(), &ScanOptions::default())?;
    let code = &report.table.get("fetcher").unwrap().code;

    assert!(code.starts_with("API_URL = \"https://example.com\"\n\ndef fetch(url):\n    return url\n\nclass Fetcher:"));
    assert!(!code.contains("RETRIES"));
    assert!(!code.contains("def unused"));
    Ok(())
}

#[test]
fn test_class_decorator_references_are_included() -> Result<()> {
    let temp = TempDir::new()?;
    let source = format!(
        "class Registry:\n    pass\n\nclass Unrelated:\n    pass\n\n@Registry.register\n{}",
        tool_class("Alpha", "alpha", "return 1")
    );
    write(temp.path(), "alpha.py", &source)?;

    let report = scan_directory(temp.path(), &ScanOptions::default())?;
    let code = &report.table.get("alpha").unwrap().code;

    assert!(code.starts_with("class Registry:\n    pass\n\nclass Alpha:"));
    assert!(!code.contains("class Unrelated"));
    Ok(())
}

// ============================================================================
// Determinism and duplicates
// ============================================================================

#[test]
fn test_repeated_scans_are_identical() -> Result<()> {
    let temp = TempDir::new()?;
    for i in 0..12 {
        let source = format!(
            "import json\n\nLIMIT_{i} = {i}\n\n{}",
            tool_class(&format!("Tool{i}"), &format!("tool_{i}"), &format!("return LIMIT_{i}"))
        );
        write(temp.path(), &format!("pkg{}/tool_{i}.py", i % 3), &source)?;
    }

    let first = scan_directory(temp.path(), &ScanOptions::default())?;
    let second = scan_directory(temp.path(), &ScanOptions::default())?;
    let serial = scan_directory(temp.path(), &sequential())?;

    assert_eq!(first.table.len(), 12);
    assert_eq!(first.table, second.table);
    assert_eq!(first.table, serial.table);
    Ok(())
}

#[test]
fn test_duplicate_name_last_file_wins() -> Result<()> {
    let temp = TempDir::new()?;
    write(temp.path(), "a.py", &tool_class("First", "dup", "return 'a'"))?;
    write(temp.path(), "b.py", &tool_class("Second", "dup", "return 'b'"))?;

    for options in [ScanOptions::default(), sequential()] {
        let report = scan_directory(temp.path(), &options)?;
        assert_eq!(report.table.len(), 1);
        let record = report.table.get("dup").unwrap();
        assert_eq!(record.class_name, "Second");
        assert_eq!(record.file_path, temp.path().join("b.py"));
    }
    Ok(())
}

#[test]
fn test_duplicate_name_within_file_last_class_wins() -> Result<()> {
    let temp = TempDir::new()?;
    let source = format!(
        "{}\n{}",
        tool_class("Early", "dup", "pass"),
        tool_class("Late", "dup", "pass")
    );
    write(temp.path(), "both.py", &source)?;

    let report = scan_directory(temp.path(), &ScanOptions::default())?;
    assert_eq!(report.table.get("dup").unwrap().class_name, "Late");
    Ok(())
}

// ============================================================================
// Error isolation
// ============================================================================

#[test]
fn test_syntax_error_file_is_skipped() -> Result<()> {
    let temp = TempDir::new()?;
    write(temp.path(), "good.py", &tool_class("Good", "good", "pass"))?;
    write(temp.path(), "broken.py", "class Broken(:\n    def get_name(self)\n")?;

    let report = scan_directory(temp.path(), &ScanOptions::default())?;
    assert_eq!(report.files_scanned, 2);
    assert!(report.table.contains("good"));
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].kind, SkipKind::Parse);
    assert_eq!(report.skipped[0].path, temp.path().join("broken.py"));

    let json = serde_json::to_value(&report.skipped[0])?;
    assert_eq!(json["kind"], "parse");
    assert!(json["message"].as_str().unwrap().contains("syntax error"));
    Ok(())
}

#[test]
fn test_root_validation() -> Result<()> {
    let temp = TempDir::new()?;
    write(temp.path(), "file.py", "x = 1\n")?;

    let missing = scan_directory(&temp.path().join("nope"), &ScanOptions::default());
    assert!(missing.unwrap_err().is_not_found());

    let not_dir = scan_directory(&temp.path().join("file.py"), &ScanOptions::default());
    assert!(not_dir.unwrap_err().is_not_a_directory());
    Ok(())
}

#[test]
fn test_registry_rescan_replaces_whole_table() -> Result<()> {
    let first = TempDir::new()?;
    write(first.path(), "one.py", &tool_class("One", "one", "pass"))?;
    let second = TempDir::new()?;
    write(second.path(), "two.py", &tool_class("Two", "two", "pass"))?;

    let registry = ToolRegistry::new(&ScanOptions::default())?;
    registry.rescan(first.path())?;
    let old = registry.snapshot();
    registry.rescan(second.path())?;
    let new = registry.snapshot();

    assert_eq!(old.names().collect::<Vec<_>>(), vec!["one"]);
    assert_eq!(new.names().collect::<Vec<_>>(), vec!["two"]);
    Ok(())
}
