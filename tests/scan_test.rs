// End-to-end scan scenarios: entity tree shape, symbol resolution and
// fault isolation.

use sharpscan::{EntityKind, MetricId, ScanConfig, Scanner};
use std::fs;
use std::path::PathBuf;

const TWO_CLASS_FILE: &str = r#"
namespace Demo
{
    public class A
    {
        public int Field;

        public A() { }

        public void M1(int x)
        {
            if (x > 0 && x < 10) { return; }
        }

        private int M2()
        {
            int i = 0;
            while (i < 3) { i = i + 1; }
            return i;
        }

        public class B
        {
            void Inner() { }
        }
    }
}
"#;

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("sharpscan_{}_{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("temp dir creation failed");
    dir
}

#[test]
fn test_two_class_file_yields_expected_entities() {
    let scanner = Scanner::new(ScanConfig::default()).expect("grammar must build");
    let result = scanner.scan_source("a.cs", TWO_CLASS_FILE).expect("scan failed");
    assert!(result.failures.is_empty(), "{:?}", result.failures);

    let model = &result.model;
    let all = model.descendants(model.root());
    let types: Vec<_> = all
        .iter()
        .filter(|&&id| model.entity(id).kind == EntityKind::Type)
        .collect();
    let members: Vec<_> = all
        .iter()
        .filter(|&&id| model.entity(id).kind == EntityKind::Member)
        .collect();
    assert_eq!(types.len(), 2);
    assert_eq!(members.len(), 4);

    assert!(model.find_by_key("Demo.A").is_some());
    assert!(model.find_by_key("Demo.A.B").is_some());

    assert_eq!(result.project_metric(MetricId::Classes), 2.0);
    assert_eq!(result.project_metric(MetricId::Methods), 4.0);
    assert_eq!(result.project_metric(MetricId::Files), 1.0);
}

#[test]
fn test_bridge_resolves_nested_types_to_the_same_file() {
    let scanner = Scanner::new(ScanConfig::default()).expect("grammar must build");
    let result = scanner.scan_source("Demo/a.cs", TWO_CLASS_FILE).expect("scan failed");

    let outer = result.bridge.lookup("Demo.A").expect("Demo.A not indexed");
    let nested = result.bridge.lookup("Demo.A.B").expect("Demo.A.B not indexed");
    assert_eq!(outer, nested);
    assert_eq!(outer.to_str(), Some("Demo/a.cs"));
}

#[test]
fn test_member_keys_carry_the_start_line() {
    let scanner = Scanner::new(ScanConfig::default()).expect("grammar must build");
    let result = scanner.scan_source("a.cs", TWO_CLASS_FILE).expect("scan failed");
    let model = &result.model;
    let member_keys: Vec<&str> = model
        .descendants(model.root())
        .into_iter()
        .filter(|&id| model.entity(id).kind == EntityKind::Member)
        .map(|id| model.entity(id).key.as_str())
        .collect();
    assert!(member_keys.iter().any(|k| k.starts_with("Demo.A#M1:")), "{:?}", member_keys);
    // overload disambiguation relies on the `name:line` suffix
    for key in &member_keys {
        assert!(key.contains('#'), "{:?}", key);
        let line = key.rsplit(':').next().unwrap_or("");
        assert!(line.parse::<u32>().is_ok(), "{:?}", key);
    }
}

#[test]
fn test_directory_scan_isolates_a_broken_file() {
    let dir = temp_dir("isolation");
    fs::write(dir.join("a.cs"), "namespace N { class First { void M() { } } }").unwrap();
    fs::write(dir.join("b.cs"), "class {{{ not parseable").unwrap();
    fs::write(dir.join("c.cs"), "namespace N { class Third { } }").unwrap();
    fs::write(dir.join("ignored.txt"), "not a source file").unwrap();

    let scanner = Scanner::new(ScanConfig::default()).expect("grammar must build");
    let result = scanner.scan_directory(&dir).expect("scan must continue past failures");

    assert_eq!(result.failures.len(), 1);
    assert!(result.failures[0].path.ends_with("b.cs"));
    assert_eq!(result.project_metric(MetricId::Classes), 2.0);
    assert_eq!(result.project_metric(MetricId::Files), 2.0);
    assert!(result.bridge.lookup("N.First").is_some());
    assert!(result.bridge.lookup("N.Third").is_some());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_strict_mode_aborts_on_the_first_failure() {
    let dir = temp_dir("strict");
    fs::write(dir.join("a.cs"), "class Fine { }").unwrap();
    fs::write(dir.join("b.cs"), "class {{{ not parseable").unwrap();

    let config = ScanConfig {
        stop_on_failure: true,
        ..ScanConfig::default()
    };
    let scanner = Scanner::new(config).expect("grammar must build");
    assert!(scanner.scan_directory(&dir).is_err());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_scan_file_reads_from_disk() {
    let dir = temp_dir("single");
    let path = dir.join("program.cs");
    fs::write(&path, "namespace App { public class Program { static void Main() { } } }").unwrap();

    let scanner = Scanner::new(ScanConfig::default()).expect("grammar must build");
    let result = scanner.scan_file(&path).expect("scan failed");
    assert_eq!(result.project_metric(MetricId::Classes), 1.0);
    assert!(result.bridge.lookup("App.Program").is_some());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_using_directives_do_not_disturb_the_scan() {
    let source = r#"
using System;
using System.Collections.Generic;

namespace App
{
    class C
    {
        void M()
        {
            using (reader) { }
        }
    }
}
"#;
    let scanner = Scanner::new(ScanConfig::default()).expect("grammar must build");
    let result = scanner.scan_source("app.cs", source).expect("scan failed");
    assert!(result.failures.is_empty(), "{:?}", result.failures);
    assert_eq!(result.project_metric(MetricId::Classes), 1.0);
}

#[test]
fn test_physical_lines_are_recorded_per_file() {
    let dir = temp_dir("lines");
    fs::write(dir.join("a.cs"), "class A { }\n").unwrap();
    fs::write(dir.join("b.cs"), "class B\n{\n}\n").unwrap();

    let scanner = Scanner::new(ScanConfig::default()).expect("grammar must build");
    let result = scanner.scan_directory(&dir).expect("scan failed");
    assert_eq!(result.project_metric(MetricId::Lines), 4.0);

    let _ = fs::remove_dir_all(&dir);
}
