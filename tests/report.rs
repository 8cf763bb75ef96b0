mod common;

use std::path::Path;

use shcov::cli::{cmd_report, CoverageOptions, OutputFormat};
use shcov::lines::scan_scripts;
use shcov::report::{format_line_ranges, CoverageReport, TextFormatter};
use shcov::trace::{PathFilter, TraceParser};

fn fixture_dir() -> String {
    format!("{}/tests/fixtures/trace/", env!("CARGO_MANIFEST_DIR"))
}

fn sample_filter() -> PathFilter {
    PathFilter {
        only: vec!["sample".into()],
        ignore: vec![],
        rewrites: vec![format!("./:{}", fixture_dir()).parse().unwrap()],
    }
}

#[test]
fn sample_trace_report() {
    let trace = include_str!("fixtures/trace/sample_trace.txt");
    let executed = TraceParser::new(sample_filter()).parse(trace);
    let coverable = scan_scripts(executed.keys().map(String::as_str));
    let report = CoverageReport::build(&coverable, &executed);

    assert_eq!(report.rows.len(), 1);
    let row = &report.rows[0];
    assert_eq!(row.needed, 20);
    assert_eq!(row.missed, vec![11, 22, 23, 31]);
    assert_eq!(row.percent(), Some(80));
    assert_eq!(row.missing(), "11, 22-23, 31");
    // `echo "$msg" \` continued by `| tr`: bash reports both lines.
    assert_eq!(row.unrecognized, vec![43]);

    let text = report.format(&TextFormatter).unwrap();
    assert!(text.contains("**** lines reached that are not understood: 43\n"));
}

#[test]
fn cmd_report_on_fixture() {
    let result = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/trace/sample_trace.txt");
    let options = CoverageOptions {
        filter: sample_filter(),
        format: OutputFormat::Json,
        ..Default::default()
    };

    let out = cmd_report(&[result], &options).unwrap();
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();

    assert_eq!(
        value["scripts"][0]["name"],
        format!("{}sample.sh", fixture_dir())
    );
    assert_eq!(value["scripts"][0]["percent"], 80);
    assert_eq!(value["scripts"][0]["unrecognized"], serde_json::json!([43]));
}

#[test]
fn unreadable_trace_script_is_skipped() {
    // The rewritten script path does not exist and the sourcing shell's
    // empty path is unreadable: both rows are skipped.
    let (_dir, root) = common::setup_dir(&[]);
    let result = root.join("trace.txt");
    common::write_file(&result, include_str!("fixtures/trace/sample_trace.txt"));

    let options = CoverageOptions {
        filter: PathFilter {
            rewrites: vec!["./:/nonexistent/shcov/".parse().unwrap()],
            ..Default::default()
        },
        ..Default::default()
    };
    let out = cmd_report(&[result], &options).unwrap();
    assert_eq!(out, "---- coverage ----\nName  Stmts  Miss  Cover  Missing\n");
}

#[test]
fn scripts_option_adds_untraced_rows() {
    let (_dir, root) = common::setup_dir(&[
        ("bin/used.sh", "echo a\necho b\n"),
        ("bin/unused.sh", "# nothing\nexit 0\n"),
    ]);
    let used = root.join("bin/used.sh");
    let unused = root.join("bin/unused.sh");
    let result = root.join("out.txt");
    common::write_file(&result, &common::trace_line(&used, 1, "echo a"));

    let options = CoverageOptions {
        scripts: vec![unused.clone()],
        ..Default::default()
    };
    let out = cmd_report(&[result], &options).unwrap();

    let unused_row = out
        .lines()
        .find(|l| l.starts_with(&unused.display().to_string()))
        .unwrap();
    assert!(unused_row.contains("0%"));
    let used_row = out
        .lines()
        .find(|l| l.starts_with(&used.display().to_string()))
        .unwrap();
    assert!(used_row.contains("50%"));
    assert!(used_row.ends_with('2'));
}

#[test]
fn range_string_examples() {
    assert_eq!(format_line_ranges(&[1, 2, 3, 7, 9, 10, 11]), "1-3, 7, 9-11");
    assert_eq!(format_line_ranges(&[4, 5]), "4-5");
    assert_eq!(format_line_ranges(&[]), "");
}
