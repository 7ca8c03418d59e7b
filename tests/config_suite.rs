use clap::Parser;
use epicycles::config::{Config, RendererMode};
use epicycles::geometry::Point;
use epicycles::points_file::{
    format_points, load_points, parse_points, save_points, PointsFileError,
};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("epicycles_{name}_{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

// ── CLI ────────────────────────────────────────────────────────────────────

#[test]
fn defaults_are_stable() {
    let cfg = Config::try_parse_from(["epicycles"]).expect("parse should succeed");
    assert_eq!(cfg.renderer, RendererMode::HalfBlock);
    assert_eq!(cfg.tick_ms, 9);
    assert_eq!(cfg.tick_period(), Duration::from_millis(9));
    assert_eq!(cfg.time_step, 0.007);
    assert_eq!(cfg.engine_settings().time_step, 0.007);
    assert_eq!(cfg.engine_settings().min_spacing, 9.0);
    assert_eq!(cfg.zoom, None);
    assert!(cfg.points.is_none());
    assert!(!cfg.empty);
    assert!(cfg.sync_updates);
    assert_eq!(cfg.log_level, "info");
}

#[test]
fn renderer_aliases_resolve() {
    for (raw, want) in [
        ("hb", RendererMode::HalfBlock),
        ("half_block", RendererMode::HalfBlock),
        ("dots", RendererMode::Braille),
        ("braille", RendererMode::Braille),
        ("text", RendererMode::Ascii),
    ] {
        let cfg = Config::try_parse_from(["epicycles", "--renderer", raw]).expect(raw);
        assert_eq!(cfg.renderer, want, "{raw}");
    }
}

#[test]
fn overrides_work() {
    let cfg = Config::try_parse_from([
        "epicycles",
        "--tick-ms",
        "16",
        "--time-step",
        "0.01",
        "--zoom",
        "0.5",
        "--save-to",
        "out/points.txt",
        "--sync-updates",
        "false",
    ])
    .expect("parse should succeed");
    assert_eq!(cfg.tick_ms, 16);
    assert_eq!(cfg.time_step, 0.01);
    assert_eq!(cfg.zoom, Some(0.5));
    assert_eq!(cfg.save_to, Some(PathBuf::from("out/points.txt")));
    assert!(!cfg.sync_updates);
}

#[test]
fn invalid_numbers_are_rejected() {
    assert!(Config::try_parse_from(["epicycles", "--tick-ms", "0"]).is_err());
    assert!(Config::try_parse_from(["epicycles", "--time-step=0"]).is_err());
    assert!(Config::try_parse_from(["epicycles", "--zoom", "nan"]).is_err());
    assert!(Config::try_parse_from(["epicycles", "--zoom", "abc"]).is_err());
}

#[test]
fn points_and_empty_conflict() {
    assert!(Config::try_parse_from(["epicycles", "--points", "a.txt", "--empty"]).is_err());
}

#[test]
fn initial_points_come_from_the_right_source() {
    let builtin = Config::try_parse_from(["epicycles"]).unwrap();
    assert_eq!(builtin.initial_points().unwrap().len(), 33);

    let empty = Config::try_parse_from(["epicycles", "--empty"]).unwrap();
    assert!(empty.initial_points().unwrap().is_empty());

    let dir = scratch_dir("initial");
    let path = dir.join("tri.txt");
    std::fs::write(&path, "0 0\n50 0\n25 40\n").unwrap();
    let from_file =
        Config::try_parse_from(["epicycles", "--points", path.to_str().unwrap()]).unwrap();
    assert_eq!(from_file.initial_points().unwrap().len(), 3);

    let missing = Config::try_parse_from(["epicycles", "--points", "/nonexistent/epicycles.txt"])
        .unwrap();
    assert!(matches!(missing.initial_points(), Err(PointsFileError::Io(_))));
}

#[derive(Clone, Default)]
struct SharedLog(Arc<Mutex<Vec<u8>>>);

impl Write for SharedLog {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn rejected_points_file_is_logged_as_warning() {
    let dir = scratch_dir("rejected");
    let path = dir.join("bad.txt");
    std::fs::write(&path, "0 0
not a point
").unwrap();
    let cfg = Config::try_parse_from(["epicycles", "--points", path.to_str().unwrap()]).unwrap();

    let log = SharedLog::default();
    let writer = log.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();
    let result = tracing::subscriber::with_default(subscriber, || cfg.initial_points());

    assert!(matches!(result, Err(PointsFileError::Parse { line: 2, .. })));
    let text = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
    assert!(text.contains("WARN"), "{text}");
    assert!(text.contains("rejected points file"), "{text}");
}

// ── Points files ───────────────────────────────────────────────────────────

#[test]
fn parse_accepts_comments_blank_lines_and_commas() {
    let text = "# header\n\n1 2\n  -3.5,4e1   # trailing\n7\t8\n";
    let pts = parse_points(text).expect("parse should succeed");
    assert_eq!(
        pts,
        vec![Point::new(1.0, 2.0), Point::new(-3.5, 40.0), Point::new(7.0, 8.0)]
    );
}

#[test]
fn parse_reports_the_failing_line() {
    let err = parse_points("1 2\n3\n").expect_err("missing y must fail");
    assert!(matches!(err, PointsFileError::Parse { line: 2, .. }));

    let err = parse_points("1 2\n3 4 5\n").expect_err("extra field must fail");
    assert!(matches!(err, PointsFileError::Parse { line: 2, .. }));

    let err = parse_points("\n\nx 1\n").expect_err("non-number must fail");
    assert!(matches!(err, PointsFileError::Parse { line: 3, .. }));
    assert!(err.to_string().starts_with("parse error at line 3"));

    assert!(parse_points("inf 0\n").is_err());
}

#[test]
fn save_then_load_preserves_points() {
    let dir = scratch_dir("roundtrip");
    let path = dir.join("nested").join("shape.txt");
    let pts = vec![Point::new(0.125, -9.5), Point::new(1e3, 2.0 / 3.0)];
    save_points(&path, &pts).expect("save should succeed");
    assert!(!path.with_extension("tmp").exists());
    assert_eq!(load_points(&path).expect("load should succeed"), pts);
}

#[test]
fn formatted_points_start_with_a_header() {
    let body = format_points(&[Point::new(1.0, 2.0)]);
    assert!(body.starts_with('#'));
    assert!(body.ends_with("1 2\n"));
}
