use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Path of a fixture under test/
fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("test").join(name)
}

/// Helper function to run likeplot with arguments and optional stdin input
fn run_likeplot(args: &[&str], stdin: Option<&str>, cwd: &Path) -> Result<Vec<u8>, String> {
    let mut child = Command::new(env!("CARGO_BIN_EXE_likeplot"))
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| format!("Failed to spawn process: {}", e))?;

    if let Some(mut handle) = child.stdin.take() {
        if let Some(input) = stdin {
            handle
                .write_all(input.as_bytes())
                .map_err(|e| format!("Failed to write to stdin: {}", e))?;
        }
    }

    let output = child
        .wait_with_output()
        .map_err(|e| format!("Failed to wait for process: {}", e))?;

    if output.status.success() {
        Ok(output.stdout)
    } else {
        assert_eq!(output.status.code(), Some(1), "unexpected exit status");
        Err(String::from_utf8_lossy(&output.stderr).to_string())
    }
}

/// Run from a scratch directory so no stray likeplot.toml is picked up
fn run_in_scratch(args: &[&str], stdin: Option<&str>) -> Result<Vec<u8>, String> {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    run_likeplot(args, stdin, dir.path())
}

fn fixture_arg(name: &str) -> String {
    fixture(name).to_string_lossy().to_string()
}

/// Check if bytes are a valid PNG
fn is_valid_png(bytes: &[u8]) -> bool {
    bytes.len() > 8 && bytes[0..8] == [137, 80, 78, 71, 13, 10, 26, 10]
}

fn is_svg(bytes: &[u8]) -> bool {
    let text = String::from_utf8_lossy(bytes);
    text.starts_with("<svg") && text.trim_end().ends_with("</svg>")
}

#[test]
fn test_end_to_end_boxplot_svg_from_stdin() {
    let csv = fs::read_to_string(fixture("social_media.csv")).expect("Failed to read test CSV");
    let result = run_in_scratch(&["boxplot"], Some(&csv));
    assert!(result.is_ok(), "Failed: {:?}", result.err());
    let svg = result.unwrap();
    assert!(is_svg(&svg), "Output is not an SVG document");
    let text = String::from_utf8_lossy(&svg);
    for label in ["Facebook", "Instagram", "Twitter", "LinkedIn", "Number of Likes"] {
        assert!(text.contains(label), "missing label {}", label);
    }
}

#[test]
fn test_end_to_end_bar_chart_svg() {
    let input = fixture_arg("social_media.csv");
    let result = run_in_scratch(&["bar", "-i", &input], None);
    assert!(result.is_ok(), "Failed: {:?}", result.err());
    let svg = result.unwrap();
    assert!(is_svg(&svg));
    let text = String::from_utf8_lossy(&svg);
    for label in ["Image", "Video", "Link", "Average Number of Likes"] {
        assert!(text.contains(label), "missing label {}", label);
    }
}

#[test]
fn test_end_to_end_line_chart_svg() {
    let input = fixture_arg("social_media.csv");
    let result = run_in_scratch(&["line", "--input", &input], None);
    assert!(result.is_ok(), "Failed: {:?}", result.err());
    let svg = result.unwrap();
    assert!(is_svg(&svg));
    assert!(String::from_utf8_lossy(&svg).contains("Date"));
}

#[test]
fn test_end_to_end_png_formats() {
    let input = fixture_arg("social_media.csv");
    for chart in ["boxplot", "bar", "line"] {
        let result = run_in_scratch(&[chart, "-i", &input, "-f", "png"], None);
        assert!(result.is_ok(), "{} failed: {:?}", chart, result.err());
        assert!(is_valid_png(&result.unwrap()), "{} output is not a valid PNG", chart);
    }
}

#[test]
fn test_end_to_end_output_file_format_from_extension() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("chart.png");
    let input = fixture_arg("social_media.csv");
    let out_arg = out.to_string_lossy().to_string();

    let stdout = run_likeplot(&["bar", "-i", &input, "-o", &out_arg], None, dir.path()).unwrap();
    assert!(stdout.is_empty());
    assert!(is_valid_png(&fs::read(&out).unwrap()));
}

#[test]
fn test_end_to_end_json_input() {
    let input = fixture_arg("social_media.json");
    let result = run_in_scratch(&["boxplot", "-i", &input], None);
    assert!(result.is_ok(), "Failed: {:?}", result.err());
    assert!(is_svg(&result.unwrap()));
}

#[test]
fn test_end_to_end_canvas_size_override() {
    let input = fixture_arg("social_media.csv");
    let svg = run_in_scratch(&["line", "-i", &input, "--width", "800", "--height", "500"], None).unwrap();
    let text = String::from_utf8_lossy(&svg);
    assert!(text.contains("width=\"800\""));
    assert!(text.contains("height=\"500\""));
}

#[test]
fn test_end_to_end_summary_json() {
    let input = fixture_arg("social_media.csv");
    let out = run_in_scratch(&["summary", "-i", &input], None).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&out).expect("summary is not JSON");

    let quartiles = value["quartiles_by_platform"].as_array().unwrap();
    assert_eq!(quartiles.len(), 4);
    assert_eq!(quartiles[0]["Platform"], "Facebook");
    // Facebook likes: 56 118 190 241 305
    assert_eq!(quartiles[0]["Median"], 190.0);
    assert_eq!(quartiles[0]["Q1"], 118.0);
    assert_eq!(quartiles[0]["Max"], 305.0);

    let dates = value["date_averages"].as_array().unwrap();
    assert_eq!(dates.len(), 5);
    assert_eq!(dates[0]["Date"], "2024-03-01");

    let averages = value["platform_post_type_averages"].as_array().unwrap();
    assert_eq!(averages[0]["Platform"], "Facebook");
    assert_eq!(averages[0]["PostType"], "Image");
    assert_eq!(averages[0]["AvgLikes"], 154.0);
}

#[test]
fn test_end_to_end_config_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("likeplot.toml"),
        "[canvas]\nformat = \"png\"\n\n[boxplot]\nfill = \"steelblue\"\n",
    )
    .unwrap();
    let input = fixture_arg("social_media.csv");
    let out = run_likeplot(&["boxplot", "-i", &input], None, dir.path()).unwrap();
    assert!(is_valid_png(&out));
}

#[test]
fn test_end_to_end_init_config() {
    let dir = tempfile::tempdir().unwrap();
    run_likeplot(&["init-config"], None, dir.path()).unwrap();
    let written = fs::read_to_string(dir.path().join("likeplot.toml")).unwrap();
    assert!(written.contains("[canvas]"));
    assert!(written.contains("[barplot]"));

    // Second run must not overwrite
    let err = run_likeplot(&["init-config"], None, dir.path()).unwrap_err();
    assert!(err.contains("already exists"));
}

#[test]
fn test_end_to_end_invalid_likes() {
    let input = fixture_arg("bad_likes.csv");
    let err = run_in_scratch(&["bar", "-i", &input], None).unwrap_err();
    assert!(err.contains("'lots'"), "unexpected error: {}", err);
    assert!(err.contains("Likes"));
    assert!(err.contains("row 2"));
}

#[test]
fn test_end_to_end_invalid_date() {
    let input = fixture_arg("bad_date.csv");
    let err = run_in_scratch(&["line", "-i", &input], None).unwrap_err();
    assert!(err.contains("2024-03-01"), "unexpected error: {}", err);
    assert!(err.contains("Date"));
}

#[test]
fn test_end_to_end_empty_dataset() {
    let input = fixture_arg("header_only.csv");
    for cmd in ["boxplot", "summary"] {
        let err = run_in_scratch(&[cmd, "-i", &input], None).unwrap_err();
        assert!(err.contains("at least one data row"), "unexpected error: {}", err);
    }
}

#[test]
fn test_end_to_end_missing_column() {
    let input = fixture_arg("missing_column.csv");
    let err = run_in_scratch(&["boxplot", "-i", &input], None).unwrap_err();
    assert!(err.contains("Column 'PostType' not found"), "unexpected error: {}", err);
}

#[test]
fn test_end_to_end_missing_input_file() {
    let err = run_in_scratch(&["bar", "-i", "/nonexistent/posts.csv"], None).unwrap_err();
    assert!(err.contains("Failed to read input file"));
}

#[test]
fn test_end_to_end_oversized_canvas_is_rejected() {
    let input = fixture_arg("social_media.csv");
    let err = run_in_scratch(
        &["boxplot", "-i", &input, "--width", "40000", "--height", "40000", "-f", "png"],
        None,
    )
    .unwrap_err();
    assert!(err.contains("canvas.width"), "unexpected error: {}", err);
}

#[test]
fn test_end_to_end_nan_margin_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("likeplot.toml"), "[margin]\nleft = nan\n").unwrap();
    let input = fixture_arg("social_media.csv");
    let err = run_likeplot(&["bar", "-i", &input], None, dir.path()).unwrap_err();
    assert!(err.contains("margin.left"), "unexpected error: {}", err);
}
