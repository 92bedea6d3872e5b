#![cfg(unix)]

use std::path::Path;
use std::time::Duration;

use netlistsvg::{Netlistsvg, RenderError, RenderOutcome, SchematicRenderer};

/// Runs the renderer as `sh <netlist> --skin <skin> -o <out>`, so the
/// "netlist" file is the script and `$4` is the output path.
fn render_with_script(dir: &Path, script: &str) -> Result<RenderOutcome, RenderError> {
    let netlist = dir.join("render.sh");
    std::fs::write(&netlist, script).unwrap();
    Netlistsvg::new("sh")
        .with_settle_timeout(Duration::from_millis(200))
        .render(&netlist, &dir.join("skin.svg"), &dir.join("out.svg"))
}

#[test]
fn successful_render_waits_for_output() {
    let dir = tempfile::tempdir().unwrap();
    let outcome = render_with_script(dir.path(), "printf '<svg/>' > \"$4\"\n").unwrap();

    assert_eq!(outcome, RenderOutcome::Rendered(dir.path().join("out.svg")));
    assert_eq!(
        std::fs::read_to_string(dir.path().join("out.svg")).unwrap(),
        "<svg/>"
    );
}

#[test]
fn failure_is_reported_with_truncated_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let script = "head -c 1000 /dev/zero | tr '\\0' x >&2\nexit 3\n";
    let outcome = render_with_script(dir.path(), script).unwrap();

    match outcome {
        RenderOutcome::Failed { status, diagnostic } => {
            assert_eq!(status, Some(3));
            assert_eq!(diagnostic, "x".repeat(400));
        }
        other => panic!("expected failure, got {:?}", other),
    }
}

#[test]
fn zero_exit_without_output_times_out() {
    let dir = tempfile::tempdir().unwrap();
    let result = render_with_script(dir.path(), "exit 0\n");
    assert!(matches!(result, Err(RenderError::Timeout(..))));
}

#[test]
fn missing_program_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = Netlistsvg::new("schemgen-no-such-renderer").render(
        &dir.path().join("a.json"),
        &dir.path().join("skin.svg"),
        &dir.path().join("out.svg"),
    );
    assert!(matches!(result, Err(RenderError::LaunchError { .. })));
}

#[test]
fn stale_output_is_not_taken_for_a_new_render() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("out.svg"), "<svg>old</svg>").unwrap();

    let result = render_with_script(dir.path(), "exit 0\n");
    assert!(matches!(result, Err(RenderError::Timeout(..))));
}
