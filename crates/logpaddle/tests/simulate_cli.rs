use std::fs;
use std::process::{Command, Output};

use tempfile::TempDir;

const CONFIG: &str = r#"
version = 1

[display]
width = 400
height = 300
paddle_mode = "vhost"

[paddle]
return_duration = "1s"

[simulation]
tokens = ["alpha.test", "beta.test"]
request_interval = "100ms"
min_travel = "500ms"
max_travel = "1s"
seed = 3
"#;

fn logpaddle(config_dir: &std::path::Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_logpaddle"))
        .env("LOGPADDLE_CONFIG_DIR", config_dir)
        .env("RUST_LOG", "warn")
        .args(args)
        .output()
        .expect("failed to run logpaddle")
}

#[test]
fn simulate_prints_paddle_lines() {
    let root = TempDir::new().unwrap();
    let config_path = root.path().join("scene.toml");
    fs::write(&config_path, CONFIG).unwrap();

    let output = logpaddle(
        root.path(),
        &[
            "simulate",
            "--config",
            config_path.to_str().unwrap(),
            "--frames",
            "120",
            "--dt",
            "0.05",
            "--every",
            "40",
        ],
    );
    assert!(output.status.success(), "{output:?}");

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    // three samples of two paddles, then the summary
    assert_eq!(lines.len(), 7, "{stdout}");
    assert!(lines[0].starts_with("frame=40 token=alpha.test y="));
    assert!(lines[1].starts_with("frame=40 token=beta.test y="));
    assert!(lines[5].starts_with("frame=120 token=beta.test"));
    assert!(lines[6].starts_with("simulated 120 frames: spawned="));
}

#[test]
fn simulate_is_deterministic_for_a_seed() {
    let root = TempDir::new().unwrap();
    let args = [
        "simulate", "--frames", "90", "--every", "30", "--seed", "11", "--mode", "pid",
    ];
    let first = logpaddle(root.path(), &args);
    let second = logpaddle(root.path(), &args);
    assert!(first.status.success(), "{first:?}");
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn default_config_is_read_from_config_dir() {
    let root = TempDir::new().unwrap();
    fs::write(
        root.path().join("logpaddle.toml"),
        "[display]\npaddle_mode = \"none\"\n",
    )
    .unwrap();

    let output = logpaddle(root.path(), &["simulate", "--frames", "10"]);
    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 1, "{stdout}");
    assert!(stdout.starts_with("simulated 10 frames"));
}

#[test]
fn invalid_config_is_rejected() {
    let root = TempDir::new().unwrap();
    let config_path = root.path().join("bad.toml");
    fs::write(&config_path, "[paddle]\nx_fraction = 2.0\n").unwrap();

    let output = logpaddle(
        root.path(),
        &["simulate", "--config", config_path.to_str().unwrap()],
    );
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("x_fraction"), "{stderr}");
}
