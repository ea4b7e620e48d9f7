use std::{
    fs,
    path::{Path, PathBuf},
    process::{Command, Output},
};

fn run_bin(args: &[&str]) -> Output {
    let bin = PathBuf::from(env!("CARGO_BIN_EXE_ewmawatch"));

    Command::new(bin)
        .args(args)
        .output()
        .expect("failed to execute command")
}

fn assert_success(output: &Output, args: &[&str]) {
    let stdout_str = String::from_utf8_lossy(&output.stdout);
    let stderr_str = String::from_utf8_lossy(&output.stderr);
    assert!(
        output.status.success(),
        "failed to run binary with {args:?}\nstdout:\n{stdout_str}\nstderr:\n{stderr_str}\n"
    );
}

fn fresh_dir(name: &str) -> PathBuf {
    let test_dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join(name);
    fs::remove_dir_all(&test_dir).ok();
    fs::create_dir(&test_dir).expect("failed to create test directory");
    test_dir
}

fn dir_str(dir: &Path) -> &str {
    dir.to_str().expect("failed to convert test directory to string")
}

#[test]
fn basic_workflow() {
    let test_dir = fresh_dir("basic_workflow");

    let config_contents = String::new()
        + "[input]\n"
        + "files = \"site-*.csv\"\n"
        + "\n"
        + "[ewma]\n"
        + "alpha = 0.3\n"
        + "std_dev_multiplier = 2.0\n"
        + "\n"
        + "[chart]\n"
        + "scale = 2.0\n"
        + "title = \"Plant A\"\n";
    fs::write(test_dir.join("config.toml"), config_contents).expect("failed to write config file");

    fs::write(
        test_dir.join("site-a.csv"),
        "Date,Wastewater_Viral_Load\n2024-02-01,10\n2024-02-02,20\n2024-02-03,15\n",
    )
    .expect("failed to write data file");
    fs::write(
        test_dir.join("site-b.csv"),
        "Date,Wastewater_Viral_Load\n2024-02-01,10\n2024-02-03,15\n",
    )
    .expect("failed to write data file");

    let dir = dir_str(&test_dir);
    for args in [["--mon-dir", dir, "analyze"], ["--mon-dir", dir, "plot"]] {
        assert_success(&run_bin(&args), &args);
    }

    let csv = fs::read_to_string(test_dir.join("results.csv")).expect("failed to read results");
    let rows: Vec<Vec<&str>> = csv.lines().map(|line| line.split(',').collect()).collect();
    assert_eq!(rows[0], ["date", "mean_value", "ewma", "ucl", "lcl"]);
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[1][0], "2024-02-01");
    let ewma: Vec<f64> = rows[1..]
        .iter()
        .map(|row| row[2].parse().expect("failed to parse ewma"))
        .collect();
    for (got, want) in ewma.iter().zip([10.0, 13.0, 13.6]) {
        assert!((got - want).abs() < 1e-9, "{got} != {want}");
    }

    let json = fs::read_to_string(test_dir.join("results.json")).expect("failed to read results");
    let report: serde_json::Value = serde_json::from_str(&json).expect("failed to parse results");
    assert_eq!(report["n_samples"], 5);
    assert_eq!(report["series"]["dates"][2], "2024-02-03");

    let svg = fs::read_to_string(test_dir.join("chart.svg")).expect("failed to read chart");
    assert!(svg.contains(r#"width="2000" height="1600""#));
    assert!(svg.contains("Plant A"));

    let args = ["--mon-dir", dir, "clean"];
    assert_success(&run_bin(&args), &args);
    assert!(!test_dir.join("results.json").exists());
    assert!(!test_dir.join("results.csv").exists());
    assert!(!test_dir.join("chart.svg").exists());
    assert!(test_dir.join("site-a.csv").exists());

    fs::remove_dir_all(&test_dir).ok();
}

#[test]
fn empty_input_fails() {
    let test_dir = fresh_dir("empty_input_fails");

    fs::write(test_dir.join("config.toml"), "").expect("failed to write config file");
    fs::write(test_dir.join("data.csv"), "Date,Wastewater_Viral_Load\n")
        .expect("failed to write data file");

    let output = run_bin(&["--mon-dir", dir_str(&test_dir), "plot"]);
    assert!(!output.status.success());
    let stderr_str = String::from_utf8_lossy(&output.stderr);
    assert!(stderr_str.contains("EmptySeries") || stderr_str.contains("series is empty"));
    assert!(!test_dir.join("chart.svg").exists());

    fs::remove_dir_all(&test_dir).ok();
}

#[test]
fn malformed_row_fails() {
    let test_dir = fresh_dir("malformed_row_fails");

    fs::write(test_dir.join("config.toml"), "").expect("failed to write config file");
    fs::write(
        test_dir.join("data.csv"),
        "Date,Wastewater_Viral_Load\n2024-02-01,10\n2024-02-02,lots\n",
    )
    .expect("failed to write data file");

    let output = run_bin(&["--mon-dir", dir_str(&test_dir), "analyze"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("lots"));
    assert!(!test_dir.join("results.json").exists());

    fs::remove_dir_all(&test_dir).ok();
}
