use std::{
    fs,
    path::Path,
    process::{Command, Output},
};

use ndarray::Array2;
use rand::{rngs::StdRng, Rng, SeedableRng};

fn train_model(dir: &Path, envs: &[(&str, &str)]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_train_model"));
    cmd.current_dir(dir)
        .env_remove("DATASET")
        .env_remove("MODEL_PARAMS")
        .env_remove("LAYOUT")
        .env_remove("RANK_POLICY")
        .env("VARIANT", "legacy");
    for (key, value) in envs {
        cmd.env(key, value);
    }
    cmd.output().unwrap()
}

#[test]
fn missing_dataset_exits_with_error() {
    let dir = tempfile::tempdir().unwrap();

    let output = train_model(dir.path(), &[]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("dataset_all.csv"), "stderr: {stderr}");
    assert!(stderr.contains("not found"), "stderr: {stderr}");
    assert!(!dir.path().join("model_params.txt").exists());
}

#[test]
fn invalid_variant_exits_with_error() {
    let dir = tempfile::tempdir().unwrap();

    let output = train_model(dir.path(), &[("VARIANT", "cubic")]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("configuration"));
}

#[test]
fn successful_run_reports_completion() {
    let dir = tempfile::tempdir().unwrap();
    let mut rng = StdRng::seed_from_u64(7);
    let data = Array2::from_shape_fn((25, 16), |_| rng.random_range(-10.0..10.0));
    let content: String = data
        .rows()
        .into_iter()
        .map(|row| {
            let fields: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            fields.join(",") + "\n"
        })
        .collect();
    fs::write(dir.path().join("samples.csv"), content).unwrap();

    let output = train_model(
        dir.path(),
        &[("DATASET", "samples.csv"), ("MODEL_PARAMS", "out.txt")],
    );

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("training finished: 8 models fit on 25 samples"), "stdout: {stdout}");

    let params = fs::read_to_string(dir.path().join("out.txt")).unwrap();
    assert_eq!(params.lines().count(), 8);
}
