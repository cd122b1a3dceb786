use assert_cmd::cargo::cargo_bin_cmd;
use ibis_lib::{artifacts::ArtifactSet, io::text as text_io};
use serde::Deserialize;
use std::{collections::BTreeMap, error::Error};
use tempfile::tempdir;

#[derive(Deserialize)]
struct CorrectionReport {
    input_peaks: usize,
    output_peaks: usize,
    passes: usize,
    converged: bool,
    artifacts: BTreeMap<String, usize>,
}

fn regular_peaks() -> Vec<usize> {
    (1..=300).map(|k| k * 750).collect()
}

#[test]
fn simulated_misalignment_is_corrected() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let raw = dir.path().join("raw.txt");
    let corrected = dir.path().join("corrected.txt");

    cargo_bin_cmd!("ibis")
        .args(["simulate", "--beats", "1000", "--seed", "42", "--fs", "1000"])
        .args(["--misalign-every", "100", "--output"])
        .arg(&raw)
        .assert()
        .success();
    let input = text_io::read_peaks(&raw, 1000.0)?;
    assert_eq!(input.len(), 1000);

    let output = cargo_bin_cmd!("ibis")
        .args(["correct", "--fs", "1000", "--peaks"])
        .arg(&raw)
        .arg("--output")
        .arg(&corrected)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let report: CorrectionReport = serde_json::from_slice(&output)?;
    assert_eq!(report.input_peaks, 1000);
    assert!(report.converged);
    assert!(report.passes >= 1);
    assert!(report.artifacts.values().sum::<usize>() > 0);
    assert_eq!(
        report.artifacts.keys().collect::<Vec<_>>(),
        ["ectopic", "extra", "longshort", "missed"]
    );

    let peaks = text_io::read_peaks(&corrected, 1000.0)?;
    assert_eq!(peaks.len(), report.output_peaks);
    assert!(peaks.windows(2).all(|w| w[0] < w[1]));
    assert!(peaks[0] >= input[0]);
    assert!(peaks[peaks.len() - 1] <= input[input.len() - 1]);
    Ok(())
}

#[test]
fn clean_peaks_pass_through_untouched() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let raw = dir.path().join("raw.txt");
    let corrected = dir.path().join("corrected.txt");
    text_io::write_peaks(&raw, &regular_peaks(), 1000.0)?;

    let output = cargo_bin_cmd!("ibis")
        .args(["correct", "--single-pass", "--fs", "1000", "--peaks"])
        .arg(&raw)
        .arg("--output")
        .arg(&corrected)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let report: CorrectionReport = serde_json::from_slice(&output)?;
    assert_eq!(report.input_peaks, report.output_peaks);
    assert_eq!(report.passes, 1);
    assert_eq!(text_io::read_peaks(&corrected, 1000.0)?, regular_peaks());

    let output = cargo_bin_cmd!("ibis")
        .args(["classify", "--fs", "1000", "--peaks"])
        .arg(&raw)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let artifacts: ArtifactSet = serde_json::from_slice(&output)?;
    assert!(artifacts.is_empty());
    Ok(())
}

#[test]
fn too_few_peaks_are_rejected() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let raw = dir.path().join("short.txt");
    text_io::write_peaks(&raw, &[100, 900], 1000.0)?;

    cargo_bin_cmd!("ibis")
        .args(["correct", "--fs", "1000", "--peaks"])
        .arg(&raw)
        .assert()
        .failure();
    Ok(())
}

#[test]
fn config_file_selects_single_pass() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let raw = dir.path().join("raw.txt");
    let config = dir.path().join("ibis.toml");
    cargo_bin_cmd!("ibis")
        .args(["simulate", "--beats", "1000", "--seed", "7", "--misalign-every", "100"])
        .arg("--output")
        .arg(&raw)
        .assert()
        .success();
    std::fs::write(&config, "[correction]\niterative = false\n")?;

    let output = cargo_bin_cmd!("ibis")
        .args(["correct", "--fs", "1000", "--peaks"])
        .arg(&raw)
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let report: CorrectionReport = serde_json::from_slice(&output)?;
    assert_eq!(report.passes, 1);
    Ok(())
}
