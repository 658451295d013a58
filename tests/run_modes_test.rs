//! Integration tests for dry run, archiving and graceful shutdown

mod common;

use common::{record, FailingStore, Workspace};
use flate2::read::GzDecoder;
use linkage::core::ledger::MappingLedger;
use tokio::sync::watch;

fn archived_files(ws: &Workspace, pseudonym: &str) -> Vec<String> {
    let archive = ws.options.target.join(format!("{pseudonym}.tar.gz"));
    let mut tarball = tar::Archive::new(GzDecoder::new(std::fs::File::open(&archive).unwrap()));
    let mut names: Vec<String> = tarball
        .entries()
        .unwrap()
        .map(|e| e.unwrap().path().unwrap().to_string_lossy().into_owned())
        .filter(|n| n.ends_with(".dcm"))
        .collect();
    names.sort();
    names
}

#[test]
fn test_dry_run_resolves_without_writing() {
    let mut ws = Workspace::new();
    ws.options.dry_run = true;
    ws.add("patient_a", "T1", "0001.dcm", &record("P1", "SMITH^JOHN", "A1", "20200101"));
    ws.add("patient_b", "T1", "0001.dcm", &record("P2", "DOE^JANE", "B1", "20200202"));

    let summary = ws.pipeline().execute().unwrap();

    assert!(summary.is_successful());
    assert!(summary.dry_run);
    assert_eq!(summary.files_processed, 2);
    assert_eq!(summary.new_encounters, 2);
    assert_eq!(summary.files_written, 0);
    assert!(!ws.options.target.exists());
    assert!(!ws.options.ledger_path.exists());
}

#[test]
fn test_compress_archives_each_pseudonym() {
    let mut ws = Workspace::new();
    ws.options.compress = true;
    ws.add("patient_a", "T1", "0001.dcm", &record("P1", "SMITH^JOHN", "A1", "20200101"));
    ws.add("patient_a", "T2", "0001.dcm", &record("P1", "SMITH^JOHN", "A2", "20200102"));

    let summary = ws.pipeline().execute().unwrap();

    assert_eq!(summary.archives_created, 2);
    for pseudonym in ["JS0_20200101", "JS0_20200102"] {
        let archive = ws.options.target.join(format!("{pseudonym}.tar.gz"));
        assert!(archive.is_file(), "{pseudonym} not archived");
        assert!(!ws.options.target.join(pseudonym).exists());

        let mut tarball = tar::Archive::new(GzDecoder::new(std::fs::File::open(&archive).unwrap()));
        let names: Vec<String> = tarball
            .entries()
            .unwrap()
            .map(|e| e.unwrap().path().unwrap().to_string_lossy().into_owned())
            .collect();
        assert!(names.iter().any(|n| n.starts_with(pseudonym) && n.ends_with("_0001.dcm")));
    }
    assert!(ws.options.ledger_path.exists());
}

#[test]
fn test_second_folder_with_same_pseudonym_extends_archive() {
    let mut ws = Workspace::new();
    ws.options.compress = true;
    ws.add("patient_a", "T1", "0001.dcm", &record("P1", "SMITH^JOHN", "A1", "20200101"));
    ws.add("patient_a_part2", "T2", "0001.dcm", &record("P1", "SMITH^JOHN", "A1", "20200101"));

    let summary = ws.pipeline().execute().unwrap();

    assert!(summary.is_successful());
    assert_eq!(summary.files_written, 2);
    assert_eq!(
        archived_files(&ws, "JS0_20200101"),
        vec!["JS0_20200101/T1_0001.dcm", "JS0_20200101/T2_0001.dcm"]
    );
    assert!(!ws.options.target.join("JS0_20200101").exists());
}

#[test]
fn test_compressed_run_resumes_after_failed_patient() {
    let mut ws = Workspace::new();
    ws.options.compress = true;
    ws.add("patient_a", "T1", "0001.dcm", &record("P1", "SMITH^JOHN", "A1", "20200101"));
    ws.add("patient_b", "T1", "0001.dcm", &record("P2", "DOE^JANE", "B1", "20200202"));
    ws.add("patient_b", "T2", "0001.dcm", &record("P2", "DOE^JANE", "B1", "20200202"));

    // patient_b's T1 output is written before its T2 read fails
    let interrupted = ws.pipeline_with(FailingStore::new("T2")).execute().unwrap();
    assert_eq!(interrupted.patients_completed, 1);
    assert_eq!(interrupted.failure.as_ref().unwrap().patient_folder, "patient_b");
    assert_eq!(archived_files(&ws, "JS0_20200101"), vec!["JS0_20200101/T1_0001.dcm"]);
    assert!(ws.output("JD1_20200202", "T1_0001.dcm").exists());

    let resumed = ws.pipeline().execute().unwrap();

    assert!(resumed.is_successful());
    assert_eq!(resumed.new_encounters, 1);
    assert_eq!(ws.ledger().encounter_count(), 2);
    assert_eq!(archived_files(&ws, "JS0_20200101"), vec!["JS0_20200101/T1_0001.dcm"]);
    assert_eq!(
        archived_files(&ws, "JD1_20200202"),
        vec!["JD1_20200202/T1_0001.dcm", "JD1_20200202/T2_0001.dcm"]
    );
    assert!(!ws.options.target.join("JS0_20200101").exists());
    assert!(!ws.options.target.join("JD1_20200202").exists());
}

#[test]
fn test_raised_signal_stops_then_lowered_signal_resumes() {
    let ws = Workspace::new();
    ws.add("patient_a", "T1", "0001.dcm", &record("P1", "SMITH^JOHN", "A1", "20200101"));
    ws.add("patient_b", "T1", "0001.dcm", &record("P2", "DOE^JANE", "B1", "20200202"));

    let (tx, rx) = watch::channel(false);
    let mut ledger = MappingLedger::new();
    let pipeline = ws.pipeline().with_shutdown_signal(rx);

    // a run whose signal is already raised touches nothing
    tx.send(true).unwrap();
    let stopped = pipeline.run(&mut ledger).unwrap();
    assert!(stopped.interrupted);
    assert_eq!(stopped.patients_completed, 0);
    assert!(ledger.is_empty());

    tx.send(false).unwrap();
    let resumed = pipeline.run(&mut ledger).unwrap();
    assert!(resumed.is_successful());
    assert_eq!(resumed.patients_completed, 2);
    assert_eq!(ws.ledger().len(), 2);
}

#[tokio::test]
async fn test_pipeline_runs_on_blocking_pool() {
    let ws = Workspace::new();
    ws.add("patient_a", "T1", "0001.dcm", &record("P1", "SMITH^JOHN", "A1", "20200101"));
    let (_tx, rx) = watch::channel(false);
    let pipeline = ws.pipeline().with_shutdown_signal(rx);

    let summary = tokio::task::spawn_blocking(move || pipeline.execute())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(summary.exit_code(), 0);
    assert_eq!(summary.files_written, 1);
}
