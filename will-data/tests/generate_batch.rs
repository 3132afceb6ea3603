//! Batch intake end to end: CSV in, documents and submission log out.

use std::fs;

use pretty_assertions::assert_eq;
use will_data::app::{build_service, run_batch};
use will_data::{IntakeLoader, WillConfig};

const HEADER: &str = "name,email,phone,gender,dob,street_number,street_name,city,regional_municipality,province,postal_code,exec1_name,exec1_relation,exec1_dob,beneficiary_1_name,beneficiary_1_relation,beneficiary_1_dob,beneficiary_1_share,terms_agreement,mirror_will";

const SPOUSE_ROW: &str = "Jane Doe,jane@example.com,416-555-0100,Female,1980-05-01,1,Main St,Springfield,Metro,ON,A1A 1A1,John Doe,Husband,1978-03-02,Kid Doe,Son,2010-02-01,100,true,true";

const BAD_SHARE_ROW: &str = "Ann Roe,ann@example.com,4165550101,Female,1975-01-01,2,Oak Ave,Ajax,Durham,ON,L1S2J5,Bob Roe,Brother,1970-01-01,Sam Roe,Son,2000-01-01,60,true,";

fn config(dir: &std::path::Path) -> WillConfig {
    let mut config = WillConfig::default();
    config.storage.documents_dir = dir.join("wills");
    config.storage.submission_log = dir.join("submissions.csv");
    config
}

#[tokio::test]
async fn spouse_row_produces_main_and_mirror() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let service = build_service(&config).await.unwrap();
    let csv = format!("{HEADER}\n{SPOUSE_ROW}\n");
    let records = IntakeLoader::parse(csv.as_bytes()).unwrap();

    let summary = run_batch(&service, &records, false).await;

    assert_eq!(summary.generated, 1);
    assert_eq!(summary.mirrors, 1);
    assert!(summary.failed.is_empty());

    let mut names: Vec<String> = fs::read_dir(&config.storage.documents_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names.len(), 2);
    assert!(names[0].starts_with("Mirror_Will_JOHN DOE_"), "{names:?}");
    assert!(names[1].starts_with("Will_JANE DOE_"), "{names:?}");

    let mirror = fs::read_to_string(config.storage.documents_dir.join(&names[0])).unwrap();
    assert!(mirror.starts_with("MIRROR LAST WILL AND TESTAMENT\nOF JOHN DOE"), "{mirror}");

    let log = fs::read_to_string(&config.storage.submission_log).unwrap();
    assert_eq!(log.lines().count(), 3);
}

#[tokio::test]
async fn failed_row_is_reported_and_batch_continues() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let service = build_service(&config).await.unwrap();
    let csv = format!("{HEADER}\n{BAD_SHARE_ROW}\n{SPOUSE_ROW}\n");
    let records = IntakeLoader::parse(csv.as_bytes()).unwrap();

    let summary = run_batch(&service, &records, true).await;

    assert_eq!(summary.generated, 1);
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].0, 1);
    assert!(summary.failed[0].1.contains("100%"), "{}", summary.failed[0].1);
}

#[tokio::test]
async fn batch_stops_at_first_failure_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let service = build_service(&config).await.unwrap();
    let csv = format!("{HEADER}\n{BAD_SHARE_ROW}\n{SPOUSE_ROW}\n");
    let records = IntakeLoader::parse(csv.as_bytes()).unwrap();

    let summary = run_batch(&service, &records, false).await;

    assert_eq!(summary.generated, 0);
    assert_eq!(summary.failed.len(), 1);
    assert!(!config.storage.submission_log.exists());
}

#[tokio::test]
async fn sqlite_backend_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config(dir.path());
    config.sessions.backend = "sqlite".to_string();
    config.sessions.connection_string = dir.path().join("sessions.db").display().to_string();
    let service = build_service(&config).await.unwrap();
    let csv = format!("{HEADER}\n{SPOUSE_ROW}\n");
    let records = IntakeLoader::parse(csv.as_bytes()).unwrap();

    let summary = run_batch(&service, &records, false).await;

    assert_eq!(summary.generated, 1);
}
