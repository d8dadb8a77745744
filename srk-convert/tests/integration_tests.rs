use std::{fs, path::Path, sync::atomic::AtomicBool};

use chrono::NaiveDate;
use srk_convert::{ConvertConfig, ConvertError, ConvertSession};
use srk_core::{ExportFormat, HEADER_SIZE, TABLE_COLUMNS};
use srk_recorder::{create_sensors, RecorderConfig, RecordingSession};
use srk_types::SrkError;
use tempfile::tempdir;

/// Пишет `cycles` циклов симулятором в `dir`, возвращает путь файла.
fn record(
    dir: &Path,
    cycles: u64,
    pressure: bool,
) -> std::path::PathBuf {
    let config = RecorderConfig {
        output_dir: dir.to_path_buf(),
        pressure_enabled: pressure,
        sample_interval_ms: 0,
        stats_interval_secs: 0,
        max_cycles: Some(cycles),
        ..RecorderConfig::default()
    };
    let start = NaiveDate::from_ymd_opt(2016, 7, 4)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();

    let sensors = create_sensors(&config, start).unwrap();
    let (tx, _rx) = crossbeam_channel::bounded(64);
    let (session, path) = RecordingSession::open(&config, sensors, tx).unwrap();
    session.run(&AtomicBool::new(false)).unwrap();
    path
}

#[test]
fn test_integration_record_then_convert() {
    let dir = tempdir().unwrap();
    let input = record(dir.path(), 6, true);
    assert_eq!(input.file_name().unwrap(), "DATA-000.SRK");

    let header_path = dir.path().join("DATA-000.json");
    let report = ConvertSession::new(ConvertConfig {
        input_path: input.clone(),
        header_path: Some(header_path.clone()),
        ..ConvertConfig::default()
    })
    .unwrap()
    .run()
    .unwrap();

    // 6 циклов × 24 строки + 2 LONG (период 3)
    assert_eq!(report.rows, 6 * 24 + 2);
    assert_eq!(report.stats.accel_frames, 6);
    assert_eq!(report.stats.gyro_frames, 6);
    assert_eq!(report.stats.gyro_samples, 6 * 12);
    assert_eq!(report.stats.long_term_frames, 2);
    assert_eq!(
        report.stats.bytes_processed,
        fs::metadata(&input).unwrap().len()
    );

    let text = fs::read_to_string(&report.output_path).unwrap();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines[0], TABLE_COLUMNS.join(","));
    assert_eq!(lines.len(), 1 + 6 * 24 + 2);

    let long_rows: Vec<_> = lines.iter().filter(|l| l.starts_with(",,,,,,")).collect();
    assert_eq!(long_rows.len(), 2);
    for row in long_rows {
        let fields: Vec<_> = row.split(',').collect();
        assert_eq!(fields.len(), TABLE_COLUMNS.len());
        assert!(fields[6].starts_with("2016-07-04T12:00"));
        assert!(!fields[8].is_empty());
    }

    // Гироскоп пишет половину строк цикла
    let first_cycle = &lines[1..25];
    let with_gyro = first_cycle
        .iter()
        .filter(|l| !l.split(',').nth(3).unwrap().is_empty())
        .count();
    assert_eq!(with_gyro, 12);

    let json = fs::read_to_string(&header_path).unwrap();
    let v: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(v["name"], "TAG0");
    assert_eq!(v["accel_write_size"], 24);
    assert_eq!(v["start_time"], "2016-07-04T12:00:00");
}

#[test]
fn test_integration_missing_pressure_leaves_empty_column() {
    let dir = tempdir().unwrap();
    let input = record(dir.path(), 3, false);

    let report = ConvertSession::new(ConvertConfig {
        input_path: input,
        format: ExportFormat::Tsv,
        ..ConvertConfig::default()
    })
    .unwrap()
    .run()
    .unwrap();

    assert_eq!(report.output_path.extension().unwrap(), "tsv");
    let text = fs::read_to_string(&report.output_path).unwrap();
    let last = text.lines().last().unwrap();
    let fields: Vec<_> = last.split('\t').collect();
    assert_eq!(fields.len(), TABLE_COLUMNS.len());
    assert!(!fields[7].is_empty());
    assert!(fields[8].is_empty());
}

#[test]
fn test_integration_header_only_file() {
    let dir = tempdir().unwrap();
    let input = record(dir.path(), 0, true);
    assert_eq!(fs::metadata(&input).unwrap().len(), HEADER_SIZE as u64);

    let report = ConvertSession::new(ConvertConfig {
        input_path: input,
        ..ConvertConfig::default()
    })
    .unwrap()
    .run()
    .unwrap();

    assert_eq!(report.rows, 0);
    let text = fs::read_to_string(&report.output_path).unwrap();
    assert_eq!(text.lines().count(), 1);
}

#[test]
fn test_integration_corrupted_tag_rejects_file() {
    let dir = tempdir().unwrap();
    let input = record(dir.path(), 2, true);

    let mut raw = fs::read(&input).unwrap();
    raw[HEADER_SIZE..HEADER_SIZE + 4].copy_from_slice(b"XXXX");
    fs::write(&input, &raw).unwrap();

    let config = ConvertConfig {
        input_path: input.clone(),
        ..ConvertConfig::default()
    };
    let output = config.resolved_output();
    let err = ConvertSession::new(config).unwrap().run().unwrap_err();

    match &err {
        ConvertError::Rejected { path, source } => {
            assert_eq!(path, &input);
            assert!(matches!(
                source,
                SrkError::MalformedFrame { offset: 44, tag } if tag == b"XXXX"
            ));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.offset(), Some(HEADER_SIZE as u64));
    assert!(!output.exists());
}

#[test]
fn test_integration_short_header_rejected() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("DATA-000.SRK");
    fs::write(&input, [0u8; 20]).unwrap();

    let err = ConvertSession::new(ConvertConfig {
        input_path: input,
        ..ConvertConfig::default()
    })
    .unwrap()
    .run()
    .unwrap_err();

    assert!(matches!(
        err,
        ConvertError::Rejected {
            source: SrkError::HeaderTruncated { .. },
            ..
        }
    ));
}
