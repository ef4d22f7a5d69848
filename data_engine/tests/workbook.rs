use std::path::PathBuf;

use calamine::Data;
use data_engine::{run, DataEngine, DataEngineError, PipelineConfig};
use serde::Deserialize;

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/contracts.xlsx")
}

#[derive(Debug, Deserialize, PartialEq)]
struct Bar {
    #[serde(rename = "Time")]
    time: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
}

#[test]
fn loads_headers_and_typed_cells() {
    let sheet = DataEngine::new().fetch_sheet(&fixture(), "Sheet1").unwrap();

    assert_eq!(sheet.headers, vec!["Timestamp", "Sell Premium", "Contract"]);
    assert_eq!(sheet.len(), 4);
    assert_eq!(
        sheet.rows[0],
        vec![
            Data::Float(45_293.25),
            Data::Float(10.0),
            Data::String("NIFTY".into()),
        ]
    );
    assert_eq!(sheet.rows[1][1], Data::Float(12.5));
    assert_eq!(sheet.rows[2][0], Data::String("n/a".into()));
    assert_eq!(sheet.rows[3][2], Data::String("BANKNIFTY".into()));
}

#[test]
fn unknown_sheet_lists_what_is_there() {
    let err = DataEngine::new().fetch_sheet(&fixture(), "Trades").unwrap_err();

    match &err {
        DataEngineError::SheetNotFound { sheet, available } => {
            assert_eq!(sheet, "Trades");
            assert_eq!(available, &vec!["Sheet1".to_string(), "Notes".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.to_string(), "Sheet 'Trades' not found (available: Sheet1, Notes)");
}

#[test]
fn full_run_over_a_workbook() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = PipelineConfig::default()
        .with_input_file(fixture())
        .with_output_dir(dir.path());

    let outputs = run(&cfg).unwrap();

    assert_eq!(outputs.len(), 8);
    let daily = outputs.iter().find(|o| o.label == "1440").unwrap();
    assert_eq!(daily.bars, 1);

    // the "n/a" row is gone, the other three make one Tuesday bar
    let mut reader = csv::Reader::from_path(&daily.path).unwrap();
    let bars: Vec<Bar> = reader.deserialize().collect::<Result<_, _>>().unwrap();
    assert_eq!(
        bars,
        vec![Bar { time: "2024-01-02".into(), open: 10.0, high: 12.5, low: 9.0, close: 9.0 }]
    );

    let hourly = outputs.iter().find(|o| o.label == "60").unwrap();
    let mut reader = csv::Reader::from_path(&hourly.path).unwrap();
    let times: Vec<String> = reader
        .deserialize::<Bar>()
        .map(|b| b.unwrap().time)
        .collect();
    assert_eq!(
        times,
        vec!["2024-01-02 06:00:00", "2024-01-02 12:00:00", "2024-01-02 18:00:00"]
    );
}
