//! Write-then-read tests for V5 and V8 layouts.

use std::io::Cursor;

use nhanes_xpt::{
    MissingValue, XptColumn, XptDataset, XptReader, XptValue, XptVersion, XptWriter,
    XptWriterOptions, read_xpt, write_xpt,
};

fn roundtrip(dataset: &XptDataset, version: XptVersion) -> XptDataset {
    let mut buffer = Vec::new();
    let options = XptWriterOptions::default().with_version(version);
    XptWriter::with_options(Cursor::new(&mut buffer), options)
        .write_dataset(dataset)
        .unwrap();
    assert_eq!(buffer.len() % 80, 0);

    XptReader::new(Cursor::new(&buffer)).read_dataset().unwrap()
}

fn demographics() -> XptDataset {
    let mut dataset = XptDataset::with_columns(
        "DEMO_J",
        vec![
            XptColumn::numeric("SEQN").with_label("Respondent sequence number"),
            XptColumn::character("RIAGENDR", 6).with_label("Gender"),
            XptColumn::numeric("RIDAGEYR").with_label("Age in years at screening"),
            XptColumn::numeric("INDFMPIR").with_label("Ratio of family income to poverty"),
        ],
    )
    .with_label("Demographic Variables and Sample Weights");

    dataset.add_row(vec![
        XptValue::numeric(93703.0),
        XptValue::character("Female"),
        XptValue::numeric(2.0),
        XptValue::numeric(5.0),
    ]);
    dataset.add_row(vec![
        XptValue::numeric(93704.0),
        XptValue::character("Male"),
        XptValue::numeric(2.0),
        XptValue::numeric_missing(),
    ]);
    dataset.add_row(vec![
        XptValue::numeric(93705.0),
        XptValue::character(""),
        XptValue::numeric(66.0),
        XptValue::numeric(0.82),
    ]);
    dataset
}

#[test]
fn test_v5_roundtrip() {
    let read_back = roundtrip(&demographics(), XptVersion::V5);

    assert_eq!(read_back.name, "DEMO_J");
    assert_eq!(read_back.version, XptVersion::V5);
    assert_eq!(
        read_back.label.as_deref(),
        Some("Demographic Variables and Sample Weights")
    );
    assert_eq!(read_back.num_columns(), 4);
    assert_eq!(read_back.num_rows(), 3);
    assert_eq!(read_back.encoding, None);

    assert_eq!(read_back.columns[1].name, "RIAGENDR");
    assert_eq!(read_back.columns[1].label.as_deref(), Some("Gender"));

    assert_eq!(read_back.rows[0][0].as_f64(), Some(93703.0));
    assert_eq!(read_back.rows[1][1].as_str(), Some("Male"));
    assert!(read_back.rows[1][3].is_missing());
    assert!(read_back.rows[2][1].is_missing());

    let pir = read_back.rows[2][3].as_f64().unwrap();
    assert!((pir - 0.82).abs() < 1e-12);
}

#[test]
fn test_v8_long_names_and_labels() {
    let label = "Full sample 2 year mobile examination center exam weight";
    let mut dataset = XptDataset::with_columns(
        "EXAMINATION_WEIGHTS",
        vec![
            XptColumn::numeric("SEQN"),
            XptColumn::numeric("WTMEC2YR_ADJUSTED").with_label(label),
        ],
    );
    dataset.add_row(vec![XptValue::numeric(1.0), XptValue::numeric(12345.678)]);

    let read_back = roundtrip(&dataset, XptVersion::V8);

    assert_eq!(read_back.version, XptVersion::V8);
    assert_eq!(read_back.name, "EXAMINATION_WEIGHTS");
    assert_eq!(read_back.columns[1].name, "WTMEC2YR_ADJUSTED");
    assert_eq!(read_back.columns[1].label.as_deref(), Some(label));
    assert_eq!(read_back.rows[0][1].as_f64(), Some(12345.678));
}

#[test]
fn test_special_missing_codes_survive() {
    let mut dataset = XptDataset::with_columns("BPQ", vec![XptColumn::numeric("BPQ020")]);
    dataset.add_row(vec![XptValue::numeric_missing_with(MissingValue::Special('R'))]);
    dataset.add_row(vec![XptValue::numeric_missing_with(MissingValue::Underscore)]);

    let read_back = roundtrip(&dataset, XptVersion::V5);
    let codes: Vec<_> = read_back
        .column_values(0)
        .map(|v| match v {
            XptValue::Num(n) => n.missing_type(),
            XptValue::Char(_) => None,
        })
        .collect();
    assert_eq!(
        codes,
        vec![Some(MissingValue::Special('R')), Some(MissingValue::Underscore)]
    );
}

#[test]
fn test_zero_rows() {
    let dataset = XptDataset::with_columns(
        "EMPTY",
        vec![XptColumn::numeric("SEQN"), XptColumn::character("FLAG", 1)],
    );
    let read_back = roundtrip(&dataset, XptVersion::V5);
    assert_eq!(read_back.num_columns(), 2);
    assert_eq!(read_back.num_rows(), 0);
}

#[test]
fn test_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("demo_j.xpt");
    write_xpt(&path, &demographics()).unwrap();

    let read_back = read_xpt(&path).unwrap();
    assert_eq!(read_back.num_rows(), 3);

    let missing = read_xpt(&dir.path().join("absent.xpt"));
    assert!(matches!(missing, Err(nhanes_xpt::XptError::FileNotFound { .. })));
}
