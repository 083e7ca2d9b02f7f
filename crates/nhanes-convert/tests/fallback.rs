//! Strategy precedence and failure aggregation.

mod common;

use std::cell::Cell;
use std::path::Path;
use std::rc::Rc;

use nhanes_convert::{
    ConversionOutcome, ParseStrategy, StrategyChain, StrategyError, StrategyKind, convert_file,
};
use nhanes_model::{Column, ColumnMetadata, DatasetMetadata, Table, Value};
use proptest::prelude::*;

/// A strategy with a fixed answer that counts its calls.
struct Fake {
    name: String,
    succeeds: bool,
    calls: Rc<Cell<usize>>,
}

impl Fake {
    fn new(name: &str, succeeds: bool) -> (Self, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        let fake = Self {
            name: name.to_string(),
            succeeds,
            calls: Rc::clone(&calls),
        };
        (fake, calls)
    }
}

impl ParseStrategy for Fake {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Transport
    }

    fn parse(&self, _path: &Path) -> Result<Table, StrategyError> {
        self.calls.set(self.calls.get() + 1);
        if !self.succeeds {
            return Err(StrategyError::new(&self.name, format!("{} rejected it", self.name)));
        }
        let column = Column::new(
            ColumnMetadata::character("PARSER"),
            vec![Value::Text(self.name.clone())],
        );
        Ok(Table::new(vec![column], DatasetMetadata::default()).unwrap())
    }
}

fn chain(outcomes: &[bool]) -> (StrategyChain, Vec<Rc<Cell<usize>>>) {
    let mut strategies: Vec<Box<dyn ParseStrategy>> = Vec::new();
    let mut counters = Vec::new();
    for (i, &succeeds) in outcomes.iter().enumerate() {
        let (fake, calls) = Fake::new(&format!("s{}", i + 1), succeeds);
        strategies.push(Box::new(fake));
        counters.push(calls);
    }
    (StrategyChain::new(strategies), counters)
}

#[test]
fn test_first_success_wins() {
    let (chain, calls) = chain(&[true, true, true]);
    let success = chain.parse(Path::new("DEMO_J.xpt")).unwrap();
    assert_eq!(success.strategy, "s1");
    assert!(success.earlier_failures.is_empty());
    assert_eq!(calls.iter().map(|c| c.get()).collect::<Vec<_>>(), [1, 0, 0]);
}

#[test]
fn test_falls_through_to_last() {
    let (chain, calls) = chain(&[false, false, true]);
    let success = chain.parse(Path::new("DEMO_J.xpt")).unwrap();
    assert_eq!(success.strategy, "s3");
    assert_eq!(success.table.columns()[0].values, [Value::Text("s3".into())]);
    let failed: Vec<_> = success
        .earlier_failures
        .iter()
        .map(|f| f.strategy.as_str())
        .collect();
    assert_eq!(failed, ["s1", "s2"]);
    assert_eq!(calls.iter().map(|c| c.get()).collect::<Vec<_>>(), [1, 1, 1]);
}

#[test]
fn test_total_failure_keeps_attempt_order() {
    let (chain, _) = chain(&[false, false, false]);
    let failure = chain.parse(Path::new("DEMO_J.xpt")).unwrap_err();
    assert_eq!(
        failure.to_string(),
        "all strategies failed: s1(s1 rejected it), s2(s2 rejected it), s3(s3 rejected it)"
    );
}

proptest! {
    #[test]
    fn prop_winner_is_first_success(outcomes in proptest::collection::vec(any::<bool>(), 1..6)) {
        let (chain, calls) = chain(&outcomes);
        let result = chain.parse(Path::new("P_DEMO.xpt"));
        match outcomes.iter().position(|&ok| ok) {
            Some(winner) => {
                let success = result.unwrap();
                prop_assert_eq!(success.strategy, format!("s{}", winner + 1));
                prop_assert_eq!(success.earlier_failures.len(), winner);
                for (i, calls) in calls.iter().enumerate() {
                    prop_assert_eq!(calls.get(), usize::from(i <= winner));
                }
            }
            None => {
                prop_assert_eq!(result.unwrap_err().failures.len(), outcomes.len());
                prop_assert!(calls.iter().all(|c| c.get() == 1));
            }
        }
    }
}

fn convert_standard(path: &Path, output: &Path) -> ConversionOutcome {
    convert_file(path, output, &StrategyChain::standard()).unwrap()
}

#[test]
fn test_valid_transport_uses_transport() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_transport(dir.path(), "DEMO_J.xpt", 4);
    let ConversionOutcome::Converted(converted) = convert_standard(&path, &dir.path().join("csv"))
    else {
        panic!("expected a conversion");
    };
    assert_eq!(converted.strategy, "transport");
    assert!(converted.earlier_failures.is_empty());
    assert_eq!(converted.table.row_count(), 4);
    assert_eq!(converted.csv_path, dir.path().join("csv").join("DEMO_J.csv"));
}

#[test]
fn test_truncated_transport_uses_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_truncated_transport(dir.path(), "BPX_J.xpt", 3);
    let ConversionOutcome::Converted(converted) = convert_standard(&path, &dir.path().join("csv"))
    else {
        panic!("expected a conversion");
    };
    assert_eq!(converted.strategy, "metadata");
    assert_eq!(converted.earlier_failures.len(), 1);
    assert_eq!(converted.earlier_failures[0].strategy, "transport");
    assert_eq!(converted.table.row_count(), 2);
}

#[test]
fn test_sas7bdat_named_xpt_uses_legacy() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_legacy(dir.path(), "BMX_J.xpt", 3);
    let ConversionOutcome::Converted(converted) = convert_standard(&path, &dir.path().join("csv"))
    else {
        panic!("expected a conversion");
    };
    assert_eq!(converted.strategy, "legacy");
    let failed: Vec<_> = converted
        .earlier_failures
        .iter()
        .map(|f| f.strategy.as_str())
        .collect();
    assert_eq!(failed, ["transport", "metadata"]);

    let csv = std::fs::read_to_string(&converted.csv_path).unwrap();
    assert!(csv.starts_with("SEQN,BMXWT,BMDSTATS\n93703,60.5,complete\n"));
}

#[test]
fn test_total_failure_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_html(dir.path(), "P_DEMO.xpt");
    let output = dir.path().join("csv");

    let ConversionOutcome::Failed(failure) = convert_standard(&path, &output) else {
        panic!("expected a failure");
    };
    let strategies: Vec<_> = failure
        .failure
        .failures
        .iter()
        .map(|f| f.strategy.as_str())
        .collect();
    assert_eq!(strategies, ["transport", "metadata", "legacy"]);
    assert_eq!(failure.hint.as_deref(), Some("file looks like an HTML document"));
    assert!(failure.to_string().starts_with("all strategies failed: transport("));
    assert!(common::file_names(&output).is_empty());
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = convert_file(
        &dir.path().join("GONE_J.xpt"),
        dir.path(),
        &StrategyChain::standard(),
    );
    assert!(result.is_err());
}

#[test]
fn test_bad_label_count_falls_back_to_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_bad_label_count(dir.path(), "WHQ_J.xpt");
    let ConversionOutcome::Converted(converted) = convert_standard(&path, &dir.path().join("csv"))
    else {
        panic!("expected a conversion");
    };
    assert_eq!(converted.strategy, "metadata");
    assert_eq!(converted.earlier_failures[0].strategy, "transport");
    assert_eq!(converted.table.row_count(), 1);
}

#[test]
fn test_bad_legacy_row_count_fails_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_legacy(dir.path(), "BMX_J.sas7bdat", 3);
    common::corrupt_legacy_row_count(&path, 1 << 60);
    let output = dir.path().join("csv");

    let ConversionOutcome::Failed(failure) = convert_standard(&path, &output) else {
        panic!("expected a failure");
    };
    let legacy = &failure.failure.failures[2];
    assert_eq!(legacy.strategy, "legacy");
    assert!(legacy.message.contains("rows"), "{}", legacy.message);
    assert!(common::file_names(&output).is_empty());
}
