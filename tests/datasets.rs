mod mock_api;

use databoard::dashboard::model::ColumnType;
use databoard::dashboard::{DatasetError, DatasetRegistry};
use mock_api::{dataset, people, MockApi};

#[test]
fn y_candidates_are_numeric_columns_only() {
    let api = MockApi::with_datasets(vec![people()]);
    let mut reg = DatasetRegistry::default();
    reg.load_datasets(&api).unwrap();
    reg.select("d1").unwrap();
    assert_eq!(reg.selected_y_candidates(), vec!["age"]);
    assert_eq!(reg.selected_x_candidates(), vec!["city", "age"]);
}

#[test]
fn selecting_unknown_dataset_fails() {
    let api = MockApi::with_datasets(vec![people()]);
    let mut reg = DatasetRegistry::default();
    reg.load_datasets(&api).unwrap();
    assert!(matches!(reg.select("nope"), Err(DatasetError::NotFound(_))));
    assert!(reg.selected().is_none());
}

#[test]
fn detail_fills_in_columns() {
    let listed = dataset("d2", "sales.csv", &[]);
    let mut reg = DatasetRegistry::default();
    let t = reg.begin_load();
    reg.finish_load(t, Ok(vec![listed])).unwrap();
    reg.select("d2").unwrap();
    assert!(reg.selected_y_candidates().is_empty());

    let detail = dataset(
        "d2",
        "sales.csv",
        &[("region", ColumnType::Categorical), ("revenue", ColumnType::Numeric)],
    );
    let t = reg.begin_detail("d2");
    reg.finish_detail(t, Ok(detail)).unwrap();
    assert_eq!(reg.selected_y_candidates(), vec!["revenue"]);
    assert_eq!(reg.datasets().len(), 1);
}

#[test]
fn stale_detail_is_ignored() {
    let mut reg = DatasetRegistry::default();
    let old = reg.begin_detail("d1");
    let _new = reg.begin_detail("d2");
    assert!(matches!(
        reg.finish_detail(old, Ok(people())),
        Err(DatasetError::Superseded)
    ));
    assert!(reg.datasets().is_empty());
}
