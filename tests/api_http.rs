use databoard::api::{ApiClient, ApiError, HttpApiClient};
use databoard::dashboard::model::{ChartDataEnvelope, ChartSpec, ChartType, ColumnType};
use httpmock::prelude::*;
use serde_json::json;
use std::time::Duration;

fn client(server: &MockServer) -> HttpApiClient {
    HttpApiClient::new(&server.base_url(), Duration::from_secs(5)).unwrap()
}

#[test]
fn lists_datasets() {
    let server = MockServer::start();
    let m = server.mock(|when, then| {
        when.method(GET).path("/api/datasets");
        then.status(200).json_body(json!([
            {"id": "d1", "filename": "people.csv", "rows": 3, "columns": 2}
        ]));
    });
    let datasets = client(&server).list_datasets().unwrap();
    m.assert();
    assert_eq!(datasets[0].filename, "people.csv");
    assert!(datasets[0].columns_info.is_empty());
}

#[test]
fn dataset_detail_carries_column_types() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/dataset/d1");
        then.status(200).json_body(json!({
            "id": "d1", "filename": "people.csv", "rows": 3, "columns": 2,
            "columns_info": [
                {"name": "city", "type": "categorical"},
                {"name": "age", "type": "numeric"},
                {"name": "misc", "type": "boolean"}
            ]
        }));
    });
    let ds = client(&server).dataset_detail("d1").unwrap();
    assert_eq!(ds.columns_info[2].column_type, ColumnType::Other);
    assert_eq!(ds.y_axis_candidates(), vec!["age"]);
}

#[test]
fn preview_sends_row_count() {
    let server = MockServer::start();
    let m = server.mock(|when, then| {
        when.method(GET)
            .path("/api/dataset/d1/preview")
            .query_param("rows", "5");
        then.status(200).json_body(json!({
            "columns": ["city"], "data": [{"city": "Oslo"}], "total_rows": 3
        }));
    });
    let preview = client(&server).dataset_preview("d1", 5).unwrap();
    m.assert();
    assert_eq!(preview.total_rows, 3);
}

#[test]
fn error_field_becomes_message() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/chart/create");
        then.status(400).json_body(json!({"error": "Column 'x' not found"}));
    });
    let spec = ChartSpec::new("d1", ChartType::Bar).with_x("x");
    let err = client(&server).create_chart(&spec).unwrap_err();
    assert_eq!(err.to_string(), "Column 'x' not found");
}

#[test]
fn status_without_error_body_is_generic() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/datasets");
        then.status(500).body("oops");
    });
    let err = client(&server).list_datasets().unwrap_err();
    assert!(matches!(err, ApiError::Status(500)));
    assert!(err.to_string().starts_with("Unknown error"));
}

#[test]
fn create_chart_posts_config_and_decodes_envelope() {
    let server = MockServer::start();
    let m = server.mock(|when, then| {
        when.method(POST)
            .path("/api/chart/create")
            .json_body_partial(
                r#"{"dataset_id": "d1", "chart_type": "bar", "config": {"x_column": "city", "limit": 10}}"#,
            );
        then.status(200).json_body(json!({
            "type": "bar",
            "data": {"labels": ["A", "B"], "values": [3, 5], "y_label": "age"}
        }));
    });
    let spec = ChartSpec::new("d1", ChartType::Bar)
        .with_x("city")
        .with_y("age")
        .with_limit(10);
    let env = client(&server).create_chart(&spec).unwrap();
    m.assert();
    let ChartDataEnvelope::Categorical { data, .. } = env else {
        panic!("expected categorical data");
    };
    assert_eq!(data.values, vec![3.0, 5.0]);
    assert_eq!(data.y_label.as_deref(), Some("age"));
}

#[test]
fn unwrapped_table_response_is_accepted() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/chart/create");
        then.status(200)
            .json_body(json!({"rows": [{"city": "Oslo", "age": 30}]}));
    });
    let env = client(&server)
        .create_chart(&ChartSpec::new("d1", ChartType::Table))
        .unwrap();
    let ChartDataEnvelope::Table(table) = env else {
        panic!("expected table");
    };
    assert_eq!(table.rows.len(), 1);
}

#[test]
fn mismatched_series_is_a_decode_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/chart/create");
        then.status(200).json_body(json!({
            "type": "pie", "data": {"labels": ["A", "B"], "values": [1]}
        }));
    });
    let spec = ChartSpec::new("d1", ChartType::Pie).with_x("city");
    let err = client(&server).create_chart(&spec).unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

#[test]
fn upload_sends_multipart_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sales.csv");
    std::fs::write(&path, "region,revenue\nnorth,10\n").unwrap();

    let server = MockServer::start();
    let m = server.mock(|when, then| {
        when.method(POST)
            .path("/api/upload")
            .body_contains("sales.csv")
            .body_contains("north,10");
        then.status(200).json_body(json!({
            "message": "File uploaded successfully",
            "dataset": {"id": "d9", "filename": "sales.csv", "rows": 1, "columns": 2}
        }));
    });
    let receipt = client(&server).upload_file(&path).unwrap();
    m.assert();
    assert_eq!(receipt.dataset.unwrap().id, "d9");
}

#[test]
fn missing_upload_file_is_io_error() {
    let server = MockServer::start();
    let err = client(&server)
        .upload_file(std::path::Path::new("/nonexistent/data.csv"))
        .unwrap_err();
    assert!(matches!(err, ApiError::Io { .. }));
}

#[test]
fn save_and_load_dashboard() {
    let server = MockServer::start();
    let save = server.mock(|when, then| {
        when.method(POST)
            .path("/api/dashboard/save")
            .body_contains(r#""name":"Weekly""#)
            .body_contains(r#""id":"widget-1""#);
        then.status(200).json_body(json!({"dashboard_id": "abc"}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/dashboard/load/abc");
        then.status(200).json_body(json!({
            "id": "abc", "name": "Weekly",
            "layout": [{"id": "widget-1", "x": 0, "y": 0, "w": 6, "h": 4}]
        }));
    });
    let api = client(&server);
    let layout: databoard::dashboard::model::DashboardLayout = serde_json::from_value(json!({
        "name": "Weekly",
        "layout": [{"id": "widget-1", "x": 0, "y": 0, "w": 6, "h": 4}]
    }))
    .unwrap();
    let saved = api.save_dashboard(&layout).unwrap();
    save.assert();
    assert_eq!(saved.dashboard_id.as_deref(), Some("abc"));
    let loaded = api.load_dashboard("abc").unwrap();
    assert_eq!(loaded.layout[0].position.w, 6);
    assert!(loaded.layout[0].spec.is_none());
}
