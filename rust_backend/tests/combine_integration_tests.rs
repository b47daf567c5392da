//! End-to-end tests of the combination pipeline.
//!
//! These tests ensure that:
//! 1. Stacking and joining produce the documented rows and provenance
//! 2. Request-level failures abandon the attempt without partial output
//! 3. Sessions keep the last successful outcome
//! 4. Excel uploads load like CSV uploads
//! 5. Exported CSV loads back to the same values

use polars::prelude::*;
use rust_xlsxwriter::Workbook;
use std::fs;
use tempfile::TempDir;
use udv_rust::config::DashboardConfig;
use udv_rust::core::{CombinationMode, Contribution, SourceFormat, Upload};
use udv_rust::error::CombineError;
use udv_rust::io::loaders::SourceLoader;
use udv_rust::io::samples::write_sample_datasets;
use udv_rust::parsing::parse_csv;
use udv_rust::preprocessing::CombinePipeline;
use udv_rust::services::Session;
use udv_rust::transformations::SOURCE_COLUMN;

// ==================== Helper Functions ====================

fn upload(name: &str, content: &str) -> Upload {
    Upload::new(name, content.as_bytes().to_vec())
}

fn stack_pipeline(sort_column: Option<&str>) -> CombinePipeline {
    CombinePipeline::with_config(
        DashboardConfig::default()
            .with_mode(CombinationMode::Stack)
            .with_sort_column(sort_column),
    )
}

fn join_pipeline(key: &str) -> CombinePipeline {
    CombinePipeline::with_config(DashboardConfig::default().with_key_column(key))
}

fn xlsx_bytes(header: &[&str], rows: &[Vec<Option<f64>>]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    for (col, name) in header.iter().enumerate() {
        worksheet.write_string(0, col as u16, *name).unwrap();
    }
    for (r, row) in rows.iter().enumerate() {
        for (col, value) in row.iter().enumerate() {
            if let Some(value) = value {
                worksheet
                    .write_number(r as u32 + 1, col as u16, *value)
                    .unwrap();
            }
        }
    }
    workbook.save_to_buffer().unwrap()
}

// ==================== Stack Mode ====================

#[test]
fn test_stack_sorted_rows_keep_source_attribution() {
    let uploads = vec![
        upload("first.csv", "unique_id\n1\n2\n"),
        upload("second.csv", "unique_id\n3\n1\n"),
    ];

    let outcome = stack_pipeline(Some("unique_id")).process(&uploads).unwrap();
    let table = &outcome.table;

    let ids: Vec<i64> = table
        .column("unique_id")
        .unwrap()
        .i64()
        .unwrap()
        .into_iter()
        .flatten()
        .collect();
    assert_eq!(ids, vec![1, 1, 2, 3]);

    let origins: Vec<&str> = table
        .column(SOURCE_COLUMN)
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .flatten()
        .collect();
    assert_eq!(origins, vec!["first.csv", "second.csv", "first.csv", "second.csv"]);

    let provenance = &outcome.provenance;
    assert_eq!(
        provenance.get("first.csv").unwrap().contribution,
        Contribution::Rows(vec![0, 2])
    );
    assert_eq!(
        provenance.get("second.csv").unwrap().contribution,
        Contribution::Rows(vec![1, 3])
    );
}

#[test]
fn test_stack_absent_sort_column_is_a_warning() {
    let uploads = vec![upload("a.csv", "x\n2\n1\n")];
    let outcome = stack_pipeline(Some("unique_id")).process(&uploads).unwrap();

    assert_eq!(outcome.warnings.len(), 1);
    let xs = outcome.table.column("x").unwrap().i64().unwrap();
    assert_eq!(xs.get(0), Some(2));
}

// ==================== Join Mode ====================

#[test]
fn test_join_outer_rows() {
    let uploads = vec![
        upload("source1.csv", "ID,X\n1,a\n2,b\n"),
        upload("source2.csv", "ID,Y\n2,c\n3,d\n"),
    ];

    let outcome = join_pipeline("ID").process(&uploads).unwrap();
    let table = &outcome.table;
    assert_eq!(table.height(), 3);

    let ids = table.column("ID").unwrap().i64().unwrap();
    let x = table.column("X__source1.csv").unwrap().str().unwrap();
    let y = table.column("Y__source2.csv").unwrap().str().unwrap();

    assert_eq!((ids.get(0), x.get(0), y.get(0)), (Some(1), Some("a"), None));
    assert_eq!((ids.get(1), x.get(1), y.get(1)), (Some(2), Some("b"), Some("c")));
    assert_eq!((ids.get(2), x.get(2), y.get(2)), (Some(3), None, Some("d")));

    assert_eq!(outcome.provenance.source_of_column("Y__source2.csv"), Some("source2.csv"));
    assert_eq!(outcome.summary.missing_in("X__source1.csv"), Some(1));
}

#[test]
fn test_join_missing_key_names_the_source() {
    let uploads = vec![
        upload("good.csv", "ID,X\n1,a\n"),
        upload("bad.csv", "id,X\n1,a\n"),
    ];

    match join_pipeline("ID").process(&uploads) {
        Err(CombineError::MissingKeyColumn { source_name, key_column }) => {
            assert_eq!(source_name, "bad.csv");
            assert_eq!(key_column, "ID");
        }
        other => panic!("Expected MissingKeyColumn, got {:?}", other.map(|o| o.table)),
    }
}

// ==================== Request Limits ====================

#[test]
fn test_six_uploads_are_rejected_before_loading() {
    let uploads: Vec<Upload> = (1..=6)
        .map(|i| upload(&format!("f{}.csv", i), "product_id\n1\n"))
        .collect();

    let result = CombinePipeline::new().process(&uploads);
    assert!(matches!(
        result,
        Err(CombineError::TooManySources { provided: 6, max: 5 })
    ));
}

#[test]
fn test_unsupported_upload_fails_the_request() {
    let uploads = vec![
        upload("a.csv", "product_id\n1\n"),
        upload("notes.txt", "product_id\n1\n"),
    ];

    let result = CombinePipeline::new().process(&uploads);
    assert!(matches!(result, Err(CombineError::UnsupportedFormat { .. })));
}

// ==================== Sessions ====================

#[test]
fn test_session_survives_failed_request() {
    let mut session = Session::new(DashboardConfig::default().with_key_column("ID"));
    session
        .process(&[upload("a.csv", "ID,X\n1,a\n")])
        .unwrap();

    let too_many: Vec<Upload> = (0..6).map(|i| upload(&format!("{}.csv", i), "ID\n1\n")).collect();
    assert!(session.process(&too_many).is_err());

    assert_eq!(session.legend(), vec![("a.csv".to_string(), "#FFCDD2".to_string())]);
}

// ==================== Excel ====================

#[test]
fn test_xlsx_upload_joins_with_csv() {
    let workbook = xlsx_bytes(
        &["product_id", "stock"],
        &[vec![Some(1.0), Some(5.0)], vec![Some(2.0), None]],
    );
    let uploads = vec![
        Upload::new("stock.xlsx", workbook),
        upload("prices.csv", "product_id,price\n1,9.5\n3,2.25\n"),
    ];

    let outcome = CombinePipeline::new().process(&uploads).unwrap();
    assert_eq!(outcome.table.height(), 3);

    let stock = outcome.table.column("stock__stock.xlsx").unwrap();
    assert_eq!(stock.dtype(), &DataType::Int64);
    assert_eq!(stock.i64().unwrap().get(0), Some(5));
    assert_eq!(stock.null_count(), 2);
}

#[test]
fn test_xlsx_header_normalization() {
    let workbook = xlsx_bytes(&["value", "", "value"], &[vec![Some(1.5), Some(2.0), Some(3.0)]]);
    let source = SourceLoader::new().load("dupes.xlsx", &workbook).unwrap();

    assert_eq!(source.format, SourceFormat::Xlsx);
    assert_eq!(source.column_names(), vec!["value", "Unnamed: 1", "value.1"]);
    assert_eq!(
        source.table.column("value").unwrap().dtype(),
        &DataType::Float64
    );
}

// ==================== Export ====================

#[test]
fn test_export_reload_preserves_values() {
    let uploads = vec![
        upload("a.csv", "product_id,product_name,value\n1,Aspirin,2.5\n2,\"Cough, syrup\",4\n"),
        upload("b.csv", "product_id,product_name,value\n2,Cough syrup,1\n4,Zinc,\n"),
    ];

    let outcome = CombinePipeline::new().process(&uploads).unwrap();
    let csv = outcome.export_csv().unwrap();
    let reloaded = parse_csv("export.csv", csv.as_bytes()).unwrap();

    assert_eq!(reloaded.shape(), outcome.table.shape());
    assert_eq!(
        reloaded.get_column_names(),
        outcome.table.get_column_names()
    );

    let names = reloaded.column("product_name__a.csv").unwrap().str().unwrap();
    assert_eq!(names.get(1), Some("Cough, syrup"));

    let values = reloaded.column("value__a.csv").unwrap().f64().unwrap();
    assert_eq!(values.get(0), Some(2.5));
    assert_eq!(values.get(2), None);
}

// ==================== Sample Data ====================

#[test]
fn test_sample_datasets_stack_and_join() {
    let dir = TempDir::new().unwrap();
    let written = write_sample_datasets(dir.path()).unwrap();
    assert_eq!(written.len(), 5);

    let stacked = stack_pipeline(Some("unique_id"))
        .process_paths(&written)
        .unwrap();
    assert_eq!(stacked.table.height(), 30);
    assert_eq!(stacked.provenance.len(), 5);
    assert!(stacked.summary.metric_total.is_some());

    let joined = CombinePipeline::new().process_paths(&written).unwrap();
    // product ids 100..=107 each appear in at least one sample
    assert_eq!(joined.table.height(), 8);
    assert!(joined.warnings.is_empty());
    assert_eq!(joined.provenance.shared_columns(), ["product_id".to_string()]);

    // the file on disk is untouched by processing
    let first = fs::read_to_string(&written[0]).unwrap();
    assert!(first.starts_with("unique_id,product_id,product_name,value"));
}
