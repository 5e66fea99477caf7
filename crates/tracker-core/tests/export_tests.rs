use chrono::NaiveDate;
use regex::Regex;
use tracker_core::{
    export::{self, parse_json_export, ExportFormat, ExportOptions, ExportScope, CSV_HEADER},
    Clock, CoreError, FixedClock,
};
use tracker_domain::{Category, Expense, ExpenseDraft};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn clock() -> FixedClock {
    FixedClock::on(date(2024, 3, 9))
}

fn expense(on: NaiveDate, amount: f64, category: Category, description: &str) -> Expense {
    let valid = ExpenseDraft::new(on, amount, category, description)
        .validate()
        .expect("valid draft");
    Expense::from_valid(valid, clock().now())
}

fn scenario() -> Vec<Expense> {
    vec![
        expense(date(2024, 1, 5), 12.50, Category::Food, "Lunch"),
        expense(date(2024, 2, 10), 40.00, Category::Bills, "Internet"),
    ]
}

fn refs(records: &[Expense]) -> Vec<&Expense> {
    records.iter().collect()
}

#[test]
fn csv_output_is_exact() {
    let records = scenario();
    let text = export::serialize(
        &refs(&records),
        ExportFormat::Csv,
        &ExportOptions::default(),
        clock().now(),
    )
    .unwrap();

    insta::assert_snapshot!(text, @r###"
    Date,Category,Description,Amount
    "2024-01-05","Food","Lunch","12.5"
    "2024-02-10","Bills","Internet","40"
    "###);
    assert!(!text.ends_with('\n'));
}

#[test]
fn csv_doubles_embedded_quotes() {
    let records = vec![expense(
        date(2024, 1, 5),
        3.0,
        Category::Other,
        r#"He said "wow""#,
    )];
    let text = export::serialize(
        &refs(&records),
        ExportFormat::Csv,
        &ExportOptions::default(),
        clock().now(),
    )
    .unwrap();
    assert!(text.contains(r#""He said ""wow""""#), "got {text}");
}

#[test]
fn csv_round_trips_through_a_reader() {
    let records = vec![
        expense(date(2024, 1, 5), 12.34, Category::Food, "Tacos, \"extra\" salsa"),
        expense(date(2024, 1, 6), 0.1, Category::Shopping, "Line\nbreak"),
        expense(date(2024, 1, 7), 1234.5, Category::Transportation, "Train"),
    ];
    let text = export::serialize(
        &refs(&records),
        ExportFormat::Csv,
        &ExportOptions::default(),
        clock().now(),
    )
    .unwrap();

    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let headers = reader.headers().unwrap().clone();
    assert_eq!(headers.iter().collect::<Vec<_>>().join(","), CSV_HEADER);

    let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(rows.len(), records.len());
    for (row, original) in rows.iter().zip(&records) {
        assert_eq!(&row[0], original.date_label());
        assert_eq!(&row[1], original.category.name());
        assert_eq!(&row[2], original.description);
        assert_eq!(row[3].parse::<f64>().unwrap(), original.amount);
    }
}

#[test]
fn json_round_trips_records_and_totals() {
    let records = scenario();
    let text = export::serialize(
        &refs(&records),
        ExportFormat::Json,
        &ExportOptions::default(),
        clock().now(),
    )
    .unwrap();

    let document = parse_json_export(&text).unwrap();
    assert_eq!(document.expenses, records);
    assert_eq!(document.total_records, 2);
    assert!((document.total_amount - 52.5).abs() < 1e-9);
    assert_eq!(document.export_date, clock().now());

    let keys = ["\"exportDate\"", "\"totalRecords\"", "\"totalAmount\"", "\"expenses\""];
    let positions: Vec<usize> = keys.iter().map(|key| text.find(key).unwrap()).collect();
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn html_escapes_record_text_and_adds_total_row() {
    let records = vec![
        expense(
            date(2024, 1, 5),
            12.5,
            Category::Food,
            r#"<script>alert("x")</script>"#,
        ),
        expense(date(2024, 2, 10), 40.0, Category::Bills, "Tom & Jerry's"),
    ];
    let options = ExportOptions {
        title: "Q1 <Report>".into(),
        ..ExportOptions::default()
    };
    let html = export::serialize(&refs(&records), ExportFormat::Html, &options, clock().now())
        .unwrap();

    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(!html.contains("<script>"));
    assert!(html.contains("&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt;"));
    assert!(html.contains("Tom &amp; Jerry&#39;s"));
    assert!(html.contains("<title>Q1 &lt;Report&gt;</title>"));
    assert_eq!(html.matches("<tr><td>").count(), 2);
    assert!(html.contains("<td colspan=\"3\">Total</td><td class=\"amount\">USD 52.50</td>"));
}

#[test]
fn empty_selection_is_reported_for_every_format() {
    for format in ExportFormat::ALL {
        let result = export::export(&[], format, &ExportOptions::default(), &clock());
        assert!(
            matches!(result, Err(CoreError::EmptyExport)),
            "format {format} produced {result:?}"
        );
    }
}

#[test]
fn artifact_carries_file_name_and_mime_type() {
    let records = scenario();
    let pattern = Regex::new(r"^expenses_\d{4}-\d{2}-\d{2}\.(csv|json|html)$").unwrap();

    for format in ExportFormat::ALL {
        let artifact =
            export::export(&refs(&records), format, &ExportOptions::default(), &clock()).unwrap();
        assert!(pattern.is_match(&artifact.file_name), "{}", artifact.file_name);
        assert_eq!(
            artifact.file_name,
            format!("expenses_2024-03-09.{}", format.extension())
        );
        assert_eq!(artifact.mime_type, format.mime_type());
        assert_eq!(artifact.record_count, 2);
    }
}

#[test]
fn export_scope_uses_filter_semantics() {
    let records = vec![
        expense(date(2024, 1, 5), 12.5, Category::Food, "Lunch"),
        expense(date(2024, 1, 31), 20.0, Category::Shopping, "Shirt"),
        expense(date(2024, 2, 10), 40.0, Category::Bills, "Internet"),
    ];
    let scope = ExportScope {
        start_date: Some(date(2024, 1, 5)),
        end_date: Some(date(2024, 1, 31)),
        categories: vec![Category::Food, Category::Bills],
    };
    let scoped = scope.apply(&records);
    assert_eq!(scoped, vec![&records[0]]);

    let everything = ExportScope::default().apply(&records);
    assert_eq!(everything.len(), 3);

    let nothing = ExportScope {
        categories: vec![Category::Entertainment],
        ..ExportScope::default()
    }
    .apply(&records);
    assert!(matches!(
        export::export(&nothing, ExportFormat::Csv, &ExportOptions::default(), &clock()),
        Err(CoreError::EmptyExport)
    ));
}
