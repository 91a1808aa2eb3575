use visualization_ingestion::IngestionError;
use visualization_ingestion::config::{FileDetails, FileProperties, FileType};
use visualization_ingestion::ingestion::{IngestionOptions, decode_records, files_to_visualizations};
use visualization_ingestion::types::{
    HierarchyNode, TypeSelection, VisualizationData, VisualizationDraft, VisualizationType,
};

fn file(path: &str) -> FileProperties {
    FileProperties::new(path, "")
}

fn one(t: VisualizationType) -> TypeSelection {
    TypeSelection::One(t)
}

async fn drafts(
    path: &str,
    details: &FileDetails,
    target: Option<&TypeSelection>,
    include_all: bool,
) -> Result<Vec<VisualizationDraft>, IngestionError> {
    files_to_visualizations(&[file(path)], details, target, include_all, &IngestionOptions::default())
        .await
}

fn sankey_csv_details() -> FileDetails {
    FileDetails::new(FileType::Csv).with_headers(true).with_mapping([
        ("nodes", "1"),
        ("categories", "2"),
        ("sources", "3"),
        ("targets", "4"),
        ("values", "5"),
        ("visualizationName", "6"),
        ("visualizationDescription", "7"),
        ("visualizationTags", "8"),
        ("properties", "9"),
    ])
}

#[tokio::test]
async fn the_same_sankey_reads_identically_from_every_format() {
    let sankey = one(VisualizationType::Sankey);

    let from_json = drafts("tests/fixtures/sankey.json", &FileDetails::new(FileType::Json), None, true)
        .await
        .unwrap();
    let from_xml = drafts("tests/fixtures/sankey.xml", &FileDetails::new(FileType::Xml), None, true)
        .await
        .unwrap();
    let from_csv = drafts("tests/fixtures/sankey.csv", &sankey_csv_details(), Some(&sankey), true)
        .await
        .unwrap();

    assert_eq!(from_json.len(), 1);
    assert_eq!(from_json, from_xml);
    assert_eq!(from_json, from_csv);
    assert_eq!(from_json[0].kind, Some(sankey));
    assert_eq!(from_json[0].name.as_deref(), Some("Energy flows"));
}

#[tokio::test]
async fn file_type_wins_with_include_all_and_caller_type_wins_otherwise() {
    let details = FileDetails::new(FileType::Json);
    let matrix = one(VisualizationType::Matrix);

    let with_all = drafts("tests/fixtures/sankey.json", &details, Some(&matrix), true)
        .await
        .unwrap();
    assert_eq!(with_all[0].kind, Some(one(VisualizationType::Sankey)));

    let without = drafts("tests/fixtures/sankey.json", &details, Some(&matrix), false)
        .await
        .unwrap();
    assert_eq!(without[0].kind, Some(matrix));
    assert_eq!(without[0].name, None);
}

#[tokio::test]
async fn each_document_of_an_array_is_one_visualization() {
    let out = drafts("tests/fixtures/documents.json", &FileDetails::new(FileType::Json), None, false)
        .await
        .unwrap();

    assert_eq!(out.len(), 2);
    assert_eq!(
        out[0].kind,
        Some(TypeSelection::Many(vec![VisualizationType::BarChart, VisualizationType::LineChart]))
    );
    assert_eq!(out[1].kind, Some(one(VisualizationType::Treemap)));
}

#[tokio::test]
async fn records_of_unknown_type_are_skipped() {
    let out = drafts("tests/fixtures/unknown_type.json", &FileDetails::new(FileType::Json), None, true)
        .await
        .unwrap();
    assert!(out.is_empty());
}

#[tokio::test]
async fn hierarchy_rows_nest_by_child_names() {
    let details = FileDetails::new(FileType::Csv).with_headers(true).with_mapping([
        ("names", "1"),
        ("values", "2"),
        ("categories", "3"),
        ("children", "4,5"),
    ]);
    let out = drafts(
        "tests/fixtures/hierarchy.csv",
        &details,
        Some(&one(VisualizationType::Treemap)),
        false,
    )
    .await
    .unwrap();

    let VisualizationData::Hierarchy(data) = &out[0].data else {
        panic!("expected hierarchy data");
    };
    assert_eq!(data.nodes.len(), 1);
    let root: &HierarchyNode = &data.nodes[0];
    assert_eq!(root.name, "Root");
    assert_eq!(root.category, "top");

    let children = root.children.as_ref().unwrap();
    assert_eq!(
        children.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
        vec!["Left", "Right"]
    );
    assert_eq!(children[0].children.as_ref().unwrap()[0].name, "Leaf");
    assert_eq!(children[1].children, None);
}

#[tokio::test]
async fn calendar_rows_with_unparseable_dates_are_skipped() {
    let details = FileDetails::new(FileType::Csv).with_headers(true).with_mapping([
        ("dates", "1"),
        ("values", "2"),
        ("categories", "3"),
    ]);
    let out = drafts(
        "tests/fixtures/calendar.csv",
        &details,
        Some(&one(VisualizationType::Calendar)),
        false,
    )
    .await
    .unwrap();

    let VisualizationData::Calendar(data) = &out[0].data else {
        panic!("expected calendar data");
    };
    let days: Vec<_> = data.calendar.iter().map(|e| e.date.as_str()).collect();
    assert_eq!(days, vec!["2023-10-07", "2023-10-09"]);
    assert_eq!(data.calendar[1].value, 1.0);
    assert_eq!(data.calendar[1].category, "patch");
}

#[tokio::test]
async fn tabular_files_need_a_mapping_and_a_type() {
    let err = drafts(
        "tests/fixtures/budget.csv",
        &FileDetails::new(FileType::Csv),
        Some(&one(VisualizationType::PieChart)),
        false,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, IngestionError::MissingMapping { .. }));

    let details = FileDetails::new(FileType::Csv)
        .with_separator(";")
        .with_mapping([("names", "1"), ("values", "2")]);
    let err = drafts("tests/fixtures/budget.csv", &details, None, true)
        .await
        .unwrap_err();
    assert!(matches!(err, IngestionError::MissingVisualizationType));
}

#[tokio::test]
async fn invalid_selectors_are_rejected_before_reading() {
    let details = FileDetails::new(FileType::Csv).with_mapping([("names", "0"), ("values", "two")]);
    let err = drafts(
        "tests/fixtures/does_not_exist.csv",
        &details,
        Some(&one(VisualizationType::PieChart)),
        false,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, IngestionError::InvalidSelector { .. }), "{err:?}");
}

#[test]
fn separators_must_be_single_characters() {
    let details = FileDetails::new(FileType::Csv).with_separator("||");
    let err = decode_records(b"a||b\n", &details).unwrap_err();
    assert!(matches!(err, IngestionError::SchemaMismatch { .. }));
}

#[test]
fn unsupported_file_types_are_rejected() {
    let details = FileDetails::new(FileType::from_name("faje"));
    let err = decode_records(b"{}", &details).unwrap_err();
    assert_eq!(err.to_string(), "Invalid file type provided");
}
