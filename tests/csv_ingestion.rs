use indexmap::IndexMap;
use visualization_ingestion::ingestion::Cell;
use visualization_ingestion::ingestion::csv::{read_csv_from_bytes, read_csv_from_path, read_csv_from_reader};
use visualization_ingestion::mapping::ColumnMapping;
use serde_json::json;
use visualization_ingestion::transform::{tabular_provider, transformer_provider};
use visualization_ingestion::types::{AxisChartData, VisualizationData, VisualizationType};

fn mapping(pairs: &[(&str, &str)]) -> ColumnMapping {
    let raw: IndexMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    ColumnMapping::parse(&raw).unwrap()
}

#[test]
fn read_csv_from_path_keeps_header_row() {
    let table = read_csv_from_path("tests/fixtures/sales.csv", b',').unwrap();

    assert_eq!(table.sheets.len(), 1);
    assert_eq!(table.row_count(), 4);
    assert_eq!(
        table.header_row().unwrap(),
        &[
            Cell::from("month"),
            Cell::from("north"),
            Cell::from("south"),
            Cell::from("note"),
        ]
    );
    assert_eq!(table.sheets[0].rows[2][2], Cell::from("n/a"));
    assert_eq!(table.sheets[0].rows[1][1], Cell::from("10"));
}

#[test]
fn read_csv_honours_custom_separator() {
    let table = read_csv_from_path("tests/fixtures/budget.csv", b';').unwrap();
    assert_eq!(table.row_count(), 4);
    assert_eq!(table.sheets[0].rows[2], vec![Cell::from("Food"), Cell::from("450.5")]);
}

#[test]
fn read_csv_allows_ragged_rows_and_skips_blank_lines() {
    let table = read_csv_from_bytes(b"a,b,c\n\n1,2\n,,\n3,4,5,6\n", b',').unwrap();
    let rows = &table.sheets[0].rows;
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[1].len(), 2);
    assert_eq!(rows[2].len(), 4);
}

#[test]
fn read_csv_from_reader_accepts_a_prebuilt_reader() {
    let input = "name\tvalue\nA\t1\n";
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(b'\t')
        .from_reader(input.as_bytes());

    let table = read_csv_from_reader(&mut rdr).unwrap();
    assert_eq!(table.sheets[0].rows[1], vec![Cell::from("A"), Cell::from("1")]);
}

#[test]
fn bar_chart_rows_with_non_numeric_cells_keep_their_header() {
    let table = read_csv_from_path("tests/fixtures/sales.csv", b',').unwrap();
    let draft = tabular_provider(
        &VisualizationType::BarChart,
        &table,
        &mapping(&[("headers", "1"), ("data", "2,3")]),
        true,
        false,
    )
    .unwrap()
    .unwrap();

    let VisualizationData::Axis(AxisChartData { headers, values }) = draft.data else {
        panic!("expected axis data, got {:?}", draft.data);
    };
    assert_eq!(headers, vec!["Jan", "Feb", "Mar"]);
    assert_eq!(values.keys().collect::<Vec<_>>(), vec!["north", "south"]);
    assert_eq!(values["north"], vec![10.0, 11.0]);
    assert_eq!(values["south"], vec![12.0, 9.0]);
}

#[test]
fn axis_series_are_named_by_column_without_headers() {
    let table = read_csv_from_bytes(b"Jan,10,12\nFeb,8,7\n", b',').unwrap();
    let draft = tabular_provider(
        &VisualizationType::LineChart,
        &table,
        &mapping(&[("headers", "1"), ("data", "2,3")]),
        false,
        false,
    )
    .unwrap()
    .unwrap();

    let VisualizationData::Axis(data) = draft.data else {
        panic!("expected axis data");
    };
    assert_eq!(data.values["2"], vec![10.0, 8.0]);
    assert_eq!(data.values["3"], vec![12.0, 7.0]);
}

#[test]
fn tabular_providers_return_none_for_unknown_types() {
    let table = read_csv_from_path("tests/fixtures/sales.csv", b',').unwrap();
    let fake = VisualizationType::Unknown("fake".to_string());

    let draft = tabular_provider(&fake, &table, &mapping(&[("names", "1")]), true, true).unwrap();
    assert!(draft.is_none());

    let draft = transformer_provider(&fake, &ColumnMapping::default(), None, &[], false).unwrap();
    assert!(draft.is_none());
}

#[test]
fn word_cloud_reads_every_row_without_headers_and_keeps_names_verbatim() {
    let table = read_csv_from_bytes(b"007,3,lead\n1.50,2\n1e3,many\n", b',').unwrap();
    let draft = tabular_provider(
        &VisualizationType::WordCloud,
        &table,
        &mapping(&[("names", "1"), ("values", "2"), ("properties", "3")]),
        false,
        false,
    )
    .unwrap()
    .unwrap();

    let VisualizationData::WordCloud(data) = draft.data else {
        panic!("expected word cloud data, got {:?}", draft.data);
    };
    let names: Vec<_> = data.words.iter().map(|w| w.name.as_str()).collect();
    assert_eq!(names, vec!["007", "1.50", "1e3"]);
    let values: Vec<_> = data.words.iter().map(|w| w.value).collect();
    assert_eq!(values, vec![3.0, 2.0, 0.0]);
    assert_eq!(data.words[0].properties, Some(json!("lead")));
    assert_eq!(data.words[1].properties, Some(json!("")));
}

#[test]
fn scatter_rows_become_points() {
    let table = read_csv_from_bytes(b"x,y,group\n1,2.5,a\n3,,b\n", b',').unwrap();
    let draft = tabular_provider(
        &VisualizationType::Scatter,
        &table,
        &mapping(&[("values", "1,2"), ("categories", "3")]),
        true,
        false,
    )
    .unwrap()
    .unwrap();

    let VisualizationData::Scatter(data) = draft.data else {
        panic!("expected scatter data, got {:?}", draft.data);
    };
    assert_eq!(data.points.len(), 2);
    assert_eq!(data.points[0].value, vec![1.0, 2.5]);
    assert_eq!(data.points[0].category, "a");
    assert_eq!(data.points[0].properties, Some(json!("")));
    assert_eq!(data.points[1].value, vec![3.0, 0.0]);
}

#[test]
fn timeline_rows_are_grouped_by_day() {
    let csv = "date,time,summary,title,tags\n\
               2023-10-07,08:00,Kickoff,Launch week,\"plan, team\"\n\
               2023-10-07,12:00,Review,,\n\
               10/09/2023,09:30,Retro,,\n";
    let table = read_csv_from_bytes(csv.as_bytes(), b',').unwrap();
    let draft = tabular_provider(
        &VisualizationType::Timeline,
        &table,
        &mapping(&[
            ("dates", "1"),
            ("times", "2"),
            ("summaries", "3"),
            ("titles", "4"),
            ("tags", "5"),
        ]),
        true,
        false,
    )
    .unwrap()
    .unwrap();

    let VisualizationData::Timeline(data) = draft.data else {
        panic!("expected timeline data, got {:?}", draft.data);
    };
    assert_eq!(data.days.keys().collect::<Vec<_>>(), vec!["2023-10-07", "2023-10-09"]);

    let launch = &data.days["2023-10-07"];
    assert_eq!(launch.summary.as_ref().map(|s| s.title.as_str()), Some("Launch week"));
    assert_eq!(launch.events.len(), 2);
    assert_eq!(launch.events[0].date, "08:00");
    let tags: Vec<_> = launch.events[0]
        .tags
        .iter()
        .flatten()
        .map(|t| t.name.as_str())
        .collect();
    assert_eq!(tags, vec!["plan", "team"]);
    assert_eq!(launch.events[1].tags, None);

    assert_eq!(data.days["2023-10-09"].events[0].summary, "Retro");
}
