use serde_json::json;
use visualization_ingestion::IngestionError;
use visualization_ingestion::ingestion::xml::{read_xml_from_path, read_xml_from_str};
use visualization_ingestion::transform::xml_provider;
use visualization_ingestion::types::{TypeSelection, VisualizationData, VisualizationType};

#[test]
fn pie_slices_are_child_elements_of_values() {
    let doc = read_xml_from_path("tests/fixtures/pie.xml").unwrap();
    let draft = xml_provider(&VisualizationType::PieChart, &doc, true)
        .unwrap()
        .unwrap();

    assert_eq!(draft.name.as_deref(), Some("Budget"));
    assert_eq!(draft.kind, Some(TypeSelection::One(VisualizationType::PieChart)));
    let VisualizationData::PieFunnel(data) = draft.data else {
        panic!("expected pie data");
    };
    assert_eq!(data.values.keys().collect::<Vec<_>>(), vec!["Rent", "Food", "Travel"]);
    assert_eq!(data.values["Food"], 450.5);
}

#[test]
fn hierarchy_children_wrap_nested_nodes() {
    let doc = read_xml_from_path("tests/fixtures/hierarchy.xml").unwrap();
    let draft = xml_provider(&VisualizationType::Sunburst, &doc, false)
        .unwrap()
        .unwrap();

    let VisualizationData::Hierarchy(data) = draft.data else {
        panic!("expected hierarchy data");
    };
    assert_eq!(data.nodes.len(), 1);
    let ceo = &data.nodes[0];
    assert_eq!(ceo.name, "CEO");
    let children = ceo.children.as_ref().unwrap();
    assert_eq!(children[0].name, "CTO");
    assert_eq!(children[0].children, None);
    assert_eq!(children[1].value, 3.0);
    assert_eq!(children[1].properties, Some(json!({ "office": "Berlin" })));
}

#[test]
fn timeline_days_group_events() {
    let doc = read_xml_from_path("tests/fixtures/timeline.xml").unwrap();
    let draft = xml_provider(&VisualizationType::Timeline, &doc, false)
        .unwrap()
        .unwrap();

    let VisualizationData::Timeline(data) = draft.data else {
        panic!("expected timeline data");
    };
    let day = &data.days["2023-10-07"];
    assert_eq!(day.summary.as_ref().map(|s| s.title.as_str()), Some("Launch"));
    assert_eq!(day.events.len(), 2);
    assert_eq!(day.events[0].kind, "announcement");
    assert_eq!(day.events[0].tags.as_ref().unwrap()[0].name, "press");
    assert_eq!(day.events[1].tags, None);
    assert_eq!(day.events[1].author, "Ops");
}

#[test]
fn several_type_elements_form_a_list() {
    let doc = read_xml_from_str(
        "<v><name>Graph</name><type>sankey</type><type>matrix</type>\
         <data><nodes><name>A</name></nodes></data></v>",
    )
    .unwrap();
    let draft = xml_provider(&VisualizationType::Sankey, &doc, true)
        .unwrap()
        .unwrap();
    assert_eq!(
        draft.kind,
        Some(TypeSelection::Many(vec![VisualizationType::Sankey, VisualizationType::Matrix]))
    );
}

#[test]
fn non_numeric_axis_series_are_omitted() {
    let doc = read_xml_from_str(
        "<v><data><headers>Mon</headers><headers>Tue</headers>\
         <values><site>1</site><site>2</site><app>3</app><app>lots</app></values></data></v>",
    )
    .unwrap();
    let draft = xml_provider(&VisualizationType::LineChart, &doc, false)
        .unwrap()
        .unwrap();
    let VisualizationData::Axis(data) = draft.data else {
        panic!("expected axis data");
    };
    assert_eq!(data.headers, vec!["Mon", "Tue"]);
    assert_eq!(data.values["site"], vec![1.0, 2.0]);
    assert!(!data.values.contains_key("app"));
}

#[test]
fn non_numeric_link_value_is_a_schema_mismatch() {
    let doc = read_xml_from_str(
        "<v><data><links><source>A</source><target>B</target><value>x</value></links></data></v>",
    )
    .unwrap();
    let err = xml_provider(&VisualizationType::Sankey, &doc, false).unwrap_err();
    assert!(matches!(err, IngestionError::SchemaMismatch { .. }));
}

#[test]
fn unknown_type_yields_no_draft() {
    let doc = read_xml_from_path("tests/fixtures/pie.xml").unwrap();
    assert!(
        xml_provider(&VisualizationType::from("fake"), &doc, true)
            .unwrap()
            .is_none()
    );
}

#[test]
fn malformed_xml_is_an_error() {
    assert!(read_xml_from_path("tests/fixtures/broken.xml").is_err());
}
