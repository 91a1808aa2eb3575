//! Canonical visualization data model.
//!
//! Every transformer produces one of the payload shapes below, whatever the source format was.
//! [`VisualizationData`] is the closed union of those shapes, and [`VisualizationCreate`] is the
//! validated record handed to the store collaborator.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Free-form properties attached to nodes, links, words, points and calendar entries.
///
/// Tabular sources produce a string (empty when unmapped); JSON and XML sources may carry objects.
pub type Properties = serde_json::Value;

/// Visualization type identifier.
///
/// Unrecognised type names are kept as [`VisualizationType::Unknown`] rather than rejected at parse
/// time, so that dispatch can answer "no transformer" instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VisualizationType {
    Sankey,
    ForceDirectedGraph,
    HierarchicalEdgeBundling,
    Matrix,
    Treemap,
    Sunburst,
    BarChart,
    LineChart,
    PieChart,
    Funnel,
    WordCloud,
    Calendar,
    Scatter,
    Timeline,
    /// Any other type name.
    Unknown(String),
}

impl VisualizationType {
    /// All recognised visualization types.
    pub const KNOWN: [VisualizationType; 14] = [
        Self::Sankey,
        Self::ForceDirectedGraph,
        Self::HierarchicalEdgeBundling,
        Self::Matrix,
        Self::Treemap,
        Self::Sunburst,
        Self::BarChart,
        Self::LineChart,
        Self::PieChart,
        Self::Funnel,
        Self::WordCloud,
        Self::Calendar,
        Self::Scatter,
        Self::Timeline,
    ];

    /// Wire name of the type (e.g. `force-directed-graph`).
    pub fn as_str(&self) -> &str {
        match self {
            Self::Sankey => "sankey",
            Self::ForceDirectedGraph => "force-directed-graph",
            Self::HierarchicalEdgeBundling => "hierarchical-edge-bundling",
            Self::Matrix => "matrix",
            Self::Treemap => "treemap",
            Self::Sunburst => "sunburst",
            Self::BarChart => "bar-chart",
            Self::LineChart => "line-chart",
            Self::PieChart => "pie-chart",
            Self::Funnel => "funnel",
            Self::WordCloud => "word-cloud",
            Self::Calendar => "calendar",
            Self::Scatter => "scatter",
            Self::Timeline => "timeline",
            Self::Unknown(name) => name,
        }
    }

    /// Payload shape produced for this type, or `None` for [`VisualizationType::Unknown`].
    pub fn shape(&self) -> Option<DataShape> {
        match self {
            Self::Sankey | Self::ForceDirectedGraph | Self::HierarchicalEdgeBundling | Self::Matrix => {
                Some(DataShape::NodeLink)
            }
            Self::Treemap | Self::Sunburst => Some(DataShape::Hierarchy),
            Self::BarChart | Self::LineChart => Some(DataShape::Axis),
            Self::PieChart | Self::Funnel => Some(DataShape::PieFunnel),
            Self::WordCloud => Some(DataShape::WordCloud),
            Self::Calendar => Some(DataShape::Calendar),
            Self::Scatter => Some(DataShape::Scatter),
            Self::Timeline => Some(DataShape::Timeline),
            Self::Unknown(_) => None,
        }
    }

    /// Returns `true` unless this is [`VisualizationType::Unknown`].
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl From<&str> for VisualizationType {
    fn from(name: &str) -> Self {
        let trimmed = name.trim();
        Self::KNOWN
            .iter()
            .find(|t| t.as_str() == trimmed)
            .cloned()
            .unwrap_or_else(|| Self::Unknown(trimmed.to_string()))
    }
}

impl FromStr for VisualizationType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for VisualizationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for VisualizationType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for VisualizationType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::from(name.as_str()))
    }
}

/// The canonical payload families. Several visualization types share one shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataShape {
    NodeLink,
    Hierarchy,
    Axis,
    PieFunnel,
    WordCloud,
    Calendar,
    Scatter,
    Timeline,
}

impl fmt::Display for DataShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NodeLink => "node-link",
            Self::Hierarchy => "hierarchy",
            Self::Axis => "axis",
            Self::PieFunnel => "pie/funnel",
            Self::WordCloud => "word-cloud",
            Self::Calendar => "calendar",
            Self::Scatter => "scatter",
            Self::Timeline => "timeline",
        };
        f.write_str(name)
    }
}

/// A single visualization type or a list of types sharing the same data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeSelection {
    One(VisualizationType),
    Many(Vec<VisualizationType>),
}

impl TypeSelection {
    /// The type used to pick a transformer: the single type, or the first of a list.
    pub fn primary(&self) -> Option<&VisualizationType> {
        match self {
            Self::One(t) => Some(t),
            Self::Many(types) => types.first(),
        }
    }

    /// All selected types, in order.
    pub fn types(&self) -> &[VisualizationType] {
        match self {
            Self::One(t) => std::slice::from_ref(t),
            Self::Many(types) => types,
        }
    }
}

impl From<VisualizationType> for TypeSelection {
    fn from(t: VisualizationType) -> Self {
        Self::One(t)
    }
}

impl From<Vec<VisualizationType>> for TypeSelection {
    fn from(types: Vec<VisualizationType>) -> Self {
        Self::Many(types)
    }
}

/// Node-link payload (sankey, force-directed graph, hierarchical edge bundling, matrix).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeLinkData {
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(
        default,
        deserialize_with = "lenient::opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<Label>>,
}

/// Matrix cell label attached to a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    #[serde(deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    #[serde(deserialize_with = "lenient::text")]
    pub source: String,
    #[serde(deserialize_with = "lenient::text")]
    pub target: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,
}

/// Hierarchy payload (treemap, sunburst).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HierarchyData {
    pub nodes: Vec<HierarchyNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchyNode {
    #[serde(deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub value: f64,
    #[serde(default, deserialize_with = "lenient::text")]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,
    /// `None` on leaves: a leaf never carries an empty `children` list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<HierarchyNode>>,
}

/// Axis chart payload (bar chart, line chart).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AxisChartData {
    #[serde(deserialize_with = "lenient::texts")]
    pub headers: Vec<String>,
    pub values: IndexMap<String, Vec<f64>>,
}

/// Pie chart and funnel payload.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PieChartData {
    pub values: IndexMap<String, f64>,
}

/// Funnels share the pie chart payload.
pub type FunnelData = PieChartData;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WordCloudData {
    pub words: Vec<Word>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    #[serde(deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CalendarData {
    pub calendar: Vec<CalendarEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEntry {
    /// ISO-8601 day, `YYYY-MM-DD`.
    #[serde(deserialize_with = "lenient::text")]
    pub date: String,
    #[serde(default = "one", deserialize_with = "lenient::number")]
    pub value: f64,
    #[serde(default, deserialize_with = "lenient::text")]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,
}

fn one() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScatterData {
    pub points: Vec<ScatterPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterPoint {
    pub value: Vec<f64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,
}

/// Timeline payload: events grouped by day key, in first-seen order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimelineData {
    pub days: IndexMap<String, TimelineDay>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TimelineDay {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<TimelineSummary>,
    #[serde(default)]
    pub events: Vec<TimelineEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineSummary {
    #[serde(default, deserialize_with = "lenient::text")]
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    #[serde(default, deserialize_with = "lenient::text")]
    pub summary: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub date: String,
    #[serde(rename = "type", default, deserialize_with = "lenient::text")]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<TimelineTag>>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineTag {
    #[serde(deserialize_with = "lenient::text")]
    pub name: String,
}

/// Canonical payload of one visualization.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum VisualizationData {
    NodeLink(NodeLinkData),
    Hierarchy(HierarchyData),
    Axis(AxisChartData),
    PieFunnel(PieChartData),
    WordCloud(WordCloudData),
    Calendar(CalendarData),
    Scatter(ScatterData),
    Timeline(TimelineData),
}

impl VisualizationData {
    pub fn shape(&self) -> DataShape {
        match self {
            Self::NodeLink(_) => DataShape::NodeLink,
            Self::Hierarchy(_) => DataShape::Hierarchy,
            Self::Axis(_) => DataShape::Axis,
            Self::PieFunnel(_) => DataShape::PieFunnel,
            Self::WordCloud(_) => DataShape::WordCloud,
            Self::Calendar(_) => DataShape::Calendar,
            Self::Scatter(_) => DataShape::Scatter,
            Self::Timeline(_) => DataShape::Timeline,
        }
    }
}

/// Caller-supplied metadata. Only the fields that are set take part in the overlay.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VisualizationUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<TypeSelection>,
}

/// Transformer output: canonical data plus whatever metadata the file itself carried.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualizationDraft {
    pub name: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub kind: Option<TypeSelection>,
    pub data: VisualizationData,
}

impl VisualizationDraft {
    /// A draft carrying data only; metadata comes from elsewhere.
    pub fn data_only(data: VisualizationData) -> Self {
        Self {
            name: None,
            description: None,
            tags: None,
            kind: None,
            data,
        }
    }
}

/// A draft bound to a project, with caller metadata merged in, awaiting validation.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualizationCandidate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub kind: Option<TypeSelection>,
    pub data: VisualizationData,
    pub project_name: String,
}

/// A validated visualization record, ready to be upserted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualizationCreate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub tags: Vec<String>,
    #[serde(rename = "type")]
    pub kind: TypeSelection,
    pub data: VisualizationData,
    pub project_name: String,
}

/// Lenient deserializers: uploaded documents are loosely typed, so numbers may arrive as strings and
/// names/categories as numbers.
mod lenient {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn value_to_text(v: &Value) -> Option<String> {
        match v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        let v = Value::deserialize(d)?;
        match v {
            Value::Null => Ok(String::new()),
            ref other => value_to_text(other)
                .ok_or_else(|| D::Error::custom(format!("expected string, got {other}"))),
        }
    }

    pub fn opt_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        let v = Value::deserialize(d)?;
        match v {
            Value::Null => Ok(None),
            ref other => value_to_text(other)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("expected string, got {other}"))),
        }
    }

    pub fn texts<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
        let items = Vec::<Value>::deserialize(d)?;
        items
            .iter()
            .map(|v| {
                value_to_text(v).ok_or_else(|| D::Error::custom(format!("expected string, got {v}")))
            })
            .collect()
    }

    pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        let v = Value::deserialize(d)?;
        match &v {
            Value::Number(n) => n
                .as_f64()
                .ok_or_else(|| D::Error::custom(format!("number out of range: {n}"))),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|e| D::Error::custom(format!("expected number, got '{s}': {e}"))),
            Value::Null => Ok(0.0),
            other => Err(D::Error::custom(format!("expected number, got {other}"))),
        }
    }
}
