//! Choropleth map document.
//!
//! The map is a Vega-Lite spec rendered in the browser: world shapes come
//! from a TopoJSON layer and each shape looks up its country row by region
//! id. The server only assembles the spec and wraps it in an embeddable
//! HTML page.

use joymap_data::{CountryRecord, Dataset, COL_COUNTRY, COL_DELTA_HAPPY, COL_HAPPINESS_RANK};
use serde::Serialize;
use serde_json::{json, Value};

use crate::geometry::{self, GeometryIndex, JoinMismatch, COUNTRIES_FEATURE};

/// world-110m shapes keyed by ISO 3166-1 numeric id.
pub const DEFAULT_GEOMETRY_URL: &str =
    "https://cdn.jsdelivr.net/npm/vega-datasets@v1.29.0/data/world-110m.json";

const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";
const SELECTION: &str = "map_click";

/// Fixed color domain for the happiness delta.
pub const COLOR_DOMAIN: [f64; 2] = [0.0, 10.0];
pub const COLOR_SCHEME: &str = "redyellowgreen";

/// Fields looked up onto each shape, also shown in the tooltip.
pub const LOOKUP_FIELDS: [&str; 3] = [COL_COUNTRY, COL_DELTA_HAPPY, COL_HAPPINESS_RANK];

/// Rendering options for the map.
#[derive(Debug, Clone)]
pub struct MapOptions {
    pub geometry_url: String,
    pub width: u32,
    pub height: u32,
    pub projection: String,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            geometry_url: DEFAULT_GEOMETRY_URL.to_string(),
            width: 700,
            height: 350,
            projection: "naturalEarth1".to_string(),
        }
    }
}

/// One inline lookup row.
#[derive(Debug, Clone, PartialEq, Serialize)]
struct LookupRow {
    id: u32,
    #[serde(rename = "Country")]
    country: String,
    #[serde(rename = "Delta_happy")]
    delta_happy: f64,
    #[serde(rename = "Happiness_rank")]
    happiness_rank: u32,
}

impl From<&CountryRecord> for LookupRow {
    fn from(record: &CountryRecord) -> Self {
        Self {
            id: record.region_id,
            country: record.country.clone(),
            delta_happy: record.delta_happy,
            happiness_rank: record.happiness_rank,
        }
    }
}

/// The map layer derived from the dataset: rows joined onto geometry.
#[derive(Debug, Clone)]
pub struct MapLayer {
    options: MapOptions,
    rows: Vec<LookupRow>,
    mismatches: Vec<JoinMismatch>,
    local_geometry: bool,
}

impl MapLayer {
    /// Join the dataset onto the geometry layer.
    ///
    /// Rows without a shape are dropped from the map and reported; they stay
    /// in the dataset for ranking.
    pub fn new(dataset: &Dataset, geometry: Option<&GeometryIndex>, options: MapOptions) -> Self {
        let (matched, mismatches) = geometry::join(geometry, dataset.records());
        for mismatch in &mismatches {
            tracing::warn!(
                region_id = mismatch.region_id,
                country = %mismatch.country,
                "No geometry for region, excluded from map"
            );
        }
        Self {
            options,
            rows: matched.into_iter().map(LookupRow::from).collect(),
            mismatches,
            local_geometry: geometry.is_some(),
        }
    }

    pub fn options(&self) -> &MapOptions {
        &self.options
    }

    pub fn mismatches(&self) -> &[JoinMismatch] {
        &self.mismatches
    }

    /// Number of countries drawn on the map.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Whether rows were checked against a local geometry file.
    pub fn has_local_geometry(&self) -> bool {
        self.local_geometry
    }

    /// The Vega-Lite specification.
    pub fn spec(&self) -> Value {
        json!({
            "$schema": VEGA_LITE_SCHEMA,
            "width": self.options.width,
            "height": self.options.height,
            "data": {
                "url": self.options.geometry_url,
                "format": {"type": "topojson", "feature": COUNTRIES_FEATURE}
            },
            "mark": {"type": "geoshape", "stroke": "black", "strokeWidth": 0.5},
            "projection": {"type": self.options.projection},
            "params": [{
                "name": SELECTION,
                "select": {"type": "point", "fields": ["id"]}
            }],
            "transform": [{
                "lookup": "id",
                "from": {
                    "data": {"values": self.rows},
                    "key": "id",
                    "fields": LOOKUP_FIELDS
                }
            }],
            "encoding": {
                "color": {
                    "field": COL_DELTA_HAPPY,
                    "type": "quantitative",
                    "scale": {"domain": COLOR_DOMAIN, "scheme": COLOR_SCHEME},
                    "legend": {"title": "Happiness"}
                },
                "opacity": {
                    "condition": {"param": SELECTION, "value": 1},
                    "value": 0.2
                },
                "tooltip": [
                    {"field": COL_COUNTRY, "type": "nominal", "title": "Country"},
                    {"field": COL_DELTA_HAPPY, "type": "quantitative", "title": "Happiness"},
                    {"field": COL_HAPPINESS_RANK, "type": "quantitative", "title": "Rank"}
                ]
            }
        })
    }

    /// Self-contained HTML page embedding the map, suitable for an iframe `srcdoc`.
    pub fn to_html(&self) -> String {
        // `</` inside the inline script would end the script element early.
        let spec = self.spec().to_string().replace("</", "<\\/");
        format!(
            r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <style>.error {{ color: red; }}</style>
  <script type="text/javascript" src="https://cdn.jsdelivr.net/npm/vega@5"></script>
  <script type="text/javascript" src="https://cdn.jsdelivr.net/npm/vega-lite@5"></script>
  <script type="text/javascript" src="https://cdn.jsdelivr.net/npm/vega-embed@6"></script>
</head>
<body>
  <div id="vis"></div>
  <script type="text/javascript">
    (function(vegaEmbed) {{
      var spec = {spec};
      var embedOpt = {{"mode": "vega-lite"}};
      function showError(el, error) {{
        el.innerHTML = '<div class="error">' + error.message + '</div>';
        throw error;
      }}
      var el = document.getElementById("vis");
      vegaEmbed(el, spec, embedOpt).catch(function(error) {{ showError(el, error); }});
    }})(vegaEmbed);
  </script>
</body>
</html>
"#
        )
    }
}
