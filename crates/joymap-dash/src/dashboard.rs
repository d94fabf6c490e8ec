//! Dashboard session: control state, bindings and serial dispatch.

use std::sync::Arc;

use joymap_data::{Dataset, Metric};
use joymap_rank::Ranking;
use serde::{Deserialize, Serialize};

use crate::binding::{Binding, BindingTable, Context, Input, Output, Snapshot, Value};
use crate::config::DashConfig;
use crate::controls::{ControlState, Weight};
use crate::error::Result;
use crate::geometry::{GeometryIndex, COUNTRIES_FEATURE};
use crate::map::{MapLayer, MapOptions};

/// Upper bound on cascade rounds (reset → sliders → views is two).
const MAX_ROUNDS: usize = 8;

/// A user interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A slider moved; out-of-range values are clamped
    SliderChanged { control: Metric, value: i64 },
    /// The reset button was pressed
    ResetClicked,
}

/// Outputs written by one dispatch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Render {
    /// Slider positions after the dispatch
    pub controls: ControlState,
    /// Names of the bindings that ran, in order
    pub triggered: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_document: Option<String>,
}

/// One user's dashboard.
///
/// Clones share the dataset and map layer.
#[derive(Debug, Clone)]
pub struct Dashboard {
    dataset: Arc<Dataset>,
    map: Arc<MapLayer>,
    bindings: BindingTable,
    controls: ControlState,
    reset_clicks: u64,
}

impl Dashboard {
    /// Create a session with the list, reset and map bindings registered.
    pub fn new(dataset: Arc<Dataset>, map: MapLayer) -> Self {
        let mut dashboard = Self::with_bindings(dataset, map, BindingTable::new());
        for binding in default_bindings() {
            dashboard.register(binding);
        }
        dashboard
    }

    /// Load the dataset (and optional local geometry) named by the config.
    ///
    /// Any failure here is fatal: the dashboard does not start without data.
    pub fn from_config(config: &DashConfig) -> Result<Self> {
        let dataset = Dataset::load(&config.data_path)?;
        let geometry = config
            .geometry_path
            .as_ref()
            .map(|path| GeometryIndex::load(path, COUNTRIES_FEATURE))
            .transpose()?;

        let options = MapOptions {
            geometry_url: config.geometry_url.clone(),
            ..MapOptions::default()
        };
        let map = MapLayer::new(&dataset, geometry.as_ref(), options);
        if !map.mismatches().is_empty() {
            tracing::warn!(
                excluded = map.mismatches().len(),
                "Some countries have no geometry and are left off the map"
            );
        }

        Ok(Self::new(Arc::new(dataset), map))
    }

    /// Create a session with a custom binding table.
    pub fn with_bindings(dataset: Arc<Dataset>, map: MapLayer, bindings: BindingTable) -> Self {
        Self {
            dataset,
            map: Arc::new(map),
            bindings,
            controls: ControlState::default(),
            reset_clicks: 0,
        }
    }

    pub fn register(&mut self, binding: Binding) {
        self.bindings.register(binding);
    }

    /// A new session over the same data and bindings, with default controls.
    pub fn session(&self) -> Self {
        Self {
            controls: ControlState::default(),
            reset_clicks: 0,
            ..self.clone()
        }
    }

    pub fn controls(&self) -> ControlState {
        self.controls
    }

    pub fn reset_clicks(&self) -> u64 {
        self.reset_clicks
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn map(&self) -> &MapLayer {
        &self.map
    }

    pub fn bindings(&self) -> &BindingTable {
        &self.bindings
    }

    /// Current ranking for the slider positions.
    pub fn ranking(&self) -> Ranking {
        Ranking::compute(self.controls.weights(), self.dataset.records())
    }

    /// Render the page as it first loads.
    ///
    /// The sliders go back to their layout defaults and the reset binding
    /// fires once with an unchanged click count, cascading into list and map.
    pub fn initial_render(&mut self) -> Render {
        tracing::debug!("Page load render");
        self.controls = ControlState::default();
        self.propagate(vec![Input::ResetButton])
    }

    /// Apply an event and re-run the bindings it affects.
    pub fn dispatch(&mut self, event: Event) -> Render {
        tracing::debug!(?event, "Dispatching event");
        let changed = match event {
            Event::SliderChanged { control, value } => {
                self.controls.set(control, Weight::clamped(value));
                vec![Input::Slider(control)]
            }
            Event::ResetClicked => {
                self.reset_clicks += 1;
                vec![Input::ResetButton]
            }
        };
        self.propagate(changed)
    }

    fn propagate(&mut self, mut changed: Vec<Input>) -> Render {
        let mut render = Render::default();

        for _ in 0..MAX_ROUNDS {
            if changed.is_empty() {
                break;
            }

            let context = Context {
                snapshot: Snapshot {
                    controls: self.controls,
                    reset_clicks: self.reset_clicks,
                },
                dataset: &self.dataset,
                map: &*self.map,
            };

            let mut written = Vec::new();
            for binding in self.bindings.triggered(&changed) {
                let values = (binding.handler)(&context);
                if values.len() != binding.outputs.len() {
                    tracing::warn!(
                        binding = binding.name,
                        expected = binding.outputs.len(),
                        got = values.len(),
                        "Binding returned wrong number of values"
                    );
                }
                render.triggered.push(binding.name);
                written.extend(binding.outputs.iter().copied().zip(values));
            }

            let mut next = Vec::new();
            for (output, value) in written {
                match (output, value) {
                    (Output::Slider(control), Value::Weight(weight)) => {
                        self.controls.set(control, weight);
                        let input = Input::Slider(control);
                        if !next.contains(&input) {
                            next.push(input);
                        }
                    }
                    (Output::ListText, Value::Text(text)) => render.list_text = Some(text),
                    (Output::MapDocument, Value::Text(html)) => render.map_document = Some(html),
                    (output, value) => {
                        tracing::warn!(?output, ?value, "Ignoring value of wrong kind for output");
                    }
                }
            }
            changed = next;
        }

        if !changed.is_empty() {
            tracing::warn!(pending = changed.len(), "Binding cascade did not settle");
        }

        render.controls = self.controls;
        render
    }
}

/// The dashboard's standard bindings: list, reset and map.
pub fn default_bindings() -> Vec<Binding> {
    let sliders: Vec<Input> = Metric::ALL.map(Input::Slider).to_vec();
    vec![
        Binding::new("list", sliders.clone(), vec![Output::ListText], list_handler),
        Binding::new(
            "reset",
            vec![Input::ResetButton],
            Metric::ALL.map(Output::Slider).to_vec(),
            reset_handler,
        ),
        Binding::new("map", sliders, vec![Output::MapDocument], map_handler),
    ]
}

fn list_handler(context: &Context<'_>) -> Vec<Value> {
    let ranking = Ranking::compute(context.snapshot.controls.weights(), context.dataset.records());
    vec![Value::Text(ranking.display())]
}

fn reset_handler(_context: &Context<'_>) -> Vec<Value> {
    vec![Value::Weight(Weight::DEFAULT); 3]
}

// Weights are declared inputs so the map refreshes with the sliders, but the
// document depends only on the dataset.
fn map_handler(context: &Context<'_>) -> Vec<Value> {
    vec![Value::Text(context.map.to_html())]
}
