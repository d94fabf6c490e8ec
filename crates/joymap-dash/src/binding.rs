//! Declared reactive bindings.
//!
//! A binding names the inputs it listens to, the outputs it writes and a
//! pure handler. The [`BindingTable`] keeps them in registration order; the
//! dashboard re-invokes every binding whose inputs changed, passing the
//! latest snapshot of all inputs.

use joymap_data::{Dataset, Metric};
use serde::Serialize;

use crate::controls::{ControlState, Weight};
use crate::map::MapLayer;

/// Something a binding can listen to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Input {
    Slider(Metric),
    ResetButton,
}

/// Something a binding can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Output {
    Slider(Metric),
    ListText,
    MapDocument,
}

/// A value produced for one output.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Weight(Weight),
    Text(String),
}

/// Latest value of every input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub controls: ControlState,
    pub reset_clicks: u64,
}

/// Everything a handler may read: the input snapshot and the read-only data.
pub struct Context<'a> {
    pub snapshot: Snapshot,
    pub dataset: &'a Dataset,
    pub map: &'a MapLayer,
}

/// Handler signature: one value per declared output, in order.
pub type Handler = fn(&Context<'_>) -> Vec<Value>;

/// A declared dependency from inputs to outputs.
#[derive(Clone)]
pub struct Binding {
    pub name: &'static str,
    pub inputs: Vec<Input>,
    pub outputs: Vec<Output>,
    pub handler: Handler,
}

impl Binding {
    pub fn new(name: &'static str, inputs: Vec<Input>, outputs: Vec<Output>, handler: Handler) -> Self {
        Self {
            name,
            inputs,
            outputs,
            handler,
        }
    }

    /// Whether any of this binding's inputs is in `changed`.
    pub fn listens_to(&self, changed: &[Input]) -> bool {
        self.inputs.iter().any(|input| changed.contains(input))
    }
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("name", &self.name)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .finish()
    }
}

/// Registered bindings, dispatched in registration order.
#[derive(Debug, Clone, Default)]
pub struct BindingTable {
    bindings: Vec<Binding>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, binding: Binding) {
        tracing::debug!(binding = binding.name, "Registered binding");
        self.bindings.push(binding);
    }

    /// Bindings triggered by a set of changed inputs.
    pub fn triggered<'a>(&'a self, changed: &'a [Input]) -> impl Iterator<Item = &'a Binding> + 'a {
        self.bindings.iter().filter(move |b| b.listens_to(changed))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &Context<'_>) -> Vec<Value> {
        Vec::new()
    }

    #[test]
    fn triggered_filters_by_inputs() {
        let mut table = BindingTable::new();
        table.register(Binding::new(
            "health_only",
            vec![Input::Slider(Metric::Health)],
            vec![Output::ListText],
            noop,
        ));
        table.register(Binding::new(
            "reset",
            vec![Input::ResetButton],
            vec![Output::Slider(Metric::Health)],
            noop,
        ));

        let changed = [Input::Slider(Metric::Health)];
        let names: Vec<_> = table.triggered(&changed).map(|b| b.name).collect();
        assert_eq!(names, vec!["health_only"]);

        let changed = [Input::Slider(Metric::Economy)];
        assert_eq!(table.triggered(&changed).count(), 0);
    }

    #[test]
    fn registration_order_is_kept() {
        let mut table = BindingTable::new();
        for name in ["a", "b", "c"] {
            table.register(Binding::new(name, vec![Input::ResetButton], vec![], noop));
        }
        let names: Vec<_> = table.iter().map(|b| b.name).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(table.len(), 3);
    }
}
