//! Stable indexing for trajectory columns.
//!
//! Provides bidirectional mappings between state/control names and their
//! contiguous column in a state or control vector (0..N).

use std::collections::HashMap;

use crate::model::{Actuator, Coordinate};

/// Column map for state variables and controls, in system order.
///
/// States are ordered coordinate by coordinate (`value`, then `speed`),
/// followed by the activation state of every actuator that has one.
/// Controls follow actuator order.
#[derive(Debug, Clone, Default)]
pub struct StateIndex {
    state_names: Vec<String>,
    control_names: Vec<String>,
    state_to_idx: HashMap<String, usize>,
    control_to_idx: HashMap<String, usize>,
}

impl StateIndex {
    pub(crate) fn new(coordinates: &[Coordinate], actuators: &[Actuator]) -> Self {
        let mut state_names = Vec::with_capacity(2 * coordinates.len());
        for coord in coordinates {
            state_names.push(coord.value_state_name());
            state_names.push(coord.speed_state_name());
        }
        state_names.extend(actuators.iter().filter_map(Actuator::activation_state_name));

        let control_names: Vec<String> = actuators.iter().map(|a| a.path.clone()).collect();

        let state_to_idx = state_names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), i))
            .collect();
        let control_to_idx = control_names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), i))
            .collect();

        Self {
            state_names,
            control_names,
            state_to_idx,
            control_to_idx,
        }
    }

    pub fn num_states(&self) -> usize {
        self.state_names.len()
    }

    pub fn num_controls(&self) -> usize {
        self.control_names.len()
    }

    pub fn state_names(&self) -> &[String] {
        &self.state_names
    }

    pub fn control_names(&self) -> &[String] {
        &self.control_names
    }

    pub fn state_idx(&self, name: &str) -> Option<usize> {
        self.state_to_idx.get(name).copied()
    }

    pub fn control_idx(&self, name: &str) -> Option<usize> {
        self.control_to_idx.get(name).copied()
    }
}
