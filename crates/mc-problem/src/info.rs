//! Bounds declarations for variables and constraint equations.

use mc_core::{Bounds, FinalBounds, InitialBounds};

/// Bounds on one decision variable (state, control, multiplier or parameter).
///
/// `initial` and `final_` further restrict the variable at the first and last
/// time point; `None` means only `bounds` applies there.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableInfo {
    name: String,
    bounds: Bounds,
    initial: Option<InitialBounds>,
    final_: Option<FinalBounds>,
}

impl VariableInfo {
    pub fn new(
        name: impl Into<String>,
        bounds: Bounds,
        initial: Option<InitialBounds>,
        final_: Option<FinalBounds>,
    ) -> Self {
        Self {
            name: name.into(),
            bounds,
            initial,
            final_,
        }
    }

    pub fn with_bounds(name: impl Into<String>, bounds: Bounds) -> Self {
        Self::new(name, bounds, None, None)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn initial_bounds(&self) -> Option<InitialBounds> {
        self.initial
    }

    pub fn final_bounds(&self) -> Option<FinalBounds> {
        self.final_
    }

    /// One-line summary, e.g. `/jointset/j/q/value. bounds: [-1, 1] initial: 0`.
    pub fn describe(&self) -> String {
        let mut line = format!("{}. bounds: {}", self.name, self.bounds);
        if let Some(InitialBounds(b)) = self.initial {
            line.push_str(&format!(" initial: {b}"));
        }
        if let Some(FinalBounds(b)) = self.final_ {
            line.push_str(&format!(" final: {b}"));
        }
        line
    }
}

/// Bounds on a block of scalar constraint equations.
///
/// The number of equations is the length of the bounds vector. Suffixes,
/// when present, label each equation (one per bound).
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintInfo {
    name: String,
    bounds: Vec<Bounds>,
    suffixes: Option<Vec<String>>,
}

impl ConstraintInfo {
    pub fn new(name: impl Into<String>, bounds: Vec<Bounds>) -> Self {
        Self {
            name: name.into(),
            bounds,
            suffixes: None,
        }
    }

    /// Same bounds applied to each of `count` equations.
    pub fn uniform(name: impl Into<String>, count: usize, bounds: Bounds) -> Self {
        Self::new(name, vec![bounds; count])
    }

    /// Attach per-equation labels. Ignored unless there is one per equation.
    pub fn with_suffixes(mut self, suffixes: Vec<String>) -> Self {
        if suffixes.len() == self.bounds.len() {
            self.suffixes = Some(suffixes);
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn num_equations(&self) -> usize {
        self.bounds.len()
    }

    pub fn bounds(&self) -> &[Bounds] {
        &self.bounds
    }

    pub fn suffixes(&self) -> Option<&[String]> {
        self.suffixes.as_deref()
    }

    /// Labels of the form `<name>_<suffix>`, or `<name>_<i>` without suffixes.
    pub fn equation_labels(&self) -> Vec<String> {
        match &self.suffixes {
            Some(suffixes) => suffixes
                .iter()
                .map(|s| format!("{}_{s}", self.name))
                .collect(),
            None => (0..self.num_equations())
                .map(|i| format!("{}_{i}", self.name))
                .collect(),
        }
    }

    pub fn describe(&self) -> String {
        let bounds: Vec<String> = self.bounds.iter().map(|b| b.to_string()).collect();
        format!(
            "{}. number of scalar equations: {}. bounds: {}",
            self.name,
            self.num_equations(),
            bounds.join(", ")
        )
    }
}
