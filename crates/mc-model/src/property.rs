//! Named numeric properties carried by model components.
//!
//! Design parameters reach into the model through these: a parameter names a
//! component path and a property, and writes a value before each solve.

use std::collections::BTreeMap;

use mc_core::Real;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertyValue {
    Scalar(Real),
    Vec3([Real; 3]),
}

impl PropertyValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            PropertyValue::Scalar(_) => "scalar",
            PropertyValue::Vec3(_) => "vec3",
        }
    }

    pub fn as_scalar(&self) -> Option<Real> {
        match self {
            PropertyValue::Scalar(v) => Some(*v),
            PropertyValue::Vec3(_) => None,
        }
    }

    pub fn as_vec3(&self) -> Option<[Real; 3]> {
        match self {
            PropertyValue::Vec3(v) => Some(*v),
            PropertyValue::Scalar(_) => None,
        }
    }
}

/// Property table of one component, iterated in name order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertySet {
    values: BTreeMap<String, PropertyValue>,
}

impl PropertySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn empty() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    pub fn with(mut self, name: &str, value: PropertyValue) -> Self {
        self.values.insert(name.to_string(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.values.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut PropertyValue> {
        self.values.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
