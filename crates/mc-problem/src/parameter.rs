//! Design parameters: scalars written into model properties.

use mc_core::{Bounds, Real};
use mc_model::{Model, PropertyValue};

use crate::error::{ProblemError, ProblemResult};
use crate::info::VariableInfo;

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    /// Every component whose property receives the value.
    pub component_paths: Vec<String>,
    pub property_name: String,
    /// Element index for vec3 properties; must be `None` for scalars.
    pub property_element: Option<usize>,
    pub bounds: Bounds,
}

impl Parameter {
    pub fn new(
        name: impl Into<String>,
        component_paths: Vec<String>,
        property_name: impl Into<String>,
        bounds: Bounds,
    ) -> Self {
        Self {
            name: name.into(),
            component_paths,
            property_name: property_name.into(),
            property_element: None,
            bounds,
        }
    }

    pub fn with_element(mut self, element: usize) -> Self {
        self.property_element = Some(element);
        self
    }

    /// Check every target exists and carries a compatible property.
    pub fn bind(&self, model: &Model) -> ProblemResult<BoundParameter> {
        if self.component_paths.is_empty() {
            return Err(ProblemError::Configuration {
                owner: self.name.clone(),
                what: "no component paths given".into(),
            });
        }
        for path in &self.component_paths {
            if model.find(path).is_none() {
                return Err(ProblemError::UnknownComponent {
                    owner: self.name.clone(),
                    path: path.clone(),
                });
            }
            let value = model
                .property(path, &self.property_name)
                .map_err(|_| ProblemError::Property {
                    owner: self.name.clone(),
                    reason: format!("'{path}' has no property '{}'", self.property_name),
                })?;
            match (value, self.property_element) {
                (PropertyValue::Scalar(_), None) => {}
                (PropertyValue::Scalar(_), Some(_)) => {
                    return Err(ProblemError::Property {
                        owner: self.name.clone(),
                        reason: format!(
                            "property '{}' of '{path}' is a scalar; no element index allowed",
                            self.property_name
                        ),
                    });
                }
                (PropertyValue::Vec3(_), Some(element)) if element < 3 => {}
                (PropertyValue::Vec3(_), element) => {
                    return Err(ProblemError::Property {
                        owner: self.name.clone(),
                        reason: format!(
                            "property '{}' of '{path}' is a vec3; element index in 0..3 required, got {element:?}",
                            self.property_name
                        ),
                    });
                }
            }
        }
        Ok(BoundParameter {
            name: self.name.clone(),
            component_paths: self.component_paths.clone(),
            property_name: self.property_name.clone(),
            property_element: self.property_element,
            info: VariableInfo::with_bounds(self.name.clone(), self.bounds),
        })
    }
}

/// A parameter whose targets were checked against a model.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundParameter {
    name: String,
    component_paths: Vec<String>,
    property_name: String,
    property_element: Option<usize>,
    info: VariableInfo,
}

impl BoundParameter {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn component_paths(&self) -> &[String] {
        &self.component_paths
    }

    pub fn property_name(&self) -> &str {
        &self.property_name
    }

    pub fn property_element(&self) -> Option<usize> {
        self.property_element
    }

    pub fn bounds(&self) -> Bounds {
        self.info.bounds()
    }

    pub fn variable_info(&self) -> &VariableInfo {
        &self.info
    }

    /// Write `value` into the property of every target component.
    pub fn apply(&self, model: &mut Model, value: Real) -> ProblemResult<()> {
        for path in &self.component_paths {
            match self.property_element {
                None => model.set_scalar_property(path, &self.property_name, value)?,
                Some(element) => {
                    model.set_vec3_element(path, &self.property_name, element, value)?
                }
            }
        }
        Ok(())
    }

    pub fn describe(&self) -> String {
        let element = self
            .property_element
            .map(|e| format!("[{e}]"))
            .unwrap_or_default();
        format!(
            "{}. model property: {}{} of {}. bounds: {}",
            self.name,
            self.property_name,
            element,
            self.component_paths.join(", "),
            self.bounds()
        )
    }
}
