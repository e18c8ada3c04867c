use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::fact::Predicate;

/// How a variable is measured.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementKind {
    Nominal,
    Ordinal,
    Numeric,
}

impl MeasurementKind {
    pub const ALL: [MeasurementKind; 3] = [
        MeasurementKind::Nominal,
        MeasurementKind::Ordinal,
        MeasurementKind::Numeric,
    ];

    /// The data-type predicate asserting this kind.
    pub fn predicate(self) -> Predicate {
        match self {
            MeasurementKind::Nominal => Predicate::Nominal,
            MeasurementKind::Ordinal => Predicate::Ordinal,
            MeasurementKind::Numeric => Predicate::Numeric,
        }
    }
}

impl fmt::Display for MeasurementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeasurementKind::Nominal => write!(f, "nominal"),
            MeasurementKind::Ordinal => write!(f, "ordinal"),
            MeasurementKind::Numeric => write!(f, "numeric"),
        }
    }
}

/// A measured (or conceptual) variable, identified by its name.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    name: String,
    kind: MeasurementKind,
    categories: Option<Vec<String>>,
    column: Option<String>,
}

impl Variable {
    pub fn new(name: impl Into<String>, kind: MeasurementKind) -> Self {
        Self {
            name: name.into(),
            kind,
            categories: None,
            column: None,
        }
    }

    pub fn nominal(name: impl Into<String>) -> Self {
        Self::new(name, MeasurementKind::Nominal)
    }

    pub fn numeric(name: impl Into<String>) -> Self {
        Self::new(name, MeasurementKind::Numeric)
    }

    /// Ordinal variable with the given category order (lowest first).
    pub fn ordinal<S: Into<String>>(name: impl Into<String>, order: impl IntoIterator<Item = S>) -> Self {
        Self::new(name, MeasurementKind::Ordinal).with_categories(order)
    }

    pub fn with_categories<S: Into<String>>(mut self, categories: impl IntoIterator<Item = S>) -> Self {
        self.categories = Some(categories.into_iter().map(Into::into).collect());
        self
    }

    /// Bind the variable to a named data column.
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> MeasurementKind {
        self.kind
    }

    pub fn categories(&self) -> Option<&[String]> {
        self.categories.as_deref()
    }

    /// Column holding this variable's data: the bound column, or the name.
    pub fn column(&self) -> &str {
        self.column.as_deref().unwrap_or(&self.name)
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.kind)
    }
}

/// Variables by name.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct VariableRegistry {
    variables: BTreeMap<String, Variable>,
}

impl VariableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable; returns `false` if one with this name already exists.
    pub fn insert(&mut self, variable: Variable) -> bool {
        if self.variables.contains_key(variable.name()) {
            return false;
        }
        self.variables.insert(variable.name().to_string(), variable);
        true
    }

    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    pub fn lookup(&self, name: &str) -> Result<&Variable> {
        self.get(name).ok_or_else(|| Error::Lookup(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Variables in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.variables.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }

    pub fn extend(&mut self, other: &VariableRegistry) {
        for variable in other.iter() {
            self.insert(variable.clone());
        }
    }
}

impl FromIterator<Variable> for VariableRegistry {
    fn from_iter<I: IntoIterator<Item = Variable>>(iter: I) -> Self {
        let mut registry = VariableRegistry::new();
        for variable in iter {
            registry.insert(variable);
        }
        registry
    }
}
