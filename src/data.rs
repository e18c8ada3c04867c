//! Dataset collaborator interface and model-data assembly.
//!
//! Reading files is left to the caller: anything that can hand out columns
//! by name is a [`DataSource`].

use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use crate::error::{Error, Result};
use crate::model::StatisticalModelSpec;
use crate::variable::VariableRegistry;

#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Numeric(Vec<f64>),
    Categorical(Vec<String>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(values) => values.len(),
            Column::Categorical(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of distinct values.
    pub fn num_levels(&self) -> usize {
        match self {
            Column::Numeric(values) => values.iter().map(|v| v.to_bits()).collect::<BTreeSet<_>>().len(),
            Column::Categorical(values) => values.iter().collect::<BTreeSet<_>>().len(),
        }
    }
}

pub trait DataSource {
    fn column(&self, name: &str) -> Option<Column>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryDataset {
    columns: BTreeMap<String, Column>,
}

impl InMemoryDataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_numeric(mut self, name: &str, values: impl IntoIterator<Item = f64>) -> Self {
        self.columns
            .insert(name.to_string(), Column::Numeric(values.into_iter().collect()));
        self
    }

    pub fn with_categorical<S: Into<String>>(mut self, name: &str, values: impl IntoIterator<Item = S>) -> Self {
        self.columns.insert(
            name.to_string(),
            Column::Categorical(values.into_iter().map(Into::into).collect()),
        );
        self
    }
}

impl DataSource for InMemoryDataset {
    fn column(&self, name: &str) -> Option<Column> {
        self.columns.get(name).cloned()
    }
}

/// The columns a model needs, by variable name, all of equal length.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelData {
    pub columns: BTreeMap<String, Column>,
    pub rows: usize,
}

impl ModelData {
    pub fn assemble(spec: &StatisticalModelSpec, registry: &VariableRegistry, source: &dyn DataSource) -> Result<Self> {
        let mut columns = BTreeMap::new();
        let mut rows: Option<(usize, &str)> = None;

        for name in spec.variables() {
            let variable = registry.lookup(name)?;
            let column = source.column(variable.column()).ok_or_else(|| Error::MissingColumn {
                variable: name.to_string(),
                column: variable.column().to_string(),
            })?;

            match rows {
                None => rows = Some((column.len(), name)),
                Some((n, first)) if n != column.len() => {
                    return Err(Error::DataShape(format!(
                        "column for '{}' has {} rows but '{}' has {}",
                        name,
                        column.len(),
                        first,
                        n
                    )));
                }
                Some(_) => {}
            }

            if let (Some(categories), Column::Categorical(values)) = (variable.categories(), &column) {
                if let Some(bad) = values.iter().find(|v| !categories.contains(v)) {
                    return Err(Error::DataShape(format!(
                        "value '{}' of '{}' is not one of its declared categories",
                        bad, name
                    )));
                }
            }

            columns.insert(name.to_string(), column);
        }

        for effect in &spec.random_effects {
            let groups = effect.groups();
            let levels = columns.get(groups).map_or(0, Column::num_levels);
            if levels < 2 {
                return Err(Error::DataShape(format!(
                    "grouping variable '{}' needs at least 2 levels, found {}",
                    groups, levels
                )));
            }
        }

        let rows = rows.map_or(0, |(n, _)| n);
        debug!("assembled {} columns of {} rows", columns.len(), rows);
        Ok(Self { columns, rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RandomEffect;
    use crate::variable::Variable;

    fn registry() -> VariableRegistry {
        [
            Variable::numeric("Math").with_column("math_score"),
            Variable::numeric("HW"),
            Variable::nominal("School"),
        ]
        .into_iter()
        .collect()
    }

    fn spec() -> StatisticalModelSpec {
        let mut spec = StatisticalModelSpec::new("Math");
        spec.add_main_effect("HW");
        spec.add_random_effect(RandomEffect::intercept("School"));
        spec
    }

    #[test]
    fn test_assemble() {
        let data = InMemoryDataset::new()
            .with_numeric("math_score", [50.0, 60.0, 70.0])
            .with_numeric("HW", [1.0, 2.0, 3.0])
            .with_categorical("School", ["a", "b", "a"]);
        let model_data = ModelData::assemble(&spec(), &registry(), &data).unwrap();
        assert_eq!(model_data.rows, 3);
        assert_eq!(model_data.columns.len(), 3);
        assert!(model_data.columns.contains_key("Math"));
    }

    #[test]
    fn test_missing_column() {
        let data = InMemoryDataset::new()
            .with_numeric("Math", [50.0])
            .with_numeric("HW", [1.0])
            .with_categorical("School", ["a"]);
        let err = ModelData::assemble(&spec(), &registry(), &data).unwrap_err();
        assert!(matches!(err, Error::MissingColumn { column, .. } if column == "math_score"));
    }

    #[test]
    fn test_ragged_and_single_group() {
        let ragged = InMemoryDataset::new()
            .with_numeric("math_score", [50.0, 60.0])
            .with_numeric("HW", [1.0])
            .with_categorical("School", ["a", "b"]);
        assert!(matches!(
            ModelData::assemble(&spec(), &registry(), &ragged),
            Err(Error::DataShape(_))
        ));

        let single = InMemoryDataset::new()
            .with_numeric("math_score", [50.0, 60.0])
            .with_numeric("HW", [1.0, 2.0])
            .with_categorical("School", ["a", "a"]);
        assert!(matches!(
            ModelData::assemble(&spec(), &registry(), &single),
            Err(Error::DataShape(_))
        ));
    }

    #[test]
    fn test_undeclared_category() {
        let mut spec = StatisticalModelSpec::new("Grade");
        spec.add_main_effect("HW");
        let registry: VariableRegistry = [Variable::ordinal("Grade", ["low", "high"]), Variable::numeric("HW")]
            .into_iter()
            .collect();
        let data = InMemoryDataset::new()
            .with_categorical("Grade", ["low", "medium"])
            .with_numeric("HW", [1.0, 2.0]);
        assert!(matches!(
            ModelData::assemble(&spec, &registry, &data),
            Err(Error::DataShape(_))
        ));
    }
}
