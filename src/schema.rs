use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::design::Transform;
use crate::variable::MeasurementKind;

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub kind: MeasurementKind,
    pub transform: Option<Transform>,
}

/// Column descriptors by variable name: the output of a data-schema query.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct DataSchema {
    pub columns: BTreeMap<String, ColumnSchema>,
}

impl DataSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.get(name)
    }

    pub fn set_kind(&mut self, name: &str, kind: MeasurementKind) {
        self.columns
            .entry(name.to_string())
            .and_modify(|c| c.kind = kind)
            .or_insert(ColumnSchema { kind, transform: None });
    }

    /// Record a transform; `kind` is used if the column is not yet known.
    pub fn set_transform(&mut self, name: &str, kind: MeasurementKind, transform: Transform) {
        self.columns
            .entry(name.to_string())
            .or_insert(ColumnSchema { kind, transform: None })
            .transform = Some(transform);
    }
}

impl fmt::Display for DataSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, column) in &self.columns {
            match column.transform {
                Some(t) => writeln!(f, "{}: {} ({})", name, column.kind, t)?,
                None => writeln!(f, "{}: {}", name, column.kind)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns() {
        let mut schema = DataSchema::new();
        schema.set_transform("Income", MeasurementKind::Numeric, Transform::Log);
        schema.set_kind("Race", MeasurementKind::Nominal);
        schema.set_kind("Income", MeasurementKind::Numeric);
        assert_eq!(schema.column("Income").unwrap().transform, Some(Transform::Log));
        assert_eq!(schema.to_string(), "Income: numeric (LogTransform)\nRace: nominal\n");
    }
}
