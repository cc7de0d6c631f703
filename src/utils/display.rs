//! Fixed-width port status table

use std::fmt;

use crate::port::{PortArena, PortId};

const COLUMN_WIDTH: usize = 24;
const RULE_WIDTH: usize = 3 * COLUMN_WIDTH + 4;

/// Snapshot of name, type and value of a list of ports
///
/// Rendering reads the arena once at construction and never touches
/// simulation state. Ports without a readable value show `-`.
#[derive(Debug, Clone, PartialEq)]
pub struct PortTable {
    rows: Vec<[String; 3]>,
}

impl PortTable {
    pub fn new(ports: &PortArena, ids: impl IntoIterator<Item = PortId>) -> Self {
        let rows = ids
            .into_iter()
            .filter_map(|id| {
                let port = ports.get(id)?;
                let value = ports
                    .peek(id)
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "-".to_string());
                Some([port.name().to_string(), port.value_type().to_string(), value])
            })
            .collect();
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn write_row(f: &mut fmt::Formatter<'_>, cells: [&str; 3]) -> fmt::Result {
    write!(f, "|")?;
    for cell in cells {
        write!(f, "{:^width$}|", cell, width = COLUMN_WIDTH)?;
    }
    writeln!(f)
}

impl fmt::Display for PortTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "-".repeat(RULE_WIDTH);
        writeln!(f, "{}", rule)?;
        write_row(f, ["Name", "Type", "Value"])?;
        writeln!(f, "{}", rule)?;
        for [name, ty, value] in &self.rows {
            write_row(f, [name.as_str(), ty.as_str(), value.as_str()])?;
        }
        Ok(())
    }
}
