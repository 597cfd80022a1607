use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    positions: HashMap<String, usize>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Builds an empty table. Repeated names are suffixed `.1`, `.2`, ...
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Table::default();
        for name in columns {
            let name = name.into();
            let unique = if table.positions.contains_key(&name) {
                (1..)
                    .map(|n| format!("{name}.{n}"))
                    .find(|candidate| !table.positions.contains_key(candidate))
                    .unwrap_or_default()
            } else {
                name
            };
            table.positions.insert(unique.clone(), table.columns.len());
            table.columns.push(unique);
        }
        table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.columns.len(), String::new());
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn value(&self, row: usize, column: &str) -> &str {
        self.column_index(column)
            .and_then(|idx| self.rows.get(row).map(|cells| cells[idx].as_str()))
            .unwrap_or("")
    }

    pub fn column_values<'a>(
        &'a self,
        column: &str,
    ) -> Option<impl Iterator<Item = &'a str> + use<'a>> {
        let idx = self.column_index(column)?;
        Some(self.rows.iter().map(move |row| row[idx].as_str()))
    }
}
