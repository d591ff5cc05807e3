//! Sort order requested through the header.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SortOrder {
    pub column_name: String,
    pub direction: SortDirection,
}

impl SortOrder {
    pub fn new(column_name: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column_name: column_name.into(),
            direction,
        }
    }

    pub fn asc(column_name: impl Into<String>) -> Self {
        Self::new(column_name, SortDirection::Asc)
    }

    pub fn is_sorted_by(&self, column_name: &str) -> bool {
        self.column_name == column_name
    }

    /// Order requested by clicking `column_name`'s sort button: the active
    /// column flips direction, any other column starts ascending.
    pub fn toggled(&self, column_name: &str) -> Self {
        if self.is_sorted_by(column_name) {
            Self::new(column_name, self.direction.reversed())
        } else {
            Self::asc(column_name)
        }
    }

    /// Label of `column_name`'s sort button.
    pub fn button_text(&self, column_name: &str) -> String {
        if self.is_sorted_by(column_name) {
            format!("sorted {}", self.direction)
        } else {
            "sort".to_string()
        }
    }
}
