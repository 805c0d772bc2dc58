//! Column layout selection for the historical export formats
//!
//! The agency's exports drift between eras. Every layout keeps the date in
//! the first column and the maximum temperature in the second, but layouts
//! that carry a homogeneity-number column push the minimum temperature one
//! position right. The layout is chosen by how many fields a row has, not by
//! a fixed offset.

use std::fmt;

/// Logical fields read from a data row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Date,
    MaxTemp,
    MinTemp,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Date, Field::MaxTemp, Field::MinTemp];

    pub fn name(&self) -> &'static str {
        match self {
            Field::Date => "date",
            Field::MaxTemp => "max_temp",
            Field::MinTemp => "min_temp",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Field positions for one family of row widths
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    /// Short name used in logs and tests
    pub name: &'static str,

    /// Smallest row width this layout applies to
    pub min_width: usize,

    /// Largest row width this layout applies to (`None` = unbounded)
    pub max_width: Option<usize>,

    pub date: usize,
    pub max_temp: usize,
    pub min_temp: usize,
}

impl ColumnLayout {
    pub fn applies_to(&self, row_width: usize) -> bool {
        row_width >= self.min_width && self.max_width.is_none_or(|max| row_width <= max)
    }

    pub fn index_of(&self, field: Field) -> usize {
        match field {
            Field::Date => self.date,
            Field::MaxTemp => self.max_temp,
            Field::MinTemp => self.min_temp,
        }
    }
}

/// Known layouts, narrowest first
///
/// * `compact`: `date, max, max quality, min[, min quality]`
/// * `homogeneous`: `date, max, max quality, max homogeneity, min, ...`
pub const LAYOUTS: &[ColumnLayout] = &[
    ColumnLayout {
        name: "compact",
        min_width: 4,
        max_width: Some(5),
        date: 0,
        max_temp: 1,
        min_temp: 3,
    },
    ColumnLayout {
        name: "homogeneous",
        min_width: 6,
        max_width: None,
        date: 0,
        max_temp: 1,
        min_temp: 4,
    },
];

/// Layout for a row of the given width, if any applies
pub fn layout_for_width(row_width: usize) -> Option<&'static ColumnLayout> {
    LAYOUTS.iter().find(|layout| layout.applies_to(row_width))
}

/// Index of `field` in a row with `row_width` fields
///
/// Returns `None` for widths no layout covers (rows shorter than four fields).
pub fn column_index_for_field(field: Field, row_width: usize) -> Option<usize> {
    layout_for_width(row_width).map(|layout| layout.index_of(field))
}
