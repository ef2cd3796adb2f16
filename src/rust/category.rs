use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The closed set of expense categories.
///
/// Declaration order is the display order used everywhere a list of
/// categories is returned, and the tie-break order for predictions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Food,
    Travel,
    Bills,
    Shopping,
    Entertainment,
}

impl Category {
    /// All categories in their stable order
    pub const ALL: [Category; 5] = [
        Category::Food,
        Category::Travel,
        Category::Bills,
        Category::Shopping,
        Category::Entertainment,
    ];

    /// Category returned whenever a description cannot be classified
    pub const FALLBACK: Category = Category::Shopping;

    /// The short label stored alongside an expense record
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Food => "Food",
            Self::Travel => "Travel",
            Self::Bills => "Bills",
            Self::Shopping => "Shopping",
            Self::Entertainment => "Entertainment",
        }
    }

    /// Position of the category within [`Category::ALL`]
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown category: '{0}'")]
pub struct ParseCategoryError(pub String);

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseCategoryError(s.to_string()))
    }
}
