use serde::Deserialize;

/// Sort direction for list queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    #[serde(alias = "ASC")]
    Asc,
    #[serde(alias = "DESC")]
    Desc,
}

/// Single-key sort instruction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SortBy {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortBy {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }

    /// PocketBase sort token: `-field` for descending, `field` otherwise
    #[must_use]
    pub fn to_sort_string(&self) -> String {
        match self.direction {
            SortDirection::Asc => self.field.clone(),
            SortDirection::Desc => format!("-{}", self.field),
        }
    }
}

/// Resolve an optional sort instruction into the `sort` query parameter.
#[must_use]
pub fn parse_sorting(sort_by: Option<&SortBy>) -> Option<String> {
    sort_by.map(SortBy::to_sort_string)
}
