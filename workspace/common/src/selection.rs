use std::fmt;

/// URL/form token that selects the aggregate load column.
pub const OVERALL_TOKEN: &str = "overall";

/// Column the `overall` selector resolves to.
pub const OVERALL_COLUMN: &str = "total load actual";

/// Which column of the dataset to forecast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSelector {
    /// A numeric column picked by name
    Named(String),
    /// The aggregate load column
    Overall,
}

impl ColumnSelector {
    /// Parses a user-supplied token. Only the exact `overall` token maps to
    /// [`ColumnSelector::Overall`]; anything else is taken as a column name.
    pub fn from_token(token: &str) -> Self {
        if token == OVERALL_TOKEN {
            Self::Overall
        } else {
            Self::Named(token.to_string())
        }
    }

    /// The dataset column this selector reads.
    pub fn column_name(&self) -> &str {
        match self {
            Self::Named(name) => name,
            Self::Overall => OVERALL_COLUMN,
        }
    }

    /// Human-readable label used in chart titles and page headings.
    pub fn label(&self) -> &str {
        match self {
            Self::Named(name) => name,
            Self::Overall => "Overall",
        }
    }

    /// The token that round-trips through [`ColumnSelector::from_token`].
    pub fn token(&self) -> &str {
        match self {
            Self::Named(name) => name,
            Self::Overall => OVERALL_TOKEN,
        }
    }
}

impl fmt::Display for ColumnSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Forecast length. A closed two-way switch: the `6_months` token selects
/// the short horizon and every other token selects the long one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Horizon {
    kind: HorizonKind,
    token: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizonKind {
    SixMonths,
    FiveYears,
}

impl Horizon {
    pub const SIX_MONTHS_TOKEN: &'static str = "6_months";
    pub const SIX_MONTHS_STEPS: usize = 180;
    pub const FIVE_YEARS_STEPS: usize = 1825;

    pub fn from_token(token: &str) -> Self {
        let kind = if token == Self::SIX_MONTHS_TOKEN {
            HorizonKind::SixMonths
        } else {
            HorizonKind::FiveYears
        };
        Self {
            kind,
            token: token.to_string(),
        }
    }

    pub fn six_months() -> Self {
        Self::from_token(Self::SIX_MONTHS_TOKEN)
    }

    pub fn five_years() -> Self {
        Self::from_token("5_years")
    }

    pub fn kind(&self) -> HorizonKind {
        self.kind
    }

    /// Number of daily forecast steps.
    pub fn steps(&self) -> usize {
        match self.kind {
            HorizonKind::SixMonths => Self::SIX_MONTHS_STEPS,
            HorizonKind::FiveYears => Self::FIVE_YEARS_STEPS,
        }
    }

    /// The token as the user supplied it.
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token)
    }
}
