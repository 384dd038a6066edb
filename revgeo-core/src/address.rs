use serde::{Deserialize, Serialize};

/// Column names appended to every output row, in order
pub const RESULT_COLUMNS: [&str; 5] = ["origin", "formatted_address", "town", "street", "status"];

/// Outcome of resolving one location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeocodeStatus {
    Success,
    Error,
}

impl GeocodeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeocodeStatus::Success => "success",
            GeocodeStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for GeocodeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Address resolved for a single input location.
///
/// `origin` always holds the raw cell value the location came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressResult {
    pub origin: String,
    pub formatted_address: String,
    pub town: String,
    pub street: String,
    pub status: GeocodeStatus,
}

impl AddressResult {
    /// A failed lookup: every address field is empty
    pub fn error(origin: &str) -> Self {
        Self {
            origin: origin.to_string(),
            formatted_address: String::new(),
            town: String::new(),
            street: String::new(),
            status: GeocodeStatus::Error,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == GeocodeStatus::Success
    }

    /// Whether the provider gave us something printable
    pub fn has_address(&self) -> bool {
        !self.formatted_address.is_empty()
    }

    /// Cells in `RESULT_COLUMNS` order
    pub fn to_cells(&self) -> [String; 5] {
        [
            self.origin.clone(),
            self.formatted_address.clone(),
            self.town.clone(),
            self.street.clone(),
            self.status.to_string(),
        ]
    }
}
