use serde::{Deserialize, Serialize};
use validator::Validate;

/// Team identity as supplied by the league layer. Colors are passed through
/// untouched for renderers.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct TeamInfo {
    #[validate(length(min = 1))]
    pub id: String,
    pub city: String,
    pub name: String,
    #[validate(length(min = 2, max = 4))]
    pub abbreviation: String,
    #[serde(default)]
    pub primary_color: String,
    #[serde(default)]
    pub secondary_color: String,
}

impl TeamInfo {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.city, self.name)
    }
}
