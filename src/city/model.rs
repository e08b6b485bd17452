//! City resource types.

use serde::{Deserialize, Serialize};

/// A row of the city table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    /// Assigned on creation; ignored when supplied by clients.
    #[serde(default)]
    pub id: i64,
    pub name: String,
    pub country_code: String,
    #[serde(default)]
    pub district: String,
    #[serde(default)]
    pub population: i64,
}

/// Search criteria. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CityFilter {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub country_code: Option<String>,
    pub district: Option<String>,

    pub offset: usize,
    /// Zero means no limit.
    pub limit: usize,
}

impl CityFilter {
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn matches(&self, city: &City) -> bool {
        self.id.map_or(true, |id| id == city.id)
            && self.name.as_deref().map_or(true, |name| name == city.name)
            && self
                .country_code
                .as_deref()
                .map_or(true, |code| code == city.country_code)
            && self
                .district
                .as_deref()
                .map_or(true, |district| district == city.district)
    }
}

/// Partial update. Only set fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CityUpdate {
    pub name: Option<String>,
    pub country_code: Option<String>,
    pub district: Option<String>,
    pub population: Option<i64>,
}

impl CityUpdate {
    pub fn apply(&self, city: &mut City) {
        if let Some(name) = &self.name {
            city.name = name.clone();
        }
        if let Some(code) = &self.country_code {
            city.country_code = code.clone();
        }
        if let Some(district) = &self.district {
            city.district = district.clone();
        }
        if let Some(population) = self.population {
            city.population = population;
        }
    }
}
