//! City storage.

use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::city::model::{City, CityFilter, CityUpdate};
use crate::error::AppError;

/// Storage operations behind the city routes.
pub trait CityService: Send + Sync {
    /// Cities matching `filter`, ordered by id.
    fn find_cities(&self, filter: &CityFilter) -> Result<Vec<City>, AppError>;

    fn find_city_by_id(&self, id: i64) -> Result<City, AppError>;

    /// Id of the first city (lowest id) with this exact name.
    fn find_id_by_name(&self, name: &str) -> Result<i64, AppError>;

    /// Store a new city, returning it with its assigned id.
    fn create_city(&self, city: City) -> Result<City, AppError>;

    fn update_city(&self, id: i64, update: &CityUpdate) -> Result<City, AppError>;

    fn delete_city(&self, id: i64) -> Result<(), AppError>;
}

#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<i64, City>,
    next_id: i64,
}

impl Table {
    /// Next id after the highest one in use; the counter only moves on success.
    fn allocate_id(&mut self) -> Result<i64, AppError> {
        let id = self
            .next_id
            .checked_add(1)
            .ok_or_else(|| AppError::internal("city id space exhausted"))?;
        self.next_id = id;
        Ok(id)
    }
}

/// Process-memory city table.
#[derive(Debug, Default)]
pub struct InMemoryCityService {
    table: RwLock<Table>,
}

impl InMemoryCityService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from seed rows. Rows keep their ids when positive.
    pub fn with_cities<I>(cities: I) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = City>,
    {
        let service = Self::new();
        {
            let mut table = service.write()?;
            for city in cities {
                validate(&city)?;
                let id = if city.id > 0 { city.id } else { table.allocate_id()? };
                if table.rows.contains_key(&id) {
                    return Err(AppError::invalid(format!("duplicate city id {id}")));
                }
                table.next_id = table.next_id.max(id);
                table.rows.insert(id, City { id, ..city });
            }
        }
        Ok(service)
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Table>, AppError> {
        self.table
            .read()
            .map_err(|_| AppError::internal("city table lock poisoned"))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Table>, AppError> {
        self.table
            .write()
            .map_err(|_| AppError::internal("city table lock poisoned"))
    }
}

fn validate(city: &City) -> Result<(), AppError> {
    if city.name.trim().is_empty() {
        return Err(AppError::invalid("city name is required"));
    }
    if city.country_code.trim().is_empty() {
        return Err(AppError::invalid("country code is required"));
    }
    if city.population < 0 {
        return Err(AppError::invalid("population must not be negative"));
    }
    Ok(())
}

impl CityService for InMemoryCityService {
    fn find_cities(&self, filter: &CityFilter) -> Result<Vec<City>, AppError> {
        let table = self.read()?;
        let matching = table.rows.values().filter(|city| filter.matches(city));
        let limit = if filter.limit == 0 { usize::MAX } else { filter.limit };
        Ok(matching.skip(filter.offset).take(limit).cloned().collect())
    }

    fn find_city_by_id(&self, id: i64) -> Result<City, AppError> {
        self.read()?
            .rows
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::not_found("city not found"))
    }

    fn find_id_by_name(&self, name: &str) -> Result<i64, AppError> {
        self.read()?
            .rows
            .values()
            .find(|city| city.name == name)
            .map(|city| city.id)
            .ok_or_else(|| AppError::not_found("city not found"))
    }

    fn create_city(&self, city: City) -> Result<City, AppError> {
        validate(&city)?;
        let mut table = self.write()?;
        let city = City {
            id: table.allocate_id()?,
            ..city
        };
        table.rows.insert(city.id, city.clone());
        tracing::debug!(city_id = city.id, name = %city.name, "City created");
        Ok(city)
    }

    fn update_city(&self, id: i64, update: &CityUpdate) -> Result<City, AppError> {
        let mut table = self.write()?;
        let current = table
            .rows
            .get(&id)
            .ok_or_else(|| AppError::not_found("city not found"))?;

        let mut updated = current.clone();
        update.apply(&mut updated);
        validate(&updated)?;

        table.rows.insert(id, updated.clone());
        Ok(updated)
    }

    fn delete_city(&self, id: i64) -> Result<(), AppError> {
        self.write()?
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::not_found("city not found"))
    }
}
