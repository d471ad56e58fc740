use std::sync::Arc;

use crate::domain::catalog::{MenuItem, Station, Train};
use crate::domain::errors::DomainError;
use crate::domain::ports::CatalogRepository;

/// Read-only reference data for the storefront.
pub struct CatalogService {
    repo: Arc<dyn CatalogRepository>,
}

impl CatalogService {
    pub fn new(repo: Arc<dyn CatalogRepository>) -> Self {
        Self { repo }
    }

    pub fn list_trains(&self) -> Result<Vec<Train>, DomainError> {
        self.repo.list_active_trains()
    }

    pub fn get_train(&self, id: i32) -> Result<Train, DomainError> {
        self.repo.find_train(id)?.ok_or(DomainError::NotFound("Train"))
    }

    pub fn list_stations(&self) -> Result<Vec<Station>, DomainError> {
        self.repo.list_stations()
    }

    pub fn get_station(&self, id: i32) -> Result<Station, DomainError> {
        self.repo
            .find_station(id)?
            .ok_or(DomainError::NotFound("Station"))
    }

    pub fn list_menu(&self, category: Option<&str>) -> Result<Vec<MenuItem>, DomainError> {
        let category = category.map(str::trim).filter(|c| !c.is_empty());
        self.repo.list_menu_items(category)
    }

    pub fn get_menu_item(&self, id: i32) -> Result<MenuItem, DomainError> {
        self.repo
            .find_menu_item(id)?
            .ok_or(DomainError::NotFound("Menu item"))
    }
}
