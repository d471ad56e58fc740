use diesel::prelude::*;

use crate::db::DbPool;
use crate::domain::catalog::{
    MenuItem, MenuItemUpdate, NewMenuItem, NewStation, NewTrain, Station, Train,
};
use crate::domain::errors::DomainError;
use crate::domain::ports::CatalogRepository;
use crate::schema::{menu_items, stations, trains};

use super::models::{
    MenuItemChangeset, MenuItemRow, NewMenuItemRow, NewStationRow, NewTrainRow, StationRow,
    TrainRow,
};

pub struct DieselCatalogRepository {
    pool: DbPool,
}

impl DieselCatalogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl CatalogRepository for DieselCatalogRepository {
    fn list_active_trains(&self) -> Result<Vec<Train>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = trains::table
            .filter(trains::is_active.eq(true))
            .select(TrainRow::as_select())
            .order(trains::id.asc())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Train::from).collect())
    }

    fn list_all_trains(&self) -> Result<Vec<Train>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = trains::table
            .select(TrainRow::as_select())
            .order(trains::id.asc())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Train::from).collect())
    }

    fn find_train(&self, id: i32) -> Result<Option<Train>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = trains::table
            .find(id)
            .select(TrainRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(Train::from))
    }

    fn create_train(&self, train: NewTrain) -> Result<Train, DomainError> {
        let mut conn = self.pool.get()?;

        let row = diesel::insert_into(trains::table)
            .values(&NewTrainRow::from(train))
            .returning(TrainRow::as_returning())
            .get_result(&mut conn)?;
        Ok(row.into())
    }

    fn list_stations(&self) -> Result<Vec<Station>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = stations::table
            .select(StationRow::as_select())
            .order(stations::sort_order.asc())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Station::from).collect())
    }

    fn find_station(&self, id: i32) -> Result<Option<Station>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = stations::table
            .find(id)
            .select(StationRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(Station::from))
    }

    fn create_station(&self, station: NewStation) -> Result<Station, DomainError> {
        let mut conn = self.pool.get()?;

        let row = diesel::insert_into(stations::table)
            .values(&NewStationRow::from(station))
            .returning(StationRow::as_returning())
            .get_result(&mut conn)?;
        Ok(row.into())
    }

    fn list_menu_items(&self, category: Option<&str>) -> Result<Vec<MenuItem>, DomainError> {
        let mut conn = self.pool.get()?;

        let mut query = menu_items::table
            .filter(menu_items::is_available.eq(true))
            .select(MenuItemRow::as_select())
            .order(menu_items::id.asc())
            .into_boxed();
        if let Some(category) = category {
            query = query.filter(menu_items::category.eq(category));
        }
        let rows = query.load(&mut conn)?;
        Ok(rows.into_iter().map(MenuItem::from).collect())
    }

    fn list_all_menu_items(&self) -> Result<Vec<MenuItem>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = menu_items::table
            .select(MenuItemRow::as_select())
            .order(menu_items::id.asc())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(MenuItem::from).collect())
    }

    fn find_menu_item(&self, id: i32) -> Result<Option<MenuItem>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = menu_items::table
            .find(id)
            .select(MenuItemRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(MenuItem::from))
    }

    fn create_menu_item(&self, item: NewMenuItem) -> Result<MenuItem, DomainError> {
        let mut conn = self.pool.get()?;

        let row = diesel::insert_into(menu_items::table)
            .values(&NewMenuItemRow::from(item))
            .returning(MenuItemRow::as_returning())
            .get_result(&mut conn)?;
        Ok(row.into())
    }

    fn update_menu_item(
        &self,
        id: i32,
        update: MenuItemUpdate,
    ) -> Result<Option<MenuItem>, DomainError> {
        if update.is_empty() {
            return self.find_menu_item(id);
        }
        let mut conn = self.pool.get()?;

        let row = diesel::update(menu_items::table.find(id))
            .set(&MenuItemChangeset::from(update))
            .returning(MenuItemRow::as_returning())
            .get_result(&mut conn)
            .optional()?;
        Ok(row.map(MenuItem::from))
    }
}
