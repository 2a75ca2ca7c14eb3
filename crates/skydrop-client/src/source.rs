use crate::error::SourceError;
use chrono::NaiveDate;
use skydrop_core::{Order, Restaurant, Zone, ZoneModel};

/// Where a planning run gets its restaurants, orders and airspace from.
pub trait DataSource {
    fn restaurants(&self) -> Result<Vec<Restaurant>, SourceError>;

    /// Orders placed for `date`.
    fn orders_on(&self, date: NaiveDate) -> Result<Vec<Order>, SourceError>;

    fn central_area(&self) -> Result<Zone, SourceError>;

    /// No-fly zones in the order the source lists them.
    fn no_fly_zones(&self) -> Result<Vec<Zone>, SourceError>;

    fn zone_model(&self) -> Result<ZoneModel, SourceError> {
        Ok(ZoneModel::new(self.central_area()?, self.no_fly_zones()?))
    }
}
