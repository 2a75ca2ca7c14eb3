//! Core data models for the delivery planner.

use crate::error::CoreError;
use chrono::{Datelike, NaiveDate, Weekday};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use std::cell::OnceCell;
use std::collections::BTreeSet;
use std::fmt;

/// A longitude/latitude pair in decimal degrees.
///
/// Always within [-180, 180] x [-90, 90]; the only way in is through
/// [`Coordinate::new`] (deserialization goes through the same check).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    longitude: f64,
    latitude: f64,
}

#[derive(Deserialize)]
struct RawCoordinate {
    longitude: f64,
    latitude: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = CoreError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Coordinate::new(raw.longitude, raw.latitude)
    }
}

impl Coordinate {
    pub fn new(longitude: f64, latitude: f64) -> Result<Self, CoreError> {
        let in_range = longitude.is_finite()
            && latitude.is_finite()
            && (-180.0..=180.0).contains(&longitude)
            && (-90.0..=90.0).contains(&latitude);
        if !in_range {
            return Err(CoreError::InvalidCoordinate {
                longitude,
                latitude,
            });
        }
        Ok(Self {
            longitude,
            latitude,
        })
    }

    /// For compile-time constants already known to be in range.
    pub(crate) const fn from_trusted(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.longitude, self.latitude)
    }
}

/// The drone's unit moves: 16 headings 22.5 degrees apart, counter-clockwise
/// from East, plus hovering in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompassDirection {
    East,
    EastNorthEast,
    NorthEast,
    NorthNorthEast,
    North,
    NorthNorthWest,
    NorthWest,
    WestNorthWest,
    West,
    WestSouthWest,
    SouthWest,
    SouthSouthWest,
    South,
    SouthSouthEast,
    SouthEast,
    EastSouthEast,
    Hover,
}

impl CompassDirection {
    /// Every non-hover direction, in angle order.
    pub const MOVES: [CompassDirection; 16] = [
        CompassDirection::East,
        CompassDirection::EastNorthEast,
        CompassDirection::NorthEast,
        CompassDirection::NorthNorthEast,
        CompassDirection::North,
        CompassDirection::NorthNorthWest,
        CompassDirection::NorthWest,
        CompassDirection::WestNorthWest,
        CompassDirection::West,
        CompassDirection::WestSouthWest,
        CompassDirection::SouthWest,
        CompassDirection::SouthSouthWest,
        CompassDirection::South,
        CompassDirection::SouthSouthEast,
        CompassDirection::SouthEast,
        CompassDirection::EastSouthEast,
    ];

    /// Angle in degrees (East = 0, counter-clockwise), `None` for hover.
    pub fn angle(self) -> Option<f64> {
        Self::MOVES
            .iter()
            .position(|direction| *direction == self)
            .map(|index| index as f64 * 22.5)
    }

    pub fn is_hover(self) -> bool {
        self == CompassDirection::Hover
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub name: String,
    pub price_in_pence: u32,
}

/// Days of the week in canonical order, as they appear in restaurant data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OpeningDay {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl From<Weekday> for OpeningDay {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Mon => OpeningDay::Monday,
            Weekday::Tue => OpeningDay::Tuesday,
            Weekday::Wed => OpeningDay::Wednesday,
            Weekday::Thu => OpeningDay::Thursday,
            Weekday::Fri => OpeningDay::Friday,
            Weekday::Sat => OpeningDay::Saturday,
            Weekday::Sun => OpeningDay::Sunday,
        }
    }
}

/// A restaurant that orders can be collected from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub name: String,
    #[serde(flatten)]
    pub location: Coordinate,
    /// Canonical week order, each day at most once.
    #[serde(default)]
    pub opening_days: BTreeSet<OpeningDay>,
    pub menu: Vec<MenuItem>,
    /// Moves from this restaurant back to the home base, filled once per run.
    #[serde(skip)]
    moves_from_base: OnceCell<Option<usize>>,
}

impl Restaurant {
    pub fn new(
        name: impl Into<String>,
        location: Coordinate,
        opening_days: impl IntoIterator<Item = OpeningDay>,
        menu: Vec<MenuItem>,
    ) -> Self {
        Self {
            name: name.into(),
            location,
            opening_days: opening_days.into_iter().collect(),
            menu,
            moves_from_base: OnceCell::new(),
        }
    }

    pub fn menu_item(&self, name: &str) -> Option<&MenuItem> {
        self.menu.iter().find(|item| item.name == name)
    }

    pub fn serves(&self, name: &str) -> bool {
        self.menu_item(name).is_some()
    }

    pub fn is_open_on(&self, date: NaiveDate) -> bool {
        self.opening_days.contains(&OpeningDay::from(date.weekday()))
    }

    /// Memoized move count to the base; `compute` runs at most once.
    /// `None` means the base is unreachable from here.
    pub fn moves_from_base_or_init(
        &self,
        compute: impl FnOnce() -> Option<usize>,
    ) -> Option<usize> {
        *self.moves_from_base.get_or_init(compute)
    }

    /// The memoized value, if it has been computed.
    pub fn cached_moves_from_base(&self) -> Option<Option<usize>> {
        self.moves_from_base.get().copied()
    }
}

/// Card details as submitted with an order. Kept as raw strings so that
/// malformed input still reaches validation; anything that is not a string
/// reads as empty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PaymentDetails {
    #[serde(rename = "creditCardNumber", default, deserialize_with = "lenient")]
    pub card_number: String,
    /// `MM/YY`
    #[serde(rename = "creditCardExpiry", default, deserialize_with = "lenient")]
    pub card_expiry: String,
    #[serde(default, deserialize_with = "lenient")]
    pub cvv: String,
}

/// Final classification of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderOutcome {
    Delivered,
    ValidButNotDelivered,
    InvalidCardNumber,
    InvalidExpiryDate,
    InvalidCvv,
    InvalidTotal,
    InvalidPizzaNotDefined,
    InvalidPizzaCombinationMultipleSuppliers,
    InvalidPizzaCount,
    Invalid,
}

impl OrderOutcome {
    pub fn is_valid(self) -> bool {
        matches!(
            self,
            OrderOutcome::ValidButNotDelivered | OrderOutcome::Delivered
        )
    }

    /// Whether the lifecycle allows moving from `from` to `to`: any outcome
    /// may be assigned once, after which only
    /// `ValidButNotDelivered -> Delivered` is permitted.
    pub fn can_transition(from: Option<OrderOutcome>, to: OrderOutcome) -> bool {
        match from {
            None => true,
            Some(OrderOutcome::ValidButNotDelivered) => to == OrderOutcome::Delivered,
            Some(_) => false,
        }
    }
}

/// The result of validating one order against the day's restaurants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderValidation {
    pub outcome: OrderOutcome,
    /// Name of the single restaurant supplying every item, once known.
    pub restaurant: Option<String>,
    /// Menu prices plus the fixed order charge, once all items are priced.
    pub total_in_pence: Option<i64>,
}

/// A candidate order for the planning day.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(default, deserialize_with = "lenient")]
    pub order_no: String,
    /// `None` when missing or not an ISO date; such orders are invalid.
    #[serde(default, deserialize_with = "lenient")]
    pub order_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient")]
    pub customer: String,
    #[serde(flatten)]
    pub payment: PaymentDetails,
    /// Declared total, including the fixed order charge. Zero when missing
    /// or not an integer.
    #[serde(default, deserialize_with = "lenient")]
    pub price_total_in_pence: i64,
    /// Entries that are not strings read as empty names, which no menu serves.
    #[serde(default, deserialize_with = "lenient_items")]
    pub order_items: Vec<String>,
    #[serde(skip)]
    outcome: Option<OrderOutcome>,
    #[serde(skip)]
    restaurant: Option<String>,
    #[serde(skip)]
    computed_total_in_pence: Option<i64>,
}

impl Order {
    pub fn new(
        order_no: impl Into<String>,
        order_date: NaiveDate,
        payment: PaymentDetails,
        price_total_in_pence: i64,
        order_items: Vec<String>,
    ) -> Self {
        Self {
            order_no: order_no.into(),
            order_date: Some(order_date),
            customer: String::new(),
            payment,
            price_total_in_pence,
            order_items,
            outcome: None,
            restaurant: None,
            computed_total_in_pence: None,
        }
    }

    pub fn outcome(&self) -> Option<OrderOutcome> {
        self.outcome
    }

    /// Restaurant matched during validation.
    pub fn restaurant_name(&self) -> Option<&str> {
        self.restaurant.as_deref()
    }

    pub fn computed_total_in_pence(&self) -> Option<i64> {
        self.computed_total_in_pence
    }

    /// Computed total when every item could be priced, else the declared one.
    pub fn cost_in_pence(&self) -> i64 {
        self.computed_total_in_pence
            .unwrap_or(self.price_total_in_pence)
    }

    /// Store the validation result. An order is validated exactly once.
    pub fn record_validation(&mut self, validation: OrderValidation) -> Result<(), CoreError> {
        self.transition(validation.outcome)?;
        self.restaurant = validation.restaurant;
        self.computed_total_in_pence = validation.total_in_pence;
        Ok(())
    }

    /// `ValidButNotDelivered -> Delivered`, after a completed round trip.
    pub fn mark_delivered(&mut self) -> Result<(), CoreError> {
        if self.outcome.is_none() {
            return Err(self.transition_error(OrderOutcome::Delivered));
        }
        self.transition(OrderOutcome::Delivered)
    }

    fn transition(&mut self, to: OrderOutcome) -> Result<(), CoreError> {
        if !OrderOutcome::can_transition(self.outcome, to) {
            return Err(self.transition_error(to));
        }
        self.outcome = Some(to);
        Ok(())
    }

    fn transition_error(&self, to: OrderOutcome) -> CoreError {
        CoreError::InvalidStateTransition {
            order_no: self.order_no.clone(),
            from: self.outcome,
            to,
        }
    }
}

/// Either a well-formed `T` or any other JSON value.
#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient<T> {
    Parsed(T),
    Malformed(IgnoredAny),
}

/// Read a `T`, falling back to `T::default()` for null or mistyped input so
/// one bad field never rejects the whole order batch.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    match Lenient::<T>::deserialize(deserializer)? {
        Lenient::Parsed(value) => Ok(value),
        Lenient::Malformed(_) => Ok(T::default()),
    }
}

#[derive(Default, Deserialize)]
struct ItemName(#[serde(deserialize_with = "lenient")] String);

fn lenient_items<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items: Vec<ItemName> = lenient(deserializer)?;
    Ok(items.into_iter().map(|item| item.0).collect())
}
