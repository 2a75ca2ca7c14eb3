pub mod config;
pub mod error;
pub mod flight_log;
pub mod models;
pub mod pathfinder;
pub mod scheduler;
pub mod spatial;
pub mod validation;
pub mod zones;

pub use config::PlannerConfig;
pub use error::CoreError;
pub use flight_log::{FlightLog, FlightPathPoint};
pub use models::{
    CompassDirection, Coordinate, MenuItem, OpeningDay, Order, OrderOutcome, OrderValidation,
    PaymentDetails, Restaurant,
};
pub use pathfinder::{NoRoute, Pathfinder, Route};
pub use scheduler::{plan_day, DayPlan};
pub use spatial::{close_to, distance, next_position, CLOSE_TOLERANCE_DEG, STEP_LENGTH_DEG};
pub use validation::{validate_order, FIXED_ORDER_CHARGE_IN_PENCE, MAX_PIZZAS_PER_ORDER};
pub use zones::{Zone, ZoneModel};
