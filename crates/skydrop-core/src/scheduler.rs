//! Day planning: validate, order by restaurant distance, fly until the move
//! budget runs out.

use crate::config::PlannerConfig;
use crate::error::CoreError;
use crate::flight_log::FlightLog;
use crate::models::{Coordinate, Order, OrderOutcome, Restaurant};
use crate::pathfinder::{Pathfinder, Route};
use crate::validation::validate_order;
use crate::zones::ZoneModel;
use tracing::{debug, info, warn};

/// Result of one planning run.
#[derive(Debug, Clone)]
pub struct DayPlan {
    /// Every input order, in input order, with its final outcome.
    pub orders: Vec<Order>,
    pub flight_log: FlightLog,
    /// Budget left after the last logged leg; negative when the final leg
    /// overran it.
    pub remaining_moves: i64,
}

impl DayPlan {
    pub fn delivered_count(&self) -> usize {
        self.count(OrderOutcome::Delivered)
    }

    pub fn count(&self, outcome: OrderOutcome) -> usize {
        self.orders
            .iter()
            .filter(|order| order.outcome() == Some(outcome))
            .count()
    }
}

/// A valid order paired with its supplier.
struct Delivery<'r> {
    order_index: usize,
    restaurant: &'r Restaurant,
    moves_from_base: Option<usize>,
}

/// Plan the day's flights.
///
/// Orders are validated, the valid ones sorted by how far their restaurant
/// is from the base, then flown base -> restaurant -> base in that order
/// while the move budget lasts. Routes that cannot be found skip the order.
pub fn plan_day(
    mut orders: Vec<Order>,
    restaurants: &[Restaurant],
    zones: &ZoneModel,
    config: &PlannerConfig,
) -> Result<DayPlan, CoreError> {
    let mut flight_log = FlightLog::new();
    let pathfinder = Pathfinder::new(zones, config);
    let base = config.base;

    for order in &mut orders {
        let validation = validate_order(order, restaurants);
        order.record_validation(validation)?;
    }

    let mut deliveries: Vec<Delivery<'_>> = orders
        .iter()
        .enumerate()
        .filter(|(_, order)| order.outcome() == Some(OrderOutcome::ValidButNotDelivered))
        .filter_map(|(order_index, order)| {
            let name = order.restaurant_name()?;
            let restaurant = restaurants.iter().find(|r| r.name == name)?;
            let moves_from_base = restaurant
                .moves_from_base_or_init(|| pathfinder.moves_to(restaurant.location, base));
            Some(Delivery {
                order_index,
                restaurant,
                moves_from_base,
            })
        })
        .collect();

    // Stable: orders for equally distant restaurants keep their input order.
    deliveries.sort_by_key(|delivery| delivery.moves_from_base.unwrap_or(usize::MAX));
    info!(
        orders = orders.len(),
        valid = deliveries.len(),
        "planning deliveries"
    );

    let mut remaining_moves = i64::from(config.move_budget);
    let mut current = base;

    for (position, delivery) in deliveries.iter().enumerate() {
        let order_no = orders[delivery.order_index].order_no.clone();
        let next_stop = deliveries
            .get(position + 1)
            .map(|next| next.restaurant.location);

        let Some((outbound, inbound)) =
            round_trip(&pathfinder, current, delivery.restaurant, base, next_stop)
        else {
            warn!(
                order_no = %order_no,
                restaurant = %delivery.restaurant.name,
                "no route, skipping order"
            );
            continue;
        };

        flight_log.record_route(&order_no, &outbound);
        remaining_moves -= moves(&outbound);
        if remaining_moves < 0 {
            info!(order_no = %order_no, "move budget exhausted on the way to the restaurant");
            break;
        }

        flight_log.record_route(&order_no, &inbound);
        remaining_moves -= moves(&inbound);
        if remaining_moves < 0 {
            info!(order_no = %order_no, "move budget exhausted on the way back");
            break;
        }

        orders[delivery.order_index].mark_delivered()?;
        current = inbound.end();
        debug!(
            order_no = %order_no,
            outbound = outbound.len(),
            inbound = inbound.len(),
            remaining_moves,
            "delivered"
        );
    }

    let plan = DayPlan {
        orders,
        flight_log,
        remaining_moves,
    };
    info!(
        delivered = plan.delivered_count(),
        moves = plan.flight_log.len(),
        remaining_moves,
        "day planned"
    );
    Ok(plan)
}

/// Both legs of a delivery, or `None` if either is unreachable.
fn round_trip(
    pathfinder: &Pathfinder<'_>,
    from: Coordinate,
    restaurant: &Restaurant,
    base: Coordinate,
    next_stop: Option<Coordinate>,
) -> Option<(Route, Route)> {
    let outbound = pathfinder
        .route(from, restaurant.location, next_stop)
        .map_err(|err| debug!("outbound leg: {err}"))
        .ok()?;
    let inbound = pathfinder
        .route(outbound.end(), base, next_stop)
        .map_err(|err| debug!("inbound leg: {err}"))
        .ok()?;
    Some((outbound, inbound))
}

fn moves(route: &Route) -> i64 {
    i64::try_from(route.len()).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MenuItem, OpeningDay, PaymentDetails};
    use crate::zones::Zone;
    use chrono::NaiveDate;

    fn c(lng: f64, lat: f64) -> Coordinate {
        Coordinate::new(lng, lat).unwrap()
    }

    fn zones() -> ZoneModel {
        let central = Zone::new(
            "central",
            vec![c(-0.01, -0.01), c(0.01, -0.01), c(0.01, 0.01), c(-0.01, 0.01)],
        )
        .unwrap();
        ZoneModel::new(central, vec![])
    }

    fn restaurant(name: &str, location: Coordinate, pizza: &str) -> Restaurant {
        Restaurant::new(
            name,
            location,
            [OpeningDay::Wednesday],
            vec![MenuItem {
                name: pizza.to_string(),
                price_in_pence: 1000,
            }],
        )
    }

    fn order(order_no: &str, pizza: &str) -> Order {
        Order::new(
            order_no,
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            PaymentDetails {
                card_number: "4111111111111111".to_string(),
                card_expiry: "12/30".to_string(),
                cvv: "123".to_string(),
            },
            1100,
            vec![pizza.to_string()],
        )
    }

    fn config() -> PlannerConfig {
        PlannerConfig::default().with_base(c(0.0, 0.0))
    }

    #[test]
    fn nearest_restaurant_is_served_first() {
        let restaurants = vec![
            restaurant("Far", c(0.003075, 0.0), "Calzone"),
            restaurant("Near", c(-0.001575, 0.0), "Margherita"),
        ];
        let orders = vec![order("0000000A", "Calzone"), order("0000000B", "Margherita")];

        let plan = plan_day(orders, &restaurants, &zones(), &config()).unwrap();

        assert_eq!(plan.delivered_count(), 2);
        assert_eq!(plan.flight_log.points()[0].order_no, "0000000B");
        assert_eq!(plan.flight_log.points().last().unwrap().order_no, "0000000A");
        assert_eq!(restaurants[1].cached_moves_from_base(), Some(Some(11)));
        // Input order is preserved in the result.
        assert_eq!(plan.orders[0].order_no, "0000000A");
    }

    #[test]
    fn invalid_orders_are_not_flown() {
        let restaurants = vec![restaurant("Near", c(-0.001575, 0.0), "Margherita")];
        let mut bad = order("0000000C", "Margherita");
        bad.payment.cvv = "1".to_string();

        let plan = plan_day(vec![bad], &restaurants, &zones(), &config()).unwrap();

        assert!(plan.flight_log.is_empty());
        assert_eq!(plan.orders[0].outcome(), Some(OrderOutcome::InvalidCvv));
        assert_eq!(plan.remaining_moves, 2000);
    }

    #[test]
    fn budget_stops_the_day() {
        let restaurants = vec![restaurant("Near", c(-0.001575, 0.0), "Margherita")];
        let orders = vec![
            order("0000000A", "Margherita"),
            order("0000000B", "Margherita"),
        ];
        // A round trip takes 22 moves; the second outbound leg overruns.
        let config = config().with_move_budget(30);

        let plan = plan_day(orders, &restaurants, &zones(), &config).unwrap();

        assert_eq!(plan.orders[0].outcome(), Some(OrderOutcome::Delivered));
        assert_eq!(
            plan.orders[1].outcome(),
            Some(OrderOutcome::ValidButNotDelivered)
        );
        assert_eq!(plan.remaining_moves, -3);
        assert_eq!(plan.flight_log.moves_for("0000000A"), 22);
        assert_eq!(plan.flight_log.moves_for("0000000B"), 11);
    }

    #[test]
    fn budget_of_exactly_one_round_trip_is_enough() {
        let fly = |budget: u32| {
            let restaurants = vec![restaurant("Near", c(-0.001575, 0.0), "Margherita")];
            let orders = vec![order("0000000A", "Margherita")];
            let config = config().with_move_budget(budget);
            plan_day(orders, &restaurants, &zones(), &config).unwrap()
        };

        // Ten moves west and a hover, then ten east and a hover.
        let round_trip = fly(2000).flight_log.len();
        assert_eq!(round_trip, 22);

        let exact = fly(22);
        assert_eq!(exact.orders[0].outcome(), Some(OrderOutcome::Delivered));
        assert_eq!(exact.remaining_moves, 0);

        let short = fly(21);
        assert_eq!(
            short.orders[0].outcome(),
            Some(OrderOutcome::ValidButNotDelivered)
        );
        assert_eq!(short.remaining_moves, -1);
        assert_eq!(short.flight_log.len(), round_trip);
    }

    #[test]
    fn unreachable_restaurant_is_skipped() {
        let walled = Zone::new(
            "wall",
            vec![c(0.004, -0.001), c(0.006, -0.001), c(0.006, 0.001), c(0.004, 0.001)],
        )
        .unwrap();
        let central = Zone::new(
            "central",
            vec![c(-0.003, -0.002), c(0.007, -0.002), c(0.007, 0.002), c(-0.003, 0.002)],
        )
        .unwrap();
        let zones = ZoneModel::new(central, vec![walled]);
        let restaurants = vec![
            restaurant("Inside", c(0.005, 0.0), "Calzone"),
            restaurant("Near", c(-0.001575, 0.0), "Margherita"),
        ];
        let orders = vec![order("0000000A", "Calzone"), order("0000000B", "Margherita")];
        let config = PlannerConfig {
            search_margin_deg: 0.001,
            ..config()
        };

        let plan = plan_day(orders, &restaurants, &zones, &config).unwrap();

        assert_eq!(restaurants[0].cached_moves_from_base(), Some(None));
        assert_eq!(
            plan.orders[0].outcome(),
            Some(OrderOutcome::ValidButNotDelivered)
        );
        assert_eq!(plan.orders[1].outcome(), Some(OrderOutcome::Delivered));
        assert_eq!(plan.flight_log.moves_for("0000000A"), 0);
    }

    #[test]
    fn revalidating_delivered_orders_fails() {
        let restaurants = vec![restaurant("Near", c(-0.001575, 0.0), "Margherita")];
        let plan = plan_day(
            vec![order("0000000A", "Margherita")],
            &restaurants,
            &zones(),
            &config(),
        )
        .unwrap();

        let err = plan_day(plan.orders, &restaurants, &zones(), &config()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidStateTransition { .. }));
    }
}
