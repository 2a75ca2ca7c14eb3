//! Property-based tests for the planner's geometry and validation.
//!
//! # Invariants tested
//!
//! - **Move length:** every non-hover move covers exactly one step, at the
//!   direction's angle.
//! - **Hover:** hovering never changes position.
//! - **Containment:** points well inside or well outside a square are
//!   classified correctly.
//! - **Luhn:** the checksum agrees with an independent table-driven version.
//! - **Totality:** validation classifies arbitrary input without panicking.

use chrono::NaiveDate;
use proptest::prelude::*;
use skydrop_core::spatial::{bearing_deg, point_in_polygon};
use skydrop_core::validation::{is_valid_card_number, luhn_valid};
use skydrop_core::{
    distance, next_position, validate_order, CompassDirection, Coordinate, MenuItem, OpeningDay,
    Order, PaymentDetails, Restaurant, STEP_LENGTH_DEG,
};

/// Doubled-digit lookup, applied to every second digit from the right.
const DOUBLED: [u32; 10] = [0, 2, 4, 6, 8, 1, 3, 5, 7, 9];

fn reference_luhn(digits: &str) -> bool {
    let total: u32 = digits
        .chars()
        .rev()
        .filter_map(|ch| ch.to_digit(10))
        .enumerate()
        .map(|(i, d)| if i % 2 == 0 { d } else { DOUBLED[d as usize] })
        .sum();
    total % 10 == 0
}

fn angular_gap(a: f64, b: f64) -> f64 {
    let gap = (a - b).rem_euclid(360.0);
    gap.min(360.0 - gap)
}

fn direction_strategy() -> impl Strategy<Value = CompassDirection> {
    (0usize..16).prop_map(|index| CompassDirection::MOVES[index])
}

fn coordinate_strategy() -> impl Strategy<Value = Coordinate> {
    (-170.0f64..170.0, -80.0f64..80.0).prop_map(|(lng, lat)| Coordinate::new(lng, lat).unwrap())
}

fn unit_square() -> Vec<Coordinate> {
    [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]
        .into_iter()
        .map(|(lng, lat)| Coordinate::new(lng, lat).unwrap())
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn moves_cover_one_step_at_their_angle(
        from in coordinate_strategy(),
        direction in direction_strategy(),
    ) {
        let to = next_position(from, direction).unwrap();
        prop_assert!((distance(from, to) - STEP_LENGTH_DEG).abs() < 1e-9);

        let angle = direction.angle().unwrap();
        prop_assert!(
            angular_gap(bearing_deg(from, to), angle) < 1e-6,
            "bearing {} for {:?}",
            bearing_deg(from, to),
            direction
        );
    }

    #[test]
    fn hover_keeps_position(from in coordinate_strategy()) {
        prop_assert_eq!(next_position(from, CompassDirection::Hover).unwrap(), from);
    }

    #[test]
    fn points_inside_square_are_contained(lng in 0.01f64..0.99, lat in 0.01f64..0.99) {
        let point = Coordinate::new(lng, lat).unwrap();
        prop_assert!(point_in_polygon(point, &unit_square()));
    }

    #[test]
    fn points_outside_square_are_not_contained(
        lng in -5.0f64..5.0,
        lat in -5.0f64..5.0,
    ) {
        prop_assume!(!(-0.01..=1.01).contains(&lng) || !(-0.01..=1.01).contains(&lat));
        let point = Coordinate::new(lng, lat).unwrap();
        prop_assert!(!point_in_polygon(point, &unit_square()));
    }

    #[test]
    fn luhn_matches_reference(digits in "[0-9]{1,19}") {
        prop_assert_eq!(luhn_valid(&digits), reference_luhn(&digits));
    }

    #[test]
    fn card_numbers_with_letters_are_rejected(number in "[0-9]{8}[A-Za-z][0-9]{7}") {
        prop_assert!(!is_valid_card_number(&number));
    }

    #[test]
    fn validation_is_total(
        order_no in ".{0,12}",
        card_number in ".{0,20}",
        card_expiry in ".{0,6}",
        cvv in ".{0,4}",
        total in any::<i64>(),
        items in prop::collection::vec("(Margherita|Calzone|Hawaiian)", 0..7),
    ) {
        let restaurants = vec![Restaurant::new(
            "Civerinos Slice",
            Coordinate::new(-3.19, 55.94).unwrap(),
            [OpeningDay::Monday],
            vec![
                MenuItem { name: "Margherita".to_string(), price_in_pence: 1000 },
                MenuItem { name: "Calzone".to_string(), price_in_pence: 1400 },
            ],
        )];
        let order = Order::new(
            order_no,
            NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
            PaymentDetails { card_number, card_expiry, cvv },
            total,
            items,
        );

        let validation = validate_order(&order, &restaurants);

        // A supplier is reported exactly when all items could be priced.
        prop_assert_eq!(validation.restaurant.is_some(), validation.total_in_pence.is_some());
        if validation.outcome.is_valid() {
            prop_assert_eq!(validation.total_in_pence, Some(total));
        }
    }
}
