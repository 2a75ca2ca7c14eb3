//! Order validation and pricing.
//!
//! Checks run in a fixed priority order; the first failure decides the
//! outcome and nothing after it is evaluated.

use crate::models::{Order, OrderOutcome, OrderValidation, Restaurant};
use chrono::Datelike;

/// Delivery charge added to every order, in pence.
pub const FIXED_ORDER_CHARGE_IN_PENCE: i64 = 100;
pub const MAX_PIZZAS_PER_ORDER: usize = 4;

const ORDER_NO_LEN: usize = 8;
const CARD_NUMBER_LEN: usize = 16;
const CVV_LEN: usize = 3;

/// Classify `order` against the day's restaurants. Total: every input,
/// however malformed, gets exactly one outcome.
pub fn validate_order(order: &Order, restaurants: &[Restaurant]) -> OrderValidation {
    let reject = |outcome| OrderValidation {
        outcome,
        restaurant: None,
        total_in_pence: None,
    };

    let Some(order_date) = order.order_date else {
        return reject(OrderOutcome::Invalid);
    };
    if !is_valid_order_no(&order.order_no) {
        return reject(OrderOutcome::Invalid);
    }
    if restaurants.is_empty() || order.order_items.is_empty() {
        return reject(OrderOutcome::Invalid);
    }

    let all_defined = order
        .order_items
        .iter()
        .all(|item| restaurants.iter().any(|r| r.serves(item)));
    if !all_defined {
        return reject(OrderOutcome::InvalidPizzaNotDefined);
    }

    let Some(restaurant) = single_supplier(&order.order_items, restaurants) else {
        return reject(OrderOutcome::InvalidPizzaCombinationMultipleSuppliers);
    };

    // From here on the supplier and the price are known, whatever the outcome.
    let total = priced_total(&order.order_items, restaurant);
    let matched = |outcome| OrderValidation {
        outcome,
        restaurant: Some(restaurant.name.clone()),
        total_in_pence: Some(total),
    };

    if !is_valid_card_number(&order.payment.card_number) {
        return matched(OrderOutcome::InvalidCardNumber);
    }
    match parse_expiry(&order.payment.card_expiry) {
        Some(expiry) if expiry >= (order_date.year(), order_date.month()) => {}
        _ => return matched(OrderOutcome::InvalidExpiryDate),
    }
    if !is_valid_cvv(&order.payment.cvv) {
        return matched(OrderOutcome::InvalidCvv);
    }
    if !(1..=MAX_PIZZAS_PER_ORDER).contains(&order.order_items.len()) {
        return matched(OrderOutcome::InvalidPizzaCount);
    }
    if order.price_total_in_pence != total {
        return matched(OrderOutcome::InvalidTotal);
    }

    matched(OrderOutcome::ValidButNotDelivered)
}

/// The restaurant serving the first item, provided it serves every other
/// item too.
fn single_supplier<'a>(items: &[String], restaurants: &'a [Restaurant]) -> Option<&'a Restaurant> {
    let first = items.first()?;
    let restaurant = restaurants.iter().find(|r| r.serves(first))?;
    items
        .iter()
        .all(|item| restaurant.serves(item))
        .then_some(restaurant)
}

fn priced_total(items: &[String], restaurant: &Restaurant) -> i64 {
    items
        .iter()
        .filter_map(|item| restaurant.menu_item(item))
        .map(|item| i64::from(item.price_in_pence))
        .sum::<i64>()
        + FIXED_ORDER_CHARGE_IN_PENCE
}

/// Exactly eight characters from `0-9A-F`.
pub fn is_valid_order_no(order_no: &str) -> bool {
    order_no.len() == ORDER_NO_LEN
        && order_no
            .chars()
            .all(|ch| matches!(ch, '0'..='9' | 'A'..='F'))
}

/// Sixteen digits with a Visa or MasterCard prefix that pass the Luhn check.
pub fn is_valid_card_number(card_number: &str) -> bool {
    card_number.len() == CARD_NUMBER_LEN
        && card_number.bytes().all(|b| b.is_ascii_digit())
        && card_brand(card_number).is_some()
        && luhn_valid(card_number)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardBrand {
    Visa,
    MasterCard,
}

/// Brand from the issuer prefix: Visa `4`, MasterCard `51-55` or `2221-2720`.
pub fn card_brand(card_number: &str) -> Option<CardBrand> {
    let prefix = |len: usize| card_number.get(..len).and_then(|p| p.parse::<u32>().ok());

    if card_number.starts_with('4') {
        return Some(CardBrand::Visa);
    }
    match (prefix(2), prefix(4)) {
        (Some(51..=55), _) | (_, Some(2221..=2720)) => Some(CardBrand::MasterCard),
        _ => None,
    }
}

/// Luhn checksum: from the rightmost digit, double every second digit
/// (subtracting 9 when the result exceeds 9); valid when the sum is a
/// multiple of ten. Non-digit input is invalid.
pub fn luhn_valid(number: &str) -> bool {
    if number.is_empty() {
        return false;
    }
    let mut sum = 0u32;
    for (index, byte) in number.bytes().rev().enumerate() {
        if !byte.is_ascii_digit() {
            return false;
        }
        let mut digit = u32::from(byte - b'0');
        if index % 2 == 1 {
            digit *= 2;
            if digit > 9 {
                digit -= 9;
            }
        }
        sum += digit;
    }
    sum % 10 == 0
}

/// Parse `MM/YY` into `(year, month)`, years taken as 20YY.
pub fn parse_expiry(expiry: &str) -> Option<(i32, u32)> {
    let (month, year) = expiry.split_once('/')?;
    if month.len() != 2 || year.len() != 2 {
        return None;
    }
    if !month.bytes().chain(year.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }
    let month: u32 = month.parse().ok()?;
    let year: i32 = year.parse().ok()?;
    (1..=12).contains(&month).then_some((2000 + year, month))
}

/// Exactly three ASCII digits.
pub fn is_valid_cvv(cvv: &str) -> bool {
    cvv.len() == CVV_LEN && cvv.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinate, MenuItem, OpeningDay, PaymentDetails};
    use chrono::NaiveDate;

    fn menu(items: &[(&str, u32)]) -> Vec<MenuItem> {
        items
            .iter()
            .map(|(name, price)| MenuItem {
                name: name.to_string(),
                price_in_pence: *price,
            })
            .collect()
    }

    fn restaurants() -> Vec<Restaurant> {
        vec![
            Restaurant::new(
                "Civerinos Slice",
                Coordinate::new(-3.1913, 55.9455).unwrap(),
                [OpeningDay::Monday, OpeningDay::Tuesday],
                menu(&[("Margherita", 800), ("Pepperoni", 900)]),
            ),
            Restaurant::new(
                "Sora Lella Vegan Restaurant",
                Coordinate::new(-3.2025, 55.9433).unwrap(),
                [OpeningDay::Monday],
                menu(&[("Meat Lover", 1400), ("Vegan Delight", 1100)]),
            ),
        ]
    }

    fn valid_order() -> Order {
        Order::new(
            "1AFFE082",
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            PaymentDetails {
                card_number: "4111111111111111".to_string(),
                card_expiry: "12/30".to_string(),
                cvv: "123".to_string(),
            },
            1800,
            vec!["Margherita".to_string(), "Pepperoni".to_string()],
        )
    }

    fn outcome(order: &Order) -> OrderOutcome {
        validate_order(order, &restaurants()).outcome
    }

    #[test]
    fn valid_order_is_priced_and_matched() {
        let validation = validate_order(&valid_order(), &restaurants());
        assert_eq!(validation.outcome, OrderOutcome::ValidButNotDelivered);
        assert_eq!(validation.restaurant.as_deref(), Some("Civerinos Slice"));
        assert_eq!(validation.total_in_pence, Some(1800));
    }

    #[test]
    fn wrong_total_is_rejected() {
        let mut order = valid_order();
        order.price_total_in_pence = 1700;
        assert_eq!(outcome(&order), OrderOutcome::InvalidTotal);
    }

    #[test]
    fn malformed_order_numbers_are_invalid() {
        for order_no in ["", "1AFFE08", "1AFFE0822", "1AFFE08G", "1affe082"] {
            let mut order = valid_order();
            order.order_no = order_no.to_string();
            assert_eq!(outcome(&order), OrderOutcome::Invalid, "{order_no}");
        }
    }

    #[test]
    fn empty_inputs_are_invalid() {
        let mut order = valid_order();
        order.order_items.clear();
        assert_eq!(outcome(&order), OrderOutcome::Invalid);
        assert_eq!(
            validate_order(&valid_order(), &[]).outcome,
            OrderOutcome::Invalid
        );
    }

    #[test]
    fn undated_order_is_invalid() {
        let mut order = valid_order();
        order.order_date = None;
        let validation = validate_order(&order, &restaurants());
        assert_eq!(validation.outcome, OrderOutcome::Invalid);
        assert_eq!(validation.restaurant, None);
    }

    #[test]
    fn unknown_pizza_is_not_defined() {
        let mut order = valid_order();
        order.order_items.push("Hawaiian".to_string());
        assert_eq!(outcome(&order), OrderOutcome::InvalidPizzaNotDefined);
    }

    #[test]
    fn pizzas_from_two_restaurants() {
        let mut order = valid_order();
        order.order_items = vec!["Margherita".to_string(), "Vegan Delight".to_string()];
        assert_eq!(
            outcome(&order),
            OrderOutcome::InvalidPizzaCombinationMultipleSuppliers
        );
    }

    #[test]
    fn card_checks() {
        let mut order = valid_order();
        order.payment.card_number = "4111111111111112".to_string();
        assert_eq!(outcome(&order), OrderOutcome::InvalidCardNumber);

        let mut order = valid_order();
        order.payment.card_expiry = "12/24".to_string();
        assert_eq!(outcome(&order), OrderOutcome::InvalidExpiryDate);

        let mut order = valid_order();
        order.payment.cvv = "12a".to_string();
        assert_eq!(outcome(&order), OrderOutcome::InvalidCvv);
    }

    #[test]
    fn expiry_in_order_month_is_accepted() {
        let mut order = valid_order();
        order.payment.card_expiry = "01/25".to_string();
        assert_eq!(outcome(&order), OrderOutcome::ValidButNotDelivered);
    }

    #[test]
    fn too_many_pizzas() {
        let mut order = valid_order();
        order.order_items = vec!["Margherita".to_string(); 5];
        order.price_total_in_pence = 5 * 800 + 100;
        assert_eq!(outcome(&order), OrderOutcome::InvalidPizzaCount);
    }

    #[test]
    fn earlier_checks_win() {
        // Bad card and bad total: the card check comes first.
        let mut order = valid_order();
        order.payment.card_number = "1234".to_string();
        order.price_total_in_pence = 1;
        assert_eq!(outcome(&order), OrderOutcome::InvalidCardNumber);
    }

    #[test]
    fn known_card_numbers() {
        assert!(is_valid_card_number("4111111111111111"));
        assert!(is_valid_card_number("5555555555554444"));
        assert!(is_valid_card_number("2223000048400011"));
        // Luhn-valid but American Express length and prefix.
        assert!(!is_valid_card_number("378282246310005"));
        // Luhn-valid but not Visa or MasterCard.
        assert!(!is_valid_card_number("6011111111111117"));
        assert!(!is_valid_card_number("4111 1111 1111 1111"));
    }

    #[test]
    fn card_brands() {
        assert_eq!(card_brand("4111111111111111"), Some(CardBrand::Visa));
        assert_eq!(card_brand("5105105105105100"), Some(CardBrand::MasterCard));
        assert_eq!(card_brand("2720990000000000"), Some(CardBrand::MasterCard));
        assert_eq!(card_brand("2721000000000000"), None);
        assert_eq!(card_brand("5605105105105100"), None);
    }

    #[test]
    fn luhn_known_values() {
        assert!(luhn_valid("79927398713"));
        assert!(!luhn_valid("79927398710"));
        assert!(!luhn_valid(""));
        assert!(!luhn_valid("7992739871x"));
    }

    #[test]
    fn expiry_parsing() {
        assert_eq!(parse_expiry("04/28"), Some((2028, 4)));
        assert_eq!(parse_expiry("13/28"), None);
        assert_eq!(parse_expiry("00/28"), None);
        assert_eq!(parse_expiry("4/28"), None);
        assert_eq!(parse_expiry("04-28"), None);
        assert_eq!(parse_expiry("+4/28"), None);
    }
}
