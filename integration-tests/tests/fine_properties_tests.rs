//! Fine engine properties, driven through policy JSON as the dashboards send it

use chrono::{DateTime, Duration, Utc};
use fine_service::{evaluate_fine, FineError, FinePolicy};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use shared::types::{Booking, BookingStatus};

const MONDAY: &str = "2026-10-12T07:30:00Z";
const SATURDAY: &str = "2026-10-17T07:30:00Z";

fn booking(start: &str) -> Booking {
    Booking::new("bk-1", "driver-42", "L2-019", start, BookingStatus::Active)
}

fn elapsed(start: &str, minutes: i64) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(start).unwrap().with_timezone(&Utc) + Duration::minutes(minutes)
}

fn policy(json: &str) -> FinePolicy {
    FinePolicy::from_json(json).unwrap()
}

fn prior(count: usize) -> Vec<Booking> {
    (0..count)
        .map(|i| {
            Booking::new(
                format!("old-{}", i),
                "driver-42",
                "L1-001",
                "2026-09-01T10:00:00Z",
                BookingStatus::Cancelled,
            )
        })
        .collect()
}

// =============================================================================
// Grace period dominance
// =============================================================================

#[test]
fn test_grace_period_beats_every_policy_type() {
    for kind in ["none", "immediate", "hourly", "daily", "tiered", "progressive", "exponential"] {
        let p = policy(&format!(
            r#"{{"type": "{}", "gracePeriodMinutes": 20, "weekendMultiplier": 3,
                "repeatOffenderMultiplier": 4, "immediateRate": 99}}"#,
            kind
        ));
        for minutes in [0, 1, 19, 20] {
            let result = evaluate_fine(&booking(SATURDAY), &p, &prior(5), elapsed(SATURDAY, minutes))
                .unwrap();
            assert_eq!(result.fine, Decimal::ZERO, "{} at {} min", kind, minutes);
        }
    }
}

// =============================================================================
// Monotonicity
// =============================================================================

#[test]
fn test_hourly_and_daily_never_decrease() {
    for json in [
        r#"{"type": "hourly", "hourlyRate": 3}"#,
        r#"{"type": "daily", "dailyRate": 25}"#,
    ] {
        let p = policy(json);
        let fines: Vec<Decimal> = (0..200)
            .map(|step| {
                evaluate_fine(&booking(MONDAY), &p, &[], elapsed(MONDAY, step * 23))
                    .unwrap()
                    .fine
            })
            .collect();
        assert!(fines.windows(2).all(|pair| pair[0] <= pair[1]), "{}", json);
    }
}

// =============================================================================
// Cap and floor
// =============================================================================

#[test]
fn test_cap_holds_for_every_type() {
    for kind in ["immediate", "hourly", "daily", "tiered", "progressive", "exponential"] {
        let p = policy(&format!(
            r#"{{"type": "{}", "maxFine": 12, "immediateRate": 40, "weekendMultiplier": 2,
                "repeatOffenderMultiplier": 2}}"#,
            kind
        ));
        for hours in [1, 5, 30, 200] {
            let result =
                evaluate_fine(&booking(SATURDAY), &p, &prior(3), elapsed(SATURDAY, hours * 60))
                    .unwrap();
            assert!(result.fine <= dec!(12), "{} after {}h gave {}", kind, hours, result.fine);
        }
    }
}

#[test]
fn test_fine_is_never_negative() {
    let p = policy(r#"{"type": "tiered", "loyaltyDiscount": 100}"#);
    for hours in [1, 4, 48] {
        let result = evaluate_fine(&booking(MONDAY), &p, &[], elapsed(MONDAY, hours * 60)).unwrap();
        assert!(result.fine >= Decimal::ZERO);
        assert_eq!(result.fine, Decimal::ZERO);
    }
}

// =============================================================================
// Schedules
// =============================================================================

#[test]
fn test_tiered_threshold_match() {
    let p = policy(
        r#"{"type": "tiered", "tieredRates": [
            {"hours": 0, "rate": 5}, {"hours": 1, "rate": 10}, {"hours": 3, "rate": 15}
        ]}"#,
    );
    let result = evaluate_fine(&booking(MONDAY), &p, &[], elapsed(MONDAY, 180)).unwrap();
    assert_eq!(result.fine, dec!(15));
}

#[test]
fn test_progressive_past_last_interval() {
    let p = policy(
        r#"{"type": "progressive", "progressiveRates": [
            {"startHour": 0, "endHour": 4, "baseRate": 5, "multiplier": 0},
            {"startHour": 4, "endHour": 12, "baseRate": 9, "multiplier": 0}
        ]}"#,
    );
    let result = evaluate_fine(&booking(MONDAY), &p, &[], elapsed(MONDAY, 40 * 60)).unwrap();
    assert_eq!(result.fine, dec!(9));
}

// =============================================================================
// Loyalty
// =============================================================================

#[test]
fn test_loyalty_requires_clean_history() {
    let p = policy(r#"{"type": "immediate", "immediateRate": 20, "loyaltyDiscount": 25}"#);

    let clean = evaluate_fine(&booking(MONDAY), &p, &[], elapsed(MONDAY, 60)).unwrap();
    assert_eq!(clean.fine, dec!(15));

    let one = evaluate_fine(&booking(MONDAY), &p, &prior(1), elapsed(MONDAY, 60)).unwrap();
    assert_eq!(one.fine, dec!(20));
}

// =============================================================================
// Worked examples
// =============================================================================

#[test]
fn test_hourly_three_point_two_hours() {
    let p = policy(r#"{"type": "hourly", "hourlyRate": 2, "maxFine": 50}"#);
    let result = evaluate_fine(&booking(MONDAY), &p, &[], elapsed(MONDAY, 192)).unwrap();
    assert_eq!(result.fine, dec!(8.00));
}

#[test]
fn test_hourly_thirty_hours_capped() {
    let p = policy(r#"{"type": "hourly", "hourlyRate": 2, "maxFine": 50}"#);
    let result = evaluate_fine(&booking(MONDAY), &p, &[], elapsed(MONDAY, 30 * 60)).unwrap();
    assert_eq!(result.fine, dec!(50.00));
    assert!(result.description.contains("Capped"));
}

#[test]
fn test_saturday_flat_fee_with_weekend_multiplier() {
    let p = policy(r#"{"type": "immediate", "immediateRate": 10, "weekendMultiplier": 1.5}"#);
    let result = evaluate_fine(&booking(SATURDAY), &p, &[], elapsed(SATURDAY, 45)).unwrap();
    assert_eq!(result.fine, dec!(15.00));
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_unknown_policy_type_is_an_error() {
    let err = FinePolicy::from_json(r#"{"type": "monthly"}"#).unwrap_err();
    assert_eq!(err, FineError::UnrecognizedPolicyType("monthly".to_string()));
}

#[test]
fn test_unparseable_start_time_is_an_error() {
    let p = policy(r#"{"type": "hourly"}"#);
    let bad = Booking::new("bk-2", "driver-42", "L2-019", "2026-13-45T99:00", BookingStatus::Active);
    let err = evaluate_fine(&bad, &p, &[], Utc::now()).unwrap_err();
    assert!(matches!(err, FineError::InvalidBooking { .. }));
}
