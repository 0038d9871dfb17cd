//! Property-based tests for the pure ledger computations.

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use storeledger_api::{
    handlers::common::PaginationMeta,
    repositories::report_repository::SaleRow,
    services::{movements::total_amount, reports::bucket_sales, PageRequest},
};

// Prices in cents up to 9999.99
fn price_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn sale_strategy() -> impl Strategy<Value = (i64, u32, i32, i64)> {
    // (day offset, second of day, quantity, amount in cents)
    (-3i64..12, 0u32..86_400, 1i32..50, 0i64..10_000)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn total_amount_is_exact_for_cent_prices(qty in 1i32..10_000, price in price_strategy()) {
        let total = total_amount(qty, price);
        prop_assert_eq!(total, Decimal::from(qty) * price);
        prop_assert!(total.scale() <= 2);
        prop_assert!(total >= Decimal::ZERO);
    }

    #[test]
    fn pagination_covers_every_row_once(total in 0u64..10_000, size in 1u64..200) {
        let meta = PaginationMeta::new(1, size, total);
        prop_assert!(meta.pages * size >= total);
        if meta.pages > 0 {
            prop_assert!((meta.pages - 1) * size < total);
        } else {
            prop_assert_eq!(total, 0);
        }

        let last = PageRequest::new(meta.pages.max(1), size);
        prop_assert!(last.offset() <= total);
    }

    #[test]
    fn trend_buckets_are_contiguous_and_conserve_in_window_sales(
        days in 1u32..30,
        sales in prop::collection::vec(sale_strategy(), 0..40),
    ) {
        let start = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let start_at = Utc.from_utc_datetime(&start.and_hms_opt(0, 0, 0).unwrap());
        let rows: Vec<SaleRow> = sales
            .iter()
            .map(|(day, second, quantity, cents)| SaleRow {
                outbound_date: start_at + Duration::days(*day) + Duration::seconds(i64::from(*second)),
                quantity: *quantity,
                total_amount: Decimal::new(*cents, 2),
            })
            .collect();

        let trend = bucket_sales(&rows, start, days);
        prop_assert_eq!(trend.len(), days as usize);
        for (i, point) in trend.iter().enumerate() {
            prop_assert_eq!(point.date, start + Duration::days(i as i64));
        }

        let in_window: Vec<&(i64, u32, i32, i64)> = sales
            .iter()
            .filter(|(day, ..)| *day >= 0 && *day < i64::from(days))
            .collect();
        let expected_quantity: i64 = in_window.iter().map(|(_, _, q, _)| i64::from(*q)).sum();
        let expected_amount: Decimal = in_window.iter().map(|(_, _, _, c)| Decimal::new(*c, 2)).sum();
        prop_assert_eq!(trend.iter().map(|p| p.quantity).sum::<i64>(), expected_quantity);
        prop_assert_eq!(trend.iter().map(|p| p.amount).sum::<Decimal>(), expected_amount);
        prop_assert_eq!(trend.iter().map(|p| p.orders).sum::<u64>(), in_window.len() as u64);
    }
}
