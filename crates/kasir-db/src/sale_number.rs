//! # Sale Number Generation
//!
//! Human-readable, date-scoped sale numbers: `SALE-YYYYMMDD-NNNN`. The date
//! is the store's local date and the sequence resets at local midnight.
//!
//! ## Collision Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  The sequence is derived from a COUNT of the day's sales inside the     │
//! │  checkout transaction. Two concurrent checkouts can compute the same    │
//! │  number; the UNIQUE index on sales.sale_number rejects the second       │
//! │  insert, and the engine retries its whole transaction with a number     │
//! │  reissued from the day's highest sequence, which by then includes the   │
//! │  winner's row. Cancelled sales keep their number, so the count (which   │
//! │  includes them) never hands a number out twice.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Local, LocalResult, NaiveDate, NaiveTime, TimeDelta, TimeZone, Utc};
use sqlx::SqliteConnection;

use crate::error::DbResult;

// =============================================================================
// Local Day Boundaries
// =============================================================================

/// The store-local calendar date containing `now`.
pub(crate) fn local_date(now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&Local).date_naive()
}

/// UTC instant of local midnight starting the day that contains `now`.
///
/// Shared with the summary windows so sale-number scoping and reporting
/// agree on where a day begins.
pub(crate) fn local_day_start(now: DateTime<Utc>) -> DateTime<Utc> {
    day_start_of(local_date(now))
}

/// UTC instant of local midnight on `date`.
pub(crate) fn day_start_of(date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    match Local.from_local_datetime(&midnight) {
        LocalResult::Single(start) | LocalResult::Ambiguous(start, _) => {
            start.with_timezone(&Utc)
        }
        // DST gap at midnight: the day starts when clocks resume
        LocalResult::None => Local
            .from_local_datetime(&(midnight + TimeDelta::hours(1)))
            .earliest()
            .map(|start| start.with_timezone(&Utc))
            .unwrap_or_else(|| midnight.and_utc()),
    }
}

// =============================================================================
// Generation
// =============================================================================

/// Formats a sale number from a date and a 1-based daily sequence.
///
/// The sequence is zero-padded to 4 digits and simply grows wider past
/// 9999 sales in one day.
pub fn format_sale_number(date: NaiveDate, sequence: i64) -> String {
    format!("SALE-{}-{:04}", date.format("%Y%m%d"), sequence)
}

/// Computes the next sale number for `now`'s local date.
///
/// Must be called on the checkout transaction's connection so the count and
/// the subsequent insert see a consistent snapshot.
pub async fn next_sale_number(
    conn: &mut SqliteConnection,
    now: DateTime<Utc>,
) -> DbResult<String> {
    let date = local_date(now);
    let day_start = day_start_of(date);
    let day_end = day_start_of(date + TimeDelta::days(1));

    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM sales WHERE sale_date >= ?1 AND sale_date < ?2")
            .bind(day_start)
            .bind(day_end)
            .fetch_one(&mut *conn)
            .await?;

    Ok(format_sale_number(date, count + 1))
}

/// Reissues a sale number after a uniqueness collision.
///
/// Scans the day's issued numbers and continues one past the highest, so a
/// proposal that lost a race (or collided with an out-of-sequence row) is
/// never proposed again.
pub async fn reissue_sale_number(
    conn: &mut SqliteConnection,
    now: DateTime<Utc>,
) -> DbResult<String> {
    let date = local_date(now);
    let prefix = format!("SALE-{}-", date.format("%Y%m%d"));

    let issued: Vec<String> =
        sqlx::query_scalar("SELECT sale_number FROM sales WHERE sale_number LIKE ?1 || '%'")
            .bind(&prefix)
            .fetch_all(&mut *conn)
            .await?;

    let highest = issued
        .iter()
        .filter_map(|number| number.strip_prefix(&prefix))
        .filter_map(|sequence| sequence.parse::<i64>().ok())
        .max()
        .unwrap_or(0);

    Ok(format_sale_number(date, highest + 1))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn format_pads_to_four_digits() {
        assert_eq!(format_sale_number(date(2026, 8, 25), 1), "SALE-20260825-0001");
        assert_eq!(format_sale_number(date(2026, 8, 25), 42), "SALE-20260825-0042");
        assert_eq!(format_sale_number(date(2026, 1, 3), 9999), "SALE-20260103-9999");
    }

    #[test]
    fn format_grows_past_9999() {
        assert_eq!(format_sale_number(date(2026, 8, 25), 10001), "SALE-20260825-10001");
    }

    #[test]
    fn day_starts_at_local_midnight() {
        let now = Utc::now();
        let start = local_day_start(now);

        assert!(start <= now);
        // a local day is 23-25 hours across DST transitions
        assert!(now - start < TimeDelta::hours(26));
        assert_eq!(
            start.with_timezone(&Local).date_naive(),
            now.with_timezone(&Local).date_naive()
        );
    }

    #[tokio::test]
    async fn first_number_of_an_empty_day_is_0001() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();

        let now = Utc::now();
        let number = next_sale_number(&mut conn, now).await.unwrap();
        assert_eq!(number, format_sale_number(local_date(now), 1));
    }

    #[tokio::test]
    async fn reissue_on_an_empty_day_is_0001() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();

        let now = Utc::now();
        let number = reissue_sale_number(&mut conn, now).await.unwrap();
        assert_eq!(number, format_sale_number(local_date(now), 1));
    }
}
