mod common;

use chrono::{NaiveDate, NaiveDateTime, Timelike, Utc};
use postgreslite::prelude::*;

const CREATE_TEST: &str = "
    CREATE TABLE IF NOT EXISTS test (
        id INTEGER PRIMARY KEY UNIQUE,
        timer DATETIME,
        stamped TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
        day DATE,
        legacy TIMESTAMP,
        note TEXT
    );
";

fn sample_timestamp() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 17)
        .and_then(|d| d.and_hms_micro_opt(13, 45, 30, 123_456))
        .expect("valid timestamp")
}

#[test]
fn timestamp_round_trips_through_sync_pool() -> Result<(), PostgresLiteError> {
    common::init_tracing();
    let pool = PostgresLite::new(":memory:")?.connect()?;
    pool.execute(CREATE_TEST, &[])?;

    let now = sample_timestamp();
    let status = pool.execute(
        "INSERT INTO test (id, timer) VALUES (1, ?) ON CONFLICT (id) DO NOTHING",
        &args![now],
    )?;
    assert_eq!(status, "INSERT 1");

    let row = pool
        .fetchrow("SELECT * FROM test WHERE id = 1", &[])?
        .expect("inserted row");
    assert_eq!(row.get("timer"), Some(&Value::Timestamp(now)));
    assert!(row.get("stamped").and_then(Value::as_timestamp).is_some());
    Ok(())
}

#[tokio::test]
async fn timestamp_round_trips_through_async_pool() -> Result<(), PostgresLiteError> {
    let pool = PostgresLite::new(":memory:")?.connect_async()?;
    pool.execute(CREATE_TEST, &[]).await?;

    let now = Utc::now().naive_utc();
    pool.execute("INSERT INTO test (id, timer) VALUES ($1, $2)", &args![1, now])
        .await?;
    let stored = pool
        .fetchval("SELECT timer FROM test WHERE id = $1", &args![1])
        .await?
        .and_then(|v| v.as_timestamp())
        .expect("timestamp column");

    // Text storage keeps microseconds.
    assert_eq!(stored.and_utc().timestamp_micros(), now.and_utc().timestamp_micros());
    pool.close().await
}

#[test]
fn dates_and_legacy_epoch_columns_convert() -> Result<(), PostgresLiteError> {
    let pool = PostgresLite::new(":memory:")?.connect()?;
    pool.execute(CREATE_TEST, &[])?;

    let day = NaiveDate::from_ymd_opt(1999, 12, 31).expect("valid date");
    let epoch = sample_timestamp().and_utc().timestamp();
    pool.execute(
        "INSERT INTO test (id, day, legacy, note) VALUES ($1, $2, $3, $4)",
        &args![1, day, epoch, "2024-05-17"],
    )?;

    let row = pool
        .fetchrow("SELECT day, legacy, note FROM test", &[])?
        .expect("inserted row");
    assert_eq!(row.get("day"), Some(&Value::Date(day)));
    assert_eq!(
        row.get("legacy").and_then(Value::as_timestamp),
        sample_timestamp().with_nanosecond(0)
    );
    // Undeclared temporal text stays text.
    assert_eq!(row.get("note"), Some(&Value::Text("2024-05-17".into())));
    Ok(())
}

#[test]
fn custom_converters_apply_by_declared_type() -> Result<(), PostgresLiteError> {
    fn shout(raw: &Value) -> Option<Value> {
        raw.as_text().map(|s| Value::Text(s.to_uppercase()))
    }
    postgreslite::settings::register_converter("SHOUTING", shout);

    let pool = PostgresLite::new(":memory:")?.connect()?;
    pool.execute("CREATE TABLE loud (word SHOUTING)", &[])?;
    pool.execute("INSERT INTO loud VALUES ($1)", &args!["hello"])?;
    assert_eq!(
        pool.fetchval("SELECT word FROM loud", &[])?,
        Some(Value::Text("HELLO".into()))
    );
    Ok(())
}
