//! PostgreSQL-backed counter and registry store.
//!
//! The counter increment is a single upsert statement, so the row lock taken
//! by `ON CONFLICT DO UPDATE` is the only serialisation point between
//! writers, whichever process they run in:
//!
//! ```sql
//! INSERT INTO sequence_counters AS c (location_code, year, last_issued)
//! VALUES ($1, $2, 1)
//! ON CONFLICT (location_code, year)
//! DO UPDATE SET last_issued = c.last_issued + 1
//! RETURNING c.last_issued
//! ```
//!
//! Each increment runs in its own transaction with `lock_timeout` set, so a
//! hot row makes callers back off through [`CounterStatus::Contended`]
//! instead of queueing without bound.

use core::{future::Future, time::Duration};

use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::{
    CounterStatus, CounterStore, FormatError, Identifier, IdentifierRecord, InsertStatus,
    PartitionKey, RegistryStore, Store,
};

const SCHEMA: &str = include_str!("../../sql/schema.sql");

const INCREMENT: &str = "\
INSERT INTO sequence_counters AS c (location_code, year, last_issued) \
VALUES ($1::char(3), $2, 1) \
ON CONFLICT (location_code, year) \
DO UPDATE SET last_issued = c.last_issued + 1 \
RETURNING c.last_issued";

const LAST_ISSUED: &str = "\
SELECT last_issued FROM sequence_counters \
WHERE location_code = $1::char(3) AND year = $2";

const INSERT_IDENTIFIER: &str = "\
INSERT INTO registered_identifiers \
(identifier, location_code, registered_year, sequence_number) \
VALUES ($1, $2::char(3), $3, $4)";

const FIND_IDENTIFIER: &str = "\
SELECT identifier FROM registered_identifiers WHERE identifier = $1";

/// SQLSTATEs that mean "try again": `lock_not_available`,
/// `serialization_failure`, `deadlock_detected`.
const TRANSIENT_SQLSTATES: &[&str] = &["55P03", "40001", "40P01"];

/// Default `lock_timeout` applied to each increment transaction.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_millis(250);

/// Errors from [`PgStore`] that retrying will not fix.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PgError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A counter row held a negative value, violating the table's check
    /// constraint.
    #[error("counter for {key} is negative: {value}")]
    NegativeCounter { key: PartitionKey, value: i64 },

    /// A registry row did not hold a canonical identifier.
    #[error("corrupt identifier row {raw:?}: {source}")]
    CorruptIdentifier { raw: String, source: FormatError },
}

/// Counter and registry store backed by PostgreSQL through a `sqlx` pool.
///
/// Every process pointing at the same database shares the same counters; the
/// database provides both the atomic increment and the `UNIQUE` backstop on
/// identifiers. Apply the schema with [`migrate`] before first use.
#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
    lock_timeout: Duration,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    /// Connects a new pool of at most `max_connections` to `url`.
    ///
    /// # Errors
    ///
    /// Returns [`PgError::Database`] if the initial connection fails.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, PgError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Sets the `lock_timeout` used for each increment transaction.
    ///
    /// PostgreSQL reads `0` as "wait forever", so anything below one
    /// millisecond is sent as `1ms`.
    #[must_use]
    pub fn with_lock_timeout(mut self, lock_timeout: Duration) -> Self {
        self.lock_timeout = lock_timeout;
        self
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn increment(&self, key: PartitionKey) -> Result<CounterStatus, PgError> {
        let location = key.location();
        let committed = async {
            let mut tx = self.pool.begin().await?;
            sqlx::query("SELECT set_config('lock_timeout', $1, true)")
                .bind(lock_timeout_setting(self.lock_timeout))
                .execute(&mut *tx)
                .await?;
            let value: i64 = sqlx::query_scalar(INCREMENT)
                .bind(location.as_str())
                .bind(i32::from(key.year()))
                .fetch_one(&mut *tx)
                .await?;
            tx.commit().await?;
            Ok::<_, sqlx::Error>(value)
        }
        .await;

        match committed {
            Ok(value) => u64::try_from(value)
                .map(|value| CounterStatus::Issued { value })
                .map_err(|_| PgError::NegativeCounter { key, value }),
            Err(err) if is_transient(&err) => Ok(CounterStatus::Contended),
            Err(err) => Err(err.into()),
        }
    }

    async fn fetch_last_issued(&self, key: PartitionKey) -> Result<Option<u64>, PgError> {
        let location = key.location();
        let value: Option<i64> = sqlx::query_scalar(LAST_ISSUED)
            .bind(location.as_str())
            .bind(i32::from(key.year()))
            .fetch_optional(&self.pool)
            .await?;
        value
            .map(|value| u64::try_from(value).map_err(|_| PgError::NegativeCounter { key, value }))
            .transpose()
    }

    async fn insert_record(&self, record: IdentifierRecord) -> Result<InsertStatus, PgError> {
        let inserted = sqlx::query(INSERT_IDENTIFIER)
            .bind(record.identifier.to_string())
            .bind(record.location_code.as_str())
            .bind(i32::from(record.registered_year))
            .bind(i32::from(record.sequence_number))
            .execute(&self.pool)
            .await;

        match inserted {
            Ok(_) => Ok(InsertStatus::Inserted),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Ok(InsertStatus::Duplicate)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn find_record(
        &self,
        identifier: Identifier,
    ) -> Result<Option<IdentifierRecord>, PgError> {
        let raw: Option<String> = sqlx::query_scalar(FIND_IDENTIFIER)
            .bind(identifier.to_string())
            .fetch_optional(&self.pool)
            .await?;
        raw.map(|raw| {
            raw.parse::<Identifier>()
                .map(IdentifierRecord::from)
                .map_err(|source| PgError::CorruptIdentifier { raw, source })
        })
        .transpose()
    }
}

/// Applies `sql/schema.sql`. Every statement is `IF NOT EXISTS`, so this is
/// safe to run on every start.
///
/// # Errors
///
/// Returns the underlying `sqlx` error if any statement fails.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    Ok(())
}

fn lock_timeout_setting(lock_timeout: Duration) -> String {
    format!("{}ms", lock_timeout.as_millis().max(1))
}

fn is_transient(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::PoolTimedOut => true,
        sqlx::Error::Database(db) => db
            .code()
            .is_some_and(|code| TRANSIENT_SQLSTATES.iter().any(|state| code == *state)),
        _ => false,
    }
}

impl Store for PgStore {
    type Err = PgError;
}

impl CounterStore for PgStore {
    fn try_increment(
        &self,
        key: &PartitionKey,
    ) -> impl Future<Output = Result<CounterStatus, Self::Err>> + Send {
        self.increment(*key)
    }

    fn last_issued(
        &self,
        key: &PartitionKey,
    ) -> impl Future<Output = Result<Option<u64>, Self::Err>> + Send {
        self.fetch_last_issued(*key)
    }
}

impl RegistryStore for PgStore {
    fn insert(
        &self,
        record: &IdentifierRecord,
    ) -> impl Future<Output = Result<InsertStatus, Self::Err>> + Send {
        self.insert_record(*record)
    }

    fn find(
        &self,
        identifier: &Identifier,
    ) -> impl Future<Output = Result<Option<IdentifierRecord>, Self::Err>> + Send {
        self.find_record(*identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_timeout_never_renders_as_zero() {
        assert_eq!(lock_timeout_setting(DEFAULT_LOCK_TIMEOUT), "250ms");
        assert_eq!(lock_timeout_setting(Duration::from_secs(5)), "5000ms");
        assert_eq!(lock_timeout_setting(Duration::from_micros(400)), "1ms");
        assert_eq!(lock_timeout_setting(Duration::ZERO), "1ms");
    }
}
