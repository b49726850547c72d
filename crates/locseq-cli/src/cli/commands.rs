use anyhow::Context;
use chrono::{Datelike, Local, NaiveDate};
use locseq::{
    CounterStore, Error, MemoryStore, PgStore, Registrar, RegistryStore, Year, migrate, parse,
    resolve, resolve_detailed,
};

use super::config::{AppConfig, Backend, Command};

/// An allocation that gave up under contention. The binary exits with
/// `EX_TEMPFAIL` when the failure chain contains one.
#[derive(Debug, thiserror::Error)]
#[error("{0}; try again")]
pub struct TryAgain(String);

/// Runs the configured command against the configured backend and prints its
/// output to stdout.
pub async fn dispatch(config: AppConfig) -> anyhow::Result<()> {
    let output = execute(config).await?;
    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}

async fn execute(config: AppConfig) -> anyhow::Result<String> {
    let AppConfig {
        backend,
        retry,
        command,
        ..
    } = config;

    // These never touch a store.
    match &command {
        Command::Parse { identifier } => return describe(identifier),
        Command::Resolve { location, year } => {
            let resolution = resolve_detailed(location, &reference_date(*year)?);
            return Ok(format!("{}\t{:?}", resolution.key, resolution.origin));
        }
        _ => {}
    }

    match backend {
        Backend::Memory => {
            if command == Command::Migrate {
                anyhow::bail!("migrate needs DATABASE_URL; the in-memory store has no schema");
            }
            run(&Registrar::with_policy(MemoryStore::new(), retry), command).await
        }
        Backend::Postgres {
            url,
            max_connections,
            lock_timeout,
        } => {
            let store = PgStore::connect(&url, max_connections)
                .await
                .context("failed to connect to DATABASE_URL")?
                .with_lock_timeout(lock_timeout);

            if command == Command::Migrate {
                migrate(store.pool()).await.context("migration failed")?;
                tracing::info!("Schema is up to date");
                return Ok(String::new());
            }
            run(&Registrar::with_policy(store, retry), command).await
        }
    }
}

async fn run<S>(registrar: &Registrar<S>, command: Command) -> anyhow::Result<String>
where
    S: CounterStore + RegistryStore,
{
    let output = match command {
        Command::Assign { location, year } => {
            let now = reference_date(year)?;
            let identifier = registrar
                .assign_identifier(&location, &now)
                .await
                .map_err(classify)?;
            identifier.to_string()
        }
        Command::Register { location, year } => {
            let now = reference_date(year)?;
            let record = registrar
                .register(&location, &now)
                .await
                .map_err(classify)?;
            tracing::info!(identifier = %record.identifier, "Registered");
            record.identifier.to_string()
        }
        Command::Lookup { identifier } => {
            let Some(record) = registrar.lookup(&identifier).await.map_err(classify)? else {
                anyhow::bail!("{identifier} is not registered");
            };
            format!(
                "{}\t{}\t{}\t{}",
                record.identifier,
                record.location_code,
                record.registered_year,
                record.sequence_number
            )
        }
        Command::Status { location, year } => {
            let key = resolve(&location, &reference_date(year)?);
            match registrar.last_issued(&key).await.map_err(classify)? {
                Some(last) => format!("{key}\t{last}"),
                None => format!("{key}\tnone"),
            }
        }
        other => anyhow::bail!("{other:?} does not run against a registrar"),
    };
    Ok(output)
}

fn describe(identifier: &str) -> anyhow::Result<String> {
    let (key, sequence) =
        parse(identifier).with_context(|| format!("`{identifier}` is not a valid identifier"))?;
    Ok(format!(
        "location\t{}\nyear\t{}\nsequence\t{}",
        key.location(),
        key.year(),
        sequence.get()
    ))
}

/// January 1st of `year`, or today when no year was given.
fn reference_date(year: Option<u16>) -> anyhow::Result<NaiveDate> {
    let today = Local::now().date_naive();
    let Some(year) = year else {
        return Ok(today);
    };
    let year = Year::new(year).with_context(|| format!("invalid year {year}"))?;
    today
        .with_year(i32::from(year))
        .or_else(|| NaiveDate::from_ymd_opt(i32::from(year), 1, 1))
        .with_context(|| format!("no calendar date in year {year}"))
}

fn classify<E>(err: Error<E>) -> anyhow::Error
where
    E: core::error::Error + Send + Sync + 'static,
{
    if err.is_transient() {
        tracing::warn!(error = %err, "Allocation gave up under contention");
        anyhow::Error::new(TryAgain(err.to_string()))
    } else {
        anyhow::Error::new(err)
    }
}
