//! PostgreSQL-backed `DomainListRepository` implementation using Diesel.
//!
//! The unique index on `domain_lists.domain` enforces the one-list-per-
//! domain invariant at the store level; unique violations surface as
//! `Conflict` so the service layer can treat racing inserts the same as a
//! pre-checked duplicate. `replace_all` runs as a single transaction so
//! concurrent readers observe either the previous or the new list contents,
//! never an empty or partial store.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::debug;

use crate::domain::ports::{DomainListRepository, DomainListRepositoryError};
use crate::domain::{Classification, DomainName, DomainRecord};

use super::models::{DomainListRow, NewDomainListRow};
use super::pool::{DbPool, PoolError};
use super::schema::domain_lists;

/// Rows inserted per statement during bulk replacement, bounding statement
/// size for feeds with tens of thousands of entries.
const INSERT_BATCH_SIZE: usize = 1000;

/// Diesel-backed implementation of the `DomainListRepository` port.
#[derive(Clone)]
pub struct DieselDomainListRepository {
    pool: DbPool,
}

impl DieselDomainListRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> DomainListRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            DomainListRepositoryError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> DomainListRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => DomainListRepositoryError::query("record not found"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            DomainListRepositoryError::connection("database connection error")
        }
        DieselError::DatabaseError(_, _) => DomainListRepositoryError::query("database error"),
        _ => DomainListRepositoryError::query("database error"),
    }
}

fn is_unique_violation(error: &diesel::result::Error) -> bool {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};
    matches!(
        error,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
    )
}

fn row_to_record(row: DomainListRow) -> Result<DomainRecord, DomainListRepositoryError> {
    row.into_record().map_err(DomainListRepositoryError::query)
}

#[async_trait]
impl DomainListRepository for DieselDomainListRepository {
    async fn find(
        &self,
        domain: &DomainName,
    ) -> Result<Option<DomainRecord>, DomainListRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<DomainListRow> = domain_lists::table
            .filter(domain_lists::domain.eq(domain.as_str()))
            .select(DomainListRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_record).transpose()
    }

    async fn insert(
        &self,
        domain: &DomainName,
        classification: Classification,
    ) -> Result<(), DomainListRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewDomainListRow::from_record(&DomainRecord {
            domain: domain.clone(),
            classification,
        });
        diesel::insert_into(domain_lists::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(|error| {
                if is_unique_violation(&error) {
                    DomainListRepositoryError::conflict(domain.as_str())
                } else {
                    map_diesel_error(error)
                }
            })?;
        Ok(())
    }

    async fn reclassify(
        &self,
        domain: &DomainName,
        classification: Classification,
    ) -> Result<(), DomainListRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated = diesel::update(
            domain_lists::table.filter(domain_lists::domain.eq(domain.as_str())),
        )
        .set((
            domain_lists::list.eq(classification.as_str()),
            domain_lists::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        if updated == 0 {
            return Err(DomainListRepositoryError::not_found(domain.as_str()));
        }
        Ok(())
    }

    async fn remove(
        &self,
        domain: &DomainName,
        classification: Classification,
    ) -> Result<(), DomainListRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(
            domain_lists::table
                .filter(domain_lists::domain.eq(domain.as_str()))
                .filter(domain_lists::list.eq(classification.as_str())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        if deleted == 0 {
            return Err(DomainListRepositoryError::not_found(domain.as_str()));
        }
        Ok(())
    }

    async fn list(
        &self,
        classification: Classification,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<DomainRecord>, DomainListRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let offset = i64::from(page.saturating_sub(1)) * i64::from(page_size);
        let rows: Vec<DomainListRow> = domain_lists::table
            .filter(domain_lists::list.eq(classification.as_str()))
            .order(domain_lists::domain.asc())
            .offset(offset)
            .limit(i64::from(page_size))
            .select(DomainListRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_record).collect()
    }

    async fn count(
        &self,
        classification: Classification,
    ) -> Result<u64, DomainListRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = domain_lists::table
            .filter(domain_lists::list.eq(classification.as_str()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(total.unsigned_abs())
    }

    async fn replace_all(
        &self,
        records: Vec<DomainRecord>,
    ) -> Result<(), DomainListRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<NewDomainListRow> =
            records.iter().map(NewDomainListRow::from_record).collect();

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                diesel::delete(domain_lists::table).execute(conn).await?;
                for batch in rows.chunks(INSERT_BATCH_SIZE) {
                    diesel::insert_into(domain_lists::table)
                        .values(batch)
                        .execute(conn)
                        .await?;
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn disposable_domains(&self) -> Result<Vec<DomainName>, DomainListRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let domains: Vec<String> = domain_lists::table
            .filter(domain_lists::list.eq(Classification::Disposable.as_str()))
            .select(domain_lists::domain)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        domains
            .into_iter()
            .map(|raw| DomainName::new(&raw).map_err(DomainListRepositoryError::query))
            .collect()
    }

    async fn all_domains(&self) -> Result<Vec<DomainName>, DomainListRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let domains: Vec<String> = domain_lists::table
            .select(domain_lists::domain)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        domains
            .into_iter()
            .map(|raw| DomainName::new(&raw).map_err(DomainListRepositoryError::query))
            .collect()
    }
}
