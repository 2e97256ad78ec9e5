//! Repository for the `nik_confirmations` table (the local SAP mirror).
//!
//! Write operations are generic over [`PgExecutor`] so the sync job can run
//! them on the dedicated connection that holds its advisory lock.

use sqlx::{PgExecutor, PgPool};

use nik_core::display::{escape_like, SortField, SortOrder};
use nik_core::nik::normalize_pernr;
use nik_core::sync::StoreStatistics;
use nik_core::types::Timestamp;

use crate::models::nik_confirmation::{
    CreateNikConfirmation, NikConfirmation, NikConfirmationFilter,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, pernr, werks, name1, created_by, created_on, synced_at, \
                        created_at, updated_at";

/// Shared `WHERE` clause for filtered listings. `$1` = normalized pernr,
/// `$2` = escaped werks prefix, `$3` = escaped name fragment.
const FILTER_CLAUSE: &str = "($1::TEXT IS NULL OR pernr = $1) \
                              AND ($2::TEXT IS NULL OR werks LIKE $2 || '%') \
                              AND ($3::TEXT IS NULL OR name1 ILIKE '%' || $3 || '%')";

/// Provides query and bulk-replace operations for NIK confirmations.
pub struct NikConfirmationRepo;

/// Filter values ready to bind, with blanks dropped.
struct BoundFilter {
    pernr: Option<String>,
    werks: Option<String>,
    search: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl BoundFilter {
    fn from_filter(filter: &NikConfirmationFilter) -> Self {
        Self {
            pernr: non_blank(&filter.pernr).map(normalize_pernr),
            werks: non_blank(&filter.werks).map(escape_like),
            search: non_blank(&filter.search).map(escape_like),
        }
    }
}

impl NikConfirmationRepo {
    /// Insert a single confirmation.
    ///
    /// Fails with a unique violation on `uq_nik_confirmations_pernr_werks`
    /// when the `(pernr, werks)` pair already exists.
    pub async fn create<'e, E>(
        executor: E,
        input: &CreateNikConfirmation,
    ) -> Result<(), sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query(
            "INSERT INTO nik_confirmations
                (pernr, werks, name1, created_by, created_on, synced_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(&input.pernr)
        .bind(&input.werks)
        .bind(&input.name1)
        .bind(&input.created_by)
        .bind(input.created_on)
        .bind(input.synced_at)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Delete every row. Returns the number of rows removed.
    pub async fn delete_all<'e, E>(executor: E) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM nik_confirmations")
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    /// List one page of confirmations matching `filter`.
    ///
    /// Ties on the sort column are broken by `id` so paging is stable.
    pub async fn list(
        pool: &PgPool,
        filter: &NikConfirmationFilter,
        sort_by: SortField,
        sort_order: SortOrder,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<NikConfirmation>, sqlx::Error> {
        let bound = BoundFilter::from_filter(filter);
        let query = format!(
            "SELECT {COLUMNS} FROM nik_confirmations
             WHERE {FILTER_CLAUSE}
             ORDER BY {} {}, id ASC
             LIMIT $4 OFFSET $5",
            sort_by.as_str(),
            sort_order.as_sql(),
        );
        sqlx::query_as::<_, NikConfirmation>(&query)
            .bind(&bound.pernr)
            .bind(&bound.werks)
            .bind(&bound.search)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count confirmations matching `filter`.
    pub async fn count(pool: &PgPool, filter: &NikConfirmationFilter) -> Result<i64, sqlx::Error> {
        let bound = BoundFilter::from_filter(filter);
        let query = format!("SELECT COUNT(*) FROM nik_confirmations WHERE {FILTER_CLAUSE}");
        let (count,): (i64,) = sqlx::query_as(&query)
            .bind(&bound.pernr)
            .bind(&bound.werks)
            .bind(&bound.search)
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// Summarize how fresh the local mirror is.
    ///
    /// Day, week, and month boundaries follow the database session time zone.
    pub async fn statistics(pool: &PgPool) -> Result<StoreStatistics, sqlx::Error> {
        let (total_records, last_sync, synced_today, synced_this_week, synced_this_month): (
            i64,
            Option<Timestamp>,
            i64,
            i64,
            i64,
        ) = sqlx::query_as(
            "SELECT
                COUNT(*),
                MAX(synced_at),
                COUNT(*) FILTER (WHERE synced_at >= date_trunc('day', NOW())),
                COUNT(*) FILTER (WHERE synced_at >= date_trunc('week', NOW())),
                COUNT(*) FILTER (WHERE synced_at >= date_trunc('month', NOW()))
             FROM nik_confirmations",
        )
        .fetch_one(pool)
        .await?;

        Ok(StoreStatistics {
            total_records,
            last_sync,
            synced_today,
            synced_this_week,
            synced_this_month,
        })
    }
}
