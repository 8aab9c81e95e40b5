//! PostgreSQL claim store
//!
//! Statuses are stored as their lowercase text form. Every mutation is one
//! statement guarded by `status = $expected`; when it touches no rows the
//! store re-reads the claim to tell a vanished claim from a stale status.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{
    AdapterHealth, Amount, ClaimId, DomainPort, HealthCheckResult, HealthCheckable, OwnerId,
    PortError,
};
use domain_claims::ports::{check_new_claim, stale_precondition};
use domain_claims::{Claim, ClaimPatch, ClaimStatus, ClaimStore, NewClaim};

use crate::error::DatabaseError;

const CLAIM_COLUMNS: &str = "claim_id, owner_id, amount, invoice_date, reason, tax_id, \
                             status, created_at, review_started_at";

/// Database row for the claims table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ClaimRow {
    pub claim_id: i64,
    pub owner_id: String,
    pub amount: Decimal,
    pub invoice_date: NaiveDate,
    pub reason: String,
    pub tax_id: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub review_started_at: Option<DateTime<Utc>>,
}

impl TryFrom<ClaimRow> for Claim {
    type Error = DatabaseError;

    fn try_from(row: ClaimRow) -> Result<Self, Self::Error> {
        let id = u64::try_from(row.claim_id)
            .map_err(|_| DatabaseError::CorruptRow(format!("negative claim id {}", row.claim_id)))?;
        let status = row
            .status
            .parse::<ClaimStatus>()
            .map_err(|e| DatabaseError::CorruptRow(e.to_string()))?;
        Ok(Claim {
            id: ClaimId::new(id),
            owner_id: OwnerId::new(row.owner_id),
            amount: Amount::from_trusted(row.amount),
            invoice_date: row.invoice_date,
            reason: row.reason,
            tax_id: row.tax_id,
            status,
            created_at: row.created_at,
            review_started_at: row.review_started_at,
        })
    }
}

/// Claim store backed by PostgreSQL
#[derive(Debug, Clone)]
pub struct PgClaimStore {
    pool: PgPool,
}

impl PgClaimStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn current_status(&self, id: i64) -> Result<Option<ClaimStatus>, PortError> {
        let status: Option<String> =
            sqlx::query_scalar("SELECT status FROM claims WHERE claim_id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(DatabaseError::from)?;
        status
            .map(|s| s.parse::<ClaimStatus>())
            .transpose()
            .map_err(|e| DatabaseError::CorruptRow(e.to_string()).into())
    }

    /// Explains why a guarded statement touched no rows
    async fn missed_guard(&self, id: ClaimId, db_id: i64, expected: ClaimStatus) -> PortError {
        match self.current_status(db_id).await {
            Ok(Some(actual)) => stale_precondition(id, expected, actual),
            Ok(None) => PortError::not_found("Claim", id),
            Err(e) => e,
        }
    }
}

/// Ids beyond `i64::MAX` cannot exist in a BIGSERIAL column
fn db_id(id: ClaimId) -> Result<i64, PortError> {
    i64::try_from(id.value()).map_err(|_| PortError::not_found("Claim", id))
}

fn into_claim(row: ClaimRow) -> Result<Claim, PortError> {
    Claim::try_from(row).map_err(PortError::from)
}

impl DomainPort for PgClaimStore {}

#[async_trait]
impl HealthCheckable for PgClaimStore {
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();

        let result = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await;

        let latency_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(_) => HealthCheckResult {
                adapter_id: "postgres-claim-store".to_string(),
                status: AdapterHealth::Healthy,
                latency_ms,
                message: None,
                checked_at: Utc::now(),
            },
            Err(e) => HealthCheckResult {
                adapter_id: "postgres-claim-store".to_string(),
                status: AdapterHealth::Unhealthy,
                latency_ms,
                message: Some(format!("Database error: {}", e)),
                checked_at: Utc::now(),
            },
        }
    }
}

#[async_trait]
impl ClaimStore for PgClaimStore {
    #[instrument(skip(self, claim), fields(owner = %claim.owner_id))]
    async fn create(&self, claim: NewClaim) -> Result<Claim, PortError> {
        check_new_claim(&claim)?;
        let sql = format!(
            "INSERT INTO claims (owner_id, amount, invoice_date, reason, tax_id, status, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {CLAIM_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ClaimRow>(&sql)
            .bind(claim.owner_id.as_str())
            .bind(claim.amount.value())
            .bind(claim.invoice_date)
            .bind(&claim.reason)
            .bind(claim.tax_id.as_deref())
            .bind(ClaimStatus::Submitted.as_str())
            .bind(claim.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::from)?;
        debug!(claim_id = row.claim_id, "Inserted claim");
        into_claim(row)
    }

    async fn get(&self, id: ClaimId) -> Result<Claim, PortError> {
        let sql = format!("SELECT {CLAIM_COLUMNS} FROM claims WHERE claim_id = $1");
        let row = sqlx::query_as::<_, ClaimRow>(&sql)
            .bind(db_id(id)?)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from)?
            .ok_or_else(|| PortError::not_found("Claim", id))?;
        into_claim(row)
    }

    async fn list_by_owner(&self, owner: &OwnerId) -> Result<Vec<Claim>, PortError> {
        let sql = format!("SELECT {CLAIM_COLUMNS} FROM claims WHERE owner_id = $1");
        sqlx::query_as::<_, ClaimRow>(&sql)
            .bind(owner.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::from)?
            .into_iter()
            .map(into_claim)
            .collect()
    }

    async fn list_all(&self) -> Result<Vec<Claim>, PortError> {
        let sql = format!("SELECT {CLAIM_COLUMNS} FROM claims");
        sqlx::query_as::<_, ClaimRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::from)?
            .into_iter()
            .map(into_claim)
            .collect()
    }

    #[instrument(skip(self, patch))]
    async fn update(
        &self,
        id: ClaimId,
        expected: ClaimStatus,
        patch: ClaimPatch,
    ) -> Result<Claim, PortError> {
        let key = db_id(id)?;
        let sql = format!(
            "UPDATE claims SET \
                 status = COALESCE($3, status), \
                 review_started_at = CASE WHEN $4 THEN $5 ELSE review_started_at END \
             WHERE claim_id = $1 AND status = $2 \
             RETURNING {CLAIM_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ClaimRow>(&sql)
            .bind(key)
            .bind(expected.as_str())
            .bind(patch.status.map(|s| s.as_str()))
            .bind(patch.review_started_at.is_some())
            .bind(patch.review_started_at.flatten())
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        match row {
            Some(row) => into_claim(row),
            None => Err(self.missed_guard(id, key, expected).await),
        }
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: ClaimId, expected: Option<ClaimStatus>) -> Result<(), PortError> {
        let key = db_id(id)?;
        let result = sqlx::query(
            "DELETE FROM claims WHERE claim_id = $1 AND ($2::text IS NULL OR status = $2)",
        )
        .bind(key)
        .bind(expected.map(|s| s.as_str()))
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        if result.rows_affected() > 0 {
            return Ok(());
        }
        match expected {
            Some(expected) => Err(self.missed_guard(id, key, expected).await),
            None => Err(PortError::not_found("Claim", id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn row(status: &str) -> ClaimRow {
        ClaimRow {
            claim_id: 12,
            owner_id: "chen".to_string(),
            amount: dec!(42.50),
            invoice_date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            reason: "taxi".to_string(),
            tax_id: Some("12345678".to_string()),
            status: status.to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 3, 8, 0, 0).unwrap(),
            review_started_at: None,
        }
    }

    #[test]
    fn test_row_maps_to_claim() {
        let claim = Claim::try_from(row("returned")).unwrap();
        assert_eq!(claim.id, ClaimId::new(12));
        assert_eq!(claim.status, ClaimStatus::Returned);
        assert_eq!(claim.amount.value(), dec!(42.50));
        assert_eq!(claim.owner_id.as_str(), "chen");
    }

    #[test]
    fn test_unknown_status_is_corrupt() {
        let err = Claim::try_from(row("approved")).unwrap_err();
        assert!(matches!(err, DatabaseError::CorruptRow(_)));
    }

    #[test]
    fn test_negative_id_is_corrupt() {
        let mut bad = row("done");
        bad.claim_id = -1;
        assert!(matches!(Claim::try_from(bad), Err(DatabaseError::CorruptRow(_))));
    }

    #[test]
    fn test_oversized_id_cannot_exist() {
        let err = db_id(ClaimId::new(u64::MAX)).unwrap_err();
        assert!(err.is_not_found());
    }
}
