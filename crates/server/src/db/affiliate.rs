//! Affiliate click repository.
//!
//! Clicks are immutable events: inserted on first page visit carrying a
//! referral parameter, never updated or deleted by this service.

use sqlx::PgPool;

use shepherd_core::AffiliateCode;

use super::RepositoryError;

/// A referral click about to be recorded.
#[derive(Debug, Clone)]
pub struct NewAffiliateClick {
    pub affiliate_code: AffiliateCode,
    /// Traffic source tag; defaults to `site_visit` upstream.
    pub source: String,
    /// First entry of the forwarded-for chain, or "unknown".
    pub ip_address: String,
    pub user_agent: String,
}

/// Repository for affiliate click events.
pub struct AffiliateRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AffiliateRepository<'a> {
    /// Create a new affiliate repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record one click event.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn record_click(&self, click: &NewAffiliateClick) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO affiliate_clicks (affiliate_code, source, ip_address, user_agent)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(&click.affiliate_code)
        .bind(&click.source)
        .bind(&click.ip_address)
        .bind(&click.user_agent)
        .execute(self.pool)
        .await?;

        Ok(())
    }
}
