//! PostgreSQL implementation of the marketplace store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::MarketStore;
use super::models::{
    Business, Deal, DealCounts, DealWithBusiness, NewBusiness, NewDeal, NewRedemption, Profile,
    RecentRedemption, Redemption, RedemptionHistoryEntry, RedemptionLookup,
};
use crate::domain::{RedemptionCode, RedemptionStatus, UserType};
use crate::error::ApiError;

/// Row tuple for a deal joined with its business.
type DealRow = (
    Uuid,
    Uuid,
    String,
    String,
    String,
    Option<String>,
    DateTime<Utc>,
    bool,
    Option<i32>,
    i32,
    DateTime<Utc>,
    DateTime<Utc>,
    String,
    String,
    String,
);

const DEAL_COLUMNS: &str = "d.id, d.business_id, d.title, d.description, d.discount_value, \
     d.terms, d.expiry_date, d.is_active, d.max_redemptions, d.current_redemptions, \
     d.created_at, d.updated_at, b.name, b.address, b.category";

/// PostgreSQL-backed store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new store with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_err(e: sqlx::Error) -> ApiError {
    ApiError::PersistenceError(e.to_string())
}

fn parse_status(raw: &str) -> Result<RedemptionStatus, ApiError> {
    raw.parse::<RedemptionStatus>().map_err(ApiError::PersistenceError)
}

fn deal_with_business(row: DealRow) -> DealWithBusiness {
    let (
        id,
        business_id,
        title,
        description,
        discount_value,
        terms,
        expiry_date,
        is_active,
        max_redemptions,
        current_redemptions,
        created_at,
        updated_at,
        business_name,
        business_address,
        business_category,
    ) = row;
    DealWithBusiness {
        deal: Deal {
            id,
            business_id,
            title,
            description,
            discount_value,
            terms,
            expiry_date,
            is_active,
            max_redemptions,
            current_redemptions,
            created_at,
            updated_at,
        },
        business_name,
        business_address,
        business_category,
    }
}

#[async_trait]
impl MarketStore for PostgresStore {
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, ApiError> {
        let row = sqlx::query_as::<_, (Uuid, String, String, String, Option<String>, DateTime<Utc>, DateTime<Utc>)>(
            "SELECT id, email, name, user_type, phone, created_at, updated_at \
             FROM profiles WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.map(|(id, email, name, user_type, phone, created_at, updated_at)| {
            let user_type = user_type
                .parse::<UserType>()
                .map_err(ApiError::PersistenceError)?;
            Ok(Profile {
                id,
                email,
                name,
                user_type,
                phone,
                created_at,
                updated_at,
            })
        })
        .transpose()
    }

    async fn list_active_deals(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<DealWithBusiness>, ApiError> {
        let rows = sqlx::query_as::<_, DealRow>(&format!(
            "SELECT {DEAL_COLUMNS} FROM deals d \
             JOIN businesses b ON b.id = d.business_id \
             WHERE d.is_active AND d.expiry_date > $1 \
             ORDER BY d.created_at DESC"
        ))
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(rows.into_iter().map(deal_with_business).collect())
    }

    async fn list_favorite_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>, ApiError> {
        let rows = sqlx::query_scalar::<_, Uuid>(
            "SELECT deal_id FROM favorites WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(rows)
    }

    async fn insert_favorite(&self, user_id: Uuid, deal_id: Uuid) -> Result<(), ApiError> {
        sqlx::query(
            "INSERT INTO favorites (id, user_id, deal_id, created_at) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (user_id, deal_id) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(deal_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn delete_favorite(&self, user_id: Uuid, deal_id: Uuid) -> Result<bool, ApiError> {
        let result = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND deal_id = $2")
            .bind(user_id)
            .bind(deal_id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_favorite_deals(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<DealWithBusiness>, ApiError> {
        let rows = sqlx::query_as::<_, DealRow>(&format!(
            "SELECT {DEAL_COLUMNS} FROM favorites f \
             JOIN deals d ON d.id = f.deal_id \
             JOIN businesses b ON b.id = d.business_id \
             WHERE f.user_id = $1 AND d.is_active AND d.expiry_date > $2 \
             ORDER BY d.created_at DESC"
        ))
        .bind(user_id)
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(rows.into_iter().map(deal_with_business).collect())
    }

    async fn find_business_by_owner(&self, owner_id: Uuid) -> Result<Option<Business>, ApiError> {
        let row = sqlx::query_as::<_, (
            Uuid,
            Uuid,
            String,
            Option<String>,
            String,
            Option<f64>,
            Option<f64>,
            String,
            Option<String>,
            DateTime<Utc>,
            DateTime<Utc>,
        )>(
            "SELECT id, owner_id, name, description, address, latitude, longitude, \
             category, logo_url, created_at, updated_at \
             FROM businesses WHERE owner_id = $1 LIMIT 1",
        )
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(row.map(
            |(
                id,
                owner_id,
                name,
                description,
                address,
                latitude,
                longitude,
                category,
                logo_url,
                created_at,
                updated_at,
            )| Business {
                id,
                owner_id,
                name,
                description,
                address,
                latitude,
                longitude,
                category,
                logo_url,
                created_at,
                updated_at,
            },
        ))
    }

    async fn insert_business(&self, new: NewBusiness) -> Result<Business, ApiError> {
        let now = Utc::now();
        let business = Business {
            id: Uuid::new_v4(),
            owner_id: new.owner_id,
            name: new.name,
            description: new.description,
            address: new.address,
            latitude: new.latitude,
            longitude: new.longitude,
            category: new.category,
            logo_url: new.logo_url,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO businesses (id, owner_id, name, description, address, latitude, \
             longitude, category, logo_url, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(business.id)
        .bind(business.owner_id)
        .bind(&business.name)
        .bind(&business.description)
        .bind(&business.address)
        .bind(business.latitude)
        .bind(business.longitude)
        .bind(&business.category)
        .bind(&business.logo_url)
        .bind(business.created_at)
        .bind(business.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(business)
    }

    async fn list_deals_for_business(&self, business_id: Uuid) -> Result<Vec<Deal>, ApiError> {
        let rows = sqlx::query_as::<_, (
            Uuid,
            Uuid,
            String,
            String,
            String,
            Option<String>,
            DateTime<Utc>,
            bool,
            Option<i32>,
            i32,
            DateTime<Utc>,
            DateTime<Utc>,
        )>(
            "SELECT id, business_id, title, description, discount_value, terms, expiry_date, \
             is_active, max_redemptions, current_redemptions, created_at, updated_at \
             FROM deals WHERE business_id = $1 ORDER BY created_at DESC",
        )
        .bind(business_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .map(
                |(
                    id,
                    business_id,
                    title,
                    description,
                    discount_value,
                    terms,
                    expiry_date,
                    is_active,
                    max_redemptions,
                    current_redemptions,
                    created_at,
                    updated_at,
                )| Deal {
                    id,
                    business_id,
                    title,
                    description,
                    discount_value,
                    terms,
                    expiry_date,
                    is_active,
                    max_redemptions,
                    current_redemptions,
                    created_at,
                    updated_at,
                },
            )
            .collect())
    }

    async fn insert_deal(&self, new: NewDeal) -> Result<Deal, ApiError> {
        let now = Utc::now();
        let deal = Deal {
            id: Uuid::new_v4(),
            business_id: new.business_id,
            title: new.title,
            description: new.description,
            discount_value: new.discount_value,
            terms: new.terms,
            expiry_date: new.expiry_date,
            is_active: true,
            max_redemptions: new.max_redemptions,
            current_redemptions: 0,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO deals (id, business_id, title, description, discount_value, terms, \
             expiry_date, is_active, max_redemptions, current_redemptions, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(deal.id)
        .bind(deal.business_id)
        .bind(&deal.title)
        .bind(&deal.description)
        .bind(&deal.discount_value)
        .bind(&deal.terms)
        .bind(deal.expiry_date)
        .bind(deal.is_active)
        .bind(deal.max_redemptions)
        .bind(deal.current_redemptions)
        .bind(deal.created_at)
        .bind(deal.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(deal)
    }

    async fn set_deal_active(
        &self,
        business_id: Uuid,
        deal_id: Uuid,
        active: bool,
    ) -> Result<bool, ApiError> {
        let result = sqlx::query(
            "UPDATE deals SET is_active = $3, updated_at = $4 \
             WHERE id = $1 AND business_id = $2",
        )
        .bind(deal_id)
        .bind(business_id)
        .bind(active)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert_redemption(&self, new: NewRedemption) -> Result<Redemption, ApiError> {
        let redemption = Redemption {
            id: Uuid::new_v4(),
            deal_id: new.deal_id,
            user_id: new.user_id,
            business_id: new.business_id,
            redemption_code: new.redemption_code,
            status: RedemptionStatus::Pending,
            created_at: Utc::now(),
            redeemed_at: None,
            expires_at: new.expires_at,
        };

        sqlx::query(
            "INSERT INTO redemptions (id, deal_id, user_id, business_id, redemption_code, \
             status, created_at, redeemed_at, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(redemption.id)
        .bind(redemption.deal_id)
        .bind(redemption.user_id)
        .bind(redemption.business_id)
        .bind(redemption.redemption_code.as_str())
        .bind(redemption.status.as_str())
        .bind(redemption.created_at)
        .bind(redemption.redeemed_at)
        .bind(redemption.expires_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(redemption)
    }

    async fn find_redemption_by_code(
        &self,
        code: &RedemptionCode,
        business_id: Uuid,
    ) -> Result<Option<RedemptionLookup>, ApiError> {
        let row = sqlx::query_as::<_, (
            Uuid,
            Uuid,
            String,
            DateTime<Utc>,
            String,
            String,
            String,
            String,
        )>(
            "SELECT r.id, r.deal_id, r.status, r.expires_at, d.title, d.discount_value, \
             p.name, p.email \
             FROM redemptions r \
             JOIN deals d ON d.id = r.deal_id \
             JOIN profiles p ON p.id = r.user_id \
             WHERE r.redemption_code = $1 AND r.business_id = $2",
        )
        .bind(code.as_str())
        .bind(business_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.map(
            |(id, deal_id, status, expires_at, deal_title, discount_value, customer_name, customer_email)| {
                Ok(RedemptionLookup {
                    id,
                    deal_id,
                    status: parse_status(&status)?,
                    expires_at,
                    deal_title,
                    discount_value,
                    customer_name,
                    customer_email,
                })
            },
        )
        .transpose()
    }

    async fn expire_redemption(&self, redemption_id: Uuid) -> Result<bool, ApiError> {
        let result = sqlx::query(
            "UPDATE redemptions SET status = $2 WHERE id = $1 AND status = $3",
        )
        .bind(redemption_id)
        .bind(RedemptionStatus::Expired.as_str())
        .bind(RedemptionStatus::Pending.as_str())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(result.rows_affected() > 0)
    }

    async fn finalize_redemption(
        &self,
        redemption_id: Uuid,
        business_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), ApiError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let row = sqlx::query_as::<_, (Uuid, String)>(
            "SELECT deal_id, status FROM redemptions \
             WHERE id = $1 AND business_id = $2 FOR UPDATE",
        )
        .bind(redemption_id)
        .bind(business_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_err)?;

        let Some((deal_id, status)) = row else {
            return Err(ApiError::RedemptionNotFound(redemption_id));
        };

        match parse_status(&status)? {
            RedemptionStatus::Redeemed => return Err(ApiError::AlreadyRedeemed),
            RedemptionStatus::Expired => return Err(ApiError::CodeExpired),
            RedemptionStatus::Pending => {}
        }

        sqlx::query(
            "UPDATE redemptions SET status = $2, redeemed_at = $3 WHERE id = $1",
        )
        .bind(redemption_id)
        .bind(RedemptionStatus::Redeemed.as_str())
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        let incremented = sqlx::query(
            "UPDATE deals SET current_redemptions = current_redemptions + 1, updated_at = $2 \
             WHERE id = $1 \
             AND (max_redemptions IS NULL OR current_redemptions < max_redemptions)",
        )
        .bind(deal_id)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        if incremented.rows_affected() == 0 {
            tx.rollback().await.map_err(db_err)?;
            return Err(ApiError::DealFullyRedeemed);
        }

        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn list_redemptions_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<RedemptionHistoryEntry>, ApiError> {
        let rows = sqlx::query_as::<_, (
            Uuid,
            String,
            DateTime<Utc>,
            Option<DateTime<Utc>>,
            String,
            String,
            String,
        )>(
            "SELECT r.id, r.status, r.created_at, r.redeemed_at, d.title, d.discount_value, b.name \
             FROM redemptions r \
             JOIN deals d ON d.id = r.deal_id \
             JOIN businesses b ON b.id = r.business_id \
             WHERE r.user_id = $1 ORDER BY r.created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter()
            .map(
                |(id, status, created_at, redeemed_at, deal_title, discount_value, business_name)| {
                    Ok(RedemptionHistoryEntry {
                        id,
                        status: parse_status(&status)?,
                        created_at,
                        redeemed_at,
                        deal_title,
                        discount_value,
                        business_name,
                    })
                },
            )
            .collect()
    }

    async fn count_deals(&self, business_id: Uuid) -> Result<DealCounts, ApiError> {
        let (total, active) = sqlx::query_as::<_, (i64, i64)>(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE is_active) \
             FROM deals WHERE business_id = $1",
        )
        .bind(business_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(DealCounts { total, active })
    }

    async fn count_redeemed(&self, business_id: Uuid) -> Result<i64, ApiError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM redemptions WHERE business_id = $1 AND status = $2",
        )
        .bind(business_id)
        .bind(RedemptionStatus::Redeemed.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(count)
    }

    async fn recent_redemptions(
        &self,
        business_id: Uuid,
        limit: i64,
    ) -> Result<Vec<RecentRedemption>, ApiError> {
        let rows = sqlx::query_as::<_, (
            Uuid,
            Option<DateTime<Utc>>,
            String,
            String,
            String,
        )>(
            "SELECT r.id, r.redeemed_at, d.title, d.discount_value, p.name \
             FROM redemptions r \
             JOIN deals d ON d.id = r.deal_id \
             JOIN profiles p ON p.id = r.user_id \
             WHERE r.business_id = $1 AND r.status = $2 \
             ORDER BY r.created_at DESC LIMIT $3",
        )
        .bind(business_id)
        .bind(RedemptionStatus::Redeemed.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .map(
                |(id, redeemed_at, deal_title, discount_value, customer_name)| RecentRedemption {
                    id,
                    redeemed_at,
                    deal_title,
                    discount_value,
                    customer_name,
                },
            )
            .collect())
    }
}
