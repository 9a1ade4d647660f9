//! Shipment repository implementation

use async_trait::async_trait;
use lorry_core::{
    models::{Shipment, ShipmentDetails},
    traits::{Repository, ShipmentRepository},
    AppError, AppResult,
};
use sqlx::{PgPool, Row};
use tracing::{debug, error, instrument};

const SHIPMENT_COLUMNS: &str = "id, lr_no, tracking_number, from_location, to_location, dod, \
     branch_from_phone, branch_to_phone, customer_name, status, origin, destination, priority, \
     created_at";

const DETAILS_COLUMNS: &str = "id, shipment_id, consignor, consignee, gstin, freight, sub_total, \
     sgst, cgst, g_total, to_pay, paid, insurance, policy_no, e_way_bill_status, owners_risk, remark";

/// PostgreSQL implementation of ShipmentRepository
pub struct PgShipmentRepository {
    pool: PgPool,
}

impl PgShipmentRepository {
    /// Create a new shipment repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_row(row: &sqlx::postgres::PgRow) -> Shipment {
        Shipment {
            id: row.get("id"),
            lr_no: row.get("lr_no"),
            tracking_number: row.get("tracking_number"),
            from_location: row.get("from_location"),
            to_location: row.get("to_location"),
            dod: row.get("dod"),
            branch_from_phone: row.get("branch_from_phone"),
            branch_to_phone: row.get("branch_to_phone"),
            customer_name: row.get("customer_name"),
            status: row.get("status"),
            origin: row.get("origin"),
            destination: row.get("destination"),
            priority: row.get("priority"),
            created_at: row.get("created_at"),
        }
    }

    fn map_details_row(row: &sqlx::postgres::PgRow) -> ShipmentDetails {
        ShipmentDetails {
            id: row.get("id"),
            shipment_id: row.get("shipment_id"),
            consignor: row.get("consignor"),
            consignee: row.get("consignee"),
            gstin: row.get("gstin"),
            freight: row.get("freight"),
            sub_total: row.get("sub_total"),
            sgst: row.get("sgst"),
            cgst: row.get("cgst"),
            g_total: row.get("g_total"),
            to_pay: row.get("to_pay"),
            paid: row.get("paid"),
            insurance: row.get("insurance"),
            policy_no: row.get("policy_no"),
            e_way_bill_status: row.get("e_way_bill_status"),
            owners_risk: row.get("owners_risk"),
            remark: row.get("remark"),
        }
    }
}

#[async_trait]
impl Repository<Shipment, i64> for PgShipmentRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Shipment>> {
        debug!("Finding shipment by id: {}", id);

        let result = sqlx::query(&format!(
            "SELECT {} FROM shipments WHERE id = $1",
            SHIPMENT_COLUMNS
        ))
        .bind(id)
        .map(|row| Self::map_row(&row))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding shipment {}: {}", id, e);
            AppError::Database(format!("Failed to find shipment: {}", e))
        })?;

        Ok(result)
    }

    #[instrument(skip(self))]
    async fn find_all(&self, limit: i64, offset: i64) -> AppResult<Vec<Shipment>> {
        debug!("Fetching shipments: limit={}, offset={}", limit, offset);

        let rows = sqlx::query(&format!(
            "SELECT {} FROM shipments ORDER BY id DESC LIMIT $1 OFFSET $2",
            SHIPMENT_COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .map(|row| Self::map_row(&row))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error fetching shipments: {}", e);
            AppError::Database(format!("Failed to fetch shipments: {}", e))
        })?;

        Ok(rows)
    }

    #[instrument(skip(self))]
    async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shipments")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error counting shipments: {}", e);
                AppError::Database(format!("Failed to count shipments: {}", e))
            })?;

        Ok(count)
    }

    #[instrument(skip(self, shipment))]
    async fn create(&self, shipment: &Shipment) -> AppResult<Shipment> {
        debug!("Creating shipment: {}", shipment.tracking_number);

        let result = sqlx::query(&format!(
            r#"
            INSERT INTO shipments (
                lr_no, tracking_number, from_location, to_location, dod,
                branch_from_phone, branch_to_phone, customer_name, status,
                origin, destination, priority
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {}
            "#,
            SHIPMENT_COLUMNS
        ))
        .bind(&shipment.lr_no)
        .bind(&shipment.tracking_number)
        .bind(&shipment.from_location)
        .bind(&shipment.to_location)
        .bind(shipment.dod)
        .bind(&shipment.branch_from_phone)
        .bind(&shipment.branch_to_phone)
        .bind(&shipment.customer_name)
        .bind(&shipment.status)
        .bind(&shipment.origin)
        .bind(&shipment.destination)
        .bind(&shipment.priority)
        .map(|row| Self::map_row(&row))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if e.as_database_error()
                .and_then(|db| db.code())
                .map(|code| code == "23505")
                .unwrap_or(false)
            {
                AppError::AlreadyExists(format!(
                    "Shipment with LR number {} or tracking number {} already exists",
                    shipment.lr_no, shipment.tracking_number
                ))
            } else {
                error!("Failed to create shipment: {}", e);
                AppError::Database(format!("Failed to create shipment: {}", e))
            }
        })?;

        Ok(result)
    }

    #[instrument(skip(self, shipment))]
    async fn update(&self, shipment: &Shipment) -> AppResult<Shipment> {
        debug!("Updating shipment: {}", shipment.id);

        let result = sqlx::query(&format!(
            r#"
            UPDATE shipments
            SET lr_no = $2, tracking_number = $3, from_location = $4, to_location = $5,
                dod = $6, branch_from_phone = $7, branch_to_phone = $8,
                customer_name = $9, status = $10, origin = $11, destination = $12,
                priority = $13
            WHERE id = $1
            RETURNING {}
            "#,
            SHIPMENT_COLUMNS
        ))
        .bind(shipment.id)
        .bind(&shipment.lr_no)
        .bind(&shipment.tracking_number)
        .bind(&shipment.from_location)
        .bind(&shipment.to_location)
        .bind(shipment.dod)
        .bind(&shipment.branch_from_phone)
        .bind(&shipment.branch_to_phone)
        .bind(&shipment.customer_name)
        .bind(&shipment.status)
        .bind(&shipment.origin)
        .bind(&shipment.destination)
        .bind(&shipment.priority)
        .map(|row| Self::map_row(&row))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error updating shipment {}: {}", shipment.id, e);
            AppError::Database(format!("Failed to update shipment: {}", e))
        })?;

        result.ok_or_else(|| AppError::ShipmentNotFound(shipment.id.to_string()))
    }

    /// Delete a shipment; the details row goes with it via cascade
    #[instrument(skip(self))]
    async fn delete(&self, id: i64) -> AppResult<bool> {
        debug!("Deleting shipment: {}", id);

        let result = sqlx::query("DELETE FROM shipments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error deleting shipment {}: {}", id, e);
                AppError::Database(format!("Failed to delete shipment: {}", e))
            })?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ShipmentRepository for PgShipmentRepository {
    #[instrument(skip(self))]
    async fn find_by_tracking_number(&self, tracking_number: &str) -> AppResult<Option<Shipment>> {
        debug!("Finding shipment by tracking number: {}", tracking_number);

        let result = sqlx::query(&format!(
            "SELECT {} FROM shipments WHERE tracking_number = $1",
            SHIPMENT_COLUMNS
        ))
        .bind(tracking_number)
        .map(|row| Self::map_row(&row))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Database error finding shipment {}: {}",
                tracking_number, e
            );
            AppError::Database(format!("Failed to find shipment: {}", e))
        })?;

        Ok(result)
    }

    #[instrument(skip(self))]
    async fn find_details(&self, shipment_id: i64) -> AppResult<Option<ShipmentDetails>> {
        let result = sqlx::query(&format!(
            "SELECT {} FROM shipment_details WHERE shipment_id = $1",
            DETAILS_COLUMNS
        ))
        .bind(shipment_id)
        .map(|row| Self::map_details_row(&row))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Database error fetching details for shipment {}: {}",
                shipment_id, e
            );
            AppError::Database(format!("Failed to fetch shipment details: {}", e))
        })?;

        Ok(result)
    }

    #[instrument(skip(self, details))]
    async fn upsert_details(&self, details: &ShipmentDetails) -> AppResult<ShipmentDetails> {
        debug!("Upserting details for shipment {}", details.shipment_id);

        let result = sqlx::query(&format!(
            r#"
            INSERT INTO shipment_details (
                shipment_id, consignor, consignee, gstin, freight, sub_total,
                sgst, cgst, g_total, to_pay, paid, insurance, policy_no,
                e_way_bill_status, owners_risk, remark
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            ON CONFLICT (shipment_id) DO UPDATE SET
                consignor = EXCLUDED.consignor,
                consignee = EXCLUDED.consignee,
                gstin = EXCLUDED.gstin,
                freight = EXCLUDED.freight,
                sub_total = EXCLUDED.sub_total,
                sgst = EXCLUDED.sgst,
                cgst = EXCLUDED.cgst,
                g_total = EXCLUDED.g_total,
                to_pay = EXCLUDED.to_pay,
                paid = EXCLUDED.paid,
                insurance = EXCLUDED.insurance,
                policy_no = EXCLUDED.policy_no,
                e_way_bill_status = EXCLUDED.e_way_bill_status,
                owners_risk = EXCLUDED.owners_risk,
                remark = EXCLUDED.remark
            RETURNING {}
            "#,
            DETAILS_COLUMNS
        ))
        .bind(details.shipment_id)
        .bind(&details.consignor)
        .bind(&details.consignee)
        .bind(&details.gstin)
        .bind(details.freight)
        .bind(details.sub_total)
        .bind(details.sgst)
        .bind(details.cgst)
        .bind(details.g_total)
        .bind(details.to_pay)
        .bind(details.paid)
        .bind(&details.insurance)
        .bind(&details.policy_no)
        .bind(&details.e_way_bill_status)
        .bind(details.owners_risk)
        .bind(&details.remark)
        .map(|row| Self::map_details_row(&row))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Failed to upsert details for shipment {}: {}",
                details.shipment_id, e
            );
            AppError::Database(format!("Failed to save shipment details: {}", e))
        })?;

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    async fn test_pool() -> PgPool {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        crate::create_pool(&url, Some(5)).await.unwrap()
    }

    fn test_shipment(suffix: &str) -> Shipment {
        Shipment {
            lr_no: format!("SHP-{}", suffix),
            tracking_number: format!("TRK-{}", suffix),
            from_location: "Pune".to_string(),
            to_location: "Mumbai".to_string(),
            branch_from_phone: "9822000001".to_string(),
            branch_to_phone: "9822000002".to_string(),
            customer_name: "Ramesh Traders".to_string(),
            origin: "Pune".to_string(),
            destination: "Mumbai".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    #[ignore] // Requires database
    async fn test_create_and_find_by_tracking_number() {
        let repo = PgShipmentRepository::new(test_pool().await);
        let suffix = chrono::Utc::now().timestamp_nanos_opt().unwrap().to_string();

        let created = repo.create(&test_shipment(&suffix)).await.unwrap();
        assert_eq!(created.status, "Pending");

        let found = repo
            .find_by_tracking_number(&created.tracking_number)
            .await
            .unwrap();
        assert_eq!(found.unwrap().id, created.id);
    }

    #[tokio::test]
    #[ignore] // Requires database
    async fn test_details_upsert_replaces() {
        let repo = PgShipmentRepository::new(test_pool().await);
        let suffix = chrono::Utc::now().timestamp_nanos_opt().unwrap().to_string();
        let shipment = repo.create(&test_shipment(&suffix)).await.unwrap();

        let details = ShipmentDetails {
            shipment_id: shipment.id,
            consignor: "Ramesh Traders".to_string(),
            consignee: "Suresh & Co".to_string(),
            freight: dec!(1200),
            ..Default::default()
        };
        repo.upsert_details(&details).await.unwrap();

        let updated = ShipmentDetails {
            freight: dec!(1500),
            ..details
        };
        let saved = repo.upsert_details(&updated).await.unwrap();
        assert_eq!(saved.freight, dec!(1500));

        let fetched = repo.find_details(shipment.id).await.unwrap().unwrap();
        assert_eq!(fetched.freight, dec!(1500));
    }

    #[tokio::test]
    #[ignore] // Requires database
    async fn test_delete_cascades_details() {
        let repo = PgShipmentRepository::new(test_pool().await);
        let suffix = chrono::Utc::now().timestamp_nanos_opt().unwrap().to_string();
        let shipment = repo.create(&test_shipment(&suffix)).await.unwrap();

        let details = ShipmentDetails {
            shipment_id: shipment.id,
            ..Default::default()
        };
        repo.upsert_details(&details).await.unwrap();

        assert!(repo.delete(shipment.id).await.unwrap());
        assert!(repo.find_details(shipment.id).await.unwrap().is_none());
    }
}
