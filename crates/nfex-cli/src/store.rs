//! SQLite persistence for extracted product records.
//!
//! Deduplication lives in the schema: the primary key covers company,
//! product, date, and tax id, and inserts use `INSERT OR IGNORE`, so
//! reprocessing the same document is a no-op.

use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::debug;

use nfex_core::{Origin, ProductRecord};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS products (
    company     TEXT NOT NULL,
    tax_id      TEXT NOT NULL,
    product     TEXT NOT NULL,
    quantity    REAL NOT NULL,
    unit_value  REAL NOT NULL,
    total_value REAL NOT NULL,
    origin      TEXT NOT NULL,
    date        TEXT NOT NULL,
    PRIMARY KEY (company, product, date, tax_id)
)";

/// Handle to the product database, scoped queries only: every read and
/// delete is keyed by a tenant tax id.
pub struct ProductStore {
    pool: SqlitePool,
}

impl ProductStore {
    /// Open (creating if needed) the database file and ensure the schema.
    pub async fn open(path: &Path) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;
        sqlx::query(SCHEMA).execute(&pool).await?;
        Ok(Self { pool })
    }

    /// In-memory database, for tests.
    pub async fn open_in_memory() -> anyhow::Result<Self> {
        let pool = SqlitePool::connect("sqlite::memory:").await?;
        sqlx::query(SCHEMA).execute(&pool).await?;
        Ok(Self { pool })
    }

    /// Insert one record unless its dedup key already exists. Returns
    /// whether a row was actually written.
    pub async fn insert_if_absent(&self, record: &ProductRecord) -> anyhow::Result<bool> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO products \
             (company, tax_id, product, quantity, unit_value, total_value, origin, date) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.company)
        .bind(&record.tax_id)
        .bind(&record.product)
        .bind(record.quantity)
        .bind(record.unit_value)
        .bind(record.total_value)
        .bind(record.origin.as_str())
        .bind(&record.date)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// All records for one tenant, ordered by date then company.
    pub async fn fetch_by_tax_id(&self, tax_id: &str) -> anyhow::Result<Vec<ProductRecord>> {
        let rows: Vec<(String, String, String, f64, f64, f64, String, String)> = sqlx::query_as(
            "SELECT company, tax_id, product, quantity, unit_value, total_value, origin, date \
             FROM products WHERE tax_id = ? ORDER BY date, company, product",
        )
        .bind(tax_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(
                |(company, tax_id, product, quantity, unit_value, total_value, origin, date)| {
                    ProductRecord {
                        company,
                        tax_id,
                        product,
                        quantity,
                        unit_value,
                        total_value,
                        origin: if origin == "XML" { Origin::Xml } else { Origin::Pdf },
                        date,
                    }
                },
            )
            .collect())
    }

    /// Delete every record belonging to one tenant. Returns the count.
    pub async fn delete_by_tax_id(&self, tax_id: &str) -> anyhow::Result<u64> {
        let result = sqlx::query("DELETE FROM products WHERE tax_id = ?")
            .bind(tax_id)
            .execute(&self.pool)
            .await?;
        debug!("deleted {} rows for tenant {}", result.rows_affected(), tax_id);
        Ok(result.rows_affected())
    }

    /// Delete one tenant's records within an inclusive date range. The
    /// column holds either an ISO date or a full `dhEmi` timestamp, so it
    /// is reduced to a calendar date before comparing.
    pub async fn delete_by_date_range(
        &self,
        tax_id: &str,
        from: &str,
        to: &str,
    ) -> anyhow::Result<u64> {
        let result =
            sqlx::query("DELETE FROM products WHERE tax_id = ? AND date(date) BETWEEN ? AND ?")
                .bind(tax_id)
                .bind(from)
                .bind(to)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected())
    }

    /// Drop and recreate the products table.
    pub async fn reset(&self) -> anyhow::Result<()> {
        sqlx::query("DROP TABLE IF EXISTS products")
            .execute(&self.pool)
            .await?;
        sqlx::query(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(product: &str, tax_id: &str, date: &str) -> ProductRecord {
        ProductRecord {
            company: "Mercado Bom Preco LTDA".to_string(),
            tax_id: tax_id.to_string(),
            product: product.to_string(),
            quantity: 2.0,
            unit_value: 5.0,
            total_value: 10.0,
            origin: Origin::Xml,
            date: date.to_string(),
        }
    }

    #[tokio::test]
    async fn duplicate_insert_is_ignored() {
        let store = ProductStore::open_in_memory().await.unwrap();
        let r = record("Arroz 5kg", "12345678000199", "2024-03-10");

        assert!(store.insert_if_absent(&r).await.unwrap());
        assert!(!store.insert_if_absent(&r).await.unwrap());

        let rows = store.fetch_by_tax_id("12345678000199").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0], r);
    }

    #[tokio::test]
    async fn same_product_on_other_date_is_a_new_row() {
        let store = ProductStore::open_in_memory().await.unwrap();
        store
            .insert_if_absent(&record("Arroz 5kg", "12345678000199", "2024-03-10"))
            .await
            .unwrap();
        store
            .insert_if_absent(&record("Arroz 5kg", "12345678000199", "2024-03-11"))
            .await
            .unwrap();

        let rows = store.fetch_by_tax_id("12345678000199").await.unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn fetch_is_tenant_scoped() {
        let store = ProductStore::open_in_memory().await.unwrap();
        store
            .insert_if_absent(&record("Arroz 5kg", "11111111000111", "2024-03-10"))
            .await
            .unwrap();
        store
            .insert_if_absent(&record("Feijao 1kg", "22222222000122", "2024-03-10"))
            .await
            .unwrap();

        let rows = store.fetch_by_tax_id("11111111000111").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].product, "Arroz 5kg");
    }

    #[tokio::test]
    async fn delete_by_tax_id_leaves_other_tenants_alone() {
        let store = ProductStore::open_in_memory().await.unwrap();
        store
            .insert_if_absent(&record("Arroz 5kg", "11111111000111", "2024-03-10"))
            .await
            .unwrap();
        store
            .insert_if_absent(&record("Feijao 1kg", "22222222000122", "2024-03-10"))
            .await
            .unwrap();

        assert_eq!(store.delete_by_tax_id("11111111000111").await.unwrap(), 1);
        assert_eq!(
            store.fetch_by_tax_id("22222222000122").await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn date_range_delete_is_inclusive() {
        let store = ProductStore::open_in_memory().await.unwrap();
        for date in ["2024-03-09", "2024-03-10", "2024-03-11", "2024-03-12"] {
            store
                .insert_if_absent(&record("Arroz 5kg", "12345678000199", date))
                .await
                .unwrap();
        }

        let deleted = store
            .delete_by_date_range("12345678000199", "2024-03-10", "2024-03-11")
            .await
            .unwrap();
        assert_eq!(deleted, 2);

        let remaining = store.fetch_by_tax_id("12345678000199").await.unwrap();
        let dates: Vec<&str> = remaining.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-03-09", "2024-03-12"]);
    }

    #[tokio::test]
    async fn date_range_delete_covers_xml_timestamps() {
        let store = ProductStore::open_in_memory().await.unwrap();
        store
            .insert_if_absent(&record(
                "Arroz 5kg",
                "12345678000199",
                "2024-03-10T14:32:00-03:00",
            ))
            .await
            .unwrap();

        // A same-day range must match the timestamp's calendar date.
        let deleted = store
            .delete_by_date_range("12345678000199", "2024-03-10", "2024-03-10")
            .await
            .unwrap();
        assert_eq!(deleted, 1);
        assert!(store
            .fetch_by_tax_id("12345678000199")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn reset_clears_everything() {
        let store = ProductStore::open_in_memory().await.unwrap();
        store
            .insert_if_absent(&record("Arroz 5kg", "12345678000199", "2024-03-10"))
            .await
            .unwrap();

        store.reset().await.unwrap();
        assert!(store
            .fetch_by_tax_id("12345678000199")
            .await
            .unwrap()
            .is_empty());
    }
}
