//! SQLite-backed implementations of the `ports` traits (C6/C7/C12 storage
//! and drop-copy sequence persistence), grounded on the teacher's `Database`
//! struct (a `SqlitePool` wrapper with inline schema creation in the
//! constructor, CRUD split across one submodule per aggregate).

use anyhow::Result;
use sqlx::sqlite::SqlitePool;

mod config_repo;
pub mod error;
mod locates;
mod orders;
mod session_sequences;

pub use error::PersistenceError;

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url).await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS execution_events (
                exec_id TEXT PRIMARY KEY,
                order_id TEXT NOT NULL,
                cl_ord_id TEXT,
                orig_cl_ord_id TEXT,
                exec_type TEXT NOT NULL,
                ord_status TEXT NOT NULL,
                symbol TEXT NOT NULL,
                side TEXT NOT NULL,
                ord_type TEXT,
                time_in_force TEXT,
                order_qty TEXT NOT NULL,
                last_qty TEXT,
                last_px TEXT,
                cum_qty TEXT NOT NULL,
                leaves_qty TEXT NOT NULL,
                avg_px TEXT,
                price TEXT,
                stop_px TEXT,
                account TEXT,
                transact_time TEXT NOT NULL,
                session_key TEXT NOT NULL,
                raw_message TEXT NOT NULL,
                recorded_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS orders (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                order_id TEXT UNIQUE,
                cl_ord_id TEXT UNIQUE,
                orig_cl_ord_id TEXT,
                account TEXT NOT NULL,
                order_group_id TEXT,
                exec_type TEXT,
                ord_status TEXT,
                cum_qty TEXT NOT NULL,
                leaves_qty TEXT NOT NULL,
                avg_px TEXT,
                last_px TEXT,
                last_qty TEXT,
                order_qty TEXT NOT NULL,
                symbol TEXT NOT NULL,
                side TEXT NOT NULL,
                is_primary INTEGER NOT NULL,
                is_shadow INTEGER NOT NULL,
                draft INTEGER NOT NULL,
                mirror_state TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS order_groups (
                strategy_key TEXT PRIMARY KEY,
                primary_order_id TEXT NOT NULL,
                target_qty TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS order_group_members (
                strategy_key TEXT NOT NULL,
                shadow_order_id TEXT NOT NULL,
                PRIMARY KEY (strategy_key, shadow_order_id),
                FOREIGN KEY (strategy_key) REFERENCES order_groups(strategy_key) ON DELETE CASCADE
            )
            "#,
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS locate_requests (
                id TEXT PRIMARY KEY,
                primary_order_id TEXT NOT NULL,
                account TEXT NOT NULL,
                symbol TEXT NOT NULL,
                quantity TEXT NOT NULL,
                status TEXT NOT NULL,
                quote_req_id TEXT UNIQUE NOT NULL,
                locate_route TEXT,
                offer_px TEXT,
                offer_size TEXT,
                approved_qty TEXT,
                response_text TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_locate_requests_status_created
             ON locate_requests(status, created_at)",
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS copy_rules (
                primary_account_id TEXT NOT NULL,
                shadow_account_id TEXT NOT NULL,
                ratio TEXT NOT NULL,
                min_qty TEXT,
                max_qty TEXT,
                order_type_filter TEXT NOT NULL,
                copy_route TEXT,
                locate_route TEXT,
                priority INTEGER NOT NULL,
                active INTEGER NOT NULL,
                PRIMARY KEY (primary_account_id, shadow_account_id)
            )
            "#,
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS accounts (
                id TEXT PRIMARY KEY,
                number TEXT UNIQUE NOT NULL,
                kind TEXT NOT NULL,
                strategy_key TEXT
            )
            "#,
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS routes (
                name TEXT PRIMARY KEY,
                locate_type TEXT
            )
            "#,
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS session_sequences (
                session_key TEXT PRIMARY KEY,
                next_sender_seq INTEGER NOT NULL,
                next_target_seq INTEGER NOT NULL,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }
}
