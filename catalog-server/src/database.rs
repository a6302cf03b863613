use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::config::ServerConfig;

/// Connection pool for whichever engine the URL selected
#[derive(Clone)]
pub enum DatabasePool {
    Postgres(PgPool),
    Sqlite(SqlitePool),
}

impl DatabasePool {
    pub async fn connect(config: &ServerConfig) -> Result<Self, sqlx::Error> {
        if config.is_postgres() {
            let pool = PgPoolOptions::new()
                .max_connections(config.max_connections)
                .connect(&config.database_url)
                .await?;
            Ok(Self::Postgres(pool))
        } else {
            let pool = SqlitePoolOptions::new()
                .max_connections(config.max_connections)
                .connect(&config.database_url)
                .await?;
            Ok(Self::Sqlite(pool))
        }
    }

    pub fn engine(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::Sqlite(_) => "sqlite",
        }
    }

    /// Round trip used by the health check
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        match self {
            Self::Postgres(pool) => sqlx::query("SELECT 1").execute(pool).await.map(|_| ()),
            Self::Sqlite(pool) => sqlx::query("SELECT 1").execute(pool).await.map(|_| ()),
        }
    }
}

/// Create demo tables on SQLite and fill them once
pub async fn seed_demo(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS customers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT UNIQUE NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            is_active BOOLEAN DEFAULT true
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS orders (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            customer_id INTEGER REFERENCES customers(id),
            total REAL NOT NULL,
            note TEXT,
            receipt BLOB,
            placed_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    // No id column, so single-row lookups report a missing key
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS audit_log (
            level TEXT NOT NULL,
            message TEXT NOT NULL,
            logged_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    let (customer_count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM customers")
        .fetch_one(pool)
        .await?;
    if customer_count > 0 {
        tracing::debug!("Demo data already present");
        return Ok(());
    }

    let names = [
        "Alice Johnson",
        "Bob Smith",
        "Charlie Brown",
        "Diana Prince",
        "Evan Davis",
        "Fiona Wilson",
        "George Taylor",
        "Hannah Anderson",
        "Isaac Thomas",
        "Julia Jackson",
    ];

    for index in 0..120 {
        let name = names[index % names.len()];
        let email = format!("{}{}@example.com", name.to_lowercase().replace(' ', "."), index);
        sqlx::query("INSERT INTO customers (name, email, is_active) VALUES (?, ?, ?)")
            .bind(name)
            .bind(email)
            .bind(index % 4 != 0)
            .execute(pool)
            .await?;
    }

    for index in 0..500_i64 {
        let customer_id = index % 120 + 1;
        let total = 9.5 + (index % 17) as f64 * 4.25;
        let note = (index % 3 == 0).then(|| format!("gift wrap #{}", index));
        let receipt = (index % 10 == 0).then(|| index.to_le_bytes().to_vec());

        sqlx::query("INSERT INTO orders (customer_id, total, note, receipt) VALUES (?, ?, ?, ?)")
            .bind(customer_id)
            .bind(total)
            .bind(note)
            .bind(receipt)
            .execute(pool)
            .await?;
    }

    let levels = ["info", "warn", "error"];
    for index in 0..60 {
        sqlx::query("INSERT INTO audit_log (level, message) VALUES (?, ?)")
            .bind(levels[index % levels.len()])
            .bind(format!("event {}", index))
            .execute(pool)
            .await?;
    }

    tracing::info!(customers = 120, orders = 500, audit_log = 60, "Seeded demo data");
    Ok(())
}
