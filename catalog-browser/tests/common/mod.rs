use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

/// Single-connection in-memory database; every connection would otherwise
/// get its own empty database.
pub async fn seeded_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();

    sqlx::query(
        r#"
        CREATE TABLE orders (
            id INTEGER PRIMARY KEY,
            total REAL,
            note TEXT,
            is_paid BOOLEAN NOT NULL DEFAULT 0,
            created_at DATETIME
        )
        "#,
    )
    .execute(&pool)
    .await
    .unwrap();

    sqlx::query("CREATE TABLE logs (level TEXT, message TEXT)")
        .execute(&pool)
        .await
        .unwrap();

    sqlx::query("CREATE TABLE readings (id INTEGER PRIMARY KEY, value REAL)")
        .execute(&pool)
        .await
        .unwrap();

    // Order 1 is the (1, 42.5, NULL) row; the rest carry notes on even ids
    for id in 1..=95_i64 {
        let total = if id == 1 { 42.5 } else { id as f64 * 1.5 };
        let note = (id % 2 == 0).then(|| format!("order {}", id));
        sqlx::query(
            "INSERT INTO orders (id, total, note, is_paid, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(total)
        .bind(note)
        .bind(id % 3 == 0)
        .bind("2024-03-01 12:00:00")
        .execute(&pool)
        .await
        .unwrap();
    }

    sqlx::query("INSERT INTO logs (level, message) VALUES ('info', 'started'), ('warn', 'slow')")
        .execute(&pool)
        .await
        .unwrap();

    // REAL affinity keeps non-numeric text as TEXT, which cannot decode as a float
    sqlx::query("INSERT INTO readings (id, value) VALUES (1, 0.5), (2, 'oops'), (3, 1.25)")
        .execute(&pool)
        .await
        .unwrap();

    pool
}
