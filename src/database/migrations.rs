use sqlx::SqlitePool;

/// Run all migrations (idempotent CREATE TABLE IF NOT EXISTS + indexes).
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // ═══════════════════════════════════════
    // TABLE: users
    // ═══════════════════════════════════════
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS users (
            id              INTEGER  PRIMARY KEY AUTOINCREMENT,
            name            TEXT     NOT NULL,
            username        TEXT     NOT NULL UNIQUE,
            password_hash   TEXT     NOT NULL,
            role            TEXT     NOT NULL CHECK(role IN ('STAFF', 'CLIENT')),
            is_active       INTEGER  NOT NULL DEFAULT 1,
            created_at      DATETIME DEFAULT CURRENT_TIMESTAMP,
            created_by      INTEGER  REFERENCES users(id) ON DELETE SET NULL,
            last_login_at   DATETIME
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_username ON users(username)")
        .execute(pool)
        .await?;

    // ═══════════════════════════════════════
    // TABLE: categories
    // ═══════════════════════════════════════
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS categories (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT    NOT NULL UNIQUE,
            description TEXT,
            is_featured INTEGER NOT NULL DEFAULT 0
        )",
    )
    .execute(pool)
    .await?;

    // ═══════════════════════════════════════
    // TABLE: games
    // ═══════════════════════════════════════
    // Soft delete via is_deleted: rows stay for order history, listings
    // filter them out, reconciliation drops them from pending carts.
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS games (
            id               INTEGER  PRIMARY KEY AUTOINCREMENT,
            category_id      INTEGER  REFERENCES categories(id) ON DELETE SET NULL,
            name             TEXT     NOT NULL,
            price_cents      INTEGER  NOT NULL CHECK(price_cents >= 0),
            description      TEXT     NOT NULL DEFAULT '',
            discount_percent INTEGER  NOT NULL DEFAULT 0
                             CHECK(discount_percent BETWEEN 0 AND 100),
            is_deleted       INTEGER  NOT NULL DEFAULT 0,
            created_at       DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at       DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_games_category ON games(category_id)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_games_name ON games(name)")
        .execute(pool)
        .await?;

    // ═══════════════════════════════════════
    // TABLE: purchases
    // ═══════════════════════════════════════
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS purchases (
            id          INTEGER  PRIMARY KEY AUTOINCREMENT,
            user_id     INTEGER  NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            created_at  DATETIME DEFAULT CURRENT_TIMESTAMP,
            status      TEXT     NOT NULL DEFAULT 'PENDING'
                        CHECK(status IN ('PENDING', 'FINALIZED', 'CANCELLED')),
            total_cents INTEGER  NOT NULL DEFAULT 0 CHECK(total_cents >= 0)
        )",
    )
    .execute(pool)
    .await?;

    // At most one open cart per user. The partial index makes the
    // get-or-create race lose cleanly instead of duplicating carts.
    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_purchases_user_pending
         ON purchases(user_id) WHERE status = 'PENDING'",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_purchases_user ON purchases(user_id)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_purchases_status ON purchases(status)")
        .execute(pool)
        .await?;

    // ═══════════════════════════════════════
    // TABLE: purchase_items
    // ═══════════════════════════════════════
    // game_id is ON DELETE SET NULL: hard-deleting a game must not take
    // order history with it — display falls back to name_snapshot.
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS purchase_items (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            purchase_id      INTEGER NOT NULL REFERENCES purchases(id) ON DELETE CASCADE,
            game_id          INTEGER REFERENCES games(id) ON DELETE SET NULL,
            quantity         INTEGER NOT NULL CHECK(quantity >= 1),
            unit_price_cents INTEGER NOT NULL CHECK(unit_price_cents >= 0),
            name_snapshot    TEXT
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_purchase_items_purchase
         ON purchase_items(purchase_id)",
    )
    .execute(pool)
    .await?;

    // One row per (cart, game); repeated adds bump quantity instead.
    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_purchase_items_purchase_game
         ON purchase_items(purchase_id, game_id) WHERE game_id IS NOT NULL",
    )
    .execute(pool)
    .await?;

    // ═══════════════════════════════════════
    // TABLE: activity_logs (audit trail)
    // ═══════════════════════════════════════
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS activity_logs (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id     INTEGER REFERENCES users(id) ON DELETE SET NULL,
            action      TEXT    NOT NULL, -- 'LOGIN', 'CREATE_GAME', 'CHECKOUT', etc.
            description TEXT    NOT NULL,
            metadata    TEXT,             -- JSON string for extra data
            created_at  DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
    )
    .execute(pool)
    .await?;

    // ═══════════════════════════════════════
    // MIGRATION: later columns (ALTER TABLE — safe for existing data)
    // ═══════════════════════════════════════

    // Home page banner carousel
    safe_add_column(pool, "games", "is_banner", "INTEGER NOT NULL DEFAULT 0").await;

    // Pre-release spotlight banner
    safe_add_column(pool, "games", "is_prerelease", "INTEGER NOT NULL DEFAULT 0").await;

    // Publisher credit shown on the detail page
    safe_add_column(pool, "games", "publisher", "TEXT NOT NULL DEFAULT 'CoolKeys'").await;

    safe_add_column(pool, "games", "release_date", "TEXT").await;

    // Cover art path; file handling stays in the presentation layer
    safe_add_column(pool, "games", "cover_path", "TEXT").await;

    Ok(())
}

/// Helper: ALTER TABLE ADD COLUMN that ignores "column already exists".
async fn safe_add_column(pool: &SqlitePool, table: &str, column: &str, col_type: &str) {
    let sql = format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, col_type);
    match sqlx::query(&sql).execute(pool).await {
        Ok(_) => {}
        Err(e) => {
            let msg = e.to_string();
            if !msg.contains("duplicate column") {
                eprintln!("Migration warning: {}", msg);
            }
        }
    }
}
