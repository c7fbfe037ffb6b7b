//! Cart and order lifecycle: the PENDING purchase acts as the cart,
//! checkout freezes it into immutable history.

use sqlx::SqliteConnection;

use crate::errors::AppError;
use crate::log_debug;
use crate::models::purchase::{
    status, CartItemRow, CartItemView, CartView, Purchase, PurchaseDetail,
    GAME_REMOVED_PLACEHOLDER,
};
use crate::models::user::roles;
use crate::AppState;

const ITEM_ROWS_SQL: &str = "
    SELECT pi.id, pi.purchase_id, pi.game_id, pi.quantity,
           pi.unit_price_cents, pi.name_snapshot,
           g.name AS game_name, g.is_deleted AS game_deleted,
           g.price_cents AS game_price_cents,
           g.discount_percent AS game_discount_percent
    FROM purchase_items pi
    LEFT JOIN games g ON pi.game_id = g.id
    WHERE pi.purchase_id = ?
    ORDER BY pi.id ASC
";

async fn load_item_rows(
    conn: &mut SqliteConnection,
    purchase_id: i64,
) -> Result<Vec<CartItemRow>, AppError> {
    let rows = sqlx::query_as::<_, CartItemRow>(ITEM_ROWS_SQL)
        .bind(purchase_id)
        .fetch_all(conn)
        .await?;
    Ok(rows)
}

/// Recompute the cached total as the sum of current item subtotals
/// and persist it. Returns the new total.
async fn recompute_total(
    conn: &mut SqliteConnection,
    purchase_id: i64,
    pending: bool,
) -> Result<i64, AppError> {
    let rows = load_item_rows(&mut *conn, purchase_id).await?;
    let total: i64 = rows.iter().map(|r| r.subtotal_cents(pending)).sum();

    sqlx::query("UPDATE purchases SET total_cents = ? WHERE id = ?")
        .bind(total)
        .bind(purchase_id)
        .execute(conn)
        .await?;

    Ok(total)
}

/// Fetch the user's open cart, creating an empty one when missing.
/// The partial unique index on purchases(user_id) WHERE status='PENDING'
/// turns a concurrent double-create into a unique violation we re-read.
async fn get_or_create_pending(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<Purchase, AppError> {
    if let Some(p) = sqlx::query_as::<_, Purchase>(
        "SELECT * FROM purchases WHERE user_id = ? AND status = 'PENDING'",
    )
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await?
    {
        return Ok(p);
    }

    let result = sqlx::query(
        "INSERT INTO purchases (user_id, status, total_cents) VALUES (?, 'PENDING', 0)",
    )
    .bind(user_id)
    .execute(&mut *conn)
    .await;

    match result {
        Ok(res) => {
            let id = res.last_insert_rowid();
            let p = sqlx::query_as::<_, Purchase>("SELECT * FROM purchases WHERE id = ?")
                .bind(id)
                .fetch_one(conn)
                .await?;
            Ok(p)
        }
        // Lost the race: someone else created the cart. Use theirs.
        Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
            let p = sqlx::query_as::<_, Purchase>(
                "SELECT * FROM purchases WHERE user_id = ? AND status = 'PENDING'",
            )
            .bind(user_id)
            .fetch_one(conn)
            .await?;
            Ok(p)
        }
        Err(e) => Err(e.into()),
    }
}

/// Drop items whose game was soft-deleted or hard-deleted from a pending
/// cart, keeping it a self-healing view over the live catalog. No-op for
/// non-pending purchases. Returns the removal reasons for messaging.
async fn reconcile(
    conn: &mut SqliteConnection,
    purchase: &Purchase,
) -> Result<Vec<String>, AppError> {
    if !purchase.is_pending() {
        return Ok(Vec::new());
    }

    let rows = load_item_rows(&mut *conn, purchase.id).await?;
    let mut removed = Vec::new();

    for row in &rows {
        let reason = match (row.game_id, row.game_deleted) {
            (None, _) => Some("game removed from system".to_string()),
            (Some(_), Some(true)) => Some(format!(
                "{} removed",
                row.game_name.as_deref().unwrap_or("game")
            )),
            _ => None,
        };

        if let Some(reason) = reason {
            sqlx::query("DELETE FROM purchase_items WHERE id = ?")
                .bind(row.id)
                .execute(&mut *conn)
                .await?;
            removed.push(reason);
        }
    }

    if !removed.is_empty() {
        recompute_total(&mut *conn, purchase.id, true).await?;
    }

    Ok(removed)
}

/// Fill missing name snapshots from the live catalog, once the purchase
/// has left PENDING. Idempotent: rows with a snapshot are never touched.
async fn snapshot_item_names(
    conn: &mut SqliteConnection,
    purchase_id: i64,
) -> Result<(), AppError> {
    sqlx::query(
        "UPDATE purchase_items
         SET name_snapshot = COALESCE(
             (SELECT name FROM games WHERE games.id = purchase_items.game_id), ?)
         WHERE purchase_id = ? AND name_snapshot IS NULL",
    )
    .bind(GAME_REMOVED_PLACEHOLDER)
    .bind(purchase_id)
    .execute(conn)
    .await?;
    Ok(())
}

async fn build_cart_view(
    conn: &mut SqliteConnection,
    purchase_id: i64,
    removed: Vec<String>,
) -> Result<CartView, AppError> {
    let purchase = sqlx::query_as::<_, Purchase>("SELECT * FROM purchases WHERE id = ?")
        .bind(purchase_id)
        .fetch_one(&mut *conn)
        .await?;

    let rows = load_item_rows(conn, purchase_id).await?;
    let pending = purchase.is_pending();

    let items: Vec<CartItemView> = rows
        .iter()
        .map(|r| CartItemView {
            id: r.id,
            game_id: r.game_id,
            name: r.display_name(pending),
            quantity: r.quantity,
            unit_price_cents: r.unit_price_cents,
            subtotal_cents: r.subtotal_cents(pending),
        })
        .collect();

    let list_price_cents: i64 = rows.iter().map(|r| r.list_subtotal_cents()).sum();
    let discount_cents: i64 = rows
        .iter()
        .filter_map(|r| {
            let price = r.game_price_cents?;
            let effective =
                crate::models::game::effective_price_cents(price, r.game_discount_percent?);
            Some((price - effective) * r.quantity)
        })
        .sum();

    let total_cents = purchase.total_cents;

    Ok(CartView {
        purchase,
        items,
        total_cents,
        list_price_cents,
        discount_cents,
        removed,
    })
}

/// Load the caller's cart: get-or-create, reconcile against the catalog,
/// refresh the total, and return it with display names and subtotals.
pub async fn get_cart(state: &AppState, session_token: &str) -> Result<CartView, AppError> {
    let session = crate::auth::guard::validate_session(state, session_token)?;

    let mut tx = state.db.begin().await?;
    let purchase = get_or_create_pending(&mut tx, session.user_id).await?;
    let removed = reconcile(&mut tx, &purchase).await?;
    recompute_total(&mut tx, purchase.id, true).await?;
    let view = build_cart_view(&mut tx, purchase.id, removed).await?;
    tx.commit().await?;

    Ok(view)
}

/// Put one unit of a game into the caller's cart. Repeated adds for the
/// same game accumulate quantity in the existing row.
pub async fn add_to_cart(
    state: &AppState,
    session_token: &str,
    game_id: i64,
) -> Result<CartView, AppError> {
    let session = crate::auth::guard::validate_session(state, session_token)?;

    let game: (i64, i64) = sqlx::query_as(
        "SELECT id, price_cents FROM games WHERE id = ? AND is_deleted = 0",
    )
    .bind(game_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound("Game not found".into()))?;

    let mut tx = state.db.begin().await?;

    let purchase = get_or_create_pending(&mut tx, session.user_id).await?;

    let existing: Option<(i64,)> = sqlx::query_as(
        "SELECT id FROM purchase_items WHERE purchase_id = ? AND game_id = ?",
    )
    .bind(purchase.id)
    .bind(game_id)
    .fetch_optional(&mut *tx)
    .await?;

    match existing {
        Some((item_id,)) => {
            sqlx::query("UPDATE purchase_items SET quantity = quantity + 1 WHERE id = ?")
                .bind(item_id)
                .execute(&mut *tx)
                .await?;
        }
        None => {
            // Unit price snapshot is the listed price at add time.
            sqlx::query(
                "INSERT INTO purchase_items (purchase_id, game_id, quantity, unit_price_cents)
                 VALUES (?, ?, 1, ?)",
            )
            .bind(purchase.id)
            .bind(game_id)
            .bind(game.1)
            .execute(&mut *tx)
            .await?;
        }
    }

    recompute_total(&mut tx, purchase.id, true).await?;
    let view = build_cart_view(&mut tx, purchase.id, Vec::new()).await?;
    tx.commit().await?;

    log_debug!(
        "CART",
        "Item added",
        serde_json::json!({ "user_id": session.user_id, "game_id": game_id })
    );

    Ok(view)
}

/// Take one unit of an item out of the caller's cart; the row disappears
/// when its quantity reaches zero.
pub async fn remove_from_cart(
    state: &AppState,
    session_token: &str,
    item_id: i64,
) -> Result<CartView, AppError> {
    let session = crate::auth::guard::validate_session(state, session_token)?;

    let mut tx = state.db.begin().await?;

    let row: Option<(i64, i64, i64, i64, String)> = sqlx::query_as(
        "SELECT pi.id, pi.quantity, p.id, p.user_id, p.status
         FROM purchase_items pi
         JOIN purchases p ON pi.purchase_id = p.id
         WHERE pi.id = ?",
    )
    .bind(item_id)
    .fetch_optional(&mut *tx)
    .await?;

    let (item_id, quantity, purchase_id, owner_id, purchase_status) =
        row.ok_or_else(|| AppError::NotFound("Cart item not found".into()))?;

    if owner_id != session.user_id {
        return Err(AppError::Forbidden(
            "Item belongs to another user's purchase".into(),
        ));
    }

    if purchase_status != status::PENDING {
        return Err(AppError::Validation(
            "Finalized purchases cannot be changed".into(),
        ));
    }

    if quantity > 1 {
        sqlx::query("UPDATE purchase_items SET quantity = quantity - 1 WHERE id = ?")
            .bind(item_id)
            .execute(&mut *tx)
            .await?;
    } else {
        sqlx::query("DELETE FROM purchase_items WHERE id = ?")
            .bind(item_id)
            .execute(&mut *tx)
            .await?;
    }

    recompute_total(&mut tx, purchase_id, true).await?;
    let view = build_cart_view(&mut tx, purchase_id, Vec::new()).await?;
    tx.commit().await?;

    Ok(view)
}

/// Finalize the caller's pending purchase. Returns None when there is no
/// open cart — the caller redirects back to the cart page, it is not an
/// error. An empty cart still finalizes.
pub async fn checkout(
    state: &AppState,
    session_token: &str,
) -> Result<Option<Purchase>, AppError> {
    let session = crate::auth::guard::validate_session(state, session_token)?;

    let Some(purchase) = sqlx::query_as::<_, Purchase>(
        "SELECT * FROM purchases WHERE user_id = ? AND status = 'PENDING'",
    )
    .bind(session.user_id)
    .fetch_optional(&state.db)
    .await?
    else {
        return Ok(None);
    };

    let mut tx = state.db.begin().await?;

    // Invalid items must not be frozen into history.
    reconcile(&mut tx, &purchase).await?;
    recompute_total(&mut tx, purchase.id, true).await?;

    sqlx::query("UPDATE purchases SET status = 'FINALIZED' WHERE id = ? AND status = 'PENDING'")
        .bind(purchase.id)
        .execute(&mut *tx)
        .await?;

    snapshot_item_names(&mut tx, purchase.id).await?;

    let finalized = sqlx::query_as::<_, Purchase>("SELECT * FROM purchases WHERE id = ?")
        .bind(purchase.id)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;

    crate::commands::activity_cmd::log_activity(
        &state.db,
        Some(session.user_id),
        "CHECKOUT",
        &format!("Purchase {} finalized", finalized.id),
        Some(&format!("{{\"total_cents\":{}}}", finalized.total_cents)),
    )
    .await;

    Ok(Some(finalized))
}

/// Abandon the caller's pending purchase (PENDING -> CANCELLED).
/// Returns None when there is no open cart.
pub async fn cancel_cart(
    state: &AppState,
    session_token: &str,
) -> Result<Option<Purchase>, AppError> {
    let session = crate::auth::guard::validate_session(state, session_token)?;

    let Some(purchase) = sqlx::query_as::<_, Purchase>(
        "SELECT * FROM purchases WHERE user_id = ? AND status = 'PENDING'",
    )
    .bind(session.user_id)
    .fetch_optional(&state.db)
    .await?
    else {
        return Ok(None);
    };

    let mut tx = state.db.begin().await?;

    sqlx::query("UPDATE purchases SET status = 'CANCELLED' WHERE id = ? AND status = 'PENDING'")
        .bind(purchase.id)
        .execute(&mut *tx)
        .await?;

    // Cancelled purchases keep their history readable too.
    snapshot_item_names(&mut tx, purchase.id).await?;

    let cancelled = sqlx::query_as::<_, Purchase>("SELECT * FROM purchases WHERE id = ?")
        .bind(purchase.id)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(Some(cancelled))
}

/// The caller's finalized purchases, newest first.
pub async fn get_order_history(
    state: &AppState,
    session_token: &str,
) -> Result<Vec<Purchase>, AppError> {
    let session = crate::auth::guard::validate_session(state, session_token)?;

    let purchases = sqlx::query_as::<_, Purchase>(
        "SELECT * FROM purchases WHERE user_id = ? AND status = 'FINALIZED'
         ORDER BY created_at DESC, id DESC",
    )
    .bind(session.user_id)
    .fetch_all(&state.db)
    .await?;

    Ok(purchases)
}

/// One purchase with its items. Owner or staff only.
pub async fn get_order_detail(
    state: &AppState,
    session_token: &str,
    purchase_id: i64,
) -> Result<PurchaseDetail, AppError> {
    let session = crate::auth::guard::validate_session(state, session_token)?;

    let purchase = sqlx::query_as::<_, Purchase>("SELECT * FROM purchases WHERE id = ?")
        .bind(purchase_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Purchase not found".into()))?;

    if purchase.user_id != session.user_id && session.role != roles::STAFF {
        return Err(AppError::Forbidden(
            "Purchase belongs to another user".into(),
        ));
    }

    let mut conn = state.db.acquire().await?;
    let rows = load_item_rows(&mut conn, purchase.id).await?;
    let pending = purchase.is_pending();

    let items = rows
        .iter()
        .map(|r| CartItemView {
            id: r.id,
            game_id: r.game_id,
            name: r.display_name(pending),
            quantity: r.quantity,
            unit_price_cents: r.unit_price_cents,
            subtotal_cents: r.subtotal_cents(pending),
        })
        .collect();

    Ok(PurchaseDetail { purchase, items })
}
