use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::purchase::Purchase;
use crate::AppState;

/// Headline numbers for the staff dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_orders: i64,
    pub total_games: i64,
    pub total_users: i64,
    /// Sum of finalized purchase totals, in cents.
    pub revenue_cents: i64,
    pub recent_orders: Vec<Purchase>,
}

/// Dashboard statistics (staff only).
pub async fn get_dashboard_stats(
    state: &AppState,
    session_token: &str,
) -> Result<DashboardStats, AppError> {
    crate::auth::guard::validate_staff(state, session_token)?;

    let total_orders: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM purchases WHERE status = 'FINALIZED'")
            .fetch_one(&state.db)
            .await?;

    let total_games: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM games WHERE is_deleted = 0")
            .fetch_one(&state.db)
            .await?;

    let total_users: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(&state.db)
        .await?;

    let revenue: (i64,) = sqlx::query_as(
        "SELECT COALESCE(SUM(total_cents), 0) FROM purchases WHERE status = 'FINALIZED'",
    )
    .fetch_one(&state.db)
    .await?;

    let recent_orders = sqlx::query_as::<_, Purchase>(
        "SELECT * FROM purchases WHERE status = 'FINALIZED'
         ORDER BY created_at DESC, id DESC LIMIT 5",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(DashboardStats {
        total_orders: total_orders.0,
        total_games: total_games.0,
        total_users: total_users.0,
        revenue_cents: revenue.0,
        recent_orders,
    })
}
