use serde::{Deserialize, Serialize};

use super::game::effective_price_cents;

/// Purchase lifecycle: PENDING (cart) -> FINALIZED (history) or CANCELLED.
/// FINALIZED and CANCELLED are terminal.
pub mod status {
    pub const PENDING: &str = "PENDING";
    pub const FINALIZED: &str = "FINALIZED";
    pub const CANCELLED: &str = "CANCELLED";
}

/// Placeholder snapshot name for items whose game was hard-deleted
/// before checkout filled the snapshot.
pub const GAME_REMOVED_PLACEHOLDER: &str = "Game Removed";

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Purchase {
    pub id: i64,
    pub user_id: i64,
    pub created_at: Option<String>,
    pub status: String,
    /// Cached total in cents, recomputed after every cart mutation.
    pub total_cents: i64,
}

impl Purchase {
    pub fn is_pending(&self) -> bool {
        self.status == status::PENDING
    }
}

/// Purchase item joined with its game (LEFT JOIN — the game columns are
/// NULL when the game row was hard-deleted).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CartItemRow {
    pub id: i64,
    pub purchase_id: i64,
    pub game_id: Option<i64>,
    pub quantity: i64,
    /// Unit price snapshot taken when the item entered the cart.
    pub unit_price_cents: i64,
    /// Name snapshot filled once, when the purchase leaves PENDING.
    pub name_snapshot: Option<String>,
    pub game_name: Option<String>,
    pub game_deleted: Option<bool>,
    pub game_price_cents: Option<i64>,
    pub game_discount_percent: Option<i64>,
}

impl CartItemRow {
    /// Subtotal policy, in priority order:
    /// 1. pending + game present + soft-deleted -> 0 (dead weight until reconciled)
    /// 2. game present -> effective price x quantity
    /// 3. game gone -> snapshot unit price x quantity
    pub fn subtotal_cents(&self, purchase_pending: bool) -> i64 {
        match (self.game_price_cents, self.game_deleted) {
            (Some(_), Some(true)) if purchase_pending => 0,
            (Some(price), _) => {
                effective_price_cents(price, self.game_discount_percent.unwrap_or(0))
                    * self.quantity
            }
            (None, _) => self.unit_price_cents * self.quantity,
        }
    }

    /// Subtotal at the game's list price, ignoring discounts.
    /// Falls back to the unit price snapshot when the game is gone.
    pub fn list_subtotal_cents(&self) -> i64 {
        self.game_price_cents.unwrap_or(self.unit_price_cents) * self.quantity
    }

    /// Name shown to the user.
    /// Pending carts show the live catalog name; history prefers the snapshot.
    pub fn display_name(&self, purchase_pending: bool) -> String {
        if purchase_pending {
            match (&self.game_name, self.game_deleted) {
                (Some(name), Some(true)) => format!("{} [DELETED]", name),
                (Some(name), _) => name.clone(),
                (None, _) => "Invalid item".to_string(),
            }
        } else {
            self.name_snapshot
                .clone()
                .or_else(|| self.game_name.clone())
                .unwrap_or_else(|| "Game not found".to_string())
        }
    }
}

/// One cart/order line as rendered by the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItemView {
    pub id: i64,
    pub game_id: Option<i64>,
    pub name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub subtotal_cents: i64,
}

/// The user's cart after reconciliation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartView {
    pub purchase: Purchase,
    pub items: Vec<CartItemView>,
    pub total_cents: i64,
    /// Sum of list prices before discounts.
    pub list_price_cents: i64,
    /// Amount saved through discounts.
    pub discount_cents: i64,
    /// Human-readable reasons for items removed by reconciliation.
    pub removed: Vec<String>,
}

/// A finalized purchase with its items, for the order history pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseDetail {
    pub purchase: Purchase,
    pub items: Vec<CartItemView>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(game: Option<(i64, i64, bool)>, quantity: i64, unit_price: i64) -> CartItemRow {
        CartItemRow {
            id: 1,
            purchase_id: 1,
            game_id: game.map(|_| 7),
            quantity,
            unit_price_cents: unit_price,
            name_snapshot: None,
            game_name: game.map(|_| "Relic".to_string()),
            game_deleted: game.map(|(_, _, d)| d),
            game_price_cents: game.map(|(p, _, _)| p),
            game_discount_percent: game.map(|(_, d, _)| d),
        }
    }

    #[test]
    fn pending_soft_deleted_game_counts_zero() {
        let row = item(Some((5_000, 0, true)), 3, 5_000);
        assert_eq!(row.subtotal_cents(true), 0);
    }

    #[test]
    fn live_game_uses_effective_price() {
        // 100.00 at 10%, qty 2 -> 180.00
        let row = item(Some((10_000, 10, false)), 2, 10_000);
        assert_eq!(row.subtotal_cents(true), 18_000);
    }

    #[test]
    fn finalized_item_with_soft_deleted_game_still_prices_live() {
        // Rule 1 only applies while the purchase is pending.
        let row = item(Some((10_000, 0, true)), 1, 8_000);
        assert_eq!(row.subtotal_cents(false), 10_000);
    }

    #[test]
    fn missing_game_falls_back_to_snapshot_price() {
        let row = item(None, 2, 4_500);
        assert_eq!(row.subtotal_cents(false), 9_000);
    }

    #[test]
    fn pending_display_names() {
        let live = item(Some((1_000, 0, false)), 1, 1_000);
        assert_eq!(live.display_name(true), "Relic");

        let deleted = item(Some((1_000, 0, true)), 1, 1_000);
        assert_eq!(deleted.display_name(true), "Relic [DELETED]");

        let gone = item(None, 1, 1_000);
        assert_eq!(gone.display_name(true), "Invalid item");
    }

    #[test]
    fn history_prefers_snapshot_name() {
        let mut row = item(None, 1, 1_000);
        row.name_snapshot = Some("Relic".to_string());
        assert_eq!(row.display_name(false), "Relic");

        let gone = item(None, 1, 1_000);
        assert_eq!(gone.display_name(false), "Game not found");
    }
}
