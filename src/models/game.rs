use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Game {
    pub id: i64,
    pub category_id: Option<i64>,
    pub name: String,
    /// Fixed-point currency: integer cents.
    pub price_cents: i64,
    pub description: String,
    /// 0-100. Effective price = price minus this percentage, rounded to the cent.
    pub discount_percent: i64,
    pub publisher: String,
    pub release_date: Option<String>,
    pub cover_path: Option<String>,
    pub is_banner: bool,
    pub is_prerelease: bool,
    pub is_deleted: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Game {
    pub fn effective_price_cents(&self) -> i64 {
        effective_price_cents(self.price_cents, self.discount_percent)
    }

    /// Per-unit discount amount in cents.
    pub fn discount_cents(&self) -> i64 {
        self.price_cents - self.effective_price_cents()
    }
}

/// Discounted price in cents, rounded half-up to the cent.
pub fn effective_price_cents(price_cents: i64, discount_percent: i64) -> i64 {
    if discount_percent <= 0 {
        return price_cents;
    }
    let d = discount_percent.min(100);
    (price_cents * (100 - d) + 50) / 100
}

/// Game with its category name (JOIN result).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct GameWithCategory {
    pub id: i64,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    pub name: String,
    pub price_cents: i64,
    pub description: String,
    pub discount_percent: i64,
    pub publisher: String,
    pub release_date: Option<String>,
    pub cover_path: Option<String>,
    pub is_banner: bool,
    pub is_prerelease: bool,
    pub is_deleted: bool,
}

/// Game detail page data: the game plus a few games from the same category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameDetail {
    pub game: GameWithCategory,
    pub related: Vec<Game>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub is_featured: bool,
}

/// Category with its live game count.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CategoryWithCount {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub is_featured: bool,
    pub game_count: i64,
}

/// Storefront home page data: top carousel + pre-release spotlight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomeView {
    pub banner_games: Vec<Game>,
    pub prerelease_spotlight: Option<Game>,
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateGamePayload {
    pub name: String,
    pub price_cents: i64,
    pub description: String,
    pub discount_percent: i64,
    pub category_id: Option<i64>,
    pub publisher: Option<String>,
    pub release_date: Option<String>,
    pub cover_path: Option<String>,
    pub is_banner: bool,
    pub is_prerelease: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateGamePayload {
    pub name: String,
    pub price_cents: i64,
    pub description: String,
    pub discount_percent: i64,
    pub category_id: Option<i64>,
    pub publisher: Option<String>,
    pub release_date: Option<String>,
    pub cover_path: Option<String>,
    pub is_banner: bool,
    pub is_prerelease: bool,
    pub is_deleted: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryPayload {
    pub name: String,
    pub description: Option<String>,
    pub is_featured: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_discount_keeps_list_price() {
        assert_eq!(effective_price_cents(10_000, 0), 10_000);
    }

    #[test]
    fn discount_is_percentage_of_list_price() {
        // 100.00 at 10% -> 90.00
        assert_eq!(effective_price_cents(10_000, 10), 9_000);
        // 50.00 at 100% -> free
        assert_eq!(effective_price_cents(5_000, 100), 0);
    }

    #[test]
    fn rounds_half_up_to_the_cent() {
        // 0.99 at 50% = 0.495 -> 0.50
        assert_eq!(effective_price_cents(99, 50), 50);
        // 0.99 at 33% = 0.6633 -> 0.66
        assert_eq!(effective_price_cents(99, 33), 66);
    }

    #[test]
    fn out_of_range_discounts_are_clamped() {
        assert_eq!(effective_price_cents(1_000, -5), 1_000);
        assert_eq!(effective_price_cents(1_000, 150), 0);
    }
}
