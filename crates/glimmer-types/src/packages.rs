use serde::Serialize;

/// A purchasable bundle of coins. `price` is in currency units and `bonus`
/// is a percentage of `coins` granted on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinPackage {
    pub id: i64,
    pub coins: i64,
    pub price: i64,
    pub bonus: i64,
    pub popular: bool,
}

impl CoinPackage {
    /// Coins credited for this package, bonus rounded down.
    pub fn total_coins(&self) -> i64 {
        self.coins + self.coins * self.bonus / 100
    }
}

pub const COIN_PACKAGES: [CoinPackage; 4] = [
    CoinPackage { id: 1, coins: 100, price: 99, bonus: 0, popular: false },
    CoinPackage { id: 2, coins: 300, price: 249, bonus: 10, popular: true },
    CoinPackage { id: 3, coins: 700, price: 499, bonus: 20, popular: false },
    CoinPackage { id: 4, coins: 1500, price: 999, bonus: 30, popular: false },
];
