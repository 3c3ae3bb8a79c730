use axum::Json;

use glimmer_types::api::CoinPackageResponse;
use glimmer_types::packages::COIN_PACKAGES;

pub async fn list_coin_packages() -> Json<Vec<CoinPackageResponse>> {
    Json(COIN_PACKAGES.iter().map(CoinPackageResponse::from).collect())
}
