//! Suggested fee-rate lookup
//!
//! The transaction engine itself always pays the flat fee from
//! `zec_tx_builder::config::TX_FEE`; the speed tier accepted by the account
//! operations is advisory and currently only logged. The oracle lookup is
//! kept for callers that want to surface the recommendation.

use serde::Deserialize;

use crate::errors::ClientError;

const FEE_ORACLE_URL: &str = "https://zcashfees.earn.com/api/v1/fees/recommended";

/// The tier of speed a transaction targets while writing to the chain
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TxExecutionSpeed {
    Nil,
    Slow,
    Standard,
    Fast,
}

#[derive(Debug, Deserialize)]
struct RecommendedFees {
    #[serde(rename = "fastestFee")]
    slow: i64,
    #[serde(rename = "halfHourFee")]
    standard: i64,
    #[serde(rename = "hourFee")]
    fast: i64,
}

/// Fee rate the oracle recommends for the given speed tier
pub async fn suggested_tx_rate(speed: TxExecutionSpeed) -> Result<i64, ClientError> {
    let body = reqwest::Client::new()
        .get(FEE_ORACLE_URL)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    let fees: RecommendedFees = serde_json::from_str(&body)?;

    rate_for(speed, &fees)
}

fn rate_for(speed: TxExecutionSpeed, fees: &RecommendedFees) -> Result<i64, ClientError> {
    match speed {
        TxExecutionSpeed::Slow => Ok(fees.slow),
        TxExecutionSpeed::Standard => Ok(fees.standard),
        TxExecutionSpeed::Fast => Ok(fees.fast),
        TxExecutionSpeed::Nil => Err(ClientError::InvalidSpeedTier),
    }
}
