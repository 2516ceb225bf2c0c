/*******************************************************************************
*   (c) 2022-2024 Zondax AG
*
*  Licensed under the Apache License, Version 2.0 (the "License");
*  you may not use this file except in compliance with the License.
*  You may obtain a copy of the License at
*
*      http://www.apache.org/licenses/LICENSE-2.0
*
*  Unless required by applicable law or agreed to in writing, software
*  distributed under the License is distributed on an "AS IS" BASIS,
*  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
*  See the License for the specific language governing permissions and
*  limitations under the License.
********************************************************************************/
//! HTTP client for a mercury-style chain indexer

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use zec_tx_builder::{Network, Utxo};

use crate::client::ClientCore;
use crate::errors::ClientError;

/// REST client for the indexer API
///
/// The endpoints are `utxo/{address}`, `confirmations/{txid}`,
/// `script/{funded|redeemed|spent}/{address}` and `tx`.
pub struct MercuryClient {
    url: String,
    network: Network,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: String,
}

#[derive(Debug, Default, Deserialize)]
struct ScriptStatus {
    status: bool,
    #[serde(default)]
    value: i64,
    #[serde(default)]
    script: String,
}

#[derive(Debug, Serialize)]
struct PublishRequest {
    stx: String,
}

impl MercuryClient {
    pub fn new(url: impl Into<String>, network: Network) -> Self {
        let url = url.into();
        let url = url.trim_end_matches('/').to_string();
        Self { url, network, http: reqwest::Client::new() }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self
            .http
            .get(format!("{}/{}", self.url, path))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: api_error_message(&body, status),
            });
        }
        // decoded from text so a malformed body is reported as a decode
        // failure, not a transport failure
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl ClientCore for MercuryClient {
    fn network(&self) -> Network {
        self.network
    }

    async fn get_utxos(
        &self,
        address: &str,
        limit: u64,
        confirmations: u64,
    ) -> Result<Vec<Utxo>, ClientError> {
        self.get_json(&format!(
            "utxo/{}?limit={}&confirmations={}",
            address, limit, confirmations
        ))
        .await
    }

    async fn confirmations(&self, tx_hash: &str) -> Result<u64, ClientError> {
        self.get_json(&format!("confirmations/{}", tx_hash))
            .await
    }

    async fn script_funded(
        &self,
        address: &str,
        value: i64,
    ) -> Result<(bool, i64), ClientError> {
        let status: ScriptStatus = self
            .get_json(&format!("script/funded/{}?value={}", address, value))
            .await?;
        Ok((status.status, status.value))
    }

    async fn script_redeemed(
        &self,
        address: &str,
        value: i64,
    ) -> Result<(bool, i64), ClientError> {
        let status: ScriptStatus = self
            .get_json(&format!("script/redeemed/{}?value={}", address, value))
            .await?;
        Ok((status.status, status.value))
    }

    async fn script_spent(
        &self,
        address: &str,
        spender: &str,
    ) -> Result<(bool, String), ClientError> {
        let status: ScriptStatus = self
            .get_json(&format!("script/spent/{}?spender={}", address, spender))
            .await?;
        Ok((status.status, status.script))
    }

    async fn publish_transaction(&self, signed_tx: &[u8]) -> Result<(), ClientError> {
        let request = PublishRequest { stx: hex::encode(signed_tx) };
        let response = self
            .http
            .post(format!("{}/tx", self.url))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::CREATED {
            let body = response.text().await?;
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: api_error_message(&body, status),
            });
        }
        Ok(())
    }
}

fn api_error_message(body: &str, status: reqwest::StatusCode) -> String {
    match serde_json::from_str::<ApiError>(body) {
        Ok(api_error) => api_error.error,
        Err(_) => status.to_string(),
    }
}
