use crate::errors::AppError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Client for the ViaCEP public postal-code API.
///
/// Used only to prefill address fields on the lead form; the returned data
/// is never authoritative. The base URL is injected so tests can point the
/// client at a mock server.
#[derive(Clone)]
pub struct ViaCepService {
    client: reqwest::Client,
    base_url: String,
}

/// Address returned by a CEP lookup, in ViaCEP's own field names
/// (`localidade` is the city, `uf` the state code).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CepEndereco {
    #[serde(default)]
    pub cep: String,
    #[serde(default)]
    pub logradouro: String,
    #[serde(default)]
    pub complemento: String,
    #[serde(default)]
    pub bairro: String,
    #[serde(default)]
    pub localidade: String,
    #[serde(default)]
    pub uf: String,
}

impl ViaCepService {
    /// Creates a new `ViaCepService` against the given base URL.
    pub fn new(base_url: String) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create ViaCEP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Looks up the address for an 8-digit CEP.
    ///
    /// Formatting characters are stripped before validation, so both
    /// `01001000` and `01001-000` are accepted. ViaCEP signals an unknown
    /// code with an `"erro"` flag in a 200 body; that maps to `NotFound`.
    pub async fn lookup(&self, cep: &str) -> Result<CepEndereco, AppError> {
        let clean: String = cep.chars().filter(|c| c.is_ascii_digit()).collect();
        if clean.len() != 8 {
            return Err(AppError::BadRequest(format!(
                "CEP must have exactly 8 digits, got '{}'",
                cep
            )));
        }

        let url = format!("{}/ws/{}/json/", self.base_url, clean);
        tracing::info!("Looking up CEP {} via ViaCEP", clean);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("ViaCEP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "ViaCEP returned {}: {}",
                status, error_text
            )));
        }

        let body: serde_json::Value = response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse ViaCEP response: {}", e))
        })?;

        // The error flag has shipped both as a boolean and as the string
        // "true" over the years; treat either as not-found.
        let erro = match body.get("erro") {
            Some(serde_json::Value::Bool(b)) => *b,
            Some(serde_json::Value::String(s)) => s == "true",
            _ => false,
        };
        if erro {
            return Err(AppError::NotFound(format!("CEP {} not found", clean)));
        }

        let endereco: CepEndereco = serde_json::from_value(body).map_err(|e| {
            AppError::ExternalApiError(format!("Unexpected ViaCEP response shape: {}", e))
        })?;

        Ok(endereco)
    }
}
