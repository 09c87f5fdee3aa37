use crate::config;
use crate::error::ApiError;

use base64::{URL_SAFE_NO_PAD, encode_config};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

use std::sync::Arc;

pub(crate) const API_KEY_HEADER: &str = "x-api-key";

/// Shared secret the scraper presents in `x-api-key`.
///
/// With no key configured every guarded request is refused.
#[derive(Debug, Clone)]
pub(crate) struct ApiKey {
    key: Option<Arc<str>>,
}

impl ApiKey {
    pub(crate) fn from_config(config: &config::AppConfig) -> Self {
        let key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(Arc::from);
        Self { key }
    }

    pub(crate) fn is_configured(&self) -> bool {
        self.key.is_some()
    }

    pub(crate) fn verify(&self, presented: Option<&str>) -> Result<(), ApiError> {
        match (self.key.as_deref(), presented) {
            (Some(expected), Some(presented))
                if constant_time_eq(expected.as_bytes(), presented.as_bytes()) =>
            {
                Ok(())
            }
            _ => Err(ApiError::Unauthorized),
        }
    }
}

fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    left.iter()
        .zip(right)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

pub fn generate_api_key() -> String {
    let mut rng = OsRng;
    generate_api_key_with_rng(&mut rng)
}

pub(crate) fn generate_api_key_with_rng<R: RngCore + CryptoRng>(rng: &mut R) -> String {
    let mut bytes = [0u8; 32];
    rng.fill_bytes(&mut bytes);
    encode_config(bytes, URL_SAFE_NO_PAD)
}
