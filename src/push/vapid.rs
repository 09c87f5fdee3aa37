use base64::{URL_SAFE_NO_PAD, encode_config};
use jwt_simple::prelude::ES256KeyPair;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

use crate::config;
use crate::types::push::VapidConfig;

#[derive(Debug, Clone)]
pub struct VapidCredentials {
    pub private_key: String,
    pub public_key: String,
}

#[derive(Debug, Clone)]
pub(crate) enum VapidConfigStatus {
    Missing,
    Incomplete,
    /// The subject must be a `mailto:` or `https:` contact URI.
    InvalidSubject,
    Ready(VapidConfig),
}

pub(crate) fn load_vapid_config(config: &config::AppConfig) -> VapidConfigStatus {
    let non_empty = |value: &Option<String>| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };
    let private_key = non_empty(&config.vapid_private_key);
    let public_key = non_empty(&config.vapid_public_key);
    let subject = non_empty(&config.vapid_subject);
    let has_any = private_key.is_some() || public_key.is_some() || subject.is_some();

    match (private_key, public_key, subject) {
        (Some(_), Some(_), Some(subject)) if !is_contact_uri(&subject) => {
            VapidConfigStatus::InvalidSubject
        }
        (Some(private_key), Some(public_key), Some(subject)) => {
            VapidConfigStatus::Ready(VapidConfig {
                private_key,
                public_key,
                subject,
            })
        }
        _ if has_any => VapidConfigStatus::Incomplete,
        _ => VapidConfigStatus::Missing,
    }
}

fn is_contact_uri(subject: &str) -> bool {
    subject.starts_with("mailto:") || subject.starts_with("https://")
}

pub fn generate_vapid_credentials() -> Result<VapidCredentials, web_push::WebPushError> {
    let mut rng = OsRng;
    generate_vapid_credentials_with_rng(&mut rng)
}

pub(crate) fn generate_vapid_credentials_with_rng<R: RngCore + CryptoRng>(
    rng: &mut R,
) -> Result<VapidCredentials, web_push::WebPushError> {
    let key_pair = generate_es256_keypair_with_rng(rng);
    let private_key = encode_config(key_pair.to_bytes(), URL_SAFE_NO_PAD);
    let public_key =
        web_push::VapidSignatureBuilder::from_base64_no_sub(&private_key, URL_SAFE_NO_PAD)?
            .get_public_key();
    let public_key = encode_config(public_key, URL_SAFE_NO_PAD);

    Ok(VapidCredentials {
        private_key,
        public_key,
    })
}

fn generate_es256_keypair_with_rng<R: RngCore + CryptoRng>(rng: &mut R) -> ES256KeyPair {
    let mut key_bytes = [0u8; 32];
    loop {
        rng.fill_bytes(&mut key_bytes);
        if let Ok(key_pair) = ES256KeyPair::from_bytes(&key_bytes) {
            return key_pair;
        }
    }
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn generate_vapid_credentials_with_rng__should_return_expected_fixture() {
        // Given
        let seed = [7u8; 32];
        let mut rng = StdRng::from_seed(seed);

        // When
        let credentials =
            generate_vapid_credentials_with_rng(&mut rng).expect("credentials should generate");

        // Then
        assert_eq!(
            credentials.private_key,
            "9pKJeIXAyyCj5M0QagsVvDYHlPF-cymJCbB5iHPsdEE"
        );
        assert_eq!(
            credentials.public_key,
            "BCRweRf_U5iQM4pKNucGRzM6OuLp8Hisa8yX0N2ePIf1oxKitvFT6qvuGgYoTxlMatMDaytXbZR3rVClc2w_p6U"
        );
    }

    #[test]
    fn load_vapid_config__should_classify_partial_and_blank_values() {
        // Given
        let mut config = config::AppConfig::default();

        // Then
        assert!(matches!(load_vapid_config(&config), VapidConfigStatus::Missing));

        config.vapid_private_key = Some("private".to_string());
        config.vapid_public_key = Some("  ".to_string());
        config.vapid_subject = Some("mailto:cdc@example.com".to_string());
        assert!(matches!(
            load_vapid_config(&config),
            VapidConfigStatus::Incomplete
        ));

        config.vapid_public_key = Some("public".to_string());
        config.vapid_subject = Some("cdc@example.com".to_string());
        assert!(matches!(
            load_vapid_config(&config),
            VapidConfigStatus::InvalidSubject
        ));

        config.vapid_subject = Some("mailto:cdc@example.com".to_string());
        match load_vapid_config(&config) {
            VapidConfigStatus::Ready(vapid) => {
                assert_eq!(vapid.public_key, "public");
                assert_eq!(vapid.subject, "mailto:cdc@example.com");
            }
            other => panic!("expected ready config, got {other:?}"),
        }
    }
}
