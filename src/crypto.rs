//! Key material used to sign transactions.
//!
//! Keys are parsed from the string formats produced by the Hedera SDKs:
//! - DER-encoded hex (ED25519 or ECDSA secp256k1)
//! - raw 32-byte hex, interpreted as ED25519
//! - `0x`-prefixed raw 32-byte hex, interpreted as ECDSA secp256k1

use alloy::primitives::keccak256;
use ed25519_dalek::{Signer, Verifier};
use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

const ED25519_PRIVATE_DER_PREFIX: &str = "302e020100300506032b657004220420";
const ED25519_PUBLIC_DER_PREFIX: &str = "302a300506032b6570032100";
const ECDSA_PRIVATE_DER_PREFIX: &str = "3030020100300706052b8104000a04220420";
const ECDSA_PUBLIC_DER_PREFIX: &str = "302d300706052b8104000a032200";

#[derive(Clone)]
pub enum PrivateKey {
    Ed25519(ed25519_dalek::SigningKey),
    EcdsaSecp256k1(k256::ecdsa::SigningKey),
}

#[derive(Clone, PartialEq, Eq, SerializeDisplay, DeserializeFromStr)]
pub enum PublicKey {
    Ed25519(ed25519_dalek::VerifyingKey),
    EcdsaSecp256k1(k256::ecdsa::VerifyingKey),
}

impl PrivateKey {
    pub fn ed25519_from_bytes(bytes: &[u8]) -> Result<Self, ValidationError> {
        let seed: [u8; 32] = bytes
            .try_into()
            .map_err(|_| ValidationError::invalid("private key", "ED25519 key must be 32 bytes"))?;
        Ok(Self::Ed25519(ed25519_dalek::SigningKey::from_bytes(&seed)))
    }

    pub fn ecdsa_from_bytes(bytes: &[u8]) -> Result<Self, ValidationError> {
        k256::ecdsa::SigningKey::from_slice(bytes)
            .map(Self::EcdsaSecp256k1)
            .map_err(|e| ValidationError::invalid("private key", e.to_string()))
    }

    pub fn public_key(&self) -> PublicKey {
        match self {
            PrivateKey::Ed25519(key) => PublicKey::Ed25519(key.verifying_key()),
            PrivateKey::EcdsaSecp256k1(key) => PublicKey::EcdsaSecp256k1(*key.verifying_key()),
        }
    }

    /// Sign transaction body bytes.
    ///
    /// ECDSA keys sign the keccak256 digest of the message and produce the
    /// 64-byte `r || s` form.
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>, String> {
        match self {
            PrivateKey::Ed25519(key) => Ok(key.sign(message).to_bytes().to_vec()),
            PrivateKey::EcdsaSecp256k1(key) => {
                let digest = keccak256(message);
                let signature: k256::ecdsa::Signature = key
                    .sign_prehash(digest.as_slice())
                    .map_err(|e| e.to_string())?;
                Ok(signature.to_bytes().to_vec())
            }
        }
    }

    /// DER-encoded hex, the format accepted by [`FromStr`].
    pub fn to_der_string(&self) -> String {
        match self {
            PrivateKey::Ed25519(key) => {
                format!("{ED25519_PRIVATE_DER_PREFIX}{}", hex::encode(key.to_bytes()))
            }
            PrivateKey::EcdsaSecp256k1(key) => {
                format!("{ECDSA_PRIVATE_DER_PREFIX}{}", hex::encode(key.to_bytes()))
            }
        }
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("public_key", &self.public_key().to_string())
            .finish_non_exhaustive()
    }
}

impl FromStr for PrivateKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let decode = |hex_str: &str| {
            hex::decode(hex_str).map_err(|e| ValidationError::invalid("private key", e.to_string()))
        };
        let lower = s.to_ascii_lowercase();

        if let Some(raw) = lower.strip_prefix(ED25519_PRIVATE_DER_PREFIX) {
            Self::ed25519_from_bytes(&decode(raw)?)
        } else if let Some(raw) = lower.strip_prefix(ECDSA_PRIVATE_DER_PREFIX) {
            Self::ecdsa_from_bytes(&decode(raw)?)
        } else if let Some(raw) = lower.strip_prefix("0x") {
            Self::ecdsa_from_bytes(&decode(raw)?)
        } else {
            Self::ed25519_from_bytes(&decode(&lower)?)
        }
    }
}

impl PublicKey {
    /// Raw key bytes: 32 bytes for ED25519, 33-byte compressed point for ECDSA.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            PublicKey::Ed25519(key) => key.to_bytes().to_vec(),
            PublicKey::EcdsaSecp256k1(key) => key.to_encoded_point(true).as_bytes().to_vec(),
        }
    }

    pub fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        match self {
            PublicKey::Ed25519(key) => ed25519_dalek::Signature::from_slice(signature)
                .map(|sig| key.verify(message, &sig).is_ok())
                .unwrap_or(false),
            PublicKey::EcdsaSecp256k1(key) => k256::ecdsa::Signature::from_slice(signature)
                .map(|sig| {
                    key.verify_prehash(keccak256(message).as_slice(), &sig)
                        .is_ok()
                })
                .unwrap_or(false),
        }
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self {
            PublicKey::Ed25519(_) => ED25519_PUBLIC_DER_PREFIX,
            PublicKey::EcdsaSecp256k1(_) => ECDSA_PUBLIC_DER_PREFIX,
        };
        write!(f, "{prefix}{}", hex::encode(self.to_bytes()))
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({self})")
    }
}

impl FromStr for PublicKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let (is_ecdsa, raw) = if let Some(raw) = lower.strip_prefix(ED25519_PUBLIC_DER_PREFIX) {
            (false, raw)
        } else if let Some(raw) = lower.strip_prefix(ECDSA_PUBLIC_DER_PREFIX) {
            (true, raw)
        } else {
            let raw = lower.trim_start_matches("0x");
            (raw.len() == 66, raw)
        };
        let bytes =
            hex::decode(raw).map_err(|e| ValidationError::invalid("public key", e.to_string()))?;

        if is_ecdsa {
            k256::ecdsa::VerifyingKey::from_sec1_bytes(&bytes)
                .map(PublicKey::EcdsaSecp256k1)
                .map_err(|e| ValidationError::invalid("public key", e.to_string()))
        } else {
            let bytes: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
                ValidationError::invalid("public key", "ED25519 key must be 32 bytes")
            })?;
            ed25519_dalek::VerifyingKey::from_bytes(&bytes)
                .map(PublicKey::Ed25519)
                .map_err(|e| ValidationError::invalid("public key", e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ED25519_SEED: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    #[test]
    fn test_parse_raw_hex_as_ed25519() {
        let key: PrivateKey = ED25519_SEED.parse().unwrap();
        assert!(matches!(key, PrivateKey::Ed25519(_)));
    }

    #[test]
    fn test_parse_prefixed_hex_as_ecdsa() {
        let key: PrivateKey = format!("0x{ED25519_SEED}").parse().unwrap();
        assert!(matches!(key, PrivateKey::EcdsaSecp256k1(_)));
    }

    #[test]
    fn test_der_round_trip() {
        let ed: PrivateKey = ED25519_SEED.parse().unwrap();
        let ecdsa: PrivateKey = format!("0x{ED25519_SEED}").parse().unwrap();
        for key in [ed, ecdsa] {
            let parsed: PrivateKey = key.to_der_string().parse().unwrap();
            assert_eq!(parsed.public_key(), key.public_key());

            let public: PublicKey = key.public_key().to_string().parse().unwrap();
            assert_eq!(public, key.public_key());
        }
    }

    #[test]
    fn test_sign_and_verify() {
        let ed: PrivateKey = ED25519_SEED.parse().unwrap();
        let ecdsa: PrivateKey = format!("0x{ED25519_SEED}").parse().unwrap();
        for key in [ed, ecdsa] {
            let signature = key.sign(b"body bytes").unwrap();
            assert_eq!(signature.len(), 64);
            assert!(key.public_key().verify(b"body bytes", &signature));
            assert!(!key.public_key().verify(b"other bytes", &signature));
        }
    }

    #[test]
    fn test_debug_hides_secret() {
        let key: PrivateKey = ED25519_SEED.parse().unwrap();
        let debug = format!("{key:?}");
        assert!(!debug.contains(ED25519_SEED));
    }

    #[test]
    fn test_invalid_key_rejected() {
        assert!("zz".parse::<PrivateKey>().is_err());
        assert!("abcd".parse::<PrivateKey>().is_err());
    }
}
