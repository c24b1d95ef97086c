//! Seeds, key pairs and wallets.
//!
//! A wallet is fully determined by its seed. Family seeds (`s…`) derive a
//! secp256k1 key pair through the root/intermediate generator scheme; seeds
//! carrying the ed25519 prefix (`sEd…`) hash straight to an ed25519 key.

use std::fmt;

use ed25519_dalek::Signer as _;
use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::{NonZeroScalar, SecretKey};
use sha2::{Digest, Sha512};
use zeroize::Zeroizing;

use crate::address::{self, ED25519_SEED_PREFIX, FAMILY_SEED_PREFIX};
use crate::error::{Error, Result};

/// Number of entropy bytes in a seed.
pub const SEED_LEN: usize = 16;

/// Prefix byte marking an ed25519 public key.
const ED25519_KEY_PREFIX: u8 = 0xED;

/// Signature algorithm a seed derives keys for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyType {
    /// ECDSA over secp256k1, the default for family seeds.
    Secp256k1,
    /// `EdDSA` over Curve25519.
    Ed25519,
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Secp256k1 => write!(f, "secp256k1"),
            Self::Ed25519 => write!(f, "ed25519"),
        }
    }
}

/// Decoded seed entropy.
pub struct Seed {
    entropy: Zeroizing<[u8; SEED_LEN]>,
    key_type: KeyType,
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Seed")
            .field("key_type", &self.key_type)
            .finish_non_exhaustive()
    }
}

impl Seed {
    /// Build a seed from raw entropy.
    #[must_use]
    pub fn from_entropy(entropy: [u8; SEED_LEN], key_type: KeyType) -> Self {
        Self {
            entropy: Zeroizing::new(entropy),
            key_type,
        }
    }

    /// Decode a base58 seed string.
    ///
    /// The ed25519 prefix is tried first; anything else must be a family seed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSeed`] if the string is not a valid seed.
    pub fn decode(encoded: &str) -> Result<Self> {
        let encoded = encoded.trim();
        if encoded.is_empty() {
            return Err(Error::invalid_seed("seed is empty"));
        }

        let (bytes, key_type) =
            if let Some(bytes) = address::decode_check(encoded, ED25519_SEED_PREFIX, SEED_LEN) {
                (Zeroizing::new(bytes), KeyType::Ed25519)
            } else if let Some(bytes) =
                address::decode_check(encoded, FAMILY_SEED_PREFIX, SEED_LEN)
            {
                (Zeroizing::new(bytes), KeyType::Secp256k1)
            } else {
                return Err(Error::invalid_seed(
                    "not a base58 XRPL seed or checksum mismatch",
                ));
            };

        let mut entropy = [0u8; SEED_LEN];
        entropy.copy_from_slice(&bytes);
        Ok(Self::from_entropy(entropy, key_type))
    }

    /// Encode this seed back into its base58 form.
    #[must_use]
    pub fn encode(&self) -> String {
        let prefix = match self.key_type {
            KeyType::Secp256k1 => FAMILY_SEED_PREFIX,
            KeyType::Ed25519 => ED25519_SEED_PREFIX,
        };
        address::encode_check(prefix, self.entropy.as_slice())
    }

    /// The algorithm this seed derives keys for.
    #[must_use]
    pub fn key_type(&self) -> KeyType {
        self.key_type
    }
}

/// First half of a SHA-512 digest, the hash used throughout the ledger.
#[must_use]
pub fn sha512_half(data: &[u8]) -> [u8; 32] {
    let digest = Sha512::digest(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest[..32]);
    out
}

/// Hash `input` (plus an optional discriminator and a counter) until the
/// result is a valid secp256k1 scalar.
fn derive_scalar(input: &[u8], discriminator: Option<u32>) -> Result<SecretKey> {
    for counter in 0..=u32::MAX {
        let mut hasher = Sha512::new();
        hasher.update(input);
        if let Some(d) = discriminator {
            hasher.update(d.to_be_bytes());
        }
        hasher.update(counter.to_be_bytes());
        let digest = hasher.finalize();

        if let Ok(key) = SecretKey::from_slice(&digest[..32]) {
            return Ok(key);
        }
    }
    Err(Error::Signing("no valid secp256k1 scalar found".to_string()))
}

fn derive_secp256k1(entropy: &[u8]) -> Result<SecretKey> {
    let root = derive_scalar(entropy, None)?;
    let root_public = root.public_key().to_encoded_point(true);

    // Account index 0 of the root generator.
    let intermediate = derive_scalar(root_public.as_bytes(), Some(0))?;

    let sum = *root.to_nonzero_scalar() + *intermediate.to_nonzero_scalar();
    let scalar = Option::<NonZeroScalar>::from(NonZeroScalar::new(sum))
        .ok_or_else(|| Error::Signing("derived secp256k1 key is zero".to_string()))?;

    Ok(SecretKey::from(scalar))
}

enum SigningKey {
    Secp256k1(k256::ecdsa::SigningKey),
    Ed25519(ed25519_dalek::SigningKey),
}

/// An account key pair plus its classic address.
pub struct Wallet {
    key: SigningKey,
    public_key: Vec<u8>,
    address: String,
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("key_type", &self.key_type())
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl Wallet {
    /// Derive a wallet from a base58 seed string.
    ///
    /// # Errors
    ///
    /// Returns an error if the seed cannot be decoded or keys cannot be derived.
    pub fn from_seed(secret: &str) -> Result<Self> {
        Self::from_decoded_seed(&Seed::decode(secret)?)
    }

    /// Derive a wallet from already-decoded seed entropy.
    ///
    /// # Errors
    ///
    /// Returns an error if key derivation fails.
    pub fn from_decoded_seed(seed: &Seed) -> Result<Self> {
        let (key, public_key) = match seed.key_type {
            KeyType::Secp256k1 => {
                let secret = derive_secp256k1(seed.entropy.as_slice())?;
                let public_key = secret
                    .public_key()
                    .to_encoded_point(true)
                    .as_bytes()
                    .to_vec();
                let key = k256::ecdsa::SigningKey::from(secret);
                (SigningKey::Secp256k1(key), public_key)
            }
            KeyType::Ed25519 => {
                let secret = Zeroizing::new(sha512_half(seed.entropy.as_slice()));
                let key = ed25519_dalek::SigningKey::from_bytes(&secret);
                let mut public_key = Vec::with_capacity(33);
                public_key.push(ED25519_KEY_PREFIX);
                public_key.extend_from_slice(key.verifying_key().as_bytes());
                (SigningKey::Ed25519(key), public_key)
            }
        };

        let address = address::encode_address(&address::account_id(&public_key));
        Ok(Self {
            key,
            public_key,
            address,
        })
    }

    /// The classic `r…` address.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// The 33-byte public key as sent in `SigningPubKey`.
    #[must_use]
    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    /// Uppercase hex of the public key.
    #[must_use]
    pub fn public_key_hex(&self) -> String {
        hex::encode_upper(&self.public_key)
    }

    /// The algorithm of this wallet's key pair.
    #[must_use]
    pub fn key_type(&self) -> KeyType {
        match self.key {
            SigningKey::Secp256k1(_) => KeyType::Secp256k1,
            SigningKey::Ed25519(_) => KeyType::Ed25519,
        }
    }

    /// Sign a serialized signing payload (hash prefix included).
    ///
    /// secp256k1 signs the SHA-512Half of the payload and returns a DER
    /// signature; ed25519 signs the payload itself.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Signing`] if the signer rejects the input.
    pub fn sign(&self, payload: &[u8]) -> Result<Vec<u8>> {
        match &self.key {
            SigningKey::Secp256k1(key) => {
                let digest = sha512_half(payload);
                // k256 emits low-S signatures, which the ledger requires.
                let signature: k256::ecdsa::Signature = key
                    .sign_prehash(&digest)
                    .map_err(|e| Error::Signing(e.to_string()))?;
                Ok(signature.to_der().as_bytes().to_vec())
            }
            SigningKey::Ed25519(key) => Ok(key.sign(payload).to_bytes().to_vec()),
        }
    }
}

/// Derive the classic address for a seed without keeping the keys.
///
/// # Errors
///
/// Returns an error if the seed is invalid.
pub fn derive_address(secret: &str) -> Result<String> {
    Wallet::from_seed(secret).map(|w| w.address)
}
