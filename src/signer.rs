use std::{fmt, str::FromStr};

use anyhow::{anyhow, bail, Result};
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use sha2::{Digest, Sha256};

pub const PUBKEY_HEADER: &str = "xr-pubkey";
pub const SIGNATURE_HEADER: &str = "xr-signature";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chain {
    Mainnet,
    Testnet,
    Regtest,
}

impl Chain {
    /// Base58 version byte of WIF secrets on this chain.
    pub fn secret_key_prefix(self) -> u8 {
        match self {
            Chain::Mainnet => 154,
            Chain::Testnet | Chain::Regtest => 239,
        }
    }
}

impl FromStr for Chain {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mainnet" => Ok(Chain::Mainnet),
            "testnet" => Ok(Chain::Testnet),
            "regtest" => Ok(Chain::Regtest),
            _ => bail!("Unknown chain {s}"),
        }
    }
}

/// Header values attached to a signed response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeaders {
    pub pubkey: String,
    pub signature: String,
}

/// Service node identity used to sign every response body.
#[derive(Clone)]
pub struct ServiceNodeKey {
    secret: SecretKey,
    public: PublicKey,
    compressed: bool,
}

impl fmt::Debug for ServiceNodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceNodeKey")
            .field("pubkey", &self.pubkey_hex())
            .field("compressed", &self.compressed)
            .finish()
    }
}

impl ServiceNodeKey {
    pub fn from_wif(wif: &str, chain: Chain) -> Result<Self> {
        let data = bs58::decode(wif)
            .with_check(None)
            .into_vec()
            .map_err(|err| anyhow!("bad service node key: {err}"))?;

        let (version, payload) = data
            .split_first()
            .ok_or_else(|| anyhow!("bad service node key: empty payload"))?;
        if *version != chain.secret_key_prefix() {
            bail!("bad service node key: version byte {version} does not match {chain:?}");
        }

        let compressed = match payload.len() {
            32 => false,
            33 if payload[32] == 1 => true,
            _ => bail!("bad service node key: invalid length {}", payload.len()),
        };

        let secret = SecretKey::from_slice(&payload[..32])?;
        Ok(Self::new(secret, compressed))
    }

    pub fn new(secret: SecretKey, compressed: bool) -> Self {
        let secp = Secp256k1::signing_only();
        let public = PublicKey::from_secret_key(&secp, &secret);
        Self {
            secret,
            public,
            compressed,
        }
    }

    pub fn pubkey_hex(&self) -> String {
        if self.compressed {
            hex::encode(self.public.serialize())
        } else {
            hex::encode(self.public.serialize_uncompressed())
        }
    }

    /// Signs `body` with a compact recoverable signature prefixed by its metadata byte.
    pub fn sign(&self, body: &[u8]) -> Result<SignatureHeaders> {
        let secp = Secp256k1::signing_only();
        let message = Message::from_slice(&body_hash(body))?;
        let (recovery_id, sig) = secp
            .sign_ecdsa_recoverable(&message, &self.secret)
            .serialize_compact();

        let mut meta = 27 + recovery_id.to_i32() as u8;
        if self.compressed {
            meta += 4;
        }

        let mut encoded = Vec::with_capacity(65);
        encoded.push(meta);
        encoded.extend_from_slice(&sig);

        Ok(SignatureHeaders {
            pubkey: self.pubkey_hex(),
            signature: hex::encode(encoded),
        })
    }
}

/// Double SHA-256 over the length-prefixed body.
pub fn body_hash(body: &[u8]) -> [u8; 32] {
    let mut serialized = compact_size(body.len() as u64);
    serialized.extend_from_slice(body);

    let first = Sha256::digest(&serialized);
    Sha256::digest(first).into()
}

fn compact_size(len: u64) -> Vec<u8> {
    match len {
        0..=0xfc => vec![len as u8],
        0xfd..=0xffff => {
            let mut out = vec![0xfd];
            out.extend_from_slice(&(len as u16).to_le_bytes());
            out
        }
        0x1_0000..=0xffff_ffff => {
            let mut out = vec![0xfe];
            out.extend_from_slice(&(len as u32).to_le_bytes());
            out
        }
        _ => {
            let mut out = vec![0xff];
            out.extend_from_slice(&len.to_le_bytes());
            out
        }
    }
}
