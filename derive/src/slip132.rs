// Modern, minimalistic & standard-compliant cold wallet library.
//
// SPDX-License-Identifier: Apache-2.0
//
// Written in 2020-2024 by
//     Dr Maxim Orlovsky <orlovsky@lnp-bp.org>
//
// Copyright (C) 2020-2024 LNP/BP Standards Association. All rights reserved.
// Copyright (C) 2020-2024 Dr Maxim Orlovsky. All rights reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! SLIP-132 extended public key versions and their normalization to the
//! neutral BIP-32 `xpub`/`tpub` serialization.

use std::str::FromStr;

use invoice::{base58, AddressNetwork};

use crate::{Xpub, XpubParseError};

/// Semantic meaning of the version prefix.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Display)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", rename_all = "camelCase")
)]
#[display(lowercase)]
pub enum KeyFlavor {
    /// Plain BIP-32 key, no script type implied.
    Neutral,
    /// Key for a single-signature wallet (P2WPKH or P2WPKH-in-P2SH).
    SingleSig,
    /// Key for a multi-signature wallet (P2WSH or P2WSH-in-P2SH).
    MultiSig,
}

/// Known public extended key versions.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Display)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", rename_all = "camelCase")
)]
pub enum KeyVersion {
    #[display("xpub")]
    Xpub,
    #[display("ypub")]
    Ypub,
    #[display("zpub")]
    Zpub,
    #[display("Ypub")]
    YpubMulti,
    #[display("Zpub")]
    ZpubMulti,
    #[display("tpub")]
    Tpub,
    #[display("upub")]
    Upub,
    #[display("vpub")]
    Vpub,
    #[display("Upub")]
    UpubMulti,
    #[display("Vpub")]
    VpubMulti,
}

impl KeyVersion {
    pub const ALL: [KeyVersion; 10] = [
        KeyVersion::Xpub,
        KeyVersion::Ypub,
        KeyVersion::Zpub,
        KeyVersion::YpubMulti,
        KeyVersion::ZpubMulti,
        KeyVersion::Tpub,
        KeyVersion::Upub,
        KeyVersion::Vpub,
        KeyVersion::UpubMulti,
        KeyVersion::VpubMulti,
    ];

    pub const fn magic(self) -> [u8; 4] {
        match self {
            KeyVersion::Xpub => [0x04, 0x88, 0xb2, 0x1e],
            KeyVersion::Ypub => [0x04, 0x9d, 0x7c, 0xb2],
            KeyVersion::Zpub => [0x04, 0xb2, 0x47, 0x46],
            KeyVersion::YpubMulti => [0x02, 0x95, 0xb4, 0x3f],
            KeyVersion::ZpubMulti => [0x02, 0xaa, 0x7e, 0xd3],
            KeyVersion::Tpub => [0x04, 0x35, 0x87, 0xcf],
            KeyVersion::Upub => [0x04, 0x4a, 0x52, 0x62],
            KeyVersion::Vpub => [0x04, 0x5f, 0x1c, 0xf6],
            KeyVersion::UpubMulti => [0x02, 0x42, 0x89, 0xef],
            KeyVersion::VpubMulti => [0x02, 0x57, 0x54, 0x83],
        }
    }

    pub fn from_magic(magic: [u8; 4]) -> Option<Self> {
        Self::ALL.into_iter().find(|version| version.magic() == magic)
    }

    pub const fn network(self) -> AddressNetwork {
        match self {
            KeyVersion::Xpub
            | KeyVersion::Ypub
            | KeyVersion::Zpub
            | KeyVersion::YpubMulti
            | KeyVersion::ZpubMulti => AddressNetwork::Mainnet,
            KeyVersion::Tpub
            | KeyVersion::Upub
            | KeyVersion::Vpub
            | KeyVersion::UpubMulti
            | KeyVersion::VpubMulti => AddressNetwork::Testnet,
        }
    }

    pub const fn flavor(self) -> KeyFlavor {
        match self {
            KeyVersion::Xpub | KeyVersion::Tpub => KeyFlavor::Neutral,
            KeyVersion::Ypub | KeyVersion::Zpub | KeyVersion::Upub | KeyVersion::Vpub => {
                KeyFlavor::SingleSig
            }
            KeyVersion::YpubMulti
            | KeyVersion::ZpubMulti
            | KeyVersion::UpubMulti
            | KeyVersion::VpubMulti => KeyFlavor::MultiSig,
        }
    }

    /// Neutral BIP-32 version of the same network.
    pub const fn neutral(self) -> Self {
        match self.network() {
            AddressNetwork::Mainnet => KeyVersion::Xpub,
            AddressNetwork::Testnet => KeyVersion::Tpub,
        }
    }

    /// Multisig version matching the script type implied by a single-sig
    /// version; other versions are returned as-is.
    pub const fn multisig_counterpart(self) -> Self {
        match self {
            KeyVersion::Ypub => KeyVersion::YpubMulti,
            KeyVersion::Zpub => KeyVersion::ZpubMulti,
            KeyVersion::Upub => KeyVersion::UpubMulti,
            KeyVersion::Vpub => KeyVersion::VpubMulti,
            other => other,
        }
    }

    #[inline]
    pub fn is_neutral(self) -> bool { self.flavor() == KeyFlavor::Neutral }
}

#[derive(Clone, Eq, PartialEq, Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum NormalizeError {
    /// invalid Base58Check encoding of the extended key - {0}
    #[from]
    Base58(base58::Error),

    /// extended key payload is too short ({0} bytes) to contain a version prefix.
    TooShort(usize),

    /// extended key string has {0} characters, exceeding the maximum of 112.
    TooLong(usize),

    /// unknown extended public key version prefix {0:#010x}.
    UnknownPrefix(u32),
}

/// Extended public key rewritten to its neutral BIP-32 version.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Display)]
#[display("{key}")]
pub struct NormalizedKey {
    key: String,
    version: KeyVersion,
}

impl NormalizedKey {
    /// Neutral Base58Check key string (`xpub...` or `tpub...`).
    #[inline]
    pub fn as_str(&self) -> &str { &self.key }

    #[inline]
    pub fn into_string(self) -> String { self.key }

    /// Version the key had before normalization.
    #[inline]
    pub fn original_version(&self) -> KeyVersion { self.version }

    #[inline]
    pub fn network(&self) -> AddressNetwork { self.version.network() }

    /// Parses the normalized key as a BIP-32 extended public key.
    pub fn to_xpub(&self) -> Result<Xpub, XpubParseError> { Xpub::from_str(&self.key) }
}

/// Upper bound on the length of a Base58Check extended key string. Longer
/// inputs are rejected before decoding.
pub const MAX_KEY_LEN: usize = 112;

fn decode(key: &str) -> Result<Vec<u8>, NormalizeError> {
    if key.len() > MAX_KEY_LEN {
        return Err(NormalizeError::TooLong(key.len()));
    }
    Ok(base58::decode_check(key)?)
}

/// Detects version of a Base58Check-encoded extended public key.
pub fn detect_version(key: &str) -> Result<KeyVersion, NormalizeError> {
    let data = decode(key)?;
    version_of(&data)
}

fn version_of(data: &[u8]) -> Result<KeyVersion, NormalizeError> {
    if data.len() < 4 {
        return Err(NormalizeError::TooShort(data.len()));
    }
    let mut magic = [0u8; 4];
    magic.copy_from_slice(&data[..4]);
    KeyVersion::from_magic(magic).ok_or(NormalizeError::UnknownPrefix(u32::from_be_bytes(magic)))
}

/// Rewrites the version bytes of an extended public key to the neutral
/// version of its network. Only the version changes; the checksum is
/// recomputed. Keys which are already neutral are returned unchanged.
pub fn normalize(key: &str) -> Result<NormalizedKey, NormalizeError> {
    let mut data = decode(key)?;
    let version = version_of(&data)?;
    if version.is_neutral() {
        return Ok(NormalizedKey {
            key: key.to_owned(),
            version,
        });
    }
    data[..4].copy_from_slice(&version.neutral().magic());
    Ok(NormalizedKey {
        key: base58::encode_check(&data),
        version,
    })
}

#[cfg(test)]
mod test {
    use super::*;

    const TPUB: &str = "tpubDFc9Mm4tw6EkgR4YTC1GrU6CGEd9yw7KSBnSssL4LXAXh89D4uMZigRyv3csdXbeU3BhLQc4vWKTLewboA1Pt8Fu6fbHKu81MZ6VGdc32eM";
    const VPUB_MULTI: &str = "Vpub5nU5MRdpVQki8beqGwuv4SudJyGsKfJrNboNsnkgcNVHTpQxFmZdREJoSJaPfeZU6KVA6TuCMJAp14qdG8V5YhZ58rZXsxHo7sefKLXGo3h";
    const UPUB_MULTI: &str = "Upub5Tdp3kxuLjDEHJTiSb8HrMp8918RP3KMTVHA6ProEN7QQibj17Q4oAefR6cofjuYggNMLzJdtdpG7nE4YS54kTsUGWs7J3UJr9b1vpgxSQ7";
    const VPUB: &str = "vpub5bZzEBuNvTCLi2VTLHSwENZpbBEc7JdG4L9hxXV9Ebesqdr3VNBML7Ssdbcv7DLZrrRBDsu5U5nJsuDrxuL8QDSQJPT8UYpoE9NnjQjmL81";
    const UPUB: &str = "upub5GjivXETmmerrjJLVvfK2HUKRD6AAgdm9DdVB8bFrbGznY2pEi1ni3njcPfL7JgeTDJNUQJX1RRkzccJFCv7bykoS3khte1JxRK9LpXimEy";

    const XPUB: &str = "xpub68Gmy5EdvgibQVfPdqkBBCHxA5htiqg55crXYuXoQRKfDBFA1WEjWgP6LHhwBZeNK1VTsfTFUHCdrfp1bgwQ9xv5ski8PX9rL2dZXvgGDnw";
    const ZPUB_MULTI: &str = "Zpub6xqPheJuo1MvXfD1FDnQRSpmDp33pSLfE7Ye2xb7YCupwZSXHDx8qvZJBQaajpB7Mko4FCeVGpJEkQeuLJvNtvPxSuDNxkFpmD2itxTfBFT";
    const YPUB_MULTI: &str = "Ypub6e18PydzeKpSgN1tQrznDMjG3qtbspMAK12RFZhEACXwtTdJ2ZnaDruAACczjuXBx7gFVj3vp9wgs83LccWN6giMaZWxNqSLVUy5WMpgN3v";
    const ZPUB: &str = "zpub6mwJaQaUE3oZ763dJZKRbNUxW1znc5f4uqty7hKaAS5RKNscWpZrkohNNhd7BNxD8Hj5NceNPbujdF3935mRkSHHcS6yZLnpsUkrK1XoMLr";
    const YPUB: &str = "ypub6T73GjuZ5NG5FnrWUCXoPHPTL3rLfTfZzjNkLJRgnRhYGH4PGAQJ8k3EMVfXBUJHiecGd93ovwZBjxRaKPMQxCbgk6QYyRyLbkhCvXJ8PtA";
    const XPRV: &str = "xprv9uHRZZhk6KAJC1avXpDAp4MDc3sQKNxDiPvvkX8Br5ngLNv1TxvUxt4cV6Zf6PVmuH3TyDLKoXTBFEGDi2SrQ7KvMkPkYCLoQAkKmqjFUY5";

    #[test]
    fn magic_table() {
        for version in KeyVersion::ALL {
            assert_eq!(KeyVersion::from_magic(version.magic()), Some(version));
            assert_eq!(version.neutral().network(), version.network());
            assert!(version.neutral().is_neutral());
            assert_ne!(version.multisig_counterpart().flavor(), KeyFlavor::SingleSig);
        }
        assert_eq!(KeyVersion::from_magic([0x04, 0x88, 0xad, 0xe4]), None);
    }

    #[test]
    fn testnet_normalization() {
        for (key, version) in [
            (VPUB_MULTI, KeyVersion::VpubMulti),
            (UPUB_MULTI, KeyVersion::UpubMulti),
            (VPUB, KeyVersion::Vpub),
            (UPUB, KeyVersion::Upub),
            (TPUB, KeyVersion::Tpub),
        ] {
            let normalized = normalize(key).unwrap();
            assert_eq!(normalized.as_str(), TPUB);
            assert_eq!(normalized.original_version(), version);
            assert_eq!(normalized.network(), AddressNetwork::Testnet);
            assert_eq!(version.to_string(), &key[..4]);
        }
    }

    #[test]
    fn mainnet_normalization() {
        for key in [ZPUB_MULTI, YPUB_MULTI, ZPUB, YPUB, XPUB] {
            let normalized = normalize(key).unwrap();
            assert_eq!(normalized.to_string(), XPUB);
            assert_eq!(normalized.network(), AddressNetwork::Mainnet);
        }
    }

    #[test]
    fn idempotence() {
        let once = normalize(ZPUB_MULTI).unwrap();
        let twice = normalize(once.as_str()).unwrap();
        assert_eq!(once.as_str(), twice.as_str());
        assert_eq!(twice.original_version(), KeyVersion::Xpub);
    }

    #[test]
    fn preserves_key_material() {
        let original = base58::decode_check(VPUB_MULTI).unwrap();
        let normalized = base58::decode_check(normalize(VPUB_MULTI).unwrap().as_str()).unwrap();
        assert_eq!(original[4..], normalized[4..]);
        assert_eq!(normalize(VPUB_MULTI).unwrap().to_xpub().unwrap().to_string(), TPUB);
    }

    #[test]
    fn rejects() {
        assert_eq!(normalize(XPRV).unwrap_err(), NormalizeError::UnknownPrefix(0x0488ade4));
        assert!(matches!(normalize(""), Err(NormalizeError::Base58(_))));
        assert!(matches!(normalize("tpub0OIl"), Err(NormalizeError::Base58(_))));
        let mut corrupted = TPUB.to_owned();
        corrupted.pop();
        corrupted.push('N');
        assert!(matches!(normalize(&corrupted), Err(NormalizeError::Base58(_))));
        let short = base58::encode_check(&[0x04, 0x35]);
        assert_eq!(normalize(&short).unwrap_err(), NormalizeError::TooShort(2));
        assert_eq!(detect_version(ZPUB).unwrap(), KeyVersion::Zpub);
    }

    #[test]
    fn oversized_input() {
        let padded = format!("{TPUB}{}", "1".repeat(MAX_KEY_LEN + 1 - TPUB.len()));
        let err = NormalizeError::TooLong(MAX_KEY_LEN + 1);
        assert_eq!(normalize(&padded).unwrap_err(), err);
        assert_eq!(detect_version(&padded).unwrap_err(), err);
        let huge = "z".repeat(1 << 20);
        assert_eq!(normalize(&huge).unwrap_err(), NormalizeError::TooLong(1 << 20));
        assert!(normalize(TPUB).is_ok());
    }
}
