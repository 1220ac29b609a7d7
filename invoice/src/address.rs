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

//! Addresses for script-hash outputs: native segwit P2WSH and legacy P2SH
//! (used for nesting P2WSH).

use std::fmt::{self, Debug, Display, Formatter};
use std::str::FromStr;

use bech32::u5;

use crate::{base58, ScriptHash, ScriptPubkey, WScriptHash};

/// Mainnet (bitcoin) script address prefix.
pub const SCRIPT_ADDRESS_PREFIX_MAIN: u8 = 5; // 0x05
/// Test (tesnet, signet) script address prefix.
pub const SCRIPT_ADDRESS_PREFIX_TEST: u8 = 196; // 0xc4

/// Errors creating address from scriptPubkey.
#[derive(Clone, Eq, PartialEq, Debug, Display, Error)]
#[display(doc_comments)]
pub enum AddressError {
    /// scriptPubkey can't be represented with any supported script-hash
    /// address standard.
    UnsupportedScriptPubkey,
}

/// Errors parsing address strings.
#[derive(Clone, Eq, PartialEq, Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum AddressParseError {
    /// wrong Base58 encoding of address data - {0}
    #[from]
    Base58(base58::Error),

    /// wrong Bech32 encoding of address data - {0}
    #[from]
    Bech32(bech32::Error),

    /// address has an invalid version code {0:#04x}.
    InvalidAddressVersion(u8),

    /// address has invalid payload length {0}.
    InvalidPayloadLength(usize),

    /// segwit address has an unsupported witness version {0}.
    UnsupportedWitnessVersion(u8),

    /// address has an invalid Bech32 variant {0:?}.
    InvalidBech32Variant(bech32::Variant),

    /// unrecognized address format in '{0}'.
    UnrecognizableFormat(String),

    /// unrecognized address format string; must be one of `P2SH`, `P2WSH`
    UnrecognizedAddressType,
}

#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, From)]
pub struct Address {
    /// Address payload (see [`AddressPayload`]).
    pub payload: AddressPayload,

    /// A type of the network used by the address
    pub network: AddressNetwork,
}

impl Address {
    pub fn new(payload: AddressPayload, network: AddressNetwork) -> Self {
        Address { payload, network }
    }

    /// Constructs compatible address for a given `scriptPubkey`.
    pub fn with(
        script: &ScriptPubkey,
        network: impl Into<AddressNetwork>,
    ) -> Result<Self, AddressError> {
        let payload = AddressPayload::from_script(script)?;
        Ok(Address {
            payload,
            network: network.into(),
        })
    }

    /// Returns script corresponding to the given address.
    pub fn script_pubkey(self) -> ScriptPubkey { self.payload.script_pubkey() }

    /// Returns if the address is testnet- or signet-specific.
    pub fn is_testnet(self) -> bool { self.network != AddressNetwork::Mainnet }

    /// Detects address type.
    pub fn address_type(self) -> AddressType { self.payload.address_type() }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let hash = match self.payload {
            AddressPayload::Sh(hash) => {
                let mut prefixed = [0; 21];
                prefixed[0] = self.network.script_address_prefix();
                prefixed[1..].copy_from_slice(&<[u8; 20]>::from(hash));
                return base58::encode_check_to_fmt(f, &prefixed[..]);
            }
            AddressPayload::Wsh(hash) => <[u8; 32]>::from(hash),
        };

        struct UpperWriter<W: fmt::Write>(W);
        impl<W: fmt::Write> fmt::Write for UpperWriter<W> {
            fn write_str(&mut self, s: &str) -> fmt::Result {
                for c in s.chars() {
                    self.0.write_char(c.to_ascii_uppercase())?;
                }
                Ok(())
            }
        }

        let mut upper_writer;
        let writer = if f.alternate() {
            upper_writer = UpperWriter(f);
            &mut upper_writer as &mut dyn fmt::Write
        } else {
            f as &mut dyn fmt::Write
        };
        let mut bech32_writer =
            bech32::Bech32Writer::new(self.network.bech32_hrp(), bech32::Variant::Bech32, writer)?;
        let ver_u5 = u5::try_from_u8(0).expect("witness version 0 is a valid u5");
        bech32::WriteBase32::write_u5(&mut bech32_writer, ver_u5)?;
        bech32::ToBase32::write_base32(&hash, &mut bech32_writer)?;
        bech32_writer.finalize()
    }
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_base58 = || -> Result<Self, Self::Err> {
            let data = base58::decode_check(s)?;
            if data.len() != 21 {
                return Err(AddressParseError::InvalidPayloadLength(data.len()));
            }
            let network = match data[0] {
                SCRIPT_ADDRESS_PREFIX_MAIN => AddressNetwork::Mainnet,
                SCRIPT_ADDRESS_PREFIX_TEST => AddressNetwork::Testnet,
                x => return Err(AddressParseError::InvalidAddressVersion(x)),
            };
            let mut hash = [0u8; 20];
            hash.copy_from_slice(&data[1..]);
            Ok(Address::new(AddressPayload::Sh(hash.into()), network))
        };

        let parse_bech32 = |hrp: String,
                            payload: Vec<u5>,
                            variant: bech32::Variant|
         -> Result<Self, Self::Err> {
            let network = match hrp.to_lowercase().as_str() {
                "bc" => AddressNetwork::Mainnet,
                "tb" => AddressNetwork::Testnet,
                _ => return Err(AddressParseError::UnrecognizableFormat(s.to_owned())),
            };
            let Some((version, p5)) = payload.split_first() else {
                return Err(AddressParseError::InvalidPayloadLength(0));
            };
            if version.to_u8() != 0 {
                return Err(AddressParseError::UnsupportedWitnessVersion(version.to_u8()));
            }
            if variant != bech32::Variant::Bech32 {
                return Err(AddressParseError::InvalidBech32Variant(variant));
            }
            let program: Vec<u8> = bech32::FromBase32::from_base32(p5)?;
            if program.len() != 32 {
                return Err(AddressParseError::InvalidPayloadLength(program.len()));
            }
            let mut hash = [0u8; 32];
            hash.copy_from_slice(&program);
            Ok(Address::new(AddressPayload::Wsh(hash.into()), network))
        };

        match bech32::decode(s) {
            Ok((hrp, payload, variant)) => parse_bech32(hrp, payload, variant),
            Err(_) => parse_base58(),
        }
    }
}

/// Internal address content: the script hash committed to by the output.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, From)]
pub enum AddressPayload {
    /// P2SH payload; used for P2WSH-in-P2SH nesting.
    #[from]
    Sh(ScriptHash),

    /// P2WSH payload.
    #[from]
    Wsh(WScriptHash),
}

impl AddressPayload {
    /// Constructs [`Address`] from the payload.
    pub fn into_address(self, network: AddressNetwork) -> Address {
        Address {
            payload: self,
            network,
        }
    }

    /// Constructs payload from a given `scriptPubkey`. Fails on any output
    /// type other than P2SH or P2WSH.
    pub fn from_script(script: &ScriptPubkey) -> Result<Self, AddressError> {
        Ok(if script.is_p2sh() {
            let mut bytes = [0u8; 20];
            bytes.copy_from_slice(&script[2..22]);
            AddressPayload::Sh(ScriptHash::from(bytes))
        } else if script.is_p2wsh() {
            let mut bytes = [0u8; 32];
            bytes.copy_from_slice(&script[2..]);
            AddressPayload::Wsh(WScriptHash::from(bytes))
        } else {
            return Err(AddressError::UnsupportedScriptPubkey);
        })
    }

    /// Returns script corresponding to the given address.
    pub fn script_pubkey(self) -> ScriptPubkey {
        match self {
            AddressPayload::Sh(hash) => ScriptPubkey::p2sh(hash),
            AddressPayload::Wsh(hash) => ScriptPubkey::p2wsh(hash),
        }
    }

    /// Detects address type.
    pub fn address_type(self) -> AddressType {
        match self {
            AddressPayload::Sh(_) => AddressType::P2sh,
            AddressPayload::Wsh(_) => AddressType::P2wsh,
        }
    }
}

impl From<AddressPayload> for ScriptPubkey {
    fn from(ap: AddressPayload) -> Self { ap.script_pubkey() }
}

/// Address type
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Display)]
pub enum AddressType {
    /// Pay-to-script hash
    #[display("P2SH")]
    P2sh,

    /// Pay-to-witness script hash
    #[display("P2WSH")]
    P2wsh,
}

impl FromStr for AddressType {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_uppercase().as_str() {
            "P2SH" => AddressType::P2sh,
            "P2WSH" => AddressType::P2wsh,
            _ => return Err(AddressParseError::UnrecognizedAddressType),
        })
    }
}

/// Bitcoin network family as it is encoded in addresses and extended keys.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Display)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", rename_all = "lowercase")
)]
#[display(lowercase)]
pub enum AddressNetwork {
    /// Bitcoin mainnet
    Mainnet,

    /// Bitcoin testnet and signet
    Testnet,
}

impl AddressNetwork {
    /// Detects whether the network is a kind of test network (testnet,
    /// signet).
    pub fn is_testnet(self) -> bool { self != Self::Mainnet }

    pub fn bech32_hrp(self) -> &'static str {
        match self {
            AddressNetwork::Mainnet => "bc",
            AddressNetwork::Testnet => "tb",
        }
    }

    pub fn script_address_prefix(self) -> u8 {
        match self {
            AddressNetwork::Mainnet => SCRIPT_ADDRESS_PREFIX_MAIN,
            AddressNetwork::Testnet => SCRIPT_ADDRESS_PREFIX_TEST,
        }
    }
}

#[cfg(feature = "serde")]
mod _serde {
    use serde_crate::{de, Deserialize, Deserializer, Serialize, Serializer};

    use super::*;

    impl Serialize for Address {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where S: Serializer {
            serializer.serialize_str(&self.to_string())
        }
    }

    impl<'de> Deserialize<'de> for Address {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where D: Deserializer<'de> {
            let s = String::deserialize(deserializer)?;
            Address::from_str(&s).map_err(|err| {
                de::Error::custom(format!("invalid address string representation; {err}"))
            })
        }
    }
}
