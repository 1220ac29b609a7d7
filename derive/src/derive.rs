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

use std::num::ParseIntError;
use std::str::FromStr;

use bc::CompressedPk;
use invoice::{
    Address, AddressError, AddressNetwork, RedeemScript, ScriptPubkey, WitnessScript,
    WitnessScriptExt,
};
use secp256k1::{Secp256k1, Verification};

use crate::{DerivationIndex, IdxBase, IndexParseError, NormalIndex};

/// Keychain (the `change` level of a BIP-44 style path): 0 for receive
/// addresses, 1 for change.
#[derive(Wrapper, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Default, Debug, Display, From)]
#[wrapper(FromStr)]
#[display(inner)]
pub struct Keychain(u8);

impl From<Keychain> for NormalIndex {
    #[inline]
    fn from(keychain: Keychain) -> Self { NormalIndex::from(keychain.0) }
}

impl From<Keychain> for DerivationIndex {
    #[inline]
    fn from(keychain: Keychain) -> Self { DerivationIndex::Normal(keychain.into()) }
}

impl Keychain {
    pub const OUTER: Self = Keychain(0);
    pub const INNER: Self = Keychain(1);

    pub const fn with(idx: u8) -> Self { Keychain(idx) }

    pub const fn is_change(self) -> bool { self.0 == 1 }
}

impl IdxBase for Keychain {
    #[inline]
    fn is_hardened(&self) -> bool { false }

    #[inline]
    fn child_number(&self) -> u32 { self.0 as u32 }

    #[inline]
    fn index(&self) -> u32 { self.0 as u32 }
}

/// Last two unhardened segments of a derivation path: `change/index`.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display)]
#[display("{keychain}/{index}")]
pub struct Terminal {
    pub keychain: Keychain,
    pub index: NormalIndex,
}

impl Terminal {
    pub fn new(keychain: impl Into<Keychain>, index: NormalIndex) -> Self {
        Terminal {
            keychain: keychain.into(),
            index,
        }
    }
    pub fn receive(index: NormalIndex) -> Self { Self::new(0, index) }
    pub fn change(index: NormalIndex) -> Self { Self::new(1, index) }

    /// Derivation segments in the order they are applied to a key.
    pub fn segments(self) -> [NormalIndex; 2] { [self.keychain.into(), self.index] }
}

#[derive(Clone, Eq, PartialEq, Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum TerminalParseError {
    /// keychain index in terminal derivation path is not a number.
    #[from]
    InvalidKeychain(ParseIntError),

    #[from]
    #[display(inner)]
    Index(IndexParseError),

    /// derivation path '{0}' is not a terminal path - terminal path must contain exactly two
    /// components.
    InvalidComponents(String),
}

impl FromStr for Terminal {
    type Err = TerminalParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut iter = s.split('/');
        match (iter.next(), iter.next(), iter.next()) {
            (Some(keychain), Some(index), None) => {
                Ok(Terminal::new(Keychain::from_str(keychain)?, index.parse()?))
            }
            _ => Err(TerminalParseError::InvalidComponents(s.to_owned())),
        }
    }
}

#[cfg(feature = "serde")]
mod _serde {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::*;

    impl Serialize for Keychain {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where S: Serializer {
            self.0.serialize(serializer)
        }
    }

    impl<'de> Deserialize<'de> for Keychain {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where D: Deserializer<'de> {
            Ok(Self(u8::deserialize(deserializer)?))
        }
    }

    impl Serialize for Terminal {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where S: Serializer {
            if serializer.is_human_readable() {
                self.to_string().serialize(serializer)
            } else {
                let tuple = (self.keychain, self.index);
                tuple.serialize(serializer)
            }
        }
    }

    impl<'de> Deserialize<'de> for Terminal {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where D: Deserializer<'de> {
            if deserializer.is_human_readable() {
                let s = String::deserialize(deserializer)?;
                Self::from_str(&s).map_err(D::Error::custom)
            } else {
                let d = <(Keychain, NormalIndex)>::deserialize(deserializer)?;
                Ok(Self {
                    keychain: d.0,
                    index: d.1,
                })
            }
        }
    }
}

/// Script derived for a specific terminal, together with the way it is
/// committed to by the output.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum DerivedScript {
    /// Native segwit v0 script hash output (P2WSH).
    Segwit(WitnessScript),
    /// Witness script hash nested in a legacy script hash output (P2SH-P2WSH).
    NestedScript(WitnessScript),
}

impl DerivedScript {
    pub fn to_script_pubkey(&self) -> ScriptPubkey {
        match self {
            DerivedScript::Segwit(witness_script) => witness_script.to_p2wsh(),
            DerivedScript::NestedScript(witness_script) => {
                witness_script.to_p2sh_wsh().to_script_pubkey()
            }
        }
    }

    pub fn to_redeem_script(&self) -> Option<RedeemScript> {
        match self {
            DerivedScript::Segwit(_) => None,
            DerivedScript::NestedScript(witness_script) => Some(witness_script.to_p2sh_wsh()),
        }
    }

    pub fn as_witness_script(&self) -> &WitnessScript {
        match self {
            DerivedScript::Segwit(witness_script) | DerivedScript::NestedScript(witness_script) => {
                witness_script
            }
        }
    }

    /// Encodes the output as an address for the given network.
    pub fn to_address(&self, network: impl Into<AddressNetwork>) -> Result<Address, AddressError> {
        Address::with(&self.to_script_pubkey(), network)
    }
}

/// Keys which can derive a compressed public key for a terminal path.
pub trait DeriveCompr {
    fn derive_compr<C: Verification>(&self, secp: &Secp256k1<C>, terminal: Terminal)
        -> CompressedPk;
}
