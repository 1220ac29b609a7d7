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

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use derive::{
    AddressNetwork, DeriveCompr, DerivedScript, HardenedIndex, Keychain, Terminal, WitnessScript,
};
use secp256k1::{Secp256k1, Verification};

use crate::{checksum, ChecksumError, ShWshSortedMulti, SortedMulti, WshSortedMulti};

/// Multisig script type, as numbered by BIP-48.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(crate = "serde_crate"))]
pub enum ScriptType {
    /// P2WSH nested in P2SH (`1'`).
    #[display("P2SH-P2WSH")]
    #[cfg_attr(feature = "serde", serde(rename = "P2SH-P2WSH", alias = "P2WSH-P2SH"))]
    P2shP2wsh,

    /// Native P2WSH (`2'`).
    #[display("P2WSH")]
    #[cfg_attr(feature = "serde", serde(rename = "P2WSH"))]
    #[default]
    P2wsh,
}

impl ScriptType {
    /// BIP-48 `script_type` path segment.
    pub const fn bip48_index(self) -> HardenedIndex {
        match self {
            ScriptType::P2shP2wsh => HardenedIndex::hardened(1),
            ScriptType::P2wsh => HardenedIndex::hardened(2),
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Display, Error)]
#[display("unknown multisig script type '{0}'")]
pub struct UnknownScriptType(pub String);

impl FromStr for ScriptType {
    type Err = UnknownScriptType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_uppercase().replace('-', "_").as_str() {
            "P2WSH" => ScriptType::P2wsh,
            "P2SH_P2WSH" | "P2WSH_P2SH" => ScriptType::P2shP2wsh,
            _ => return Err(UnknownScriptType(s.to_owned())),
        })
    }
}

/// Derivation suffix appended to each key in a descriptor.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display, From)]
pub enum KeySuffix {
    /// All indexes of a keychain: `/<keychain>/*`.
    #[display("/{0}/*")]
    Wildcard(Keychain),

    /// Single derived key: `/<keychain>/<index>`.
    #[from]
    #[display("/{0}")]
    Terminal(Terminal),
}

impl KeySuffix {
    /// Receive addresses template, `/0/*`.
    pub const RECEIVE: Self = KeySuffix::Wildcard(Keychain::OUTER);
}

/// Output descriptor over a set of derivable keys.
pub trait Descriptor<K: DeriveCompr + Display> {
    fn derive<C: Verification>(&self, secp: &Secp256k1<C>, terminal: Terminal) -> DerivedScript;

    /// Writes the descriptor with the given suffix after every key.
    fn fmt_with_suffix(&self, f: &mut dyn fmt::Write, suffix: KeySuffix) -> fmt::Result;

    fn to_string_with_suffix(&self, suffix: KeySuffix) -> String {
        let mut s = String::new();
        self.fmt_with_suffix(&mut s, suffix).expect("writing to string never fails");
        s
    }

    /// Descriptor string with a BIP-380 checksum.
    fn to_string_checksummed(&self, suffix: KeySuffix) -> Result<String, ChecksumError> {
        checksum::with_checksum(&self.to_string_with_suffix(suffix))
    }
}

/// Multisig descriptors supported by BIP-48 wallets.
#[derive(Clone, Eq, PartialEq, Hash, Debug, From)]
pub enum StdDescr<K: DeriveCompr + Display> {
    #[from]
    Wsh(WshSortedMulti<K>),
    #[from]
    ShWsh(ShWshSortedMulti<K>),
}

impl<K: DeriveCompr + Display> StdDescr<K> {
    pub fn with(script_type: ScriptType, multi: SortedMulti<K>) -> Self {
        match script_type {
            ScriptType::P2wsh => StdDescr::Wsh(WshSortedMulti::from(multi)),
            ScriptType::P2shP2wsh => StdDescr::ShWsh(ShWshSortedMulti::from(multi)),
        }
    }

    pub fn script_type(&self) -> ScriptType {
        match self {
            StdDescr::Wsh(_) => ScriptType::P2wsh,
            StdDescr::ShWsh(_) => ScriptType::P2shP2wsh,
        }
    }

    pub fn sorted_multi(&self) -> &SortedMulti<K> {
        match self {
            StdDescr::Wsh(d) => d.as_sorted_multi(),
            StdDescr::ShWsh(d) => d.as_sorted_multi(),
        }
    }

    pub fn witness_script<C: Verification>(
        &self,
        secp: &Secp256k1<C>,
        terminal: Terminal,
    ) -> WitnessScript {
        self.sorted_multi().witness_script(secp, terminal)
    }

    /// Derives the script and encodes it as an address.
    pub fn derive_address<C: Verification>(
        &self,
        secp: &Secp256k1<C>,
        terminal: Terminal,
        network: impl Into<AddressNetwork>,
    ) -> Result<(DerivedScript, derive::Address), derive::AddressError> {
        let script = self.derive(secp, terminal);
        let address = script.to_address(network)?;
        Ok((script, address))
    }
}

impl<K: DeriveCompr + Display> Descriptor<K> for StdDescr<K> {
    fn derive<C: Verification>(&self, secp: &Secp256k1<C>, terminal: Terminal) -> DerivedScript {
        match self {
            StdDescr::Wsh(d) => d.derive(secp, terminal),
            StdDescr::ShWsh(d) => d.derive(secp, terminal),
        }
    }

    fn fmt_with_suffix(&self, f: &mut dyn fmt::Write, suffix: KeySuffix) -> fmt::Result {
        match self {
            StdDescr::Wsh(d) => d.fmt_with_suffix(f, suffix),
            StdDescr::ShWsh(d) => d.fmt_with_suffix(f, suffix),
        }
    }
}

impl<K: DeriveCompr + Display> Display for StdDescr<K> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.fmt_with_suffix(f, KeySuffix::RECEIVE)
    }
}
