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

use derive::{
    CompressedPk, DeriveCompr, DerivedScript, Terminal, WitnessScript, WitnessScriptExt,
};
use secp256k1::{Secp256k1, Verification};

use crate::{Descriptor, KeySuffix};

/// Maximum number of keys in a standard P2WSH `sortedmulti`.
pub const MAX_MULTISIG_KEYS: usize = 15;

#[derive(Copy, Clone, Eq, PartialEq, Debug, Display, Error)]
#[display(doc_comments)]
pub enum SortedMultiError {
    /// threshold {threshold} is invalid for {keys} keys; it must lie in range 1..={keys}.
    InvalidThreshold { threshold: usize, keys: usize },

    /// {0} keys exceed the maximum of 15 keys in a standard multisig script.
    TooManyKeys(usize),
}

/// BIP-383 `sortedmulti` key expression: an `m`-of-`n` threshold over keys,
/// which are sorted by their derived public key bytes when the script is
/// built.
///
/// Keys are kept in the order they were provided; this order is used only for
/// the descriptor text. Duplicated keys are retained.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(crate = "serde_crate"))]
pub struct SortedMulti<K> {
    pub(crate) threshold: u8,
    pub keys: Vec<K>,
}

impl<K: DeriveCompr + Display> SortedMulti<K> {
    /// Validates the threshold first and the number of keys second.
    pub fn new(threshold: usize, keys: Vec<K>) -> Result<Self, SortedMultiError> {
        if threshold == 0 || threshold > keys.len() {
            return Err(SortedMultiError::InvalidThreshold {
                threshold,
                keys: keys.len(),
            });
        }
        if keys.len() > MAX_MULTISIG_KEYS {
            return Err(SortedMultiError::TooManyKeys(keys.len()));
        }
        Ok(SortedMulti {
            threshold: threshold as u8,
            keys,
        })
    }

    #[inline]
    pub fn threshold(&self) -> u8 { self.threshold }

    #[inline]
    pub fn key_count(&self) -> u8 { self.keys.len() as u8 }

    /// Derives the keys for the terminal and returns them in script order:
    /// ascending by their 33-byte serialization, with duplicates kept.
    pub fn derive_sorted<C: Verification>(
        &self,
        secp: &Secp256k1<C>,
        terminal: Terminal,
    ) -> Vec<CompressedPk> {
        let mut derived = self
            .keys
            .iter()
            .map(|xkey| xkey.derive_compr(secp, terminal))
            .collect::<Vec<_>>();
        derived.sort_by_key(CompressedPk::to_byte_array);
        derived
    }

    /// `OP_m <pk1> ... <pkn> OP_n OP_CHECKMULTISIG` over the sorted derived
    /// keys.
    pub fn witness_script<C: Verification>(
        &self,
        secp: &Secp256k1<C>,
        terminal: Terminal,
    ) -> WitnessScript {
        WitnessScript::multisig(self.threshold, self.derive_sorted(secp, terminal).iter())
    }

    fn fmt_sortedmulti(&self, f: &mut dyn fmt::Write, suffix: KeySuffix) -> fmt::Result {
        write!(f, "sortedmulti({}", self.threshold)?;
        for key in &self.keys {
            write!(f, ",{key}{suffix}")?;
        }
        f.write_str(")")
    }
}

/// Representation of BIP-383 `sortedmulti` as it is used inside `wsh`.
#[derive(Wrapper, Clone, Eq, PartialEq, Hash, Debug, From)]
#[wrapper(Deref)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(crate = "serde_crate"))]
pub struct WshSortedMulti<K>(#[from] SortedMulti<K>);

impl<K> WshSortedMulti<K> {
    pub fn as_sorted_multi(&self) -> &SortedMulti<K> { &self.0 }
}

impl<K: DeriveCompr + Display> Descriptor<K> for WshSortedMulti<K> {
    fn derive<C: Verification>(&self, secp: &Secp256k1<C>, terminal: Terminal) -> DerivedScript {
        DerivedScript::Segwit(self.0.witness_script(secp, terminal))
    }

    fn fmt_with_suffix(&self, f: &mut dyn fmt::Write, suffix: KeySuffix) -> fmt::Result {
        f.write_str("wsh(")?;
        self.0.fmt_sortedmulti(f, suffix)?;
        f.write_str(")")
    }
}

impl<K: DeriveCompr + Display> Display for WshSortedMulti<K> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.fmt_with_suffix(f, KeySuffix::RECEIVE)
    }
}

/// `sortedmulti` inside `wsh` nested into `sh`.
#[derive(Wrapper, Clone, Eq, PartialEq, Hash, Debug, From)]
#[wrapper(Deref)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(crate = "serde_crate"))]
pub struct ShWshSortedMulti<K>(#[from] SortedMulti<K>);

impl<K> ShWshSortedMulti<K> {
    pub fn as_sorted_multi(&self) -> &SortedMulti<K> { &self.0 }
}

impl<K: DeriveCompr + Display> Descriptor<K> for ShWshSortedMulti<K> {
    fn derive<C: Verification>(&self, secp: &Secp256k1<C>, terminal: Terminal) -> DerivedScript {
        DerivedScript::NestedScript(self.0.witness_script(secp, terminal))
    }

    fn fmt_with_suffix(&self, f: &mut dyn fmt::Write, suffix: KeySuffix) -> fmt::Result {
        f.write_str("sh(wsh(")?;
        self.0.fmt_sortedmulti(f, suffix)?;
        f.write_str("))")
    }
}

impl<K: DeriveCompr + Display> Display for ShWshSortedMulti<K> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.fmt_with_suffix(f, KeySuffix::RECEIVE)
    }
}
