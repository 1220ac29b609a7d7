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

//! Derivation of consecutive multisig addresses along BIP-48 paths.

use std::iter::FusedIterator;

use derive::{
    DerivationIndex, DerivationPath, HardenedIndex, Keychain, NormalIndex, Terminal,
    HARDENED_INDEX_BOUNDARY,
};

use crate::{
    Bip48Options, BuildOptions, MultisigContext, MultisigDeriver, MultisigError, MultisigResult,
};

/// BIP-48 purpose segment.
pub const BIP48_PURPOSE: HardenedIndex = HardenedIndex::hardened(48);

/// Multisig output derived at a specific index of a range.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", rename_all = "camelCase")
)]
pub struct DerivedMultisig {
    pub index: NormalIndex,
    /// Full path, serialized with `'` hardened markers.
    #[cfg_attr(feature = "serde", serde(with = "path_string"))]
    pub path: DerivationPath,
    pub result: MultisigResult,
}

#[cfg(feature = "serde")]
mod path_string {
    use std::str::FromStr;

    use derive::DerivationPath;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        path: &DerivationPath,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&format_args!("{path:#}"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DerivationPath, D::Error> {
        let s = String::deserialize(deserializer)?;
        DerivationPath::from_str(&s).map_err(D::Error::custom)
    }
}

/// BIP-48 account path `m/48'/<coin>'/<account>'/<script>'`.
pub fn bip48_account_path(bip48: &Bip48Options) -> DerivationPath {
    [BIP48_PURPOSE, bip48.coin_type.index(), bip48.account, bip48.script_type.bip48_index()]
        .into_iter()
        .map(DerivationIndex::from)
        .collect()
}

/// Lazy iterator over multisig outputs of consecutive indexes of a keychain.
///
/// The iterator is finite and can be restarted by cloning it before
/// consumption.
#[derive(Clone, Debug)]
pub struct MultisigRange<'d, 'ctx> {
    deriver: &'d MultisigDeriver<'ctx>,
    account: DerivationPath,
    keychain: Keychain,
    next: u32,
    end: u32,
}

impl<'d, 'ctx> Iterator for MultisigRange<'d, 'ctx> {
    type Item = Result<DerivedMultisig, MultisigError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let index = match NormalIndex::try_from(self.next) {
            Ok(index) => index,
            Err(err) => return Some(Err(err.into())),
        };
        self.next += 1;

        let terminal = Terminal::new(self.keychain, index);
        let path = self.account.clone().with_terminal(terminal);
        trace!(%index, %path, "deriving multisig range item");
        Some(self.deriver.derive(terminal).map(|result| DerivedMultisig {
            index,
            path,
            result,
        }))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.end.saturating_sub(self.next) as usize;
        (len, Some(len))
    }
}

impl ExactSizeIterator for MultisigRange<'_, '_> {}

impl FusedIterator for MultisigRange<'_, '_> {}

impl<'ctx> MultisigDeriver<'ctx> {
    /// Iterates `count` outputs of the `keychain` starting at index `start`.
    ///
    /// The script type segment of the reported paths follows the script
    /// type of this deriver; the rest of the account path comes from
    /// `bip48`.
    ///
    /// Fails with [`MultisigError::InvalidIndex`] if any index of the range
    /// falls into the hardened index space.
    pub fn range(
        &self,
        keychain: Keychain,
        start: u32,
        count: u32,
        bip48: &Bip48Options,
    ) -> Result<MultisigRange<'_, 'ctx>, MultisigError> {
        let end = start as u64 + count as u64;
        if count > 0 && start >= HARDENED_INDEX_BOUNDARY {
            return Err(MultisigError::InvalidIndex(start as u64));
        }
        if count > 0 && end > HARDENED_INDEX_BOUNDARY as u64 {
            return Err(MultisigError::InvalidIndex(end - 1));
        }
        let bip48 = Bip48Options {
            script_type: self.script_type(),
            ..*bip48
        };
        Ok(MultisigRange {
            deriver: self,
            account: bip48_account_path(&bip48),
            keychain,
            next: start,
            end: end as u32,
        })
    }
}

/// Derives `count` consecutive multisig outputs of the `keychain` starting
/// at index `start`, stopping at the first failure.
///
/// The script type of `bip48` takes precedence over the one in `options`,
/// so that the derived outputs always match their BIP-48 paths.
#[allow(clippy::too_many_arguments)]
pub fn derive_range(
    ctx: &MultisigContext,
    threshold: usize,
    cosigners: &[impl AsRef<str>],
    keychain: Keychain,
    start: u32,
    count: u32,
    bip48: &Bip48Options,
    options: &BuildOptions,
) -> Result<Vec<DerivedMultisig>, MultisigError> {
    let options = options.clone().with_script_type(bip48.script_type);
    let deriver = MultisigDeriver::new(ctx, threshold, cosigners, &options)?;
    deriver.range(keychain, start, count, bip48)?.collect()
}
