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

use derive::{AddressError, AddressNetwork, IndexError, Network};
use descriptors::{ChecksumError, SortedMultiError};

/// Errors returned by multisig address and descriptor derivation.
#[derive(Clone, Eq, PartialEq, Debug, Display, Error)]
#[display(doc_comments)]
pub enum MultisigError {
    /// extended public key of cosigner {cosigner} is malformed - {details}
    MalformedKey { cosigner: usize, details: String },

    /// extended public key of cosigner {cosigner} has unknown version prefix {prefix:#010x}
    UnknownPrefix { cosigner: usize, prefix: u32 },

    /// cosigner extended public keys belong to different networks.
    MixedNetworks,

    /// cosigner keys are {keys} keys and can't be used on {requested}.
    NetworkMismatch {
        keys: AddressNetwork,
        requested: Network,
    },

    /// threshold {threshold} is invalid for {cosigners} cosigners; it must lie in range
    /// 1..={cosigners}.
    InvalidThreshold { threshold: usize, cosigners: usize },

    /// {0} cosigners exceed the maximum of 15 keys in a standard multisig script.
    TooManyCosigners(usize),

    /// derivation index {0} lies outside of the non-hardened index space.
    InvalidIndex(u64),

    /// unable to construct multisig output - {0}
    ScriptConstructionFailure(String),

    /// invalid wallet configuration - {0}
    InvalidConfig(String),
}

impl From<SortedMultiError> for MultisigError {
    fn from(err: SortedMultiError) -> Self {
        match err {
            SortedMultiError::InvalidThreshold { threshold, keys } => {
                MultisigError::InvalidThreshold {
                    threshold,
                    cosigners: keys,
                }
            }
            SortedMultiError::TooManyKeys(count) => MultisigError::TooManyCosigners(count),
        }
    }
}

impl From<IndexError> for MultisigError {
    fn from(err: IndexError) -> Self { MultisigError::InvalidIndex(err.invalid as u64) }
}

impl From<AddressError> for MultisigError {
    fn from(err: AddressError) -> Self { MultisigError::ScriptConstructionFailure(err.to_string()) }
}

impl From<ChecksumError> for MultisigError {
    fn from(err: ChecksumError) -> Self {
        MultisigError::ScriptConstructionFailure(err.to_string())
    }
}

#[cfg(feature = "serde")]
impl From<serde_json::Error> for MultisigError {
    fn from(err: serde_json::Error) -> Self { MultisigError::InvalidConfig(err.to_string()) }
}
