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

//! Deterministic multisig addresses and `sortedmulti` output descriptors
//! derived from cosigner account-level extended public keys, following
//! BIP-32, BIP-48, BIP-67 and SLIP-132.

#[macro_use]
extern crate amplify;
#[macro_use]
extern crate tracing;
#[cfg(feature = "serde")]
#[macro_use]
extern crate serde_crate as serde;

mod error;
mod context;
mod options;
mod network;
mod builder;
mod batch;
#[cfg(feature = "serde")]
mod config;

pub use batch::{bip48_account_path, derive_range, DerivedMultisig, MultisigRange, BIP48_PURPOSE};
pub use builder::{build, check_prefixes, MultisigDeriver, MultisigResult, PrefixAdvisory};
#[cfg(feature = "serde")]
pub use config::{CosignerKey, Quorum, WalletClient, WalletConfig};
pub use context::MultisigContext;
pub use derive::{
    normalize, Keychain, KeyFlavor, KeyVersion, NormalIndex, NormalizedKey, Terminal, Xpub,
};
pub use descriptors::{checksum, Descriptor, KeySuffix, ScriptType, StdDescr};
pub use error::MultisigError;
pub use invoice::{Address, AddressNetwork, Network};
pub use network::{infer_network, resolve_network, NetworkSource, ResolvedNetwork};
pub use options::{Bip48Options, BuildOptions, CoinType};
pub use {bc, derive, descriptors, invoice};
