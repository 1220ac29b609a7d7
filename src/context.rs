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

use secp256k1::{Secp256k1, VerifyOnly};

/// Elliptic curve context used by all derivations.
///
/// Construct once and pass by reference; the context is `Send + Sync`.
#[derive(Clone, Debug)]
pub struct MultisigContext {
    secp: Secp256k1<VerifyOnly>,
}

impl Default for MultisigContext {
    fn default() -> Self { MultisigContext::new() }
}

impl MultisigContext {
    pub fn new() -> Self {
        MultisigContext {
            secp: Secp256k1::verification_only(),
        }
    }

    #[inline]
    pub fn secp(&self) -> &Secp256k1<VerifyOnly> { &self.secp }
}

#[cfg(test)]
mod test {
    use super::*;

    fn assert_shareable<T: Send + Sync>() {}

    #[test]
    fn context_is_shareable() { assert_shareable::<MultisigContext>(); }
}
