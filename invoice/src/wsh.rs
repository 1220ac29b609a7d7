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

//! P2WSH commitments for witness scripts.

use bc::opcodes::{OP_CHECKMULTISIG, OP_PUSHBYTES_33, OP_PUSHNUM_1};
use bc::{CompressedPk, RedeemScript, ScriptPubkey, WScriptHash, WitnessScript};
use bitcoin_hashes::{sha256, Hash};

/// Witness script operations committing to a single SHA256 of the script, as
/// BIP-141 requires for P2WSH outputs.
pub trait WitnessScriptExt {
    /// Bare `OP_m <pk1> ... <pkn> OP_n OP_CHECKMULTISIG` over the keys, in
    /// the order given. `threshold` and the key count must lie in `1..=16`.
    fn multisig<'k>(
        threshold: u8,
        keys: impl ExactSizeIterator<Item = &'k CompressedPk>,
    ) -> Self;

    fn wsh_hash(&self) -> WScriptHash;

    /// Native segwit v0 output committing to the script.
    fn to_p2wsh(&self) -> ScriptPubkey { ScriptPubkey::p2wsh(self.wsh_hash()) }

    /// Redeem script nesting the witness script into a P2SH output.
    fn to_p2sh_wsh(&self) -> RedeemScript { RedeemScript::p2sh_wsh(self.wsh_hash()) }
}

impl WitnessScriptExt for WitnessScript {
    fn multisig<'k>(
        threshold: u8,
        keys: impl ExactSizeIterator<Item = &'k CompressedPk>,
    ) -> Self {
        let count = keys.len() as u8;
        let mut script = Vec::with_capacity(keys.len() * 34 + 3);
        script.push(OP_PUSHNUM_1 + threshold - 1);
        for key in keys {
            script.push(OP_PUSHBYTES_33);
            script.extend(key.to_byte_array());
        }
        script.push(OP_PUSHNUM_1 + count - 1);
        script.push(OP_CHECKMULTISIG);
        WitnessScript::from_unsafe(script)
    }

    fn wsh_hash(&self) -> WScriptHash {
        WScriptHash::from(sha256::Hash::hash(self.as_slice()).to_byte_array())
    }
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use amplify::hex::ToHex;
    use bc::opcodes::OP_PUSHBYTES_32;

    use super::*;

    const PK: &str = "03bc34c50cf768f802290269c2ddabd086c73514c880cecb6db3f67676a4b72469";

    #[test]
    fn multisig_encoding() {
        let pk = CompressedPk::from_str(PK).unwrap();
        let script = WitnessScript::multisig(1, [pk, pk].iter());
        assert_eq!(script.to_hex(), format!("5121{PK}21{PK}52ae"));
    }

    #[test]
    fn single_sha256_commitment() {
        let pk = CompressedPk::from_str(PK).unwrap();
        let script = WitnessScript::multisig(1, [pk].iter());
        let hash = sha256::Hash::hash(script.as_slice());
        assert_eq!(<[u8; 32]>::from(script.wsh_hash()), hash.to_byte_array());

        let spk = script.to_p2wsh();
        assert!(spk.is_p2wsh());
        assert_eq!(spk[1], OP_PUSHBYTES_32);
        assert_eq!(&spk[2..], hash.as_byte_array());

        let redeem_script = script.to_p2sh_wsh();
        assert!(redeem_script.is_p2sh_wsh());
        assert_eq!(redeem_script.as_slice(), spk.as_slice());
        assert!(redeem_script.to_script_pubkey().is_p2sh());
    }
}
