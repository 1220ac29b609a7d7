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

//! Multisig address builder: validates cosigner keys, derives their child
//! keys and assembles the `sortedmulti` output and its descriptors.

use amplify::hex::ToHex;
use derive::{
    normalize, Address, KeyFlavor, KeyVersion, Network, NormalizeError, NormalizedKey, Terminal,
    Xpub,
};
use descriptors::{
    checksum, ChecksumError, Descriptor, KeySuffix, ScriptType, SortedMulti, StdDescr,
    MAX_MULTISIG_KEYS,
};

use crate::{
    infer_network, resolve_network, BuildOptions, MultisigContext, MultisigError, ResolvedNetwork,
};

/// Non-fatal notice about a cosigner key using a single-signature SLIP-132
/// prefix in a multisig wallet.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", rename_all = "camelCase")
)]
#[display(
    "cosigner {cosigner} uses single-signature key prefix {found}; multisig wallets should use \
     {recommended} or {neutral}"
)]
pub struct PrefixAdvisory {
    /// Zero-based position of the cosigner key.
    pub cosigner: usize,
    pub found: KeyVersion,
    pub recommended: KeyVersion,
    pub neutral: KeyVersion,
}

/// Reports keys whose original prefix is single-signature flavored.
pub fn check_prefixes<'k>(
    keys: impl IntoIterator<Item = &'k NormalizedKey>,
) -> Vec<PrefixAdvisory> {
    keys.into_iter()
        .enumerate()
        .filter(|(_, key)| key.original_version().flavor() == KeyFlavor::SingleSig)
        .map(|(cosigner, key)| {
            let found = key.original_version();
            PrefixAdvisory {
                cosigner,
                found,
                recommended: found.multisig_counterpart(),
                neutral: found.neutral(),
            }
        })
        .collect()
}

/// Output of a single multisig derivation.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", rename_all = "camelCase")
)]
pub struct MultisigResult {
    pub address: Address,
    pub network: Network,
    pub script_type: ScriptType,
    pub witness_script_hex: String,
    /// Present only for P2SH-wrapped outputs.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub redeem_script_hex: Option<String>,
    /// Descriptor over account keys with the `/0/*` suffix.
    pub descriptor_template: String,
    /// Descriptor over account keys with the `/<change>/<index>` suffix.
    pub descriptor_concrete: String,
}

impl MultisigResult {
    pub fn descriptor_template_checksummed(&self) -> Result<String, ChecksumError> {
        checksum::with_checksum(&self.descriptor_template)
    }

    pub fn descriptor_concrete_checksummed(&self) -> Result<String, ChecksumError> {
        checksum::with_checksum(&self.descriptor_concrete)
    }
}

fn key_error(cosigner: usize, err: NormalizeError) -> MultisigError {
    match err {
        NormalizeError::UnknownPrefix(prefix) => MultisigError::UnknownPrefix { cosigner, prefix },
        err => MultisigError::MalformedKey {
            cosigner,
            details: err.to_string(),
        },
    }
}

/// Validated cosigner set ready to derive multisig outputs for any terminal.
#[derive(Clone, Debug)]
pub struct MultisigDeriver<'ctx> {
    ctx: &'ctx MultisigContext,
    descriptor: StdDescr<Xpub>,
    network: ResolvedNetwork,
    advisories: Vec<PrefixAdvisory>,
}

impl<'ctx> MultisigDeriver<'ctx> {
    /// Validates the threshold and the cosigner keys, failing on the first
    /// error in this order: threshold, cosigner count, key encoding and
    /// prefix (in input order), network consistency, network override, key
    /// payload.
    pub fn new(
        ctx: &'ctx MultisigContext,
        threshold: usize,
        cosigners: &[impl AsRef<str>],
        options: &BuildOptions,
    ) -> Result<Self, MultisigError> {
        let count = cosigners.len();
        if threshold == 0 || threshold > count {
            return Err(MultisigError::InvalidThreshold {
                threshold,
                cosigners: count,
            });
        }
        if count > MAX_MULTISIG_KEYS {
            return Err(MultisigError::TooManyCosigners(count));
        }

        let normalized = cosigners
            .iter()
            .enumerate()
            .map(|(cosigner, key)| normalize(key.as_ref()).map_err(|err| key_error(cosigner, err)))
            .collect::<Result<Vec<_>, _>>()?;

        let family = infer_network(&normalized)?.ok_or(MultisigError::InvalidThreshold {
            threshold,
            cosigners: count,
        })?;
        let network = resolve_network(family, options.network)?;

        let advisories = if options.strict { check_prefixes(&normalized) } else { vec![] };
        for advisory in &advisories {
            warn!(
                cosigner = advisory.cosigner,
                prefix = %advisory.found,
                recommended = %advisory.recommended,
                "single-signature key prefix used for a multisig cosigner"
            );
        }

        let xpubs = normalized
            .iter()
            .enumerate()
            .map(|(cosigner, key)| {
                key.to_xpub().map_err(|err| MultisigError::MalformedKey {
                    cosigner,
                    details: err.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let multi = SortedMulti::new(threshold, xpubs)?;
        Ok(MultisigDeriver {
            ctx,
            descriptor: StdDescr::with(options.script_type, multi),
            network,
            advisories,
        })
    }

    #[inline]
    pub fn network(&self) -> ResolvedNetwork { self.network }

    #[inline]
    pub fn script_type(&self) -> ScriptType { self.descriptor.script_type() }

    #[inline]
    pub fn descriptor(&self) -> &StdDescr<Xpub> { &self.descriptor }

    /// Advisories collected in strict mode.
    #[inline]
    pub fn advisories(&self) -> &[PrefixAdvisory] { &self.advisories }

    /// Derives the multisig output for the `change/index` terminal.
    pub fn derive(&self, terminal: Terminal) -> Result<MultisigResult, MultisigError> {
        let script = self.descriptor.derive(self.ctx.secp(), terminal);
        let address = script.to_address(self.network.network)?;
        debug!(
            threshold = self.descriptor.sorted_multi().threshold(),
            cosigners = self.descriptor.sorted_multi().key_count(),
            %terminal,
            %address,
            "derived multisig address"
        );
        Ok(MultisigResult {
            address,
            network: self.network.network,
            script_type: self.script_type(),
            witness_script_hex: script.as_witness_script().to_hex(),
            redeem_script_hex: script
                .to_redeem_script()
                .map(|redeem_script| redeem_script.to_hex()),
            descriptor_template: self.descriptor.to_string_with_suffix(KeySuffix::RECEIVE),
            descriptor_concrete: self.descriptor.to_string_with_suffix(terminal.into()),
        })
    }
}

/// Builds the multisig output of `threshold`-of-`cosigners` keys for the
/// `change/index` terminal.
pub fn build(
    ctx: &MultisigContext,
    threshold: usize,
    cosigners: &[impl AsRef<str>],
    terminal: Terminal,
    options: &BuildOptions,
) -> Result<MultisigResult, MultisigError> {
    MultisigDeriver::new(ctx, threshold, cosigners, options)?.derive(terminal)
}
