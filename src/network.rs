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

//! Resolution of the presentation network from cosigner keys and an optional
//! caller override.

use derive::{AddressNetwork, Network, NormalizedKey};

use crate::MultisigError;

/// Where the resolved network came from.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", rename_all = "lowercase")
)]
#[display(lowercase)]
pub enum NetworkSource {
    /// Detected from the key version prefixes.
    Inferred,
    /// Requested by the caller.
    Override,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", rename_all = "camelCase")
)]
#[display("{network} ({source})")]
pub struct ResolvedNetwork {
    pub network: Network,
    pub source: NetworkSource,
}

/// Detects the network family shared by all keys.
///
/// Returns `None` for an empty key set.
pub fn infer_network<'k>(
    keys: impl IntoIterator<Item = &'k NormalizedKey>,
) -> Result<Option<AddressNetwork>, MultisigError> {
    let mut family = None;
    for key in keys {
        match family {
            None => family = Some(key.network()),
            Some(network) if network != key.network() => return Err(MultisigError::MixedNetworks),
            Some(_) => {}
        }
    }
    Ok(family)
}

/// Applies the caller override to the inferred network family.
pub fn resolve_network(
    inferred: AddressNetwork,
    requested: Option<Network>,
) -> Result<ResolvedNetwork, MultisigError> {
    match requested {
        None => Ok(ResolvedNetwork {
            network: Network::with_family(inferred),
            source: NetworkSource::Inferred,
        }),
        Some(network) if AddressNetwork::from(network) == inferred => Ok(ResolvedNetwork {
            network,
            source: NetworkSource::Override,
        }),
        Some(network) => Err(MultisigError::NetworkMismatch {
            keys: inferred,
            requested: network,
        }),
    }
}

#[cfg(test)]
mod test {
    use derive::normalize;

    use super::*;

    const TPUB: &str = "tpubDFc9Mm4tw6EkgR4YTC1GrU6CGEd9yw7KSBnSssL4LXAXh89D4uMZigRyv3csdXbeU3BhLQc4vWKTLewboA1Pt8Fu6fbHKu81MZ6VGdc32eM";
    const VPUB: &str = "Vpub5nU5MRdpVQki8beqGwuv4SudJyGsKfJrNboNsnkgcNVHTpQxFmZdREJoSJaPfeZU6KVA6TuCMJAp14qdG8V5YhZ58rZXsxHo7sefKLXGo3h";
    const ZPUB: &str = "Zpub6xqPheJuo1MvXfD1FDnQRSpmDp33pSLfE7Ye2xb7YCupwZSXHDx8qvZJBQaajpB7Mko4FCeVGpJEkQeuLJvNtvPxSuDNxkFpmD2itxTfBFT";

    #[test]
    fn inference() {
        let testnet = [normalize(TPUB).unwrap(), normalize(VPUB).unwrap()];
        assert_eq!(infer_network(&testnet).unwrap(), Some(AddressNetwork::Testnet));

        let mixed = [normalize(TPUB).unwrap(), normalize(ZPUB).unwrap()];
        assert_eq!(infer_network(&mixed), Err(MultisigError::MixedNetworks));

        assert_eq!(infer_network(&[] as &[NormalizedKey]).unwrap(), None);
    }

    #[test]
    fn resolution() {
        let resolved = resolve_network(AddressNetwork::Testnet, None).unwrap();
        assert_eq!(resolved.network, Network::Testnet);
        assert_eq!(resolved.source, NetworkSource::Inferred);

        let resolved = resolve_network(AddressNetwork::Testnet, Some(Network::Signet)).unwrap();
        assert_eq!(resolved.network, Network::Signet);
        assert_eq!(resolved.source, NetworkSource::Override);
        assert_eq!(resolved.to_string(), "signet (override)");

        assert_eq!(
            resolve_network(AddressNetwork::Mainnet, Some(Network::Testnet)),
            Err(MultisigError::NetworkMismatch {
                keys: AddressNetwork::Mainnet,
                requested: Network::Testnet
            })
        );
    }
}
