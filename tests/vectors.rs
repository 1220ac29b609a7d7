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

use bpmultisig::derive::{Idx, IdxBase};
use bpmultisig::{
    build, derive_range, Bip48Options, BuildOptions, Keychain, KeyVersion, MultisigContext,
    MultisigDeriver, MultisigError, Network, NetworkSource, NormalIndex, ScriptType, Terminal,
};

const K1: &str = "tpubDFc9Mm4tw6EkgR4YTC1GrU6CGEd9yw7KSBnSssL4LXAXh89D4uMZigRyv3csdXbeU3BhLQc4vWKTLewboA1Pt8Fu6fbHKu81MZ6VGdc32eM";
const K2: &str = "tpubDErWN5qfdLwYE94mh12oWr4uURDDNKCjKVhCEcAgZ7jKnnAwq5tcTF2iEk3VuznkJuk2G8SCHft9gS6aKbBd18ptYWPqKLRSTRQY7e2rrDj";
const K3: &str = "tpubDEC8p4skY4i7mNjxt9yF3u7my5T6KtGLcvEDcH5rKA6XVtJN4JV3SsHWoePTqsHNh47WBkQ79r77KsUYc2PAmaqqasBJMvidbxiupZpJexg";

const K1_VPUB_MULTI: &str = "Vpub5nU5MRdpVQki8beqGwuv4SudJyGsKfJrNboNsnkgcNVHTpQxFmZdREJoSJaPfeZU6KVA6TuCMJAp14qdG8V5YhZ58rZXsxHo7sefKLXGo3h";
const K1_UPUB_MULTI: &str = "Upub5Tdp3kxuLjDEHJTiSb8HrMp8918RP3KMTVHA6ProEN7QQibj17Q4oAefR6cofjuYggNMLzJdtdpG7nE4YS54kTsUGWs7J3UJr9b1vpgxSQ7";
const K1_VPUB: &str = "vpub5bZzEBuNvTCLi2VTLHSwENZpbBEc7JdG4L9hxXV9Ebesqdr3VNBML7Ssdbcv7DLZrrRBDsu5U5nJsuDrxuL8QDSQJPT8UYpoE9NnjQjmL81";

const ZPUB_MULTI: &str = "Zpub6xqPheJuo1MvXfD1FDnQRSpmDp33pSLfE7Ye2xb7YCupwZSXHDx8qvZJBQaajpB7Mko4FCeVGpJEkQeuLJvNtvPxSuDNxkFpmD2itxTfBFT";
const ZPUB_NEUTRAL: &str = "xpub68Gmy5EdvgibQVfPdqkBBCHxA5htiqg55crXYuXoQRKfDBFA1WEjWgP6LHhwBZeNK1VTsfTFUHCdrfp1bgwQ9xv5ski8PX9rL2dZXvgGDnw";

const UNKNOWN_VERSION: &str = "DQks7ujbqyvwitaPxFGRvn4ATLwiU3xTZ6xFYX5mdanYkxeqFVurYbFqp5dVXqHxpRXjEYqp3oWQGvqfpww7XPTr3MrDUBQD1TqcDaVeYfXcEcz";
const TRUNCATED: &str = "2NNkxnXDo2LR2nT9np1gwT8X3VNAdiNXGm337MMtdX2Vc5KEUVj4kMkScr1E";

const WITNESS_SCRIPT_0_0: &str = "5221035a763e0480f858ef626b649fa0efe9eb647abbf77db54f3af904d2de50c4342d2103a416734a7729d2e0a4f885f4e939618a5a45f5f32511641236536a24272d99f32103bc34c50cf768f802290269c2ddabd086c73514c880cecb6db3f67676a4b7246953ae";

const RECEIVE: [&str; 5] = [
    "tb1qqe8zclavk99ayklcuc3sm9pdfnvlumn820rxyzhfj0kuc9lfedzsg3fn7r",
    "tb1q6p3vc25d56ywd4fpvvatg9v4pdg222ugkmdrmkzr6j0hw80fx5vshen28j",
    "tb1qxj9s90f930hm3dc99yc80s8y5u6h0pdkgve6u52f56vl68ry3fxs7pce6u",
    "tb1q3vdmtr5u6uwzd5hutahank9zeung963ecea5zmf9ky2jcjptqevshuwuuq",
    "tb1q78e5gdedaa3jw7ws86vr492vpzxh4mna9x250dmr8w787usuxlqsu9j3nn",
];

fn terminal(change: u8, index: u16) -> Terminal { Terminal::new(change, NormalIndex::normal(index)) }

fn address(threshold: usize, keys: &[&str], terminal: Terminal) -> String {
    let ctx = MultisigContext::new();
    build(&ctx, threshold, keys, terminal, &BuildOptions::default())
        .unwrap()
        .address
        .to_string()
}

#[test]
fn two_of_three_native() {
    let ctx = MultisigContext::new();
    let result = build(&ctx, 2, &[K1, K2, K3], terminal(0, 0), &BuildOptions::default()).unwrap();
    assert_eq!(result.address.to_string(), RECEIVE[0]);
    assert_eq!(result.witness_script_hex, WITNESS_SCRIPT_0_0);
    assert_eq!(result.network, Network::Testnet);
    assert_eq!(result.script_type, ScriptType::P2wsh);
    assert_eq!(result.redeem_script_hex, None);
    assert_eq!(
        result.descriptor_template_checksummed().unwrap(),
        format!("wsh(sortedmulti(2,{K1}/0/*,{K2}/0/*,{K3}/0/*))#0ez803l2")
    );
    assert_eq!(
        result.descriptor_concrete_checksummed().unwrap(),
        format!("wsh(sortedmulti(2,{K1}/0/0,{K2}/0/0,{K3}/0/0))#3r9thmpc")
    );

    assert_eq!(address(2, &[K1, K2, K3], terminal(0, 1)), RECEIVE[1]);
    assert_eq!(
        address(2, &[K1, K2, K3], terminal(1, 0)),
        "tb1qrjlmxux08m0egrjenqxvlwp6m3522qkdusea0evz0gh837nje3rst09p4h"
    );
}

#[test]
fn other_thresholds() {
    assert_eq!(
        address(1, &[K1, K2, K3], terminal(0, 0)),
        "tb1qr0sjgpm2qswr3umnvxhep62uzq3058ey3dlagve4g4wmmyhrcfxs6scv6c"
    );
    assert_eq!(
        address(3, &[K1, K2, K3], terminal(0, 0)),
        "tb1qy5a67vy2e659wt5r0hrl44a5vgk9p9gqasf6qhlgsfq4kn8a2lwsye0xn4"
    );
    assert_eq!(
        address(2, &[K1, K2], terminal(0, 0)),
        "tb1qhgj3fnwn50pq966rjnj4pg8uz9ktsd8nge32qxd73ffvvg636p5q54g7m0"
    );
}

#[test]
fn input_order_is_irrelevant_for_scripts() {
    let ctx = MultisigContext::new();
    let options = BuildOptions::default();
    let reference = build(&ctx, 2, &[K1, K2, K3], terminal(0, 0), &options).unwrap();
    for keys in [[K3, K2, K1], [K2, K1, K3], [K3, K1, K2]] {
        let result = build(&ctx, 2, &keys, terminal(0, 0), &options).unwrap();
        assert_eq!(result.address, reference.address);
        assert_eq!(result.witness_script_hex, reference.witness_script_hex);
        assert_ne!(result.descriptor_template, reference.descriptor_template);
    }
}

#[test]
fn slip132_prefixes_are_normalized() {
    for k1 in [K1_VPUB_MULTI, K1_UPUB_MULTI, K1_VPUB] {
        let ctx = MultisigContext::new();
        let result = build(&ctx, 2, &[k1, K2, K3], terminal(0, 0), &BuildOptions::default()).unwrap();
        assert_eq!(result.address.to_string(), RECEIVE[0]);
        assert!(result.descriptor_template.contains(K1));
        assert!(!result.descriptor_template.contains(k1));
    }
}

#[test]
fn single_sig_prefix_advisory() {
    let ctx = MultisigContext::new();
    let deriver =
        MultisigDeriver::new(&ctx, 2, &[K1_VPUB_MULTI, K2, K1_VPUB], &BuildOptions::default())
            .unwrap();
    let advisories = deriver.advisories();
    assert_eq!(advisories.len(), 1);
    assert_eq!(advisories[0].cosigner, 2);
    assert_eq!(advisories[0].found, KeyVersion::Vpub);
    assert_eq!(advisories[0].recommended, KeyVersion::VpubMulti);
}

#[test]
fn wrapped_segwit() {
    let ctx = MultisigContext::new();
    let options = BuildOptions::default().with_script_type(ScriptType::P2shP2wsh);
    let result = build(&ctx, 2, &[K1, K2, K3], terminal(0, 0), &options).unwrap();
    assert_eq!(result.address.to_string(), "2N8fmdBuNmec7DFPjWzSsjiSEYS9VEpESTi");
    assert_eq!(result.witness_script_hex, WITNESS_SCRIPT_0_0);
    assert_eq!(
        result.redeem_script_hex.as_deref(),
        Some("0020064e2c7facb14bd25bf8e6230d942d4cd9fe6e6753c6620ae993edcc17e9cb45")
    );
    assert_eq!(
        result.descriptor_concrete,
        format!("sh(wsh(sortedmulti(2,{K1}/0/0,{K2}/0/0,{K3}/0/0)))")
    );
}

#[test]
fn mainnet_keys() {
    let ctx = MultisigContext::new();
    let result = build(&ctx, 1, &[ZPUB_MULTI], terminal(0, 0), &BuildOptions::default()).unwrap();
    assert_eq!(result.network, Network::Mainnet);
    assert_eq!(
        result.address.to_string(),
        "bc1qung9050cgllp0lu2a770m2ttghna29lv0n3ze9ryw7cwamsqykjqagw2ut"
    );
    assert_eq!(result.descriptor_template, format!("wsh(sortedmulti(1,{ZPUB_NEUTRAL}/0/*))"));
}

#[test]
fn network_resolution() {
    let ctx = MultisigContext::new();
    let keys = [K1, K2, K3];

    let deriver = MultisigDeriver::new(&ctx, 2, &keys, &BuildOptions::default()).unwrap();
    assert_eq!(deriver.network().source, NetworkSource::Inferred);

    let signet = BuildOptions::default().with_network(Network::Signet);
    let deriver = MultisigDeriver::new(&ctx, 2, &keys, &signet).unwrap();
    assert_eq!(deriver.network().source, NetworkSource::Override);
    let result = deriver.derive(terminal(0, 0)).unwrap();
    assert_eq!(result.network, Network::Signet);
    assert_eq!(result.address.to_string(), RECEIVE[0]);

    let mainnet = BuildOptions::default().with_network(Network::Mainnet);
    assert!(matches!(
        build(&ctx, 2, &keys, terminal(0, 0), &mainnet),
        Err(MultisigError::NetworkMismatch { requested: Network::Mainnet, .. })
    ));

    assert_eq!(
        build(&ctx, 1, &[K1, ZPUB_MULTI], terminal(0, 0), &BuildOptions::default()),
        Err(MultisigError::MixedNetworks)
    );
}

#[test]
fn threshold_errors() {
    let ctx = MultisigContext::new();
    let options = BuildOptions::default();
    assert_eq!(
        build(&ctx, 0, &[K1, K2, K3], terminal(0, 0), &options),
        Err(MultisigError::InvalidThreshold { threshold: 0, cosigners: 3 })
    );
    assert_eq!(
        build(&ctx, 4, &[K1, K2, K3], terminal(0, 0), &options),
        Err(MultisigError::InvalidThreshold { threshold: 4, cosigners: 3 })
    );
    assert_eq!(
        build(&ctx, 1, &[] as &[&str], terminal(0, 0), &options),
        Err(MultisigError::InvalidThreshold { threshold: 1, cosigners: 0 })
    );

    let fifteen = [K1; 15];
    let result = build(&ctx, 15, &fifteen, terminal(0, 0), &options).unwrap();
    assert!(result.witness_script_hex.starts_with("5f21"));
    assert!(result.witness_script_hex.ends_with("5fae"));

    let sixteen = [K1; 16];
    assert_eq!(
        build(&ctx, 2, &sixteen, terminal(0, 0), &options),
        Err(MultisigError::TooManyCosigners(16))
    );
}

#[test]
fn key_errors() {
    let ctx = MultisigContext::new();
    let options = BuildOptions::default();
    assert_eq!(
        build(&ctx, 2, &[K1, K2, UNKNOWN_VERSION], terminal(0, 0), &options),
        Err(MultisigError::UnknownPrefix { cosigner: 2, prefix: 0x01020304 })
    );
    assert!(matches!(
        build(&ctx, 2, &[K1, TRUNCATED, K3], terminal(0, 0), &options),
        Err(MultisigError::MalformedKey { cosigner: 1, .. })
    ));

    let mut corrupted = K2.to_owned();
    corrupted.replace_range(20..21, if &K2[20..21] == "A" { "B" } else { "A" });
    assert!(matches!(
        build(&ctx, 2, &[K1, corrupted.as_str(), K3], terminal(0, 0), &options),
        Err(MultisigError::MalformedKey { cosigner: 1, .. })
    ));

    let oversized = "x".repeat(4096);
    match build(&ctx, 2, &[K1, K2, oversized.as_str()], terminal(0, 0), &options) {
        Err(MultisigError::MalformedKey { cosigner: 2, details }) => {
            assert!(details.contains("4096"), "{details}")
        }
        other => panic!("unexpected result {other:?}"),
    }
}

#[test]
fn receive_range() {
    let ctx = MultisigContext::new();
    let items = derive_range(
        &ctx,
        2,
        &[K1, K2, K3],
        Keychain::OUTER,
        0,
        5,
        &Bip48Options::default(),
        &BuildOptions::default(),
    )
    .unwrap();
    assert_eq!(items.len(), 5);
    for (no, item) in items.iter().enumerate() {
        assert_eq!(item.index, NormalIndex::normal(no as u16));
        assert_eq!(format!("{:#}", item.path), format!("m/48'/1'/0'/2'/0/{no}"));
        assert_eq!(item.result.address.to_string(), RECEIVE[no]);
    }
}

#[test]
fn range_script_type_comes_from_bip48() {
    let ctx = MultisigContext::new();
    let bip48 = Bip48Options {
        script_type: ScriptType::P2shP2wsh,
        ..Bip48Options::default()
    };
    let items = derive_range(
        &ctx,
        2,
        &[K1, K2, K3],
        Keychain::OUTER,
        0,
        1,
        &bip48,
        &BuildOptions::default(),
    )
    .unwrap();
    assert_eq!(format!("{:#}", items[0].path), "m/48'/1'/0'/1'/0/0");
    assert_eq!(items[0].result.address.to_string(), "2N8fmdBuNmec7DFPjWzSsjiSEYS9VEpESTi");
}

#[test]
fn range_beyond_normal_indexes() {
    let ctx = MultisigContext::new();
    let result = derive_range(
        &ctx,
        2,
        &[K1, K2, K3],
        Keychain::OUTER,
        NormalIndex::MAX.child_number() - 1,
        3,
        &Bip48Options::default(),
        &BuildOptions::default(),
    );
    assert_eq!(result, Err(MultisigError::InvalidIndex(1 << 31)));
}
