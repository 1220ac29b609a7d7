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

//! Output descriptor checksum, as defined in BIP-380.

use std::fmt;

const INPUT_CHARSET: &str = "0123456789()[],'/*abcdefgh@:$%{}IJKLMNOPQRSTUVWXYZ&+-.;<=>?!^_|~ijklmnopqrstuvwxyzABCDEFGH`#\"\\ ";
const CHECKSUM_CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";

pub const CHECKSUM_LENGTH: usize = 8;

#[rustfmt::skip]
const GEN: [u64; 5] = [0xf5dee51989, 0xa9fdca3312, 0x1bab10e32d, 0x3706b1677a, 0x644d626ffd];

#[derive(Clone, Eq, PartialEq, Debug, Display, Error)]
#[display(doc_comments)]
pub enum ChecksumError {
    /// descriptor contains character '{0}' which can't be covered by a checksum.
    InvalidCharacter(char),

    /// descriptor checksum '{found}' is invalid; expected '{expected}'.
    Mismatch { found: String, expected: String },
}

fn poly_mod(mut c: u64, val: u64) -> u64 {
    let c0 = c >> 35;
    c = ((c & 0x7ffffffff) << 5) ^ val;
    for (bit, gen) in GEN.iter().enumerate() {
        if c0 & (1 << bit) != 0 {
            c ^= gen;
        }
    }
    c
}

/// Engine computing the checksum over the descriptor data fed to it.
#[derive(Clone, Debug)]
pub struct Engine {
    c: u64,
    cls: u64,
    clscount: u64,
}

impl Default for Engine {
    fn default() -> Self { Engine::new() }
}

impl Engine {
    pub fn new() -> Self {
        Engine {
            c: 1,
            cls: 0,
            clscount: 0,
        }
    }

    pub fn input(&mut self, s: &str) -> Result<(), ChecksumError> {
        for ch in s.chars() {
            let pos = INPUT_CHARSET.find(ch).ok_or(ChecksumError::InvalidCharacter(ch))? as u64;
            self.c = poly_mod(self.c, pos & 31);
            self.cls = self.cls * 3 + (pos >> 5);
            self.clscount += 1;
            if self.clscount == 3 {
                self.c = poly_mod(self.c, self.cls);
                self.cls = 0;
                self.clscount = 0;
            }
        }
        Ok(())
    }

    pub fn checksum_chars(&self) -> [char; CHECKSUM_LENGTH] {
        let mut c = self.c;
        if self.clscount > 0 {
            c = poly_mod(c, self.cls);
        }
        for _ in 0..CHECKSUM_LENGTH {
            c = poly_mod(c, 0);
        }
        c ^= 1;

        let mut chars = [' '; CHECKSUM_LENGTH];
        for (j, ch) in chars.iter_mut().enumerate() {
            *ch = CHECKSUM_CHARSET[((c >> (5 * (7 - j))) & 31) as usize] as char;
        }
        chars
    }

    pub fn checksum(&self) -> String { self.checksum_chars().iter().collect() }
}

impl fmt::Write for Engine {
    fn write_str(&mut self, s: &str) -> fmt::Result { self.input(s).map_err(|_| fmt::Error) }
}

/// Computes the checksum of a descriptor string, without checking the
/// descriptor syntax.
pub fn desc_checksum(desc: &str) -> Result<String, ChecksumError> {
    let mut engine = Engine::new();
    engine.input(desc)?;
    Ok(engine.checksum())
}

/// Appends `#<checksum>` to the descriptor string.
pub fn with_checksum(desc: &str) -> Result<String, ChecksumError> {
    Ok(format!("{desc}#{}", desc_checksum(desc)?))
}

/// Verifies the checksum if it is present and returns the descriptor without
/// it.
pub fn verify_checksum(s: &str) -> Result<&str, ChecksumError> {
    match s.split_once('#') {
        None => {
            desc_checksum(s)?;
            Ok(s)
        }
        Some((desc, found)) => {
            let expected = desc_checksum(desc)?;
            if found != expected {
                return Err(ChecksumError::Mismatch {
                    found: found.to_owned(),
                    expected,
                });
            }
            Ok(desc)
        }
    }
}
