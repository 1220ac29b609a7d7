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
use std::str::FromStr;

use crate::{DerivationIndex, Idx, IdxBase, IndexParseError, NormalIndex, Terminal};

#[derive(Clone, Eq, PartialEq, Debug, Display, Error)]
#[display(doc_comments)]
pub enum DerivationParseError {
    /// unable to parse derivation path '{0}' - {1}
    InvalidIndex(String, IndexParseError),
    /// invalid derivation path format '{0}'
    InvalidFormat(String),
}

/// Derivation path from the master key, consisting of a single type of
/// segments.
///
/// Displayed with the `m` prefix; hardened segments use the `h` marker, or
/// the `'` marker in alternate formatting (`{:#}`).
#[derive(Wrapper, WrapperMut, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Default, Debug, From)]
#[wrapper(Deref)]
#[wrapper_mut(DerefMut)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", transparent)
)]
pub struct DerivationPath<I = DerivationIndex>(Vec<I>);

impl<I: Clone> From<&[I]> for DerivationPath<I> {
    fn from(path: &[I]) -> Self { Self(path.to_vec()) }
}

impl<I> AsRef<[I]> for DerivationPath<I> {
    fn as_ref(&self) -> &[I] { self.0.as_ref() }
}

impl<I: Display> Display for DerivationPath<I> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("m")?;
        for segment in &self.0 {
            f.write_str("/")?;
            Display::fmt(segment, f)?;
        }
        Ok(())
    }
}

impl<I: FromStr> FromStr for DerivationPath<I>
where IndexParseError: From<<I as FromStr>::Err>
{
    type Err = DerivationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let path = match s {
            "m" | "M" => return Ok(Self(vec![])),
            _ if s.starts_with("m/") || s.starts_with("M/") => &s[2..],
            _ => s.strip_prefix('/').unwrap_or(s),
        };
        if path.is_empty() {
            return Err(DerivationParseError::InvalidFormat(s.to_owned()));
        }
        let inner = path
            .split('/')
            .map(I::from_str)
            .collect::<Result<Vec<_>, I::Err>>()
            .map_err(|err| DerivationParseError::InvalidIndex(s.to_owned(), err.into()))?;
        Ok(Self(inner))
    }
}

impl<I> IntoIterator for DerivationPath<I> {
    type Item = I;
    type IntoIter = std::vec::IntoIter<I>;

    fn into_iter(self) -> Self::IntoIter { self.0.into_iter() }
}

impl<'path, I: Copy> IntoIterator for &'path DerivationPath<I> {
    type Item = I;
    type IntoIter = std::iter::Copied<std::slice::Iter<'path, I>>;

    fn into_iter(self) -> Self::IntoIter { self.0.iter().copied() }
}

impl<I> FromIterator<I> for DerivationPath<I> {
    fn from_iter<T: IntoIterator<Item = I>>(iter: T) -> Self { Self(iter.into_iter().collect()) }
}

impl<I> DerivationPath<I> {
    /// Constructs empty derivation path.
    pub fn new() -> Self { Self(vec![]) }
}

impl<I: IdxBase> DerivationPath<I> {
    /// Extends the path with the terminal `change/index` segments.
    pub fn with_terminal(mut self, terminal: Terminal) -> Self
    where I: From<NormalIndex> {
        self.0.push(I::from(NormalIndex::from(terminal.keychain)));
        self.0.push(I::from(terminal.index));
        self
    }

    /// Returns the trailing `change/index` pair if both last segments are
    /// unhardened and the change fits a keychain number.
    pub fn terminal(&self) -> Option<Terminal> {
        let mut iter = self.iter().rev();
        let index = iter.next()?;
        if index.is_hardened() {
            return None;
        }
        let index = NormalIndex::try_from_index(index.child_number()).ok()?;
        let keychain = iter.next()?;
        if keychain.is_hardened() {
            return None;
        }
        let keychain = u8::try_from(keychain.child_number()).ok()?;
        Some(Terminal::new(keychain, index))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::HardenedIndex;

    #[test]
    fn altstr() {
        let path1 = DerivationPath::<HardenedIndex>::from_str("48h/1h/0h").unwrap();
        let path2 = DerivationPath::<HardenedIndex>::from_str("m/48'/1'/0'").unwrap();
        let path3 = DerivationPath::<HardenedIndex>::from_str("/48'/1h/0h").unwrap();
        assert_eq!(path1, path2);
        assert_eq!(path1, path3);
        assert_eq!(path1.to_string(), "m/48h/1h/0h");
        assert_eq!(format!("{path1:#}"), "m/48'/1'/0'");
    }

    #[test]
    fn mixed_path() {
        let path = DerivationPath::<DerivationIndex>::from_str("m/48'/1'/0'/2'/0/5").unwrap();
        assert_eq!(path.len(), 6);
        assert_eq!(format!("{path:#}"), "m/48'/1'/0'/2'/0/5");
        assert_eq!(path.terminal(), Some(Terminal::new(0, NormalIndex::normal(5))));
    }

    #[test]
    fn master_and_garbage() {
        assert!(DerivationPath::<DerivationIndex>::from_str("m").unwrap().is_empty());
        assert_eq!(DerivationPath::<DerivationIndex>::new().to_string(), "m");
        assert!(matches!(
            DerivationPath::<DerivationIndex>::from_str(""),
            Err(DerivationParseError::InvalidFormat(_))
        ));
        assert!(matches!(
            DerivationPath::<DerivationIndex>::from_str("m/48'/x"),
            Err(DerivationParseError::InvalidIndex(..))
        ));
        assert!(matches!(
            DerivationPath::<HardenedIndex>::from_str("m/48'/0"),
            Err(DerivationParseError::InvalidIndex(..))
        ));
    }

    #[test]
    fn terminal_extension() {
        let account = DerivationPath::<DerivationIndex>::from_str("m/48'/0'/0'/2'").unwrap();
        assert_eq!(account.terminal(), None);
        let full = account.with_terminal(Terminal::new(1, NormalIndex::normal(3)));
        assert_eq!(full.to_string(), "m/48h/0h/0h/2h/1/3");
    }
}
