// wallet-core/src/crypto/paths.rs
//
// Derivation Paths Module - Witnet HD Wallet Path Generator
// Layout: m / 3' / 4919' / account' / change / index
// Parser chấp nhận cả hai ký hiệu hardened: `'` và `h`.

use crate::error::CryptoError;
use std::fmt;
use std::str::FromStr;

/// First hardened index, 2³¹.
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

// =============================================================================
// COIN TYPES
// =============================================================================
pub mod coin_type {
    /// Purpose level used by Witnet wallets (not BIP-44).
    pub const WITNET_PURPOSE: u32 = 3;
    /// 0x1337
    pub const WITNET: u32 = 4919;
}

/// Change level: 0 = external (nhận tiền), 1 = internal (tiền thối).
pub mod change {
    pub const EXTERNAL: u32 = 0;
    pub const INTERNAL: u32 = 1;
}

// =============================================================================
// CHILD NUMBER
// =============================================================================

/// Raw child index; hardened iff `>= 2^31`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChildNumber(u32);

impl ChildNumber {
    /// `index` must be below 2³¹ in both cases.
    pub fn new(index: u32, hardened: bool) -> Result<Self, CryptoError> {
        if index >= HARDENED_OFFSET {
            return Err(CryptoError::KeyDerivation(format!(
                "child index {} out of range",
                index
            )));
        }
        Ok(Self(if hardened { index | HARDENED_OFFSET } else { index }))
    }

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Index without the hardened bit.
    #[inline]
    pub const fn index(self) -> u32 {
        self.0 & !HARDENED_OFFSET
    }

    #[inline]
    pub const fn is_hardened(self) -> bool {
        self.0 >= HARDENED_OFFSET
    }
}

impl fmt::Display for ChildNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_hardened() {
            write!(f, "{}h", self.index())
        } else {
            write!(f, "{}", self.index())
        }
    }
}

impl FromStr for ChildNumber {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (digits, hardened) = match s.strip_suffix(|c: char| matches!(c, '\'' | 'h' | 'H')) {
            Some(rest) => (rest, true),
            None => (s, false),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CryptoError::KeyDerivation(format!(
                "invalid path segment '{}'",
                s
            )));
        }
        let index = digits.parse::<u32>().map_err(|_| {
            CryptoError::KeyDerivation(format!("path segment '{}' out of range", s))
        })?;
        Self::new(index, hardened)
    }
}

// =============================================================================
// DERIVATION PATH
// =============================================================================

/// Parsed path such as `m/3'/4919'/0'/0/0`.
///
/// The root letter is not stored: `m` and `M` parse to the same path, and
/// extended keys render it with their own root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DerivationPath {
    children: Vec<ChildNumber>,
}

impl DerivationPath {
    pub fn root() -> Self {
        Self::default()
    }

    #[inline]
    pub fn children(&self) -> &[ChildNumber] {
        &self.children
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.children.len()
    }

    /// New path with `child` appended.
    pub fn child(&self, child: ChildNumber) -> Self {
        let mut children = self.children.clone();
        children.push(child);
        Self { children }
    }

    /// Renders with an explicit root letter (`m` private, `M` public).
    pub fn to_string_with_root(&self, root: char) -> String {
        let mut out = String::with_capacity(2 + self.children.len() * 6);
        out.push(root);
        for child in &self.children {
            out.push('/');
            out.push_str(&child.to_string());
        }
        out
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_with_root('m'))
    }
}

impl FromStr for DerivationPath {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split('/');
        match parts.next() {
            Some("m") | Some("M") => {}
            _ => {
                return Err(CryptoError::KeyDerivation(format!(
                    "path '{}' must start with 'm' or 'M'",
                    s
                )))
            }
        }
        let children = parts
            .map(ChildNumber::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { children })
    }
}

impl FromIterator<ChildNumber> for DerivationPath {
    fn from_iter<I: IntoIterator<Item = ChildNumber>>(iter: I) -> Self {
        Self {
            children: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a DerivationPath {
    type Item = &'a ChildNumber;
    type IntoIter = std::slice::Iter<'a, ChildNumber>;

    fn into_iter(self) -> Self::IntoIter {
        self.children.iter()
    }
}

// =============================================================================
// PRE-BUILT PATHS
// =============================================================================
/// Pre-built Derivation Paths cho Witnet wallet
///
/// # Conventions
/// - Account: `m/3'/4919'/account'`
/// - Address: `m/3'/4919'/account'/change/index` (change 0 = external, 1 = internal)
pub struct DerivationPaths;

impl DerivationPaths {
    /// Default account.
    pub const WIT_ACCOUNT_0: &'static str = "m/3'/4919'/0'";

    /// First external address of the default account.
    pub const WIT_0: &'static str = "m/3'/4919'/0'/0/0";

    /// External (receiving) address of account 0.
    #[inline]
    pub fn wit(index: u32) -> String {
        Self::wit_account(0, change::EXTERNAL, index)
    }

    /// Internal (change) address of account 0.
    #[inline]
    pub fn wit_internal(index: u32) -> String {
        Self::wit_account(0, change::INTERNAL, index)
    }

    /// Full path with custom account and change level.
    #[inline]
    pub fn wit_account(account: u32, change: u32, index: u32) -> String {
        format!(
            "m/{}'/{}'/{}'/{}/{}",
            coin_type::WITNET_PURPOSE,
            coin_type::WITNET,
            account,
            change,
            index
        )
    }

    /// Tạo path tùy chỉnh `m/purpose'/coin'/account'/...`
    ///
    /// # Arguments
    /// * `purpose` - purpose level (3 cho Witnet)
    /// * `coin_type` - coin type (4919 cho Witnet)
    /// * `account` - account index
    /// * `sub_paths` - raw indices; values `>= 2^31` are printed hardened
    pub fn build_path(purpose: u32, coin_type: u32, account: u32, sub_paths: &[u32]) -> String {
        let mut path = format!("m/{}'/{}'/{}'", purpose, coin_type, account);
        for &idx in sub_paths {
            if idx >= HARDENED_OFFSET {
                path.push_str(&format!("/{}'", idx & !HARDENED_OFFSET));
            } else {
                path.push_str(&format!("/{}", idx));
            }
        }
        path
    }
}

// =============================================================================
// TESTS
// =============================================================================
