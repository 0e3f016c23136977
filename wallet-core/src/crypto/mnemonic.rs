// wallet-core\src\crypto\mnemonic.rs
//
// Mnemonic Module - BIP-39 engine
// Chuẩn: BIP-39 (Mnemonic), PBKDF2-HMAC-SHA512 (Seed Derivation)
//
// Wordlists lấy từ crate `bip39` (2048 từ / ngôn ngữ), NFKD-normalized khi load.

use super::curve::Curve;
use super::hash::sha256;
use super::key_deriver::{KeyVersions, Xprv};
use crate::error::{CryptoError, MnemonicError, WalletError, WalletResult};
use rand::{rngs::OsRng, RngCore};
use sha2::Sha512;
use std::fmt;
use std::str::FromStr;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Words per list.
pub const RADIX: usize = 2048;

/// PBKDF2 iterations for seed stretching.
pub const PBKDF2_ROUNDS: u32 = 2048;

const SALT_PREFIX: &str = "mnemonic";

/// Japanese phrases are joined with U+3000.
const IDEOGRAPHIC_SPACE: &str = "\u{3000}";

// =============================================================================
// WORD COUNT
// =============================================================================

/// Số lượng words hỗ trợ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordCount {
    /// 12 words (128-bit entropy)
    Twelve = 12,
    /// 15 words (160-bit entropy)
    Fifteen = 15,
    /// 18 words (192-bit entropy)
    Eighteen = 18,
    /// 21 words (224-bit entropy)
    TwentyOne = 21,
    /// 24 words (256-bit entropy)
    TwentyFour = 24,
}

impl WordCount {
    /// Lấy số bytes entropy cần thiết
    #[inline]
    pub const fn entropy_bytes(self) -> usize {
        match self {
            WordCount::Twelve => 16,
            WordCount::Fifteen => 20,
            WordCount::Eighteen => 24,
            WordCount::TwentyOne => 28,
            WordCount::TwentyFour => 32,
        }
    }

    pub fn from_words(count: usize) -> Option<Self> {
        match count {
            12 => Some(WordCount::Twelve),
            15 => Some(WordCount::Fifteen),
            18 => Some(WordCount::Eighteen),
            21 => Some(WordCount::TwentyOne),
            24 => Some(WordCount::TwentyFour),
            _ => None,
        }
    }

    pub fn from_entropy_len(len: usize) -> Option<Self> {
        Self::from_words(len * 3 / 4).filter(|wc| wc.entropy_bytes() == len)
    }

    /// `ENT / 32`
    #[inline]
    pub const fn checksum_bits(self) -> usize {
        self.entropy_bytes() * 8 / 32
    }
}

// =============================================================================
// LANGUAGE
// =============================================================================

/// Built-in wordlists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    English,
    ChineseSimplified,
    ChineseTraditional,
    Czech,
    French,
    Italian,
    Japanese,
    Korean,
    Spanish,
}

impl Language {
    /// Detection order; English first.
    pub const ALL: [Language; 9] = [
        Language::English,
        Language::ChineseSimplified,
        Language::ChineseTraditional,
        Language::Czech,
        Language::French,
        Language::Italian,
        Language::Japanese,
        Language::Korean,
        Language::Spanish,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Language::English => "english",
            Language::ChineseSimplified => "chinese_simplified",
            Language::ChineseTraditional => "chinese_traditional",
            Language::Czech => "czech",
            Language::French => "french",
            Language::Italian => "italian",
            Language::Japanese => "japanese",
            Language::Korean => "korean",
            Language::Spanish => "spanish",
        }
    }

    /// Word separator used when rendering a phrase.
    pub fn separator(self) -> &'static str {
        match self {
            Language::Japanese => IDEOGRAPHIC_SPACE,
            _ => " ",
        }
    }

    fn word_list(self) -> &'static [&'static str; RADIX] {
        let source = match self {
            Language::English => bip39::Language::English,
            Language::ChineseSimplified => bip39::Language::SimplifiedChinese,
            Language::ChineseTraditional => bip39::Language::TraditionalChinese,
            Language::Czech => bip39::Language::Czech,
            Language::French => bip39::Language::French,
            Language::Italian => bip39::Language::Italian,
            Language::Japanese => bip39::Language::Japanese,
            Language::Korean => bip39::Language::Korean,
            Language::Spanish => bip39::Language::Spanish,
        };
        source.word_list()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Language {
    type Err = MnemonicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::ALL
            .iter()
            .copied()
            .find(|lang| lang.name() == s)
            .ok_or_else(|| MnemonicError::Configuration(format!("unknown language '{}'", s)))
    }
}

// =============================================================================
// MNEMONIC ENGINE
// =============================================================================

/// Wordlist-bound BIP-39 encoder/decoder.
///
/// Words are stored NFKD-normalized. Lookups use binary search when the
/// list is byte-sorted (English), a linear scan otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mnemonic {
    language: Option<Language>,
    wordlist: Vec<String>,
    sorted: bool,
}

impl Mnemonic {
    pub fn new(language: Language) -> Self {
        let wordlist: Vec<String> = language
            .word_list()
            .iter()
            .map(|w| Self::normalize_string(w))
            .collect();
        let sorted = wordlist.windows(2).all(|w| w[0] < w[1]);
        Self {
            language: Some(language),
            wordlist,
            sorted,
        }
    }

    /// Custom wordlist; must hold exactly [`RADIX`] words.
    pub fn from_words<S: AsRef<str>>(words: &[S]) -> Result<Self, MnemonicError> {
        if words.len() != RADIX {
            return Err(MnemonicError::Configuration(format!(
                "word list should contain {} words, but it contains {} words",
                RADIX,
                words.len()
            )));
        }
        let wordlist: Vec<String> = words
            .iter()
            .map(|w| Self::normalize_string(w.as_ref().trim()))
            .collect();
        let sorted = wordlist.windows(2).all(|w| w[0] < w[1]);
        Ok(Self {
            language: None,
            wordlist,
            sorted,
        })
    }

    #[inline]
    pub fn language(&self) -> Option<Language> {
        self.language
    }

    #[inline]
    pub fn wordlist(&self) -> &[String] {
        &self.wordlist
    }

    pub fn list_languages() -> Vec<&'static str> {
        Language::ALL.iter().map(|lang| lang.name()).collect()
    }

    /// NFKD form, required before hashing or lookup.
    pub fn normalize_string(txt: &str) -> String {
        txt.nfkd().collect()
    }

    /// Language of the phrase, judged by its first word.
    pub fn detect_language(phrase: &str) -> Result<Language, MnemonicError> {
        let normalized = Self::normalize_string(phrase);
        let first = normalized
            .split_whitespace()
            .next()
            .ok_or(MnemonicError::LanguageNotDetected)?;

        Language::ALL
            .iter()
            .copied()
            .find(|&lang| Self::new(lang).index_of(first).is_some())
            .ok_or(MnemonicError::LanguageNotDetected)
    }

    fn index_of(&self, word: &str) -> Option<usize> {
        if self.sorted {
            self.wordlist
                .binary_search_by(|w| w.as_str().cmp(word))
                .ok()
        } else {
            self.wordlist.iter().position(|w| w == word)
        }
    }

    fn separator(&self) -> &'static str {
        self.language.map_or(" ", Language::separator)
    }

    // =========================================================================
    // ENCODE / DECODE
    // =========================================================================

    /// Fresh phrase from `OsRng` entropy.
    pub fn generate(&self, word_count: WordCount) -> Zeroizing<String> {
        let mut entropy = Zeroizing::new([0u8; 32]);
        let len = word_count.entropy_bytes();
        OsRng.fill_bytes(&mut entropy[..len]);
        self.encode_entropy(&entropy[..len])
    }

    /// Entropy (16/20/24/28/32 bytes) → phrase.
    pub fn to_mnemonic(&self, entropy: &[u8]) -> Result<Zeroizing<String>, MnemonicError> {
        if WordCount::from_entropy_len(entropy.len()).is_none() {
            return Err(MnemonicError::InvalidEntropyLength(entropy.len()));
        }
        Ok(self.encode_entropy(entropy))
    }

    // Caller guarantees a valid entropy length.
    fn encode_entropy(&self, entropy: &[u8]) -> Zeroizing<String> {
        let checksum_bits = entropy.len() * 8 / 32;
        let count = (entropy.len() * 8 + checksum_bits) / 11;
        let hash = sha256(entropy);

        let mut words: Vec<&str> = Vec::with_capacity(count);
        let mut acc: u32 = 0;
        let mut acc_bits = 0u32;
        for &byte in entropy.iter().chain(std::iter::once(&hash[0])) {
            acc = (acc << 8) | u32::from(byte);
            acc_bits += 8;
            while acc_bits >= 11 && words.len() < count {
                acc_bits -= 11;
                words.push(&self.wordlist[((acc >> acc_bits) & 0x7ff) as usize]);
                acc &= (1 << acc_bits) - 1;
            }
        }
        acc.zeroize();

        Zeroizing::new(words.join(self.separator()))
    }

    /// Phrase → entropy, verifying word count, words and checksum.
    pub fn to_entropy(&self, phrase: &str) -> Result<Zeroizing<Vec<u8>>, MnemonicError> {
        let normalized = Zeroizing::new(Self::normalize_string(phrase));
        let words: Vec<&str> = normalized.split_whitespace().collect();
        let word_count =
            WordCount::from_words(words.len()).ok_or(MnemonicError::InvalidWordCount(words.len()))?;

        let entropy_len = word_count.entropy_bytes();
        let mut entropy = Zeroizing::new(Vec::with_capacity(entropy_len));
        let mut acc: u32 = 0;
        let mut acc_bits = 0u32;
        for word in &words {
            let index = self
                .index_of(word)
                .ok_or_else(|| MnemonicError::UnknownWord(word.to_string()))?;
            acc = (acc << 11) | index as u32;
            acc_bits += 11;
            while acc_bits >= 8 && entropy.len() < entropy_len {
                acc_bits -= 8;
                entropy.push((acc >> acc_bits) as u8);
                acc &= (1 << acc_bits) - 1;
            }
        }

        // acc now holds exactly the checksum bits
        let checksum_bits = word_count.checksum_bits() as u32;
        let expected = u32::from(sha256(&entropy)[0]) >> (8 - checksum_bits);
        let matches = acc == expected;
        acc.zeroize();
        if !matches {
            return Err(MnemonicError::ChecksumFailed);
        }
        Ok(entropy)
    }

    /// `true` iff the phrase decodes against this wordlist.
    pub fn check(&self, phrase: &str) -> bool {
        self.to_entropy(phrase).is_ok()
    }

    /// Unique-prefix completion; returns the input unchanged otherwise.
    pub fn expand_word(&self, prefix: &str) -> String {
        if self.index_of(prefix).is_some() {
            return prefix.to_string();
        }
        let mut matches = self.wordlist.iter().filter(|w| w.starts_with(prefix));
        match (matches.next(), matches.next()) {
            (Some(word), None) => word.clone(),
            _ => prefix.to_string(),
        }
    }

    pub fn expand(&self, phrase: &str) -> String {
        phrase
            .split(' ')
            .map(|w| self.expand_word(w))
            .collect::<Vec<_>>()
            .join(" ")
    }

    // =========================================================================
    // SEED
    // =========================================================================

    /// `PBKDF2-HMAC-SHA512(NFKD(phrase), "mnemonic" ‖ NFKD(passphrase), 2048)`
    ///
    /// The phrase is not validated.
    pub fn to_seed(phrase: &str, passphrase: &str) -> Zeroizing<[u8; 64]> {
        let password = Zeroizing::new(Self::normalize_string(phrase));
        let salt = Zeroizing::new(format!(
            "{}{}",
            SALT_PREFIX,
            Self::normalize_string(passphrase)
        ));
        let mut seed = Zeroizing::new([0u8; 64]);
        pbkdf2::pbkdf2_hmac::<Sha512>(
            password.as_bytes(),
            salt.as_bytes(),
            PBKDF2_ROUNDS,
            &mut *seed,
        );
        seed
    }

    /// 64-byte seed → Base58Check master `xprv` (`tprv` on testnet).
    pub fn to_hd_master_key(seed: &[u8], testnet: bool) -> WalletResult<Zeroizing<String>> {
        if seed.len() != 64 {
            return Err(WalletError::Crypto(CryptoError::InvalidSeedLength(seed.len())));
        }
        let versions = if testnet {
            KeyVersions::TESTNET
        } else {
            KeyVersions::MAINNET
        };
        Ok(Xprv::from_seed(Curve::secp256k1(), seed)?.encode_with(&versions))
    }
}

// =============================================================================
// WALLET MNEMONIC
// =============================================================================

/// Wallet Mnemonic - validated phrase holder
///
/// # Security Architecture
/// - **ZeroizeOnDrop**: Phrase được tự động ghi đè bằng 0 khi struct bị drop
/// - **CSPRNG**: Sử dụng `OsRng` (OS-level cryptographically secure RNG)
/// - **No Debug Leak**: Custom Debug impl không hiển thị phrase
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct WalletMnemonic {
    phrase: String,
    word_count: usize,
}

// Custom Debug - KHÔNG BAO GIỜ hiển thị mnemonic phrase
impl fmt::Debug for WalletMnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletMnemonic")
            .field("word_count", &self.word_count)
            .field("phrase", &"[REDACTED]")
            .finish()
    }
}

impl WalletMnemonic {
    // =========================================================================
    // CONSTRUCTORS
    // =========================================================================

    /// Tạo mnemonic mới với 12 words (128-bit entropy)
    pub fn new() -> Self {
        Self::with_word_count(WordCount::Twelve)
    }

    /// Tạo mnemonic mới với 24 words (256-bit entropy)
    ///
    /// Bảo mật cao nhất, khuyến nghị cho ví chứa số lượng lớn.
    pub fn new_24_words() -> Self {
        Self::with_word_count(WordCount::TwentyFour)
    }

    /// Tạo mnemonic English với số lượng words tùy chỉnh
    ///
    /// # Arguments
    /// * `word_count` - Số lượng words (12, 15, 18, 21, hoặc 24)
    pub fn with_word_count(word_count: WordCount) -> Self {
        Self::with_language(word_count, Language::English)
    }

    pub fn with_language(word_count: WordCount, language: Language) -> Self {
        let phrase = Mnemonic::new(language).generate(word_count);
        Self {
            phrase: phrase.split_whitespace().collect::<Vec<_>>().join(" "),
            word_count: word_count as usize,
        }
    }

    /// Khôi phục mnemonic từ phrase có sẵn
    ///
    /// # Validation
    /// - Kiểm tra số lượng words (12, 15, 18, 21, 24)
    /// - Phát hiện ngôn ngữ theo từ đầu tiên
    /// - Kiểm tra từng word có trong wordlist và checksum
    pub fn from_phrase(phrase: &str) -> WalletResult<Self> {
        let normalized = Mnemonic::normalize_string(phrase);
        let words: Vec<&str> = normalized.split_whitespace().collect();
        let count = words.len();
        if WordCount::from_words(count).is_none() {
            return Err(MnemonicError::InvalidWordCount(count).into());
        }

        let joined = words.join(" ");
        let language = Mnemonic::detect_language(&joined)?;
        Mnemonic::new(language).to_entropy(&joined)?;

        Ok(Self {
            phrase: joined,
            word_count: count,
        })
    }

    // =========================================================================
    // GETTERS
    // =========================================================================

    /// Lấy mnemonic phrase (NFKD, single-space separated)
    ///
    /// # Warning
    /// Cẩn thận khi hiển thị hoặc log giá trị này!
    #[inline]
    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    #[inline]
    pub fn word_count(&self) -> usize {
        self.word_count
    }

    pub fn words(&self) -> Vec<&str> {
        self.phrase.split_whitespace().collect()
    }

    /// Tạo seed từ mnemonic (PBKDF2-HMAC-SHA512)
    ///
    /// # Security Note
    /// Passphrase khác với password. Nếu mất passphrase, không thể khôi phục ví
    /// ngay cả khi có mnemonic phrase.
    pub fn to_seed(&self, passphrase: Option<&str>) -> Zeroizing<[u8; 64]> {
        Mnemonic::to_seed(&self.phrase, passphrase.unwrap_or(""))
    }

    // =========================================================================
    // VALIDATION
    // =========================================================================

    /// Kiểm tra xem phrase có hợp lệ không (word count, wordlist, checksum)
    pub fn validate(phrase: &str) -> bool {
        Self::from_phrase(phrase).is_ok()
    }

    /// Kiểm tra một từ có trong BIP-39 English wordlist không
    pub fn is_valid_word(word: &str) -> bool {
        Mnemonic::new(Language::English).index_of(word).is_some()
    }

    /// Strength (bit) của mnemonic
    pub fn strength_bits(&self) -> usize {
        WordCount::from_words(self.word_count).map_or(0, |wc| wc.entropy_bytes() * 8)
    }
}

impl Default for WalletMnemonic {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// UNIT TESTS
// =============================================================================
