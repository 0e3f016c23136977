// wallet-core\src\encoding\bech32.rs
//
// Bech32 (BIP-173 checksum) cho địa chỉ "wit1..." và master key "xprv1..."
//
// Không áp giới hạn 90 ký tự của BIP-173: chuỗi master key dài 117 ký tự.
// Mọi lỗi decode đều được trả về, không bao giờ bị nuốt.

use crate::error::EncodingError;

pub const CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";
pub const SEPARATOR: char = '1';
pub const CHECKSUM_LEN: usize = 6;

const GENERATOR: [u32; 5] = [0x3b6a57b2, 0x26508e6d, 0x1ea119fa, 0x3d4233dd, 0x2a1462b3];

fn polymod(values: impl IntoIterator<Item = u8>) -> u32 {
    let mut chk: u32 = 1;
    for v in values {
        let top = chk >> 25;
        chk = ((chk & 0x1ff_ffff) << 5) ^ u32::from(v);
        for (i, g) in GENERATOR.iter().enumerate() {
            if (top >> i) & 1 == 1 {
                chk ^= g;
            }
        }
    }
    chk
}

/// High bits of every HRP char, a zero, then the low bits.
fn hrp_expand(hrp: &str) -> Vec<u8> {
    let bytes = hrp.as_bytes();
    let mut out = Vec::with_capacity(bytes.len() * 2 + 1);
    out.extend(bytes.iter().map(|b| b >> 5));
    out.push(0);
    out.extend(bytes.iter().map(|b| b & 0x1f));
    out
}

/// Six 5-bit checksum groups for `hrp` + `data`.
pub fn create_checksum(hrp: &str, data: &[u8]) -> [u8; CHECKSUM_LEN] {
    let values = hrp_expand(hrp)
        .into_iter()
        .chain(data.iter().copied())
        .chain([0u8; CHECKSUM_LEN]);
    let pm = polymod(values) ^ 1;
    let mut out = [0u8; CHECKSUM_LEN];
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = ((pm >> (5 * (5 - i))) & 0x1f) as u8;
    }
    out
}

/// `data` includes the trailing checksum groups.
pub fn verify_checksum(hrp: &str, data: &[u8]) -> bool {
    polymod(hrp_expand(hrp).into_iter().chain(data.iter().copied())) == 1
}

/// Regroups `data` from `from`-bit to `to`-bit words.
///
/// Without `pad`, leftover bits must be fewer than `from` and all zero.
pub fn convert_bits(data: &[u8], from: u32, to: u32, pad: bool) -> Result<Vec<u8>, EncodingError> {
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let maxv: u32 = (1 << to) - 1;
    let mut out = Vec::with_capacity(data.len() * from as usize / to as usize + 1);

    for &value in data {
        let v = u32::from(value);
        if v >> from != 0 {
            return Err(EncodingError::Bech32Decode(format!(
                "value {} does not fit in {} bits",
                v, from
            )));
        }
        acc = (acc << from) | v;
        bits += from;
        while bits >= to {
            bits -= to;
            out.push(((acc >> bits) & maxv) as u8);
        }
        // keep only the bits not yet emitted
        acc &= (1 << bits) - 1;
    }

    if pad {
        if bits > 0 {
            out.push(((acc << (to - bits)) & maxv) as u8);
        }
    } else if bits >= from || ((acc << (to - bits)) & maxv) != 0 {
        return Err(EncodingError::Bech32Decode("invalid padding".to_string()));
    }
    Ok(out)
}

/// Encodes 5-bit groups: `hrp ‖ '1' ‖ data ‖ checksum`.
pub fn encode(hrp: &str, data: &[u8]) -> String {
    let checksum = create_checksum(hrp, data);
    let mut out = String::with_capacity(hrp.len() + 1 + data.len() + CHECKSUM_LEN);
    out.push_str(hrp);
    out.push(SEPARATOR);
    for &d in data.iter().chain(checksum.iter()) {
        out.push(CHARSET[(d & 0x1f) as usize] as char);
    }
    out
}

/// Decodes to `(hrp, 5-bit groups)` with the checksum stripped.
///
/// Rejects characters outside `[33, 126]`, mixed case, a missing separator,
/// fewer than six checksum characters, symbols outside the charset and a bad
/// checksum. The returned HRP is lowercase.
pub fn decode(s: &str) -> Result<(String, Vec<u8>), EncodingError> {
    let err = |why: String| EncodingError::Bech32Decode(why);

    if let Some(c) = s.bytes().find(|b| !(33..=126).contains(b)) {
        return Err(err(format!("character 0x{:02x} out of range", c)));
    }
    let has_lower = s.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = s.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper {
        return Err(err("mixed case".to_string()));
    }

    let lower = s.to_ascii_lowercase();
    let sep = lower
        .rfind(SEPARATOR)
        .ok_or_else(|| err("missing separator '1'".to_string()))?;
    if sep == 0 {
        return Err(err("empty human-readable part".to_string()));
    }
    if sep + 1 + CHECKSUM_LEN > lower.len() {
        return Err(err("checksum too short".to_string()));
    }

    let hrp = &lower[..sep];
    let mut data = Vec::with_capacity(lower.len() - sep - 1);
    for c in lower[sep + 1..].bytes() {
        let d = CHARSET
            .iter()
            .position(|&x| x == c)
            .ok_or_else(|| err(format!("invalid character '{}'", c as char)))?;
        data.push(d as u8);
    }

    if !verify_checksum(hrp, &data) {
        return Err(err("invalid checksum".to_string()));
    }
    data.truncate(data.len() - CHECKSUM_LEN);
    Ok((hrp.to_string(), data))
}

/// Regroups raw bytes 8→5 (padded) and encodes them.
pub fn encode_bytes(hrp: &str, bytes: &[u8]) -> String {
    // 8-bit input always fits, so regrouping cannot fail
    let groups = convert_bits(bytes, 8, 5, true).unwrap_or_default();
    encode(hrp, &groups)
}

/// Decodes and regroups 5→8, optionally checking the HRP.
pub fn decode_bytes(s: &str, expected_hrp: Option<&str>) -> Result<(String, Vec<u8>), EncodingError> {
    let (hrp, groups) = decode(s)?;
    if let Some(expected) = expected_hrp {
        if hrp != expected {
            return Err(EncodingError::Bech32Decode(format!(
                "unexpected prefix '{}', expected '{}'",
                hrp, expected
            )));
        }
    }
    let bytes = convert_bits(&groups, 5, 8, false)?;
    Ok((hrp, bytes))
}
