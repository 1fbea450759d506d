//! Filename encoding fallback chain (spec §6 "filename encoding").
//!
//! Archive tools disagree about what encoding a stored filename is in.
//! Handlers pass the entry's raw bytes here and get back the first encoding
//! in the priority order that round-trips cleanly: UTF-8, CP932/Shift-JIS,
//! EUC-JP, then a CP437→CP932 re-roundtrip as a last resort for names that
//! were mangled by a CP437-only tool.

/// Classic IBM PC code page 437, upper half (0x80-0xFF). The lower half is
/// identical to ASCII.
const CP437_UPPER: [char; 128] = [
    'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å', 'É', 'æ', 'Æ',
    'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', '¢', '£', '¥', '₧', 'ƒ', 'á', 'í', 'ó', 'ú', 'ñ', 'Ñ',
    'ª', 'º', '¿', '⌐', '¬', '½', '¼', '¡', '«', '»', '░', '▒', '▓', '│', '┤', '╡', '╢', '╖', '╕',
    '╣', '║', '╗', '╝', '╜', '╛', '┐', '└', '┴', '┬', '├', '─', '┼', '╞', '╟', '╚', '╔', '╩', '╦',
    '╠', '═', '╬', '╧', '╨', '╤', '╥', '╙', '╘', '╒', '╓', '╫', '╪', '┘', '┌', '█', '▄', '▌', '▐',
    '▀', 'α', 'ß', 'Γ', 'π', 'Σ', 'σ', 'µ', 'τ', 'Φ', 'Θ', 'Ω', 'δ', '∞', 'φ', 'ε', '∩', '≡', '±',
    '≥', '≤', '⌠', '⌡', '÷', '≈', '°', '∙', '·', '√', 'ⁿ', '²', '■', '\u{00a0}',
];

fn decode_cp437(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| {
            if b < 0x80 {
                b as char
            } else {
                CP437_UPPER[(b - 0x80) as usize]
            }
        })
        .collect()
}

fn encode_cp437(s: &str) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(s.len());
    for c in s.chars() {
        if (c as u32) < 0x80 {
            out.push(c as u8);
        } else {
            let idx = CP437_UPPER.iter().position(|&u| u == c)?;
            out.push(0x80 + idx as u8);
        }
    }
    Some(out)
}

fn try_shift_jis(bytes: &[u8]) -> Option<String> {
    let (decoded, _, had_errors) = encoding_rs::SHIFT_JIS.decode(bytes);
    (!had_errors).then(|| decoded.into_owned())
}

fn try_euc_jp(bytes: &[u8]) -> Option<String> {
    let (decoded, _, had_errors) = encoding_rs::EUC_JP.decode(bytes);
    (!had_errors).then(|| decoded.into_owned())
}

/// Tries UTF-8, CP932 (Shift-JIS), EUC-JP, then a CP437→CP932 re-roundtrip,
/// in that priority order; the first clean decode wins. Never fails: the
/// final fallback is a lossy UTF-8 decode, matching the source's
/// `errors='replace'` behavior.
pub fn decode_entry_name(bytes: &[u8]) -> String {
    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }
    if let Some(s) = try_shift_jis(bytes) {
        return s;
    }
    if let Some(s) = try_euc_jp(bytes) {
        return s;
    }
    let cp437 = decode_cp437(bytes);
    if let Some(reencoded) = encode_cp437(&cp437) {
        if let Some(s) = try_shift_jis(&reencoded) {
            return s;
        }
    }
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_plain_ascii_as_utf8() {
        assert_eq!(decode_entry_name(b"readme.txt"), "readme.txt");
    }

    #[test]
    fn decodes_cp932_bytes_not_valid_as_utf8() {
        // "日本語.png" encoded as Shift-JIS/CP932.
        let (bytes, _, had_errors) = encoding_rs::SHIFT_JIS.encode("日本語.png");
        assert!(!had_errors);
        assert!(std::str::from_utf8(&bytes).is_err());
        assert_eq!(decode_entry_name(&bytes), "日本語.png");
    }

    #[test]
    fn decodes_euc_jp_bytes() {
        let (bytes, _, had_errors) = encoding_rs::EUC_JP.encode("日本語.png");
        assert!(!had_errors);
        assert_eq!(decode_entry_name(&bytes), "日本語.png");
    }
}
