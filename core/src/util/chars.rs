const ASCII_WHITESPACE: u8 = 1 << 0;
const ASCII_DIGIT: u8 = 1 << 1;
const ASCII_ALPHA: u8 = 1 << 2;
const ASCII_WORD: u8 = 1 << 3;
const ASCII_HEX: u8 = 1 << 4;

const fn build_ascii_class() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        let c = i as u8;
        if matches!(c, b' ' | b'\t' | b'\n' | b'\r' | 0x0B | 0x0C) {
            table[i] |= ASCII_WHITESPACE;
        }
        if c >= b'0' && c <= b'9' {
            table[i] |= ASCII_DIGIT | ASCII_WORD | ASCII_HEX;
        }
        if (c >= b'a' && c <= b'z') || (c >= b'A' && c <= b'Z') {
            table[i] |= ASCII_ALPHA | ASCII_WORD;
        }
        if (c >= b'a' && c <= b'f') || (c >= b'A' && c <= b'F') {
            table[i] |= ASCII_HEX;
        }
        if c == b'_' {
            table[i] |= ASCII_WORD;
        }
        i += 1;
    }
    table
}

const ASCII_CLASS: [u8; 256] = build_ascii_class();

#[inline]
fn ascii_flags(c: char) -> u8 {
    if c.is_ascii() { ASCII_CLASS[c as usize] } else { 0 }
}

#[inline]
pub fn is_space_char(c: char) -> bool {
    let flags = ascii_flags(c);
    if flags != 0 {
        flags & ASCII_WHITESPACE != 0
    } else {
        c.is_whitespace()
    }
}

/// Default word class used by the lexer: ASCII letters, digits and `_`.
#[inline]
pub fn is_word_char(c: char) -> bool {
    ascii_flags(c) & ASCII_WORD != 0
}

/// Decimal (`123`, `-4` is two tokens) or hex (`0x1f`) literal.
pub fn is_number(word: &str) -> bool {
    if word.is_empty() {
        return false;
    }
    if let Some(hex) = word.strip_prefix("0x").or_else(|| word.strip_prefix("0X")) {
        return !hex.is_empty() && hex.chars().all(|c| ascii_flags(c) & ASCII_HEX != 0);
    }
    word.chars().all(|c| ascii_flags(c) & ASCII_DIGIT != 0)
}

/// Words that the generic word class tokenizes as a single unit, optionally
/// qualified once with `:` (`iface:com`).
pub fn is_standard_word(word: &str) -> bool {
    let mut parts = word.splitn(2, ':');
    let head = parts.next().unwrap_or_default();
    let head_ok = !head.is_empty() && head.chars().all(is_word_char);
    match parts.next() {
        Some(tail) => head_ok && !tail.is_empty() && tail.chars().all(is_word_char),
        None => head_ok,
    }
}
