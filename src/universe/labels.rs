//! Text labels for vertices
//!
//! One character per symbol: `1`-`9` for symbols one to nine and `A` for ten,
//! so labels keep a fixed width for every supported `n`.

use crate::IstError;

/// Character for a single symbol
pub fn symbol_char(symbol: u8) -> char {
    match symbol {
        1..=9 => char::from(b'0' + symbol),
        10 => 'A',
        _ => '?',
    }
}

/// Render a permutation as its label
pub fn label(symbols: &[u8]) -> String {
    symbols.iter().map(|&s| symbol_char(s)).collect()
}

/// Parse a label back into symbols, checking it is a permutation of `{1..n}`
pub fn parse_label(text: &str, n: usize) -> crate::Result<Vec<u8>> {
    let symbols = text
        .chars()
        .map(|c| match c {
            '1'..='9' => Ok(c as u8 - b'0'),
            'A' | 'a' => Ok(10),
            other => Err(IstError::Label(format!(
                "unexpected symbol '{}' in \"{}\"",
                other, text
            ))),
        })
        .collect::<crate::Result<Vec<u8>>>()?;

    if symbols.len() != n {
        return Err(IstError::Label(format!(
            "\"{}\" has {} symbols, expected {}",
            text,
            symbols.len(),
            n
        )));
    }

    let mut seen = 0u16;
    for &s in &symbols {
        if s as usize > n || seen & (1 << s) != 0 {
            return Err(IstError::Label(format!(
                "\"{}\" is not a permutation of 1..{}",
                text, n
            )));
        }
        seen |= 1 << s;
    }

    Ok(symbols)
}
