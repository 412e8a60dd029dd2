//! Base16 transcoding of payloads that cannot travel raw inside a textual
//! AT command (`+USOWR` in hex mode).

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FromHexError {
    /// An invalid character was found. Valid ones are: `0...9`, `a...f`
    /// or `A...F`.
    InvalidHexCharacter,

    /// A hex string's length needs to be even, as two digits correspond to
    /// one byte.
    OddLength,
}

const DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Encode `input` as uppercase hex digits into `out`, followed by a NUL
/// terminator.
///
/// Encoding stops at the first NUL byte of `input`, or at the last input
/// byte whose two digits still leave room for the terminator. Returns the
/// number of input bytes consumed; `out` holds twice that many digits.
pub fn hex_encode(input: &[u8], out: &mut [u8]) -> usize {
    if out.is_empty() {
        return 0;
    }

    let max = input.len().min((out.len() - 1) / 2);
    let mut consumed = 0;
    for (&byte, pair) in input[..max].iter().zip(out.chunks_exact_mut(2)) {
        if byte == 0 {
            break;
        }
        pair[0] = DIGITS[usize::from(byte >> 4)];
        pair[1] = DIGITS[usize::from(byte & 0x0F)];
        consumed += 1;
    }

    out[consumed * 2] = 0;
    consumed
}

/// Decode a single hex char to decimal.
const fn val(c: u8) -> Result<u8, FromHexError> {
    match c {
        b'A'..=b'F' => Ok(c - b'A' + 10),
        b'a'..=b'f' => Ok(c - b'a' + 10),
        b'0'..=b'9' => Ok(c - b'0'),
        _ => Err(FromHexError::InvalidHexCharacter),
    }
}

/// Decode hexadecimal bytes to decimal bytes in-place overwriting the first n/2
/// bytes, and returning them as a slice.
pub fn from_hex(hex: &mut [u8]) -> Result<&[u8], FromHexError> {
    if hex.len() % 2 != 0 {
        return Err(FromHexError::OddLength);
    }

    let len = hex.len() / 2;
    for i in 0..len {
        hex[i] = val(hex[i * 2])? << 4 | val(hex[i * 2 + 1])?;
    }
    Ok(&hex[..len])
}
