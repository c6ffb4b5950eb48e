//! Hex dump helpers for log lines and control descriptions

const HEX_CHAR: &[u8; 16] = b"0123456789ABCDEF";

/// Render a single byte as `0xNN`
pub fn dump_byte(octet: u8) -> String {
    let mut out = String::with_capacity(4);
    out.push_str("0x");
    out.push(HEX_CHAR[(octet >> 4) as usize] as char);
    out.push(HEX_CHAR[(octet & 0x0F) as usize] as char);
    out
}

/// Render a byte string as space separated `0xNN` items
///
/// An empty slice renders as an empty string.
pub fn dump_bytes(buffer: &[u8]) -> String {
    buffer
        .iter()
        .map(|&b| dump_byte(b))
        .collect::<Vec<_>>()
        .join(" ")
}
