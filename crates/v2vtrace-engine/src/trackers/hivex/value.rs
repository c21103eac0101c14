//! Rendering of registry values from their raw bytes.

pub const REG_SZ: u32 = 1;
pub const REG_EXPAND_SZ: u32 = 2;
pub const REG_BINARY: u32 = 3;
pub const REG_DWORD: u32 = 4;
pub const REG_MULTI_SZ: u32 = 7;
pub const REG_QWORD: u32 = 11;

const MAX_HEX_BYTES: usize = 16;

/// Render `bytes` according to the registry type `kind`.
pub fn decode_value(kind: u32, bytes: &[u8]) -> String {
    match kind {
        REG_SZ | REG_EXPAND_SZ => utf16le(bytes).trim_end_matches('\0').to_string(),
        REG_MULTI_SZ => utf16le(bytes)
            .split('\0')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        REG_DWORD if bytes.len() >= 4 => {
            u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]).to_string()
        }
        REG_QWORD if bytes.len() >= 8 => {
            let mut word = [0u8; 8];
            word.copy_from_slice(&bytes[..8]);
            u64::from_le_bytes(word).to_string()
        }
        _ => binary(bytes),
    }
}

fn utf16le(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

fn binary(bytes: &[u8]) -> String {
    if bytes.len() > MAX_HEX_BYTES {
        return format!("<{} bytes>", bytes.len());
    }
    let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    format!("hex:{hex}")
}
