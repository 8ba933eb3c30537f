/// AD type: Manufacturer Specific Data.
pub const AD_TYPE_MANUFACTURER_DATA: u8 = 0xFF;

/// Find the value of the first AD structure of `ad_type` in raw advertisement data.
///
/// Stops at a zero-length structure or one that runs past the end of `data`.
pub fn find_ad_structure(data: &[u8], ad_type: u8) -> Option<&[u8]> {
    let mut i = 0;
    while i < data.len() {
        let len = data[i] as usize;
        if len == 0 || i + len >= data.len() {
            break;
        }
        if data[i + 1] == ad_type {
            return Some(&data[i + 2..i + 1 + len]);
        }
        i += len + 1;
    }
    None
}

/// Extract the company identifier from Manufacturer Specific Data.
///
/// The identifier is the first two bytes of the field, little-endian on
/// air; `0x0499` is sent as `99 04`.
pub fn manufacturer_id(data: &[u8]) -> Option<u16> {
    let value = find_ad_structure(data, AD_TYPE_MANUFACTURER_DATA)?;
    if value.len() < 2 {
        return None;
    }
    Some(u16::from_le_bytes([value[0], value[1]]))
}
