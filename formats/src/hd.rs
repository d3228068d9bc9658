//! The `.hd` header that accompanies a `.bd` bank.
//!
//! Only the `Vagi` chunk is understood. It starts with the tag, stored as the bytes `igaV`,
//! and continues with a reserved word, the highest entry index, and one offset per entry.
//! Offsets are relative to the tag. Each points at an entry whose first field is the clip's
//! sample rate. All integers are little-endian.

use bytemuck::pod_read_unaligned as read;

/// `0x56616769` when read as a little-endian word.
pub const VAGI_TAG: [u8; 4] = *b"igaV";

#[derive(Debug, thiserror::Error)]
pub enum HdError {
    #[error("vag info chunk at {chunk:#x} is truncated")]
    Truncated { chunk: usize },
    #[error("vag info entry {index} at offset {offset} from chunk {chunk:#x} is out of bounds")]
    BadOffset { chunk: usize, index: usize, offset: i32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VagInfo {
    /// Position of the tag in the file.
    pub chunk: usize,
    pub rates: Vec<u16>,
}

fn le_i32(hd: &[u8], at: usize) -> Option<i32> {
    hd.get(at .. at.checked_add(4)?).map(|bs| i32::from_le(read(bs)))
}

fn le_u16(hd: &[u8], at: usize) -> Option<u16> {
    hd.get(at .. at.checked_add(2)?).map(|bs| u16::from_le(read(bs)))
}

/// Steps through the file eight bytes at a time, skipping a word and then testing the next
/// one for the tag. Returns where the tag sits.
pub fn find_vag_info(hd: &[u8]) -> Option<usize> {
    let mut cursor = 0;
    while hd.len() - cursor >= 8 {
        cursor += 4;
        let chunk = cursor;
        cursor += 4;
        if hd[chunk..cursor] == VAGI_TAG {return Some(chunk)}
    }
    None
}

/// Sample rates of every entry in the first vag info chunk, or `None` if there isn't one.
pub fn read_sample_rates(hd: &[u8]) -> Result<Option<VagInfo>, HdError> {
    let Some(chunk) = find_vag_info(hd) else {return Ok(None)};
    let truncated = move || HdError::Truncated{chunk};

    // tag, reserved
    let mut cursor = chunk + 8;
    let max_index = le_i32(hd, cursor).ok_or_else(truncated)?;
    cursor += 4;

    let count = usize::try_from(max_index as i64 + 1).unwrap_or(0);
    let mut rates = Vec::with_capacity(count.min(hd.len() / 4));

    for index in 0..count {
        let offset = le_i32(hd, cursor).ok_or_else(truncated)?;
        cursor += 4;

        let rate = usize::try_from(chunk as i64 + offset as i64).ok()
            .and_then(|at| le_u16(hd, at))
            .ok_or(HdError::BadOffset{chunk, index, offset})?;
        rates.push(rate);
    }

    log::debug!("vag info chunk at {chunk:#x}: {} entries", rates.len());
    Ok(Some(VagInfo{chunk, rates}))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A chunk whose tag sits at `chunk`, pointing at `rates` stored just past its table.
    fn hd_with(chunk: usize, rates: &[u16]) -> Vec<u8> {
        let mut hd = vec![0xee; chunk];
        hd.extend(VAGI_TAG);
        hd.extend(0u32.to_le_bytes());
        hd.extend((rates.len() as i32 - 1).to_le_bytes());
        let table_end = 12 + 4 * rates.len();
        for i in 0..rates.len() {
            hd.extend(((table_end + 2 * i) as i32).to_le_bytes());
        }
        for rate in rates {
            hd.extend(rate.to_le_bytes());
        }
        hd
    }

    #[test]
    fn reads_rates() {
        let hd = hd_with(4, &[4410, 8800]);
        let info = read_sample_rates(&hd).unwrap().unwrap();
        assert_eq!(info, VagInfo{chunk: 4, rates: vec![4410, 8800]});
    }

    #[test]
    fn hand_built_chunk() {
        #[rustfmt::skip]
        let hd = [
            0x10, 0x00, 0x00, 0x00,     b'i', b'g', b'a', b'V',
            0x00, 0x00, 0x00, 0x00,     0x01, 0x00, 0x00, 0x00,
            0x14, 0x00, 0x00, 0x00,     0x16, 0x00, 0x00, 0x00,
            0x3a, 0x11,                 0x60, 0x22,
        ];
        let info = read_sample_rates(&hd).unwrap().unwrap();
        assert_eq!(info.chunk, 4);
        assert_eq!(info.rates, vec![4410, 8800]);
    }

    #[test]
    fn tag_found_on_stride() {
        let hd = hd_with(20, &[22050, 11025, 44100]);
        assert_eq!(find_vag_info(&hd), Some(20));
        assert_eq!(read_sample_rates(&hd).unwrap().unwrap().rates, vec![22050, 11025, 44100]);
    }

    #[test]
    fn tag_off_stride_is_missed() {
        let hd = hd_with(8, &[4410, 8800]);
        assert_eq!(find_vag_info(&hd), None);
        assert_eq!(read_sample_rates(&hd).unwrap(), None);
    }

    #[test]
    fn only_first_chunk_is_used() {
        let mut hd = hd_with(4, &[1000]);
        let second = hd_with(0, &[2000, 3000]);
        hd.resize(hd.len().next_multiple_of(8) + 4, 0);
        hd.extend(second);
        assert_eq!(read_sample_rates(&hd).unwrap().unwrap().rates, vec![1000]);
    }

    #[test]
    fn no_tag() {
        assert_eq!(read_sample_rates(&[]).unwrap(), None);
        assert_eq!(read_sample_rates(&[0; 7]).unwrap(), None);
        assert_eq!(read_sample_rates(&[0x5a; 256]).unwrap(), None);
        // tag in the final, partial step
        assert_eq!(find_vag_info(b"\0\0\0\0igaV"), Some(4));
        assert_eq!(find_vag_info(b"\0\0\0\0\0\0\0\0\0\0\0\0igaV"), Some(12));
        assert_eq!(find_vag_info(b"\0\0\0\0\0\0\0\0\0\0\0\0iga"), None);
    }

    #[test]
    fn empty_table() {
        let hd = hd_with(4, &[]);
        assert_eq!(read_sample_rates(&hd).unwrap().unwrap().rates, Vec::<u16>::new());

        let mut hd = hd_with(4, &[]);
        hd[12..16].copy_from_slice(&(-5i32).to_le_bytes());
        assert_eq!(read_sample_rates(&hd).unwrap().unwrap().rates, Vec::<u16>::new());
    }

    #[test]
    fn truncated_table() {
        let mut hd = hd_with(4, &[4410, 8800]);
        hd.truncate(18);
        assert!(matches!(read_sample_rates(&hd), Err(HdError::Truncated{chunk: 4})));

        let hd = &hd_with(4, &[4410])[..14];
        assert!(matches!(read_sample_rates(hd), Err(HdError::Truncated{chunk: 4})));
    }

    #[test]
    fn offset_out_of_bounds() {
        let mut hd = hd_with(4, &[4410, 8800]);
        hd[20..24].copy_from_slice(&1000i32.to_le_bytes());
        assert!(matches!(
            read_sample_rates(&hd),
            Err(HdError::BadOffset{chunk: 4, index: 1, offset: 1000})
        ));

        hd[16..20].copy_from_slice(&(-8i32).to_le_bytes());
        assert!(matches!(
            read_sample_rates(&hd),
            Err(HdError::BadOffset{index: 0, offset: -8, ..})
        ));
    }
}
