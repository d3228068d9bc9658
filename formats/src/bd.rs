//! The `.bd` body: ADPCM clips back to back, separated by rows of zeroes.

use std::ops::Range;

pub const ROW_LEN: usize = 16;

fn is_gap(row: &[u8]) -> bool {
    row.iter().all(|&b| b == 0)
}

/// Byte ranges of each clip in the bank, in order. Runs of zero rows count as one gap, and
/// empty clips are never produced.
pub fn clip_ranges(bd: &[u8]) -> Vec<Range<usize>> {
    let mut clips = Vec::new();
    let mut start = 0;

    for (i, row) in bd.chunks(ROW_LEN).enumerate() {
        if !is_gap(row) {continue}
        let at = i * ROW_LEN;
        if at > start {clips.push(start..at)}
        start = at + row.len();
    }

    if bd.len() > start {clips.push(start..bd.len())}
    clips
}

pub fn split(bd: &[u8]) -> Vec<&[u8]> {
    clip_ranges(bd).into_iter()
        .map(|range| &bd[range])
        .collect()
}
