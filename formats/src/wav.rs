//! Minimal RIFF/WAVE writer for mono 16-bit PCM.

use {
    bytemuck as bm,
    std::io::Write,
};

pub const HEADER_LEN: usize = 44;

#[derive(Debug, thiserror::Error)]
pub enum WavError {
    #[error("{samples} samples won't fit in a wav file")]
    TooLong { samples: usize },
    #[error("sample rate {rate}Hz is too high for a wav file")]
    RateTooHigh { rate: u32 },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub fn header(rate: u32, data_len: u32) -> Result<[u8; HEADER_LEN], WavError> {
    let byte_rate = rate.checked_mul(2)
        .ok_or(WavError::RateTooHigh{rate})?;
    let riff_len = data_len.checked_add(HEADER_LEN as u32 - 8)
        .ok_or(WavError::TooLong{samples: data_len as usize / 2})?;

    let riff_head = [
        u32::from_le_bytes(*b"RIFF"),
        riff_len,
        u32::from_le_bytes(*b"WAVE"),
    ];

    let fmt_chunk = [
        u32::from_le_bytes(*b"fmt "),
        16,
        0x0001_0001, // pcm, mono
        rate,
        byte_rate,
        0x0010_0002, // 2-byte frames, 16 bits
    ];

    let data_head = [
        u32::from_le_bytes(*b"data"),
        data_len,
    ];

    let mut out = [0; HEADER_LEN];
    let (riff, rest) = out.split_at_mut(12);
    let (fmt, data) = rest.split_at_mut(24);
    riff.copy_from_slice(bm::bytes_of(&riff_head.map(u32::to_le)));
    fmt .copy_from_slice(bm::bytes_of(&fmt_chunk.map(u32::to_le)));
    data.copy_from_slice(bm::bytes_of(&data_head.map(u32::to_le)));
    Ok(out)
}

pub fn write_wav<W>(mut out: W, samples: &[i16], rate: u32) -> Result<W, WavError> where
    W: Write,
{
    let data_len = samples.len().checked_mul(2)
        .and_then(|len| u32::try_from(len).ok())
        .ok_or(WavError::TooLong{samples: samples.len()})?;

    out.write_all(&header(rate, data_len)?)?;
    let pcm = samples.iter()
        .flat_map(|sample| sample.to_le_bytes())
        .collect::<Vec<u8>>();
    out.write_all(&pcm)?;
    Ok(out)
}
