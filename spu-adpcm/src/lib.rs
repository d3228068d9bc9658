//! Decoder for the SPU's 4-bit ADPCM, as found in PS2 `.bd` sound banks.
//!
//! A clip is a run of 16-byte frames. Each frame carries a shift/filter header byte, a flag
//! byte, and 28 packed 4-bit residuals which are run through a two-tap recursive filter.

use bytemuck as bm;

pub const FRAME_LEN: usize = 16;
pub const SAMPLES_PER_FRAME: usize = 28;

/// Flag byte value that marks the end of a clip.
pub const END_FLAG: u8 = 7;

/// Filter coefficient pairs, indexed by the frame's filter nibble.
pub const COEFFS: [[f64; 2]; 5] = [
    [  0. / 64.,   0. / 64.],
    [ 60. / 64.,   0. / 64.],
    [115. / 64., -52. / 64.],
    [ 98. / 64., -55. / 64.],
    [122. / 64., -60. / 64.],
];

pub type Frame = [u8; FRAME_LEN];

/// Recursive filter history. Kept unclamped; only the emitted samples are clamped.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Filter {
    pub hist1: f64,
    pub hist2: f64,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&mut self, residual: i32, [c0, c1]: [f64; 2]) -> i16 {
        let sample = residual as f64 + self.hist1 * c0 + self.hist2 * c1;
        self.hist2 = self.hist1;
        self.hist1 = sample;
        sample.clamp(i16::MIN as f64, i16::MAX as f64) as i16
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub shift:  u8,
    pub filter: u8,
    pub flags:  u8,
}

impl Header {
    pub fn parse(&[sf, flags, ..]: &Frame) -> Self {
        let shift  = (sf >> 0) & 0xf;
        let filter = (sf >> 4) & 0xf;
        Header{shift, filter, flags}
    }

    pub fn is_end(&self) -> bool {
        self.flags == END_FLAG
    }

    pub fn coeffs(&self) -> [f64; 2] {
        COEFFS[(self.filter as usize).min(COEFFS.len() - 1)]
    }
}

/// Unpacks the 28 residual nibbles, low nibble first.
pub fn nibbles(frame: &Frame) -> [u8; SAMPLES_PER_FRAME] {
    let mut out = [0; SAMPLES_PER_FRAME];
    for (pair, &byte) in out.chunks_exact_mut(2).zip(&frame[2..]) {
        pair[0] = byte & 0xf;
        pair[1] = byte >> 4;
    }
    out
}

/// Places a nibble in the top of a 16-bit word, sign-extends it to 32 bits and scales it down.
pub fn expand(nibble: u8, shift: u8) -> i32 {
    let word = (nibble as u32 & 0xf) << 12;
    let wide = if word & 0x8000 != 0 {word | 0xffff_0000} else {word};
    (wide as i32) >> (shift & 0xf)
}

/// Decodes one frame, or returns `None` if it's an end-of-clip frame.
pub fn decode_frame(frame: &Frame, filter: &mut Filter) -> Option<[i16; SAMPLES_PER_FRAME]> {
    let header = Header::parse(frame);
    if header.is_end() {return None}
    let coeffs = header.coeffs();
    Some(nibbles(frame).map(|nibble| filter.step(expand(nibble, header.shift), coeffs)))
}

/// Whole frames of a clip; a short tail is dropped.
pub fn frames(clip: &[u8]) -> &[Frame] {
    let whole = clip.len() / FRAME_LEN * FRAME_LEN;
    bm::cast_slice(&clip[..whole])
}

/// Yields one block of samples per frame, stopping for good at an end frame.
pub struct ClipDecoder<'a> {
    frames: std::slice::Iter<'a, Frame>,
    filter: Filter,
}

impl<'a> ClipDecoder<'a> {
    pub fn new(clip: &'a [u8]) -> Self {
        ClipDecoder {
            frames: frames(clip).iter(),
            filter: Filter::new(),
        }
    }

    pub fn history(&self) -> Filter {
        self.filter
    }
}

impl Iterator for ClipDecoder<'_> {
    type Item = [i16; SAMPLES_PER_FRAME];

    fn next(&mut self) -> Option<Self::Item> {
        let frame = self.frames.next()?;
        let samples = decode_frame(frame, &mut self.filter);
        if samples.is_none() {
            self.frames = [].iter();
        }
        samples
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.frames.len()))
    }
}

impl std::iter::FusedIterator for ClipDecoder<'_> {}

pub fn decode_clip(clip: &[u8]) -> Vec<i16> {
    let mut pcm = Vec::with_capacity(clip.len() / FRAME_LEN * SAMPLES_PER_FRAME);
    ClipDecoder::new(clip).for_each(|block| pcm.extend_from_slice(&block));
    pcm
}
