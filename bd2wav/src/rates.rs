//! Matching sample rates up with clips.

pub const DEFAULT_RATE: u32 = 32_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateSource {
    /// One rate for every clip; the header isn't consulted.
    Override(u32),
    /// Per-clip rates from the header, in clip order.
    Header(Vec<u16>),
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    None,
    /// No rates to go on; every clip got the default.
    Default(u32),
    /// Only `given` rates for more clips than that; the rest repeat `last`.
    PaddedFrom { given: usize, last: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub rates: Vec<u32>,
    pub fallback: Fallback,
}

/// Exactly `count` rates. Surplus header entries are dropped without comment.
pub fn resolve(count: usize, source: &RateSource, default_rate: u32) -> Resolved {
    match source {
        &RateSource::Override(rate) => Resolved {
            rates: vec![rate; count],
            fallback: Fallback::None,
        },

        RateSource::Header(given) if !given.is_empty() => {
            let last = given[given.len() - 1] as u32;
            let rates = given.iter()
                .map(|&rate| rate as u32)
                .chain(std::iter::repeat(last))
                .take(count)
                .collect();
            let fallback =
                if given.len() < count { Fallback::PaddedFrom{given: given.len(), last} }
                else                   { Fallback::None };
            Resolved{rates, fallback}
        }

        _ => Resolved {
            rates: vec![default_rate; count],
            fallback: Fallback::Default(default_rate),
        },
    }
}
