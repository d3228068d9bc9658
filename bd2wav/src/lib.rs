//! Converts PS2 `.bd` sound banks into one `.wav` file per clip, taking sample rates from the
//! bank's `.hd` header when there is one.

pub mod convert;
pub mod rates;
