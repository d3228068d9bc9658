//! Readers and writers for the files around a PS2 sound bank.

pub mod bd;
pub mod hd;
pub mod wav;
