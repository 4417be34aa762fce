//! Bit-angle-modulation dimming schedules.
//!
//! A refresh cycle consists of `2^BITS` sub-cycles. For every level the
//! schedule holds a `2^BITS`-bit mask; the LED is lit in sub-cycle `s` when bit
//! `s` of the mask is set. The lit sub-cycles are spread over the cycle
//! instead of being grouped by binary weight.
//!
//! Four-bit schedule, sub-cycles listed from the most significant bit:
//!
//! ```text
//! val   FEDC BA98 7654 3210
//! 0000  0000 0000 0000 0000
//! 0001  1000 0000 0000 0000
//! 0010  1000 0000 1000 0000
//! 0011  1000 0010 0001 0000
//!
//! 0100  1000 1000 1000 1000
//! 0101  1000 1001 0010 0100
//! 0110  1001 0010 1001 0010
//! 0111  1001 0101 0100 1010
//!
//! 1000  0110 1010 1011 0101
//! 1001  0110 1101 0110 1101
//! 1010  0111 0110 1101 1011
//! 1011  0111 0111 0111 0111
//!
//! 1100  0111 1101 1110 1111
//! 1101  0111 1111 0111 1111
//! 1110  0111 1111 1111 1111
//! 1111  1111 1111 1111 1111
//! ```
//!
//! The upper half of the four-bit table (and the top entry of the two-bit
//! table) lights one sub-cycle more than its level so that full scale is on
//! for the whole cycle.

/// Two-bit schedule, four sub-cycles.
pub const SCHEDULE_2: [u16; 4] = [0x0, 0x8, 0xa, 0xf];

/// Four-bit schedule, sixteen sub-cycles.
pub const SCHEDULE_4: [u16; 16] = [
    0x0000, 0x8000, 0x8080, 0x8210, //
    0x8888, 0x8924, 0x9292, 0x954a, //
    0x6ab5, 0x6d6d, 0x76db, 0x7777, //
    0x7def, 0x7f7f, 0x7fff, 0xffff,
];

/// Returns the schedule for a colour depth.
///
/// # Panics
///
/// Panics for depths other than 2 or 4 bits. Types parameterized by `BITS`
/// reject those depths at compile time.
#[must_use]
pub const fn schedule(bits: u8) -> &'static [u16] {
    match bits {
        2 => &SCHEDULE_2,
        4 => &SCHEDULE_4,
        _ => panic!("only 2 or 4 bits per channel are supported"),
    }
}

/// Returns whether `level` is lit during `sub_cycle`.
#[inline]
#[must_use]
pub const fn is_lit(bits: u8, level: u8, sub_cycle: u8) -> bool {
    schedule(bits)[level as usize] & (1 << sub_cycle) != 0
}

/// Number of sub-cycles in which `level` is lit.
#[must_use]
pub const fn pulse_count(bits: u8, level: u8) -> u32 {
    schedule(bits)[level as usize].count_ones()
}
