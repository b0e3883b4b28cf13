// Sonic codec -- a block-based lossless/lossy audio codec
// Copyright (C) 2014-2015 Ruud van Asseldonk
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Signed (and unsigned) integer symbols coded over the [`RangeEncoder`] /
//! [`RangeDecoder`] using an Elias-gamma-like unary/binary split, per the
//! adaptive states laid out in the 32-byte per-frame `state` array.

use crate::error::{Result, SonicError};
use crate::range_coder::{RangeDecoder, RangeEncoder};

/// Number of adaptive state bytes a symbol stream needs: one for the
/// zero flag, ten for the unary prefix, eleven for the sign, and ten for
/// the binary suffix.
pub const SYMBOL_STATE_SIZE: usize = 32;

/// The longest unary prefix `get_symbol` will accept before failing.
const MAX_UNARY_PREFIX: u32 = 32;

/// Encodes a signed integer as a sequence of adaptive-probability bits.
pub fn put_symbol(enc: &mut RangeEncoder, state: &mut [u8; SYMBOL_STATE_SIZE], v: i32) {
    put_symbol_impl(enc, state, v, true)
}

/// Encodes a non-negative integer, omitting the sign bit. Used only for
/// the per-frame quantizer.
pub fn put_symbol_unsigned(enc: &mut RangeEncoder, state: &mut [u8; SYMBOL_STATE_SIZE], v: u32) {
    put_symbol_impl(enc, state, v as i32, false)
}

fn put_symbol_impl(
    enc: &mut RangeEncoder,
    state: &mut [u8; SYMBOL_STATE_SIZE],
    v: i32,
    signed: bool,
) {
    if v == 0 {
        enc.encode_bit(&mut state[0], true);
        return;
    }

    enc.encode_bit(&mut state[0], false);

    let a = v.unsigned_abs();
    let e = 31 - a.leading_zeros(); // floor(log2(a)), a >= 1

    for i in 0..e {
        enc.encode_bit(&mut state[1 + (i as usize).min(9)], true);
    }
    enc.encode_bit(&mut state[1 + (e as usize).min(9)], false);

    for i in (0..e).rev() {
        let bit = (a >> i) & 1 == 1;
        enc.encode_bit(&mut state[22 + (i as usize).min(9)], bit);
    }

    if signed {
        enc.encode_bit(&mut state[11 + (e as usize).min(10)], v < 0);
    }
}

/// Decodes a signed integer symbol, failing if its unary prefix exceeds
/// [`MAX_UNARY_PREFIX`] bits.
pub fn get_symbol(dec: &mut RangeDecoder, state: &mut [u8; SYMBOL_STATE_SIZE]) -> Result<i32> {
    get_symbol_impl(dec, state, true)
}

/// Decodes a non-negative integer symbol (no sign bit read).
pub fn get_symbol_unsigned(
    dec: &mut RangeDecoder,
    state: &mut [u8; SYMBOL_STATE_SIZE],
) -> Result<u32> {
    get_symbol_impl(dec, state, false).map(|v| v as u32)
}

fn get_symbol_impl(
    dec: &mut RangeDecoder,
    state: &mut [u8; SYMBOL_STATE_SIZE],
    signed: bool,
) -> Result<i32> {
    if dec.decode_bit(&mut state[0]) {
        return Ok(0);
    }

    let mut e: u32 = 0;
    while dec.decode_bit(&mut state[1 + (e as usize).min(9)]) {
        e += 1;
        if e > MAX_UNARY_PREFIX {
            return Err(SonicError::InvalidData("symbol unary prefix exceeds 32 bits"));
        }
    }

    let mut a: u64 = 1;
    for i in (0..e).rev() {
        let bit = dec.decode_bit(&mut state[22 + (i as usize).min(9)]) as u64;
        a = (a << 1) | bit;
    }

    let is_negative = signed && dec.decode_bit(&mut state[11 + (e as usize).min(10)]);
    let magnitude = a as u32;
    let v = if is_negative { (magnitude as i32).wrapping_neg() } else { magnitude as i32 };
    Ok(v)
}

/// Applies [`put_symbol`] to every element of `values`.
///
/// `base_2_part` mirrors [`intlist_read`]'s signature but is unused by
/// this codec; it is reserved for a Golomb-style encoding this core does
/// not implement.
pub fn intlist_write(
    enc: &mut RangeEncoder,
    state: &mut [u8; SYMBOL_STATE_SIZE],
    values: &[i32],
    _base_2_part: i32,
) {
    for &v in values {
        put_symbol(enc, state, v);
    }
}

/// Applies [`get_symbol`] to fill every element of `out`.
pub fn intlist_read(
    dec: &mut RangeDecoder,
    state: &mut [u8; SYMBOL_STATE_SIZE],
    out: &mut [i32],
    _base_2_part: i32,
) -> Result<()> {
    for slot in out.iter_mut() {
        *slot = get_symbol(dec, state)?;
    }
    Ok(())
}
