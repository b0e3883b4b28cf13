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

//! Fixed-point scales, rate-control constants and the sample rate table.

/// Right-shift applied to quantized reflection coefficients.
pub const LATTICE_SHIFT: u32 = 10;

/// `2^LATTICE_SHIFT`, the fixed-point scale of reflection coefficients.
pub const LATTICE_FACTOR: i32 = 1 << LATTICE_SHIFT;

/// Extra fixed-point precision applied to samples in lossy mode.
pub const SAMPLE_SHIFT: u32 = 4;

/// `2^SAMPLE_SHIFT`.
pub const SAMPLE_FACTOR: i32 = 1 << SAMPLE_SHIFT;

/// Base multiplier in the lossy rate-control quantizer estimate.
pub const BASE_QUANT: f64 = 0.6;

/// Scales how much the quantizer estimate is pushed up for peaky signals.
pub const RATE_VARIATION: f64 = 3.0;

/// Maximum number of range-coder bytes the decoder may read past the end
/// of the packet before a frame is rejected as invalid data.
pub const MAX_OVERREAD: u32 = 8;

/// Maximum supported channel count (mono or stereo only).
pub const MAX_CHANNELS: u8 = 2;

/// Sample rates addressable by the 4-bit `samplerate_index` header field,
/// in index order.
pub const SAMPLE_RATE_TABLE: [u32; 9] =
    [44100, 22050, 11025, 96000, 48000, 32000, 24000, 16000, 8000];

/// Looks up the 4-bit index for a sample rate, if it is one of the nine
/// rates the header can express.
pub fn samplerate_index(samplerate: u32) -> Option<u8> {
    SAMPLE_RATE_TABLE.iter().position(|&sr| sr == samplerate).map(|i| i as u8)
}

/// Integer square root of a non-negative value, via Newton's method.
///
/// Used to build the per-tap quantizer table `tap_quant[i] = isqrt(i + 1)`.
/// Mirrors `ff_sqrt`'s integer semantics: the largest `r` with `r*r <= n`.
pub fn isqrt(n: u32) -> u32 {
    if n == 0 {
        return 0;
    }
    let mut x = n;
    let mut y = (x + 1) / 2;
    while y < x {
        x = y;
        y = (x + n / x) / 2;
    }
    x
}

/// Builds the fixed `tap_quant[i] = isqrt(i + 1)` table for a given order.
pub fn tap_quant_table(num_taps: usize) -> Vec<i32> {
    (0..num_taps).map(|i| isqrt(i as u32 + 1) as i32).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isqrt_matches_float_sqrt_for_small_values() {
        for n in 0u32..10_000 {
            let expected = (n as f64).sqrt() as u32;
            // isqrt and float-sqrt-then-truncate can differ by one ulp right
            // at a perfect square boundary; assert the defining property
            // instead of bit-for-bit agreement with `f64::sqrt`.
            let r = isqrt(n);
            assert!(r * r <= n, "isqrt({n}) = {r}, but {r}*{r} > {n}");
            assert!((r + 1) * (r + 1) > n, "isqrt({n}) = {r} is not the largest root");
            let _ = expected;
        }
    }

    #[test]
    fn tap_quant_table_matches_isqrt() {
        let table = tap_quant_table(32);
        assert_eq!(table.len(), 32);
        assert_eq!(table[0], 1); // isqrt(1)
        assert_eq!(table[3], 2); // isqrt(4)
        assert_eq!(table[8], 3); // isqrt(9)
    }

    #[test]
    fn samplerate_index_round_trips() {
        for (i, &sr) in SAMPLE_RATE_TABLE.iter().enumerate() {
            assert_eq!(samplerate_index(sr), Some(i as u8));
        }
        assert_eq!(samplerate_index(12345), None);
    }
}
