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

//! The modified Levinson-Durbin lattice predictor: forward analysis (and
//! in-place whitening) on the encoder side, and the matching inverse
//! lattice synthesis on the decoder side.

use std::num::Wrapping;

use crate::constants::{LATTICE_FACTOR, LATTICE_SHIFT};
use crate::fixedpoint::shift_down;

/// Runs the modified Levinson-Durbin recursion over `window`, writing
/// `out.len()` quantized reflection coefficients to `out` and whitening
/// `window` in place (the residual is read back from `window` by the
/// caller; only the coefficients are returned).
///
/// `window` must hold `channels`-interleaved samples; `tap_quant[i]` is
/// the fixed per-tap quantizer divisor for coefficient `i`.
pub fn modified_levinson_durbin(
    window: &mut [i32],
    out: &mut [i32],
    channels: usize,
    tap_quant: &[i32],
) {
    let window_entries = window.len();
    let mut state = window.to_vec();

    for i in 0..out.len() {
        let step = (i + 1) * channels;
        let count = window_entries.saturating_sub(step);

        let mut xx = 0.0f64;
        let mut xy = 0.0f64;
        for j in 0..count {
            let x_value = window[step + j] as f64;
            let s_value = state[j] as f64;
            xx += s_value * s_value;
            xy += x_value * s_value;
        }

        let tq = tap_quant[i];
        let k = if xx == 0.0 {
            0
        } else {
            let raw = (-xy / xx * LATTICE_FACTOR as f64 / tq as f64 + 0.5).floor() as i32;
            let bound = LATTICE_FACTOR / tq;
            raw.clamp(-bound, bound)
        };

        out[i] = k;
        let kq = Wrapping(k * tq);

        for j in 0..count {
            let x_value = Wrapping(window[step + j]);
            let s_value = Wrapping(state[j]);
            window[step + j] = (x_value + shift_down(kq * s_value, LATTICE_SHIFT)).0;
            state[j] = (s_value + shift_down(kq * x_value, LATTICE_SHIFT)).0;
        }
    }
}

/// Warms up the decoder's lattice synthesis `state` from the dequantized
/// reflection coefficients `k`, ahead of decoding a block with
/// [`predictor_calc_error`].
pub fn predictor_init_state(k: &[i32], state: &mut [i32]) {
    let order = state.len();
    if order < 2 {
        return;
    }

    for i in (0..order - 1).rev() {
        let mut x = Wrapping(state[i]);
        for (j, p) in (i + 1..order).enumerate() {
            let tmp = x + shift_down(Wrapping(k[j]) * Wrapping(state[p]), LATTICE_SHIFT);
            state[p] = (Wrapping(state[p]) + shift_down(Wrapping(k[j]) * x, LATTICE_SHIFT)).0;
            x = tmp;
        }
    }
}

/// Synthesizes one sample from one downsampled residual `error`,
/// advancing the lattice `state` in place. Returns the reconstructed
/// (pre-decorrelation, pre-shift) sample, clamped to
/// `±(SAMPLE_FACTOR << 16)` to bound drift.
pub fn predictor_calc_error(k: &[i32], state: &mut [i32], error: i32) -> i32 {
    let order = state.len();
    let mut x =
        (Wrapping(error) - shift_down(Wrapping(k[order - 1]) * Wrapping(state[order - 1]), LATTICE_SHIFT)).0;

    for i in (0..order - 1).rev() {
        let k_value = k[i];
        let state_value = state[i];
        x = (Wrapping(x) - shift_down(Wrapping(k_value) * Wrapping(state_value), LATTICE_SHIFT)).0;
        state[i + 1] = (Wrapping(state_value) + shift_down(Wrapping(k_value) * Wrapping(x), LATTICE_SHIFT)).0;
    }

    let bound = crate::constants::SAMPLE_FACTOR << 16;
    x = x.clamp(-bound, bound);
    state[0] = x;
    x
}
