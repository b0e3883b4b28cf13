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

//! The frame encoder: windowing, Levinson-Durbin analysis, downsampling,
//! rate control and range-coded emission, tying together every other
//! module in this crate.

use std::num::Wrapping;

use log::trace;

use crate::constants::{tap_quant_table, BASE_QUANT, RATE_VARIATION, SAMPLE_FACTOR, SAMPLE_SHIFT};
use crate::decorrelate::decorrelate;
use crate::error::{Result, SonicError};
use crate::header::{StreamConfig, EXTRADATA_SIZE};
use crate::predictor::modified_levinson_durbin;
use crate::range_coder::RangeEncoder;
use crate::symbol::{intlist_write, put_symbol_unsigned, SYMBOL_STATE_SIZE};

/// Encodes a sequence of fixed-size PCM frames into Sonic packets.
///
/// Each instance owns every scratch buffer it needs and carries the
/// `tail` of whitened samples from one frame's analysis window into the
/// next's; feeding frames out of order silently corrupts that context.
pub struct SonicEncoder {
    config: StreamConfig,
    tap_quant: Vec<i32>,
    tail: Vec<i32>,
    window: Vec<i32>,
    coeffs: Vec<i32>,
    coded_samples: Vec<Vec<i32>>,
}

impl SonicEncoder {
    /// Builds an encoder for `config`, pre-allocating every scratch
    /// buffer its frames will need.
    pub fn new(config: StreamConfig) -> Result<Self> {
        if config.channels > crate::constants::MAX_CHANNELS {
            return Err(SonicError::InvalidArgument("more than two channels is not supported"));
        }
        config.validate(false)?;

        let tap_quant = tap_quant_table(config.num_taps as usize);
        let tail_size = config.tail_size();
        let frame_size = config.frame_size();

        Ok(SonicEncoder {
            tail: vec![0; tail_size],
            window: vec![0; 2 * tail_size + frame_size],
            coeffs: vec![0; config.num_taps as usize],
            coded_samples: vec![vec![0; config.block_align()]; config.channels as usize],
            tap_quant,
            config,
        })
    }

    /// The 16-byte extradata a container should store alongside the
    /// stream; a decoder needs it to reconstruct this encoder's
    /// [`StreamConfig`].
    pub fn extradata(&self) -> [u8; EXTRADATA_SIZE] {
        self.config.emit_header()
    }

    /// Encodes one frame of exactly `frame_size()` interleaved int16
    /// samples into a packet.
    pub fn encode_frame(&mut self, samples: &[i16]) -> Result<Vec<u8>> {
        let channels = self.config.channels as usize;
        let frame_size = self.config.frame_size();
        let block_align = self.config.block_align();
        let downsampling = self.config.downsampling as usize;
        let tail_size = self.config.tail_size();

        if samples.len() != frame_size {
            return Err(SonicError::InvalidArgument("frame length does not match frame_size"));
        }

        let mut frame: Vec<i32> = samples.iter().map(|&s| s as i32).collect();
        if !self.config.lossless {
            for s in frame.iter_mut() {
                *s <<= SAMPLE_SHIFT;
            }
        }
        decorrelate(self.config.decorrelation, channels, &mut frame);

        self.window[..tail_size].copy_from_slice(&self.tail);
        self.window[tail_size..tail_size + frame_size].copy_from_slice(&frame);
        for v in self.window[tail_size + frame_size..].iter_mut() {
            *v = 0;
        }
        self.tail.copy_from_slice(&frame[frame_size - tail_size..]);

        modified_levinson_durbin(&mut self.window, &mut self.coeffs, channels, &self.tap_quant);

        let mut enc = RangeEncoder::with_capacity(frame_size * 5 + 1000);
        let mut state = [128u8; SYMBOL_STATE_SIZE];

        intlist_write(&mut enc, &mut state, &self.coeffs, 0);

        for ch in 0..channels {
            let base = tail_size + ch;
            for i in 0..block_align {
                let mut sum = Wrapping(0i32);
                for j in 0..downsampling {
                    let idx = base + (i * downsampling + j) * channels;
                    sum += Wrapping(self.window[idx]);
                }
                self.coded_samples[ch][i] = sum.0;
            }
        }

        let quant = if self.config.lossless {
            1u32
        } else {
            estimate_quantizer(&self.coded_samples)
        };

        if !self.config.lossless {
            put_symbol_unsigned(&mut enc, &mut state, quant);
        }
        let quant_scaled = if self.config.lossless { 1i64 } else { quant as i64 * SAMPLE_FACTOR as i64 };

        for ch in 0..channels {
            let residuals: Vec<i32> = if self.config.lossless {
                self.coded_samples[ch].clone()
            } else {
                self.coded_samples[ch]
                    .iter()
                    .map(|&n| rounded_div(n as i64, quant_scaled) as i32)
                    .collect()
            };
            intlist_write(&mut enc, &mut state, &residuals, 0);
        }

        let packet = enc.terminate();
        trace!("encoded frame into {} bytes (quant={quant})", packet.len());
        Ok(packet)
    }
}

/// `quant = clip(⌊BASE_QUANT · E2 / SAMPLE_FACTOR⌋, 1, 65534)`, where `E2`
/// is the RMS of the downsampled residual, boosted by `RATE_VARIATION`
/// when the signal is peakier than its mean-absolute-value estimate.
fn estimate_quantizer(coded_samples: &[Vec<i32>]) -> u32 {
    let mut sum_sq = 0f64;
    let mut sum_abs = 0f64;
    let mut count = 0usize;
    for channel in coded_samples {
        for &v in channel {
            let f = v as f64;
            sum_sq += f * f;
            sum_abs += f.abs();
            count += 1;
        }
    }
    let count = count.max(1) as f64;

    let mut e2 = (sum_sq / count).sqrt();
    let e1 = std::f64::consts::SQRT_2 * (sum_abs / count);
    if e2 > e1 {
        e2 += (e2 - e1) * RATE_VARIATION;
    }

    let raw = (BASE_QUANT * e2 / SAMPLE_FACTOR as f64).floor() as i64;
    raw.clamp(1, 65534) as u32
}

/// Symmetric rounding division: `sign(n) · ⌊(|n| + d/2) / d⌋`.
fn rounded_div(n: i64, d: i64) -> i64 {
    let sign = if n < 0 { -1 } else { 1 };
    sign * ((n.abs() + d / 2) / d)
}
