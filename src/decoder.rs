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

//! The frame decoder: the exact inverse of [`crate::encoder::SonicEncoder`]
//! -- parse, dequantize, synthesize per channel through the inverse
//! lattice, undo decorrelation, and clip back to int16.

use std::num::Wrapping;

use log::trace;

use crate::constants::{tap_quant_table, MAX_OVERREAD, SAMPLE_FACTOR, SAMPLE_SHIFT};
use crate::decorrelate::undo_decorrelate;
use crate::error::{Result, SonicError};
use crate::fixedpoint::shift;
use crate::header::StreamConfig;
use crate::predictor::{predictor_calc_error, predictor_init_state};
use crate::range_coder::RangeDecoder;
use crate::symbol::{get_symbol_unsigned, intlist_read, SYMBOL_STATE_SIZE};

/// Decodes a sequence of Sonic packets back into fixed-size PCM frames.
///
/// Carries `predictor_state` across calls the way the encoder carries
/// `tail`; packets from a stream must be fed in order.
pub struct SonicDecoder {
    config: StreamConfig,
    tap_quant: Vec<i32>,
    predictor_k: Vec<i32>,
    predictor_state: Vec<Vec<i32>>,
    int_samples: Vec<i32>,
    coded_samples: Vec<i32>,
}

impl SonicDecoder {
    /// Builds a decoder directly from a [`StreamConfig`] (already
    /// validated by the caller, e.g. constructed by hand in tests).
    pub fn new(config: StreamConfig) -> Result<Self> {
        config.validate(true)?;

        let num_taps = config.num_taps as usize;
        let channels = config.channels as usize;
        Ok(SonicDecoder {
            tap_quant: tap_quant_table(num_taps),
            predictor_k: vec![0; num_taps],
            predictor_state: vec![vec![0; num_taps]; channels],
            int_samples: vec![0; config.frame_size()],
            coded_samples: vec![0; config.block_align()],
            config,
        })
    }

    /// Parses a stream's extradata and builds a decoder for it.
    pub fn from_extradata(extradata: &[u8]) -> Result<Self> {
        Self::new(StreamConfig::parse_header(extradata)?)
    }

    /// The stream configuration this decoder was built from.
    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Decodes one packet into `frame_size()` interleaved int16 samples.
    pub fn decode_frame(&mut self, packet: &[u8]) -> Result<Vec<i16>> {
        let channels = self.config.channels as usize;
        let frame_size = self.config.frame_size();
        let block_align = self.config.block_align();
        let downsampling = self.config.downsampling as usize;
        let num_taps = self.config.num_taps as usize;

        let mut dec = RangeDecoder::new(packet);
        let mut state = [128u8; SYMBOL_STATE_SIZE];

        let mut raw_k = vec![0i32; num_taps];
        intlist_read(&mut dec, &mut state, &mut raw_k, 0)?;
        for i in 0..num_taps {
            self.predictor_k[i] = (Wrapping(raw_k[i]) * Wrapping(self.tap_quant[i])).0;
        }

        let quant_scaled: i32 = if self.config.lossless {
            1
        } else {
            let quant = get_symbol_unsigned(&mut dec, &mut state)?;
            (quant as i32).wrapping_mul(SAMPLE_FACTOR)
        };

        for ch in 0..channels {
            if dec.overread > MAX_OVERREAD {
                return Err(SonicError::InvalidData("range coder overread exceeds bound"));
            }

            predictor_init_state(&self.predictor_k, &mut self.predictor_state[ch]);

            intlist_read(&mut dec, &mut state, &mut self.coded_samples[..block_align], 0)?;

            for i in 0..block_align {
                for j in 0..downsampling {
                    let error = if j + 1 == downsampling {
                        (Wrapping(self.coded_samples[i]) * Wrapping(quant_scaled)).0
                    } else {
                        0
                    };
                    let sample = predictor_calc_error(&self.predictor_k, &mut self.predictor_state[ch], error);
                    let step = i * downsampling + j;
                    self.int_samples[step * channels + ch] = sample;
                }
            }

            for i in 0..num_taps {
                let idx = frame_size - (i + 1) * channels + ch;
                self.predictor_state[ch][i] = self.int_samples[idx];
            }
        }

        undo_decorrelate(self.config.decorrelation, channels, &mut self.int_samples);

        let mut out = Vec::with_capacity(frame_size);
        for &v in &self.int_samples {
            let v = if self.config.lossless { v } else { shift(v, SAMPLE_SHIFT) };
            out.push(v.clamp(i16::MIN as i32, i16::MAX as i32) as i16);
        }

        trace!("decoded packet of {} bytes into {} samples", packet.len(), out.len());
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decorrelate::Decorrelation;
    use crate::encoder::SonicEncoder;

    fn config(lossless: bool, num_taps: u32) -> StreamConfig {
        StreamConfig {
            minor_version: 0,
            channels: 2,
            samplerate: 44100,
            lossless,
            decorrelation: Decorrelation::MidSide,
            downsampling: 1,
            num_taps,
        }
    }

    #[test]
    fn lossless_stereo_silence_round_trips() {
        let c = config(true, 32);
        let mut enc = SonicEncoder::new(c).unwrap();
        let mut dec = SonicDecoder::new(c).unwrap();

        let frame_size = c.frame_size();
        let silence = vec![0i16; frame_size];
        let packet = enc.encode_frame(&silence).unwrap();
        let decoded = dec.decode_frame(&packet).unwrap();
        assert_eq!(decoded, silence);
    }

    #[test]
    fn lossless_mono_impulse_round_trips() {
        let c = StreamConfig {
            minor_version: 0,
            channels: 1,
            samplerate: 44100,
            lossless: true,
            decorrelation: Decorrelation::None,
            downsampling: 1,
            num_taps: 32,
        };
        let mut enc = SonicEncoder::new(c).unwrap();
        let mut dec = SonicDecoder::new(c).unwrap();

        let frame_size = c.frame_size();
        let mut impulse = vec![0i16; frame_size];
        impulse[0] = 10000;
        let packet = enc.encode_frame(&impulse).unwrap();
        let decoded = dec.decode_frame(&packet).unwrap();
        assert_eq!(decoded, impulse);
    }

    #[test]
    fn overread_beyond_bound_is_invalid_data() {
        let c = config(true, 32);
        let mut dec = SonicDecoder::new(c).unwrap();
        // A too-short buffer forces every read past the end to overread.
        let result = dec.decode_frame(&[]);
        assert!(matches!(result, Err(SonicError::InvalidData(_))));
    }

    #[test]
    fn two_consecutive_frames_round_trip() {
        let c = config(true, 32);
        let mut enc = SonicEncoder::new(c).unwrap();
        let mut dec = SonicDecoder::new(c).unwrap();
        let frame_size = c.frame_size();

        let frame1: Vec<i16> = (0..frame_size).map(|i| ((i * 13) % 4000) as i16 - 2000).collect();
        let frame2: Vec<i16> = (0..frame_size).map(|i| ((i * 29) % 3000) as i16 - 1500).collect();

        let packet1 = enc.encode_frame(&frame1).unwrap();
        let packet2 = enc.encode_frame(&frame2).unwrap();

        assert_eq!(dec.decode_frame(&packet1).unwrap(), frame1);
        assert_eq!(dec.decode_frame(&packet2).unwrap(), frame2);
    }
}
