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

//! Stream configuration and the MSB-first "extradata" bit stream that
//! carries it between encoder and decoder.

use crate::constants::{samplerate_index, SAMPLE_RATE_TABLE};
use crate::decorrelate::Decorrelation;
use crate::error::{Result, SonicError};

/// The extradata is always padded out to 16 bytes.
pub const EXTRADATA_SIZE: usize = 16;

const STREAM_VERSION: u8 = 2;

/// Every stream-level parameter that is fixed for the lifetime of a
/// stream and carried in its header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConfig {
    pub minor_version: u8,
    pub channels: u8,
    pub samplerate: u32,
    pub lossless: bool,
    pub decorrelation: Decorrelation,
    pub downsampling: u8,
    pub num_taps: u32,
}

impl StreamConfig {
    /// Validates channel/decorrelation consistency, a non-zero downsampling
    /// factor, a `num_taps` that is a multiple of 32 and (for the decoder's
    /// stricter bound) at most 128, and `num_taps · channels ≤ frame_size`.
    pub fn validate(&self, enforce_decoder_tap_bound: bool) -> Result<()> {
        if self.channels != 1 && self.channels != 2 {
            return Err(SonicError::InvalidHeader("channels must be 1 or 2"));
        }
        if samplerate_index(self.samplerate).is_none() {
            return Err(SonicError::InvalidHeader("unsupported sample rate"));
        }
        if self.downsampling == 0 || self.downsampling > 3 {
            return Err(SonicError::InvalidHeader("downsampling must be in 1..=3"));
        }
        if self.num_taps < 32 || self.num_taps > 1024 || self.num_taps % 32 != 0 {
            return Err(SonicError::InvalidHeader("num_taps must be a multiple of 32 in 32..=1024"));
        }
        if enforce_decoder_tap_bound && self.num_taps > 128 {
            return Err(SonicError::InvalidHeader("num_taps exceeds the decoder's 128-tap bound"));
        }
        let expects_none = self.channels == 1;
        if expects_none != (self.decorrelation == Decorrelation::None) {
            return Err(SonicError::InvalidHeader(
                "decorrelation must be NONE iff the stream is mono",
            ));
        }
        if self.frame_size() < self.num_taps as usize * self.channels as usize {
            return Err(SonicError::InvalidHeader("num_taps * channels exceeds frame_size"));
        }
        Ok(())
    }

    /// `⌊2048 · samplerate / (44100 · downsampling)⌋`.
    pub fn block_align(&self) -> usize {
        (2048u64 * self.samplerate as u64 / (44100 * self.downsampling as u64)) as usize
    }

    /// `channels · block_align · downsampling`.
    pub fn frame_size(&self) -> usize {
        self.channels as usize * self.block_align() * self.downsampling as usize
    }

    /// `num_taps · channels`.
    pub fn tail_size(&self) -> usize {
        self.num_taps as usize * self.channels as usize
    }

    /// Packs this configuration into the 16-byte extradata block.
    pub fn emit_header(&self) -> [u8; EXTRADATA_SIZE] {
        let mut w = BitWriter::new();
        w.write_bits(2, 2); // version_lo: 2 selects the extended version fields
        w.write_bits(STREAM_VERSION as u32, 8);
        w.write_bits(self.minor_version as u32, 8);
        w.write_bits(self.channels as u32, 2);
        w.write_bits(samplerate_index(self.samplerate).expect("validated samplerate") as u32, 4);
        w.write_bits(self.lossless as u32, 1);
        if !self.lossless {
            w.write_bits(crate::constants::SAMPLE_SHIFT, 3);
        }
        w.write_bits(self.decorrelation.to_bits() as u32, 2);
        w.write_bits(self.downsampling as u32, 2);
        w.write_bits((self.num_taps / 32) - 1, 5);
        w.write_bits(0, 1); // custom_tap_quant_table: reserved, always 0

        let bytes = w.finish(EXTRADATA_SIZE);
        let mut out = [0u8; EXTRADATA_SIZE];
        out.copy_from_slice(&bytes);
        out
    }

    /// Parses a stream configuration from its extradata. A conforming
    /// decoder could also validate `sample_precision == 4` when lossy;
    /// this one does not enforce it, since no other field depends on it.
    pub fn parse_header(extradata: &[u8]) -> Result<StreamConfig> {
        let mut r = BitReader::new(extradata);
        let version_lo = r.read_bits(2).ok_or(SonicError::InvalidHeader("truncated header"))?;

        let (version, minor_version) = if version_lo >= 2 {
            let version = r.read_bits(8).ok_or(SonicError::InvalidHeader("truncated header"))?;
            let minor = r.read_bits(8).ok_or(SonicError::InvalidHeader("truncated header"))?;
            (version, minor)
        } else {
            (version_lo, 0)
        };

        if version != STREAM_VERSION as u32 {
            return Err(SonicError::InvalidHeader("unsupported Sonic version"));
        }

        let channels = r.read_bits(2).ok_or(SonicError::InvalidHeader("truncated header"))? as u8;
        let samplerate_idx = r.read_bits(4).ok_or(SonicError::InvalidHeader("truncated header"))? as usize;
        let samplerate = *SAMPLE_RATE_TABLE
            .get(samplerate_idx)
            .ok_or(SonicError::InvalidHeader("invalid samplerate_index"))?;

        let lossless = r.read_bits(1).ok_or(SonicError::InvalidHeader("truncated header"))? != 0;
        if !lossless {
            let precision = r.read_bits(3).ok_or(SonicError::InvalidHeader("truncated header"))?;
            if precision != crate::constants::SAMPLE_SHIFT {
                return Err(SonicError::InvalidHeader("sample_precision must be 4"));
            }
        }

        let decorrelation_bits = r.read_bits(2).ok_or(SonicError::InvalidHeader("truncated header"))? as u8;
        let decorrelation = Decorrelation::from_bits(decorrelation_bits)
            .ok_or(SonicError::InvalidHeader("invalid decorrelation"))?;

        let downsampling = r.read_bits(2).ok_or(SonicError::InvalidHeader("truncated header"))? as u8;
        if downsampling == 0 {
            return Err(SonicError::InvalidHeader("downsampling must be nonzero"));
        }

        let num_taps = (r.read_bits(5).ok_or(SonicError::InvalidHeader("truncated header"))? + 1) << 5;
        let _custom_tap_quant_table = r.read_bits(1).ok_or(SonicError::InvalidHeader("truncated header"))?;

        if channels < 1 || channels > crate::constants::MAX_CHANNELS {
            return Err(SonicError::InvalidHeader("channels must be 1 or 2"));
        }
        if decorrelation != Decorrelation::None && channels != 2 {
            return Err(SonicError::InvalidHeader("decorrelation requires two channels"));
        }

        let config = StreamConfig {
            minor_version: minor_version as u8,
            channels,
            samplerate,
            lossless,
            decorrelation,
            downsampling,
            num_taps,
        };

        config.validate(true)?;
        Ok(config)
    }
}

struct BitWriter {
    bytes: Vec<u8>,
    cur: u8,
    bits_in_cur: u8,
}

impl BitWriter {
    fn new() -> Self {
        BitWriter { bytes: Vec::new(), cur: 0, bits_in_cur: 0 }
    }

    /// Writes the `bits` least significant bits of `value`, MSB first.
    fn write_bits(&mut self, value: u32, bits: u8) {
        for i in (0..bits).rev() {
            let bit = ((value >> i) & 1) as u8;
            self.cur = (self.cur << 1) | bit;
            self.bits_in_cur += 1;
            if self.bits_in_cur == 8 {
                self.bytes.push(self.cur);
                self.cur = 0;
                self.bits_in_cur = 0;
            }
        }
    }

    fn finish(mut self, total_bytes: usize) -> Vec<u8> {
        if self.bits_in_cur > 0 {
            self.cur <<= 8 - self.bits_in_cur;
            self.bytes.push(self.cur);
        }
        self.bytes.resize(total_bytes, 0);
        self.bytes
    }
}

struct BitReader<'a> {
    bytes: &'a [u8],
    byte_pos: usize,
    bit_pos: u8,
}

impl<'a> BitReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        BitReader { bytes, byte_pos: 0, bit_pos: 0 }
    }

    /// Reads `bits` bits MSB first, or `None` past the end of the buffer.
    fn read_bits(&mut self, bits: u8) -> Option<u32> {
        let mut v: u32 = 0;
        for _ in 0..bits {
            let byte = *self.bytes.get(self.byte_pos)?;
            let bit = (byte >> (7 - self.bit_pos)) & 1;
            v = (v << 1) | bit as u32;
            self.bit_pos += 1;
            if self.bit_pos == 8 {
                self.bit_pos = 0;
                self.byte_pos += 1;
            }
        }
        Some(v)
    }
}
