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

//! A pure Rust implementation of the Sonic audio codec: a block-based
//! lossless/lossy compressor for 16-bit PCM, built around a modified
//! Levinson-Durbin lattice predictor and a binary range coder.
//!
//! ```no_run
//! use sonic_codec::{Decorrelation, SonicDecoder, SonicEncoder, StreamConfig};
//!
//! let config = StreamConfig {
//!     minor_version: 0,
//!     channels: 2,
//!     samplerate: 44100,
//!     lossless: true,
//!     decorrelation: Decorrelation::MidSide,
//!     downsampling: 1,
//!     num_taps: 32,
//! };
//!
//! let mut encoder = SonicEncoder::new(config)?;
//! let mut decoder = SonicDecoder::new(config)?;
//!
//! let frame = vec![0i16; config.frame_size()];
//! let packet = encoder.encode_frame(&frame)?;
//! let decoded = decoder.decode_frame(&packet)?;
//! assert_eq!(decoded, frame);
//! # Ok::<(), sonic_codec::SonicError>(())
//! ```

pub mod constants;
pub mod decoder;
pub mod decorrelate;
pub mod encoder;
pub mod error;
pub mod fixedpoint;
pub mod header;
pub mod predictor;
pub mod range_coder;
pub mod symbol;

pub use decoder::SonicDecoder;
pub use decorrelate::Decorrelation;
pub use encoder::SonicEncoder;
pub use error::{Result, SonicError};
pub use header::{StreamConfig, EXTRADATA_SIZE};
