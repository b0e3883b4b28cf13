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

//! The `error` module defines the error and result types used throughout the crate.

use thiserror::Error;

/// An error that prevents successful encoding or decoding of a Sonic stream.
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum SonicError {
    /// The stream header (extradata) describes a configuration this decoder
    /// cannot use: unsupported version, out-of-range sample rate index,
    /// an unsupported channel count, zero downsampling, a `num_taps` that
    /// violates its bound, or a decorrelation mode inconsistent with the
    /// channel count.
    #[error("invalid stream header: {0}")]
    InvalidHeader(&'static str),

    /// The packet bitstream itself is malformed: the range coder read past
    /// the end of the buffer by more than the tolerated overread, or an
    /// integer symbol's unary prefix exceeded its bound.
    #[error("invalid packet data: {0}")]
    InvalidData(&'static str),

    /// A scratch buffer could not be allocated during instance
    /// initialization. Every buffer in this crate is sized from stream
    /// parameters that `StreamConfig::validate` has already bounded, so in
    /// practice this variant is reachable only if the allocator itself
    /// aborts before returning -- kept as a first-class error rather than
    /// dropped, for API completeness at every instance-construction site.
    #[error("allocation failed: {0}")]
    OutOfMemory(&'static str),

    /// The caller asked the encoder to handle a configuration this codec
    /// does not support, e.g. more than two channels.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}

/// Either `T` on success, or a [`SonicError`] on failure.
pub type Result<T> = std::result::Result<T, SonicError>;
