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

//! Property-based tests for the universally-quantified invariants: every
//! valid int16 frame round-trips losslessly, encoding is deterministic,
//! headers round-trip, symbols round-trip, and `num_taps * channels`
//! never exceeds `frame_size` once a header has parsed.

use proptest::prelude::*;

use sonic_codec::header::StreamConfig;
use sonic_codec::range_coder::{RangeDecoder, RangeEncoder};
use sonic_codec::symbol::{get_symbol, put_symbol, SYMBOL_STATE_SIZE};
use sonic_codec::{Decorrelation, SonicDecoder, SonicEncoder};

fn mono_config() -> StreamConfig {
    StreamConfig {
        minor_version: 0,
        channels: 1,
        samplerate: 44100,
        lossless: true,
        decorrelation: Decorrelation::None,
        downsampling: 1,
        num_taps: 32,
    }
}

proptest! {
    #[test]
    fn lossless_mono_frames_round_trip(samples in prop::collection::vec(any::<i16>(), 1..=64)) {
        let config = mono_config();
        let frame_size = config.frame_size();

        // Tile/truncate the generated samples to exactly one frame.
        let mut frame = Vec::with_capacity(frame_size);
        while frame.len() < frame_size {
            frame.extend_from_slice(&samples);
        }
        frame.truncate(frame_size);

        let mut encoder = SonicEncoder::new(config).unwrap();
        let mut decoder = SonicDecoder::new(config).unwrap();
        let packet = encoder.encode_frame(&frame).unwrap();
        let decoded = decoder.decode_frame(&packet).unwrap();
        prop_assert_eq!(decoded, frame);
    }

    #[test]
    fn encoding_is_deterministic_for_arbitrary_frames(samples in prop::collection::vec(any::<i16>(), 1..=64)) {
        let config = mono_config();
        let frame_size = config.frame_size();
        let mut frame = Vec::with_capacity(frame_size);
        while frame.len() < frame_size {
            frame.extend_from_slice(&samples);
        }
        frame.truncate(frame_size);

        let mut encoder_a = SonicEncoder::new(config).unwrap();
        let mut encoder_b = SonicEncoder::new(config).unwrap();
        prop_assert_eq!(
            encoder_a.encode_frame(&frame).unwrap(),
            encoder_b.encode_frame(&frame).unwrap()
        );
    }

    #[test]
    fn headers_round_trip_for_arbitrary_valid_configs(
        channels in 1u8..=2,
        samplerate_idx in 0usize..9,
        lossless in any::<bool>(),
        downsampling in 1u8..=3,
        taps_minus_one in 0u32..4, // num_taps in {32, 64, 96, 128}, decoder-legal
    ) {
        let samplerates = [44100u32, 22050, 11025, 96000, 48000, 32000, 24000, 16000, 8000];
        let decorrelation = if channels == 1 { Decorrelation::None } else { Decorrelation::MidSide };

        let config = StreamConfig {
            minor_version: 7,
            channels,
            samplerate: samplerates[samplerate_idx],
            lossless,
            decorrelation,
            downsampling,
            num_taps: (taps_minus_one + 1) * 32,
        };

        let extradata = config.emit_header();
        let parsed = StreamConfig::parse_header(&extradata).unwrap();
        prop_assert_eq!(parsed, config);
    }

    #[test]
    fn signed_symbols_round_trip(v in -(1i32 << 29)..(1i32 << 29)) {
        let mut enc_state = [128u8; SYMBOL_STATE_SIZE];
        let mut enc = RangeEncoder::new();
        put_symbol(&mut enc, &mut enc_state, v);
        let bytes = enc.terminate();

        let mut dec_state = [128u8; SYMBOL_STATE_SIZE];
        let mut dec = RangeDecoder::new(&bytes);
        prop_assert_eq!(get_symbol(&mut dec, &mut dec_state).unwrap(), v);
    }

    #[test]
    fn tail_never_exceeds_frame_size_once_validated(
        channels in 1u8..=2,
        downsampling in 1u8..=3,
        taps_minus_one in 0u32..4,
    ) {
        let decorrelation = if channels == 1 { Decorrelation::None } else { Decorrelation::MidSide };
        let config = StreamConfig {
            minor_version: 0,
            channels,
            samplerate: 44100,
            lossless: true,
            decorrelation,
            downsampling,
            num_taps: (taps_minus_one + 1) * 32,
        };

        if config.validate(true).is_ok() {
            prop_assert!(config.tail_size() <= config.frame_size());
        }
    }
}
