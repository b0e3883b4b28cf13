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

//! The two rounding conventions shared by the decorrelator, predictor and
//! frame pipelines. Both operate on [`Wrapping<i32>`] so the two's
//! complement wraparound the fixed-point products rely on is explicit at
//! the type level rather than left to `overflow-checks` being off.

use std::num::Wrapping;

/// Round-to-nearest right shift, biased towards `+∞` on ties:
/// `(a + (1 << (b - 1))) >> b`.
pub fn shift(a: i32, b: u32) -> i32 {
    (a + (1 << (b - 1))) >> b
}

/// Floor-toward-negative-infinity right shift with an explicit
/// `a < 0` correction: `(a >> b) + (a < 0)`.
pub fn shift_down(a: Wrapping<i32>, b: u32) -> Wrapping<i32> {
    let Wrapping(v) = a;
    Wrapping((v >> b) + i32::from(v < 0))
}
