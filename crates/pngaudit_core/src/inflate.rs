//! Partial decompression of image data, just far enough to see row filters.

use crate::{CoreError, Result};
use flate2::{Decompress, FlushDecompress, Status};
use std::io::Read;
use tracing::trace;

const WINDOW_SIZE: usize = 32 * 1024;

/// Adam7 passes as (x offset, y offset, x step, y step).
const ADAM7: [(u32, u32, u32, u32); 7] = [
    (0, 0, 8, 8),
    (4, 0, 8, 8),
    (0, 4, 4, 8),
    (2, 0, 4, 4),
    (0, 2, 2, 4),
    (1, 0, 2, 2),
    (0, 1, 1, 2),
];

/// Columns and rows of the reduced image for one Adam7 pass.
#[must_use]
pub fn pass_dimensions(width: u32, height: u32, pass: usize) -> (u32, u32) {
    let (x_off, y_off, x_step, y_step) = ADAM7[pass];
    let cols = if width > x_off {
        (width - x_off).div_ceil(x_step)
    } else {
        0
    };
    let rows = if height > y_off {
        (height - y_off).div_ceil(y_step)
    } else {
        0
    };
    (cols, rows)
}

/// Bytes from one filter byte to the next: the packed row plus its filter byte.
#[must_use]
pub fn row_stride(cols: u32, bits_per_pixel: u32) -> u64 {
    ((u64::from(cols) * u64::from(bits_per_pixel) + 7) >> 3) + 1
}

/// Walks the inflated image data of one image and picks out each row's
/// filter byte.
///
/// State survives across calls, since the zlib stream spans many chunks.
pub struct ScanlineCursor {
    inflater: Decompress,
    window: Vec<u8>,
    width: u32,
    height: u32,
    bits_per_pixel: u32,
    interlaced: bool,
    pass: usize,
    row: u32,
    rows_in_pass: u32,
    stride: u64,
    /// Distance from the start of the next output block to the next filter byte.
    skip: u64,
    seen: u64,
    expected: u64,
    rows_done: bool,
    stream_done: bool,
}

impl ScanlineCursor {
    pub fn new(width: u32, height: u32, bits_per_pixel: u32, interlaced: bool) -> Self {
        let mut cursor = Self {
            inflater: Decompress::new(true),
            window: vec![0u8; WINDOW_SIZE],
            width,
            height,
            bits_per_pixel,
            interlaced,
            pass: 0,
            row: 0,
            rows_in_pass: 0,
            stride: 0,
            skip: 0,
            seen: 0,
            expected: 0,
            rows_done: false,
            stream_done: false,
        };

        if interlaced {
            cursor.expected = (0..ADAM7.len())
                .map(|pass| u64::from(pass_dimensions(width, height, pass).1))
                .sum();
            cursor.enter_pass(0);
        } else {
            cursor.expected = u64::from(height);
            cursor.rows_in_pass = height;
            cursor.stride = row_stride(width, bits_per_pixel);
            cursor.rows_done = height == 0;
        }
        cursor
    }

    /// Moves to the first non-empty pass at or after `from`.
    fn enter_pass(&mut self, from: usize) {
        for pass in from..ADAM7.len() {
            let (cols, rows) = pass_dimensions(self.width, self.height, pass);
            if cols > 0 && rows > 0 {
                self.pass = pass;
                self.row = 0;
                self.rows_in_pass = rows;
                self.stride = row_stride(cols, self.bits_per_pixel);
                return;
            }
        }
        self.rows_done = true;
    }

    /// Steps past the current row, returning its stride.
    fn advance_row(&mut self) -> u64 {
        let stride = self.stride;
        self.row += 1;
        if self.row >= self.rows_in_pass {
            if self.interlaced {
                self.enter_pass(self.pass + 1);
            } else {
                self.rows_done = true;
            }
        }
        stride
    }

    /// Current Adam7 pass, 1-based. Always 1 for non-interlaced images.
    #[must_use]
    pub fn pass(&self) -> usize {
        self.pass + 1
    }

    #[must_use]
    pub fn seen(&self) -> u64 {
        self.seen
    }

    #[must_use]
    pub fn expected(&self) -> u64 {
        self.expected
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.stream_done || self.rows_done
    }

    /// Inflates `input` and returns the filter bytes of every row that
    /// started inside the newly produced output.
    pub fn feed(&mut self, mut input: &[u8]) -> Result<Vec<u8>> {
        let mut filters = Vec::new();
        while !self.stream_done {
            let before_in = self.inflater.total_in();
            let before_out = self.inflater.total_out();
            let status = self
                .inflater
                .decompress(input, &mut self.window, FlushDecompress::None)
                .map_err(|e| CoreError::Inflate(e.to_string()))?;
            let consumed = (self.inflater.total_in() - before_in) as usize;
            let produced = (self.inflater.total_out() - before_out) as usize;
            input = &input[consumed..];
            self.walk(produced, &mut filters);
            trace!(consumed, produced, pass = self.pass(), "inflate step");

            match status {
                Status::StreamEnd => self.stream_done = true,
                Status::BufError => break,
                Status::Ok if consumed == 0 && produced == 0 => break,
                Status::Ok => {}
            }
        }
        Ok(filters)
    }

    fn walk(&mut self, produced: usize, filters: &mut Vec<u8>) {
        let produced = produced as u64;
        let mut pos = self.skip;
        while pos < produced && !self.rows_done {
            filters.push(self.window[pos as usize]);
            self.seen += 1;
            pos += self.advance_row();
        }
        self.skip = pos.saturating_sub(produced);
    }
}

/// Inflates a compressed text field for display, keeping at most `limit` bytes.
///
/// The flag is true when the text was cut short.
pub fn inflate_text(data: &[u8], limit: usize) -> Result<(Vec<u8>, bool)> {
    let mut out = Vec::new();
    let decoder = flate2::read::ZlibDecoder::new(data);
    decoder
        .take(limit as u64 + 1)
        .read_to_end(&mut out)
        .map_err(|e| CoreError::Inflate(e.to_string()))?;
    let truncated = out.len() > limit;
    out.truncate(limit);
    Ok((out, truncated))
}
