//! Forward-only random access into zlib streams stored in flash.
//!
//! A cursor inflates one stream from its start and hands out bytes at
//! increasing offsets. Reads that go backwards, or that target another
//! stream, restart it.

use alloc::boxed::Box;

use embedded_storage::ReadStorage;
use miniz_oxide::{
    DataFormat, MZError, MZFlush, MZStatus,
    inflate::stream::{InflateState, inflate},
};

use crate::StorageError;

const INPUT_CHUNK: usize = 64;
const OUTPUT_CHUNK: usize = 256;

/// Compressed byte range in flash.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Stream {
    pub(crate) start: u32,
    pub(crate) len: u32,
}

pub(crate) struct InflateCursor {
    stream: Stream,
    state: Box<InflateState>,
    input: [u8; INPUT_CHUNK],
    input_pos: usize,
    input_len: usize,
    /// Compressed bytes fetched so far.
    fetched: u32,
    output: [u8; OUTPUT_CHUNK],
    output_pos: usize,
    output_len: usize,
    /// Inflated offset of `output[output_pos]`.
    position: u32,
    finished: bool,
    pub(crate) last_used: u32,
}

impl core::fmt::Debug for InflateCursor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InflateCursor")
            .field("stream", &self.stream)
            .field("position", &self.position)
            .field("finished", &self.finished)
            .finish()
    }
}

impl InflateCursor {
    pub(crate) fn new(stream: Stream) -> Self {
        Self {
            stream,
            state: Box::new(InflateState::new(DataFormat::Zlib)),
            input: [0; INPUT_CHUNK],
            input_pos: 0,
            input_len: 0,
            fetched: 0,
            output: [0; OUTPUT_CHUNK],
            output_pos: 0,
            output_len: 0,
            position: 0,
            finished: false,
            last_used: 0,
        }
    }

    pub(crate) fn stream(&self) -> Stream {
        self.stream
    }

    pub(crate) fn position(&self) -> u32 {
        self.position
    }

    /// Rewinds to the start of `stream`.
    pub(crate) fn restart(&mut self, stream: Stream) {
        self.stream = stream;
        self.state.reset(DataFormat::Zlib);
        self.input_pos = 0;
        self.input_len = 0;
        self.fetched = 0;
        self.output_pos = 0;
        self.output_len = 0;
        self.position = 0;
        self.finished = false;
    }

    /// Fills `buf` with inflated bytes from `offset`.
    pub(crate) fn read<F: ReadStorage>(
        &mut self,
        flash: &mut F,
        offset: u32,
        buf: &mut [u8],
    ) -> Result<(), StorageError<F::Error>> {
        if offset < self.position {
            self.restart(self.stream);
        }

        let mut filled = 0usize;
        while filled < buf.len() {
            if self.output_pos < self.output_len {
                let available = self.output_len - self.output_pos;
                if self.position < offset {
                    let skip = available.min((offset - self.position) as usize);
                    self.output_pos += skip;
                    self.position += skip as u32;
                    continue;
                }

                let take = available.min(buf.len() - filled);
                buf[filled..filled + take]
                    .copy_from_slice(&self.output[self.output_pos..self.output_pos + take]);
                filled += take;
                self.output_pos += take;
                self.position += take as u32;
                continue;
            }

            if self.finished {
                return Err(StorageError::Truncated);
            }
            self.inflate_chunk(flash)?;
        }

        Ok(())
    }

    fn inflate_chunk<F: ReadStorage>(&mut self, flash: &mut F) -> Result<(), StorageError<F::Error>> {
        let mut no_progress_loops = 0u8;

        loop {
            if self.input_pos >= self.input_len && self.fetched < self.stream.len {
                let read_len = INPUT_CHUNK.min((self.stream.len - self.fetched) as usize);
                flash
                    .read(self.stream.start + self.fetched, &mut self.input[..read_len])
                    .map_err(StorageError::Flash)?;
                self.input_pos = 0;
                self.input_len = read_len;
                self.fetched += read_len as u32;
            }

            let input = &self.input[self.input_pos..self.input_len];
            let result = inflate(&mut self.state, input, &mut self.output, MZFlush::None);
            self.input_pos += result.bytes_consumed;
            self.output_pos = 0;
            self.output_len = result.bytes_written;

            match result.status {
                Ok(MZStatus::StreamEnd) => {
                    self.finished = true;
                    return Ok(());
                }
                Ok(MZStatus::Ok) => {}
                Err(MZError::Buf) => {}
                Ok(MZStatus::NeedDict) | Err(_) => return Err(StorageError::Inflate),
            }

            if result.bytes_written > 0 {
                return Ok(());
            }

            let input_exhausted = self.input_pos >= self.input_len && self.fetched >= self.stream.len;
            if result.bytes_consumed == 0 {
                no_progress_loops = no_progress_loops.saturating_add(1);
                if input_exhausted || no_progress_loops >= 2 {
                    return Err(StorageError::Truncated);
                }
            } else {
                no_progress_loops = 0;
            }
        }
    }
}
