//! Byte-stream torque sink.

use std::io::Write;

use exotorque_errors::{RTError, RTResult};
use tracing::error;

use crate::hal::TorqueSink;
use crate::wire::encode_torque;

/// Writes each estimate as four little-endian bytes to any [`Write`].
///
/// Typically a serial device file or stdout. With `flush_each` off, frames
/// may sit in a buffering writer until [`TorqueSink::flush`]; a UART
/// consumer that expects one frame per period needs it on.
#[derive(Debug)]
pub struct WriterSink<W: Write> {
    writer: W,
    flush_each: bool,
    frames: u64,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            flush_each: false,
            frames: 0,
        }
    }

    /// Flush after every frame.
    pub fn with_flush_each(mut self, flush_each: bool) -> Self {
        self.flush_each = flush_each;
        self
    }

    /// Frames written so far.
    pub fn frames_written(&self) -> u64 {
        self.frames
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Flush and return the writer.
    pub fn into_inner(mut self) -> std::io::Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl<W: Write> TorqueSink for WriterSink<W> {
    fn emit(&mut self, torque_nm: f32) -> RTResult {
        self.writer.write_all(&encode_torque(torque_nm)).map_err(|e| {
            error!(error = %e, "torque sink write failed");
            RTError::OutputFault
        })?;
        if self.flush_each {
            self.writer.flush().map_err(|e| {
                error!(error = %e, "torque sink flush failed");
                RTError::OutputFault
            })?;
        }
        self.frames += 1;
        Ok(())
    }
    fn flush(&mut self) -> RTResult {
        self.writer.flush().map_err(|e| {
            error!(error = %e, "torque sink flush failed");
            RTError::OutputFault
        })
    }
}
