use serialport::SerialPort;
use std::io::{self, Read};

/// Blocking byte source over an open serial port.
///
/// The driver needs a finite poll timeout; an expired poll is retried here so
/// readers only ever see data, end of stream, or a real error.
pub struct SerialSource {
    port: Box<dyn SerialPort>,
}

impl SerialSource {
    /// Wrap an already configured port
    pub fn new(port: Box<dyn SerialPort>) -> Self {
        Self { port }
    }

    /// Name of the underlying device, if known
    pub fn name(&self) -> Option<String> {
        self.port.name()
    }

    /// Give back the port
    pub fn into_inner(self) -> Box<dyn SerialPort> {
        self.port
    }
}

impl Read for SerialSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            match self.port.read(buf) {
                Err(e) if e.kind() == io::ErrorKind::TimedOut => continue,
                other => return other,
            }
        }
    }
}
