//! Demo Mode - Simulated EIS byte stream for testing
//!
//! Produces a realistic frame stream without an instrument attached. An engine
//! cruises at about 2400 RPM with slowly wandering temperatures; optional line
//! noise and corrupted frames exercise resynchronization and checksum handling.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::{self, Read};

use crate::record::{EisRecord, CYLINDERS};

/// Simulated EIS serial output
pub struct DemoSource {
    rng: StdRng,
    /// Bytes of the frame currently being sent
    pending: Vec<u8>,
    /// Read position within `pending`
    cursor: usize,
    /// Frames generated so far
    frames_sent: u64,
    /// Stop after this many frames (reads then return EOF)
    max_frames: Option<u64>,
    /// Up to this many random bytes precede each frame
    max_noise: usize,
    /// Every nth frame gets a corrupted payload byte
    corrupt_every: Option<u64>,
    /// Current simulated engine state
    state: EisRecord,
}

impl Default for DemoSource {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoSource {
    /// Create an endless, clean simulator
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Create a reproducible simulator
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            rng,
            pending: Vec::new(),
            cursor: 0,
            frames_sent: 0,
            max_frames: None,
            max_noise: 0,
            corrupt_every: None,
            state: EisRecord {
                tach: 2400,
                cht: [340; CYLINDERS],
                egt: [1300; CYLINDERS],
                airspeed: 110,
                altitude: 4500,
                voltage: 138,
                fuel_flow: 85,
                oat: 12,
                oil_temp: 190,
                oil_pressure: 60,
                fuel_qty: 400,
                baro: 2992,
                mag_heading: 270,
                ..Default::default()
            },
        }
    }

    /// End the stream after `frames` frames
    pub fn max_frames(mut self, frames: u64) -> Self {
        self.max_frames = Some(frames);
        self
    }

    /// Insert up to `bytes` random bytes before each frame
    pub fn noise(mut self, bytes: usize) -> Self {
        self.max_noise = bytes;
        self
    }

    /// Corrupt every `n`th frame (n >= 1)
    pub fn corrupt_every(mut self, n: u64) -> Self {
        self.corrupt_every = Some(n.max(1));
        self
    }

    /// Frames generated so far
    pub fn frames_sent(&self) -> u64 {
        self.frames_sent
    }

    fn step(&mut self) {
        let s = &mut self.state;
        s.tach = wander(&mut self.rng, s.tach, 15, 2200, 2600);
        for cht in s.cht.iter_mut() {
            *cht = wander(&mut self.rng, *cht, 2, 300, 400);
        }
        for egt in s.egt.iter_mut() {
            *egt = wander(&mut self.rng, *egt, 5, 1200, 1450);
        }
        s.oil_temp = wander(&mut self.rng, s.oil_temp, 1, 170, 220);
        s.fuel_flow = wander(&mut self.rng, s.fuel_flow, 1, 70, 100);

        s.seconds += 1;
        if s.seconds == 60 {
            s.seconds = 0;
            s.minutes += 1;
            if s.minutes == 60 {
                s.minutes = 0;
                s.hours = s.hours.wrapping_add(1);
            }
        }
        s.elapsed_time = s.elapsed_time.wrapping_add(1);
    }

    fn next_chunk(&mut self) {
        self.step();
        self.pending.clear();
        self.cursor = 0;

        let noise = if self.max_noise > 0 {
            self.rng.gen_range(0..=self.max_noise)
        } else {
            0
        };
        for _ in 0..noise {
            self.pending.push(self.rng.gen());
        }

        let frame_start = self.pending.len();
        self.pending
            .extend_from_slice(self.state.encode().as_bytes());
        self.frames_sent += 1;

        if let Some(n) = self.corrupt_every {
            if self.frames_sent % n == 0 {
                // Low tach byte; the header is never touched
                self.pending[frame_start + 4] ^= 0x5A;
            }
        }
    }
}

fn wander(rng: &mut StdRng, value: u16, step: u16, min: u16, max: u16) -> u16 {
    let delta = rng.gen_range(0..=step * 2) as i32 - step as i32;
    (value as i32 + delta).clamp(min as i32, max as i32) as u16
}

impl Read for DemoSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.cursor >= self.pending.len() {
            if self.max_frames.is_some_and(|max| self.frames_sent >= max) {
                return Ok(0);
            }
            self.next_chunk();
        }

        let available = &self.pending[self.cursor..];
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.cursor += n;
        Ok(n)
    }
}
