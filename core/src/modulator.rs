use std::f64::consts::TAU;

use crate::encoder::Symbol;

/// Continuous-phase two-tone oscillator.
///
/// The phase accumulator is never reset: loading a new symbol only swaps the
/// frequency and the sample countdown, so the waveform stays continuous
/// across tone changes. Phase is kept in `[0, 2π)` after every update.
#[derive(Debug, Clone)]
pub struct Modulator {
    sample_rate: f64,
    amplitude: f32,
    phase: f64,
    frequency: f64,
    /// 2π · frequency / sample_rate, cached per symbol
    increment: f64,
    remaining: u64,
}

impl Modulator {
    pub fn new(sample_rate: f64, amplitude: f32) -> Self {
        Self {
            sample_rate,
            amplitude,
            phase: 0.0,
            frequency: 0.0,
            increment: 0.0,
            remaining: 0,
        }
    }

    /// Install the next tone segment. Phase carries over unchanged.
    pub fn load_symbol(&mut self, symbol: &Symbol) {
        self.frequency = symbol.frequency;
        self.increment = TAU * symbol.frequency / self.sample_rate;
        self.remaining = symbol.duration_samples;
    }

    /// Emit one sample of the active symbol and advance the oscillator.
    pub fn step(&mut self) -> f32 {
        let value = self.amplitude * self.phase.sin() as f32;

        self.phase += self.increment;
        if self.phase >= TAU {
            self.phase -= TAU;
            // Only tones above the sample rate can overshoot by another turn
            if self.phase >= TAU {
                self.phase = self.phase.rem_euclid(TAU);
            }
        }

        self.remaining = self.remaining.saturating_sub(1);
        value
    }

    /// Current phase in radians, within `[0, 2π)`
    pub fn phase(&self) -> f64 {
        self.phase
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Samples left in the active symbol
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// True when the active symbol is used up and a new one is needed
    pub fn is_idle(&self) -> bool {
        self.remaining == 0
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }
}
