//! PHY power-on reset timing and the clocked reset/stop sequencer.
//!
//! PHYs require a minimum reset pulse width followed by a quiescent
//! interval before they settle. Both are encoded as cycle-counted states so
//! the timing is exact and clock-deterministic regardless of downstream
//! logic speed. The `stop` output doubles as a bus holdoff: dependent logic
//! stalls until the PHY is guaranteed ready.

use std::fmt;

use thiserror::Error;

use crate::error::TimingError;

/// Construction-time PHY reset timing parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ResetTiming {
    /// Clock frequency driving the sequencer, in hertz.
    pub clock_frequency_hz: f64,
    /// Minimum PHY reset pulse length, in seconds.
    pub reset_length_s: f64,
    /// Post-reset quiescent (bus holdoff) length, in seconds.
    pub stop_length_s: f64,
    /// Arms the sequence automatically at power-up.
    pub power_on_reset: bool,
}

impl Default for ResetTiming {
    fn default() -> Self {
        Self::usb_phy_default()
    }
}

impl ResetTiming {
    /// Canonical front-end timing: 60 MHz clock, 10 ms reset, 200 µs stop,
    /// power-on reset armed.
    #[must_use]
    pub const fn usb_phy_default() -> Self {
        Self {
            clock_frequency_hz: 60e6,
            reset_length_s: 10e-3,
            stop_length_s: 2e-4,
            power_on_reset: true,
        }
    }

    /// Converts the durations into integer cycle counts.
    ///
    /// A duration shorter than one clock period would compute to zero
    /// cycles; that would silently skip the phase and emit a zero-width
    /// pulse, so the count is floored to one cycle and reported as a
    /// [`TimingWarning`] instead.
    ///
    /// # Errors
    ///
    /// Returns [`TimingError::InvalidClockFrequency`] for a non-finite or
    /// non-positive clock, and [`TimingError::InvalidDuration`] for a
    /// negative or non-finite phase length.
    pub fn compile(&self) -> Result<(ResetSchedule, Vec<TimingWarning>), TimingError> {
        if !self.clock_frequency_hz.is_finite() || self.clock_frequency_hz <= 0.0 {
            return Err(TimingError::InvalidClockFrequency {
                hz: self.clock_frequency_hz,
            });
        }

        let mut warnings = Vec::new();
        let reset_cycles = phase_cycles(
            SequencerPhase::Reset,
            self.reset_length_s,
            self.clock_frequency_hz,
            &mut warnings,
        )?;
        let stop_cycles = phase_cycles(
            SequencerPhase::Stop,
            self.stop_length_s,
            self.clock_frequency_hz,
            &mut warnings,
        )?;

        Ok((
            ResetSchedule {
                reset_cycles,
                stop_cycles,
                power_on_reset: self.power_on_reset,
            },
            warnings,
        ))
    }
}

fn phase_cycles(
    phase: SequencerPhase,
    seconds: f64,
    clock_hz: f64,
    warnings: &mut Vec<TimingWarning>,
) -> Result<u64, TimingError> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(TimingError::InvalidDuration { phase, seconds });
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let cycles = (seconds * clock_hz).ceil() as u64;
    if cycles == 0 {
        warnings.push(TimingWarning::SubCyclePhase {
            phase,
            requested_s: seconds,
        });
        return Ok(1);
    }
    Ok(cycles)
}

/// Compiled cycle counts for one power-up sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ResetSchedule {
    /// Cycles spent asserting the PHY reset.
    pub reset_cycles: u64,
    /// Cycles spent asserting the stop/holdoff output after reset.
    pub stop_cycles: u64,
    /// Arms the sequence automatically at power-up.
    pub power_on_reset: bool,
}

/// Legal-but-suspect timing findings from [`ResetTiming::compile`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum TimingWarning {
    /// A phase shorter than one clock period was floored to a single cycle.
    #[error("{phase} length {requested_s} s is shorter than one clock period, floored to 1 cycle")]
    SubCyclePhase {
        /// Phase whose duration was floored.
        phase: SequencerPhase,
        /// The sub-period duration as requested, in seconds.
        requested_s: f64,
    },
}

/// Named sequencer states; the three states are the observable contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum SequencerPhase {
    /// Driving the PHY reset.
    Reset,
    /// Reset released, holding the bus off while the PHY settles.
    Stop,
    /// Sequence complete; both outputs deasserted.
    Idle,
}

impl fmt::Display for SequencerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Reset => "reset",
            Self::Stop => "stop",
            Self::Idle => "idle",
        };
        f.write_str(name)
    }
}

/// Clocked PHY reset sequencer.
///
/// Starts in [`SequencerPhase::Reset`] when the schedule arms power-on
/// reset, otherwise directly in the terminal [`SequencerPhase::Idle`].
/// `reset()` and `stop()` are combinational views of the current phase;
/// [`PhyResetSequencer::tick`] is the registered update visible from the
/// next cycle. Idle is terminal: no re-arm input exists, so a warm reset
/// requires constructing a new sequencer.
#[derive(Debug, Clone)]
pub struct PhyResetSequencer {
    schedule: ResetSchedule,
    phase: SequencerPhase,
    remaining: u64,
}

impl PhyResetSequencer {
    /// Creates a sequencer at its initial phase.
    #[must_use]
    pub const fn new(schedule: ResetSchedule) -> Self {
        if schedule.power_on_reset {
            Self {
                schedule,
                phase: SequencerPhase::Reset,
                remaining: schedule.reset_cycles,
            }
        } else {
            Self {
                schedule,
                phase: SequencerPhase::Idle,
                remaining: 0,
            }
        }
    }

    /// The compiled schedule this sequencer runs.
    #[must_use]
    pub const fn schedule(&self) -> ResetSchedule {
        self.schedule
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> SequencerPhase {
        self.phase
    }

    /// PHY reset output: asserted for the whole reset phase.
    #[must_use]
    pub const fn reset(&self) -> bool {
        matches!(self.phase, SequencerPhase::Reset)
    }

    /// Stop/holdoff output: asserted for the whole quiescent phase.
    #[must_use]
    pub const fn stop(&self) -> bool {
        matches!(self.phase, SequencerPhase::Stop)
    }

    /// Advances one clock cycle.
    ///
    /// A schedule hand-built with a zero cycle count behaves as a
    /// single-cycle phase; [`ResetTiming::compile`] never produces one.
    pub fn tick(&mut self) {
        match self.phase {
            SequencerPhase::Idle => {}
            SequencerPhase::Reset => {
                self.remaining = self.remaining.saturating_sub(1);
                if self.remaining == 0 {
                    self.phase = SequencerPhase::Stop;
                    self.remaining = self.schedule.stop_cycles;
                    if self.remaining == 0 {
                        self.phase = SequencerPhase::Idle;
                    }
                }
            }
            SequencerPhase::Stop => {
                self.remaining = self.remaining.saturating_sub(1);
                if self.remaining == 0 {
                    self.phase = SequencerPhase::Idle;
                }
            }
        }
    }
}
