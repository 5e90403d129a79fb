//! Sticky reference latch tracking.
//!
//! RAMP_STAT reports a finished position latch through `status_latch_l` and
//! `status_latch_r`, and the chip clears both bits on *every* read of the
//! register. [`LatchState`] remembers them between reads until the latched
//! position is consumed or the latch is re-armed.

use crate::registers::RampStat;

/// One of the two reference switch inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReferenceSwitch {
    /// REFL input.
    Left,
    /// REFR input.
    Right,
}

/// State of one sticky latch flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LatchFlag {
    /// No unconsumed latch event.
    #[default]
    Idle,
    /// XLATCH holds a position that has not been read yet.
    Latched,
}

/// Sticky latch flags for both switches.
///
/// `Idle -> Latched` only through [`capture`](Self::capture);
/// `Latched -> Idle` only through [`take`](Self::take) or
/// [`discard`](Self::discard).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LatchState {
    left: LatchFlag,
    right: LatchFlag,
}

impl LatchState {
    /// Fold the latch bits of a freshly read RAMP_STAT into the flags.
    ///
    /// Bits that are clear never reset a flag.
    pub fn capture(&mut self, status: RampStat) {
        if status.status_latch_l() {
            self.left = LatchFlag::Latched;
        }
        if status.status_latch_r() {
            self.right = LatchFlag::Latched;
        }
    }

    /// Current flag for a switch.
    #[inline]
    pub fn flag(&self, switch: ReferenceSwitch) -> LatchFlag {
        match switch {
            ReferenceSwitch::Left => self.left,
            ReferenceSwitch::Right => self.right,
        }
    }

    /// Whether a latch event is pending for a switch.
    #[inline]
    pub fn is_latched(&self, switch: ReferenceSwitch) -> bool {
        self.flag(switch) == LatchFlag::Latched
    }

    /// Consume a pending latch event. Returns whether one was pending.
    pub fn take(&mut self, switch: ReferenceSwitch) -> bool {
        let latched = self.is_latched(switch);
        self.discard(switch);
        latched
    }

    /// Drop any pending latch event.
    #[inline]
    pub fn discard(&mut self, switch: ReferenceSwitch) {
        *self.flag_mut(switch) = LatchFlag::Idle;
    }

    fn flag_mut(&mut self, switch: ReferenceSwitch) -> &mut LatchFlag {
        match switch {
            ReferenceSwitch::Left => &mut self.left,
            ReferenceSwitch::Right => &mut self.right,
        }
    }
}
