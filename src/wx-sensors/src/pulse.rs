//! Pulse-channel state shared between interrupt context and the main loop.
//!
//! A hardware edge interrupt carries no context pointer, so the state it
//! touches must be `'static` and sensor-agnostic: each pulse source gets a
//! [`PulseChannel`] holding nothing but an atomic edge counter and a claim
//! flag. The platform's interrupt handler calls
//! [`record_pulse()`](PulseChannel::record_pulse) — the only ISR-side
//! operation — and the owning sensor harvests counts from the main loop with
//! [`PulseHandle::take()`], an atomic swap-to-zero. A pulse arriving
//! concurrently with the harvest lands in the next one; none is ever lost or
//! double-counted, and no interrupt masking is involved.
//!
//! Exactly one live claimant per channel is enforced at
//! [`claim()`](PulseChannel::claim) time, which rules out the corruption two
//! instances of the same pulse sensor would otherwise cause.

use portable_atomic::{AtomicBool, AtomicU32, Ordering};

/// Edge counter channel for the anemometer's reed switch.
pub static ANEMOMETER: PulseChannel = PulseChannel::new();

/// Edge counter channel for the rain gauge's tipping bucket.
pub static RAIN_GAUGE: PulseChannel = PulseChannel::new();

/// Per-pulse-source shared state.
///
/// The predefined [`ANEMOMETER`] and [`RAIN_GAUGE`] statics cover the two
/// pulse sources of the station; additional channels can be declared as
/// further `static`s where needed.
#[derive(Debug)]
pub struct PulseChannel {
    pulses: AtomicU32,
    claimed: AtomicBool,
}

impl PulseChannel {
    #[expect(clippy::new_without_default)]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pulses: AtomicU32::new(0),
            claimed: AtomicBool::new(false),
        }
    }

    /// Records one qualifying edge. The only operation allowed from
    /// interrupt context; returns immediately.
    ///
    /// The counter is harvested far more often than it could wrap at
    /// physically plausible pulse rates.
    pub fn record_pulse(&self) {
        self.pulses.fetch_add(1, Ordering::Relaxed);
    }

    /// Claims exclusive harvest access to this channel.
    ///
    /// Refuses if a live [`PulseHandle`] already exists, so two instances of
    /// the same pulse sensor cannot silently corrupt each other's counts.
    /// Edges recorded before the claim are discarded.
    pub fn claim(&'static self) -> Result<PulseHandle, ClaimError> {
        // NOTE(ordering): the claim flag acts as a lock, so we use
        // Acquire/Release ordering.
        if self
            .claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ClaimError::AlreadyClaimed);
        }

        self.pulses.store(0, Ordering::Relaxed);
        Ok(PulseHandle { channel: self })
    }
}

/// Exclusive main-loop end of a [`PulseChannel`].
///
/// Dropping the handle releases the claim, so a destroyed sensor leaves
/// nothing dangling: the interrupt handler only ever touches the `'static`
/// channel itself.
#[derive(Debug)]
pub struct PulseHandle {
    channel: &'static PulseChannel,
}

impl PulseHandle {
    /// Atomically reads and clears the edge count accumulated since the
    /// previous harvest (or since the claim).
    #[must_use]
    pub fn take(&mut self) -> u32 {
        self.channel.pulses.swap(0, Ordering::AcqRel)
    }

    /// Edge count accumulated so far, without clearing it.
    #[must_use]
    pub fn pending(&self) -> u32 {
        self.channel.pulses.load(Ordering::Relaxed)
    }
}

impl Drop for PulseHandle {
    fn drop(&mut self) {
        self.channel.claimed.store(false, Ordering::Release);
    }
}

/// Error returned by [`PulseChannel::claim()`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum ClaimError {
    /// The channel already has a live claimant.
    AlreadyClaimed,
}

impl core::fmt::Display for ClaimError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AlreadyClaimed => write!(f, "pulse channel already has a live claimant"),
        }
    }
}

impl core::error::Error for ClaimError {}
