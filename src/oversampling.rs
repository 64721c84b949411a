//! Pressure oversampling modes
//!
//! The oversampling setting (`oss` in the datasheet) trades conversion time
//! for resolution. The same exponent appears in three places: the pressure
//! trigger command, the shift applied to the raw 24-bit read, and the `B3`/`B7`
//! terms of the pressure compensation.

/// Pressure oversampling mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Oversampling {
    /// 1 sample, 4.5 ms max conversion
    UltraLowPower = 0,
    /// 2 samples, 7.5 ms max conversion
    #[default]
    Standard = 1,
    /// 4 samples, 13.5 ms max conversion
    HighResolution = 2,
    /// 8 samples, 25.5 ms max conversion
    UltraHighResolution = 3,
}

impl Oversampling {
    /// Map a numeric mode to an oversampling setting
    ///
    /// Values outside `0..=3` fall back to [`Oversampling::Standard`] instead
    /// of being rejected. A misconfigured mode therefore still produces valid
    /// (standard resolution) readings; callers that need to detect it should
    /// validate the number themselves before calling this.
    #[must_use]
    pub const fn from_mode(mode: i32) -> Self {
        match mode {
            0 => Self::UltraLowPower,
            2 => Self::HighResolution,
            3 => Self::UltraHighResolution,
            _ => Self::Standard,
        }
    }

    /// The `oss` exponent (0..=3)
    #[must_use]
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Number of internal samples averaged per conversion
    #[must_use]
    pub const fn samples(self) -> u8 {
        1 << self.bits()
    }

    /// Settling time to wait after triggering a pressure conversion
    ///
    /// Datasheet maximum conversion time rounded up to the next millisecond.
    #[must_use]
    pub const fn conversion_time_ms(self) -> u32 {
        match self {
            Self::UltraLowPower => 5,
            Self::Standard => 8,
            Self::HighResolution => 14,
            Self::UltraHighResolution => 26,
        }
    }

    /// Right shift applied to the composed 24-bit pressure read
    #[must_use]
    pub const fn raw_shift(self) -> u8 {
        8 - self.bits()
    }
}

impl From<i32> for Oversampling {
    fn from(mode: i32) -> Self {
        Self::from_mode(mode)
    }
}
