//! MAX17043 register map.
//!
//! Every register is a 16-bit word transferred most significant byte first.
//! The types here only pack and unpack the raw byte pair; bus transfers live
//! in [`crate::ll`].

use register_access::Register;

macro_rules! register {
    ($(#[$meta:meta])* $name:ident @ $address:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Debug)]
        #[cfg_attr(feature = "defmt", derive(defmt::Format))]
        pub struct $name {
            bytes: [u8; 2],
        }

        impl Register for $name {
            const ADDRESS: u8 = $address;
            const NAME: &'static str = stringify!($name);

            fn from_bytes(bytes: [u8; 2]) -> Self {
                Self { bytes }
            }

            fn into_bytes(self) -> [u8; 2] {
                self.bytes
            }
        }
    };
}

register! {
    /// Cell voltage measurement, 12 bits left-justified in the word.
    VCell @ 0x02
}

impl VCell {
    /// Cell voltage in volts.
    ///
    /// ```rust
    /// # use register_access::Register;
    /// # use max17043::descriptors::VCell;
    /// assert_eq!(VCell::from_bytes([0x30, 0x90]).volts(), 0.777);
    /// ```
    // TODO: the datasheet specifies a 1.25 mV LSB; confirm whether the /1000
    // scaling is intended before changing it.
    pub fn volts(self) -> f32 {
        let [msb, lsb] = self.bytes;
        let raw = u16::from(msb) << 4 | u16::from(lsb) >> 4;

        f32::from(raw) / 1000.0
    }
}

register! {
    /// State of charge estimate. The high byte is whole percent, the low
    /// byte is 1/256th percent.
    Soc @ 0x04
}

impl Soc {
    /// State of charge in percent.
    pub fn percent(self) -> f32 {
        let [int, frac] = self.bytes;

        f32::from(int) + f32::from(frac) / 256.0
    }
}

register! {
    /// Write-only command register used to restart the gauge's estimate.
    Mode @ 0x06
}

impl Mode {
    /// Forces the gauge to discard its charge estimate and restart from a
    /// fresh voltage reading.
    pub const fn quick_start() -> Self {
        Self {
            bytes: [0x40, 0x00],
        }
    }
}

register! {
    /// Silicon version, read-only.
    Version @ 0x08
}

impl Version {
    pub fn version(self) -> u16 {
        u16::from_be_bytes(self.bytes)
    }
}

register! {
    /// Compensation and alert configuration.
    ///
    /// The high byte holds the opaque RCOMP calibration value. The low byte
    /// packs the inverted alert threshold into bits 0..5 and the alert latch
    /// into bit 5; bits 6 and 7 control sleep mode and are left untouched.
    Config @ 0x0C
}

impl Config {
    const ALERT_LATCH: u8 = 0x20;
    const THRESHOLD_MASK: u8 = 0x1F;

    /// The RCOMP calibration byte, passed through unmodified.
    pub fn compensate(self) -> u8 {
        self.bytes[0]
    }

    pub fn with_compensate(self, rcomp: u8) -> Self {
        Self {
            bytes: [rcomp, self.bytes[1]],
        }
    }

    /// Low-charge alert threshold in percent, 0..=32.
    pub fn alert_threshold(self) -> u8 {
        32 - (self.bytes[1] & Self::THRESHOLD_MASK)
    }

    /// Replaces the threshold field, preserving the rest of the low byte.
    ///
    /// The chip stores the threshold inverted in five bits, which can only
    /// encode 1..=32 percent. Requesting 0 produces the field's zero
    /// encoding, which the chip treats as 32%; values of 32 and above all
    /// select 32% as well. Bits outside the field, the alert latch included,
    /// are never touched.
    pub fn with_alert_threshold(self, threshold: u8) -> Self {
        let inverted = 32u8.saturating_sub(threshold) & Self::THRESHOLD_MASK;

        Self {
            bytes: [
                self.bytes[0],
                (self.bytes[1] & !Self::THRESHOLD_MASK) | inverted,
            ],
        }
    }

    /// Whether the chip has latched a low-charge alert.
    pub fn in_alert(self) -> bool {
        self.bytes[1] & Self::ALERT_LATCH != 0
    }
}

register! {
    /// Write-only command register for chip-level commands.
    Command @ 0xFE
}

impl Command {
    /// Completely resets the chip as if power had been removed. The chip
    /// needs settling time before it responds again.
    pub const fn power_on_reset() -> Self {
        Self {
            bytes: [0x00, 0x54],
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn register_addresses_match_the_datasheet() {
        assert_eq!(VCell::ADDRESS, 0x02);
        assert_eq!(Soc::ADDRESS, 0x04);
        assert_eq!(Mode::ADDRESS, 0x06);
        assert_eq!(Version::ADDRESS, 0x08);
        assert_eq!(Config::ADDRESS, 0x0C);
        assert_eq!(Command::ADDRESS, 0xFE);
    }

    #[test]
    fn vcell_uses_the_upper_12_bits() {
        #[rustfmt::skip]
        let table = [
            ([0x00, 0x00], 0.0),
            ([0x30, 0x90], 0.777),
            ([0x60, 0x10], 1.537),
            ([0xFF, 0xF0], 4.095),
        ];

        for (bytes, volts) in table {
            assert_eq!(VCell::from_bytes(bytes).volts(), volts);
        }
    }

    #[test]
    fn soc_has_a_fractional_low_byte() {
        #[rustfmt::skip]
        let table = [
            ([0, 0], 0.0),
            ([97, 128], 97.5),
            ([100, 64], 100.25),
        ];

        for (bytes, percent) in table {
            assert_eq!(Soc::from_bytes(bytes).percent(), percent);
        }
    }

    #[test]
    fn version_is_big_endian() {
        assert_eq!(Version::from_bytes([0x00, 0x03]).version(), 3);
        assert_eq!(Version::from_bytes([0x12, 0x34]).version(), 0x1234);
    }

    #[test]
    fn command_patterns_are_fixed() {
        assert_eq!(Mode::quick_start().into_bytes(), [0x40, 0x00]);
        assert_eq!(Command::power_on_reset().into_bytes(), [0x00, 0x54]);
    }

    #[test]
    fn compensate_is_the_high_byte() {
        let config = Config::from_bytes([0x97, 0xA5]);

        assert_eq!(config.compensate(), 0x97);
        assert_eq!(config.with_compensate(0x42).into_bytes(), [0x42, 0xA5]);
    }

    #[test]
    fn alert_threshold_round_trips() {
        for base in [0x00, 0x45, 0xA5] {
            for threshold in 1..=32 {
                let config = Config::from_bytes([0x97, base]).with_alert_threshold(threshold);

                assert_eq!(config.alert_threshold(), threshold);
            }
        }
    }

    #[test]
    fn alert_threshold_zero_is_not_representable() {
        // Five inverted bits encode 1..=32 percent; the zero encoding reads
        // back as 32%.
        let config = Config::from_bytes([0x97, 0x45]).with_alert_threshold(0);

        assert_eq!(config.into_bytes(), [0x97, 0x40]);
        assert_eq!(config.alert_threshold(), 32);
        assert!(!config.in_alert());
    }

    #[test]
    fn alert_threshold_preserves_unrelated_bits() {
        // 0xA5 keeps its top three bits; 32 - 10 lands in the low five.
        let config = Config::from_bytes([0x97, 0xA5]).with_alert_threshold(10);

        assert_eq!(config.into_bytes(), [0x97, 0xB6]);

        // The alert latch stays clear even where the inverted value would
        // otherwise spill into bit 5.
        for threshold in [0, 32, 40] {
            let config = Config::from_bytes([0x97, 0x45]).with_alert_threshold(threshold);

            assert_eq!(config.into_bytes()[1] & 0xE0, 0x40);
        }
    }

    #[test]
    fn alert_threshold_saturates_at_32() {
        let config = Config::from_bytes([0x97, 0x16]);

        assert_eq!(
            config.with_alert_threshold(40).into_bytes(),
            config.with_alert_threshold(32).into_bytes()
        );
    }

    #[test]
    fn alert_latch_is_bit_5_of_the_low_byte() {
        assert!(Config::from_bytes([0x97, 0x20]).in_alert());
        assert!(Config::from_bytes([0x97, 0xFF]).in_alert());
        assert!(!Config::from_bytes([0x97, 0xDF]).in_alert());
        assert!(!Config::from_bytes([0x97, 0x00]).in_alert());
    }
}
