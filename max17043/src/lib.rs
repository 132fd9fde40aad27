//! Driver for the MAX17043 single-cell LiPo fuel gauge.
//!
//! The chip exposes six 16-bit registers over I2C. This crate decodes them
//! into voltages, charge percentages and alert state, and issues the
//! quick-start and reset commands. Blocking and async variants are provided
//! over the `embedded-hal` and `embedded-hal-async` I2C traits.

#![cfg_attr(not(test), no_std)]

use embedded_hal::i2c::{I2c, SevenBitAddress};
use embedded_hal_async::i2c::I2c as AsyncI2c;
use register_access::{AsyncRegisterAccess, RegisterAccess};

mod fmt;

pub mod descriptors;
pub mod ll;

use crate::{
    descriptors::{Command, Config, Mode, Soc, VCell, Version},
    fmt::{debug, info, warning},
};

#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// A bus scan found no responding device.
    NoDeviceFound,
    /// The underlying bus transaction failed. The transport error is passed
    /// through unchanged; no retries are attempted.
    Transfer(E),
}

/// Point-in-time readout of everything the gauge reports.
///
/// Built by [`Max17043::snapshot`]; formatting is a separate concern, see the
/// [`core::fmt::Display`] impl.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Snapshot {
    pub address: SevenBitAddress,
    pub version: u16,
    pub cell_voltage: f32,
    pub state_of_charge: f32,
    pub compensate_value: u8,
    pub alert_threshold: u8,
    pub in_alert: bool,
}

impl core::fmt::Display for Snapshot {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "device address is {:#04x}", self.address)?;
        writeln!(f, "version is {}", self.version)?;
        writeln!(f, "vcell is {:.3} V", self.cell_voltage)?;
        writeln!(f, "soc is {:.1} %", self.state_of_charge)?;
        writeln!(f, "compensate value is {:#04x}", self.compensate_value)?;
        writeln!(f, "alert threshold is {} %", self.alert_threshold)?;
        write!(f, "in alert is {}", self.in_alert)
    }
}

#[cfg(feature = "ufmt-impl")]
impl ufmt::uDisplay for Snapshot {
    fn fmt<W>(&self, f: &mut ufmt::Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: ufmt::uWrite + ?Sized,
    {
        let millivolts = (self.cell_voltage * 1000.0) as u32;
        let tenth_percents = (self.state_of_charge * 10.0) as u32;

        ufmt::uwriteln!(f, "device address is {}", self.address)?;
        ufmt::uwriteln!(f, "version is {}", self.version)?;
        ufmt::uwriteln!(f, "vcell is {} mV", millivolts)?;
        ufmt::uwriteln!(
            f,
            "soc is {}.{} %",
            tenth_percents / 10,
            tenth_percents % 10
        )?;
        ufmt::uwriteln!(f, "compensate value is {}", self.compensate_value)?;
        ufmt::uwriteln!(f, "alert threshold is {} %", self.alert_threshold)?;
        ufmt::uwrite!(
            f,
            "in alert is {}",
            if self.in_alert { "yes" } else { "no" }
        )
    }
}

pub struct Max17043<I> {
    iface: ll::Max17043I2cInterface<I>,
}

impl<I> Max17043<I> {
    /// Binds the driver to a device at a known address. The real part always
    /// answers at `0x36`; use [`Max17043::scan`] to discover it instead.
    pub const fn new(i2c: I, address: SevenBitAddress) -> Self {
        Self {
            iface: ll::Max17043I2cInterface { i2c, address },
        }
    }

    /// The bus address the driver is bound to.
    pub const fn address(&self) -> SevenBitAddress {
        self.iface.address
    }

    pub fn inner_mut(&mut self) -> &mut I {
        &mut self.iface.i2c
    }

    /// Consumes the driver and hands the bus back to the caller.
    pub fn into_inner(self) -> I {
        self.iface.i2c
    }
}

impl<I> Max17043<I>
where
    I: I2c,
{
    /// Scans the bus and binds to the first responding address.
    pub fn scan(mut i2c: I) -> Result<Self, Error<I::Error>> {
        let Some(address) = ll::scan_bus(&mut i2c) else {
            warning!("no device answered the bus scan");
            return Err(Error::NoDeviceFound);
        };

        info!("fuel gauge found at address {}", address);
        Ok(Self::new(i2c, address))
    }

    /// Cell voltage in volts.
    pub fn read_vcell(&mut self) -> Result<f32, Error<I::Error>> {
        let vcell = self
            .iface
            .read_register::<VCell>()
            .map_err(Error::Transfer)?;

        Ok(vcell.volts())
    }

    /// State of charge in percent.
    pub fn read_soc(&mut self) -> Result<f32, Error<I::Error>> {
        let soc = self.iface.read_register::<Soc>().map_err(Error::Transfer)?;

        Ok(soc.percent())
    }

    /// Silicon version of the chip.
    pub fn read_version(&mut self) -> Result<u16, Error<I::Error>> {
        let version = self
            .iface
            .read_register::<Version>()
            .map_err(Error::Transfer)?;

        Ok(version.version())
    }

    /// The RCOMP calibration byte.
    pub fn compensate_value(&mut self) -> Result<u8, Error<I::Error>> {
        Ok(self.read_config()?.compensate())
    }

    /// Replaces the RCOMP calibration byte, leaving the alert configuration
    /// untouched.
    pub fn set_compensate_value(&mut self, rcomp: u8) -> Result<(), Error<I::Error>> {
        debug!("setting compensate value to {}", rcomp);

        let config = self.read_config()?;
        self.iface
            .write_register(config.with_compensate(rcomp))
            .map_err(Error::Transfer)
    }

    /// Low-charge alert threshold in percent.
    pub fn alert_threshold(&mut self) -> Result<u8, Error<I::Error>> {
        Ok(self.read_config()?.alert_threshold())
    }

    /// Sets the low-charge alert threshold. The chip can encode 1..=32
    /// percent; 0 and values above 32 both select 32%.
    ///
    /// This is a read-modify-write of the config register; it is not atomic
    /// with respect to other bus masters.
    pub fn set_alert_threshold(&mut self, threshold: u8) -> Result<(), Error<I::Error>> {
        debug!("setting alert threshold to {}%", threshold);

        let config = self.read_config()?;
        self.iface
            .write_register(config.with_alert_threshold(threshold))
            .map_err(Error::Transfer)
    }

    /// Whether the chip has latched a low-charge alert.
    pub fn is_in_alert(&mut self) -> Result<bool, Error<I::Error>> {
        Ok(self.read_config()?.in_alert())
    }

    /// Releases a latched alert. Reading the config register is what clears
    /// the latch; the value itself is discarded.
    pub fn clear_alert(&mut self) -> Result<(), Error<I::Error>> {
        self.read_config().map(|_| ())
    }

    /// Makes the gauge discard its charge estimate and start over from a
    /// fresh voltage reading. No read-back verification is performed.
    pub fn quick_start(&mut self) -> Result<(), Error<I::Error>> {
        debug!("issuing quick start");

        self.iface
            .write_register(Mode::quick_start())
            .map_err(Error::Transfer)
    }

    /// Fully resets the chip. The chip needs settling time before it
    /// responds again; the caller must not assume immediate availability.
    pub fn reset(&mut self) -> Result<(), Error<I::Error>> {
        debug!("issuing power-on reset");

        self.iface
            .write_register(Command::power_on_reset())
            .map_err(Error::Transfer)
    }

    /// Reads every register and collects the decoded values. Nothing is
    /// cached; each call queries the device again.
    pub fn snapshot(&mut self) -> Result<Snapshot, Error<I::Error>> {
        let config = self.read_config()?;

        Ok(Snapshot {
            address: self.address(),
            version: self.read_version()?,
            cell_voltage: self.read_vcell()?,
            state_of_charge: self.read_soc()?,
            compensate_value: config.compensate(),
            alert_threshold: config.alert_threshold(),
            in_alert: config.in_alert(),
        })
    }

    fn read_config(&mut self) -> Result<Config, Error<I::Error>> {
        self.iface.read_register().map_err(Error::Transfer)
    }
}

impl<I> Max17043<I>
where
    I: AsyncI2c,
{
    /// Scans the bus and binds to the first responding address.
    pub async fn scan_async(mut i2c: I) -> Result<Self, Error<I::Error>> {
        let Some(address) = ll::scan_bus_async(&mut i2c).await else {
            warning!("no device answered the bus scan");
            return Err(Error::NoDeviceFound);
        };

        info!("fuel gauge found at address {}", address);
        Ok(Self::new(i2c, address))
    }

    /// Cell voltage in volts.
    pub async fn read_vcell_async(&mut self) -> Result<f32, Error<I::Error>> {
        let vcell = self
            .iface
            .read_register_async::<VCell>()
            .await
            .map_err(Error::Transfer)?;

        Ok(vcell.volts())
    }

    /// State of charge in percent.
    pub async fn read_soc_async(&mut self) -> Result<f32, Error<I::Error>> {
        let soc = self
            .iface
            .read_register_async::<Soc>()
            .await
            .map_err(Error::Transfer)?;

        Ok(soc.percent())
    }

    /// Silicon version of the chip.
    pub async fn read_version_async(&mut self) -> Result<u16, Error<I::Error>> {
        let version = self
            .iface
            .read_register_async::<Version>()
            .await
            .map_err(Error::Transfer)?;

        Ok(version.version())
    }

    /// The RCOMP calibration byte.
    pub async fn compensate_value_async(&mut self) -> Result<u8, Error<I::Error>> {
        Ok(self.read_config_async().await?.compensate())
    }

    /// Replaces the RCOMP calibration byte, leaving the alert configuration
    /// untouched.
    pub async fn set_compensate_value_async(&mut self, rcomp: u8) -> Result<(), Error<I::Error>> {
        debug!("setting compensate value to {}", rcomp);

        let config = self.read_config_async().await?;
        self.iface
            .write_register_async(config.with_compensate(rcomp))
            .await
            .map_err(Error::Transfer)
    }

    /// Low-charge alert threshold in percent.
    pub async fn alert_threshold_async(&mut self) -> Result<u8, Error<I::Error>> {
        Ok(self.read_config_async().await?.alert_threshold())
    }

    /// Sets the low-charge alert threshold. The chip can encode 1..=32
    /// percent; 0 and values above 32 both select 32%.
    pub async fn set_alert_threshold_async(&mut self, threshold: u8) -> Result<(), Error<I::Error>> {
        debug!("setting alert threshold to {}%", threshold);

        let config = self.read_config_async().await?;
        self.iface
            .write_register_async(config.with_alert_threshold(threshold))
            .await
            .map_err(Error::Transfer)
    }

    /// Whether the chip has latched a low-charge alert.
    pub async fn is_in_alert_async(&mut self) -> Result<bool, Error<I::Error>> {
        Ok(self.read_config_async().await?.in_alert())
    }

    /// Releases a latched alert by reading the config register.
    pub async fn clear_alert_async(&mut self) -> Result<(), Error<I::Error>> {
        self.read_config_async().await.map(|_| ())
    }

    /// Makes the gauge discard its charge estimate and start over from a
    /// fresh voltage reading.
    pub async fn quick_start_async(&mut self) -> Result<(), Error<I::Error>> {
        debug!("issuing quick start");

        self.iface
            .write_register_async(Mode::quick_start())
            .await
            .map_err(Error::Transfer)
    }

    /// Fully resets the chip.
    pub async fn reset_async(&mut self) -> Result<(), Error<I::Error>> {
        debug!("issuing power-on reset");

        self.iface
            .write_register_async(Command::power_on_reset())
            .await
            .map_err(Error::Transfer)
    }

    /// Reads every register and collects the decoded values.
    pub async fn snapshot_async(&mut self) -> Result<Snapshot, Error<I::Error>> {
        let config = self.read_config_async().await?;

        Ok(Snapshot {
            address: self.address(),
            version: self.read_version_async().await?,
            cell_voltage: self.read_vcell_async().await?,
            state_of_charge: self.read_soc_async().await?,
            compensate_value: config.compensate(),
            alert_threshold: config.alert_threshold(),
            in_alert: config.in_alert(),
        })
    }

    async fn read_config_async(&mut self) -> Result<Config, Error<I::Error>> {
        self.iface
            .read_register_async()
            .await
            .map_err(Error::Transfer)
    }
}
