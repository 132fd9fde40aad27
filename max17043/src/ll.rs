//! Low-level bus access: 2-byte register transfers and address discovery.

use embedded_hal::i2c::{I2c, Operation, SevenBitAddress};
use embedded_hal_async::i2c::{I2c as AsyncI2c, Operation as AsyncOperation};
use register_access::{AsyncRegisterAccess, Register, RegisterAccess};

// 7-bit addresses outside this range are reserved by the bus specification.
const FIRST_VALID_ADDRESS: SevenBitAddress = 0x08;
const LAST_VALID_ADDRESS: SevenBitAddress = 0x77;

/// Probes the bus and returns the first responding address, if any.
///
/// A device responds by acknowledging an empty write to its address.
pub fn scan_bus<I>(i2c: &mut I) -> Option<SevenBitAddress>
where
    I: I2c,
{
    (FIRST_VALID_ADDRESS..=LAST_VALID_ADDRESS).find(|&address| i2c.write(address, &[]).is_ok())
}

/// Asynchronous counterpart of [`scan_bus`].
pub async fn scan_bus_async<I>(i2c: &mut I) -> Option<SevenBitAddress>
where
    I: AsyncI2c,
{
    for address in FIRST_VALID_ADDRESS..=LAST_VALID_ADDRESS {
        if i2c.write(address, &[]).await.is_ok() {
            return Some(address);
        }
    }

    None
}

pub struct Max17043I2cInterface<I> {
    pub i2c: I,
    pub address: SevenBitAddress,
}

impl<I> RegisterAccess for Max17043I2cInterface<I>
where
    I: I2c,
{
    type Error = I::Error;

    fn read_register<R: Register>(&mut self) -> Result<R, Self::Error> {
        let mut bytes = [0; 2];
        self.i2c.transaction(
            self.address,
            &mut [
                Operation::Write(&[R::ADDRESS]),
                Operation::Read(&mut bytes),
            ],
        )?;

        Ok(R::from_bytes(bytes))
    }

    fn write_register<R: Register>(&mut self, reg: R) -> Result<(), Self::Error> {
        self.i2c.transaction(
            self.address,
            &mut [
                Operation::Write(&[R::ADDRESS]),
                Operation::Write(&reg.into_bytes()),
            ],
        )
    }
}

impl<I> AsyncRegisterAccess for Max17043I2cInterface<I>
where
    I: AsyncI2c,
{
    type Error = I::Error;

    async fn read_register_async<R: Register>(&mut self) -> Result<R, Self::Error> {
        let mut bytes = [0; 2];
        self.i2c
            .transaction(
                self.address,
                &mut [
                    AsyncOperation::Write(&[R::ADDRESS]),
                    AsyncOperation::Read(&mut bytes),
                ],
            )
            .await?;

        Ok(R::from_bytes(bytes))
    }

    async fn write_register_async<R: Register>(&mut self, reg: R) -> Result<(), Self::Error> {
        self.i2c
            .transaction(
                self.address,
                &mut [
                    AsyncOperation::Write(&[R::ADDRESS]),
                    AsyncOperation::Write(&reg.into_bytes()),
                ],
            )
            .await
    }
}
