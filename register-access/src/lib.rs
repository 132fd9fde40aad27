#![no_std]
#![allow(async_fn_in_trait)]

/// A 16-bit device register with a fixed one-byte address.
///
/// Every register in the supported chip family transfers as exactly two
/// bytes, most significant byte first. Decoding and encoding of the byte
/// pair is the register type's responsibility and must not perform I/O.
pub trait Register: Sized + Copy {
    const ADDRESS: u8;
    const NAME: &'static str;

    fn from_bytes(bytes: [u8; 2]) -> Self;
    fn into_bytes(self) -> [u8; 2];
}

/// Blocking 2-byte register transfers over some bus interface.
pub trait RegisterAccess {
    type Error;

    fn read_register<R: Register>(&mut self) -> Result<R, Self::Error>;
    fn write_register<R: Register>(&mut self, reg: R) -> Result<(), Self::Error>;
}

/// Asynchronous counterpart of [`RegisterAccess`].
pub trait AsyncRegisterAccess {
    type Error;

    async fn read_register_async<R: Register>(&mut self) -> Result<R, Self::Error>;
    async fn write_register_async<R: Register>(&mut self, reg: R) -> Result<(), Self::Error>;
}
