use bitscript_hashes::HasherBase;

pub mod sighash;
pub mod sighash_type;
pub mod tx;

pub trait HasherExtensions {
    /// Writes the len as a Bitcoin compact size
    fn write_len(&mut self, len: usize) -> &mut Self;

    /// Writes a single u8
    fn write_u8(&mut self, element: u8) -> &mut Self;

    /// Writes the u32 as a little endian u8 array
    fn write_u32(&mut self, element: u32) -> &mut Self;

    /// Writes the i32 as a little endian u8 array
    fn write_i32(&mut self, element: i32) -> &mut Self;

    /// Writes the u64 as a little endian u8 array
    fn write_u64(&mut self, element: u64) -> &mut Self;

    /// Writes a compact size: 1, 3, 5 or 9 bytes depending on magnitude
    fn write_var_int(&mut self, element: u64) -> &mut Self;

    /// Writes the number of bytes followed by the bytes themselves
    fn write_var_bytes(&mut self, bytes: &[u8]) -> &mut Self;
}

impl<T: HasherBase> HasherExtensions for T {
    #[inline(always)]
    fn write_len(&mut self, len: usize) -> &mut Self {
        self.write_var_int(len as u64)
    }

    #[inline(always)]
    fn write_u8(&mut self, element: u8) -> &mut Self {
        self.update(element.to_le_bytes())
    }

    #[inline(always)]
    fn write_u32(&mut self, element: u32) -> &mut Self {
        self.update(element.to_le_bytes())
    }

    #[inline(always)]
    fn write_i32(&mut self, element: i32) -> &mut Self {
        self.update(element.to_le_bytes())
    }

    #[inline(always)]
    fn write_u64(&mut self, element: u64) -> &mut Self {
        self.update(element.to_le_bytes())
    }

    fn write_var_int(&mut self, element: u64) -> &mut Self {
        match element {
            0..=0xfc => self.write_u8(element as u8),
            0xfd..=0xffff => self.write_u8(0xfd).update((element as u16).to_le_bytes()),
            0x10000..=0xffff_ffff => self.write_u8(0xfe).write_u32(element as u32),
            _ => self.write_u8(0xff).write_u64(element),
        }
    }

    #[inline(always)]
    fn write_var_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.write_len(bytes.len()).update(bytes)
    }
}
