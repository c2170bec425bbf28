//! Persistent session storage abstraction
//!
//! The recorder sees one logical file. Implementations back it with a real
//! filesystem, raw flash, or an in-memory buffer for tests. All operations
//! are synchronous and expected to complete within a few milliseconds; the
//! tick simply runs long if they do not.

/// Errors from session storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// Underlying storage operation failed
    Io,
    /// The session file does not exist
    NotFound,
    /// Stored data is damaged or unreadable
    Corrupted,
    /// No space left for the write
    Full,
}

/// Append-oriented session file storage
pub trait SessionStore {
    /// Size of the session file in bytes, or `None` if it does not exist
    fn size(&mut self) -> Result<Option<u32>, StoreError>;

    /// Read up to `buf.len()` bytes starting at `offset`
    ///
    /// Returns the number of bytes actually read (short at end of file).
    fn read_at(&mut self, offset: u32, buf: &mut [u8]) -> Result<usize, StoreError>;

    /// Append bytes to the session file, creating it if absent
    fn append(&mut self, data: &[u8]) -> Result<(), StoreError>;

    /// Delete the session file; deleting an absent file is not an error
    fn remove(&mut self) -> Result<(), StoreError>;
}
