//! Outbound message encoding
//!
//! Every message the panel sends is an OSC address without arguments:
//! the ASCII address followed by a fixed three-byte NUL padding. This is
//! not a general OSC argument serializer.

use heapless::Vec;

/// Padding appended to every outbound address
pub const PADDING: [u8; 3] = [0, 0, 0];

/// Longest address accepted by the encoder
pub const MAX_ADDRESS_LEN: usize = 64;

/// Largest encoded message (address + padding)
pub const MAX_MESSAGE_SIZE: usize = MAX_ADDRESS_LEN + PADDING.len();

/// Errors that can occur while encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodeError {
    /// Address is empty
    EmptyAddress,
    /// Address exceeds [`MAX_ADDRESS_LEN`]
    AddressTooLong,
    /// Buffer too small for encoding
    BufferTooSmall,
}

/// Encode an address into a byte buffer
///
/// Returns the number of bytes written.
pub fn encode_address(address: &str, buffer: &mut [u8]) -> Result<usize, EncodeError> {
    let bytes = address.as_bytes();
    if bytes.is_empty() {
        return Err(EncodeError::EmptyAddress);
    }
    if bytes.len() > MAX_ADDRESS_LEN {
        return Err(EncodeError::AddressTooLong);
    }

    let len = bytes.len() + PADDING.len();
    if buffer.len() < len {
        return Err(EncodeError::BufferTooSmall);
    }

    buffer[..bytes.len()].copy_from_slice(bytes);
    buffer[bytes.len()..len].copy_from_slice(&PADDING);

    Ok(len)
}

/// Encode an address into a heapless Vec
pub fn encode_address_to_vec(address: &str) -> Result<Vec<u8, MAX_MESSAGE_SIZE>, EncodeError> {
    let mut buffer = [0u8; MAX_MESSAGE_SIZE];
    let len = encode_address(address, &mut buffer)?;
    let mut vec = Vec::new();
    vec.extend_from_slice(&buffer[..len])
        .map_err(|_| EncodeError::BufferTooSmall)?;
    Ok(vec)
}
