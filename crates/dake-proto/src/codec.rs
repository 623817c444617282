//! Binary codec for handshake fields.
//!
//! All integers are big-endian. Variable-length fields carry a 4-byte length
//! prefix:
//!
//! ```text
//! DATA = len(u32) | bytes[len]
//! MPI  = len(u32) | magnitude[len]   (big-endian, minimal, zero = empty)
//! POINT = u[56]                      (Curve448, little-endian u-coordinate)
//! ```
//!
//! Every `serialize_*` function returns the number of bytes written. Every
//! `deserialize_*` function returns the decoded value together with the
//! number of bytes consumed, fails if the input is shorter than the field,
//! and never reads past the end of `src`. [`Reader`] wraps the deserializers
//! in a cursor for composing message decoders.

use bytes::BufMut;
use dake_crypto::{DH_MOD_BYTES, DhPublicKey, EC_POINT_BYTES, EcPoint};
use num_bigint::BigUint;

use crate::errors::{ProtocolError, Result};

/// Size of the length prefix of DATA and MPI fields
pub const LEN_PREFIX_BYTES: usize = 4;

/// Write one byte.
pub fn serialize_u8(dst: &mut impl BufMut, value: u8) -> usize {
    dst.put_u8(value);
    1
}

/// Write a big-endian `u16`.
pub fn serialize_u16(dst: &mut impl BufMut, value: u16) -> usize {
    dst.put_u16(value);
    2
}

/// Write a big-endian `u32`.
pub fn serialize_u32(dst: &mut impl BufMut, value: u32) -> usize {
    dst.put_u32(value);
    4
}

/// Write a big-endian `u64`.
pub fn serialize_u64(dst: &mut impl BufMut, value: u64) -> usize {
    dst.put_u64(value);
    8
}

/// Copy bytes verbatim.
pub fn serialize_bytes_array(dst: &mut impl BufMut, bytes: &[u8]) -> usize {
    dst.put_slice(bytes);
    bytes.len()
}

/// Write a length-prefixed byte string.
///
/// # Errors
///
/// - `ValueTooLarge` if `bytes` does not fit a `u32` length
pub fn serialize_data(dst: &mut impl BufMut, bytes: &[u8]) -> Result<usize> {
    serialize_prefixed(dst, "data", bytes)
}

/// Write an arbitrary-precision integer as length-prefixed magnitude.
pub fn serialize_mpi(dst: &mut impl BufMut, value: &BigUint) -> Result<usize> {
    serialize_prefixed(dst, "mpi", &mpi_magnitude(value))
}

/// Write a Curve448 point (56 bytes, no prefix).
pub fn serialize_ec_point(dst: &mut impl BufMut, point: &EcPoint) -> usize {
    dst.put_slice(point.as_bytes());
    EC_POINT_BYTES
}

/// Write a finite-field public value as an MPI.
///
/// # Errors
///
/// - `ValueTooLarge` if the magnitude is longer than the modulus
pub fn serialize_dh_public_key(dst: &mut impl BufMut, key: &DhPublicKey) -> Result<usize> {
    let magnitude = key.as_bytes_be();
    if magnitude.len() > DH_MOD_BYTES {
        return Err(ProtocolError::ValueTooLarge {
            field: "dh public key",
            size: magnitude.len(),
            max: DH_MOD_BYTES,
        });
    }

    serialize_prefixed(dst, "dh public key", magnitude)
}

/// Read one byte.
pub fn deserialize_u8(src: &[u8]) -> Result<(u8, usize)> {
    let [value] = deserialize_bytes_array::<1>(src, "u8")?.0;
    Ok((value, 1))
}

/// Read a big-endian `u16`.
pub fn deserialize_u16(src: &[u8]) -> Result<(u16, usize)> {
    let (bytes, n) = deserialize_bytes_array::<2>(src, "u16")?;
    Ok((u16::from_be_bytes(bytes), n))
}

/// Read a big-endian `u32`.
pub fn deserialize_u32(src: &[u8]) -> Result<(u32, usize)> {
    let (bytes, n) = deserialize_bytes_array::<4>(src, "u32")?;
    Ok((u32::from_be_bytes(bytes), n))
}

/// Read a big-endian `u64`.
pub fn deserialize_u64(src: &[u8]) -> Result<(u64, usize)> {
    let (bytes, n) = deserialize_bytes_array::<8>(src, "u64")?;
    Ok((u64::from_be_bytes(bytes), n))
}

/// Read exactly `N` bytes.
pub fn deserialize_bytes_array<const N: usize>(
    src: &[u8],
    field: &'static str,
) -> Result<([u8; N], usize)> {
    let bytes = take(src, N, field)?;
    let mut out = [0u8; N];
    out.copy_from_slice(bytes);
    Ok((out, N))
}

/// Read a length-prefixed byte string.
pub fn deserialize_data(src: &[u8]) -> Result<(Vec<u8>, usize)> {
    let (bytes, n) = prefixed(src, "data")?;
    Ok((bytes.to_vec(), n))
}

/// Read an arbitrary-precision integer.
pub fn deserialize_mpi(src: &[u8]) -> Result<(BigUint, usize)> {
    let (magnitude, n) = prefixed(src, "mpi")?;
    Ok((BigUint::from_bytes_be(magnitude), n))
}

/// Read a Curve448 point. Membership is not checked.
pub fn deserialize_ec_point(src: &[u8]) -> Result<(EcPoint, usize)> {
    let (bytes, n) = deserialize_bytes_array::<EC_POINT_BYTES>(src, "ec point")?;
    Ok((EcPoint::from_bytes(bytes), n))
}

/// Read a finite-field public value. Group membership is not checked.
///
/// # Errors
///
/// - `ValueTooLarge` if the declared magnitude is longer than the modulus
/// - `Truncated` if fewer bytes remain than declared
pub fn deserialize_dh_public_key(src: &[u8]) -> Result<(DhPublicKey, usize)> {
    let (len, _) = deserialize_u32(src)?;
    let len = len as usize;
    if len > DH_MOD_BYTES {
        return Err(ProtocolError::ValueTooLarge {
            field: "dh public key",
            size: len,
            max: DH_MOD_BYTES,
        });
    }

    let (magnitude, n) = prefixed(src, "dh public key")?;
    Ok((DhPublicKey::from_bytes_be(magnitude), n))
}

/// Bounds-checked cursor over an input buffer.
///
/// Each read advances the cursor only on success; after an error the
/// position is unchanged and the caller abandons the decode.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Start reading at the beginning of `buf`.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Unread input.
    pub fn remaining(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    /// Number of unread bytes.
    pub fn remaining_len(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Read one byte.
    pub fn u8(&mut self) -> Result<u8> {
        self.step(deserialize_u8)
    }

    /// Read a big-endian `u16`.
    pub fn u16(&mut self) -> Result<u16> {
        self.step(deserialize_u16)
    }

    /// Read a big-endian `u32`.
    pub fn u32(&mut self) -> Result<u32> {
        self.step(deserialize_u32)
    }

    /// Read a big-endian `u64`.
    pub fn u64(&mut self) -> Result<u64> {
        self.step(deserialize_u64)
    }

    /// Read exactly `N` bytes.
    pub fn array<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N]> {
        self.step(|src| deserialize_bytes_array::<N>(src, field))
    }

    /// Read a length-prefixed byte string.
    pub fn data(&mut self) -> Result<Vec<u8>> {
        self.step(deserialize_data)
    }

    /// Read an arbitrary-precision integer.
    pub fn mpi(&mut self) -> Result<BigUint> {
        self.step(deserialize_mpi)
    }

    /// Read a Curve448 point.
    pub fn ec_point(&mut self) -> Result<EcPoint> {
        self.step(deserialize_ec_point)
    }

    /// Read a finite-field public value.
    pub fn dh_public_key(&mut self) -> Result<DhPublicKey> {
        self.step(deserialize_dh_public_key)
    }

    /// Require that the whole input was consumed.
    ///
    /// # Errors
    ///
    /// - `TrailingBytes` if any input is left unread
    pub fn finish(&self) -> Result<()> {
        match self.remaining_len() {
            0 => Ok(()),
            count => Err(ProtocolError::TrailingBytes { count }),
        }
    }

    /// Decode with a `deserialize_*`-shaped function and advance past it.
    pub fn step<T>(&mut self, decode: impl FnOnce(&'a [u8]) -> Result<(T, usize)>) -> Result<T> {
        let (value, nread) = decode(self.remaining())?;
        debug_assert!(nread <= self.remaining_len());
        self.pos += nread;
        Ok(value)
    }
}

fn take<'a>(src: &'a [u8], len: usize, field: &'static str) -> Result<&'a [u8]> {
    src.get(..len).ok_or(ProtocolError::Truncated { field, expected: len, actual: src.len() })
}

fn prefixed<'a>(src: &'a [u8], field: &'static str) -> Result<(&'a [u8], usize)> {
    let (len, _) = deserialize_u32(src)?;
    let len = len as usize;
    let body = take(&src[LEN_PREFIX_BYTES..], len, field)?;
    Ok((body, LEN_PREFIX_BYTES + len))
}

fn serialize_prefixed(dst: &mut impl BufMut, field: &'static str, bytes: &[u8]) -> Result<usize> {
    let len = prefix_len(field, bytes.len())?;
    dst.put_u32(len);
    dst.put_slice(bytes);
    Ok(LEN_PREFIX_BYTES + bytes.len())
}

fn prefix_len(field: &'static str, len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| ProtocolError::ValueTooLarge {
        field,
        size: len,
        max: u32::MAX as usize,
    })
}

fn mpi_magnitude(value: &BigUint) -> Vec<u8> {
    if value.bits() == 0 { Vec::new() } else { value.to_bytes_be() }
}
