use std::borrow::Cow;

use prost::encoding::WireType;

use super::{DecodeError, DecodeErrorKind, EncodeMessage};

/// The largest field number protobuf allows.
pub const MAX_FIELD_NUMBER: u32 = 536_870_911;

/// How deeply message and group values may nest while decoding. Matches `prost`.
pub const RECURSION_LIMIT: u32 = 100;

/// A byte cursor for reading and writing the protobuf binary format.
///
/// Reads consume bytes from the current read index. Writes always append to the end of the
/// buffer, converting borrowed contents into an owned copy on the first write.
#[derive(Debug, Clone, Default)]
pub struct Buffer<'a> {
    buf: Cow<'a, [u8]>,
    index: usize,
    deterministic: bool,
    depth: u32,
    tmp: Vec<u8>,
}

impl Buffer<'static> {
    /// Creates an empty buffer for writing.
    pub fn new() -> Self {
        Buffer::default()
    }

    /// Creates a buffer which owns `bytes`, positioned at the start.
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Buffer {
            buf: Cow::Owned(bytes),
            ..Default::default()
        }
    }
}

impl<'a> Buffer<'a> {
    /// Creates a buffer reading from `bytes` without copying them.
    pub fn from_slice(bytes: &'a [u8]) -> Self {
        Buffer {
            buf: Cow::Borrowed(bytes),
            index: 0,
            deterministic: false,
            depth: 0,
            tmp: Vec::new(),
        }
    }

    /// How many message or group values enclose the one being read.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub(crate) fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    /// The depth of a value nested directly in the one being read.
    pub(crate) fn nested_depth(&self) -> Result<u32, DecodeError> {
        if self.depth >= RECURSION_LIMIT {
            Err(DecodeErrorKind::RecursionLimitReached.into())
        } else {
            Ok(self.depth + 1)
        }
    }

    /// Returns `true` if map entries are written in key order.
    pub fn is_deterministic(&self) -> bool {
        self.deterministic
    }

    /// Sets whether map entries are written in key order, so that equal messages always produce
    /// identical bytes.
    pub fn set_deterministic(&mut self, deterministic: bool) {
        self.deterministic = deterministic;
    }

    /// All bytes in the buffer, including those already read.
    pub fn bytes(&self) -> &[u8] {
        &self.buf
    }

    /// The bytes which have not been read yet.
    pub fn remaining(&self) -> &[u8] {
        &self.buf[self.index..]
    }

    /// The current read index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns `true` if there are no more bytes to read.
    pub fn eof(&self) -> bool {
        self.index >= self.buf.len()
    }

    /// Discards the contents of the buffer, keeping any allocation.
    pub fn reset(&mut self) {
        match &mut self.buf {
            Cow::Owned(vec) => vec.clear(),
            Cow::Borrowed(_) => self.buf = Cow::Owned(Vec::new()),
        }
        self.index = 0;
    }

    /// Consumes the buffer, returning its contents.
    pub fn into_vec(self) -> Vec<u8> {
        self.buf.into_owned()
    }

    pub(crate) fn vec_mut(&mut self) -> &mut Vec<u8> {
        self.buf.to_mut()
    }

    /// Creates an empty buffer sharing this buffer's settings, backed by the scratch allocation.
    pub(crate) fn take_scratch(&mut self) -> Buffer<'static> {
        let mut tmp = std::mem::take(&mut self.tmp);
        tmp.clear();
        Buffer {
            buf: Cow::Owned(tmp),
            index: 0,
            deterministic: self.deterministic,
            depth: 0,
            tmp: Vec::new(),
        }
    }

    /// Returns a buffer created by [`take_scratch`](Buffer::take_scratch) so its allocation can be reused.
    pub(crate) fn restore_scratch(&mut self, scratch: Buffer<'static>) {
        let mut tmp = scratch.into_vec();
        tmp.clear();
        self.tmp = tmp;
    }

    fn take(&mut self, len: usize) -> Result<&[u8], DecodeError> {
        let start = self.index;
        let end = match start.checked_add(len) {
            Some(end) if end <= self.buf.len() => end,
            _ => return Err(DecodeErrorKind::UnexpectedEndOfInput.into()),
        };
        self.index = end;
        Ok(&self.buf[start..end])
    }

    /// Decodes a base-128 varint.
    pub fn decode_varint(&mut self) -> Result<u64, DecodeError> {
        let bytes = &self.buf[self.index..];
        let (value, len) = if bytes.len() >= 10 {
            decode_varint_fast(bytes)?
        } else {
            decode_varint_slow(bytes)?
        };
        self.index += len;
        Ok(value)
    }

    /// Decodes a little-endian 32-bit value.
    pub fn decode_fixed32(&mut self) -> Result<u32, DecodeError> {
        let mut bytes = [0; 4];
        bytes.copy_from_slice(self.take(4)?);
        Ok(u32::from_le_bytes(bytes))
    }

    /// Decodes a little-endian 64-bit value.
    pub fn decode_fixed64(&mut self) -> Result<u64, DecodeError> {
        let mut bytes = [0; 8];
        bytes.copy_from_slice(self.take(8)?);
        Ok(u64::from_le_bytes(bytes))
    }

    /// Decodes a zigzag-encoded 32-bit signed integer.
    pub fn decode_zigzag32(&mut self) -> Result<i32, DecodeError> {
        let value = self.decode_varint()?;
        let value = u32::try_from(value).map_err(|_| DecodeErrorKind::Overflow)?;
        Ok(to_sint32(value))
    }

    /// Decodes a zigzag-encoded 64-bit signed integer.
    pub fn decode_zigzag64(&mut self) -> Result<i64, DecodeError> {
        self.decode_varint().map(to_sint64)
    }

    /// Decodes a length-prefixed byte string.
    ///
    /// If `copy` is `false` the result borrows from this buffer.
    pub fn decode_raw_bytes(&mut self, copy: bool) -> Result<Cow<'_, [u8]>, DecodeError> {
        let len = self.decode_varint()?;
        let len = usize::try_from(len).map_err(|_| DecodeErrorKind::LengthOverflow)?;
        let bytes = self.take(len)?;
        if copy {
            Ok(Cow::Owned(bytes.to_vec()))
        } else {
            Ok(Cow::Borrowed(bytes))
        }
    }

    /// Decodes a field key, returning the field number and wire type.
    pub fn decode_tag_and_wire_type(&mut self) -> Result<(u32, WireType), DecodeError> {
        let key = self.decode_varint()?;
        let wire_type = wire_type_from_u64(key & 0x07)?;
        let number = key >> 3;
        if number == 0 || number > u64::from(MAX_FIELD_NUMBER) {
            return Err(DecodeErrorKind::InvalidTag(number).into());
        }
        Ok((number as u32, wire_type))
    }

    /// Reads the contents of a group whose start tag for field `number` has just been read.
    ///
    /// Returns the bytes between the start tag and the matching end tag. The end tag is consumed
    /// but not included.
    pub fn read_group(&mut self, number: u32) -> Result<&[u8], DecodeError> {
        let start = self.index;
        let end = self.scan_group(number)?;
        Ok(&self.buf[start..end])
    }

    /// Skips past a group whose start tag for field `number` has just been read.
    pub fn skip_group(&mut self, number: u32) -> Result<(), DecodeError> {
        self.scan_group(number).map(|_| ())
    }

    /// Advances past the matching end tag, returning the index at which it starts.
    fn scan_group(&mut self, number: u32) -> Result<usize, DecodeError> {
        let mut open = vec![number];
        loop {
            let tag_start = self.index;
            let (tag, wire_type) = self.decode_tag_and_wire_type()?;
            match wire_type {
                WireType::StartGroup => open.push(tag),
                WireType::EndGroup => {
                    if open.pop() != Some(tag) {
                        return Err(DecodeErrorKind::UnexpectedEndGroup(tag).into());
                    }
                    if open.is_empty() {
                        return Ok(tag_start);
                    }
                }
                _ => self.skip_value(tag, wire_type)?,
            }
        }
    }

    /// Skips the value of a field whose key has just been read.
    pub fn skip_value(&mut self, number: u32, wire_type: WireType) -> Result<(), DecodeError> {
        match wire_type {
            WireType::Varint => self.decode_varint().map(drop),
            WireType::SixtyFourBit => self.take(8).map(drop),
            WireType::LengthDelimited => self.decode_raw_bytes(false).map(drop),
            WireType::StartGroup => self.skip_group(number),
            WireType::EndGroup => Err(DecodeErrorKind::UnexpectedEndGroup(number).into()),
            WireType::ThirtyTwoBit => self.take(4).map(drop),
        }
    }

    /// Appends a base-128 varint.
    pub fn encode_varint(&mut self, value: u64) {
        put_varint(self.buf.to_mut(), value);
    }

    /// Appends a little-endian 32-bit value.
    pub fn encode_fixed32(&mut self, value: u32) {
        self.buf.to_mut().extend_from_slice(&value.to_le_bytes());
    }

    /// Appends a little-endian 64-bit value.
    pub fn encode_fixed64(&mut self, value: u64) {
        self.buf.to_mut().extend_from_slice(&value.to_le_bytes());
    }

    /// Appends a zigzag-encoded 32-bit signed integer.
    pub fn encode_zigzag32(&mut self, value: i32) {
        self.encode_varint(u64::from(from_sint32(value)));
    }

    /// Appends a zigzag-encoded 64-bit signed integer.
    pub fn encode_zigzag64(&mut self, value: i64) {
        self.encode_varint(from_sint64(value));
    }

    /// Appends a length-prefixed byte string.
    pub fn encode_raw_bytes(&mut self, bytes: &[u8]) {
        let buf = self.buf.to_mut();
        put_varint(buf, bytes.len() as u64);
        buf.extend_from_slice(bytes);
    }

    /// Appends a field key.
    pub fn encode_tag_and_wire_type(&mut self, number: u32, wire_type: WireType) {
        debug_assert!((1..=MAX_FIELD_NUMBER).contains(&number));
        self.encode_varint((u64::from(number) << 3) | wire_type as u64);
    }

    /// Appends the encoding of `message`, without a length prefix.
    pub fn encode_message(&mut self, message: &(impl EncodeMessage + ?Sized)) {
        if let Some(sized) = message.as_sized() {
            self.buf.to_mut().reserve(sized.encoded_len());
            sized.append_to(self);
        } else if let (true, Some(deterministic)) =
            (self.deterministic, message.as_deterministic())
        {
            deterministic.append_deterministic(self);
        } else if let Some(append) = message.as_append() {
            append.append_to(self);
        } else {
            let bytes = message.encode_to_vec();
            self.buf.to_mut().extend_from_slice(&bytes);
        }
    }

    /// Appends the encoding of `message` prefixed with its length.
    pub fn encode_delimited_message(&mut self, message: &(impl EncodeMessage + ?Sized)) {
        if let Some(sized) = message.as_sized() {
            let len = sized.encoded_len();
            self.encode_varint(len as u64);
            self.buf.to_mut().reserve(len);
            sized.append_to(self);
        } else if self.deterministic && message.as_deterministic().is_some()
            || message.as_append().is_some()
        {
            let mut scratch = self.take_scratch();
            scratch.encode_message(message);
            self.encode_raw_bytes(scratch.bytes());
            self.restore_scratch(scratch);
        } else {
            let bytes = message.encode_to_vec();
            self.encode_raw_bytes(&bytes);
        }
    }
}

fn decode_varint_fast(bytes: &[u8]) -> Result<(u64, usize), DecodeError> {
    debug_assert!(bytes.len() >= 10);

    let mut value = 0u64;
    macro_rules! step {
        ($i:expr) => {
            let b = bytes[$i];
            value |= u64::from(b & 0x7f) << (7 * $i);
            if b < 0x80 {
                return Ok((value, $i + 1));
            }
        };
    }

    step!(0);
    step!(1);
    step!(2);
    step!(3);
    step!(4);
    step!(5);
    step!(6);
    step!(7);
    step!(8);

    // Only the lowest bit of the tenth byte fits in a u64.
    let b = bytes[9];
    if b > 1 {
        return Err(DecodeErrorKind::Overflow.into());
    }
    value |= u64::from(b) << 63;
    Ok((value, 10))
}

fn decode_varint_slow(bytes: &[u8]) -> Result<(u64, usize), DecodeError> {
    let mut value = 0u64;
    for (i, &b) in bytes.iter().enumerate().take(10) {
        if i == 9 && b > 1 {
            return Err(DecodeErrorKind::Overflow.into());
        }
        value |= u64::from(b & 0x7f) << (7 * i);
        if b < 0x80 {
            return Ok((value, i + 1));
        }
    }

    if bytes.len() >= 10 {
        Err(DecodeErrorKind::Overflow.into())
    } else {
        Err(DecodeErrorKind::UnexpectedEndOfInput.into())
    }
}

pub(crate) fn put_varint(buf: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        buf.push((value as u8 & 0x7f) | 0x80);
        value >>= 7;
    }
    buf.push(value as u8);
}

pub(crate) fn wire_type_from_u64(value: u64) -> Result<WireType, DecodeError> {
    match value {
        0 => Ok(WireType::Varint),
        1 => Ok(WireType::SixtyFourBit),
        2 => Ok(WireType::LengthDelimited),
        3 => Ok(WireType::StartGroup),
        4 => Ok(WireType::EndGroup),
        5 => Ok(WireType::ThirtyTwoBit),
        _ => Err(DecodeErrorKind::BadWireType(value).into()),
    }
}

/// Zigzag-encodes a 32-bit signed integer.
pub fn from_sint32(value: i32) -> u32 {
    ((value << 1) ^ (value >> 31)) as u32
}

/// Zigzag-decodes a 32-bit value.
pub fn to_sint32(value: u32) -> i32 {
    ((value >> 1) as i32) ^ (-((value & 1) as i32))
}

/// Zigzag-encodes a 64-bit signed integer.
pub fn from_sint64(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

/// Zigzag-decodes a 64-bit value.
pub fn to_sint64(value: u64) -> i64 {
    ((value >> 1) as i64) ^ (-((value & 1) as i64))
}
