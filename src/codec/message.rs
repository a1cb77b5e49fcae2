use prost::Message;

use super::Buffer;

/// A message value which can be written by [`Buffer::encode_message`].
///
/// Only [`encode_to_vec`](EncodeMessage::encode_to_vec) is required. Types which can do better
/// expose one or more of the optional capabilities, which the buffer prefers in this order:
/// [`SizedAppend`], [`DeterministicAppend`] (when deterministic output is requested), then
/// [`Append`].
pub trait EncodeMessage {
    /// Serializes the message into a new vector.
    fn encode_to_vec(&self) -> Vec<u8>;

    /// Returns the sized-append capability, if the message can compute its length cheaply.
    fn as_sized(&self) -> Option<&dyn SizedAppend> {
        None
    }

    /// Returns the deterministic-append capability, if supported.
    fn as_deterministic(&self) -> Option<&dyn DeterministicAppend> {
        None
    }

    /// Returns the generic append capability, if supported.
    fn as_append(&self) -> Option<&dyn Append> {
        None
    }
}

/// A message which knows its encoded length and can write itself into a buffer.
pub trait SizedAppend {
    /// The exact number of bytes [`append_to`](SizedAppend::append_to) writes.
    fn encoded_len(&self) -> usize;

    /// Writes the message to the end of `buf`.
    fn append_to(&self, buf: &mut Buffer<'_>);
}

/// A message which can write itself with a stable byte representation.
pub trait DeterministicAppend {
    /// Writes the message to the end of `buf`, ordering map entries by key.
    fn append_deterministic(&self, buf: &mut Buffer<'_>);
}

/// A message which can write itself directly into a buffer.
pub trait Append {
    /// Writes the message to the end of `buf`.
    fn append_to(&self, buf: &mut Buffer<'_>);
}

/// Adapts a [`prost::Message`] so it can be written to a [`Buffer`].
#[derive(Debug, Clone, Copy)]
pub struct ProstMessage<'a, M>(pub &'a M);

impl<M> EncodeMessage for ProstMessage<'_, M>
where
    M: Message,
{
    fn encode_to_vec(&self) -> Vec<u8> {
        self.0.encode_to_vec()
    }

    fn as_sized(&self) -> Option<&dyn SizedAppend> {
        Some(self)
    }
}

impl<M> SizedAppend for ProstMessage<'_, M>
where
    M: Message,
{
    fn encoded_len(&self) -> usize {
        self.0.encoded_len()
    }

    fn append_to(&self, buf: &mut Buffer<'_>) {
        self.0
            .encode(buf.vec_mut())
            .expect("vec should have capacity");
    }
}
