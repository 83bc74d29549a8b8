//! Vault instruction payload codec.
//!
//! Each instruction kind is a tag byte followed by a fixed set of
//! little-endian `u64` fields:
//!
//! ```text
//! CreateAccount   [0x00][vinnies: u64 LE][space: u64 LE]   17 bytes
//! Transfer        [0x01][vinnies: u64 LE]                    9 bytes
//! ```
//!
//! The codec is the last line of defence for field bounds: a zero amount is
//! rejected here on encode *and* on decode, whatever the caller already
//! checked.

use thiserror::Error;

/// Errors from encoding or decoding instruction payloads.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("invalid field `{field}`: {reason}")]
    InvalidField {
        field: &'static str,
        reason: &'static str,
    },

    #[error("truncated payload: expected {expected} bytes, got {actual}")]
    TruncatedPayload { expected: usize, actual: usize },

    #[error("unknown instruction tag: {0}")]
    UnknownTag(u8),
}

/// Discriminant byte of each instruction kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum InstructionKind {
    CreateAccount = 0,
    Transfer = 1,
}

impl InstructionKind {
    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn from_tag(tag: u8) -> Result<Self, CodecError> {
        match tag {
            0 => Ok(Self::CreateAccount),
            1 => Ok(Self::Transfer),
            other => Err(CodecError::UnknownTag(other)),
        }
    }

    /// Fixed encoded size including the tag byte.
    pub fn span(self) -> usize {
        match self {
            Self::CreateAccount => 1 + 8 + 8,
            Self::Transfer => 1 + 8,
        }
    }
}

/// A decoded vault instruction payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultInstruction {
    /// Fund a new account with `vinnies` and reserve `space` bytes for it.
    CreateAccount { vinnies: u64, space: u64 },
    /// Move `vinnies` between accounts.
    Transfer { vinnies: u64 },
}

impl VaultInstruction {
    /// Builds a payload from signed inputs, e.g. amounts parsed from a
    /// request body. Negative or zero values fail with `InvalidField`
    /// instead of wrapping or clamping.
    ///
    /// `space` is ignored for [`InstructionKind::Transfer`].
    pub fn from_signed(kind: InstructionKind, vinnies: i64, space: i64) -> Result<Self, CodecError> {
        let vinnies = positive("vinnies", vinnies)?;
        let instruction = match kind {
            InstructionKind::CreateAccount => Self::CreateAccount {
                vinnies,
                space: positive("space", space)?,
            },
            InstructionKind::Transfer => Self::Transfer { vinnies },
        };
        instruction.validate()?;
        Ok(instruction)
    }

    pub fn kind(&self) -> InstructionKind {
        match self {
            Self::CreateAccount { .. } => InstructionKind::CreateAccount,
            Self::Transfer { .. } => InstructionKind::Transfer,
        }
    }

    /// Checks field bounds: every amount and size must be non-zero.
    pub fn validate(&self) -> Result<(), CodecError> {
        match *self {
            Self::CreateAccount { vinnies, space } => {
                non_zero("vinnies", vinnies)?;
                non_zero("space", space)
            }
            Self::Transfer { vinnies } => non_zero("vinnies", vinnies),
        }
    }

    /// Encodes to the fixed little-endian layout.
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        self.validate()?;

        let kind = self.kind();
        let mut buf = Vec::with_capacity(kind.span());
        buf.push(kind.tag());
        match *self {
            Self::CreateAccount { vinnies, space } => {
                buf.extend_from_slice(&vinnies.to_le_bytes());
                buf.extend_from_slice(&space.to_le_bytes());
            }
            Self::Transfer { vinnies } => {
                buf.extend_from_slice(&vinnies.to_le_bytes());
            }
        }
        Ok(buf)
    }

    /// Decodes a payload produced by [`encode`](Self::encode).
    ///
    /// Bytes past the kind's fixed span are ignored.
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let &tag = bytes.first().ok_or(CodecError::TruncatedPayload {
            expected: 1,
            actual: 0,
        })?;
        let kind = InstructionKind::from_tag(tag)?;
        if bytes.len() < kind.span() {
            return Err(CodecError::TruncatedPayload {
                expected: kind.span(),
                actual: bytes.len(),
            });
        }

        let instruction = match kind {
            InstructionKind::CreateAccount => Self::CreateAccount {
                vinnies: read_u64(bytes, 1),
                space: read_u64(bytes, 9),
            },
            InstructionKind::Transfer => Self::Transfer {
                vinnies: read_u64(bytes, 1),
            },
        };
        instruction.validate()?;
        Ok(instruction)
    }
}

/// Reads a little-endian `u64` at `offset`. Callers check the span first.
fn read_u64(bytes: &[u8], offset: usize) -> u64 {
    let mut arr = [0u8; 8];
    arr.copy_from_slice(&bytes[offset..offset + 8]);
    u64::from_le_bytes(arr)
}

fn non_zero(field: &'static str, value: u64) -> Result<(), CodecError> {
    if value == 0 {
        return Err(CodecError::InvalidField {
            field,
            reason: "must be greater than 0",
        });
    }
    Ok(())
}

fn positive(field: &'static str, value: i64) -> Result<u64, CodecError> {
    if value <= 0 {
        return Err(CodecError::InvalidField {
            field,
            reason: "must be greater than 0",
        });
    }
    Ok(value as u64)
}
