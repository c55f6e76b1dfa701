// Message framing: 4-byte little-endian length followed by a JSON document.

use std::io;

use byteorder::{ByteOrder, LittleEndian};
use serde::{Serialize, de};
use thiserror::Error;

use crate::token::{Token, TokenState};


// A token snapshot is well under a hundred bytes. Anything this big is garbage, and we'd rather
// not allocate for it.
pub const MAX_MESSAGE_LEN: u32 = 64 * 1024;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("{0}")]
    Io(#[from] io::Error),
    #[error("peer closed the connection")]
    ConnectionClosed,
    #[error("message of {0} bytes exceeds the limit")]
    Oversized(u32),
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("invalid token: {0}")]
    InvalidToken(String),
}

fn map_read_err(err: io::Error) -> CodecError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        CodecError::ConnectionClosed
    } else {
        CodecError::Io(err)
    }
}

pub fn write_frame(writer: &mut impl io::Write, data: &[u8]) -> Result<(), CodecError> {
    let len = u32::try_from(data.len()).unwrap_or(u32::MAX);
    if len > MAX_MESSAGE_LEN {
        return Err(CodecError::Oversized(len));
    }
    let mut len_buf = [0u8; 4];
    LittleEndian::write_u32(&mut len_buf, len);
    writer.write_all(&len_buf)?;
    writer.write_all(data)?;
    writer.flush()?;
    Ok(())
}

pub fn read_frame(reader: &mut impl io::Read) -> Result<Vec<u8>, CodecError> {
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf).map_err(map_read_err)?;
    let len = LittleEndian::read_u32(&len_buf);
    if len > MAX_MESSAGE_LEN {
        return Err(CodecError::Oversized(len));
    }
    let mut content_buf = vec![0; len as usize];
    reader.read_exact(&mut content_buf).map_err(map_read_err)?;
    Ok(content_buf)
}

pub fn write_obj(writer: &mut impl io::Write, obj: &impl Serialize) -> Result<(), CodecError> {
    write_frame(writer, &serde_json::to_vec(obj)?)
}

pub fn read_obj<T>(reader: &mut impl io::Read) -> Result<T, CodecError>
where
    T: de::DeserializeOwned,
{
    Ok(serde_json::from_slice(&read_frame(reader)?)?)
}

// Only the snapshot travels; the local guard stays behind.
pub fn send_token(writer: &mut impl io::Write, token: &Token) -> Result<(), CodecError> {
    write_obj(writer, &token.snapshot())
}

pub fn receive_token(reader: &mut impl io::Read) -> Result<Token, CodecError> {
    let state: TokenState = read_obj(reader)?;
    Token::from_state(state).map_err(CodecError::InvalidToken)
}
