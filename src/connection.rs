//! Length-prefixed PDU framing over a byte stream.
//!
//! The session splits its stream into a reader half and a writer half;
//! the reader is the only caller of `read`, and writes are serialized by
//! the session behind a mutex. Both halves are generic over the tokio I/O
//! traits so tests can drive them with an in-memory duplex.

use crate::codec::{CodecError, HEADER_SIZE, MAX_PDU_SIZE};
use crate::pdu::Pdu;
use bytes::{Buf, BytesMut};
use std::io;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufWriter};

/// Errors surfaced by the framed reader.
#[derive(Debug, Error)]
pub enum FrameError {
    /// The peer closed mid-frame.
    #[error("connection reset by peer")]
    Reset,

    /// The frame was delimited but its content did not decode. The frame
    /// has been discarded; the reader can continue with the next one.
    #[error("malformed pdu: {0}")]
    Malformed(#[from] CodecError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Reads length-prefixed PDUs from a byte stream.
#[derive(Debug)]
pub struct PduReader<R> {
    stream: R,
    buffer: BytesMut,
}

impl<R: AsyncRead + Unpin> PduReader<R> {
    pub fn new(stream: R) -> PduReader<R> {
        PduReader {
            stream,
            buffer: BytesMut::with_capacity(4 * 1024),
        }
    }

    /// Read one PDU. Returns `Ok(None)` on a clean end of stream (no
    /// partial frame buffered). A `Malformed` error consumes the offending
    /// frame, so the caller may keep reading.
    pub async fn read_pdu(&mut self) -> Result<Option<Pdu>, FrameError> {
        loop {
            if let Some(pdu) = self.parse_frame()? {
                return Ok(Some(pdu));
            }

            if 0 == self.stream.read_buf(&mut self.buffer).await? {
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                return Err(FrameError::Reset);
            }
        }
    }

    fn parse_frame(&mut self) -> Result<Option<Pdu>, FrameError> {
        if self.buffer.len() < 4 {
            return Ok(None);
        }

        let declared = u32::from_be_bytes([
            self.buffer[0],
            self.buffer[1],
            self.buffer[2],
            self.buffer[3],
        ]);
        if declared < HEADER_SIZE as u32 {
            // drop the bogus length prefix and let the caller decide
            self.buffer.advance(4);
            return Err(CodecError::FrameTooSmall(declared).into());
        }
        if declared > MAX_PDU_SIZE {
            self.buffer.advance(4);
            return Err(CodecError::FrameTooLarge(declared).into());
        }

        let frame_len = declared as usize;
        if self.buffer.len() < frame_len {
            self.buffer.reserve(frame_len - self.buffer.len());
            return Ok(None);
        }

        let frame = self.buffer.split_to(frame_len);
        let pdu = Pdu::deserialize(&frame)?;
        Ok(Some(pdu))
    }
}

/// Writes PDUs to a byte stream. Each PDU is serialized and written as a
/// whole before flushing, so frames never interleave as long as callers
/// serialize access.
#[derive(Debug)]
pub struct PduWriter<W> {
    stream: BufWriter<W>,
}

impl<W: AsyncWrite + Unpin> PduWriter<W> {
    pub fn new(stream: W) -> PduWriter<W> {
        PduWriter {
            stream: BufWriter::new(stream),
        }
    }

    pub async fn write_pdu(&mut self, pdu: &Pdu) -> io::Result<()> {
        self.write_frame(&pdu.serialize()).await
    }

    /// Write an already-serialized frame.
    pub async fn write_frame(&mut self, frame: &[u8]) -> io::Result<()> {
        self.stream.write_all(frame).await?;
        self.stream.flush().await
    }

    pub async fn shutdown(&mut self) -> io::Result<()> {
        self.stream.shutdown().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatypes::CommandId;
    use tokio::io::duplex;

    #[tokio::test]
    async fn write_then_read_round_trip() {
        let (client, server) = duplex(1024);
        let mut writer = PduWriter::new(client);
        let mut reader = PduReader::new(server);

        let mut pdu = Pdu::new(CommandId::EnquireLink);
        pdu.set_seq(42);
        writer.write_pdu(&pdu).await.unwrap();

        let read = reader.read_pdu().await.unwrap().unwrap();
        assert_eq!(read.id(), CommandId::EnquireLink);
        assert_eq!(read.seq(), 42);
    }

    #[tokio::test]
    async fn reassembles_split_frames() {
        let (mut client, server) = duplex(1024);
        let mut reader = PduReader::new(server);

        let mut pdu = Pdu::new(CommandId::Unbind);
        pdu.set_seq(10);
        let bytes = pdu.serialize();

        let second = bytes[7..].to_vec();
        client.write_all(&bytes[..7]).await.unwrap();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            client.write_all(&second).await.unwrap();
            client
        });

        let read = reader.read_pdu().await.unwrap().unwrap();
        assert_eq!(read.id(), CommandId::Unbind);
        assert_eq!(read.seq(), 10);
        drop(handle.await.unwrap());
    }

    #[tokio::test]
    async fn clean_eof_returns_none() {
        let (client, server) = duplex(1024);
        let mut reader = PduReader::new(server);
        drop(client);
        assert!(reader.read_pdu().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn eof_mid_frame_is_reset() {
        let (mut client, server) = duplex(1024);
        let mut reader = PduReader::new(server);
        client.write_all(&[0x00, 0x00, 0x00, 0x10, 0x00]).await.unwrap();
        drop(client);
        assert!(matches!(reader.read_pdu().await, Err(FrameError::Reset)));
    }

    #[tokio::test]
    async fn undersized_length_prefix_is_rejected() {
        let (mut client, server) = duplex(1024);
        let mut reader = PduReader::new(server);
        client.write_all(&[0x00, 0x00, 0x00, 0x08]).await.unwrap();
        assert!(matches!(
            reader.read_pdu().await,
            Err(FrameError::Malformed(CodecError::FrameTooSmall(8)))
        ));
    }

    #[tokio::test]
    async fn malformed_frame_is_skipped_and_reading_continues() {
        let (mut client, server) = duplex(1024);
        let mut reader = PduReader::new(server);

        // bind_receiver_resp with a TLV whose declared length lies
        let bad = [
            0x00, 0x00, 0x00, 0x16, 0x80, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x01, 0x00, 0x02, 0x10, 0x00, 0x02, 0x34,
        ];
        client.write_all(&bad).await.unwrap();
        let mut good = Pdu::new(CommandId::EnquireLink);
        good.set_seq(5);
        client.write_all(&good.serialize()).await.unwrap();

        assert!(matches!(
            reader.read_pdu().await,
            Err(FrameError::Malformed(_))
        ));
        let next = reader.read_pdu().await.unwrap().unwrap();
        assert_eq!(next.id(), CommandId::EnquireLink);
        assert_eq!(next.seq(), 5);
    }
}
