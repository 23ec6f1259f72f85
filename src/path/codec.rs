//! Binary wire format for paths
//!
//! Layout, all integers and floats little-endian:
//!
//! ```text
//! offset      size  field
//! 0           4     magic "TKPH"
//! 4           2     format version (u16)
//! 6           4     records per wheel n (u32)
//! 10          32n   left wheel records
//! 10 + 32n    32n   right wheel records
//! ```
//!
//! A record is `position, velocity, display_x, display_y`, each an IEEE-754
//! binary64. Generation parameters such as the track width or the step are
//! not part of the format. Decoding is all-or-nothing: a truncated or corrupt
//! stream is an error, never a shorter path.

use std::io::{Read, Write};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::common::types::Point2D;
use crate::error::{PathError, Result};
use crate::path::{Path, WheelPathPoint};

pub const MAGIC: [u8; 4] = *b"TKPH";
pub const FORMAT_VERSION: u16 = 1;
pub const HEADER_LEN: usize = 10;
pub const RECORD_LEN: usize = 32;

/// Records reserved up front; the rest grows as data actually arrives
const MAX_PREALLOCATED_RECORDS: usize = 4096;

/// Serialize `path` into a new buffer
pub fn encode_to_vec(path: &Path) -> Result<Vec<u8>> {
    let count = record_count(path.len())?;

    let mut bytes = Vec::with_capacity(HEADER_LEN + 2 * RECORD_LEN * path.len());
    bytes.extend_from_slice(&MAGIC);
    bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    bytes.extend_from_slice(&count.to_le_bytes());
    for point in path.left().iter().chain(path.right()) {
        bytes.extend_from_slice(&encode_record(point));
    }
    Ok(bytes)
}

/// Write `path` to a blocking transport
pub fn encode_to_stream<W>(path: &Path, writer: &mut W) -> Result<()>
where
    W: Write + ?Sized,
{
    let bytes = encode_to_vec(path)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    log::debug!("wrote path: {} samples, {} bytes", path.len(), bytes.len());
    Ok(())
}

/// Read one path from a blocking transport
pub fn decode_from_stream<R>(reader: &mut R) -> Result<Path>
where
    R: Read + ?Sized,
{
    let mut header = [0u8; HEADER_LEN];
    reader.read_exact(&mut header)?;
    let count = parse_header(&header)?;

    let mut decoder = RecordDecoder::new(count);
    let mut record = [0u8; RECORD_LEN];
    while !decoder.is_complete() {
        reader.read_exact(&mut record)?;
        decoder.push(&record)?;
    }
    Ok(decoder.finish())
}

/// Decode a buffer holding exactly one encoded path
pub fn decode_from_slice(bytes: &[u8]) -> Result<Path> {
    let mut remaining = bytes;
    let path = decode_from_stream(&mut remaining)?;
    if !remaining.is_empty() {
        return Err(PathError::MalformedStream(format!(
            "{} trailing bytes after path",
            remaining.len()
        )));
    }
    Ok(path)
}

/// Write `path` to an async transport
pub async fn encode_to_async_stream<W>(path: &Path, writer: &mut W) -> Result<()>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let bytes = encode_to_vec(path)?;
    writer.write_all(&bytes).await?;
    writer.flush().await?;
    log::debug!("wrote path: {} samples, {} bytes", path.len(), bytes.len());
    Ok(())
}

/// Read one path from an async transport
pub async fn decode_from_async_stream<R>(reader: &mut R) -> Result<Path>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut header = [0u8; HEADER_LEN];
    reader.read_exact(&mut header).await?;
    let count = parse_header(&header)?;

    let mut decoder = RecordDecoder::new(count);
    let mut record = [0u8; RECORD_LEN];
    while !decoder.is_complete() {
        reader.read_exact(&mut record).await?;
        decoder.push(&record)?;
    }
    Ok(decoder.finish())
}

/// Record count header field for a path of `samples` points per wheel
fn record_count(samples: usize) -> Result<u32> {
    u32::try_from(samples).map_err(|_| PathError::TooManySamples(samples))
}

fn parse_header(header: &[u8; HEADER_LEN]) -> Result<usize> {
    if header[0..4] != MAGIC {
        return Err(PathError::MalformedStream(format!(
            "bad magic {:02x?}",
            &header[0..4]
        )));
    }

    let version = u16::from_le_bytes([header[4], header[5]]);
    if version != FORMAT_VERSION {
        return Err(PathError::ProtocolVersion {
            expected: FORMAT_VERSION,
            found: version,
        });
    }

    let count = u32::from_le_bytes([header[6], header[7], header[8], header[9]]);
    Ok(count as usize)
}

fn encode_record(point: &WheelPathPoint) -> [u8; RECORD_LEN] {
    let fields = [
        point.primitive.position,
        point.primitive.velocity,
        point.display_coordinate.x,
        point.display_coordinate.y,
    ];
    let mut record = [0u8; RECORD_LEN];
    for (chunk, value) in record.chunks_exact_mut(8).zip(fields) {
        chunk.copy_from_slice(&value.to_le_bytes());
    }
    record
}

fn read_field(record: &[u8; RECORD_LEN], field: usize) -> f64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&record[field * 8..field * 8 + 8]);
    f64::from_le_bytes(bytes)
}

/// Collects records for both wheels and validates them as they arrive
struct RecordDecoder {
    count: usize,
    left: Vec<WheelPathPoint>,
    right: Vec<WheelPathPoint>,
}

impl RecordDecoder {
    fn new(count: usize) -> Self {
        let capacity = count.min(MAX_PREALLOCATED_RECORDS);
        RecordDecoder {
            count,
            left: Vec::with_capacity(capacity),
            right: Vec::with_capacity(capacity),
        }
    }

    fn is_complete(&self) -> bool {
        self.left.len() == self.count && self.right.len() == self.count
    }

    fn push(&mut self, record: &[u8; RECORD_LEN]) -> Result<()> {
        let (side, wheel) = if self.left.len() < self.count {
            ("left", &mut self.left)
        } else {
            ("right", &mut self.right)
        };
        let index = wheel.len();

        let point = WheelPathPoint::new(
            read_field(record, 0),
            read_field(record, 1),
            Point2D::new(read_field(record, 2), read_field(record, 3)),
        );
        let finite = point.position().is_finite()
            && point.velocity().is_finite()
            && point.display_coordinate.iter().all(|v| v.is_finite());
        if !finite {
            return Err(PathError::MalformedStream(format!(
                "{} record {} holds a non-finite value",
                side, index
            )));
        }
        if let Some(previous) = wheel.last() {
            if point.position() < previous.position() {
                return Err(PathError::MalformedStream(format!(
                    "{} record {} moves backwards ({} < {})",
                    side,
                    index,
                    point.position(),
                    previous.position()
                )));
            }
        }

        wheel.push(point);
        Ok(())
    }

    fn finish(self) -> Path {
        Path::from_wheels(self.left, self.right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_path() -> Path {
        let left = vec![
            WheelPathPoint::new(0.0, 0.9, Point2D::new(0.0, 0.5)),
            WheelPathPoint::new(0.45, 0.9, Point2D::new(0.5, 0.55)),
        ];
        let right = vec![
            WheelPathPoint::new(0.0, 1.1, Point2D::new(0.0, -0.5)),
            WheelPathPoint::new(0.55, 1.1, Point2D::new(0.5, -0.45)),
        ];
        Path::from_wheels(left, right)
    }

    #[test]
    fn header_layout() {
        let bytes = encode_to_vec(&sample_path()).unwrap();
        assert_eq!(&bytes[0..4], b"TKPH");
        assert_eq!(&bytes[4..6], &[1, 0]);
        assert_eq!(&bytes[6..10], &[2, 0, 0, 0]);
        assert_eq!(bytes.len(), HEADER_LEN + 4 * RECORD_LEN);
        // first left record, position then velocity
        assert_eq!(&bytes[10..18], &0.0f64.to_le_bytes());
        assert_eq!(&bytes[18..26], &0.9f64.to_le_bytes());
    }

    #[test]
    fn round_trip_is_exact() {
        let path = sample_path();
        let decoded = decode_from_slice(&encode_to_vec(&path).unwrap()).unwrap();
        assert_eq!(decoded, path);
    }

    #[test]
    fn every_truncation_is_rejected() {
        let bytes = encode_to_vec(&sample_path()).unwrap();
        for len in 0..bytes.len() {
            let result = decode_from_slice(&bytes[..len]);
            assert!(
                matches!(result, Err(PathError::MalformedStream(_))),
                "length {} gave {:?}",
                len,
                result
            );
        }
    }

    #[test]
    fn version_mismatch_is_reported() {
        let mut bytes = encode_to_vec(&sample_path()).unwrap();
        bytes[4] = 7;
        assert!(matches!(
            decode_from_slice(&bytes),
            Err(PathError::ProtocolVersion {
                expected: 1,
                found: 7
            })
        ));
    }

    #[test]
    fn bad_magic_and_trailing_bytes_are_malformed() {
        let mut bytes = encode_to_vec(&sample_path()).unwrap();
        bytes.push(0);
        assert!(matches!(
            decode_from_slice(&bytes),
            Err(PathError::MalformedStream(_))
        ));

        bytes.pop();
        bytes[0] = b'X';
        assert!(matches!(
            decode_from_slice(&bytes),
            Err(PathError::MalformedStream(_))
        ));
    }

    #[test]
    fn non_finite_and_backwards_records_are_malformed() {
        let mut bytes = encode_to_vec(&sample_path()).unwrap();
        let velocity = HEADER_LEN + 8;
        bytes[velocity..velocity + 8].copy_from_slice(&f64::NAN.to_le_bytes());
        assert!(matches!(
            decode_from_slice(&bytes),
            Err(PathError::MalformedStream(_))
        ));

        let mut bytes = encode_to_vec(&sample_path()).unwrap();
        let second_position = HEADER_LEN + RECORD_LEN;
        bytes[second_position..second_position + 8].copy_from_slice(&(-1.0f64).to_le_bytes());
        assert!(matches!(
            decode_from_slice(&bytes),
            Err(PathError::MalformedStream(_))
        ));
    }

    #[test]
    fn record_count_overflow_is_an_encode_error() {
        assert_eq!(record_count(3).unwrap(), 3);
        assert_eq!(record_count(u32::MAX as usize).unwrap(), u32::MAX);
        #[cfg(target_pointer_width = "64")]
        assert!(matches!(
            record_count(u32::MAX as usize + 1),
            Err(PathError::TooManySamples(n)) if n == u32::MAX as usize + 1
        ));
    }

    #[test]
    fn huge_declared_count_fails_without_allocating_it() {
        let mut bytes = encode_to_vec(&Path::empty()).unwrap();
        bytes[6..10].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(
            decode_from_slice(&bytes),
            Err(PathError::MalformedStream(_))
        ));
    }

    #[test]
    fn stream_decoding_leaves_following_data_unread() {
        let path = sample_path();
        let mut bytes = encode_to_vec(&path).unwrap();
        encode_to_stream(&Path::empty(), &mut bytes).unwrap();

        let mut reader = bytes.as_slice();
        assert_eq!(decode_from_stream(&mut reader).unwrap(), path);
        assert_eq!(decode_from_stream(&mut reader).unwrap(), Path::empty());
        assert!(reader.is_empty());
    }

    #[tokio::test]
    async fn async_codec_interoperates_with_blocking_codec() {
        let path = sample_path();
        let mut buffer = Vec::new();
        encode_to_async_stream(&path, &mut buffer).await.unwrap();
        assert_eq!(buffer, encode_to_vec(&path).unwrap());

        let mut reader = buffer.as_slice();
        assert_eq!(decode_from_async_stream(&mut reader).await.unwrap(), path);
    }

    #[tokio::test]
    async fn async_truncation_is_malformed() {
        let bytes = encode_to_vec(&sample_path()).unwrap();
        let mut reader = &bytes[..bytes.len() - 1];
        assert!(matches!(
            decode_from_async_stream(&mut reader).await,
            Err(PathError::MalformedStream(_))
        ));
    }
}
