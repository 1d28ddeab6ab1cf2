use std::io::{self, Read};
use std::time::Duration;

use serialport::SerialPort;

/// Read timeout on the serial handle. Short enough that an idle line cannot
/// stall a render tick.
const READ_TIMEOUT: Duration = Duration::from_millis(1);

/// Latest attitude reported over the wire. Angles in degrees, height in
/// meters; display scaling happens in the render stage.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Attitude {
    pub roll_deg: f32,
    pub pitch_deg: f32,
    pub height_m: f32,
}

#[derive(Debug, thiserror::Error)]
#[error("cannot open serial device {device} at {baud} baud")]
pub struct OpenError {
    pub device: String,
    pub baud: u32,
    #[source]
    source: serialport::Error,
}

/// One end of the `roll,pitch,height` telemetry stream.
///
/// Generic over the byte source so tests can feed it from memory; the real
/// instantiation wraps a serial port.
pub struct TelemetryLink<R> {
    reader: R,
    /// Bytes received after the last newline, kept until the record completes.
    carry: Vec<u8>,
}

impl TelemetryLink<Box<dyn SerialPort>> {
    pub fn open(device: &str, baud: u32) -> Result<Self, OpenError> {
        let port = serialport::new(device, baud)
            .timeout(READ_TIMEOUT)
            .open()
            .map_err(|source| OpenError {
                device: device.to_owned(),
                baud,
                source,
            })?;
        Ok(Self::from_reader(port))
    }
}

impl<R: Read> TelemetryLink<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader,
            carry: Vec::new(),
        }
    }

    /// Drains whatever is currently buffered on the line and returns the last
    /// well-formed record of the batch, or `None` when nothing usable arrived.
    ///
    /// Garbled traffic is expected at stream rates; read errors end the drain
    /// and are otherwise swallowed so the caller's loop never stops.
    pub fn poll(&mut self) -> Option<Attitude> {
        let mut chunk = [0u8; 512];
        loop {
            match self.reader.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => {
                    self.carry.extend_from_slice(&chunk[..n]);
                    if n < chunk.len() {
                        break;
                    }
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(_) => break,
            }
        }
        self.take_latest()
    }

    /// Splits complete records off the carry buffer; an unterminated tail
    /// stays behind for the next poll.
    fn take_latest(&mut self) -> Option<Attitude> {
        let end = self.carry.iter().rposition(|&b| b == b'\n')?;
        let complete: Vec<u8> = self.carry.drain(..=end).collect();
        let text = String::from_utf8_lossy(&complete);
        text.lines().rev().find_map(parse_record)
    }
}

/// Parses one wire record: exactly three comma-separated floats in the order
/// roll, pitch, height. Anything else is noise.
pub fn parse_record(line: &str) -> Option<Attitude> {
    let fields: Vec<&str> = line.trim().split(',').collect();
    match fields.as_slice() {
        [roll, pitch, height] => Some(Attitude {
            roll_deg: roll.trim().parse().ok()?,
            pitch_deg: pitch.trim().parse().ok()?,
            height_m: height.trim().parse().ok()?,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io::Cursor;

    /// Hands out one chunk per read call, like bytes trickling in between
    /// polls.
    struct Feed {
        chunks: VecDeque<Vec<u8>>,
    }

    impl Feed {
        fn new<const N: usize>(chunks: [&[u8]; N]) -> Self {
            Self {
                chunks: chunks.iter().map(|c| c.to_vec()).collect(),
            }
        }
    }

    impl Read for Feed {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.chunks.pop_front() {
                Some(chunk) => {
                    buf[..chunk.len()].copy_from_slice(&chunk);
                    Ok(chunk.len())
                }
                None => Ok(0),
            }
        }
    }

    #[test]
    fn parse_record_reads_fields_in_order() {
        let sample = parse_record("1.5,-2.0,0.25").unwrap();
        assert_eq!(sample.roll_deg, 1.5);
        assert_eq!(sample.pitch_deg, -2.0);
        assert_eq!(sample.height_m, 0.25);
    }

    #[test]
    fn parse_record_tolerates_crlf_and_spaces() {
        let sample = parse_record(" 10.0 , 20.0 ,1.0\r").unwrap();
        assert_eq!(sample, Attitude {
            roll_deg: 10.0,
            pitch_deg: 20.0,
            height_m: 1.0,
        });
    }

    #[test]
    fn parse_record_rejects_wrong_field_count() {
        assert_eq!(parse_record("bad,data"), None);
        assert_eq!(parse_record("1,2,3,4"), None);
        assert_eq!(parse_record(""), None);
    }

    #[test]
    fn parse_record_rejects_non_numeric_fields() {
        assert_eq!(parse_record("a,2.0,3.0"), None);
        assert_eq!(parse_record("1.0,,3.0"), None);
        assert_eq!(parse_record("1.0,2.0,1.0.0"), None);
    }

    #[test]
    fn poll_takes_last_record_of_batch() {
        let mut link = TelemetryLink::from_reader(Cursor::new(b"1,1,1\n2,2,2\n".to_vec()));
        let sample = link.poll().unwrap();
        assert_eq!(sample, Attitude {
            roll_deg: 2.0,
            pitch_deg: 2.0,
            height_m: 2.0,
        });
    }

    #[test]
    fn poll_reports_no_change_on_garbage() {
        let mut link = TelemetryLink::from_reader(Cursor::new(b"bad,data\n".to_vec()));
        assert_eq!(link.poll(), None);
    }

    #[test]
    fn poll_skips_garbage_between_records() {
        let mut link =
            TelemetryLink::from_reader(Cursor::new(b"5,6,7\nnoise\nnot,a,number\n".to_vec()));
        let sample = link.poll().unwrap();
        assert_eq!(sample.roll_deg, 5.0);
    }

    #[test]
    fn poll_carries_partial_record_across_polls() {
        let mut link = TelemetryLink::from_reader(Feed::new([b"1.0,2.0,0.", b"5\n"]));
        assert_eq!(link.poll(), None);
        let sample = link.poll().unwrap();
        assert_eq!(sample, Attitude {
            roll_deg: 1.0,
            pitch_deg: 2.0,
            height_m: 0.5,
        });
    }

    #[test]
    fn poll_survives_undecodable_bytes() {
        let mut link =
            TelemetryLink::from_reader(Cursor::new(b"\xff\xfe\n4.0,5.0,6.0\n".to_vec()));
        let sample = link.poll().unwrap();
        assert_eq!(sample.pitch_deg, 5.0);
    }

    #[test]
    fn poll_on_idle_line_is_no_change() {
        let mut link = TelemetryLink::from_reader(Cursor::new(Vec::new()));
        assert_eq!(link.poll(), None);
    }
}
