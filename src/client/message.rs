//! FCP message encoding and decoding.
//!
//! An FCP message is a name line, `Field=Value` lines, and a terminator:
//! `EndMessage`, or `Data` followed by exactly `DataLength` payload bytes.
//! Field order on encode is deterministic.

use std::collections::BTreeMap;
use std::io::{BufRead, Read, Write};

use super::FcpError;

/// A single FCP protocol message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FcpMessage {
    pub name: String,
    pub fields: BTreeMap<String, String>,
    pub data: Option<Vec<u8>>,
}

impl FcpMessage {
    /// Start a message with the given name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Builder-style field setter.
    pub fn field(mut self, key: &str, value: impl Into<String>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    /// Attach a payload, recording its length in `DataLength`.
    pub fn with_data(mut self, data: Vec<u8>) -> Self {
        self.fields
            .insert("DataLength".to_string(), data.len().to_string());
        self.data = Some(data);
        self
    }

    /// Field accessor.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Encode onto a writer and flush.
    pub fn write_to<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        writeln!(w, "{}", self.name)?;
        for (key, value) in &self.fields {
            writeln!(w, "{key}={value}")?;
        }
        match &self.data {
            Some(data) => {
                w.write_all(b"Data\n")?;
                w.write_all(data)?;
            }
            None => w.write_all(b"EndMessage\n")?,
        }
        w.flush()
    }

    /// Decode one message from a buffered reader.
    pub fn read_from<R: BufRead>(r: &mut R) -> Result<Self, FcpError> {
        let mut name = read_line(r)?;
        while name.is_empty() {
            name = read_line(r)?;
        }

        let mut fields = BTreeMap::new();
        loop {
            let line = read_line(r)?;
            match line.as_str() {
                "EndMessage" => {
                    return Ok(Self {
                        name,
                        fields,
                        data: None,
                    })
                }
                "Data" => {
                    let len: usize = fields
                        .get("DataLength")
                        .ok_or_else(|| {
                            FcpError::Protocol(format!("{name}: Data without DataLength"))
                        })?
                        .parse()
                        .map_err(|_| {
                            FcpError::Protocol(format!("{name}: unreadable DataLength"))
                        })?;
                    let mut data = vec![0u8; len];
                    r.read_exact(&mut data)?;
                    return Ok(Self {
                        name,
                        fields,
                        data: Some(data),
                    });
                }
                _ => match line.split_once('=') {
                    Some((key, value)) => {
                        fields.insert(key.to_string(), value.to_string());
                    }
                    None => {
                        return Err(FcpError::Protocol(format!(
                            "{name}: line outside message grammar: {line:?}"
                        )))
                    }
                },
            }
        }
    }
}

fn read_line<R: BufRead>(r: &mut R) -> Result<String, FcpError> {
    let mut line = String::new();
    let n = r.read_line(&mut line)?;
    if n == 0 {
        return Err(FcpError::Protocol(
            "connection closed mid-message".to_string(),
        ));
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn round_trip(msg: &FcpMessage) -> FcpMessage {
        let mut wire = Vec::new();
        msg.write_to(&mut wire).unwrap();
        FcpMessage::read_from(&mut Cursor::new(wire)).unwrap()
    }

    #[test]
    fn test_round_trip_plain() {
        let msg = FcpMessage::new("ClientHello")
            .field("Name", "fcptools-1")
            .field("ExpectedVersion", "2.0");
        assert_eq!(round_trip(&msg), msg);
    }

    #[test]
    fn test_round_trip_with_data() {
        let msg = FcpMessage::new("AllData")
            .field("Identifier", "req-1")
            .with_data(vec![0, 1, 2, 255]);
        let decoded = round_trip(&msg);
        assert_eq!(decoded.data.as_deref(), Some(&[0u8, 1, 2, 255][..]));
        assert_eq!(decoded.get("DataLength"), Some("4"));
    }

    #[test]
    fn test_empty_payload() {
        let msg = FcpMessage::new("ClientPut")
            .field("GetCHKOnly", "true")
            .with_data(Vec::new());
        let decoded = round_trip(&msg);
        assert_eq!(decoded.data.as_deref(), Some(&[][..]));
    }

    #[test]
    fn test_value_may_contain_equals() {
        let msg = FcpMessage::new("NodeHello").field("Testnet", "a=b=c");
        assert_eq!(round_trip(&msg).get("Testnet"), Some("a=b=c"));
    }

    #[test]
    fn test_data_without_length_rejected() {
        let wire = b"AllData\nData\nxyz".to_vec();
        let err = FcpMessage::read_from(&mut Cursor::new(wire)).unwrap_err();
        assert!(matches!(err, FcpError::Protocol(_)));
    }

    #[test]
    fn test_truncated_stream_rejected() {
        let wire = b"NodeHello\nVersion=1".to_vec();
        let err = FcpMessage::read_from(&mut Cursor::new(wire)).unwrap_err();
        assert!(matches!(err, FcpError::Protocol(_)));
    }
}
