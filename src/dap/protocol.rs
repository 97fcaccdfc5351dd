use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::{self, BufRead, Write};
use tracing::warn;

#[derive(Debug, Serialize, Deserialize)]
pub struct DapMessage {
    pub seq: u64,
    #[serde(rename = "type")]
    pub msg_type: String,
    #[serde(flatten)]
    pub content: DapMessageContent,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DapMessageContent {
    Request {
        command: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        arguments: Option<Value>,
    },
    Response {
        request_seq: u64,
        success: bool,
        command: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        body: Option<Value>,
    },
    Event {
        event: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        body: Option<Value>,
    },
}

impl DapMessage {
    pub fn request(seq: u64, command: &str, arguments: Option<Value>) -> Self {
        Self {
            seq,
            msg_type: "request".to_string(),
            content: DapMessageContent::Request {
                command: command.to_string(),
                arguments,
            },
        }
    }
}

/// Write one message as `Content-Length: N\r\n\r\n{json}`.
pub fn write_message<W: Write>(writer: &mut W, msg: &DapMessage) -> io::Result<()> {
    let json = serde_json::to_vec(msg)?;
    write!(writer, "Content-Length: {}\r\n\r\n", json.len())?;
    writer.write_all(&json)?;
    writer.flush()
}

/// Largest body `read_message` will allocate for.
pub const MAX_CONTENT_LENGTH: usize = 16 * 1024 * 1024;

fn invalid_header(detail: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, detail)
}

/// Read the next framed message. `Ok(None)` at end of input; bodies that are
/// not valid messages are skipped. A missing, unparsable or oversized
/// `Content-Length` leaves the stream unsynchronised and is an
/// `InvalidData` error.
pub fn read_message<R: BufRead>(reader: &mut R) -> io::Result<Option<DapMessage>> {
    loop {
        let mut content_length = None;
        let mut saw_header = false;
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            let line = line.trim_end_matches(['\r', '\n']);
            if line.is_empty() {
                if saw_header {
                    break;
                }
                continue;
            }
            saw_header = true;
            if let Some(len) = line.strip_prefix("Content-Length:") {
                let len: usize = len
                    .trim()
                    .parse()
                    .map_err(|_| invalid_header(format!("bad Content-Length '{}'", len.trim())))?;
                content_length = Some(len);
            }
        }

        let content_length = content_length
            .ok_or_else(|| invalid_header("message without Content-Length".to_string()))?;
        if content_length > MAX_CONTENT_LENGTH {
            return Err(invalid_header(format!(
                "Content-Length {content_length} exceeds {MAX_CONTENT_LENGTH}"
            )));
        }

        let mut body = vec![0u8; content_length];
        reader.read_exact(&mut body)?;
        match serde_json::from_slice(&body) {
            Ok(msg) => return Ok(Some(msg)),
            Err(err) => warn!(%err, "ignoring malformed DAP message"),
        }
    }
}
