//! Blocking FCP 2.0 session over TCP.

use std::io::BufReader;
use std::net::{Shutdown, TcpStream};
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use super::message::FcpMessage;
use super::{
    FcpError, Fetched, GetOptions, Keypair, NodeClient, PutOptions, PutOutcome, Verbosity,
    FCP_PROTOCOL_VERSION,
};

/// Deadline for the hello exchange and the key operations, which complete
/// locally on the node.
const EXCHANGE_TIMEOUT: Duration = Duration::from_secs(60);

/// One TCP session with the node.
///
/// The session is single-threaded and synchronous; every operation blocks
/// until the node answers, the operation deadline passes, or the socket
/// fails.
#[derive(Debug)]
pub struct FcpConnection {
    writer: TcpStream,
    reader: BufReader<TcpStream>,
    verbosity: Verbosity,
    next_id: u64,
    closed: bool,
}

impl FcpConnection {
    /// Connect to the node and perform the hello exchange.
    pub fn connect(host: &str, port: u16, verbosity: Verbosity) -> Result<Self, FcpError> {
        let stream = TcpStream::connect((host, port))?;
        stream.set_nodelay(true)?;
        let reader = BufReader::new(stream.try_clone()?);
        let mut conn = Self {
            writer: stream,
            reader,
            verbosity,
            next_id: 0,
            closed: false,
        };

        let hello = FcpMessage::new("ClientHello")
            .field("Name", format!("fcptools-{}", std::process::id()))
            .field("ExpectedVersion", FCP_PROTOCOL_VERSION);
        conn.send(&hello)?;

        let reply = conn.recv(Instant::now() + EXCHANGE_TIMEOUT)?;
        if reply.name != "NodeHello" {
            return Err(FcpError::Protocol(format!(
                "expected NodeHello, got {}",
                reply.name
            )));
        }
        debug!(
            host,
            port,
            node = reply.get("Version").unwrap_or("unknown"),
            "connected to FCP service"
        );
        Ok(conn)
    }

    fn identifier(&mut self) -> String {
        self.next_id += 1;
        format!("fcptools-{}-{}", std::process::id(), self.next_id)
    }

    fn send(&mut self, msg: &FcpMessage) -> Result<(), FcpError> {
        trace!(name = %msg.name, "sending");
        msg.write_to(&mut self.writer)?;
        Ok(())
    }

    fn recv(&mut self, deadline: Instant) -> Result<FcpMessage, FcpError> {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(FcpError::Timeout);
        }
        self.reader.get_ref().set_read_timeout(Some(remaining))?;
        match FcpMessage::read_from(&mut self.reader) {
            Ok(msg) => {
                trace!(name = %msg.name, "received");
                Ok(msg)
            }
            Err(FcpError::Io(e))
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                ) =>
            {
                Err(FcpError::Timeout)
            }
            Err(e) => Err(e),
        }
    }

    /// Wait for one of `wanted` bearing our identifier, skipping unrelated
    /// traffic and surfacing node-reported failures.
    fn await_message(
        &mut self,
        wanted: &[&str],
        identifier: &str,
        deadline: Instant,
    ) -> Result<FcpMessage, FcpError> {
        loop {
            let msg = self.recv(deadline)?;
            if msg.name == "ProtocolError" {
                return Err(failure(&msg));
            }
            let ours = msg.get("Identifier").map_or(true, |id| id == identifier);
            if !ours {
                trace!(name = %msg.name, "skipping message for another request");
                continue;
            }
            if wanted.contains(&msg.name.as_str()) {
                return Ok(msg);
            }
            if msg.name.ends_with("Failed") {
                return Err(failure(&msg));
            }
            trace!(name = %msg.name, "ignoring progress message");
        }
    }

    fn watch_global(&mut self) -> Result<(), FcpError> {
        self.send(&FcpMessage::new("WatchGlobal").field("Enabled", "true"))
    }
}

impl NodeClient for FcpConnection {
    fn genkey(&mut self) -> Result<Keypair, FcpError> {
        let id = self.identifier();
        self.send(&FcpMessage::new("GenerateSSK").field("Identifier", id.as_str()))?;
        let reply = self.await_message(&["SSKKeypair"], &id, Instant::now() + EXCHANGE_TIMEOUT)?;
        Ok(Keypair {
            public_uri: required(&reply, "RequestURI")?.to_string(),
            private_uri: required(&reply, "InsertURI")?.to_string(),
        })
    }

    fn invert_private(&mut self, uri: &str) -> Result<String, FcpError> {
        // There is no inversion message; a GetCHKOnly put of an empty
        // payload makes the node answer URIGenerated with the public form
        // without inserting anything.
        let id = self.identifier();
        let msg = FcpMessage::new("ClientPut")
            .field("URI", uri)
            .field("Identifier", id.as_str())
            .field("Verbosity", self.verbosity.to_string())
            .field("GetCHKOnly", "true")
            .field("UploadFrom", "direct")
            .with_data(Vec::new());
        self.send(&msg)?;
        let reply = self.await_message(&["URIGenerated"], &id, Instant::now() + EXCHANGE_TIMEOUT)?;
        Ok(required(&reply, "URI")?.to_string())
    }

    fn get(&mut self, uri: &str, opts: &GetOptions) -> Result<Fetched, FcpError> {
        let id = self.identifier();
        if opts.global {
            self.watch_global()?;
        }
        let msg = FcpMessage::new("ClientGet")
            .field("URI", uri)
            .field("Identifier", id.as_str())
            .field("Verbosity", opts.verbosity.to_string())
            .field("ReturnType", "direct")
            .field("PriorityClass", opts.priority.to_string())
            .field("Persistence", opts.persistence.to_string())
            .field("Global", bool_field(opts.global));
        self.send(&msg)?;

        let deadline = Instant::now() + opts.timeout;
        let mut mimetype = None;
        loop {
            let reply = self.await_message(&["DataFound", "AllData"], &id, deadline)?;
            match reply.name.as_str() {
                // DataFound precedes AllData and may be the only carrier of
                // the content type.
                "DataFound" => {
                    mimetype = reply.get("Metadata.ContentType").map(str::to_string);
                }
                _ => {
                    let mimetype = reply
                        .get("Metadata.ContentType")
                        .map(str::to_string)
                        .or(mimetype);
                    return Ok(Fetched {
                        mimetype,
                        data: reply.data.unwrap_or_default(),
                    });
                }
            }
        }
    }

    fn put(&mut self, uri: &str, data: &[u8], opts: &PutOptions) -> Result<PutOutcome, FcpError> {
        let id = self.identifier();
        if opts.global {
            self.watch_global()?;
        }
        let mut msg = FcpMessage::new("ClientPut")
            .field("URI", uri)
            .field("Identifier", id.as_str())
            .field("Verbosity", opts.verbosity.to_string())
            .field("MaxRetries", opts.max_retries.to_string())
            .field("PriorityClass", opts.priority.to_string())
            .field("Persistence", opts.persistence.to_string())
            .field("Global", bool_field(opts.global))
            .field("UploadFrom", "direct");
        if let Some(ref mimetype) = opts.mimetype {
            msg = msg.field("Metadata.ContentType", mimetype.as_str());
        }
        self.send(&msg.with_data(data.to_vec()))?;

        let deadline = Instant::now() + opts.timeout;
        if opts.nowait {
            // URIGenerated is the node's acknowledgement that the request
            // has been taken on; nothing further to wait for.
            self.await_message(&["URIGenerated"], &id, deadline)?;
            return Ok(PutOutcome::Queued);
        }
        loop {
            let reply = self.await_message(&["URIGenerated", "PutSuccessful"], &id, deadline)?;
            if reply.name == "PutSuccessful" {
                return Ok(PutOutcome::Stored(required(&reply, "URI")?.to_string()));
            }
            // URIGenerated precedes PutSuccessful in synchronous mode.
        }
    }

    fn shutdown(&mut self) -> Result<(), FcpError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        debug!("closing FCP session");
        let _ = self.writer.shutdown(Shutdown::Both);
        Ok(())
    }
}

impl Drop for FcpConnection {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}

fn required<'a>(msg: &'a FcpMessage, key: &str) -> Result<&'a str, FcpError> {
    msg.get(key)
        .ok_or_else(|| FcpError::Protocol(format!("{} missing {}", msg.name, key)))
}

fn bool_field(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

fn failure(msg: &FcpMessage) -> FcpError {
    let code = msg.get("Code").and_then(|c| c.parse().ok());
    let description = msg
        .get("CodeDescription")
        .or_else(|| msg.get("ShortCodeDescription"))
        .or_else(|| msg.get("ExtraDescription"))
        .unwrap_or(msg.name.as_str())
        .to_string();
    FcpError::Failed { code, description }
}
