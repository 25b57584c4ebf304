use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};

use tracing::debug;

use super::error::ProbeError;
use super::options::SmtpProbeOptions;
use super::types::{SmtpReply, Stage};

/// An open SMTP dialogue that has completed greeting, `EHLO`/`HELO` and
/// `MAIL FROM`, ready for recipient checks.
///
/// The connection is released when the session is dropped; a `QUIT` is sent
/// first unless an earlier I/O failure left the stream unusable. No `DATA`
/// command is ever issued.
pub struct ProbeSession {
    host: String,
    stream: TcpStream,
    reader: BufReader<TcpStream>,
    broken: bool,
}

impl ProbeSession {
    pub fn open(host: &str, options: &SmtpProbeOptions) -> Result<Self, ProbeError> {
        let addrs = resolve_socket_addrs(host, options.port)
            .map_err(|err| ProbeError::from_io(host, Stage::Connect, err))?;
        let stream = connect_any(&addrs, options)
            .map_err(|err| ProbeError::from_io(host, Stage::Connect, err))?;
        let reader = BufReader::new(
            stream
                .try_clone()
                .map_err(|err| ProbeError::from_io(host, Stage::Connect, err))?,
        );
        let mut session = Self {
            host: host.to_string(),
            stream,
            reader,
            broken: false,
        };

        let greeting = session.read_reply(Stage::Greeting)?;
        session.expect_positive(Stage::Greeting, greeting)?;

        let helo = options.helo_name();
        let ehlo = session.command(&format!("EHLO {helo}"), Stage::Ehlo)?;
        if !ehlo.is_positive_completion() {
            debug!(host, code = ehlo.code, "EHLO refused, falling back to HELO");
            let reply = session.command(&format!("HELO {helo}"), Stage::Helo)?;
            session.expect_positive(Stage::Helo, reply)?;
        }

        let reply = session.command(&options.envelope_sender(), Stage::MailFrom)?;
        session.expect_positive(Stage::MailFrom, reply)?;

        Ok(session)
    }

    /// Asks the server whether it would accept mail for `address`.
    pub fn check_recipient(&mut self, address: &str) -> Result<SmtpReply, ProbeError> {
        self.command(&format!("RCPT TO:<{address}>"), Stage::RcptTo)
    }

    fn expect_positive(&self, stage: Stage, reply: SmtpReply) -> Result<SmtpReply, ProbeError> {
        if reply.is_positive_completion() {
            Ok(reply)
        } else {
            Err(ProbeError::ServerRejected {
                host: self.host.clone(),
                stage,
                code: reply.code,
                message: reply.message,
            })
        }
    }

    fn command(&mut self, command: &str, stage: Stage) -> Result<SmtpReply, ProbeError> {
        debug!(host = %self.host, %stage, "C: {command}");
        let mut line = command.as_bytes().to_vec();
        line.extend_from_slice(b"\r\n");
        let sent = self
            .stream
            .write_all(&line)
            .and_then(|()| self.stream.flush());
        if let Err(err) = sent {
            self.broken = true;
            return Err(ProbeError::from_io(&self.host, stage, err));
        }
        self.read_reply(stage)
    }

    fn read_reply(&mut self, stage: Stage) -> Result<SmtpReply, ProbeError> {
        match read_reply(&mut self.reader) {
            Ok(reply) => {
                debug!(host = %self.host, %stage, "S: {reply}");
                Ok(reply)
            }
            Err(err) => {
                self.broken = true;
                Err(ProbeError::from_io(&self.host, stage, err))
            }
        }
    }
}

impl Drop for ProbeSession {
    fn drop(&mut self) {
        if self.broken {
            return;
        }
        debug!(host = %self.host, stage = %Stage::Quit, "C: QUIT");
        if self.stream.write_all(b"QUIT\r\n").is_ok() && self.stream.flush().is_ok() {
            let _ = read_reply(&mut self.reader);
        }
    }
}

fn resolve_socket_addrs(host: &str, port: u16) -> io::Result<Vec<SocketAddr>> {
    let addrs: Vec<SocketAddr> = (host, port).to_socket_addrs()?.collect();
    if addrs.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{host} has no address records"),
        ));
    }
    Ok(addrs)
}

fn connect_any(addrs: &[SocketAddr], options: &SmtpProbeOptions) -> io::Result<TcpStream> {
    let mut last_err = None;
    for addr in addrs {
        match TcpStream::connect_timeout(addr, options.timeout) {
            Ok(stream) => {
                stream.set_read_timeout(Some(options.timeout))?;
                stream.set_write_timeout(Some(options.timeout))?;
                return Ok(stream);
            }
            Err(err) => last_err = Some(err),
        }
    }
    Err(last_err.unwrap_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no address to connect")))
}

/// Longest accepted reply line, terminator included.
const MAX_LINE_LEN: u64 = 8192;
/// Most lines accepted in one multi-line reply.
const MAX_REPLY_LINES: usize = 128;

/// Reads one (possibly multi-line) reply. Non-UTF-8 bytes in the text are
/// replaced rather than rejected. Replies past [`MAX_LINE_LEN`] or
/// [`MAX_REPLY_LINES`] fail with `InvalidData`.
pub(crate) fn read_reply<R: BufRead>(reader: &mut R) -> io::Result<SmtpReply> {
    let mut code = None;
    let mut message_lines = Vec::new();
    loop {
        if message_lines.len() >= MAX_REPLY_LINES {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("SMTP reply longer than {MAX_REPLY_LINES} lines"),
            ));
        }
        let mut raw = Vec::new();
        let bytes = (&mut *reader)
            .take(MAX_LINE_LEN + 1)
            .read_until(b'\n', &mut raw)?;
        if bytes == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed while reading reply",
            ));
        }
        if raw.len() as u64 > MAX_LINE_LEN {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("SMTP reply line longer than {MAX_LINE_LEN} bytes"),
            ));
        }
        while raw.last().is_some_and(|b| *b == b'\n' || *b == b'\r') {
            raw.pop();
        }
        let line = String::from_utf8_lossy(&raw);

        if line.len() < 3 || !line.is_char_boundary(3) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("invalid SMTP reply: '{line}'"),
            ));
        }
        let code_part = &line[..3];
        let parsed_code = code_part.parse::<u16>().map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("invalid SMTP status code: '{code_part}'"),
            )
        })?;
        if let Some(existing) = code {
            if existing != parsed_code {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("inconsistent SMTP reply codes: {existing} vs {parsed_code}"),
                ));
            }
        } else {
            code = Some(parsed_code);
        }
        let continuation = line.as_bytes().get(3).copied() == Some(b'-');
        message_lines.push(line.get(4..).unwrap_or_default().to_string());
        if !continuation {
            break;
        }
    }
    Ok(SmtpReply {
        code: code.ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidData, "SMTP reply missing status code")
        })?,
        message: message_lines.join("\n"),
    })
}
