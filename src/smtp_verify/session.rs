use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use super::{ProbeError, ProbeStage, SmtpReply};

const MAX_REPLY_LINES: usize = 128;
/// Longest reply line accepted, CRLF included.
const MAX_LINE_LEN: u64 = 4096;

/// Byte stream an SMTP dialogue runs over.
pub trait SmtpStream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T> SmtpStream for T where T: AsyncRead + AsyncWrite + Unpin + Send {}

/// Opens the transport to a mail exchanger. Swapped for in-memory streams in tests.
#[async_trait]
pub trait SmtpConnector: Send + Sync {
    async fn connect(
        &self,
        host: &str,
        port: u16,
        timeout: Duration,
    ) -> Result<Box<dyn SmtpStream>, ProbeError>;
}

/// Plain TCP, no TLS: the probe stops before anything worth encrypting.
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpConnector;

#[async_trait]
impl SmtpConnector for TcpConnector {
    async fn connect(
        &self,
        host: &str,
        port: u16,
        timeout: Duration,
    ) -> Result<Box<dyn SmtpStream>, ProbeError> {
        let stream = tokio::time::timeout(timeout, TcpStream::connect((host, port)))
            .await
            .map_err(|_| ProbeError::Timeout {
                stage: ProbeStage::Connect,
            })?
            .map_err(|source| ProbeError::Connect {
                host: host.to_string(),
                source,
            })?;
        Ok(Box::new(stream))
    }
}

pub(crate) struct SmtpSession {
    stream: BufReader<Box<dyn SmtpStream>>,
    command_timeout: Duration,
}

impl SmtpSession {
    pub(crate) fn new(stream: Box<dyn SmtpStream>, command_timeout: Duration) -> Self {
        Self {
            stream: BufReader::new(stream),
            command_timeout,
        }
    }

    pub(crate) async fn read_banner(&mut self) -> Result<SmtpReply, ProbeError> {
        let timeout = self.command_timeout;
        tokio::time::timeout(timeout, self.read_reply(ProbeStage::Greeting))
            .await
            .unwrap_or(Err(ProbeError::Timeout {
                stage: ProbeStage::Greeting,
            }))
    }

    pub(crate) async fn send_command(
        &mut self,
        command: &str,
        stage: ProbeStage,
    ) -> Result<SmtpReply, ProbeError> {
        let timeout = self.command_timeout;
        tokio::time::timeout(timeout, self.exchange(command, stage))
            .await
            .unwrap_or(Err(ProbeError::Timeout { stage }))
    }

    /// Sends `QUIT` and reads the answer if one comes; errors are ignored.
    pub(crate) async fn quit(&mut self) {
        let _ = self.send_command("QUIT", ProbeStage::Quit).await;
    }

    async fn exchange(&mut self, command: &str, stage: ProbeStage) -> Result<SmtpReply, ProbeError> {
        let line = format!("{command}\r\n");
        self.stream
            .write_all(line.as_bytes())
            .await
            .map_err(|err| ProbeError::io(stage, err))?;
        self.stream
            .flush()
            .await
            .map_err(|err| ProbeError::io(stage, err))?;
        self.read_reply(stage).await
    }

    /// One raw line, newline included. Bytes need not be UTF-8.
    async fn read_line(&mut self, stage: ProbeStage) -> Result<Vec<u8>, ProbeError> {
        let mut raw = Vec::new();
        let read = (&mut self.stream)
            .take(MAX_LINE_LEN)
            .read_until(b'\n', &mut raw)
            .await
            .map_err(|err| ProbeError::io(stage, err))?;
        if read == 0 {
            return Err(ProbeError::io(
                stage,
                std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "connection closed while reading reply",
                ),
            ));
        }
        if !raw.ends_with(b"\n") && raw.len() as u64 >= MAX_LINE_LEN {
            return Err(ProbeError::Protocol(format!(
                "reply line exceeds {MAX_LINE_LEN} bytes"
            )));
        }
        Ok(raw)
    }

    /// Reads one possibly multi-line reply (`250-...` continuations).
    async fn read_reply(&mut self, stage: ProbeStage) -> Result<SmtpReply, ProbeError> {
        let mut code: Option<u16> = None;
        let mut lines = Vec::new();
        loop {
            let raw = self.read_line(stage).await?;
            let decoded = String::from_utf8_lossy(&raw);
            let line = decoded.trim_end_matches(['\r', '\n']);
            let (parsed_code, continuation, text) = parse_reply_line(line)?;
            match code {
                Some(existing) if existing != parsed_code => {
                    return Err(ProbeError::Protocol(format!(
                        "inconsistent reply codes: {existing} vs {parsed_code}"
                    )));
                }
                Some(_) => {}
                None => code = Some(parsed_code),
            }
            lines.push(text.to_string());
            if !continuation {
                break;
            }
            if lines.len() >= MAX_REPLY_LINES {
                return Err(ProbeError::Protocol("reply has too many lines".into()));
            }
        }
        Ok(SmtpReply {
            code: code.unwrap_or_default(),
            lines,
        })
    }
}

/// Splits `250-text` / `250 text` / `250` into code, continuation flag and text.
pub(crate) fn parse_reply_line(line: &str) -> Result<(u16, bool, &str), ProbeError> {
    let code_part = line
        .get(..3)
        .ok_or_else(|| ProbeError::Protocol(format!("invalid reply: '{line}'")))?;
    let code = code_part
        .parse::<u16>()
        .ok()
        .filter(|code| (100..600).contains(code))
        .ok_or_else(|| ProbeError::Protocol(format!("invalid code in line: '{line}'")))?;
    let continuation = line.as_bytes().get(3) == Some(&b'-');
    let text = line.get(4..).unwrap_or("");
    Ok((code, continuation, text))
}
