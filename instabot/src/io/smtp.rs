//! SMTP submission for run notifications.
//!
//! EHLO, STARTTLS when the server offers it, optional `AUTH PLAIN`, one
//! envelope, DATA, QUIT. Credentials are only sent over TLS, or in clear to a
//! localhost server.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use rustls::pki_types::ServerName;
use rustls::{ClientConfig, ClientConnection, RootCertStore, StreamOwned};
use tracing::{debug, instrument};

use crate::io::config::MailConfig;
use crate::io::notifier::MailTransport;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// [`MailTransport`] that opens a TCP connection to `mail.smtp` per message
/// and upgrades it with rustls when the server advertises STARTTLS.
#[derive(Debug, Clone)]
pub struct SmtpTransport {
    pub timeout: Duration,
}

impl Default for SmtpTransport {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl MailTransport for SmtpTransport {
    #[instrument(skip_all, fields(smtp = %mail.smtp))]
    fn send(&self, mail: &MailConfig, message: &str) -> Result<()> {
        let stream = TcpStream::connect(&mail.smtp)
            .with_context(|| format!("connect to smtp server {}", mail.smtp))?;
        stream
            .set_read_timeout(Some(self.timeout))
            .context("set smtp read timeout")?;
        stream
            .set_write_timeout(Some(self.timeout))
            .context("set smtp write timeout")?;

        let host = tls_host(mail);
        submit(stream, mail, message, |plain| {
            let name = ServerName::try_from(host.as_str())
                .with_context(|| format!("invalid tls server name '{host}'"))?
                .to_owned();
            let connection =
                ClientConnection::new(tls_config()?, name).context("start tls session")?;
            Ok(StreamOwned::new(connection, plain))
        })
    }
}

fn tls_config() -> Result<Arc<ClientConfig>> {
    let roots = RootCertStore {
        roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
    };
    let config =
        ClientConfig::builder_with_provider(Arc::new(rustls::crypto::ring::default_provider()))
            .with_safe_default_protocol_versions()
            .context("select tls protocol versions")?
            .with_root_certificates(roots)
            .with_no_client_auth();
    Ok(Arc::new(config))
}

/// Host the TLS certificate is checked against: `mail.server`, or the host
/// part of `mail.smtp` when unset.
pub fn tls_host(mail: &MailConfig) -> String {
    if !mail.server.trim().is_empty() {
        return mail.server.trim().to_string();
    }
    let smtp = mail.smtp.trim();
    match smtp.rsplit_once(':') {
        Some((host, port)) if port.chars().all(|c| c.is_ascii_digit()) => {
            host.trim_start_matches('[').trim_end_matches(']').to_string()
        }
        _ => smtp.to_string(),
    }
}

fn is_localhost(host: &str) -> bool {
    matches!(host, "localhost" | "127.0.0.1" | "::1")
}

/// Run one SMTP submission over an established connection. `upgrade` wraps
/// the plain stream in TLS after the server accepts STARTTLS.
pub fn submit<S, T, U>(stream: S, mail: &MailConfig, message: &str, upgrade: U) -> Result<()>
where
    S: Read + Write,
    T: Read + Write,
    U: FnOnce(S) -> Result<T>,
{
    let host = tls_host(mail);
    let mut session = SmtpSession::new(stream);
    session.read_reply(220)?;
    let capabilities = session.ehlo()?;
    if !offers_starttls(&capabilities) {
        return deliver(&mut session, mail, message, &host, false);
    }

    session.command("STARTTLS", 220)?;
    let plain = session.into_inner()?;
    let mut session = SmtpSession::new(upgrade(plain).context("tls upgrade")?);
    session.ehlo()?;
    deliver(&mut session, mail, message, &host, true)
}

fn offers_starttls(capabilities: &[String]) -> bool {
    capabilities.iter().any(|line| {
        line.split_whitespace()
            .next()
            .is_some_and(|keyword| keyword.eq_ignore_ascii_case("STARTTLS"))
    })
}

fn deliver<S: Read + Write>(
    session: &mut SmtpSession<S>,
    mail: &MailConfig,
    message: &str,
    host: &str,
    encrypted: bool,
) -> Result<()> {
    if !mail.password.is_empty() {
        if !encrypted && !is_localhost(host) {
            bail!("refusing to send smtp credentials over an unencrypted connection to {host}");
        }
        let token = STANDARD.encode(format!("\0{}\0{}", mail.from, mail.password));
        session.command(&format!("AUTH PLAIN {token}"), 235)?;
    }
    session.command(&format!("MAIL FROM:<{}>", mail.from), 250)?;
    session.command(&format!("RCPT TO:<{}>", mail.to), 250)?;
    session.command("DATA", 354)?;
    session.write_data(message)?;
    session.read_reply(250)?;
    session.command("QUIT", 221)?;
    Ok(())
}

struct SmtpSession<S> {
    stream: BufReader<S>,
}

impl<S: Read + Write> SmtpSession<S> {
    fn new(stream: S) -> Self {
        Self {
            stream: BufReader::new(stream),
        }
    }

    /// Give the stream back for the TLS handshake. Bytes the server sent
    /// ahead of the handshake are rejected.
    fn into_inner(self) -> Result<S> {
        if !self.stream.buffer().is_empty() {
            bail!("smtp server sent data before the tls handshake");
        }
        Ok(self.stream.into_inner())
    }

    fn ehlo(&mut self) -> Result<Vec<String>> {
        self.command("EHLO localhost", 250)
    }

    fn command(&mut self, line: &str, expected: u16) -> Result<Vec<String>> {
        let shown = if line.starts_with("AUTH") {
            "AUTH PLAIN ***"
        } else {
            line
        };
        debug!(command = shown, "smtp >");
        let writer = self.stream.get_mut();
        write!(writer, "{line}\r\n").context("write smtp command")?;
        writer.flush().context("flush smtp command")?;
        self.read_reply(expected).with_context(|| format!("smtp command '{shown}'"))
    }

    /// Message body with CRLF line endings and dot-stuffing, then the
    /// terminating `.` line.
    fn write_data(&mut self, message: &str) -> Result<()> {
        let writer = self.stream.get_mut();
        for line in message.lines() {
            if line.starts_with('.') {
                writer.write_all(b".").context("write smtp data")?;
            }
            write!(writer, "{line}\r\n").context("write smtp data")?;
        }
        writer.write_all(b".\r\n").context("write smtp data")?;
        writer.flush().context("flush smtp data")
    }

    /// Read a (possibly multi-line) reply, check its code and return the
    /// text of every line.
    fn read_reply(&mut self, expected: u16) -> Result<Vec<String>> {
        let mut lines = Vec::new();
        loop {
            let mut line = String::new();
            let read = self.stream.read_line(&mut line).context("read smtp reply")?;
            if read == 0 {
                return Err(anyhow!("smtp server closed the connection"));
            }
            let line = line.trim_end();
            debug!(reply = line, "smtp <");
            let code: u16 = line
                .get(..3)
                .and_then(|code| code.parse().ok())
                .ok_or_else(|| anyhow!("malformed smtp reply '{line}'"))?;
            if code != expected {
                return Err(anyhow!("smtp error: expected {expected}, got '{line}'"));
            }
            lines.push(line.get(4..).unwrap_or_default().to_string());
            if line.as_bytes().get(3) != Some(&b'-') {
                return Ok(lines);
            }
        }
    }
}
