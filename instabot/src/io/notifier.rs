//! Run notifications (mail, or log only).
//!
//! The [`Notifier`] trait decouples the engine from the mail transport.
//! Tests use recording notifiers; `Option<N>` with `None` is the disabled
//! (`--nomail`) notifier.

use anyhow::Result;
use tracing::{info, warn};

use crate::io::config::MailConfig;

/// Whether the run finished cleanly or stopped on an unrecoverable error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    Failure,
}

impl RunStatus {
    fn subject(self) -> &'static str {
        match self {
            RunStatus::Success => "Success!",
            RunStatus::Failure => "Failure!",
        }
    }
}

pub trait Notifier {
    /// Deliver `body`. Delivery failures are the caller's to log; they never
    /// abort a run.
    fn notify(&self, status: RunStatus, body: &str) -> Result<()>;
}

impl<N: Notifier> Notifier for Option<N> {
    fn notify(&self, status: RunStatus, body: &str) -> Result<()> {
        match self {
            Some(inner) => inner.notify(status, body),
            None => Ok(()),
        }
    }
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn notify(&self, status: RunStatus, body: &str) -> Result<()> {
        (**self).notify(status, body)
    }
}

/// Something that can hand a fully composed message to a mail server.
pub trait MailTransport {
    fn send(&self, mail: &MailConfig, message: &str) -> Result<()>;
}

/// Notifier that mails the report using the `user.mail` settings.
pub struct MailNotifier<T> {
    mail: MailConfig,
    transport: T,
}

impl<T: MailTransport> MailNotifier<T> {
    pub fn new(mail: MailConfig, transport: T) -> Self {
        Self { mail, transport }
    }
}

impl<T: MailTransport> Notifier for MailNotifier<T> {
    fn notify(&self, status: RunStatus, body: &str) -> Result<()> {
        let message = compose_message(&self.mail, status, body);
        self.transport.send(&self.mail, &message)?;
        info!(to = %self.mail.to, ?status, "notification sent");
        Ok(())
    }
}

/// Build the plain-text message: headers, blank line, body.
pub fn compose_message(mail: &MailConfig, status: RunStatus, body: &str) -> String {
    format!(
        "From: {}\nTo: {}\nSubject: {}  go-instabot\n\n{}",
        mail.from,
        mail.to,
        status.subject(),
        body
    )
}

/// Send a notification, logging (not propagating) delivery failures.
pub fn notify_or_log<N: Notifier>(notifier: &N, status: RunStatus, body: &str) {
    if let Err(err) = notifier.notify(status, body) {
        warn!(error = %format!("{err:#}"), "notification failed");
    }
}
