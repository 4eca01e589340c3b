//! Email reminders over SMTP.

use std::sync::Arc;

use anyhow::{Context, Result};
use lettre::message::header::ContentType;
use lettre::message::{Mailbox, Message};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, SmtpTransport, Transport};
use tracing::{debug, info};

use super::{Notification, NotifyFuture, Notifier};
use crate::config::SmtpSettings;
use crate::data::MergeState;
use crate::error::CleanError;
use crate::issue::issue_label;

/// Display name used as the sender.
pub const SENDER_NAME: &str = "Git Clean";

/// Subject line of every reminder.
pub const SUBJECT: &str = "Please clean up your branches";

/// Submission port that negotiates TLS with STARTTLS.
const STARTTLS_PORT: u16 = 587;

const CELL: &str = "border: 1px solid black; border-collapse: collapse; padding: 5px";

/// Sends reminders through an SMTP relay.
pub struct EmailNotifier {
    transport: Arc<SmtpTransport>,
    sender: Mailbox,
}

impl EmailNotifier {
    /// Creates a notifier for the given relay; no connection is made yet.
    ///
    /// The server is `host` or `host:port`. Port 587 uses STARTTLS, any
    /// other port implicit TLS (465 when none is given).
    pub fn connect(settings: &SmtpSettings) -> Result<Self> {
        let sender = sender_mailbox(&settings.user)?;
        let (host, port) = split_server(&settings.server)?;
        let builder = match port {
            Some(STARTTLS_PORT) => SmtpTransport::starttls_relay(host),
            _ => SmtpTransport::relay(host),
        }
        .with_context(|| format!("Failed to configure SMTP relay {}", settings.server))?;
        let builder = match port {
            Some(port) => builder.port(port),
            None => builder,
        };
        let transport = builder
            .credentials(Credentials::new(
                settings.user.clone(),
                settings.password.clone(),
            ))
            .build();

        Ok(Self {
            transport: Arc::new(transport),
            sender,
        })
    }

    /// Checks that the relay accepts connections.
    pub async fn verify(&self) -> Result<()> {
        let transport = Arc::clone(&self.transport);
        let ok = tokio::task::spawn_blocking(move || transport.test_connection())
            .await
            .context("SMTP connection check panicked")?
            .context("Failed to connect to SMTP server")?;
        if !ok {
            anyhow::bail!("SMTP server refused the connection");
        }
        info!("SMTP server is ready to take messages");
        Ok(())
    }
}

impl Notifier for EmailNotifier {
    fn channel(&self) -> &'static str {
        "email"
    }

    fn deliver<'a>(&'a self, notification: &'a Notification<'a>) -> NotifyFuture<'a> {
        Box::pin(async move {
            let failure = |reason: String| CleanError::DeliveryFailure {
                channel: "email",
                recipient: format!("{} <{}>", notification.author, notification.email),
                reason,
            };

            let message =
                build_message(&self.sender, notification).map_err(|e| failure(format!("{e:#}")))?;

            let transport = Arc::clone(&self.transport);
            tokio::task::spawn_blocking(move || transport.send(&message))
                .await
                .map_err(|e| failure(e.to_string()))?
                .map_err(|e| failure(e.to_string()))?;

            debug!(recipient = notification.email, "Email sent");
            Ok(())
        })
    }
}

/// Builds the sender mailbox from the SMTP login.
pub fn sender_mailbox(user: &str) -> Result<Mailbox> {
    let address: Address = user
        .parse()
        .with_context(|| format!("SMTP_USER '{user}' is not an email address"))?;
    Ok(Mailbox::new(Some(SENDER_NAME.to_string()), address))
}

/// Builds the reminder message for one author.
pub fn build_message(sender: &Mailbox, notification: &Notification<'_>) -> Result<Message> {
    let address: Address = notification
        .email
        .parse()
        .with_context(|| format!("'{}' is not an email address", notification.email))?;
    let recipient = Mailbox::new(Some(notification.author.to_string()), address);

    Message::builder()
        .from(sender.clone())
        .to(recipient)
        .subject(SUBJECT)
        .header(ContentType::TEXT_HTML)
        .body(render_email_html(notification))
        .context("Failed to build email")
}

/// Renders the HTML reminder body.
pub fn render_email_html(n: &Notification<'_>) -> String {
    let merge_sentence = match n.merge_state {
        MergeState::Merged => format!(
            "The following branches have been merged into the <code>{}</code> branch, please clean them up:",
            escape(n.main_branch)
        ),
        MergeState::Unmerged => format!(
            "The following branches have not been merged into the <code>{}</code> branch, please confirm if they are still under development:",
            escape(n.main_branch)
        ),
    };

    let mut rows = String::new();
    for (idx, branch) in n.branches.iter().enumerate() {
        rows.push_str(&format!(
            "      <tr>\n\
             \x20       <td style=\"{CELL}\">{}</td>\n\
             \x20       <td style=\"{CELL}\">{}</td>\n\
             \x20       <td style=\"{CELL}\">{}</td>\n\
             \x20       <td style=\"{CELL}\"><a href=\"{}\">{}</a></td>\n\
             \x20       <td style=\"{CELL}\">{}</td>\n\
             \x20     </tr>\n",
            idx + 1,
            escape(&branch.pretty_name),
            escape(&branch.pretty_date),
            escape(&branch.issue_url),
            escape(issue_label(&branch.issue_url)),
            n.merge_state.label(),
        ));
    }

    let mut headers = String::new();
    for title in ["#", "Name", "Last Update", "Issue", "Merge State"] {
        headers.push_str(&format!("        <th style=\"{CELL}\">{title}</th>\n"));
    }

    format!(
        "<p>Hi {author},</p>\n\
         <p>\n\
         \x20 This is a reminder that you are the last committer of the following branches. If the branches were\n\
         \x20 created by you, please review them to see if they are still needed.\n\
         </p>\n\
         <p>\n\
         \x20 If you are not the owner of the branch please contact the owner to see if it is still needed.\n\
         </p>\n\
         <p>{merge_sentence}</p>\n\
         <table style=\"{CELL}\">\n\
         \x20 <thead>\n\
         \x20   <tr>\n\
         {headers}\
         \x20   </tr>\n\
         \x20 </thead>\n\
         \x20 <tbody>\n\
         {rows}\
         \x20 </tbody>\n\
         </table>\n\
         <p>Thanks for your help! We appreciate it.</p>\n\
         <p>Regards,</p>\n\
         <p>{SENDER_NAME}</p>\n",
        author = escape(n.author),
    )
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Splits `host[:port]` into its parts.
fn split_server(server: &str) -> Result<(&str, Option<u16>)> {
    let Some((host, port)) = server.rsplit_once(':') else {
        return Ok((server, None));
    };
    let port = port
        .parse()
        .with_context(|| format!("Invalid SMTP port in '{server}'"))?;
    Ok((host, Some(port)))
}
