//! Chat reminders posted to an incoming webhook as an adaptive card.

use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::{Notification, Notifier, NotifyFuture};
use crate::data::MergeState;
use crate::error::CleanError;
use crate::issue::issue_label;

const CARD_SCHEMA: &str = "http://adaptivecards.io/schemas/adaptive-card.json";
const CARD_VERSION: &str = "1.2";

/// Posts reminders to a webhook URL.
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

impl WebhookNotifier {
    /// Creates a notifier posting to `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }
}

impl Notifier for WebhookNotifier {
    fn channel(&self) -> &'static str {
        "webhook message"
    }

    fn deliver<'a>(&'a self, notification: &'a Notification<'a>) -> NotifyFuture<'a> {
        Box::pin(async move {
            let failure = |reason: String| CleanError::DeliveryFailure {
                channel: "webhook",
                recipient: format!("{} <{}>", notification.author, notification.email),
                reason,
            };

            let card = build_adaptive_card(notification);
            info!(author = notification.author, "Posting webhook reminder");

            let response = self
                .client
                .post(&self.url)
                .json(&card)
                .send()
                .await
                .map_err(|e| failure(e.to_string()))?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(failure(format!("HTTP {status}: {body}")));
            }

            debug!(author = notification.author, "Webhook accepted reminder");
            Ok(())
        })
    }
}

/// Builds the adaptive card message for one reminder.
///
/// The card mentions the author, lists each branch as a bold numbered line
/// followed by a detail line, and closes with a short footer.
pub fn build_adaptive_card(n: &Notification<'_>) -> Value {
    let mention = format!("<at>{}</at>", n.author);

    let intro = match n.merge_state {
        MergeState::Merged => format!(
            "The following branches have been merged into the `{}` branch, please clean them up:",
            n.main_branch
        ),
        MergeState::Unmerged => format!(
            "The following branches have not been merged into the `{}` branch, please confirm if they are still under development:",
            n.main_branch
        ),
    };

    let mut body = vec![
        text_block(&format!("{mention} [{0}](mailto:{0})", n.email)),
        text_block(&intro),
    ];

    for (idx, branch) in n.branches.iter().enumerate() {
        body.push(text_block(&format!("**{}. {}**", idx + 1, branch.pretty_name)));
        let details = if branch.issue_url.is_empty() {
            format!("{} / {}", branch.pretty_date, n.merge_state.label())
        } else {
            format!(
                "{} / [{}]({}) / {}",
                branch.pretty_date,
                issue_label(&branch.issue_url),
                branch.issue_url,
                n.merge_state.label()
            )
        };
        body.push(text_block(&details));
    }

    body.push(json!({
        "type": "TextBlock",
        "size": "small",
        "text": "If the branches were created by you, please review them to see if they are still needed. If not, please contact the owner.",
    }));

    json!({
        "type": "message",
        "attachments": [{
            "contentType": "application/vnd.microsoft.card.adaptive",
            "content": {
                "type": "AdaptiveCard",
                "body": body,
                "$schema": CARD_SCHEMA,
                "version": CARD_VERSION,
                "msteams": {
                    "entities": [{
                        "type": "mention",
                        "text": mention,
                        "mentioned": { "id": n.email, "name": n.author },
                    }],
                    "width": "full",
                },
            },
        }],
    })
}

fn text_block(text: &str) -> Value {
    json!({ "type": "TextBlock", "text": text })
}
