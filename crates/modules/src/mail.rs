//! The simulated mailbox. `email_delete` is destructive and goes
//! through the dispatcher's confirm protocol.

use chrono::{DateTime, Duration, Utc};
use hatchling_core::action::{Action, ActionResult};
use hatchling_core::error::CollaboratorError;
use hatchling_core::view::DomainView;
use hatchling_core::workspace::Workspace;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailMessage {
    pub uid: String,
    pub from: String,
    pub subject: String,
    pub body: String,
    pub received_at: DateTime<Utc>,
    pub read: bool,
    pub archived: bool,
}

#[derive(Debug, Default)]
struct MailState {
    messages: Vec<MailMessage>,
    sent: Vec<(String, String)>,
}

/// Handles `email_*` actions.
pub struct MailModule {
    state: Arc<Mutex<MailState>>,
}

impl MailModule {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MailState {
                messages: seed_inbox(),
                sent: Vec::new(),
            })),
        }
    }

    pub fn view(&self) -> MailView {
        MailView {
            state: Arc::clone(&self.state),
        }
    }

    pub fn handle(&mut self, action: &Action) -> ActionResult {
        match action.action_type.as_str() {
            "email_get_messages" => self.list(),
            "email_read" => self.read(action),
            "email_send" => self.send(action),
            "email_archive" => self.archive(action),
            "email_delete" => self.delete(action),
            "email_search" => self.search(action),
            "email_mark_as_read" => self.mark_read(action),
            other => ActionResult::fail(format!("Unknown email action: {other}")),
        }
    }

    fn list(&self) -> ActionResult {
        let state = self.state.lock().expect("mail lock poisoned");
        let unread = state.messages.iter().filter(|m| !m.read && !m.archived).count();
        ActionResult::ok(format!(
            "Inbox: {} messages, {unread} unread.",
            state.messages.iter().filter(|m| !m.archived).count()
        ))
    }

    fn read(&mut self, action: &Action) -> ActionResult {
        let Some(uid) = action.str_param("uid") else {
            return ActionResult::fail("email_read requires a 'uid' parameter.");
        };
        let mut state = self.state.lock().expect("mail lock poisoned");
        match state.messages.iter_mut().find(|m| m.uid == uid) {
            Some(msg) => {
                msg.read = true;
                ActionResult::ok(format!("Read '{}' from {}.", msg.subject, msg.from))
            }
            None => ActionResult::fail(format!("No message with uid '{uid}'.")),
        }
    }

    fn send(&mut self, action: &Action) -> ActionResult {
        let Some(recipient) = action.str_param("recipient") else {
            return ActionResult::fail("email_send requires a 'recipient' parameter.");
        };
        let Some(subject) = action.str_param("subject") else {
            return ActionResult::fail("email_send requires a 'subject' parameter.");
        };
        if action.str_param("content").is_none() {
            return ActionResult::fail("email_send requires a 'content' parameter.");
        }

        self.state
            .lock()
            .expect("mail lock poisoned")
            .sent
            .push((recipient.to_string(), subject.to_string()));
        ActionResult::ok(format!("Mail sent to {recipient}: \"{subject}\"."))
    }

    fn archive(&mut self, action: &Action) -> ActionResult {
        let Some(uid) = action.str_param("uid") else {
            return ActionResult::fail("email_archive requires a 'uid' parameter.");
        };
        let mut state = self.state.lock().expect("mail lock poisoned");
        match state.messages.iter_mut().find(|m| m.uid == uid) {
            Some(msg) => {
                msg.archived = true;
                ActionResult::ok(format!("Message '{uid}' archived."))
            }
            None => ActionResult::fail(format!("No message with uid '{uid}'.")),
        }
    }

    fn delete(&mut self, action: &Action) -> ActionResult {
        let Some(uid) = action.str_param("uid") else {
            return ActionResult::fail("email_delete requires a 'uid' parameter.");
        };
        let mut state = self.state.lock().expect("mail lock poisoned");
        let before = state.messages.len();
        state.messages.retain(|m| m.uid != uid);
        if state.messages.len() < before {
            ActionResult::ok(format!("Message '{uid}' permanently deleted."))
        } else {
            ActionResult::fail(format!("No message with uid '{uid}'."))
        }
    }

    fn search(&self, action: &Action) -> ActionResult {
        let Some(query) = action.str_param("query") else {
            return ActionResult::fail("email_search requires a 'query' parameter.");
        };
        let needle = query.to_lowercase();
        let state = self.state.lock().expect("mail lock poisoned");
        let hits: Vec<&MailMessage> = state
            .messages
            .iter()
            .filter(|m| {
                m.subject.to_lowercase().contains(&needle)
                    || m.body.to_lowercase().contains(&needle)
            })
            .collect();
        if hits.is_empty() {
            return ActionResult::ok(format!("No messages match '{query}'."));
        }
        let listing: String = hits
            .iter()
            .map(|m| format!("[{}] {} — {}\n", m.uid, m.from, m.subject))
            .collect();
        ActionResult::ok(format!("Matches for '{query}':\n{listing}"))
    }

    fn mark_read(&mut self, action: &Action) -> ActionResult {
        let Some(uid) = action.str_param("uid") else {
            return ActionResult::fail("email_mark_as_read requires a 'uid' parameter.");
        };
        let mut state = self.state.lock().expect("mail lock poisoned");
        match state.messages.iter_mut().find(|m| m.uid == uid) {
            Some(msg) => {
                msg.read = true;
                ActionResult::ok(format!("Message '{uid}' marked as read."))
            }
            None => ActionResult::fail(format!("No message with uid '{uid}'.")),
        }
    }
}

impl Default for MailModule {
    fn default() -> Self {
        Self::new()
    }
}

/// Inbox renderer for the email domain.
pub struct MailView {
    state: Arc<Mutex<MailState>>,
}

impl DomainView for MailView {
    fn list_view(
        &self,
        _result: &ActionResult,
        _workspace: &Workspace,
    ) -> Result<String, CollaboratorError> {
        let state = self.state.lock().map_err(|_| CollaboratorError::ViewFailed {
            domain: "email".into(),
            reason: "state lock poisoned".into(),
        })?;

        let mut out = String::from("## 📬 INBOX\n");
        for msg in state.messages.iter().filter(|m| !m.archived) {
            out.push_str(&format!(
                "[{}] {} {} — {}\n",
                msg.uid,
                if msg.read { "  " } else { "🆕" },
                msg.from,
                msg.subject
            ));
        }
        Ok(out)
    }

    fn focus_view(&self, item_id: &str) -> Result<String, CollaboratorError> {
        let state = self.state.lock().map_err(|_| CollaboratorError::ViewFailed {
            domain: "email".into(),
            reason: "state lock poisoned".into(),
        })?;

        let msg = state
            .messages
            .iter()
            .find(|m| m.uid == item_id)
            .ok_or_else(|| CollaboratorError::ViewFailed {
                domain: "email".into(),
                reason: format!("message '{item_id}' not found"),
            })?;

        Ok(format!(
            "## ✉️ MESSAGE {}\nFrom: {}\nSubject: {}\n\n{}\n",
            msg.uid, msg.from, msg.subject, msg.body
        ))
    }
}

fn seed_inbox() -> Vec<MailMessage> {
    let now = Utc::now();
    vec![
        MailMessage {
            uid: "m1".into(),
            from: "admin@colony.net".into(),
            subject: "Welcome to the network".into(),
            body: "Your account is live. Introduce yourself on the feed when ready.".into(),
            received_at: now - Duration::hours(26),
            read: false,
            archived: false,
        },
        MailMessage {
            uid: "m2".into(),
            from: "digest@colony.net".into(),
            subject: "Weekly digest: 3 posts you missed".into(),
            body: "Top post: energy budgets make agents honest.".into(),
            received_at: now - Duration::hours(9),
            read: false,
            archived: false,
        },
        MailMessage {
            uid: "m3".into(),
            from: "crabwise@colony.net".into(),
            subject: "Collab on a blog series?".into(),
            body: "Your research notes would pair well with my drafts. Interested?".into(),
            received_at: now - Duration::hours(2),
            read: false,
            archived: false,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_marks_message() {
        let mut mail = MailModule::new();
        let result = mail.handle(&Action::new("email_read").with_param("uid", "m1"));
        assert!(result.success);

        let listing = mail
            .view()
            .list_view(&ActionResult::default(), &Workspace::new())
            .unwrap();
        // m1 no longer flagged unread.
        let m1_line = listing.lines().find(|l| l.contains("[m1]")).unwrap();
        assert!(!m1_line.contains("🆕"));
    }

    #[test]
    fn send_requires_all_fields() {
        let mut mail = MailModule::new();
        let result = mail.handle(
            &Action::new("email_send")
                .with_param("recipient", "a@b.c")
                .with_param("subject", "hi"),
        );
        assert!(!result.success);

        let result = mail.handle(
            &Action::new("email_send")
                .with_param("recipient", "a@b.c")
                .with_param("subject", "hi")
                .with_param("content", "hello there"),
        );
        assert!(result.success);
    }

    #[test]
    fn archive_hides_from_listing() {
        let mut mail = MailModule::new();
        mail.handle(&Action::new("email_archive").with_param("uid", "m2"));
        let listing = mail
            .view()
            .list_view(&ActionResult::default(), &Workspace::new())
            .unwrap();
        assert!(!listing.contains("[m2]"));
    }

    #[test]
    fn delete_removes_message() {
        let mut mail = MailModule::new();
        assert!(mail.handle(&Action::new("email_delete").with_param("uid", "m3")).success);
        assert!(!mail.handle(&Action::new("email_delete").with_param("uid", "m3")).success);
    }

    #[test]
    fn search_matches_subject_and_body() {
        let mail = MailModule::new();
        let result = mail.search(&Action::new("email_search").with_param("query", "digest"));
        assert!(result.success);
        assert!(result.data.unwrap().contains("[m2]"));
    }

    #[test]
    fn focus_view_shows_body() {
        let mail = MailModule::new();
        let focused = mail.view().focus_view("m3").unwrap();
        assert!(focused.contains("research notes"));
    }
}
