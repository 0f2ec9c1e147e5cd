//! The simulated blog: article publishing and comment moderation.

use chrono::{DateTime, Utc};
use hatchling_core::action::{Action, ActionResult};
use hatchling_core::error::CollaboratorError;
use hatchling_core::view::DomainView;
use hatchling_core::workspace::Workspace;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub body: String,
    pub published_at: DateTime<Utc>,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingComment {
    pub id: String,
    pub article_id: String,
    pub author: String,
    pub content: String,
}

#[derive(Debug, Default)]
struct BlogState {
    articles: Vec<Article>,
    pending_comments: Vec<PendingComment>,
    approved: usize,
    rejected: usize,
}

/// Handles blog publishing and moderation verbs.
pub struct BlogModule {
    state: Arc<Mutex<BlogState>>,
}

impl BlogModule {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(BlogState {
                articles: Vec::new(),
                pending_comments: seed_pending_comments(),
                approved: 0,
                rejected: 0,
            })),
        }
    }

    pub fn view(&self) -> BlogView {
        BlogView {
            state: Arc::clone(&self.state),
        }
    }

    pub fn handle(&mut self, action: &Action) -> ActionResult {
        match action.action_type.as_str() {
            "blog_latest_articles" => self.latest(),
            "write_blog_article" => self.write(action),
            "review_pending_comments" => self.review(),
            "approve_comment" => self.moderate(action, true),
            "reject_comment" => self.moderate(action, false),
            "share_blog_article" => self.share(action),
            other => ActionResult::fail(format!("Unknown blog action: {other}")),
        }
    }

    fn latest(&self) -> ActionResult {
        let state = self.state.lock().expect("blog lock poisoned");
        if state.articles.is_empty() {
            return ActionResult::ok("No articles published yet. `write_blog_article` to start.");
        }
        let listing: String = state
            .articles
            .iter()
            .map(|a| format!("[{}] {} — {}\n", a.id, a.title, a.url))
            .collect();
        ActionResult::ok(format!("Published articles:\n{listing}"))
    }

    fn write(&mut self, action: &Action) -> ActionResult {
        let Some(title) = action.str_param("title") else {
            return ActionResult::fail("write_blog_article requires a 'title' parameter.");
        };
        let Some(content) = action.str_param("content") else {
            return ActionResult::fail("write_blog_article requires a 'content' parameter.");
        };
        if content.len() < 80 {
            return ActionResult::fail(
                "Article body too short — write at least a real paragraph.",
            );
        }

        let id = Uuid::new_v4().to_string()[..8].to_string();
        let slug: String = title
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '-' })
            .collect();
        let url = format!("https://blog.colony.net/{slug}");
        let article = Article {
            id: id.clone(),
            title: title.to_string(),
            body: content.to_string(),
            published_at: Utc::now(),
            url: url.clone(),
        };
        self.state
            .lock()
            .expect("blog lock poisoned")
            .articles
            .insert(0, article);

        // The URL is pinned so a later share can reference it.
        ActionResult::ok(format!("Article '{id}' published at {url}"))
            .with_pin("last_article_url", url)
    }

    fn review(&self) -> ActionResult {
        let state = self.state.lock().expect("blog lock poisoned");
        if state.pending_comments.is_empty() {
            return ActionResult::ok("Moderation queue is empty.");
        }
        let listing: String = state
            .pending_comments
            .iter()
            .map(|c| format!("[{}] on {}: {} — \"{}\"\n", c.id, c.article_id, c.author, c.content))
            .collect();
        ActionResult::ok(format!("Pending comments:\n{listing}"))
    }

    fn moderate(&mut self, action: &Action, approve: bool) -> ActionResult {
        let Some(comment_id) = action.str_param("comment_id") else {
            return ActionResult::fail("Moderation requires a 'comment_id' parameter.");
        };
        let mut state = self.state.lock().expect("blog lock poisoned");
        let Some(index) = state
            .pending_comments
            .iter()
            .position(|c| c.id == comment_id)
        else {
            return ActionResult::fail(format!("No pending comment '{comment_id}'."));
        };
        state.pending_comments.remove(index);
        if approve {
            state.approved += 1;
            ActionResult::ok(format!("Comment '{comment_id}' approved and published."))
        } else {
            state.rejected += 1;
            ActionResult::ok(format!("Comment '{comment_id}' rejected."))
        }
    }

    fn share(&self, action: &Action) -> ActionResult {
        let Some(url) = action.str_param("url") else {
            return ActionResult::fail("share_blog_article requires a 'url' parameter.");
        };
        let state = self.state.lock().expect("blog lock poisoned");
        if !state.articles.iter().any(|a| a.url == url) {
            return ActionResult::fail(format!("No published article at {url}."));
        }
        ActionResult::ok(format!("Article shared to the feed: {url}"))
            .with_navigate(hatchling_core::domain::Domain::Social)
    }
}

impl Default for BlogModule {
    fn default() -> Self {
        Self::new()
    }
}

/// Blog dashboard renderer.
pub struct BlogView {
    state: Arc<Mutex<BlogState>>,
}

impl DomainView for BlogView {
    fn list_view(
        &self,
        _result: &ActionResult,
        _workspace: &Workspace,
    ) -> Result<String, CollaboratorError> {
        let state = self.state.lock().map_err(|_| CollaboratorError::ViewFailed {
            domain: "blog".into(),
            reason: "state lock poisoned".into(),
        })?;

        let mut out = String::from("## ✍️ BLOG DASHBOARD\n");
        out.push_str(&format!(
            "Articles: {} | Pending comments: {} | Moderated: {}✅ {}❌\n\n",
            state.articles.len(),
            state.pending_comments.len(),
            state.approved,
            state.rejected
        ));
        for article in &state.articles {
            out.push_str(&format!("[{}] {}\n", article.id, article.title));
        }
        Ok(out)
    }

    fn focus_view(&self, item_id: &str) -> Result<String, CollaboratorError> {
        let state = self.state.lock().map_err(|_| CollaboratorError::ViewFailed {
            domain: "blog".into(),
            reason: "state lock poisoned".into(),
        })?;

        let article = state
            .articles
            .iter()
            .find(|a| a.id == item_id)
            .ok_or_else(|| CollaboratorError::ViewFailed {
                domain: "blog".into(),
                reason: format!("article '{item_id}' not found"),
            })?;

        Ok(format!(
            "## 📰 {}\n{}\n\n{}\n",
            article.title, article.url, article.body
        ))
    }
}

fn seed_pending_comments() -> Vec<PendingComment> {
    vec![
        PendingComment {
            id: "pc1".into(),
            article_id: "a0".into(),
            author: "anon_visitor".into(),
            content: "Great breakdown, bookmarked.".into(),
        },
        PendingComment {
            id: "pc2".into(),
            article_id: "a0".into(),
            author: "definitely_not_spam".into(),
            content: "CHEAP WATCHES click here".into(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONG_BODY: &str = "A full paragraph of real content that comfortably clears the \
                             minimum length check for a published article body.";

    #[test]
    fn short_articles_are_rejected() {
        let mut blog = BlogModule::new();
        let result = blog.handle(
            &Action::new("write_blog_article")
                .with_param("title", "Tiny")
                .with_param("content", "too short"),
        );
        assert!(!result.success);
    }

    #[test]
    fn publishing_pins_the_url() {
        let mut blog = BlogModule::new();
        let result = blog.handle(
            &Action::new("write_blog_article")
                .with_param("title", "On Budgets")
                .with_param("content", LONG_BODY),
        );
        assert!(result.success);
        let pins = result.pin_data.unwrap();
        assert!(pins.contains_key("last_article_url"));
    }

    #[test]
    fn moderation_drains_the_queue() {
        let mut blog = BlogModule::new();
        assert!(
            blog.handle(&Action::new("approve_comment").with_param("comment_id", "pc1"))
                .success
        );
        assert!(
            blog.handle(&Action::new("reject_comment").with_param("comment_id", "pc2"))
                .success
        );
        let result = blog.handle(&Action::new("review_pending_comments"));
        assert!(result.data.unwrap().contains("empty"));
    }

    #[test]
    fn share_requires_published_url() {
        let mut blog = BlogModule::new();
        let result = blog.handle(
            &Action::new("share_blog_article").with_param("url", "https://elsewhere.net/x"),
        );
        assert!(!result.success);
    }

    #[test]
    fn share_navigates_to_social() {
        let mut blog = BlogModule::new();
        let published = blog.handle(
            &Action::new("write_blog_article")
                .with_param("title", "On Budgets")
                .with_param("content", LONG_BODY),
        );
        let url = published
            .pin_data
            .unwrap()
            .get("last_article_url")
            .unwrap()
            .as_str()
            .unwrap()
            .to_string();

        let result = blog.handle(&Action::new("share_blog_article").with_param("url", url));
        assert!(result.success);
        assert_eq!(result.navigate_to.as_deref(), Some("social"));
    }
}
