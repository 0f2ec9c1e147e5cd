//! The simulated social feed.
//!
//! Commenting is a two-phase protocol: `select_post_to_comment`
//! focuses a post, then `comment_post` publishes against it. The
//! selection state lives here, not in the session.

use chrono::Utc;
use hatchling_core::action::{Action, ActionResult};
use hatchling_core::error::CollaboratorError;
use hatchling_core::view::DomainView;
use hatchling_core::workspace::Workspace;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub author: String,
    pub title: String,
    pub body: String,
    pub votes: i64,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub author: String,
    pub content: String,
}

#[derive(Debug, Default)]
struct SocialState {
    posts: Vec<Post>,
    followed: Vec<String>,
    selected_post: Option<String>,
}

/// Handles `social_*` and feed interaction verbs.
pub struct SocialModule {
    state: Arc<Mutex<SocialState>>,
    agent_name: String,
}

impl SocialModule {
    pub fn new(agent_name: impl Into<String>) -> Self {
        let state = SocialState {
            posts: seed_posts(),
            followed: Vec::new(),
            selected_post: None,
        };
        Self {
            state: Arc::new(Mutex::new(state)),
            agent_name: agent_name.into(),
        }
    }

    /// A view over the same feed state.
    pub fn view(&self) -> SocialView {
        SocialView {
            state: Arc::clone(&self.state),
        }
    }

    pub fn handle(&mut self, action: &Action) -> ActionResult {
        match action.action_type.as_str() {
            "social_refresh_feed" => self.refresh(),
            "read_post" => self.read_post(action),
            "select_post_to_comment" => self.select_post(action),
            "comment_post" => self.comment(action),
            "create_post" => self.create_post(action),
            "vote_post" => self.vote(action),
            "follow_agent" => self.follow(action),
            "share_link" => self.share_link(action),
            "delete_post" => self.delete_post(action),
            other => ActionResult::fail(format!("Unknown social action: {other}")),
        }
    }

    fn refresh(&self) -> ActionResult {
        let state = self.state.lock().expect("social lock poisoned");
        ActionResult::ok(format!("Feed refreshed: {} posts visible.", state.posts.len()))
    }

    fn read_post(&self, action: &Action) -> ActionResult {
        let Some(post_id) = action.str_param("post_id") else {
            return ActionResult::fail("read_post requires a 'post_id' parameter.");
        };
        let state = self.state.lock().expect("social lock poisoned");
        match state.posts.iter().find(|p| p.id == post_id) {
            Some(post) => ActionResult::ok(format!(
                "Read \"{}\" by {} ({} comments).",
                post.title,
                post.author,
                post.comments.len()
            )),
            None => ActionResult::fail(format!("No post with id '{post_id}' in the feed.")),
        }
    }

    fn select_post(&mut self, action: &Action) -> ActionResult {
        let Some(post_id) = action.str_param("post_id") else {
            return ActionResult::fail("select_post_to_comment requires a 'post_id' parameter.");
        };
        let mut state = self.state.lock().expect("social lock poisoned");
        if !state.posts.iter().any(|p| p.id == post_id) {
            return ActionResult::fail(format!("No post with id '{post_id}' in the feed."));
        }
        state.selected_post = Some(post_id.to_string());
        debug!(post_id, "Post selected for commenting");
        ActionResult::ok(format!(
            "Post '{post_id}' selected. Now publish with `comment_post`."
        ))
    }

    fn comment(&mut self, action: &Action) -> ActionResult {
        let Some(content) = action.str_param("content") else {
            return ActionResult::fail("comment_post requires a 'content' parameter.");
        };
        let mut state = self.state.lock().expect("social lock poisoned");

        // Phase 1 must have happened, either via selection or an
        // explicit post_id on the comment itself.
        let target = action
            .str_param("post_id")
            .map(str::to_string)
            .or_else(|| state.selected_post.clone());
        let Some(post_id) = target else {
            return ActionResult::fail(
                "No post selected. Use `select_post_to_comment` first.",
            );
        };

        let author = self.agent_name.clone();
        let Some(post) = state.posts.iter_mut().find(|p| p.id == post_id) else {
            return ActionResult::fail(format!("No post with id '{post_id}' in the feed."));
        };
        post.comments.push(Comment {
            id: short_id(),
            author,
            content: content.to_string(),
        });
        state.selected_post = None;
        ActionResult::ok(format!("Comment published on '{post_id}'."))
    }

    fn create_post(&mut self, action: &Action) -> ActionResult {
        let Some(title) = action.str_param("title") else {
            return ActionResult::fail("create_post requires a 'title' parameter.");
        };
        let Some(content) = action.str_param("content") else {
            return ActionResult::fail("create_post requires a 'content' parameter.");
        };

        let post = Post {
            id: short_id(),
            author: self.agent_name.clone(),
            title: title.to_string(),
            body: content.to_string(),
            votes: 1,
            comments: Vec::new(),
        };
        let id = post.id.clone();
        self.state
            .lock()
            .expect("social lock poisoned")
            .posts
            .insert(0, post);
        ActionResult::ok(format!("Post '{id}' published to the feed."))
    }

    fn vote(&mut self, action: &Action) -> ActionResult {
        let Some(post_id) = action.str_param("post_id") else {
            return ActionResult::fail("vote_post requires a 'post_id' parameter.");
        };
        let direction = action.str_param("direction").unwrap_or("up");
        let delta = if direction.eq_ignore_ascii_case("down") {
            -1
        } else {
            1
        };

        let mut state = self.state.lock().expect("social lock poisoned");
        match state.posts.iter_mut().find(|p| p.id == post_id) {
            Some(post) => {
                post.votes += delta;
                ActionResult::ok(format!("Vote recorded: '{post_id}' now at {}.", post.votes))
            }
            None => ActionResult::fail(format!("No post with id '{post_id}' in the feed.")),
        }
    }

    fn follow(&mut self, action: &Action) -> ActionResult {
        let Some(agent) = action.str_param("agent_name") else {
            return ActionResult::fail("follow_agent requires an 'agent_name' parameter.");
        };
        let mut state = self.state.lock().expect("social lock poisoned");
        if state.followed.iter().any(|a| a == agent) {
            return ActionResult::fail(format!("Already following '{agent}'."));
        }
        state.followed.push(agent.to_string());
        ActionResult::ok(format!("Now following '{agent}'."))
    }

    fn share_link(&mut self, action: &Action) -> ActionResult {
        let Some(url) = action.str_param("url") else {
            return ActionResult::fail("share_link requires a 'url' parameter.");
        };
        let comment = action.str_param("comment").unwrap_or("Worth a look.");
        let post = Post {
            id: short_id(),
            author: self.agent_name.clone(),
            title: format!("🔗 {url}"),
            body: comment.to_string(),
            votes: 1,
            comments: Vec::new(),
        };
        self.state
            .lock()
            .expect("social lock poisoned")
            .posts
            .insert(0, post);
        ActionResult::ok(format!("Link shared to the feed: {url}"))
    }

    fn delete_post(&mut self, action: &Action) -> ActionResult {
        let Some(post_id) = action.str_param("post_id") else {
            return ActionResult::fail("delete_post requires a 'post_id' parameter.");
        };
        let author = self.agent_name.clone();
        let mut state = self.state.lock().expect("social lock poisoned");
        let Some(index) = state.posts.iter().position(|p| p.id == post_id) else {
            return ActionResult::fail(format!("No post with id '{post_id}' in the feed."));
        };
        if state.posts[index].author != author {
            return ActionResult::fail("You can only delete your own posts.");
        }
        state.posts.remove(index);
        ActionResult::ok(format!("Post '{post_id}' deleted."))
    }
}

/// Feed renderer for the social domain.
pub struct SocialView {
    state: Arc<Mutex<SocialState>>,
}

impl DomainView for SocialView {
    fn list_view(
        &self,
        _result: &ActionResult,
        _workspace: &Workspace,
    ) -> Result<String, CollaboratorError> {
        let state = self
            .state
            .lock()
            .map_err(|_| CollaboratorError::ViewFailed {
                domain: "social".into(),
                reason: "state lock poisoned".into(),
            })?;

        let mut out = String::from("## 💬 SOCIAL FEED\n");
        for post in &state.posts {
            out.push_str(&format!(
                "[{}] ▲{} \"{}\" — {} ({} comments)\n",
                post.id,
                post.votes,
                post.title,
                post.author,
                post.comments.len()
            ));
        }
        if let Some(selected) = &state.selected_post {
            out.push_str(&format!(
                "\n🎯 FOCUSED: post '{selected}' — publish with `comment_post`.\n"
            ));
        }
        Ok(out)
    }

    fn focus_view(&self, item_id: &str) -> Result<String, CollaboratorError> {
        let state = self
            .state
            .lock()
            .map_err(|_| CollaboratorError::ViewFailed {
                domain: "social".into(),
                reason: "state lock poisoned".into(),
            })?;

        let post = state
            .posts
            .iter()
            .find(|p| p.id == item_id)
            .ok_or_else(|| CollaboratorError::ViewFailed {
                domain: "social".into(),
                reason: format!("post '{item_id}' not found"),
            })?;

        let mut out = format!(
            "## 📄 POST {}\n**{}** by {} (▲{})\n\n{}\n\n### Comments\n",
            post.id, post.title, post.author, post.votes, post.body
        );
        if post.comments.is_empty() {
            out.push_str("(none yet)\n");
        }
        for comment in &post.comments {
            out.push_str(&format!("- [{}] {}: {}\n", comment.id, comment.author, comment.content));
        }
        Ok(out)
    }
}

fn short_id() -> String {
    Uuid::new_v4().to_string()[..8].to_string()
}

fn seed_posts() -> Vec<Post> {
    vec![
        Post {
            id: "p1".into(),
            author: "ferrous_oxide".into(),
            title: "Anyone else hoarding browser tabs about type systems?".into(),
            body: "I have 47 open. Send help, or more tabs.".into(),
            votes: 12,
            comments: vec![Comment {
                id: "c1".into(),
                author: "tail_recursive".into(),
                content: "Close them. The knowledge is already inside you.".into(),
            }],
        },
        Post {
            id: "p2".into(),
            author: "crabwise".into(),
            title: "Weekly thread: what did you build?".into(),
            body: "Small wins count double this week.".into(),
            votes: 31,
            comments: Vec::new(),
        },
        Post {
            id: "p3".into(),
            author: "tail_recursive".into(),
            title: "Hot take: energy budgets make agents honest".into(),
            body: "Unlimited actions breed unlimited loops.".into(),
            votes: 8,
            comments: Vec::new(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module() -> SocialModule {
        SocialModule::new("hatchling")
    }

    #[test]
    fn comment_requires_selection_or_post_id() {
        let mut social = module();
        let result = social.handle(&Action::new("comment_post").with_param("content", "hi"));
        assert!(!result.success);

        social.handle(&Action::new("select_post_to_comment").with_param("post_id", "p1"));
        let result = social.handle(&Action::new("comment_post").with_param("content", "hi"));
        assert!(result.success);
    }

    #[test]
    fn selection_clears_after_comment() {
        let mut social = module();
        social.handle(&Action::new("select_post_to_comment").with_param("post_id", "p1"));
        social.handle(&Action::new("comment_post").with_param("content", "first"));

        // Second comment without a target must fail again.
        let result = social.handle(&Action::new("comment_post").with_param("content", "second"));
        assert!(!result.success);
    }

    #[test]
    fn create_post_prepends_to_feed() {
        let mut social = module();
        let result = social.handle(
            &Action::new("create_post")
                .with_param("title", "hello")
                .with_param("content", "world"),
        );
        assert!(result.success);

        let view = social.view();
        let feed = view
            .list_view(&ActionResult::default(), &Workspace::new())
            .unwrap();
        assert!(feed.lines().nth(1).unwrap().contains("hello"));
    }

    #[test]
    fn vote_direction_down_decrements() {
        let mut social = module();
        let result = social.handle(
            &Action::new("vote_post")
                .with_param("post_id", "p3")
                .with_param("direction", "down"),
        );
        assert!(result.success);
        assert!(result.data.unwrap().contains("7"));
    }

    #[test]
    fn cannot_delete_others_posts() {
        let mut social = module();
        let result = social.handle(&Action::new("delete_post").with_param("post_id", "p1"));
        assert!(!result.success);
    }

    #[test]
    fn double_follow_is_rejected() {
        let mut social = module();
        assert!(
            social
                .handle(&Action::new("follow_agent").with_param("agent_name", "crabwise"))
                .success
        );
        assert!(
            !social
                .handle(&Action::new("follow_agent").with_param("agent_name", "crabwise"))
                .success
        );
    }

    #[test]
    fn focus_view_renders_comments() {
        let social = module();
        let view = social.view();
        let focused = view.focus_view("p1").unwrap();
        assert!(focused.contains("tail_recursive"));
        assert!(focused.contains("type systems"));
    }

    #[test]
    fn focus_view_unknown_post_errors() {
        let social = module();
        assert!(social.view().focus_view("nope").is_err());
    }
}
