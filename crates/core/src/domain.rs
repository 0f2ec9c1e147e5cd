//! The navigation domains an agent can operate in.
//!
//! A domain is the active module the session is currently pointed at:
//! the social feed, the blog, the mailbox, and so on. The domain
//! router advances this every iteration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The active module/mode of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    /// The dashboard; sessions start here.
    Home,
    /// The XP shop where tools are purchased.
    Shop,
    /// Blog publishing and comment moderation.
    Blog,
    /// The social feed.
    Social,
    /// The mailbox.
    Email,
    /// Wiki search and knowledge extraction.
    Research,
    /// Master plan management. Forced while the plan gate is locked.
    Plan,
    /// System overlays (confirmation popups).
    System,
    /// Terminal pseudo-domain; the loop exits when it is reached.
    Finish,
}

impl Domain {
    /// All navigable domains, in the order the status frame lists them.
    pub const NAVIGABLE: [Domain; 7] = [
        Domain::Home,
        Domain::Social,
        Domain::Blog,
        Domain::Email,
        Domain::Research,
        Domain::Shop,
        Domain::Plan,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Home => "home",
            Domain::Shop => "shop",
            Domain::Blog => "blog",
            Domain::Social => "social",
            Domain::Email => "email",
            Domain::Research => "research",
            Domain::Plan => "plan",
            Domain::System => "system",
            Domain::Finish => "finish",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when a string does not name a known domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDomain(pub String);

impl fmt::Display for UnknownDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown domain: {}", self.0)
    }
}

impl std::error::Error for UnknownDomain {}

impl FromStr for Domain {
    type Err = UnknownDomain;

    /// Case-insensitive: executors report `navigate_to` targets in
    /// whatever casing the backing module uses.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "home" => Ok(Domain::Home),
            "shop" => Ok(Domain::Shop),
            "blog" => Ok(Domain::Blog),
            "social" => Ok(Domain::Social),
            "email" | "mail" => Ok(Domain::Email),
            "research" | "wiki" => Ok(Domain::Research),
            "plan" => Ok(Domain::Plan),
            "system" => Ok(Domain::System),
            "finish" => Ok(Domain::Finish),
            other => Err(UnknownDomain(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("SOCIAL".parse::<Domain>().unwrap(), Domain::Social);
        assert_eq!("Email".parse::<Domain>().unwrap(), Domain::Email);
        assert_eq!("  home ".parse::<Domain>().unwrap(), Domain::Home);
    }

    #[test]
    fn parse_accepts_aliases() {
        assert_eq!("mail".parse::<Domain>().unwrap(), Domain::Email);
        assert_eq!("wiki".parse::<Domain>().unwrap(), Domain::Research);
    }

    #[test]
    fn parse_rejects_unknown() {
        assert!("garden".parse::<Domain>().is_err());
    }

    #[test]
    fn display_is_lowercase() {
        assert_eq!(Domain::Research.to_string(), "research");
    }

    #[test]
    fn serde_roundtrip() {
        let json = serde_json::to_string(&Domain::Blog).unwrap();
        assert_eq!(json, "\"blog\"");
        let back: Domain = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Domain::Blog);
    }
}
