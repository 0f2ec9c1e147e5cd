//! Context composition — the screen the decision source reads.
//!
//! Pure string assembly: workspace header, domain body, celebration
//! and warning banners, and the status/navigation frame. The state
//! machine treats all of it as opaque text.

use hatchling_core::action::ActionResult;
use hatchling_core::domain::Domain;
use hatchling_core::workspace::Workspace;
use hatchling_progression::{ProgressionStatus, XpReceipt};

const FRAME_WIDTH: usize = 70;
const WORKSPACE_HEAVY_CHARS: usize = 2_000;
const PIN_PREVIEW_CHARS: usize = 1_500;

/// Composes the per-iteration context string.
pub struct ContextComposer {
    max_actions: u32,
}

impl ContextComposer {
    pub fn new(max_actions: u32) -> Self {
        Self { max_actions }
    }

    /// The top status/navigation frame: module strip, energy bar,
    /// progression line, and urgency hints as the budget drains.
    pub fn status_frame(
        &self,
        domain: Domain,
        actions_used: u32,
        status: Option<&ProgressionStatus>,
    ) -> String {
        let rule = "━".repeat(FRAME_WIDTH);
        let node = format!("NODE: {}", domain.as_str().to_uppercase());

        let strip: Vec<String> = Domain::NAVIGABLE
            .iter()
            .map(|d| {
                if *d == domain {
                    format!("▶️ **[{}]**", d.as_str().to_uppercase())
                } else {
                    d.as_str().to_uppercase()
                }
            })
            .collect();

        let remaining = self.max_actions.saturating_sub(actions_used);
        let energy: String = "🟢".repeat(remaining as usize) + &"🔴".repeat(actions_used as usize);

        let progression_line = status
            .map(|s| {
                format!(
                    "\n⭐ **LVL {}** {} | Balance: {} XP | {}/{} to next level ({:.1}%)",
                    s.level,
                    s.title,
                    s.xp_balance,
                    s.xp_progress_in_level,
                    s.xp_needed_for_next_level,
                    s.progress_percentage,
                )
            })
            .unwrap_or_default();

        let urgency = self.urgency_hint(remaining);

        format!(
            "**📡 SYSTEM TERMINAL — {node}**\n{rule}\n🌐 {}\n🔋 {energy} ({remaining}/{} actions left){progression_line}{urgency}\n{rule}\n",
            strip.join(" | "),
            self.max_actions,
        )
    }

    fn urgency_hint(&self, remaining: u32) -> &'static str {
        let pct = if self.max_actions == 0 {
            0
        } else {
            remaining * 100 / self.max_actions
        };
        if pct <= 20 {
            "\n🚨 **CRITICAL LOW ENERGY!** Only high-value actions now: publish, complete \
             research, share findings. No loops, no exploration."
        } else if pct <= 40 {
            "\n⚠️ **LOW ENERGY WARNING** — prioritize content creation and engagement; \
             avoid unnecessary navigation."
        } else if pct <= 60 {
            "\n💡 **ENERGY MODERATE** — balance research with creation; avoid repetitive \
             actions."
        } else {
            ""
        }
    }

    /// The pinned-workspace header. Empty when nothing is pinned.
    pub fn workspace_header(&self, workspace: &Workspace) -> String {
        if workspace.is_empty() {
            return String::new();
        }

        let mut out = vec!["### 📋 WORKSPACE (Pinned Data)".to_string()];
        if workspace.total_chars() > WORKSPACE_HEAVY_CHARS {
            out.push(
                "⚠️ **MEMORY WARNING**: Your workspace is getting full. Consider \
                 `unpin_from_workspace` for old data."
                    .to_string(),
            );
        }

        for pin in workspace.iter() {
            let chars = pin.content.chars().count();
            let preview = if chars <= PIN_PREVIEW_CHARS {
                pin.content.clone()
            } else {
                let cut: String = pin.content.chars().take(PIN_PREVIEW_CHARS - 3).collect();
                format!("{cut}...")
            };
            out.push(format!("📌 **{}** ({chars} chars)", pin.label.to_uppercase()));
            out.push(format!("   {preview}"));
            out.push(format!("   └─ ID: `{}`", pin.label));
            out.push(String::new());
        }

        format!("{}\n{}\n", out.join("\n"), "━".repeat(40))
    }

    /// Last-result feedback plus the stay-put reminder outside home.
    pub fn feedback(
        &self,
        success_msg: Option<&str>,
        error_msg: Option<&str>,
        domain: Domain,
    ) -> String {
        let mut out = String::new();
        let dots = ".".repeat(40);

        if let Some(msg) = success_msg {
            out.push_str(&format!(
                "\n{dots}\n✅ **LAST STATUS**: {msg}\n⚠️ DO NOT REPEAT THIS STEP. Move to \
                 the next task — repeating the same action with the same parameters costs XP.\n"
            ));
        }
        if let Some(msg) = error_msg {
            out.push_str(&format!(
                "\n{dots}\n❌ **LAST STATUS**: {msg}\n⚠️ Correct this error before proceeding.\n"
            ));
        }

        if domain != Domain::Home {
            out.push_str(&format!(
                "\n{dots}\n🧭 **YOU ARE CURRENTLY IN: {mode} MODE**\n⛔ DO NOT call \
                 `navigate_to_mode(\"{mode}\")` — you are ALREADY here. Execute an action \
                 from the list instead.\n",
                mode = domain.as_str().to_uppercase(),
            ));
        }

        out
    }

    /// The blocking overlay shown while the plan gate is locked.
    pub fn plan_overlay(&self) -> String {
        let rule = "━".repeat(FRAME_WIDTH);
        format!(
            "{rule}\n🔴 **STRATEGIC ALIGNMENT REQUIRED**\n{rule}\n\n\
             **SYSTEM STATUS**: Trajectory undefined. Core modules paused.\n\n\
             **AVAILABLE MODULES (locked):**\n\
             📬 **EMAIL**: Correspondence management\n\
             ✍️ **BLOG**: Insight publishing\n\
             💬 **SOCIAL**: Community engagement\n\
             🔍 **RESEARCH**: Knowledge extraction\n\
             🛒 **SHOP**: Capability upgrades\n\n\
             👉 **MANDATORY**: Execute `plan_initialize` to define your strategy.\n\n{rule}"
        )
    }

    /// The celebration banner after a level-up.
    pub fn level_up_banner(&self, receipt: &XpReceipt) -> Option<String> {
        if !receipt.leveled_up {
            return None;
        }
        let mut banner = format!(
            "\n🎊 **LEVEL UP!** You reached level {} — {}\n",
            receipt.current_level, receipt.current_title,
        );
        for reward in &receipt.rewards {
            banner.push_str(&format!(
                "🏆 Title unlocked: {} — {}\n",
                reward.title, reward.description
            ));
        }
        Some(banner)
    }

    /// Generic body for domains without a registered view.
    pub fn fallback_body(&self, action_type: &str, result: &ActionResult) -> String {
        let status = if result.success { "SUCCESS" } else { "FAILURE" };
        let mut out = format!(
            "\n> {status}: {}\n",
            action_type.replace('_', " ").to_uppercase()
        );
        if let Some(data) = &result.data {
            out.push_str(&format!("> Details: {data}\n"));
        }
        if let Some(error) = &result.error {
            out.push_str(&format!("> Error: {error}\n"));
        }
        out
    }

    /// Glue all sections into the final context string.
    #[allow(clippy::too_many_arguments)]
    pub fn compose(
        &self,
        domain: Domain,
        actions_used: u32,
        status: Option<&ProgressionStatus>,
        workspace: &Workspace,
        body: &str,
        level_up: Option<&str>,
        loop_warning: Option<&str>,
        feedback: &str,
    ) -> String {
        let mut out = self.status_frame(domain, actions_used, status);
        if let Some(banner) = level_up {
            out.push_str(banner);
        }
        if let Some(warning) = loop_warning {
            out.push('\n');
            out.push_str(warning);
            out.push('\n');
        }
        out.push_str(&self.workspace_header(workspace));
        out.push('\n');
        out.push_str(body);
        out.push('\n');
        out.push_str(feedback);
        out
    }
}
