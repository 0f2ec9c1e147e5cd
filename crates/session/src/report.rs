//! Plain-text end-of-session report.

use hatchling_core::archive::SessionSummary;
use hatchling_core::session::Session;
use hatchling_progression::ProgressionStatus;

/// Render the final report logged when a session ends.
pub fn render_report(
    session: &Session,
    summary: &SessionSummary,
    status: Option<&ProgressionStatus>,
) -> String {
    let total = session.history.len();
    let successes = session.history.iter().filter(|e| e.success).count();
    let failures = total - successes;

    let mut out = format!(
        "SESSION REPORT — {}\n\
         ==============\n\n\
         📊 Stats:\n\
         - Total actions: {total}\n\
         - Successes: {successes}\n\
         - Failures: {failures}\n\
         - Success rate: {:.1}%\n",
        session.id,
        summary.success_rate * 100.0,
    );

    if let Some(status) = status {
        out.push_str(&format!(
            "\n🎮 Progression:\n- Balance: {} XP\n- Total earned: {} XP\n- Level: {} {}\n",
            status.xp_balance, status.total_xp_earned, status.level, status.title,
        ));
    }

    out.push_str("\n💡 Learnings:\n");
    out.push_str(&summary.learnings);
    out.push_str("\n\n📋 Actions:\n");
    for event in &session.history {
        let icon = if event.success { "✅" } else { "❌" };
        out.push_str(&format!("{icon} {} ({})\n", event.action_type, event.domain));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use hatchling_core::action::{Action, ActionResult};
    use hatchling_core::domain::Domain;
    use hatchling_core::event::Event;

    #[test]
    fn report_lists_every_event() {
        let mut session = Session::new(5);
        session.history.push(Event::record(
            Domain::Social,
            &Action::new("create_post"),
            &ActionResult::ok("posted"),
        ));
        session.history.push(Event::record(
            Domain::Email,
            &Action::new("email_send"),
            &ActionResult::fail("smtp down"),
        ));

        let summary = SessionSummary {
            learnings: "Posted once.".into(),
            total_actions: 2,
            success_rate: 0.5,
        };

        let report = render_report(&session, &summary, None);
        assert!(report.contains("Total actions: 2"));
        assert!(report.contains("✅ create_post (social)"));
        assert!(report.contains("❌ email_send (email)"));
        assert!(report.contains("50.0%"));
    }
}
