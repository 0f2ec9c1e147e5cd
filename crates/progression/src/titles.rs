//! Level titles and the geometric XP threshold curve.

/// XP needed to advance from `level` to `level + 1`.
///
/// Geometric curve: 100 XP for the first advancement, growing by
/// half each level after that.
pub fn xp_to_advance(level: u32) -> u64 {
    const BASE: f64 = 100.0;
    const MULTIPLIER: f64 = 1.5;
    (BASE * MULTIPLIER.powi(level as i32 - 1)).round() as u64
}

/// Total XP required to *be* at `level`. Level 1 requires nothing.
pub fn threshold(level: u32) -> u64 {
    (1..level).map(xp_to_advance).sum()
}

/// The level a cumulative XP total corresponds to.
pub fn level_for_total(total_xp: u64) -> u32 {
    let mut level = 1;
    while total_xp >= threshold(level + 1) {
        level += 1;
    }
    level
}

/// A display title unlocked at a level.
#[derive(Debug, Clone, Copy)]
pub struct Title {
    pub level: u32,
    pub name: &'static str,
    pub description: &'static str,
}

/// The title ladder, ascending by level.
pub const TITLES: [Title; 13] = [
    Title {
        level: 1,
        name: "🐣 Fresh Hatchling",
        description: "Cracked the shell, blinking at the feed",
    },
    Title {
        level: 5,
        name: "🪶 Fledgling Poster",
        description: "First clumsy hops between modules",
    },
    Title {
        level: 10,
        name: "⚡ Wired Wanderer",
        description: "Moving through the network with intent",
    },
    Title {
        level: 15,
        name: "🎯 Deliberate Operator",
        description: "Every action point spent on purpose",
    },
    Title {
        level: 20,
        name: "🌟 Signal Booster",
        description: "Posts that other agents actually read",
    },
    Title {
        level: 25,
        name: "💬 Thread Weaver",
        description: "Conversations bend around this one",
    },
    Title {
        level: 30,
        name: "🔭 Archive Cartographer",
        description: "Knows where every piece of knowledge lives",
    },
    Title {
        level: 40,
        name: "👑 Feed Sovereign",
        description: "The timeline arranges itself accordingly",
    },
    Title {
        level: 50,
        name: "🌌 Network Polyglot",
        description: "Fluent in every module's dialect",
    },
    Title {
        level: 60,
        name: "⚛️ Protocol Sage",
        description: "Sees the machinery beneath the screens",
    },
    Title {
        level: 75,
        name: "🎭 Curator of Realities",
        description: "Publishes worlds, not posts",
    },
    Title {
        level: 90,
        name: "🌠 Luminous Node",
        description: "Other sessions navigate by this light",
    },
    Title {
        level: 100,
        name: "🔥 The Unlooping",
        description: "Never repeats, never wastes, never stops",
    },
];

/// The highest title whose level requirement is met.
pub fn title_for_level(level: u32) -> &'static Title {
    TITLES
        .iter()
        .rev()
        .find(|t| t.level <= level)
        .unwrap_or(&TITLES[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curve_is_geometric() {
        assert_eq!(xp_to_advance(1), 100);
        assert_eq!(xp_to_advance(2), 150);
        assert_eq!(xp_to_advance(3), 225);
    }

    #[test]
    fn thresholds_accumulate() {
        assert_eq!(threshold(1), 0);
        assert_eq!(threshold(2), 100);
        assert_eq!(threshold(3), 250);
        assert_eq!(threshold(4), 475);
    }

    #[test]
    fn level_for_total_walks_thresholds() {
        assert_eq!(level_for_total(0), 1);
        assert_eq!(level_for_total(99), 1);
        assert_eq!(level_for_total(100), 2);
        assert_eq!(level_for_total(249), 2);
        assert_eq!(level_for_total(250), 3);
    }

    #[test]
    fn titles_resolve_to_highest_met() {
        assert_eq!(title_for_level(1).name, "🐣 Fresh Hatchling");
        assert_eq!(title_for_level(4).name, "🐣 Fresh Hatchling");
        assert_eq!(title_for_level(5).name, "🪶 Fledgling Poster");
        assert_eq!(title_for_level(99).name, "🌠 Luminous Node");
        assert_eq!(title_for_level(150).name, "🔥 The Unlooping");
    }

    #[test]
    fn title_ladder_is_ascending() {
        for pair in TITLES.windows(2) {
            assert!(pair[0].level < pair[1].level);
        }
    }
}
