// Behavior classification: buckets robot entries into named strategies.
//
// Each phase has an ordered rule table. Rules overlap, so the first rule
// whose test passes names the behavior.

use std::collections::HashMap;

use serde::Serialize;

use crate::model::RobotMatchEntry;

/// Label used when no rule in a table matches.
pub const UNKNOWN_BEHAVIOR: &str = "Unknown";

/// How a rule names the behavior it detects.
#[derive(Debug, Clone, Copy)]
pub enum RuleLabel {
    Fixed(&'static str),
    Computed(fn(&RobotMatchEntry) -> String),
}

impl RuleLabel {
    fn render(&self, entry: &RobotMatchEntry) -> String {
        match self {
            RuleLabel::Fixed(label) => (*label).to_string(),
            RuleLabel::Computed(build) => build(entry),
        }
    }
}

/// One row of a rule table.
#[derive(Debug, Clone, Copy)]
pub struct BehaviorRule {
    pub test: fn(&RobotMatchEntry) -> bool,
    pub label: RuleLabel,
}

/// Autonomous-phase rules, highest priority first.
pub const AUTO_RULES: &[BehaviorRule] = &[
    BehaviorRule {
        test: |e| e.auto_scale_cubes > 0 && e.auto_switch_cubes > 0,
        // Both counts come from the switch field; dashboards key on this exact text.
        label: RuleLabel::Computed(|e| {
            format!(
                "{} Cube Scale & {} Cube Switch Auto",
                e.auto_switch_cubes, e.auto_switch_cubes
            )
        }),
    },
    BehaviorRule {
        test: |e| e.auto_scale_cubes > 0 && e.auto_switch_cubes == 0,
        label: RuleLabel::Computed(|e| format!("{} Cube Scale Auto", e.auto_scale_cubes)),
    },
    BehaviorRule {
        test: |e| e.auto_switch_cubes > 0 && e.auto_scale_cubes == 0,
        label: RuleLabel::Computed(|e| format!("{} Cube Switch Auto", e.auto_switch_cubes)),
    },
    BehaviorRule {
        test: |e| e.auto_cross_line,
        label: RuleLabel::Fixed("Only Cross Auto Line"),
    },
    BehaviorRule {
        test: |e| e.autonomous_path.is_empty(),
        label: RuleLabel::Fixed("No Auto"),
    },
];

/// Teleop-phase rules, highest priority first.
pub const TELEOP_RULES: &[BehaviorRule] = &[
    BehaviorRule {
        test: |e| e.scale_cubes_teleop >= e.own_switch_cubes_teleop && e.scale_cubes_teleop > 0,
        label: RuleLabel::Fixed("Scale"),
    },
    BehaviorRule {
        test: |e| e.own_switch_cubes_teleop > 0,
        label: RuleLabel::Computed(|e| with_support_suffixes("Own Switch", e)),
    },
    BehaviorRule {
        test: |e| e.opp_switch_cubes_teleop > 0,
        label: RuleLabel::Computed(|e| with_support_suffixes("Opp. Switch", e)),
    },
    BehaviorRule {
        test: |e| e.exchange_cubes > 0,
        label: RuleLabel::Fixed("Exchange"),
    },
];

fn with_support_suffixes(base: &str, entry: &RobotMatchEntry) -> String {
    let mut label = base.to_string();
    if entry.exchange_cubes > 0 {
        label.push_str(" & Exchange");
    }
    if entry.played_defense {
        label.push_str(" & Defense");
    }
    label
}

/// Name the behavior of `entry` using the first matching rule.
pub fn identify_behavior(rules: &[BehaviorRule], entry: &RobotMatchEntry) -> String {
    rules
        .iter()
        .find(|rule| (rule.test)(entry))
        .map(|rule| rule.label.render(entry))
        .unwrap_or_else(|| UNKNOWN_BEHAVIOR.to_string())
}

/// One named behavior and the entries that exhibit it.
#[derive(Debug, Clone, Serialize)]
pub struct BehaviorBucket<'a> {
    pub label: String,
    pub entries: Vec<&'a RobotMatchEntry>,
}

/// Label -> entries mapping that keeps labels in first-seen order.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct BehaviorBuckets<'a> {
    buckets: Vec<BehaviorBucket<'a>>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl<'a> BehaviorBuckets<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, label: String, entry: &'a RobotMatchEntry) {
        match self.index.get(&label) {
            Some(&i) => self.buckets[i].entries.push(entry),
            None => {
                self.index.insert(label.clone(), self.buckets.len());
                self.buckets.push(BehaviorBucket {
                    label,
                    entries: vec![entry],
                });
            }
        }
    }

    pub fn get(&self, label: &str) -> Option<&[&'a RobotMatchEntry]> {
        self.index
            .get(label)
            .map(|&i| self.buckets[i].entries.as_slice())
    }

    /// Labels in first-seen order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.buckets.iter().map(|b| b.label.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &BehaviorBucket<'a>> {
        self.buckets.iter()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total number of entries across all buckets.
    pub fn entry_count(&self) -> usize {
        self.buckets.iter().map(|b| b.entries.len()).sum()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Behaviors<'a> {
    pub auto_behaviors: BehaviorBuckets<'a>,
    pub teleop_behaviors: BehaviorBuckets<'a>,
}

/// Pair of rule tables applied to every entry.
#[derive(Debug, Clone, Copy)]
pub struct Classifier<'r> {
    pub auto_rules: &'r [BehaviorRule],
    pub teleop_rules: &'r [BehaviorRule],
}

impl Default for Classifier<'static> {
    fn default() -> Self {
        Self {
            auto_rules: AUTO_RULES,
            teleop_rules: TELEOP_RULES,
        }
    }
}

impl<'r> Classifier<'r> {
    pub fn new(auto_rules: &'r [BehaviorRule], teleop_rules: &'r [BehaviorRule]) -> Self {
        Self {
            auto_rules,
            teleop_rules,
        }
    }

    pub fn classify<'a, I>(&self, entries: I) -> Behaviors<'a>
    where
        I: IntoIterator<Item = &'a RobotMatchEntry>,
    {
        let mut behaviors = Behaviors::default();
        for entry in entries {
            behaviors
                .auto_behaviors
                .push(identify_behavior(self.auto_rules, entry), entry);
            behaviors
                .teleop_behaviors
                .push(identify_behavior(self.teleop_rules, entry), entry);
        }
        behaviors
    }
}

/// Classify entries with the standard rule tables.
pub fn classify<'a, I>(entries: I) -> Behaviors<'a>
where
    I: IntoIterator<Item = &'a RobotMatchEntry>,
{
    Classifier::default().classify(entries)
}
