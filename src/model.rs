// Core data types: scouted robot entries, official match results, events.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A 2D sample in `(y, x)` order, the order the scouting app records them in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct Point {
    pub y: f64,
    pub x: f64,
}

impl Point {
    pub fn new(y: f64, x: f64) -> Self {
        Self { y, x }
    }
}

impl From<(f64, f64)> for Point {
    fn from((y, x): (f64, f64)) -> Self {
        Self { y, x }
    }
}

impl From<Point> for (f64, f64) {
    fn from(p: Point) -> Self {
        (p.y, p.x)
    }
}

/// One team's recorded performance in one match.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RobotMatchEntry {
    pub match_number: u32,
    pub team_number: u32,
    /// Raw capture-space samples in capture order. May be empty.
    pub autonomous_path: Vec<Point>,
    pub auto_cross_line: bool,
    pub auto_switch_cubes: u32,
    pub auto_scale_cubes: u32,
    pub own_switch_cubes_teleop: u32,
    pub scale_cubes_teleop: u32,
    pub opp_switch_cubes_teleop: u32,
    pub exchange_cubes: u32,
    pub single_climb: bool,
    pub climb_with_one_buddy: bool,
    pub climb_with_two_buddies: bool,
    pub played_defense: bool,
}

impl RobotMatchEntry {
    /// The qualification match key this entry belongs to, e.g. `2018cc_qm12`.
    pub fn match_key(&self, event_slug: &str) -> String {
        format!("{}_qm{}", event_slug, self.match_number)
    }
}

/// Selects which identifying number a dashboard view is keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewType {
    Match,
    Team,
}

impl ViewType {
    pub fn number(self, entry: &RobotMatchEntry) -> u32 {
        match self {
            ViewType::Match => entry.match_number,
            ViewType::Team => entry.team_number,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllianceColor {
    Red,
    Blue,
}

impl fmt::Display for AllianceColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllianceColor::Red => write!(f, "red"),
            AllianceColor::Blue => write!(f, "blue"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompLevel {
    Qm,
    Ef,
    Qf,
    Sf,
    F,
}

/// Winner as reported by the competition API; an empty string means a tie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WinningAlliance {
    Red,
    Blue,
    #[default]
    #[serde(rename = "")]
    Tie,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MatchAlliance {
    pub score: i32,
    pub team_keys: Vec<String>,
    #[serde(default)]
    pub surrogate_team_keys: Vec<String>,
    #[serde(default)]
    pub dq_team_keys: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MatchAlliances {
    pub red: MatchAlliance,
    pub blue: MatchAlliance,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AllianceBreakdown {
    /// Platform-orientation code, e.g. `LRL`.
    #[serde(rename = "tba_gameData", default)]
    pub game_data: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub red: AllianceBreakdown,
    pub blue: AllianceBreakdown,
}

/// Official result for one match, in the competition API's schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub key: String,
    pub comp_level: CompLevel,
    #[serde(default)]
    pub set_number: u32,
    pub match_number: u32,
    pub alliances: MatchAlliances,
    #[serde(default)]
    pub score_breakdown: Option<ScoreBreakdown>,
    #[serde(default)]
    pub winning_alliance: WinningAlliance,
    #[serde(default)]
    pub event_key: String,
    #[serde(default)]
    pub time: Option<i64>,
    #[serde(default)]
    pub predicted_time: Option<i64>,
    #[serde(default)]
    pub actual_time: Option<i64>,
}

impl MatchResult {
    /// The alliance a team played on; teams not listed on red are treated as blue.
    pub fn alliance_of(&self, team_number: u32) -> AllianceColor {
        let key = format!("frc{team_number}");
        if self.alliances.red.team_keys.contains(&key) {
            AllianceColor::Red
        } else {
            AllianceColor::Blue
        }
    }

    /// The raw platform-orientation code, seen from the blue alliance.
    pub fn platform_code(&self) -> Option<&str> {
        self.score_breakdown
            .as_ref()
            .map(|b| b.blue.game_data.as_str())
            .filter(|code| !code.is_empty())
    }
}

/// A competition: its scouted entries plus official results keyed by match key.
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub slug: String,
    pub robot_entries: Vec<RobotMatchEntry>,
    pub matches: BTreeMap<String, MatchResult>,
    pub loaded_at: DateTime<Utc>,
}

impl Event {
    pub fn entries_by(&self, view: ViewType, number: u32) -> Vec<&RobotMatchEntry> {
        self.robot_entries
            .iter()
            .filter(|e| view.number(e) == number)
            .collect()
    }

    pub fn match_result_for(&self, entry: &RobotMatchEntry) -> Option<&MatchResult> {
        self.matches.get(&entry.match_key(&self.slug))
    }

    /// Distinct team numbers, ascending.
    pub fn teams(&self) -> Vec<u32> {
        let mut teams: Vec<u32> = self.robot_entries.iter().map(|e| e.team_number).collect();
        teams.sort_unstable();
        teams.dedup();
        teams
    }

    /// Distinct scouted match numbers, ascending.
    pub fn match_numbers(&self) -> Vec<u32> {
        let mut numbers: Vec<u32> = self.robot_entries.iter().map(|e| e.match_number).collect();
        numbers.sort_unstable();
        numbers.dedup();
        numbers
    }
}
