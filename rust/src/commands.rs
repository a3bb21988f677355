//! Text command router over a schedule snapshot.
//!
//! Understands a handful of short commands and answers with markdown:
//! - `help`, `?`, `menu`
//! - `crane plan <vessel name>`
//! - `yard plan <expected moves>`
//! - `list schedule [YYYY-MM-DD]`
//! - `berth plan`
//!
//! Crane and yard requests are matched before the generic `plan` keyword so
//! `crane plan X` and `yard plan N` reach their own handlers.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

use crate::config::{PlanningConfig, YardConfig};
use crate::crane::{crane_for, plan_kpis};
use crate::index::ScheduleIndex;
use crate::models::{BerthPlan, Vessel, YardAllocation};
use crate::yard::{allocate_demand, yard_demand};

pub const HELP: &str = "You can ask:\n\
- `list schedule` (optionally add a date)\n\
- `berth plan`\n\
- `crane plan MSC AURORA`\n\
- `yard plan 3000`\n";

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

fn number_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+").expect("static pattern"))
}

fn date_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d{4}-\d{2}-\d{2}").expect("static pattern"))
}

fn keyword_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(crane|plan)\b").expect("static pattern"))
}

/// Routes chat-style commands to the planners.
pub struct CommandRouter<'a> {
    snapshot: &'a ScheduleIndex,
    planning: PlanningConfig,
    yard: YardConfig,
}

impl<'a> CommandRouter<'a> {
    pub fn new(snapshot: &'a ScheduleIndex, planning: PlanningConfig, yard: YardConfig) -> Self {
        Self {
            snapshot,
            planning,
            yard,
        }
    }

    /// Answer one message.
    pub fn route(&self, message: &str) -> String {
        let msg = message.trim().to_lowercase();

        if msg.starts_with("help") || msg == "?" || msg == "menu" {
            return HELP.to_string();
        }
        if msg.contains("crane") {
            return self.crane_plan(message);
        }
        if msg.contains("yard") {
            return self.yard_plan(&msg);
        }
        if msg.contains("list") || msg.contains("schedule") {
            return self.list_schedule(&msg);
        }
        if msg.contains("berth") || msg.contains("plan") {
            return self.berth_plan();
        }
        format!("I didn't recognize that. {}", HELP)
    }

    fn plan(&self) -> Result<BerthPlan, String> {
        self.snapshot
            .plan_berths(&self.planning)
            .map_err(|e| format!("Planning failed: {}", e))
    }

    fn berth_plan(&self) -> String {
        let plan = match self.plan() {
            Ok(plan) => plan,
            Err(msg) => return msg,
        };
        let kpis = plan_kpis(&plan.assignments);
        let mut out = format!(
            "**Berth plan created** — {} vessels, {} moves, avg {:.1} MPH, {:.1} cranes.\n\n",
            kpis.vessel_count, kpis.total_moves, kpis.avg_throughput, kpis.avg_cranes
        );
        out.push_str(&plan_table(&plan));
        for u in &plan.unplanned {
            out.push_str(&format!("\n- Not planned: {}", u.reason));
        }
        out
    }

    fn crane_plan(&self, message: &str) -> String {
        let stripped = keyword_pattern().replace_all(message, " ");
        let name = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
        let plan = match self.plan() {
            Ok(plan) => plan,
            Err(msg) => return msg,
        };
        match crane_for(&plan, &name) {
            Ok(advice) => advice.summary(),
            Err(e) => e.to_string(),
        }
    }

    fn yard_plan(&self, msg: &str) -> String {
        let total_moves = match number_pattern().find(msg) {
            Some(m) => match m.as_str().parse::<u64>() {
                Ok(n) => n,
                Err(_) => return format!("Move count '{}' is out of range.", m.as_str()),
            },
            None => self.yard.default_total_moves,
        };
        let demand = yard_demand(total_moves, &self.yard);
        match allocate_demand(&self.snapshot.yard_blocks, demand, &self.yard) {
            Ok(allocations) => yard_table(&allocations),
            Err(e) => format!("Yard allocation failed: {}", e),
        }
    }

    fn list_schedule(&self, msg: &str) -> String {
        let date = match date_pattern().find(msg) {
            Some(m) => match NaiveDate::parse_from_str(m.as_str(), "%Y-%m-%d") {
                Ok(d) => Some(d),
                Err(_) => return format!("'{}' is not a valid date.", m.as_str()),
            },
            None => None,
        };
        vessel_table(&self.snapshot.list_vessels(date))
    }
}

/// Render rows as a GitHub-flavoured markdown table.
pub fn markdown_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut out = String::new();
    out.push_str(&format!("| {} |\n", headers.join(" | ")));
    out.push_str(&format!(
        "|{}|\n",
        headers.iter().map(|_| "---").collect::<Vec<_>>().join("|")
    ));
    for row in rows {
        out.push_str(&format!("| {} |\n", row.join(" | ")));
    }
    out
}

pub fn vessel_table(vessels: &[Vessel]) -> String {
    let rows: Vec<Vec<String>> = vessels
        .iter()
        .map(|v| {
            vec![
                v.name.clone(),
                v.id.clone(),
                v.service.clone().unwrap_or_default(),
                v.eta.format(TIME_FORMAT).to_string(),
                format!("{}", v.length_m),
                v.moves.to_string(),
            ]
        })
        .collect();
    markdown_table(&["vessel", "imo", "service", "eta", "loa_m", "moves"], &rows)
}

pub fn plan_table(plan: &BerthPlan) -> String {
    let rows: Vec<Vec<String>> = plan
        .assignments
        .iter()
        .map(|a| {
            vec![
                a.vessel_name.clone(),
                a.vessel_id.clone(),
                a.etb.format(TIME_FORMAT).to_string(),
                a.etd.format(TIME_FORMAT).to_string(),
                a.berth_id.clone(),
                a.cranes.to_string(),
                a.moves.to_string(),
                format!("{:.1}", a.throughput),
            ]
        })
        .collect();
    markdown_table(
        &["vessel", "imo", "etb", "etd", "berth", "cranes", "moves", "mph"],
        &rows,
    )
}

pub fn yard_table(allocations: &[YardAllocation]) -> String {
    let rows: Vec<Vec<String>> = allocations
        .iter()
        .map(|a| {
            vec![
                a.block_id.clone(),
                a.slots.to_string(),
                a.category.clone().unwrap_or_default(),
            ]
        })
        .collect();
    markdown_table(&["block", "allocate_slots", "type"], &rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Berth, YardBlock};
    use chrono::NaiveDateTime;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 9, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn snapshot() -> ScheduleIndex {
        ScheduleIndex {
            vessels: vec![
                Vessel {
                    id: "9700001".to_string(),
                    name: "MSC AURORA".to_string(),
                    service: Some("AEX".to_string()),
                    length_m: 366.0,
                    beam_m: None,
                    draft_m: None,
                    eta: at(1, 6),
                    moves: 4000,
                },
                Vessel {
                    id: "9700002".to_string(),
                    name: "KOTKA".to_string(),
                    service: None,
                    length_m: 180.0,
                    beam_m: None,
                    draft_m: None,
                    eta: at(2, 6),
                    moves: 1000,
                },
            ],
            berths: vec![
                Berth {
                    id: "Q1".to_string(),
                    max_length_m: 400.0,
                    cranes: 4,
                },
                Berth {
                    id: "Q2".to_string(),
                    max_length_m: 200.0,
                    cranes: 2,
                },
            ],
            yard_blocks: vec![
                YardBlock {
                    id: "A1".to_string(),
                    category: Some("IMP".to_string()),
                    slots: 800,
                },
                YardBlock {
                    id: "A2".to_string(),
                    category: Some("IMP".to_string()),
                    slots: 500,
                },
            ],
        }
    }

    fn route(message: &str) -> String {
        let index = snapshot();
        CommandRouter::new(&index, PlanningConfig::default(), YardConfig::default()).route(message)
    }

    #[test]
    fn test_help() {
        assert_eq!(route("help"), HELP);
        assert_eq!(route(" ? "), HELP);
        assert_eq!(route("menu"), HELP);
    }

    #[test]
    fn test_unrecognized() {
        assert!(route("what's the weather").starts_with("I didn't recognize that. "));
    }

    #[test]
    fn test_berth_plan_headline() {
        let out = route("berth plan");
        assert!(out.starts_with(
            "**Berth plan created** — 2 vessels, 5000 moves, avg 105.0 MPH, 3.0 cranes."
        ));
        assert!(out.contains("| MSC AURORA | 9700001 | 2025-09-01 06:00 | 2025-09-02 10:34 | Q1 | 4 | 4000 | 140.0 |"));
    }

    #[test]
    fn test_crane_plan_reaches_crane_handler() {
        assert_eq!(
            route("crane plan msc aurora"),
            "Assign **4 cranes** to **MSC AURORA** @ berth **Q1** for **4000** moves (~28.6h, 140.0 MPH)."
        );
        assert_eq!(
            route("crane plan GHOST"),
            "Couldn't find vessel 'GHOST'. Run 'plan' first or check name."
        );
    }

    #[test]
    fn test_yard_plan_uses_first_number() {
        let out = route("yard plan 3000");
        // 3000 moves * 0.5 = 1500 slots: 800 + 500 + 200 overflow
        assert!(out.contains("| A1 | 800 | IMP |"));
        assert!(out.contains("| A2 | 500 | IMP |"));
        assert!(out.contains("| (overflow) | 200 | IMP |"));
    }

    #[test]
    fn test_yard_plan_default_moves() {
        let out = route("yard");
        // default 2000 moves -> 1000 slots, fits in the two blocks
        assert!(out.contains("| A2 | 200 | IMP |"));
        assert!(!out.contains("(overflow)"));
    }

    #[test]
    fn test_yard_plan_rejects_oversized_count() {
        let out = route("yard plan 99999999999999999999999");
        assert_eq!(out, "Move count '99999999999999999999999' is out of range.");
    }

    #[test]
    fn test_list_rejects_invalid_date() {
        let out = route("list schedule 2025-13-45");
        assert_eq!(out, "'2025-13-45' is not a valid date.");
    }

    #[test]
    fn test_list_with_date() {
        let all = route("list schedule");
        assert!(all.contains("MSC AURORA") && all.contains("KOTKA"));
        let filtered = route("list schedule 2025-09-02");
        assert!(filtered.contains("KOTKA"));
        assert!(!filtered.contains("MSC AURORA"));
    }

    #[test]
    fn test_markdown_table_shape() {
        let table = markdown_table(&["a", "b"], &[vec!["1".to_string(), "2".to_string()]]);
        assert_eq!(table, "| a | b |\n|---|---|\n| 1 | 2 |\n");
    }
}
