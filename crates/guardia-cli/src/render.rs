//! Schedule output: plain text for the console, JSON for other tools

use chrono::Datelike;
use serde::Serialize;
use std::collections::HashMap;

use guardia_core::calendar::YearMonth;
use guardia_core::{Person, PersonId, RenderError, Renderer, Schedule, SearchStats};
use guardia_solver::{PersonStats, Violation};

fn names(people: &[Person]) -> HashMap<&str, &str> {
    people
        .iter()
        .map(|p| (p.id.as_str(), p.name.as_str()))
        .collect()
}

fn name_of<'a>(names: &HashMap<&str, &'a str>, id: &'a str) -> &'a str {
    names.get(id).copied().unwrap_or(id)
}

/// Plain text renderer for console output
#[derive(Default)]
pub struct TextRenderer;

impl Renderer for TextRenderer {
    type Output = String;

    fn render(&self, schedule: &Schedule, people: &[Person]) -> Result<String, RenderError> {
        let names = names(people);
        let mut out = format!("Schedule for {}\n", schedule.month);
        out.push_str(&format!("{:<12} {:<4} {:<20} {}\n", "Date", "Day", "First", "Second"));
        for a in &schedule.assignments {
            out.push_str(&format!(
                "{:<12} {:<4} {:<20} {}\n",
                a.date.to_string(),
                a.date.weekday().to_string(),
                name_of(&names, &a.first),
                name_of(&names, &a.second)
            ));
        }

        let stats = &schedule.stats;
        out.push_str(&format!(
            "\n{} days ({} fixed), {} attempts, {} backtracks\n",
            schedule.assignments.len(),
            stats.fixed_days,
            stats.attempts,
            stats.backtracks
        ));

        Ok(out)
    }
}

#[derive(Serialize)]
struct JsonShift<'a> {
    date: chrono::NaiveDate,
    first: &'a PersonId,
    first_name: &'a str,
    second: &'a PersonId,
    second_name: &'a str,
}

#[derive(Serialize)]
struct JsonSchedule<'a> {
    month: YearMonth,
    assignments: Vec<JsonShift<'a>>,
    stats: &'a SearchStats,
}

/// JSON renderer, names resolved alongside IDs
#[derive(Default)]
pub struct JsonRenderer {
    pub pretty: bool,
}

impl Renderer for JsonRenderer {
    type Output = String;

    fn render(&self, schedule: &Schedule, people: &[Person]) -> Result<String, RenderError> {
        let names = names(people);
        let doc = JsonSchedule {
            month: schedule.month,
            assignments: schedule
                .assignments
                .iter()
                .map(|a| JsonShift {
                    date: a.date,
                    first: &a.first,
                    first_name: name_of(&names, &a.first),
                    second: &a.second,
                    second_name: name_of(&names, &a.second),
                })
                .collect(),
            stats: &schedule.stats,
        };

        let json = if self.pretty {
            serde_json::to_string_pretty(&doc)
        } else {
            serde_json::to_string(&doc)
        };
        json.map_err(|e| RenderError::Format(e.to_string()))
    }
}

/// Per-person statistics table
pub fn stats_table(month: YearMonth, stats: &[PersonStats], people: &[Person]) -> String {
    let names = names(people);
    let mut out = format!("Statistics for {month}\n");
    out.push_str(&format!(
        "{:<20} {:>5} {:>4} {:>4} {:>8} {:>9}\n",
        "Person", "Total", "Thu", "Fri", "Wkd days", "Wkd weeks"
    ));
    for s in stats {
        out.push_str(&format!(
            "{:<20} {:>5} {:>4} {:>4} {:>8} {:>9}\n",
            name_of(&names, &s.person),
            s.total,
            s.thursdays,
            s.fridays,
            s.weekend_days,
            s.weekend_weeks
        ));
    }
    out
}

/// One line per violation
pub fn violations_list(violations: &[Violation]) -> String {
    let mut out = String::new();
    for v in violations {
        out.push_str(&format!("  {v}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use guardia_core::Assignment;

    fn schedule() -> Schedule {
        let d = |day| NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
        Schedule {
            month: YearMonth::new(2024, 3).unwrap(),
            assignments: vec![
                Assignment::new(d(1), "ana", "luis"),
                Assignment::new(d(2), "marta", "ghost"),
            ],
            stats: SearchStats {
                attempts: 3,
                ..SearchStats::default()
            },
        }
    }

    fn people() -> Vec<Person> {
        vec![
            Person::new("ana").name("Ana Ruiz"),
            Person::new("luis").name("Luis Gil"),
            Person::new("marta").name("Marta"),
        ]
    }

    #[test]
    fn text_uses_names_and_falls_back_to_ids() {
        let out = TextRenderer.render(&schedule(), &people()).unwrap();
        assert!(out.starts_with("Schedule for 2024-03\n"));
        assert!(out.contains("2024-03-01   Fri  Ana Ruiz"));
        assert!(out.contains("Luis Gil"));
        assert!(out.contains("ghost"));
        assert!(out.contains("3 attempts"));
    }

    #[test]
    fn json_carries_ids_and_names() {
        let out = JsonRenderer::default().render(&schedule(), &people()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(value["month"], "2024-03");
        assert_eq!(value["assignments"][0]["first"], "ana");
        assert_eq!(value["assignments"][0]["first_name"], "Ana Ruiz");
        assert_eq!(value["assignments"][1]["second_name"], "ghost");
        assert_eq!(value["stats"]["attempts"], 3);
    }
}
