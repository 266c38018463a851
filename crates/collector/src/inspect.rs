//! Line-oriented browser over a cached collection.

use std::io::{BufRead, Write};

use anyhow::Result;
use collection::{EnumKind, IssueCollection};
use serde_json::json;

const HELP: &str = "commands:
  stats          counts of issues, users and enumeration tables
  issue <id>     show one issue
  user <id>      show one user
  enum <kind>    show an enumeration table (component, keyword, priority,
                 resolution, severity, stage, status, type, version)
  summary        show the chart aggregates
  help           this text
  quit           leave (also exit, or end of input)";

/// Reads commands from `input` until `quit`/`exit` or end of input, writing
/// responses to `output`. Bad commands print a message and keep the loop
/// going.
pub fn run_inspect<R: BufRead, W: Write>(
    collection: &IssueCollection,
    input: R,
    mut output: W,
) -> Result<()> {
    writeln!(
        output,
        "loaded {} issues and {} users; type `help` for commands",
        collection.issues.len(),
        collection.users.len()
    )?;
    prompt(&mut output)?;

    for line in input.lines() {
        let line = line?;
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            prompt(&mut output)?;
            continue;
        };
        let arg = words.next();

        match (command, arg) {
            ("quit" | "exit", _) => return Ok(()),
            ("help", _) => writeln!(output, "{HELP}")?,
            ("stats", _) => stats(collection, &mut output)?,
            ("summary", _) => {
                let summary = analysis::summarize(collection);
                writeln!(output, "{}", serde_json::to_string_pretty(&summary)?)?;
            }
            ("issue", Some(id)) => {
                let issue = id
                    .parse::<i64>()
                    .ok()
                    .and_then(|id| collection.issues.get(&id));
                match issue {
                    Some(issue) => writeln!(output, "{}", serde_json::to_string_pretty(issue)?)?,
                    None => writeln!(output, "no issue {id}")?,
                }
            }
            ("user", Some(id)) => match collection.users.get(id) {
                Some(user) => writeln!(output, "{}", serde_json::to_string_pretty(user)?)?,
                None => writeln!(output, "no user {id}")?,
            },
            ("enum", Some(kind)) => match kind.parse::<EnumKind>() {
                Ok(kind) => {
                    let table = collection.enum_table(kind).cloned().unwrap_or_default();
                    writeln!(output, "{}", serde_json::to_string_pretty(&table)?)?;
                }
                Err(err) => writeln!(output, "{err}")?,
            },
            ("issue" | "user" | "enum", None) => {
                writeln!(output, "`{command}` needs an argument")?
            }
            _ => writeln!(output, "unknown command `{command}`; try `help`")?,
        }
        prompt(&mut output)?;
    }
    Ok(())
}

fn stats<W: Write>(collection: &IssueCollection, output: &mut W) -> Result<()> {
    let enums: serde_json::Map<String, serde_json::Value> = EnumKind::ALL
        .into_iter()
        .map(|kind| {
            let size = collection.enum_table(kind).map_or(0, |t| t.len());
            (kind.as_str().to_string(), json!(size))
        })
        .collect();
    let report = json!({
        "issues": collection.issues.len(),
        "users": collection.users.len(),
        "enums": enums,
    });
    writeln!(output, "{}", serde_json::to_string_pretty(&report)?)?;
    Ok(())
}

fn prompt<W: Write>(output: &mut W) -> Result<()> {
    write!(output, "> ")?;
    output.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use collection::{FieldValue, IssueRecord};

    fn sample() -> IssueCollection {
        let mut collection = IssueCollection::new();
        let mut record = IssueRecord::new();
        record.insert("title", FieldValue::from("segfault in re"));
        record.insert("message_count", FieldValue::Number(1.0));
        collection.insert_issue(42, record);
        collection.seed_user("alice");
        collection.set_enum(
            EnumKind::Status,
            [("1".to_string(), "open".to_string())].into_iter().collect(),
        );
        collection
    }

    fn run(script: &str) -> String {
        let mut out = Vec::new();
        run_inspect(&sample(), script.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn shows_issue_user_and_enum() {
        let out = run("issue 42\nuser alice\nenum status\nquit\n");
        assert!(out.starts_with("loaded 1 issues and 1 users"));
        assert!(out.contains("\"title\": \"segfault in re\""));
        assert!(out.contains("{}"));
        assert!(out.contains("\"1\": \"open\""));
    }

    #[test]
    fn unknown_input_keeps_the_loop_alive() {
        let out = run("issue 7\nissue\nfrobnicate\nenum users\nstats\n");
        assert!(out.contains("no issue 7"));
        assert!(out.contains("`issue` needs an argument"));
        assert!(out.contains("unknown command `frobnicate`"));
        assert!(out.contains("unknown enumeration kind"));
        assert!(out.contains("\"issues\": 1"));
    }

    #[test]
    fn quit_stops_reading() {
        let out = run("quit\nstats\n");
        assert!(!out.contains("\"issues\""));
    }

    #[test]
    fn summary_reports_aggregates() {
        let out = run("summary\n");
        assert!(out.contains("\"issues_by_status\""));
        assert!(out.contains("\"oldest_unreviewed\": []"));
    }
}
