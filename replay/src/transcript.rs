//! Scripted host-event transcripts.
//!
//! One entry per line, `<seconds> <command> [args]`, blank lines and `#`
//! comments ignored:
//!
//! ```text
//! 0     territory 1122
//! 2.0   message Battle commencing in 10 seconds! (Alice)
//! 12.0  combat start
//! 13.4  action 7531 "Alice Example" WHM
//! 14.0  action - Bob outside
//! 15.0  record fresh
//! 80.0  duty_complete
//! 81.0  stop_record
//! 82.0  combat end
//! ```

use std::path::{Path, PathBuf};

use cadence_core::game_data::job_id_from_log_name;
use cadence_core::{ActionUsage, HostEvent};
use cadence_types::RecordingMode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TranscriptError {
    #[error("failed to read transcript {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: {reason}")]
    Syntax { line: usize, reason: String },
}

/// What the host does at a point in the transcript
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Event(HostEvent),
    StartRecording(RecordingMode),
    StopRecording,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptEntry {
    /// Seconds since the start of the replay
    pub at_secs: f32,
    pub command: Command,
}

pub fn load(path: &Path) -> Result<Vec<TranscriptEntry>, TranscriptError> {
    let text = std::fs::read_to_string(path).map_err(|source| TranscriptError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&text)
}

/// Parse a transcript. Entries are returned in time order; lines sharing a
/// timestamp keep their file order.
pub fn parse(text: &str) -> Result<Vec<TranscriptEntry>, TranscriptError> {
    let mut entries = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let entry = parse_line(line).map_err(|reason| TranscriptError::Syntax {
            line: index + 1,
            reason,
        })?;
        entries.push(entry);
    }
    entries.sort_by(|a, b| a.at_secs.total_cmp(&b.at_secs));
    Ok(entries)
}

fn parse_line(line: &str) -> Result<TranscriptEntry, String> {
    let (time, rest) = split_token(line);
    let at_secs: f32 = time
        .parse()
        .map_err(|_| format!("invalid timestamp '{}'", time))?;
    if !at_secs.is_finite() || at_secs < 0.0 {
        return Err(format!("timestamp {} must be a non-negative number", at_secs));
    }

    let (keyword, args) = split_token(rest);
    let command = match keyword {
        "territory" => {
            let id = args
                .parse()
                .map_err(|_| format!("invalid territory id '{}'", args))?;
            Command::Event(HostEvent::TerritoryChanged(id))
        }
        "message" => {
            if args.is_empty() {
                return Err("message needs text".to_string());
            }
            Command::Event(HostEvent::SystemMessage(args.to_string()))
        }
        "combat" => match args {
            "start" => Command::Event(HostEvent::CombatStateChanged(true)),
            "end" => Command::Event(HostEvent::CombatStateChanged(false)),
            other => return Err(format!("expected 'combat start' or 'combat end', got '{}'", other)),
        },
        "action" => Command::Event(HostEvent::ActionUsed(parse_action(args)?)),
        "duty_complete" => Command::Event(HostEvent::DutyCompleted),
        "record" => Command::StartRecording(parse_mode(args)?),
        "stop_record" => Command::StopRecording,
        "" => return Err("missing command".to_string()),
        other => return Err(format!("unknown command '{}'", other)),
    };

    Ok(TranscriptEntry { at_secs, command })
}

/// `<id|-> <name|"quoted name"> [job] [outside]`
fn parse_action(args: &str) -> Result<ActionUsage, String> {
    let (id, rest) = split_token(args);
    let action_id = match id {
        "-" => None,
        _ => Some(
            id.parse::<u32>()
                .map_err(|_| format!("invalid action id '{}'", id))?,
        ),
    };

    let (name, rest) = if let Some(quoted) = rest.strip_prefix('"') {
        let end = quoted
            .find('"')
            .ok_or_else(|| "unterminated quoted name".to_string())?;
        (&quoted[..end], quoted[end + 1..].trim_start())
    } else {
        split_token(rest)
    };
    if name.is_empty() {
        return Err("action needs a source name".to_string());
    }

    let mut usage = ActionUsage {
        action_id,
        source_name: name.to_string(),
        source_job_id: None,
        target_name: None,
        source_is_party_member: true,
    };
    for token in rest.split_whitespace() {
        if token == "outside" {
            usage.source_is_party_member = false;
            continue;
        }
        let job = token
            .parse::<u8>()
            .ok()
            .or_else(|| job_id_from_log_name(token))
            .ok_or_else(|| format!("unknown job '{}'", token))?;
        usage.source_job_id = Some(job);
    }
    Ok(usage)
}

fn parse_mode(args: &str) -> Result<RecordingMode, String> {
    match args {
        "" | "manual" => Ok(RecordingMode::Manual),
        "automatic" => Ok(RecordingMode::Automatic),
        "fresh" => Ok(RecordingMode::Fresh),
        "side_by_side" => Ok(RecordingMode::SideBySide),
        other => Err(format!("unknown recording mode '{}'", other)),
    }
}

fn split_token(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(char::is_whitespace) {
        Some(i) => (&s[..i], s[i..].trim()),
        None => (s, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_transcript() {
        let entries = parse(
            r#"
# P1 pull
0     territory 1122
2.0   message Battle commencing in 10 seconds! (Alice)
12    combat start
13.4  action 7531 "Alice Example" WHM
14.0  action - Bob outside
15    record fresh
81    stop_record
"#,
        )
        .unwrap();

        assert_eq!(entries.len(), 7);
        assert_eq!(entries[0].command, Command::Event(HostEvent::TerritoryChanged(1122)));
        assert_eq!(
            entries[1].command,
            Command::Event(HostEvent::SystemMessage(
                "Battle commencing in 10 seconds! (Alice)".to_string()
            ))
        );
        assert_eq!(entries[2].command, Command::Event(HostEvent::CombatStateChanged(true)));
        assert_eq!(
            entries[3].command,
            Command::Event(HostEvent::ActionUsed(
                ActionUsage::new(7531, "Alice Example").with_job(24)
            ))
        );
        match &entries[4].command {
            Command::Event(HostEvent::ActionUsed(usage)) => {
                assert_eq!(usage.action_id, None);
                assert_eq!(usage.source_name, "Bob");
                assert!(!usage.source_is_party_member);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(entries[5].command, Command::StartRecording(RecordingMode::Fresh));
        assert_eq!(entries[6].command, Command::StopRecording);
    }

    #[test]
    fn test_entries_sorted_stably() {
        let entries = parse("5 combat start\n1 territory 1\n5 combat end\n").unwrap();
        let times: Vec<f32> = entries.iter().map(|e| e.at_secs).collect();
        assert_eq!(times, vec![1.0, 5.0, 5.0]);
        assert_eq!(entries[1].command, Command::Event(HostEvent::CombatStateChanged(true)));
    }

    #[test]
    fn test_errors_name_the_line() {
        let err = parse("0 territory 1\n\n3 teleport 5\n").unwrap_err();
        match err {
            TranscriptError::Syntax { line, reason } => {
                assert_eq!(line, 3);
                assert!(reason.contains("teleport"));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(parse("-1 combat start").is_err());
        assert!(parse("1 action 12 \"Unterminated").is_err());
        assert!(parse("1 action 12 Alice Juggler").is_err());
        assert!(parse("1 combat maybe").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("missing.txt")).unwrap_err();
        assert!(matches!(err, TranscriptError::Io { .. }));
    }
}
