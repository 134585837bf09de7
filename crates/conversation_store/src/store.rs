use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chat_provider::Turn;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ConversationStoreError;
use crate::paths::{conversation_file, store_root};
use crate::schema::{ConversationHeader, JsonLine, TurnRecord};

/// Per-workspace append-only conversation log.
///
/// All mutations are sequenced through the owning coordinator; there is no
/// concurrent writer in the intended single-operator usage, so ordering is
/// preserved by construction rather than by locking.
pub struct ConversationStore {
    path: PathBuf,
    file: File,
    header: ConversationHeader,
    turns: Vec<Turn>,
}

impl ConversationStore {
    /// Opens the workspace conversation, creating an empty one when no
    /// prior state exists. The empty conversation is the initial
    /// condition, not an error.
    pub fn open(workspace: &Path) -> Result<Self, ConversationStoreError> {
        if !workspace.is_absolute() {
            return Err(ConversationStoreError::NonAbsoluteWorkspace {
                path: workspace.to_path_buf(),
            });
        }

        let path = conversation_file(workspace);
        if path.exists() {
            Self::open_existing(path)
        } else {
            Self::create_new(workspace, path)
        }
    }

    fn create_new(workspace: &Path, path: PathBuf) -> Result<Self, ConversationStoreError> {
        let root = store_root(workspace);
        std::fs::create_dir_all(&root)
            .map_err(|source| ConversationStoreError::io("creating store root", &root, source))?;

        let header = ConversationHeader::v1(
            Uuid::new_v4().to_string(),
            now_rfc3339()?,
            workspace.display().to_string(),
        );

        let mut file = File::create(&path)
            .map_err(|source| ConversationStoreError::io("creating conversation file", &path, source))?;
        write_line(&mut file, &path, &JsonLine::Conversation(header.clone()))?;

        Ok(Self {
            path,
            file,
            header,
            turns: Vec::new(),
        })
    }

    fn open_existing(path: PathBuf) -> Result<Self, ConversationStoreError> {
        let read_file = File::open(&path)
            .map_err(|source| ConversationStoreError::io("opening conversation file", &path, source))?;
        let reader = BufReader::new(read_file);

        let mut header: Option<ConversationHeader> = None;
        let mut turns = Vec::new();

        for (line_index, line_result) in reader.lines().enumerate() {
            let line_number = line_index + 1;
            let line = line_result
                .map_err(|source| ConversationStoreError::io_line(&path, line_number, source))?;
            let parsed = parse_json_line(&path, line_number, &line)?;

            if line_number == 1 {
                match parsed {
                    JsonLine::Conversation(parsed_header) => {
                        validate_header_line(&path, line_number, &parsed_header)?;
                        header = Some(parsed_header);
                    }
                    JsonLine::Turn(_) => {
                        return Err(ConversationStoreError::InvalidHeaderRecord {
                            path,
                            line: line_number,
                        });
                    }
                }

                continue;
            }

            match parsed {
                JsonLine::Conversation(_) => {
                    return Err(ConversationStoreError::InvalidTurnRecord {
                        path,
                        line: line_number,
                    });
                }
                JsonLine::Turn(record) => {
                    validate_turn_line(&path, line_number, &record)?;
                    turns.push(record.into_turn());
                }
            }
        }

        let header =
            header.ok_or_else(|| ConversationStoreError::MissingHeader { path: path.clone() })?;

        let file = OpenOptions::new().append(true).open(&path).map_err(|source| {
            ConversationStoreError::io("opening conversation file for append", &path, source)
        })?;

        Ok(Self {
            path,
            file,
            header,
            turns,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn header(&self) -> &ConversationHeader {
        &self.header
    }

    /// Returns the loaded conversation snapshot in chronological order.
    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Appends turns in order, stamping each with the current UTC time,
    /// and returns the full conversation.
    pub fn append(&mut self, turns: Vec<Turn>) -> Result<&[Turn], ConversationStoreError> {
        for (offset, turn) in turns.iter().enumerate() {
            if turn.parts.is_empty() {
                return Err(ConversationStoreError::EmptyTurnParts {
                    path: self.path.clone(),
                    line: self.next_line_number() + offset,
                });
            }
        }

        let ts = now_rfc3339()?;
        for turn in &turns {
            let record = TurnRecord::new(ts.clone(), turn.clone());
            write_line(&mut self.file, &self.path, &JsonLine::Turn(record))?;
        }

        self.turns.extend(turns);
        Ok(&self.turns)
    }

    /// Replaces the stored conversation with a fresh empty one.
    ///
    /// Operator confirmation happens before this call; the store itself
    /// clears unconditionally.
    pub fn clear(&mut self) -> Result<(), ConversationStoreError> {
        let header = ConversationHeader::v1(
            Uuid::new_v4().to_string(),
            now_rfc3339()?,
            self.header.workspace.clone(),
        );

        let mut file = File::create(&self.path).map_err(|source| {
            ConversationStoreError::io("truncating conversation file", &self.path, source)
        })?;
        write_line(&mut file, &self.path, &JsonLine::Conversation(header.clone()))?;

        self.file = file;
        self.header = header;
        self.turns.clear();
        Ok(())
    }

    fn next_line_number(&self) -> usize {
        // header occupies line 1
        self.turns.len() + 2
    }
}

fn write_line(
    file: &mut File,
    path: &Path,
    line: &JsonLine,
) -> Result<(), ConversationStoreError> {
    let serialized = serde_json::to_string(line)
        .map_err(|source| ConversationStoreError::json_serialize(path, source))?;
    writeln!(file, "{serialized}")
        .map_err(|source| ConversationStoreError::io("appending conversation line", path, source))
}

fn parse_json_line(
    path: &Path,
    line_number: usize,
    line: &str,
) -> Result<JsonLine, ConversationStoreError> {
    serde_json::from_str::<JsonLine>(line)
        .map_err(|source| ConversationStoreError::json_line(path, line_number, source))
}

fn validate_header_line(
    path: &Path,
    line_number: usize,
    header: &ConversationHeader,
) -> Result<(), ConversationStoreError> {
    if header.version != 1 {
        return Err(ConversationStoreError::UnsupportedVersion {
            path: path.to_path_buf(),
            line: line_number,
            found: header.version,
        });
    }

    validate_rfc3339(path, line_number, "created_at", &header.created_at)
}

fn validate_turn_line(
    path: &Path,
    line_number: usize,
    record: &TurnRecord,
) -> Result<(), ConversationStoreError> {
    validate_rfc3339(path, line_number, "ts", &record.ts)?;

    if record.parts.is_empty() {
        return Err(ConversationStoreError::EmptyTurnParts {
            path: path.to_path_buf(),
            line: line_number,
        });
    }

    Ok(())
}

fn validate_rfc3339(
    path: &Path,
    line_number: usize,
    field: &'static str,
    value: &str,
) -> Result<(), ConversationStoreError> {
    if OffsetDateTime::parse(value, &Rfc3339).is_err() {
        return Err(ConversationStoreError::InvalidTimestamp {
            path: path.to_path_buf(),
            line: line_number,
            field,
            value: value.to_string(),
        });
    }

    Ok(())
}

fn now_rfc3339() -> Result<String, ConversationStoreError> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(ConversationStoreError::ClockFormat)
}
