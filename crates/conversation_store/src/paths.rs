use std::path::{Path, PathBuf};

pub const STORE_DIR: &str = ".coda";
pub const CONVERSATION_FILE: &str = "conversation.jsonl";

#[must_use]
pub fn store_root(workspace: &Path) -> PathBuf {
    workspace.join(STORE_DIR)
}

#[must_use]
pub fn conversation_file(workspace: &Path) -> PathBuf {
    store_root(workspace).join(CONVERSATION_FILE)
}
