//! Prompt history kept in a small JSON file
//!
//! The file holds `[{"prompt": "..."}, ...]`, oldest first, capped
//! at the last [`MAX_ENTRIES`] distinct prompts.

use std::fs;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use log::{debug, warn};

pub const MAX_ENTRIES: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry
{   pub prompt: String
}

#[derive(Debug, Clone)]
pub struct PromptHistory
{   path: PathBuf
}

impl PromptHistory
{   pub fn new(path: impl Into<PathBuf>) -> Self
    {   PromptHistory { path: path.into() }
    }

    pub fn path(&self) -> &Path
    {   &self.path
    }

    /// Stored prompts, oldest first. A missing file is an empty
    /// history.
    pub fn load(&self) -> Result<Vec<String>, crate::error::Error>
    {   Ok(self.read_entries()?
          .into_iter()
          .map(|e| e.prompt)
          .collect())
    }

    /// Most recent first, for pickers
    pub fn recent(&self) -> Result<Vec<String>, crate::error::Error>
    {   let mut prompts = self.load()?;
        prompts.reverse();
        Ok(prompts)
    }

    /// Record a prompt unless it is already stored, then keep only
    /// the newest entries.
    pub fn save(&self, prompt: &str) -> Result<(), crate::error::Error>
    {   let mut entries = self.read_entries()?;
        if entries.iter().any(|e| e.prompt == prompt)
        {   debug!("Prompt already in history");
        } else
        {   entries.push(HistoryEntry { prompt: prompt.to_string() });
        }
        if entries.len() > MAX_ENTRIES
        {   let excess = entries.len() - MAX_ENTRIES;
            entries = entries.split_off(excess);
        }

        let json = serde_json::to_string_pretty(&entries)
          .map_err(|e| crate::error::Error::History(e.to_string()))?;
        fs::write(&self.path, json).map_err(|e| {
          crate::error::Error::History(
            format!("{}: {}", self.path.display(), e)
          )
        })?;
        debug!("Saved {} history entries", entries.len());
        Ok(())
    }

    fn read_entries(&self)
      -> Result<Vec<HistoryEntry>, crate::error::Error>
    {   if !self.path.exists()
        {   return Ok(vec![]);
        }
        let raw = fs::read_to_string(&self.path).map_err(|e| {
          crate::error::Error::History(
            format!("{}: {}", self.path.display(), e)
          )
        })?;
        if raw.trim().is_empty()
        {   warn!("History file {} is empty", self.path.display());
            return Ok(vec![]);
        }
        serde_json::from_str(&raw).map_err(|e| {
          crate::error::Error::History(
            format!("{}: {}", self.path.display(), e)
          )
        })
    }
}
