//! Step-numbered model checkpoints with bounded retention.
//!
//! Each save writes `ckpt-{step}.bin` through Burn's `BinFileRecorder` and
//! records it in a `checkpoint.json` state file listing the retained
//! checkpoints, oldest first.

use burn::module::Module;
use burn::record::{BinFileRecorder, FullPrecisionSettings};
use burn::tensor::backend::Backend;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, UtilsError};

const STATE_FILE: &str = "checkpoint.json";
const CHECKPOINT_PREFIX: &str = "ckpt-";
const CHECKPOINT_EXTENSION: &str = "bin";

/// Configuration for the checkpointer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointerConfig {
    /// Directory to store checkpoints.
    pub checkpoint_dir: PathBuf,
    /// Number of recent checkpoints to keep (0 = keep all).
    pub max_to_keep: usize,
}

impl Default for CheckpointerConfig {
    fn default() -> Self {
        Self {
            checkpoint_dir: PathBuf::from("./checkpoints"),
            max_to_keep: 20,
        }
    }
}

impl CheckpointerConfig {
    /// Create a new config with specified checkpoint directory.
    pub fn new(checkpoint_dir: impl Into<PathBuf>) -> Self {
        Self {
            checkpoint_dir: checkpoint_dir.into(),
            ..Default::default()
        }
    }

    /// Set the number of checkpoints to keep.
    pub fn with_max_to_keep(mut self, n: usize) -> Self {
        self.max_to_keep = n;
        self
    }
}

/// Checkpoint metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointInfo {
    /// Path to the checkpoint file.
    pub path: PathBuf,
    /// Global step at which the checkpoint was saved.
    pub step: u64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CheckpointState {
    /// File names relative to the checkpoint directory, oldest first.
    checkpoints: Vec<StateEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StateEntry {
    file: String,
    step: u64,
}

/// Saves and restores a model, keeping at most `max_to_keep` checkpoints.
pub struct Checkpointer {
    config: CheckpointerConfig,
    history: Vec<StateEntry>,
}

impl Checkpointer {
    /// Create a new checkpointer.
    ///
    /// Creates the checkpoint directory if it doesn't exist and picks up any
    /// checkpoints recorded by a previous run.
    pub fn new(config: CheckpointerConfig) -> Result<Self> {
        fs::create_dir_all(&config.checkpoint_dir)?;

        let state = read_state(&config.checkpoint_dir.join(STATE_FILE))?;
        let checkpointer = Self {
            config,
            history: state.checkpoints,
        };

        match checkpointer.latest_checkpoint() {
            Some(latest) => log::info!(
                "Checkpoint available in {:?} at step {}",
                checkpointer.config.checkpoint_dir,
                latest.step
            ),
            None => log::info!(
                "No checkpoint available in {:?}",
                checkpointer.config.checkpoint_dir
            ),
        }
        Ok(checkpointer)
    }

    /// Get the configuration.
    pub fn config(&self) -> &CheckpointerConfig {
        &self.config
    }

    /// Save a model checkpoint at `global_step`.
    ///
    /// Saving the same step twice overwrites the earlier file.
    pub fn save<B: Backend, M: Module<B>>(&mut self, model: &M, global_step: u64) -> Result<PathBuf> {
        let file = format!("{}{}.{}", CHECKPOINT_PREFIX, global_step, CHECKPOINT_EXTENSION);
        let path = self.config.checkpoint_dir.join(&file);

        let recorder = BinFileRecorder::<FullPrecisionSettings>::new();
        model
            .clone()
            .save_file(&path, &recorder)
            .map_err(|e| UtilsError::Recorder(e.to_string()))?;

        let mut history = self.history.clone();
        history.retain(|entry| entry.step != global_step);
        history.push(StateEntry {
            file,
            step: global_step,
        });
        let expired = self.split_expired(&mut history);

        // The state file must never name a deleted checkpoint.
        self.write_state(&history)?;
        self.history = history;
        self.delete_checkpoints(&expired);

        log::info!("Saved checkpoint for step {} to {:?}", global_step, path);
        Ok(path)
    }

    /// Load a model from a checkpoint file into `model_template`.
    pub fn load<B: Backend, M: Module<B>>(
        &self,
        model_template: M,
        path: &Path,
        device: &B::Device,
    ) -> Result<M> {
        let recorder = BinFileRecorder::<FullPrecisionSettings>::new();
        model_template
            .load_file(path, &recorder, device)
            .map_err(|e| UtilsError::Recorder(e.to_string()))
    }

    /// Load the latest checkpoint, returning the model and its step.
    pub fn load_latest<B: Backend, M: Module<B>>(
        &self,
        model_template: M,
        device: &B::Device,
    ) -> Result<(M, u64)> {
        let latest = self
            .latest_checkpoint()
            .ok_or_else(|| UtilsError::NoCheckpoints(self.config.checkpoint_dir.clone()))?;
        let model = self.load(model_template, &latest.path, device)?;
        Ok((model, latest.step))
    }

    /// Restore the latest checkpoint if there is one, otherwise keep the
    /// freshly initialized template.
    ///
    /// Returns the model and the restored step, `None` when nothing was
    /// restored.
    pub fn initialize_or_restore<B: Backend, M: Module<B>>(
        &self,
        model_template: M,
        device: &B::Device,
    ) -> Result<(M, Option<u64>)> {
        if self.latest_checkpoint().is_none() {
            log::info!("Initializing model from scratch");
            return Ok((model_template, None));
        }
        let (model, step) = self.load_latest(model_template, device)?;
        log::info!("Restored model from step {}", step);
        Ok((model, Some(step)))
    }

    /// Most recent retained checkpoint.
    pub fn latest_checkpoint(&self) -> Option<CheckpointInfo> {
        self.history.last().map(|entry| self.info(entry))
    }

    /// All retained checkpoints, oldest first.
    pub fn list_checkpoints(&self) -> Vec<CheckpointInfo> {
        self.history.iter().map(|entry| self.info(entry)).collect()
    }

    fn info(&self, entry: &StateEntry) -> CheckpointInfo {
        CheckpointInfo {
            path: self.config.checkpoint_dir.join(&entry.file),
            step: entry.step,
        }
    }

    /// Remove the oldest entries beyond `max_to_keep` from `history`.
    fn split_expired(&self, history: &mut Vec<StateEntry>) -> Vec<StateEntry> {
        if self.config.max_to_keep == 0 || history.len() <= self.config.max_to_keep {
            return Vec::new(); // 0 keeps all
        }
        let excess = history.len() - self.config.max_to_keep;
        history.drain(..excess).collect()
    }

    fn delete_checkpoints(&self, expired: &[StateEntry]) {
        for old in expired {
            let path = self.config.checkpoint_dir.join(&old.file);
            if let Err(e) = fs::remove_file(&path) {
                log::warn!("Failed to delete expired checkpoint {:?}: {}", path, e);
            }
        }
    }

    fn write_state(&self, history: &[StateEntry]) -> Result<()> {
        let path = self.config.checkpoint_dir.join(STATE_FILE);
        let state = CheckpointState {
            checkpoints: history.to_vec(),
        };
        let json = serde_json::to_string_pretty(&state).map_err(|e| UtilsError::State {
            path: path.clone(),
            message: e.to_string(),
        })?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

fn read_state(path: &Path) -> Result<CheckpointState> {
    if !path.exists() {
        return Ok(CheckpointState::default());
    }
    let contents = fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| UtilsError::State {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
