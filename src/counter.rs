use crate::config::Config;
use crate::feedback::{AudioFeedback, Cue};
use crate::keys;
use crate::messages::Command;
use crate::state::{TallyRecord, UndoStack};
use crate::store::RecordStore;

use anyhow::Result;
use tokio::sync::mpsc;

/// The operator-side editor. Owns the live record and its undo history, and
/// is the sole writer of the shared store: every state transition is
/// persisted in full before the next command is taken.
pub struct Counter {
    record: TallyRecord,
    undo: UndoStack,
    store: Box<dyn RecordStore>,
    feedback: AudioFeedback,
    candidate_count: usize,
}

impl Counter {
    pub fn new(config: &Config, store: Box<dyn RecordStore>) -> Self {
        let candidate_count = config.candidates.len();

        Self {
            record: TallyRecord::new(candidate_count),
            undo: UndoStack::new(config.undo_limit),
            store,
            feedback: AudioFeedback::from_config(config),
            candidate_count,
        }
    }

    pub fn record(&self) -> &TallyRecord {
        &self.record
    }

    /// Write the current record to the shared store, overwriting whatever
    /// was there. This is the only channel to the display.
    pub async fn publish(&self) -> Result<()> {
        self.store.save(&self.record).await
    }

    pub async fn handle_command(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Vote(index) => self.record_vote(index).await,
            Command::Invalid => self.record_invalid_vote().await,
            Command::Undo => self.undo_last().await,
            Command::Finalize => self.finalize_results().await,
        }
    }

    async fn record_vote(&mut self, index: usize) -> Result<()> {
        if self.record.is_finalized {
            tracing::debug!("Ignoring vote: results are finalized");
            return Ok(());
        }
        if index >= self.candidate_count {
            tracing::debug!("Ignoring vote for unknown paslon {}", index + 1);
            return Ok(());
        }

        self.undo.push(self.record.clone());
        self.record.votes[index] += 1;
        self.publish().await?;
        self.feedback.play(Cue::Vote);

        tracing::info!(
            "Vote for paslon {}: {} ({} total)",
            index + 1,
            self.record.votes[index],
            self.record.total_votes()
        );
        Ok(())
    }

    async fn record_invalid_vote(&mut self) -> Result<()> {
        if self.record.is_finalized {
            tracing::debug!("Ignoring invalid ballot: results are finalized");
            return Ok(());
        }

        self.undo.push(self.record.clone());
        self.record.invalid_votes += 1;
        self.publish().await?;

        tracing::info!(
            "Invalid ballot: {} ({} total)",
            self.record.invalid_votes,
            self.record.total_votes()
        );
        Ok(())
    }

    async fn undo_last(&mut self) -> Result<()> {
        if self.record.is_finalized {
            tracing::debug!("Ignoring undo: results are finalized");
            return Ok(());
        }

        let Some(snapshot) = self.undo.pop() else {
            tracing::debug!("Nothing to undo");
            return Ok(());
        };

        self.record = snapshot;
        self.publish().await?;
        self.feedback.play(Cue::Undo);

        tracing::info!("Undid last entry ({} steps remain)", self.undo.len());
        Ok(())
    }

    async fn finalize_results(&mut self) -> Result<()> {
        if self.record.is_finalized {
            tracing::debug!("Results already finalized");
            return Ok(());
        }

        self.record.is_finalized = true;
        self.publish().await?;
        self.feedback.play(Cue::Finalize);

        tracing::info!(
            "Results finalized: {:?} + {} invalid",
            self.record.votes,
            self.record.invalid_votes
        );
        Ok(())
    }
}

/// Run the counter process: claim the session by publishing a zeroed record,
/// then serve keyboard commands until Ctrl+C.
pub async fn run(config: Config, store: Box<dyn RecordStore>) -> Result<()> {
    let candidate_count = config.candidates.len();
    let mut counter = Counter::new(&config, store);
    counter.publish().await?;

    let (command_tx, mut command_rx) = mpsc::channel(16);
    tokio::spawn(keys::monitor_keyboards(candidate_count, command_tx));

    tracing::info!(
        "Ready! Press 1..{} to vote, 0 for an invalid ballot, Z to undo, F to finalize",
        candidate_count
    );

    loop {
        tokio::select! {
            Some(command) = command_rx.recv() => {
                if let Err(e) = counter.handle_command(command).await {
                    tracing::error!("Error handling {:?}: {}", command, e);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received Ctrl+C, shutting down");
                break;
            }
        }
    }

    Ok(())
}
