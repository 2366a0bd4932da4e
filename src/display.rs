use crate::config::{Candidate, Config};
use crate::feedback::{AudioFeedback, Cue};
use crate::state::TallyRecord;
use crate::store::RecordStore;
use crate::tally::tally_marks;

use anyhow::Result;
use std::time::Duration;
use tokio::time::{Instant, interval, sleep};

/// Seam for the visual celebration renderer. `start` fires on the finalize
/// edge; `stop` is called once when the auto-stop timer elapses.
pub trait CelebrationEffect: Send {
    fn start(&mut self);
    fn stop(&mut self);
}

/// Prints a one-off banner; the board itself keeps rendering underneath.
pub struct TerminalCelebration;

impl CelebrationEffect for TerminalCelebration {
    fn start(&mut self) {
        println!();
        println!("  *** SELAMAT — the results are in! ***");
        println!();
    }

    fn stop(&mut self) {
        tracing::debug!("Celebration finished");
    }
}

/// The public-side viewer. Polls the shared record, renders the board, and
/// fires the one-shot celebration when the record flips to finalized.
pub struct Display {
    candidates: Vec<Candidate>,
    store: Box<dyn RecordStore>,
    feedback: AudioFeedback,
    effect: Box<dyn CelebrationEffect>,
    record: TallyRecord,
    celebrating: bool,
}

impl Display {
    pub fn new(
        config: &Config,
        store: Box<dyn RecordStore>,
        effect: Box<dyn CelebrationEffect>,
    ) -> Self {
        Self {
            candidates: config.candidates.clone(),
            store,
            feedback: AudioFeedback::from_config(config),
            effect,
            record: TallyRecord::new(config.candidates.len()),
            celebrating: false,
        }
    }

    pub fn record(&self) -> &TallyRecord {
        &self.record
    }

    /// One poll cycle. Returns true on the finalize edge, which is the
    /// caller's signal to arm the celebration auto-stop timer.
    ///
    /// A missing record means the counter has not started yet; a read or
    /// parse failure means no update this cycle. Both keep the
    /// last-known-good record on screen.
    pub async fn poll(&mut self) -> bool {
        let record = match self.store.load().await {
            Ok(Some(record)) => record,
            Ok(None) => return false,
            Err(e) => {
                tracing::warn!("Skipping poll cycle: {}", e);
                return false;
            }
        };

        let edge = !self.record.is_finalized && record.is_finalized;
        let changed = record != self.record;
        self.record = record;

        if edge {
            self.effect.start();
            self.celebrating = true;
            self.feedback.play(Cue::Applause);
            tracing::info!("Results finalized, celebration started");
        }

        if changed {
            self.render();
        }

        edge
    }

    pub fn stop_celebration(&mut self) {
        if self.celebrating {
            self.effect.stop();
            self.celebrating = false;
        }
    }

    pub fn render(&self) {
        print!("{}", render_board(&self.record, &self.candidates));
    }
}

/// Render the public board. Counts are shown in the tally-mark font while
/// counting is live, and as plain numbers once the results are final.
pub fn render_board(record: &TallyRecord, candidates: &[Candidate]) -> String {
    let mut out = String::new();

    out.push_str("=== Public Vote Display ===\n");
    out.push_str(&format!("Total votes: {}\n", record.total_votes()));

    for (index, candidate) in candidates.iter().enumerate() {
        let count = record.votes.get(index).copied().unwrap_or(0);
        out.push_str(&format!(
            "  {:<24} {}\n",
            candidate.name,
            format_count(record, count)
        ));
    }
    out.push_str(&format!(
        "  {:<24} {}\n",
        "Tidak Sah",
        format_count(record, record.invalid_votes)
    ));

    if record.is_finalized {
        out.push_str("Results have been finalized.\n");
    }

    out
}

fn format_count(record: &TallyRecord, count: u64) -> String {
    if record.is_finalized {
        count.to_string()
    } else {
        tally_marks(count)
    }
}

/// Run the display process until Ctrl+C.
pub async fn run(config: Config, store: Box<dyn RecordStore>) -> Result<()> {
    let poll_interval = Duration::from_millis(config.poll_interval_ms);
    let celebration = Duration::from_secs(config.celebration_secs);
    let display = Display::new(&config, store, Box::new(TerminalCelebration));

    run_with(display, poll_interval, celebration).await
}

/// Poll loop. The first interval tick fires immediately, so the board reads
/// the record once at startup before settling into the cadence.
///
/// The celebration auto-stop is a single resettable deadline: arming it
/// again just moves the deadline, so repeated polls can never accumulate
/// timers.
async fn run_with(
    mut display: Display,
    poll_interval: Duration,
    celebration: Duration,
) -> Result<()> {
    let mut ticker = interval(poll_interval);
    let stop_at = sleep(Duration::ZERO);
    tokio::pin!(stop_at);
    let mut armed = false;

    display.render();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if display.poll().await {
                    stop_at.as_mut().reset(Instant::now() + celebration);
                    armed = true;
                }
            }
            _ = &mut stop_at, if armed => {
                display.stop_celebration();
                armed = false;
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received Ctrl+C, shutting down");
                break;
            }
        }
    }

    Ok(())
}
