/// Commands accepted by the tally counter.
///
/// Produced by the keyboard monitor, consumed one at a time by the counter
/// loop. `Vote` carries the zero-based candidate index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Vote(usize),
    Invalid,
    Undo,
    Finalize,
}
