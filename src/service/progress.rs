//! The reading-progress rule applied before a page is saved.

use reda_database::Progress;

/// What [`save_current_page`](super::RedaService::save_current_page) did.
///
/// Every variant except [`Saved`](Self::Saved) means nothing was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressOutcome {
    /// No such file.
    NotFound,
    /// The stored page is beyond the page count; the stored state is corrupt
    /// and is left alone.
    Inconsistent,
    /// The incoming page is behind the stored one.
    Regression,
    /// The document is already finished.
    Finished,
    /// The incoming page is beyond the page count. A document whose count is
    /// still unknown (0) accepts no page past 0.
    PastEnd,
    /// The page was written. `started` is set when this save also marked the
    /// document as started.
    Saved { started: bool },
}

impl ProgressOutcome {
    pub fn is_saved(self) -> bool {
        matches!(self, Self::Saved { .. })
    }
}

/// Decide whether `incoming` may be stored over `progress`.
///
/// Pages never move backwards or past the page count, and nothing is written
/// for corrupt or finished documents. A document counts as started once a
/// page past the first is saved.
pub(crate) fn plan(progress: Progress, incoming: u32) -> ProgressOutcome {
    if progress.current_page > progress.total_pages {
        return ProgressOutcome::Inconsistent;
    }
    if progress.current_page > incoming {
        return ProgressOutcome::Regression;
    }
    if progress.has_finished {
        return ProgressOutcome::Finished;
    }
    if incoming > progress.total_pages {
        return ProgressOutcome::PastEnd;
    }
    ProgressOutcome::Saved {
        started: !progress.has_started && incoming > 1,
    }
}
