// View model assembly and memoization

use crate::metrics::aggregate;
use crate::model::{Language, ViewModel};
use crate::path::build_segments;
use crate::project::project_points;
use crate::viewport::frame_points;
use routelens_telemetry::{MetricSample, TraceInput};
use std::sync::Arc;
use tracing::debug;

/// Derives the full view model. Never fails: an absent or undecodable trace
/// yields no points, no segments and the default frame.
pub fn assemble(trace: &TraceInput, history: &[MetricSample], language: Language) -> ViewModel {
    let points = trace
        .resolve()
        .map(|snapshot| project_points(&snapshot.hops, language))
        .unwrap_or_default();
    let segments = build_segments(&points);
    let frame = frame_points(&points);

    ViewModel {
        points,
        segments,
        frame,
        stats: aggregate(history),
    }
}

struct Memo {
    trace: Arc<TraceInput>,
    history: Arc<[MetricSample]>,
    language: Language,
    value: Arc<ViewModel>,
}

impl Memo {
    fn matches(
        &self,
        trace: &Arc<TraceInput>,
        history: &Arc<[MetricSample]>,
        language: Language,
    ) -> bool {
        self.language == language
            && (Arc::ptr_eq(&self.trace, trace) || self.trace == *trace)
            && (Arc::ptr_eq(&self.history, history) || self.history == *history)
    }
}

/// Hands back the same `Arc<ViewModel>` for as long as the inputs stay the
/// same, so the renderer can skip redraws by pointer comparison.
#[derive(Default)]
pub struct ViewModelCache {
    memo: Option<Memo>,
    recomputations: u64,
}

impl ViewModelCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(
        &mut self,
        trace: &Arc<TraceInput>,
        history: &Arc<[MetricSample]>,
        language: Language,
    ) -> Arc<ViewModel> {
        if let Some(memo) = &self.memo
            && memo.matches(trace, history, language)
        {
            return memo.value.clone();
        }

        self.recomputations += 1;
        debug!("Recomputing view model (#{})", self.recomputations);
        let value = Arc::new(assemble(trace, history, language));
        self.memo = Some(Memo {
            trace: trace.clone(),
            history: history.clone(),
            language,
            value: value.clone(),
        });
        value
    }

    /// How many times the view model has actually been derived.
    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }
}
