// Target selection and stale-response guarding for the dashboard

use crate::model::{Language, ViewModel};
use crate::view::ViewModelCache;
use routelens_telemetry::{MetricSample, TraceInput};
use std::sync::Arc;
use tracing::{debug, info};

/// Token issued on every target switch. Strictly increasing per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    pub fn value(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RetrievalPayload {
    Trace(TraceInput),
    History(Vec<MetricSample>),
}

/// A completed fetch, tagged with the generation it was started under.
#[derive(Debug, Clone, PartialEq)]
pub struct Retrieval {
    pub generation: Generation,
    pub target: String,
    pub payload: RetrievalPayload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Applied,
    /// The result belongs to an earlier selection and was dropped.
    Stale,
}

/// Dashboard state for one operator view. Retrieval happens elsewhere; this
/// only decides which results are still wanted and re-derives the view.
pub struct DashboardSession {
    target: Option<String>,
    generation: Generation,
    trace: Arc<TraceInput>,
    history: Arc<[MetricSample]>,
    language: Language,
    cache: ViewModelCache,
}

impl DashboardSession {
    pub fn new(language: Language) -> Self {
        Self {
            target: None,
            generation: Generation::default(),
            trace: Arc::new(TraceInput::Absent),
            history: Arc::from(Vec::new()),
            language,
            cache: ViewModelCache::new(),
        }
    }

    /// Switches to `target` and returns the token its fetches must carry.
    /// Data for the previous target is cleared right away.
    pub fn select_target(&mut self, target: impl Into<String>) -> Generation {
        let target = target.into();
        self.generation = Generation(self.generation.0 + 1);
        info!("Selected target {} (generation {})", target, self.generation.0);

        self.target = Some(target);
        self.trace = Arc::new(TraceInput::Absent);
        self.history = Arc::from(Vec::new());
        self.generation
    }

    pub fn accept(&mut self, retrieval: Retrieval) -> Delivery {
        let current = self.target.as_deref() == Some(retrieval.target.as_str());
        if retrieval.generation != self.generation || !current {
            debug!(
                "Discarding stale retrieval for {} (generation {}, current {})",
                retrieval.target, retrieval.generation.0, self.generation.0
            );
            return Delivery::Stale;
        }

        match retrieval.payload {
            RetrievalPayload::Trace(trace) => self.trace = Arc::new(trace),
            RetrievalPayload::History(history) => self.history = Arc::from(history),
        }
        Delivery::Applied
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    pub fn view_model(&mut self) -> Arc<ViewModel> {
        self.cache.get(&self.trace, &self.history, self.language)
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn trace(&self) -> &TraceInput {
        &self.trace
    }

    pub fn history(&self) -> &[MetricSample] {
        &self.history
    }

    pub fn recomputations(&self) -> u64 {
        self.cache.recomputations()
    }
}

impl Default for DashboardSession {
    fn default() -> Self {
        Self::new(Language::default())
    }
}
