//! Generation orchestrator
//!
//! The orchestrator owns the multi-provider execution model: it resolves the
//! provider selection to an ordered adapter list, builds the instruction text
//! once, fans out to every selected adapter, waits for all of them to settle,
//! and assembles the final record sequence. A provider failure only fails the
//! whole request when every selected provider failed; otherwise it becomes a
//! warning alongside the surviving records.

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, warn};

use smartcase_config::Config;
use smartcase_llm::{AdapterError, ProviderAdapter, construct_adapter_for_provider};
use smartcase_prompt::{ContextBlock, build_prompt};
use smartcase_schema::{RecordKind, RecordSet};
use smartcase_utils::error::{GenerateError, ProviderFailure};

/// Provider selection for one generation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderSelection {
    /// A single named provider
    One(String),
    /// Every configured provider, in deterministic order
    All,
}

impl ProviderSelection {
    /// Parse a selection token; `"all"` is the multi-provider sentinel.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::One(s.to_string())
        }
    }
}

/// Inputs for one generation request
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub story: String,
    pub kind: RecordKind,
    pub provider: ProviderSelection,
    /// Keep at most this many records of the aggregate; must be positive
    pub case_count: Option<u32>,
    pub context: Vec<ContextBlock>,
}

impl GenerateRequest {
    #[must_use]
    pub fn new(story: impl Into<String>, kind: RecordKind, provider: ProviderSelection) -> Self {
        Self {
            story: story.into(),
            kind,
            provider,
            case_count: None,
            context: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_case_count(mut self, case_count: u32) -> Self {
        self.case_count = Some(case_count);
        self
    }

    #[must_use]
    pub fn with_context(mut self, context: Vec<ContextBlock>) -> Self {
        self.context = context;
        self
    }
}

/// Result of a successful generation: the aggregated records plus one
/// warning per provider that failed while others succeeded.
#[derive(Debug, Clone)]
pub struct GenerateOutput {
    pub records: RecordSet,
    pub warnings: Vec<ProviderFailure>,
}

/// How the generator obtains its adapters
enum AdapterSource {
    /// Adapters are constructed per request from configuration
    Config(Box<Config>),
    /// Pre-built adapters in dispatch order (test and embedding seam)
    Injected(Vec<Arc<dyn ProviderAdapter>>),
}

/// One resolved dispatch slot: a provider that will either be invoked or
/// has already failed construction (missing API key).
struct Slot {
    provider: String,
    adapter: Result<Arc<dyn ProviderAdapter>, AdapterError>,
}

/// The generation orchestrator
pub struct Generator {
    source: AdapterSource,
}

impl Generator {
    /// Create a generator that builds real adapters from configuration.
    #[must_use]
    pub fn from_config(config: Config) -> Self {
        Self {
            source: AdapterSource::Config(Box::new(config)),
        }
    }

    /// Create a generator over pre-built adapters.
    ///
    /// The adapter order is the dispatch order for `ProviderSelection::All`.
    #[must_use]
    pub fn with_adapters(adapters: Vec<Arc<dyn ProviderAdapter>>) -> Self {
        Self {
            source: AdapterSource::Injected(adapters),
        }
    }

    /// Generate test case records for one request.
    ///
    /// Cancellation-safe: dropping the returned future aborts all in-flight
    /// adapter calls.
    ///
    /// # Errors
    ///
    /// - `GenerateError::InvalidInput` for an empty story, a zero case
    ///   count, or an unknown provider name
    /// - `GenerateError::AllProvidersFailed` when every selected provider
    ///   failed, carrying one reason per provider
    pub async fn generate(&self, request: GenerateRequest) -> Result<GenerateOutput, GenerateError> {
        if request.case_count == Some(0) {
            return Err(GenerateError::InvalidInput(
                "case count must be a positive integer".to_string(),
            ));
        }

        // Built once; every adapter in this call shares the same text.
        let prompt = build_prompt(
            &request.story,
            request.kind,
            request.case_count,
            &request.context,
        )?;

        let slots = self.resolve(&request.provider)?;
        debug!(
            providers = slots.len(),
            kind = %request.kind,
            "dispatching generation"
        );

        let outcomes = dispatch(slots, Arc::from(prompt), request.kind).await;

        let mut failures: Vec<ProviderFailure> = Vec::new();
        let mut successes: Vec<(String, RecordSet)> = Vec::new();

        for (provider, outcome) in outcomes {
            match outcome {
                Ok(records) => {
                    debug!(provider = %provider, records = records.len(), "provider succeeded");
                    successes.push((provider, records));
                }
                Err(error) => {
                    warn!(provider = %provider, %error, "provider failed");
                    failures.push(ProviderFailure::new(provider, error.to_string()));
                }
            }
        }

        if successes.is_empty() {
            return Err(GenerateError::AllProvidersFailed { failures });
        }

        let mut records = aggregate(request.kind, successes);
        if let Some(case_count) = request.case_count {
            records.truncate(case_count as usize);
        }

        Ok(GenerateOutput {
            records,
            warnings: failures,
        })
    }

    /// Resolve the selection to an ordered list of dispatch slots.
    ///
    /// A slot whose adapter failed construction (e.g. missing API key) is
    /// kept and reported as that provider's failure rather than silently
    /// skipped. An unknown provider name is invalid input.
    fn resolve(&self, selection: &ProviderSelection) -> Result<Vec<Slot>, GenerateError> {
        match &self.source {
            AdapterSource::Injected(adapters) => match selection {
                ProviderSelection::All => Ok(adapters
                    .iter()
                    .map(|adapter| Slot {
                        provider: adapter.id().to_string(),
                        adapter: Ok(Arc::clone(adapter)),
                    })
                    .collect()),
                ProviderSelection::One(name) => {
                    let adapter = adapters
                        .iter()
                        .find(|a| a.id() == name)
                        .ok_or_else(|| {
                            GenerateError::InvalidInput(format!("unknown provider '{name}'"))
                        })?;
                    Ok(vec![Slot {
                        provider: name.clone(),
                        adapter: Ok(Arc::clone(adapter)),
                    }])
                }
            },
            AdapterSource::Config(config) => {
                let names: Vec<String> = match selection {
                    ProviderSelection::All => config.provider_order(),
                    ProviderSelection::One(name) => vec![name.clone()],
                };

                let mut slots = Vec::with_capacity(names.len());
                for name in names {
                    match construct_adapter_for_provider(&name, config) {
                        Ok(adapter) => slots.push(Slot {
                            provider: name,
                            adapter: Ok(adapter),
                        }),
                        // An unknown name is a caller mistake, not a
                        // provider failure.
                        Err(AdapterError::Unsupported(msg)) => {
                            return Err(GenerateError::InvalidInput(msg));
                        }
                        Err(error) => slots.push(Slot {
                            provider: name,
                            adapter: Err(error),
                        }),
                    }
                }
                Ok(slots)
            }
        }
    }
}

/// Invoke every slot and return per-provider outcomes in slot order.
///
/// Single-slot requests are awaited inline; multi-slot requests fan out on a
/// `JoinSet` and wait for all tasks to settle (no short-circuit on first
/// failure or first success). Results are collected positionally, so the
/// output order never depends on completion order.
async fn dispatch(
    slots: Vec<Slot>,
    prompt: Arc<str>,
    kind: RecordKind,
) -> Vec<(String, Result<RecordSet, AdapterError>)> {
    let mut slots = slots;
    if slots.len() == 1 {
        let slot = slots.remove(0);
        let outcome = match slot.adapter {
            Ok(adapter) => adapter.generate(&prompt, kind).await,
            Err(error) => Err(error),
        };
        return vec![(slot.provider, outcome)];
    }

    let mut providers = Vec::with_capacity(slots.len());
    let mut outcomes: Vec<Option<Result<RecordSet, AdapterError>>> = Vec::new();
    let mut join_set = JoinSet::new();

    for (index, slot) in slots.into_iter().enumerate() {
        providers.push(slot.provider);
        match slot.adapter {
            Ok(adapter) => {
                outcomes.push(None);
                let prompt = Arc::clone(&prompt);
                join_set.spawn(async move { (index, adapter.generate(&prompt, kind).await) });
            }
            Err(error) => outcomes.push(Some(Err(error))),
        }
    }

    while let Some(joined) = join_set.join_next().await {
        if let Ok((index, outcome)) = joined {
            outcomes[index] = Some(outcome);
        }
        // A panicked task leaves its slot unfilled and is reported below.
    }

    providers
        .into_iter()
        .zip(outcomes)
        .map(|(provider, outcome)| {
            let outcome = outcome.unwrap_or_else(|| {
                Err(AdapterError::Transport(
                    "adapter task terminated unexpectedly".to_string(),
                ))
            });
            (provider, outcome)
        })
        .collect()
}

/// Concatenate per-provider record sets in dispatch order, stamp each
/// record's provider, and renumber plain ids contiguously from 1.
fn aggregate(kind: RecordKind, successes: Vec<(String, RecordSet)>) -> RecordSet {
    match kind {
        RecordKind::Plain => {
            let mut all = Vec::new();
            for (provider, set) in successes {
                if let RecordSet::Plain(records) = set {
                    for mut record in records {
                        record.provider.get_or_insert_with(|| provider.clone());
                        all.push(record);
                    }
                }
            }
            for (position, record) in all.iter_mut().enumerate() {
                record.id = position as u32 + 1;
            }
            RecordSet::Plain(all)
        }
        RecordKind::Bdd => {
            let mut all = Vec::new();
            for (provider, set) in successes {
                if let RecordSet::Bdd(records) = set {
                    for mut record in records {
                        record.provider.get_or_insert_with(|| provider.clone());
                        all.push(record);
                    }
                }
            }
            RecordSet::Bdd(all)
        }
    }
}
