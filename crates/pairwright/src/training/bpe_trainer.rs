//! # BPE Merge Learner

use core::sync::atomic::{AtomicBool, Ordering};

use dary_heap::OctonaryHeap;

use crate::{
    errors::{PWError, PWResult},
    spanning::{SpanningPolicy, TextSpanner},
    training::{BpeTrainerOptions, MergeJob, PairCounter, TrainingCorpus, WordCounter},
    types::{Pair, TokenType},
    vocab::{MergeRules, Vocabulary, io::VocabArtifact},
};

/// Why training stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum StopReason {
    /// The vocabulary reached the target size.
    TargetReached,

    /// The best remaining pair occurred fewer than `min_frequency` times.
    BelowMinFrequency {
        /// The count of the best remaining pair.
        max_count: u64,
    },

    /// No mergeable pair is left in the corpus.
    Exhausted,

    /// The caller stopped training early.
    Cancelled,
}

/// The state of a [`BpeTrainer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrainerState {
    /// Accepting documents.
    Collecting,

    /// Ready to choose the next pair.
    SelectPair,

    /// A pair is chosen and waiting to be merged.
    ApplyMerge,

    /// Done; no further transitions.
    Stopped(StopReason),
}

/// The product of training.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingOutcome<T: TokenType> {
    /// The learned vocabulary.
    pub vocab: Vocabulary<T>,

    /// The learned rules, in rank order.
    pub rules: MergeRules<T>,

    /// The policy the corpus was spanned with.
    pub spanning: SpanningPolicy,

    /// Why training stopped.
    pub stop_reason: StopReason,

    /// The number of rules that minted a new token.
    pub merges_minted: usize,

    /// The configured target size.
    pub target_vocab_size: usize,
}

impl<T: TokenType> TrainingOutcome<T> {
    /// Did the corpus run out of pairs before the target was reached?
    pub fn is_stalled(&self) -> bool {
        self.stop_reason == StopReason::Exhausted
    }

    /// Convert a stalled outcome into [`PWError::TrainingStalled`].
    ///
    /// Callers that can use a partial vocabulary should inspect
    /// [`Self::stop_reason`] instead.
    pub fn require_target(self) -> PWResult<Self> {
        if self.is_stalled() {
            return Err(PWError::TrainingStalled {
                reached: self.vocab.len(),
                target: self.target_vocab_size,
            });
        }
        Ok(self)
    }

    /// Package the vocabulary, rules and spanning policy for persistence.
    pub fn into_artifact(self) -> VocabArtifact<T> {
        VocabArtifact {
            spanning: self.spanning,
            vocab: self.vocab,
            rules: self.rules,
        }
    }
}

/// Learns merge rules from a corpus.
///
/// Drive it one transition at a time with [`Self::step`],
/// or to completion with [`Self::run`].
///
/// ```rust
/// use pairwright::training::{BpeTrainer, BpeTrainerOptions, StopReason};
///
/// let options = BpeTrainerOptions::new(258).with_parallel(false);
/// let mut trainer: BpeTrainer<u32> = BpeTrainer::new(options).unwrap();
/// trainer.add_documents(["low low low lower"]).unwrap();
///
/// assert_eq!(trainer.run().unwrap(), StopReason::TargetReached);
/// let outcome = trainer.finish();
/// assert_eq!(outcome.vocab.id_to_bytes(256).unwrap(), b"lo");
/// ```
#[derive(Debug)]
pub struct BpeTrainer<T: TokenType> {
    options: BpeTrainerOptions,
    state: TrainerState,

    vocab: Vocabulary<T>,
    rules: MergeRules<T>,

    words: WordCounter,
    corpus: TrainingCorpus<T>,
    counter: Option<PairCounter<T>>,
    heap: OctonaryHeap<MergeJob<T>>,
    pending: Option<MergeJob<T>>,

    merges_minted: usize,
    last_percent: usize,
}

impl<T: TokenType> BpeTrainer<T> {
    /// Create a trainer; special tokens are registered immediately.
    ///
    /// ## Returns
    /// [`PWError::InvalidConfiguration`] for invalid options.
    pub fn new(options: BpeTrainerOptions) -> PWResult<Self> {
        options.validate::<T>()?;

        let mut vocab = Vocabulary::new();
        for special in &options.special_tokens {
            vocab.register_special(special.as_slice())?;
        }

        let spanner = TextSpanner::from_config(&options.spanning_config())?;

        Ok(Self {
            options,
            state: TrainerState::Collecting,
            vocab,
            rules: MergeRules::default(),
            words: WordCounter::new(spanner),
            corpus: TrainingCorpus::default(),
            counter: None,
            heap: OctonaryHeap::new(),
            pending: None,
            merges_minted: 0,
            last_percent: 0,
        })
    }

    /// The options.
    pub fn options(&self) -> &BpeTrainerOptions {
        &self.options
    }

    /// The current state.
    pub fn state(&self) -> TrainerState {
        self.state
    }

    /// The vocabulary so far.
    pub fn vocab(&self) -> &Vocabulary<T> {
        &self.vocab
    }

    /// The rules so far.
    pub fn rules(&self) -> &MergeRules<T> {
        &self.rules
    }

    /// The pair chosen by the last [`TrainerState::SelectPair`] transition, if not yet merged.
    pub fn pending_pair(&self) -> Option<Pair<T>> {
        self.pending.map(|job| job.pair)
    }

    fn check_collecting(&self) -> PWResult<()> {
        if self.state != TrainerState::Collecting {
            return Err(PWError::invalid_config(
                "documents can only be added before training starts",
            ));
        }
        Ok(())
    }

    /// Add one document to the corpus.
    pub fn add_document<S: AsRef<[u8]>>(
        &mut self,
        doc: S,
    ) -> PWResult<()> {
        self.check_collecting()?;
        self.words.add_document(doc);
        Ok(())
    }

    /// Add documents to the corpus.
    pub fn add_documents<I, S>(
        &mut self,
        docs: I,
    ) -> PWResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        self.check_collecting()?;
        self.words.add_documents(docs);
        Ok(())
    }

    /// Add documents to the corpus, spanning them in parallel.
    #[cfg(feature = "rayon")]
    pub fn add_documents_par<S>(
        &mut self,
        docs: &[S],
    ) -> PWResult<()>
    where
        S: AsRef<[u8]> + Sync,
    {
        self.check_collecting()?;
        self.words.add_documents_par(docs);
        Ok(())
    }

    /// Leave [`TrainerState::Collecting`]: freeze the corpus and count pairs.
    fn begin(&mut self) {
        let spanner = self.words.spanner().clone();
        let words = core::mem::replace(&mut self.words, WordCounter::new(spanner));
        self.corpus = words.into_corpus();

        let counter = PairCounter::count_all(&self.corpus, self.options.parallel);

        self.heap = counter
            .iter()
            .map(|(pair, count)| MergeJob {
                count: count as u64,
                pair,
            })
            .collect();

        log::info!(
            "training: {} unique sequences ({} tokens), {} unique pairs; target vocab size {}",
            self.corpus.len(),
            self.corpus.total_tokens(),
            counter.len(),
            self.options.target_vocab_size,
        );

        self.counter = Some(counter);
        self.state = TrainerState::SelectPair;
    }

    fn stop(
        &mut self,
        reason: StopReason,
    ) {
        self.pending = None;
        self.state = TrainerState::Stopped(reason);

        match reason {
            StopReason::Exhausted => log::warn!(
                "training stalled: corpus exhausted at vocab size {} of {}",
                self.vocab.len(),
                self.options.target_vocab_size
            ),
            _ => log::info!(
                "training stopped ({reason}): vocab size {}, {} rules, {} minted",
                self.vocab.len(),
                self.rules.len(),
                self.merges_minted
            ),
        }
    }

    /// Choose the next pair, or stop.
    ///
    /// Picks the pair with the highest count; ties go to the smallest
    /// `(left, right)`. Moves to [`TrainerState::ApplyMerge`] or
    /// [`TrainerState::Stopped`].
    pub fn select_pair(&mut self) -> TrainerState {
        if self.state != TrainerState::SelectPair {
            return self.state;
        }

        if self.vocab.len() >= self.options.target_vocab_size {
            self.stop(StopReason::TargetReached);
            return self.state;
        }

        let Some(counter) = &self.counter else {
            self.stop(StopReason::Exhausted);
            return self.state;
        };

        loop {
            let Some(mut job) = self.heap.pop() else {
                self.stop(StopReason::Exhausted);
                return self.state;
            };

            let current = counter.count(&job.pair);
            if current <= 0 {
                continue;
            }
            let current = current as u64;
            if job.count != current {
                // stale; requeue at the live count.
                job.count = current;
                self.heap.push(job);
                continue;
            }

            if current < self.options.effective_min_frequency() {
                self.stop(StopReason::BelowMinFrequency { max_count: current });
                return self.state;
            }

            self.pending = Some(job);
            self.state = TrainerState::ApplyMerge;
            return self.state;
        }
    }

    /// Merge the pending pair: register its token, record the rule,
    /// and update the corpus and counts.
    ///
    /// If the merged bytes are already a token, the rule targets that token,
    /// and nothing new is minted.
    pub fn apply_merge(&mut self) -> PWResult<TrainerState> {
        if self.state != TrainerState::ApplyMerge {
            return Ok(self.state);
        }
        let (Some(job), Some(counter)) = (self.pending.take(), self.counter.as_mut()) else {
            self.state = TrainerState::SelectPair;
            return Ok(self.state);
        };
        let (left, right) = job.pair;

        // A pair can re-form next to an aliased token after its rule was learned;
        // the existing rule already covers it.
        let merged = if let Some((rank, merged)) = self.rules.lookup_pair(&job.pair) {
            log::debug!("re-merge {rank}: ({left}, {right}) -> {merged} x{}", job.count);
            merged
        } else {
            let mut merged_bytes = self.vocab.id_to_bytes(left)?.to_vec();
            merged_bytes.extend_from_slice(self.vocab.id_to_bytes(right)?);

            let merged = match self.vocab.lookup_token(&merged_bytes) {
                Some(existing) if self.vocab.is_special(existing) => {
                    return Err(PWError::invalid_config(format!(
                        "merge ({left}, {right}) would form special token {existing}"
                    )));
                }
                Some(existing) => existing,
                None => {
                    self.merges_minted += 1;
                    self.vocab.register(merged_bytes)?
                }
            };

            let rule = self.rules.push(left, right, merged)?;
            log::debug!(
                "merge {}: ({left}, {right}) -> {merged} x{}",
                rule.rank,
                job.count
            );
            merged
        };

        for pair in counter.apply_merge(&mut self.corpus, job.pair, merged) {
            self.heap.push(MergeJob {
                count: counter.count(&pair) as u64,
                pair,
            });
        }

        self.log_progress();
        self.state = TrainerState::SelectPair;
        Ok(self.state)
    }

    fn log_progress(&mut self) {
        let base = self.options.base_vocab_size();
        let span = self.options.target_vocab_size - base;
        if span == 0 {
            return;
        }
        let percent = (self.vocab.len() - base) * 100 / span;
        if percent > self.last_percent {
            self.last_percent = percent;
            log::info!(
                "training: {percent}% ({} / {} tokens)",
                self.vocab.len(),
                self.options.target_vocab_size
            );
        }
    }

    /// Advance by one merge.
    ///
    /// From [`TrainerState::Collecting`] this first freezes the corpus.
    /// Returns the state after the step.
    pub fn step(&mut self) -> PWResult<TrainerState> {
        if self.state == TrainerState::Collecting {
            self.begin();
        }
        if self.state == TrainerState::SelectPair {
            self.select_pair();
        }
        self.apply_merge()
    }

    /// Run to completion.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "info", skip_all))]
    pub fn run(&mut self) -> PWResult<StopReason> {
        loop {
            if let TrainerState::Stopped(reason) = self.step()? {
                return Ok(reason);
            }
        }
    }

    /// Run to completion, checking `cancel` before every merge.
    ///
    /// On cancellation the rules learned so far are kept,
    /// and stay consistent with the vocabulary.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "info", skip_all))]
    pub fn run_with_cancel(
        &mut self,
        cancel: &AtomicBool,
    ) -> PWResult<StopReason> {
        loop {
            if let TrainerState::Stopped(reason) = self.state {
                return Ok(reason);
            }
            if cancel.load(Ordering::Relaxed) {
                self.stop(StopReason::Cancelled);
                continue;
            }
            self.step()?;
        }
    }

    /// Consume the trainer.
    ///
    /// A trainer that was never run to a stop reports [`StopReason::Cancelled`].
    pub fn finish(self) -> TrainingOutcome<T> {
        let stop_reason = match self.state {
            TrainerState::Stopped(reason) => reason,
            _ => StopReason::Cancelled,
        };
        TrainingOutcome {
            vocab: self.vocab,
            rules: self.rules,
            spanning: self.options.spanning,
            stop_reason,
            merges_minted: self.merges_minted,
            target_vocab_size: self.options.target_vocab_size,
        }
    }
}

/// Train a vocabulary and merge rules from documents.
///
/// A stalled run still returns `Ok`; see [`TrainingOutcome::require_target`].
#[cfg_attr(feature = "tracing", tracing::instrument(level = "info", skip_all))]
pub fn train<T, I, S>(
    corpus: I,
    options: &BpeTrainerOptions,
) -> PWResult<TrainingOutcome<T>>
where
    T: TokenType,
    I: IntoIterator<Item = S>,
    S: AsRef<[u8]>,
{
    let mut trainer: BpeTrainer<T> = BpeTrainer::new(options.clone())?;
    trainer.add_documents(corpus)?;
    trainer.run()?;
    Ok(trainer.finish())
}
