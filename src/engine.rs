use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::bank::{Domain, QuestionSource};
use crate::config::Config;
use crate::error::QuizError;
use crate::export;
use crate::session::quiz::{QuizScope, QuizSession, StepOutcome};
use crate::session::results::{QuizResults, SectionScore, section_breakdown};
use crate::store::schema::ScoreHistoryEntry;
use crate::store::{KeyValueStore, ProgressStore};

/// Drives one quiz attempt end to end: samples questions from the bank,
/// applies transitions to the session, and checkpoints through the store
/// after every mutating operation.
///
/// Persistence is fire-and-forget with respect to state: a failed write is
/// returned as `QuizError::Persistence`, but the in-memory transition it
/// followed has already happened and stays authoritative. Scoring and
/// navigation keep working with a broken store; only resumability and history
/// are lost.
pub struct QuizEngine<B: QuestionSource, S: KeyValueStore> {
    bank: B,
    store: ProgressStore<S>,
    config: Config,
    session: Option<QuizSession>,
    rng: SmallRng,
}

impl<B: QuestionSource, S: KeyValueStore> QuizEngine<B, S> {
    pub fn new(bank: B, store: S, config: Config) -> Self {
        Self::with_rng(bank, store, config, SmallRng::from_entropy())
    }

    /// Deterministic sampling for tests.
    pub fn with_seed(bank: B, store: S, config: Config, seed: u64) -> Self {
        Self::with_rng(bank, store, config, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(bank: B, store: S, config: Config, rng: SmallRng) -> Self {
        Self {
            bank,
            store: ProgressStore::new(store),
            config,
            session: None,
            rng,
        }
    }

    pub fn session(&self) -> Option<&QuizSession> {
        self.session.as_ref()
    }

    pub fn bank(&self) -> &B {
        &self.bank
    }

    /// Begin a fresh attempt, discarding any in-memory session. Samples 30
    /// questions for an overall quiz or 10 for a topic quiz (config), then
    /// writes the first checkpoint.
    ///
    /// # Errors
    ///
    /// `QuizError::EmptyQuestionSet` if the bank has nothing for the scope;
    /// `QuizError::Persistence` if the initial checkpoint write fails (the
    /// session is still started).
    pub fn start(&mut self, domain: Domain, scope: QuizScope) -> Result<(), QuizError> {
        let limit = match scope {
            QuizScope::Overall => self.config.overall_question_count,
            QuizScope::Topic(_) => self.config.topic_question_count,
        };
        let questions = self
            .bank
            .sample_questions(domain, scope.topic_id(), limit, &mut self.rng);

        let session = QuizSession::new(domain, scope, questions, Utc::now())?;
        self.session = Some(session);
        self.checkpoint()
    }

    /// Restore the session from a checkpoint saved within the freshness
    /// window. Missing, stale, corrupt, or schema-mismatched checkpoints
    /// restore nothing; none of those is an error.
    pub fn resume(&mut self) -> bool {
        match self.store.load_checkpoint(Utc::now()) {
            Some(checkpoint) => {
                self.session = Some(checkpoint.session);
                true
            }
            None => false,
        }
    }

    /// Confirm-and-discard: drop the in-flight session and its checkpoint.
    pub fn abandon(&mut self) -> Result<(), QuizError> {
        self.session = None;
        self.store.clear_checkpoint()?;
        Ok(())
    }

    pub fn select_option(&mut self, option: &str) -> Result<(), QuizError> {
        self.session_mut()?.select_option(option);
        self.checkpoint()
    }

    pub fn submit_text(&mut self, text: &str) -> Result<(), QuizError> {
        self.session_mut()?.submit_text(text);
        self.checkpoint()
    }

    pub fn check_answer(&mut self) -> Result<(), QuizError> {
        self.session_mut()?.check_answer();
        self.checkpoint()
    }

    pub fn next(&mut self) -> Result<StepOutcome, QuizError> {
        let outcome = self.session_mut()?.next();
        self.after_step(outcome)?;
        Ok(outcome)
    }

    pub fn skip(&mut self) -> Result<StepOutcome, QuizError> {
        let outcome = self.session_mut()?.skip();
        self.after_step(outcome)?;
        Ok(outcome)
    }

    pub fn previous(&mut self) -> Result<(), QuizError> {
        self.session_mut()?.previous();
        self.checkpoint()
    }

    pub fn pause(&mut self) -> Result<(), QuizError> {
        self.session_mut()?.pause();
        self.checkpoint()
    }

    pub fn resume_from_pause(&mut self) -> Result<(), QuizError> {
        self.session_mut()?.resume();
        self.checkpoint()
    }

    /// End the attempt now: stamp the end time, append a score history entry
    /// under the session's topic key, and clear the checkpoint.
    ///
    /// Ended is terminal: calling this on an already-ended session returns
    /// the same results without recording the quiz a second time.
    pub fn finish(&mut self) -> Result<QuizResults, QuizError> {
        let now = Utc::now();
        let session = self.session.as_mut().ok_or(QuizError::NoSession)?;
        let first_finish = session.is_active();
        session.finish(now);

        let results = QuizResults::from_session(session);
        if first_finish {
            let entry = ScoreHistoryEntry {
                score: results.score_percent,
                timestamp: now,
                mode: session.scope.mode(),
            };
            let domain = session.domain;
            let topic_key = session.scope.topic_key();

            self.store.append_history(domain, &topic_key, entry)?;
            self.store.clear_checkpoint()?;
        }
        Ok(results)
    }

    pub fn results(&self) -> Option<QuizResults> {
        self.session.as_ref().map(QuizResults::from_session)
    }

    pub fn section_breakdown(&self) -> Option<Vec<SectionScore>> {
        self.session.as_ref().map(section_breakdown)
    }

    pub fn export_csv(&self) -> Option<String> {
        self.session
            .as_ref()
            .map(|s| export::csv_report(s, Utc::now()))
    }

    pub fn export_filename(&self) -> String {
        export::export_filename(&self.config.export_prefix, Utc::now().date_naive())
    }

    pub fn history(&self) -> crate::store::schema::UserProgress {
        self.store.load_history()
    }

    fn session_mut(&mut self) -> Result<&mut QuizSession, QuizError> {
        self.session.as_mut().ok_or(QuizError::NoSession)
    }

    fn after_step(&mut self, outcome: StepOutcome) -> Result<(), QuizError> {
        match outcome {
            StepOutcome::Completed => self.finish().map(|_| ()),
            _ => self.checkpoint(),
        }
    }

    fn checkpoint(&mut self) -> Result<(), QuizError> {
        // Ended sessions are never checkpointed; resume must not bring one back.
        if let Some(session) = self.session.as_ref().filter(|s| s.is_active()) {
            self.store.save_checkpoint(session, Utc::now())?;
        }
        Ok(())
    }
}
