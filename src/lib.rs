//! Drill engine for grammar and vocabulary quizzes.
//!
//! The engine owns one quiz attempt at a time: it samples a question set from
//! a [`bank::QuestionSource`], drives the answer/score/navigation state
//! machine, checkpoints after every mutating transition through a
//! [`store::KeyValueStore`] so an interrupted quiz can be resumed, and derives
//! results and a CSV report from the terminal state. Rendering is a caller
//! concern; the engine exposes pull-style views (`HeaderStatus`,
//! `QuizResults`) and never touches a screen.

pub mod bank;
pub mod config;
pub mod engine;
mod error;
pub mod export;
pub mod normalize;
pub mod session;
pub mod store;

pub use config::Config;
pub use engine::QuizEngine;
pub use error::QuizError;
