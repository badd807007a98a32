//! Retry classification strategies
//!
//! A [`RetryClassifier`] decides, after a failed attempt, whether the retry
//! loop should keep going. Classifiers are fallible: an `Err` aborts the loop
//! immediately and surfaces as
//! [`RetryError::Classifier`](super::RetryError::Classifier).
//!
//! Named strategies cover the recurring call-site policies so callers select
//! one by configuration instead of writing closures:
//!
//! | Strategy | Retries when |
//! |----------|--------------|
//! | [`AlwaysRetry`] | always (default) |
//! | [`NeverRetry`] | never |
//! | [`RetryUnlessPermanent`] | message has no permanent marker |
//! | [`RetryOnTransient`] | message has a network-class marker |
//! | [`RetryOnClassified`] | [`ErrorClassification::is_retryable`] |
//!
//! [`ClassifierStrategy`] names one of these in configuration. Its
//! `Classified` variant needs a typed retryability check, so it is bound to
//! one through [`StrategyClassifier`].

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::constants::{PERMANENT_ERROR_MARKERS, TRANSIENT_ERROR_MARKERS};
use crate::error::ErrorClassification;

/// Failure raised by a classifier itself
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("retry classifier failed: {message}")]
pub struct ClassifierError {
    pub message: String,
}

impl ClassifierError {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self { message: message.into() }
    }
}

/// Result of a classification
pub type ClassifierResult = Result<bool, ClassifierError>;

/// Decides whether a failed attempt should be retried
pub trait RetryClassifier<E>: Send + Sync {
    /// `attempt` is the 1-based number of the attempt that just failed.
    fn should_retry(&self, error: &E, attempt: u32) -> ClassifierResult;
}

impl<E, C: RetryClassifier<E> + ?Sized> RetryClassifier<E> for std::sync::Arc<C> {
    fn should_retry(&self, error: &E, attempt: u32) -> ClassifierResult {
        (**self).should_retry(error, attempt)
    }
}

impl<E, C: RetryClassifier<E> + ?Sized> RetryClassifier<E> for Box<C> {
    fn should_retry(&self, error: &E, attempt: u32) -> ClassifierResult {
        (**self).should_retry(error, attempt)
    }
}

fn contains_marker(message: &str, markers: &[String]) -> bool {
    let lowered = message.to_lowercase();
    markers.iter().any(|marker| lowered.contains(marker.as_str()))
}

fn owned_markers(markers: &[&str]) -> Vec<String> {
    markers.iter().map(|marker| marker.to_lowercase()).collect()
}

/// Retries every failure
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysRetry;

impl<E> RetryClassifier<E> for AlwaysRetry {
    fn should_retry(&self, _error: &E, _attempt: u32) -> ClassifierResult {
        Ok(true)
    }
}

/// Never retries
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverRetry;

impl<E> RetryClassifier<E> for NeverRetry {
    fn should_retry(&self, _error: &E, _attempt: u32) -> ClassifierResult {
        Ok(false)
    }
}

/// Retries unless the error message carries a permanent marker
///
/// Defaults to [`PERMANENT_ERROR_MARKERS`]: "not found", "unsupported",
/// "permanent" (which also matches "permanently").
#[derive(Debug, Clone)]
pub struct RetryUnlessPermanent {
    markers: Vec<String>,
}

impl Default for RetryUnlessPermanent {
    fn default() -> Self {
        Self { markers: owned_markers(PERMANENT_ERROR_MARKERS) }
    }
}

impl RetryUnlessPermanent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_markers(markers: &[&str]) -> Self {
        Self { markers: owned_markers(markers) }
    }

    pub fn is_permanent(&self, message: &str) -> bool {
        contains_marker(message, &self.markers)
    }
}

impl<E: fmt::Display> RetryClassifier<E> for RetryUnlessPermanent {
    fn should_retry(&self, error: &E, _attempt: u32) -> ClassifierResult {
        Ok(!self.is_permanent(&error.to_string()))
    }
}

/// Retries only network-class transient failures
///
/// Defaults to [`TRANSIENT_ERROR_MARKERS`]. A message that also carries a
/// permanent marker is never retried.
#[derive(Debug, Clone)]
pub struct RetryOnTransient {
    markers: Vec<String>,
    permanent: RetryUnlessPermanent,
}

impl Default for RetryOnTransient {
    fn default() -> Self {
        Self { markers: owned_markers(TRANSIENT_ERROR_MARKERS), permanent: RetryUnlessPermanent::new() }
    }
}

impl RetryOnTransient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_markers(markers: &[&str]) -> Self {
        Self { markers: owned_markers(markers), permanent: RetryUnlessPermanent::new() }
    }

    pub fn is_transient(&self, message: &str) -> bool {
        !self.permanent.is_permanent(message) && contains_marker(message, &self.markers)
    }
}

impl<E: fmt::Display> RetryClassifier<E> for RetryOnTransient {
    fn should_retry(&self, error: &E, _attempt: u32) -> ClassifierResult {
        Ok(self.is_transient(&error.to_string()))
    }
}

/// Defers to the error's own [`ErrorClassification`]
#[derive(Debug, Clone, Copy, Default)]
pub struct RetryOnClassified;

impl<E: ErrorClassification> RetryClassifier<E> for RetryOnClassified {
    fn should_retry(&self, error: &E, _attempt: u32) -> ClassifierResult {
        Ok(error.is_retryable())
    }
}

/// Predicate-based classifier
#[derive(Debug, Clone)]
pub struct PredicateClassifier<F> {
    predicate: F,
}

impl<F> PredicateClassifier<F> {
    pub fn new(predicate: F) -> Self {
        Self { predicate }
    }
}

impl<F, E> RetryClassifier<E> for PredicateClassifier<F>
where
    F: Fn(&E, u32) -> bool + Send + Sync,
{
    fn should_retry(&self, error: &E, attempt: u32) -> ClassifierResult {
        Ok((self.predicate)(error, attempt))
    }
}

/// Classifier backed by a closure that may itself fail
#[derive(Debug, Clone)]
pub struct FallibleClassifier<F> {
    decide: F,
}

impl<F> FallibleClassifier<F> {
    pub fn new(decide: F) -> Self {
        Self { decide }
    }
}

impl<F, E> RetryClassifier<E> for FallibleClassifier<F>
where
    F: Fn(&E, u32) -> ClassifierResult + Send + Sync,
{
    fn should_retry(&self, error: &E, attempt: u32) -> ClassifierResult {
        (self.decide)(error, attempt)
    }
}

static UNLESS_PERMANENT: Lazy<RetryUnlessPermanent> = Lazy::new(RetryUnlessPermanent::new);
static ON_TRANSIENT: Lazy<RetryOnTransient> = Lazy::new(RetryOnTransient::new);

/// Classifier strategy selectable from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierStrategy {
    #[default]
    Always,
    Never,
    UnlessPermanent,
    Transient,
    /// Defer to the error type's own retryability check
    Classified,
}

impl ClassifierStrategy {
    /// Verdict for strategies that only look at the message
    ///
    /// Returns `None` for [`Classified`](Self::Classified), which needs the
    /// typed error.
    pub fn decide_by_message(&self, message: &str) -> Option<bool> {
        match self {
            Self::Always => Some(true),
            Self::Never => Some(false),
            Self::UnlessPermanent => Some(!UNLESS_PERMANENT.is_permanent(message)),
            Self::Transient => Some(ON_TRANSIENT.is_transient(message)),
            Self::Classified => None,
        }
    }

    /// Bind this strategy to a typed retryability check
    pub fn with_check<F>(self, is_retryable: F) -> StrategyClassifier<F> {
        StrategyClassifier::new(self, is_retryable)
    }

    /// Bind this strategy to [`ErrorClassification::is_retryable`]
    pub fn for_classified<E: ErrorClassification>(self) -> StrategyClassifier<fn(&E) -> bool> {
        let check: fn(&E) -> bool = <E as ErrorClassification>::is_retryable;
        StrategyClassifier::new(self, check)
    }
}

impl fmt::Display for ClassifierStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => write!(f, "always"),
            Self::Never => write!(f, "never"),
            Self::UnlessPermanent => write!(f, "unless_permanent"),
            Self::Transient => write!(f, "transient"),
            Self::Classified => write!(f, "classified"),
        }
    }
}

impl FromStr for ClassifierStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "always" => Ok(Self::Always),
            "never" => Ok(Self::Never),
            "unless_permanent" => Ok(Self::UnlessPermanent),
            "transient" => Ok(Self::Transient),
            "classified" => Ok(Self::Classified),
            other => Err(format!("Invalid ClassifierStrategy: {other}")),
        }
    }
}

/// A bare strategy only understands messages; `Classified` reports a
/// [`ClassifierError`] here. Use [`StrategyClassifier`] for typed errors.
impl<E: fmt::Display> RetryClassifier<E> for ClassifierStrategy {
    fn should_retry(&self, error: &E, _attempt: u32) -> ClassifierResult {
        self.decide_by_message(&error.to_string()).ok_or_else(|| {
            ClassifierError::new("classified strategy requires a typed retryability check")
        })
    }
}

/// [`ClassifierStrategy`] with a typed check for the `Classified` variant
#[derive(Debug, Clone, Copy)]
pub struct StrategyClassifier<F> {
    strategy: ClassifierStrategy,
    is_retryable: F,
}

impl<F> StrategyClassifier<F> {
    pub fn new(strategy: ClassifierStrategy, is_retryable: F) -> Self {
        Self { strategy, is_retryable }
    }

    pub fn strategy(&self) -> ClassifierStrategy {
        self.strategy
    }
}

impl<E, F> RetryClassifier<E> for StrategyClassifier<F>
where
    E: fmt::Display,
    F: Fn(&E) -> bool + Send + Sync,
{
    fn should_retry(&self, error: &E, _attempt: u32) -> ClassifierResult {
        match self.strategy {
            ClassifierStrategy::Classified => Ok((self.is_retryable)(error)),
            strategy => Ok(strategy.decide_by_message(&error.to_string()).unwrap_or(false)),
        }
    }
}
