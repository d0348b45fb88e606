//! Per-slot candidate fallback.
//!
//! Each rendered asset slot walks its [`CandidateList`] from the highest
//! fidelity URL down, moving on only when the rendering boundary reports a
//! delivery failure. The transition logic is a pure reducer over
//! [`FallbackState`]; [`FallbackController`] keeps one state per slot key and
//! translates transitions into [`Directive`]s for the renderer.

use crate::resolver::{AssetIdentifier, CandidateList, MediaKind, Resolver};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use tracing::debug;

/// Where a slot is in its candidate walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotPhase {
    /// Waiting on the outcome for `candidates[index]`
    Pending(usize),
    /// `candidates[index]` loaded; frozen for the rest of the slot's life
    Delivered(usize),
    /// Nothing left to try
    Terminal,
}

/// Outcome reported by the rendering boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Success,
    Failure,
}

/// Outcome for one specific candidate of a slot.
///
/// Outcomes are delivered asynchronously, so a report names the candidate
/// it refers to; reports for any other candidate are stale and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryReport {
    pub candidate: usize,
    pub outcome: DeliveryOutcome,
}

impl DeliveryReport {
    pub fn success(candidate: usize) -> Self {
        Self {
            candidate,
            outcome: DeliveryOutcome::Success,
        }
    }

    pub fn failure(candidate: usize) -> Self {
        Self {
            candidate,
            outcome: DeliveryOutcome::Failure,
        }
    }
}

/// Why a slot shows its placeholder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderReason {
    /// The slot never had an identifier
    NoAsset,
    /// Every candidate failed
    Exhausted,
}

/// Instruction for the renderer after mounting a slot or reporting an outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Load `url` and report back with `candidate`
    Attempt { candidate: usize, url: String },
    /// Render the placeholder / error indicator
    Placeholder(PlaceholderReason),
    /// Nothing to do
    Unchanged,
}

/// Fallback state of one rendered asset slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackState {
    identifier: Option<AssetIdentifier>,
    kind: MediaKind,
    candidates: CandidateList,
    phase: SlotPhase,
}

impl FallbackState {
    /// Start at the first candidate, or go straight to terminal when there
    /// is nothing to try.
    pub fn new(identifier: Option<AssetIdentifier>, kind: MediaKind, candidates: CandidateList) -> Self {
        let phase = if candidates.is_empty() {
            SlotPhase::Terminal
        } else {
            SlotPhase::Pending(0)
        };

        Self {
            identifier,
            kind,
            candidates,
            phase,
        }
    }

    /// Resolve `identifier` and build the initial state
    pub fn resolve(resolver: &Resolver, identifier: Option<&str>, kind: MediaKind) -> Self {
        let identifier = identifier.and_then(AssetIdentifier::parse);
        let candidates = identifier
            .as_ref()
            .map(|id| resolver.resolve_id(id, kind))
            .unwrap_or_default();

        Self::new(identifier, kind, candidates)
    }

    pub fn identifier(&self) -> Option<&AssetIdentifier> {
        self.identifier.as_ref()
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn candidates(&self) -> &CandidateList {
        &self.candidates
    }

    pub fn phase(&self) -> SlotPhase {
        self.phase
    }

    /// Index of the candidate in use, if any
    pub fn candidate_index(&self) -> Option<usize> {
        match self.phase {
            SlotPhase::Pending(index) | SlotPhase::Delivered(index) => Some(index),
            SlotPhase::Terminal => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.phase == SlotPhase::Terminal
    }

    /// URL the renderer should currently display
    pub fn current_url(&self) -> Option<&str> {
        self.candidate_index().and_then(|index| self.candidates.get(index))
    }

    /// Apply one delivery report.
    pub fn reduce(self, report: DeliveryReport) -> Self {
        let phase = match (self.phase, report.outcome) {
            (SlotPhase::Pending(index), _) if index != report.candidate => self.phase,
            (SlotPhase::Pending(index), DeliveryOutcome::Success) => SlotPhase::Delivered(index),
            (SlotPhase::Pending(index), DeliveryOutcome::Failure) => {
                if index + 1 < self.candidates.len() {
                    SlotPhase::Pending(index + 1)
                } else {
                    SlotPhase::Terminal
                }
            }
            (SlotPhase::Delivered(_), _) | (SlotPhase::Terminal, _) => self.phase,
        };

        Self { phase, ..self }
    }

    /// What the renderer should do in the current phase
    pub fn directive(&self) -> Directive {
        match self.phase {
            SlotPhase::Pending(candidate) => Directive::Attempt {
                candidate,
                url: self.candidates[candidate].to_string(),
            },
            SlotPhase::Delivered(_) => Directive::Unchanged,
            SlotPhase::Terminal if self.identifier.is_none() || self.candidates.is_empty() => {
                Directive::Placeholder(PlaceholderReason::NoAsset)
            }
            SlotPhase::Terminal => Directive::Placeholder(PlaceholderReason::Exhausted),
        }
    }
}

/// Fallback states for a set of slots, keyed by slot identity.
///
/// Slots are fully independent: a report for one key never touches another.
#[derive(Debug, Clone)]
pub struct FallbackController<K> {
    resolver: Resolver,
    slots: HashMap<K, FallbackState>,
}

impl<K> FallbackController<K>
where
    K: Eq + Hash + Clone + Debug,
{
    pub fn new(resolver: Resolver) -> Self {
        Self {
            resolver,
            slots: HashMap::new(),
        }
    }

    /// Mount a slot (or re-render an existing one).
    ///
    /// Re-rendering with the same identifier and kind keeps the existing
    /// state; a different identifier or kind starts a fresh walk.
    pub fn mount(&mut self, key: K, identifier: Option<&str>, kind: MediaKind) -> Directive {
        let fresh = FallbackState::resolve(&self.resolver, identifier, kind);

        if let Some(existing) = self.slots.get(&key) {
            if existing.identifier == fresh.identifier && existing.kind == fresh.kind {
                return existing.directive();
            }
        }

        let directive = fresh.directive();
        self.slots.insert(key, fresh);
        directive
    }

    /// Feed a delivery report into a slot. Returns `None` for unknown slots.
    pub fn report(&mut self, key: &K, report: DeliveryReport) -> Option<Directive> {
        let state = self.slots.remove(key)?;
        let before = state.phase;
        let after = state.reduce(report);

        let directive = if after.phase == before {
            Directive::Unchanged
        } else {
            match after.phase {
                SlotPhase::Pending(index) => {
                    debug!(slot = ?key, from = ?before, candidate = index, "Advancing to fallback candidate");
                    after.directive()
                }
                SlotPhase::Terminal => {
                    debug!(slot = ?key, from = ?before, "All candidates exhausted");
                    after.directive()
                }
                SlotPhase::Delivered(_) => Directive::Unchanged,
            }
        };

        self.slots.insert(key.clone(), after);
        Some(directive)
    }

    /// Drop a slot's state
    pub fn unmount(&mut self, key: &K) -> Option<FallbackState> {
        self.slots.remove(key)
    }

    pub fn state(&self, key: &K) -> Option<&FallbackState> {
        self.slots.get(key)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl<K> Default for FallbackController<K>
where
    K: Eq + Hash + Clone + Debug,
{
    fn default() -> Self {
        Self::new(Resolver::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image_state(id: &str) -> FallbackState {
        FallbackState::resolve(&Resolver::default(), Some(id), MediaKind::Image)
    }

    #[test]
    fn test_two_failures_reach_terminal() {
        let state = image_state("abc");
        assert_eq!(state.phase(), SlotPhase::Pending(0));

        let state = state.reduce(DeliveryReport::failure(0));
        assert_eq!(state.phase(), SlotPhase::Pending(1));
        assert!(state.current_url().unwrap().contains("thumbnail"));

        let state = state.reduce(DeliveryReport::failure(1));
        assert_eq!(state.phase(), SlotPhase::Terminal);
        assert_eq!(
            state.directive(),
            Directive::Placeholder(PlaceholderReason::Exhausted)
        );
    }

    #[test]
    fn test_success_freezes_at_index() {
        let first = image_state("abc").reduce(DeliveryReport::success(0));
        assert_eq!(first.phase(), SlotPhase::Delivered(0));
        assert_eq!(first.clone().reduce(DeliveryReport::failure(0)).phase(), SlotPhase::Delivered(0));

        let second = image_state("abc")
            .reduce(DeliveryReport::failure(0))
            .reduce(DeliveryReport::success(1));
        assert_eq!(second.phase(), SlotPhase::Delivered(1));

        // A late success for the full-resolution URL does not re-promote
        let second = second.reduce(DeliveryReport::success(0));
        assert_eq!(second.phase(), SlotPhase::Delivered(1));
        assert_eq!(second.directive(), Directive::Unchanged);
    }

    #[test]
    fn test_video_failure_goes_straight_to_terminal() {
        let state = FallbackState::resolve(&Resolver::default(), Some("v1"), MediaKind::Video);
        assert_eq!(state.phase(), SlotPhase::Pending(0));

        let state = state.reduce(DeliveryReport::failure(0));
        assert!(state.is_terminal());
    }

    #[test]
    fn test_missing_identifier_starts_terminal() {
        let state = FallbackState::resolve(&Resolver::default(), Some("  "), MediaKind::Avatar);
        assert!(state.is_terminal());
        assert_eq!(state.current_url(), None);
        assert_eq!(
            state.directive(),
            Directive::Placeholder(PlaceholderReason::NoAsset)
        );
    }

    #[test]
    fn test_stale_reports_are_ignored() {
        let state = image_state("abc").reduce(DeliveryReport::failure(0));
        // Second failure report for candidate 0 arrives late
        let state = state.reduce(DeliveryReport::failure(0));
        assert_eq!(state.phase(), SlotPhase::Pending(1));
    }

    #[test]
    fn test_terminal_is_absorbing() {
        let state = image_state("abc")
            .reduce(DeliveryReport::failure(0))
            .reduce(DeliveryReport::failure(1));

        let state = state.reduce(DeliveryReport::success(1));
        assert!(state.is_terminal());
    }

    #[test]
    fn test_controller_slots_are_independent() {
        let mut controller: FallbackController<&str> = FallbackController::default();

        let first = controller.mount("hero", Some("a"), MediaKind::Image);
        let second = controller.mount("gallery", Some("b"), MediaKind::Image);
        assert!(matches!(first, Directive::Attempt { candidate: 0, .. }));
        assert!(matches!(second, Directive::Attempt { candidate: 0, .. }));

        let directive = controller.report(&"hero", DeliveryReport::failure(0));
        match directive {
            Some(Directive::Attempt { candidate, url }) => {
                assert_eq!(candidate, 1);
                assert!(url.contains("thumbnail?id=a"));
            }
            other => panic!("Expected Attempt, got {:?}", other),
        }

        assert_eq!(
            controller.state(&"gallery").map(FallbackState::phase),
            Some(SlotPhase::Pending(0))
        );
    }

    #[test]
    fn test_controller_exhaustion_and_unmount() {
        let mut controller: FallbackController<u32> = FallbackController::default();
        controller.mount(7, Some("a"), MediaKind::Cover);

        controller.report(&7, DeliveryReport::failure(0));
        let directive = controller.report(&7, DeliveryReport::failure(1));
        assert_eq!(
            directive,
            Some(Directive::Placeholder(PlaceholderReason::Exhausted))
        );

        // Further reports change nothing
        assert_eq!(
            controller.report(&7, DeliveryReport::failure(1)),
            Some(Directive::Unchanged)
        );

        assert!(controller.unmount(&7).is_some());
        assert!(controller.is_empty());
        assert_eq!(controller.report(&7, DeliveryReport::failure(0)), None);
    }

    #[test]
    fn test_remount_keeps_or_resets_state() {
        let mut controller: FallbackController<u32> = FallbackController::default();
        controller.mount(1, Some("a"), MediaKind::Image);
        controller.report(&1, DeliveryReport::failure(0));

        // Same identifier: keep the walk where it is
        let directive = controller.mount(1, Some("a"), MediaKind::Image);
        assert!(matches!(directive, Directive::Attempt { candidate: 1, .. }));

        // New identifier: start over
        let directive = controller.mount(1, Some("b"), MediaKind::Image);
        assert!(matches!(directive, Directive::Attempt { candidate: 0, .. }));
    }
}
