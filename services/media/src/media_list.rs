//! Project media sequencing.
//!
//! A project lists its image and video identifiers separately; the carousel
//! shows them as one sequence with images first, then videos. The sequence
//! is rebuilt whenever the source lists change, never edited in place.

use crate::fallback::{DeliveryReport, Directive, FallbackController, FallbackState};
use crate::resolver::{AssetIdentifier, MediaKind, Resolver};
use serde::Serialize;

/// Kind of a media list entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Image,
    Video,
}

impl From<EntryKind> for MediaKind {
    fn from(kind: EntryKind) -> Self {
        match kind {
            EntryKind::Image => MediaKind::Image,
            EntryKind::Video => MediaKind::Video,
        }
    }
}

/// One element of a project's media sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaEntry {
    pub kind: EntryKind,
    pub identifier: AssetIdentifier,
    /// 0-based carousel position
    pub position: usize,
}

/// Ordered, immutable media sequence for one project
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MediaList {
    entries: Vec<MediaEntry>,
}

impl MediaList {
    /// Merge image and video identifiers into one sequence.
    ///
    /// Blank or malformed identifiers are dropped silently.
    pub fn build<I, V, S, T>(images: I, videos: V) -> Self
    where
        I: IntoIterator<Item = S>,
        V: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        let images = images
            .into_iter()
            .filter_map(|raw| AssetIdentifier::parse_well_formed(raw.as_ref()))
            .map(|id| (EntryKind::Image, id));
        let videos = videos
            .into_iter()
            .filter_map(|raw| AssetIdentifier::parse_well_formed(raw.as_ref()))
            .map(|id| (EntryKind::Video, id));

        let entries = images
            .chain(videos)
            .enumerate()
            .map(|(position, (kind, identifier))| MediaEntry {
                kind,
                identifier,
                position,
            })
            .collect();

        Self { entries }
    }

    pub fn entries(&self) -> &[MediaEntry] {
        &self.entries
    }

    pub fn get(&self, position: usize) -> Option<&MediaEntry> {
        self.entries.get(position)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether next/previous controls should be shown
    pub fn is_navigable(&self) -> bool {
        self.entries.len() > 1
    }

    /// Position after `position`, wrapping to the start
    pub fn next(&self, position: usize) -> usize {
        if !self.is_navigable() {
            return position;
        }
        let len = self.entries.len();
        (position % len + 1) % len
    }

    /// Position before `position`, wrapping to the end
    pub fn previous(&self, position: usize) -> usize {
        if !self.is_navigable() {
            return position;
        }
        let len = self.entries.len();
        (position % len + len - 1) % len
    }
}

/// Shorthand for [`MediaList::build`]
pub fn build<I, V, S, T>(images: I, videos: V) -> MediaList
where
    I: IntoIterator<Item = S>,
    V: IntoIterator<Item = T>,
    S: AsRef<str>,
    T: AsRef<str>,
{
    MediaList::build(images, videos)
}

/// Navigable view over a media list with one fallback slot per entry
#[derive(Debug, Clone)]
pub struct Carousel {
    list: MediaList,
    position: usize,
    slots: FallbackController<usize>,
}

impl Carousel {
    pub fn new(list: MediaList, resolver: Resolver) -> Self {
        let mut slots = FallbackController::new(resolver);
        for entry in list.entries() {
            slots.mount(entry.position, Some(entry.identifier.as_str()), entry.kind.into());
        }

        Self {
            list,
            position: 0,
            slots,
        }
    }

    pub fn list(&self) -> &MediaList {
        &self.list
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Entry on display and its fallback state
    pub fn current(&self) -> Option<(&MediaEntry, &FallbackState)> {
        let entry = self.list.get(self.position)?;
        let state = self.slots.state(&entry.position)?;
        Some((entry, state))
    }

    pub fn next(&mut self) -> usize {
        self.position = self.list.next(self.position);
        self.position
    }

    pub fn previous(&mut self) -> usize {
        self.position = self.list.previous(self.position);
        self.position
    }

    /// Report a delivery outcome for the entry at `position`
    pub fn report(&mut self, position: usize, report: DeliveryReport) -> Option<Directive> {
        self.slots.report(&position, report)
    }

    pub fn slot(&self, position: usize) -> Option<&FallbackState> {
        self.slots.state(&position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback::SlotPhase;

    fn entry(kind: EntryKind, id: &str, position: usize) -> MediaEntry {
        MediaEntry {
            kind,
            identifier: AssetIdentifier::parse(id).unwrap(),
            position,
        }
    }

    #[test]
    fn test_images_precede_videos_and_blanks_drop() {
        let list = build(["a", "", "b"], ["c"]);

        assert_eq!(
            list.entries(),
            &[
                entry(EntryKind::Image, "a", 0),
                entry(EntryKind::Image, "b", 1),
                entry(EntryKind::Video, "c", 2),
            ]
        );
    }

    #[test]
    fn test_malformed_identifiers_drop() {
        let list = build(vec!["ok".to_string(), "bad id".to_string()], ["  ", "v/1", "v2"]);
        let ids: Vec<_> = list.entries().iter().map(|e| e.identifier.as_str()).collect();
        assert_eq!(ids, vec!["ok", "v2"]);
        assert_eq!(list.get(1).map(|e| e.position), Some(1));
    }

    #[test]
    fn test_navigation_wraps() {
        let list = build(["a", "b"], ["c"]);

        assert_eq!(list.next(2), 0);
        assert_eq!(list.previous(0), 2);
        assert_eq!(list.next(0), 1);
        assert_eq!(list.previous(2), 1);
    }

    #[test]
    fn test_navigation_from_out_of_range_position() {
        let list = build(["a", "b"], ["c"]);

        assert_eq!(list.next(usize::MAX), (usize::MAX % 3 + 1) % 3);
        assert_eq!(list.previous(usize::MAX), (usize::MAX % 3 + 2) % 3);
        assert_eq!(list.next(4), 2);
        assert_eq!(list.previous(3), 2);
    }

    #[test]
    fn test_navigation_noop_for_short_lists() {
        let single = build(["a"], Vec::<&str>::new());
        assert!(!single.is_navigable());
        assert_eq!(single.next(0), 0);
        assert_eq!(single.previous(0), 0);

        let empty = MediaList::default();
        assert_eq!(empty.next(0), 0);
        assert_eq!(empty.previous(0), 0);
    }

    #[test]
    fn test_carousel_slots_are_independent() {
        let mut carousel = Carousel::new(build(["a", "b"], ["c"]), Resolver::default());

        carousel.report(0, DeliveryReport::failure(0));
        carousel.report(2, DeliveryReport::failure(0));

        assert_eq!(carousel.slot(0).map(|s| s.phase()), Some(SlotPhase::Pending(1)));
        assert_eq!(carousel.slot(1).map(|s| s.phase()), Some(SlotPhase::Pending(0)));
        assert_eq!(carousel.slot(2).map(|s| s.phase()), Some(SlotPhase::Terminal));
    }

    #[test]
    fn test_carousel_navigation() {
        let mut carousel = Carousel::new(build(["a", "b"], ["c"]), Resolver::default());

        assert_eq!(carousel.previous(), 2);
        let (entry, state) = carousel.current().unwrap();
        assert_eq!(entry.kind, EntryKind::Video);
        assert_eq!(state.kind(), MediaKind::Video);

        assert_eq!(carousel.next(), 0);
        assert_eq!(carousel.next(), 1);
    }
}
