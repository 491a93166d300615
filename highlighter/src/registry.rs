//! The `HtmlHighlighter` registry: a single type that owns the query sets,
//! their active highlights, and the cursor over them.
//!
//! Mutating calls (`add`, `append`, `remove`, `enable`, `disable`, `clear`)
//! don't touch the DOM themselves - they queue an [`Action`] and return
//! immediately. [`HtmlHighlighter::apply`] drains the queue against a live
//! `&mut Document` in one batch. Each queue entry is data, not a captured
//! closure, so `apply` can log and skip a bad entry instead of invoking an
//! opaque callback that might panic.

use hashbrown::HashMap;
use html_highlighter_dom::{Document, NodeId};
use slotmap::{new_key_type, SlotMap};
use tracing::{debug, instrument, warn};

use crate::css;
use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::finder::{self, Subject};
use crate::highlight::{self, HighlightStyle};
use crate::options::Options;
use crate::range::Range;
use crate::text_content::TextContent;

new_key_type! {
    /// Identifies one registered query set (a name plus the subjects it
    /// searches for).
    pub struct QuerySetId;
}

/// A registered name, its search subjects, and the contiguous highlight-id
/// range it owns.
struct QuerySet {
    name: String,
    subjects: Vec<Subject>,
    enabled: bool,
    /// CSS-variant selector, fixed for the lifetime of the set; reused by
    /// `append`.
    id_highlight: u32,
    /// First highlight id owned by this set; ids `[id, id+length)` are
    /// exclusively its own.
    id: u64,
    /// Current highlight count.
    length: usize,
    /// If set, caps additional highlights this set may ever hold; slack
    /// between `length` and `reserve` is reusable id-space for a later
    /// `append`.
    reserve: Option<usize>,
}

/// One active highlight: the wrapper elements currently rendering it, which
/// query set produced it, and the absolute char span it covers.
///
/// The span is kept as a pair of absolute offsets, not a resolved [`Range`]:
/// `apply` only refreshes `self.content` once, at the very end, after every
/// queued action's splits have already mutated the DOM, so a `Range` (whose
/// `PositionDescriptor`s are marker-table indices) captured mid-`apply`
/// would be resolved against a `TextContent` generation that no longer
/// matches the live marker table by the time a caller reads it. Absolute
/// offsets are stable across splits (splitting only subdivides a node, it
/// never changes character counts), so they survive a `refresh()` unscathed
/// - [`HtmlHighlighter::next`]/`prev`/`current_range` re-resolve a `Range`
/// from them against whatever `TextContent` is current on every read.
struct Marker {
    id: u64,
    query_set: QuerySetId,
    wrappers: Vec<NodeId>,
    enabled: bool,
    offset: u32,
    end_offset: u32,
}

/// Counts exposed for diagnostics/telemetry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// Number of registered query sets.
    pub queries: usize,
    /// Number of enabled highlights across all sets.
    pub total: usize,
    /// Next `id_highlight` to be assigned, in `[0, max_highlight)`.
    pub highlight: u32,
}

/// A host text selection, mirroring the DOM `Selection` API's
/// `anchorNode`/`anchorOffset`/`focusNode`/`focusOffset`: a caret position is
/// identified by a text node plus an offset *between* characters, not a
/// character index, which is why same-node length is `|focus - anchor|`
/// rather than `|focus - anchor| + 1`.
#[derive(Debug, Clone, Copy)]
pub struct HostSelection {
    pub anchor_node: NodeId,
    pub anchor_offset: u32,
    pub focus_node: NodeId,
    pub focus_offset: u32,
}

enum Action {
    Add(QuerySetId),
    Append(QuerySetId),
    Remove(QuerySetId),
    Enable(QuerySetId),
    Disable(QuerySetId),
    Clear(bool),
}

pub struct HtmlHighlighter {
    container: NodeId,
    options: Options,
    query_sets: SlotMap<QuerySetId, QuerySet>,
    name_index: HashMap<String, QuerySetId>,
    /// Highlight markers, kept sorted by `offset`, populated by
    /// binary-search insertion as each hit wraps.
    markers: Vec<Marker>,
    queue: Vec<Action>,
    next_id: u64,
    next_id_highlight: u32,
    iterable: Option<Vec<QuerySetId>>,
    cursor: Cursor,
    content: TextContent,
}

impl HtmlHighlighter {
    pub fn new(doc: &Document, container: NodeId, options: Options) -> Self {
        let content = TextContent::build(doc, container);
        HtmlHighlighter {
            container,
            options,
            query_sets: SlotMap::with_key(),
            name_index: HashMap::new(),
            markers: Vec::new(),
            queue: Vec::new(),
            next_id: 0,
            next_id_highlight: 0,
            iterable: None,
            cursor: Cursor::new(),
            content,
        }
    }

    /// Registers a new query set under `name` and queues a full find for
    /// it. If `name` is already registered, the existing set is torn down
    /// first: its removal is enqueued ahead of this `Add`, so `apply` drains
    /// it before the new set's hits are wrapped. `reserve`, if set, caps how
    /// many hits this set will ever wrap; call [`Self::apply`] to actually
    /// run the search.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        subjects: Vec<Subject>,
        enabled: bool,
        reserve: Option<usize>,
    ) -> QuerySetId {
        let name = name.into();
        if let Some(&old) = self.name_index.get(&name) {
            self.queue.push(Action::Remove(old));
        }
        let id = self.query_sets.insert(QuerySet {
            name: name.clone(),
            subjects,
            enabled,
            id_highlight: 0,
            id: 0,
            length: 0,
            reserve,
        });
        self.name_index.insert(name, id);
        self.queue.push(Action::Add(id));
        id
    }

    /// Adds more subjects to an existing query set and queues finding just
    /// those, leaving its current highlights in place.
    pub fn append(&mut self, query_set: QuerySetId, subjects: Vec<Subject>) -> Result<()> {
        let set = self
            .query_sets
            .get_mut(query_set)
            .ok_or_else(|| Error::UnknownQuerySet(format!("{query_set:?}")))?;
        set.subjects.extend(subjects);
        self.queue.push(Action::Append(query_set));
        Ok(())
    }

    /// Queues removal of an entire query set: every highlight it owns is
    /// unwrapped and its registry entry dropped.
    pub fn remove(&mut self, query_set: QuerySetId) {
        self.queue.push(Action::Remove(query_set));
    }

    pub fn enable(&mut self, query_set: QuerySetId) {
        self.queue.push(Action::Enable(query_set));
    }

    pub fn disable(&mut self, query_set: QuerySetId) {
        self.queue.push(Action::Disable(query_set));
    }

    /// Queues removal of every query set. `reset` additionally zeroes the
    /// id and `id_highlight` counters once the registry is empty, so a
    /// fresh `add` afterwards starts exactly as it would on a brand new
    /// highlighter.
    pub fn clear(&mut self, reset: bool) {
        self.queue.push(Action::Clear(reset));
    }

    /// Drains the action queue against `doc`, performing the DOM writes the
    /// queued operations imply. Each action is applied independently: a
    /// failure (unknown query set, bad regex) is logged and that action is
    /// skipped - it never aborts the remaining queue. Refreshes the cached
    /// `TextContent` once at the end, since wrapping/unwrapping changes
    /// node identities (not offsets) in the flat projection.
    #[instrument(skip(self, doc))]
    pub fn apply(&mut self, doc: &mut Document) -> Result<()> {
        let actions = std::mem::take(&mut self.queue);
        for action in actions {
            let result = match action {
                Action::Add(id) => self.apply_find(doc, id, true),
                Action::Append(id) => self.apply_find(doc, id, false),
                Action::Remove(id) => {
                    self.apply_remove_query_set(doc, id);
                    Ok(())
                }
                Action::Enable(id) => self.apply_set_enabled(doc, id, true),
                Action::Disable(id) => self.apply_set_enabled(doc, id, false),
                Action::Clear(reset) => {
                    self.apply_clear(doc, reset);
                    Ok(())
                }
            };
            if let Err(err) = result {
                warn!(error = %err, "dropping failed action");
            }
        }
        self.refresh(doc);
        Ok(())
    }

    fn apply_find(&mut self, doc: &mut Document, query_set: QuerySetId, is_add: bool) -> Result<()> {
        let (name, enabled, subjects, reserve, base_id, base_length, id_highlight) = {
            let set = self
                .query_sets
                .get(query_set)
                .ok_or_else(|| Error::UnknownQuerySet(format!("{query_set:?}")))?;
            (
                set.name.clone(),
                set.enabled,
                set.subjects.clone(),
                set.reserve,
                set.id,
                set.length,
                set.id_highlight,
            )
        };

        let (base_id, id_highlight) = if is_add {
            let id = self.next_id;
            let id_highlight = self.next_id_highlight;
            self.next_id_highlight = next_highlight_id(id_highlight, self.options.max_highlight);
            if let Some(set) = self.query_sets.get_mut(query_set) {
                set.id = id;
                set.id_highlight = id_highlight;
                set.length = 0;
            }
            (id, id_highlight)
        } else {
            (base_id, id_highlight)
        };

        // Slack: reserved-but-unused id slots from a prior `add`, which
        // `append` fills before minting fresh ids appended at the end with
        // no further gap protection. `add` itself is capped directly by
        // `reserve` below instead of going through slack.
        let slack = if is_add { 0 } else { reserve.map(|r| r.saturating_sub(base_length)).unwrap_or(0) };

        // Phase 1: run every subject's finder against the unchanged
        // `self.content` snapshot and decide, in document order, which hits
        // are kept (subject to `reserve`) and what id each gets. No DOM
        // mutation happens in this phase, so these lookups never see a text
        // node some earlier hit has already split.
        struct PendingHit {
            id: u64,
            offset: u32,
            end_offset: u32,
            range: Range,
        }
        let mut pending: Vec<PendingHit> = Vec::new();
        let mut dropped = 0usize;
        for subject in &subjects {
            let mut finder = match finder::make_finder(&self.content, subject) {
                Ok(f) => f,
                Err(err) => {
                    warn!(query = %name, error = %err, "skipping query: finder construction failed");
                    continue;
                }
            };
            while let Some(range) = finder.next(doc, &self.content, self.container) {
                let idx = pending.len();
                // `add`'s own hits are capped at `reserve` directly; once
                // reached, every further hit (in this subject or a later
                // one) is counted as dropped rather than kept.
                if is_add {
                    if let Some(r) = reserve {
                        if idx >= r {
                            dropped += 1;
                            continue;
                        }
                    }
                }

                let Some(offset) = range.start.absolute(&self.content) else {
                    debug!(query = %name, "range start no longer resolves, skipping");
                    continue;
                };
                let Some(end_offset) = range.end.absolute(&self.content) else {
                    debug!(query = %name, "range end no longer resolves, skipping");
                    continue;
                };
                let id = if idx < slack {
                    // Fill the reserved gap this set's original `add` left
                    // unused, keeping the id contiguous within it.
                    base_id + base_length as u64 + idx as u64
                } else if is_add {
                    base_id + idx as u64
                } else {
                    // Slack exhausted (or none was ever reserved): mint a
                    // fresh global id, appended at the end.
                    let id = self.next_id;
                    self.next_id += 1;
                    id
                };
                pending.push(PendingHit { id, offset, end_offset, range });
            }
        }
        if dropped > 0 {
            let err = Error::ReserveExceeded {
                name: name.clone(),
                reserve: reserve.unwrap_or_default(),
                dropped,
            };
            warn!(error = %err, "reserve exceeded, dropped excess hit(s)");
        }

        // Ids are handed out over every kept pending hit in phase 1, above,
        // before phase 2 knows whether any given hit will actually wrap -
        // capture that count now so a later wrap failure can't shrink how
        // far `next_id` advances below an id a marker already holds.
        let pending_count = pending.len();

        // Phase 2: split and wrap, highest offset first. `Document::split_text`
        // only ever shrinks a node from the right, so a hit that shares a text
        // node with a higher-offset hit always still finds its own prefix
        // intact by the time its turn comes, regardless of how many
        // higher-offset hits in that same node were wrapped first.
        pending.sort_by_key(|hit| std::cmp::Reverse(hit.offset));

        let use_query_as_class = self.options.use_query_as_class;
        let mut wrapped = 0usize;
        for hit in pending {
            let style = HighlightStyle {
                id: hit.id,
                id_highlight,
                query: &name,
                use_query_as_class,
                disabled: !enabled,
            };
            let Some(wrappers) =
                highlight::highlight(doc, &self.content, self.container, &hit.range, &style)
            else {
                debug!(query = %name, "range failed to resolve against current DOM, skipping");
                continue;
            };
            self.insert_marker(Marker {
                id: hit.id,
                query_set,
                wrappers,
                enabled,
                offset: hit.offset,
                end_offset: hit.end_offset,
            });
            wrapped += 1;
        }

        if let Some(set) = self.query_sets.get_mut(query_set) {
            set.length = base_length + wrapped;
        }

        if is_add {
            // `pending_count` (not `wrapped`) ids were already committed in
            // phase 1 - a wrap failure leaves its id permanently unused, but
            // that id must still not be handed to anything else.
            match reserve {
                Some(r) if r > pending_count => self.next_id = base_id + r as u64,
                _ => self.next_id = base_id + pending_count as u64,
            }
        }
        // `append`'s fresh-id branch above already advanced `self.next_id`
        // one hit at a time; slack-consuming hits never touch it.

        Ok(())
    }

    fn apply_remove_query_set(&mut self, doc: &mut Document, query_set: QuerySetId) {
        let ids: Vec<u64> = self
            .markers
            .iter()
            .filter(|m| m.query_set == query_set)
            .map(|m| m.id)
            .collect();
        for id in ids {
            self.unhighlight_one(doc, id);
        }
        if let Some(set) = self.query_sets.remove(query_set) {
            if self.name_index.get(&set.name) == Some(&query_set) {
                self.name_index.remove(&set.name);
            }
        }
        if self.options.normalise {
            doc.normalize(self.container);
        }
    }

    fn unhighlight_one(&mut self, doc: &mut Document, id: u64) {
        highlight::unhighlight(doc, self.container, id);
        self.markers.retain(|m| m.id != id);
        if self.cursor.current() == Some(id) {
            self.cursor.clear();
        }
    }

    fn apply_set_enabled(&mut self, doc: &mut Document, query_set: QuerySetId, enabled: bool) -> Result<()> {
        let set = self
            .query_sets
            .get_mut(query_set)
            .ok_or_else(|| Error::UnknownQuerySet(format!("{query_set:?}")))?;
        set.enabled = enabled;
        for marker in self.markers.iter_mut().filter(|m| m.query_set == query_set) {
            marker.enabled = enabled;
            for &wrapper in &marker.wrappers {
                if let Some(el) = doc.element_mut(wrapper) {
                    if enabled {
                        el.remove_class(css::DISABLED_CLASS);
                    } else {
                        el.add_class(css::DISABLED_CLASS);
                    }
                }
            }
        }
        Ok(())
    }

    fn apply_clear(&mut self, doc: &mut Document, reset: bool) {
        let ids: Vec<QuerySetId> = self.query_sets.keys().collect();
        for id in ids {
            self.apply_remove_query_set(doc, id);
        }
        debug_assert!(self.query_sets.is_empty());
        debug_assert!(self.markers.is_empty());
        self.cursor.clear();
        if reset {
            self.next_id = 0;
            self.next_id_highlight = 0;
        }
    }

    /// Inserts `marker` at the position that keeps [`Self::markers`] sorted
    /// by `offset`, ties going after any existing equal offset.
    fn insert_marker(&mut self, marker: Marker) {
        let pos = self.markers.partition_point(|m| m.offset <= marker.offset);
        self.markers.insert(pos, marker);
    }

    /// Rebuilds the cached flat projection from `doc`. `apply` calls this
    /// itself; expose it for callers who mutate the DOM outside this
    /// registry and need the next `add`/`append` to see current text.
    pub fn refresh(&mut self, doc: &Document) {
        self.content.refresh(doc, self.container);
    }

    /// Restricts `next`/`prev` to the named query sets. `None` makes every
    /// enabled highlight eligible again.
    pub fn set_iterable_queries(&mut self, queries: Option<Vec<QuerySetId>>) {
        self.iterable = queries;
    }

    /// Ids of currently-eligible highlights (enabled, and in the
    /// `iterable` whitelist if one is set), ordered by where they start in
    /// the flat text projection - [`Self::markers`] is already sorted this
    /// way, so this is a linear filter, not a re-sort.
    fn eligible(&self) -> Vec<u64> {
        self.markers
            .iter()
            .filter(|m| m.enabled)
            .filter(|m| match &self.iterable {
                Some(allowed) => allowed.contains(&m.query_set),
                None => true,
            })
            .map(|m| m.id)
            .collect()
    }

    pub fn next(&mut self) -> Option<Range> {
        let eligible = self.eligible();
        let id = self.cursor.advance(&eligible, false)?;
        self.range_of(id)
    }

    pub fn prev(&mut self) -> Option<Range> {
        let eligible = self.eligible();
        let id = self.cursor.advance(&eligible, true)?;
        self.range_of(id)
    }

    /// The range the cursor currently points at, if any.
    pub fn current_range(&self) -> Option<Range> {
        let id = self.cursor.current()?;
        self.range_of(id)
    }

    /// Re-resolves a marker's absolute char span against the current
    /// `self.content`. Markers only ever store absolute offsets (stable
    /// across splits), never marker-table indices, precisely so this always
    /// reads a correct span even though `self.content` has been rebuilt
    /// (and every text node's marker-table index reshuffled) since the
    /// highlight was created.
    fn range_of(&self, id: u64) -> Option<Range> {
        let marker = self.markers.iter().find(|m| m.id == id)?;
        Range::from_absolute(&self.content, marker.offset, marker.end_offset)
    }

    /// Converts a host text selection into a [`Range`] over the current
    /// `TextContent`: both endpoints must land on text nodes this
    /// projection knows about, and a zero-length selection (anchor ==
    /// focus) isn't representable.
    pub fn selected_range(&self, selection: &HostSelection) -> Option<Range> {
        let anchor_marker = self.content.find(selection.anchor_node)?;
        let focus_marker = self.content.find(selection.focus_node)?;
        let anchor_abs = self.content.at(anchor_marker)?.offset + selection.anchor_offset;
        let focus_abs = self.content.at(focus_marker)?.offset + selection.focus_offset;
        if anchor_abs == focus_abs {
            return None;
        }
        let (start_abs, end_abs) = if anchor_abs < focus_abs {
            (anchor_abs, focus_abs - 1)
        } else {
            (focus_abs, anchor_abs - 1)
        };
        Range::from_absolute(&self.content, start_abs, end_abs)
    }

    /// Resets the cursor.
    pub fn clear_selected_range(&mut self) {
        self.cursor.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Ids of every currently-registered query set, in no particular order.
    pub fn query_set_ids(&self) -> impl Iterator<Item = QuerySetId> + '_ {
        self.query_sets.keys()
    }

    /// The highest id currently assigned within `query_set`, if it owns any
    /// highlights - derived directly from its contiguous `[id, id+length)`
    /// range rather than scanning markers.
    pub fn last_id_of(&self, query_set: QuerySetId) -> Option<u64> {
        let set = self.query_sets.get(query_set)?;
        (set.length > 0).then(|| set.id + set.length as u64 - 1)
    }

    pub fn stats(&self) -> Stats {
        Stats {
            queries: self.query_sets.len(),
            total: self.markers.iter().filter(|m| m.enabled).count(),
            highlight: self.next_id_highlight,
        }
    }

    pub fn text_content(&self) -> &TextContent {
        &self.content
    }

    /// Debug invariant check run after `apply`: the marker list is sorted
    /// and its length matches `Σ q.length` across every query set.
    pub fn assert_invariants(&self) -> Result<()> {
        if !self.markers.is_sorted_by_key(|m| m.offset) {
            return Err(Error::InvariantViolation("markers must be sorted by offset".into()));
        }
        let total_length: usize = self.query_sets.values().map(|q| q.length).sum();
        if self.markers.len() != total_length {
            return Err(Error::InvariantViolation(format!(
                "marker count {} does not match sum of query-set lengths {total_length}",
                self.markers.len()
            )));
        }
        if !(0..self.options.max_highlight).contains(&self.next_id_highlight) && self.options.max_highlight > 0 {
            return Err(Error::InvariantViolation("id_highlight out of range".into()));
        }
        self.content.assert_invariants()
    }
}

/// `(id_highlight + 1) mod max_highlight`, guarding against `max_highlight ==
/// 0` (a caller bug - `max_highlight` should always be at least 1) by
/// treating it as "never rotates" rather than dividing by zero.
fn next_highlight_id(current: u32, max_highlight: u32) -> u32 {
    if max_highlight == 0 {
        return 0;
    }
    (current + 1) % max_highlight
}

#[cfg(test)]
mod tests {
    use super::*;
    use html_highlighter_dom::parse;

    #[test]
    fn add_then_apply_wraps_every_match() {
        let mut doc = parse("<p>cat hat cat</p>");
        let container = doc.root();
        let mut hh = HtmlHighlighter::new(&doc, container, Options::default());
        let qs = hh.add("cats", vec![Subject::Literal("cat".into())], true, None);
        hh.apply(&mut doc).unwrap();

        assert_eq!(hh.stats().total, 2);
        assert_eq!(hh.last_id_of(qs), Some(1));
        hh.assert_invariants().unwrap();
    }

    #[test]
    fn successive_add_calls_rotate_id_highlight() {
        let mut doc = parse("<p>cat hat cat</p>");
        let container = doc.root();
        let mut options = Options::default();
        options.max_highlight = 2;
        let mut hh = HtmlHighlighter::new(&doc, container, options);
        hh.add("a", vec![Subject::Literal("cat".into())], true, None);
        hh.apply(&mut doc).unwrap();
        assert_eq!(hh.stats().highlight, 1);

        hh.add("b", vec![Subject::Literal("hat".into())], true, None);
        hh.apply(&mut doc).unwrap();
        assert_eq!(hh.stats().highlight, 0);
    }

    #[test]
    fn disable_adds_disabled_class_without_removing_markers() {
        let mut doc = parse("<p>cat hat cat</p>");
        let container = doc.root();
        let mut hh = HtmlHighlighter::new(&doc, container, Options::default());
        let qs = hh.add("cats", vec![Subject::Literal("cat".into())], true, None);
        hh.apply(&mut doc).unwrap();
        assert_eq!(hh.stats().total, 2);

        hh.disable(qs);
        hh.apply(&mut doc).unwrap();
        assert_eq!(hh.stats().total, 0);
    }

    #[test]
    fn remove_unwraps_and_drops_the_query_set() {
        let mut doc = parse("<p>cat hat cat</p>");
        let container = doc.root();
        let mut hh = HtmlHighlighter::new(&doc, container, Options::default());
        let qs = hh.add("cats", vec![Subject::Literal("cat".into())], true, None);
        hh.apply(&mut doc).unwrap();
        assert_eq!(hh.stats().total, 2);
        assert_eq!(hh.stats().queries, 1);

        hh.remove(qs);
        hh.apply(&mut doc).unwrap();
        assert_eq!(hh.stats().total, 0);
        assert_eq!(hh.stats().queries, 0);
        assert!(hh.is_empty());
    }

    #[test]
    fn reserve_caps_hits_and_advances_past_the_gap() {
        let mut doc = parse("<p>a a a a a</p>");
        let container = doc.root();
        let mut hh = HtmlHighlighter::new(&doc, container, Options::default());
        let as_set = hh.add("as", vec![Subject::Literal("a".into())], true, Some(2));
        hh.apply(&mut doc).unwrap();
        assert_eq!(hh.stats().total, 2);
        assert_eq!(hh.last_id_of(as_set), Some(1));

        // A second query set's ids must start beyond the reserved gap (2),
        // not collide with the unused slot.
        let bs = hh.add("bs", vec![Subject::Literal("a".into())], true, None);
        hh.apply(&mut doc).unwrap();
        assert_eq!(hh.last_id_of(bs), Some(2 + 4));
    }

    #[test]
    fn append_consumes_reserved_slack_then_mints_fresh_ids_once_exhausted() {
        let mut doc = parse("<p>a b a b a c d e</p>");
        let container = doc.root();
        let mut hh = HtmlHighlighter::new(&doc, container, Options::default());
        // "a" matches 3 times; reserve 5 leaves 2 unused slots for `append`.
        let qs = hh.add("letters", vec![Subject::Literal("a".into())], true, Some(5));
        hh.apply(&mut doc).unwrap();
        assert_eq!(hh.last_id_of(qs), Some(2));

        // Consumes one reserved slot (id 3).
        hh.append(qs, vec![Subject::Literal("c".into())]).unwrap();
        hh.apply(&mut doc).unwrap();
        assert_eq!(hh.last_id_of(qs), Some(3));

        // Consumes the last reserved slot (id 4) - reserve is now exhausted.
        hh.append(qs, vec![Subject::Literal("d".into())]).unwrap();
        hh.apply(&mut doc).unwrap();
        assert_eq!(hh.last_id_of(qs), Some(4));

        // Reserve exhausted: mints a fresh id appended at the end rather
        // than reusing any slot.
        hh.append(qs, vec![Subject::Literal("e".into())]).unwrap();
        hh.apply(&mut doc).unwrap();
        assert_eq!(hh.last_id_of(qs), Some(5));

        // A later query set's ids must not collide with that fresh id.
        let other = hh.add("other", vec![Subject::Literal("b".into())], true, None);
        hh.apply(&mut doc).unwrap();
        assert_eq!(hh.last_id_of(other), Some(6 + 1));
    }

    #[test]
    fn rename_collision_removes_the_old_set_first() {
        let mut doc = parse("<p>cat hat cat</p>");
        let container = doc.root();
        let mut hh = HtmlHighlighter::new(&doc, container, Options::default());
        hh.add("cats", vec![Subject::Literal("cat".into())], true, None);
        hh.apply(&mut doc).unwrap();
        assert_eq!(hh.stats().queries, 1);

        hh.add("cats", vec![Subject::Literal("hat".into())], true, None);
        hh.apply(&mut doc).unwrap();
        assert_eq!(hh.stats().queries, 1);
        assert_eq!(hh.stats().total, 1);
    }

    #[test]
    fn clear_drops_every_query_set() {
        let mut doc = parse("<p>cat hat cat</p>");
        let container = doc.root();
        let mut hh = HtmlHighlighter::new(&doc, container, Options::default());
        hh.add("cats", vec![Subject::Literal("cat".into())], true, None);
        hh.add("hats", vec![Subject::Literal("hat".into())], true, None);
        hh.apply(&mut doc).unwrap();
        assert_eq!(hh.stats().queries, 2);

        hh.clear(true);
        hh.apply(&mut doc).unwrap();
        assert_eq!(hh.stats().queries, 0);
        assert!(hh.is_empty());
        assert_eq!(hh.stats().highlight, 0);
    }

    #[test]
    fn cursor_cycles_through_eligible_markers_in_offset_order() {
        let mut doc = parse("<p>cat hat cat</p>");
        let container = doc.root();
        let mut hh = HtmlHighlighter::new(&doc, container, Options::default());
        hh.add("cats", vec![Subject::Literal("cat".into())], true, None);
        hh.apply(&mut doc).unwrap();

        let first = hh.next().unwrap();
        let second = hh.next().unwrap();
        assert_ne!(first, second);
        let wrapped = hh.next().unwrap();
        assert_eq!(wrapped, first);

        hh.clear_selected_range();
        assert!(hh.current_range().is_none());
    }
}
