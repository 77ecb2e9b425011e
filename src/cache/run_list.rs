use std::collections::{BTreeMap, HashMap};

use slotmap::{SlotMap, new_key_type};

use crate::run_key::GlyphRunKey;

use super::glyph_run::GlyphRun;

new_key_type! {
    /// Handle of a run inside one [`GlyphRunCache`].
    ///
    /// Handles are generation checked: a handle to a removed run never
    /// resolves to a run inserted later.
    pub struct RunId;
}

#[derive(Debug)]
struct RunNode<I> {
    run: GlyphRun<I>,
    newer: Option<RunId>,
    older: Option<RunId>,
}

/// LRU list of text runs with two lookup indices.
///
/// The list owns the runs; `head` is the most recently used one and `tail`
/// the next to be evicted. `by_key` finds a run by its exact key. `by_text`
/// remembers the most recently inserted run for each text and is only a
/// hint: removing any run with a given text drops that text's entry.
///
/// Inserting a key that is already present is a caller bug. Look the key up
/// first and promote on a hit.
#[derive(Debug)]
pub struct GlyphRunCache<I> {
    nodes: SlotMap<RunId, RunNode<I>>,
    head: Option<RunId>,
    tail: Option<RunId>,
    by_key: BTreeMap<GlyphRunKey, RunId>,
    by_text: HashMap<String, RunId, fxhash::FxBuildHasher>,
}

impl<I> Default for GlyphRunCache<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I> GlyphRunCache<I> {
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            head: None,
            tail: None,
            by_key: BTreeMap::new(),
            by_text: HashMap::with_hasher(fxhash::FxBuildHasher::default()),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of texts currently indexed by [`Self::find_text`].
    pub fn text_index_len(&self) -> usize {
        self.by_text.len()
    }

    /// Most recently used run.
    pub fn head(&self) -> Option<RunId> {
        self.head
    }

    /// Least recently used run.
    pub fn tail(&self) -> Option<RunId> {
        self.tail
    }

    pub fn find(&self, key: &GlyphRunKey) -> Option<RunId> {
        self.by_key.get(key).copied()
    }

    pub fn find_text(&self, text: &str) -> Option<RunId> {
        self.by_text.get(text).copied()
    }

    pub fn get(&self, id: RunId) -> Option<&GlyphRun<I>> {
        self.nodes.get(id).map(|node| &node.run)
    }

    pub fn get_mut(&mut self, id: RunId) -> Option<&mut GlyphRun<I>> {
        self.nodes.get_mut(id).map(|node| &mut node.run)
    }

    /// Neighbour closer to the head.
    pub fn newer(&self, id: RunId) -> Option<RunId> {
        self.nodes.get(id).and_then(|node| node.newer)
    }

    /// Neighbour closer to the tail.
    pub fn older(&self, id: RunId) -> Option<RunId> {
        self.nodes.get(id).and_then(|node| node.older)
    }

    /// Iterates from the most to the least recently used run.
    pub fn iter(&self) -> Iter<'_, I> {
        Iter {
            cache: self,
            cursor: self.head,
        }
    }
}

impl<I> GlyphRunCache<I> {
    /// Links `run` as the new head and indexes it.
    pub fn insert_first(&mut self, run: GlyphRun<I>) -> RunId {
        debug_assert!(
            !self.by_key.contains_key(run.key()),
            "text run {:?} is already cached",
            run.text()
        );
        if let Some(&existing) = self.by_key.get(run.key()) {
            log::error!(
                "Ignoring insertion of already cached text run {:?}",
                run.text()
            );
            return existing;
        }

        let key = run.key().clone();
        let text = run.text().to_owned();
        let id = self.nodes.insert(RunNode {
            run,
            newer: None,
            older: None,
        });
        self.attach_to_head(id);

        self.by_key.insert(key, id);
        self.by_text.insert(text, id);

        id
    }

    /// Promotes a run to the head. The indices are left untouched.
    pub fn move_to_first(&mut self, id: RunId) {
        if self.head == Some(id) || !self.nodes.contains_key(id) {
            return;
        }

        self.detach(id);
        self.attach_to_head(id);
    }

    /// Unlinks a run and hands it back without destroying it.
    pub fn remove(&mut self, id: RunId) -> Option<GlyphRun<I>> {
        if !self.nodes.contains_key(id) {
            return None;
        }

        self.detach(id);
        let node = self.nodes.remove(id)?;
        self.unindex(&node.run);

        Some(node.run)
    }

    /// Destroys the least recently used run. Returns `false` on an empty list.
    pub fn remove_back(&mut self) -> bool {
        let Some(tail) = self.tail else {
            return false;
        };

        self.remove(tail).is_some()
    }

    /// Destroys up to `count` runs starting from the tail. Returns how many
    /// were removed.
    pub fn remove_back_n(&mut self, count: usize) -> usize {
        let mut cursor = self.tail;
        let mut removed = 0;

        while removed < count {
            let Some(id) = cursor else {
                break;
            };
            let Some(node) = self.nodes.remove(id) else {
                break;
            };
            cursor = node.newer;
            self.unindex(&node.run);
            removed += 1;
        }

        // relink the surviving end once
        self.tail = cursor;
        match cursor {
            Some(new_tail) => self.nodes[new_tail].older = None,
            None => self.head = None,
        }

        removed
    }

    /// Destroys every run.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.head = None;
        self.tail = None;
        self.by_key.clear();
        self.by_text.clear();
    }
}

/// Internal helpers to operate the linked list.
impl<I> GlyphRunCache<I> {
    fn attach_to_head(&mut self, id: RunId) {
        // set node
        let node = &mut self.nodes[id];
        node.newer = None;
        node.older = self.head;

        // update old head
        if let Some(old_head) = self.head {
            self.nodes[old_head].newer = Some(id);
        }

        // update new head and tail
        self.head = Some(id);
        if self.tail.is_none() {
            self.tail = Some(id);
        }
    }

    fn detach(&mut self, id: RunId) {
        let node = &mut self.nodes[id];
        let newer = node.newer.take();
        let older = node.older.take();

        match newer {
            Some(newer) => self.nodes[newer].older = older,
            None => self.head = older,
        }
        match older {
            Some(older) => self.nodes[older].newer = newer,
            None => self.tail = newer,
        }
    }

    fn unindex(&mut self, run: &GlyphRun<I>) {
        let removed = self.by_key.remove(run.key());
        debug_assert!(
            removed.is_some(),
            "text run {:?} missing from key index",
            run.text()
        );
        self.by_text.remove(run.text());
    }
}

/// Iterator over `(RunId, &GlyphRun)` from head to tail.
pub struct Iter<'a, I> {
    cache: &'a GlyphRunCache<I>,
    cursor: Option<RunId>,
}

impl<'a, I> Iterator for Iter<'a, I> {
    type Item = (RunId, &'a GlyphRun<I>);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        let node = self.cache.nodes.get(id)?;
        self.cursor = node.older;
        Some((id, &node.run))
    }
}
