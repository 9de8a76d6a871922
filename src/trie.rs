//! Double-array trie for parameterized route patterns.
//!
//! All patterns that carry a `:param` or `*wildcard` segment are compiled into
//! a single flat BASE/CHECK transition table. Each cell owns at most one
//! incoming edge (`check` stores the edge byte, `0` = unowned) and `base`
//! combined with a byte via XOR yields the next cell index, so a transition is
//! one array probe per input byte. A negative `base` marks a match terminus:
//! `-base` is a 1-based reference into the leaf table.
//!
//! Parameter and wildcard edges are threaded into the same table under the
//! reserved `:` and `*` bytes; the matcher discovers them through two flags on
//! the cell they hang off, recorded as backtrack points during the forward
//! scan and retried deepest-first when literal matching fails.

use std::collections::HashSet;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::error::BuildError;
use crate::path::{self, PARAM_CHARACTER, SEPARATOR_CHARACTER, WILDCARD_CHARACTER};
use crate::router::MAX_INLINE_PARAMS;

/// Reserved pattern-end marker, appended to every parameterized key before
/// construction so a pattern that is a strict prefix of another stays
/// distinguishable. `0xff` never occurs in UTF-8 text, so no literal segment
/// and no request path can contain it.
pub(crate) const TERMINATION_CHARACTER: u8 = 0xff;

/// Growth granularity of the BASE/CHECK array.
const BLOCK_SIZE: usize = 256;

/// Index of the root cell. Never handed out as a transition target.
const ROOT: usize = 0;

/// Captured path slices, collected during a lookup and materialized only on
/// success.
pub(crate) type CaptureVec<'p> = SmallVec<[&'p str; MAX_INLINE_PARAMS]>;

/// One slot of the transition table.
#[derive(Clone, Copy, Default)]
struct Cell {
    /// XOR offset to child cells; negative values are leaf references.
    base: i32,
    /// Byte of the incoming edge that owns this cell (0 = unowned).
    check: u8,
    /// A `:` edge hangs off this cell.
    has_param: bool,
    /// A `*` edge hangs off this cell.
    has_wildcard: bool,
}

impl Cell {
    #[inline]
    fn is_free(self) -> bool {
        self.base == 0 && self.check == 0
    }
}

/// Match terminus: the routed value plus the capture names consumed on the way
/// down, in declaration order.
pub(crate) struct Leaf<T> {
    pub(crate) value: T,
    pub(crate) param_names: Vec<Arc<str>>,
}

/// A pattern being compiled. The key is progressively truncated and
/// `param_names` appended as capture segments are consumed; the record only
/// lives for the duration of [`DoubleArray::build`].
pub(crate) struct BuildRecord<T> {
    /// Remaining key bytes, terminator-suffixed.
    key: Vec<u8>,
    /// The original pattern, kept for error reporting.
    pattern: String,
    value: Option<T>,
    param_names: Vec<String>,
}

impl<T> BuildRecord<T> {
    pub(crate) fn new(pattern: &str, value: T) -> Self {
        let mut key = pattern.as_bytes().to_vec();
        key.push(TERMINATION_CHARACTER);
        Self {
            key,
            pattern: pattern.to_owned(),
            value: Some(value),
            param_names: Vec::new(),
        }
    }
}

/// Maximal run of sorted sibling records sharing the same next byte at a
/// given depth.
struct Sibling {
    start: usize,
    end: usize,
    c: u8,
}

/// Backtrack point: a cell passed during the forward scan that can still
/// start a parameter or wildcard capture at `offset`.
#[derive(Clone, Copy)]
struct Backtrack {
    offset: usize,
    cell: usize,
}

pub(crate) struct DoubleArray<T> {
    cells: Vec<Cell>,
    leaves: Vec<Leaf<T>>,
    /// Base values already handed out. `check` stores the edge byte rather
    /// than the parent index, so two nodes sharing a base would make their
    /// same-byte children indistinguishable; each base is used once.
    used_bases: HashSet<i32>,
}

impl<T> DoubleArray<T> {
    pub(crate) fn new() -> Self {
        let mut used_bases = HashSet::new();
        // Base 0 stays reserved so `base == 0` always means "unset".
        used_bases.insert(0);
        Self {
            cells: vec![Cell::default(); BLOCK_SIZE],
            leaves: Vec::new(),
            used_bases,
        }
    }

    /// Number of compiled patterns (duplicate keys collapse to one).
    pub(crate) fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    /// Compiles `records` into the table. Records are consumed destructively.
    pub(crate) fn build(&mut self, records: &mut [BuildRecord<T>]) -> Result<(), BuildError> {
        if records.is_empty() {
            return Ok(());
        }
        self.build_from(records, ROOT, 0)
    }

    fn build_from(
        &mut self,
        records: &mut [BuildRecord<T>],
        idx: usize,
        depth: usize,
    ) -> Result<(), BuildError> {
        // Sibling grouping requires lexicographic order of the remaining keys.
        records.sort_by(|a, b| a.key.cmp(&b.key));
        let (siblings, leaf) = sibling_groups(records, depth);

        if let Some(pos) = leaf {
            // Keys end with the terminator, so a cell that terminates a
            // pattern can never also have outgoing edges.
            debug_assert!(
                siblings.is_empty(),
                "leaf cell {idx} has sibling edges"
            );
            self.cells[idx].base = self.make_leaf(&mut records[pos])?;
            return Ok(());
        }
        if siblings.is_empty() {
            return Ok(());
        }

        let base = self.allocate(&siblings, idx);
        self.cells[idx].base = base;
        for sib in &siblings {
            let child = (base ^ i32::from(sib.c)) as usize;
            debug_assert!(self.cells[child].is_free(), "cell {child} already owned");
            self.cells[child].check = sib.c;
        }

        for sib in &siblings {
            let child = (base ^ i32::from(sib.c)) as usize;
            match sib.c {
                PARAM_CHARACTER => {
                    // Consume the capture name up to the next separator and
                    // restart segment scanning inside the child.
                    for record in &mut records[sib.start..sib.end] {
                        let next = key_separator(&record.key, depth + 1);
                        let name =
                            String::from_utf8_lossy(&record.key[depth + 1..next]).into_owned();
                        record.param_names.push(name);
                        record.key.drain(..next);
                    }
                    self.cells[idx].has_param = true;
                    self.build_from(&mut records[sib.start..sib.end], child, 0)?;
                }
                WILDCARD_CHARACTER => {
                    // A wildcard swallows the rest of the path, so a single
                    // leaf is the only thing that can live behind this edge.
                    let record = &mut records[sib.start];
                    let end = record.key.len() - 1; // drop the terminator
                    let name = String::from_utf8_lossy(&record.key[depth + 1..end]).into_owned();
                    record.param_names.push(name);
                    record.key.clear();
                    self.cells[idx].has_wildcard = true;
                    self.build_from(&mut records[sib.start..sib.start + 1], child, 0)?;
                }
                _ => self.build_from(&mut records[sib.start..sib.end], child, depth + 1)?,
            }
        }
        Ok(())
    }

    /// Appends a leaf for an exhausted record and returns its negated 1-based
    /// reference.
    fn make_leaf(&mut self, record: &mut BuildRecord<T>) -> Result<i32, BuildError> {
        let mut seen = HashSet::new();
        for name in &record.param_names {
            if !seen.insert(name.as_str()) {
                return Err(BuildError::DuplicateParamName {
                    name: name.clone(),
                    key: record.pattern.clone(),
                });
            }
        }
        let Some(value) = record.value.take() else {
            panic!("double-array builder: record `{}' consumed twice", record.pattern);
        };
        let param_names = record
            .param_names
            .iter()
            .map(|name| Arc::from(name.as_str()))
            .collect();
        self.leaves.push(Leaf { value, param_names });
        Ok(-(self.leaves.len() as i32))
    }

    /// Finds a base value whose target cell for every sibling byte is
    /// currently free, growing the table when the scan runs past the end.
    fn allocate(&mut self, siblings: &[Sibling], start_hint: usize) -> i32 {
        let first = siblings[0].c;
        let mut idx = start_hint + 1;
        loop {
            self.ensure_capacity(idx);
            let base = (idx as i32) ^ i32::from(first);
            if !self.used_bases.contains(&base) && self.fits(base, siblings) {
                self.used_bases.insert(base);
                return base;
            }
            idx = self.next_free(idx + 1);
        }
    }

    fn fits(&mut self, base: i32, siblings: &[Sibling]) -> bool {
        for sib in siblings {
            let target = (base ^ i32::from(sib.c)) as usize;
            self.ensure_capacity(target);
            if target == ROOT || !self.cells[target].is_free() {
                return false;
            }
        }
        true
    }

    fn next_free(&self, mut i: usize) -> usize {
        while i < self.cells.len() && !self.cells[i].is_free() {
            i += 1;
        }
        i
    }

    fn ensure_capacity(&mut self, i: usize) {
        while self.cells.len() <= i {
            self.cells.resize(self.cells.len() + BLOCK_SIZE, Cell::default());
        }
    }

    /// Matches `path` against the table, returning the leaf and the captured
    /// slices in declaration order.
    pub(crate) fn lookup<'p>(&self, path: &'p str) -> Option<(&Leaf<T>, CaptureVec<'p>)> {
        if self.leaves.is_empty() {
            return None;
        }
        let mut values = CaptureVec::new();
        let leaf = self.search(path, ROOT, &mut values)?;
        Some((&self.leaves[leaf], values))
    }

    fn search<'p>(
        &self,
        path: &'p str,
        root: usize,
        values: &mut CaptureVec<'p>,
    ) -> Option<usize> {
        let bytes = path.as_bytes();
        let mut idx = root;
        let mut backtracks: SmallVec<[Backtrack; MAX_INLINE_PARAMS]> = SmallVec::new();
        let mut literal = true;

        for (i, &c) in bytes.iter().enumerate() {
            let cell = self.cells[idx];
            if cell.has_param || cell.has_wildcard {
                backtracks.push(Backtrack { offset: i, cell: idx });
            }
            let next = cell.base ^ i32::from(c);
            if next < 0 || next as usize >= self.cells.len() {
                literal = false;
                break;
            }
            if self.cells[next as usize].check != c {
                literal = false;
                break;
            }
            idx = next as usize;
        }

        // A full literal match always beats any recorded parameter boundary.
        if literal {
            if let Some(leaf) = self.terminus(idx) {
                return Some(leaf);
            }
        }

        // Retry from the deepest boundary outward; the rightmost capture is
        // the most specific one.
        for bt in backtracks.iter().rev() {
            let cell = self.cells[bt.cell];
            if cell.has_param {
                let child = cell.base ^ i32::from(PARAM_CHARACTER);
                if self.edge_is(child, PARAM_CHARACTER) {
                    let sep = path::next_separator(path, bt.offset);
                    let saved = values.len();
                    values.push(&path[bt.offset..sep]);
                    if let Some(leaf) = self.search(&path[sep..], child as usize, values) {
                        return Some(leaf);
                    }
                    values.truncate(saved);
                }
            }
            if cell.has_wildcard {
                let child = cell.base ^ i32::from(WILDCARD_CHARACTER);
                if self.edge_is(child, WILDCARD_CHARACTER) {
                    // A wildcard consumes everything that remains.
                    let leaf = -self.cells[child as usize].base;
                    if leaf > 0 {
                        values.push(&path[bt.offset..]);
                        return Some((leaf - 1) as usize);
                    }
                }
            }
        }
        None
    }

    /// Follows the terminator edge from `idx`, yielding the leaf index of an
    /// exact pattern end.
    fn terminus(&self, idx: usize) -> Option<usize> {
        let next = self.cells[idx].base ^ i32::from(TERMINATION_CHARACTER);
        if !self.edge_is(next, TERMINATION_CHARACTER) {
            return None;
        }
        let leaf = -self.cells[next as usize].base;
        if leaf > 0 {
            Some((leaf - 1) as usize)
        } else {
            None
        }
    }

    #[inline]
    fn edge_is(&self, index: i32, c: u8) -> bool {
        index >= 0 && (index as usize) < self.cells.len() && self.cells[index as usize].check == c
    }
}

/// Partitions sorted records into sibling groups by the byte at `depth`.
/// A record exhausted at this depth becomes the leaf candidate instead of a
/// sibling; on duplicate keys the last registration wins.
///
/// # Panics
///
/// Panics when the records are not sorted: that is a defect in the builder,
/// never a reachable state for input accepted by [`crate::Router::build`].
fn sibling_groups<T>(records: &[BuildRecord<T>], depth: usize) -> (Vec<Sibling>, Option<usize>) {
    let mut siblings: Vec<Sibling> = Vec::new();
    let mut leaf = None;
    for (i, record) in records.iter().enumerate() {
        if record.key.len() == depth {
            leaf = Some(i);
            continue;
        }
        let c = record.key[depth];
        match siblings.last_mut() {
            Some(last) if last.c == c => last.end = i + 1,
            Some(last) if last.c > c => {
                panic!("double-array builder: records were not sorted before grouping")
            }
            _ => siblings.push(Sibling { start: i, end: i + 1, c }),
        }
    }
    (siblings, leaf)
}

/// Like [`path::next_separator`] but over raw key bytes, where the reserved
/// terminator also ends a segment.
fn key_separator(key: &[u8], start: usize) -> usize {
    let mut i = start;
    while i < key.len() && key[i] != SEPARATOR_CHARACTER && key[i] != TERMINATION_CHARACTER {
        i += 1;
    }
    i
}
