//! AnchorGraph: the lookup indices the sync controller reads on every scroll
//! event. Rebuilt wholesale whenever the anchor or alignment sets change.

use std::collections::HashMap;

use uuid::Uuid;

use crate::anchor::{Alignment, Anchor};

use super::types::Pane;

#[derive(Debug, Clone, Default)]
pub struct AnchorGraph {
    source_doc: Uuid,
    target_doc: Uuid,
    anchors: HashMap<Uuid, Anchor>,
    /// (pane, page) -> anchor ids on that page
    by_page: HashMap<(Pane, u32), Vec<Uuid>>,
    alignments: Vec<Alignment>,
    /// anchor id -> index into `alignments`
    alignment_of: HashMap<Uuid, usize>,
}

impl AnchorGraph {
    /// Index `anchors` by pane and page, and each anchor's best alignment.
    ///
    /// Anchors belonging to neither document are ignored. When an anchor takes
    /// part in several alignments the most confident one wins (first on ties).
    pub fn rebuild(source_doc: Uuid, target_doc: Uuid, anchors: &[Anchor], alignments: &[Alignment]) -> Self {
        let mut graph = Self {
            source_doc,
            target_doc,
            ..Default::default()
        };

        for anchor in anchors {
            let pane = if anchor.document_id == source_doc {
                Pane::Source
            } else if anchor.document_id == target_doc {
                Pane::Target
            } else {
                continue;
            };
            graph.by_page.entry((pane, anchor.page)).or_default().push(anchor.anchor_id);
            graph.anchors.insert(anchor.anchor_id, anchor.clone());
        }

        graph.alignments = alignments.to_vec();
        for (idx, alignment) in graph.alignments.iter().enumerate() {
            let ids = alignment.source_anchor_ids.iter().chain(alignment.target_anchor_ids.iter());
            for id in ids {
                let replace = match graph.alignment_of.get(id) {
                    Some(&current) => alignment.confidence > graph.alignments[current].confidence,
                    None => true,
                };
                if replace {
                    graph.alignment_of.insert(*id, idx);
                }
            }
        }

        log::debug!(
            "anchor graph: {} anchors on {} pages, {} alignments",
            graph.anchors.len(),
            graph.by_page.len(),
            graph.alignments.len()
        );
        graph
    }

    /// Nothing can be synced
    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty() || self.alignments.is_empty()
    }

    pub fn anchor_count(&self) -> usize {
        self.anchors.len()
    }

    pub fn alignment_count(&self) -> usize {
        self.alignments.len()
    }

    pub fn document(&self, pane: Pane) -> Uuid {
        match pane {
            Pane::Source => self.source_doc,
            Pane::Target => self.target_doc,
        }
    }

    pub fn anchor(&self, id: &Uuid) -> Option<&Anchor> {
        self.anchors.get(id)
    }

    pub fn anchors_on_page(&self, pane: Pane, page: u32) -> impl Iterator<Item = &Anchor> {
        self.by_page
            .get(&(pane, page))
            .into_iter()
            .flatten()
            .filter_map(|id| self.anchors.get(id))
    }

    pub fn alignment_for(&self, anchor_id: &Uuid) -> Option<&Alignment> {
        self.alignment_of.get(anchor_id).map(|&idx| &self.alignments[idx])
    }

    /// First aligned anchor on the other side that is loaded and lives in the
    /// other pane's document. Dangling ids are skipped.
    pub fn counterpart(&self, anchor_id: &Uuid, other: Pane) -> Option<&Anchor> {
        let wanted_doc = self.document(other);
        self.alignment_for(anchor_id)?
            .counterparts(anchor_id)?
            .iter()
            .filter_map(|id| self.anchors.get(id))
            .find(|a| a.document_id == wanted_doc)
    }
}
