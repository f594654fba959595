//! Story composer: a draft being edited plus a stack of staged drafts,
//! committed together as one batch.

use crate::stories::types::StoryDraft;

#[derive(Debug, Clone)]
pub struct StoryComposer {
    max_total: usize,
    staged: Vec<StoryDraft>,
    current: StoryDraft,
}

impl StoryComposer {
    pub fn new(max_total: usize) -> Self {
        Self {
            max_total,
            staged: Vec::new(),
            current: StoryDraft::default(),
        }
    }

    pub fn staged(&self) -> &[StoryDraft] {
        &self.staged
    }

    pub fn current(&self) -> &StoryDraft {
        &self.current
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.current.text = text.into();
    }

    pub fn set_image(&mut self, image: Option<String>) {
        self.current.image = image;
    }

    /// Stories that would exist if everything pending were committed.
    pub fn pending_total(&self, active: usize) -> usize {
        let editing = usize::from(!self.current.is_empty());
        active + self.staged.len() + editing
    }

    pub fn is_at_limit(&self, active: usize) -> bool {
        self.pending_total(active) >= self.max_total
    }

    /// Move the current draft onto the stack. Returns whether anything was staged.
    pub fn stage_current(&mut self, active: usize) -> bool {
        if self.current.is_empty() || self.is_at_limit(active) {
            return false;
        }
        self.staged.push(std::mem::take(&mut self.current));
        true
    }

    /// Take the batch to commit and reset the composer. The draft being edited
    /// joins the batch only while there is room for it.
    pub fn finalize(&mut self, active: usize) -> Vec<StoryDraft> {
        let mut batch = std::mem::take(&mut self.staged);
        let current = std::mem::take(&mut self.current);
        if !current.is_empty() && active + batch.len() < self.max_total {
            batch.push(current);
        }
        batch
    }

    pub fn discard(&mut self) {
        self.staged.clear();
        self.current = StoryDraft::default();
    }
}
