//
// ─── SELECTION SET ─────────────────────────────────────────────────────────────
//

/// Tracks which document filenames are currently selected, under an optional
/// maximum-selection quota.
///
/// Selection order is preserved so a submitted document list matches what the
/// user clicked. Callers are expected to pass filenames that exist in the
/// aggregated document view; the set itself does not verify membership.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    selected: Vec<String>,
    max: Option<usize>,
}

impl SelectionSet {
    /// Creates an empty selection with an optional maximum size.
    #[must_use]
    pub fn new(max: Option<usize>) -> Self {
        Self {
            selected: Vec::new(),
            max,
        }
    }

    #[must_use]
    pub fn max(&self) -> Option<usize> {
        self.max
    }

    #[must_use]
    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    #[must_use]
    pub fn is_selected(&self, filename: &str) -> bool {
        self.selected.iter().any(|f| f == filename)
    }

    /// True when the quota is reached and `filename` is not already selected,
    /// i.e. the checkbox for it would be disabled.
    #[must_use]
    pub fn is_blocked(&self, filename: &str) -> bool {
        match self.max {
            Some(max) => self.selected.len() >= max && !self.is_selected(filename),
            None => false,
        }
    }

    /// Toggles a single filename.
    ///
    /// Deselects it if selected; otherwise selects it unless the quota is
    /// already full, in which case nothing changes. The quota is a soft
    /// constraint, so a rejected toggle is a silent no-op rather than an
    /// error. Returns whether the selection changed.
    pub fn toggle(&mut self, filename: &str) -> bool {
        if let Some(pos) = self.selected.iter().position(|f| f == filename) {
            self.selected.remove(pos);
            return true;
        }
        if let Some(max) = self.max
            && self.selected.len() >= max
        {
            return false;
        }
        self.selected.push(filename.to_string());
        true
    }

    /// Per-grouping "Select All" toggle.
    ///
    /// If every filename in `list` is already selected, deselects exactly the
    /// members of `list`. Otherwise selects unselected members of `list`, in
    /// list order, up to the remaining quota
    /// (`max - (selected - already-selected-in-list)`); members beyond the
    /// quota stay unselected.
    pub fn select_all(&mut self, list: &[String]) {
        let in_list = list.iter().filter(|f| self.is_selected(f)).count();

        if in_list == list.len() {
            self.deselect_all(list);
            return;
        }

        // Literal quota arithmetic: already-selected list members do not count
        // against the remaining slots. With overlapping groupings this can
        // admit more than `max`; the behavior is kept as-is on purpose.
        let remaining = match self.max {
            Some(max) => max.saturating_sub(self.selected.len() - in_list),
            None => list.len(),
        };
        let to_select: Vec<&String> = list
            .iter()
            .filter(|f| !self.is_selected(f))
            .take(remaining)
            .collect();
        for filename in to_select {
            self.selected.push(filename.clone());
        }
    }

    /// Removes every member of `list` from the selection.
    pub fn deselect_all(&mut self, list: &[String]) {
        self.selected.retain(|f| !list.contains(f));
    }

    /// Clears the entire selection.
    pub fn clear(&mut self) {
        self.selected.clear();
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
