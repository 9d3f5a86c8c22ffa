use std::collections::BTreeSet;

use crate::compose::SectionKind;

/// Expanded/collapsed state of one rendered report's sections.
///
/// Created fresh for every report; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionDisclosure {
    expanded: BTreeSet<SectionKind>,
}

impl SectionDisclosure {
    pub fn new() -> Self {
        let mut expanded = BTreeSet::new();
        expanded.insert(SectionKind::Defects);
        Self { expanded }
    }

    pub fn is_expanded(&self, kind: SectionKind) -> bool {
        self.expanded.contains(&kind)
    }

    /// Flip one section and return its new state.
    pub fn toggle(&mut self, kind: SectionKind) -> bool {
        if self.expanded.remove(&kind) {
            false
        } else {
            self.expanded.insert(kind);
            true
        }
    }

    pub fn expanded(&self) -> impl Iterator<Item = SectionKind> + '_ {
        self.expanded.iter().copied()
    }
}

impl Default for SectionDisclosure {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_defects_start_expanded() {
        let disclosure = SectionDisclosure::new();
        for kind in SectionKind::ALL {
            assert_eq!(disclosure.is_expanded(kind), kind == SectionKind::Defects);
        }
    }

    #[test]
    fn test_toggle_affects_one_section() {
        let mut disclosure = SectionDisclosure::new();
        assert!(disclosure.toggle(SectionKind::Alternatives));
        assert!(!disclosure.toggle(SectionKind::Defects));

        assert!(disclosure.is_expanded(SectionKind::Alternatives));
        assert!(!disclosure.is_expanded(SectionKind::Defects));
        assert!(!disclosure.is_expanded(SectionKind::HistoryEvents));
        assert_eq!(disclosure.expanded().collect::<Vec<_>>(), vec![SectionKind::Alternatives]);
    }
}
