use wayfind_common::protocol::{ElementHandle, Selector};

/// An element found by the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub element: ElementHandle,
    /// Selector that produced the match.
    pub selector: Selector,
    /// Position of `selector` in the candidate list.
    pub candidate_index: usize,
}

/// Every match of the winning candidate, in document order. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedList {
    pub elements: Vec<ElementHandle>,
    pub selector: Selector,
    pub candidate_index: usize,
}

impl ResolvedList {
    pub fn first(&self) -> Option<Resolved> {
        self.elements.first().map(|element| Resolved {
            element: element.clone(),
            selector: self.selector.clone(),
            candidate_index: self.candidate_index,
        })
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
