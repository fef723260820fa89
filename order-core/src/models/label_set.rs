/// Duplicate-free collection of checkbox labels.
///
/// Labels iterate in the order they were ticked so rendering and message
/// composition are deterministic. Equality ignores that order.
#[derive(Debug, Clone, Default)]
pub struct LabelSet(Vec<String>);

impl LabelSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `label` when absent, removes it when present.
    /// Returns whether the label is present afterwards.
    pub fn toggle(
        &mut self,
        label: &str,
    ) -> bool {
        match self.0.iter().position(|existing| existing == label) {
            Some(index) => {
                self.0.remove(index);
                false
            }
            None => {
                self.0.push(label.to_string());
                true
            }
        }
    }

    /// Adds `label` unless it is already present.
    pub fn insert(
        &mut self,
        label: impl Into<String>,
    ) -> bool {
        let label = label.into();
        if self.contains(&label) {
            return false;
        }
        self.0.push(label);
        true
    }

    pub fn contains(
        &self,
        label: &str,
    ) -> bool {
        self.0.iter().any(|existing| existing == label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.clone()
    }
}

impl PartialEq for LabelSet {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.len() == other.len() && self.iter().all(|label| other.contains(label))
    }
}

impl Eq for LabelSet {}

impl<S: Into<String>> FromIterator<S> for LabelSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for label in iter {
            set.insert(label);
        }
        set
    }
}
