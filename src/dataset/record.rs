/// One input row: an optional opaque label and its numeric features.
#[derive(Debug, Clone, PartialEq)]
pub struct Record<F> {
    pub label: Option<String>,
    pub features: Vec<F>,
}

impl<F> Record<F> {
    pub fn new(features: Vec<F>) -> Self {
        Self {
            label: None,
            features,
        }
    }

    pub fn labeled(label: impl Into<String>, features: Vec<F>) -> Self {
        Self {
            label: Some(label.into()),
            features,
        }
    }

    pub fn dim(&self) -> usize {
        self.features.len()
    }
}
