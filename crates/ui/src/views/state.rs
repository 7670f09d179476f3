#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewError {
    /// Saved progress could not be read or written.
    Storage,
}

impl ViewError {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            ViewError::Storage => "Your progress could not be saved or loaded. Please try again.",
        }
    }
}
