use crate::stats::Month;

/// What the user has selected. Only the [`Controller`](super::Controller)
/// writes to it; everything else reads snapshots.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewState {
    pub(super) month: Month,
    pub(super) country: Option<String>,
}

impl ViewState {
    pub fn new(month: Month) -> Self {
        Self { month, country: None }
    }

    pub fn month(&self) -> Month {
        self.month
    }

    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }
}
