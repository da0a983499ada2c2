//! Single modal slot of a page. Handlers open it from query parameters;
//! `finish` and `cancel` model closing it in the browser, where a redirect or
//! the close link does the same job.

use crate::page::form::{Draft, FormController, Persisted};

/// Visibility gate around whatever a page shows in its single modal slot.
///
/// A page holds one `Modal`, so opening something replaces what was open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modal<T> {
    content: Option<T>,
}

impl<T> Default for Modal<T> {
    fn default() -> Self {
        Self::closed()
    }
}

impl<T> Modal<T> {
    pub fn closed() -> Self {
        Self { content: None }
    }

    pub fn open(&mut self, content: T) {
        self.content = Some(content);
    }

    pub fn close(&mut self) -> Option<T> {
        self.content.take()
    }

    pub fn is_open(&self) -> bool {
        self.content.is_some()
    }

    pub fn get(&self) -> Option<&T> {
        self.content.as_ref()
    }

    pub fn get_mut(&mut self) -> Option<&mut T> {
        self.content.as_mut()
    }
}

impl<D: Draft> Modal<FormController<D>> {
    pub fn start_create(&mut self) {
        self.open(FormController::start_create());
    }

    pub fn start_edit<R>(&mut self, record: &R)
    where
        R: Persisted,
        D: for<'a> From<&'a R>,
    {
        self.open(FormController::start_edit(record));
    }

    /// Successful submit: the draft is dropped and the modal closes.
    pub fn finish(&mut self) {
        if let Some(form) = self.content.as_mut() {
            form.succeed();
        }
        self.content = None;
    }

    /// Cancel or close: same outcome as success, nothing is sent.
    pub fn cancel(&mut self) {
        self.content = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::form::{EditingTarget, FieldErrors};

    #[derive(Debug, Default, Clone, PartialEq, Eq)]
    struct Amount(String);

    impl Draft for Amount {
        const FIELDS: &'static [&'static str] = &["biaya"];

        fn value(&self, field: &str) -> Option<&str> {
            (field == "biaya").then_some(self.0.as_str())
        }

        fn check_required(&self) -> FieldErrors {
            FieldErrors::new()
        }
    }

    struct Cost(i64);

    impl Persisted for Cost {
        fn id(&self) -> i64 {
            self.0
        }
    }

    impl From<&Cost> for Amount {
        fn from(cost: &Cost) -> Self {
            Amount(format!("{}", cost.0 * 1000))
        }
    }

    #[test]
    fn opening_edit_replaces_open_create_form() {
        let mut modal = Modal::<FormController<Amount>>::closed();
        modal.start_create();
        modal.start_edit(&Cost(4));
        let form = modal.get().expect("open");
        assert_eq!(form.target(), EditingTarget::Update(4));
        assert_eq!(form.draft(), &Amount("4000".into()));
    }

    #[test]
    fn finish_and_cancel_close_the_modal() {
        let mut modal = Modal::<FormController<Amount>>::closed();
        modal.start_edit(&Cost(1));
        modal.finish();
        assert!(!modal.is_open());

        modal.start_create();
        modal.cancel();
        assert!(modal.get().is_none());
    }
}
