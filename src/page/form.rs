//! Modal form state: draft values, field errors and the editing target.
//!
//! Handlers drive `check`, `fail` and `view`. `submit` and the processing
//! flag model the double-submit lock that `static/app.js` applies in the
//! browser through `data-processing-form`.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::page::request::{FormAction, Request, ResourceRoute};

/// Anything the server has already stored and handed out an id for.
pub trait Persisted {
    fn id(&self) -> i64;
}

/// Editable field values of a record while its form is open.
pub trait Draft: Default + Clone {
    /// Field names in form order.
    const FIELDS: &'static [&'static str];

    fn value(&self, field: &str) -> Option<&str>;

    /// Presence check of the fields the form marks as required.
    fn check_required(&self) -> FieldErrors;

    fn body(&self) -> Vec<(String, String)> {
        Self::FIELDS
            .iter()
            .map(|field| {
                (
                    (*field).to_string(),
                    self.value(field).unwrap_or_default().to_string(),
                )
            })
            .collect()
    }
}

/// Which request a submitted form turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditingTarget {
    #[default]
    Create,
    Update(i64),
}

impl EditingTarget {
    pub fn id(self) -> Option<i64> {
        match self {
            EditingTarget::Create => None,
            EditingTarget::Update(id) => Some(id),
        }
    }

    pub fn request(self, route: &ResourceRoute, body: Vec<(String, String)>) -> Request {
        match self {
            EditingTarget::Create => Request::post(route.create_url(), body),
            EditingTarget::Update(id) => Request::put(route.update_url(id), body),
        }
    }
}

/// Validation messages keyed by field name, in the order they were raised.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.0.values().flatten().map(String::as_str)
    }

    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

pub fn required_message(label: &str) -> String {
    format!("Kolom {label} wajib diisi.")
}

/// Adds a required-field error when `value` is blank.
pub fn require(errors: &mut FieldErrors, field: &str, label: &str, value: &str) {
    if value.trim().is_empty() {
        errors.add(field, required_message(label));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("a submission is already in flight")]
    Processing,
    #[error("required fields are empty")]
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormController<D> {
    draft: D,
    target: EditingTarget,
    errors: FieldErrors,
    processing: bool,
}

impl<D: Draft> Default for FormController<D> {
    fn default() -> Self {
        Self::start_create()
    }
}

impl<D: Draft> FormController<D> {
    pub fn start_create() -> Self {
        Self::resume(EditingTarget::Create, D::default())
    }

    pub fn start_edit<R>(record: &R) -> Self
    where
        R: Persisted,
        D: for<'a> From<&'a R>,
    {
        Self::resume(EditingTarget::Update(record.id()), D::from(record))
    }

    /// Picks up a draft that came back from the browser.
    pub fn resume(target: EditingTarget, draft: D) -> Self {
        Self {
            draft,
            target,
            errors: FieldErrors::new(),
            processing: false,
        }
    }

    pub fn draft(&self) -> &D {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut D {
        &mut self.draft
    }

    pub fn target(&self) -> EditingTarget {
        self.target
    }

    pub fn is_editing(&self) -> bool {
        self.target.id().is_some()
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    /// The request this form sends for its current draft.
    pub fn request(&self, route: &ResourceRoute) -> Request {
        self.target.request(route, self.draft.body())
    }

    pub fn validate(&mut self) -> Result<(), SubmitError> {
        let errors = self.draft.check_required();
        if errors.is_empty() {
            Ok(())
        } else {
            self.errors = errors;
            Err(SubmitError::Invalid)
        }
    }

    /// Presence check, then the page's own parsing of the draft.
    pub fn check<T>(
        &mut self,
        parse: impl FnOnce(&D) -> Result<T, FieldErrors>,
    ) -> Result<T, FieldErrors> {
        if self.validate().is_err() {
            return Err(self.errors.clone());
        }
        parse(&self.draft)
    }

    /// Produces the one request for this submission and locks the form until
    /// [`succeed`](Self::succeed) or [`fail`](Self::fail).
    pub fn submit(&mut self, route: &ResourceRoute) -> Result<Request, SubmitError> {
        if self.processing {
            return Err(SubmitError::Processing);
        }
        self.validate()?;
        self.errors = FieldErrors::new();
        self.processing = true;
        Ok(self.request(route))
    }

    pub fn succeed(&mut self) {
        self.reset();
    }

    /// Keeps the draft so the user can correct it and resubmit.
    pub fn fail(&mut self, errors: FieldErrors) {
        self.processing = false;
        self.errors = errors;
    }

    pub fn reset(&mut self) {
        *self = Self::start_create();
    }

    pub fn view(&self, route: &ResourceRoute) -> FormView<'_, D> {
        let errors = D::FIELDS
            .iter()
            .map(|field| (*field, self.errors.get(field).to_vec()))
            .collect();
        FormView {
            draft: &self.draft,
            editing: self.is_editing(),
            action: self.request(route).form_action(),
            errors,
            summary: self.errors.messages().map(str::to_string).collect(),
            processing: self.processing,
            close_url: route.list(),
        }
    }
}

/// What a template needs to draw an open form.
#[derive(Debug, Serialize)]
pub struct FormView<'a, D> {
    pub draft: &'a D,
    pub editing: bool,
    pub action: FormAction,
    /// Every field has an entry, empty when it has no messages.
    pub errors: BTreeMap<&'static str, Vec<String>>,
    pub summary: Vec<String>,
    pub processing: bool,
    pub close_url: String,
}
