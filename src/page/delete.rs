//! Delete buttons and their confirmation. The rendered form carries the
//! prompt in `data-confirm` and `static/app.js` asks the user. [`DeleteAction::run`]
//! models that exchange against a [`Confirm`] source.

use serde::Serialize;

use crate::page::request::{FormAction, Request, ResourceRoute};

pub const DELETE_PROMPT: &str = "Yakin ingin menghapus data ini?";

/// Asks the user whether a destructive action should go ahead.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Delete of a single stored record. Nothing is removed locally; the page
/// that comes back from the server shows the outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteAction {
    request: Request,
}

impl DeleteAction {
    pub fn new(route: &ResourceRoute, id: i64) -> Self {
        Self {
            request: Request::delete(route.delete_url(id)),
        }
    }

    pub fn prompt(&self) -> &'static str {
        DELETE_PROMPT
    }

    /// Declining yields no request at all.
    pub fn run(&self, confirm: &mut impl Confirm) -> Option<Request> {
        confirm
            .confirm(self.prompt())
            .then(|| self.request.clone())
    }

    pub fn view(&self) -> DeleteView {
        DeleteView {
            form: self.request.form_action(),
            prompt: self.prompt(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteView {
    pub form: FormAction,
    pub prompt: &'static str,
}
