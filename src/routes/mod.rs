pub mod dashboard;
pub mod expense;
pub mod income;
pub mod report;
pub mod units;

use rocket::http::Status;
use rocket::response::{Flash, Redirect};
use rocket_dyn_templates::Template;
use rusqlite::Connection;

use crate::db;
use crate::error::AppError;
use crate::models::Unit;
use crate::page::{FlashKind, PageContext, UnitRef};

pub type Page = (Status, Template);

/// Outcome of a form post: a redirect carrying the flash, or the same page
/// again with the modal open and the field errors filled in.
#[derive(Responder)]
pub enum Submitted {
    Saved(Flash<Redirect>),
    Rejected(Page),
}

pub fn load_unit(conn: &Connection, unit_id: i64) -> Result<Unit, AppError> {
    db::unit_by_id(conn, unit_id)?.ok_or(AppError::UnitNotFound(unit_id))
}

pub fn unit_ref(unit: &Unit) -> UnitRef {
    UnitRef {
        id: unit.id,
        name: unit.name.clone(),
    }
}

pub fn flash_redirect(url: String, kind: FlashKind, message: &str) -> Flash<Redirect> {
    Flash::new(Redirect::to(url), kind.as_str(), message)
}

fn render_error(status: Status, message: &str) -> Template {
    Template::render(
        "error",
        serde_json::json!({
            "page": PageContext::bare(message),
            "code": status.code,
            "message": message,
        }),
    )
}

#[catch(404)]
pub fn not_found() -> Template {
    render_error(Status::NotFound, "Halaman tidak ditemukan")
}

#[catch(422)]
pub fn unprocessable() -> Template {
    render_error(Status::UnprocessableEntity, "Data yang dikirim tidak dapat diproses")
}

#[catch(500)]
pub fn internal_error() -> Template {
    render_error(Status::InternalServerError, "Terjadi kesalahan pada server")
}
