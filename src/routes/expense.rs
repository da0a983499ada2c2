use rocket::form::Form;
use rocket::http::Status;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::serde::Serialize;
use rocket::State;
use rocket_dyn_templates::Template;
use rusqlite::Connection;

use crate::config::AppConfig;
use crate::db::{self, DbPool};
use crate::error::AppError;
use crate::format::{format_rupiah, today_ymd};
use crate::forms::ExpenseDraft;
use crate::models::{ExpenseRecord, Unit};
use crate::page::form::FormView;
use crate::page::pagination::PaginationControls;
use crate::page::{
    EditingTarget, FlashKind, FormController, Modal, PageContext, Pagination, ResourceRoute, Table,
};
use crate::routes::{flash_redirect, load_unit, unit_ref, Page, Submitted};

const RESOURCE: &str = "pengeluaran";

#[derive(Serialize)]
struct ExpenseRow {
    tanggal: String,
    kategori: String,
    deskripsi: String,
    biaya: String,
}

#[derive(Serialize)]
struct ExpensePage<'a> {
    page: PageContext,
    heading: String,
    table: Table<ExpenseRow>,
    pagination: PaginationControls,
    create_url: String,
    form: Option<FormView<'a, ExpenseDraft>>,
}

fn expense_row(record: ExpenseRecord) -> ExpenseRow {
    ExpenseRow {
        tanggal: record.tanggal,
        kategori: record.kategori,
        deskripsi: record.deskripsi.unwrap_or_else(|| "-".to_string()),
        biaya: format_rupiah(record.biaya),
    }
}

fn render(
    conn: &Connection,
    config: &AppConfig,
    unit: &Unit,
    requested_page: Option<u64>,
    flash: Option<FlashMessage<'_>>,
    modal: &Modal<FormController<ExpenseDraft>>,
    status: Status,
) -> Result<Page, AppError> {
    let pagination = Pagination::new(
        db::count_expenses(conn, unit.id)?,
        config.page_size(),
        requested_page,
    );
    let route = ResourceRoute::new(unit.id, RESOURCE).with_page(Some(pagination.current_page));
    let records = db::list_expenses(conn, unit.id, pagination.per_page, pagination.offset())?;

    let context = ExpensePage {
        page: PageContext::for_unit(
            format!("Pengeluaran {}", unit.name),
            unit_ref(unit),
            &route.collection(),
        )
        .with_flash(flash, config.flash_timeout()),
        heading: format!("Pengeluaran Harian - {}", unit.name),
        table: Table::build(
            records,
            pagination.offset(),
            &route,
            "Belum ada data pengeluaran",
            expense_row,
        ),
        pagination: pagination.controls(&route),
        create_url: route.create_link(),
        form: modal.get().map(|form| form.view(&route)),
    };
    Ok((status, Template::render("expense", &context)))
}

#[get("/unit/<unit_id>/pengeluaran?<page>&<modal>&<edit>")]
pub fn index(
    pool: &State<DbPool>,
    config: &State<AppConfig>,
    flash: Option<FlashMessage<'_>>,
    unit_id: i64,
    page: Option<u64>,
    modal: Option<&str>,
    edit: Option<i64>,
) -> Result<Page, AppError> {
    let conn = pool.get()?;
    let unit = load_unit(&conn, unit_id)?;
    let mut form: Modal<FormController<ExpenseDraft>> = Modal::closed();
    if let Some(id) = edit {
        let record = db::expense_by_id(&conn, unit.id, id)?.ok_or(AppError::RecordNotFound(id))?;
        form.start_edit(&record);
    } else if modal == Some("create") {
        form.start_create();
        if let Some(form) = form.get_mut() {
            form.draft_mut().tanggal = today_ymd();
        }
    }
    render(&conn, config, &unit, page, flash, &form, Status::Ok)
}

#[post("/unit/<unit_id>/pengeluaran?<page>", data = "<draft>")]
pub fn create(
    pool: &State<DbPool>,
    config: &State<AppConfig>,
    unit_id: i64,
    page: Option<u64>,
    draft: Form<ExpenseDraft>,
) -> Result<Submitted, AppError> {
    save(pool, config, unit_id, page, EditingTarget::Create, draft.into_inner())
}

#[put("/unit/<unit_id>/pengeluaran/<id>?<page>", data = "<draft>")]
pub fn update(
    pool: &State<DbPool>,
    config: &State<AppConfig>,
    unit_id: i64,
    id: i64,
    page: Option<u64>,
    draft: Form<ExpenseDraft>,
) -> Result<Submitted, AppError> {
    save(pool, config, unit_id, page, EditingTarget::Update(id), draft.into_inner())
}

fn save(
    pool: &DbPool,
    config: &AppConfig,
    unit_id: i64,
    page: Option<u64>,
    target: EditingTarget,
    draft: ExpenseDraft,
) -> Result<Submitted, AppError> {
    let conn = pool.get()?;
    let unit = load_unit(&conn, unit_id)?;
    if let EditingTarget::Update(id) = target {
        if db::expense_by_id(&conn, unit.id, id)?.is_none() {
            return Err(AppError::RecordNotFound(id));
        }
    }
    let route = ResourceRoute::new(unit.id, RESOURCE).with_page(page);

    let mut form = FormController::resume(target, draft);
    let expense = match form.check(ExpenseDraft::to_new_expense) {
        Ok(expense) => expense,
        Err(errors) => {
            tracing::warn!(unit = unit.id, ?target, ?errors, "expense submission rejected");
            form.fail(errors);
            let mut modal = Modal::closed();
            modal.open(form);
            return render(&conn, config, &unit, page, None, &modal, Status::UnprocessableEntity)
                .map(Submitted::Rejected);
        }
    };

    let (kind, message) = match target {
        EditingTarget::Create => {
            let id = db::insert_expense(&conn, unit.id, &expense)?;
            tracing::info!(unit = unit.id, id, biaya = expense.biaya, "expense created");
            (FlashKind::Create, "Data pengeluaran berhasil ditambahkan")
        }
        EditingTarget::Update(id) => {
            if !db::update_expense(&conn, unit.id, id, &expense)? {
                return Err(AppError::RecordNotFound(id));
            }
            tracing::info!(unit = unit.id, id, biaya = expense.biaya, "expense updated");
            (FlashKind::Update, "Data pengeluaran berhasil diperbarui")
        }
    };
    Ok(Submitted::Saved(flash_redirect(route.list(), kind, message)))
}

#[delete("/unit/<unit_id>/pengeluaran/<id>?<page>")]
pub fn destroy(
    pool: &State<DbPool>,
    unit_id: i64,
    id: i64,
    page: Option<u64>,
) -> Result<Flash<Redirect>, AppError> {
    let conn = pool.get()?;
    let unit = load_unit(&conn, unit_id)?;
    if !db::delete_expense(&conn, unit.id, id)? {
        return Err(AppError::RecordNotFound(id));
    }
    tracing::info!(unit = unit.id, id, "expense deleted");
    let route = ResourceRoute::new(unit.id, RESOURCE).with_page(page);
    Ok(flash_redirect(
        route.list(),
        FlashKind::Delete,
        "Data pengeluaran berhasil dihapus",
    ))
}
