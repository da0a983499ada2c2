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
use crate::forms::{tariff_options, IncomeDraft, TariffOption};
use crate::models::{IncomeRecord, Unit};
use crate::page::form::FormView;
use crate::page::pagination::PaginationControls;
use crate::page::{
    EditingTarget, FlashKind, FormController, Modal, PageContext, Pagination, ResourceRoute, Table,
};
use crate::routes::{flash_redirect, load_unit, unit_ref, Page, Submitted};

const RESOURCE: &str = "pemasukan";

#[derive(Serialize)]
struct IncomeRow {
    tanggal: String,
    pelanggan: String,
    kategori: String,
    durasi: i64,
    tarif: String,
    total: String,
}

#[derive(Serialize)]
struct IncomePage<'a> {
    page: PageContext,
    heading: String,
    table: Table<IncomeRow>,
    pagination: PaginationControls,
    create_url: String,
    form: Option<FormView<'a, IncomeDraft>>,
    form_total: String,
    tariffs: Vec<TariffOption>,
}

fn income_row(record: IncomeRecord) -> IncomeRow {
    IncomeRow {
        tanggal: record.tanggal,
        pelanggan: record.pelanggan,
        kategori: record.kategori,
        durasi: record.durasi,
        tarif: format_rupiah(record.tarif),
        total: format_rupiah(record.total),
    }
}

fn render(
    conn: &Connection,
    config: &AppConfig,
    unit: &Unit,
    requested_page: Option<u64>,
    flash: Option<FlashMessage<'_>>,
    modal: &Modal<FormController<IncomeDraft>>,
    status: Status,
) -> Result<Page, AppError> {
    let pagination = Pagination::new(
        db::count_incomes(conn, unit.id)?,
        config.page_size(),
        requested_page,
    );
    let route = ResourceRoute::new(unit.id, RESOURCE).with_page(Some(pagination.current_page));
    let records = db::list_incomes(conn, unit.id, pagination.per_page, pagination.offset())?;
    let tariffs = db::list_tariffs(conn, unit.id)?;
    let form = modal.get();
    let selected = form.map(|form| form.draft().kategori.as_str()).unwrap_or_default();

    let context = IncomePage {
        page: PageContext::for_unit(
            format!("Pemasukan {}", unit.name),
            unit_ref(unit),
            &route.collection(),
        )
        .with_flash(flash, config.flash_timeout()),
        heading: format!("Pemasukan - {}", unit.name),
        table: Table::build(
            records,
            pagination.offset(),
            &route,
            "Belum ada data pemasukan",
            income_row,
        ),
        pagination: pagination.controls(&route),
        create_url: route.create_link(),
        form_total: form
            .map(|form| format_rupiah(form.draft().total()))
            .unwrap_or_default(),
        tariffs: tariff_options(&tariffs, selected),
        form: form.map(|form| form.view(&route)),
    };
    Ok((status, Template::render("income", &context)))
}

#[get("/unit/<unit_id>/pemasukan?<page>&<modal>&<edit>")]
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
    let mut form: Modal<FormController<IncomeDraft>> = Modal::closed();
    if let Some(id) = edit {
        let record = db::income_by_id(&conn, unit.id, id)?.ok_or(AppError::RecordNotFound(id))?;
        form.start_edit(&record);
    } else if modal == Some("create") {
        form.start_create();
        if let Some(form) = form.get_mut() {
            form.draft_mut().tanggal = today_ymd();
        }
    }
    render(&conn, config, &unit, page, flash, &form, Status::Ok)
}

#[post("/unit/<unit_id>/pemasukan?<page>", data = "<draft>")]
pub fn create(
    pool: &State<DbPool>,
    config: &State<AppConfig>,
    unit_id: i64,
    page: Option<u64>,
    draft: Form<IncomeDraft>,
) -> Result<Submitted, AppError> {
    save(pool, config, unit_id, page, EditingTarget::Create, draft.into_inner())
}

#[put("/unit/<unit_id>/pemasukan/<id>?<page>", data = "<draft>")]
pub fn update(
    pool: &State<DbPool>,
    config: &State<AppConfig>,
    unit_id: i64,
    id: i64,
    page: Option<u64>,
    draft: Form<IncomeDraft>,
) -> Result<Submitted, AppError> {
    save(pool, config, unit_id, page, EditingTarget::Update(id), draft.into_inner())
}

fn save(
    pool: &DbPool,
    config: &AppConfig,
    unit_id: i64,
    page: Option<u64>,
    target: EditingTarget,
    draft: IncomeDraft,
) -> Result<Submitted, AppError> {
    let conn = pool.get()?;
    let unit = load_unit(&conn, unit_id)?;
    if let EditingTarget::Update(id) = target {
        if db::income_by_id(&conn, unit.id, id)?.is_none() {
            return Err(AppError::RecordNotFound(id));
        }
    }
    let route = ResourceRoute::new(unit.id, RESOURCE).with_page(page);
    let tariffs = db::list_tariffs(&conn, unit.id)?;

    let mut form = FormController::resume(target, draft);
    let income = match form.check(|draft| draft.to_new_income(&tariffs)) {
        Ok(income) => income,
        Err(errors) => {
            tracing::warn!(unit = unit.id, ?target, ?errors, "income submission rejected");
            let kategori = form.draft().kategori.clone();
            form.draft_mut().select_category(&tariffs, &kategori);
            form.fail(errors);
            let mut modal = Modal::closed();
            modal.open(form);
            return render(&conn, config, &unit, page, None, &modal, Status::UnprocessableEntity)
                .map(Submitted::Rejected);
        }
    };

    let (kind, message) = match target {
        EditingTarget::Create => {
            let id = db::insert_income(&conn, unit.id, &income)?;
            tracing::info!(unit = unit.id, id, total = income.total(), "income created");
            (FlashKind::Create, "Data pemasukan berhasil ditambahkan")
        }
        EditingTarget::Update(id) => {
            if !db::update_income(&conn, unit.id, id, &income)? {
                return Err(AppError::RecordNotFound(id));
            }
            tracing::info!(unit = unit.id, id, total = income.total(), "income updated");
            (FlashKind::Update, "Data pemasukan berhasil diperbarui")
        }
    };
    Ok(Submitted::Saved(flash_redirect(route.list(), kind, message)))
}

#[delete("/unit/<unit_id>/pemasukan/<id>?<page>")]
pub fn destroy(
    pool: &State<DbPool>,
    unit_id: i64,
    id: i64,
    page: Option<u64>,
) -> Result<Flash<Redirect>, AppError> {
    let conn = pool.get()?;
    let unit = load_unit(&conn, unit_id)?;
    if !db::delete_income(&conn, unit.id, id)? {
        return Err(AppError::RecordNotFound(id));
    }
    tracing::info!(unit = unit.id, id, "income deleted");
    let route = ResourceRoute::new(unit.id, RESOURCE).with_page(page);
    Ok(flash_redirect(
        route.list(),
        FlashKind::Delete,
        "Data pemasukan berhasil dihapus",
    ))
}
