use chrono::{DateTime, Local};
use rocket::form::Form;
use rocket::http::Status;
use rocket::request::FlashMessage;
use rocket::serde::Serialize;
use rocket::State;
use rocket_dyn_templates::Template;
use rusqlite::Connection;

use crate::config::AppConfig;
use crate::db::{self, DbPool};
use crate::error::AppError;
use crate::format::{format_rupiah, selected_month};
use crate::forms::{BalanceDraft, TariffDraft};
use crate::models::{EntryKind, LedgerEntry, Unit};
use crate::page::form::FormView;
use crate::page::{EditingTarget, FlashKind, FormController, Modal, PageContext, ResourceRoute};
use crate::routes::{flash_redirect, load_unit, unit_ref, Page, Submitted};

/// The dashboard has two settings dialogs sharing its one modal slot.
enum DashboardModal {
    Balance(FormController<BalanceDraft>),
    Tariff(FormController<TariffDraft>),
}

#[derive(Serialize)]
struct BalanceCard {
    current: String,
    initial: String,
    changed_on: Option<String>,
}

#[derive(Serialize)]
struct TariffRow {
    name: String,
    price: String,
    berlaku_mulai: Option<String>,
    edit_url: String,
}

#[derive(Serialize)]
struct SummaryCard {
    month: String,
    income: String,
    expense: String,
    difference: String,
    surplus: bool,
}

#[derive(Serialize)]
pub struct LedgerRow {
    number: usize,
    tanggal: String,
    keterangan: String,
    jenis: EntryKind,
    badge: &'static str,
    amount: String,
}

pub fn ledger_rows(entries: Vec<LedgerEntry>) -> Vec<LedgerRow> {
    entries
        .into_iter()
        .enumerate()
        .map(|(i, entry)| LedgerRow {
            number: i + 1,
            tanggal: entry.tanggal,
            keterangan: entry.keterangan,
            badge: match entry.jenis {
                EntryKind::Pendapatan => "badge-income",
                EntryKind::Pengeluaran => "badge-expense",
            },
            jenis: entry.jenis,
            amount: format_rupiah(entry.amount),
        })
        .collect()
}

#[derive(Serialize)]
struct DashboardPage<'a> {
    page: PageContext,
    heading: String,
    month: String,
    balance: BalanceCard,
    tariffs: Vec<TariffRow>,
    summary: SummaryCard,
    ledger: Vec<LedgerRow>,
    balance_url: String,
    tariff_url: String,
    balance_form: Option<FormView<'a, BalanceDraft>>,
    tariff_form: Option<FormView<'a, TariffDraft>>,
}

fn dashboard_url(unit_id: i64) -> String {
    format!("/unit/{unit_id}/dashboard")
}

fn changed_on(updated_at: &str) -> String {
    DateTime::parse_from_rfc3339(updated_at)
        .map(|value| value.format("%d-%m-%Y").to_string())
        .unwrap_or_else(|_| updated_at.to_string())
}

fn render(
    conn: &Connection,
    config: &AppConfig,
    unit: &Unit,
    month: Option<&str>,
    flash: Option<FlashMessage<'_>>,
    modal: &Modal<DashboardModal>,
    status: Status,
) -> Result<Page, AppError> {
    let month = selected_month(month);
    let base = dashboard_url(unit.id);
    let balance = db::initial_balance(conn, unit.id)?;
    let (income_all, expense_all) = db::totals(conn, unit.id, None)?;
    let (income, expense) = db::totals(conn, unit.id, Some(&month))?;
    let initial = balance.as_ref().map(|b| b.nominal).unwrap_or_default();
    let tariffs = db::list_tariffs(conn, unit.id)?;

    // Forms post back to their own resources and close onto the dashboard.
    let (balance_form, tariff_form) = match modal.get() {
        Some(DashboardModal::Balance(form)) => {
            (Some(form.view(&ResourceRoute::new(unit.id, "saldo-awal"))), None)
        }
        Some(DashboardModal::Tariff(form)) => {
            (None, Some(form.view(&ResourceRoute::new(unit.id, "tarif"))))
        }
        None => (None, None),
    };
    let balance_form = balance_form.map(|view| FormView {
        close_url: base.clone(),
        ..view
    });
    let tariff_form = tariff_form.map(|view| FormView {
        close_url: base.clone(),
        ..view
    });

    let context = DashboardPage {
        page: PageContext::for_unit(format!("Unit Usaha - {}", unit.name), unit_ref(unit), &base)
            .with_flash(flash, config.flash_timeout()),
        heading: format!("Unit Usaha - {}", unit.name),
        balance: BalanceCard {
            current: format_rupiah(initial.saturating_add(income_all).saturating_sub(expense_all)),
            initial: format_rupiah(initial),
            changed_on: balance.as_ref().map(|b| changed_on(&b.updated_at)),
        },
        tariffs: tariffs
            .into_iter()
            .map(|tariff| TariffRow {
                edit_url: format!("{base}?tarif={}", tariff.id),
                name: tariff.category_name,
                price: format_rupiah(tariff.harga_per_unit),
                berlaku_mulai: tariff.berlaku_mulai,
            })
            .collect(),
        summary: SummaryCard {
            month: month.clone(),
            income: format_rupiah(income),
            expense: format_rupiah(expense),
            difference: format_rupiah(income.saturating_sub(expense)),
            surplus: income >= expense,
        },
        ledger: ledger_rows(db::ledger(conn, unit.id, &month)?),
        balance_url: format!("{base}?modal=saldo"),
        tariff_url: format!("{base}?modal=tarif"),
        month,
        balance_form,
        tariff_form,
    };
    Ok((status, Template::render("dashboard", &context)))
}

#[get("/unit/<unit_id>/dashboard?<modal>&<tarif>&<month>")]
pub fn show(
    pool: &State<DbPool>,
    config: &State<AppConfig>,
    flash: Option<FlashMessage<'_>>,
    unit_id: i64,
    modal: Option<&str>,
    tarif: Option<i64>,
    month: Option<&str>,
) -> Result<Page, AppError> {
    let conn = pool.get()?;
    let unit = load_unit(&conn, unit_id)?;
    let mut dialog = Modal::closed();
    if let Some(tariff_id) = tarif {
        let tariff = db::list_tariffs(&conn, unit.id)?
            .into_iter()
            .find(|tariff| tariff.id == tariff_id)
            .ok_or(AppError::RecordNotFound(tariff_id))?;
        // Repricing goes through the same upsert as a new tariff.
        dialog.open(DashboardModal::Tariff(FormController::resume(
            EditingTarget::Create,
            TariffDraft::from(&tariff),
        )));
    } else {
        match modal {
            Some("saldo") => {
                let draft = db::initial_balance(&conn, unit.id)?
                    .as_ref()
                    .map(BalanceDraft::from)
                    .unwrap_or_default();
                dialog.open(DashboardModal::Balance(FormController::resume(
                    EditingTarget::Create,
                    draft,
                )));
            }
            Some("tarif") => dialog.open(DashboardModal::Tariff(FormController::start_create())),
            _ => {}
        }
    }
    render(&conn, config, &unit, month, flash, &dialog, Status::Ok)
}

#[post("/unit/<unit_id>/saldo-awal", data = "<draft>")]
pub fn store_balance(
    pool: &State<DbPool>,
    config: &State<AppConfig>,
    unit_id: i64,
    draft: Form<BalanceDraft>,
) -> Result<Submitted, AppError> {
    let conn = pool.get()?;
    let unit = load_unit(&conn, unit_id)?;
    let mut form = FormController::resume(EditingTarget::Create, draft.into_inner());
    let (nominal, tanggal) = match form.check(BalanceDraft::to_balance) {
        Ok(balance) => balance,
        Err(errors) => {
            tracing::warn!(unit = unit.id, ?errors, "initial balance rejected");
            form.fail(errors);
            let mut dialog = Modal::closed();
            dialog.open(DashboardModal::Balance(form));
            return render(&conn, config, &unit, None, None, &dialog, Status::UnprocessableEntity)
                .map(Submitted::Rejected);
        }
    };

    let replaced = db::set_initial_balance(
        &conn,
        unit.id,
        nominal,
        &tanggal,
        &Local::now().to_rfc3339(),
    )?;
    tracing::info!(unit = unit.id, nominal, replaced, "initial balance stored");
    let kind = if replaced {
        FlashKind::Update
    } else {
        FlashKind::Create
    };
    Ok(Submitted::Saved(flash_redirect(
        dashboard_url(unit.id),
        kind,
        "Saldo awal berhasil disimpan",
    )))
}

#[post("/unit/<unit_id>/tarif", data = "<draft>")]
pub fn store_tariff(
    pool: &State<DbPool>,
    config: &State<AppConfig>,
    unit_id: i64,
    draft: Form<TariffDraft>,
) -> Result<Submitted, AppError> {
    let conn = pool.get()?;
    let unit = load_unit(&conn, unit_id)?;
    let mut form = FormController::resume(EditingTarget::Create, draft.into_inner());
    let input = match form.check(TariffDraft::to_tariff) {
        Ok(input) => input,
        Err(errors) => {
            tracing::warn!(unit = unit.id, ?errors, "tariff rejected");
            form.fail(errors);
            let mut dialog = Modal::closed();
            dialog.open(DashboardModal::Tariff(form));
            return render(&conn, config, &unit, None, None, &dialog, Status::UnprocessableEntity)
                .map(Submitted::Rejected);
        }
    };

    let existed = db::upsert_tariff(
        &conn,
        unit.id,
        &input.category_name,
        input.harga_per_unit,
        input.berlaku_mulai.as_deref(),
    )?;
    tracing::info!(
        unit = unit.id,
        category = %input.category_name,
        price = input.harga_per_unit,
        "tariff stored"
    );
    let (kind, message) = if existed {
        (FlashKind::Update, "Tarif berhasil diperbarui")
    } else {
        (FlashKind::Create, "Tarif berhasil ditambahkan")
    };
    Ok(Submitted::Saved(flash_redirect(dashboard_url(unit.id), kind, message)))
}
