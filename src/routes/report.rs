use rocket::http::Status;
use rocket::request::FlashMessage;
use rocket::serde::Serialize;
use rocket::State;
use rocket_dyn_templates::Template;

use crate::config::AppConfig;
use crate::db::{self, DbPool};
use crate::error::AppError;
use crate::format::{format_rupiah, selected_month};
use crate::page::PageContext;
use crate::routes::dashboard::{ledger_rows, LedgerRow};
use crate::routes::{load_unit, unit_ref, Page};

const MONTHS_SHOWN: i64 = 12;

#[derive(Serialize)]
struct MonthRow {
    month: String,
    income: String,
    expense: String,
    net: String,
    surplus: bool,
    url: String,
    selected: bool,
}

#[derive(Serialize)]
struct ReportPage {
    page: PageContext,
    heading: String,
    month: String,
    months: Vec<MonthRow>,
    entries: Vec<LedgerRow>,
    income: String,
    expense: String,
    net: String,
}

#[get("/unit/<unit_id>/laporan?<month>")]
pub fn show(
    pool: &State<DbPool>,
    config: &State<AppConfig>,
    flash: Option<FlashMessage<'_>>,
    unit_id: i64,
    month: Option<&str>,
) -> Result<Page, AppError> {
    let conn = pool.get()?;
    let unit = load_unit(&conn, unit_id)?;
    let month = selected_month(month);
    let base = format!("/unit/{}/laporan", unit.id);
    let (income, expense) = db::totals(&conn, unit.id, Some(&month))?;

    let months = db::report_months(&conn, unit.id, MONTHS_SHOWN)?
        .into_iter()
        .map(|row| MonthRow {
            url: format!("{base}?month={}", row.month),
            selected: row.month == month,
            income: format_rupiah(row.income),
            expense: format_rupiah(row.expense),
            net: format_rupiah(row.net),
            surplus: row.net >= 0,
            month: row.month,
        })
        .collect();

    let context = ReportPage {
        page: PageContext::for_unit(format!("Laporan {}", unit.name), unit_ref(&unit), &base)
            .with_flash(flash, config.flash_timeout()),
        heading: format!("Laporan Keuangan - {}", unit.name),
        months,
        entries: ledger_rows(db::ledger(&conn, unit.id, &month)?),
        income: format_rupiah(income),
        expense: format_rupiah(expense),
        net: format_rupiah(income.saturating_sub(expense)),
        month,
    };
    Ok((Status::Ok, Template::render("report", &context)))
}
