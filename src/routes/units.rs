use rocket::request::FlashMessage;
use rocket::serde::Serialize;
use rocket::State;
use rocket_dyn_templates::Template;

use crate::config::AppConfig;
use crate::db::{self, DbPool};
use crate::error::AppError;
use crate::page::PageContext;

#[derive(Serialize)]
struct UnitCard {
    name: String,
    slug: String,
    dashboard_url: String,
    income_url: String,
    expense_url: String,
}

#[get("/")]
pub fn index(
    pool: &State<DbPool>,
    config: &State<AppConfig>,
    flash: Option<FlashMessage<'_>>,
) -> Result<Template, AppError> {
    let conn = pool.get()?;
    let units: Vec<UnitCard> = db::list_units(&conn)?
        .into_iter()
        .map(|unit| UnitCard {
            dashboard_url: format!("/unit/{}/dashboard", unit.id),
            income_url: format!("/unit/{}/pemasukan", unit.id),
            expense_url: format!("/unit/{}/pengeluaran", unit.id),
            name: unit.name,
            slug: unit.slug,
        })
        .collect();

    Ok(Template::render(
        "units",
        serde_json::json!({
            "page": PageContext::bare("Unit Usaha").with_flash(flash, config.flash_timeout()),
            "units": units,
        }),
    ))
}
