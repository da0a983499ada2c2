#[macro_use]
extern crate rocket;

pub mod config;
pub mod db;
pub mod error;
pub mod format;
pub mod forms;
pub mod models;
pub mod page;
pub mod routes;
#[cfg(test)]
mod tests;

use rocket::fairing::AdHoc;
use rocket::figment::Figment;
use rocket::fs::FileServer;
use rocket::{Build, Rocket};
use rocket_dyn_templates::Template;

use config::AppConfig;
use error::AppError;

fn open_storage(rocket: &Rocket<Build>) -> Result<(AppConfig, db::DbPool), AppError> {
    let config: AppConfig = rocket.figment().extract()?;
    let pool = db::init_db(&config.database_path)?;
    Ok((config, pool))
}

/// Assembles the server from `figment`. Storage is opened at ignite.
pub fn build(figment: Figment) -> Rocket<Build> {
    rocket::custom(figment)
        .attach(AdHoc::try_on_ignite("SQLite storage", |rocket| async move {
            match open_storage(&rocket) {
                Ok((config, pool)) => {
                    tracing::info!(
                        path = %config.database_path.display(),
                        page_size = config.page_size(),
                        "storage ready"
                    );
                    Ok(rocket.manage(pool).manage(config))
                }
                Err(err) => {
                    tracing::error!(error = %err, "failed to open storage");
                    Err(rocket)
                }
            }
        }))
        .mount(
            "/",
            routes![
                routes::units::index,
                routes::dashboard::show,
                routes::dashboard::store_balance,
                routes::dashboard::store_tariff,
                routes::income::index,
                routes::income::create,
                routes::income::update,
                routes::income::destroy,
                routes::expense::index,
                routes::expense::create,
                routes::expense::update,
                routes::expense::destroy,
                routes::report::show
            ],
        )
        .mount("/static", FileServer::from("static"))
        .register(
            "/",
            catchers![
                routes::not_found,
                routes::unprocessable,
                routes::internal_error
            ],
        )
        .attach(Template::fairing())
}
