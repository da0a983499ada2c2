use tracing_subscriber::EnvFilter;

#[rocket::launch]
fn rocket() -> _ {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    bumdes_keuangan::build(rocket::Config::figment())
}
