use rocket::http::{ContentType, Status};
use rocket::local::blocking::Client;
use tempfile::TempDir;

use crate::build;
use crate::db;

struct TestApp {
    client: Client,
    dir: TempDir,
}

impl TestApp {
    fn start() -> Self {
        Self::with_page_size(10)
    }

    fn with_page_size(page_size: u64) -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let figment = rocket::Config::figment()
            .merge(("database_path", dir.path().join("bumdes.sqlite")))
            .merge(("page_size", page_size))
            .merge(("log_level", "off"));
        let client = Client::tracked(build(figment)).expect("valid rocket");
        Self { client, dir }
    }

    fn conn(&self) -> rusqlite::Connection {
        rusqlite::Connection::open(self.dir.path().join("bumdes.sqlite")).expect("open db")
    }

    fn get(&self, uri: &str) -> (Status, String) {
        let response = self.client.get(uri.to_string()).dispatch();
        let status = response.status();
        (status, response.into_string().unwrap_or_default())
    }

    fn send(&self, uri: &str, body: &str) -> (Status, Option<String>, String) {
        let response = self
            .client
            .post(uri.to_string())
            .header(ContentType::Form)
            .body(body)
            .dispatch();
        let status = response.status();
        let location = response.headers().get_one("Location").map(str::to_string);
        (status, location, response.into_string().unwrap_or_default())
    }
}

const REGULER: &str = "tanggal=2025-06-01&pelanggan=Budi&kategori=Reguler&durasi=3&tarif=0";

#[test]
fn unit_index_lists_seeded_units() {
    let app = TestApp::start();
    let (status, body) = app.get("/");
    assert_eq!(status, Status::Ok);
    assert!(body.contains("Internet Desa"));
    assert!(body.contains("Mini Soccer"));
    assert!(body.contains("/unit/3/dashboard"));
}

#[test]
fn unknown_unit_is_not_found() {
    let app = TestApp::start();
    let (status, body) = app.get("/unit/99/pemasukan");
    assert_eq!(status, Status::NotFound);
    assert!(body.contains("Halaman tidak ditemukan"));
}

#[test]
fn empty_income_list_shows_placeholder() {
    let app = TestApp::start();
    let (status, body) = app.get("/unit/2/pemasukan");
    assert_eq!(status, Status::Ok);
    assert!(body.contains("Belum ada data pemasukan"));
    assert!(!body.contains("data-flash"));
}

#[test]
fn create_income_redirects_and_shows_green_banner_once() {
    let app = TestApp::start();
    let (status, location, _) = app.send("/unit/2/pemasukan", REGULER);
    assert_eq!(status, Status::SeeOther);
    assert_eq!(location.as_deref(), Some("/unit/2/pemasukan"));

    let (_, body) = app.get("/unit/2/pemasukan");
    assert!(body.contains("Data pemasukan berhasil ditambahkan"));
    assert!(body.contains("bg-green-600"));
    assert!(body.contains(r#"data-dismiss-after="3000""#));
    assert!(body.contains("Budi"));
    assert!(body.contains("Rp. 75.000"));

    let (_, again) = app.get("/unit/2/pemasukan");
    assert!(!again.contains("Data pemasukan berhasil ditambahkan"));
}

#[test]
fn posted_rate_is_replaced_by_tariff_price() {
    let app = TestApp::start();
    let body = "tanggal=2025-06-01&pelanggan=Sari&kategori=Member&durasi=2&tarif=1";
    let (status, _, _) = app.send("/unit/2/pemasukan", body);
    assert_eq!(status, Status::SeeOther);

    let conn = app.conn();
    let records = db::list_incomes(&conn, 2, 10, 0).expect("list");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].tarif, 20000);
    assert_eq!(records[0].total, 40000);
}

#[test]
fn missing_field_rerenders_form_with_draft() {
    let app = TestApp::start();
    let body = "tanggal=2025-06-01&pelanggan=&kategori=Reguler&durasi=4";
    let (status, location, page) = app.send("/unit/2/pemasukan", body);
    assert_eq!(status, Status::UnprocessableEntity);
    assert!(location.is_none());
    assert!(page.contains("Kolom nama pelanggan wajib diisi."));
    assert!(page.contains(r#"value="2025-06-01""#));
    assert!(page.contains(r#"value="4""#));
    assert!(page.contains("data-modal"));

    let conn = app.conn();
    assert_eq!(db::count_incomes(&conn, 2).expect("count"), 0);
}

#[test]
fn unknown_category_is_a_field_error() {
    let app = TestApp::start();
    let body = "tanggal=2025-06-01&pelanggan=Budi&kategori=VIP&durasi=1";
    let (status, _, page) = app.send("/unit/2/pemasukan", body);
    assert_eq!(status, Status::UnprocessableEntity);
    assert!(page.contains("Kategori tidak terdaftar pada tarif unit ini."));
}

#[test]
fn edit_link_opens_prefilled_form() {
    let app = TestApp::start();
    app.send("/unit/2/pemasukan", REGULER);
    let id = db::list_incomes(&app.conn(), 2, 10, 0).expect("list")[0].id;

    let (status, page) = app.get(&format!("/unit/2/pemasukan?edit={id}"));
    assert_eq!(status, Status::Ok);
    assert!(page.contains(&format!(r#"action="/unit/2/pemasukan/{id}""#)));
    assert!(page.contains(r#"name="_method" value="put""#));
    assert!(page.contains(r#"value="Budi""#));

    let (status, _) = app.get("/unit/2/pemasukan?edit=999");
    assert_eq!(status, Status::NotFound);
}

#[test]
fn update_through_method_override_shows_blue_banner() {
    let app = TestApp::start();
    app.send("/unit/2/pemasukan", REGULER);
    let id = db::list_incomes(&app.conn(), 2, 10, 0).expect("list")[0].id;

    let body = "_method=put&tanggal=2025-06-02&pelanggan=Budi%20Santoso&kategori=Komunitas&durasi=2";
    let (status, location, _) = app.send(&format!("/unit/2/pemasukan/{id}"), body);
    assert_eq!(status, Status::SeeOther);
    assert_eq!(location.as_deref(), Some("/unit/2/pemasukan"));

    let (_, page) = app.get("/unit/2/pemasukan");
    assert!(page.contains("Data pemasukan berhasil diperbarui"));
    assert!(page.contains("bg-blue-600"));
    assert!(page.contains("Budi Santoso"));
    assert!(page.contains("Rp. 30.000"));
}

#[test]
fn delete_removes_record_and_shows_red_banner() {
    let app = TestApp::start();
    app.send(
        "/unit/1/pengeluaran",
        "tanggal=2025-06-03&kategori=Listrik&deskripsi=Token&biaya=150000",
    );
    let id = db::list_expenses(&app.conn(), 1, 10, 0).expect("list")[0].id;

    let response = app
        .client
        .delete(format!("/unit/1/pengeluaran/{id}"))
        .dispatch();
    assert_eq!(response.status(), Status::SeeOther);

    let (_, page) = app.get("/unit/1/pengeluaran");
    assert!(page.contains("Data pengeluaran berhasil dihapus"));
    assert!(page.contains("bg-red-600"));
    assert!(page.contains("Belum ada data pengeluaran"));

    let response = app
        .client
        .delete(format!("/unit/1/pengeluaran/{id}"))
        .dispatch();
    assert_eq!(response.status(), Status::NotFound);
}

#[test]
fn expense_requires_cost() {
    let app = TestApp::start();
    let (status, _, page) = app.send(
        "/unit/1/pengeluaran",
        "tanggal=2025-06-03&kategori=Listrik&deskripsi=Token&biaya=",
    );
    assert_eq!(status, Status::UnprocessableEntity);
    assert!(page.contains("Kolom biaya wajib diisi."));
    assert!(page.contains(r#"value="Token""#));
}

#[test]
fn pages_split_by_configured_size() {
    let app = TestApp::with_page_size(2);
    for day in 1..=5 {
        let body = format!("tanggal=2025-06-0{day}&pelanggan=P{day}&kategori=Reguler&durasi=1");
        let (status, _, _) = app.send("/unit/2/pemasukan", &body);
        assert_eq!(status, Status::SeeOther);
    }

    let (_, first) = app.get("/unit/2/pemasukan");
    assert!(first.contains("Halaman 1 dari 3"));
    assert!(first.contains(r#"href="/unit/2/pemasukan?page=2""#));

    let (_, last) = app.get("/unit/2/pemasukan?page=9");
    assert!(last.contains("Halaman 3 dari 3"));
    assert!(last.contains("P1"));
}

#[test]
fn mutation_returns_to_current_page() {
    let app = TestApp::with_page_size(2);
    for day in 1..=3 {
        let body = format!("tanggal=2025-06-0{day}&pelanggan=P{day}&kategori=Reguler&durasi=1");
        app.send("/unit/2/pemasukan", &body);
    }
    let (status, location, _) = app.send("/unit/2/pemasukan?page=2", REGULER);
    assert_eq!(status, Status::SeeOther);
    assert_eq!(location.as_deref(), Some("/unit/2/pemasukan?page=2"));
}

#[test]
fn initial_balance_is_created_then_updated() {
    let app = TestApp::start();
    let (status, location, _) =
        app.send("/unit/1/saldo-awal", "tanggal=2025-01-01&nominal=1.500.000");
    assert_eq!(status, Status::SeeOther);
    assert_eq!(location.as_deref(), Some("/unit/1/dashboard"));

    let (_, page) = app.get("/unit/1/dashboard");
    assert!(page.contains("Saldo awal berhasil disimpan"));
    assert!(page.contains("bg-green-600"));
    assert!(page.contains("Rp. 1.500.000"));

    app.send("/unit/1/saldo-awal", "tanggal=2025-01-01&nominal=0");
    let (_, page) = app.get("/unit/1/dashboard");
    assert!(page.contains("bg-blue-600"));
    let balance = db::initial_balance(&app.conn(), 1).expect("query").expect("balance");
    assert_eq!(balance.nominal, 1);
}

#[test]
fn balance_modal_rejects_blank_nominal() {
    let app = TestApp::start();
    let (status, _, page) = app.send("/unit/1/saldo-awal", "tanggal=2025-01-01&nominal=");
    assert_eq!(status, Status::UnprocessableEntity);
    assert!(page.contains("Kolom nominal saldo awal wajib diisi."));
}

#[test]
fn tariff_upsert_reprices_category() {
    let app = TestApp::start();
    let (status, _, _) = app.send(
        "/unit/2/tarif",
        "berlaku_mulai=2025-07-01&category_name=Reguler&harga_per_unit=30.000",
    );
    assert_eq!(status, Status::SeeOther);
    let (_, page) = app.get("/unit/2/dashboard");
    assert!(page.contains("Tarif berhasil diperbarui"));
    assert!(page.contains("Rp. 30.000"));

    app.send("/unit/2/tarif", "category_name=Pelajar&harga_per_unit=10000");
    let tariffs = db::list_tariffs(&app.conn(), 2).expect("tariffs");
    assert_eq!(tariffs.len(), 4);
    assert!(tariffs.iter().any(|t| t.category_name == "Pelajar" && t.harga_per_unit == 10000));
}

#[test]
fn report_summarises_selected_month() {
    let app = TestApp::start();
    app.send("/unit/2/pemasukan", REGULER);
    app.send(
        "/unit/2/pengeluaran",
        "tanggal=2025-06-10&kategori=Perawatan&deskripsi=&biaya=25000",
    );

    let (status, page) = app.get("/unit/2/laporan?month=2025-06");
    assert_eq!(status, Status::Ok);
    assert!(page.contains("2025-06"));
    assert!(page.contains("Rp. 75.000"));
    assert!(page.contains("Rp. 50.000"));
    assert!(page.contains("Pendapatan"));
    assert!(page.contains("Pengeluaran"));
}

#[test]
fn income_rate_input_is_read_only() {
    let app = TestApp::start();
    let (status, page) = app.get("/unit/2/pemasukan?modal=create");
    assert_eq!(status, Status::Ok);
    assert!(page.contains(r#"name="tarif" value="0" readonly"#));
}

#[test]
fn expense_update_through_method_override() {
    let app = TestApp::start();
    app.send(
        "/unit/1/pengeluaran",
        "tanggal=2025-06-03&kategori=Listrik&deskripsi=Token&biaya=150000",
    );
    let id = db::list_expenses(&app.conn(), 1, 10, 0).expect("list")[0].id;

    let body = "_method=put&tanggal=2025-06-04&kategori=Listrik&deskripsi=Token%20PLN&biaya=175000";
    let (status, location, _) = app.send(&format!("/unit/1/pengeluaran/{id}"), body);
    assert_eq!(status, Status::SeeOther);
    assert_eq!(location.as_deref(), Some("/unit/1/pengeluaran"));

    let (_, page) = app.get("/unit/1/pengeluaran");
    assert!(page.contains("Data pengeluaran berhasil diperbarui"));
    assert!(page.contains("bg-blue-600"));
    assert!(page.contains("Token PLN"));
    assert!(page.contains("Rp. 175.000"));
    let stored = db::expense_by_id(&app.conn(), 1, id).expect("get").expect("expense");
    assert_eq!(stored.biaya, 175000);
}

#[test]
fn tariff_edit_link_opens_prefilled_form() {
    let app = TestApp::start();
    let reguler = db::list_tariffs(&app.conn(), 2)
        .expect("tariffs")
        .into_iter()
        .find(|t| t.category_name == "Reguler")
        .expect("seeded");

    let (status, page) = app.get(&format!("/unit/2/dashboard?tarif={}", reguler.id));
    assert_eq!(status, Status::Ok);
    assert!(page.contains(r#"action="/unit/2/tarif""#));
    assert!(page.contains(r#"name="category_name" value="Reguler""#));
    assert!(page.contains(r#"name="harga_per_unit" value="25000""#));

    let (status, _) = app.get("/unit/2/dashboard?tarif=999");
    assert_eq!(status, Status::NotFound);
}

#[test]
fn largest_balance_keeps_dashboard_rendering() {
    let app = TestApp::start();
    let (status, _, _) = app.send("/unit/2/saldo-awal", "tanggal=2025-01-01&nominal=1000000000000");
    assert_eq!(status, Status::SeeOther);
    app.send("/unit/2/pemasukan", REGULER);

    let (status, page) = app.get("/unit/2/dashboard");
    assert_eq!(status, Status::Ok);
    assert!(page.contains("Rp. 1.000.000.075.000"));

    let (status, _, page) =
        app.send("/unit/2/saldo-awal", "tanggal=2025-01-01&nominal=9223372036854775807");
    assert_eq!(status, Status::UnprocessableEntity);
    assert!(page.contains("Nilai maksimal Rp. 1.000.000.000.000."));

    // Rows written before the bound existed still render.
    db::set_initial_balance(&app.conn(), 2, i64::MAX, "2025-01-01", "now").expect("set");
    let (status, page) = app.get("/unit/2/dashboard");
    assert_eq!(status, Status::Ok);
    assert!(page.contains("Rp. 9.223.372.036.854.775.807"));
}

#[test]
fn huge_duration_is_rejected_and_stored_sums_still_render() {
    let app = TestApp::start();
    let body = "tanggal=2025-06-01&pelanggan=Budi&kategori=Reguler&durasi=1000000000000000";
    for _ in 0..2 {
        let (status, location, page) = app.send("/unit/2/pemasukan", body);
        assert_eq!(status, Status::UnprocessableEntity);
        assert!(location.is_none());
        assert!(page.contains("Durasi maksimal 10000."));
    }
    assert_eq!(db::count_incomes(&app.conn(), 2).expect("count"), 0);

    let huge = crate::models::NewIncome {
        tanggal: "2025-06-01".to_string(),
        pelanggan: "Budi".to_string(),
        kategori: "Reguler".to_string(),
        durasi: i64::MAX,
        tarif: 25000,
    };
    let conn = app.conn();
    db::insert_income(&conn, 2, &huge).expect("insert");
    db::insert_income(&conn, 2, &huge).expect("insert");

    let (status, _) = app.get("/unit/2/dashboard?month=2025-06");
    assert_eq!(status, Status::Ok);
    let (status, _) = app.get("/unit/2/laporan?month=2025-06");
    assert_eq!(status, Status::Ok);
}
