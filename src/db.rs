use std::path::Path;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Connection, OptionalExtension, Result};

use crate::error::AppError;
use crate::models::{
    EntryKind, ExpenseRecord, IncomeRecord, InitialBalance, LedgerEntry, NewExpense, NewIncome,
    ReportMonth, Tariff, Unit,
};

pub type DbPool = Pool<SqliteConnectionManager>;

pub fn init_db(path: &Path) -> std::result::Result<DbPool, AppError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let manager = SqliteConnectionManager::file(path)
        .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));
    let pool = Pool::new(manager)?;
    {
        let conn = pool.get()?;
        run_migrations(&conn)?;
    }
    Ok(pool)
}

fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS units (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            slug TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS tariffs (
            id INTEGER PRIMARY KEY,
            unit_id INTEGER NOT NULL,
            category_name TEXT NOT NULL,
            harga_per_unit INTEGER NOT NULL,
            berlaku_mulai TEXT,
            UNIQUE(unit_id, category_name),
            FOREIGN KEY(unit_id) REFERENCES units(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS incomes (
            id INTEGER PRIMARY KEY,
            unit_id INTEGER NOT NULL,
            tanggal TEXT NOT NULL,
            pelanggan TEXT NOT NULL,
            kategori TEXT NOT NULL,
            durasi INTEGER NOT NULL CHECK(durasi >= 1),
            tarif INTEGER NOT NULL,
            total INTEGER NOT NULL,
            FOREIGN KEY(unit_id) REFERENCES units(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS expenses (
            id INTEGER PRIMARY KEY,
            unit_id INTEGER NOT NULL,
            tanggal TEXT NOT NULL,
            kategori TEXT NOT NULL,
            deskripsi TEXT,
            biaya INTEGER NOT NULL CHECK(biaya >= 0),
            FOREIGN KEY(unit_id) REFERENCES units(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS initial_balances (
            unit_id INTEGER PRIMARY KEY,
            nominal INTEGER NOT NULL,
            tanggal TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY(unit_id) REFERENCES units(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS incomes_unit_date ON incomes(unit_id, tanggal);
        CREATE INDEX IF NOT EXISTS expenses_unit_date ON expenses(unit_id, tanggal);

        INSERT OR IGNORE INTO units (id, name, slug) VALUES
            (1, 'Internet Desa', 'internet-desa'),
            (2, 'Mini Soccer', 'mini-soccer'),
            (3, 'Bumi Perkemahan', 'buper');

        INSERT OR IGNORE INTO tariffs (unit_id, category_name, harga_per_unit) VALUES
            (1, 'Paket 5 Mbps', 100000),
            (1, 'Paket 10 Mbps', 150000),
            (1, 'Paket 20 Mbps', 250000),
            (2, 'Reguler', 25000),
            (2, 'Member', 20000),
            (2, 'Komunitas', 15000),
            (3, 'Kavling Tenda', 50000),
            (3, 'Sewa Aula', 300000);
        ",
    )
}

fn sql_int(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn month_pattern(month: Option<&str>) -> String {
    match month {
        Some(month) => format!("{month}-%"),
        None => "%".to_string(),
    }
}

pub fn list_units(conn: &Connection) -> Result<Vec<Unit>> {
    let mut stmt = conn.prepare("SELECT id, name, slug FROM units ORDER BY id")?;
    let rows = stmt.query_map([], |row| {
        Ok(Unit {
            id: row.get(0)?,
            name: row.get(1)?,
            slug: row.get(2)?,
        })
    })?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub fn unit_by_id(conn: &Connection, unit_id: i64) -> Result<Option<Unit>> {
    conn.query_row(
        "SELECT id, name, slug FROM units WHERE id = ?1",
        params![unit_id],
        |row| {
            Ok(Unit {
                id: row.get(0)?,
                name: row.get(1)?,
                slug: row.get(2)?,
            })
        },
    )
    .optional()
}

pub fn list_tariffs(conn: &Connection, unit_id: i64) -> Result<Vec<Tariff>> {
    let mut stmt = conn.prepare(
        "
        SELECT id, unit_id, category_name, harga_per_unit, berlaku_mulai
        FROM tariffs
        WHERE unit_id = ?1
        ORDER BY id
        ",
    )?;
    let rows = stmt.query_map(params![unit_id], |row| {
        Ok(Tariff {
            id: row.get(0)?,
            unit_id: row.get(1)?,
            category_name: row.get(2)?,
            harga_per_unit: row.get(3)?,
            berlaku_mulai: row.get(4)?,
        })
    })?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// Inserts or reprices the tariff of `category_name`. Returns true when the
/// category already existed.
pub fn upsert_tariff(
    conn: &Connection,
    unit_id: i64,
    category_name: &str,
    harga_per_unit: i64,
    berlaku_mulai: Option<&str>,
) -> Result<bool> {
    let existed: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM tariffs WHERE unit_id = ?1 AND category_name = ?2)",
        params![unit_id, category_name],
        |row| row.get(0),
    )?;
    conn.execute(
        "
        INSERT INTO tariffs (unit_id, category_name, harga_per_unit, berlaku_mulai)
        VALUES (?1, ?2, ?3, ?4)
        ON CONFLICT(unit_id, category_name)
        DO UPDATE SET harga_per_unit = excluded.harga_per_unit,
                      berlaku_mulai = excluded.berlaku_mulai
        ",
        params![unit_id, category_name, harga_per_unit, berlaku_mulai],
    )?;
    Ok(existed)
}

pub fn count_incomes(conn: &Connection, unit_id: i64) -> Result<u64> {
    conn.query_row(
        "SELECT COUNT(*) FROM incomes WHERE unit_id = ?1",
        params![unit_id],
        |row| row.get::<_, i64>(0),
    )
    .map(|count| u64::try_from(count).unwrap_or_default())
}

fn income_from_row(row: &rusqlite::Row<'_>) -> Result<IncomeRecord> {
    Ok(IncomeRecord {
        id: row.get(0)?,
        tanggal: row.get(1)?,
        pelanggan: row.get(2)?,
        kategori: row.get(3)?,
        durasi: row.get(4)?,
        tarif: row.get(5)?,
        total: row.get(6)?,
    })
}

pub fn list_incomes(
    conn: &Connection,
    unit_id: i64,
    limit: u64,
    offset: u64,
) -> Result<Vec<IncomeRecord>> {
    let mut stmt = conn.prepare(
        "
        SELECT id, tanggal, pelanggan, kategori, durasi, tarif, total
        FROM incomes
        WHERE unit_id = ?1
        ORDER BY tanggal DESC, id DESC
        LIMIT ?2 OFFSET ?3
        ",
    )?;
    let rows = stmt.query_map(
        params![unit_id, sql_int(limit), sql_int(offset)],
        income_from_row,
    )?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub fn income_by_id(conn: &Connection, unit_id: i64, id: i64) -> Result<Option<IncomeRecord>> {
    conn.query_row(
        "
        SELECT id, tanggal, pelanggan, kategori, durasi, tarif, total
        FROM incomes
        WHERE unit_id = ?1 AND id = ?2
        ",
        params![unit_id, id],
        income_from_row,
    )
    .optional()
}

pub fn insert_income(conn: &Connection, unit_id: i64, income: &NewIncome) -> Result<i64> {
    conn.execute(
        "
        INSERT INTO incomes (unit_id, tanggal, pelanggan, kategori, durasi, tarif, total)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        ",
        params![
            unit_id,
            income.tanggal,
            income.pelanggan,
            income.kategori,
            income.durasi,
            income.tarif,
            income.total()
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_income(conn: &Connection, unit_id: i64, id: i64, income: &NewIncome) -> Result<bool> {
    let changed = conn.execute(
        "
        UPDATE incomes
        SET tanggal = ?3, pelanggan = ?4, kategori = ?5, durasi = ?6, tarif = ?7, total = ?8
        WHERE unit_id = ?1 AND id = ?2
        ",
        params![
            unit_id,
            id,
            income.tanggal,
            income.pelanggan,
            income.kategori,
            income.durasi,
            income.tarif,
            income.total()
        ],
    )?;
    Ok(changed > 0)
}

pub fn delete_income(conn: &Connection, unit_id: i64, id: i64) -> Result<bool> {
    let changed = conn.execute(
        "DELETE FROM incomes WHERE unit_id = ?1 AND id = ?2",
        params![unit_id, id],
    )?;
    Ok(changed > 0)
}

pub fn count_expenses(conn: &Connection, unit_id: i64) -> Result<u64> {
    conn.query_row(
        "SELECT COUNT(*) FROM expenses WHERE unit_id = ?1",
        params![unit_id],
        |row| row.get::<_, i64>(0),
    )
    .map(|count| u64::try_from(count).unwrap_or_default())
}

fn expense_from_row(row: &rusqlite::Row<'_>) -> Result<ExpenseRecord> {
    Ok(ExpenseRecord {
        id: row.get(0)?,
        tanggal: row.get(1)?,
        kategori: row.get(2)?,
        deskripsi: row.get(3)?,
        biaya: row.get(4)?,
    })
}

pub fn list_expenses(
    conn: &Connection,
    unit_id: i64,
    limit: u64,
    offset: u64,
) -> Result<Vec<ExpenseRecord>> {
    let mut stmt = conn.prepare(
        "
        SELECT id, tanggal, kategori, deskripsi, biaya
        FROM expenses
        WHERE unit_id = ?1
        ORDER BY tanggal DESC, id DESC
        LIMIT ?2 OFFSET ?3
        ",
    )?;
    let rows = stmt.query_map(
        params![unit_id, sql_int(limit), sql_int(offset)],
        expense_from_row,
    )?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub fn expense_by_id(conn: &Connection, unit_id: i64, id: i64) -> Result<Option<ExpenseRecord>> {
    conn.query_row(
        "
        SELECT id, tanggal, kategori, deskripsi, biaya
        FROM expenses
        WHERE unit_id = ?1 AND id = ?2
        ",
        params![unit_id, id],
        expense_from_row,
    )
    .optional()
}

pub fn insert_expense(conn: &Connection, unit_id: i64, expense: &NewExpense) -> Result<i64> {
    conn.execute(
        "
        INSERT INTO expenses (unit_id, tanggal, kategori, deskripsi, biaya)
        VALUES (?1, ?2, ?3, ?4, ?5)
        ",
        params![
            unit_id,
            expense.tanggal,
            expense.kategori,
            expense.deskripsi,
            expense.biaya
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_expense(
    conn: &Connection,
    unit_id: i64,
    id: i64,
    expense: &NewExpense,
) -> Result<bool> {
    let changed = conn.execute(
        "
        UPDATE expenses
        SET tanggal = ?3, kategori = ?4, deskripsi = ?5, biaya = ?6
        WHERE unit_id = ?1 AND id = ?2
        ",
        params![
            unit_id,
            id,
            expense.tanggal,
            expense.kategori,
            expense.deskripsi,
            expense.biaya
        ],
    )?;
    Ok(changed > 0)
}

pub fn delete_expense(conn: &Connection, unit_id: i64, id: i64) -> Result<bool> {
    let changed = conn.execute(
        "DELETE FROM expenses WHERE unit_id = ?1 AND id = ?2",
        params![unit_id, id],
    )?;
    Ok(changed > 0)
}

pub fn initial_balance(conn: &Connection, unit_id: i64) -> Result<Option<InitialBalance>> {
    conn.query_row(
        "SELECT nominal, tanggal, updated_at FROM initial_balances WHERE unit_id = ?1",
        params![unit_id],
        |row| {
            Ok(InitialBalance {
                nominal: row.get(0)?,
                tanggal: row.get(1)?,
                updated_at: row.get(2)?,
            })
        },
    )
    .optional()
}

/// Returns true when a previous balance was replaced.
pub fn set_initial_balance(
    conn: &Connection,
    unit_id: i64,
    nominal: i64,
    tanggal: &str,
    updated_at: &str,
) -> Result<bool> {
    let existed = initial_balance(conn, unit_id)?.is_some();
    conn.execute(
        "
        INSERT INTO initial_balances (unit_id, nominal, tanggal, updated_at)
        VALUES (?1, ?2, ?3, ?4)
        ON CONFLICT(unit_id)
        DO UPDATE SET nominal = excluded.nominal,
                      tanggal = excluded.tanggal,
                      updated_at = excluded.updated_at
        ",
        params![unit_id, nominal, tanggal, updated_at],
    )?;
    Ok(existed)
}

/// Income and expense sums of a unit, for one `YYYY-MM` month or all time.
/// `TOTAL` cannot overflow and the cast back clamps to the `i64` range.
pub fn totals(conn: &Connection, unit_id: i64, month: Option<&str>) -> Result<(i64, i64)> {
    let pattern = month_pattern(month);
    let income: i64 = conn.query_row(
        "
        SELECT CAST(TOTAL(total) AS INTEGER)
        FROM incomes
        WHERE unit_id = ?1 AND tanggal LIKE ?2
        ",
        params![unit_id, pattern],
        |row| row.get(0),
    )?;
    let expense: i64 = conn.query_row(
        "
        SELECT CAST(TOTAL(biaya) AS INTEGER)
        FROM expenses
        WHERE unit_id = ?1 AND tanggal LIKE ?2
        ",
        params![unit_id, pattern],
        |row| row.get(0),
    )?;
    Ok((income, expense))
}

pub fn ledger(conn: &Connection, unit_id: i64, month: &str) -> Result<Vec<LedgerEntry>> {
    let mut stmt = conn.prepare(
        "
        SELECT tanggal, keterangan, jenis, amount
        FROM (
            SELECT id, tanggal, pelanggan || ' - ' || kategori AS keterangan,
                   'income' AS jenis, total AS amount
            FROM incomes
            WHERE unit_id = ?1 AND tanggal LIKE ?2
            UNION ALL
            SELECT id, tanggal,
                   CASE WHEN deskripsi IS NULL OR deskripsi = '' THEN kategori
                        ELSE kategori || ' - ' || deskripsi END,
                   'expense', biaya
            FROM expenses
            WHERE unit_id = ?1 AND tanggal LIKE ?2
        )
        ORDER BY tanggal DESC, jenis DESC, id DESC
        ",
    )?;
    let rows = stmt.query_map(params![unit_id, month_pattern(Some(month))], |row| {
        let jenis: String = row.get(2)?;
        Ok(LedgerEntry {
            tanggal: row.get(0)?,
            keterangan: row.get(1)?,
            jenis: EntryKind::from_db(&jenis),
            amount: row.get(3)?,
        })
    })?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub fn report_months(conn: &Connection, unit_id: i64, limit: i64) -> Result<Vec<ReportMonth>> {
    let mut stmt = conn.prepare(
        "
        SELECT month,
               CAST(TOTAL(income) AS INTEGER) AS income,
               CAST(TOTAL(expense) AS INTEGER) AS expense
        FROM (
            SELECT substr(tanggal, 1, 7) AS month, total AS income, 0 AS expense
            FROM incomes
            WHERE unit_id = ?1
            UNION ALL
            SELECT substr(tanggal, 1, 7), 0, biaya
            FROM expenses
            WHERE unit_id = ?1
        )
        GROUP BY month
        ORDER BY month DESC
        LIMIT ?2
        ",
    )?;
    let rows = stmt.query_map(params![unit_id, limit], |row| {
        let income: i64 = row.get(1)?;
        let expense: i64 = row.get(2)?;
        Ok(ReportMonth {
            month: row.get(0)?,
            income,
            expense,
            net: income.saturating_sub(expense),
        })
    })?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory() -> Connection {
        let conn = Connection::open_in_memory().expect("open");
        run_migrations(&conn).expect("migrations");
        conn
    }

    fn income(tanggal: &str, durasi: i64) -> NewIncome {
        NewIncome {
            tanggal: tanggal.to_string(),
            pelanggan: "Budi".to_string(),
            kategori: "Reguler".to_string(),
            durasi,
            tarif: 25000,
        }
    }

    #[test]
    fn migrations_are_idempotent_and_seed_units() {
        let conn = memory();
        run_migrations(&conn).expect("second run");
        let units = list_units(&conn).expect("units");
        assert_eq!(units.len(), 3);
        assert_eq!(units[1].name, "Mini Soccer");
        let tariffs = list_tariffs(&conn, 2).expect("tariffs");
        assert!(tariffs.iter().any(|t| t.category_name == "Reguler" && t.harga_per_unit == 25000));
    }

    #[test]
    fn incomes_page_newest_first_with_stored_total() {
        let conn = memory();
        insert_income(&conn, 2, &income("2025-05-01", 1)).expect("insert");
        let newest = insert_income(&conn, 2, &income("2025-06-01", 3)).expect("insert");
        insert_income(&conn, 1, &income("2025-07-01", 1)).expect("other unit");

        assert_eq!(count_incomes(&conn, 2).expect("count"), 2);
        let page = list_incomes(&conn, 2, 1, 0).expect("list");
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, newest);
        assert_eq!(page[0].total, 75000);
    }

    #[test]
    fn update_and_delete_are_scoped_to_unit() {
        let conn = memory();
        let id = insert_income(&conn, 2, &income("2025-05-01", 1)).expect("insert");
        assert!(!update_income(&conn, 1, id, &income("2025-05-02", 2)).expect("update"));
        assert!(update_income(&conn, 2, id, &income("2025-05-02", 2)).expect("update"));
        assert_eq!(income_by_id(&conn, 2, id).expect("get").map(|r| r.total), Some(50000));
        assert!(!delete_income(&conn, 1, id).expect("delete"));
        assert!(delete_income(&conn, 2, id).expect("delete"));
        assert!(income_by_id(&conn, 2, id).expect("get").is_none());
    }

    #[test]
    fn totals_and_report_combine_both_sides() {
        let conn = memory();
        insert_income(&conn, 2, &income("2025-06-03", 4)).expect("insert");
        insert_expense(
            &conn,
            2,
            &NewExpense {
                tanggal: "2025-06-04".to_string(),
                kategori: "Listrik".to_string(),
                deskripsi: None,
                biaya: 30000,
            },
        )
        .expect("insert");

        assert_eq!(totals(&conn, 2, Some("2025-06")).expect("totals"), (100000, 30000));
        assert_eq!(totals(&conn, 2, Some("2025-07")).expect("totals"), (0, 0));

        let months = report_months(&conn, 2, 12).expect("report");
        assert_eq!(months.len(), 1);
        assert_eq!(months[0].net, 70000);

        let entries = ledger(&conn, 2, "2025-06").expect("ledger");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].jenis, EntryKind::Pengeluaran);
        assert_eq!(entries[0].keterangan, "Listrik");
        assert_eq!(entries[1].keterangan, "Budi - Reguler");
    }

    #[test]
    fn sums_clamp_instead_of_failing_on_huge_rows() {
        let conn = memory();
        insert_income(&conn, 2, &income("2025-06-01", i64::MAX)).expect("insert");
        insert_income(&conn, 2, &income("2025-06-02", i64::MAX)).expect("insert");

        assert_eq!(totals(&conn, 2, None).expect("totals"), (i64::MAX, 0));
        let months = report_months(&conn, 2, 12).expect("report");
        assert_eq!(months[0].income, i64::MAX);
        assert_eq!(months[0].net, i64::MAX);
    }

    #[test]
    fn tariff_and_balance_upserts_report_replacement() {
        let conn = memory();
        assert!(upsert_tariff(&conn, 2, "Reguler", 30000, Some("2025-06-01")).expect("upsert"));
        assert!(!upsert_tariff(&conn, 2, "Turnamen", 40000, None).expect("upsert"));
        let reguler = list_tariffs(&conn, 2)
            .expect("tariffs")
            .into_iter()
            .find(|t| t.category_name == "Reguler")
            .map(|t| t.harga_per_unit);
        assert_eq!(reguler, Some(30000));

        assert!(!set_initial_balance(&conn, 1, 500000, "2025-01-01", "now").expect("set"));
        assert!(set_initial_balance(&conn, 1, 750000, "2025-02-01", "later").expect("set"));
        assert_eq!(initial_balance(&conn, 1).expect("get").map(|b| b.nominal), Some(750000));
    }
}
