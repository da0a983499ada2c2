use serde::Serialize;

use crate::page::Persisted;

#[derive(Debug, Clone, Serialize)]
pub struct Unit {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Tariff {
    pub id: i64,
    pub unit_id: i64,
    pub category_name: String,
    pub harga_per_unit: i64,
    pub berlaku_mulai: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IncomeRecord {
    pub id: i64,
    pub tanggal: String,
    pub pelanggan: String,
    pub kategori: String,
    pub durasi: i64,
    pub tarif: i64,
    pub total: i64,
}

impl Persisted for IncomeRecord {
    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIncome {
    pub tanggal: String,
    pub pelanggan: String,
    pub kategori: String,
    pub durasi: i64,
    pub tarif: i64,
}

impl NewIncome {
    pub fn total(&self) -> i64 {
        self.durasi.saturating_mul(self.tarif)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExpenseRecord {
    pub id: i64,
    pub tanggal: String,
    pub kategori: String,
    pub deskripsi: Option<String>,
    pub biaya: i64,
}

impl Persisted for ExpenseRecord {
    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExpense {
    pub tanggal: String,
    pub kategori: String,
    pub deskripsi: Option<String>,
    pub biaya: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct InitialBalance {
    pub nominal: i64,
    pub tanggal: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntryKind {
    Pendapatan,
    Pengeluaran,
}

impl EntryKind {
    pub fn from_db(value: &str) -> Self {
        if value == "income" {
            EntryKind::Pendapatan
        } else {
            EntryKind::Pengeluaran
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LedgerEntry {
    pub tanggal: String,
    pub keterangan: String,
    pub jenis: EntryKind,
    pub amount: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportMonth {
    pub month: String,
    pub income: i64,
    pub expense: i64,
    pub net: i64,
}
