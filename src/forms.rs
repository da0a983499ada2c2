//! Form drafts of each page. Fields hold exactly what the browser sent, so a
//! rejected submission can be shown back to the user unchanged.

use serde::Serialize;

use crate::format::{format_rupiah, parse_date, parse_digits, parse_whole};
use crate::models::{ExpenseRecord, IncomeRecord, InitialBalance, NewExpense, NewIncome, Tariff};
use crate::page::form::require;
use crate::page::{Draft, FieldErrors};

/// Smallest initial balance the dashboard accepts; lower values are raised to it.
pub const MIN_NOMINAL: i64 = 1;

/// Largest rupiah amount a single field or income total may hold. Sums over
/// many rows stay well inside `i64` at this bound.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000;

pub const MAX_DURASI: i64 = 10_000;

fn amount_limit_message() -> String {
    format!("Nilai maksimal {}.", format_rupiah(MAX_AMOUNT))
}

fn check_date(errors: &mut FieldErrors, field: &str, value: &str) -> String {
    if !value.trim().is_empty() && parse_date(value).is_none() {
        errors.add(field, "Format tanggal harus YYYY-MM-DD.");
    }
    value.trim().to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, FromForm, Serialize)]
pub struct IncomeDraft {
    #[field(default = String::new())]
    pub tanggal: String,
    #[field(default = String::new())]
    pub pelanggan: String,
    #[field(default = String::new())]
    pub kategori: String,
    #[field(default = String::from("1"))]
    pub durasi: String,
    #[field(default = String::from("0"))]
    pub tarif: String,
}

impl Default for IncomeDraft {
    fn default() -> Self {
        Self {
            tanggal: String::new(),
            pelanggan: String::new(),
            kategori: String::new(),
            durasi: "1".to_string(),
            tarif: "0".to_string(),
        }
    }
}

impl From<&IncomeRecord> for IncomeDraft {
    fn from(record: &IncomeRecord) -> Self {
        Self {
            tanggal: record.tanggal.clone(),
            pelanggan: record.pelanggan.clone(),
            kategori: record.kategori.clone(),
            durasi: record.durasi.to_string(),
            tarif: record.tarif.to_string(),
        }
    }
}

impl Draft for IncomeDraft {
    const FIELDS: &'static [&'static str] =
        &["tanggal", "pelanggan", "kategori", "durasi", "tarif"];

    fn value(&self, field: &str) -> Option<&str> {
        match field {
            "tanggal" => Some(&self.tanggal),
            "pelanggan" => Some(&self.pelanggan),
            "kategori" => Some(&self.kategori),
            "durasi" => Some(&self.durasi),
            "tarif" => Some(&self.tarif),
            _ => None,
        }
    }

    fn check_required(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        require(&mut errors, "tanggal", "tanggal", &self.tanggal);
        require(&mut errors, "pelanggan", "nama pelanggan", &self.pelanggan);
        require(&mut errors, "kategori", "kategori", &self.kategori);
        require(&mut errors, "durasi", "durasi", &self.durasi);
        errors
    }
}

impl IncomeDraft {
    pub fn set_durasi(&mut self, durasi: impl Into<String>) {
        self.durasi = durasi.into();
    }

    /// Picks a category and takes its rate from the tariff table. The rate
    /// is never typed by the user.
    pub fn select_category(&mut self, tariffs: &[Tariff], category: &str) {
        self.kategori = category.to_string();
        if let Some(tariff) = tariffs.iter().find(|t| t.category_name == category) {
            self.tarif = tariff.harga_per_unit.to_string();
        }
    }

    pub fn total(&self) -> i64 {
        let durasi = parse_whole(&self.durasi).unwrap_or_default();
        let tarif = parse_whole(&self.tarif).unwrap_or_default();
        durasi.saturating_mul(tarif)
    }

    /// Server-side checks after the presence check passed. The stored rate
    /// always comes from the tariff table.
    pub fn to_new_income(&self, tariffs: &[Tariff]) -> Result<NewIncome, FieldErrors> {
        let mut errors = FieldErrors::new();
        let tanggal = check_date(&mut errors, "tanggal", &self.tanggal);
        let tarif = match tariffs.iter().find(|t| t.category_name == self.kategori) {
            Some(tariff) => tariff.harga_per_unit,
            None => {
                errors.add("kategori", "Kategori tidak terdaftar pada tarif unit ini.");
                0
            }
        };
        let durasi = match parse_whole(&self.durasi) {
            Some(durasi) if durasi > MAX_DURASI => {
                errors.add("durasi", format!("Durasi maksimal {MAX_DURASI}."));
                0
            }
            Some(durasi) if durasi >= 1 => durasi,
            Some(_) => {
                errors.add("durasi", "Durasi minimal 1.");
                0
            }
            None => {
                errors.add("durasi", "Durasi harus berupa angka.");
                0
            }
        };
        if durasi.checked_mul(tarif).is_none_or(|total| total > MAX_AMOUNT) {
            errors.add("durasi", amount_limit_message());
        }
        errors.into_result()?;
        Ok(NewIncome {
            tanggal,
            pelanggan: self.pelanggan.trim().to_string(),
            kategori: self.kategori.clone(),
            durasi,
            tarif,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, FromForm, Serialize)]
pub struct ExpenseDraft {
    #[field(default = String::new())]
    pub tanggal: String,
    #[field(default = String::new())]
    pub kategori: String,
    #[field(default = String::new())]
    pub deskripsi: String,
    #[field(default = String::from("0"))]
    pub biaya: String,
}

impl Default for ExpenseDraft {
    fn default() -> Self {
        Self {
            tanggal: String::new(),
            kategori: String::new(),
            deskripsi: String::new(),
            biaya: "0".to_string(),
        }
    }
}

impl From<&ExpenseRecord> for ExpenseDraft {
    fn from(record: &ExpenseRecord) -> Self {
        Self {
            tanggal: record.tanggal.clone(),
            kategori: record.kategori.clone(),
            deskripsi: record.deskripsi.clone().unwrap_or_default(),
            biaya: record.biaya.to_string(),
        }
    }
}

impl Draft for ExpenseDraft {
    const FIELDS: &'static [&'static str] = &["tanggal", "kategori", "deskripsi", "biaya"];

    fn value(&self, field: &str) -> Option<&str> {
        match field {
            "tanggal" => Some(&self.tanggal),
            "kategori" => Some(&self.kategori),
            "deskripsi" => Some(&self.deskripsi),
            "biaya" => Some(&self.biaya),
            _ => None,
        }
    }

    fn check_required(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        require(&mut errors, "tanggal", "tanggal", &self.tanggal);
        require(&mut errors, "kategori", "kategori", &self.kategori);
        require(&mut errors, "biaya", "biaya", &self.biaya);
        errors
    }
}

impl ExpenseDraft {
    pub fn to_new_expense(&self) -> Result<NewExpense, FieldErrors> {
        let mut errors = FieldErrors::new();
        let tanggal = check_date(&mut errors, "tanggal", &self.tanggal);
        let biaya = match parse_whole(&self.biaya) {
            Some(biaya) if biaya > MAX_AMOUNT => {
                errors.add("biaya", amount_limit_message());
                0
            }
            Some(biaya) if biaya >= 0 => biaya,
            Some(_) => {
                errors.add("biaya", "Biaya tidak boleh negatif.");
                0
            }
            None => {
                errors.add("biaya", "Biaya harus berupa angka.");
                0
            }
        };
        errors.into_result()?;
        let deskripsi = Some(self.deskripsi.trim())
            .filter(|value| !value.is_empty())
            .map(str::to_string);
        Ok(NewExpense {
            tanggal,
            kategori: self.kategori.trim().to_string(),
            deskripsi,
            biaya,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, FromForm, Serialize)]
pub struct BalanceDraft {
    #[field(default = String::new())]
    pub tanggal: String,
    #[field(default = String::new())]
    pub nominal: String,
}

impl From<&InitialBalance> for BalanceDraft {
    fn from(balance: &InitialBalance) -> Self {
        Self {
            tanggal: balance.tanggal.clone(),
            nominal: balance.nominal.to_string(),
        }
    }
}

impl Draft for BalanceDraft {
    const FIELDS: &'static [&'static str] = &["tanggal", "nominal"];

    fn value(&self, field: &str) -> Option<&str> {
        match field {
            "tanggal" => Some(&self.tanggal),
            "nominal" => Some(&self.nominal),
            _ => None,
        }
    }

    fn check_required(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        require(&mut errors, "tanggal", "tanggal", &self.tanggal);
        require(&mut errors, "nominal", "nominal saldo awal", &self.nominal);
        errors
    }
}

impl BalanceDraft {
    /// Returns `(nominal, tanggal)`. Amounts under [`MIN_NOMINAL`] are raised to it.
    pub fn to_balance(&self) -> Result<(i64, String), FieldErrors> {
        let mut errors = FieldErrors::new();
        let tanggal = check_date(&mut errors, "tanggal", &self.tanggal);
        let nominal = match parse_digits(&self.nominal) {
            Some(nominal) if nominal > MAX_AMOUNT => {
                errors.add("nominal", amount_limit_message());
                0
            }
            Some(nominal) => nominal.max(MIN_NOMINAL),
            None => {
                errors.add("nominal", "Nominal harus berupa angka.");
                0
            }
        };
        errors.into_result()?;
        Ok((nominal, tanggal))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, FromForm, Serialize)]
pub struct TariffDraft {
    #[field(default = String::new())]
    pub berlaku_mulai: String,
    #[field(default = String::new())]
    pub category_name: String,
    #[field(default = String::new())]
    pub harga_per_unit: String,
}

impl From<&Tariff> for TariffDraft {
    fn from(tariff: &Tariff) -> Self {
        Self {
            berlaku_mulai: tariff.berlaku_mulai.clone().unwrap_or_default(),
            category_name: tariff.category_name.clone(),
            harga_per_unit: tariff.harga_per_unit.to_string(),
        }
    }
}

impl Draft for TariffDraft {
    const FIELDS: &'static [&'static str] = &["berlaku_mulai", "category_name", "harga_per_unit"];

    fn value(&self, field: &str) -> Option<&str> {
        match field {
            "berlaku_mulai" => Some(&self.berlaku_mulai),
            "category_name" => Some(&self.category_name),
            "harga_per_unit" => Some(&self.harga_per_unit),
            _ => None,
        }
    }

    fn check_required(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        require(&mut errors, "category_name", "jenis penyewa", &self.category_name);
        require(&mut errors, "harga_per_unit", "tarif", &self.harga_per_unit);
        errors
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TariffInput {
    pub category_name: String,
    pub harga_per_unit: i64,
    pub berlaku_mulai: Option<String>,
}

impl TariffDraft {
    pub fn to_tariff(&self) -> Result<TariffInput, FieldErrors> {
        let mut errors = FieldErrors::new();
        let berlaku_mulai = check_date(&mut errors, "berlaku_mulai", &self.berlaku_mulai);
        let harga_per_unit = match parse_digits(&self.harga_per_unit) {
            Some(price) if price > MAX_AMOUNT => {
                errors.add("harga_per_unit", amount_limit_message());
                0
            }
            Some(price) => price,
            None => {
                errors.add("harga_per_unit", "Tarif harus berupa angka.");
                0
            }
        };
        errors.into_result()?;
        Ok(TariffInput {
            category_name: self.category_name.trim().to_string(),
            harga_per_unit,
            berlaku_mulai: Some(berlaku_mulai).filter(|value| !value.is_empty()),
        })
    }
}

/// One `<option>` of the income category select.
#[derive(Debug, Clone, Serialize)]
pub struct TariffOption {
    pub name: String,
    pub price: i64,
    pub price_display: String,
    pub selected: bool,
}

pub fn tariff_options(tariffs: &[Tariff], selected: &str) -> Vec<TariffOption> {
    tariffs
        .iter()
        .map(|tariff| TariffOption {
            name: tariff.category_name.clone(),
            price: tariff.harga_per_unit,
            price_display: format_rupiah(tariff.harga_per_unit),
            selected: tariff.category_name == selected,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tariffs() -> Vec<Tariff> {
        vec![
            Tariff {
                id: 1,
                unit_id: 2,
                category_name: "Reguler".to_string(),
                harga_per_unit: 25000,
                berlaku_mulai: None,
            },
            Tariff {
                id: 2,
                unit_id: 2,
                category_name: "Member".to_string(),
                harga_per_unit: 20000,
                berlaku_mulai: None,
            },
        ]
    }

    #[test]
    fn total_is_duration_times_rate() {
        let mut draft = IncomeDraft::default();
        draft.set_durasi("3");
        draft.tarif = "50000".to_string();
        assert_eq!(draft.total(), 150000);

        draft.set_durasi("");
        assert_eq!(draft.total(), 0);
    }

    #[test]
    fn selecting_category_fills_rate_from_lookup() {
        let mut draft = IncomeDraft::default();
        draft.select_category(&tariffs(), "Reguler");
        assert_eq!(draft.kategori, "Reguler");
        assert_eq!(draft.tarif, "25000");

        draft.set_durasi("2");
        assert_eq!(draft.total(), 50000);
    }

    #[test]
    fn stored_rate_ignores_posted_rate() {
        let draft = IncomeDraft {
            tanggal: "2025-06-01".to_string(),
            pelanggan: " Andi ".to_string(),
            kategori: "Member".to_string(),
            durasi: "2".to_string(),
            tarif: "1".to_string(),
        };
        let income = draft.to_new_income(&tariffs()).expect("valid");
        assert_eq!(income.tarif, 20000);
        assert_eq!(income.total(), 40000);
        assert_eq!(income.pelanggan, "Andi");
    }

    #[test]
    fn income_checks_collect_per_field() {
        let draft = IncomeDraft {
            tanggal: "01/06/2025".to_string(),
            pelanggan: "Andi".to_string(),
            kategori: "VIP".to_string(),
            durasi: "0".to_string(),
            tarif: "0".to_string(),
        };
        let errors = draft.to_new_income(&tariffs()).expect_err("invalid");
        assert!(errors.contains("tanggal"));
        assert!(errors.contains("kategori"));
        assert_eq!(errors.get("durasi"), ["Durasi minimal 1."]);
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn oversized_amounts_are_field_errors() {
        let income = IncomeDraft {
            tanggal: "2025-06-01".to_string(),
            pelanggan: "Andi".to_string(),
            kategori: "Reguler".to_string(),
            durasi: "1000000000000000".to_string(),
            tarif: "0".to_string(),
        };
        let errors = income.to_new_income(&tariffs()).expect_err("too long");
        assert_eq!(errors.get("durasi"), ["Durasi maksimal 10000."]);

        let priced = vec![Tariff {
            harga_per_unit: MAX_AMOUNT,
            ..tariffs().remove(0)
        }];
        let errors = IncomeDraft {
            durasi: "2".to_string(),
            ..income
        }
        .to_new_income(&priced)
        .expect_err("total too large");
        assert_eq!(errors.get("durasi"), ["Nilai maksimal Rp. 1.000.000.000.000."]);

        let balance = BalanceDraft {
            tanggal: "2025-01-01".to_string(),
            nominal: "9223372036854775807".to_string(),
        };
        assert!(balance.to_balance().expect_err("too large").contains("nominal"));
        let at_limit = BalanceDraft {
            nominal: MAX_AMOUNT.to_string(),
            ..balance
        };
        assert_eq!(at_limit.to_balance().expect("valid").0, MAX_AMOUNT);

        let expense = ExpenseDraft {
            tanggal: "2025-06-02".to_string(),
            kategori: "Listrik".to_string(),
            deskripsi: String::new(),
            biaya: "1000000000001".to_string(),
        };
        assert!(expense.to_new_expense().expect_err("too large").contains("biaya"));

        let tariff = TariffDraft {
            berlaku_mulai: String::new(),
            category_name: "Turnamen".to_string(),
            harga_per_unit: "99999999999999999999".to_string(),
        };
        assert!(tariff.to_tariff().expect_err("too large").contains("harga_per_unit"));
    }

    #[test]
    fn required_fields_of_income() {
        let errors = IncomeDraft::default().check_required();
        assert!(errors.contains("tanggal"));
        assert!(errors.contains("pelanggan"));
        assert!(errors.contains("kategori"));
        assert!(!errors.contains("durasi"));
        assert!(!errors.contains("tarif"));
    }

    #[test]
    fn expense_description_is_optional() {
        let draft = ExpenseDraft {
            tanggal: "2025-06-02".to_string(),
            kategori: "Listrik".to_string(),
            deskripsi: "   ".to_string(),
            biaya: "120000".to_string(),
        };
        assert!(draft.check_required().is_empty());
        let expense = draft.to_new_expense().expect("valid");
        assert_eq!(expense.deskripsi, None);
        assert_eq!(expense.biaya, 120000);

        let negative = ExpenseDraft {
            biaya: "-5".to_string(),
            ..draft
        };
        assert!(negative.to_new_expense().expect_err("negative").contains("biaya"));
    }

    #[test]
    fn balance_accepts_separators_and_clamps_minimum() {
        let draft = BalanceDraft {
            tanggal: "2025-01-01".to_string(),
            nominal: "1.500.000".to_string(),
        };
        assert_eq!(draft.to_balance().expect("valid").0, 1500000);

        let zero = BalanceDraft {
            nominal: "0".to_string(),
            ..draft
        };
        assert_eq!(zero.to_balance().expect("valid").0, MIN_NOMINAL);
    }

    #[test]
    fn tariff_effective_date_is_optional() {
        let draft = TariffDraft {
            berlaku_mulai: String::new(),
            category_name: "Turnamen".to_string(),
            harga_per_unit: "40.000".to_string(),
        };
        let input = draft.to_tariff().expect("valid");
        assert_eq!(input.harga_per_unit, 40000);
        assert_eq!(input.berlaku_mulai, None);
    }

    #[test]
    fn options_mark_selected_category() {
        let options = tariff_options(&tariffs(), "Member");
        assert!(!options[0].selected);
        assert!(options[1].selected);
        assert_eq!(options[0].price_display, "Rp. 25.000");
    }
}
