use serde::Serialize;

use crate::page::delete::{DeleteAction, DeleteView};
use crate::page::form::Persisted;
use crate::page::request::ResourceRoute;

#[derive(Debug, Serialize)]
pub struct TableRow<V> {
    pub number: u64,
    pub id: i64,
    pub cells: V,
    pub edit_url: String,
    pub delete: DeleteView,
}

/// Rows in the order the store returned them, numbered from `offset + 1`.
#[derive(Debug, Serialize)]
pub struct Table<V> {
    pub rows: Vec<TableRow<V>>,
    pub empty_message: &'static str,
}

impl<V> Table<V> {
    pub fn build<R, F>(
        records: Vec<R>,
        offset: u64,
        route: &ResourceRoute,
        empty_message: &'static str,
        cells: F,
    ) -> Self
    where
        R: Persisted,
        F: Fn(R) -> V,
    {
        let rows = records
            .into_iter()
            .zip(offset + 1..)
            .map(|(record, number)| {
                let id = record.id();
                TableRow {
                    number,
                    id,
                    edit_url: route.edit_link(id),
                    delete: DeleteAction::new(route, id).view(),
                    cells: cells(record),
                }
            })
            .collect();
        Self {
            rows,
            empty_message,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
