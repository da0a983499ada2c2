use std::time::Duration;

use rocket::request::FlashMessage;
use serde::Serialize;

use crate::page::flash::{FlashBanner, FlashInfo, FlashNotifier};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavLink {
    pub href: String,
    pub label: &'static str,
    pub icon: &'static str,
    pub active: bool,
}

const NAV_ITEMS: &[(&str, &str, &str)] = &[
    ("dashboard", "Dashboard", "layout-dashboard"),
    ("pemasukan", "Pemasukan", "arrow-up-right"),
    ("pengeluaran", "Pengeluaran", "arrow-down-left"),
    ("laporan", "Kelola laporan", "file-text"),
];

/// Side menu of a unit; an entry is active when its path prefixes the current one.
pub fn nav_links(unit_id: i64, current_path: &str) -> Vec<NavLink> {
    NAV_ITEMS
        .iter()
        .map(|(segment, label, icon)| {
            let href = format!("/unit/{unit_id}/{segment}");
            NavLink {
                active: current_path.starts_with(&href),
                href,
                label,
                icon,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitRef {
    pub id: i64,
    pub name: String,
}

/// Props every page shares: the unit it is scoped to and the flash of the
/// previous mutation. Built per request and handed to the page explicitly.
#[derive(Debug, Clone, Serialize)]
pub struct PageContext {
    pub title: String,
    pub unit: Option<UnitRef>,
    pub flash: Option<FlashBanner>,
    pub nav: Vec<NavLink>,
}

impl PageContext {
    pub fn bare(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            unit: None,
            flash: None,
            nav: Vec::new(),
        }
    }

    pub fn for_unit(title: impl Into<String>, unit: UnitRef, current_path: &str) -> Self {
        Self {
            title: title.into(),
            nav: nav_links(unit.id, current_path),
            unit: Some(unit),
            flash: None,
        }
    }

    pub fn with_flash(mut self, flash: Option<FlashMessage<'_>>, timeout: Duration) -> Self {
        let mut notifier = FlashNotifier::new(timeout);
        notifier.arrive(
            flash.and_then(|flash| FlashInfo::from_parts(flash.kind(), flash.message())),
        );
        self.flash = notifier.banner();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nav_highlights_by_path_prefix() {
        let links = nav_links(4, "/unit/4/pengeluaran?page=2");
        let active: Vec<_> = links
            .iter()
            .filter(|link| link.active)
            .map(|link| link.label)
            .collect();
        assert_eq!(active, ["Pengeluaran"]);
        assert_eq!(links[0].href, "/unit/4/dashboard");
    }

    #[test]
    fn no_flash_means_no_banner() {
        let page = PageContext::bare("Bumdes").with_flash(None, Duration::from_millis(3000));
        assert!(page.flash.is_none());
    }
}
