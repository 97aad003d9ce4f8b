//! Tax-statement page parsing.
//!
//! The county tax site renders bills in one of two table layouts. A page that
//! has any `tr.year-footer` row uses the installments layout, where a year
//! header row opens a block and the footer row carries the totals. Every other
//! page uses the simple layout with one bill per row. The layout is picked
//! once per page and each layout is handled by its own pure function.

use std::sync::LazyLock;
use log::debug;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use crate::config::MAX_TAX_ENTRIES;
use crate::property::TaxEntry;

// html5ever wraps bare `<table><tr>` rows in an implied tbody, so those match too.
static ROWS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table > tbody > tr").expect("invalid selector: table rows"));

static ALL_ROWS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("invalid selector: tr"));

static RE_STATUS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+").expect("invalid regex: status token"));

static RE_AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\d,\.$]+").expect("invalid regex: amount"));

/// Responsive duplicate of a row, shown only on small screens.
const MOBILE_ROW_CLASS: &str = "d-table-row d-md-none";
const YEAR_FOOTER_CLASS: &str = "year-footer";
const YEAR_HEADER_CLASS: &str = "year-header";
const INSTALLMENT_CLASS: &str = "installment";
const FOOTER_STATUS_CLASS: &str = "label status";
const DEFAULT_AMOUNT_DUE: &str = "$0.00";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxLayout {
    Installments,
    Simple,
}

pub fn detect_layout(document: &Html) -> TaxLayout {
    if document.select(&ALL_ROWS).any(|row| class_is(row, YEAR_FOOTER_CLASS)) {
        TaxLayout::Installments
    } else {
        TaxLayout::Simple
    }
}

/// Parses up to three tax entries, in page order.
pub fn parse_taxes(html: &str) -> Vec<TaxEntry> {
    let document = Html::parse_document(html);
    let layout = detect_layout(&document);
    let taxes = match layout {
        TaxLayout::Installments => parse_installments(&document),
        TaxLayout::Simple => parse_simple(&document),
    };
    debug!("Parsed {} tax entries using {:?} layout", taxes.len(), layout);
    taxes
}

fn body_rows(document: &Html) -> impl Iterator<Item = ElementRef<'_>> {
    document.select(&ROWS).filter(|row| !class_is(*row, MOBILE_ROW_CLASS))
}

pub fn parse_installments(document: &Html) -> Vec<TaxEntry> {
    let mut taxes = Vec::new();
    let mut bill_year: Option<String> = None;

    for row in body_rows(document) {
        if class_is(row, INSTALLMENT_CLASS) {
            continue;
        }

        let mut headers = child_elements(row, "th").filter(|th| class_is(*th, YEAR_HEADER_CLASS)).peekable();
        if headers.peek().is_some() {
            bill_year = first_link_text(headers);
        } else if class_is(row, YEAR_FOOTER_CLASS) {
            taxes.push(footer_entry(row, bill_year.clone()));
            if taxes.len() == MAX_TAX_ENTRIES {
                break;
            }
        }
    }
    taxes
}

fn footer_entry(row: ElementRef<'_>, bill: Option<String>) -> TaxEntry {
    let status_cells: Vec<ElementRef<'_>> =
        child_elements(row, "td").filter(|td| class_is(*td, FOOTER_STATUS_CLASS)).collect();

    let status = status_cells
        .iter()
        .flat_map(|td| direct_texts(*td))
        .find_map(|text| RE_STATUS.find(text))
        .map(|m| m.as_str().to_string());

    let amount_paid = status_cells
        .iter()
        .flat_map(|td| direct_texts(*td))
        .find_map(|text| RE_AMOUNT.find(text))
        .map(|m| m.as_str().to_string());

    let amount_due = status_cells
        .first()
        .and_then(|status_td| {
            child_elements(row, "td")
                .take_while(|td| td.id() != status_td.id())
                .filter(|td| td.value().attr("class").is_some())
                .find_map(|td| direct_texts(td).next())
        })
        .unwrap_or(DEFAULT_AMOUNT_DUE)
        .trim()
        .to_string();

    TaxEntry {
        bill,
        amount_due: Some(amount_due),
        amount_paid,
        status,
    }
}

pub fn parse_simple(document: &Html) -> Vec<TaxEntry> {
    body_rows(document)
        .map(simple_entry)
        .take(MAX_TAX_ENTRIES)
        .collect()
}

fn simple_entry(row: ElementRef<'_>) -> TaxEntry {
    let status_cells: Vec<ElementRef<'_>> = child_elements(row, "td")
        .filter(|td| td.value().attr("class").is_some_and(|c| c.contains("status")))
        .collect();

    let status = status_cells
        .iter()
        .flat_map(|td| child_elements(*td, "span"))
        .filter(|span| class_is(*span, "label"))
        .find_map(|span| direct_texts(span).next())
        .unwrap_or("")
        .trim()
        .to_string();

    let amount_paid = status_cells
        .iter()
        .flat_map(|td| child_elements(*td, "span"))
        .find_map(|span| {
            span.next_siblings()
                .find_map(|node| node.value().as_text().map(|t| &**t))
        })
        .unwrap_or("")
        .trim()
        .to_string();

    let amount_due = child_elements(row, "td")
        .filter(|td| class_is(*td, "balance"))
        .find_map(|td| direct_texts(td).next())
        .unwrap_or("")
        .trim()
        .to_string();

    TaxEntry {
        bill: first_link_text(child_elements(row, "th")),
        amount_due: Some(amount_due),
        amount_paid: Some(amount_paid),
        status: Some(status),
    }
}

/// Exact match on the whole `class` attribute.
fn class_is(element: ElementRef<'_>, class: &str) -> bool {
    element.value().attr("class") == Some(class)
}

fn child_elements<'a>(element: ElementRef<'a>, tag: &'static str) -> impl Iterator<Item = ElementRef<'a>> {
    element
        .children()
        .filter_map(ElementRef::wrap)
        .filter(move |child| child.value().name() == tag)
}

fn direct_texts<'a>(element: ElementRef<'a>) -> impl Iterator<Item = &'a str> {
    element.children().filter_map(|node| node.value().as_text().map(|t| &**t))
}

/// Trimmed text of the first `<a>` inside the first cell that has one.
fn first_link_text<'a>(cells: impl Iterator<Item = ElementRef<'a>>) -> Option<String> {
    cells
        .filter_map(|cell| child_elements(cell, "a").next())
        .find_map(|link| direct_texts(link).next())
        .map(|text| text.trim().to_string())
}
