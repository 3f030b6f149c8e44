// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Period selection and expense loading shared by the view commands.

use crate::api::{ExpenseApi, HttpExpenseApi};
use crate::categories::CategoryRegistry;
use crate::commands::{categories::active_registry, importer::read_expenses_file};
use crate::config::Settings;
use crate::dashboard::required_range;
use crate::models::Expense;
use crate::period::{DateRange, Navigation};
use crate::utils::{parse_date, parse_month};
use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use rusqlite::Connection;

pub fn today(sub: &clap::ArgMatches) -> Result<NaiveDate> {
    match sub.get_one::<String>("today") {
        Some(s) => parse_date(s),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

/// The period picked on the command line; the current month by default.
pub fn navigation(sub: &clap::ArgMatches, today: NaiveDate) -> Result<Navigation> {
    let nav = if let Some(m) = sub.get_one::<String>("month") {
        Navigation::Month(parse_month(m)?.first_day())
    } else if let Some(d) = sub.get_one::<String>("week") {
        Navigation::Week(parse_date(d)?)
    } else if let Some(d) = sub.get_one::<String>("day") {
        Navigation::Day(parse_date(d)?)
    } else if let (Some(from), Some(to)) = (
        sub.get_one::<String>("from"),
        sub.get_one::<String>("to"),
    ) {
        Navigation::Custom(DateRange::new(parse_date(from)?, parse_date(to)?)?)
    } else {
        Navigation::Month(today)
    };
    let steps = sub.get_one::<i32>("shift").copied().unwrap_or(0);
    Ok(nav.shift(steps))
}

pub fn api_client(settings: &Settings) -> Result<HttpExpenseApi> {
    let Some(ref url) = settings.api_url else {
        bail!("No API configured: run `spendlens config set api_url <URL>` or set SPENDLENS_API_URL");
    };
    Ok(HttpExpenseApi::new(url, settings.api_token.clone())?)
}

/// Expenses covering `range`, from `--input` when given, else from the API.
pub fn load_expenses(
    settings: &Settings,
    sub: &clap::ArgMatches,
    range: &DateRange,
) -> Result<Vec<Expense>> {
    if let Some(path) = sub.get_one::<String>("input") {
        let path = path.trim();
        return read_expenses_file(path).with_context(|| format!("Read expenses from {}", path));
    }
    let api = api_client(settings)?;
    let summary = api
        .fetch_summary(range)
        .with_context(|| format!("Fetch expenses for {} from {}", range, api.base_url()))?;
    Ok(summary.into_expenses())
}

/// Everything a view needs before running the dashboard pipeline.
pub struct ViewContext {
    pub settings: Settings,
    pub registry: CategoryRegistry,
    pub navigation: Navigation,
    pub today: NaiveDate,
    pub expenses: Vec<Expense>,
}

pub fn view_context(conn: &Connection, sub: &clap::ArgMatches) -> Result<ViewContext> {
    let settings = Settings::load(conn)?;
    let registry = active_registry(conn, &settings)?;
    let today = today(sub)?;
    let navigation = navigation(sub, today)?;
    let expenses = load_expenses(&settings, sub, &required_range(&navigation))?;
    Ok(ViewContext {
        settings,
        registry,
        navigation,
        today,
        expenses,
    })
}
