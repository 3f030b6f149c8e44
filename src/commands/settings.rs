// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::{self, Settings};
use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => {
            let key = sub.get_one::<String>("KEY").unwrap().trim();
            let value = sub.get_one::<String>("VALUE").unwrap();
            config::set_setting(conn, key, value)?;
            println!("Set {}", key);
        }
        Some(("show", _)) => {
            let s = Settings::load(conn)?;
            let token = if s.api_token.is_some() { "(set)" } else { "" };
            let data = vec![
                vec![config::API_URL.into(), s.api_url.clone().unwrap_or_default()],
                vec![config::API_TOKEN.into(), token.into()],
                vec![config::CURRENCY.into(), s.currency.clone()],
                vec![config::CATEGORY_SET.into(), s.category_set.clone()],
            ];
            println!("{}", pretty_table(&["Key", "Value"], data));
        }
        _ => {}
    }
    Ok(())
}
