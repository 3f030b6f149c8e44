// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::categories::CategoryRegistry;
use crate::config::Settings;
use crate::models::Category;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::{Result, bail};
use rusqlite::{Connection, params};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let id = sub.get_one::<String>("id").unwrap().trim().to_string();
            if id.is_empty() {
                bail!("Category id cannot be empty");
            }
            let opt = |name: &str| {
                sub.get_one::<String>(name)
                    .map(|s| s.trim().to_string())
                    .unwrap_or_default()
            };
            let name = opt("name");
            let name = if name.is_empty() { id.clone() } else { name };
            conn.execute(
                "INSERT INTO categories(id, name, icon, color) VALUES (?1,?2,?3,?4)
                 ON CONFLICT(id) DO UPDATE SET name=excluded.name, icon=excluded.icon, color=excluded.color",
                params![id, name, opt("icon"), opt("color")],
            )?;
            println!("Saved category '{}'", id);
        }
        Some(("list", sub)) => {
            let settings = Settings::load(conn)?;
            let registry = active_registry(conn, &settings)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &registry.categories())? {
                let data = registry
                    .categories()
                    .iter()
                    .map(|c| vec![c.icon.clone(), c.id.clone(), c.name.clone(), c.color.clone()])
                    .collect();
                println!("{}", pretty_table(&["", "ID", "Name", "Color"], data));
            }
        }
        Some(("rm", sub)) => {
            let id = sub.get_one::<String>("id").unwrap().trim().to_string();
            let n = conn.execute("DELETE FROM categories WHERE id=?1", params![id])?;
            if n == 0 {
                bail!("Custom category '{}' not found", id);
            }
            println!("Removed category '{}'", id);
        }
        _ => {}
    }
    Ok(())
}

pub fn custom_categories(conn: &Connection) -> Result<Vec<Category>> {
    let mut stmt =
        conn.prepare("SELECT id, name, icon, color FROM categories ORDER BY created_at, id")?;
    let rows = stmt.query_map([], |r| {
        Ok(Category {
            id: r.get(0)?,
            name: r.get(1)?,
            icon: r.get(2)?,
            color: r.get(3)?,
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// Built-in set named by the `category_set` setting, with custom
/// categories merged in.
pub fn active_registry(conn: &Connection, settings: &Settings) -> Result<CategoryRegistry> {
    Ok(settings.base_registry().with_custom(custom_categories(conn)?))
}
