// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{ArgAction, ArgGroup, Command, arg, command, value_parser};

fn json_args(cmd: Command) -> Command {
    cmd.arg(arg!(--json "Print JSON").action(ArgAction::SetTrue))
        .arg(arg!(--jsonl "Print JSON lines").action(ArgAction::SetTrue))
}

/// Period selection and expense source, shared by every view.
fn range_args(cmd: Command) -> Command {
    let cmd = cmd
        .arg(arg!(--month <MONTH> "Calendar month, YYYY-MM").required(false))
        .arg(arg!(--week <DATE> "Sunday-Saturday week containing DATE").required(false))
        .arg(arg!(--day <DATE> "Single day").required(false))
        .arg(
            arg!(--from <DATE> "Custom range start")
                .required(false)
                .requires("to"),
        )
        .arg(
            arg!(--to <DATE> "Custom range end")
                .required(false)
                .requires("from"),
        )
        .group(
            ArgGroup::new("period")
                .args(["month", "week", "day", "from"])
                .multiple(false),
        )
        .arg(
            arg!(--shift <N> "Move the period N steps (negative goes back)")
                .required(false)
                .allow_negative_numbers(true)
                .value_parser(value_parser!(i32)),
        )
        .arg(arg!(--today <DATE> "Treat DATE as today").required(false))
        .arg(arg!(--input <PATH> "Read expenses from a JSON or CSV file").required(false));
    json_args(cmd)
}

pub fn build_cli() -> Command {
    command!()
        .name("spendlens")
        .about("Spending dashboards: category totals, budgets and trends over a date range")
        .arg(arg!(-v --verbose "Debug logging").action(ArgAction::SetTrue).global(true))
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("config")
                .about("Settings")
                .subcommand(
                    Command::new("set")
                        .arg(arg!(<KEY> "api_url | api_token | currency | category_set"))
                        .arg(arg!(<VALUE> "New value")),
                )
                .subcommand(Command::new("show")),
        )
        .subcommand(
            Command::new("category")
                .about("Custom categories")
                .subcommand(
                    Command::new("add")
                        .arg(arg!(--id <ID>).required(true))
                        .arg(arg!(--name <NAME>).required(false))
                        .arg(arg!(--icon <ICON>).required(false))
                        .arg(arg!(--color <COLOR>).required(false)),
                )
                .subcommand(json_args(Command::new("list")))
                .subcommand(Command::new("rm").arg(arg!(--id <ID>).required(true))),
        )
        .subcommand(
            Command::new("budget")
                .about("Monthly budgets")
                .subcommand(
                    Command::new("set")
                        .arg(arg!(--month <MONTH>).required(true))
                        .arg(arg!(--category <CATEGORY>).required(true))
                        .arg(arg!(--amount <AMOUNT>).required(true)),
                )
                .subcommand(Command::new("list").arg(arg!(--month <MONTH>).required(false)))
                .subcommand(json_args(
                    Command::new("show")
                        .about("Budget in effect for a month")
                        .arg(arg!(--month <MONTH>).required(true)),
                ))
                .subcommand(
                    Command::new("import")
                        .about("Load a monthlyBudgets JSON file")
                        .arg(arg!(--path <PATH>).required(true)),
                )
                .subcommand(
                    Command::new("export")
                        .about("Write stored budgets as a monthlyBudgets JSON file")
                        .arg(arg!(--path <PATH>).required(true)),
                ),
        )
        .subcommand(
            Command::new("report")
                .about("Dashboard views")
                .subcommand(range_args(
                    Command::new("overview").about("Totals, trend and projection"),
                ))
                .subcommand(range_args(
                    Command::new("categories").about("Spending per category"),
                ))
                .subcommand(range_args(
                    Command::new("budget").about("Spending against budget"),
                )),
        )
        .subcommand(
            Command::new("export").subcommand(range_args(
                Command::new("totals")
                    .arg(arg!(--format <FMT> "csv|json").required(true))
                    .arg(arg!(--out <PATH>).required(true)),
            )),
        )
        .subcommand(
            Command::new("expense")
                .about("Expenses in the selected period")
                .subcommand(range_args(
                    Command::new("list").arg(arg!(--category <CATEGORY>).required(false)),
                ))
                .subcommand(
                    Command::new("rm")
                        .arg(arg!(--id <ID>).required(true))
                        .arg(
                            arg!(--item <INDEX> "Remove one line item only")
                                .required(false)
                                .value_parser(value_parser!(usize)),
                        ),
                ),
        )
        .subcommand(range_args(
            Command::new("recategorize")
                .about("Move an expense or line item to another category")
                .arg(arg!(--expense <ID>).required(true))
                .arg(
                    arg!(--item <INDEX>)
                        .required(false)
                        .value_parser(value_parser!(usize)),
                )
                .arg(arg!(--into <CATEGORY> "Target category").required(true))
                .arg(
                    arg!(--position <INDEX> "Position in the target category")
                        .required(false)
                        .value_parser(value_parser!(usize)),
                ),
        ))
        .subcommand(Command::new("doctor").about("Check stored budgets"))
}
