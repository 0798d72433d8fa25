use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use log::info;
use serde::Serialize;
use serde_json::json;

use estimates_lib::{
    customers::commands as customers,
    db::models::{CustomerInput, Estimate, EstimateInput, ItemInput, LineItemInput},
    estimates::{commands as estimates, FilterSelection, Tab},
    items::commands as items,
    utils::logging::init_logging,
    AppState,
};

#[derive(Parser)]
#[command(name = "estimates")]
#[command(about = "Manage customer estimates (quotes)", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding the database, settings and exported receipts
    #[arg(long, default_value = ".estimates", env = "ESTIMATES_DATA_DIR")]
    data_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn", env = "LOG_LEVEL")]
    log_level: String,

    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List estimates, local first, then remaining seed records
    List {
        /// active, draft or all
        #[arg(long, default_value = "active")]
        tab: Tab,
        /// Case-insensitive match on number or customer
        #[arg(short, long)]
        search: Option<String>,
        /// Exact customer name
        #[arg(long)]
        customer: Option<String>,
        /// Exact status label
        #[arg(long)]
        status: Option<String>,
        /// Earliest date, YYYY-MM-DD
        #[arg(long)]
        from: Option<String>,
        /// Latest date, YYYY-MM-DD
        #[arg(long)]
        to: Option<String>,
    },
    /// Show one estimate by id or number
    Show { key: String },
    /// Create an estimate
    Create {
        #[arg(long)]
        customer_id: Option<i64>,
        #[arg(long)]
        number: Option<String>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        valid_until: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        /// Catalog item and quantity as ITEM_ID:QTY (repeatable)
        #[arg(long = "item", value_parser = parse_item_ref)]
        items: Vec<(i64, i64)>,
    },
    /// Change the status of an estimate by id or number
    Status { key: String, status: String },
    /// Delete an estimate by id
    Delete { id: i64 },
    /// List customers
    Customers {
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Add a customer
    AddCustomer {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        phone: String,
    },
    /// List catalog items
    Items {
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Add a catalog item
    AddItem {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        price: f64,
    },
    /// Export a printable HTML receipt
    Receipt {
        key: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Show settings, applying any overrides given
    Settings {
        #[arg(long)]
        company_name: Option<String>,
        #[arg(long)]
        company_country: Option<String>,
        #[arg(long)]
        currency_code: Option<String>,
        #[arg(long)]
        first_number: Option<u64>,
        #[arg(long)]
        valid_days: Option<i64>,
    },
}

fn parse_item_ref(value: &str) -> Result<(i64, i64), String> {
    let (id, quantity) = value.split_once(':').unwrap_or((value, "1"));
    let id = id
        .trim()
        .parse()
        .map_err(|_| format!("invalid item id in '{value}'"))?;
    let quantity = quantity
        .trim()
        .parse()
        .map_err(|_| format!("invalid quantity in '{value}'"))?;
    Ok((id, quantity))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level)?;
    info!("Starting estimates v{}", env!("CARGO_PKG_VERSION"));

    let state = AppState::open(cli.data_dir).await?;
    run(&state, cli.command, cli.json).await
}

async fn run(state: &AppState, command: Commands, json: bool) -> Result<()> {
    match command {
        Commands::List {
            tab,
            search,
            customer,
            status,
            from,
            to,
        } => {
            let selection = FilterSelection {
                tab,
                search_query: search,
                customer,
                status,
                date_from: from,
                date_to: to,
            };
            let view = estimates::list_estimates(state, selection)
                .await
                .map_err(anyhow::Error::msg)?;

            if json {
                return print_json(&view);
            }
            println!(
                "Active ({})  Draft ({})",
                view.counts.active, view.counts.draft
            );
            print_estimate_table(&view.rows);
        }
        Commands::Show { key } => {
            let estimate = estimates::get_estimate(state, key)
                .await
                .map_err(anyhow::Error::msg)?;
            if json {
                return print_json(&estimate);
            }
            print_estimate_detail(&estimate);
        }
        Commands::Create {
            customer_id,
            number,
            date,
            valid_until,
            status,
            notes,
            items: item_refs,
        } => {
            let mut lines = Vec::with_capacity(item_refs.len());
            for (item_id, quantity) in item_refs {
                let item = items::get_item(state, item_id)
                    .await
                    .map_err(anyhow::Error::msg)?;
                lines.push(LineItemInput {
                    item_id: Some(item.id),
                    name: item.name,
                    description: item.description,
                    quantity,
                    price: item.price,
                });
            }

            let input = EstimateInput {
                number,
                date,
                valid_until,
                status,
                estimate_type: None,
                customer_id,
                notes,
                items: lines,
            };
            let created = estimates::create_estimate(state, input)
                .await
                .map_err(anyhow::Error::msg)?;
            if json {
                return print_json(&created);
            }
            println!("Created estimate #{} ({})", created.number, created.amount);
        }
        Commands::Status { key, status } => {
            let updated = estimates::update_estimate_status(state, key, status)
                .await
                .map_err(anyhow::Error::msg)?;
            if json {
                return print_json(&updated);
            }
            println!(
                "Estimate #{} is now {} ({})",
                updated.number, updated.status, updated.estimate_type
            );
        }
        Commands::Delete { id } => {
            estimates::delete_estimate(state, id)
                .await
                .map_err(anyhow::Error::msg)?;
            println!("Deleted estimate {id}");
        }
        Commands::Customers { search } => {
            let list = customers::list_customers(state, search)
                .await
                .map_err(anyhow::Error::msg)?;
            if json {
                return print_json(&list);
            }
            for customer in list {
                println!(
                    "{:>4}  {:<28} {:<28} {}",
                    customer.id, customer.name, customer.email, customer.phone
                );
            }
        }
        Commands::AddCustomer { name, email, phone } => {
            let created = customers::create_customer(
                state,
                CustomerInput {
                    name,
                    email,
                    phone,
                    ..CustomerInput::default()
                },
            )
            .await
            .map_err(anyhow::Error::msg)?;
            if json {
                return print_json(&created);
            }
            println!("Added customer {} ({})", created.name, created.id);
        }
        Commands::Items { search } => {
            let list = items::list_items(state, search)
                .await
                .map_err(anyhow::Error::msg)?;
            if json {
                return print_json(&list);
            }
            for item in list {
                println!(
                    "{:>4}  {:<24} {:<24} {:>10.2}",
                    item.id, item.name, item.description, item.price
                );
            }
        }
        Commands::AddItem {
            name,
            description,
            price,
        } => {
            let created = items::create_item(
                state,
                ItemInput {
                    name,
                    description,
                    price,
                },
            )
            .await
            .map_err(anyhow::Error::msg)?;
            if json {
                return print_json(&created);
            }
            println!("Added item {} ({})", created.name, created.id);
        }
        Commands::Receipt { key, out } => {
            let path = estimates::export_receipt(state, key, out)
                .await
                .map_err(anyhow::Error::msg)?;
            println!("{}", path.display());
        }
        Commands::Settings {
            company_name,
            company_country,
            currency_code,
            first_number,
            valid_days,
        } => {
            let mut receipt = state.settings.receipt();
            if company_name.is_some() || company_country.is_some() || currency_code.is_some() {
                receipt.company_name = company_name.unwrap_or(receipt.company_name);
                receipt.company_country = company_country.unwrap_or(receipt.company_country);
                receipt.currency_code = currency_code.unwrap_or(receipt.currency_code);
                state.settings.update_receipt(receipt.clone())?;
            }

            let mut numbering = state.settings.numbering();
            if first_number.is_some() || valid_days.is_some() {
                numbering.first_number = first_number.unwrap_or(numbering.first_number);
                numbering.valid_days = valid_days.unwrap_or(numbering.valid_days);
                state.settings.update_numbering(numbering.clone())?;
            }

            if json {
                return print_json(&json!({ "receipt": receipt, "numbering": numbering }));
            }
            println!("Company:      {} ({})", receipt.company_name, receipt.company_country);
            println!("Currency:     {}", receipt.currency_code);
            println!("First number: {}", numbering.first_number);
            println!("Valid days:   {}", numbering.valid_days);
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|err| anyhow!("failed to encode output: {err}"))?;
    println!("{rendered}");
    Ok(())
}

fn print_estimate_table(rows: &[Estimate]) {
    if rows.is_empty() {
        println!("No estimates match the current filters.");
        return;
    }

    println!(
        "{:<10} {:<10} {:<12} {:<24} {:>12}  {}",
        "STATUS", "NUMBER", "DATE", "CUSTOMER", "AMOUNT", "TYPE"
    );
    for row in rows {
        println!(
            "{:<10} {:<10} {:<12} {:<24} {:>12}  {}",
            row.status, row.number, row.date, row.customer, row.amount, row.estimate_type
        );
    }
    println!("1\u{2013}{} of {}", rows.len(), rows.len());
}

fn print_estimate_detail(estimate: &Estimate) {
    println!("Estimate #{} ({})", estimate.number, estimate.status);
    println!("  Customer:    {}", estimate.customer);
    println!("  Date:        {}", estimate.date);
    println!(
        "  Valid until: {}",
        estimate.valid_until.as_deref().unwrap_or("\u{2014}")
    );
    for item in &estimate.items {
        println!(
            "  {:>4} x {:<24} @ {:>10.2}",
            item.quantity, item.name, item.price
        );
    }
    println!("  Total:       {}", estimate.amount);
    if !estimate.notes.is_empty() {
        println!("  Notes:       {}", estimate.notes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_item_references() {
        assert_eq!(parse_item_ref("2:30"), Ok((2, 30)));
        assert_eq!(parse_item_ref("1"), Ok((1, 1)));
        assert!(parse_item_ref("pen:2").is_err());
    }

    #[test]
    fn list_opens_on_active_tab() {
        let cli = Cli::try_parse_from(["estimates", "list"]).unwrap();
        let Commands::List { tab, .. } = cli.command else {
            panic!("expected list");
        };
        assert_eq!(tab, Tab::Active);

        let cli = Cli::try_parse_from(["estimates", "list", "--tab", "all"]).unwrap();
        let Commands::List { tab, .. } = cli.command else {
            panic!("expected list");
        };
        assert_eq!(tab, Tab::All);
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
