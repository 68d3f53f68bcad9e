#![cfg(not(tarpaulin_include))]

use sales_dashboard::format::ChartPoint;
use sales_dashboard::selector::seller_count;
use sales_dashboard::{DashboardConfig, DashboardView, SellerCursor, ViewState, loader};
use std::env;
use std::io::{self, Write};

const BAR_WIDTH: f64 = 40.0;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().collect();
    let print_all = args.iter().skip(1).any(|a| a == "--all");
    let positional: Vec<&String> = args.iter().skip(1).filter(|a| *a != "--all").collect();
    if positional.len() > 1 {
        eprintln!("Usage: {} [branch] [--all]", args[0]);
        return Ok(());
    }

    let config = DashboardConfig::load(None)?;
    let data = loader::load(&config.data_path, config.sheet.as_deref())?;
    let mut branch = positional.first().map(|b| b.to_string());
    let mut cursor = SellerCursor::default();
    let mut status = String::from("ok");

    if print_all {
        let count = seller_count(&data, branch.as_deref()).max(1);
        for _ in 0..count {
            print_view(&DashboardView::build(&data, branch.as_deref(), cursor));
            cursor.advance(count);
        }
        return Ok(());
    }

    loop {
        let view = DashboardView::build(&data, branch.as_deref(), cursor);
        print_view(&view);

        print!("({}) > ", status);
        io::stdout().flush()?;

        let mut command = String::new();
        if io::stdin().read_line(&mut command)? == 0 {
            break;
        }
        let command = command.trim();

        if command == "q" {
            break;
        } else if command == "help" {
            println!("Commands:");
            println!("  n: Next seller");
            println!("  b <branch>: Switch branch");
            println!("  q: Quit");
            status = String::from("ok");
        } else if command == "n" || command.is_empty() {
            if let ViewState::Ready { seller_count, .. } = view.state {
                cursor.advance(seller_count);
            }
            status = String::from("ok");
        } else if let Some(name) = command.strip_prefix("b ") {
            let name = name.trim();
            if data.has_branch(name) {
                branch = Some(name.to_string());
                cursor.reset();
                status = String::from("ok");
            } else {
                status = format!("unknown branch '{}'", name);
            }
        } else {
            status = String::from("invalid command");
        }
    }

    Ok(())
}

fn print_view(view: &DashboardView) {
    println!();
    println!(
        "Branch: {}   [{}]",
        view.branch.as_deref().unwrap_or("-"),
        view.branches.join(", ")
    );

    match &view.state {
        ViewState::Ready {
            seller,
            position,
            seller_count,
            table,
        } => {
            println!("Seller: {} ({}/{})", seller, position, seller_count);
            println!();

            let mut widths: Vec<usize> = table.columns.iter().map(|c| c.chars().count()).collect();
            for row in &table.rows {
                for (w, cell) in widths.iter_mut().zip(row.cells()) {
                    *w = (*w).max(cell.chars().count());
                }
            }

            let header: Vec<String> = table
                .columns
                .iter()
                .zip(&widths)
                .map(|(c, w)| format!("{:<w$}", c, w = *w))
                .collect();
            println!("{}", header.join(" | "));
            println!("{}", "-".repeat(header.join(" | ").chars().count()));
            for row in &table.rows {
                let line: Vec<String> = row
                    .cells()
                    .iter()
                    .zip(&widths)
                    .enumerate()
                    .map(|(i, (cell, w))| {
                        if i == 0 {
                            format!("{:<w$}", cell, w = *w)
                        } else {
                            format!("{:>w$}", cell, w = *w)
                        }
                    })
                    .collect();
                println!("{}", line.join(" | "));
            }

            println!();
            print_bars(&table.chart);
        }
        ViewState::Warning { message } => println!("Warning: {}", message),
        ViewState::Error { message } => println!("Error: {}", message),
    }
}

// Text rendition of the achievement chart, scaled to the largest bar
fn print_bars(points: &[ChartPoint]) {
    let label_width = points
        .iter()
        .map(|p| p.category.chars().count())
        .max()
        .unwrap_or(0);
    let max = points.iter().map(|p| p.percent).fold(0.0_f64, f64::max);

    for point in points {
        let len = if max > 0.0 {
            ((point.percent.max(0.0) / max) * BAR_WIDTH).round() as usize
        } else {
            0
        };
        println!(
            "{:<lw$} {} {:.2} %",
            point.category,
            "#".repeat(len),
            point.percent,
            lw = label_width
        );
    }
}
