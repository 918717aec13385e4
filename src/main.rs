use colored::*;
use log::{error, info};
use tabled::{Table, Tabled};

use densiplex::{solve, SolveResult};

use std::process::ExitCode;

#[derive(Tabled)]
struct VariableRow {
    sector: &'static str,
    value: String,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    //labour, capital and resource constraints over three sectors
    let sectors = ["agriculture", "industry", "services"];
    let c = [12, 7, 10];
    let a = [vec![1, 1, 1], vec![30, 10, 0], vec![2, 1, 3]];
    let b = [300, 3000, 500];

    let result = match solve(&c, &a, &b) {
        Ok(result) => result,
        Err(e) => {
            error!("invalid problem: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match result {
        SolveResult::Optimal(solution) => {
            info!("optimal solution:");
            for (sector, value) in sectors.iter().zip(solution.x()) {
                info!("{}={:.1}", sector, value);
            }
            info!("optimal value: {:.1}", solution.value());

            let rows = sectors
                .iter()
                .zip(solution.x())
                .map(|(&sector, value)| VariableRow {
                    sector,
                    value: format!("{:.1}", value),
                })
                .collect::<Vec<VariableRow>>();
            println!("{}", Table::new(rows));
            println!(
                "{} {:.1} ({} pivots)",
                "optimal value:".green().bold(),
                solution.value(),
                solution.iterations()
            );
            ExitCode::SUCCESS
        }
        other => {
            error!("solve failed: {}", other);
            println!("{} {}", "solve failed:".red().bold(), other);
            ExitCode::FAILURE
        }
    }
}
