use clap::Parser;

use crate::rating::season::SeasonWindow;
use crate::rating::{ScoringRules, SEATS};

/// Club mahjong score ledger and rating server
#[derive(Parser, Debug, Clone)]
#[command(name = "mahjong-ledger", version, about)]
pub struct Config {
    /// HTTP listen address
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:5000")]
    pub listen_addr: String,

    /// SQLite database path
    #[arg(long, env = "DATABASE_PATH", default_value = "games.db")]
    pub database_path: String,

    /// Directory served under /static (team logos are written here)
    #[arg(long, env = "STATIC_DIR", default_value = "static")]
    pub static_dir: String,

    /// Club name shown on pages
    #[arg(long, env = "CLUB_NAME", default_value = "그릴마당")]
    pub club_name: String,

    /// Rank bonus for 1st..4th place, comma separated
    #[arg(
        long,
        env = "UMA",
        value_delimiter = ',',
        allow_negative_numbers = true,
        default_values_t = [50.0, 10.0, -10.0, -30.0]
    )]
    pub uma: Vec<f64>,

    /// Break-even score subtracted before dividing by 1000
    #[arg(long, env = "RETURN_SCORE", default_value = "30000")]
    pub return_score: i64,

    /// Required sum of the four scores of a table
    #[arg(long, env = "TABLE_TOTAL", default_value = "100000")]
    pub table_total: i64,

    /// Season year for the season score (e.g. 2025)
    #[arg(long, env = "SEASON_YEAR", default_value = "2025")]
    pub season_year: u32,

    /// First month of the season window
    #[arg(long, env = "SEASON_FROM_MONTH", default_value = "1")]
    pub season_from_month: u32,

    /// Last month of the season window
    #[arg(long, env = "SEASON_TO_MONTH", default_value = "6")]
    pub season_to_month: u32,

    /// Archive-name marker identifying monthly tournaments
    #[arg(long, env = "TOURNAMENT_MARKER", default_value = "대회")]
    pub tournament_marker: String,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.uma.len() != SEATS {
            anyhow::bail!("uma must have exactly {} values, got {}", SEATS, self.uma.len());
        }
        if self.uma.iter().any(|u| !u.is_finite()) {
            anyhow::bail!("uma values must be finite numbers");
        }
        if self.return_score <= 0 {
            anyhow::bail!("return_score must be positive");
        }
        if self.table_total <= 0 {
            anyhow::bail!("table_total must be positive");
        }
        if !(1..=12).contains(&self.season_from_month) || !(1..=12).contains(&self.season_to_month)
        {
            anyhow::bail!("season months must be between 1 and 12");
        }
        if self.season_from_month > self.season_to_month {
            anyhow::bail!("season_from_month must not be after season_to_month");
        }
        if self.tournament_marker.trim().is_empty() {
            anyhow::bail!("tournament_marker must not be empty");
        }
        Ok(())
    }

    pub fn rules(&self) -> anyhow::Result<ScoringRules> {
        let uma: [f64; SEATS] = self
            .uma
            .as_slice()
            .try_into()
            .map_err(|_| anyhow::anyhow!("uma must have exactly {} values", SEATS))?;
        Ok(ScoringRules {
            uma,
            return_score: self.return_score,
            table_total: self.table_total,
        })
    }

    pub fn season_window(&self) -> SeasonWindow {
        SeasonWindow {
            year: self.season_year,
            from_month: self.season_from_month,
            to_month: self.season_to_month,
            marker: self.tournament_marker.clone(),
        }
    }
}
